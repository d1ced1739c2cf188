//! Four-bar candlestick pattern detectors
//!
//! Patterns: Concealing Baby Swallow

use super::helpers::{is_marubozu, range_within, MARUBOZU_WICK_RATIO};
use crate::{OHLCVExt, PatternDetector, PatternId, PatternMatch, Ratio, Result, Signal, TaError, OHLCV};

impl_with_defaults!(ConcealBabySwallowDetector);

// ============================================================
// CONCEALING BABY SWALLOW
// ============================================================

/// Concealing Baby Swallow: two bearish marubozu, a bearish candle gapping down
/// from the second close, then a smaller bearish candle held inside the third's range
#[derive(Debug, Clone)]
pub struct ConcealBabySwallowDetector {
    /// Wick allowance for the two opening marubozu
    pub max_wick_ratio: Ratio,
}

impl Default for ConcealBabySwallowDetector {
    fn default() -> Self {
        Self {
            max_wick_ratio: Ratio::new_const(MARUBOZU_WICK_RATIO),
        }
    }
}

impl PatternDetector for ConcealBabySwallowDetector {
    fn id(&self) -> PatternId {
        PatternId("conceal_baby_swallow")
    }

    fn candles(&self) -> usize {
        4
    }

    fn confidence(&self) -> f64 {
        0.8
    }

    fn detect_at<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternMatch> {
        let first = bars.get(index.checked_sub(3)?)?;
        let second = bars.get(index - 2)?;
        let third = bars.get(index - 1)?;
        let fourth = bars.get(index)?;
        let wick = self.max_wick_ratio.get();

        if !(first.is_bearish() && is_marubozu(first, wick)) {
            return None;
        }
        if !(second.is_bearish() && is_marubozu(second, wick)) {
            return None;
        }
        if !third.is_bearish() || third.open() >= second.close() {
            return None;
        }

        (fourth.is_bearish() && fourth.body() < third.body() && range_within(third, fourth))
            .then(|| self.matched(index, Signal::Bullish, "Selling exhausts inside a gapped-down candle"))
    }

    fn validate_config(&self) -> Result<()> {
        // At 0.5 a bar with two equal wicks and no body passes as a marubozu
        let wick = self.max_wick_ratio.get();
        if wick >= 0.5 {
            return Err(TaError::InvalidConfig(format!(
                "conceal_baby_swallow: max_wick_ratio must be < 0.5, got {wick}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PriceBar;

    fn swallow_bars() -> Vec<PriceBar> {
        vec![
            PriceBar::ohlc(20.0, 20.0, 18.0, 18.0),
            PriceBar::ohlc(18.0, 18.0, 16.0, 16.0),
            PriceBar::ohlc(15.5, 16.0, 14.0, 14.5),
            PriceBar::ohlc(15.0, 15.5, 14.2, 14.8),
        ]
    }

    #[test]
    fn test_conceal_baby_swallow() {
        let found = ConcealBabySwallowDetector::with_defaults().scan(&swallow_bars());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].index, 3);
        assert_eq!(found[0].start_index(), 0);
        assert_eq!(found[0].signal, Signal::Bullish);
        assert_eq!(found[0].confidence, 0.8);
    }

    #[test]
    fn test_conceal_baby_swallow_needs_gap_down() {
        let mut bars = swallow_bars();
        bars[2] = PriceBar::ohlc(16.5, 17.0, 14.0, 14.5);
        assert!(ConcealBabySwallowDetector::default().detect_at(&bars, 3).is_none());
    }

    #[test]
    fn test_conceal_baby_swallow_fourth_must_stay_inside() {
        let mut bars = swallow_bars();
        bars[3] = PriceBar::ohlc(15.0, 16.5, 14.2, 14.8);
        assert!(ConcealBabySwallowDetector::default().detect_at(&bars, 3).is_none());
    }

    #[test]
    fn test_validate_rejects_loose_wick_ratio() {
        assert!(ConcealBabySwallowDetector::default().validate_config().is_ok());

        let loose = ConcealBabySwallowDetector {
            max_wick_ratio: Ratio::new(0.5).unwrap(),
        };
        assert!(loose.validate_config().is_err());
        assert!(crate::EngineBuilder::new()
            .add_checked(crate::BuiltinDetector::ConcealBabySwallow(loose))
            .is_err());
    }

    #[test]
    fn test_too_few_bars() {
        let bars = swallow_bars();
        assert!(ConcealBabySwallowDetector::default().detect_at(&bars[..3], 2).is_none());
    }
}
