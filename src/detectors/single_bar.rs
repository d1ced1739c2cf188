//! Single-bar candlestick pattern detectors
//!
//! Patterns: Doji, Spinning Top, Hammer, Shooting Star, Marubozu

use super::helpers::{is_doji, is_marubozu, DOJI_RATIO, MARUBOZU_WICK_RATIO, SMALL_BODY_RATIO};
use crate::{OHLCVExt, PatternDetector, PatternId, PatternMatch, Ratio, Signal, OHLCV};

impl_with_defaults!(
    DojiDetector,
    SpinningTopDetector,
    HammerDetector,
    ShootingStarDetector,
    MarubozuDetector,
);

// ============================================================
// DOJI FAMILY
// ============================================================

/// Doji: open and close nearly equal on a bar with a real range
#[derive(Debug, Clone)]
pub struct DojiDetector {
    /// Body must be strictly below this share of the range
    pub max_body_ratio: Ratio,
}

impl Default for DojiDetector {
    fn default() -> Self {
        Self {
            max_body_ratio: Ratio::new_const(DOJI_RATIO),
        }
    }
}

impl PatternDetector for DojiDetector {
    fn id(&self) -> PatternId {
        PatternId("doji")
    }

    fn candles(&self) -> usize {
        1
    }

    fn confidence(&self) -> f64 {
        0.5
    }

    fn detect_at<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternMatch> {
        let bar = bars.get(index)?;
        is_doji(bar, self.max_body_ratio.get())
            .then(|| self.matched(index, Signal::Neutral, "Open and close nearly equal; indecision"))
    }
}

/// Spinning Top: small body with long wicks on both sides
#[derive(Debug, Clone)]
pub struct SpinningTopDetector {
    /// Body must be strictly below this share of the range
    pub max_body_ratio: Ratio,
    /// Each wick must exceed this share of the range
    pub min_wick_ratio: Ratio,
}

impl Default for SpinningTopDetector {
    fn default() -> Self {
        Self {
            max_body_ratio: Ratio::new_const(0.3),
            min_wick_ratio: Ratio::new_const(0.3),
        }
    }
}

impl PatternDetector for SpinningTopDetector {
    fn id(&self) -> PatternId {
        PatternId("spinning_top")
    }

    fn candles(&self) -> usize {
        1
    }

    fn confidence(&self) -> f64 {
        0.6
    }

    fn detect_at<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternMatch> {
        let bar = bars.get(index)?;
        let body = bar.body_ratio()?;
        let upper = bar.upper_wick_ratio()?;
        let lower = bar.lower_wick_ratio()?;
        let min_wick = self.min_wick_ratio.get();

        (body < self.max_body_ratio.get() && upper > min_wick && lower > min_wick).then(|| {
            self.matched(index, Signal::Neutral, "Small body between long wicks; indecision")
        })
    }
}

// ============================================================
// HAMMER FAMILY
// ============================================================

/// Hammer: small body at the top of the range with a long lower wick
#[derive(Debug, Clone)]
pub struct HammerDetector {
    pub max_body_ratio: Ratio,
    /// Lower wick must cover at least this share of the range
    pub min_lower_wick_ratio: Ratio,
    pub max_upper_wick_ratio: Ratio,
}

impl Default for HammerDetector {
    fn default() -> Self {
        Self {
            max_body_ratio: Ratio::new_const(SMALL_BODY_RATIO),
            min_lower_wick_ratio: Ratio::new_const(0.6),
            max_upper_wick_ratio: Ratio::new_const(0.1),
        }
    }
}

impl PatternDetector for HammerDetector {
    fn id(&self) -> PatternId {
        PatternId("hammer")
    }

    fn candles(&self) -> usize {
        1
    }

    fn confidence(&self) -> f64 {
        0.6
    }

    fn detect_at<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternMatch> {
        let bar = bars.get(index)?;
        let body = bar.body_ratio()?;
        let upper = bar.upper_wick_ratio()?;
        let lower = bar.lower_wick_ratio()?;

        (body <= self.max_body_ratio.get()
            && lower >= self.min_lower_wick_ratio.get()
            && upper <= self.max_upper_wick_ratio.get())
        .then(|| self.matched(index, Signal::Bullish, "Long lower wick rejects lower prices"))
    }
}

/// Shooting Star: small body at the bottom of the range with a long upper wick
#[derive(Debug, Clone)]
pub struct ShootingStarDetector {
    pub max_body_ratio: Ratio,
    /// Upper wick must cover at least this share of the range
    pub min_upper_wick_ratio: Ratio,
    pub max_lower_wick_ratio: Ratio,
}

impl Default for ShootingStarDetector {
    fn default() -> Self {
        Self {
            max_body_ratio: Ratio::new_const(SMALL_BODY_RATIO),
            min_upper_wick_ratio: Ratio::new_const(0.6),
            max_lower_wick_ratio: Ratio::new_const(0.1),
        }
    }
}

impl PatternDetector for ShootingStarDetector {
    fn id(&self) -> PatternId {
        PatternId("shooting_star")
    }

    fn candles(&self) -> usize {
        1
    }

    fn confidence(&self) -> f64 {
        0.6
    }

    fn detect_at<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternMatch> {
        let bar = bars.get(index)?;
        let body = bar.body_ratio()?;
        let upper = bar.upper_wick_ratio()?;
        let lower = bar.lower_wick_ratio()?;

        (body <= self.max_body_ratio.get()
            && upper >= self.min_upper_wick_ratio.get()
            && lower <= self.max_lower_wick_ratio.get())
        .then(|| self.matched(index, Signal::Bearish, "Long upper wick rejects higher prices"))
    }
}

// ============================================================
// MARUBOZU
// ============================================================

/// Marubozu: full-range body with negligible wicks, signal by color
#[derive(Debug, Clone)]
pub struct MarubozuDetector {
    /// Each wick must be at most this share of the range
    pub max_wick_ratio: Ratio,
}

impl Default for MarubozuDetector {
    fn default() -> Self {
        Self {
            max_wick_ratio: Ratio::new_const(MARUBOZU_WICK_RATIO),
        }
    }
}

impl PatternDetector for MarubozuDetector {
    fn id(&self) -> PatternId {
        PatternId("marubozu")
    }

    fn candles(&self) -> usize {
        1
    }

    fn confidence(&self) -> f64 {
        0.65
    }

    fn detect_at<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternMatch> {
        let bar = bars.get(index)?;
        if !is_marubozu(bar, self.max_wick_ratio.get()) {
            return None;
        }
        if bar.is_bullish() {
            Some(self.matched(index, Signal::Bullish, "Buyers held control from open to close"))
        } else if bar.is_bearish() {
            Some(self.matched(index, Signal::Bearish, "Sellers held control from open to close"))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PriceBar;

    #[test]
    fn test_doji_strict_threshold() {
        let d = DojiDetector::with_defaults();
        let bars = [
            PriceBar::ohlc(10.0, 11.0, 9.0, 10.0),
            PriceBar::ohlc(10.0, 11.0, 9.0, 10.1),
            PriceBar::from_close(10.0),
        ];
        let found = d.scan(&bars);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].index, 0);
        assert_eq!(found[0].signal, Signal::Neutral);
        assert_eq!(found[0].confidence, 0.5);
    }

    #[test]
    fn test_spinning_top() {
        let d = SpinningTopDetector::default();
        // Range 4, body 0.4, wicks 1.6 and 2.0
        let bar = PriceBar::ohlc(10.0, 12.0, 8.0, 10.4);
        assert!(d.detect_at(&[bar], 0).is_some());
        // Lower wick 0.8 / 3.8: too short
        let bar = PriceBar::ohlc(9.0, 12.0, 8.2, 9.4);
        assert!(d.detect_at(&[bar], 0).is_none());
    }

    #[test]
    fn test_hammer_and_shooting_star_mirror() {
        let hammer = PriceBar::ohlc(11.6, 12.0, 8.0, 11.9);
        let star = PriceBar::ohlc(8.4, 12.0, 8.0, 8.1);

        let h = HammerDetector::default().detect_at(&[hammer.clone()], 0).unwrap();
        assert_eq!(h.signal, Signal::Bullish);
        assert!(HammerDetector::default().detect_at(&[star.clone()], 0).is_none());

        let s = ShootingStarDetector::default().detect_at(&[star], 0).unwrap();
        assert_eq!(s.signal, Signal::Bearish);
        assert!(ShootingStarDetector::default().detect_at(&[hammer], 0).is_none());
    }

    #[test]
    fn test_marubozu_signal_by_color() {
        let d = MarubozuDetector::default();
        let up = PriceBar::ohlc(10.0, 12.0, 10.0, 12.0);
        let down = PriceBar::ohlc(12.0, 12.05, 10.0, 10.0);
        assert_eq!(d.detect_at(&[up], 0).unwrap().signal, Signal::Bullish);
        assert_eq!(d.detect_at(&[down], 0).unwrap().signal, Signal::Bearish);
        assert!(d.detect_at(&[PriceBar::ohlc(10.0, 12.0, 9.0, 11.0)], 0).is_none());
    }

    #[test]
    fn test_out_of_bounds_index() {
        let bars = [PriceBar::ohlc(10.0, 11.0, 9.0, 10.0)];
        assert!(DojiDetector::default().detect_at(&bars, 1).is_none());
    }
}
