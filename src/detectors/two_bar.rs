//! Two-bar candlestick pattern detectors
//!
//! Patterns: Engulfing, Homing Pigeon, Kicking, Harami, Piercing Line, Dark Cloud Cover

#![allow(clippy::default_constructed_unit_structs)]

use super::helpers::{body_within, is_marubozu, range_within, MARUBOZU_WICK_RATIO};
use crate::{OHLCVExt, PatternDetector, PatternId, PatternMatch, Ratio, Signal, OHLCV};

impl_with_defaults!(
    EngulfingDetector,
    HomingPigeonDetector,
    KickingDetector,
    HaramiDetector,
    PiercingLineDetector,
    DarkCloudCoverDetector,
);

/// `(prev, curr)` for the window ending at `index`
#[inline]
fn pair<T>(bars: &[T], index: usize) -> Option<(&T, &T)> {
    let prev = bars.get(index.checked_sub(1)?)?;
    let curr = bars.get(index)?;
    Some((prev, curr))
}

// ============================================================
// ENGULFING / HARAMI
// ============================================================

/// Engulfing: a reversal candle whose body swallows the prior opposite body.
///
/// The second body must also be strictly larger, so two bodies spanning the same
/// open/close prices do not match.
#[derive(Debug, Clone, Default)]
pub struct EngulfingDetector;

impl PatternDetector for EngulfingDetector {
    fn id(&self) -> PatternId {
        PatternId("engulfing")
    }

    fn candles(&self) -> usize {
        2
    }

    fn confidence(&self) -> f64 {
        0.75
    }

    fn detect_at<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternMatch> {
        let (prev, curr) = pair(bars, index)?;
        if !(body_within(curr, prev) && curr.body() > prev.body()) {
            return None;
        }

        if prev.is_bearish() && curr.is_bullish() {
            Some(self.matched(index, Signal::Bullish, "Bullish body engulfs the prior bearish body"))
        } else if prev.is_bullish() && curr.is_bearish() {
            Some(self.matched(index, Signal::Bearish, "Bearish body engulfs the prior bullish body"))
        } else {
            None
        }
    }
}

/// Harami: a small opposite body held inside the prior body
#[derive(Debug, Clone, Default)]
pub struct HaramiDetector;

impl PatternDetector for HaramiDetector {
    fn id(&self) -> PatternId {
        PatternId("harami")
    }

    fn candles(&self) -> usize {
        2
    }

    fn confidence(&self) -> f64 {
        0.6
    }

    fn detect_at<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternMatch> {
        let (prev, curr) = pair(bars, index)?;
        let strictly_inside =
            curr.body_top() < prev.body_top() && curr.body_bottom() > prev.body_bottom();
        if !strictly_inside {
            return None;
        }

        if prev.is_bearish() && curr.is_bullish() {
            Some(self.matched(index, Signal::Bullish, "Bullish body held inside the prior bearish body"))
        } else if prev.is_bullish() && curr.is_bearish() {
            Some(self.matched(index, Signal::Bearish, "Bearish body held inside the prior bullish body"))
        } else {
            None
        }
    }
}

/// Homing Pigeon: a smaller bearish candle inside the prior bearish candle's range
#[derive(Debug, Clone, Default)]
pub struct HomingPigeonDetector;

impl PatternDetector for HomingPigeonDetector {
    fn id(&self) -> PatternId {
        PatternId("homing_pigeon")
    }

    fn candles(&self) -> usize {
        2
    }

    fn confidence(&self) -> f64 {
        0.7
    }

    fn detect_at<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternMatch> {
        let (prev, curr) = pair(bars, index)?;
        (prev.is_bearish()
            && curr.is_bearish()
            && range_within(prev, curr)
            && curr.body() < prev.body())
        .then(|| self.matched(index, Signal::Bullish, "Selling pressure contracts inside the prior candle"))
    }
}

// ============================================================
// KICKING
// ============================================================

/// Kicking (bullish only): bearish marubozu, then a bullish marubozu gapping above it
#[derive(Debug, Clone)]
pub struct KickingDetector {
    /// Each wick must be at most this share of its candle's range
    pub max_wick_ratio: Ratio,
}

impl Default for KickingDetector {
    fn default() -> Self {
        Self {
            max_wick_ratio: Ratio::new_const(MARUBOZU_WICK_RATIO),
        }
    }
}

impl PatternDetector for KickingDetector {
    fn id(&self) -> PatternId {
        PatternId("kicking")
    }

    fn candles(&self) -> usize {
        2
    }

    fn confidence(&self) -> f64 {
        0.9
    }

    fn detect_at<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternMatch> {
        let (prev, curr) = pair(bars, index)?;
        let wick = self.max_wick_ratio.get();

        (prev.is_bearish()
            && is_marubozu(prev, wick)
            && curr.is_bullish()
            && is_marubozu(curr, wick)
            && curr.low() > prev.high())
        .then(|| self.matched(index, Signal::Bullish, "Bullish marubozu gaps above a bearish marubozu"))
    }
}

// ============================================================
// PIERCING / DARK CLOUD
// ============================================================

/// Piercing Line: bullish candle opening below the prior bearish close and closing
/// past the prior body's midpoint
#[derive(Debug, Clone)]
pub struct PiercingLineDetector {
    /// Share of the prior body the close must recover
    pub min_penetration: Ratio,
}

impl Default for PiercingLineDetector {
    fn default() -> Self {
        Self {
            min_penetration: Ratio::new_const(0.5),
        }
    }
}

impl PatternDetector for PiercingLineDetector {
    fn id(&self) -> PatternId {
        PatternId("piercing_line")
    }

    fn candles(&self) -> usize {
        2
    }

    fn confidence(&self) -> f64 {
        0.7
    }

    fn detect_at<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternMatch> {
        let (prev, curr) = pair(bars, index)?;
        let threshold = prev.close() + self.min_penetration.get() * prev.body();

        (prev.is_bearish()
            && curr.is_bullish()
            && curr.open() < prev.close()
            && curr.close() > threshold
            && curr.close() < prev.open())
        .then(|| self.matched(index, Signal::Bullish, "Opens weak, recovers past the prior midpoint"))
    }
}

/// Dark Cloud Cover: bearish candle opening above the prior bullish close and
/// closing past the prior body's midpoint
#[derive(Debug, Clone)]
pub struct DarkCloudCoverDetector {
    /// Share of the prior body the close must give back
    pub min_penetration: Ratio,
}

impl Default for DarkCloudCoverDetector {
    fn default() -> Self {
        Self {
            min_penetration: Ratio::new_const(0.5),
        }
    }
}

impl PatternDetector for DarkCloudCoverDetector {
    fn id(&self) -> PatternId {
        PatternId("dark_cloud_cover")
    }

    fn candles(&self) -> usize {
        2
    }

    fn confidence(&self) -> f64 {
        0.7
    }

    fn detect_at<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternMatch> {
        let (prev, curr) = pair(bars, index)?;
        let threshold = prev.close() - self.min_penetration.get() * prev.body();

        (prev.is_bullish()
            && curr.is_bearish()
            && curr.open() > prev.close()
            && curr.close() < threshold
            && curr.close() > prev.open())
        .then(|| self.matched(index, Signal::Bearish, "Opens strong, falls past the prior midpoint"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PriceBar;

    fn bar(o: f64, h: f64, l: f64, c: f64) -> PriceBar {
        PriceBar::ohlc(o, h, l, c)
    }

    #[test]
    fn test_engulfing_both_directions() {
        let d = EngulfingDetector::default();
        let bull = [bar(10.0, 10.2, 8.8, 9.0), bar(8.8, 10.6, 8.7, 10.5)];
        let m = d.detect_at(&bull, 1).unwrap();
        assert_eq!(m.signal, Signal::Bullish);
        assert_eq!(m.start_index(), 0);

        let bear = [bar(9.0, 10.2, 8.8, 10.0), bar(10.5, 10.6, 8.5, 8.8)];
        assert_eq!(d.detect_at(&bear, 1).unwrap().signal, Signal::Bearish);
    }

    #[test]
    fn test_engulfing_needs_strictly_larger_body() {
        // Same body span, opposite color
        let bars = [bar(10.0, 10.5, 8.5, 9.0), bar(9.0, 10.5, 8.5, 10.0)];
        assert!(EngulfingDetector::default().detect_at(&bars, 1).is_none());
    }

    #[test]
    fn test_engulfing_needs_two_bars() {
        let bars = [bar(8.8, 10.6, 8.7, 10.5)];
        assert!(EngulfingDetector::default().detect_at(&bars, 0).is_none());
        assert!(EngulfingDetector::default().scan(&bars).is_empty());
    }

    #[test]
    fn test_harami() {
        let bars = [bar(12.0, 12.5, 8.5, 9.0), bar(10.0, 11.0, 9.8, 10.8)];
        assert_eq!(HaramiDetector::default().detect_at(&bars, 1).unwrap().signal, Signal::Bullish);
    }

    #[test]
    fn test_homing_pigeon() {
        let d = HomingPigeonDetector::default();
        let bars = [bar(12.0, 12.5, 8.5, 9.0), bar(11.0, 11.5, 9.0, 9.8)];
        let m = d.detect_at(&bars, 1).unwrap();
        assert_eq!(m.signal, Signal::Bullish);
        assert_eq!(m.confidence, 0.7);

        // Second candle breaks the first's low
        let bars = [bar(12.0, 12.5, 8.5, 9.0), bar(11.0, 11.5, 8.0, 9.8)];
        assert!(d.detect_at(&bars, 1).is_none());
    }

    #[test]
    fn test_kicking_example() {
        let bars = [bar(10.0, 10.0, 9.0, 9.0), bar(10.5, 12.0, 10.5, 12.0)];
        let found = KickingDetector::default().scan(&bars);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].index, 1);
        assert_eq!(found[0].candles, 2);
        assert_eq!(found[0].signal, Signal::Bullish);
        assert_eq!(found[0].confidence, 0.9);
    }

    #[test]
    fn test_kicking_requires_gap() {
        let bars = [bar(10.0, 10.0, 9.0, 9.0), bar(9.5, 12.0, 9.5, 12.0)];
        assert!(KickingDetector::default().detect_at(&bars, 1).is_none());
    }

    #[test]
    fn test_kicking_bearish_variant_not_reported() {
        let bars = [bar(9.0, 10.0, 9.0, 10.0), bar(8.5, 8.5, 7.0, 7.0)];
        assert!(KickingDetector::default().detect_at(&bars, 1).is_none());
    }

    #[test]
    fn test_piercing_and_dark_cloud() {
        let piercing = [bar(12.0, 12.2, 9.9, 10.0), bar(9.5, 11.6, 9.4, 11.5)];
        assert!(PiercingLineDetector::default().detect_at(&piercing, 1).is_some());
        assert!(DarkCloudCoverDetector::default().detect_at(&piercing, 1).is_none());

        let dark = [bar(10.0, 12.1, 9.9, 12.0), bar(12.5, 12.6, 10.4, 10.5)];
        assert_eq!(
            DarkCloudCoverDetector::default().detect_at(&dark, 1).unwrap().signal,
            Signal::Bearish
        );
    }
}
