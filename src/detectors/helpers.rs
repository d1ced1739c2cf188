//! Candle geometry predicates shared across detector modules
//!
//! Every ratio test goes through the `OHLCVExt` ratio accessors, which return `None`
//! for zero-range bars. A flat bar therefore fails every ratio predicate, and a
//! non-finite price fails every comparison.

use crate::OHLCVExt;

// ============================================================
// THRESHOLDS
// ============================================================

/// Strict doji: body below 0.1% of range
pub const DOJI_RATIO: f64 = 0.001;
/// Relaxed doji used by the star patterns
pub const STAR_DOJI_RATIO: f64 = 0.1;
/// Small "star" body: at most 30% of range
pub const SMALL_BODY_RATIO: f64 = 0.3;
/// Marubozu wick allowance: each wick at most 5% of range
pub const MARUBOZU_WICK_RATIO: f64 = 0.05;

// ============================================================
// PREDICATES
// ============================================================

/// Body is below `max_ratio` of a non-zero range
#[inline]
pub fn is_doji<T: OHLCVExt + ?Sized>(bar: &T, max_ratio: f64) -> bool {
    bar.body_ratio().is_some_and(|r| r < max_ratio)
}

/// Body is at most `max_ratio` of a non-zero range
#[inline]
pub fn is_small_body<T: OHLCVExt + ?Sized>(bar: &T, max_ratio: f64) -> bool {
    bar.body_ratio().is_some_and(|r| r <= max_ratio)
}

/// Both wicks are at most `max_wick_ratio` of a non-zero range
#[inline]
pub fn is_marubozu<T: OHLCVExt + ?Sized>(bar: &T, max_wick_ratio: f64) -> bool {
    match (bar.upper_wick_ratio(), bar.lower_wick_ratio()) {
        (Some(upper), Some(lower)) => upper <= max_wick_ratio && lower <= max_wick_ratio,
        _ => false,
    }
}

/// Midpoint of the real body
#[inline]
pub fn body_midpoint<T: OHLCVExt + ?Sized>(bar: &T) -> f64 {
    (bar.open() + bar.close()) / 2.0
}

/// `inner`'s real body lies within `outer`'s real body (edges may touch)
#[inline]
pub fn body_within<A: OHLCVExt + ?Sized, B: OHLCVExt + ?Sized>(outer: &A, inner: &B) -> bool {
    inner.body_top() <= outer.body_top() && inner.body_bottom() >= outer.body_bottom()
}

/// `inner`'s high/low range lies within `outer`'s
#[inline]
pub fn range_within<A: OHLCVExt + ?Sized, B: OHLCVExt + ?Sized>(outer: &A, inner: &B) -> bool {
    inner.high() <= outer.high() && inner.low() >= outer.low()
}

/// High/low ranges do not overlap
#[inline]
pub fn ranges_gapped<A: OHLCVExt + ?Sized, B: OHLCVExt + ?Sized>(a: &A, b: &B) -> bool {
    a.high() < b.low() || a.low() > b.high()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PriceBar;

    #[test]
    fn test_doji_requires_range() {
        assert!(!is_doji(&PriceBar::from_close(10.0), DOJI_RATIO));
        assert!(is_doji(&PriceBar::ohlc(10.0, 11.0, 9.0, 10.0), DOJI_RATIO));
        // 0.1 / 2 = 5% body: relaxed doji only
        let bar = PriceBar::ohlc(10.0, 11.0, 9.0, 10.1);
        assert!(!is_doji(&bar, DOJI_RATIO));
        assert!(is_doji(&bar, STAR_DOJI_RATIO));
    }

    #[test]
    fn test_marubozu() {
        assert!(is_marubozu(&PriceBar::ohlc(10.0, 12.0, 10.0, 12.0), MARUBOZU_WICK_RATIO));
        assert!(!is_marubozu(&PriceBar::ohlc(10.0, 12.5, 10.0, 12.0), MARUBOZU_WICK_RATIO));
        assert!(!is_marubozu(&PriceBar::from_close(10.0), MARUBOZU_WICK_RATIO));
    }

    #[test]
    fn test_nan_fails_predicates() {
        let bar = PriceBar::ohlc(f64::NAN, 11.0, 9.0, 10.0);
        assert!(!is_doji(&bar, STAR_DOJI_RATIO));
        assert!(!is_small_body(&bar, SMALL_BODY_RATIO));
    }

    #[test]
    fn test_gaps_and_containment() {
        let a = PriceBar::ohlc(10.0, 11.0, 9.0, 10.5);
        let b = PriceBar::ohlc(12.0, 13.0, 11.5, 12.5);
        assert!(ranges_gapped(&a, &b));
        assert!(ranges_gapped(&b, &a));
        assert!(!ranges_gapped(&a, &a));
        assert!(range_within(&a, &PriceBar::ohlc(10.0, 10.5, 9.5, 10.2)));
        assert!(body_within(&a, &PriceBar::ohlc(10.1, 12.0, 8.0, 10.4)));
        assert_eq!(body_midpoint(&a), 10.25);
    }
}
