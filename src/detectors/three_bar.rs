//! Three-bar candlestick pattern detectors
//!
//! Patterns: Three White Soldiers, Three Black Crows, Morning Star, Morning Doji Star,
//! Evening Star, Abandoned Baby, Tri-Star, Advance Block, Stick Sandwich

#![allow(clippy::default_constructed_unit_structs)]

use crate::{OHLCVExt, PatternDetector, PatternId, PatternMatch, Signal, OHLCV};

use super::helpers::{self, body_midpoint, is_doji, is_small_body, ranges_gapped};

/// `(first, second, third)` for the window ending at `index`
#[inline]
fn triple<T>(bars: &[T], index: usize) -> Option<(&T, &T, &T)> {
  let first = bars.get(index.checked_sub(2)?)?;
  Some((first, bars.get(index - 1)?, bars.get(index)?))
}

/// Combined wick length as a share of range; `None` on zero range
#[inline]
fn wick_share<T: OHLCV>(bar: &T) -> Option<f64> {
  Some(bar.upper_wick_ratio()? + bar.lower_wick_ratio()?)
}

// ============================================================
// THREE WHITE SOLDIERS / THREE BLACK CROWS
// ============================================================

/// Three White Soldiers: three advancing bullish candles with short wicks
#[derive(Debug, Clone)]
pub struct ThreeWhiteSoldiersDetector {
  /// Upper plus lower wick, as a share of range, per candle
  pub max_wick_ratio: f64,
}

impl Default for ThreeWhiteSoldiersDetector {
  fn default() -> Self {
    Self { max_wick_ratio: 0.4 }
  }
}

impl ThreeWhiteSoldiersDetector {
  pub fn with_defaults() -> Self {
    Self::default()
  }
}

impl PatternDetector for ThreeWhiteSoldiersDetector {
  fn id(&self) -> PatternId {
    PatternId("three_white_soldiers")
  }

  fn candles(&self) -> usize {
    3
  }

  fn confidence(&self) -> f64 {
    0.8
  }

  fn detect_at<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternMatch> {
    let (first, second, third) = triple(bars, index)?;

    if !first.is_bullish() || !second.is_bullish() || !third.is_bullish() {
      return None;
    }
    if second.close() <= first.close() || third.close() <= second.close() {
      return None;
    }
    if second.open() <= first.open() || third.open() <= second.open() {
      return None;
    }
    for bar in [first, second, third] {
      if wick_share(bar)? > self.max_wick_ratio {
        return None;
      }
    }

    Some(self.matched(index, Signal::Bullish, "Three advancing bullish candles with short wicks"))
  }
}

/// Three Black Crows: three declining bearish candles with short wicks
#[derive(Debug, Clone)]
pub struct ThreeBlackCrowsDetector {
  pub max_wick_ratio: f64,
}

impl Default for ThreeBlackCrowsDetector {
  fn default() -> Self {
    Self { max_wick_ratio: 0.4 }
  }
}

impl ThreeBlackCrowsDetector {
  pub fn with_defaults() -> Self {
    Self::default()
  }
}

impl PatternDetector for ThreeBlackCrowsDetector {
  fn id(&self) -> PatternId {
    PatternId("three_black_crows")
  }

  fn candles(&self) -> usize {
    3
  }

  fn confidence(&self) -> f64 {
    0.8
  }

  fn detect_at<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternMatch> {
    let (first, second, third) = triple(bars, index)?;

    if !first.is_bearish() || !second.is_bearish() || !third.is_bearish() {
      return None;
    }
    if second.close() >= first.close() || third.close() >= second.close() {
      return None;
    }
    if second.open() >= first.open() || third.open() >= second.open() {
      return None;
    }
    for bar in [first, second, third] {
      if wick_share(bar)? > self.max_wick_ratio {
        return None;
      }
    }

    Some(self.matched(index, Signal::Bearish, "Three declining bearish candles with short wicks"))
  }
}

// ============================================================
// STAR PATTERNS
// ============================================================

/// Morning Star: bearish candle, a small body below its close, then a bullish
/// candle closing above the first body's midpoint
#[derive(Debug, Clone)]
pub struct MorningStarDetector {
  /// Star body as a share of its range
  pub max_star_body_ratio: f64,
}

impl Default for MorningStarDetector {
  fn default() -> Self {
    Self { max_star_body_ratio: helpers::SMALL_BODY_RATIO }
  }
}

impl MorningStarDetector {
  pub fn with_defaults() -> Self {
    Self::default()
  }
}

/// Shared morning-star shape; `star` decides what counts as the middle candle
#[inline]
fn morning_star_shape<T: OHLCV>(first: &T, second: &T, third: &T, star: impl Fn(&T) -> bool) -> bool {
  first.is_bearish()
    && star(second)
    && second.body_top() < first.close()
    && third.is_bullish()
    && third.close() > body_midpoint(first)
}

impl PatternDetector for MorningStarDetector {
  fn id(&self) -> PatternId {
    PatternId("morning_star")
  }

  fn candles(&self) -> usize {
    3
  }

  fn confidence(&self) -> f64 {
    0.8
  }

  fn detect_at<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternMatch> {
    let (first, second, third) = triple(bars, index)?;
    morning_star_shape(first, second, third, |b| is_small_body(b, self.max_star_body_ratio))
      .then(|| self.matched(index, Signal::Bullish, "Selling stalls in a small star, buyers retake half the drop"))
  }
}

/// Morning Doji Star: a morning star whose middle candle is a doji
#[derive(Debug, Clone)]
pub struct MorningDojiStarDetector {
  pub max_doji_ratio: f64,
}

impl Default for MorningDojiStarDetector {
  fn default() -> Self {
    Self { max_doji_ratio: helpers::STAR_DOJI_RATIO }
  }
}

impl MorningDojiStarDetector {
  pub fn with_defaults() -> Self {
    Self::default()
  }
}

impl PatternDetector for MorningDojiStarDetector {
  fn id(&self) -> PatternId {
    PatternId("morning_doji_star")
  }

  fn candles(&self) -> usize {
    3
  }

  fn confidence(&self) -> f64 {
    0.85
  }

  fn detect_at<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternMatch> {
    let (first, second, third) = triple(bars, index)?;
    morning_star_shape(first, second, third, |b| is_doji(b, self.max_doji_ratio))
      .then(|| self.matched(index, Signal::Bullish, "Doji star after a decline, confirmed by a strong bullish close"))
  }
}

/// Evening Star: bullish candle, a small body above its close, then a bearish
/// candle closing below the first body's midpoint
#[derive(Debug, Clone)]
pub struct EveningStarDetector {
  pub max_star_body_ratio: f64,
}

impl Default for EveningStarDetector {
  fn default() -> Self {
    Self { max_star_body_ratio: helpers::SMALL_BODY_RATIO }
  }
}

impl EveningStarDetector {
  pub fn with_defaults() -> Self {
    Self::default()
  }
}

impl PatternDetector for EveningStarDetector {
  fn id(&self) -> PatternId {
    PatternId("evening_star")
  }

  fn candles(&self) -> usize {
    3
  }

  fn confidence(&self) -> f64 {
    0.8
  }

  fn detect_at<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternMatch> {
    let (first, second, third) = triple(bars, index)?;
    (first.is_bullish()
      && is_small_body(second, self.max_star_body_ratio)
      && second.body_bottom() > first.close()
      && third.is_bearish()
      && third.close() < body_midpoint(first))
    .then(|| self.matched(index, Signal::Bearish, "Buying stalls in a small star, sellers take back half the rise"))
  }
}

/// Abandoned Baby (bullish): a doji gapped below both neighbours
#[derive(Debug, Clone)]
pub struct AbandonedBabyDetector {
  pub max_doji_ratio: f64,
}

impl Default for AbandonedBabyDetector {
  fn default() -> Self {
    Self { max_doji_ratio: helpers::STAR_DOJI_RATIO }
  }
}

impl AbandonedBabyDetector {
  pub fn with_defaults() -> Self {
    Self::default()
  }
}

impl PatternDetector for AbandonedBabyDetector {
  fn id(&self) -> PatternId {
    PatternId("abandoned_baby")
  }

  fn candles(&self) -> usize {
    3
  }

  fn confidence(&self) -> f64 {
    0.9
  }

  fn detect_at<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternMatch> {
    let (first, second, third) = triple(bars, index)?;
    (first.is_bearish()
      && is_doji(second, self.max_doji_ratio)
      && second.high() < first.low()
      && second.high() < third.low()
      && third.is_bullish())
    .then(|| self.matched(index, Signal::Bullish, "Doji isolated by gaps on both sides of a decline"))
  }
}

/// Tri-Star: three dojis, each range gapped from the next; signal from the net move
#[derive(Debug, Clone)]
pub struct TriStarDetector {
  pub max_doji_ratio: f64,
}

impl Default for TriStarDetector {
  fn default() -> Self {
    Self { max_doji_ratio: helpers::STAR_DOJI_RATIO }
  }
}

impl TriStarDetector {
  pub fn with_defaults() -> Self {
    Self::default()
  }
}

impl PatternDetector for TriStarDetector {
  fn id(&self) -> PatternId {
    PatternId("tri_star")
  }

  fn candles(&self) -> usize {
    3
  }

  fn confidence(&self) -> f64 {
    0.7
  }

  fn detect_at<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternMatch> {
    let (first, second, third) = triple(bars, index)?;
    let all_doji = [first, second, third].into_iter().all(|b| is_doji(b, self.max_doji_ratio));
    if !all_doji || !ranges_gapped(first, second) || !ranges_gapped(second, third) {
      return None;
    }

    let description = "Three gapped dojis; trend exhaustion";
    let signal = if third.close() > first.close() {
      Signal::Bullish
    } else if third.close() < first.close() {
      Signal::Bearish
    } else {
      Signal::Neutral
    };
    Some(self.matched(index, signal, description))
  }
}

// ============================================================
// ADVANCE BLOCK / STICK SANDWICH
// ============================================================

/// Advance Block: rising bullish candles losing body and growing upper wicks
#[derive(Debug, Clone, Default)]
pub struct AdvanceBlockDetector;

impl AdvanceBlockDetector {
  pub fn with_defaults() -> Self {
    Self
  }
}

impl PatternDetector for AdvanceBlockDetector {
  fn id(&self) -> PatternId {
    PatternId("advance_block")
  }

  fn candles(&self) -> usize {
    3
  }

  fn confidence(&self) -> f64 {
    0.7
  }

  fn detect_at<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternMatch> {
    let (first, second, third) = triple(bars, index)?;
    (first.is_bullish()
      && second.is_bullish()
      && third.is_bullish()
      && first.close() < second.close()
      && second.close() < third.close()
      && first.body() > second.body()
      && second.body() > third.body()
      && first.upper_wick() < second.upper_wick()
      && second.upper_wick() < third.upper_wick())
    .then(|| self.matched(index, Signal::Bearish, "Advance weakens: shrinking bodies, growing upper wicks"))
  }
}

/// Stick Sandwich: bullish candle between two bearish candles closing at the same level
#[derive(Debug, Clone)]
pub struct StickSandwichDetector {
  /// Allowed gap between the outer closes, relative to the first close
  pub close_tolerance: f64,
}

impl Default for StickSandwichDetector {
  fn default() -> Self {
    Self { close_tolerance: 0.02 }
  }
}

impl StickSandwichDetector {
  pub fn with_defaults() -> Self {
    Self::default()
  }
}

impl PatternDetector for StickSandwichDetector {
  fn id(&self) -> PatternId {
    PatternId("stick_sandwich")
  }

  fn candles(&self) -> usize {
    3
  }

  fn confidence(&self) -> f64 {
    0.65
  }

  fn detect_at<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternMatch> {
    let (first, second, third) = triple(bars, index)?;
    let same_close = (third.close() - first.close()).abs() <= self.close_tolerance * first.close().abs();

    (first.is_bearish()
      && second.is_bullish()
      && third.is_bearish()
      && same_close
      && second.close() > first.close()
      && second.close() > third.close())
    .then(|| self.matched(index, Signal::Bullish, "Matching closes form support around a bullish candle"))
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
  fn test_three_white_soldiers() {
    let bars = [
      bar(10.0, 11.1, 9.9, 11.0),
      bar(10.8, 12.1, 10.7, 12.0),
      bar(11.8, 13.1, 11.7, 13.0),
    ];
    let m = ThreeWhiteSoldiersDetector::with_defaults().detect_at(&bars, 2).unwrap();
    assert_eq!(m.signal, Signal::Bullish);
    assert_eq!(m.start_index(), 0);
    assert!(ThreeBlackCrowsDetector::default().detect_at(&bars, 2).is_none());
  }

  #[test]
  fn test_three_white_soldiers_rejects_long_wicks() {
    let bars = [
      bar(10.0, 13.0, 9.0, 11.0),
      bar(10.8, 12.1, 10.7, 12.0),
      bar(11.8, 13.1, 11.7, 13.0),
    ];
    assert!(ThreeWhiteSoldiersDetector::default().detect_at(&bars, 2).is_none());
  }

  #[test]
  fn test_three_black_crows() {
    let bars = [
      bar(13.0, 13.1, 11.9, 12.0),
      bar(12.2, 12.3, 10.9, 11.0),
      bar(11.2, 11.3, 9.9, 10.0),
    ];
    assert_eq!(ThreeBlackCrowsDetector::default().detect_at(&bars, 2).unwrap().signal, Signal::Bearish);
  }

  #[test]
  fn test_morning_star_family() {
    // Bearish, small star below the close, bullish through the midpoint (11)
    let star = [bar(12.0, 12.1, 9.9, 10.0), bar(9.6, 9.9, 9.0, 9.4), bar(9.6, 11.6, 9.5, 11.5)];
    assert!(MorningStarDetector::default().detect_at(&star, 2).is_some());
    assert!(MorningDojiStarDetector::default().detect_at(&star, 2).is_none());

    let doji_star = [bar(12.0, 12.1, 9.9, 10.0), bar(9.5, 9.9, 9.0, 9.51), bar(9.6, 11.6, 9.5, 11.5)];
    let m = MorningDojiStarDetector::default().detect_at(&doji_star, 2).unwrap();
    assert_eq!(m.confidence, 0.85);
    assert!(MorningStarDetector::default().detect_at(&doji_star, 2).is_some());
  }

  #[test]
  fn test_morning_star_needs_midpoint_recovery() {
    let bars = [bar(12.0, 12.1, 9.9, 10.0), bar(9.6, 9.9, 9.0, 9.4), bar(9.6, 10.9, 9.5, 10.8)];
    assert!(MorningStarDetector::default().detect_at(&bars, 2).is_none());
  }

  #[test]
  fn test_evening_star() {
    let bars = [bar(10.0, 12.1, 9.9, 12.0), bar(12.4, 13.0, 12.1, 12.6), bar(12.4, 12.5, 10.4, 10.5)];
    assert_eq!(EveningStarDetector::default().detect_at(&bars, 2).unwrap().signal, Signal::Bearish);
  }

  #[test]
  fn test_abandoned_baby() {
    let bars = [bar(12.0, 12.1, 9.9, 10.0), bar(9.0, 9.5, 8.5, 9.0), bar(10.0, 11.6, 9.8, 11.5)];
    assert!(AbandonedBabyDetector::default().detect_at(&bars, 2).is_some());

    // Third candle's low overlaps the doji
    let bars = [bar(12.0, 12.1, 9.9, 10.0), bar(9.0, 9.5, 8.5, 9.0), bar(9.6, 11.6, 9.4, 11.5)];
    assert!(AbandonedBabyDetector::default().detect_at(&bars, 2).is_none());
  }

  #[test]
  fn test_tri_star_signal_from_net_move() {
    let d = TriStarDetector::default();
    let up = [bar(10.0, 10.5, 9.5, 10.0), bar(11.0, 11.5, 10.6, 11.0), bar(10.2, 10.4, 9.8, 10.2)];
    assert_eq!(d.detect_at(&up, 2).unwrap().signal, Signal::Bullish);

    let flat = [bar(10.0, 10.5, 9.5, 10.0), bar(11.0, 11.5, 10.6, 11.0), bar(10.0, 10.4, 9.8, 10.0)];
    assert_eq!(d.detect_at(&flat, 2).unwrap().signal, Signal::Neutral);

    let overlapping = [bar(10.0, 10.5, 9.5, 10.0), bar(10.4, 11.5, 10.3, 10.4), bar(10.0, 10.4, 9.8, 10.0)];
    assert!(d.detect_at(&overlapping, 2).is_none());
  }

  #[test]
  fn test_advance_block() {
    let bars = [
      bar(10.0, 12.1, 9.9, 12.0),
      bar(11.5, 13.0, 11.4, 12.7),
      bar(12.5, 14.0, 12.4, 13.0),
    ];
    assert_eq!(AdvanceBlockDetector::with_defaults().detect_at(&bars, 2).unwrap().signal, Signal::Bearish);
  }

  #[test]
  fn test_stick_sandwich() {
    let d = StickSandwichDetector::default();
    let bars = [bar(11.0, 11.1, 9.9, 10.0), bar(10.2, 11.6, 10.1, 11.5), bar(11.4, 11.5, 10.0, 10.1)];
    assert_eq!(d.detect_at(&bars, 2).unwrap().signal, Signal::Bullish);

    // Outer closes 5% apart
    let bars = [bar(11.0, 11.1, 9.9, 10.0), bar(10.2, 11.6, 10.1, 11.5), bar(11.4, 11.5, 10.4, 10.5)];
    assert!(d.detect_at(&bars, 2).is_none());
  }
}
