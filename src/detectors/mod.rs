//! Candlestick pattern detectors
//!
//! Each pattern is a detector struct with public threshold fields and a `Default`
//! carrying the documented thresholds, plus a free function running the default
//! detector over a bar slice.
//!
//! # Pattern Categories
//!
//! - **Single-bar**: Doji, Spinning Top, Hammer, Shooting Star, Marubozu
//! - **Two-bar**: Engulfing, Homing Pigeon, Kicking, Harami, Piercing Line, Dark Cloud Cover
//! - **Three-bar**: Three White Soldiers, Three Black Crows, Morning/Evening Star,
//!   Morning Doji Star, Abandoned Baby, Tri-Star, Advance Block, Stick Sandwich
//! - **Four-bar**: Concealing Baby Swallow

pub mod helpers;

/// Generate `with_defaults()` -> `Self::default()` for multiple detector types.
macro_rules! impl_with_defaults {
  ($($detector:ty),* $(,)?) => {
    $(impl $detector {
      pub fn with_defaults() -> Self { Self::default() }
    })*
  };
}

/// Generate `detect_<pattern>(bars)` free functions over default detectors.
macro_rules! default_scanners {
  ($($func:ident => $detector:ty),* $(,)?) => {
    $(
      #[doc = concat!("Scan `bars` with a default [`", stringify!($detector), "`].")]
      pub fn $func<T: crate::OHLCV>(bars: &[T]) -> Vec<crate::PatternMatch> {
        crate::PatternDetector::scan(&<$detector>::default(), bars)
      }
    )*
  };
}

pub mod multi_bar;
pub mod single_bar;
pub mod three_bar;
pub mod two_bar;

pub use helpers::*;
pub use multi_bar::*;
pub use single_bar::*;
pub use three_bar::*;
pub use two_bar::*;

default_scanners! {
  detect_doji => DojiDetector,
  detect_spinning_top => SpinningTopDetector,
  detect_hammer => HammerDetector,
  detect_shooting_star => ShootingStarDetector,
  detect_marubozu => MarubozuDetector,
  detect_engulfing => EngulfingDetector,
  detect_homing_pigeon => HomingPigeonDetector,
  detect_kicking => KickingDetector,
  detect_harami => HaramiDetector,
  detect_piercing_line => PiercingLineDetector,
  detect_dark_cloud_cover => DarkCloudCoverDetector,
  detect_three_white_soldiers => ThreeWhiteSoldiersDetector,
  detect_three_black_crows => ThreeBlackCrowsDetector,
  detect_morning_star => MorningStarDetector,
  detect_morning_doji_star => MorningDojiStarDetector,
  detect_evening_star => EveningStarDetector,
  detect_abandoned_baby => AbandonedBabyDetector,
  detect_tri_star => TriStarDetector,
  detect_advance_block => AdvanceBlockDetector,
  detect_stick_sandwich => StickSandwichDetector,
  detect_conceal_baby_swallow => ConcealBabySwallowDetector,
}
