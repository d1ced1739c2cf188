//! # candlewise - technical indicators and candlestick patterns for trading bots
//!
//! Two independent batch engines over an ordered slice of OHLCV bars:
//!
//! - [`indicators`]: index-aligned numeric series (`Vec<Option<f64>>`), one slot per bar,
//!   `None` where the value is undefined.
//! - Pattern detection ([`detect_all`], [`PatternEngine`], [`detectors`]): discrete
//!   [`PatternMatch`] events over 1-4 bar windows.
//!
//! Both engines are pure functions of their inputs. Nothing is cached and no state
//! survives a call.
//!
//! ## Quick Start
//!
//! ```rust
//! use candlewise::prelude::*;
//!
//! let bars: Vec<PriceBar> = [10.0, 11.0, 12.0, 13.0, 14.0]
//!     .into_iter()
//!     .map(PriceBar::from_close)
//!     .collect();
//!
//! let sma = indicators::sma(&bars, 3);
//! assert_eq!(sma, vec![None, None, Some(11.0), Some(12.0), Some(13.0)]);
//!
//! let patterns = detect_all(&bars, None);
//! assert!(patterns.windows(2).all(|w| w[0].index <= w[1].index));
//! ```

pub mod bar;
pub mod detectors;
pub mod indicators;
pub mod params;

pub use bar::PriceBar;

pub mod prelude {
    pub use crate::{
        // Bars
        bar::PriceBar,
        // Detectors
        detectors::*,
        // Indicators
        indicators::{
            self, compute_batch, IndicatorConfig, IndicatorKind, IndicatorOutput, Series,
        },
        // Parameters
        params::{ParamMeta, ParamType, ParameterizedIndicator},
        // Parallel
        scan_parallel,
        // Engine
        detect_all,
        BuiltinDetector,
        DynPatternDetector,
        EngineBuilder,
        OHLCVExt,
        PatternDetector,
        PatternEngine,
        PatternId,
        PatternMatch,
        Period,
        Ratio,
        Result,
        ScanResult,
        Signal,
        // Errors
        TaError,
        OHLCV,
    };
}

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, TaError>;

/// Errors raised by the configuration surface.
///
/// Indicator and pattern computations never fail; they encode missing or invalid
/// data as `None` slots or an empty match list. Only building configs, engines and
/// validated values can produce a `TaError`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TaError {
    #[error("Invalid value: {0}")]
    InvalidValue(&'static str),

    #[error("{field} = {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Unknown indicator: {0}")]
    UnknownIndicator(String),

    #[error("Unknown pattern: {0}")]
    UnknownPattern(String),
}

// ============================================================
// VALIDATED TYPES
// ============================================================

/// Normalized value in range 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Ratio(f64);

impl Ratio {
    /// Create a new Ratio, validating the value is in [0.0, 1.0]
    pub fn new(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(TaError::InvalidValue("Ratio cannot be NaN or infinite"));
        }
        if !(0.0..=1.0).contains(&value) {
            return Err(TaError::OutOfRange {
                field: "Ratio",
                value,
                min: 0.0,
                max: 1.0,
            });
        }
        Ok(Self(value))
    }

    /// Create a Ratio from a compile-time constant (library internal use)
    #[doc(hidden)]
    pub const fn new_const(value: f64) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl serde::Serialize for Ratio {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Ratio {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = f64::deserialize(d)?;
        Ratio::new(value).map_err(serde::de::Error::custom)
    }
}

/// Lookback period (must be > 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period(usize);

impl Period {
    /// Create a new Period, validating value is > 0
    pub fn new(value: usize) -> Result<Self> {
        if value == 0 {
            return Err(TaError::InvalidValue("Period must be > 0"));
        }
        Ok(Self(value))
    }

    #[doc(hidden)]
    pub const fn new_const(value: usize) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl serde::Serialize for Period {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Period {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = usize::deserialize(d)?;
        Period::new(value).map_err(serde::de::Error::custom)
    }
}

// ============================================================
// OHLCV TRAITS
// ============================================================

/// Core OHLCV data trait.
///
/// Implementations must always return a value for every field. Bars that lack an
/// open, high or low report their close instead (see [`PriceBar`]); a missing volume
/// reads as `0.0`.
pub trait OHLCV {
    fn open(&self) -> f64;
    fn high(&self) -> f64;
    fn low(&self) -> f64;
    fn close(&self) -> f64;
    fn volume(&self) -> f64;
}

/// Blanket impl for references to dyn OHLCV
impl OHLCV for &dyn OHLCV {
    fn open(&self) -> f64 {
        (*self).open()
    }

    fn high(&self) -> f64 {
        (*self).high()
    }

    fn low(&self) -> f64 {
        (*self).low()
    }

    fn close(&self) -> f64 {
        (*self).close()
    }

    fn volume(&self) -> f64 {
        (*self).volume()
    }
}

/// Extension trait with computed candle geometry
pub trait OHLCVExt: OHLCV {
    #[inline]
    fn body(&self) -> f64 {
        (self.close() - self.open()).abs()
    }

    #[inline]
    fn range(&self) -> f64 {
        self.high() - self.low()
    }

    #[inline]
    fn upper_wick(&self) -> f64 {
        self.high() - self.open().max(self.close())
    }

    #[inline]
    fn lower_wick(&self) -> f64 {
        self.open().min(self.close()) - self.low()
    }

    #[inline]
    fn body_top(&self) -> f64 {
        self.open().max(self.close())
    }

    #[inline]
    fn body_bottom(&self) -> f64 {
        self.open().min(self.close())
    }

    #[inline]
    fn is_bullish(&self) -> bool {
        self.close() > self.open()
    }

    #[inline]
    fn is_bearish(&self) -> bool {
        self.close() < self.open()
    }

    /// `(high + low) / 2`
    #[inline]
    fn median_price(&self) -> f64 {
        (self.high() + self.low()) / 2.0
    }

    /// `(high + low + close) / 3`
    #[inline]
    fn typical_price(&self) -> f64 {
        (self.high() + self.low() + self.close()) / 3.0
    }

    /// Body as ratio of range. Returns None for zero-range bars.
    #[inline]
    fn body_ratio(&self) -> Option<f64> {
        let range = self.range();
        (range > 0.0).then(|| self.body() / range)
    }

    #[inline]
    fn upper_wick_ratio(&self) -> Option<f64> {
        let range = self.range();
        (range > 0.0).then(|| self.upper_wick() / range)
    }

    #[inline]
    fn lower_wick_ratio(&self) -> Option<f64> {
        let range = self.range();
        (range > 0.0).then(|| self.lower_wick() / range)
    }
}

impl<T: OHLCV + ?Sized> OHLCVExt for T {}

// ============================================================
// PATTERN MATCH - result of detection (Copy, no allocations)
// ============================================================

/// Stable snake_case identifier for a pattern type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatternId(pub &'static str);

impl PatternId {
    /// Returns the string identifier
    #[inline]
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for PatternId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

impl std::str::FromStr for PatternId {
    type Err = TaError;

    /// Resolves a string to a known builtin pattern id.
    fn from_str(s: &str) -> Result<Self> {
        BuiltinDetector::from_id(s)
            .map(|d| d.id())
            .ok_or_else(|| TaError::UnknownPattern(s.to_string()))
    }
}

impl serde::Serialize for PatternId {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_str(self.0)
    }
}

/// Polarity of a detected pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Bullish,
    Bearish,
    Neutral,
}

impl Signal {
    #[inline]
    pub fn is_bullish(self) -> bool {
        matches!(self, Signal::Bullish)
    }

    #[inline]
    pub fn is_bearish(self) -> bool {
        matches!(self, Signal::Bearish)
    }
}

/// A discrete pattern detection event
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct PatternMatch {
    pub pattern: PatternId,
    /// Index of the last bar participating in the match
    pub index: usize,
    /// Window width consumed (1-4)
    pub candles: usize,
    pub signal: Signal,
    /// Fixed per-pattern reliability weight in 0.0..=1.0
    pub confidence: f64,
    pub description: &'static str,
}

impl PatternMatch {
    /// Index of the first bar participating in the match
    #[inline]
    pub fn start_index(&self) -> usize {
        self.index + 1 - self.candles
    }
}

// ============================================================
// PATTERN DETECTOR TRAITS
// ============================================================

/// Generic pattern detector trait - for concrete types
pub trait PatternDetector: Send + Sync {
    fn id(&self) -> PatternId;

    /// Window width in bars
    fn candles(&self) -> usize;

    /// Reliability weight reported with every match
    fn confidence(&self) -> f64;

    /// Checks the window ending at `index`.
    fn detect_at<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternMatch>;

    fn validate_config(&self) -> Result<()> {
        Ok(())
    }

    /// Runs the detector over every full window, in index order.
    fn scan<T: OHLCV>(&self, bars: &[T]) -> Vec<PatternMatch> {
        let first = self.candles().saturating_sub(1);
        (first..bars.len())
            .filter_map(|i| self.detect_at(bars, i))
            .collect()
    }

    /// Builds a match for the window ending at `index`.
    #[inline]
    fn matched(&self, index: usize, signal: Signal, description: &'static str) -> PatternMatch {
        PatternMatch {
            pattern: self.id(),
            index,
            candles: self.candles(),
            signal,
            confidence: self.confidence(),
            description,
        }
    }
}

/// Object-safe pattern detector trait - for custom detectors
pub trait DynPatternDetector: Send + Sync {
    fn id(&self) -> PatternId;
    fn candles(&self) -> usize;
    fn detect_at(&self, bars: &[&dyn OHLCV], index: usize) -> Option<PatternMatch>;
    fn validate_config(&self) -> Result<()>;
}

impl<D: PatternDetector> DynPatternDetector for D {
    fn id(&self) -> PatternId {
        PatternDetector::id(self)
    }

    fn candles(&self) -> usize {
        PatternDetector::candles(self)
    }

    fn detect_at(&self, bars: &[&dyn OHLCV], index: usize) -> Option<PatternMatch> {
        PatternDetector::detect_at(self, bars, index)
    }

    fn validate_config(&self) -> Result<()> {
        PatternDetector::validate_config(self)
    }
}

// ============================================================
// BUILTIN DETECTORS - generated via macro
// ============================================================

use detectors::*;

/// Macro to generate BuiltinDetector enum without boilerplate.
///
/// Declaration order is the registration order `detect_all` reports ties in.
macro_rules! define_builtin_detectors {
    (
        $(
            $variant:ident($detector:ty)
        ),* $(,)?
    ) => {
        /// All builtin detectors - fast path via enum dispatch
        #[derive(Debug, Clone)]
        pub enum BuiltinDetector {
            $($variant($detector)),*
        }

        impl BuiltinDetector {
            /// Every builtin detector with default thresholds, in registration order
            pub fn all_defaults() -> Vec<Self> {
                vec![$(Self::$variant(<$detector>::default())),*]
            }

            /// Default-configured detector for a pattern id
            pub fn from_id(id: &str) -> Option<Self> {
                Self::all_defaults().into_iter().find(|d| d.id().as_str() == id)
            }

            #[inline]
            pub fn detect_at<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternMatch> {
                match self {
                    $(Self::$variant(d) => PatternDetector::detect_at(d, bars, index)),*
                }
            }

            #[inline]
            pub fn id(&self) -> PatternId {
                match self {
                    $(Self::$variant(d) => PatternDetector::id(d)),*
                }
            }

            #[inline]
            pub fn candles(&self) -> usize {
                match self {
                    $(Self::$variant(d) => PatternDetector::candles(d)),*
                }
            }

            pub fn validate_config(&self) -> Result<()> {
                match self {
                    $(Self::$variant(d) => PatternDetector::validate_config(d)),*
                }
            }
        }
    };
}

define_builtin_detectors! {
    // Single bar
    Doji(DojiDetector),
    SpinningTop(SpinningTopDetector),
    Hammer(HammerDetector),
    ShootingStar(ShootingStarDetector),
    Marubozu(MarubozuDetector),

    // Two bar
    Engulfing(EngulfingDetector),
    HomingPigeon(HomingPigeonDetector),
    Kicking(KickingDetector),
    Harami(HaramiDetector),
    PiercingLine(PiercingLineDetector),
    DarkCloudCover(DarkCloudCoverDetector),

    // Three bar
    ThreeWhiteSoldiers(ThreeWhiteSoldiersDetector),
    ThreeBlackCrows(ThreeBlackCrowsDetector),
    MorningStar(MorningStarDetector),
    MorningDojiStar(MorningDojiStarDetector),
    EveningStar(EveningStarDetector),
    AbandonedBaby(AbandonedBabyDetector),
    TriStar(TriStarDetector),
    AdvanceBlock(AdvanceBlockDetector),
    StickSandwich(StickSandwichDetector),

    // Four bar
    ConcealBabySwallow(ConcealBabySwallowDetector),
}

// ============================================================
// PATTERN ENGINE
// ============================================================

/// Engine configuration
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub min_confidence: Option<f64>,
}

/// Runs a set of detectors over a bar slice.
///
/// Results are produced bar-major: for each bar index, detectors run in registration
/// order (builtins first, then custom). The output is therefore sorted by
/// [`PatternMatch::index`] with ties in registration order.
pub struct PatternEngine {
    builtin: Vec<BuiltinDetector>,
    custom: Vec<Box<dyn DynPatternDetector>>,
    config: EngineConfig,
}

impl PatternEngine {
    /// Number of registered detectors
    pub fn len(&self) -> usize {
        self.builtin.len() + self.custom.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids of the registered detectors, in registration order
    pub fn pattern_ids(&self) -> Vec<PatternId> {
        self.builtin
            .iter()
            .map(BuiltinDetector::id)
            .chain(self.custom.iter().map(|d| d.id()))
            .collect()
    }

    /// Detect patterns whose window ends at a single bar index.
    pub fn scan_at<T: OHLCV>(&self, bars: &[T], index: usize) -> Vec<PatternMatch> {
        if self.custom.is_empty() {
            self.scan_at_internal(bars, &[], index)
        } else {
            let bar_refs: Vec<&dyn OHLCV> = bars.iter().map(|b| b as &dyn OHLCV).collect();
            self.scan_at_internal(bars, &bar_refs, index)
        }
    }

    /// Scan all bars and return a flat list of patterns sorted by index.
    pub fn scan<T: OHLCV>(&self, bars: &[T]) -> Vec<PatternMatch> {
        let bar_refs: Vec<&dyn OHLCV> = if self.custom.is_empty() {
            Vec::new()
        } else {
            bars.iter().map(|b| b as &dyn OHLCV).collect()
        };

        let mut results = Vec::new();
        for i in 0..bars.len() {
            results.extend(self.scan_at_internal(bars, &bar_refs, i));
        }

        tracing::trace!(
            bars = bars.len(),
            detectors = self.len(),
            matches = results.len(),
            "pattern scan complete"
        );
        results
    }

    // ===========================================
    // Internal helpers
    // ===========================================

    fn scan_at_internal<T: OHLCV>(
        &self,
        bars: &[T],
        bar_refs: &[&dyn OHLCV],
        index: usize,
    ) -> Vec<PatternMatch> {
        let mut results = Vec::new();
        if index >= bars.len() {
            return results;
        }

        // Fast path: builtin detectors (enum dispatch, no vtable)
        for detector in &self.builtin {
            if index + 1 >= detector.candles() {
                if let Some(m) = detector.detect_at(bars, index) {
                    if self.should_include(&m) {
                        results.push(m);
                    }
                }
            }
        }

        // Slow path: custom detectors (vtable)
        if !self.custom.is_empty() && !bar_refs.is_empty() {
            for detector in &self.custom {
                if index + 1 >= detector.candles() {
                    if let Some(m) = detector.detect_at(bar_refs, index) {
                        if self.should_include(&m) {
                            results.push(m);
                        }
                    }
                }
            }
        }

        results
    }

    fn should_include(&self, m: &PatternMatch) -> bool {
        match self.config.min_confidence {
            Some(min) => m.confidence >= min,
            None => true,
        }
    }

    fn validate(&self) -> Result<()> {
        for d in &self.builtin {
            d.validate_config()?;
        }
        for d in &self.custom {
            d.validate_config()?;
        }
        if let Some(min) = self.config.min_confidence {
            Ratio::new(min)?;
        }
        Ok(())
    }
}

// ============================================================
// BUILDER
// ============================================================

/// Builder for creating PatternEngine instances
#[derive(Default)]
pub struct EngineBuilder {
    builtin: Vec<BuiltinDetector>,
    custom: Vec<Box<dyn DynPatternDetector>>,
    config: EngineConfig,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add all builtin patterns with default configurations
    pub fn with_all_defaults(mut self) -> Self {
        self.builtin.extend(BuiltinDetector::all_defaults());
        self
    }

    /// Add the builtin patterns named in `ids`, keeping registration order.
    ///
    /// Ids that name no builtin pattern are skipped.
    pub fn with_selected<S: AsRef<str>>(mut self, ids: &[S]) -> Self {
        for id in ids {
            let id = id.as_ref();
            if BuiltinDetector::from_id(id).is_none() {
                tracing::debug!(pattern = id, "skipping unknown pattern id");
            }
        }
        self.builtin.extend(
            BuiltinDetector::all_defaults()
                .into_iter()
                .filter(|d| ids.iter().any(|id| id.as_ref() == d.id().as_str())),
        );
        self
    }

    /// Add a builtin detector
    #[allow(clippy::should_implement_trait)]
    pub fn add(mut self, detector: BuiltinDetector) -> Self {
        self.builtin.push(detector);
        self
    }

    /// Add with config validation
    pub fn add_checked(mut self, detector: BuiltinDetector) -> Result<Self> {
        detector.validate_config()?;
        self.builtin.push(detector);
        Ok(self)
    }

    /// Add a custom detector (slow path)
    pub fn add_custom<D: DynPatternDetector + 'static>(mut self, detector: D) -> Self {
        self.custom.push(Box::new(detector));
        self
    }

    /// Drop matches whose confidence is below `confidence`
    pub fn min_confidence(mut self, confidence: f64) -> Self {
        self.config.min_confidence = Some(confidence);
        self
    }

    /// Build the engine
    pub fn build(self) -> Result<PatternEngine> {
        let engine = PatternEngine {
            builtin: self.builtin,
            custom: self.custom,
            config: self.config,
        };
        engine.validate()?;
        Ok(engine)
    }
}

/// Runs the selected (or all) builtin detectors with default thresholds.
///
/// Matches come back sorted by `index`; matches sharing an index appear in
/// registration order. Unknown ids in `selected` are skipped, not reported.
pub fn detect_all<T: OHLCV>(bars: &[T], selected: Option<&[&str]>) -> Vec<PatternMatch> {
    let builder = match selected {
        Some(ids) => EngineBuilder::new().with_selected(ids),
        None => EngineBuilder::new().with_all_defaults(),
    };
    let engine = PatternEngine {
        builtin: builder.builtin,
        custom: Vec::new(),
        config: EngineConfig::default(),
    };
    engine.scan(bars)
}

// ============================================================
// PARALLEL SCANNING
// ============================================================

use rayon::prelude::*;

/// Result of scanning a single instrument
#[derive(Debug, Clone)]
pub struct ScanResult {
    pub symbol: String,
    pub patterns: Vec<PatternMatch>,
}

/// Parallel scanning of multiple instruments
pub fn scan_parallel<'a, T, I>(engine: &PatternEngine, instruments: I) -> Vec<ScanResult>
where
    T: OHLCV + Sync + 'a,
    I: IntoParallelIterator<Item = (&'a str, &'a [T])>,
{
    instruments
        .into_par_iter()
        .map(|(symbol, bars)| ScanResult {
            symbol: symbol.to_string(),
            patterns: engine.scan(bars),
        })
        .collect()
}

// ============================================================
// TESTS
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Test OHLCV bar
    #[derive(Debug, Clone)]
    struct Bar {
        o: f64,
        h: f64,
        l: f64,
        c: f64,
    }

    impl Bar {
        fn new(o: f64, h: f64, l: f64, c: f64) -> Self {
            Self { o, h, l, c }
        }
    }

    impl OHLCV for Bar {
        fn open(&self) -> f64 {
            self.o
        }

        fn high(&self) -> f64 {
            self.h
        }

        fn low(&self) -> f64 {
            self.l
        }

        fn close(&self) -> f64 {
            self.c
        }

        fn volume(&self) -> f64 {
            1000.0
        }
    }

    fn make_downtrend_bars() -> Vec<Bar> {
        (0..20)
            .map(|i| {
                let base = 100.0 - i as f64 * 2.0;
                Bar::new(base, base + 1.0, base - 1.0, base - 0.5)
            })
            .collect()
    }

    fn kicking_bars() -> Vec<Bar> {
        vec![
            Bar::new(10.0, 10.0, 9.0, 9.0),
            Bar::new(10.5, 12.0, 10.5, 12.0),
        ]
    }

    /// Always matches on every bar
    struct EveryBar;

    impl PatternDetector for EveryBar {
        fn id(&self) -> PatternId {
            PatternId("every_bar")
        }

        fn candles(&self) -> usize {
            1
        }

        fn confidence(&self) -> f64 {
            0.1
        }

        fn detect_at<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternMatch> {
            bars.get(index)?;
            Some(self.matched(index, Signal::Neutral, "every bar"))
        }
    }

    #[test]
    fn test_ratio_validation() {
        assert!(Ratio::new(0.0).is_ok());
        assert!(Ratio::new(1.0).is_ok());
        assert!(Ratio::new(0.5).is_ok());
        assert!(Ratio::new(-0.1).is_err());
        assert!(Ratio::new(1.1).is_err());
        assert!(Ratio::new(f64::NAN).is_err());
        assert!(Ratio::new(f64::INFINITY).is_err());
    }

    #[test]
    fn test_period_validation() {
        assert!(Period::new(1).is_ok());
        assert!(Period::new(100).is_ok());
        assert!(Period::new(0).is_err());
    }

    #[test]
    fn test_ohlcv_ext() {
        let bar = Bar::new(100.0, 110.0, 90.0, 105.0);
        assert_eq!(bar.body(), 5.0);
        assert_eq!(bar.range(), 20.0);
        assert_eq!(bar.upper_wick(), 5.0);
        assert_eq!(bar.lower_wick(), 10.0);
        assert!(bar.is_bullish());
        assert!(!bar.is_bearish());
        assert!((bar.body_ratio().unwrap() - 0.25).abs() < 0.001);
    }

    #[test]
    fn test_zero_range_ratios_are_none() {
        let bar = Bar::new(5.0, 5.0, 5.0, 5.0);
        assert_eq!(bar.body_ratio(), None);
        assert_eq!(bar.upper_wick_ratio(), None);
        assert_eq!(bar.lower_wick_ratio(), None);
    }

    #[test]
    fn test_engine_builder() {
        let engine = EngineBuilder::new().with_all_defaults().build().unwrap();
        assert_eq!(engine.len(), BuiltinDetector::all_defaults().len());
    }

    #[test]
    fn test_empty_scan() {
        let engine = EngineBuilder::new().with_all_defaults().build().unwrap();
        let bars: Vec<Bar> = vec![];
        assert!(engine.scan(&bars).is_empty());
    }

    #[test]
    fn test_pattern_ids_unique() {
        let ids: Vec<_> = BuiltinDetector::all_defaults().iter().map(|d| d.id()).collect();
        let unique: std::collections::HashSet<_> = ids.iter().collect();
        assert_eq!(ids.len(), unique.len());
    }

    #[test]
    fn test_pattern_id_from_str() {
        assert_eq!("kicking".parse::<PatternId>().unwrap(), PatternId("kicking"));
        assert_eq!(
            "Kicking".parse::<PatternId>(),
            Err(TaError::UnknownPattern("Kicking".into()))
        );
    }

    #[test]
    fn test_kicking_through_engine() {
        let engine = EngineBuilder::new()
            .add(BuiltinDetector::Kicking(KickingDetector::with_defaults()))
            .build()
            .unwrap();

        let patterns = engine.scan(&kicking_bars());
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].index, 1);
        assert_eq!(patterns[0].start_index(), 0);
        assert_eq!(patterns[0].signal, Signal::Bullish);
    }

    #[test]
    fn test_min_confidence_filter() {
        let engine = EngineBuilder::new()
            .add(BuiltinDetector::Kicking(KickingDetector::with_defaults()))
            .min_confidence(0.95)
            .build()
            .unwrap();

        assert!(engine.scan(&kicking_bars()).is_empty());
    }

    #[test]
    fn test_min_confidence_out_of_range_rejected() {
        let engine = EngineBuilder::new().with_all_defaults().min_confidence(1.5).build();
        assert!(engine.is_err());
    }

    #[test]
    fn test_with_selected_skips_unknown_ids() {
        let engine = EngineBuilder::new()
            .with_selected(&["kicking", "not_a_pattern", "doji"])
            .build()
            .unwrap();

        // Registration order, not selection order
        assert_eq!(engine.pattern_ids(), vec![PatternId("doji"), PatternId("kicking")]);
    }

    #[test]
    fn test_custom_detector_runs_after_builtins() {
        let engine = EngineBuilder::new()
            .add(BuiltinDetector::Kicking(KickingDetector::with_defaults()))
            .add_custom(EveryBar)
            .build()
            .unwrap();

        let patterns = engine.scan(&kicking_bars());
        let ids: Vec<_> = patterns.iter().map(|m| (m.index, m.pattern.as_str())).collect();
        assert_eq!(ids, vec![(0, "every_bar"), (1, "kicking"), (1, "every_bar")]);
    }

    #[test]
    fn test_scan_at_out_of_bounds() {
        let engine = EngineBuilder::new().with_all_defaults().build().unwrap();
        assert!(engine.scan_at(&kicking_bars(), 5).is_empty());
    }

    #[test]
    fn test_detect_all_matches_engine_scan() {
        let bars = make_downtrend_bars();
        let engine = EngineBuilder::new().with_all_defaults().build().unwrap();
        assert_eq!(detect_all(&bars, None), engine.scan(&bars));
    }

    #[test]
    fn test_parallel_scan() {
        let engine = EngineBuilder::new().with_all_defaults().build().unwrap();

        let bars1 = make_downtrend_bars();
        let bars2 = kicking_bars();

        let instruments: Vec<(&str, &[Bar])> = vec![("AAPL", &bars1), ("GOOGL", &bars2)];

        let results = scan_parallel(&engine, instruments);
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].symbol, "GOOGL");
        assert_eq!(results[1].patterns, engine.scan(&bars2));
    }

    #[test]
    fn test_pattern_match_serializes_as_flat_record() {
        let m = PatternMatch {
            pattern: PatternId("kicking"),
            index: 1,
            candles: 2,
            signal: Signal::Bullish,
            confidence: 0.9,
            description: "desc",
        };
        let json = serde_json::to_value(m).unwrap();
        assert_eq!(json["pattern"], "kicking");
        assert_eq!(json["signal"], "bullish");
        assert_eq!(json["candles"], 2);
    }
}
