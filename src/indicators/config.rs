//! Indicator configuration records and the serializable dispatch layer
//!
//! Each indicator has an explicit config record with documented defaults. Records
//! are gathered into [`IndicatorConfig`], an internally tagged enum that
//! deserializes from `{"indicator": "bollinger", "period": 20, "std_dev": 2.0}` and
//! computes through static dispatch.
//!
//! Validation is opt-in: [`IndicatorConfig::validate`] reports bad parameters as
//! [`TaError`], while [`IndicatorConfig::compute`] never fails and yields undefined
//! series instead.

use std::collections::HashMap;
use std::str::FromStr;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::*;
use crate::params::{get_factor, get_period, get_shift, ParamMeta, ParameterizedIndicator};
use crate::{Result, TaError, OHLCV};

// ============================================================
// INDICATOR TRAIT AND OUTPUT
// ============================================================

/// Configured indicator that computes over a bar slice
pub trait Indicator {
    /// Stable snake_case key
    const NAME: &'static str;

    fn compute<T: OHLCV>(&self, bars: &[T]) -> IndicatorOutput;

    /// Reject parameters the computation cannot honor
    fn validate(&self) -> Result<()>;
}

/// Output of a configured indicator; serializes as the bare series or bundle
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum IndicatorOutput {
    Series(Series),
    Bands(Bands),
    Macd(MacdOutput),
    Supertrend(SupertrendOutput),
    Adx(AdxOutput),
    Ichimoku(IchimokuOutput),
    Alligator(AlligatorOutput),
    Stochastic(StochasticOutput),
}

impl IndicatorOutput {
    /// The single series, for one-line indicators
    pub fn as_series(&self) -> Option<&Series> {
        match self {
            IndicatorOutput::Series(s) => Some(s),
            _ => None,
        }
    }

    /// Length shared by every series in the output
    pub fn len(&self) -> usize {
        match self {
            IndicatorOutput::Series(s) => s.len(),
            IndicatorOutput::Bands(b) => b.len(),
            IndicatorOutput::Macd(m) => m.macd.len(),
            IndicatorOutput::Supertrend(s) => s.supertrend.len(),
            IndicatorOutput::Adx(a) => a.adx.len(),
            IndicatorOutput::Ichimoku(i) => i.tenkan.len(),
            IndicatorOutput::Alligator(a) => a.jaw.len(),
            IndicatorOutput::Stochastic(s) => s.k.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================
// VALIDATION HELPERS
// ============================================================

fn check_period(indicator: &str, field: &str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(TaError::InvalidConfig(format!("{indicator}: {field} must be > 0")));
    }
    Ok(())
}

fn check_factor(indicator: &str, field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(TaError::InvalidConfig(format!(
            "{indicator}: {field} must be finite and >= 0, got {value}"
        )));
    }
    Ok(())
}

// ============================================================
// SINGLE-PERIOD RECORDS
// ============================================================

macro_rules! period_config {
    ($(#[$doc:meta])* $config:ident, $name:literal, $default:expr, $func:ident => $variant:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(default)]
        pub struct $config {
            pub period: usize,
        }

        impl Default for $config {
            fn default() -> Self {
                Self { period: $default }
            }
        }

        impl Indicator for $config {
            const NAME: &'static str = $name;

            fn compute<T: OHLCV>(&self, bars: &[T]) -> IndicatorOutput {
                IndicatorOutput::$variant($func(bars, self.period))
            }

            fn validate(&self) -> Result<()> {
                check_period(Self::NAME, "period", self.period)
            }
        }

        impl ParameterizedIndicator for $config {
            fn param_meta() -> &'static [ParamMeta] {
                const META: &[ParamMeta] = &[ParamMeta::period(
                    "period",
                    $default as f64,
                    (2.0, 100.0, 1.0),
                    "Lookback window in bars",
                )];
                META
            }

            fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
                Ok(Self { period: get_period(params, "period", $default)? })
            }

            fn indicator_name() -> &'static str {
                $name
            }
        }
    };
}

period_config!(
    /// Simple moving average of closes (period 20)
    SmaConfig, "sma", 20, sma => Series
);
period_config!(
    /// Exponential moving average of closes (period 20)
    EmaConfig, "ema", 20, ema => Series
);
period_config!(WmaConfig, "wma", 20, wma => Series);
period_config!(DemaConfig, "dema", 20, dema => Series);
period_config!(TemaConfig, "tema", 20, tema => Series);
period_config!(TmaConfig, "tma", 20, tma => Series);
period_config!(HmaConfig, "hma", 20, hma => Series);
period_config!(McGinleyConfig, "mcginley", 14, mcginley => Series);
period_config!(
    /// Relative Strength Index (period 14)
    RsiConfig, "rsi", 14, rsi => Series
);
period_config!(
    /// Average True Range as SMA of True Range (period 14)
    AtrConfig, "atr", 14, atr => Series
);
period_config!(CciConfig, "cci", 20, cci => Series);
period_config!(WilliamsRConfig, "williams_r", 14, williams_r => Series);
period_config!(RocConfig, "roc", 12, roc => Series);
period_config!(DonchianConfig, "donchian", 20, donchian => Bands);
period_config!(FractalBandsConfig, "fractal_bands", 20, fractal_bands => Bands);
period_config!(
    /// Average Directional Index with +DI/-DI (period 14)
    AdxConfig, "adx", 14, adx => Adx
);

// ============================================================
// PARAMETERLESS RECORDS
// ============================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrueRangeConfig {}

impl Indicator for TrueRangeConfig {
    const NAME: &'static str = "true_range";

    fn compute<T: OHLCV>(&self, bars: &[T]) -> IndicatorOutput {
        IndicatorOutput::Series(true_range(bars))
    }

    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

impl ParameterizedIndicator for TrueRangeConfig {
    fn param_meta() -> &'static [ParamMeta] {
        &[]
    }

    fn with_params(_params: &HashMap<&str, f64>) -> Result<Self> {
        Ok(Self {})
    }

    fn indicator_name() -> &'static str {
        Self::NAME
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObvConfig {}

impl Indicator for ObvConfig {
    const NAME: &'static str = "obv";

    fn compute<T: OHLCV>(&self, bars: &[T]) -> IndicatorOutput {
        IndicatorOutput::Series(obv(bars))
    }

    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

impl ParameterizedIndicator for ObvConfig {
    fn param_meta() -> &'static [ParamMeta] {
        &[]
    }

    fn with_params(_params: &HashMap<&str, f64>) -> Result<Self> {
        Ok(Self {})
    }

    fn indicator_name() -> &'static str {
        Self::NAME
    }
}

// ============================================================
// MULTI-PARAMETER RECORDS
// ============================================================

/// Bollinger Bands: SMA(`period`) ± `std_dev` population standard deviations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BollingerConfig {
    pub period: usize,
    pub std_dev: f64,
}

impl Default for BollingerConfig {
    fn default() -> Self {
        Self { period: 20, std_dev: 2.0 }
    }
}

impl Indicator for BollingerConfig {
    const NAME: &'static str = "bollinger";

    fn compute<T: OHLCV>(&self, bars: &[T]) -> IndicatorOutput {
        IndicatorOutput::Bands(bollinger(bars, self.period, self.std_dev))
    }

    fn validate(&self) -> Result<()> {
        check_period(Self::NAME, "period", self.period)?;
        check_factor(Self::NAME, "std_dev", self.std_dev)
    }
}

impl ParameterizedIndicator for BollingerConfig {
    fn param_meta() -> &'static [ParamMeta] {
        const META: &[ParamMeta] = &[
            ParamMeta::period("period", 20.0, (5.0, 50.0, 5.0), "SMA window"),
            ParamMeta::factor("std_dev", 2.0, (1.0, 3.0, 0.5), "Band half-width in standard deviations"),
        ];
        META
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        let d = Self::default();
        Ok(Self {
            period: get_period(params, "period", d.period)?,
            std_dev: get_factor(params, "std_dev", d.std_dev)?,
        })
    }

    fn indicator_name() -> &'static str {
        Self::NAME
    }
}

/// MACD line from EMA(`fast`) - EMA(`slow`), with an EMA(`signal`) signal line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacdConfig {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

impl Default for MacdConfig {
    fn default() -> Self {
        Self { fast: 12, slow: 26, signal: 9 }
    }
}

impl Indicator for MacdConfig {
    const NAME: &'static str = "macd";

    fn compute<T: OHLCV>(&self, bars: &[T]) -> IndicatorOutput {
        IndicatorOutput::Macd(macd(bars, self.fast, self.slow, self.signal))
    }

    fn validate(&self) -> Result<()> {
        check_period(Self::NAME, "fast", self.fast)?;
        check_period(Self::NAME, "slow", self.slow)?;
        check_period(Self::NAME, "signal", self.signal)?;
        if self.fast >= self.slow {
            return Err(TaError::InvalidConfig(format!(
                "macd: fast ({}) must be shorter than slow ({})",
                self.fast, self.slow
            )));
        }
        Ok(())
    }
}

impl ParameterizedIndicator for MacdConfig {
    fn param_meta() -> &'static [ParamMeta] {
        const META: &[ParamMeta] = &[
            ParamMeta::period("fast", 12.0, (5.0, 20.0, 1.0), "Fast EMA period"),
            ParamMeta::period("slow", 26.0, (20.0, 40.0, 2.0), "Slow EMA period"),
            ParamMeta::period("signal", 9.0, (5.0, 15.0, 1.0), "Signal EMA period"),
        ];
        META
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        let d = Self::default();
        Ok(Self {
            fast: get_period(params, "fast", d.fast)?,
            slow: get_period(params, "slow", d.slow)?,
            signal: get_period(params, "signal", d.signal)?,
        })
    }

    fn indicator_name() -> &'static str {
        Self::NAME
    }
}

/// Keltner Channels: EMA(`period`) ± `multiplier` * ATR(`atr_period`)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeltnerConfig {
    pub period: usize,
    pub multiplier: f64,
    pub atr_period: usize,
}

impl Default for KeltnerConfig {
    fn default() -> Self {
        Self { period: 20, multiplier: 2.0, atr_period: 10 }
    }
}

impl Indicator for KeltnerConfig {
    const NAME: &'static str = "keltner";

    fn compute<T: OHLCV>(&self, bars: &[T]) -> IndicatorOutput {
        IndicatorOutput::Bands(keltner(bars, self.period, self.multiplier, self.atr_period))
    }

    fn validate(&self) -> Result<()> {
        check_period(Self::NAME, "period", self.period)?;
        check_period(Self::NAME, "atr_period", self.atr_period)?;
        check_factor(Self::NAME, "multiplier", self.multiplier)
    }
}

impl ParameterizedIndicator for KeltnerConfig {
    fn param_meta() -> &'static [ParamMeta] {
        const META: &[ParamMeta] = &[
            ParamMeta::period("period", 20.0, (10.0, 50.0, 5.0), "EMA window"),
            ParamMeta::factor("multiplier", 2.0, (1.0, 3.0, 0.5), "ATR multiple"),
            ParamMeta::period("atr_period", 10.0, (5.0, 30.0, 5.0), "ATR window"),
        ];
        META
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        let d = Self::default();
        Ok(Self {
            period: get_period(params, "period", d.period)?,
            multiplier: get_factor(params, "multiplier", d.multiplier)?,
            atr_period: get_period(params, "atr_period", d.atr_period)?,
        })
    }

    fn indicator_name() -> &'static str {
        Self::NAME
    }
}

/// Supertrend over ATR(`period`) bands
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupertrendConfig {
    pub period: usize,
    pub multiplier: f64,
}

impl Default for SupertrendConfig {
    fn default() -> Self {
        Self { period: 10, multiplier: 3.0 }
    }
}

impl Indicator for SupertrendConfig {
    const NAME: &'static str = "supertrend";

    fn compute<T: OHLCV>(&self, bars: &[T]) -> IndicatorOutput {
        IndicatorOutput::Supertrend(supertrend(bars, self.period, self.multiplier))
    }

    fn validate(&self) -> Result<()> {
        check_period(Self::NAME, "period", self.period)?;
        check_factor(Self::NAME, "multiplier", self.multiplier)
    }
}

impl ParameterizedIndicator for SupertrendConfig {
    fn param_meta() -> &'static [ParamMeta] {
        const META: &[ParamMeta] = &[
            ParamMeta::period("period", 10.0, (5.0, 30.0, 1.0), "ATR window"),
            ParamMeta::factor("multiplier", 3.0, (1.0, 5.0, 0.5), "ATR multiple"),
        ];
        META
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        let d = Self::default();
        Ok(Self {
            period: get_period(params, "period", d.period)?,
            multiplier: get_factor(params, "multiplier", d.multiplier)?,
        })
    }

    fn indicator_name() -> &'static str {
        Self::NAME
    }
}

/// ATR trailing stop with `multiplier` * ATR(`period`) distance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtrTrailingStopConfig {
    pub period: usize,
    pub multiplier: f64,
}

impl Default for AtrTrailingStopConfig {
    fn default() -> Self {
        Self { period: 14, multiplier: 3.0 }
    }
}

impl Indicator for AtrTrailingStopConfig {
    const NAME: &'static str = "atr_trailing_stop";

    fn compute<T: OHLCV>(&self, bars: &[T]) -> IndicatorOutput {
        IndicatorOutput::Series(atr_trailing_stop(bars, self.period, self.multiplier))
    }

    fn validate(&self) -> Result<()> {
        check_period(Self::NAME, "period", self.period)?;
        check_factor(Self::NAME, "multiplier", self.multiplier)
    }
}

impl ParameterizedIndicator for AtrTrailingStopConfig {
    fn param_meta() -> &'static [ParamMeta] {
        const META: &[ParamMeta] = &[
            ParamMeta::period("period", 14.0, (5.0, 30.0, 1.0), "ATR window"),
            ParamMeta::factor("multiplier", 3.0, (1.0, 5.0, 0.5), "ATR multiple"),
        ];
        META
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        let d = Self::default();
        Ok(Self {
            period: get_period(params, "period", d.period)?,
            multiplier: get_factor(params, "multiplier", d.multiplier)?,
        })
    }

    fn indicator_name() -> &'static str {
        Self::NAME
    }
}

/// Parabolic SAR with step `acceleration` capped at `maximum`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PsarConfig {
    pub acceleration: f64,
    pub maximum: f64,
}

impl Default for PsarConfig {
    fn default() -> Self {
        Self { acceleration: 0.02, maximum: 0.2 }
    }
}

impl Indicator for PsarConfig {
    const NAME: &'static str = "psar";

    fn compute<T: OHLCV>(&self, bars: &[T]) -> IndicatorOutput {
        IndicatorOutput::Series(psar(bars, self.acceleration, self.maximum))
    }

    fn validate(&self) -> Result<()> {
        check_factor(Self::NAME, "acceleration", self.acceleration)?;
        check_factor(Self::NAME, "maximum", self.maximum)?;
        if self.acceleration == 0.0 {
            return Err(TaError::InvalidConfig("psar: acceleration must be > 0".into()));
        }
        if self.acceleration > self.maximum {
            return Err(TaError::InvalidConfig(format!(
                "psar: acceleration ({}) exceeds maximum ({})",
                self.acceleration, self.maximum
            )));
        }
        Ok(())
    }
}

impl ParameterizedIndicator for PsarConfig {
    fn param_meta() -> &'static [ParamMeta] {
        const META: &[ParamMeta] = &[
            ParamMeta::factor("acceleration", 0.02, (0.01, 0.05, 0.01), "Acceleration step"),
            ParamMeta::factor("maximum", 0.2, (0.1, 0.4, 0.05), "Acceleration cap"),
        ];
        META
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        let d = Self::default();
        Ok(Self {
            acceleration: get_factor(params, "acceleration", d.acceleration)?,
            maximum: get_factor(params, "maximum", d.maximum)?,
        })
    }

    fn indicator_name() -> &'static str {
        Self::NAME
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IchimokuConfig {
    pub tenkan: usize,
    pub kijun: usize,
    pub senkou_b: usize,
    pub displacement: usize,
}

impl Default for IchimokuConfig {
    fn default() -> Self {
        Self { tenkan: 9, kijun: 26, senkou_b: 52, displacement: 26 }
    }
}

impl Indicator for IchimokuConfig {
    const NAME: &'static str = "ichimoku";

    fn compute<T: OHLCV>(&self, bars: &[T]) -> IndicatorOutput {
        IndicatorOutput::Ichimoku(ichimoku(bars, self.tenkan, self.kijun, self.senkou_b, self.displacement))
    }

    fn validate(&self) -> Result<()> {
        check_period(Self::NAME, "tenkan", self.tenkan)?;
        check_period(Self::NAME, "kijun", self.kijun)?;
        check_period(Self::NAME, "senkou_b", self.senkou_b)
    }
}

impl ParameterizedIndicator for IchimokuConfig {
    fn param_meta() -> &'static [ParamMeta] {
        const META: &[ParamMeta] = &[
            ParamMeta::period("tenkan", 9.0, (5.0, 20.0, 1.0), "Conversion line window"),
            ParamMeta::period("kijun", 26.0, (20.0, 40.0, 2.0), "Base line window"),
            ParamMeta::period("senkou_b", 52.0, (40.0, 80.0, 4.0), "Leading span B window"),
            ParamMeta::shift("displacement", 26.0, (0.0, 40.0, 2.0), "Forward shift of the spans"),
        ];
        META
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        let d = Self::default();
        Ok(Self {
            tenkan: get_period(params, "tenkan", d.tenkan)?,
            kijun: get_period(params, "kijun", d.kijun)?,
            senkou_b: get_period(params, "senkou_b", d.senkou_b)?,
            displacement: get_shift(params, "displacement", d.displacement)?,
        })
    }

    fn indicator_name() -> &'static str {
        Self::NAME
    }
}

/// Williams Alligator periods and forward shifts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlligatorConfig {
    pub jaw_period: usize,
    pub jaw_shift: usize,
    pub teeth_period: usize,
    pub teeth_shift: usize,
    pub lips_period: usize,
    pub lips_shift: usize,
}

impl Default for AlligatorConfig {
    fn default() -> Self {
        Self {
            jaw_period: 13,
            jaw_shift: 8,
            teeth_period: 8,
            teeth_shift: 5,
            lips_period: 5,
            lips_shift: 3,
        }
    }
}

impl Indicator for AlligatorConfig {
    const NAME: &'static str = "alligator";

    fn compute<T: OHLCV>(&self, bars: &[T]) -> IndicatorOutput {
        IndicatorOutput::Alligator(alligator(
            bars,
            self.jaw_period,
            self.jaw_shift,
            self.teeth_period,
            self.teeth_shift,
            self.lips_period,
            self.lips_shift,
        ))
    }

    fn validate(&self) -> Result<()> {
        check_period(Self::NAME, "jaw_period", self.jaw_period)?;
        check_period(Self::NAME, "teeth_period", self.teeth_period)?;
        check_period(Self::NAME, "lips_period", self.lips_period)
    }
}

impl ParameterizedIndicator for AlligatorConfig {
    fn param_meta() -> &'static [ParamMeta] {
        const META: &[ParamMeta] = &[
            ParamMeta::period("jaw_period", 13.0, (8.0, 21.0, 1.0), "Jaw smoothing period"),
            ParamMeta::shift("jaw_shift", 8.0, (0.0, 13.0, 1.0), "Jaw forward shift"),
            ParamMeta::period("teeth_period", 8.0, (5.0, 13.0, 1.0), "Teeth smoothing period"),
            ParamMeta::shift("teeth_shift", 5.0, (0.0, 8.0, 1.0), "Teeth forward shift"),
            ParamMeta::period("lips_period", 5.0, (3.0, 8.0, 1.0), "Lips smoothing period"),
            ParamMeta::shift("lips_shift", 3.0, (0.0, 5.0, 1.0), "Lips forward shift"),
        ];
        META
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        let d = Self::default();
        Ok(Self {
            jaw_period: get_period(params, "jaw_period", d.jaw_period)?,
            jaw_shift: get_shift(params, "jaw_shift", d.jaw_shift)?,
            teeth_period: get_period(params, "teeth_period", d.teeth_period)?,
            teeth_shift: get_shift(params, "teeth_shift", d.teeth_shift)?,
            lips_period: get_period(params, "lips_period", d.lips_period)?,
            lips_shift: get_shift(params, "lips_shift", d.lips_shift)?,
        })
    }

    fn indicator_name() -> &'static str {
        Self::NAME
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StochasticConfig {
    pub k_period: usize,
    pub d_period: usize,
}

impl Default for StochasticConfig {
    fn default() -> Self {
        Self { k_period: 14, d_period: 3 }
    }
}

impl Indicator for StochasticConfig {
    const NAME: &'static str = "stochastic";

    fn compute<T: OHLCV>(&self, bars: &[T]) -> IndicatorOutput {
        IndicatorOutput::Stochastic(stochastic(bars, self.k_period, self.d_period))
    }

    fn validate(&self) -> Result<()> {
        check_period(Self::NAME, "k_period", self.k_period)?;
        check_period(Self::NAME, "d_period", self.d_period)
    }
}

impl ParameterizedIndicator for StochasticConfig {
    fn param_meta() -> &'static [ParamMeta] {
        const META: &[ParamMeta] = &[
            ParamMeta::period("k_period", 14.0, (5.0, 21.0, 1.0), "%K window"),
            ParamMeta::period("d_period", 3.0, (2.0, 5.0, 1.0), "%D smoothing"),
        ];
        META
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        let d = Self::default();
        Ok(Self {
            k_period: get_period(params, "k_period", d.k_period)?,
            d_period: get_period(params, "d_period", d.d_period)?,
        })
    }

    fn indicator_name() -> &'static str {
        Self::NAME
    }
}

/// VWAP, cumulative unless `reset_period` restarts it every N bars
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VwapConfig {
    pub reset_period: Option<usize>,
}

impl Indicator for VwapConfig {
    const NAME: &'static str = "vwap";

    fn compute<T: OHLCV>(&self, bars: &[T]) -> IndicatorOutput {
        IndicatorOutput::Series(vwap(bars, self.reset_period))
    }

    fn validate(&self) -> Result<()> {
        match self.reset_period {
            Some(p) => check_period(Self::NAME, "reset_period", p),
            None => Ok(()),
        }
    }
}

impl ParameterizedIndicator for VwapConfig {
    fn param_meta() -> &'static [ParamMeta] {
        const META: &[ParamMeta] =
            &[ParamMeta::shift("reset_period", 0.0, (0.0, 390.0, 30.0), "Bars per session, 0 for cumulative")];
        META
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        let reset = get_shift(params, "reset_period", 0)?;
        Ok(Self { reset_period: (reset > 0).then_some(reset) })
    }

    fn indicator_name() -> &'static str {
        Self::NAME
    }
}

// ============================================================
// DISPATCH
// ============================================================

macro_rules! define_indicators {
    ($($variant:ident($config:ident) => $name:literal),* $(,)?) => {
        /// Any indicator with its parameters, tagged by `"indicator"`
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(tag = "indicator")]
        pub enum IndicatorConfig {
            $(
                #[serde(rename = $name)]
                $variant($config),
            )*
        }

        /// Indicator keys without parameters
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum IndicatorKind {
            $(
                #[serde(rename = $name)]
                $variant,
            )*
        }

        impl IndicatorKind {
            /// Every indicator in registration order
            pub const ALL: &'static [IndicatorKind] = &[$(IndicatorKind::$variant,)*];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(IndicatorKind::$variant => $name,)*
                }
            }

            pub fn default_config(self) -> IndicatorConfig {
                match self {
                    $(IndicatorKind::$variant => IndicatorConfig::$variant($config::default()),)*
                }
            }

            /// Build a config from a parameter map, defaults for missing keys
            pub fn with_params(self, params: &HashMap<&str, f64>) -> Result<IndicatorConfig> {
                match self {
                    $(IndicatorKind::$variant => Ok(IndicatorConfig::$variant($config::with_params(params)?)),)*
                }
            }

            pub fn param_meta(self) -> &'static [ParamMeta] {
                match self {
                    $(IndicatorKind::$variant => $config::param_meta(),)*
                }
            }
        }

        impl IndicatorConfig {
            pub fn kind(&self) -> IndicatorKind {
                match self {
                    $(IndicatorConfig::$variant(_) => IndicatorKind::$variant,)*
                }
            }

            /// Never fails; parameters the computation cannot honor yield undefined series
            pub fn compute<T: OHLCV>(&self, bars: &[T]) -> IndicatorOutput {
                match self {
                    $(IndicatorConfig::$variant(c) => c.compute(bars),)*
                }
            }

            pub fn validate(&self) -> Result<()> {
                match self {
                    $(IndicatorConfig::$variant(c) => c.validate(),)*
                }
            }
        }
    };
}

define_indicators! {
    Sma(SmaConfig) => "sma",
    Ema(EmaConfig) => "ema",
    Wma(WmaConfig) => "wma",
    Dema(DemaConfig) => "dema",
    Tema(TemaConfig) => "tema",
    Tma(TmaConfig) => "tma",
    Hma(HmaConfig) => "hma",
    McGinley(McGinleyConfig) => "mcginley",
    Bollinger(BollingerConfig) => "bollinger",
    TrueRange(TrueRangeConfig) => "true_range",
    Atr(AtrConfig) => "atr",
    Keltner(KeltnerConfig) => "keltner",
    Donchian(DonchianConfig) => "donchian",
    FractalBands(FractalBandsConfig) => "fractal_bands",
    Supertrend(SupertrendConfig) => "supertrend",
    AtrTrailingStop(AtrTrailingStopConfig) => "atr_trailing_stop",
    Psar(PsarConfig) => "psar",
    Rsi(RsiConfig) => "rsi",
    Macd(MacdConfig) => "macd",
    Adx(AdxConfig) => "adx",
    Ichimoku(IchimokuConfig) => "ichimoku",
    Alligator(AlligatorConfig) => "alligator",
    Cci(CciConfig) => "cci",
    WilliamsR(WilliamsRConfig) => "williams_r",
    Stochastic(StochasticConfig) => "stochastic",
    Roc(RocConfig) => "roc",
    Obv(ObvConfig) => "obv",
    Vwap(VwapConfig) => "vwap",
}

impl IndicatorConfig {
    pub fn name(&self) -> &'static str {
        self.kind().as_str()
    }
}

impl std::fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndicatorKind {
    type Err = TaError;

    fn from_str(s: &str) -> Result<Self> {
        IndicatorKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| TaError::UnknownIndicator(s.to_string()))
    }
}

// ============================================================
// BATCH
// ============================================================

/// Compute several indicators over the same bars in parallel.
///
/// Output order matches `configs`.
pub fn compute_batch<T: OHLCV + Sync>(bars: &[T], configs: &[IndicatorConfig]) -> Vec<IndicatorOutput> {
    tracing::debug!(bars = bars.len(), indicators = configs.len(), "computing indicator batch");
    configs.par_iter().map(|config| config.compute(bars)).collect()
}
