//! Technical indicator engine
//!
//! Every indicator is a pure function from a bar slice (plus parameters) to one or
//! more [`Series`] of exactly `bars.len()` slots. A slot is `None` when the value is
//! undefined at that index.
//!
//! # Indicator families
//!
//! - **Windowed** (SMA, WMA, TMA, Bollinger, Donchian, Fractal Bands, CCI,
//!   Williams %R, ATR): `None` for indices `0..period-1`. A window that contains a
//!   non-finite input yields `None` for that window only.
//! - **Recursive** (EMA, McGinley, OBV, PSAR, ATR trailing stop, Supertrend, ADX):
//!   each value reads the previous result, so a non-finite input poisons every later
//!   index. This asymmetry with the windowed family is intentional.
//!
//! A `period` of zero or larger than the input yields an all-`None` series of the
//! right length. Nothing in this module panics on bad data.
//!
//! # Composition
//!
//! Smoothers are array-to-array combinators over `&[Option<f64>]`
//! ([`sma_values`], [`ema_values`], [`wma_values`]). Bar-level functions extract a
//! field once at the outer boundary and compose the combinators; DEMA is
//! `ema_values(ema_values(closes))`, never a rebuilt bar list.

mod config;
mod momentum;
mod moving_average;
mod trend;
mod volatility;
mod volume;

pub use config::*;
pub use momentum::*;
pub use moving_average::*;
pub use trend::*;
pub use volatility::*;
pub use volume::*;

use crate::OHLCV;

/// Index-aligned indicator output; `None` marks an undefined slot
pub type Series = Vec<Option<f64>>;

// ============================================================
// FIELD EXTRACTION
// ============================================================

/// Closes as a series; non-finite closes become `None`
pub fn closes<T: OHLCV>(bars: &[T]) -> Series {
    field(bars, |b| b.close())
}

/// Highs as a series (close when the bar has no high)
pub fn highs<T: OHLCV>(bars: &[T]) -> Series {
    field(bars, |b| b.high())
}

/// Lows as a series (close when the bar has no low)
pub fn lows<T: OHLCV>(bars: &[T]) -> Series {
    field(bars, |b| b.low())
}

pub(crate) fn field<T: OHLCV>(bars: &[T], f: impl Fn(&T) -> f64) -> Series {
    bars.iter().map(|b| finite(f(b))).collect()
}

// ============================================================
// SHARED HELPERS
// ============================================================

#[inline]
pub(crate) fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

#[inline]
pub(crate) fn valid_period(period: usize, len: usize) -> bool {
    period > 0 && period <= len
}

/// All-`None` series for parameters the indicator cannot honor
pub(crate) fn degenerate(indicator: &'static str, period: usize, len: usize) -> Series {
    tracing::debug!(indicator, period, len, "period outside 1..=len, series undefined");
    vec![None; len]
}

/// Left-to-right sum of a window, `None` if any slot is undefined
#[inline]
pub(crate) fn window_sum(window: &[Option<f64>]) -> Option<f64> {
    window.iter().try_fold(0.0, |acc, v| v.map(|x| acc + x))
}

#[inline]
pub(crate) fn window_max(window: &[Option<f64>]) -> Option<f64> {
    window
        .iter()
        .try_fold(f64::NEG_INFINITY, |acc, v| v.map(|x| acc.max(x)))
}

#[inline]
pub(crate) fn window_min(window: &[Option<f64>]) -> Option<f64> {
    window
        .iter()
        .try_fold(f64::INFINITY, |acc, v| v.map(|x| acc.min(x)))
}

/// Highest value over each trailing window
pub fn rolling_max(values: &[Option<f64>], period: usize) -> Series {
    rolling(values, period, "rolling_max", window_max)
}

/// Lowest value over each trailing window
pub fn rolling_min(values: &[Option<f64>], period: usize) -> Series {
    rolling(values, period, "rolling_min", window_min)
}

fn rolling(
    values: &[Option<f64>],
    period: usize,
    name: &'static str,
    reduce: fn(&[Option<f64>]) -> Option<f64>,
) -> Series {
    let len = values.len();
    if !valid_period(period, len) {
        return degenerate(name, period, len);
    }
    let mut out = vec![None; len];
    for i in (period - 1)..len {
        out[i] = reduce(&values[i + 1 - period..=i]);
    }
    out
}

/// Element-wise combination; `None` if either side is `None` or the result is not finite
pub(crate) fn zip_with(a: &[Option<f64>], b: &[Option<f64>], f: impl Fn(f64, f64) -> f64) -> Series {
    a.iter()
        .zip(b)
        .map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) => finite(f(*x, *y)),
            _ => None,
        })
        .collect()
}

/// `out[i] = series[i - shift]`; indices before the shift keep their own value
pub(crate) fn shift_forward(series: &[Option<f64>], shift: usize) -> Series {
    (0..series.len())
        .map(|i| if i >= shift { series[i - shift] } else { series[i] })
        .collect()
}

/// `out[i] = series[i + shift]`; indices whose source is past the end keep their own value
pub(crate) fn shift_backward(series: &[Option<f64>], shift: usize) -> Series {
    let len = series.len();
    (0..len)
        .map(|i| {
            if shift < len - i {
                series[i + shift]
            } else {
                series[i]
            }
        })
        .collect()
}
