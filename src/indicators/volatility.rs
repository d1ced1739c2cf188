//! Volatility indicators and bands: True Range, ATR, Bollinger, Keltner, Donchian,
//! Fractal Bands, Supertrend and the ATR trailing stop.

use serde::Serialize;

use super::{
    closes, degenerate, ema, finite, highs, lows, rolling_max, rolling_min, sma_values,
    valid_period, zip_with, Series,
};
use crate::{OHLCVExt, OHLCV};

/// Upper/middle/lower band bundle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bands {
    pub upper: Series,
    pub middle: Series,
    pub lower: Series,
}

impl Bands {
    pub(crate) fn undefined(len: usize) -> Self {
        Self {
            upper: vec![None; len],
            middle: vec![None; len],
            lower: vec![None; len],
        }
    }

    pub fn len(&self) -> usize {
        self.middle.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middle.is_empty()
    }
}

/// Supertrend line plus trend direction (`1.0` up, `-1.0` down)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupertrendOutput {
    pub supertrend: Series,
    pub direction: Series,
}

// ============================================================
// TRUE RANGE / ATR
// ============================================================

/// True Range per bar.
///
/// `TR[0] = high - low`; afterwards
/// `max(high - low, |high - prevClose|, |low - prevClose|)`.
pub fn true_range<T: OHLCV>(bars: &[T]) -> Series {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let hl = bar.high() - bar.low();
            if i == 0 {
                return finite(hl);
            }
            let prev_close = bars[i - 1].close();
            let hc = (bar.high() - prev_close).abs();
            let lc = (bar.low() - prev_close).abs();
            if hl.is_nan() || hc.is_nan() || lc.is_nan() {
                return None;
            }
            finite(hl.max(hc).max(lc))
        })
        .collect()
}

/// Average True Range: plain SMA of the True Range series.
///
/// Not Wilder smoothing. Defined from `period - 1`.
pub fn atr<T: OHLCV>(bars: &[T], period: usize) -> Series {
    sma_values(&true_range(bars), period)
}

// ============================================================
// BANDS
// ============================================================

/// Bollinger Bands: SMA middle, `std_dev` population standard deviations either side.
pub fn bollinger<T: OHLCV>(bars: &[T], period: usize, std_dev: f64) -> Bands {
    let len = bars.len();
    if !(std_dev.is_finite() && std_dev >= 0.0) {
        tracing::debug!(indicator = "bollinger", std_dev, "invalid band width");
        return Bands::undefined(len);
    }

    let values = closes(bars);
    let middle = sma_values(&values, period);
    let mut bands = Bands::undefined(len);

    for (i, mean) in middle.iter().enumerate() {
        let Some(mean) = *mean else { continue };
        let window = &values[i + 1 - period..=i];
        let variance = window
            .iter()
            .flatten()
            .map(|x| (x - mean) * (x - mean))
            .sum::<f64>()
            / period as f64;
        let half_width = std_dev * variance.sqrt();

        let (Some(upper), Some(lower)) = (finite(mean + half_width), finite(mean - half_width)) else {
            continue;
        };
        bands.upper[i] = Some(upper);
        bands.middle[i] = Some(mean);
        bands.lower[i] = Some(lower);
    }
    bands
}

/// Keltner Channels: EMA(`period`) middle, `multiplier * ATR(atr_period)` either side.
pub fn keltner<T: OHLCV>(bars: &[T], period: usize, multiplier: f64, atr_period: usize) -> Bands {
    let len = bars.len();
    if !multiplier.is_finite() {
        tracing::debug!(indicator = "keltner", multiplier, "invalid multiplier");
        return Bands::undefined(len);
    }

    let middle = ema(bars, period);
    let atr = atr(bars, atr_period);
    let upper = zip_with(&middle, &atr, |m, a| m + multiplier * a);
    let lower = zip_with(&middle, &atr, |m, a| m - multiplier * a);

    Bands { upper, middle, lower }
}

/// Donchian Channels: highest high, lowest low and their midpoint over `period`.
pub fn donchian<T: OHLCV>(bars: &[T], period: usize) -> Bands {
    let upper = rolling_max(&highs(bars), period);
    let lower = rolling_min(&lows(bars), period);
    let middle = zip_with(&upper, &lower, |u, l| (u + l) / 2.0);
    Bands { upper, middle, lower }
}

/// Fractal Bands over a trailing window.
///
/// The upper band is the high of the most recent 3-bar fractal high inside the
/// window (a bar whose high exceeds both neighbours, with both neighbours in the
/// window); without one it is the window's highest high. The lower band mirrors this
/// on lows. Middle is the mean of the two.
pub fn fractal_bands<T: OHLCV>(bars: &[T], period: usize) -> Bands {
    let len = bars.len();
    if !valid_period(period, len) {
        degenerate("fractal_bands", period, len);
        return Bands::undefined(len);
    }

    let highs = highs(bars);
    let lows = lows(bars);
    let max = rolling_max(&highs, period);
    let min = rolling_min(&lows, period);
    let mut bands = Bands::undefined(len);

    for i in (period - 1)..len {
        let (Some(max), Some(min)) = (max[i], min[i]) else { continue };
        let start = i + 1 - period;
        // Window fully defined here, so every slot unwraps
        let h = |j: usize| highs[j].unwrap_or(f64::NAN);
        let l = |j: usize| lows[j].unwrap_or(f64::NAN);

        let upper = (start + 1..i)
            .rev()
            .find(|&j| h(j) > h(j - 1) && h(j) > h(j + 1))
            .map_or(max, h);
        let lower = (start + 1..i)
            .rev()
            .find(|&j| l(j) < l(j - 1) && l(j) < l(j + 1))
            .map_or(min, l);

        bands.upper[i] = Some(upper);
        bands.lower[i] = Some(lower);
        bands.middle[i] = finite((upper + lower) / 2.0);
    }
    bands
}

// ============================================================
// TRAILING STOPS
// ============================================================

/// Supertrend over ATR(`period`) bands around the median price.
///
/// Undefined before `index == period`; the first value is the upper band with the
/// trend down. While the trend is up the line ratchets to `max(prev, lower)` and
/// flips to the upper band once close drops below it; while down it ratchets to
/// `min(prev, upper)` and flips to the lower band once close rises above it.
/// A non-finite input poisons every later value.
pub fn supertrend<T: OHLCV>(bars: &[T], period: usize, multiplier: f64) -> SupertrendOutput {
    let len = bars.len();
    let mut out = SupertrendOutput {
        supertrend: vec![None; len],
        direction: vec![None; len],
    };
    if !valid_period(period, len) || !multiplier.is_finite() {
        degenerate("supertrend", period, len);
        return out;
    }

    let atr = atr(bars, period);
    let mut st = f64::NAN;
    let mut trend_up = false;

    for i in period..len {
        let bar = &bars[i];
        let mid = bar.median_price();
        let band = multiplier * atr[i].unwrap_or(f64::NAN);
        let upper = mid + band;
        let lower = mid - band;
        let close = bar.close();

        if i == period {
            st = upper;
            trend_up = false;
        } else if !(st.is_finite() && upper.is_finite() && lower.is_finite() && close.is_finite()) {
            st = f64::NAN;
        } else if trend_up {
            st = st.max(lower);
            if close < st {
                trend_up = false;
                st = upper;
            }
        } else {
            st = st.min(upper);
            if close > st {
                trend_up = true;
                st = lower;
            }
        }

        out.supertrend[i] = finite(st);
        out.direction[i] = out.supertrend[i].map(|_| if trend_up { 1.0 } else { -1.0 });
    }
    out
}

/// ATR trailing stop.
///
/// Recursive and seeded at bar 0 with `close - loss`, where
/// `loss = multiplier * ATR(period)`. Before ATR is defined the loss uses the
/// running mean of True Range. Each step either ratchets the stop in the direction
/// of the held position or flips it to the other side of price.
pub fn atr_trailing_stop<T: OHLCV>(bars: &[T], period: usize, multiplier: f64) -> Series {
    let len = bars.len();
    if !valid_period(period, len) || !multiplier.is_finite() {
        return degenerate("atr_trailing_stop", period, len);
    }

    let tr = true_range(bars);
    let atr = sma_values(&tr, period);
    let mut warmup_sum = 0.0;
    let mut stop = f64::NAN;
    let mut out = Vec::with_capacity(len);

    for i in 0..len {
        let range = if i + 1 < period {
            warmup_sum += tr[i].unwrap_or(f64::NAN);
            warmup_sum / (i + 1) as f64
        } else {
            atr[i].unwrap_or(f64::NAN)
        };
        let loss = multiplier * range;
        let close = bars[i].close();

        stop = if i == 0 {
            close - loss
        } else {
            let prev_close = bars[i - 1].close();
            if !(stop.is_finite() && loss.is_finite() && close.is_finite() && prev_close.is_finite()) {
                f64::NAN
            } else if close > stop && prev_close > stop {
                stop.max(close - loss)
            } else if close < stop && prev_close < stop {
                stop.min(close + loss)
            } else if close > stop {
                close - loss
            } else {
                close + loss
            }
        };
        out.push(finite(stop));
    }
    out
}
