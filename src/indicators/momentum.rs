//! Momentum oscillators: RSI, MACD, CCI, Williams %R, Stochastic, ROC

use serde::Serialize;

use super::{
    closes, degenerate, ema, ema_values, field, finite, highs, lows, rolling_max, rolling_min,
    sma_values, valid_period, zip_with, Series,
};
use crate::{OHLCVExt, OHLCV};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MacdOutput {
    pub macd: Series,
    pub signal: Series,
    pub histogram: Series,
}

/// Stochastic oscillator lines
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StochasticOutput {
    pub k: Series,
    pub d: Series,
}

/// Relative Strength Index over simple averages of gains and losses.
///
/// Defined from `index == period`, using the `period` close-to-close changes that
/// end at `index`. With no losses in the window the value is `100`.
pub fn rsi<T: OHLCV>(bars: &[T], period: usize) -> Series {
    let len = bars.len();
    // Needs `period` changes, hence `period + 1` closes
    if !valid_period(period, len.saturating_sub(1)) {
        return degenerate("rsi", period, len);
    }

    let values = closes(bars);
    let mut out = vec![None; len];
    for i in period..len {
        let window = &values[i - period..=i];
        let totals = window.windows(2).try_fold((0.0, 0.0), |(gain, loss), pair| {
            let change = pair[1]? - pair[0]?;
            Some(if change > 0.0 {
                (gain + change, loss)
            } else {
                (gain, loss - change)
            })
        });
        let Some((gain, loss)) = totals else { continue };

        let avg_gain = gain / period as f64;
        let avg_loss = loss / period as f64;
        out[i] = if avg_loss == 0.0 {
            Some(100.0)
        } else {
            finite(100.0 - 100.0 / (1.0 + avg_gain / avg_loss))
        };
    }
    out
}

/// Moving Average Convergence Divergence.
///
/// The signal EMA runs over the MACD line with undefined slots read as `0`;
/// signal and histogram are only reported where the MACD line is defined.
pub fn macd<T: OHLCV>(bars: &[T], fast: usize, slow: usize, signal: usize) -> MacdOutput {
    let line = zip_with(&ema(bars, fast), &ema(bars, slow), |f, s| f - s);
    let signal_line = signal_over(&line, signal);
    let histogram = zip_with(&line, &signal_line, |m, s| m - s);

    MacdOutput {
        macd: line,
        signal: signal_line,
        histogram,
    }
}

/// EMA of the MACD line with undefined slots fed in as `0`, masked back to the line
fn signal_over(line: &[Option<f64>], period: usize) -> Series {
    let padded: Series = line.iter().map(|v| Some(v.unwrap_or(0.0))).collect();
    ema_values(&padded, period)
        .into_iter()
        .zip(line)
        .map(|(s, m)| m.and(s))
        .collect()
}

/// Commodity Channel Index on typical price with the `0.015` Lambert constant.
///
/// A window with zero mean deviation is undefined.
pub fn cci<T: OHLCV>(bars: &[T], period: usize) -> Series {
    let typical = field(bars, |b| b.typical_price());
    let mean = sma_values(&typical, period);

    mean.iter()
        .enumerate()
        .map(|(i, m)| {
            let m = (*m)?;
            let window = &typical[i + 1 - period..=i];
            let deviation = window.iter().flatten().map(|tp| (tp - m).abs()).sum::<f64>()
                / period as f64;
            if deviation == 0.0 {
                return None;
            }
            finite((typical[i]? - m) / (0.015 * deviation))
        })
        .collect()
}

/// Williams %R in `[-100, 0]`; a flat window is undefined
pub fn williams_r<T: OHLCV>(bars: &[T], period: usize) -> Series {
    let hh = rolling_max(&highs(bars), period);
    let ll = rolling_min(&lows(bars), period);
    let values = closes(bars);

    (0..bars.len())
        .map(|i| {
            let (h, l, c) = (hh[i]?, ll[i]?, values[i]?);
            if h == l {
                return None;
            }
            finite(-100.0 * (h - c) / (h - l))
        })
        .collect()
}

/// Stochastic oscillator: `%K` over `k_period`, `%D` as SMA(`%K`, `d_period`).
pub fn stochastic<T: OHLCV>(bars: &[T], k_period: usize, d_period: usize) -> StochasticOutput {
    let hh = rolling_max(&highs(bars), k_period);
    let ll = rolling_min(&lows(bars), k_period);
    let values = closes(bars);

    let k: Series = (0..bars.len())
        .map(|i| {
            let (h, l, c) = (hh[i]?, ll[i]?, values[i]?);
            if h == l {
                return None;
            }
            finite(100.0 * (c - l) / (h - l))
        })
        .collect();
    let d = sma_values(&k, d_period);
    StochasticOutput { k, d }
}

/// Rate of change in percent against the close `period` bars back
pub fn roc<T: OHLCV>(bars: &[T], period: usize) -> Series {
    let len = bars.len();
    if !valid_period(period, len.saturating_sub(1)) {
        return degenerate("roc", period, len);
    }

    let values = closes(bars);
    (0..len)
        .map(|i| {
            if i < period {
                return None;
            }
            let (now, then) = (values[i]?, values[i - period]?);
            finite(100.0 * (now - then) / then)
        })
        .collect()
}
