//! Moving averages: SMA, EMA, WMA and the smoothers composed from them
//!
//! The `*_values` functions are the primitives; they operate on plain series so
//! chained indicators (DEMA, TEMA, TMA, HMA) feed one stage's output straight into
//! the next.

use super::{closes, degenerate, finite, valid_period, window_sum, zip_with, Series};
use crate::OHLCV;

// ============================================================
// PRIMITIVES
// ============================================================

/// Simple moving average over a series.
///
/// Each window is summed left to right and divided by `period`. `None` for
/// `i < period - 1` and for any window holding an undefined slot.
pub fn sma_values(values: &[Option<f64>], period: usize) -> Series {
    let len = values.len();
    if !valid_period(period, len) {
        return degenerate("sma", period, len);
    }

    let mut out = vec![None; len];
    for i in (period - 1)..len {
        out[i] = window_sum(&values[i + 1 - period..=i]).and_then(|sum| finite(sum / period as f64));
    }
    out
}

/// Exponential moving average over a series.
///
/// ```text
/// k = 2 / (period + 1)
/// EMA[0] = x[0]
/// EMA[i] = mean(x[0..=i])                      for 0 < i < period - 1
/// EMA[i] = (x[i] - EMA[i-1]) * k + EMA[i-1]    for i >= period - 1
/// ```
///
/// No leading `None` region. An undefined input makes that slot and every later
/// slot `None`, since the recursion always reads the previous result.
pub fn ema_values(values: &[Option<f64>], period: usize) -> Series {
    let len = values.len();
    if !valid_period(period, len) {
        return degenerate("ema", period, len);
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut raw: Vec<f64> = Vec::with_capacity(len);
    let mut warmup_sum = 0.0;

    for (i, v) in values.iter().enumerate() {
        let x = v.unwrap_or(f64::NAN);
        let value = if i == 0 {
            warmup_sum = x;
            x
        } else if i < period - 1 {
            warmup_sum += x;
            warmup_sum / (i + 1) as f64
        } else {
            let prev = raw[i - 1];
            (x - prev) * k + prev
        };
        raw.push(value);
    }

    raw.into_iter().map(finite).collect()
}

/// Weighted moving average over a series.
///
/// Weights run `1..=period` from oldest to newest and are normalized by
/// `period * (period + 1) / 2`.
pub fn wma_values(values: &[Option<f64>], period: usize) -> Series {
    let len = values.len();
    if !valid_period(period, len) {
        return degenerate("wma", period, len);
    }

    let weight_sum = (period * (period + 1) / 2) as f64;
    let mut out = vec![None; len];
    for i in (period - 1)..len {
        out[i] = values[i + 1 - period..=i]
            .iter()
            .enumerate()
            .try_fold(0.0, |acc, (j, v)| v.map(|x| acc + x * (j + 1) as f64))
            .and_then(|weighted| finite(weighted / weight_sum));
    }
    out
}

/// Triangular moving average: `SMA(SMA(x, n1), n2)` with `n1 + n2 = period + 1`.
pub fn tma_values(values: &[Option<f64>], period: usize) -> Series {
    let len = values.len();
    if !valid_period(period, len) {
        return degenerate("tma", period, len);
    }
    let n1 = (period + 2) / 2;
    let n2 = (period + 1) / 2;
    sma_values(&sma_values(values, n1), n2)
}

/// Hull moving average: `WMA(2 * WMA(x, period/2) - WMA(x, period), sqrt(period))`.
///
/// Both the half period and the root period are floored and clamped to at least 1.
pub fn hma_values(values: &[Option<f64>], period: usize) -> Series {
    let len = values.len();
    if !valid_period(period, len) {
        return degenerate("hma", period, len);
    }
    let half = (period / 2).max(1);
    let root = ((period as f64).sqrt().floor() as usize).max(1);

    let raw = zip_with(
        &wma_values(values, half),
        &wma_values(values, period),
        |h, full| 2.0 * h - full,
    );
    wma_values(&raw, root)
}

/// McGinley Dynamic: `MD[i] = MD[i-1] + (x - MD[i-1]) / (period * (x / MD[i-1])^4)`.
///
/// Seeded with `MD[0] = x[0]`; recursive, so undefined inputs poison forward.
pub fn mcginley_values(values: &[Option<f64>], period: usize) -> Series {
    let len = values.len();
    if !valid_period(period, len) {
        return degenerate("mcginley", period, len);
    }

    let n = period as f64;
    let mut prev = f64::NAN;
    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let x = v.unwrap_or(f64::NAN);
            let md = if i == 0 {
                x
            } else {
                prev + (x - prev) / (n * (x / prev).powi(4))
            };
            prev = md;
            finite(md)
        })
        .collect()
}

// ============================================================
// BAR-LEVEL MOVING AVERAGES
// ============================================================

/// Simple moving average of closes
pub fn sma<T: OHLCV>(bars: &[T], period: usize) -> Series {
    sma_values(&closes(bars), period)
}

/// Exponential moving average of closes
pub fn ema<T: OHLCV>(bars: &[T], period: usize) -> Series {
    ema_values(&closes(bars), period)
}

/// Weighted moving average of closes
pub fn wma<T: OHLCV>(bars: &[T], period: usize) -> Series {
    wma_values(&closes(bars), period)
}

/// Double EMA: `2 * EMA1 - EMA2`, where `EMA2 = EMA(EMA1)`
pub fn dema<T: OHLCV>(bars: &[T], period: usize) -> Series {
    let e1 = ema(bars, period);
    let e2 = ema_values(&e1, period);
    zip_with(&e1, &e2, |a, b| 2.0 * a - b)
}

/// Triple EMA: `3 * EMA1 - 3 * EMA2 + EMA3`
pub fn tema<T: OHLCV>(bars: &[T], period: usize) -> Series {
    let e1 = ema(bars, period);
    let e2 = ema_values(&e1, period);
    let e3 = ema_values(&e2, period);

    e1.iter()
        .zip(&e2)
        .zip(&e3)
        .map(|((a, b), c)| match (a, b, c) {
            (Some(a), Some(b), Some(c)) => finite(3.0 * a - 3.0 * b + c),
            _ => None,
        })
        .collect()
}

pub fn tma<T: OHLCV>(bars: &[T], period: usize) -> Series {
    tma_values(&closes(bars), period)
}

pub fn hma<T: OHLCV>(bars: &[T], period: usize) -> Series {
    hma_values(&closes(bars), period)
}

pub fn mcginley<T: OHLCV>(bars: &[T], period: usize) -> Series {
    mcginley_values(&closes(bars), period)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PriceBar;

    fn bars(closes: &[f64]) -> Vec<PriceBar> {
        closes.iter().copied().map(PriceBar::from_close).collect()
    }

    fn assert_close(actual: Option<f64>, expected: f64) {
        let v = actual.expect("defined value");
        assert!((v - expected).abs() < 1e-9, "expected {expected}, got {v}");
    }

    #[test]
    fn test_sma_example() {
        let b = bars(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        assert_eq!(sma(&b, 3), vec![None, None, Some(11.0), Some(12.0), Some(13.0)]);
    }

    #[test]
    fn test_sma_degenerate_periods() {
        let b = bars(&[1.0, 2.0, 3.0]);
        assert_eq!(sma(&b, 0), vec![None; 3]);
        assert_eq!(sma(&b, 4), vec![None; 3]);
        assert!(sma(&bars(&[]), 3).is_empty());
    }

    #[test]
    fn test_sma_nan_only_affects_its_windows() {
        let b = bars(&[1.0, 2.0, f64::NAN, 4.0, 5.0, 6.0]);
        assert_eq!(
            sma(&b, 2),
            vec![None, Some(1.5), None, None, Some(4.5), Some(5.5)]
        );
    }

    #[test]
    fn test_ema_warmup_then_recursion() {
        let b = bars(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let out = ema(&b, 3);
        // k = 0.5; warm-up: EMA[0]=1, EMA[1]=mean(1,2)=1.5
        assert_close(out[0], 1.0);
        assert_close(out[1], 1.5);
        assert_close(out[2], 2.25);
        assert_close(out[3], 3.125);
        assert_close(out[4], 4.0625);
    }

    #[test]
    fn test_ema_period_one_tracks_input() {
        let b = bars(&[3.0, 7.0, 2.0]);
        assert_eq!(ema(&b, 1), vec![Some(3.0), Some(7.0), Some(2.0)]);
    }

    #[test]
    fn test_ema_nan_poisons_forward() {
        let b = bars(&[1.0, 2.0, f64::NAN, 4.0, 5.0]);
        let out = ema(&b, 2);
        assert!(out[0].is_some() && out[1].is_some());
        assert_eq!(&out[2..], &[None, None, None]);
    }

    #[test]
    fn test_wma_weights_newest_highest() {
        let b = bars(&[10.0, 11.0, 12.0, 13.0]);
        let out = wma(&b, 3);
        assert_eq!(out[..2], [None, None]);
        // (10*1 + 11*2 + 12*3) / 6
        assert_close(out[2], 68.0 / 6.0);
        assert_close(out[3], (11.0 + 24.0 + 39.0) / 6.0);
    }

    #[test]
    fn test_dema_tema_on_constant_series() {
        let b = bars(&[5.0; 12]);
        for v in dema(&b, 4).into_iter().chain(tema(&b, 4)) {
            assert_close(v, 5.0);
        }
    }

    #[test]
    fn test_tma_null_prefix_is_period_minus_one() {
        for period in 1..=7 {
            let b = bars(&(0..20).map(f64::from).collect::<Vec<_>>());
            let out = tma(&b, period);
            assert_eq!(out.iter().take_while(|v| v.is_none()).count(), period - 1);
        }
    }

    #[test]
    fn test_tma_of_linear_series_lags_to_center() {
        let b = bars(&(0..10).map(f64::from).collect::<Vec<_>>());
        // period 5: SMA3 of SMA3, centered two bars back
        assert_close(tma(&b, 5)[9], 7.0);
    }

    #[test]
    fn test_hma_prefix_and_linear_tracking() {
        let b = bars(&(0..30).map(f64::from).collect::<Vec<_>>());
        let out = hma(&b, 9);
        // WMA(9) defined from 8, then WMA(3) needs two more
        assert_eq!(out.iter().take_while(|v| v.is_none()).count(), 10);
        // HMA removes lag on a straight line
        assert_close(out[29], 29.0);
    }

    #[test]
    fn test_mcginley_constant_and_seed() {
        let b = bars(&[8.0; 6]);
        assert!(mcginley(&b, 3).into_iter().all(|v| v == Some(8.0)));

        let rising = bars(&[10.0, 11.0]);
        let out = mcginley(&rising, 2);
        assert_eq!(out[0], Some(10.0));
        assert_close(out[1], 10.0 + 1.0 / (2.0 * 1.1_f64.powi(4)));
    }
}
