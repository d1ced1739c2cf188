//! Trend indicators: Parabolic SAR, ADX, Ichimoku and Alligator

use serde::Serialize;

use super::{
    closes, degenerate, ema_values, field, finite, highs, lows, rolling_max, rolling_min,
    shift_backward, shift_forward, true_range, valid_period, window_sum, zip_with, Series,
};
use crate::{OHLCVExt, OHLCV};

/// Directional movement system lines
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdxOutput {
    pub adx: Series,
    pub plus_di: Series,
    pub minus_di: Series,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IchimokuOutput {
    pub tenkan: Series,
    pub kijun: Series,
    pub senkou_a: Series,
    pub senkou_b: Series,
    pub chikou: Series,
}

/// Williams Alligator lines, each already shifted forward by its offset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlligatorOutput {
    pub jaw: Series,
    pub teeth: Series,
    pub lips: Series,
}

// ============================================================
// PARABOLIC SAR
// ============================================================

/// Parabolic Stop and Reverse.
///
/// Seeded long at bar 0 with `SAR = low[0]` and `EP = high[0]`. Each step moves the
/// SAR toward the extreme point by the acceleration factor, clamps it behind the
/// previous two bars, and reverses when price crosses it. A reversal puts the SAR
/// on the old extreme point and resets the factor to `acceleration`.
///
/// Invalid parameters (`acceleration <= 0`, `maximum < acceleration`, non-finite)
/// yield an undefined series. A non-finite high or low poisons every later value.
pub fn psar<T: OHLCV>(bars: &[T], acceleration: f64, maximum: f64) -> Series {
    let len = bars.len();
    if !(acceleration.is_finite() && maximum.is_finite() && acceleration > 0.0 && maximum >= acceleration) {
        tracing::debug!(indicator = "psar", acceleration, maximum, "invalid acceleration");
        return vec![None; len];
    }
    if len == 0 {
        return Vec::new();
    }

    let high = |i: usize| bars[i].high();
    let low = |i: usize| bars[i].low();

    let mut long = true;
    let mut sar = low(0);
    let mut ep = high(0);
    let mut af = acceleration;
    let mut poisoned = !(sar.is_finite() && ep.is_finite());
    let mut out = Vec::with_capacity(len);
    out.push(if poisoned { None } else { finite(sar) });

    for i in 1..len {
        if poisoned || !(high(i).is_finite() && low(i).is_finite()) {
            poisoned = true;
            out.push(None);
            continue;
        }

        let mut next = sar + af * (ep - sar);
        if long {
            next = next.min(low(i - 1));
            if i >= 2 {
                next = next.min(low(i - 2));
            }
            if low(i) < next {
                long = false;
                next = ep;
                ep = low(i);
                af = acceleration;
            } else if high(i) > ep {
                ep = high(i);
                af = (af + acceleration).min(maximum);
            }
        } else {
            next = next.max(high(i - 1));
            if i >= 2 {
                next = next.max(high(i - 2));
            }
            if high(i) > next {
                long = true;
                next = ep;
                ep = high(i);
                af = acceleration;
            } else if low(i) < ep {
                ep = low(i);
                af = (af + acceleration).min(maximum);
            }
        }

        sar = next;
        out.push(finite(sar));
    }
    out
}

// ============================================================
// ADX
// ============================================================

/// Average Directional Index with `+DI` / `-DI`.
///
/// Directional movement and True Range are summed over trailing `period`-bar
/// windows, defined from `index == period`. ADX is seeded with DX there and then
/// smoothed as `(ADX_prev * (period - 1) + DX) / period`.
pub fn adx<T: OHLCV>(bars: &[T], period: usize) -> AdxOutput {
    let len = bars.len();
    let mut out = AdxOutput {
        adx: vec![None; len],
        plus_di: vec![None; len],
        minus_di: vec![None; len],
    };
    if !valid_period(period, len.saturating_sub(1)) {
        degenerate("adx", period, len);
        return out;
    }

    let tr = true_range(bars);
    let highs = highs(bars);
    let lows = lows(bars);
    let mut plus_dm: Series = vec![Some(0.0); len];
    let mut minus_dm: Series = vec![Some(0.0); len];
    for i in 1..len {
        let (Some(h), Some(ph), Some(l), Some(pl)) = (highs[i], highs[i - 1], lows[i], lows[i - 1]) else {
            plus_dm[i] = None;
            minus_dm[i] = None;
            continue;
        };
        let up = h - ph;
        let down = pl - l;
        plus_dm[i] = Some(if up > down && up > 0.0 { up } else { 0.0 });
        minus_dm[i] = Some(if down > up && down > 0.0 { down } else { 0.0 });
    }

    let n = period as f64;
    let mut smoothed = f64::NAN;
    for i in period..len {
        let range = i + 1 - period..=i;
        let sums = (
            window_sum(&tr[range.clone()]),
            window_sum(&plus_dm[range.clone()]),
            window_sum(&minus_dm[range]),
        );
        let dx = match sums {
            (Some(tr_sum), Some(plus_sum), Some(minus_sum)) => {
                let (plus, minus) = if tr_sum == 0.0 {
                    (0.0, 0.0)
                } else {
                    (100.0 * plus_sum / tr_sum, 100.0 * minus_sum / tr_sum)
                };
                out.plus_di[i] = finite(plus);
                out.minus_di[i] = finite(minus);
                let total = plus + minus;
                if total == 0.0 { 0.0 } else { 100.0 * (plus - minus).abs() / total }
            }
            _ => f64::NAN,
        };

        smoothed = if i == period { dx } else { (smoothed * (n - 1.0) + dx) / n };
        out.adx[i] = finite(smoothed);
    }
    out
}

// ============================================================
// ICHIMOKU / ALLIGATOR
// ============================================================

fn midpoint<T: OHLCV>(bars: &[T], period: usize) -> Series {
    zip_with(
        &rolling_max(&highs(bars), period),
        &rolling_min(&lows(bars), period),
        |h, l| (h + l) / 2.0,
    )
}

/// Ichimoku Kinko Hyo.
///
/// Senkou spans are shifted forward and Chikou backward by `displacement`; a shift
/// whose source index falls outside the input keeps the unshifted value.
pub fn ichimoku<T: OHLCV>(
    bars: &[T],
    tenkan_period: usize,
    kijun_period: usize,
    senkou_b_period: usize,
    displacement: usize,
) -> IchimokuOutput {
    let tenkan = midpoint(bars, tenkan_period);
    let kijun = midpoint(bars, kijun_period);
    let span_a = zip_with(&tenkan, &kijun, |t, k| (t + k) / 2.0);
    let span_b = midpoint(bars, senkou_b_period);

    IchimokuOutput {
        senkou_a: shift_forward(&span_a, displacement),
        senkou_b: shift_forward(&span_b, displacement),
        chikou: shift_backward(&closes(bars), displacement),
        tenkan,
        kijun,
    }
}

/// Smoothed moving average of median price, expressed as `EMA(2n - 1)`.
fn smma_median(median: &[Option<f64>], period: usize) -> Series {
    ema_values(median, period.saturating_mul(2).saturating_sub(1))
}

/// Williams Alligator on median price `(high + low) / 2`.
pub fn alligator<T: OHLCV>(
    bars: &[T],
    jaw_period: usize,
    jaw_shift: usize,
    teeth_period: usize,
    teeth_shift: usize,
    lips_period: usize,
    lips_shift: usize,
) -> AlligatorOutput {
    let median = field(bars, |b| b.median_price());
    AlligatorOutput {
        jaw: shift_forward(&smma_median(&median, jaw_period), jaw_shift),
        teeth: shift_forward(&smma_median(&median, teeth_period), teeth_shift),
        lips: shift_forward(&smma_median(&median, lips_period), lips_shift),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PriceBar;

    fn trending(n: usize, step: f64) -> Vec<PriceBar> {
        (0..n)
            .map(|i| {
                let c = 100.0 + step * i as f64;
                PriceBar::ohlc(c, c + 1.0, c - 1.0, c)
            })
            .collect()
    }

    #[test]
    fn test_psar_seed_and_uptrend() {
        let bars = trending(10, 1.0);
        let out = psar(&bars, 0.02, 0.2);
        assert_eq!(out.len(), 10);
        assert_eq!(out[0], Some(99.0));
        // 99 + 0.02 * (101 - 99), clamped by low[0] = 99
        assert_eq!(out[1], Some(99.0));
        for i in 1..10 {
            assert!(out[i].unwrap() < bars[i].low.unwrap());
        }
    }

    #[test]
    fn test_psar_acceleration_steps_then_caps() {
        let bars = trending(30, 1.0);
        let out = psar(&bars, 0.02, 0.2);
        assert_eq!(out[2], Some(99.0));
        assert!((out[3].unwrap() - 99.24).abs() < 1e-9);

        // Every bar makes a new high: the factor grows 0.02 per bar and pins at 0.2 from bar 10
        let mut expected = 99.0;
        for i in 1..30 {
            let af = (0.02 * i as f64).min(0.2);
            let ep = 100.0 + i as f64;
            let floor = if i >= 2 { 97.0 + i as f64 } else { 99.0 };
            expected = (expected + af * (ep - expected)).min(floor);
            let v = out[i].unwrap();
            assert!((v - expected).abs() < 1e-9, "bar {i}: {v} vs {expected}");
        }
    }

    #[test]
    fn test_psar_reverses_on_breakdown() {
        let mut bars = trending(6, 1.0);
        bars.push(PriceBar::ohlc(90.0, 91.0, 80.0, 81.0));
        let out = psar(&bars, 0.02, 0.2);
        // Reversal places SAR on the prior extreme point: high[5] = 106
        assert_eq!(out[6], Some(106.0));
    }

    #[test]
    fn test_psar_invalid_params() {
        let bars = trending(5, 1.0);
        assert_eq!(psar(&bars, 0.0, 0.2), vec![None; 5]);
        assert_eq!(psar(&bars, 0.3, 0.2), vec![None; 5]);
        assert_eq!(psar(&bars, 0.02, f64::NAN), vec![None; 5]);
    }

    #[test]
    fn test_psar_poisons_forward() {
        let mut bars = trending(6, 1.0);
        bars[3].low = Some(f64::NAN);
        let out = psar(&bars, 0.02, 0.2);
        assert!(out[2].is_some());
        assert!(out[3..].iter().all(Option::is_none));
    }

    #[test]
    fn test_adx_strong_uptrend() {
        let bars = trending(30, 2.0);
        let out = adx(&bars, 5);
        assert!(out.adx[..5].iter().all(Option::is_none));
        assert!(out.plus_di[..5].iter().all(Option::is_none));
        // Only positive movement: +DI dominates and DX pins at 100
        for i in 5..30 {
            assert!(out.plus_di[i].unwrap() > 0.0);
            assert_eq!(out.minus_di[i], Some(0.0));
            assert!((out.adx[i].unwrap() - 100.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_adx_flat_is_zero() {
        let bars: Vec<_> = (0..10).map(|_| PriceBar::from_close(5.0)).collect();
        let out = adx(&bars, 3);
        assert_eq!(out.plus_di[3], Some(0.0));
        assert_eq!(out.adx[9], Some(0.0));
    }

    #[test]
    fn test_ichimoku_spans_and_fallback() {
        let bars = trending(12, 1.0);
        let out = ichimoku(&bars, 2, 3, 4, 2);
        // tenkan[1] = (high[0..=1].max + low[0..=1].min) / 2 = (102 + 99) / 2
        assert_eq!(out.tenkan[1], Some(100.5));
        assert_eq!(out.kijun[1], None);
        // Senkou A at 6 comes from index 4; indices < 2 keep their own (undefined) value
        let a4 = (out.tenkan[4].unwrap() + out.kijun[4].unwrap()) / 2.0;
        assert_eq!(out.senkou_a[6], Some(a4));
        assert_eq!(out.senkou_a[0], None);
        // Chikou reads ahead; the tail falls back to its own close
        assert_eq!(out.chikou[0], Some(102.0));
        assert_eq!(out.chikou[11], Some(111.0));
    }

    #[test]
    fn test_alligator_constant_median() {
        let bars: Vec<_> = (0..30).map(|_| PriceBar::ohlc(9.0, 12.0, 8.0, 10.0)).collect();
        let out = alligator(&bars, 13, 8, 8, 5, 5, 3);
        for line in [&out.jaw, &out.teeth, &out.lips] {
            assert_eq!(line.len(), 30);
            assert!(line.iter().all(|v| *v == Some(10.0)));
        }
    }

    #[test]
    fn test_alligator_huge_period_is_undefined() {
        let bars = trending(10, 1.0);
        let out = alligator(&bars, usize::MAX, 8, 8, 5, 5, 3);
        assert_eq!(out.jaw, vec![None; 10]);
        assert_eq!(out.teeth.len(), 10);
    }

    #[test]
    fn test_ichimoku_huge_displacement_keeps_current() {
        let bars = trending(10, 1.0);
        let out = ichimoku(&bars, 2, 3, 4, usize::MAX);
        assert_eq!(out.chikou, closes(&bars));
        assert_eq!(out.senkou_b, midpoint(&bars, 4));
    }

    #[test]
    fn test_alligator_shift_delays_line() {
        let bars = trending(20, 1.0);
        let out = alligator(&bars, 3, 2, 2, 1, 1, 0);
        let median = field(&bars, |b| b.median_price());
        let lips = ema_values(&median, 1);
        assert_eq!(out.lips, lips);
        let teeth = ema_values(&median, 3);
        assert_eq!(out.teeth[10], teeth[9]);
    }
}
