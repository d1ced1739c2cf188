//! Volume indicators: On-Balance Volume and VWAP

use super::{degenerate, finite, Series};
use crate::{OHLCVExt, OHLCV};

/// On-Balance Volume, seeded with `OBV[0] = volume[0]`.
///
/// Volume is added on an up close, subtracted on a down close and ignored on an
/// unchanged close. Non-finite inputs poison every later value.
pub fn obv<T: OHLCV>(bars: &[T]) -> Series {
    let mut total = f64::NAN;
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let volume = bar.volume();
            total = if i == 0 {
                volume
            } else {
                let (close, prev) = (bar.close(), bars[i - 1].close());
                if !(close.is_finite() && prev.is_finite()) {
                    f64::NAN
                } else if close > prev {
                    total + volume
                } else if close < prev {
                    total - volume
                } else {
                    total
                }
            };
            finite(total)
        })
        .collect()
}

/// Volume-weighted average price on typical price.
///
/// Accumulates from the first bar, or restarts every `reset_period` bars when set.
/// A zero cumulative volume leaves the slot undefined; `Some(0)` is degenerate.
pub fn vwap<T: OHLCV>(bars: &[T], reset_period: Option<usize>) -> Series {
    let len = bars.len();
    if reset_period == Some(0) {
        return degenerate("vwap", 0, len);
    }

    let mut price_volume = 0.0;
    let mut volume = 0.0;
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            if reset_period.is_some_and(|p| i % p == 0) {
                price_volume = 0.0;
                volume = 0.0;
            }
            price_volume += bar.typical_price() * bar.volume();
            volume += bar.volume();
            if volume == 0.0 {
                return None;
            }
            finite(price_volume / volume)
        })
        .collect()
}
