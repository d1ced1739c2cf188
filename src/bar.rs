//! Concrete OHLCV bar with optional fields
//!
//! [`PriceBar`] is the engine's reference input type. Only `close` is required;
//! `open`, `high` and `low` fall back to `close` when missing and `volume` reads as
//! `0.0`. The fallback is applied in the [`OHLCV`] accessors, so every indicator
//! and detector sees it uniformly.
//!
//! Deserialization is lenient: numeric fields accept JSON numbers, numeric strings
//! or `null`. Text that does not parse becomes `NaN`, which the engines treat as a
//! non-finite value.

use serde::{de::IgnoredAny, Deserialize, Deserializer, Serialize};

use crate::OHLCV;

/// One sampled OHLCV observation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    #[serde(default, deserialize_with = "lenient_optional")]
    pub open: Option<f64>,
    #[serde(default, deserialize_with = "lenient_optional")]
    pub high: Option<f64>,
    #[serde(default, deserialize_with = "lenient_optional")]
    pub low: Option<f64>,
    #[serde(deserialize_with = "lenient_required")]
    pub close: f64,
    #[serde(default, deserialize_with = "lenient_optional")]
    pub volume: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl PriceBar {
    /// Full OHLCV bar
    pub fn new(open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            open: Some(open),
            high: Some(high),
            low: Some(low),
            close,
            volume: Some(volume),
            timestamp: None,
        }
    }

    /// OHLC bar without volume
    pub fn ohlc(open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            open: Some(open),
            high: Some(high),
            low: Some(low),
            close,
            ..Self::default()
        }
    }

    /// Close-only bar; every other price reads as `close`
    pub fn from_close(close: f64) -> Self {
        Self {
            close,
            ..Self::default()
        }
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = Some(volume);
        self
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }
}

impl OHLCV for PriceBar {
    #[inline]
    fn open(&self) -> f64 {
        self.open.unwrap_or(self.close)
    }

    #[inline]
    fn high(&self) -> f64 {
        self.high.unwrap_or(self.close)
    }

    #[inline]
    fn low(&self) -> f64 {
        self.low.unwrap_or(self.close)
    }

    #[inline]
    fn close(&self) -> f64 {
        self.close
    }

    #[inline]
    fn volume(&self) -> f64 {
        self.volume.unwrap_or(0.0)
    }
}

// ============================================================
// LENIENT NUMBER COERCION
// ============================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseNumber {
    Number(f64),
    Text(String),
    Other(IgnoredAny),
}

impl LooseNumber {
    /// `None` for blank text; `NaN` for anything that does not parse
    fn coerce(self) -> Option<f64> {
        match self {
            LooseNumber::Number(n) => Some(n),
            LooseNumber::Text(s) => {
                let s = s.trim();
                if s.is_empty() {
                    None
                } else {
                    Some(s.parse().unwrap_or(f64::NAN))
                }
            }
            LooseNumber::Other(_) => Some(f64::NAN),
        }
    }
}

fn lenient_optional<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(Option::<LooseNumber>::deserialize(d)?.and_then(LooseNumber::coerce))
}

fn lenient_required<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    Ok(Option::<LooseNumber>::deserialize(d)?
        .and_then(LooseNumber::coerce)
        .unwrap_or(f64::NAN))
}
