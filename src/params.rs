//! Parameter metadata for indicator configurations
//!
//! Every config record in [`crate::indicators`] describes its tunable parameters
//! through [`ParameterizedIndicator`], so callers can build configs from loose
//! key/value maps and sweep parameter grids.
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use candlewise::indicators::BollingerConfig;
//! use candlewise::params::ParameterizedIndicator;
//!
//! for param in BollingerConfig::param_meta() {
//!   println!("{}: {:?} (default: {})", param.name, param.param_type, param.default);
//! }
//!
//! let mut params = HashMap::new();
//! params.insert("period", 10.0);
//! let config = BollingerConfig::with_params(&params).unwrap();
//! assert_eq!(config.period, 10);
//! assert_eq!(config.std_dev, 2.0);
//! ```

use std::collections::HashMap;

use crate::{Period, Result, TaError};

// ============================================================
// PARAMETER TYPES
// ============================================================

/// Type of parameter value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
  /// Window length (positive integer)
  Period,
  /// Bar offset or count where zero is meaningful (non-negative integer)
  Shift,
  /// Real-valued multiplier or step (finite, non-negative)
  Factor,
}

/// Metadata for a single indicator parameter
#[derive(Debug, Clone)]
pub struct ParamMeta {
  /// Parameter name as used in config records (e.g., "std_dev")
  pub name: &'static str,
  pub param_type: ParamType,
  pub default: f64,
  /// Range for optimization: (min, max, step)
  pub range: (f64, f64, f64),
  pub description: &'static str,
}

impl ParamMeta {
  pub const fn period(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Period, default, range, description }
  }

  pub const fn shift(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Shift, default, range, description }
  }

  pub const fn factor(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Factor, default, range, description }
  }

  /// Generate all values for grid search
  pub fn generate_grid(&self) -> Vec<f64> {
    let (min, max, step) = self.range;
    if step.is_nan() || step <= 0.0 {
      return vec![min];
    }
    let mut values = Vec::new();
    let mut i = 0u32;
    loop {
      let v = min + step * f64::from(i);
      if v > max + 1e-9 {
        break;
      }
      values.push(v);
      i += 1;
    }
    values
  }

  /// Validate a value for this parameter
  pub fn validate(&self, value: f64) -> Result<()> {
    let (min, max, _) = self.range;
    if !value.is_finite() {
      return Err(TaError::InvalidValue("parameter must be finite"));
    }
    if value < min || value > max {
      return Err(TaError::OutOfRange { field: self.name, value, min, max });
    }
    match self.param_type {
      ParamType::Period | ParamType::Shift if value.fract() != 0.0 => {
        Err(TaError::InvalidValue("Period must be a whole number"))
      },
      _ => Ok(()),
    }
  }
}

// ============================================================
// PARAMETERIZED INDICATOR TRAIT
// ============================================================

/// Config records that can be described and rebuilt from a parameter map
pub trait ParameterizedIndicator: Sized {
  /// Returns metadata for all configurable parameters
  fn param_meta() -> &'static [ParamMeta];

  /// Creates a config with parameters from a HashMap
  ///
  /// Missing parameters use their default values.
  fn with_params(params: &HashMap<&str, f64>) -> Result<Self>;

  /// Returns the indicator key (e.g. "bollinger")
  fn indicator_name() -> &'static str;
}

// ============================================================
// PARAMETER VALUE HELPERS
// ============================================================

/// Whole, positive period from params with default fallback
pub fn get_period(params: &HashMap<&str, f64>, key: &str, default: usize) -> Result<usize> {
  let Some(&value) = params.get(key) else {
    return Ok(default);
  };
  if !value.is_finite() || value < 0.0 || value.fract() != 0.0 {
    return Err(TaError::InvalidConfig(format!("{key} must be a whole number, got {value}")));
  }
  Period::new(value as usize).map(Period::get)
}

/// Whole, non-negative offset (zero allowed) from params with default fallback
pub fn get_shift(params: &HashMap<&str, f64>, key: &str, default: usize) -> Result<usize> {
  let Some(&value) = params.get(key) else {
    return Ok(default);
  };
  if !value.is_finite() || value < 0.0 || value.fract() != 0.0 {
    return Err(TaError::InvalidConfig(format!("{key} must be a whole number, got {value}")));
  }
  Ok(value as usize)
}

/// Finite, non-negative factor from params with default fallback
pub fn get_factor(params: &HashMap<&str, f64>, key: &str, default: f64) -> Result<f64> {
  let value = params.get(key).copied().unwrap_or(default);
  if !value.is_finite() || value < 0.0 {
    return Err(TaError::InvalidConfig(format!("{key} must be finite and >= 0, got {value}")));
  }
  Ok(value)
}

// ============================================================
// TESTS
// ============================================================
