use thiserror::Error;

/// Errors raised by the energy, sizing and billing calculations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("{field} must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f64 },

    #[error("{field} must be greater than zero, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("appliance '{0}' needs either a catalog kind or an explicit wattage")]
    MissingWattage(String),
}

impl CalcError {
    pub(crate) fn check_finite(field: &'static str, value: f64) -> Result<f64, CalcError> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(CalcError::NotFinite { field, value })
        }
    }

    pub(crate) fn check_positive(field: &'static str, value: f64) -> Result<f64, CalcError> {
        let value = Self::check_finite(field, value)?;
        if value > 0.0 {
            Ok(value)
        } else {
            Err(CalcError::NotPositive { field, value })
        }
    }

    pub(crate) fn check_range(
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    ) -> Result<f64, CalcError> {
        let value = Self::check_finite(field, value)?;
        if (min..=max).contains(&value) {
            Ok(value)
        } else {
            Err(CalcError::OutOfRange {
                field,
                value,
                min,
                max,
            })
        }
    }
}
