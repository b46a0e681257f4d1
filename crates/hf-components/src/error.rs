//! Error types for flux functions.

use hf_core::numeric::Real;
use thiserror::Error;

/// Errors raised while validating flux function arguments.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FluxError {
    #[error("{flux}: expected {expected} arguments, got {found}")]
    ArgumentCount {
        flux: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{flux}: parameter {name} = {value} is out of range ({what})")]
    InvalidParameter {
        flux: &'static str,
        name: &'static str,
        value: Real,
        what: &'static str,
    },
}

pub type FluxResult<T> = Result<T, FluxError>;

/// Require `value` to be finite and `>= 0`.
pub(crate) fn non_negative(flux: &'static str, name: &'static str, value: Real) -> FluxResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(FluxError::InvalidParameter {
            flux,
            name,
            value,
            what: "must be finite and non-negative",
        })
    }
}

/// Require `value` to be finite and `> 0`.
pub(crate) fn positive(flux: &'static str, name: &'static str, value: Real) -> FluxResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(FluxError::InvalidParameter {
            flux,
            name,
            value,
            what: "must be finite and positive",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FluxError::InvalidParameter {
            flux: "linear_reservoir",
            name: "k",
            value: -1.0,
            what: "must be finite and non-negative",
        };
        let msg = err.to_string();
        assert!(msg.contains("linear_reservoir"));
        assert!(msg.contains("k = -1"));
    }

    #[test]
    fn range_helpers() {
        assert!(non_negative("f", "k", 0.0).is_ok());
        assert!(non_negative("f", "k", f64::NAN).is_err());
        assert!(positive("f", "alpha", 0.0).is_err());
        assert!(positive("f", "alpha", 2.0).is_ok());
    }
}
