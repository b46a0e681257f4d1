//! Error types for root finding.

use hf_core::error::CoreError;
use hf_core::numeric::Real;
use thiserror::Error;

/// Errors raised by root finders and solver configuration.
///
/// None of them is retried: each one is either a modelling defect or a
/// genuine non-convergence that the caller must see.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Configuration error: {what}")]
    Configuration { what: String },

    #[error("Bracket does not straddle a root: f({lo}) = {f_lo}, f({hi}) = {f_hi}")]
    Bracket {
        lo: Real,
        hi: Real,
        f_lo: Real,
        f_hi: Real,
    },

    #[error("Convergence failed after {iter_max} iterations (x = {x}, residual = {residual})")]
    ConvergenceFailed {
        iter_max: usize,
        x: Real,
        residual: Real,
    },

    #[error("Numeric error: {what}")]
    Numeric { what: String },

    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}

pub type SolverResult<T> = Result<T, SolverError>;

impl SolverError {
    pub fn configuration(what: impl Into<String>) -> Self {
        SolverError::Configuration { what: what.into() }
    }

    /// Missing keys and length mismatches are configuration problems too.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            SolverError::Configuration { .. }
                | SolverError::Core(CoreError::MissingKey { .. })
                | SolverError::Core(CoreError::LengthMismatch { .. })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bracket_message_shows_both_ends() {
        let err = SolverError::Bracket {
            lo: 0.0,
            hi: 1.0,
            f_lo: 2.0,
            f_hi: 3.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("f(0) = 2"));
        assert!(msg.contains("f(1) = 3"));
    }

    #[test]
    fn missing_key_counts_as_configuration() {
        let err: SolverError = CoreError::MissingKey { key: "k".into() }.into();
        assert!(err.is_configuration());
        assert!(!SolverError::Numeric { what: "x".into() }.is_configuration());
    }
}
