//! Error types for integration and stateful elements.

use hf_components::FluxError;
use hf_core::error::CoreError;
use hf_solver::SolverError;
use thiserror::Error;

/// Errors raised by approximators and reservoir elements.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: String },

    #[error("Configuration error: {what}")]
    Configuration { what: String },

    #[error("State consistency error: {what}")]
    StateConsistency { what: String },

    #[error("Step {step} of equation {equation} failed: {source}")]
    Step {
        step: usize,
        equation: usize,
        #[source]
        source: SolverError,
    },

    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),

    #[error("Flux function error: {0}")]
    Flux(#[from] FluxError),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}

pub type SimResult<T> = Result<T, SimError>;

impl From<serde_yaml::Error> for SimError {
    fn from(e: serde_yaml::Error) -> Self {
        SimError::Configuration {
            what: format!("invalid YAML: {e}"),
        }
    }
}

impl From<serde_json::Error> for SimError {
    fn from(e: serde_json::Error) -> Self {
        SimError::Configuration {
            what: format!("invalid JSON: {e}"),
        }
    }
}

impl SimError {
    /// The root finder failure behind this error, if any.
    pub fn solver_error(&self) -> Option<&SolverError> {
        match self {
            SimError::Step { source, .. } => Some(source),
            SimError::Solver(e) => Some(e),
            _ => None,
        }
    }

    /// Malformed configuration, parameters or states (as opposed to a
    /// numerical failure).
    pub fn is_configuration(&self) -> bool {
        match self {
            SimError::Configuration { .. } | SimError::Flux(_) => true,
            SimError::Core(e) => matches!(
                e,
                CoreError::MissingKey { .. }
                    | CoreError::LengthMismatch { .. }
                    | CoreError::InvalidId { .. }
            ),
            SimError::Step { source, .. } | SimError::Solver(source) => source.is_configuration(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_error_exposes_solver_cause() {
        let err = SimError::Step {
            step: 4,
            equation: 0,
            source: SolverError::ConvergenceFailed {
                iter_max: 10,
                x: 1.0,
                residual: 0.5,
            },
        };
        assert!(err.to_string().contains("Step 4"));
        assert!(matches!(
            err.solver_error(),
            Some(SolverError::ConvergenceFailed { .. })
        ));
        assert!(!err.is_configuration());
    }

    #[test]
    fn missing_key_is_configuration() {
        let err: SimError = CoreError::MissingKey { key: "k".into() }.into();
        assert!(err.is_configuration());
        let err = SimError::StateConsistency { what: "x".into() };
        assert!(!err.is_configuration());
    }
}
