//! Convergence settings shared by all iterative root finders.

use hf_core::numeric::Real;

use crate::error::{SolverError, SolverResult};

/// Root finder tolerances.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RootSettings {
    /// Tolerance on the residual (distance from zero)
    pub tol_f: Real,
    /// Tolerance on the state (width of the bracket or Newton step)
    pub tol_x: Real,
    /// Maximum number of iterations before giving up
    pub iter_max: usize,
}

impl Default for RootSettings {
    fn default() -> Self {
        Self {
            tol_f: 1e-8,
            tol_x: 1e-8,
            iter_max: 10,
        }
    }
}

impl RootSettings {
    /// Create validated settings.
    pub fn new(tol_f: Real, tol_x: Real, iter_max: usize) -> SolverResult<Self> {
        let settings = Self {
            tol_f,
            tol_x,
            iter_max,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> SolverResult<()> {
        if !(self.tol_f.is_finite() && self.tol_f > 0.0) {
            return Err(SolverError::configuration(format!(
                "tol_f must be finite and positive, got {}",
                self.tol_f
            )));
        }
        if !(self.tol_x.is_finite() && self.tol_x > 0.0) {
            return Err(SolverError::configuration(format!(
                "tol_x must be finite and positive, got {}",
                self.tol_x
            )));
        }
        if self.iter_max == 0 {
            return Err(SolverError::configuration("iter_max must be at least 1"));
        }
        Ok(())
    }
}
