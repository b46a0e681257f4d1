//! Root finder trait and shared helpers.

use hf_core::numeric::Real;
use tracing::trace;

use crate::backend::Backend;
use crate::equation::{Equation, Residual};
use crate::error::{SolverError, SolverResult};
use crate::settings::RootSettings;

/// A converged root.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Root {
    pub x: Real,
    /// Iterations of the main loop (0 when a bracket end already satisfies `tol_f`)
    pub iterations: usize,
    /// Residual evaluations, bracket ends included
    pub evaluations: usize,
}

/// Scalar root finder bound to a backend.
///
/// Root finders are immutable after construction and can be shared between
/// threads.
pub trait RootFinder: Send + Sync {
    type Backend: Backend;

    fn settings(&self) -> RootSettings;

    /// Finders that need `Residual::derivative` to be filled in.
    fn requires_derivative(&self) -> bool {
        false
    }

    /// False for finders that evaluate the equation once and never use the
    /// bracket; those are only correct for explicit discretizations.
    fn is_iterative(&self) -> bool {
        true
    }

    fn solve(&self, eq: &mut dyn Equation) -> SolverResult<Root>;
}

/// Evaluate `eq` at `x`, validating the value under an instrumented backend.
///
/// Derivatives are not checked here: an infinite slope at a bracket end is a
/// legitimate outcome that Newton answers with a bisection.
pub(crate) fn evaluate<B: Backend>(eq: &mut dyn Equation, x: Real) -> SolverResult<Residual> {
    let r = eq.residual(x);
    if B::INSTRUMENTED {
        if !r.value.is_finite() {
            return Err(SolverError::Numeric {
                what: format!("residual at x = {x} is {}", r.value),
            });
        }
        trace!(x, residual = r.value, "residual evaluated");
    }
    Ok(r)
}
