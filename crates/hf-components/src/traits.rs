//! The flux function contract consumed by the numerical approximators.

use hf_core::numeric::Real;

use crate::error::{FluxError, FluxResult};

/// Data of one timestep, as seen by a flux function.
#[derive(Clone, Copy, Debug)]
pub struct Step<'a> {
    /// Time index within the current solve call
    pub index: usize,
    /// State at the beginning of the step
    pub s0: Real,
    /// Step length
    pub dt: Real,
    /// Argument values in the order given by [`FluxFunction::arguments`]
    pub args: &'a [Real],
}

impl Step<'_> {
    #[inline]
    pub fn arg(&self, i: usize) -> Real {
        self.args[i]
    }
}

/// Signed fluxes acting on one storage, as a function of a trial state.
///
/// Implementations are pure: the same state and step always give the same
/// fluxes. The argument list is fixed when the model is built; approximators
/// resolve names to columns once per call and hand each step a row.
pub trait FluxFunction: Send + Sync {
    /// Model name for diagnostics.
    fn name(&self) -> &'static str;

    /// One name per flux, in the order written by [`FluxFunction::fluxes`].
    fn flux_names(&self) -> &'static [&'static str];

    /// Ordered input and parameter names.
    fn arguments(&self) -> &'static [&'static str];

    /// Indices of the outgoing fluxes that make up the element output.
    fn outputs(&self) -> &'static [usize];

    /// Admissible state interval `(min, max)` for this step.
    fn bounds(&self, step: &Step<'_>) -> (Real, Real);

    /// Write the signed fluxes at trial state `s` into `out`.
    fn fluxes(&self, s: Real, step: &Step<'_>, out: &mut [Real]);

    /// Write the flux derivatives with respect to the state into `out`.
    ///
    /// Returns `false` when the model has no analytic derivatives, in which
    /// case `out` is left untouched.
    fn derivatives(&self, _s: Real, _step: &Step<'_>, _out: &mut [Real]) -> bool {
        false
    }

    /// Check one argument row before it is used.
    fn validate(&self, args: &[Real]) -> FluxResult<()> {
        check_arity(self.name(), self.arguments().len(), args)
    }

    fn num_fluxes(&self) -> usize {
        self.flux_names().len()
    }
}

pub(crate) fn check_arity(flux: &'static str, expected: usize, args: &[Real]) -> FluxResult<()> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(FluxError::ArgumentCount {
            flux,
            expected,
            found: args.len(),
        })
    }
}
