//! Power-law reservoir.

use hf_core::numeric::Real;

use crate::error::{non_negative, positive, FluxResult};
use crate::traits::{check_arity, FluxFunction, Step};

const P: usize = 0;
const K: usize = 1;
const ALPHA: usize = 2;

/// `dS/dt = P - k S^alpha`.
///
/// Arguments: `P`, `k`, `alpha`. With `alpha = 1` the model is exactly the
/// [`LinearReservoir`](crate::LinearReservoir).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PowerReservoir;

impl FluxFunction for PowerReservoir {
    fn name(&self) -> &'static str {
        "power_reservoir"
    }

    fn flux_names(&self) -> &'static [&'static str] {
        &["P", "Q"]
    }

    fn arguments(&self) -> &'static [&'static str] {
        &["P", "k", "alpha"]
    }

    fn outputs(&self) -> &'static [usize] {
        &[1]
    }

    fn bounds(&self, step: &Step<'_>) -> (Real, Real) {
        (0.0, step.s0 + step.arg(P) * step.dt)
    }

    fn fluxes(&self, s: Real, step: &Step<'_>, out: &mut [Real]) {
        out[0] = step.arg(P);
        out[1] = -step.arg(K) * s.powf(step.arg(ALPHA));
    }

    fn derivatives(&self, s: Real, step: &Step<'_>, out: &mut [Real]) -> bool {
        let alpha = step.arg(ALPHA);
        out[0] = 0.0;
        out[1] = -alpha * step.arg(K) * s.powf(alpha - 1.0);
        true
    }

    fn validate(&self, args: &[Real]) -> FluxResult<()> {
        check_arity(self.name(), 3, args)?;
        non_negative(self.name(), "k", args[K])?;
        positive(self.name(), "alpha", args[ALPHA])
    }
}
