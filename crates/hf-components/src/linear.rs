//! Linear reservoir: outflow proportional to storage.

use hf_core::numeric::Real;

use crate::error::{non_negative, FluxResult};
use crate::traits::{check_arity, FluxFunction, Step};

const P: usize = 0;
const K: usize = 1;

/// `dS/dt = P - k S`.
///
/// Arguments: `P` (precipitation), `k` (recession constant).
/// Fluxes: `[P, -k S]`. Output: `k S`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinearReservoir;

impl FluxFunction for LinearReservoir {
    fn name(&self) -> &'static str {
        "linear_reservoir"
    }

    fn flux_names(&self) -> &'static [&'static str] {
        &["P", "Q"]
    }

    fn arguments(&self) -> &'static [&'static str] {
        &["P", "k"]
    }

    fn outputs(&self) -> &'static [usize] {
        &[1]
    }

    fn bounds(&self, step: &Step<'_>) -> (Real, Real) {
        (0.0, step.s0 + step.arg(P) * step.dt)
    }

    fn fluxes(&self, s: Real, step: &Step<'_>, out: &mut [Real]) {
        out[0] = step.arg(P);
        out[1] = -step.arg(K) * s;
    }

    fn derivatives(&self, _s: Real, step: &Step<'_>, out: &mut [Real]) -> bool {
        out[0] = 0.0;
        out[1] = -step.arg(K);
        true
    }

    fn validate(&self, args: &[Real]) -> FluxResult<()> {
        check_arity(self.name(), 2, args)?;
        non_negative(self.name(), "k", args[K])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fluxes_and_bounds() {
        let args = [2.0, 0.25];
        let step = Step {
            index: 3,
            s0: 4.0,
            dt: 2.0,
            args: &args,
        };
        let mut q = [0.0; 2];
        LinearReservoir.fluxes(8.0, &step, &mut q);
        assert_eq!(q, [2.0, -2.0]);
        assert_eq!(LinearReservoir.bounds(&step), (0.0, 8.0));

        let mut dq = [1.0; 2];
        assert!(LinearReservoir.derivatives(8.0, &step, &mut dq));
        assert_eq!(dq, [0.0, -0.25]);
    }

    #[test]
    fn rejects_negative_k_and_wrong_arity() {
        assert!(LinearReservoir.validate(&[1.0, 0.1]).is_ok());
        assert!(LinearReservoir.validate(&[1.0, -0.1]).is_err());
        assert!(LinearReservoir.validate(&[1.0]).is_err());
    }
}
