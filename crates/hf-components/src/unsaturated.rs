//! HBV unsaturated (soil moisture) reservoir.

use hf_core::numeric::Real;

use crate::error::{non_negative, positive, FluxResult};
use crate::traits::{check_arity, FluxFunction, Step};

const P: usize = 0;
const PET: usize = 1;
const SMAX: usize = 2;
const CE: usize = 3;
const M: usize = 4;
const BETA: usize = 5;

/// Soil moisture store of the HBV model.
///
/// With `x = S / Smax` the fluxes are
///
/// ```text
/// P                                 precipitation
/// -Ce PET x (1 + m) / (x + m)       actual evapotranspiration
/// -P x^beta                         recharge (element output)
/// ```
///
/// `m` smooths the evapotranspiration threshold near an empty store.
/// The actual evapotranspiration is not an output; it is recovered from the
/// solved trajectory through the flux breakdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnsaturatedReservoir;

impl FluxFunction for UnsaturatedReservoir {
    fn name(&self) -> &'static str {
        "unsaturated_reservoir"
    }

    fn flux_names(&self) -> &'static [&'static str] {
        &["P", "AET", "Q"]
    }

    fn arguments(&self) -> &'static [&'static str] {
        &["P", "PET", "Smax", "Ce", "m", "beta"]
    }

    fn outputs(&self) -> &'static [usize] {
        &[2]
    }

    fn bounds(&self, step: &Step<'_>) -> (Real, Real) {
        (0.0, step.s0 + step.arg(P) * step.dt)
    }

    fn fluxes(&self, s: Real, step: &Step<'_>, out: &mut [Real]) {
        let p = step.arg(P);
        let m = step.arg(M);
        let x = s / step.arg(SMAX);
        out[0] = p;
        out[1] = -step.arg(CE) * step.arg(PET) * (x * (1.0 + m)) / (x + m);
        out[2] = -p * x.powf(step.arg(BETA));
    }

    fn derivatives(&self, s: Real, step: &Step<'_>, out: &mut [Real]) -> bool {
        let smax = step.arg(SMAX);
        let m = step.arg(M);
        let beta = step.arg(BETA);
        let x = s / smax;
        out[0] = 0.0;
        out[1] = -step.arg(CE) * step.arg(PET) * (1.0 + m) * m / ((x + m) * (x + m) * smax);
        out[2] = -step.arg(P) * beta * x.powf(beta - 1.0) / smax;
        true
    }

    fn validate(&self, args: &[Real]) -> FluxResult<()> {
        let name = self.name();
        check_arity(name, 6, args)?;
        positive(name, "Smax", args[SMAX])?;
        non_negative(name, "Ce", args[CE])?;
        positive(name, "m", args[M])?;
        positive(name, "beta", args[BETA])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // P, PET, Smax, Ce, m, beta
    const ARGS: [Real; 6] = [5.0, 2.0, 50.0, 1.5, 0.01, 1.5];

    fn step() -> Step<'static> {
        Step {
            index: 0,
            s0: 10.0,
            dt: 1.0,
            args: &ARGS,
        }
    }

    #[test]
    fn full_store_spills_all_precipitation() {
        let mut q = [0.0; 3];
        UnsaturatedReservoir.fluxes(50.0, &step(), &mut q);
        assert_eq!(q[0], 5.0);
        assert!((q[1] + 3.0).abs() < 1e-12);
        assert!((q[2] + 5.0).abs() < 1e-12);
    }

    #[test]
    fn empty_store_has_no_losses() {
        let mut q = [1.0; 3];
        UnsaturatedReservoir.fluxes(0.0, &step(), &mut q);
        assert_eq!(q[1], 0.0);
        assert_eq!(q[2], 0.0);
    }

    #[test]
    fn derivatives_match_finite_differences() {
        let s = 20.0;
        let h = 1e-6;
        let mut lo = [0.0; 3];
        let mut hi = [0.0; 3];
        let mut dq = [0.0; 3];
        UnsaturatedReservoir.fluxes(s - h, &step(), &mut lo);
        UnsaturatedReservoir.fluxes(s + h, &step(), &mut hi);
        assert!(UnsaturatedReservoir.derivatives(s, &step(), &mut dq));
        for i in 0..3 {
            let fd = (hi[i] - lo[i]) / (2.0 * h);
            assert!((fd - dq[i]).abs() < 1e-6, "flux {i}: {fd} vs {}", dq[i]);
        }
    }

    #[test]
    fn bounds_follow_precipitation() {
        assert_eq!(UnsaturatedReservoir.bounds(&step()), (0.0, 15.0));
    }

    #[test]
    fn rejects_bad_parameters() {
        let mut args = ARGS;
        args[SMAX] = 0.0;
        assert!(UnsaturatedReservoir.validate(&args).is_err());
        assert!(UnsaturatedReservoir.validate(&ARGS).is_ok());
    }
}
