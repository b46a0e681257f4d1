//! The admissible interval of every model straddles the implicit Euler root.

use hf_components::{FluxFunction, LinearReservoir, PowerReservoir, Step, UnsaturatedReservoir};
use proptest::prelude::*;

fn implicit_residual(flux: &dyn FluxFunction, s: f64, step: &Step<'_>) -> f64 {
    let mut q = vec![0.0; flux.num_fluxes()];
    flux.fluxes(s, step, &mut q);
    (s - step.s0) / step.dt - q.iter().sum::<f64>()
}

fn assert_straddles(flux: &dyn FluxFunction, step: &Step<'_>) -> Result<(), TestCaseError> {
    flux.validate(step.args).map_err(|e| TestCaseError::fail(e.to_string()))?;
    let (lo, hi) = flux.bounds(step);
    prop_assert!(lo <= hi);
    let f_lo = implicit_residual(flux, lo, step);
    let f_hi = implicit_residual(flux, hi, step);
    // rounding in `s0 + P dt` can leave a no-outflow residual a few ulps off zero
    prop_assert!(f_lo <= 1e-9, "{}: f(lo) = {f_lo}", flux.name());
    prop_assert!(f_hi >= -1e-9, "{}: f(hi) = {f_hi}", flux.name());
    Ok(())
}

proptest! {
    #[test]
    fn linear_bracket(s0 in 0.0f64..200.0, p in 0.0f64..50.0, k in 0.0f64..2.0, dt in 0.1f64..5.0) {
        let args = [p, k];
        let step = Step { index: 0, s0, dt, args: &args };
        assert_straddles(&LinearReservoir, &step)?;
    }

    #[test]
    fn power_bracket(
        s0 in 0.0f64..200.0,
        p in 0.0f64..50.0,
        k in 0.0f64..1.0,
        alpha in 0.5f64..3.0,
        dt in 0.1f64..5.0,
    ) {
        let args = [p, k, alpha];
        let step = Step { index: 0, s0, dt, args: &args };
        assert_straddles(&PowerReservoir, &step)?;
    }

    #[test]
    fn unsaturated_bracket(
        s0 in 0.0f64..50.0,
        p in 0.0f64..30.0,
        pet in 0.0f64..8.0,
        smax in 10.0f64..300.0,
        beta in 0.5f64..4.0,
        dt in 0.1f64..5.0,
    ) {
        let args = [p, pet, smax, 1.5, 0.01, beta];
        let step = Step { index: 0, s0, dt, args: &args };
        assert_straddles(&UnsaturatedReservoir, &step)?;
    }
}

#[test]
fn flux_names_match_flux_count() {
    let models: [&dyn FluxFunction; 3] = [&LinearReservoir, &PowerReservoir, &UnsaturatedReservoir];
    for m in models {
        assert_eq!(m.flux_names().len(), m.num_fluxes());
        for &o in m.outputs() {
            assert!(o < m.num_fluxes());
        }
    }
}
