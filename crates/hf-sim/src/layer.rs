//! Concurrent solves of independent reservoirs.
//!
//! Reservoirs in one layer of a model tree do not exchange data, so their
//! output requests can run on the rayon pool. Each reservoir only touches
//! its own state; the result equals a sequential loop in the same order.

use hf_core::numeric::Real;
use rayon::prelude::*;
use tracing::debug;

use crate::error::SimResult;
use crate::reservoir::Reservoir;

/// Below this many reservoirs the layer is solved on the calling thread.
const PARALLEL_THRESHOLD: usize = 2;

/// Solve every reservoir of a layer and return their outputs in order.
///
/// Fails with the error of the first failing reservoir (in slice order).
/// Reservoirs that solved successfully keep their new state.
pub fn solve_layer(reservoirs: &mut [Reservoir]) -> SimResult<Vec<Vec<Vec<Real>>>> {
    debug!(reservoirs = reservoirs.len(), "solving layer");
    let results: Vec<SimResult<Vec<Vec<Real>>>> = if reservoirs.len() < PARALLEL_THRESHOLD {
        reservoirs.iter_mut().map(|r| r.get_output(true)).collect()
    } else {
        reservoirs
            .par_iter_mut()
            .map(|r| r.get_output(true))
            .collect()
    };
    results.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approximator::{Approximator, NumericalApproximator};
    use crate::discretization::ImplicitEuler;
    use hf_components::{LinearReservoir, PowerReservoir};
    use hf_core::series::Inputs;
    use hf_solver::{Fast, Pegasus, RootSettings};
    use std::sync::Arc;

    fn layer(approx: &Arc<dyn Approximator>) -> Vec<Reservoir> {
        (0..6)
            .map(|i| {
                let k = 0.05 * (i + 1) as f64;
                let mut r = if i % 2 == 0 {
                    Reservoir::new(
                        &format!("R{i}"),
                        Arc::new(LinearReservoir),
                        Inputs::new().with("k", k),
                        Some(i as f64),
                        approx.clone(),
                    )
                } else {
                    Reservoir::new(
                        &format!("R{i}"),
                        Arc::new(PowerReservoir),
                        Inputs::new().with("k", k).with("alpha", 1.5),
                        Some(i as f64),
                        approx.clone(),
                    )
                }
                .unwrap();
                r.set_input(Inputs::new().with("P", vec![3.0, 0.0, 1.0, 4.0]));
                r
            })
            .collect()
    }

    #[test]
    fn parallel_layer_matches_sequential() {
        let approx: Arc<dyn Approximator> = Arc::new(
            NumericalApproximator::new(
                ImplicitEuler,
                Pegasus::<Fast>::new(RootSettings::default()).unwrap(),
            )
            .unwrap(),
        );

        let mut parallel = layer(&approx);
        let got = solve_layer(&mut parallel).unwrap();

        let mut sequential = layer(&approx);
        let expected: Vec<_> = sequential
            .iter_mut()
            .map(|r| r.get_output(true).unwrap())
            .collect();

        assert_eq!(got, expected);
        for (a, b) in parallel.iter().zip(&sequential) {
            assert_eq!(a.state(), b.state());
        }
    }

    #[test]
    fn first_failure_is_reported() {
        let approx: Arc<dyn Approximator> = Arc::new(
            NumericalApproximator::new(
                ImplicitEuler,
                Pegasus::<Fast>::new(RootSettings::default()).unwrap(),
            )
            .unwrap(),
        );
        let mut reservoirs = layer(&approx);
        reservoirs[3].set_input(Inputs::new());
        let err = solve_layer(&mut reservoirs).unwrap_err();
        assert!(err.is_configuration());
    }
}
