//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use hf_core::numeric::Tolerances;
use hf_sim::{Approximator, ImplicitEuler, NumericalApproximator};
use hf_solver::{Pegasus, Reference, RootSettings};

/// Agreement required with closed-form trajectories.
pub const GOLDEN: Tolerances = Tolerances {
    abs: 1e-8,
    rel: 0.0,
};

/// Precipitation series of the documented demo.
pub const DEMO_P: [f64; 20] = [
    6.5, 3.0, 0.0, 0.0, 0.0, 2.0, 4.0, 8.0, 2.0, 0.0, 0.0, 2.5, 1.0, 0.0, 4.0, 0.0, 1.0, 0.0, 0.0,
    0.0,
];

pub fn reference_implicit() -> Arc<dyn Approximator> {
    reference_implicit_with(RootSettings::default())
}

pub fn reference_implicit_with(settings: RootSettings) -> Arc<dyn Approximator> {
    Arc::new(
        NumericalApproximator::new(ImplicitEuler, Pegasus::<Reference>::new(settings).unwrap())
            .unwrap(),
    )
}

/// Implicit Euler closed form of `dS/dt = P - k S`.
pub fn linear_golden(s0: f64, k: f64, dt: f64, p: &[f64]) -> Vec<f64> {
    let mut s = s0;
    p.iter()
        .map(|&p| {
            s = (s + p * dt) / (1.0 + k * dt);
            s
        })
        .collect()
}
