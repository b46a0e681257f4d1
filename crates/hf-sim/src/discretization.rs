//! Time discretizations of `dS/dt = sum(fluxes(S))`.
//!
//! A rule turns one timestep into a scalar equation in the end-of-step state
//! and knows how to recover the individual fluxes once the state is known.
//! Only [`ImplicitEuler`] evaluates fluxes at the unknown state; the explicit
//! rules produce `S - c = 0` equations that any root finder solves directly.

use core::fmt;

use hf_components::{FluxFunction, Step};
use hf_core::numeric::Real;
use hf_solver::{Bracket, Residual};

/// Flux buffers reused across the evaluations of one equation.
#[derive(Clone, Debug)]
pub struct Scratch {
    q: Vec<Real>,
    dq: Vec<Real>,
}

impl Scratch {
    pub fn new(num_fluxes: usize) -> Self {
        Self {
            q: vec![0.0; num_fluxes],
            dq: vec![0.0; num_fluxes],
        }
    }

    pub fn for_flux(flux: &dyn FluxFunction) -> Self {
        Self::new(flux.num_fluxes())
    }

    fn sum_at(&mut self, flux: &dyn FluxFunction, s: Real, step: &Step<'_>) -> Real {
        flux.fluxes(s, step, &mut self.q);
        self.q.iter().sum()
    }
}

/// A discretization rule.
pub trait Discretization: Copy + Default + Send + Sync + fmt::Debug + 'static {
    fn name(&self) -> &'static str;

    /// Whether the residual depends on fluxes at the trial state.
    fn is_implicit(&self) -> bool;

    fn bracket(&self, flux: &dyn FluxFunction, step: &Step<'_>) -> Bracket {
        let (lo, hi) = flux.bounds(step);
        Bracket::new(lo, hi)
    }

    /// Residual of the discretized equation at trial state `s`.
    ///
    /// The derivative is computed only when `with_derivative` is set and the
    /// flux function provides one.
    fn residual(
        &self,
        flux: &dyn FluxFunction,
        s: Real,
        step: &Step<'_>,
        scratch: &mut Scratch,
        with_derivative: bool,
    ) -> Residual;

    /// Fluxes acting over a step that ended in state `s`, written to `out`.
    fn breakdown(
        &self,
        flux: &dyn FluxFunction,
        s: Real,
        step: &Step<'_>,
        scratch: &mut Scratch,
        out: &mut [Real],
    );
}

/// Backward (implicit) Euler: fluxes at the end-of-step state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImplicitEuler;

impl Discretization for ImplicitEuler {
    fn name(&self) -> &'static str {
        "implicit_euler"
    }

    fn is_implicit(&self) -> bool {
        true
    }

    fn residual(
        &self,
        flux: &dyn FluxFunction,
        s: Real,
        step: &Step<'_>,
        scratch: &mut Scratch,
        with_derivative: bool,
    ) -> Residual {
        let value = (s - step.s0) / step.dt - scratch.sum_at(flux, s, step);
        let derivative = if with_derivative && flux.derivatives(s, step, &mut scratch.dq) {
            Some(1.0 / step.dt - scratch.dq.iter().sum::<Real>())
        } else {
            None
        };
        Residual { value, derivative }
    }

    fn breakdown(
        &self,
        flux: &dyn FluxFunction,
        s: Real,
        step: &Step<'_>,
        _scratch: &mut Scratch,
        out: &mut [Real],
    ) {
        flux.fluxes(s, step, out);
    }
}

/// Forward (explicit) Euler: fluxes at the start-of-step state.
///
/// The equation is written as `S - (S0 + dt sum(q(S0)))` so the explicit
/// root finder is exact for any step length.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExplicitEuler;

impl Discretization for ExplicitEuler {
    fn name(&self) -> &'static str {
        "explicit_euler"
    }

    fn is_implicit(&self) -> bool {
        false
    }

    fn residual(
        &self,
        flux: &dyn FluxFunction,
        s: Real,
        step: &Step<'_>,
        scratch: &mut Scratch,
        _with_derivative: bool,
    ) -> Residual {
        let increment = step.dt * scratch.sum_at(flux, step.s0, step);
        Residual::with_derivative(s - (step.s0 + increment), 1.0)
    }

    fn breakdown(
        &self,
        flux: &dyn FluxFunction,
        _s: Real,
        step: &Step<'_>,
        _scratch: &mut Scratch,
        out: &mut [Real],
    ) {
        flux.fluxes(step.s0, step, out);
    }
}

/// Classical fourth-order Runge-Kutta with fluxes held constant over each
/// sub-stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RungeKutta4;

impl Discretization for RungeKutta4 {
    fn name(&self) -> &'static str {
        "runge_kutta_4"
    }

    fn is_implicit(&self) -> bool {
        false
    }

    fn residual(
        &self,
        flux: &dyn FluxFunction,
        s: Real,
        step: &Step<'_>,
        scratch: &mut Scratch,
        _with_derivative: bool,
    ) -> Residual {
        let (s0, dt) = (step.s0, step.dt);
        let k1 = dt * scratch.sum_at(flux, s0, step);
        let k2 = dt * scratch.sum_at(flux, s0 + k1 / 2.0, step);
        let k3 = dt * scratch.sum_at(flux, s0 + k2 / 2.0, step);
        let k4 = dt * scratch.sum_at(flux, s0 + k3, step);
        let value = s - (s0 + k1 / 6.0 + k2 / 3.0 + k3 / 3.0 + k4 / 6.0);
        Residual::with_derivative(value, 1.0)
    }

    fn breakdown(
        &self,
        flux: &dyn FluxFunction,
        _s: Real,
        step: &Step<'_>,
        scratch: &mut Scratch,
        out: &mut [Real],
    ) {
        let (s0, dt) = (step.s0, step.dt);
        // (fraction of the previous stage increment, weight divisor)
        let stages = [(0.0, 6.0), (0.5, 3.0), (0.5, 3.0), (1.0, 6.0)];

        out.fill(0.0);
        let mut previous_sum = 0.0;
        for (offset, divisor) in stages {
            let stage_state = s0 + previous_sum * dt * offset;
            previous_sum = scratch.sum_at(flux, stage_state, step);
            for (o, q) in out.iter_mut().zip(&scratch.q) {
                *o += q / divisor;
            }
        }
    }
}
