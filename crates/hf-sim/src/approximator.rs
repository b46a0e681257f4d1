//! Numerical approximator: per-timestep root solves along a trajectory.
//!
//! For every equation (one flux function and one initial state) the
//! approximator walks the timesteps in order, builds the discretized scalar
//! equation of the step, hands it to the root finder and carries the accepted
//! root into the next step as its initial state. Equations are independent
//! of each other; timesteps within an equation are strictly sequential.

use hf_components::{FluxFunction, Step};
use hf_core::numeric::Real;
use hf_core::series::{Inputs, ResolvedInputs, Timestep};
use hf_core::timing::{solver_timing, Timer};
use hf_solver::{
    Backend, BackendKind, Bracket, Equation, Fast, Residual, RootFinder, SolverError,
};
use nalgebra::DMatrix;
use tracing::{debug, trace, warn};

use crate::discretization::{Discretization, Scratch};
use crate::error::{SimError, SimResult};
use crate::trajectory::{DegradedSolution, FluxSeries, StepFailure, Trajectory};

/// Object-safe view of an approximator, so elements can share one behind an
/// `Arc` without naming its rule and root finder.
pub trait Approximator: Send + Sync {
    /// Name of the discretization rule.
    fn name(&self) -> &'static str;

    fn backend(&self) -> BackendKind;

    /// Solve all equations over all timesteps.
    ///
    /// `fluxes[j]` starts from `s0[j]`. Either the whole trajectory is
    /// returned or the call fails.
    fn solve(
        &self,
        fluxes: &[&dyn FluxFunction],
        s0: &[Real],
        inputs: &Inputs,
        dt: &Timestep,
    ) -> SimResult<Trajectory>;

    /// Recover the individual fluxes of an already solved trajectory.
    fn get_fluxes(
        &self,
        fluxes: &[&dyn FluxFunction],
        trajectory: &Trajectory,
        s0: &[Real],
        inputs: &Inputs,
        dt: &Timestep,
    ) -> SimResult<Vec<FluxSeries>>;
}

/// Discretization rule `D` solved by root finder `R`.
///
/// The backend is the root finder's; it cannot differ between the two.
#[derive(Clone, Debug)]
pub struct NumericalApproximator<D: Discretization, R: RootFinder> {
    rule: D,
    root_finder: R,
}

/// Binds a rule, a flux function and one step into a root finder equation.
struct StepEquation<'a, D> {
    rule: D,
    flux: &'a dyn FluxFunction,
    step: Step<'a>,
    scratch: &'a mut Scratch,
    with_derivative: bool,
}

impl<D: Discretization> Equation for StepEquation<'_, D> {
    fn bracket(&mut self) -> Bracket {
        self.rule.bracket(self.flux, &self.step)
    }

    fn residual(&mut self, x: Real) -> Residual {
        self.rule
            .residual(self.flux, x, &self.step, self.scratch, self.with_derivative)
    }
}

impl<D: Discretization, R: RootFinder> NumericalApproximator<D, R> {
    /// Pair a rule with a root finder.
    ///
    /// A root finder that does not iterate only solves explicit rules.
    pub fn new(rule: D, root_finder: R) -> SimResult<Self> {
        if rule.is_implicit() && !root_finder.is_iterative() {
            return Err(SimError::Configuration {
                what: format!("{} needs an iterative root finder", rule.name()),
            });
        }
        Ok(Self { rule, root_finder })
    }

    pub fn rule(&self) -> D {
        self.rule
    }

    pub fn root_finder(&self) -> &R {
        &self.root_finder
    }

    /// Resolve the arguments of every equation and validate them.
    fn prepare(
        &self,
        fluxes: &[&dyn FluxFunction],
        s0: &[Real],
        inputs: &Inputs,
        dt: &Timestep,
    ) -> SimResult<Vec<ResolvedInputs>> {
        if fluxes.len() != s0.len() {
            return Err(SimError::InvalidArg {
                what: format!(
                    "{} flux functions but {} initial states",
                    fluxes.len(),
                    s0.len()
                ),
            });
        }
        fluxes
            .iter()
            .map(|flux| {
                let resolved = inputs.resolve(flux.arguments(), dt)?;
                for i in 0..resolved.num_steps() {
                    flux.validate(resolved.row(i))?;
                }
                Ok(resolved)
            })
            .collect()
    }

    /// Integrate one equation, writing accepted states into `out`.
    ///
    /// Returns the index of the failing step together with the root finder
    /// error; `out` is filled up to that step.
    fn integrate(
        &self,
        flux: &dyn FluxFunction,
        s0: Real,
        resolved: &ResolvedInputs,
        equation: usize,
        out: &mut Vec<Real>,
    ) -> Result<(), (usize, SolverError)> {
        let mut scratch = Scratch::for_flux(flux);
        let with_derivative = self.root_finder.requires_derivative();
        let mut s_prev = s0;

        for i in 0..resolved.num_steps() {
            let mut eq = StepEquation {
                rule: self.rule,
                flux,
                step: Step {
                    index: i,
                    s0: s_prev,
                    dt: resolved.dt(i),
                    args: resolved.row(i),
                },
                scratch: &mut scratch,
                with_derivative,
            };
            let root = self.root_finder.solve(&mut eq).map_err(|e| (i, e))?;
            if R::Backend::INSTRUMENTED {
                trace!(
                    equation,
                    step = i,
                    state = root.x,
                    iterations = root.iterations,
                    "step solved"
                );
            }
            out.push(root.x);
            s_prev = root.x;
        }
        Ok(())
    }

    pub fn solve(
        &self,
        fluxes: &[&dyn FluxFunction],
        s0: &[Real],
        inputs: &Inputs,
        dt: &Timestep,
    ) -> SimResult<Trajectory> {
        let timer = Timer::start();
        let resolved = self.prepare(fluxes, s0, inputs, dt)?;
        let backend = R::Backend::KIND;
        debug!(
            rule = self.rule.name(),
            %backend,
            equations = fluxes.len(),
            steps = resolved.first().map_or(0, ResolvedInputs::num_steps),
            "solving"
        );

        let mut columns = Vec::with_capacity(fluxes.len());
        for (j, ((flux, &s_start), args)) in fluxes.iter().zip(s0).zip(&resolved).enumerate() {
            let mut column = Vec::with_capacity(args.num_steps());
            if let Err((step, error)) = self.integrate(*flux, s_start, args, j, &mut column) {
                warn!(equation = j, step, flux = flux.name(), %error, "step failed");
                return Err(SimError::Step {
                    step,
                    equation: j,
                    source: error,
                });
            }
            columns.push(column);
        }

        let trajectory = Trajectory::from_columns(&columns)?;
        timer.stop_into(&solver_timing::APPROXIMATOR_SOLVES);
        Ok(trajectory)
    }

    pub fn get_fluxes(
        &self,
        fluxes: &[&dyn FluxFunction],
        trajectory: &Trajectory,
        s0: &[Real],
        inputs: &Inputs,
        dt: &Timestep,
    ) -> SimResult<Vec<FluxSeries>> {
        let timer = Timer::start();
        let resolved = self.prepare(fluxes, s0, inputs, dt)?;
        if trajectory.num_equations() != fluxes.len() {
            return Err(SimError::InvalidArg {
                what: format!(
                    "trajectory has {} equations, expected {}",
                    trajectory.num_equations(),
                    fluxes.len()
                ),
            });
        }

        let mut series = Vec::with_capacity(fluxes.len());
        for (j, ((flux, &s_start), args)) in fluxes.iter().zip(s0).zip(&resolved).enumerate() {
            let num_steps = args.num_steps();
            if trajectory.num_steps() != num_steps {
                return Err(SimError::InvalidArg {
                    what: format!(
                        "trajectory has {} steps but the inputs describe {num_steps}",
                        trajectory.num_steps()
                    ),
                });
            }

            let num_fluxes = flux.num_fluxes();
            let mut scratch = Scratch::for_flux(*flux);
            let mut row = vec![0.0; num_fluxes];
            let mut values = DMatrix::zeros(num_steps, num_fluxes);
            let mut s_prev = s_start;
            for i in 0..num_steps {
                let s = trajectory.get(i, j);
                let step = Step {
                    index: i,
                    s0: s_prev,
                    dt: args.dt(i),
                    args: args.row(i),
                };
                self.rule.breakdown(*flux, s, &step, &mut scratch, &mut row);
                for (k, q) in row.iter().enumerate() {
                    values[(i, k)] = *q;
                }
                s_prev = s;
            }
            series.push(FluxSeries::new(flux.flux_names(), values));
        }

        timer.stop_into(&solver_timing::FLUX_BREAKDOWNS);
        Ok(series)
    }
}

impl<D: Discretization, R: RootFinder<Backend = Fast>> NumericalApproximator<D, R> {
    /// Solve without aborting on root finder failures.
    ///
    /// Each failing equation records its first failing step and continues
    /// with NaN. Malformed inputs still fail the whole call.
    pub fn solve_degraded(
        &self,
        fluxes: &[&dyn FluxFunction],
        s0: &[Real],
        inputs: &Inputs,
        dt: &Timestep,
    ) -> SimResult<DegradedSolution> {
        let resolved = self.prepare(fluxes, s0, inputs, dt)?;

        let mut columns = Vec::with_capacity(fluxes.len());
        let mut failures = Vec::new();
        for (j, ((flux, &s_start), args)) in fluxes.iter().zip(s0).zip(&resolved).enumerate() {
            let mut column = Vec::with_capacity(args.num_steps());
            if let Err((step, error)) = self.integrate(*flux, s_start, args, j, &mut column) {
                warn!(equation = j, step, %error, "degraded solve: step failed");
                column.resize(args.num_steps(), Real::NAN);
                failures.push(StepFailure {
                    equation: j,
                    step,
                    error,
                });
            }
            columns.push(column);
        }

        Ok(DegradedSolution {
            trajectory: Trajectory::from_columns(&columns)?,
            failures,
        })
    }
}

impl<D: Discretization, R: RootFinder> Approximator for NumericalApproximator<D, R> {
    fn name(&self) -> &'static str {
        self.rule.name()
    }

    fn backend(&self) -> BackendKind {
        R::Backend::KIND
    }

    fn solve(
        &self,
        fluxes: &[&dyn FluxFunction],
        s0: &[Real],
        inputs: &Inputs,
        dt: &Timestep,
    ) -> SimResult<Trajectory> {
        NumericalApproximator::solve(self, fluxes, s0, inputs, dt)
    }

    fn get_fluxes(
        &self,
        fluxes: &[&dyn FluxFunction],
        trajectory: &Trajectory,
        s0: &[Real],
        inputs: &Inputs,
        dt: &Timestep,
    ) -> SimResult<Vec<FluxSeries>> {
        NumericalApproximator::get_fluxes(self, fluxes, trajectory, s0, inputs, dt)
    }
}
