//! Time integration of reservoir storage equations.
//!
//! Provides:
//! - Discretization rules (implicit Euler, explicit Euler, RK4)
//! - `NumericalApproximator`: sequential per-timestep root solves
//! - Flux breakdown of solved trajectories
//! - Stateful `Reservoir` element with resumable solves and reset
//! - Concurrent solves of independent reservoirs
//! - Serializable solver configuration

pub mod approximator;
pub mod config;
pub mod discretization;
pub mod error;
pub mod layer;
pub mod reservoir;
pub mod trajectory;

pub use approximator::{Approximator, NumericalApproximator};
pub use config::{ApproximatorConfig, RootFinderConfig, RootFinderKind, RuleKind, SolverConfig};
pub use discretization::{Discretization, ExplicitEuler, ImplicitEuler, RungeKutta4, Scratch};
pub use error::{SimError, SimResult};
pub use layer::solve_layer;
pub use reservoir::{Reservoir, STORAGE};
pub use trajectory::{DegradedSolution, FluxSeries, StepFailure, Trajectory};
