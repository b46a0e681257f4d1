//! Bracketed scalar root finders for per-timestep storage equations.
//!
//! A numerical approximator turns a reservoir mass balance into one scalar
//! equation per timestep. The root finders in this crate solve that equation
//! inside the admissible state interval reported by the flux function:
//!
//! - [`Pegasus`]: secant-like bracketing method, no derivative needed
//! - [`Newton`]: Newton steps safeguarded by bisection, needs derivatives
//! - [`Explicit`]: single evaluation for explicit discretizations
//!
//! Every finder is parameterized by a [`Backend`] marker selected at
//! construction. Pairing a root finder with an approximator of another
//! backend does not type-check.

pub mod backend;
pub mod equation;
pub mod error;
pub mod explicit;
pub mod newton;
pub mod pegasus;
pub mod root_finder;
pub mod settings;

pub use backend::{Backend, BackendKind, Fast, Reference};
pub use equation::{Bracket, Equation, FnEquation, Residual};
pub use error::{SolverError, SolverResult};
pub use explicit::Explicit;
pub use newton::Newton;
pub use pegasus::Pegasus;
pub use root_finder::{Root, RootFinder};
pub use settings::RootSettings;
