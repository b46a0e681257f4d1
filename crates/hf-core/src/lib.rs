//! hf-core: stable foundation for hydroflux.
//!
//! Contains:
//! - numeric (Real + tolerances + float helpers)
//! - error (shared error types)
//! - path (hierarchical element identifiers and qualified keys)
//! - series (time-variant / time-invariant inputs, timesteps)
//! - units (uom constructors for depths and durations)
//! - timing (opt-in solver timing counters)

pub mod error;
pub mod numeric;
pub mod path;
pub mod series;
pub mod timing;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use numeric::*;
pub use path::{ElementPath, QualifiedKey};
pub use series::{Inputs, ResolvedInputs, Series, Timestep};
pub use units::*;
