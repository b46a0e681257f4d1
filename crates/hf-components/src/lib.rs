//! hf-components: flux functions for conceptual reservoirs.
//!
//! A flux function maps a trial storage and the data of one timestep to the
//! signed fluxes acting on a reservoir (positive = incoming). It also reports
//! the admissible storage interval, which the root finder uses as bracket.
//!
//! Provided models:
//! - [`LinearReservoir`]: `dS/dt = P - k S`
//! - [`PowerReservoir`]: `dS/dt = P - k S^alpha`
//! - [`UnsaturatedReservoir`]: HBV soil moisture store with evapotranspiration
//!
//! # Example
//!
//! ```
//! use hf_components::{FluxFunction, LinearReservoir, Step};
//!
//! let flux = LinearReservoir;
//! let args = [6.5, 0.5]; // P, k
//! let step = Step { index: 0, s0: 10.0, dt: 1.0, args: &args };
//!
//! let mut q = [0.0; 2];
//! flux.fluxes(12.0, &step, &mut q);
//! assert_eq!(q, [6.5, -6.0]);
//! assert_eq!(flux.bounds(&step), (0.0, 16.5));
//! ```

pub mod error;
pub mod linear;
pub mod power;
pub mod traits;
pub mod unsaturated;

pub use error::{FluxError, FluxResult};
pub use linear::LinearReservoir;
pub use power::PowerReservoir;
pub use traits::{FluxFunction, Step};
pub use unsaturated::UnsaturatedReservoir;
