//! Stateful reservoir element.
//!
//! A reservoir owns its storage between solve calls. Each output request
//! snapshots the current storage as the initial state of the call, integrates
//! the inputs with the shared approximator and keeps the terminal storage for
//! the next request, so a long series can be processed in consecutive chunks.
//!
//! Parameters and states are addressed from outside through qualified keys
//! (`path:name`), where the path is the element's position in the model tree.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use hf_components::FluxFunction;
use hf_core::error::CoreError;
use hf_core::numeric::Real;
use hf_core::path::{ElementPath, QualifiedKey};
use hf_core::series::{Inputs, Series, Timestep};
use tracing::debug;

use crate::approximator::Approximator;
use crate::error::{SimError, SimResult};
use crate::trajectory::{FluxSeries, Trajectory};

/// Local name of the storage state.
pub const STORAGE: &str = "S0";

pub struct Reservoir {
    path: ElementPath,
    flux: Arc<dyn FluxFunction>,
    approximator: Arc<dyn Approximator>,
    parameters: Inputs,
    initial_state: Option<Real>,
    state: Option<Real>,
    solver_state: Option<Real>,
    input: Inputs,
    dt: Timestep,
    trajectory: Option<Trajectory>,
    fluxes: Option<FluxSeries>,
}

impl fmt::Debug for Reservoir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reservoir")
            .field("path", &self.path)
            .field("flux", &self.flux.name())
            .field("approximator", &self.approximator.name())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Reservoir {
    /// Create a reservoir.
    ///
    /// With `initial_state = None` the storage is unset and the first solve
    /// starts from zero. Parameters are only checked when a solve needs them.
    pub fn new(
        id: &str,
        flux: Arc<dyn FluxFunction>,
        parameters: Inputs,
        initial_state: Option<Real>,
        approximator: Arc<dyn Approximator>,
    ) -> SimResult<Self> {
        if let Some(s) = initial_state {
            if !s.is_finite() {
                return Err(SimError::Configuration {
                    what: format!("initial state of '{id}' is {s}"),
                });
            }
        }
        Ok(Self {
            path: ElementPath::root(id)?,
            flux,
            approximator,
            parameters,
            initial_state,
            state: initial_state,
            solver_state: None,
            input: Inputs::new(),
            dt: Timestep::default(),
            trajectory: None,
            fluxes: None,
        })
    }

    pub fn id(&self) -> &str {
        self.path.id()
    }

    pub fn path(&self) -> &ElementPath {
        &self.path
    }

    /// Place the reservoir inside a container.
    pub fn nest_in(&mut self, parent: &ElementPath) {
        self.path = self.path.nested_in(parent);
    }

    pub fn flux_function(&self) -> &dyn FluxFunction {
        self.flux.as_ref()
    }

    pub fn set_timestep(&mut self, dt: Timestep) {
        self.dt = dt;
    }

    pub fn timestep(&self) -> &Timestep {
        &self.dt
    }

    /// Set the time series driving the reservoir (e.g. `P`, `PET`).
    pub fn set_input(&mut self, input: Inputs) {
        self.input = input;
    }

    /// Current storage; `None` while unset.
    pub fn state(&self) -> Option<Real> {
        self.state
    }

    /// Storage used as initial state by the last solve.
    pub fn solver_state(&self) -> Option<Real> {
        self.solver_state
    }

    pub fn states(&self) -> BTreeMap<QualifiedKey, Option<Real>> {
        BTreeMap::from([(self.path.key(STORAGE), self.state)])
    }

    pub fn parameters(&self) -> BTreeMap<QualifiedKey, Series> {
        self.parameters
            .iter()
            .map(|(name, value)| (self.path.key(name), value.clone()))
            .collect()
    }

    /// Update states from qualified keys. Keys of other elements or unknown
    /// names are configuration errors and leave the state untouched.
    pub fn set_states<'k>(
        &mut self,
        states: impl IntoIterator<Item = (&'k QualifiedKey, Real)>,
    ) -> SimResult<()> {
        let mut update = None;
        for (key, value) in states {
            if !key.belongs_to(&self.path) || key.name != STORAGE {
                return Err(SimError::Configuration {
                    what: format!("unknown state '{key}' for element '{}'", self.path),
                });
            }
            if !value.is_finite() {
                return Err(SimError::Configuration {
                    what: format!("state '{key}' set to {value}"),
                });
            }
            update = Some(value);
        }
        if update.is_some() {
            self.state = update;
        }
        Ok(())
    }

    /// Update existing parameters from qualified keys.
    pub fn set_parameters<'k>(
        &mut self,
        parameters: impl IntoIterator<Item = (&'k QualifiedKey, Series)>,
    ) -> SimResult<()> {
        let mut staged = self.parameters.clone();
        for (key, value) in parameters {
            if !key.belongs_to(&self.path) || !self.parameters.contains(&key.name) {
                return Err(SimError::Configuration {
                    what: format!("unknown parameter '{key}' for element '{}'", self.path),
                });
            }
            staged.insert(key.name.clone(), value);
        }
        self.parameters = staged;
        Ok(())
    }

    /// Restore the construction-time storage (unset stays unset).
    ///
    /// Stored trajectories and fluxes are kept until the next solve.
    pub fn reset_states(&mut self) {
        self.state = self.initial_state;
    }

    fn arguments(&self) -> Inputs {
        self.parameters.merged(&self.input)
    }

    /// Integrate the current inputs and return the outflow series.
    ///
    /// With `solve = false` the outflows are recomputed from the stored
    /// trajectory without solving again.
    pub fn get_output(&mut self, solve: bool) -> SimResult<Vec<Vec<Real>>> {
        let arguments = self.arguments();
        let flux = self.flux.as_ref();

        if solve {
            let s0 = self.state.unwrap_or(0.0);
            let trajectory = self.approximator.solve(&[flux], &[s0], &arguments, &self.dt)?;
            self.solver_state = Some(s0);
            if let Some(terminal) = trajectory.terminal() {
                self.state = Some(terminal[0]);
            }
            debug!(element = %self.path, steps = trajectory.num_steps(), state = ?self.state, "solved");
            self.trajectory = Some(trajectory);
        }

        let (trajectory, s0) = match (&self.trajectory, self.solver_state) {
            (Some(t), Some(s0)) => (t, s0),
            _ => {
                return Err(SimError::StateConsistency {
                    what: format!("'{}' has no solved trajectory yet", self.path),
                });
            }
        };

        let breakdown = self
            .approximator
            .get_fluxes(&[flux], trajectory, &[s0], &arguments, &self.dt)?
            .pop()
            .ok_or_else(|| SimError::StateConsistency {
                what: format!("no flux breakdown for '{}'", self.path),
            })?;

        let outputs = flux
            .outputs()
            .iter()
            .map(|&i| breakdown.column(i).into_iter().map(|q| -q).collect())
            .collect();
        self.fluxes = Some(breakdown);
        Ok(outputs)
    }

    /// Stored trajectory of the last solve.
    pub fn trajectory(&self) -> SimResult<&Trajectory> {
        self.trajectory
            .as_ref()
            .ok_or_else(|| SimError::StateConsistency {
                what: format!("'{}' has no solved trajectory yet", self.path),
            })
    }

    /// Flux breakdown of the last output request.
    pub fn fluxes(&self) -> SimResult<&FluxSeries> {
        self.fluxes
            .as_ref()
            .ok_or_else(|| SimError::StateConsistency {
                what: format!("fluxes of '{}' requested before a solve", self.path),
            })
    }

    /// Signed series of one flux, e.g. `AET` of an unsaturated reservoir.
    pub fn flux(&self, name: &str) -> SimResult<Vec<Real>> {
        self.fluxes()?.get(name).ok_or_else(|| {
            CoreError::MissingKey {
                key: self.path.key(name).to_string(),
            }
            .into()
        })
    }
}
