//! Serializable solver configuration.
//!
//! Approximators built in code pair backends through the type system. When
//! the pairing comes from a file instead, both halves name their backend and
//! [`SolverConfig::build`] rejects a mismatch before anything is solved.
//!
//! ```yaml
//! root_finder:
//!   kind: pegasus
//!   backend: reference
//!   settings:
//!     tol_f: 1.0e-8
//!     tol_x: 1.0e-8
//!     iter_max: 10
//! approximator:
//!   rule: implicit_euler
//!   backend: reference
//! ```

use std::sync::Arc;

use hf_solver::{BackendKind, Explicit, Fast, Newton, Pegasus, Reference, RootSettings};
use serde::{Deserialize, Serialize};

use crate::approximator::{Approximator, NumericalApproximator};
use crate::discretization::{Discretization, ExplicitEuler, ImplicitEuler, RungeKutta4};
use crate::error::{SimError, SimResult};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RootFinderKind {
    #[default]
    Pegasus,
    Newton,
    Explicit,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    #[default]
    ImplicitEuler,
    ExplicitEuler,
    #[serde(rename = "runge_kutta_4")]
    RungeKutta4,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RootFinderConfig {
    pub kind: RootFinderKind,
    pub backend: BackendKind,
    pub settings: RootSettings,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApproximatorConfig {
    pub rule: RuleKind,
    pub backend: BackendKind,
}

/// Root finder and approximator selection.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub root_finder: RootFinderConfig,
    pub approximator: ApproximatorConfig,
}

impl SolverConfig {
    pub fn from_yaml(text: &str) -> SimResult<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_json(text: &str) -> SimResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_yaml(&self) -> SimResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Build the configured approximator.
    pub fn build(&self) -> SimResult<Arc<dyn Approximator>> {
        let finder = &self.root_finder;
        if finder.backend != self.approximator.backend {
            return Err(SimError::Configuration {
                what: format!(
                    "root finder backend '{}' does not match approximator backend '{}'",
                    finder.backend, self.approximator.backend
                ),
            });
        }
        match self.approximator.rule {
            RuleKind::ImplicitEuler => build_with(ImplicitEuler, finder),
            RuleKind::ExplicitEuler => build_with(ExplicitEuler, finder),
            RuleKind::RungeKutta4 => build_with(RungeKutta4, finder),
        }
    }
}

fn build_with<D: Discretization>(
    rule: D,
    finder: &RootFinderConfig,
) -> SimResult<Arc<dyn Approximator>> {
    let settings = finder.settings;
    let approx: Arc<dyn Approximator> = match (finder.kind, finder.backend) {
        (RootFinderKind::Pegasus, BackendKind::Reference) => Arc::new(NumericalApproximator::new(
            rule,
            Pegasus::<Reference>::new(settings)?,
        )?),
        (RootFinderKind::Pegasus, BackendKind::Fast) => Arc::new(NumericalApproximator::new(
            rule,
            Pegasus::<Fast>::new(settings)?,
        )?),
        (RootFinderKind::Newton, BackendKind::Reference) => Arc::new(NumericalApproximator::new(
            rule,
            Newton::<Reference>::new(settings)?,
        )?),
        (RootFinderKind::Newton, BackendKind::Fast) => {
            Arc::new(NumericalApproximator::new(rule, Newton::<Fast>::new(settings)?)?)
        }
        (RootFinderKind::Explicit, BackendKind::Reference) => Arc::new(
            NumericalApproximator::new(rule, Explicit::<Reference>::new())?,
        ),
        (RootFinderKind::Explicit, BackendKind::Fast) => {
            Arc::new(NumericalApproximator::new(rule, Explicit::<Fast>::new())?)
        }
    };
    Ok(approx)
}
