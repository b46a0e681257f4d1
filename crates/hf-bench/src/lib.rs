//! Benchmark framework for the reservoir solvers.
//!
//! Every scenario is run with each configured solver, several times, on the
//! demo precipitation series repeated to the requested length. Reference and
//! fast runs of the same rule are compared state by state.

use std::sync::Arc;
use std::time::Instant;

use hf_components::{FluxFunction, LinearReservoir, PowerReservoir, UnsaturatedReservoir};
use hf_core::numeric::Real;
use hf_core::series::{Inputs, Timestep};
use hf_core::timing::{self, solver_timing};
use hf_core::units::days;
use hf_sim::{Reservoir, RootFinderKind, RuleKind, SimError, SolverConfig};
use hf_solver::BackendKind;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Precipitation of the documented demo, in mm per step.
pub const DEMO_PRECIPITATION: [Real; 20] = [
    6.5, 3.0, 0.0, 0.0, 0.0, 2.0, 4.0, 8.0, 2.0, 0.0, 0.0, 2.5, 1.0, 0.0, 4.0, 0.0, 1.0, 0.0, 0.0,
    0.0,
];

#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    #[error("invalid benchmark options: {what}")]
    Options { what: String },

    #[error("scenario '{scenario}' failed: {source}")]
    Scenario {
        scenario: String,
        #[source]
        source: SimError,
    },
}

pub type BenchResult<T> = Result<T, BenchError>;

/// Flux law and parameters of a benchmark reservoir.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum ScenarioModel {
    Linear {
        k: Real,
    },
    Power {
        k: Real,
        alpha: Real,
    },
    Unsaturated {
        smax: Real,
        ce: Real,
        m: Real,
        beta: Real,
        pet: Real,
    },
}

impl ScenarioModel {
    fn flux(&self) -> Arc<dyn FluxFunction> {
        match self {
            ScenarioModel::Linear { .. } => Arc::new(LinearReservoir),
            ScenarioModel::Power { .. } => Arc::new(PowerReservoir),
            ScenarioModel::Unsaturated { .. } => Arc::new(UnsaturatedReservoir),
        }
    }

    fn parameters(&self) -> Inputs {
        match *self {
            ScenarioModel::Linear { k } => Inputs::new().with("k", k),
            ScenarioModel::Power { k, alpha } => Inputs::new().with("k", k).with("alpha", alpha),
            ScenarioModel::Unsaturated {
                smax, ce, m, beta, ..
            } => Inputs::new()
                .with("Smax", smax)
                .with("Ce", ce)
                .with("m", m)
                .with("beta", beta),
        }
    }

    fn inputs(&self, precipitation: Vec<Real>) -> Inputs {
        let inputs = Inputs::new().with("P", precipitation);
        match *self {
            ScenarioModel::Unsaturated { pet, .. } => inputs.with("PET", pet),
            _ => inputs,
        }
    }
}

/// A benchmark scenario definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkScenario {
    /// Unique identifier for this benchmark.
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub model: ScenarioModel,
    pub initial_state: Real,
    /// Step length in days.
    pub dt: Real,
    pub notes: Option<String>,
}

/// Runner settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchOptions {
    /// Timed runs per scenario and solver.
    pub runs: usize,
    /// How many times the demo series is repeated per run.
    pub repeat: usize,
    /// Solvers to compare. Pairs with different backends are compared.
    pub solvers: Vec<SolverConfig>,
}

impl Default for BenchOptions {
    fn default() -> Self {
        let mut solvers = Vec::new();
        for rule in [RuleKind::ImplicitEuler, RuleKind::RungeKutta4] {
            for backend in [BackendKind::Reference, BackendKind::Fast] {
                let mut config = SolverConfig::default();
                config.approximator.rule = rule;
                config.approximator.backend = backend;
                config.root_finder.backend = backend;
                config.root_finder.settings.iter_max = 50;
                if rule == RuleKind::RungeKutta4 {
                    config.root_finder.kind = RootFinderKind::Explicit;
                }
                solvers.push(config);
            }
        }
        Self {
            runs: 5,
            repeat: 50,
            solvers,
        }
    }
}

impl BenchOptions {
    pub fn validate(&self) -> BenchResult<()> {
        if self.runs == 0 || self.repeat == 0 {
            return Err(BenchError::Options {
                what: format!("runs ({}) and repeat ({}) must be positive", self.runs, self.repeat),
            });
        }
        if self.solvers.is_empty() {
            return Err(BenchError::Options {
                what: "no solver configured".to_string(),
            });
        }
        Ok(())
    }
}

/// A single run's timing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunMetrics {
    pub total_time_s: f64,
    /// Time spent in approximator solves, when timing is enabled.
    pub solve_time_s: Option<f64>,
    /// Time spent in flux breakdowns, when timing is enabled.
    pub flux_time_s: Option<f64>,
    pub steps: usize,
    pub final_state: Real,
}

/// Aggregated statistics for multiple runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregateMetrics {
    pub run_count: usize,
    pub total_time_median_s: f64,
    pub total_time_min_s: f64,
    pub total_time_max_s: f64,
    pub solve_time_median_s: Option<f64>,
    pub steps_per_second: Option<f64>,
}

/// Complete benchmark result for one scenario and solver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub scenario_id: String,
    pub solver: SolverConfig,
    pub runs: Vec<RunMetrics>,
    pub aggregate: AggregateMetrics,
    #[serde(skip)]
    pub states: Vec<Real>,
}

impl BenchmarkResult {
    /// Short solver label, e.g. `implicit_euler/pegasus/fast`.
    pub fn label(&self) -> String {
        solver_label(&self.solver)
    }
}

/// Largest state difference between two backends running the same rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackendComparison {
    pub scenario_id: String,
    pub reference: String,
    pub fast: String,
    pub max_abs_difference: Real,
}

/// Collection of benchmark results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkSuite {
    pub timestamp: String,
    pub results: Vec<BenchmarkResult>,
    pub comparisons: Vec<BackendComparison>,
}

pub fn solver_label(config: &SolverConfig) -> String {
    let kind = match config.root_finder.kind {
        RootFinderKind::Pegasus => "pegasus",
        RootFinderKind::Newton => "newton",
        RootFinderKind::Explicit => "explicit",
    };
    let rule = match config.approximator.rule {
        RuleKind::ImplicitEuler => "implicit_euler",
        RuleKind::ExplicitEuler => "explicit_euler",
        RuleKind::RungeKutta4 => "runge_kutta_4",
    };
    format!("{rule}/{kind}/{}", config.approximator.backend)
}

/// Run one scenario with one solver `times` times.
pub fn run_scenario(
    scenario: &BenchmarkScenario,
    solver: &SolverConfig,
    times: usize,
    repeat: usize,
) -> BenchResult<BenchmarkResult> {
    let failed = |source: SimError| BenchError::Scenario {
        scenario: scenario.id.clone(),
        source,
    };
    let approximator = solver.build().map_err(failed)?;
    let precipitation: Vec<Real> = DEMO_PRECIPITATION
        .iter()
        .copied()
        .cycle()
        .take(DEMO_PRECIPITATION.len() * repeat)
        .collect();

    let mut runs = Vec::with_capacity(times);
    let mut states = Vec::new();
    for run in 0..times {
        let mut reservoir = Reservoir::new(
            &scenario.id,
            scenario.model.flux(),
            scenario.model.parameters(),
            Some(scenario.initial_state),
            approximator.clone(),
        )
        .map_err(failed)?;
        reservoir.set_timestep(Timestep::from_duration(days(scenario.dt)));
        reservoir.set_input(scenario.model.inputs(precipitation.clone()));

        solver_timing::reset_all();
        let start = Instant::now();
        reservoir.get_output(true).map_err(failed)?;
        let total_time_s = start.elapsed().as_secs_f64();

        let trajectory = reservoir.trajectory().map_err(failed)?;
        let enabled = timing::is_enabled();
        let metrics = RunMetrics {
            total_time_s,
            solve_time_s: enabled.then(|| solver_timing::APPROXIMATOR_SOLVES.total_seconds()),
            flux_time_s: enabled.then(|| solver_timing::FLUX_BREAKDOWNS.total_seconds()),
            steps: trajectory.num_steps(),
            final_state: reservoir.state().unwrap_or(Real::NAN),
        };
        debug!(scenario = %scenario.id, run, time_s = total_time_s, "run finished");
        if run == 0 {
            states = trajectory.column(0);
        }
        runs.push(metrics);
    }

    let aggregate = compute_aggregates(&runs);
    Ok(BenchmarkResult {
        scenario_id: scenario.id.clone(),
        solver: solver.clone(),
        runs,
        aggregate,
        states,
    })
}

fn median(sorted: &[f64]) -> f64 {
    sorted[sorted.len() / 2]
}

fn sorted(mut values: Vec<f64>) -> Vec<f64> {
    values.sort_by(f64::total_cmp);
    values
}

fn compute_aggregates(runs: &[RunMetrics]) -> AggregateMetrics {
    if runs.is_empty() {
        return AggregateMetrics::default();
    }

    let total_times = sorted(runs.iter().map(|r| r.total_time_s).collect());
    let solve_times = sorted(runs.iter().filter_map(|r| r.solve_time_s).collect());
    let total_time_median_s = median(&total_times);
    let steps_per_second =
        (total_time_median_s > 0.0).then(|| runs[0].steps as f64 / total_time_median_s);

    AggregateMetrics {
        run_count: runs.len(),
        total_time_median_s,
        total_time_min_s: total_times[0],
        total_time_max_s: total_times[total_times.len() - 1],
        solve_time_median_s: (!solve_times.is_empty()).then(|| median(&solve_times)),
        steps_per_second,
    }
}

/// Pair reference and fast results of the same scenario, rule and root
/// finder.
pub fn compare_backends(results: &[BenchmarkResult]) -> Vec<BackendComparison> {
    let mut comparisons = Vec::new();
    for reference in results
        .iter()
        .filter(|r| r.solver.approximator.backend == BackendKind::Reference)
    {
        let counterpart = results.iter().find(|f| {
            f.scenario_id == reference.scenario_id
                && f.solver.approximator.backend == BackendKind::Fast
                && f.solver.approximator.rule == reference.solver.approximator.rule
                && f.solver.root_finder.kind == reference.solver.root_finder.kind
        });
        if let Some(fast) = counterpart {
            let max_abs_difference = reference
                .states
                .iter()
                .zip(&fast.states)
                .map(|(a, b)| (a - b).abs())
                .fold(0.0, Real::max);
            comparisons.push(BackendComparison {
                scenario_id: reference.scenario_id.clone(),
                reference: reference.label(),
                fast: fast.label(),
                max_abs_difference,
            });
        }
    }
    comparisons
}

/// Run every scenario with every configured solver.
pub fn run_suite(
    scenarios: &[BenchmarkScenario],
    options: &BenchOptions,
    timestamp: String,
) -> BenchResult<BenchmarkSuite> {
    options.validate()?;
    let mut results = Vec::new();
    for scenario in scenarios {
        for solver in &options.solvers {
            let result = run_scenario(scenario, solver, options.runs, options.repeat)?;
            info!(
                scenario = %scenario.id,
                solver = %result.label(),
                median_s = result.aggregate.total_time_median_s,
                "benchmark finished"
            );
            results.push(result);
        }
    }
    let comparisons = compare_backends(&results);
    Ok(BenchmarkSuite {
        timestamp,
        results,
        comparisons,
    })
}

/// Default set of benchmark scenarios.
pub fn default_benchmarks() -> Vec<BenchmarkScenario> {
    vec![
        BenchmarkScenario {
            id: "linear".to_string(),
            name: "Linear reservoir".to_string(),
            model: ScenarioModel::Linear { k: 0.01 },
            initial_state: 10.0,
            dt: 1.0,
            notes: Some("Closed-form implicit solution; one secant step per timestep".to_string()),
        },
        BenchmarkScenario {
            id: "power".to_string(),
            name: "Power-law reservoir".to_string(),
            model: ScenarioModel::Power {
                k: 0.01,
                alpha: 2.0,
            },
            initial_state: 10.0,
            dt: 1.0,
            notes: Some("Documented demo parameters".to_string()),
        },
        BenchmarkScenario {
            id: "power_dt2".to_string(),
            name: "Power-law reservoir, two-day steps".to_string(),
            model: ScenarioModel::Power {
                k: 0.01,
                alpha: 2.0,
            },
            initial_state: 10.0,
            dt: 2.0,
            notes: None,
        },
        BenchmarkScenario {
            id: "unsaturated".to_string(),
            name: "Unsaturated reservoir".to_string(),
            model: ScenarioModel::Unsaturated {
                smax: 50.0,
                ce: 1.5,
                m: 0.01,
                beta: 1.5,
                pet: 0.5,
            },
            initial_state: 10.0,
            dt: 1.0,
            notes: Some("HBV soil moisture with constant PET".to_string()),
        },
    ]
}
