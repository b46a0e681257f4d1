//! Approximators assembled from configuration files.

mod common;

use std::sync::Arc;

use common::{linear_golden, DEMO_P, GOLDEN};
use hf_components::LinearReservoir;
use hf_core::numeric::all_nearly_equal;
use hf_core::series::Inputs;
use hf_sim::{Reservoir, RootFinderKind, RuleKind, SolverConfig};
use hf_solver::BackendKind;

const CONFIG: &str = "
root_finder:
  kind: pegasus
  backend: fast
  settings:
    tol_f: 1.0e-10
    tol_x: 1.0e-10
    iter_max: 20
approximator:
  rule: implicit_euler
  backend: fast
";

#[test]
fn yaml_config_builds_a_working_approximator() {
    let config = SolverConfig::from_yaml(CONFIG).unwrap();
    assert_eq!(config.root_finder.kind, RootFinderKind::Pegasus);
    assert_eq!(config.root_finder.settings.iter_max, 20);

    let approx = config.build().unwrap();
    assert_eq!(approx.backend(), BackendKind::Fast);

    let mut r = Reservoir::new(
        "FR",
        Arc::new(LinearReservoir),
        Inputs::new().with("k", 0.01),
        Some(10.0),
        approx,
    )
    .unwrap();
    r.set_input(Inputs::new().with("P", DEMO_P.to_vec()));
    r.get_output(true).unwrap();

    let golden = linear_golden(10.0, 0.01, 1.0, &DEMO_P);
    assert!(all_nearly_equal(&r.trajectory().unwrap().column(0), &golden, GOLDEN));
}

#[test]
fn yaml_round_trip_preserves_the_config() {
    let config = SolverConfig::from_yaml(CONFIG).unwrap();
    let text = config.to_yaml().unwrap();
    assert_eq!(SolverConfig::from_yaml(&text).unwrap(), config);
}

#[test]
fn explicit_finder_with_implicit_rule_is_rejected() {
    let config = SolverConfig::from_yaml(
        "
root_finder:
  kind: explicit
approximator:
  rule: implicit_euler
",
    )
    .unwrap();
    assert!(config.build().err().unwrap().is_configuration());
}

#[test]
fn explicit_finder_with_runge_kutta() {
    let config = SolverConfig::from_json(
        r#"{"root_finder": {"kind": "explicit"}, "approximator": {"rule": "runge_kutta_4"}}"#,
    )
    .unwrap();
    assert_eq!(config.approximator.rule, RuleKind::RungeKutta4);
    let approx = config.build().unwrap();
    assert_eq!(approx.name(), "runge_kutta_4");
}

#[test]
fn unknown_rule_is_a_configuration_error() {
    let err = SolverConfig::from_yaml("approximator:\n  rule: crank_nicolson\n").unwrap_err();
    assert!(err.is_configuration());
}
