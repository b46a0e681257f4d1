//! Solved state trajectories and flux breakdowns.

use hf_core::error::CoreError;
use hf_core::numeric::Real;
use hf_solver::SolverError;
use nalgebra::DMatrix;

use crate::error::{SimError, SimResult};

/// States of one solve call: one row per timestep, one column per equation.
#[derive(Clone, Debug, PartialEq)]
pub struct Trajectory {
    states: DMatrix<Real>,
}

impl Trajectory {
    pub fn new(states: DMatrix<Real>) -> Self {
        Self { states }
    }

    /// Build from per-equation columns of equal length.
    pub fn from_columns(columns: &[Vec<Real>]) -> SimResult<Self> {
        let num_steps = columns.first().map_or(0, Vec::len);
        for c in columns {
            if c.len() != num_steps {
                return Err(CoreError::LengthMismatch {
                    what: "trajectory column".to_string(),
                    expected: num_steps,
                    found: c.len(),
                }
                .into());
            }
        }
        Ok(Self {
            states: DMatrix::from_fn(num_steps, columns.len(), |i, j| columns[j][i]),
        })
    }

    pub fn num_steps(&self) -> usize {
        self.states.nrows()
    }

    pub fn num_equations(&self) -> usize {
        self.states.ncols()
    }

    pub fn states(&self) -> &DMatrix<Real> {
        &self.states
    }

    #[inline]
    pub fn get(&self, step: usize, equation: usize) -> Real {
        self.states[(step, equation)]
    }

    /// States of one equation over all timesteps.
    pub fn column(&self, equation: usize) -> Vec<Real> {
        self.states.column(equation).iter().copied().collect()
    }

    /// Last row, i.e. the states carried into the next call.
    pub fn terminal(&self) -> Option<Vec<Real>> {
        let n = self.num_steps();
        (n > 0).then(|| self.states.row(n - 1).iter().copied().collect())
    }

    /// Stack `other` below `self`.
    pub fn concat(&self, other: &Trajectory) -> SimResult<Trajectory> {
        if self.num_equations() != other.num_equations() {
            return Err(CoreError::LengthMismatch {
                what: "trajectory equations".to_string(),
                expected: self.num_equations(),
                found: other.num_equations(),
            }
            .into());
        }
        let split = self.num_steps();
        let states = DMatrix::from_fn(split + other.num_steps(), self.num_equations(), |i, j| {
            if i < split {
                self.states[(i, j)]
            } else {
                other.states[(i - split, j)]
            }
        });
        Ok(Trajectory { states })
    }
}

/// Per-timestep values of the individual fluxes of one equation.
#[derive(Clone, Debug, PartialEq)]
pub struct FluxSeries {
    names: Vec<&'static str>,
    values: DMatrix<Real>,
}

impl FluxSeries {
    pub(crate) fn new(names: &[&'static str], values: DMatrix<Real>) -> Self {
        Self {
            names: names.to_vec(),
            values,
        }
    }

    pub fn names(&self) -> &[&'static str] {
        &self.names
    }

    pub fn num_steps(&self) -> usize {
        self.values.nrows()
    }

    pub fn values(&self) -> &DMatrix<Real> {
        &self.values
    }

    /// Signed values of flux number `index`.
    pub fn column(&self, index: usize) -> Vec<Real> {
        self.values.column(index).iter().copied().collect()
    }

    /// Signed values of the flux called `name`.
    pub fn get(&self, name: &str) -> Option<Vec<Real>> {
        self.names
            .iter()
            .position(|n| *n == name)
            .map(|i| self.column(i))
    }
}

/// A timestep the root finder could not solve.
#[derive(Clone, Debug, PartialEq)]
pub struct StepFailure {
    pub equation: usize,
    pub step: usize,
    pub error: SolverError,
}

impl From<StepFailure> for SimError {
    fn from(f: StepFailure) -> Self {
        SimError::Step {
            step: f.step,
            equation: f.equation,
            source: f.error,
        }
    }
}

/// Outcome of a degraded solve.
///
/// From the first failing step of an equation on, its column holds NaN.
/// A non-empty `failures` list means the trajectory is not a solution.
#[derive(Clone, Debug, PartialEq)]
#[must_use = "failures must be inspected"]
pub struct DegradedSolution {
    pub trajectory: Trajectory,
    pub failures: Vec<StepFailure>,
}

impl DegradedSolution {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// The trajectory, or the earliest failure as the error a checked solve
    /// would have raised.
    pub fn into_result(self) -> SimResult<Trajectory> {
        match self.failures.into_iter().next() {
            None => Ok(self.trajectory),
            Some(f) => Err(f.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_become_matrix_columns() {
        let t = Trajectory::from_columns(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        assert_eq!(t.num_steps(), 3);
        assert_eq!(t.num_equations(), 2);
        assert_eq!(t.get(1, 1), 5.0);
        assert_eq!(t.terminal(), Some(vec![3.0, 6.0]));
        assert_eq!(t.column(0), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn ragged_columns_are_rejected() {
        assert!(Trajectory::from_columns(&[vec![1.0], vec![1.0, 2.0]]).is_err());
    }

    #[test]
    fn concat_stacks_rows() {
        let a = Trajectory::from_columns(&[vec![1.0, 2.0]]).unwrap();
        let b = Trajectory::from_columns(&[vec![3.0]]).unwrap();
        assert_eq!(a.concat(&b).unwrap().column(0), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn empty_trajectory_has_no_terminal_state() {
        let t = Trajectory::from_columns(&[vec![]]).unwrap();
        assert_eq!(t.terminal(), None);
    }

    #[test]
    fn degraded_solution_reports_first_failure() {
        let solution = DegradedSolution {
            trajectory: Trajectory::from_columns(&[vec![1.0, Real::NAN]]).unwrap(),
            failures: vec![StepFailure {
                equation: 0,
                step: 1,
                error: SolverError::Numeric { what: "nan".into() },
            }],
        };
        assert!(!solution.is_complete());
        let err = solution.into_result().unwrap_err();
        assert!(matches!(err, SimError::Step { step: 1, .. }));
    }

    #[test]
    fn flux_series_lookup_by_name() {
        let fs = FluxSeries::new(&["P", "Q"], DMatrix::from_row_slice(2, 2, &[1.0, -0.5, 2.0, -0.7]));
        assert_eq!(fs.get("Q"), Some(vec![-0.5, -0.7]));
        assert_eq!(fs.get("E"), None);
    }
}
