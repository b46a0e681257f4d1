//! Named inputs and parameters for a solve call.
//!
//! Each value is either time-invariant (a scalar) or time-variant (one value
//! per timestep). The distinction is resolved once per call by
//! [`Inputs::resolve`], which produces a dense row-major table in the order
//! the flux function declared its arguments.

use std::collections::BTreeMap;
use std::ops::Range;

use crate::error::{CoreError, CoreResult};
use crate::numeric::{Real, ensure_positive};
use crate::units::{Time, to_days};

/// Scalar (time-invariant) or vector (time-variant) value.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Series {
    Scalar(Real),
    Vector(Vec<Real>),
}

impl Series {
    /// Number of timesteps for a vector, `None` for a scalar.
    pub fn len(&self) -> Option<usize> {
        match self {
            Series::Scalar(_) => None,
            Series::Vector(v) => Some(v.len()),
        }
    }

    /// Value at timestep `i`. Scalars are broadcast.
    #[inline]
    pub fn at(&self, i: usize) -> Real {
        match self {
            Series::Scalar(v) => *v,
            Series::Vector(v) => v[i],
        }
    }

    /// Restrict a vector to `range`; scalars are returned unchanged.
    pub fn slice(&self, range: Range<usize>) -> Series {
        match self {
            Series::Scalar(v) => Series::Scalar(*v),
            Series::Vector(v) => Series::Vector(v[range].to_vec()),
        }
    }
}

impl From<Real> for Series {
    fn from(v: Real) -> Self {
        Series::Scalar(v)
    }
}

impl From<Vec<Real>> for Series {
    fn from(v: Vec<Real>) -> Self {
        Series::Vector(v)
    }
}

impl From<&[Real]> for Series {
    fn from(v: &[Real]) -> Self {
        Series::Vector(v.to_vec())
    }
}

/// Timestep length, constant or one value per step.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Timestep {
    Constant(Real),
    Varying(Vec<Real>),
}

impl Default for Timestep {
    fn default() -> Self {
        Timestep::Constant(1.0)
    }
}

impl Timestep {
    /// Timestep expressed in days from a dimensioned duration.
    pub fn from_duration(duration: Time) -> Self {
        Timestep::Constant(to_days(duration))
    }

    pub fn len(&self) -> Option<usize> {
        match self {
            Timestep::Constant(_) => None,
            Timestep::Varying(v) => Some(v.len()),
        }
    }

    pub fn slice(&self, range: Range<usize>) -> Timestep {
        match self {
            Timestep::Constant(v) => Timestep::Constant(*v),
            Timestep::Varying(v) => Timestep::Varying(v[range].to_vec()),
        }
    }

    /// Broadcast into one value per step, rejecting non-positive lengths.
    fn expand(&self, num_steps: usize) -> CoreResult<Vec<Real>> {
        match self {
            Timestep::Constant(dt) => {
                let dt = ensure_positive(*dt, "dt")?;
                Ok(vec![dt; num_steps])
            }
            Timestep::Varying(v) => v.iter().map(|dt| ensure_positive(*dt, "dt")).collect(),
        }
    }
}

impl From<Real> for Timestep {
    fn from(v: Real) -> Self {
        Timestep::Constant(v)
    }
}

/// Named inputs and parameters handed to a solve call.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Inputs {
    values: BTreeMap<String, Series>,
}

impl Inputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Series>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Series>) -> Option<Series> {
        self.values.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&Series> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Series)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Merge `other` into a copy of `self`; keys of `other` win.
    pub fn merged(&self, other: &Inputs) -> Inputs {
        let mut values = self.values.clone();
        for (k, v) in &other.values {
            values.insert(k.clone(), v.clone());
        }
        Inputs { values }
    }

    /// Restrict every vector to `range`.
    pub fn slice(&self, range: Range<usize>) -> Inputs {
        Inputs {
            values: self
                .values
                .iter()
                .map(|(k, v)| (k.clone(), v.slice(range.clone())))
                .collect(),
        }
    }

    /// Number of timesteps implied by the vectors (and a varying `dt`).
    ///
    /// All vectors must have the same length. With no vector at all the call
    /// covers a single timestep.
    pub fn num_steps(&self, dt: &Timestep) -> CoreResult<usize> {
        let mut expected: Option<(String, usize)> = None;
        let lengths = self
            .values
            .iter()
            .filter_map(|(k, v)| v.len().map(|n| (k.clone(), n)))
            .chain(dt.len().map(|n| ("dt".to_string(), n)));

        for (name, n) in lengths {
            match &expected {
                None => expected = Some((name, n)),
                Some((_, e)) if *e == n => {}
                Some((_, e)) => {
                    return Err(CoreError::LengthMismatch {
                        what: name,
                        expected: *e,
                        found: n,
                    });
                }
            }
        }
        Ok(expected.map(|(_, n)| n).unwrap_or(1))
    }

    /// Resolve `names` (in order) into a dense per-step table.
    pub fn resolve(&self, names: &[&str], dt: &Timestep) -> CoreResult<ResolvedInputs> {
        let num_steps = self.num_steps(dt)?;
        let columns = names
            .iter()
            .map(|name| {
                self.values.get(*name).ok_or_else(|| CoreError::MissingKey {
                    key: (*name).to_string(),
                })
            })
            .collect::<CoreResult<Vec<_>>>()?;

        let width = columns.len();
        let mut values = Vec::with_capacity(width * num_steps);
        for i in 0..num_steps {
            values.extend(columns.iter().map(|c| c.at(i)));
        }

        Ok(ResolvedInputs {
            width,
            num_steps,
            values,
            dt: dt.expand(num_steps)?,
        })
    }
}

/// Per-step argument table produced by [`Inputs::resolve`].
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedInputs {
    width: usize,
    num_steps: usize,
    values: Vec<Real>,
    dt: Vec<Real>,
}

impl ResolvedInputs {
    pub fn num_steps(&self) -> usize {
        self.num_steps
    }

    /// Argument values of step `i`, in declared order.
    #[inline]
    pub fn row(&self, i: usize) -> &[Real] {
        &self.values[i * self.width..(i + 1) * self.width]
    }

    #[inline]
    pub fn dt(&self, i: usize) -> Real {
        self.dt[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_are_broadcast_and_order_follows_names() {
        let inputs = Inputs::new()
            .with("P", vec![1.0, 2.0, 3.0])
            .with("k", 0.5);
        let resolved = inputs.resolve(&["k", "P"], &Timestep::Constant(1.0)).unwrap();
        assert_eq!(resolved.num_steps(), 3);
        assert_eq!(resolved.row(0), &[0.5, 1.0]);
        assert_eq!(resolved.row(2), &[0.5, 3.0]);
        assert_eq!(resolved.dt(2), 1.0);
    }

    #[test]
    fn only_scalars_means_one_step() {
        let inputs = Inputs::new().with("P", 2.0);
        assert_eq!(inputs.num_steps(&Timestep::Constant(1.0)).unwrap(), 1);
    }

    #[test]
    fn varying_dt_sets_the_length() {
        let inputs = Inputs::new().with("k", 0.1);
        let dt = Timestep::Varying(vec![1.0, 2.0]);
        let resolved = inputs.resolve(&["k"], &dt).unwrap();
        assert_eq!(resolved.num_steps(), 2);
        assert_eq!(resolved.dt(1), 2.0);
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let inputs = Inputs::new()
            .with("P", vec![1.0, 2.0, 3.0])
            .with("PET", vec![1.0, 2.0]);
        let err = inputs.num_steps(&Timestep::Constant(1.0)).unwrap_err();
        assert!(matches!(err, CoreError::LengthMismatch { .. }));

        let inputs = Inputs::new().with("P", vec![1.0, 2.0]);
        let err = inputs
            .num_steps(&Timestep::Varying(vec![1.0, 1.0, 1.0]))
            .unwrap_err();
        assert!(matches!(err, CoreError::LengthMismatch { .. }));
    }

    #[test]
    fn missing_name_is_reported() {
        let inputs = Inputs::new().with("P", vec![1.0]);
        let err = inputs.resolve(&["P", "k"], &Timestep::Constant(1.0)).unwrap_err();
        assert_eq!(err, CoreError::MissingKey { key: "k".into() });
    }

    #[test]
    fn non_positive_dt_is_rejected() {
        let inputs = Inputs::new().with("P", vec![1.0]);
        assert!(inputs.resolve(&["P"], &Timestep::Constant(0.0)).is_err());
        assert!(inputs.resolve(&["P"], &Timestep::Varying(vec![-1.0])).is_err());
    }

    #[test]
    fn slice_keeps_scalars() {
        let inputs = Inputs::new()
            .with("P", vec![1.0, 2.0, 3.0, 4.0])
            .with("k", 0.1);
        let tail = inputs.slice(2..4);
        assert_eq!(tail.get("P"), Some(&Series::Vector(vec![3.0, 4.0])));
        assert_eq!(tail.get("k"), Some(&Series::Scalar(0.1)));
    }

    #[test]
    fn merged_prefers_right_hand_side() {
        let a = Inputs::new().with("k", 0.1).with("P", 1.0);
        let b = Inputs::new().with("k", 0.2);
        let m = a.merged(&b);
        assert_eq!(m.get("k"), Some(&Series::Scalar(0.2)));
        assert_eq!(m.len(), 2);
    }

    #[test]
    fn empty_vectors_give_zero_steps() {
        let inputs = Inputs::new().with("P", Vec::<Real>::new());
        let resolved = inputs.resolve(&["P"], &Timestep::Constant(1.0)).unwrap();
        assert_eq!(resolved.num_steps(), 0);
    }
}
