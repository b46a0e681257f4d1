//! Root finder for explicit discretizations.
//!
//! Explicit schemes produce equations of the form `x - c = 0` where `c` does
//! not depend on `x`, so one evaluation at zero gives the root directly.

use core::marker::PhantomData;

use tracing::trace;

use crate::backend::Backend;
use crate::equation::Equation;
use crate::error::SolverResult;
use crate::root_finder::{evaluate, Root, RootFinder};
use crate::settings::RootSettings;

#[derive(Clone, Copy, Debug, Default)]
pub struct Explicit<B: Backend> {
    backend: PhantomData<B>,
}

impl<B: Backend> Explicit<B> {
    pub fn new() -> Self {
        Self {
            backend: PhantomData,
        }
    }
}

impl<B: Backend> RootFinder for Explicit<B> {
    type Backend = B;

    /// Tolerances are unused; the defaults are reported.
    fn settings(&self) -> RootSettings {
        RootSettings::default()
    }

    fn is_iterative(&self) -> bool {
        false
    }

    fn solve(&self, eq: &mut dyn Equation) -> SolverResult<Root> {
        let x = -evaluate::<B>(eq, 0.0)?.value;
        if B::INSTRUMENTED {
            trace!(x, "explicit update");
        }
        Ok(Root {
            x,
            iterations: 0,
            evaluations: 1,
        })
    }
}
