//! Pegasus method: regula falsi with the Pegasus modification.
//!
//! Each iteration takes the secant between the bracket ends, clamps it into
//! the bracket and keeps the end whose residual has the opposite sign. When
//! the same end would be retained twice its residual is scaled down, which
//! prevents the one-sided stagnation of plain regula falsi.

use core::marker::PhantomData;

use tracing::{trace, warn};

use crate::backend::Backend;
use crate::equation::{Bracket, Equation};
use crate::error::{SolverError, SolverResult};
use crate::root_finder::{evaluate, Root, RootFinder};
use crate::settings::RootSettings;

#[derive(Clone, Copy, Debug, Default)]
pub struct Pegasus<B: Backend> {
    settings: RootSettings,
    backend: PhantomData<B>,
}

impl<B: Backend> Pegasus<B> {
    pub fn new(settings: RootSettings) -> SolverResult<Self> {
        settings.validate()?;
        Ok(Self {
            settings,
            backend: PhantomData,
        })
    }
}

impl<B: Backend> RootFinder for Pegasus<B> {
    type Backend = B;

    fn settings(&self) -> RootSettings {
        self.settings
    }

    fn solve(&self, eq: &mut dyn Equation) -> SolverResult<Root> {
        let RootSettings {
            tol_f,
            tol_x,
            iter_max,
        } = self.settings;

        let Bracket { lo: mut a, hi: mut b } = eq.bracket();
        let mut fa = evaluate::<B>(eq, a)?.value;
        let mut fb = evaluate::<B>(eq, b)?.value;
        let mut evaluations = 2;

        if fa.abs() < tol_f {
            return Ok(Root {
                x: a,
                iterations: 0,
                evaluations,
            });
        }
        if fb.abs() < tol_f {
            return Ok(Root {
                x: b,
                iterations: 0,
                evaluations,
            });
        }
        if fa * fb > 0.0 {
            return Err(SolverError::Bracket {
                lo: a,
                hi: b,
                f_lo: fa,
                f_hi: fb,
            });
        }

        for j in 0..iter_max {
            let dx = -(fa / (fb - fa)) * (b - a);
            let mut root = a + dx;

            let (x_min, x_max) = (a.min(b), a.max(b));
            if root < x_min {
                root = x_min;
            }
            if root > x_max {
                root = x_max;
            }

            let f_root = evaluate::<B>(eq, root)?.value;
            evaluations += 1;

            if f_root * fa < 0.0 {
                b = a;
                fb = fa;
            } else {
                fb *= fa / (fa + f_root);
            }
            a = root;
            fa = f_root;

            if B::INSTRUMENTED {
                trace!(iteration = j, x = a, residual = fa, width = (a - b).abs(), "pegasus step");
            }

            if fa.abs() < tol_f || (a - b).abs() < tol_x {
                return Ok(Root {
                    x: a,
                    iterations: j + 1,
                    evaluations,
                });
            }
        }

        warn!(iter_max, x = a, residual = fa, "pegasus did not converge");
        Err(SolverError::ConvergenceFailed {
            iter_max,
            x: a,
            residual: fa,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Fast, Reference};
    use crate::equation::{FnEquation, Residual};
    use hf_core::numeric::Real;

    fn linear_store(s0: Real, p: Real, k: Real) -> FnEquation<impl FnMut(Real) -> Residual> {
        // implicit Euler, dt = 1
        FnEquation::new(Bracket::new(0.0, s0 + p), move |s| {
            Residual::value((s - s0) - (p - k * s))
        })
    }

    #[test]
    fn solves_linear_store() {
        let finder = Pegasus::<Reference>::new(RootSettings::default()).unwrap();
        let mut eq = linear_store(10.0, 6.5, 0.1);
        let root = finder.solve(&mut eq).unwrap();
        let exact = (10.0 + 6.5) / 1.1;
        assert!((root.x - exact).abs() < 1e-8);
        assert!(root.iterations <= 10);
    }

    #[test]
    fn returns_bracket_end_that_is_already_a_root() {
        let finder = Pegasus::<Reference>::new(RootSettings::default()).unwrap();
        let mut eq = FnEquation::new(Bracket::new(0.0, 4.0), |x| Residual::value(x));
        let root = finder.solve(&mut eq).unwrap();
        assert_eq!(root.x, 0.0);
        assert_eq!(root.iterations, 0);
        assert_eq!(root.evaluations, 2);
    }

    #[test]
    fn same_sign_bracket_is_rejected() {
        let finder = Pegasus::<Reference>::new(RootSettings::default()).unwrap();
        let mut eq = FnEquation::new(Bracket::new(1.0, 2.0), |x| Residual::value(x * x + 1.0));
        let err = finder.solve(&mut eq).unwrap_err();
        assert!(matches!(err, SolverError::Bracket { .. }));
    }

    #[test]
    fn reports_non_convergence() {
        let settings = RootSettings::new(1e-14, 1e-14, 2).unwrap();
        let finder = Pegasus::<Reference>::new(settings).unwrap();
        let mut eq = FnEquation::new(Bracket::new(0.0, 10.0), |x| Residual::value(x.powi(5) - 2.0));
        let err = finder.solve(&mut eq).unwrap_err();
        assert!(matches!(err, SolverError::ConvergenceFailed { iter_max: 2, .. }));
    }

    #[test]
    fn reference_rejects_non_finite_residuals() {
        let finder = Pegasus::<Reference>::new(RootSettings::default()).unwrap();
        let mut eq = FnEquation::new(Bracket::new(0.0, 1.0), |_| Residual::value(Real::NAN));
        let err = finder.solve(&mut eq).unwrap_err();
        assert!(matches!(err, SolverError::Numeric { .. }));
    }

    #[test]
    fn backends_agree_bitwise() {
        let reference = Pegasus::<Reference>::new(RootSettings::default()).unwrap();
        let fast = Pegasus::<Fast>::new(RootSettings::default()).unwrap();
        let a = reference.solve(&mut linear_store(3.0, 2.0, 0.25)).unwrap();
        let b = fast.solve(&mut linear_store(3.0, 2.0, 0.25)).unwrap();
        assert_eq!(a.x.to_bits(), b.x.to_bits());
        assert_eq!(a.iterations, b.iterations);
    }
}
