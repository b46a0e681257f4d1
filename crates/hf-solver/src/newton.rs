//! Newton-Raphson with a bisection safeguard.
//!
//! Iteration starts at the bracket midpoint. Every evaluation shrinks the
//! bracket `[a, b]` towards the sign change; a Newton step that lands outside
//! the current bracket, or that comes from a flat or infinite slope, is
//! replaced by a bisection.

use core::marker::PhantomData;

use hf_core::numeric::Real;
use tracing::{trace, warn};

use crate::backend::Backend;
use crate::equation::{Equation, Residual};
use crate::error::{SolverError, SolverResult};
use crate::root_finder::{evaluate, Root, RootFinder};
use crate::settings::RootSettings;

#[derive(Clone, Copy, Debug, Default)]
pub struct Newton<B: Backend> {
    settings: RootSettings,
    backend: PhantomData<B>,
}

impl<B: Backend> Newton<B> {
    pub fn new(settings: RootSettings) -> SolverResult<Self> {
        settings.validate()?;
        Ok(Self {
            settings,
            backend: PhantomData,
        })
    }
}

fn derivative_of(r: &Residual, x: Real) -> SolverResult<Real> {
    r.derivative.ok_or_else(|| {
        SolverError::configuration(format!(
            "Newton needs residual derivatives but none was provided at x = {x}"
        ))
    })
}

impl<B: Backend> RootFinder for Newton<B> {
    type Backend = B;

    fn settings(&self) -> RootSettings {
        self.settings
    }

    fn requires_derivative(&self) -> bool {
        true
    }

    fn solve(&self, eq: &mut dyn Equation) -> SolverResult<Root> {
        let RootSettings {
            tol_f,
            tol_x,
            iter_max,
        } = self.settings;

        let bracket = eq.bracket().ordered();
        let (mut a, mut b) = (bracket.lo, bracket.hi);
        let mut fa = evaluate::<B>(eq, a)?.value;
        let fb = evaluate::<B>(eq, b)?.value;
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

        let mut root = 0.5 * (a + b);
        let mut f_root = fa;

        for j in 0..iter_max {
            let r = evaluate::<B>(eq, root)?;
            evaluations += 1;
            f_root = r.value;
            let df = derivative_of(&r, root)?;

            if f_root.abs() < tol_f {
                return Ok(Root {
                    x: root,
                    iterations: j + 1,
                    evaluations,
                });
            }

            if fa * f_root < 0.0 {
                b = root;
            } else {
                a = root;
                fa = f_root;
            }

            let dx = -f_root / df;
            let next = root + dx;
            let usable = df != 0.0 && df.is_finite() && dx.is_finite();

            if B::INSTRUMENTED {
                trace!(iteration = j, x = root, residual = f_root, dx, "newton step");
            }

            if usable && dx.abs() < tol_x && next >= a && next <= b {
                return Ok(Root {
                    x: next,
                    iterations: j + 1,
                    evaluations,
                });
            }

            root = if usable && next > a && next < b {
                next
            } else {
                0.5 * (a + b)
            };

            if (b - a).abs() < tol_x {
                return Ok(Root {
                    x: root,
                    iterations: j + 1,
                    evaluations,
                });
            }
        }

        warn!(iter_max, x = root, residual = f_root, "newton did not converge");
        Err(SolverError::ConvergenceFailed {
            iter_max,
            x: root,
            residual: f_root,
        })
    }
}
