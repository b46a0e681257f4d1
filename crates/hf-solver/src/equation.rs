//! The scalar equation a root finder works on.

use hf_core::numeric::Real;

/// Admissible interval for the unknown state.
///
/// The ends are not required to be ordered; finders that need an ordered
/// interval call [`Bracket::ordered`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bracket {
    pub lo: Real,
    pub hi: Real,
}

impl Bracket {
    pub fn new(lo: Real, hi: Real) -> Self {
        Self { lo, hi }
    }

    pub fn ordered(self) -> Self {
        if self.lo <= self.hi {
            self
        } else {
            Self {
                lo: self.hi,
                hi: self.lo,
            }
        }
    }

    pub fn width(&self) -> Real {
        (self.hi - self.lo).abs()
    }
}

/// Residual value, optionally with its derivative with respect to the state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Residual {
    pub value: Real,
    pub derivative: Option<Real>,
}

impl Residual {
    pub fn value(value: Real) -> Self {
        Self {
            value,
            derivative: None,
        }
    }

    pub fn with_derivative(value: Real, derivative: Real) -> Self {
        Self {
            value,
            derivative: Some(derivative),
        }
    }
}

/// One scalar equation, bound to one equation index and one timestep.
///
/// Methods take `&mut self` so implementations can reuse scratch buffers
/// between evaluations.
pub trait Equation {
    fn bracket(&mut self) -> Bracket;

    fn residual(&mut self, x: Real) -> Residual;
}

/// Closure-backed equation.
pub struct FnEquation<F> {
    bracket: Bracket,
    f: F,
}

impl<F> FnEquation<F>
where
    F: FnMut(Real) -> Residual,
{
    pub fn new(bracket: Bracket, f: F) -> Self {
        Self { bracket, f }
    }
}

impl<F> Equation for FnEquation<F>
where
    F: FnMut(Real) -> Residual,
{
    fn bracket(&mut self) -> Bracket {
        self.bracket
    }

    fn residual(&mut self, x: Real) -> Residual {
        (self.f)(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordered_swaps_reversed_ends() {
        let b = Bracket::new(3.0, 1.0).ordered();
        assert_eq!((b.lo, b.hi), (1.0, 3.0));
        assert_eq!(b.width(), 2.0);
    }

    #[test]
    fn fn_equation_forwards_calls() {
        let mut calls = 0;
        let mut eq = FnEquation::new(Bracket::new(0.0, 1.0), |x| {
            calls += 1;
            Residual::value(x - 0.5)
        });
        assert_eq!(eq.residual(1.0).value, 0.5);
        assert_eq!(eq.bracket().hi, 1.0);
        drop(eq);
        assert_eq!(calls, 1);
    }
}
