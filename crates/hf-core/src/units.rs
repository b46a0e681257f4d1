// hf-core/src/units.rs

use uom::si::f64::{Length as UomLength, Time as UomTime};

// Public canonical unit types (SI, f64)
pub type Length = UomLength;
pub type Time = UomTime;

/// Water depth (storage and flux totals are expressed as depths).
pub type Depth = UomLength;

#[inline]
pub fn mm(v: f64) -> Depth {
    use uom::si::length::millimeter;
    Depth::new::<millimeter>(v)
}

#[inline]
pub fn days(v: f64) -> Time {
    use uom::si::time::day;
    Time::new::<day>(v)
}

#[inline]
pub fn hours(v: f64) -> Time {
    use uom::si::time::hour;
    Time::new::<hour>(v)
}

/// Depth in millimetres (the native storage unit of the solvers).
#[inline]
pub fn to_mm(v: Depth) -> f64 {
    use uom::si::length::millimeter;
    v.get::<millimeter>()
}

/// Duration in days (the native timestep unit of the solvers).
#[inline]
pub fn to_days(v: Time) -> f64 {
    use uom::si::time::day;
    v.get::<day>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::{Tolerances, nearly_equal};

    #[test]
    fn constructors_smoke() {
        let _s = mm(10.0);
        let _dt = days(1.0);
    }

    #[test]
    fn hourly_step_is_a_fraction_of_a_day() {
        let tol = Tolerances::default();
        assert!(nearly_equal(to_days(hours(6.0)), 0.25, tol));
        assert!(nearly_equal(to_mm(mm(12.5)), 12.5, tol));
    }
}
