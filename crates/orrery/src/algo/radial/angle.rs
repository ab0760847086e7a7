use std::f64::consts::{PI, TAU};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// An angle in radians, kept in the canonical range `(-π, π]`.
///
/// Angle 0 points up from the center and angles grow clockwise on screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct Angle(f64);

impl Angle {
    pub const ZERO: Angle = Angle(0.0);

    pub fn new(radians: f64) -> Self {
        Angle(canonical(radians))
    }

    pub fn radians(self) -> f64 {
        self.0
    }

    pub fn degrees(self) -> f64 {
        self.0.to_degrees()
    }

    /// Shortest signed rotation that turns `other` into `self`, in `(-π, π]`.
    pub fn difference(self, other: Angle) -> f64 {
        canonical(self.0 - other.0)
    }

    /// Mean of an ordered run of angles.
    ///
    /// Consecutive angles are unwrapped against each other before averaging, so the result is
    /// correct for runs crossing ±π and for runs spanning more than half a turn as long as each
    /// step is shorter than π. Returns `None` for an empty run.
    pub fn run_mean<I>(angles: I) -> Option<Angle>
    where
        I: IntoIterator<Item = Angle>,
    {
        let mut iter = angles.into_iter();
        let first = iter.next()?;
        let mut prev = first;
        let mut unwrapped = first.0;
        let mut sum = first.0;
        let mut count = 1usize;
        for a in iter {
            unwrapped += a.difference(prev);
            sum += unwrapped;
            prev = a;
            count += 1;
        }
        Some(Angle::new(sum / count as f64))
    }

    pub fn sin(self) -> f64 {
        self.0.sin()
    }

    pub fn cos(self) -> f64 {
        self.0.cos()
    }
}

fn canonical(radians: f64) -> f64 {
    if !radians.is_finite() {
        return 0.0;
    }
    let r = radians.rem_euclid(TAU);
    if r > PI { r - TAU } else { r }
}

impl Add<f64> for Angle {
    type Output = Angle;

    fn add(self, rhs: f64) -> Angle {
        Angle::new(self.0 + rhs)
    }
}

impl AddAssign<f64> for Angle {
    fn add_assign(&mut self, rhs: f64) {
        *self = *self + rhs;
    }
}

impl Sub<f64> for Angle {
    type Output = Angle;

    fn sub(self, rhs: f64) -> Angle {
        Angle::new(self.0 - rhs)
    }
}

impl SubAssign<f64> for Angle {
    fn sub_assign(&mut self, rhs: f64) {
        *self = *self - rhs;
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}rad", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::Angle;
    use std::f64::consts::{FRAC_PI_2, PI, TAU};

    const EPS: f64 = 1e-12;

    #[test]
    fn canonical_range_is_half_open_at_minus_pi() {
        assert!((Angle::new(PI).radians() - PI).abs() < EPS);
        assert!((Angle::new(-PI).radians() - PI).abs() < EPS);
        assert!((Angle::new(3.0 * PI).radians() - PI).abs() < EPS);
        assert!((Angle::new(TAU).radians()).abs() < EPS);
        assert!((Angle::new(-FRAC_PI_2).radians() + FRAC_PI_2).abs() < EPS);
        assert!((Angle::new(1.5 * PI).radians() + FRAC_PI_2).abs() < EPS);
    }

    #[test]
    fn non_finite_input_collapses_to_zero() {
        assert_eq!(Angle::new(f64::NAN), Angle::ZERO);
        assert_eq!(Angle::new(f64::INFINITY), Angle::ZERO);
    }

    #[test]
    fn difference_takes_the_short_way_across_pi() {
        let a = Angle::new(PI - 0.1);
        let b = Angle::new(-PI + 0.1);
        assert!((b.difference(a) - 0.2).abs() < 1e-9);
        assert!((a.difference(b) + 0.2).abs() < 1e-9);
    }

    #[test]
    fn difference_of_opposite_angles_is_plus_pi() {
        let d = Angle::new(FRAC_PI_2).difference(Angle::new(-FRAC_PI_2));
        assert!((d - PI).abs() < EPS);
    }

    #[test]
    fn add_wraps_around() {
        let a = Angle::new(PI - 0.05) + 0.1;
        assert!((a.radians() - (-PI + 0.05)).abs() < 1e-9);
        let mut b = Angle::new(-PI + 0.05);
        b += -0.1;
        assert!((b.radians() - (PI - 0.05)).abs() < 1e-9);
    }

    #[test]
    fn sub_wraps_around() {
        let a = Angle::new(-PI + 0.05) - 0.1;
        assert!((a.radians() - (PI - 0.05)).abs() < 1e-9);
        let mut b = Angle::new(PI - 0.05);
        b -= -0.1;
        assert!((b.radians() - (-PI + 0.05)).abs() < 1e-9);
        assert_eq!(Angle::new(0.3) - 0.1, Angle::new(0.3) + -0.1);
    }

    #[test]
    fn mean_of_run_crossing_pi() {
        let run = [PI - 0.2, PI - 0.1, -PI + 0.0, -PI + 0.1].map(Angle::new);
        let m = Angle::run_mean(run).unwrap();
        assert!((m.difference(Angle::new(PI - 0.05))).abs() < 1e-9, "mean: {m}");
    }

    #[test]
    fn mean_of_long_run_is_not_folded() {
        // Ten steps of 0.4 rad span 3.6 rad, more than half a turn.
        let run: Vec<Angle> = (0..10).map(|i| Angle::new(i as f64 * 0.4)).collect();
        let m = Angle::run_mean(run).unwrap();
        assert!((m.radians() - 1.8).abs() < 1e-9, "mean: {m}");
    }

    #[test]
    fn mean_of_empty_run_is_none() {
        assert_eq!(Angle::run_mean(std::iter::empty()), None);
    }
}
