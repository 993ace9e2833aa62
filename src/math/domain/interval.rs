use std::fmt;

use serde::{
    Deserialize,
    Serialize
};

use crate::chebfunerror::{
    ChebfunError,
    Result
};

/// A finite interval `[a, b]`, `a < b`, together with the affine bijection
/// to and from the reference interval `[-1, 1]`:
///
///   formap: y in [-1, 1] -> x in [a, b]
///   invmap: x in [a, b]  -> y in [-1, 1]
///   drvmap: dx/dy = (b - a) / 2
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    a: f64,
    b: f64,
}

/// The forward map written so both endpoints are reproduced exactly.
pub(crate) fn forward_map(a: f64, b: f64, y: f64) -> f64 {
    0.5 * b * (y + 1.0) + 0.5 * a * (1.0 - y)
}

impl Interval {
    pub fn new(a: f64, b: f64) -> Result<Interval> {
        if !(a.is_finite() && b.is_finite()) || a >= b {
            return Err(ChebfunError::IntervalValues(a, b));
        }
        Ok(Interval { a, b })
    }

    /// For bounds already known to be finite and strictly ordered.
    pub(crate) fn new_unchecked(a: f64, b: f64) -> Interval {
        debug_assert!(a < b);
        Interval { a, b }
    }

    pub fn a(&self) -> f64 {
        self.a
    }

    pub fn b(&self) -> f64 {
        self.b
    }

    pub fn values(&self) -> (f64, f64) {
        (self.a, self.b)
    }

    pub fn formap(&self, y: f64) -> f64 {
        forward_map(self.a, self.b, y)
    }

    pub fn invmap(&self, x: f64) -> f64 {
        (2.0 * x - self.a - self.b) / (self.b - self.a)
    }

    pub fn drvmap(&self) -> f64 {
        0.5 * (self.b - self.a)
    }

    /// Whether `other` is a subinterval of `self`, bounds included.
    pub fn contains(&self, other: &Interval) -> bool {
        self.a <= other.a && other.b <= self.b
    }

    /// Strict open-interval membership.
    pub fn is_interior(&self, x: f64) -> bool {
        self.a < x && x < self.b
    }
}

impl Default for Interval {
    fn default() -> Interval {
        Interval { a: -1.0, b: 1.0 }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Interval({}, {})", self.a, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_init() {
        let i = Interval::new(-2.0, 3.0).unwrap();
        assert_eq!(i.values(), (-2.0, 3.0));
        assert_eq!(Interval::default().values(), (-1.0, 1.0));
    }

    #[test]
    fn test_init_disallow() {
        assert!(matches!(Interval::new(2.0, 0.0), Err(ChebfunError::IntervalValues(..))));
        assert!(matches!(Interval::new(0.0, 0.0), Err(ChebfunError::IntervalValues(..))));
        assert!(Interval::new(0.0, f64::INFINITY).is_err());
        assert!(Interval::new(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_equality() {
        assert_eq!(Interval::new(-2.0, 3.0).unwrap(), Interval::new(-2.0, 3.0).unwrap());
        assert_ne!(Interval::new(-2.0, 3.0).unwrap(), Interval::new(-2.0, 3.0 + 1e-15).unwrap());
    }

    #[test]
    fn test_maps() {
        let i = Interval::new(-2.0, 3.0).unwrap();
        assert_eq!(i.formap(-1.0), -2.0);
        assert_eq!(i.formap(1.0), 3.0);
        assert_eq!(i.invmap(-2.0), -1.0);
        assert_eq!(i.invmap(3.0), 1.0);
        assert_eq!(i.drvmap(), 2.5);

        for k in 0..=10 {
            let y = -1.0 + 0.2 * k as f64;
            assert_abs_diff_eq!(i.invmap(i.formap(y)), y, epsilon = 4.0 * f64::EPSILON);
        }
    }

    #[test]
    fn test_contains() {
        let outer = Interval::new(-2.0, 3.0).unwrap();
        assert!(outer.contains(&outer));
        assert!(outer.contains(&Interval::new(-2.0, 0.0).unwrap()));
        assert!(outer.contains(&Interval::new(1.0, 3.0).unwrap()));
        assert!(!outer.contains(&Interval::new(-3.0, 0.0).unwrap()));
        assert!(!outer.contains(&Interval::new(0.0, 3.5).unwrap()));
    }

    #[test]
    fn test_is_interior() {
        let i = Interval::new(-2.0, 3.0).unwrap();
        let flags: Vec<bool> = [-3.0, -2.0, 0.0, 2.9, 3.0, 4.0]
            .iter()
            .map(|&x| i.is_interior(x))
            .collect();
        assert_eq!(flags, vec![false, false, true, true, false, false]);
    }

    #[test]
    fn test_display() {
        assert_eq!(Interval::new(-2.0, 3.5).unwrap().to_string(), "Interval(-2, 3.5)");
    }
}
