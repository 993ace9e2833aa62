use std::fmt;

use crate::chebfunerror::{
    ChebfunError,
    Result
};
use crate::math::domain::interval::Interval;

/// A partition of `[first, last]` by a strictly increasing sequence of at
/// least two breakpoints.
#[derive(Clone, Debug)]
pub struct Domain {
    breakpoints: Vec<f64>,
}

impl Domain {
    pub fn new(breakpoints: Vec<f64>) -> Result<Domain> {
        if breakpoints.len() < 2 || breakpoints.iter().any(|x| !x.is_finite()) {
            return Err(ChebfunError::InvalidDomain);
        }
        if breakpoints.windows(2).any(|w| w[1] <= w[0]) {
            return Err(ChebfunError::InvalidDomain);
        }
        Ok(Domain { breakpoints })
    }

    pub fn breakpoints(&self) -> &[f64] {
        &self.breakpoints
    }

    /// Intervals between consecutive breakpoints, left to right.
    pub fn intervals(&self) -> impl Iterator<Item = Interval> + '_ {
        self.breakpoints
            .windows(2)
            .map(|w| Interval::new_unchecked(w[0], w[1]))
    }

    /// Number of breakpoints.
    pub fn size(&self) -> usize {
        self.breakpoints.len()
    }

    pub fn support(&self) -> Interval {
        Interval::new_unchecked(self.breakpoints[0], self.breakpoints[self.breakpoints.len() - 1])
    }

    /// Common refinement of two domains over the same support.
    pub fn union(&self, other: &Domain) -> Result<Domain> {
        let (a0, b0) = self.support().values();
        let (a1, b1) = other.support().values();
        if a0 != a1 || b0 != b1 {
            return Err(ChebfunError::SupportMismatch(a0, b0, a1, b1));
        }
        Ok(self.merge(other))
    }

    /// Sorted union of both breakpoint sets; the supports are not checked.
    pub fn merge(&self, other: &Domain) -> Domain {
        let mut breakpoints: Vec<f64> = self
            .breakpoints
            .iter()
            .chain(&other.breakpoints)
            .copied()
            .collect();
        breakpoints.sort_by(f64::total_cmp);
        breakpoints.dedup();
        Domain { breakpoints }
    }

    /// For every breakpoint of `self`, whether it is also a breakpoint of
    /// `other`.
    pub fn breakpoints_in(&self, other: &Domain) -> Vec<bool> {
        self.breakpoints
            .iter()
            .map(|x| other.breakpoints.contains(x))
            .collect()
    }
}

impl PartialEq for Domain {
    fn eq(&self, other: &Domain) -> bool {
        self.breakpoints_in(other).into_iter().all(|b| b)
            && other.breakpoints_in(self).into_iter().all(|b| b)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Domain(")?;
        for (i, x) in self.breakpoints.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", x)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domain(breakpoints: &[f64]) -> Domain {
        Domain::new(breakpoints.to_vec()).unwrap()
    }

    #[test]
    fn test_init() {
        let d = domain(&[-2.0, 0.0, 1.5]);
        assert_eq!(d.breakpoints(), &[-2.0, 0.0, 1.5]);
        assert_eq!(d.size(), 3);
        assert_eq!(d.support(), Interval::new(-2.0, 1.5).unwrap());
    }

    #[test]
    fn test_init_disallow() {
        for bad in [
            vec![],
            vec![1.0],
            vec![-1.0, 1.0, 1.0],
            vec![1.0, 0.0],
            vec![-1.0, 0.5, 0.0, 1.0],
            vec![-1.0, f64::NAN],
            vec![f64::NEG_INFINITY, 0.0],
        ] {
            assert!(matches!(Domain::new(bad), Err(ChebfunError::InvalidDomain)));
        }
    }

    #[test]
    fn test_intervals() {
        let d = domain(&[-2.0, 0.0, 1.0, 3.5]);
        let intervals: Vec<(f64, f64)> = d.intervals().map(|i| i.values()).collect();
        assert_eq!(intervals, vec![(-2.0, 0.0), (0.0, 1.0), (1.0, 3.5)]);
    }

    #[test]
    fn test_union() {
        let d1 = domain(&[-2.0, 0.0, 2.0]);
        let d2 = domain(&[-2.0, -1.0, 1.0, 2.0]);
        let u = d1.union(&d2).unwrap();
        assert_eq!(u.breakpoints(), &[-2.0, -1.0, 0.0, 1.0, 2.0]);
        assert_eq!(u, d2.union(&d1).unwrap());
    }

    #[test]
    fn test_union_support_mismatch() {
        let d1 = domain(&[-2.0, 0.0, 2.0]);
        let d2 = domain(&[-1.0, 0.0, 2.0]);
        match d1.union(&d2) {
            Err(ChebfunError::SupportMismatch(a0, b0, a1, b1)) => {
                assert_eq!((a0, b0, a1, b1), (-2.0, 2.0, -1.0, 2.0));
            }
            other => panic!("expected a support mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_merge_ignores_support() {
        let d1 = domain(&[-2.0, 0.0]);
        let d2 = domain(&[-1.0, 0.0, 3.0]);
        assert_eq!(d1.merge(&d2).breakpoints(), &[-2.0, -1.0, 0.0, 3.0]);
    }

    #[test]
    fn test_breakpoints_in() {
        let d1 = domain(&[-1.0, 0.0, 1.0]);
        let d2 = domain(&[-1.0, 0.5, 1.0]);
        assert_eq!(d1.breakpoints_in(&d2), vec![true, false, true]);
        assert_eq!(d2.breakpoints_in(&d1), vec![true, false, true]);
    }

    #[test]
    fn test_equality() {
        assert_eq!(domain(&[-1.0, 0.0, 1.0]), domain(&[-1.0, 0.0, 1.0]));
        assert_ne!(domain(&[-1.0, 0.0, 1.0]), domain(&[-1.0, 1.0]));
        assert_ne!(domain(&[-1.0, 1.0]), domain(&[-1.0, 0.0, 1.0]));
    }

    #[test]
    fn test_display() {
        assert_eq!(domain(&[-1.0, 0.5, 2.0]).to_string(), "Domain(-1, 0.5, 2)");
    }
}
