use std::fmt;

use tracing::{
    debug,
    trace
};

use crate::chebfunerror::{
    ChebfunError,
    Result
};
use crate::configuration::Preferences;
use crate::math::chebyshev::evaluation::EvaluationMethod;
use crate::math::curve::chebfun::boundaryfunction::BoundaryFunction;
use crate::math::curve::curve::Curve;
use crate::math::domain::domain::Domain;
use crate::math::domain::partition::{
    check_funs,
    compute_breakdata
};

// ─────────────────────────────────────────────────────────────────────────────
// PiecewiseFunction
// ─────────────────────────────────────────────────────────────────────────────
//
// Pieces are sorted, tile their support without gaps or overlaps, and the
// breakdata is rebuilt from them on every construction. Nothing mutates a
// piece afterwards, so the two never drift apart. The one exception is
// cumsum, whose junction values are the running integral from the left.
//
// Evaluation at x:
//   - x < first breakpoint  -> first piece (extrapolation)
//   - x > last breakpoint   -> last piece (extrapolation)
//   - x == some breakpoint  -> breakdata value
//   - otherwise             -> the piece whose interior holds x

enum Location {
    Fixed(f64),
    Piece(usize),
}

#[derive(Clone, Debug)]
pub struct PiecewiseFunction {
    pieces: Vec<BoundaryFunction>,
    breakdata: Vec<(f64, f64)>,
}

impl PiecewiseFunction {
    pub fn new(pieces: Vec<BoundaryFunction>) -> Result<PiecewiseFunction> {
        let pieces = check_funs(pieces)?;
        let breakdata = compute_breakdata(&pieces);
        Ok(PiecewiseFunction { pieces, breakdata })
    }

    pub fn empty() -> PiecewiseFunction {
        PiecewiseFunction {
            pieces: Vec::new(),
            breakdata: Vec::new(),
        }
    }

    pub fn from_function_adaptive<F>(f: F, breakpoints: &[f64]) -> Result<PiecewiseFunction>
    where
        F: Fn(f64) -> f64,
    {
        PiecewiseFunction::from_function_adaptive_with(f, breakpoints, &Preferences::DEFAULT)
    }

    /// Adaptive construction of every subinterval independently.
    pub fn from_function_adaptive_with<F>(
        f: F,
        breakpoints: &[f64],
        preferences: &Preferences,
    ) -> Result<PiecewiseFunction>
    where
        F: Fn(f64) -> f64,
    {
        let domain = Domain::new(breakpoints.to_vec())?;
        let pieces = domain
            .intervals()
            .map(|interval| BoundaryFunction::adaptive_with(&f, interval, preferences))
            .collect::<Result<Vec<BoundaryFunction>>>()?;
        PiecewiseFunction::new(pieces)
    }

    /// Every subinterval sampled at the same length `n`.
    pub fn from_function_fixed_length<F>(f: F, breakpoints: &[f64], n: usize) -> Result<PiecewiseFunction>
    where
        F: Fn(f64) -> f64,
    {
        let count = breakpoints.len().saturating_sub(1);
        PiecewiseFunction::from_function_fixed_lengths(f, breakpoints, &vec![n; count])
    }

    /// One length per subinterval, left to right.
    pub fn from_function_fixed_lengths<F>(
        f: F,
        breakpoints: &[f64],
        lengths: &[usize],
    ) -> Result<PiecewiseFunction>
    where
        F: Fn(f64) -> f64,
    {
        let domain = Domain::new(breakpoints.to_vec())?;
        let expected = domain.size() - 1;
        if lengths.len() != expected {
            return Err(ChebfunError::BadFunLength {
                expected,
                found: lengths.len(),
            });
        }
        let pieces = domain
            .intervals()
            .zip(lengths)
            .map(|(interval, &n)| BoundaryFunction::fixed_length(&f, n, interval))
            .collect();
        PiecewiseFunction::new(pieces)
    }

    // ------------
    //  properties
    // ------------

    pub fn pieces(&self) -> &[BoundaryFunction] {
        &self.pieces
    }

    /// Sorted `(breakpoint, value)` pairs.
    pub fn breakdata(&self) -> &[(f64, f64)] {
        &self.breakdata
    }

    pub fn breakpoints(&self) -> Vec<f64> {
        self.breakdata.iter().map(|&(x, _)| x).collect()
    }

    /// `None` for the empty function.
    pub fn domain(&self) -> Option<Domain> {
        Domain::new(self.breakpoints()).ok()
    }

    pub fn endpoints(&self) -> Option<(f64, f64)> {
        match (self.breakdata.first(), self.breakdata.last()) {
            (Some(&(a, _)), Some(&(b, _))) => Some((a, b)),
            _ => None,
        }
    }

    /// Largest absolute endpoint.
    pub fn hscale(&self) -> f64 {
        self.endpoints()
            .map_or(0.0, |(a, b)| a.abs().max(b.abs()))
    }

    pub fn vscale(&self) -> f64 {
        self.pieces.iter().fold(0.0, |acc, f| acc.max(f.vscale()))
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Total number of coefficients across all pieces.
    pub fn size(&self) -> usize {
        self.pieces.iter().map(BoundaryFunction::size).sum()
    }

    // ------------
    //  evaluation
    // ------------

    /// Evaluates at every point of `xs`; the empty function yields no
    /// values. NaN inputs give NaN.
    ///
    /// Points are grouped by piece so that each piece is evaluated once.
    pub fn eval(&self, xs: &[f64], method: EvaluationMethod) -> Vec<f64> {
        if self.is_empty() {
            return Vec::new();
        }
        let mut values = vec![0.0; xs.len()];
        let mut groups: Vec<Vec<usize>> = vec![Vec::new(); self.pieces.len()];
        for (i, &x) in xs.iter().enumerate() {
            match self.locate(x) {
                Location::Fixed(y) => values[i] = y,
                Location::Piece(k) => groups[k].push(i),
            }
        }
        for (piece, indices) in self.pieces.iter().zip(&groups) {
            if indices.is_empty() {
                continue;
            }
            let points: Vec<f64> = indices.iter().map(|&i| xs[i]).collect();
            // an empty piece yields nothing and its points stay at 0
            for (&i, v) in indices.iter().zip(piece.eval(&points, method)) {
                values[i] = v;
            }
        }
        values
    }

    /// Clenshaw evaluation at a single point; 0 for the empty function.
    pub fn value(&self, x: f64) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        match self.locate(x) {
            Location::Fixed(y) => y,
            Location::Piece(k) => self.pieces[k].value(x),
        }
    }

    /// Which piece evaluates `x`, or the value itself at a breakpoint or NaN.
    /// The function must not be empty.
    fn locate(&self, x: f64) -> Location {
        let first = self.breakdata[0].0;
        let last = self.breakdata[self.breakdata.len() - 1].0;
        if x < first {
            Location::Piece(0)
        } else if x > last {
            Location::Piece(self.pieces.len() - 1)
        } else if let Some(&(_, y)) = self.breakdata.iter().find(|&&(b, _)| b == x) {
            Location::Fixed(y)
        } else if x.is_nan() {
            Location::Fixed(f64::NAN)
        } else {
            Location::Piece(self.breakdata.partition_point(|&(b, _)| b < x) - 1)
        }
    }

    // ----------
    //  calculus
    // ----------

    pub fn sum(&self) -> f64 {
        self.pieces.iter().map(BoundaryFunction::sum).sum()
    }

    /// Antiderivative vanishing at the left end of the domain. Each piece
    /// is shifted so that it starts at the right end value of its already
    /// shifted predecessor, and that value is also the junction's breakdata.
    ///
    /// The right-hand limit at a junction matches the left-hand one to
    /// within the rounding of the final Clenshaw step, which is often but
    /// not always exact. The value at the junction itself is exact.
    pub fn cumsum(&self) -> PiecewiseFunction {
        let mut pieces: Vec<BoundaryFunction> = Vec::with_capacity(self.pieces.len());
        for f in &self.pieces {
            let integral = f.cumsum();
            let integral = match pieces.last() {
                Some(previous) => integral.shifted_to_left_value(previous.endvalues().1),
                None => integral,
            };
            pieces.push(integral);
        }
        let mut result = PiecewiseFunction::from_sorted(pieces);
        let junctions = result.pieces.len().saturating_sub(1);
        for (k, junction) in result.breakdata.iter_mut().enumerate().skip(1).take(junctions) {
            junction.1 = result.pieces[k - 1].endvalues().1;
        }
        result
    }

    pub fn diff(&self) -> PiecewiseFunction {
        PiecewiseFunction::from_sorted(self.pieces.iter().map(BoundaryFunction::diff).collect())
    }

    // -------------
    //  rootfinding
    // -------------

    /// Roots of every piece, left to right. When the first root of a piece
    /// lies within `100·hscale·eps` of the last root of the previous one,
    /// both are taken to be the same root at the shared breakpoint and only
    /// the first is kept. A genuine repeated root there is reported once.
    pub fn roots(&self) -> Vec<f64> {
        self.roots_with(&Preferences::DEFAULT)
    }

    pub fn roots_with(&self, preferences: &Preferences) -> Vec<f64> {
        let htol = 1e2 * self.hscale() * preferences.eps;
        let mut all_roots = Vec::new();
        let mut previous: Vec<f64> = Vec::new();
        for f in &self.pieces {
            let mut roots = f.roots_with(preferences);
            if let (Some(&last), Some(&first)) = (previous.last(), roots.first()) {
                if (last - first).abs() <= htol {
                    trace!(root = first, "dropping duplicate root at breakpoint");
                    roots.remove(0);
                }
            }
            all_roots.extend_from_slice(&roots);
            previous = roots;
        }
        all_roots
    }

    // -----------
    //  utilities
    // -----------

    /// Repartitions the function at the breakpoints of `target`, which must
    /// cover the same support and contain every current breakpoint.
    pub fn resample_to_domain(&self, target: &Domain) -> Result<PiecewiseFunction> {
        let Some(domain) = self.domain() else {
            return Ok(PiecewiseFunction::empty());
        };
        if domain.support() != target.support()
            || !domain.breakpoints_in(target).into_iter().all(|b| b)
        {
            return Err(ChebfunError::NotSubdomain);
        }
        debug!(from = %domain, to = %target, "resampling onto a finer domain");

        let mut pieces = Vec::with_capacity(target.size() - 1);
        let mut k = 0;
        for interval in target.intervals() {
            while self.pieces[k].interval().b() < interval.b() {
                k += 1;
            }
            pieces.push(self.pieces[k].restrict(interval)?);
        }
        Ok(PiecewiseFunction::from_sorted(pieces))
    }

    pub fn simplify(&self) -> PiecewiseFunction {
        PiecewiseFunction::from_sorted(self.pieces.iter().map(BoundaryFunction::simplify).collect())
    }

    /// For pieces derived one-to-one from an already validated function.
    fn from_sorted(pieces: Vec<BoundaryFunction>) -> PiecewiseFunction {
        let breakdata = compute_breakdata(&pieces);
        PiecewiseFunction { pieces, breakdata }
    }
}

impl fmt::Display for PiecewiseFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "chebfun<empty>");
        }
        let count = self.pieces.len();
        writeln!(
            f,
            "chebfun column ({} smooth piece{})",
            count,
            if count > 1 { "s" } else { "" }
        )?;
        writeln!(f, "       interval       length     endpoint values")?;
        for piece in &self.pieces {
            let (a, b) = piece.endpoints();
            let (fa, fb) = piece.endvalues();
            writeln!(
                f,
                "[{:>8.2e},{:>8.2e}]   {:>6}  {:>9.2e} {:>9.2e}",
                a,
                b,
                piece.size(),
                fa,
                fb
            )?;
        }
        write!(f, "vertical scale = {:.2e}", self.vscale())?;
        if count > 1 {
            write!(f, "    total length = {}", self.size())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use crate::math::domain::interval::Interval;

    const EPS: f64 = f64::EPSILON;

    #[test]
    fn test_empty() {
        let f = PiecewiseFunction::empty();
        assert!(f.is_empty());
        assert_eq!(f.size(), 0);
        assert!(f.breakpoints().is_empty());
        assert!(f.domain().is_none());
        assert!(f.endpoints().is_none());
        assert_eq!(f.hscale(), 0.0);
        assert_eq!(f.vscale(), 0.0);
        assert_eq!(f.sum(), 0.0);
        assert!(f.roots().is_empty());
        assert!(f.eval(&[0.0, 1.0], EvaluationMethod::Clenshaw).is_empty());
        assert!(f.cumsum().is_empty());
        assert!(f.diff().is_empty());
        assert_eq!(f.to_string(), "chebfun<empty>");
        assert!(PiecewiseFunction::new(Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn test_properties() {
        let f = PiecewiseFunction::from_function_fixed_lengths(|x| x.cos(), &[-3.0, 0.0, 1.0, 2.0], &[20, 10, 5])
            .unwrap();
        assert_eq!(f.breakpoints(), vec![-3.0, 0.0, 1.0, 2.0]);
        assert_eq!(f.endpoints(), Some((-3.0, 2.0)));
        assert_eq!(f.hscale(), 3.0);
        assert_eq!(f.size(), 35);
        assert_eq!(f.pieces().len(), 3);
        assert_eq!(f.domain(), Some(Domain::new(vec![-3.0, 0.0, 1.0, 2.0]).unwrap()));
        assert!((f.vscale() - 1.0).abs() < 1e-2);
    }

    #[test]
    fn test_bad_fun_length() {
        let result = PiecewiseFunction::from_function_fixed_lengths(|x| x, &[-1.0, 0.0, 1.0], &[5]);
        assert!(matches!(
            result,
            Err(ChebfunError::BadFunLength { expected: 2, found: 1 })
        ));
        assert!(matches!(
            PiecewiseFunction::from_function_fixed_length(|x| x, &[1.0], 5),
            Err(ChebfunError::InvalidDomain)
        ));
        assert!(matches!(
            PiecewiseFunction::from_function_adaptive(|x| x, &[1.0, 0.0]),
            Err(ChebfunError::InvalidDomain)
        ));
    }

    #[test]
    fn test_adaptive_not_converged() {
        let preferences = Preferences { max_pow2: 6, ..Preferences::DEFAULT };
        let result =
            PiecewiseFunction::from_function_adaptive_with(|x: f64| x.abs(), &[-1.0, 1.0], &preferences);
        assert!(matches!(result, Err(ChebfunError::NotConverged { .. })));

        // splitting at the kink resolves it
        let f = PiecewiseFunction::from_function_adaptive_with(|x: f64| x.abs(), &[-1.0, 0.0, 1.0], &preferences)
            .unwrap();
        assert_eq!(f.size(), 4);
    }

    #[test]
    fn test_evaluation_routes_points() {
        let left = BoundaryFunction::constant(1.0, Interval::new(-1.0, 0.0).unwrap());
        let right = BoundaryFunction::constant(3.0, Interval::new(0.0, 1.0).unwrap());
        let f = PiecewiseFunction::new(vec![right, left]).unwrap();
        let xs = [-2.0, -1.0, -0.5, 0.0, 0.5, 1.0, 2.0];
        for method in [EvaluationMethod::Clenshaw, EvaluationMethod::Barycentric] {
            assert_eq!(f.eval(&xs, method), vec![1.0, 1.0, 1.0, 2.0, 3.0, 3.0, 3.0]);
        }
        assert!(f.value(f64::NAN).is_nan());
    }

    #[test]
    fn test_grouped_evaluation_matches_single_points() {
        let f = PiecewiseFunction::from_function_adaptive(|x| (7.0 * x).sin() + x * x, &[-1.0, -0.2, 0.4, 1.0])
            .unwrap();
        // interleaved across pieces, with breakpoints and points outside
        let mut xs: Vec<f64> = (0..301)
            .map(|k| -1.1 + 2.2 * (k as f64 * 0.618033988749895).fract())
            .collect();
        xs.extend([-1.0, -0.2, 0.4, 1.0, -1.05, 1.05]);

        let clenshaw = f.eval(&xs, EvaluationMethod::Clenshaw);
        let barycentric = f.eval(&xs, EvaluationMethod::Barycentric);
        for (i, &x) in xs.iter().enumerate() {
            assert_eq!(clenshaw[i], f.value(x));
            assert_eq!(barycentric[i], f.eval(&[x], EvaluationMethod::Barycentric)[0]);
            if (-1.0..=1.0).contains(&x) {
                assert_abs_diff_eq!(barycentric[i], clenshaw[i], epsilon = 5e1 * EPS);
            }
        }
    }

    #[test]
    fn test_extrapolation() {
        let f = PiecewiseFunction::from_function_adaptive(|x| x * x, &[-1.0, 0.0, 1.0]).unwrap();
        assert_abs_diff_eq!(f.value(-2.0), 4.0, epsilon = 1e2 * EPS);
        assert_abs_diff_eq!(f.value(3.0), 9.0, epsilon = 1e2 * EPS);
    }

    #[test]
    fn test_calculus() {
        let f = PiecewiseFunction::from_function_adaptive(|x| x.exp(), &[-1.0, 0.5, 2.0]).unwrap();
        assert_abs_diff_eq!(f.sum(), 2.0f64.exp() - (-1.0f64).exp(), epsilon = 1e2 * EPS);

        let g = f.cumsum();
        assert_eq!(g.breakpoints(), f.breakpoints());
        assert_abs_diff_eq!(g.value(-1.0), 0.0, epsilon = 1e1 * EPS);
        for x in [-0.7f64, 0.0, 0.5, 1.3, 2.0] {
            let exact = x.exp() - (-1.0f64).exp();
            assert_abs_diff_eq!(g.value(x), exact, epsilon = 1e2 * EPS);
        }

        let d = f.diff();
        for x in [-0.7, 0.0, 0.5, 1.3, 2.0] {
            assert_abs_diff_eq!(d.value(x), x.exp(), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_roots_dedup_at_breakpoint() {
        let f = PiecewiseFunction::from_function_adaptive(|x| x.sin(), &[-2.0, 0.0, 2.0]).unwrap();
        let roots = f.roots();
        assert_eq!(roots.len(), 1);
        assert_abs_diff_eq!(roots[0], 0.0, epsilon = 1e2 * EPS);
    }

    #[test]
    fn test_resample_to_domain() {
        let f = PiecewiseFunction::from_function_adaptive(|x| x.sin(), &[-2.0, 0.0, 2.0]).unwrap();
        let target = Domain::new(vec![-2.0, -1.0, 0.0, 0.5, 1.5, 2.0]).unwrap();
        let g = f.resample_to_domain(&target).unwrap();
        assert_eq!(g.breakpoints(), target.breakpoints());
        for x in [-1.9, -1.0, -0.3, 0.0, 0.7, 1.9] {
            assert_abs_diff_eq!(g.value(x), x.sin(), epsilon = 1e2 * EPS);
        }

        let coarser = Domain::new(vec![-2.0, 2.0]).unwrap();
        assert!(matches!(f.resample_to_domain(&coarser), Err(ChebfunError::NotSubdomain)));
        let wider = Domain::new(vec![-3.0, 0.0, 2.0]).unwrap();
        assert!(matches!(f.resample_to_domain(&wider), Err(ChebfunError::NotSubdomain)));
    }

    #[test]
    fn test_display() {
        let f = PiecewiseFunction::from_function_fixed_length(|x| x, &[-1.0, 0.0, 1.0], 2).unwrap();
        let text = f.to_string();
        assert!(text.starts_with("chebfun column (2 smooth pieces)"));
        assert!(text.contains("total length = 4"));
    }
}
