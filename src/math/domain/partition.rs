use crate::chebfunerror::{
    ChebfunError,
    Result
};
use crate::math::curve::chebfun::boundaryfunction::BoundaryFunction;
use crate::math::curve::curve::Curve;

/// Sorts `pieces` by left endpoint and checks that consecutive intervals
/// meet exactly. Any overlap is reported before any gap.
pub fn check_funs(mut pieces: Vec<BoundaryFunction>) -> Result<Vec<BoundaryFunction>> {
    pieces.sort_by(|f, g| f.interval().a().total_cmp(&g.interval().a()));

    let junctions: Vec<(f64, f64)> = pieces
        .windows(2)
        .map(|w| (w[0].interval().b(), w[1].interval().a()))
        .collect();
    if let Some(&(left, right)) = junctions.iter().find(|(l, r)| r < l) {
        return Err(ChebfunError::IntervalOverlap { left, right });
    }
    if let Some(&(left, right)) = junctions.iter().find(|(l, r)| r > l) {
        return Err(ChebfunError::IntervalGap { left, right });
    }
    Ok(pieces)
}

/// `(breakpoint, value)` pairs for sorted, validated pieces. Interior
/// junctions take the average of the two one-sided limits.
pub fn compute_breakdata(pieces: &[BoundaryFunction]) -> Vec<(f64, f64)> {
    let (Some(first), Some(last)) = (pieces.first(), pieces.last()) else {
        return Vec::new();
    };
    let mut breakdata = Vec::with_capacity(pieces.len() + 1);
    breakdata.push((first.endpoints().0, first.endvalues().0));
    for w in pieces.windows(2) {
        let x = 0.5 * (w[0].endpoints().1 + w[1].endpoints().0);
        let y = 0.5 * (w[0].endvalues().1 + w[1].endvalues().0);
        breakdata.push((x, y));
    }
    breakdata.push((last.endpoints().1, last.endvalues().1));
    breakdata
}
