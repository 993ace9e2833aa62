use nalgebra::DMatrix;
use tracing::{trace, warn};

use crate::configuration::Preferences;
use crate::math::chebyshev::evaluation::clenshaw;
use crate::math::chebyshev::standardchop::standard_chop;
use crate::math::chebyshev::transform::{
    chebyshev_points,
    values_to_coefficients
};
use crate::math::domain::interval::forward_map;

// Off-centre split point for the recursive subdivision.
const SPLIT_POINT: f64 = -0.004849834917525;

/// Real roots in [-1, 1] of the Chebyshev series `coefficients`, sorted
/// ascending.
///
/// The coefficients are chopped at `htol` first. Short expansions go
/// straight to the colleague matrix; longer ones are resampled on
/// [-1, SPLIT_POINT] and [SPLIT_POINT, 1] and solved recursively with a
/// doubled tolerance.
pub fn roots_unit(coefficients: &[f64], htol: f64, preferences: &Preferences) -> Vec<f64> {
    let n = standard_chop(coefficients, htol);
    let mut ak = &coefficients[..n];
    while ak.last() == Some(&0.0) {
        ak = &ak[..ak.len() - 1];
    }
    let n = ak.len();

    if n > preferences.root_split_length {
        trace!(length = n, "subdividing before colleague eigenvalue solve");
        let points = chebyshev_points(n);
        let mut roots = Vec::new();
        for (a, b) in [(-1.0, SPLIT_POINT), (SPLIT_POINT, 1.0)] {
            let values: Vec<f64> = points
                .iter()
                .map(|&y| clenshaw(forward_map(a, b, y), ak))
                .collect();
            let half = values_to_coefficients(&values);
            roots.extend(
                roots_unit(&half, 2.0 * htol, preferences)
                    .into_iter()
                    .map(|y| forward_map(a, b, y)),
            );
        }
        return roots;
    }

    let candidates = match n {
        0 | 1 => Vec::new(),
        2 => vec![-ak[0] / ak[1]],
        _ => colleague_eigenvalues(ak, htol),
    };

    let mut roots: Vec<f64> = candidates
        .into_iter()
        .filter(|r| r.abs() <= 1.0 + htol)
        .map(|r| r.clamp(-1.0, 1.0))
        .collect();
    roots.sort_by(f64::total_cmp);
    roots
}

/// Real eigenvalues of the colleague matrix of `ak` (length ≥ 3, nonzero
/// last coefficient). Eigenvalues with an imaginary part of `htol` or more
/// are discarded.
///
/// The matrix is assembled transposed so that it is already upper
/// Hessenberg, balanced, and then reduced by shifted QR sweeps.
fn colleague_eigenvalues(ak: &[f64], htol: f64) -> Vec<f64> {
    let n = ak.len();
    let size = n - 1;
    let mut colleague = DMatrix::<f64>::zeros(size, size);
    for i in 0..size - 1 {
        colleague[(i, i + 1)] = 0.5;
        colleague[(i + 1, i)] = 0.5;
    }
    colleague[(1, 0)] = 1.0;
    let lead = ak[n - 1];
    for j in 0..size {
        colleague[(j, size - 1)] -= 0.5 * ak[j] / lead;
    }

    balance(&mut colleague);
    let mut eigenvalues = Vec::with_capacity(size);
    if !hessenberg_eigenvalues(&mut colleague, &mut eigenvalues) {
        warn!(
            size = size,
            found = eigenvalues.len(),
            "colleague QR iteration did not converge, keeping deflated eigenvalues"
        );
    }

    eigenvalues
        .into_iter()
        .filter(|(_, im)| im.abs() < htol)
        .map(|(re, _)| re)
        .collect()
}

const RADIX: f64 = 2.0;

// Per-eigenvalue cap on QR sweeps.
const MAX_SWEEPS: usize = 30;

/// Diagonal similarity scaling so that row and column norms are comparable.
/// Scale factors are powers of `RADIX`, which keeps the entries exact.
fn balance(a: &mut DMatrix<f64>) {
    let n = a.nrows();
    let radix_squared = RADIX * RADIX;
    let mut done = false;
    while !done {
        done = true;
        for i in 0..n {
            let mut c = 0.0;
            let mut r = 0.0;
            for j in (0..n).filter(|&j| j != i) {
                c += a[(j, i)].abs();
                r += a[(i, j)].abs();
            }
            if c == 0.0 || r == 0.0 {
                continue;
            }
            let s = c + r;
            let mut f = 1.0;
            let mut g = r / RADIX;
            while c < g {
                f *= RADIX;
                c *= radix_squared;
            }
            g = r * RADIX;
            while c > g {
                f /= RADIX;
                c /= radix_squared;
            }
            if (c + r) / f < 0.95 * s {
                done = false;
                let mut row = a.row_mut(i);
                row /= f;
                let mut column = a.column_mut(i);
                column *= f;
            }
        }
    }
}

/// Eigenvalues `(re, im)` of the upper Hessenberg matrix `a` by Francis
/// double-shift QR with exceptional shifts after 10 and 20 stalled sweeps.
///
/// `a` is overwritten. Returns `false` when an eigenvalue fails to deflate
/// within `MAX_SWEEPS` sweeps; `eigenvalues` then holds those already found.
fn hessenberg_eigenvalues(a: &mut DMatrix<f64>, eigenvalues: &mut Vec<(f64, f64)>) -> bool {
    let n = a.nrows();
    if n == 0 {
        return true;
    }
    let mut norm = 0.0;
    for i in 0..n {
        for j in i.saturating_sub(1)..n {
            norm += a[(i, j)].abs();
        }
    }

    let mut p: f64;
    let mut q: f64;
    let mut r: f64;
    let mut s: f64;
    let mut w: f64;
    let mut x: f64;
    let mut y: f64;
    let mut z: f64;
    let mut nn = n - 1;
    let mut t = 0.0;
    loop {
        let mut sweeps = 0;
        loop {
            // ------------ //  look for a negligible subdiagonal entry
            let mut l = 0;
            for ll in (1..=nn).rev() {
                let mut scale = a[(ll - 1, ll - 1)].abs() + a[(ll, ll)].abs();
                if scale == 0.0 {
                    scale = norm;
                }
                if a[(ll, ll - 1)].abs() + scale == scale {
                    a[(ll, ll - 1)] = 0.0;
                    l = ll;
                    break;
                }
            }

            x = a[(nn, nn)];
            if l == nn {
                eigenvalues.push((x + t, 0.0));
                if nn == 0 {
                    return true;
                }
                nn -= 1;
                break;
            }

            y = a[(nn - 1, nn - 1)];
            w = a[(nn, nn - 1)] * a[(nn - 1, nn)];
            if l == nn - 1 {
                p = 0.5 * (y - x);
                q = p * p + w;
                z = q.abs().sqrt();
                x += t;
                if q >= 0.0 {
                    z = p + z.copysign(p);
                    let second = if z != 0.0 { x - w / z } else { x + z };
                    eigenvalues.push((x + z, 0.0));
                    eigenvalues.push((second, 0.0));
                } else {
                    eigenvalues.push((x + p, z));
                    eigenvalues.push((x + p, -z));
                }
                if nn < 2 {
                    return true;
                }
                nn -= 2;
                break;
            }

            // ------------ //  double-shift QR sweep on rows l..=nn
            if sweeps == MAX_SWEEPS {
                return false;
            }
            if sweeps == 10 || sweeps == 20 {
                t += x;
                for i in 0..=nn {
                    a[(i, i)] -= x;
                }
                let shift = a[(nn, nn - 1)].abs() + a[(nn - 1, nn - 2)].abs();
                x = 0.75 * shift;
                y = x;
                w = -0.4375 * shift * shift;
            }
            sweeps += 1;

            let mut m = nn - 2;
            loop {
                z = a[(m, m)];
                r = x - z;
                s = y - z;
                p = (r * s - w) / a[(m + 1, m)] + a[(m, m + 1)];
                q = a[(m + 1, m + 1)] - z - r - s;
                r = a[(m + 2, m + 1)];
                s = p.abs() + q.abs() + r.abs();
                p /= s;
                q /= s;
                r /= s;
                if m == l {
                    break;
                }
                let u = a[(m, m - 1)].abs() * (q.abs() + r.abs());
                let v = p.abs() * (a[(m - 1, m - 1)].abs() + z.abs() + a[(m + 1, m + 1)].abs());
                if u + v == v {
                    break;
                }
                m -= 1;
            }
            for i in m + 2..=nn {
                a[(i, i - 2)] = 0.0;
                if i != m + 2 {
                    a[(i, i - 3)] = 0.0;
                }
            }

            for k in m..nn {
                if k != m {
                    p = a[(k, k - 1)];
                    q = a[(k + 1, k - 1)];
                    r = if k != nn - 1 { a[(k + 2, k - 1)] } else { 0.0 };
                    x = p.abs() + q.abs() + r.abs();
                    if x != 0.0 {
                        p /= x;
                        q /= x;
                        r /= x;
                    }
                }
                s = (p * p + q * q + r * r).sqrt().copysign(p);
                if s == 0.0 {
                    continue;
                }
                if k == m {
                    if l != m {
                        a[(k, k - 1)] = -a[(k, k - 1)];
                    }
                } else {
                    a[(k, k - 1)] = -s * x;
                }
                p += s;
                x = p / s;
                y = q / s;
                z = r / s;
                q /= p;
                r /= p;
                for j in k..=nn {
                    p = a[(k, j)] + q * a[(k + 1, j)];
                    if k != nn - 1 {
                        p += r * a[(k + 2, j)];
                        a[(k + 2, j)] -= p * z;
                    }
                    a[(k + 1, j)] -= p * y;
                    a[(k, j)] -= p * x;
                }
                for i in l..=nn.min(k + 3) {
                    p = x * a[(i, k)] + y * a[(i, k + 1)];
                    if k != nn - 1 {
                        p += z * a[(i, k + 2)];
                        a[(i, k + 2)] -= p * r;
                    }
                    a[(i, k + 1)] -= p * q;
                    a[(i, k)] -= p;
                }
            }
        }
    }
}
