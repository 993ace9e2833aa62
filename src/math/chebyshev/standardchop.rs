// ─────────────────────────────────────────────────────────────────────────────
// standard_chop
// ─────────────────────────────────────────────────────────────────────────────
//
// Decides how many leading Chebyshev coefficients carry information and
// where the tail turns into rounding noise.
//
//   1. Build the monotonically non-increasing envelope of |c_k| (running
//      maximum from the right) and normalise it so envelope[0] = 1.
//   2. Scan for the first j whose envelope is followed by a plateau: either
//      envelope[j] = 0, or the decay ratio envelope[j2]/envelope[j] with
//      j2 = round(1.25j + 5) exceeds 3(1 - ln(envelope[j])/ln(tol)).
//      No plateau before j2 runs off the end means no truncation.
//   3. Choose the cutoff minimising log10(envelope) plus a linear ramp from
//      0 to -log10(tol)/3 over the plateau window, which biases towards the
//      left.
//
// The envelope is scaled by its own maximum, so the result does not depend
// on the amplitude of the input.

/// Shortest number of coefficients to keep; the result never exceeds
/// `coefficients.len()`.
pub fn standard_chop(coefficients: &[f64], tol: f64) -> usize {
    let n = coefficients.len();
    let mut cutoff = n;
    if n < 17 {
        return cutoff;
    }

    // Step 1
    let mut envelope = vec![0.0; n];
    let mut running_max = 0.0_f64;
    for k in (0..n).rev() {
        running_max = running_max.max(coefficients[k].abs());
        envelope[k] = running_max;
    }
    if envelope[0] == 0.0 {
        return 1;
    }
    let scale = envelope[0];
    for e in envelope.iter_mut() {
        *e /= scale;
    }

    // Step 2
    let log_tol = tol.ln();
    let mut plateau_point = None;
    let mut j2 = 0;
    for j in 1..n {
        j2 = (1.25 * j as f64 + 5.0).round_ties_even() as usize;
        if j2 > n - 1 {
            return cutoff;
        }
        let e1 = envelope[j];
        let e2 = envelope[j2];
        let r = 3.0 * (1.0 - e1.ln() / log_tol);
        if e1 == 0.0 || e2 / e1 > r {
            plateau_point = Some(j - 1);
            break;
        }
    }
    let Some(plateau_point) = plateau_point else {
        return cutoff;
    };

    // Step 3
    if envelope[plateau_point] == 0.0 {
        cutoff = plateau_point;
    } else {
        let floor = tol.powf(7.0 / 6.0);
        let j3 = envelope.iter().filter(|&&e| e >= floor).count();
        if j3 < j2 {
            j2 = j3 + 1;
            envelope[j2] = floor;
        }
        let ramp_top = (-1.0 / 3.0) * tol.log10();
        let mut best = f64::INFINITY;
        let mut best_index = 0;
        for (i, &e) in envelope[..j2].iter().enumerate() {
            let ramp = if j2 > 1 {
                ramp_top * i as f64 / (j2 - 1) as f64
            } else {
                0.0
            };
            let value = e.log10() + ramp;
            if value < best {
                best = value;
                best_index = i;
            }
        }
        cutoff = best_index;
    }
    cutoff.min(n - 1)
}
