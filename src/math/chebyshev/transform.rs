use std::f64::consts::PI;

use nalgebra::Complex;

// ─────────────────────────────────────────────────────────────────────────────
// Chebyshev points of the second kind and the values <-> coefficients pair
// ─────────────────────────────────────────────────────────────────────────────
//
//   x_k = sin(π(2k - m) / 2m),  k = 0..=m,  m = n - 1
//
// The grid runs from -1 to 1. The sine form is exactly antisymmetric, so
// x_k = -x_{m-k} holds bit for bit.
//
// Both directions reduce to the cosine sums of the even extension of length
// 2m:
//
//   S_j = Σ_{k=0}^{2m-1} e_k·cos(π j k / m)
//
// computed with a radix-2 FFT when 2m is a power of two (every adaptive
// grid is) and with a direct sum over a cosine table otherwise.

pub fn chebyshev_points(n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => {
            let m = (n - 1) as f64;
            (0..n)
                .map(|k| (PI * (2.0 * k as f64 - m) / (2.0 * m)).sin())
                .collect()
        }
    }
}

/// Barycentric weights for the second-kind grid: alternating signs, halved
/// at both ends, positive at the right end.
pub fn barycentric_weights(n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![1.0],
        _ => {
            let mut weights: Vec<f64> = (0..n)
                .map(|k| if (n - 1 - k) % 2 == 0 { 1.0 } else { -1.0 })
                .collect();
            weights[0] *= 0.5;
            weights[n - 1] *= 0.5;
            weights
        }
    }
}

pub fn values_to_coefficients(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    if n <= 1 {
        return values.to_vec();
    }
    let m = n - 1;
    let extension: Vec<f64> = values
        .iter()
        .rev()
        .chain(values[1..m].iter())
        .copied()
        .collect();
    let scale = 1.0 / (2 * m) as f64;
    let mut coefficients: Vec<f64> = cosine_sums(&extension, n)
        .into_iter()
        .map(|s| s * scale)
        .collect();
    for c in &mut coefficients[1..m] {
        *c *= 2.0;
    }
    coefficients
}

pub fn coefficients_to_values(coefficients: &[f64]) -> Vec<f64> {
    let n = coefficients.len();
    if n <= 1 {
        return coefficients.to_vec();
    }
    let m = n - 1;
    let mut halved = coefficients.to_vec();
    for c in &mut halved[1..m] {
        *c *= 0.5;
    }
    let extension: Vec<f64> = halved
        .iter()
        .chain(halved[1..m].iter().rev())
        .copied()
        .collect();
    let mut values = cosine_sums(&extension, n);
    values.reverse();
    values
}

/// First `count` cosine sums of a real, even extension.
fn cosine_sums(extension: &[f64], count: usize) -> Vec<f64> {
    let len = extension.len();
    if len.is_power_of_two() {
        let mut data: Vec<Complex<f64>> = extension
            .iter()
            .map(|&e| Complex::new(e, 0.0))
            .collect();
        fft_in_place(&mut data);
        data.iter().take(count).map(|z| z.re).collect()
    } else {
        let m = (len / 2) as f64;
        let table: Vec<f64> = (0..len).map(|l| (PI * l as f64 / m).cos()).collect();
        (0..count)
            .map(|j| {
                let mut sum = 0.0;
                for (k, &e) in extension.iter().enumerate() {
                    sum += e * table[(j * k) % len];
                }
                sum
            })
            .collect()
    }
}

/// Iterative radix-2 decimation-in-time FFT (forward sign). `data.len()`
/// must be a power of two.
fn fft_in_place(data: &mut [Complex<f64>]) {
    let n = data.len();

    // bit reversal
    let mut j = 0;
    for i in 1..n {
        let mut bit = n >> 1;
        while j & bit != 0 {
            j ^= bit;
            bit >>= 1;
        }
        j |= bit;
        if i < j {
            data.swap(i, j);
        }
    }

    let mut length = 2;
    while length <= n {
        let angle = -2.0 * PI / length as f64;
        let half = length / 2;
        for start in (0..n).step_by(length) {
            for k in 0..half {
                let twiddle = Complex::new((angle * k as f64).cos(), (angle * k as f64).sin());
                let u = data[start + k];
                let v = data[start + k + half] * twiddle;
                data[start + k] = u + v;
                data[start + k + half] = u - v;
            }
        }
        length <<= 1;
    }
}
