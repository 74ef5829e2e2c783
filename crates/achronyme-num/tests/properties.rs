//! Property tests for the numeric kernels.

use achronyme_common::{Complex, Matrix};
use achronyme_num::{conv, fft, linalg, stats};
use proptest::collection::vec;
use proptest::prelude::*;
use std::f64::consts::PI;

fn naive_dft(xs: &[Complex]) -> Vec<Complex> {
    let n = xs.len();
    (0..n)
        .map(|k| {
            let mut acc = Complex::ZERO;
            for (j, &x) in xs.iter().enumerate() {
                acc += x * Complex::cis(-2.0 * PI * (k * j) as f64 / n as f64);
            }
            acc
        })
        .collect()
}

fn signal(len: impl Into<proptest::collection::SizeRange>) -> impl Strategy<Value = Vec<f64>> {
    vec(-100.0_f64..100.0, len)
}

fn square_matrix(max_n: usize) -> impl Strategy<Value = Matrix> {
    (1..=max_n).prop_flat_map(|n| {
        vec(-10.0_f64..10.0, n * n)
            .prop_map(move |data| Matrix::new(n, n, data).unwrap())
    })
}

/// Symmetric positive-definite by construction: BᵀB + n·I.
fn spd_matrix(max_n: usize) -> impl Strategy<Value = Matrix> {
    square_matrix(max_n).prop_map(|b| {
        let n = b.rows();
        let mut a = b.transpose().matmul(&b).unwrap();
        for i in 0..n {
            a.set(i, i, a.get(i, i) + n as f64);
        }
        a
    })
}

fn max_abs_diff(a: &Matrix, b: &Matrix) -> f64 {
    a.data()
        .iter()
        .zip(b.data())
        .fold(0.0_f64, |acc, (x, y)| acc.max((x - y).abs()))
}

proptest! {
    #[test]
    fn fft_matches_the_dft_definition(xs in signal(1..64usize)) {
        let zs: Vec<Complex> = xs.iter().map(|&x| Complex::from_real(x)).collect();
        let fast = fft::dft(&zs).unwrap();
        let slow = naive_dft(&zs);
        let max_in = xs.iter().fold(0.0_f64, |a, x| a.max(x.abs()));
        let tol = 1e-9 * (max_in * xs.len() as f64).max(1.0);
        for (a, b) in fast.iter().zip(&slow) {
            prop_assert!((*a - *b).abs() < tol);
        }
    }

    #[test]
    fn ifft_inverts_fft(xs in signal(1..256usize)) {
        // The forward transform is exact at the input length, so the
        // round trip reproduces the signal at every length.
        let spectrum = fft::dft_real(&xs).unwrap();
        prop_assert_eq!(spectrum.len(), xs.len());
        let back = fft::ifft(&spectrum).unwrap();
        let max_in = xs.iter().fold(0.0_f64, |a, x| a.max(x.abs()));
        let tol = 1e-10 * max_in.max(1.0);
        prop_assert_eq!(back.len(), xs.len());
        for (z, &expected) in back.iter().zip(&xs) {
            prop_assert!((z.re - expected).abs() < tol);
            prop_assert!(z.im.abs() < tol);
        }
    }

    #[test]
    fn fft_mag_is_the_spectrum_magnitude(xs in signal(1..64usize)) {
        let mags = fft::fft_mag(&xs).unwrap();
        let spectrum = fft::dft_real(&xs).unwrap();
        let max_in = xs.iter().fold(0.0_f64, |a, x| a.max(x.abs()));
        prop_assert_eq!(mags.len(), xs.len());
        for (m, z) in mags.iter().zip(&spectrum) {
            prop_assert!((m - z.abs()).abs() <= 1e-10 * max_in.max(1.0));
        }
    }

    #[test]
    fn conv_direct_equals_conv_fft(
        a in signal(1..48usize),
        b in signal(1..48usize),
    ) {
        let direct = conv::conv(&a, &b).unwrap();
        let fast = conv::conv_fft(&a, &b).unwrap();
        prop_assert_eq!(direct.len(), fast.len());
        for (x, y) in direct.iter().zip(&fast) {
            prop_assert!((x - y).abs() < 1e-6);
        }
    }

    #[test]
    fn lu_reconstructs_pa(a in square_matrix(6)) {
        if let Ok(f) = linalg::lu(&a) {
            let pa = f.permutation_matrix().matmul(&a).unwrap();
            let prod = f.lower.matmul(&f.upper).unwrap();
            prop_assert!(max_abs_diff(&pa, &prod) < 1e-10 * a.max_abs().max(1.0));
        }
    }

    #[test]
    fn qr_reconstructs_a(a in square_matrix(6)) {
        let (q, r) = linalg::qr(&a).unwrap();
        let qtq = q.transpose().matmul(&q).unwrap();
        prop_assert!(max_abs_diff(&qtq, &Matrix::identity(a.rows())) < 1e-10);
        let prod = q.matmul(&r).unwrap();
        prop_assert!(max_abs_diff(&prod, &a) < 1e-10 * a.max_abs().max(1.0));
    }

    #[test]
    fn cholesky_reconstructs_spd(a in spd_matrix(6)) {
        let l = linalg::cholesky(&a).unwrap();
        let back = l.matmul(&l.transpose()).unwrap();
        prop_assert!(max_abs_diff(&back, &a) < 1e-10 * a.max_abs().max(1.0));
    }

    #[test]
    fn inverse_of_spd_gives_identity(a in spd_matrix(5)) {
        let inv = linalg::inverse(&a).unwrap();
        let prod = a.matmul(&inv).unwrap();
        // SPD by construction keeps the conditioning benign.
        prop_assert!(max_abs_diff(&prod, &Matrix::identity(a.rows())) < 1e-6);
    }

    #[test]
    fn solve_agrees_with_matvec(a in spd_matrix(5), seed in vec(-5.0_f64..5.0, 5)) {
        let n = a.rows();
        let x_true: Vec<f64> = seed.iter().take(n).copied().collect();
        let b = a.matvec(&x_true).unwrap();
        let x = linalg::solve(&a, &b).unwrap();
        for (got, want) in x.iter().zip(&x_true) {
            prop_assert!((got - want).abs() < 1e-6);
        }
    }

    #[test]
    fn eigen_symmetric_reconstructs(a in spd_matrix(5)) {
        let (values, vectors) = linalg::eigen_symmetric(&a, 100, 1e-12).unwrap();
        for j in 0..a.rows() {
            let v: Vec<f64> = (0..a.rows()).map(|i| vectors.get(i, j)).collect();
            let av = a.matvec(&v).unwrap();
            for i in 0..a.rows() {
                prop_assert!((av[i] - values[j] * v[i]).abs() < 1e-6 * a.max_abs().max(1.0));
            }
        }
    }

    #[test]
    fn svd_reconstructs(a in square_matrix(5)) {
        let (u, s, v) = linalg::svd(&a).unwrap();
        let mut us = u.clone();
        for j in 0..s.len() {
            for i in 0..u.rows() {
                us.set(i, j, u.get(i, j) * s[j]);
            }
        }
        let back = us.matmul(&v.transpose()).unwrap();
        prop_assert!(max_abs_diff(&back, &a) < 1e-8 * a.max_abs().max(1.0));
    }

    #[test]
    fn population_variance_identity(xs in signal(1..64usize)) {
        // var = E[x²] − E[x]²
        let n = xs.len() as f64;
        let mean_sq = xs.iter().map(|&x| x * x).sum::<f64>() / n;
        let m = stats::mean(&xs);
        let var = stats::var(&xs, 0).unwrap();
        prop_assert!((var - (mean_sq - m * m)).abs() < 1e-7 * mean_sq.max(1.0));
    }
}
