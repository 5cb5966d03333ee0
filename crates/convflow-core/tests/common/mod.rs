#![allow(dead_code)]

use approx::abs_diff_eq;
use convflow_core::{Element, FilterTensor, Tensor4D};
use num_traits::NumCast;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Install a fmt subscriber that writes through the test harness.
/// `RUST_LOG=convflow_core=debug` shows descriptor and backend decisions.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn cast<T: Element>(v: f64) -> T {
    <T as NumCast>::from(v).unwrap()
}

/// `1, 2, 3, ...` scaled by `scale`, row-major
pub fn iota_values<T: Element>(n: usize, scale: f64) -> Vec<T> {
    (1..=n).map(|v| cast(v as f64 * scale)).collect()
}

pub fn iota_tensor<T: Element>(shape: [usize; 4], scale: f64) -> Tensor4D<T> {
    Tensor4D::from_vec(iota_values(shape.iter().product(), scale), shape).unwrap()
}

pub fn iota_filter<T: Element>(shape: [usize; 4], scale: f64) -> FilterTensor<T> {
    FilterTensor::from_vec(iota_values(shape.iter().product(), scale), shape).unwrap()
}

pub fn random_values<T: Element>(rng: &mut StdRng, n: usize) -> Vec<T> {
    (0..n).map(|_| cast(rng.gen_range(-1.0..1.0))).collect()
}

pub fn random_tensor<T: Element>(rng: &mut StdRng, shape: [usize; 4]) -> Tensor4D<T> {
    Tensor4D::from_vec(random_values(rng, shape.iter().product()), shape).unwrap()
}

pub fn random_filter<T: Element>(rng: &mut StdRng, shape: [usize; 4]) -> FilterTensor<T> {
    FilterTensor::from_vec(random_values(rng, shape.iter().product()), shape).unwrap()
}

pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Element-wise comparison with a message naming the first bad position
pub fn assert_close<T: Element>(actual: &[T], expected: &[f64], tol: f64) {
    assert_eq!(actual.len(), expected.len(), "length mismatch");
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        let a = a.to_f64().unwrap();
        assert!(
            abs_diff_eq!(a, *e, epsilon = tol),
            "Mismatch at position {}: expected {}, got {}",
            i,
            e,
            a
        );
    }
}

/// Relative comparison for backend parity, where magnitudes vary widely
pub fn assert_relative_close<T: Element>(actual: &[T], expected: &[T], rtol: f64) {
    assert_eq!(actual.len(), expected.len(), "length mismatch");
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        let (a, e) = (a.to_f64().unwrap(), e.to_f64().unwrap());
        assert!(
            approx::relative_eq!(a, e, epsilon = rtol, max_relative = rtol),
            "Mismatch at position {}: expected {}, got {}",
            i,
            e,
            a
        );
    }
}

pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Largest absolute difference between the theoretical Jacobian of a linear
/// map `x -> y` and its central-difference estimate.
///
/// `forward` evaluates the map; `backward` applies its transpose to an output
/// gradient. Row `j` of the theoretical Jacobian is `backward(e_j)`; column
/// `i` of the numerical one is `(forward(x + d e_i) - forward(x - d e_i)) / 2d`.
pub fn max_jacobian_error<F, B>(x: &[f64], y_len: usize, delta: f64, forward: F, backward: B) -> f64
where
    F: Fn(&[f64]) -> Vec<f64>,
    B: Fn(&[f64]) -> Vec<f64>,
{
    let mut theoretical = vec![0.0; x.len() * y_len];
    let mut unit = vec![0.0; y_len];
    for j in 0..y_len {
        unit[j] = 1.0;
        let row = backward(&unit);
        assert_eq!(row.len(), x.len());
        for (i, v) in row.into_iter().enumerate() {
            theoretical[i * y_len + j] = v;
        }
        unit[j] = 0.0;
    }

    let mut max_error: f64 = 0.0;
    let mut probe = x.to_vec();
    for i in 0..x.len() {
        probe[i] = x[i] + delta;
        let plus = forward(&probe);
        probe[i] = x[i] - delta;
        let minus = forward(&probe);
        probe[i] = x[i];
        for j in 0..y_len {
            let numerical = (plus[j] - minus[j]) / (2.0 * delta);
            max_error = max_error.max((numerical - theoretical[i * y_len + j]).abs());
        }
    }
    max_error
}
