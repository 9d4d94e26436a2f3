use axolotl::Scalar;
use num_traits::{Float, Zero};

/// Parameters controlling iteration budgets and convergence checks.
///
/// `tol` is interpreted by each solver against its own criterion: the
/// relative residual for conjugate gradients, the relative iterate
/// change for the proximal-gradient family and the relative eigenvalue
/// change for power iteration. `tol = 0` disables the check and runs
/// the full budget.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConvergenceParams<R> {
    /// Maximum number of iterations (default: 100).
    pub max_iter: usize,
    /// Convergence tolerance (default: 1e-8 for `f64`, 1e-5 for `f32`).
    pub tol: R,
}

impl Default for ConvergenceParams<f64> {
    fn default() -> Self {
        ConvergenceParams {
            max_iter: 100,
            tol: 1e-8,
        }
    }
}

impl Default for ConvergenceParams<f32> {
    fn default() -> Self {
        ConvergenceParams {
            max_iter: 100,
            tol: 1e-5,
        }
    }
}

/// Inner product `sum conj(a_i) b_i`.
pub fn dot<S: Scalar>(a: &[S], b: &[S]) -> S {
    debug_assert_eq!(a.len(), b.len());
    let mut s = S::zero();
    for (&u, &v) in a.iter().zip(b) {
        s += u.conj() * v;
    }
    s
}

/// Squared L2 norm.
pub fn norm_sq<S: Scalar>(v: &[S]) -> S::Real {
    let mut s = S::Real::zero();
    for &x in v {
        s = s + x.abs_sq();
    }
    s
}

/// L2 norm.
pub fn norm<S: Scalar>(v: &[S]) -> S::Real {
    norm_sq(v).sqrt()
}

/// In-place `y += alpha * x`.
pub fn axpy<S: Scalar>(y: &mut [S], alpha: S, x: &[S]) {
    debug_assert_eq!(y.len(), x.len());
    for (y, &x) in y.iter_mut().zip(x) {
        *y += alpha * x;
    }
}

/// In-place direction update `p = x + beta * p`.
pub fn xpby<S: Scalar>(p: &mut [S], x: &[S], beta: S) {
    debug_assert_eq!(p.len(), x.len());
    for (p, &x) in p.iter_mut().zip(x) {
        *p = x + beta * *p;
    }
}

/// Elementwise difference `a - b`.
pub fn sub<S: Scalar>(a: &[S], b: &[S]) -> Vec<S> {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(&u, &v)| u - v).collect()
}

/// L2 distance between two iterates.
pub fn dist<S: Scalar>(a: &[S], b: &[S]) -> S::Real {
    debug_assert_eq!(a.len(), b.len());
    let mut s = S::Real::zero();
    for (&u, &v) in a.iter().zip(b) {
        s = s + (u - v).abs_sq();
    }
    s.sqrt()
}

/// Whether every entry is finite in both parts.
pub fn all_finite<S: Scalar>(v: &[S]) -> bool {
    v.iter().all(|x| x.is_finite())
}
