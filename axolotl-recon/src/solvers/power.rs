//! Power iteration for the dominant eigenvalue of a self-adjoint map.
//!
//! The main use is step-size selection: [`lipschitz`] estimates
//! `|A|^2` (the largest eigenvalue of `A* A`), which bounds the
//! Lipschitz constant of the gradient of `|A x - b|^2 / 2`.

use axolotl::{LinearMap, Normal, Scalar};
use log::{debug, trace};
use num_traits::{Float, FromPrimitive, One, Zero};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::convergence::{dot, norm, ConvergenceParams};

/// Parameters for [`power_iter`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PowerConfig<R> {
    /// Iteration budget and relative eigenvalue-change tolerance.
    pub convergence: ConvergenceParams<R>,
    /// Seed for the random starting vector (default: 0x706f77).
    pub seed: u64,
}

impl Default for PowerConfig<f64> {
    fn default() -> Self {
        PowerConfig {
            convergence: ConvergenceParams {
                max_iter: 200,
                ..ConvergenceParams::default()
            },
            seed: 0x706f77,
        }
    }
}

impl Default for PowerConfig<f32> {
    fn default() -> Self {
        PowerConfig {
            convergence: ConvergenceParams {
                max_iter: 200,
                ..ConvergenceParams::default()
            },
            seed: 0x706f77,
        }
    }
}

/// Outcome of a power iteration.
#[derive(Debug, Clone, Copy)]
pub struct PowerResult<R> {
    /// Dominant eigenvalue estimate (a Rayleigh quotient).
    pub eigenvalue: R,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Whether the relative eigenvalue change fell below tolerance.
    pub converged: bool,
}

/// Estimates the dominant eigenvalue of a self-adjoint `map`.
///
/// Stops when the Rayleigh quotient changes by less than
/// `tol * max(|lambda|, 1)` between iterations.
pub fn power_iter<S, M>(map: &M, config: &PowerConfig<S::Real>) -> PowerResult<S::Real>
where
    S: Scalar,
    M: LinearMap<S> + ?Sized,
{
    let n = map.in_shape().numel();
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut v: Vec<S> = (0..n)
        .map(|_| S::from_real(S::Real::from_f64(rng.gen::<f64>() - 0.5).unwrap_or_else(S::Real::zero)))
        .collect();
    let nv = norm(&v);
    if nv > S::Real::zero() {
        let inv = S::Real::one() / nv;
        for x in v.iter_mut() {
            *x = x.scale(inv);
        }
    }

    let tol = config.convergence.tol;
    let mut lambda = S::Real::zero();
    let mut w = vec![S::zero(); n];
    for iter in 0..config.convergence.max_iter {
        map.apply_into(&v, &mut w);
        let lambda_new = dot(&v, &w).re();
        if !lambda_new.is_finite() {
            debug!("power_iter: non-finite Rayleigh quotient at iteration {iter}");
            return PowerResult {
                eigenvalue: lambda,
                iterations: iter,
                converged: false,
            };
        }
        let nw = norm(&w);
        if nw == S::Real::zero() {
            // v is in the null space; the estimate is exact.
            return PowerResult {
                eigenvalue: lambda_new,
                iterations: iter + 1,
                converged: true,
            };
        }
        let inv = S::Real::one() / nw;
        for (v, &w) in v.iter_mut().zip(w.iter()) {
            *v = w.scale(inv);
        }
        trace!("power_iter: iter {iter} lambda {lambda_new}");
        let floor = if lambda_new.abs() > S::Real::one() {
            lambda_new.abs()
        } else {
            S::Real::one()
        };
        if (lambda_new - lambda).abs() <= tol * floor {
            return PowerResult {
                eigenvalue: lambda_new,
                iterations: iter + 1,
                converged: true,
            };
        }
        lambda = lambda_new;
    }
    PowerResult {
        eigenvalue: lambda,
        iterations: config.convergence.max_iter,
        converged: false,
    }
}

/// Estimates `|A|^2` by power iteration on `A* A`.
///
/// The returned eigenvalue is the Lipschitz constant of the gradient
/// of `|A x - b|^2 / 2`.
pub fn lipschitz<S, A>(a: &A, config: &PowerConfig<S::Real>) -> PowerResult<S::Real>
where
    S: Scalar,
    A: LinearMap<S> + ?Sized,
{
    power_iter(&Normal::new(a), config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use axolotl::basics::Diag;

    #[test]
    fn finds_the_largest_diagonal_entry() {
        let d = Diag::from_weights(vec![1.0, 2.0, 5.0, 3.0, 4.0]);
        let out = power_iter(&d, &PowerConfig::default());
        assert!(out.converged);
        assert_relative_eq!(out.eigenvalue, 5.0, epsilon = 1e-6);
    }

    #[test]
    fn lipschitz_squares_the_spectral_norm() {
        let d = Diag::from_weights(vec![3.0, 1.0, 2.0]);
        let out = lipschitz(&d, &PowerConfig::default());
        assert!(out.converged);
        assert_relative_eq!(out.eigenvalue, 9.0, epsilon = 1e-6);
    }

    #[test]
    fn zero_map_converges_to_zero() {
        let d = Diag::from_weights(vec![0.0, 0.0]);
        let out = power_iter(&d, &PowerConfig::default());
        assert!(out.converged);
        assert_eq!(out.eigenvalue, 0.0);
    }
}
