//! Conjugate gradients for self-adjoint positive semidefinite systems.

use axolotl::{LinearMap, Normal, Scalar};
use log::{debug, trace};
use num_traits::{Float, One, Zero};

use crate::convergence::{all_finite, axpy, dot, norm, norm_sq, sub, xpby, ConvergenceParams};
use crate::result::{SolveResult, Status};

/// Configuration for [`cg`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CgConfig<R> {
    /// Iteration budget and relative residual tolerance.
    pub convergence: ConvergenceParams<R>,
    /// Refresh the residual as `b - G x` every this many iterations
    /// instead of updating it recursively; `0` never refreshes
    /// (default: 50).
    pub recompute_interval: usize,
}

impl Default for CgConfig<f64> {
    fn default() -> Self {
        CgConfig {
            convergence: ConvergenceParams::default(),
            recompute_interval: 50,
        }
    }
}

impl Default for CgConfig<f32> {
    fn default() -> Self {
        CgConfig {
            convergence: ConvergenceParams::default(),
            recompute_interval: 50,
        }
    }
}

/// Solves `G x = b` for a self-adjoint positive semidefinite `G`.
///
/// Convergence is declared when `|b - G x| <= tol * max(|b|, 1)`. The
/// solve stops with [`Status::Breakdown`] when the curvature
/// `<p, G p>` collapses and no step can be taken, and with
/// [`Status::Instability`] when a non-finite value appears, returning
/// the last finite iterate.
pub fn cg<S, G>(gram: &G, rhs: &[S], x0: &[S], config: &CgConfig<S::Real>) -> SolveResult<S>
where
    S: Scalar,
    G: LinearMap<S> + ?Sized,
{
    assert_eq!(rhs.len(), x0.len(), "cg: rhs and x0 lengths differ");
    let max_iter = config.convergence.max_iter;
    let tol = config.convergence.tol;

    let mut x = x0.to_vec();
    let gx = gram.apply(&x);
    let mut r = sub(rhs, &gx);
    let mut rs_old = norm_sq(&r);
    let mut last_res = rs_old.sqrt();
    let mut trace_log = Vec::with_capacity(max_iter);

    if max_iter == 0 {
        return SolveResult {
            x,
            iterations: 0,
            residual_norm: last_res,
            trace: trace_log,
            status: Status::MaxIterations,
        };
    }

    let b_norm = norm(rhs);
    let denom = if b_norm > S::Real::zero() {
        b_norm
    } else {
        S::Real::one()
    };
    if last_res <= tol * denom {
        return SolveResult {
            x,
            iterations: 0,
            residual_norm: last_res,
            trace: trace_log,
            status: Status::Converged,
        };
    }

    let mut p = r.clone();
    let mut gp = vec![S::zero(); r.len()];
    for iter in 0..max_iter {
        gram.apply_into(&p, &mut gp);
        let p_gp = dot(&p, &gp).re();
        if !p_gp.is_finite() {
            debug!("cg: non-finite curvature at iteration {iter}");
            return SolveResult {
                x,
                iterations: iter,
                residual_norm: last_res,
                trace: trace_log,
                status: Status::Instability,
            };
        }
        if p_gp.abs() < S::Real::min_positive_value() {
            debug!("cg: curvature collapsed at iteration {iter}");
            return SolveResult {
                x,
                iterations: iter,
                residual_norm: last_res,
                trace: trace_log,
                status: Status::Breakdown,
            };
        }
        let prev = x.clone();
        let alpha = rs_old / p_gp;
        axpy(&mut x, S::from_real(alpha), &p);

        let refresh = config.recompute_interval > 0 && (iter + 1) % config.recompute_interval == 0;
        if refresh {
            let gx = gram.apply(&x);
            for ((r, &b), &g) in r.iter_mut().zip(rhs).zip(&gx) {
                *r = b - g;
            }
        } else {
            axpy(&mut r, S::from_real(-alpha), &gp);
        }

        let rs_new = norm_sq(&r);
        let res = rs_new.sqrt();
        if !res.is_finite() || !all_finite(&x) {
            debug!("cg: non-finite iterate at iteration {iter}");
            return SolveResult {
                x: if all_finite(&x) { x } else { prev },
                iterations: iter,
                residual_norm: last_res,
                trace: trace_log,
                status: Status::Instability,
            };
        }
        trace_log.push(res);
        last_res = res;
        trace!("cg: iter {iter} residual {res:e}");

        if res <= tol * denom {
            debug!("cg: converged after {} iterations", iter + 1);
            return SolveResult {
                x,
                iterations: iter + 1,
                residual_norm: res,
                trace: trace_log,
                status: Status::Converged,
            };
        }
        let beta = rs_new / rs_old;
        xpby(&mut p, &r, S::from_real(beta));
        rs_old = rs_new;
    }
    debug!("cg: iteration budget exhausted at residual {last_res:e}");
    SolveResult {
        x,
        iterations: max_iter,
        residual_norm: last_res,
        trace: trace_log,
        status: Status::MaxIterations,
    }
}

/// Solves the least-squares problem `min |A x - data|^2` through the
/// normal equations `A* A x = A* data`.
pub fn cg_normal<S, A>(a: &A, data: &[S], x0: &[S], config: &CgConfig<S::Real>) -> SolveResult<S>
where
    S: Scalar,
    A: LinearMap<S> + ?Sized,
{
    let rhs = a.apply_adjoint(data);
    cg(&Normal::new(a), &rhs, x0, config)
}
