//! POGM for composite objectives `|A x - data|^2 / 2 + h(x)`.
//!
//! The proximal optimized gradient method of Kim and Fessler carries
//! three coupled sequences (gradient step, over-relaxed point, proximal
//! iterate) and reaches a worst-case bound about twice as tight as
//! FISTA's for the same iteration count.

use axolotl::prox::Prox;
use axolotl::{LinearMap, Scalar};
use log::{debug, trace};
use num_traits::{Float, One, Zero};

use crate::convergence::{all_finite, dist, norm, sub, ConvergenceParams};
use crate::result::{SolveResult, Status};

/// Configuration for [`pogm`].
///
/// POGM has no backtracking variant; callers estimate `|A|^2` up front,
/// typically with [`crate::solvers::power::lipschitz`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PogmConfig<R> {
    /// Iteration budget and relative iterate-change tolerance.
    pub convergence: ConvergenceParams<R>,
    /// Lipschitz constant of the gradient, `|A|^2`.
    pub lipschitz: R,
}

impl<R> PogmConfig<R> {
    /// Configuration with default convergence parameters.
    pub fn new(lipschitz: R) -> Self
    where
        ConvergenceParams<R>: Default,
    {
        PogmConfig {
            convergence: ConvergenceParams::default(),
            lipschitz,
        }
    }
}

/// Minimizes `|A x - data|^2 / 2 + h(x)` where `h` enters through its
/// proximal operator (`None` means `h = 0`).
///
/// The momentum coefficient follows the standard recurrence
/// `t = (1 + sqrt(1 + 4 t^2)) / 2`, switching to
/// `(1 + sqrt(1 + 8 t^2)) / 2` on the final iteration, which is what
/// yields the method's tightened bound. The trace records
/// `|A x - data|` at each iterate. Stopping and instability handling
/// match [`super::fista::fista`].
pub fn pogm<S, A>(
    a: &A,
    data: &[S],
    prox: Option<&dyn Prox<S>>,
    x0: &[S],
    config: &PogmConfig<S::Real>,
) -> SolveResult<S>
where
    S: Scalar,
    A: LinearMap<S> + ?Sized,
{
    let max_iter = config.convergence.max_iter;
    let tol = config.convergence.tol;
    let one = S::Real::one();
    let two = one + one;
    let half = one / two;
    let four = two * two;
    let eight = four + four;

    let mut x = x0.to_vec();
    if max_iter == 0 {
        let r = sub(&a.apply(&x), data);
        return SolveResult {
            x,
            iterations: 0,
            residual_norm: norm(&r),
            trace: Vec::new(),
            status: Status::MaxIterations,
        };
    }

    let l = config.lipschitz;
    let inv_l = one / l;
    let mut u_old = x.clone();
    let mut z_old = x.clone();
    let mut t = one;
    let mut gamma_old = inv_l;
    let mut trace_log = Vec::with_capacity(max_iter);
    let mut last_res = S::Real::zero();

    for iter in 0..max_iter {
        let ax = a.apply(&x);
        let r = sub(&ax, data);
        let res = norm(&r);
        let g = a.apply_adjoint(&r);

        let told = t;
        let boost = if iter + 1 == max_iter { eight } else { four };
        t = (one + (one + boost * told * told).sqrt()) * half;

        let u: Vec<S> = x
            .iter()
            .zip(&g)
            .map(|(&x, &g)| x - g.scale(inv_l))
            .collect();
        let c_momentum = (told - one) / t;
        let c_ogm = told / t;
        let c_prox = (told - one) / (l * gamma_old * t);
        let z: Vec<S> = u
            .iter()
            .zip(&u_old)
            .zip(&x)
            .zip(&z_old)
            .map(|(((&u, &uo), &x), &zo)| {
                u + (u - uo).scale(c_momentum) + (u - x).scale(c_ogm) + (zo - x).scale(c_prox)
            })
            .collect();
        let gamma = (two * told + t - one) / (l * t);
        let next = match prox {
            Some(p) => p.apply(&z, gamma),
            None => z.clone(),
        };

        if !res.is_finite() || !all_finite(&next) {
            debug!("pogm: non-finite iterate at iteration {iter}");
            return SolveResult {
                x,
                iterations: iter,
                residual_norm: last_res,
                trace: trace_log,
                status: Status::Instability,
            };
        }
        trace_log.push(res);
        last_res = res;
        trace!("pogm: iter {iter} residual {res:e}");

        let change = dist(&next, &x);
        let floor = {
            let nx = norm(&x);
            if nx > one {
                nx
            } else {
                one
            }
        };
        u_old = u;
        z_old = z;
        gamma_old = gamma;
        x = next;

        if change <= tol * floor {
            debug!("pogm: converged after {} iterations", iter + 1);
            return SolveResult {
                x,
                iterations: iter + 1,
                residual_norm: last_res,
                trace: trace_log,
                status: Status::Converged,
            };
        }
    }
    debug!("pogm: iteration budget exhausted at residual {last_res:e}");
    SolveResult {
        x,
        iterations: max_iter,
        residual_norm: last_res,
        trace: trace_log,
        status: Status::MaxIterations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use axolotl::basics::{Diag, Identity};
    use axolotl::prox::SoftThreshold;

    #[test]
    fn identity_design_recovers_the_soft_threshold() {
        let a = Identity::new(3);
        let data = [3.0, -0.5, 0.2];
        let prox = SoftThreshold::new(1.0);
        let config = PogmConfig {
            convergence: ConvergenceParams {
                max_iter: 200,
                tol: 1e-12,
            },
            lipschitz: 1.0,
        };
        let out = pogm(&a, &data, Some(&prox), &[0.0; 3], &config);
        assert!(out.converged());
        assert_relative_eq!(out.x[0], 2.0, epsilon = 1e-6);
        assert_relative_eq!(out.x[1], 0.0, epsilon = 1e-6);
        assert_relative_eq!(out.x[2], 0.0, epsilon = 1e-6);
    }

    #[test]
    fn plain_least_squares_without_a_prox() {
        let a = Diag::from_weights(vec![1.0, 2.0]);
        let out = pogm(&a, &[1.0, 4.0], None, &[0.0, 0.0], &PogmConfig::new(4.0));
        assert!(out.converged());
        assert_relative_eq!(out.x[0], 1.0, epsilon = 1e-6);
        assert_relative_eq!(out.x[1], 2.0, epsilon = 1e-6);
    }

    #[test]
    fn zero_budget_returns_the_initial_iterate() {
        let a = Identity::new(1);
        let config = PogmConfig {
            convergence: ConvergenceParams {
                max_iter: 0,
                ..ConvergenceParams::default()
            },
            lipschitz: 1.0,
        };
        let out = pogm(&a, &[1.0], None, &[5.0], &config);
        assert_eq!(out.x, vec![5.0]);
        assert_eq!(out.iterations, 0);
        assert!(out.trace.is_empty());
        assert!(!out.converged());
    }
}
