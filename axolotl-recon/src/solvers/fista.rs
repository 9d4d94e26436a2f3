//! FISTA for composite objectives `|A x - data|^2 / 2 + h(x)`.

use axolotl::prox::Prox;
use axolotl::{LinearMap, Scalar};
use log::{debug, trace};
use num_traits::{Float, One, Zero};

use crate::convergence::{all_finite, dist, norm, norm_sq, sub, ConvergenceParams};
use crate::line_search::{within_majorizer, BacktrackParams};
use crate::result::{SolveResult, Status};

/// How the gradient step size is chosen.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StepRule<R> {
    /// Fixed step `1 / L` from a known Lipschitz constant.
    Lipschitz(R),
    /// Backtracking estimation of the Lipschitz constant.
    Backtracking(BacktrackParams<R>),
}

/// Configuration for [`fista`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FistaConfig<R> {
    /// Iteration budget and relative iterate-change tolerance.
    pub convergence: ConvergenceParams<R>,
    /// Step-size rule (default: backtracking).
    pub step: StepRule<R>,
}

impl Default for FistaConfig<f64> {
    fn default() -> Self {
        FistaConfig {
            convergence: ConvergenceParams::default(),
            step: StepRule::Backtracking(BacktrackParams::default()),
        }
    }
}

impl Default for FistaConfig<f32> {
    fn default() -> Self {
        FistaConfig {
            convergence: ConvergenceParams::default(),
            step: StepRule::Backtracking(BacktrackParams::default()),
        }
    }
}

impl<R> FistaConfig<R> {
    /// Configuration with a known Lipschitz constant `|A|^2`.
    pub fn with_lipschitz(lipschitz: R) -> Self
    where
        ConvergenceParams<R>: Default,
    {
        FistaConfig {
            convergence: ConvergenceParams::default(),
            step: StepRule::Lipschitz(lipschitz),
        }
    }
}

fn prox_step<S: Scalar>(
    anchor: &[S],
    grad: &[S],
    step: S::Real,
    prox: Option<&dyn Prox<S>>,
) -> Vec<S> {
    let z: Vec<S> = anchor
        .iter()
        .zip(grad)
        .map(|(&y, &g)| y - g.scale(step))
        .collect();
    match prox {
        Some(p) => p.apply(&z, step),
        None => z,
    }
}

/// Minimizes `|A x - data|^2 / 2 + h(x)` where `h` enters through its
/// proximal operator (`None` means `h = 0`).
///
/// This is the accelerated proximal-gradient method of Beck and
/// Teboulle. The trace records `|A y - data|` at each momentum point.
/// Convergence is declared when the iterate change falls below
/// `tol * max(|x|, 1)`; a non-finite iterate aborts the solve and
/// returns the last finite one with [`Status::Instability`].
pub fn fista<S, A>(
    a: &A,
    data: &[S],
    prox: Option<&dyn Prox<S>>,
    x0: &[S],
    config: &FistaConfig<S::Real>,
) -> SolveResult<S>
where
    S: Scalar,
    A: LinearMap<S> + ?Sized,
{
    let max_iter = config.convergence.max_iter;
    let tol = config.convergence.tol;
    let two = S::Real::one() + S::Real::one();
    let half = S::Real::one() / two;
    let four = two * two;

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

    let mut y = x.clone();
    let mut t = S::Real::one();
    let mut level = match &config.step {
        StepRule::Lipschitz(l) => *l,
        StepRule::Backtracking(p) => p.l0,
    };
    let mut trace_log = Vec::with_capacity(max_iter);
    let mut last_res = S::Real::zero();

    for iter in 0..max_iter {
        let ay = a.apply(&y);
        let r = sub(&ay, data);
        let rsq = norm_sq(&r);
        let res = rsq.sqrt();
        let g = a.apply_adjoint(&r);

        let next = match &config.step {
            StepRule::Lipschitz(_) => prox_step(&y, &g, S::Real::one() / level, prox),
            StepRule::Backtracking(params) => {
                let f_y = half * rsq;
                let mut cand = prox_step(&y, &g, S::Real::one() / level, prox);
                for _ in 0..params.max_doublings {
                    let rc = sub(&a.apply(&cand), data);
                    let f_cand = half * norm_sq(&rc);
                    if within_majorizer(f_cand, f_y, &g, &cand, &y, level) {
                        break;
                    }
                    level = level * params.growth;
                    trace!("fista: iter {iter} raising level to {level:e}");
                    cand = prox_step(&y, &g, S::Real::one() / level, prox);
                }
                cand
            }
        };

        if !res.is_finite() || !all_finite(&next) {
            debug!("fista: non-finite iterate at iteration {iter}");
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
        trace!("fista: iter {iter} residual {res:e}");

        let t_next = (S::Real::one() + (S::Real::one() + four * t * t).sqrt()) * half;
        let beta = (t - S::Real::one()) / t_next;
        let change = dist(&next, &x);
        let floor = {
            let nx = norm(&x);
            if nx > S::Real::one() {
                nx
            } else {
                S::Real::one()
            }
        };
        for ((y, &n), &p) in y.iter_mut().zip(&next).zip(&x) {
            *y = n + (n - p).scale(beta);
        }
        x = next;
        t = t_next;

        if change <= tol * floor {
            debug!("fista: converged after {} iterations", iter + 1);
            return SolveResult {
                x,
                iterations: iter + 1,
                residual_norm: last_res,
                trace: trace_log,
                status: Status::Converged,
            };
        }
    }
    debug!("fista: iteration budget exhausted at residual {last_res:e}");
    SolveResult {
        x,
        iterations: max_iter,
        residual_norm: last_res,
        trace: trace_log,
        status: Status::MaxIterations,
    }
}
