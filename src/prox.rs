//! Proximal operators for the nonsmooth half of regularized
//! objectives.
//!
//! Every operator evaluates `prox_{t f}(x) = argmin_z f(z) +
//! ||z - x||^2 / (2 t)` for its penalty `f`, where `t` is the step
//! size the solver is currently taking. Penalty strengths are fixed at
//! construction; the step varies per call so backtracking solvers can
//! reuse one operator across step changes.
//!
//! Complex inputs are handled throughout: magnitude-based penalties
//! shrink the modulus and preserve the phase.

use std::fmt;

use num_traits::{Float, FromPrimitive, One, ToPrimitive, Zero};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{Error, Result};
use crate::map::LinearMap;
use crate::op::Op;
use crate::real::Real;
use crate::scalar::Scalar;

/// A proximal operator.
///
/// `step` is the solver step size `t` in `prox_{t f}`; implementations
/// must accept any positive value.
pub trait Prox<S: Scalar>: Send + Sync {
    fn apply(&self, x: &[S], step: S::Real) -> Vec<S>;
}

/// Elementwise soft thresholding, the prox of `lambda * ||x||_1`.
///
/// Each entry's modulus shrinks by `step * lambda`; entries at or
/// below the threshold go to zero exactly.
#[derive(Clone, Debug)]
pub struct SoftThreshold<R> {
    lambda: R,
}

impl<R: Real> SoftThreshold<R> {
    pub fn new(lambda: R) -> Self {
        SoftThreshold { lambda }
    }
}

impl<S: Scalar> Prox<S> for SoftThreshold<S::Real> {
    fn apply(&self, x: &[S], step: S::Real) -> Vec<S> {
        let t = step * self.lambda;
        x.iter().map(|&v| shrink(v, t)).collect()
    }
}

fn shrink<S: Scalar>(v: S, t: S::Real) -> S {
    let m = v.modulus();
    if m <= t {
        S::zero()
    } else {
        v.scale((m - t) / m)
    }
}

/// Grouped soft thresholding, the prox of the `l2,1` mixed norm
/// `lambda * sum_g ||x_g||_2` over consecutive groups of fixed length.
///
/// Whole groups shrink together: a group whose norm is at or below
/// `step * lambda` is zeroed, the rest keep their direction. A final
/// shorter group is allowed and treated the same way.
#[derive(Clone, Debug)]
pub struct GroupSoftThreshold<R> {
    lambda: R,
    group_len: usize,
}

impl<R: Real> GroupSoftThreshold<R> {
    pub fn new(lambda: R, group_len: usize) -> Result<Self> {
        if group_len == 0 {
            return Err(Error::EmptyGroup);
        }
        Ok(GroupSoftThreshold { lambda, group_len })
    }
}

impl<S: Scalar> Prox<S> for GroupSoftThreshold<S::Real> {
    fn apply(&self, x: &[S], step: S::Real) -> Vec<S> {
        let t = step * self.lambda;
        let mut out = Vec::with_capacity(x.len());
        for group in x.chunks(self.group_len) {
            let norm = group
                .iter()
                .fold(S::Real::zero(), |acc, v| acc + v.abs_sq())
                .sqrt();
            if norm <= t {
                out.extend(group.iter().map(|_| S::zero()));
            } else {
                let factor = (norm - t) / norm;
                out.extend(group.iter().map(|&v| v.scale(factor)));
            }
        }
        out
    }
}

/// Hard thresholding, the prox of `lambda * ||x||_0`.
///
/// Entries with modulus at or below `sqrt(2 * step * lambda)` are
/// zeroed, the rest pass through unchanged.
#[derive(Clone, Debug)]
pub struct HardThreshold<R> {
    lambda: R,
}

impl<R: Real> HardThreshold<R> {
    pub fn new(lambda: R) -> Self {
        HardThreshold { lambda }
    }
}

impl<S: Scalar> Prox<S> for HardThreshold<S::Real> {
    fn apply(&self, x: &[S], step: S::Real) -> Vec<S> {
        let two = S::Real::one() + S::Real::one();
        let cut = (two * step * self.lambda).sqrt();
        x.iter()
            .map(|&v| if v.modulus() > cut { v } else { S::zero() })
            .collect()
    }
}

/// Block soft thresholding of the whole vector, the prox of
/// `lambda * ||x||_2`.
#[derive(Clone, Debug)]
pub struct L2Norm<R> {
    lambda: R,
}

impl<R: Real> L2Norm<R> {
    pub fn new(lambda: R) -> Self {
        L2Norm { lambda }
    }
}

impl<S: Scalar> Prox<S> for L2Norm<S::Real> {
    fn apply(&self, x: &[S], step: S::Real) -> Vec<S> {
        let t = step * self.lambda;
        let norm = x
            .iter()
            .fold(S::Real::zero(), |acc, v| acc + v.abs_sq())
            .sqrt();
        if norm <= t {
            vec![S::zero(); x.len()]
        } else {
            let factor = (norm - t) / norm;
            x.iter().map(|&v| v.scale(factor)).collect()
        }
    }
}

/// The prox of `lambda * ||x||_2^2`, a uniform shrink by
/// `1 / (1 + 2 * step * lambda)`.
#[derive(Clone, Debug)]
pub struct SquaredL2<R> {
    lambda: R,
}

impl<R: Real> SquaredL2<R> {
    pub fn new(lambda: R) -> Self {
        SquaredL2 { lambda }
    }
}

impl<S: Scalar> Prox<S> for SquaredL2<S::Real> {
    fn apply(&self, x: &[S], step: S::Real) -> Vec<S> {
        let two = S::Real::one() + S::Real::one();
        let factor = S::Real::one() / (S::Real::one() + two * step * self.lambda);
        x.iter().map(|&v| v.scale(factor)).collect()
    }
}

/// Projection onto a box, the prox of its indicator function.
///
/// Real and imaginary parts are clamped to `[lower, upper]`
/// independently; the step size has no effect on a projection.
#[derive(Clone, Debug)]
pub struct BoxConstraint<R> {
    lower: R,
    upper: R,
}

impl<R: Real> BoxConstraint<R> {
    /// Panics if `lower > upper`.
    pub fn new(lower: R, upper: R) -> Self {
        assert!(lower <= upper, "box bounds are inverted");
        BoxConstraint { lower, upper }
    }
}

impl<S: Scalar> Prox<S> for BoxConstraint<S::Real> {
    fn apply(&self, x: &[S], _step: S::Real) -> Vec<S> {
        x.iter()
            .map(|&v| {
                let re = v.re().max(self.lower).min(self.upper);
                let im = v.im().max(self.lower).min(self.upper);
                S::from_re_im(re, im)
            })
            .collect()
    }
}

/// The prox of the zero penalty: the identity.
#[derive(Clone, Copy, Debug, Default)]
pub struct Const;

impl<S: Scalar> Prox<S> for Const {
    fn apply(&self, x: &[S], _step: S::Real) -> Vec<S> {
        x.to_vec()
    }
}

/// The prox of the convex conjugate `f*` of a wrapped penalty,
/// computed through the Moreau identity
/// `prox_{t f*}(x) = x - t * prox_{f / t}(x / t)`.
#[derive(Clone, Debug)]
pub struct Conjugate<P> {
    inner: P,
}

impl<P> Conjugate<P> {
    pub fn new(inner: P) -> Self {
        Conjugate { inner }
    }
}

impl<S: Scalar, P: Prox<S>> Prox<S> for Conjugate<P> {
    fn apply(&self, x: &[S], step: S::Real) -> Vec<S> {
        let inv = S::Real::one() / step;
        let scaled: Vec<S> = x.iter().map(|&v| v.scale(inv)).collect();
        let p = self.inner.apply(&scaled, inv);
        x.iter()
            .zip(&p)
            .map(|(&v, &q)| v - q.scale(step))
            .collect()
    }
}

/// Different proximal operators applied to consecutive segments of one
/// vector, for separable penalties over partitioned unknowns.
pub struct Stack<S: Scalar> {
    parts: Vec<(Box<dyn Prox<S>>, usize)>,
    total_len: usize,
}

impl<S: Scalar> Stack<S> {
    /// Each part covers `len` consecutive entries; the lengths must
    /// sum to `total_len`, the length of the vectors this operator
    /// will be applied to.
    pub fn new(total_len: usize, parts: Vec<(Box<dyn Prox<S>>, usize)>) -> Result<Self> {
        let got: usize = parts.iter().map(|(_, len)| len).sum();
        if got != total_len {
            return Err(Error::SegmentMismatch {
                got,
                expected: total_len,
            });
        }
        Ok(Stack { parts, total_len })
    }
}

impl<S: Scalar> fmt::Debug for Stack<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stack")
            .field("total_len", &self.total_len)
            .field("segment_lens", &self.parts.iter().map(|(_, len)| *len).collect::<Vec<_>>())
            .finish()
    }
}

impl<S: Scalar> Prox<S> for Stack<S> {
    fn apply(&self, x: &[S], step: S::Real) -> Vec<S> {
        assert_eq!(
            x.len(),
            self.total_len,
            "input length does not match the stacked segments"
        );
        let mut out = Vec::with_capacity(x.len());
        let mut offset = 0;
        for (prox, len) in &self.parts {
            out.extend(prox.apply(&x[offset..offset + len], step));
            offset += len;
        }
        out
    }
}

/// A penalty evaluated in a transform domain: the prox of
/// `f(U x)` for unitary `U`, which is `U* prox_f(U x)`.
///
/// That identity only holds when `U` is unitary, so construction runs
/// a randomized round-trip probe `U* U x = x` and rejects transforms
/// that fail it. Square shape alone is checked first; a non-square
/// transform is a shape error, not a unitarity failure.
pub struct TransformProx<S: Scalar, P> {
    transform: Op<S>,
    inner: P,
}

const PROBE_ROUNDS: usize = 2;
const PROBE_SEED: u64 = 0x1d5c;

impl<S: Scalar, P: Prox<S>> TransformProx<S, P> {
    pub fn new(transform: Op<S>, inner: P) -> Result<Self> {
        let n_in = transform.in_shape().numel();
        let n_out = transform.out_shape().numel();
        if n_in != n_out {
            return Err(Error::ShapeMismatch {
                context: "TransformProx::new",
                lhs: transform.out_shape().clone(),
                rhs: transform.in_shape().clone(),
            });
        }

        let tol = S::Real::epsilon().sqrt();
        let mut rng = StdRng::seed_from_u64(PROBE_SEED);
        for _ in 0..PROBE_ROUNDS {
            let x = probe_vector::<S>(&mut rng, n_in);
            let u = transform.apply(&x);
            let back = transform.apply_adjoint(&u);
            let mut dev_sq = S::Real::zero();
            let mut norm_sq = S::Real::zero();
            for (&b, &v) in back.iter().zip(&x) {
                dev_sq = dev_sq + (b - v).abs_sq();
                norm_sq = norm_sq + v.abs_sq();
            }
            let deviation = (dev_sq / norm_sq).sqrt();
            if !(deviation <= tol) {
                return Err(Error::NotUnitary {
                    deviation: deviation.to_f64().unwrap_or(f64::NAN),
                    tol: tol.to_f64().unwrap_or(f64::NAN),
                });
            }
        }

        Ok(TransformProx { transform, inner })
    }
}

impl<S: Scalar, P: Prox<S>> Prox<S> for TransformProx<S, P> {
    fn apply(&self, x: &[S], step: S::Real) -> Vec<S> {
        let u = self.transform.apply(x);
        let p = self.inner.apply(&u, step);
        self.transform.apply_adjoint(&p)
    }
}

fn probe_vector<S: Scalar>(rng: &mut StdRng, len: usize) -> Vec<S> {
    (0..len)
        .map(|_| {
            let re = S::Real::from_f64(rng.gen::<f64>() - 0.5).unwrap_or_else(S::Real::zero);
            let im = S::Real::from_f64(rng.gen::<f64>() - 0.5).unwrap_or_else(S::Real::zero);
            S::from_re_im(re, im)
        })
        .collect()
}
