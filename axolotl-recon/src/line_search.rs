use axolotl::Scalar;
use num_traits::{One, Zero};

/// Parameters for backtracking estimation of the gradient step.
///
/// The estimate starts at `l0` and is multiplied by `growth` until the
/// smooth term is majorized at the candidate point. The estimate is
/// monotone across iterations: a level accepted once is the starting
/// point for the next search.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BacktrackParams<R> {
    /// Initial Lipschitz estimate (default: 1).
    pub l0: R,
    /// Multiplier applied on each failed check (default: 2).
    pub growth: R,
    /// Maximum number of growth steps per iteration (default: 30).
    pub max_doublings: usize,
}

impl Default for BacktrackParams<f64> {
    fn default() -> Self {
        BacktrackParams {
            l0: 1.0,
            growth: 2.0,
            max_doublings: 30,
        }
    }
}

impl Default for BacktrackParams<f32> {
    fn default() -> Self {
        BacktrackParams {
            l0: 1.0,
            growth: 2.0,
            max_doublings: 30,
        }
    }
}

/// Checks the quadratic upper bound
/// `f(c) <= f(a) + Re<g, c - a> + level/2 * |c - a|^2`
/// for the smooth term around the anchor point `a`.
pub fn within_majorizer<S: Scalar>(
    f_candidate: S::Real,
    f_anchor: S::Real,
    grad: &[S],
    candidate: &[S],
    anchor: &[S],
    level: S::Real,
) -> bool {
    debug_assert_eq!(grad.len(), candidate.len());
    debug_assert_eq!(grad.len(), anchor.len());
    let mut linear = S::Real::zero();
    let mut quad = S::Real::zero();
    for ((&g, &c), &a) in grad.iter().zip(candidate).zip(anchor) {
        let d = c - a;
        linear = linear + (g.conj() * d).re();
        quad = quad + d.abs_sq();
    }
    let half = S::Real::one() / (S::Real::one() + S::Real::one());
    f_candidate <= f_anchor + linear + level * half * quad
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn majorizer_accepts_quadratics_at_their_own_curvature() {
        // f(x) = x^2 around a = 1: f(c) = f(a) + 2(c - a) + (c - a)^2,
        // so level = 2 is tight and level = 1 is too shallow.
        let a = [1.0f64];
        let c = [3.0f64];
        let grad = [2.0f64];
        let (fa, fc) = (1.0, 9.0);
        assert!(within_majorizer(fc, fa, &grad, &c, &a, 2.0));
        assert!(!within_majorizer(fc, fa, &grad, &c, &a, 1.0));
    }

    #[test]
    fn majorizer_uses_the_real_part_for_complex_gradients() {
        use axolotl::Complex64;
        let a = [Complex64::new(0.0, 0.0)];
        let c = [Complex64::new(0.0, 1.0)];
        let grad = [Complex64::new(0.0, 2.0)];
        // Re<conj(2i) * i> = 2, |d|^2 = 1.
        assert!(within_majorizer(3.0, 0.0, &grad, &c, &a, 2.0));
        assert!(!within_majorizer(3.1, 0.0, &grad, &c, &a, 2.0));
    }
}
