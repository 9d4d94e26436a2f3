//! Record-and-replay gradient tape for operator expressions.
//!
//! The forward pass records whole-vector operations (operator
//! applications, sums, scalings and the two scalar reductions).
//! The reverse sweep is a single pass over the records in reverse
//! order with zero-cotangent skipping; the rule for an operator
//! application is exactly one adjoint evaluation, so no elementwise
//! derivative bookkeeping ever happens.
//!
//! For a real-valued root the cotangents follow the conjugate
//! (Wirtinger) convention: the gradient of `|| A x - b ||^2 / 2`
//! with respect to `x` comes out as `A* (A x - b)`, the quantity a
//! gradient-based solver wants to step along.

use num_traits::Zero;

use crate::map::LinearMap;
use crate::op::Op;
use crate::scalar::Scalar;

/// Handle to a value recorded on a [`GradTape`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Var(usize);

enum Step<S: Scalar> {
    Input,
    Apply { op: Op<S>, x: Var },
    ApplyAdjoint { op: Op<S>, y: Var },
    Add { a: Var, b: Var },
    Sub { a: Var, b: Var },
    Scale { factor: S, a: Var },
    NormSq { a: Var },
    DotRe { a: Var, b: Var },
}

struct Record<S: Scalar> {
    value: Vec<S>,
    step: Step<S>,
}

/// Tape of vector-valued operations with reverse-mode evaluation.
pub struct GradTape<S: Scalar> {
    records: Vec<Record<S>>,
}

impl<S: Scalar> Default for GradTape<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Scalar> GradTape<S> {
    /// Create an empty tape.
    pub fn new() -> Self {
        GradTape {
            records: Vec::new(),
        }
    }

    fn push(&mut self, value: Vec<S>, step: Step<S>) -> Var {
        self.records.push(Record { value, step });
        Var(self.records.len() - 1)
    }

    /// Register an independent variable.
    pub fn var(&mut self, value: Vec<S>) -> Var {
        self.push(value, Step::Input)
    }

    /// The recorded value of `v`.
    pub fn value(&self, v: Var) -> &[S] {
        &self.records[v.0].value
    }

    /// The recorded value of a scalar-valued node such as
    /// [`norm_sq`](Self::norm_sq). Panics if `v` is vector-valued.
    pub fn scalar(&self, v: Var) -> S::Real {
        assert_eq!(
            self.records[v.0].value.len(),
            1,
            "node is not scalar-valued"
        );
        self.records[v.0].value[0].re()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record `y = A x`.
    pub fn apply(&mut self, op: &Op<S>, x: Var) -> Var {
        let y = op.apply(&self.records[x.0].value);
        self.push(y, Step::Apply { op: op.clone(), x })
    }

    /// Record `x = A* y`.
    pub fn apply_adjoint(&mut self, op: &Op<S>, y: Var) -> Var {
        let x = op.apply_adjoint(&self.records[y.0].value);
        self.push(x, Step::ApplyAdjoint { op: op.clone(), y })
    }

    /// Record an elementwise sum.
    pub fn add(&mut self, a: Var, b: Var) -> Var {
        let value = self.zip_with(a, b, |u, v| u + v);
        self.push(value, Step::Add { a, b })
    }

    /// Record an elementwise difference.
    pub fn sub(&mut self, a: Var, b: Var) -> Var {
        let value = self.zip_with(a, b, |u, v| u - v);
        self.push(value, Step::Sub { a, b })
    }

    /// Record a scalar multiple.
    pub fn scale(&mut self, factor: S, a: Var) -> Var {
        let value = self.records[a.0]
            .value
            .iter()
            .map(|&v| factor * v)
            .collect();
        self.push(value, Step::Scale { factor, a })
    }

    /// Record the squared norm `sum |v_i|^2` as a scalar-valued node.
    pub fn norm_sq(&mut self, a: Var) -> Var {
        let total = self.records[a.0]
            .value
            .iter()
            .fold(S::Real::zero(), |acc, v| acc + v.abs_sq());
        self.push(vec![S::from_real(total)], Step::NormSq { a })
    }

    /// Record the real inner product `Re sum conj(a_i) b_i` as a
    /// scalar-valued node.
    pub fn dot_re(&mut self, a: Var, b: Var) -> Var {
        let av = &self.records[a.0].value;
        let bv = &self.records[b.0].value;
        assert_eq!(av.len(), bv.len(), "dot operands differ in length");
        let total = av
            .iter()
            .zip(bv)
            .fold(S::Real::zero(), |acc, (&u, &v)| acc + (u.conj() * v).re());
        self.push(vec![S::from_real(total)], Step::DotRe { a, b })
    }

    fn zip_with(&self, a: Var, b: Var, f: impl Fn(S, S) -> S) -> Vec<S> {
        let av = &self.records[a.0].value;
        let bv = &self.records[b.0].value;
        assert_eq!(av.len(), bv.len(), "operands differ in length");
        av.iter().zip(bv).map(|(&u, &v)| f(u, v)).collect()
    }

    /// Run the reverse sweep from a scalar-valued root, seeding its
    /// cotangent with 1.
    pub fn backward(&self, root: Var) -> Gradients<S> {
        assert_eq!(
            self.records[root.0].value.len(),
            1,
            "backward requires a scalar-valued root"
        );
        self.sweep(root, vec![S::one()])
    }

    /// Run the reverse sweep with a custom cotangent seed, yielding a
    /// vector-Jacobian product for a vector-valued root.
    pub fn backward_seeded(&self, root: Var, seed: &[S]) -> Gradients<S> {
        assert_eq!(
            seed.len(),
            self.records[root.0].value.len(),
            "seed length does not match root value"
        );
        self.sweep(root, seed.to_vec())
    }

    fn sweep(&self, root: Var, seed: Vec<S>) -> Gradients<S> {
        let mut cots: Vec<Option<Vec<S>>> = (0..self.records.len()).map(|_| None).collect();
        cots[root.0] = Some(seed);

        for idx in (0..self.records.len()).rev() {
            // Operands always precede their result, so the cotangent
            // flowing out of `idx` only touches earlier slots.
            let (earlier, rest) = cots.split_at_mut(idx);
            let Some(cot) = rest[0].as_ref() else { continue };
            match &self.records[idx].step {
                Step::Input => {}
                Step::Apply { op, x } => {
                    accumulate(&mut earlier[x.0], op.apply_adjoint(cot));
                }
                Step::ApplyAdjoint { op, y } => {
                    accumulate(&mut earlier[y.0], op.apply(cot));
                }
                Step::Add { a, b } => {
                    accumulate(&mut earlier[a.0], cot.clone());
                    accumulate(&mut earlier[b.0], cot.clone());
                }
                Step::Sub { a, b } => {
                    accumulate(&mut earlier[a.0], cot.clone());
                    accumulate(&mut earlier[b.0], cot.iter().map(|&c| -c).collect());
                }
                Step::Scale { factor, a } => {
                    let c = factor.conj();
                    accumulate(&mut earlier[a.0], cot.iter().map(|&v| c * v).collect());
                }
                Step::NormSq { a } => {
                    let c = cot[0];
                    let c2 = c + c;
                    let delta = self.records[a.0].value.iter().map(|&v| v * c2).collect();
                    accumulate(&mut earlier[a.0], delta);
                }
                Step::DotRe { a, b } => {
                    let c = cot[0];
                    let av = &self.records[a.0].value;
                    let bv = &self.records[b.0].value;
                    accumulate(&mut earlier[a.0], bv.iter().map(|&v| v * c).collect());
                    accumulate(&mut earlier[b.0], av.iter().map(|&v| v * c).collect());
                }
            }
        }

        let lens = self.records.iter().map(|r| r.value.len()).collect();
        Gradients {
            cotangents: cots,
            lens,
        }
    }
}

/// Cotangents produced by a reverse sweep.
pub struct Gradients<S: Scalar> {
    cotangents: Vec<Option<Vec<S>>>,
    lens: Vec<usize>,
}

impl<S: Scalar> Gradients<S> {
    /// The gradient with respect to `v`. Variables the root does not
    /// depend on get a zero gradient.
    pub fn wrt(&self, v: Var) -> Vec<S> {
        match &self.cotangents[v.0] {
            Some(cot) => cot.clone(),
            None => vec![S::zero(); self.lens[v.0]],
        }
    }
}

fn accumulate<S: Scalar>(slot: &mut Option<Vec<S>>, delta: Vec<S>) {
    match slot {
        Some(acc) => {
            for (a, d) in acc.iter_mut().zip(&delta) {
                *a += *d;
            }
        }
        None => *slot = Some(delta),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basics::{Dense, Diag};
    use crate::map::LinearMap;
    use approx::assert_relative_eq;

    #[test]
    fn least_squares_gradient_is_adjoint_of_residual() {
        let a = Op::new(Dense::new(2, 3, vec![1.0, -1.0, 0.5, 2.0, 0.0, -0.5]).unwrap());
        let mut tape = GradTape::new();
        let x = tape.var(vec![0.3, -0.7, 1.1]);
        let b = tape.var(vec![1.0, -2.0]);
        let ax = tape.apply(&a, x);
        let r = tape.sub(ax, b);
        let loss = tape.norm_sq(r);

        let grads = tape.backward(loss);
        let gx = grads.wrt(x);

        let residual = {
            let ax = a.apply(tape.value(x));
            ax.iter()
                .zip(tape.value(b))
                .map(|(&u, &v)| u - v)
                .collect::<Vec<f64>>()
        };
        let expected: Vec<f64> = a
            .apply_adjoint(&residual)
            .iter()
            .map(|&g| 2.0 * g)
            .collect();
        for (g, e) in gx.iter().zip(&expected) {
            assert_relative_eq!(g, e, epsilon = 1e-12);
        }

        let gb = grads.wrt(b);
        for (g, r) in gb.iter().zip(&residual) {
            assert_relative_eq!(*g, -2.0 * r, epsilon = 1e-12);
        }
    }

    #[test]
    fn untouched_variables_get_zero_gradients() {
        let mut tape = GradTape::<f64>::new();
        let x = tape.var(vec![1.0, 2.0]);
        let unused = tape.var(vec![5.0; 4]);
        let loss = tape.norm_sq(x);
        let grads = tape.backward(loss);
        assert_eq!(grads.wrt(unused), vec![0.0; 4]);
    }

    #[test]
    fn seeded_sweep_is_a_vector_jacobian_product() {
        let d = Op::new(Diag::from_weights(vec![2.0, -3.0]));
        let mut tape = GradTape::new();
        let x = tape.var(vec![1.0, 1.0]);
        let y = tape.apply(&d, x);
        let grads = tape.backward_seeded(y, &[1.0, 1.0]);
        assert_eq!(grads.wrt(x), vec![2.0, -3.0]);
    }

    #[test]
    fn scale_backpropagates_the_conjugate_factor() {
        use num_complex::Complex;
        type C = Complex<f64>;

        let d = Op::new(Diag::from_weights(vec![C::new(0.0, 1.0), C::new(2.0, 0.0)]));
        let mut tape = GradTape::new();
        let x = tape.var(vec![C::new(1.0, 0.0), C::new(0.0, 1.0)]);
        let y = tape.apply(&d, x);
        let s = tape.scale(C::new(0.0, 2.0), y);
        let loss = tape.norm_sq(s);

        // || c D x ||^2 gradient: 2 conj(c) D* (c D x).
        let grads = tape.backward(loss);
        let gx = grads.wrt(x);
        let c = C::new(0.0, 2.0);
        let dx = d.apply(tape.value(x));
        let cdx: Vec<C> = dx.iter().map(|&v| c * v).collect();
        let mut expected = d.apply_adjoint(&cdx);
        for e in expected.iter_mut() {
            *e = Scalar::conj(c) * *e * C::new(2.0, 0.0);
        }
        for (g, e) in gx.iter().zip(&expected) {
            assert_relative_eq!(g.re, e.re, epsilon = 1e-12);
            assert_relative_eq!(g.im, e.im, epsilon = 1e-12);
        }
    }

    #[test]
    fn dot_root_gradients_are_the_opposite_operands() {
        let mut tape = GradTape::<f64>::new();
        let w = tape.var(vec![1.0, 2.0, 3.0]);
        let x = tape.var(vec![-1.0, 0.5, 2.0]);
        let f = tape.dot_re(w, x);
        assert_relative_eq!(tape.scalar(f), 6.0, epsilon = 1e-12);

        let grads = tape.backward(f);
        assert_eq!(grads.wrt(w), vec![-1.0, 0.5, 2.0]);
        assert_eq!(grads.wrt(x), vec![1.0, 2.0, 3.0]);
    }
}
