//! The composite operator algebra.
//!
//! [`Op`] wraps a closed set of combinators over [`LinearMap`] leaves:
//! scaling, sums, composition, adjoints, block-diagonal stacking and
//! Kronecker replication. Every combinator validates shape agreement
//! at construction and derives its adjoint structurally, so any
//! expression built from correct leaves passes the dot test by
//! construction.

use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::map::LinearMap;
use crate::scalar::Scalar;
use crate::shape::Shape;

/// A composable linear operator.
///
/// Leaves are shared through `Arc`, so cloning an expression is cheap
/// and never copies leaf data. The combinator set is closed: new
/// behavior enters the algebra by implementing [`LinearMap`] on a leaf
/// type, not by extending the expression tree.
#[derive(Clone)]
pub struct Op<S: Scalar> {
    node: Node<S>,
}

#[derive(Clone)]
enum Node<S: Scalar> {
    Leaf(Arc<dyn LinearMap<S>>),
    Scale { factor: S, inner: Box<Op<S>> },
    Sum { left: Box<Op<S>>, right: Box<Op<S>> },
    Compose { outer: Box<Op<S>>, inner: Box<Op<S>> },
    Adjoint { inner: Box<Op<S>> },
    BlockDiag { blocks: Vec<Op<S>>, in_shape: Shape, out_shape: Shape },
    Kron { block: Box<Op<S>>, copies: usize, in_shape: Shape, out_shape: Shape },
}

impl<S: Scalar> Op<S> {
    /// Wrap a leaf operator.
    pub fn new<M: LinearMap<S> + 'static>(map: M) -> Self {
        Op::from_arc(Arc::new(map))
    }

    /// Wrap an already shared leaf operator.
    pub fn from_arc(map: Arc<dyn LinearMap<S>>) -> Self {
        Op {
            node: Node::Leaf(map),
        }
    }

    /// Scale by a scalar factor. The adjoint scales by its conjugate.
    pub fn scale(self, factor: S) -> Self {
        Op {
            node: Node::Scale {
                factor,
                inner: Box::new(self),
            },
        }
    }

    /// Pointwise sum of two operators with identical domains and
    /// codomains.
    pub fn sum(left: Op<S>, right: Op<S>) -> Result<Self> {
        if left.in_shape() != right.in_shape() {
            return Err(Error::ShapeMismatch {
                context: "Op::sum (input)",
                lhs: left.in_shape().clone(),
                rhs: right.in_shape().clone(),
            });
        }
        if left.out_shape() != right.out_shape() {
            return Err(Error::ShapeMismatch {
                context: "Op::sum (output)",
                lhs: left.out_shape().clone(),
                rhs: right.out_shape().clone(),
            });
        }
        Ok(Op {
            node: Node::Sum {
                left: Box::new(left),
                right: Box::new(right),
            },
        })
    }

    /// Composition `outer . inner`: `inner` is applied first.
    pub fn compose(outer: Op<S>, inner: Op<S>) -> Result<Self> {
        if inner.out_shape() != outer.in_shape() {
            return Err(Error::ShapeMismatch {
                context: "Op::compose",
                lhs: outer.in_shape().clone(),
                rhs: inner.out_shape().clone(),
            });
        }
        Ok(Op {
            node: Node::Compose {
                outer: Box::new(outer),
                inner: Box::new(inner),
            },
        })
    }

    /// The structural adjoint. Taking the adjoint twice unwraps back
    /// to the original expression instead of nesting.
    pub fn adjoint(self) -> Self {
        match self.node {
            Node::Adjoint { inner } => *inner,
            node => Op {
                node: Node::Adjoint {
                    inner: Box::new(Op { node }),
                },
            },
        }
    }

    /// Block-diagonal stacking of operators with identical shapes.
    ///
    /// Inputs and outputs gain a leading stacking dimension; block `k`
    /// acts on the `k`-th contiguous slab of the flat buffer.
    pub fn block_diag(blocks: Vec<Op<S>>) -> Result<Self> {
        let first = blocks.first().ok_or(Error::EmptyBlock {
            context: "Op::block_diag",
        })?;
        for block in &blocks[1..] {
            if block.in_shape() != first.in_shape() {
                return Err(Error::ShapeMismatch {
                    context: "Op::block_diag (input)",
                    lhs: first.in_shape().clone(),
                    rhs: block.in_shape().clone(),
                });
            }
            if block.out_shape() != first.out_shape() {
                return Err(Error::ShapeMismatch {
                    context: "Op::block_diag (output)",
                    lhs: first.out_shape().clone(),
                    rhs: block.out_shape().clone(),
                });
            }
        }
        let in_shape = first.in_shape().with_leading(blocks.len());
        let out_shape = first.out_shape().with_leading(blocks.len());
        Ok(Op {
            node: Node::BlockDiag {
                blocks,
                in_shape,
                out_shape,
            },
        })
    }

    /// Kronecker product with an identity: `copies` independent
    /// applications of `block` along a new leading dimension.
    pub fn kron(block: Op<S>, copies: usize) -> Result<Self> {
        if copies == 0 {
            return Err(Error::EmptyBlock {
                context: "Op::kron",
            });
        }
        let in_shape = block.in_shape().with_leading(copies);
        let out_shape = block.out_shape().with_leading(copies);
        Ok(Op {
            node: Node::Kron {
                block: Box::new(block),
                copies,
                in_shape,
                out_shape,
            },
        })
    }

    /// The normal operator `A* A` of this expression.
    pub fn gram(&self) -> Op<S> {
        Op::compose(self.clone().adjoint(), self.clone())
            .expect("adjoint output shape always matches input shape")
    }

    fn kind(&self) -> &'static str {
        match &self.node {
            Node::Leaf(_) => "Leaf",
            Node::Scale { .. } => "Scale",
            Node::Sum { .. } => "Sum",
            Node::Compose { .. } => "Compose",
            Node::Adjoint { .. } => "Adjoint",
            Node::BlockDiag { .. } => "BlockDiag",
            Node::Kron { .. } => "Kron",
        }
    }
}

impl<S: Scalar> LinearMap<S> for Op<S> {
    fn in_shape(&self) -> &Shape {
        match &self.node {
            Node::Leaf(map) => map.in_shape(),
            Node::Scale { inner, .. } => inner.in_shape(),
            Node::Sum { left, .. } => left.in_shape(),
            Node::Compose { inner, .. } => inner.in_shape(),
            Node::Adjoint { inner } => inner.out_shape(),
            Node::BlockDiag { in_shape, .. } => in_shape,
            Node::Kron { in_shape, .. } => in_shape,
        }
    }

    fn out_shape(&self) -> &Shape {
        match &self.node {
            Node::Leaf(map) => map.out_shape(),
            Node::Scale { inner, .. } => inner.out_shape(),
            Node::Sum { left, .. } => left.out_shape(),
            Node::Compose { outer, .. } => outer.out_shape(),
            Node::Adjoint { inner } => inner.in_shape(),
            Node::BlockDiag { out_shape, .. } => out_shape,
            Node::Kron { out_shape, .. } => out_shape,
        }
    }

    fn apply_into(&self, x: &[S], y: &mut [S]) {
        debug_assert_eq!(x.len(), self.in_shape().numel());
        debug_assert_eq!(y.len(), self.out_shape().numel());
        match &self.node {
            Node::Leaf(map) => map.apply_into(x, y),
            Node::Scale { factor, inner } => {
                inner.apply_into(x, y);
                for v in y.iter_mut() {
                    *v *= *factor;
                }
            }
            Node::Sum { left, right } => {
                left.apply_into(x, y);
                let extra = right.apply(x);
                for (v, e) in y.iter_mut().zip(&extra) {
                    *v += *e;
                }
            }
            Node::Compose { outer, inner } => {
                let mid = inner.apply(x);
                outer.apply_into(&mid, y);
            }
            Node::Adjoint { inner } => inner.apply_adjoint_into(x, y),
            Node::BlockDiag { blocks, .. } => {
                let b_in = blocks[0].in_shape().numel();
                let b_out = blocks[0].out_shape().numel();
                for (k, block) in blocks.iter().enumerate() {
                    block.apply_into(
                        &x[k * b_in..(k + 1) * b_in],
                        &mut y[k * b_out..(k + 1) * b_out],
                    );
                }
            }
            Node::Kron { block, copies, .. } => {
                let b_in = block.in_shape().numel();
                let b_out = block.out_shape().numel();
                for k in 0..*copies {
                    block.apply_into(
                        &x[k * b_in..(k + 1) * b_in],
                        &mut y[k * b_out..(k + 1) * b_out],
                    );
                }
            }
        }
    }

    fn apply_adjoint_into(&self, y: &[S], x: &mut [S]) {
        debug_assert_eq!(y.len(), self.out_shape().numel());
        debug_assert_eq!(x.len(), self.in_shape().numel());
        match &self.node {
            Node::Leaf(map) => map.apply_adjoint_into(y, x),
            Node::Scale { factor, inner } => {
                inner.apply_adjoint_into(y, x);
                let c = factor.conj();
                for v in x.iter_mut() {
                    *v *= c;
                }
            }
            Node::Sum { left, right } => {
                left.apply_adjoint_into(y, x);
                let extra = right.apply_adjoint(y);
                for (v, e) in x.iter_mut().zip(&extra) {
                    *v += *e;
                }
            }
            // (A B)* = B* A*: the outer adjoint is applied first.
            Node::Compose { outer, inner } => {
                let mid = outer.apply_adjoint(y);
                inner.apply_adjoint_into(&mid, x);
            }
            Node::Adjoint { inner } => inner.apply_into(y, x),
            Node::BlockDiag { blocks, .. } => {
                let b_in = blocks[0].in_shape().numel();
                let b_out = blocks[0].out_shape().numel();
                for (k, block) in blocks.iter().enumerate() {
                    block.apply_adjoint_into(
                        &y[k * b_out..(k + 1) * b_out],
                        &mut x[k * b_in..(k + 1) * b_in],
                    );
                }
            }
            Node::Kron { block, copies, .. } => {
                let b_in = block.in_shape().numel();
                let b_out = block.out_shape().numel();
                for k in 0..*copies {
                    block.apply_adjoint_into(
                        &y[k * b_out..(k + 1) * b_out],
                        &mut x[k * b_in..(k + 1) * b_in],
                    );
                }
            }
        }
    }
}

impl<S: Scalar> fmt::Display for Op<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{}x{} {} Op>",
            self.out_shape(),
            self.in_shape(),
            self.kind()
        )
    }
}

impl<S: Scalar> fmt::Debug for Op<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basics::{Dense, Diag, Identity};

    fn small_dense() -> Op<f64> {
        Op::new(Dense::new(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap())
    }

    #[test]
    fn compose_applies_inner_first() {
        let a = small_dense();
        let d = Op::new(Diag::from_weights(vec![10.0, 100.0]));
        let c = Op::compose(d, a).unwrap();
        assert_eq!(c.apply(&[1.0, 0.0, -1.0]), vec![-20.0, -200.0]);
    }

    #[test]
    fn compose_rejects_mismatched_shapes() {
        let a = small_dense();
        let i = Op::<f64>::new(Identity::new(3));
        let err = Op::compose(i, a).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn double_adjoint_unwraps() {
        let a = small_dense();
        let twice = a.clone().adjoint().adjoint();
        assert_eq!(twice.kind(), "Leaf");
        assert_eq!(twice.apply(&[1.0, 1.0, 1.0]), a.apply(&[1.0, 1.0, 1.0]));
    }

    #[test]
    fn block_diag_routes_slabs_independently() {
        let d1 = Op::new(Diag::from_weights(vec![2.0, 2.0]));
        let d2 = Op::new(Diag::from_weights(vec![-1.0, 3.0]));
        let b = Op::block_diag(vec![d1, d2]).unwrap();
        assert_eq!(b.in_shape().dims(), &[2, 2]);
        assert_eq!(
            b.apply(&[1.0, 1.0, 1.0, 1.0]),
            vec![2.0, 2.0, -1.0, 3.0]
        );
    }

    #[test]
    fn kron_replicates_the_block() {
        let a = small_dense();
        let k = Op::kron(a, 3).unwrap();
        assert_eq!(k.in_shape().dims(), &[3, 3]);
        assert_eq!(k.out_shape().dims(), &[3, 2]);
        let x = [1.0, 0.0, -1.0, 1.0, 0.0, -1.0, 1.0, 0.0, -1.0];
        assert_eq!(
            k.apply(&x),
            vec![-2.0, -2.0, -2.0, -2.0, -2.0, -2.0]
        );
    }

    #[test]
    fn gram_is_square_on_the_domain() {
        let a = small_dense();
        let g = a.gram();
        assert_eq!(g.in_shape(), g.out_shape());
        assert_eq!(g.in_shape().dims(), &[3]);
    }

    #[test]
    fn display_names_the_combinator() {
        let a = small_dense();
        assert_eq!(a.to_string(), "<[2]x[3] Leaf Op>");
        let s = a.scale(2.0);
        assert_eq!(s.to_string(), "<[2]x[3] Scale Op>");
    }
}
