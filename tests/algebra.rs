//! Construction-time validation and shape propagation of the
//! composite algebra.

use std::sync::Arc;

use axolotl::basics::{Dense, Diag, FirstDiff, Identity};
use axolotl::{Error, LinearMap, Op, Shape};

fn dense_2x3() -> Op<f64> {
    Op::new(Dense::new(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap())
}

#[test]
fn sum_requires_matching_domains_and_codomains() {
    let a = dense_2x3();
    let err = Op::sum(a.clone(), Op::new(Identity::new(3))).unwrap_err();
    match err {
        Error::ShapeMismatch { context, lhs, rhs } => {
            assert_eq!(context, "Op::sum (output)");
            assert_eq!(lhs, Shape::from(2));
            assert_eq!(rhs, Shape::from(3));
        }
        other => panic!("unexpected error {other:?}"),
    }

    let err = Op::sum(a, Op::new(Identity::new(2))).unwrap_err();
    assert!(matches!(
        err,
        Error::ShapeMismatch {
            context: "Op::sum (input)",
            ..
        }
    ));
}

#[test]
fn compose_checks_the_inner_output_against_the_outer_input() {
    let a = dense_2x3();
    let err = Op::compose(a.clone(), Op::new(Identity::new(2))).unwrap_err();
    assert!(matches!(err, Error::ShapeMismatch { context: "Op::compose", .. }));

    let ok = Op::compose(a, Op::new(Identity::new(3))).unwrap();
    assert_eq!(ok.in_shape(), &Shape::from(3));
    assert_eq!(ok.out_shape(), &Shape::from(2));
}

#[test]
fn block_diag_rejects_empty_and_heterogeneous_blocks() {
    assert!(matches!(
        Op::<f64>::block_diag(vec![]),
        Err(Error::EmptyBlock { context: "Op::block_diag" })
    ));

    let err = Op::block_diag(vec![dense_2x3(), Op::new(Identity::new(3))]).unwrap_err();
    assert!(matches!(err, Error::ShapeMismatch { .. }));
}

#[test]
fn kron_needs_at_least_one_copy() {
    assert!(matches!(
        Op::kron(dense_2x3(), 0),
        Err(Error::EmptyBlock { context: "Op::kron" })
    ));
}

#[test]
fn stacked_shapes_gain_a_leading_dimension() {
    let block = dense_2x3();
    let stacked = Op::block_diag(vec![block.clone(), block.clone()]).unwrap();
    assert_eq!(stacked.in_shape().dims(), &[2, 3]);
    assert_eq!(stacked.out_shape().dims(), &[2, 2]);

    let repeated = Op::kron(block, 5).unwrap();
    assert_eq!(repeated.in_shape().dims(), &[5, 3]);
    assert_eq!(repeated.out_shape().dims(), &[5, 2]);
}

#[test]
fn leaves_shared_through_arc_are_not_copied() {
    let leaf: Arc<dyn LinearMap<f64>> =
        Arc::new(Diag::from_weights(vec![1.0, 2.0, 3.0]));
    let a = Op::from_arc(leaf.clone());
    let b = Op::from_arc(leaf.clone());
    let doubled = a + b;
    assert_eq!(doubled.apply(&[1.0, 1.0, 1.0]), vec![2.0, 4.0, 6.0]);
    // Two handles inside the expression plus the local one.
    assert_eq!(Arc::strong_count(&leaf), 3);
}

#[test]
#[should_panic(expected = "does not match operator input shape")]
fn evaluating_with_a_wrong_length_input_panics() {
    let a = dense_2x3();
    let _ = a.apply(&[1.0, 2.0]);
}

#[test]
fn adjoint_swaps_shapes() {
    let a = dense_2x3().adjoint();
    assert_eq!(a.in_shape(), &Shape::from(2));
    assert_eq!(a.out_shape(), &Shape::from(3));
}

#[test]
fn first_diff_composes_with_the_algebra() {
    let d = Op::<f64>::new(FirstDiff::new(3));
    let damped = d.clone() * 0.5 + Op::new(Identity::new(3));
    let y = damped.apply(&[2.0, 4.0, 8.0]);
    // 0.5 * D x + x with D x = (2, 4, -8).
    assert_eq!(y, vec![3.0, 6.0, 4.0]);
}
