//! Batched solves over independent right-hand sides.
//!
//! Each frame gets its own solver state; the shared operator, prox and
//! configuration are only read. Frames are laid out contiguously, one
//! `out_shape().numel()` slab per frame, matching the stacking order of
//! the block operators.

use axolotl::prox::Prox;
use axolotl::{LinearMap, Scalar};
use rayon::prelude::*;

use crate::result::SolveResult;
use crate::solvers::cg::{cg, CgConfig};
use crate::solvers::fista::{fista, FistaConfig};

/// Runs [`fista`] once per data frame, in parallel.
///
/// All frames start from the same `x0`.
pub fn fista_batch<S, A>(
    a: &A,
    data: &[S],
    prox: Option<&dyn Prox<S>>,
    x0: &[S],
    config: &FistaConfig<S::Real>,
) -> Vec<SolveResult<S>>
where
    S: Scalar,
    A: LinearMap<S> + ?Sized,
{
    let frame = a.out_shape().numel();
    assert_eq!(
        data.len() % frame,
        0,
        "fista_batch: data length is not a whole number of frames"
    );
    data.par_chunks(frame)
        .map(|chunk| fista(a, chunk, prox, x0, config))
        .collect()
}

/// Runs [`cg`] once per right-hand-side frame, in parallel.
pub fn cg_batch<S, G>(
    gram: &G,
    rhs: &[S],
    x0: &[S],
    config: &CgConfig<S::Real>,
) -> Vec<SolveResult<S>>
where
    S: Scalar,
    G: LinearMap<S> + ?Sized,
{
    let frame = gram.out_shape().numel();
    assert_eq!(
        rhs.len() % frame,
        0,
        "cg_batch: rhs length is not a whole number of frames"
    );
    rhs.par_chunks(frame)
        .map(|chunk| cg(gram, chunk, x0, config))
        .collect()
}
