use axolotl::basics::{Dense, Diag};
use axolotl::Op;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub fn make_input(n: usize) -> Vec<f64> {
    (0..n).map(|i| 0.5 + 0.01 * i as f64).collect()
}

pub fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(0xbead)
}

pub fn random_vec(rng: &mut StdRng, n: usize) -> Vec<f64> {
    (0..n).map(|_| rng.gen::<f64>() - 0.5).collect()
}

pub fn random_dense(rng: &mut StdRng, rows: usize, cols: usize) -> Op<f64> {
    Op::new(Dense::new(rows, cols, random_vec(rng, rows * cols)).expect("sized to fit"))
}

/// A depth-`depth` chain of diagonal scalings summed with a scaled copy,
/// the kind of expression reconstruction pipelines build.
pub fn nested_expression(rng: &mut StdRng, n: usize, depth: usize) -> Op<f64> {
    let mut expr = Op::new(Diag::from_weights(random_vec(rng, n)));
    for _ in 0..depth {
        let next = Op::new(Diag::from_weights(random_vec(rng, n)));
        expr = Op::compose(next, expr.clone()).expect("square chain") + expr.scale(0.5);
    }
    expr
}
