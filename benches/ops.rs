use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use axolotl::{GradTape, LinearMap};

mod common;
use common::{make_input, nested_expression, random_dense, random_vec, seeded_rng};

fn bench_dense_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("dense_apply");
    let mut rng = seeded_rng();
    for n in [32, 128, 512] {
        let a = random_dense(&mut rng, n, n);
        let x = make_input(n);

        group.bench_with_input(BenchmarkId::new("forward", n), &x, |b, x| {
            b.iter(|| black_box(a.apply(black_box(x))))
        });

        group.bench_with_input(BenchmarkId::new("adjoint", n), &x, |b, x| {
            b.iter(|| black_box(a.apply_adjoint(black_box(x))))
        });
    }
    group.finish();
}

fn bench_composite_eval(c: &mut Criterion) {
    let mut group = c.benchmark_group("composite_eval");
    let mut rng = seeded_rng();
    for depth in [2, 8, 32] {
        let expr = nested_expression(&mut rng, 256, depth);
        let x = make_input(256);

        group.bench_with_input(BenchmarkId::new("forward", depth), &x, |b, x| {
            b.iter(|| black_box(expr.apply(black_box(x))))
        });
    }
    group.finish();
}

fn bench_tape_gradient(c: &mut Criterion) {
    let mut group = c.benchmark_group("tape_gradient");
    let mut rng = seeded_rng();
    for n in [16, 64, 256] {
        let a = random_dense(&mut rng, n, n);
        let x0 = make_input(n);
        let data = random_vec(&mut rng, n);

        group.bench_with_input(BenchmarkId::new("tape", n), &x0, |b, x0| {
            b.iter(|| {
                let mut tape = GradTape::new();
                let x = tape.var(x0.clone());
                let b_var = tape.var(data.clone());
                let y = tape.apply(&a, x);
                let r = tape.sub(y, b_var);
                let loss = tape.norm_sq(r);
                black_box(tape.backward(loss).wrt(x))
            })
        });

        group.bench_with_input(BenchmarkId::new("hand_adjoint", n), &x0, |b, x0| {
            b.iter(|| {
                let ax = a.apply(black_box(x0));
                let r: Vec<f64> = ax.iter().zip(&data).map(|(&u, &v)| u - v).collect();
                let g: Vec<f64> = a.apply_adjoint(&r).iter().map(|&v| 2.0 * v).collect();
                black_box(g)
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_dense_apply,
    bench_composite_eval,
    bench_tape_gradient
);
criterion_main!(benches);
