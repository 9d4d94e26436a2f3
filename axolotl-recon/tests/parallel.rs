#![cfg(feature = "parallel")]

use axolotl::basics::Dense;
use axolotl::prox::SoftThreshold;
use axolotl_recon::{
    cg, cg_batch, fista, fista_batch, lipschitz, CgConfig, ConvergenceParams, FistaConfig,
    PowerConfig, StepRule,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_vec(rng: &mut StdRng, n: usize) -> Vec<f64> {
    (0..n).map(|_| rng.gen::<f64>() - 0.5).collect()
}

#[test]
fn fista_batch_matches_serial_solves() {
    let mut rng = StdRng::seed_from_u64(0xba7c);
    let a = Dense::new(6, 4, random_vec(&mut rng, 24)).unwrap();
    let frames = 5;
    let data = random_vec(&mut rng, 6 * frames);
    let prox = SoftThreshold::new(0.05);
    let config = FistaConfig {
        convergence: ConvergenceParams {
            max_iter: 400,
            tol: 1e-10,
        },
        step: StepRule::Lipschitz(lipschitz(&a, &PowerConfig::default()).eigenvalue * 1.01),
    };

    let batch = fista_batch(&a, &data, Some(&prox), &[0.0; 4], &config);
    assert_eq!(batch.len(), frames);
    for (frame, result) in data.chunks(6).zip(&batch) {
        let serial = fista(&a, frame, Some(&prox), &[0.0; 4], &config);
        assert_eq!(serial.iterations, result.iterations);
        for (u, v) in serial.x.iter().zip(&result.x) {
            assert_eq!(u, v);
        }
    }
}

#[test]
fn cg_batch_matches_serial_solves() {
    let mut rng = StdRng::seed_from_u64(0xcb17);
    let weights: Vec<f64> = (0..8).map(|i| 1.0 + i as f64).collect();
    let gram = axolotl::basics::Diag::from_weights(weights);
    let rhs = random_vec(&mut rng, 8 * 3);
    let config = CgConfig::default();

    let batch = cg_batch(&gram, &rhs, &[0.0; 8], &config);
    assert_eq!(batch.len(), 3);
    for (frame, result) in rhs.chunks(8).zip(&batch) {
        let serial = cg(&gram, frame, &[0.0; 8], &config);
        assert_eq!(serial.iterations, result.iterations);
        for (u, v) in serial.x.iter().zip(&result.x) {
            assert_eq!(u, v);
        }
    }
}
