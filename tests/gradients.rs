use approx::assert_relative_eq;
use moleq::{Batch, ChargeEquilibrator};

/// Scalar probe loss L = Σ_i g_i·q̂_i, whose gradient with respect to the
/// charges is exactly `g`.
fn probe_loss(equilibrator: &ChargeEquilibrator, batch: &Batch, e: &[f64], s: &[f64], g: &[f64]) -> f64 {
    let result = equilibrator.equilibrate(batch, e, s).unwrap();
    result
        .charges
        .iter()
        .zip(g.iter())
        .map(|(&q_i, &g_i)| q_i * g_i)
        .sum()
}

#[test]
fn test_backward_matches_central_differences() {
    // Two molecules, four atoms, including a single-atom molecule whose
    // charge is constant (gradient must come out zero).
    let mut batch = Batch::new();
    batch.push_molecule(3, 0.0).unwrap();
    batch.push_molecule(1, -1.0).unwrap();

    let e = [0.3, -0.5, 0.1, 0.2];
    let s = [1.5, 2.0, 0.8, 1.2];
    let g = [0.7, -0.3, 0.25, 0.5];

    let equilibrator = ChargeEquilibrator::new();
    let forward = equilibrator.equilibrate(&batch, &e, &s).unwrap();
    let grads = equilibrator
        .backward(&batch, &s, &forward.charges, &g)
        .unwrap();

    let h = 1e-5;
    for j in 0..4 {
        let mut e_plus = e;
        let mut e_minus = e;
        e_plus[j] += h;
        e_minus[j] -= h;
        let numeric_e = (probe_loss(&equilibrator, &batch, &e_plus, &s, &g)
            - probe_loss(&equilibrator, &batch, &e_minus, &s, &g))
            / (2.0 * h);
        assert_relative_eq!(
            grads.electronegativity[j],
            numeric_e,
            epsilon = 1e-8,
            max_relative = 1e-6
        );

        let mut s_plus = s;
        let mut s_minus = s;
        s_plus[j] += h;
        s_minus[j] -= h;
        let numeric_s = (probe_loss(&equilibrator, &batch, &e, &s_plus, &g)
            - probe_loss(&equilibrator, &batch, &e, &s_minus, &g))
            / (2.0 * h);
        assert_relative_eq!(
            grads.hardness[j],
            numeric_s,
            epsilon = 1e-8,
            max_relative = 1e-6
        );
    }

    // The single-atom molecule's charge is pinned to its target, so its
    // parameters receive no gradient.
    assert_relative_eq!(grads.electronegativity[3], 0.0, epsilon = 1e-12);
    assert_relative_eq!(grads.hardness[3], 0.0, epsilon = 1e-12);
}

#[test]
fn test_backward_gradients_are_finite_for_random_batch() {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(2024);
    let mut batch = Batch::new();
    let mut e = Vec::new();
    let mut s = Vec::new();
    for _ in 0..40 {
        let atom_count = rng.random_range(1..=8);
        batch.push_molecule(atom_count, 0.0).unwrap();
        for _ in 0..atom_count {
            e.push(rng.random_range(-1.5..1.5));
            s.push(rng.random_range(0.4..3.0));
        }
    }
    let g: Vec<f64> = (0..e.len()).map(|_| rng.random_range(-1.0..1.0)).collect();

    let equilibrator = ChargeEquilibrator::new();
    let forward = equilibrator.equilibrate(&batch, &e, &s).unwrap();
    let grads = equilibrator
        .backward(&batch, &s, &forward.charges, &g)
        .unwrap();

    assert_eq!(grads.electronegativity.len(), e.len());
    assert_eq!(grads.hardness.len(), s.len());
    assert!(grads.electronegativity.iter().all(|v| v.is_finite()));
    assert!(grads.hardness.iter().all(|v| v.is_finite()));
}

#[test]
fn test_gradient_sums_vanish_per_molecule_for_electronegativity() {
    // A uniform shift of e within one molecule does not change any charge
    // (it shifts λ by the same amount), so Σ_j ∂L/∂e_j = 0 per molecule.
    let mut batch = Batch::new();
    batch.push_molecule(4, 1.0).unwrap();

    let e = [0.9, -0.4, 0.15, -0.6];
    let s = [1.3, 0.7, 2.5, 1.9];
    let g = [0.2, 0.8, -0.5, 0.3];

    let equilibrator = ChargeEquilibrator::new();
    let forward = equilibrator.equilibrate(&batch, &e, &s).unwrap();
    let grads = equilibrator
        .backward(&batch, &s, &forward.charges, &g)
        .unwrap();

    let total: f64 = grads.electronegativity.iter().sum();
    assert_relative_eq!(total, 0.0, epsilon = 1e-12);
}
