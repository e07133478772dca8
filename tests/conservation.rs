mod common;

use approx::assert_relative_eq;
use common::{build_batch, run_conservation_check, MoleculeCase};
use moleq::{Batch, ChargeEquilibrator};
use rand::{rngs::StdRng, Rng, SeedableRng};

#[test]
fn test_handcrafted_batch_conserves_charge() {
    let cases = vec![
        MoleculeCase {
            name: "Neutral diatomic",
            electronegativity: vec![0.4, -0.4],
            hardness: vec![1.2, 0.9],
            total_charge: 0.0,
        },
        MoleculeCase {
            name: "Anion",
            electronegativity: vec![0.1, 0.7, -0.3, 0.2],
            hardness: vec![2.0, 1.5, 0.8, 1.1],
            total_charge: -1.0,
        },
        MoleculeCase {
            name: "Cation",
            electronegativity: vec![-0.6, 0.5, 0.3],
            hardness: vec![0.7, 1.3, 2.4],
            total_charge: 2.0,
        },
        MoleculeCase {
            name: "Lone atom",
            electronegativity: vec![1.5],
            hardness: vec![3.0],
            total_charge: 0.0,
        },
    ];

    run_conservation_check("Handcrafted Molecules", cases, 1e-12);
}

#[test]
fn test_random_batches_conserve_charge() {
    let mut rng = StdRng::seed_from_u64(7_1912);

    let cases: Vec<MoleculeCase> = (0..150)
        .map(|_| {
            let atom_count = rng.random_range(1..=12);
            MoleculeCase {
                name: "Random",
                electronegativity: (0..atom_count)
                    .map(|_| rng.random_range(-2.0..2.0))
                    .collect(),
                hardness: (0..atom_count).map(|_| rng.random_range(0.5..3.5)).collect(),
                total_charge: rng.random_range(-2i64..=2) as f64,
            }
        })
        .collect();

    run_conservation_check("Random Batch", cases, 1e-9);
}

#[test]
fn test_molecule_order_does_not_change_charges() {
    let forward = vec![
        MoleculeCase {
            name: "A",
            electronegativity: vec![0.3, -0.2, 0.8],
            hardness: vec![1.0, 1.7, 0.6],
            total_charge: 0.0,
        },
        MoleculeCase {
            name: "B",
            electronegativity: vec![-0.9, 0.4],
            hardness: vec![2.2, 1.1],
            total_charge: -1.0,
        },
    ];
    let reversed = vec![
        MoleculeCase {
            name: "B",
            electronegativity: vec![-0.9, 0.4],
            hardness: vec![2.2, 1.1],
            total_charge: -1.0,
        },
        MoleculeCase {
            name: "A",
            electronegativity: vec![0.3, -0.2, 0.8],
            hardness: vec![1.0, 1.7, 0.6],
            total_charge: 0.0,
        },
    ];

    let equilibrator = ChargeEquilibrator::new();
    let (batch_fwd, e_fwd, s_fwd) = build_batch(&forward);
    let (batch_rev, e_rev, s_rev) = build_batch(&reversed);
    let result_fwd = equilibrator.equilibrate(&batch_fwd, &e_fwd, &s_fwd).unwrap();
    let result_rev = equilibrator.equilibrate(&batch_rev, &e_rev, &s_rev).unwrap();

    // Molecule A's atoms occupy 0..3 forward and 2..5 reversed.
    for i in 0..3 {
        assert_relative_eq!(
            result_fwd.charges[i],
            result_rev.charges[i + 2],
            epsilon = 1e-14
        );
    }
    for i in 0..2 {
        assert_relative_eq!(
            result_fwd.charges[3 + i],
            result_rev.charges[i],
            epsilon = 1e-14
        );
    }
    assert_relative_eq!(
        result_fwd.potentials[0],
        result_rev.potentials[1],
        epsilon = 1e-14
    );
}

#[test]
fn test_interleaved_membership_matches_contiguous_layout() {
    // Same two molecules, once as contiguous runs and once interleaved
    // atom by atom.
    let contiguous = Batch::from_membership(vec![0, 0, 0, 1, 1, 1], vec![0.0, 1.0]).unwrap();
    let interleaved = Batch::from_membership(vec![0, 1, 0, 1, 0, 1], vec![0.0, 1.0]).unwrap();

    let e_contiguous = [0.3, -0.2, 0.8, -0.9, 0.4, 0.1];
    let s_contiguous = [1.0, 1.7, 0.6, 2.2, 1.1, 0.9];
    // Interleaved layout: molecule 0 atoms at indices 0, 2, 4.
    let e_interleaved = [0.3, -0.9, -0.2, 0.4, 0.8, 0.1];
    let s_interleaved = [1.0, 2.2, 1.7, 1.1, 0.6, 0.9];

    let equilibrator = ChargeEquilibrator::new();
    let result_c = equilibrator
        .equilibrate(&contiguous, &e_contiguous, &s_contiguous)
        .unwrap();
    let result_i = equilibrator
        .equilibrate(&interleaved, &e_interleaved, &s_interleaved)
        .unwrap();

    let mapping = [0, 2, 4, 1, 3, 5];
    for (contiguous_idx, &interleaved_idx) in mapping.iter().enumerate() {
        assert_relative_eq!(
            result_c.charges[contiguous_idx],
            result_i.charges[interleaved_idx],
            epsilon = 1e-14
        );
    }
}

#[test]
fn test_batch_composition_invariance() {
    // A molecule's charges are identical whether it is equilibrated alone
    // or alongside unrelated molecules.
    let e_mol = [0.25, -0.75, 0.5];
    let s_mol = [1.4, 0.9, 2.1];

    let mut alone = Batch::new();
    alone.push_molecule(3, -1.0).unwrap();

    let mut packed = Batch::new();
    packed.push_molecule(2, 1.0).unwrap();
    packed.push_molecule(3, -1.0).unwrap();
    packed.push_molecule(1, 0.0).unwrap();

    let e_packed = [9.0, -3.0, 0.25, -0.75, 0.5, 1.0];
    let s_packed = [0.2, 5.0, 1.4, 0.9, 2.1, 1.0];

    let equilibrator = ChargeEquilibrator::new();
    let result_alone = equilibrator.equilibrate(&alone, &e_mol, &s_mol).unwrap();
    let result_packed = equilibrator
        .equilibrate(&packed, &e_packed, &s_packed)
        .unwrap();

    for i in 0..3 {
        assert_relative_eq!(
            result_alone.charges[i],
            result_packed.charges[2 + i],
            epsilon = 1e-14
        );
    }
    assert_relative_eq!(
        result_alone.potentials[0],
        result_packed.potentials[1],
        epsilon = 1e-14
    );
}
