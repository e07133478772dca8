use moleq::{Batch, ChargeEquilibrator};

/// One molecule of a test batch, with its parameters in atom order.
pub struct MoleculeCase {
    pub name: &'static str,
    pub electronegativity: Vec<f64>,
    pub hardness: Vec<f64>,
    pub total_charge: f64,
}

/// Assembles the cases into one contiguous batch plus flat parameter columns.
pub fn build_batch(cases: &[MoleculeCase]) -> (Batch, Vec<f64>, Vec<f64>) {
    let mut batch = Batch::new();
    let mut e = Vec::new();
    let mut s = Vec::new();

    for case in cases {
        assert_eq!(
            case.electronegativity.len(),
            case.hardness.len(),
            "Malformed case '{}'",
            case.name
        );
        batch
            .push_molecule(case.electronegativity.len(), case.total_charge)
            .expect("Test case molecules must be non-empty");
        e.extend_from_slice(&case.electronegativity);
        s.extend_from_slice(&case.hardness);
    }

    (batch, e, s)
}

/// Equilibrates the cases as one batch and checks, per molecule, that the
/// charges are finite and sum to the target total charge.
pub fn run_conservation_check(group_name: &str, cases: Vec<MoleculeCase>, tolerance: f64) {
    let (batch, e, s) = build_batch(&cases);
    let result = ChargeEquilibrator::new()
        .equilibrate(&batch, &e, &s)
        .expect("Equilibration failed");

    println!("\nRunning Conservation Check: {}", group_name);
    println!("{:-<72}", "");
    println!(
        "{:<24} | {:<8} | {:<12} | {:<12}",
        "Molecule", "Atoms", "Target Q", "Sum q"
    );

    let mut offset = 0;
    for (molecule, case) in cases.iter().enumerate() {
        let atom_count = case.electronegativity.len();
        let charges = &result.charges[offset..offset + atom_count];
        let sum: f64 = charges.iter().sum();

        println!(
            "{:<24} | {:<8} | {:<12.6} | {:<12.6}",
            case.name, atom_count, case.total_charge, sum
        );

        for (i, &charge) in charges.iter().enumerate() {
            assert!(
                charge.is_finite(),
                "Molecule '{}' atom {} produced a non-finite charge: {}",
                case.name,
                i,
                charge
            );
        }
        assert!(
            (sum - case.total_charge).abs() <= tolerance,
            "Molecule '{}' (index {}) violates conservation: sum {} vs target {}",
            case.name,
            molecule,
            sum,
            case.total_charge
        );

        offset += atom_count;
    }
    println!("{:-<72}\n", "");
}
