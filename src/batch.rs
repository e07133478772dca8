//! Batched molecular membership structure.
//!
//! A [`Batch`] is the structural half of an equilibration call: it records
//! which molecule every atom belongs to, each molecule's target total charge,
//! and (optionally) the intra-molecular bond list used by the feature
//! network. Per-atom scalar fields such as electronegativity and hardness are
//! deliberately not stored here — they are supplied per call, so the same
//! batch can be reused across forward evaluations while the upstream model's
//! outputs change.

use crate::error::MoleqError;
use std::ops::Range;

/// A strict partition of atoms into molecules, plus per-molecule targets.
///
/// Every atom belongs to exactly one molecule and every molecule owns at
/// least one atom; both invariants are enforced at construction time so the
/// aggregation stage can run unchecked. Atom indices are dense (`0..atom_count`)
/// and molecule indices are dense (`0..molecule_count`). Molecules appended
/// through [`Batch::push_molecule`] own contiguous atom ranges, but a batch
/// built with [`Batch::from_membership`] may interleave molecules freely.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    /// Maps each atom index to its owning molecule index.
    molecule_of: Vec<usize>,
    /// Target total charge per molecule, e.g. 0 for neutral species.
    total_charges: Vec<f64>,
    /// Undirected intra-molecular bonds, as atom index pairs.
    bonds: Vec<[usize; 2]>,
}

impl Batch {
    /// Creates an empty batch to be filled with [`Batch::push_molecule`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one molecule with `atom_count` atoms and the given target
    /// total charge, returning the contiguous atom index range it was
    /// assigned.
    ///
    /// # Errors
    ///
    /// Returns [`MoleqError::EmptyMolecule`] if `atom_count` is zero.
    pub fn push_molecule(
        &mut self,
        atom_count: usize,
        total_charge: f64,
    ) -> Result<Range<usize>, MoleqError> {
        if atom_count == 0 {
            return Err(MoleqError::EmptyMolecule {
                molecule: self.total_charges.len(),
            });
        }

        let molecule = self.total_charges.len();
        let start = self.molecule_of.len();
        self.molecule_of
            .extend(std::iter::repeat(molecule).take(atom_count));
        self.total_charges.push(total_charge);
        Ok(start..start + atom_count)
    }

    /// Builds a batch from an explicit atom→molecule map and per-molecule
    /// target charges.
    ///
    /// Molecule ids may appear in any order and need not be contiguous runs,
    /// but every id must be in range and every molecule must own at least
    /// one atom.
    ///
    /// # Errors
    ///
    /// * [`MoleqError::EmptyBatch`] if `total_charges` is empty.
    /// * [`MoleqError::MoleculeOutOfRange`] if an atom references a molecule
    ///   index `>= total_charges.len()`.
    /// * [`MoleqError::EmptyMolecule`] if some molecule has no member atoms.
    pub fn from_membership(
        molecule_of: Vec<usize>,
        total_charges: Vec<f64>,
    ) -> Result<Self, MoleqError> {
        let molecule_count = total_charges.len();
        if molecule_count == 0 {
            return Err(MoleqError::EmptyBatch);
        }

        let mut member_counts = vec![0usize; molecule_count];
        for (atom, &molecule) in molecule_of.iter().enumerate() {
            if molecule >= molecule_count {
                return Err(MoleqError::MoleculeOutOfRange {
                    atom,
                    molecule,
                    molecule_count,
                });
            }
            member_counts[molecule] += 1;
        }

        if let Some(molecule) = member_counts.iter().position(|&count| count == 0) {
            return Err(MoleqError::EmptyMolecule { molecule });
        }

        Ok(Self {
            molecule_of,
            total_charges,
            bonds: Vec::new(),
        })
    }

    /// Registers an undirected bond between atoms `a` and `b`.
    ///
    /// Bonds only feed the feature network's neighborhood aggregation; the
    /// equilibration step itself never reads them.
    ///
    /// # Errors
    ///
    /// * [`MoleqError::InvalidBond`] if either index is out of range or the
    ///   bond joins an atom to itself.
    /// * [`MoleqError::CrossMoleculeBond`] if the endpoints belong to
    ///   different molecules.
    pub fn add_bond(&mut self, a: usize, b: usize) -> Result<(), MoleqError> {
        let atom_count = self.molecule_of.len();
        if a >= atom_count || b >= atom_count || a == b {
            return Err(MoleqError::InvalidBond { a, b, atom_count });
        }
        let (mol_a, mol_b) = (self.molecule_of[a], self.molecule_of[b]);
        if mol_a != mol_b {
            return Err(MoleqError::CrossMoleculeBond { a, b, mol_a, mol_b });
        }
        self.bonds.push([a, b]);
        Ok(())
    }

    /// Total number of atoms across all molecules.
    pub fn atom_count(&self) -> usize {
        self.molecule_of.len()
    }

    /// Number of molecules in the batch.
    pub fn molecule_count(&self) -> usize {
        self.total_charges.len()
    }

    /// The atom→molecule membership map, one entry per atom.
    pub fn molecule_ids(&self) -> &[usize] {
        &self.molecule_of
    }

    /// The owning molecule of one atom.
    pub fn molecule_of(&self, atom: usize) -> usize {
        self.molecule_of[atom]
    }

    /// Target total charge per molecule.
    pub fn total_charges(&self) -> &[f64] {
        &self.total_charges
    }

    /// Registered undirected bonds.
    pub fn bonds(&self) -> &[[usize; 2]] {
        &self.bonds
    }

    /// Checks that a per-atom input slice matches the batch size.
    pub(crate) fn check_atom_field(
        &self,
        field: &'static str,
        len: usize,
    ) -> Result<(), MoleqError> {
        if len != self.atom_count() {
            return Err(MoleqError::LengthMismatch {
                field,
                expected: self.atom_count(),
                actual: len,
            });
        }
        Ok(())
    }
}
