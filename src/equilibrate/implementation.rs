//! This module implements the core `ChargeEquilibrator` for computing
//! constrained partial atomic charges.
//!
//! Given per-atom electronegativity `e` and hardness `s` produced by an
//! upstream model, and a target total charge `Q` per molecule, the
//! equilibrator minimizes the quadratic energy `Σ_i [e_i·q_i + ½·s_i·q_i²]`
//! subject to `Σ_i q_i = Q` for every molecule of a batch simultaneously.
//! The constrained minimum has a closed form via one Lagrange multiplier per
//! molecule, so no iterative solve is needed; the whole computation is two
//! segmented sums, one broadcast, and an elementwise map.

use super::options::EquilibrationOptions;
use crate::{
    batch::Batch,
    error::MoleqError,
    segment::{segment_broadcast, segment_sum},
};
use rayon::prelude::*;

/// The main entry point for analytical charge equilibration.
///
/// This struct holds the validation options and provides the forward charge
/// assignment together with its analytical reverse-mode gradient, letting a
/// training loop backpropagate through the equilibration step without an
/// autodiff framework.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChargeEquilibrator {
    /// Configuration options controlling degenerate-hardness handling.
    options: EquilibrationOptions,
}

/// The result of one equilibration call.
///
/// Charges are stored in the same atom order as the input batch; the sum of
/// the charges of each molecule's atoms equals that molecule's target total
/// charge up to floating-point rounding.
#[derive(Debug, Clone, PartialEq)]
pub struct EquilibrationResult {
    /// The computed partial charge for each atom in the batch.
    pub charges: Vec<f64>,
    /// The equilibrated chemical potential (Lagrange multiplier λ) per
    /// molecule.
    ///
    /// At the constrained minimum every atom of a molecule sits at this
    /// common potential, `λ = (Q + Σ e_i/s_i) / Σ (1/s_i)`.
    pub potentials: Vec<f64>,
}

/// Reverse-mode gradients of a scalar loss with respect to the per-atom
/// parameters, given the loss gradient with respect to the charges.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterGradients {
    /// `∂L/∂e_i` for each atom.
    pub electronegativity: Vec<f64>,
    /// `∂L/∂s_i` for each atom.
    pub hardness: Vec<f64>,
}

impl ChargeEquilibrator {
    /// Creates a new equilibrator with default (lenient) options.
    ///
    /// # Examples
    ///
    /// ```
    /// use moleq::{Batch, ChargeEquilibrator};
    ///
    /// let mut batch = Batch::new();
    /// batch.push_molecule(2, 0.0).unwrap();
    ///
    /// let eq = ChargeEquilibrator::new();
    /// let result = eq.equilibrate(&batch, &[0.3, -0.1], &[1.2, 2.0]).unwrap();
    ///
    /// assert_eq!(result.charges.len(), 2);
    /// assert!((result.charges[0] + result.charges[1]).abs() < 1e-12);
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the equilibrator with custom options.
    ///
    /// # Examples
    ///
    /// ```
    /// use moleq::{ChargeEquilibrator, EquilibrationOptions};
    ///
    /// let eq = ChargeEquilibrator::new().with_options(EquilibrationOptions {
    ///     strict_hardness: true,
    ///     ..Default::default()
    /// });
    /// # let _ = eq;
    /// ```
    pub fn with_options(mut self, options: EquilibrationOptions) -> Self {
        self.options = options;
        self
    }

    /// Computes the constrained charge assignment for every molecule of a
    /// batch.
    ///
    /// Per molecule `m` with target charge `Q_m`, each member atom receives
    ///
    /// ```text
    /// q̂_i = -e_i / s_i + (1 / s_i) · λ_m,
    /// λ_m  = (Q_m + Σ_{j∈m} e_j / s_j) / Σ_{j∈m} (1 / s_j)
    /// ```
    ///
    /// which is the unique minimizer of `Σ_i [e_i·q_i + ½·s_i·q_i²]` subject
    /// to `Σ_{i∈m} q_i = Q_m`. The computation is a pure function of
    /// `(e, s, Q, membership)`; the batch itself is not mutated. Molecule
    /// sums accumulate left to right in atom order, so the rounding order is
    /// deterministic for a given batch layout.
    ///
    /// # Arguments
    ///
    /// * `batch` - The membership structure and per-molecule target charges.
    /// * `e` - Per-atom electronegativity, one value per atom.
    /// * `s` - Per-atom hardness, one value per atom. Must be nonzero for
    ///   the solution to be defined; see the failure semantics below.
    ///
    /// # Errors
    ///
    /// * [`MoleqError::EmptyBatch`] if the batch has no molecules.
    /// * [`MoleqError::LengthMismatch`] if `e` or `s` does not have one
    ///   entry per atom.
    /// * Under strict options, [`MoleqError::ZeroHardness`] and
    ///   [`MoleqError::SingularMolecule`] for degenerate inputs.
    ///
    /// With lenient (default) options a zero hardness or a molecule whose
    /// reciprocal-hardness sum vanishes produces non-finite charges for the
    /// affected molecule, propagated as-is.
    pub fn equilibrate(
        &self,
        batch: &Batch,
        e: &[f64],
        s: &[f64],
    ) -> Result<EquilibrationResult, MoleqError> {
        if batch.molecule_count() == 0 {
            return Err(MoleqError::EmptyBatch);
        }
        batch.check_atom_field("electronegativity", e.len())?;
        batch.check_atom_field("hardness", s.len())?;

        if self.options.strict_hardness {
            self.check_hardness(s)?;
        }

        let s_inv: Vec<f64> = s.iter().map(|&value| value.recip()).collect();
        let e_s_inv: Vec<f64> = e
            .iter()
            .zip(s_inv.iter())
            .map(|(&e_i, &s_inv_i)| e_i * s_inv_i)
            .collect();

        let molecule_ids = batch.molecule_ids();
        let molecule_count = batch.molecule_count();
        let sum_s_inv = segment_sum(&s_inv, molecule_ids, molecule_count);
        let sum_e_s_inv = segment_sum(&e_s_inv, molecule_ids, molecule_count);

        if self.options.strict_hardness {
            self.check_constraint_sums(&sum_s_inv)?;
        }

        let potentials: Vec<f64> = batch
            .total_charges()
            .iter()
            .zip(sum_e_s_inv.iter().zip(sum_s_inv.iter()))
            .map(|(&total_charge, (&sum_e_s_inv_m, &sum_s_inv_m))| {
                (total_charge + sum_e_s_inv_m) / sum_s_inv_m
            })
            .collect();

        let lambda = segment_broadcast(&potentials, molecule_ids);

        let charges: Vec<f64> = (0..batch.atom_count())
            .into_par_iter()
            .map(|i| -e[i] * s_inv[i] + s_inv[i] * lambda[i])
            .collect();

        Ok(EquilibrationResult {
            charges,
            potentials,
        })
    }

    /// Computes the reverse-mode gradients of the equilibrated charges.
    ///
    /// Given `grad_charges[i] = ∂L/∂q̂_i` for some scalar loss `L`, returns
    /// `∂L/∂e` and `∂L/∂s`. Writing `B_m = Σ_{j∈m} 1/s_j` and
    /// `G_m = Σ_{j∈m} grad_charges_j / s_j`, the closed form collapses the
    /// full Jacobian into one segmented sum:
    ///
    /// ```text
    /// ∂L/∂e_i = (1/s_i) · (G_m / B_m − grad_charges_i)
    /// ∂L/∂s_i = q̂_i · ∂L/∂e_i
    /// ```
    ///
    /// so the cost is O(total atoms), matching the forward pass. The
    /// electronegativity values are not needed: their influence is fully
    /// captured by the forward charges, which must be passed back in
    /// unchanged from [`ChargeEquilibrator::equilibrate`].
    ///
    /// # Errors
    ///
    /// Same validation as the forward pass, applied to `s`, `charges`, and
    /// `grad_charges`.
    pub fn backward(
        &self,
        batch: &Batch,
        s: &[f64],
        charges: &[f64],
        grad_charges: &[f64],
    ) -> Result<ParameterGradients, MoleqError> {
        if batch.molecule_count() == 0 {
            return Err(MoleqError::EmptyBatch);
        }
        batch.check_atom_field("hardness", s.len())?;
        batch.check_atom_field("charges", charges.len())?;
        batch.check_atom_field("grad_charges", grad_charges.len())?;

        if self.options.strict_hardness {
            self.check_hardness(s)?;
        }

        let s_inv: Vec<f64> = s.iter().map(|&value| value.recip()).collect();
        let weighted_grad: Vec<f64> = grad_charges
            .iter()
            .zip(s_inv.iter())
            .map(|(&g_i, &s_inv_i)| g_i * s_inv_i)
            .collect();

        let molecule_ids = batch.molecule_ids();
        let molecule_count = batch.molecule_count();
        let sum_s_inv = segment_sum(&s_inv, molecule_ids, molecule_count);
        let grad_sums = segment_sum(&weighted_grad, molecule_ids, molecule_count);

        if self.options.strict_hardness {
            self.check_constraint_sums(&sum_s_inv)?;
        }

        let ratios: Vec<f64> = grad_sums
            .iter()
            .zip(sum_s_inv.iter())
            .map(|(&g_m, &b_m)| g_m / b_m)
            .collect();
        let ratio_per_atom = segment_broadcast(&ratios, molecule_ids);

        let electronegativity: Vec<f64> = (0..batch.atom_count())
            .into_par_iter()
            .map(|i| s_inv[i] * (ratio_per_atom[i] - grad_charges[i]))
            .collect();
        let hardness: Vec<f64> = electronegativity
            .iter()
            .zip(charges.iter())
            .map(|(&grad_e_i, &q_i)| q_i * grad_e_i)
            .collect();

        Ok(ParameterGradients {
            electronegativity,
            hardness,
        })
    }

    /// Rejects any hardness whose magnitude falls at or below the configured
    /// threshold.
    fn check_hardness(&self, s: &[f64]) -> Result<(), MoleqError> {
        for (atom, &hardness) in s.iter().enumerate() {
            if hardness.abs() <= self.options.hardness_epsilon {
                return Err(MoleqError::ZeroHardness {
                    atom,
                    hardness,
                    epsilon: self.options.hardness_epsilon,
                });
            }
        }
        Ok(())
    }

    /// Rejects molecules whose reciprocal-hardness sum is exactly zero.
    ///
    /// Mixed-sign hardness can cancel to zero even when every individual
    /// value passes the magnitude check, e.g. `s = [1, -1]`.
    fn check_constraint_sums(&self, sum_s_inv: &[f64]) -> Result<(), MoleqError> {
        for (molecule, &sum) in sum_s_inv.iter().enumerate() {
            if sum == 0.0 {
                return Err(MoleqError::SingularMolecule {
                    molecule,
                    sum_s_inv: sum,
                });
            }
        }
        Ok(())
    }
}
