use std::path::PathBuf;
use thiserror::Error;

/// The primary error type for all fallible operations in the `moleq` library.
///
/// Errors fall into two families. Shape errors describe a malformed batch or
/// mismatched input fields and are always rejected before any aggregation
/// runs; a failed call never leaves partial charges behind. Numerical errors
/// describe hardness degeneracies and are only raised when strict validation
/// is enabled — the default (reference) behavior lets the degeneracy
/// propagate as non-finite output values instead.
#[derive(Error, Debug)]
pub enum MoleqError {
    /// The batch contains no molecules. At least one molecule with at least
    /// one atom is required for an equilibration call.
    #[error("Input validation failed: the batch contains no molecules")]
    EmptyBatch,

    /// A molecule owns no atoms. An empty member set makes the molecule's
    /// reciprocal-hardness sum an empty reduction (zero), so the constraint
    /// system is undefined and the batch is rejected up front.
    #[error("Molecule {molecule} has no member atoms")]
    EmptyMolecule {
        /// Index of the offending molecule within the batch.
        molecule: usize,
    },

    /// An atom references a molecule index outside the batch.
    #[error(
        "Atom {atom} is assigned to molecule {molecule}, but the batch only has {molecule_count} molecules"
    )]
    MoleculeOutOfRange {
        atom: usize,
        molecule: usize,
        molecule_count: usize,
    },

    /// A per-atom input slice does not match the number of atoms in the batch.
    #[error("Per-atom field '{field}' has length {actual}, but the batch has {expected} atoms")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A bond references an atom index outside the batch, or joins an atom
    /// to itself.
    #[error("Invalid bond ({a}, {b}) for a batch of {atom_count} atoms")]
    InvalidBond {
        a: usize,
        b: usize,
        atom_count: usize,
    },

    /// A bond joins atoms that belong to different molecules. Connectivity
    /// never crosses molecule boundaries within a batch.
    #[error("Bond ({a}, {b}) crosses molecule boundaries ({mol_a} vs {mol_b})")]
    CrossMoleculeBond {
        a: usize,
        b: usize,
        mol_a: usize,
        mol_b: usize,
    },

    /// An atom's hardness is zero (or below the configured magnitude
    /// threshold), making its reciprocal undefined. Raised only under
    /// strict validation.
    #[error(
        "Atom {atom} has hardness {hardness:.3e}, below the magnitude threshold {epsilon:.3e}"
    )]
    ZeroHardness {
        atom: usize,
        hardness: f64,
        epsilon: f64,
    },

    /// A molecule's summed reciprocal hardness is exactly zero, so the
    /// Lagrange multiplier is singular. Raised only under strict validation;
    /// otherwise every member atom's charge comes out non-finite.
    #[error(
        "Molecule {molecule} has a singular charge constraint: sum of reciprocal hardness is {sum_s_inv:.3e}"
    )]
    SingularMolecule { molecule: usize, sum_s_inv: f64 },

    /// A layer token in a model configuration could not be interpreted as a
    /// convolution width, a dropout rate, or a known activation name.
    #[error("Unrecognized layer token '{token}' in model configuration")]
    InvalidLayerToken { token: String },

    /// A dropout rate outside the half-open interval [0, 1).
    #[error("Dropout rate {rate} is outside [0, 1)")]
    InvalidDropoutRate { rate: f64 },

    /// The final layer of a feature network is too narrow to carry both
    /// output channels (electronegativity and hardness).
    #[error("Feature network output width is {width}, but at least 2 channels are required")]
    OutputTooNarrow { width: usize },

    /// An I/O error that occurred while attempting to read a model
    /// configuration file.
    #[error("I/O error at path '{path}': {source}")]
    IoError {
        /// The path of the file that caused the I/O error.
        path: PathBuf,
        /// The underlying `std::io::Error`.
        #[source]
        source: std::io::Error,
    },

    /// An error that occurred while parsing a model configuration file,
    /// typically indicating invalid TOML or a structural mismatch with the
    /// expected `ModelConfig` format.
    #[error("Failed to deserialize TOML configuration: {0}")]
    DeserializationError(#[from] toml::de::Error),
}
