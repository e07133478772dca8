//! This module defines configuration options for the charge equilibrator.
//!
//! It provides the `EquilibrationOptions` struct, which controls how hardness
//! degeneracies are handled. The closed-form solution itself has no tunable
//! numerical parameters; the only policy choice is whether degenerate inputs
//! are rejected up front or allowed to propagate as non-finite output.

/// Configuration parameters for the charge equilibrator.
///
/// The reference behavior tolerates zero hardness and singular molecules
/// implicitly: the division produces infinities or NaNs that flow through to
/// the output charges, and callers check for non-finite values if they care.
/// Strict mode turns both degeneracies into hard validation errors raised
/// before any charge is computed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquilibrationOptions {
    /// Reject degenerate hardness inputs with an error instead of producing
    /// non-finite charges.
    ///
    /// When enabled, every atom's hardness magnitude is checked against
    /// `hardness_epsilon`, and every molecule's summed reciprocal hardness is
    /// checked against exact zero, before the charge assignment runs.
    pub strict_hardness: bool,
    /// Magnitude threshold below which a hardness value counts as zero under
    /// strict validation.
    ///
    /// The default of `0.0` rejects only exact zeros, matching the division
    /// semantics of the lenient path. Raise it to guard against near-singular
    /// hardness produced by an upstream model.
    pub hardness_epsilon: f64,
}

impl Default for EquilibrationOptions {
    fn default() -> Self {
        Self {
            strict_hardness: false,
            hardness_epsilon: 0.0,
        }
    }
}
