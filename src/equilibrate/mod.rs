//! This module contains the analytical charge-equilibration components.
//!
//! It includes the [`ChargeEquilibrator`] implementation and
//! [`EquilibrationOptions`] for configuring validation behavior, providing
//! the core closed-form constrained charge solution of the `moleq` library.

mod implementation;
mod options;

pub use implementation::{ChargeEquilibrator, EquilibrationResult, ParameterGradients};
pub use options::EquilibrationOptions;
