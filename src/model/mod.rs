//! This module contains the feature-producing network components.
//!
//! It includes the typed layer configuration ([`ModelConfig`], [`LayerSpec`])
//! and the [`Network`] dispatcher that turns per-atom input features into the
//! electronegativity and hardness parameters consumed by the equilibrator.

mod config;
mod network;

pub use config::{parse_layer_tokens, ActivationKind, LayerSpec, ModelConfig};
pub use network::{FeatureProducer, Network, PerAtomParameters};
