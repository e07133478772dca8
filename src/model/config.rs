//! This module provides the typed layer configuration for feature networks
//! and utilities for loading it from TOML files.
//!
//! A network's depth and shape are described by an ordered list of string
//! tokens, each coerced into a tagged [`LayerSpec`]: a numeric token of at
//! least 1 is a graph-convolution width, a numeric token below 1 is a dropout
//! rate, and anything else must name an activation function. The dispatcher
//! in [`network`](super::network) interprets the resulting descriptor list in
//! order, so the construction is explicit and data-driven rather than
//! reflective.

use crate::error::MoleqError;
use serde::Deserialize;
use std::path::Path;

/// Elementwise activation functions available to feature networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationKind {
    Tanh,
    Relu,
    Sigmoid,
    LeakyRelu,
}

impl ActivationKind {
    /// Looks up an activation by its configuration name.
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "tanh" => Some(Self::Tanh),
            "relu" => Some(Self::Relu),
            "sigmoid" => Some(Self::Sigmoid),
            "leaky_relu" => Some(Self::LeakyRelu),
            _ => None,
        }
    }

    /// Applies the activation to one value.
    #[inline]
    pub(crate) fn apply(self, x: f64) -> f64 {
        match self {
            Self::Tanh => x.tanh(),
            Self::Relu => x.max(0.0),
            Self::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Self::LeakyRelu => {
                if x > 0.0 {
                    x
                } else {
                    0.01 * x
                }
            }
        }
    }
}

/// One layer of a feature network, as a tagged descriptor.
///
/// The ordered descriptor list fully determines the network structure; there
/// is no other construction channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayerSpec {
    /// A graph convolution projecting the hidden state to the given width,
    /// aggregating over bonded neighbors.
    Conv(usize),
    /// An elementwise activation.
    Activation(ActivationKind),
    /// Dropout with the given rate; the identity at inference time.
    Dropout(f64),
}

/// Coerces raw configuration tokens into layer descriptors.
///
/// A token that parses as a finite number is a [`LayerSpec::Conv`] width when
/// it is at least 1 (truncated to an integer) and a [`LayerSpec::Dropout`]
/// rate when it lies in `[0, 1)`. Any other token must be an activation name.
///
/// # Errors
///
/// * [`MoleqError::InvalidDropoutRate`] for a numeric token outside `[0, 1)`
///   that is not a valid width (i.e. negative).
/// * [`MoleqError::InvalidLayerToken`] for non-numeric tokens that do not
///   name a known activation.
pub fn parse_layer_tokens(tokens: &[String]) -> Result<Vec<LayerSpec>, MoleqError> {
    tokens
        .iter()
        .map(|token| {
            if let Ok(value) = token.parse::<f64>() {
                if value.is_finite() && value >= 1.0 {
                    Ok(LayerSpec::Conv(value as usize))
                } else if value.is_finite() && value >= 0.0 {
                    Ok(LayerSpec::Dropout(value))
                } else {
                    Err(MoleqError::InvalidDropoutRate { rate: value })
                }
            } else {
                ActivationKind::from_name(token)
                    .map(LayerSpec::Activation)
                    .ok_or_else(|| MoleqError::InvalidLayerToken {
                        token: token.clone(),
                    })
            }
        })
        .collect()
}

/// A feature-network configuration, deserializable from TOML.
///
/// The input projection maps `input_dim` raw atom features to `input_units`
/// hidden channels (followed by a fixed tanh), after which the token list in
/// `layers` describes the rest of the network. The final hidden width must be
/// at least 2, since the first two channels are read out as
/// electronegativity and hardness.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelConfig {
    /// Width of the raw per-atom feature vectors.
    #[serde(default = "default_input_dim")]
    pub input_dim: usize,
    /// Hidden width produced by the input projection.
    #[serde(default = "default_input_units")]
    pub input_units: usize,
    /// Ordered layer tokens, coerced by [`parse_layer_tokens`].
    pub layers: Vec<String>,
}

fn default_input_dim() -> usize {
    117
}

fn default_input_units() -> usize {
    128
}

impl ModelConfig {
    /// Parses a configuration from a TOML string.
    pub fn load_from_str(content: &str) -> Result<Self, MoleqError> {
        Ok(toml::from_str(content)?)
    }

    /// Reads and parses a configuration from a TOML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, MoleqError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| MoleqError::IoError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::load_from_str(&content)
    }

    /// Coerces the raw layer tokens into descriptors.
    pub fn layer_specs(&self) -> Result<Vec<LayerSpec>, MoleqError> {
        parse_layer_tokens(&self.layers)
    }
}
