//! This module implements the feature network that maps raw per-atom
//! features to the two scalar parameters consumed by the equilibrator.
//!
//! The network is a fixed input projection followed by a dispatcher over the
//! typed layer descriptors of a [`ModelConfig`]: graph convolutions aggregate
//! a mean over bonded neighbors, activations apply elementwise, and dropout
//! is the identity at inference. Hidden states are `faer` matrices with one
//! row per atom.

use super::config::{ActivationKind, LayerSpec, ModelConfig};
use crate::{batch::Batch, error::MoleqError};
use faer::{Mat, MatRef};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Per-atom scalar parameters produced by an upstream model.
///
/// This is the hand-off surface between any feature producer and the
/// equilibrator: one electronegativity and one hardness value per atom, in
/// batch atom order.
#[derive(Debug, Clone, PartialEq)]
pub struct PerAtomParameters {
    /// Linear energy coefficient per atom.
    pub electronegativity: Vec<f64>,
    /// Quadratic energy coefficient per atom.
    pub hardness: Vec<f64>,
}

/// A source of per-atom equilibration parameters.
///
/// Implementors map raw per-atom features (one row per atom) to
/// [`PerAtomParameters`]. The trait decouples the equilibrator from any
/// particular model; tests or callers with precomputed parameters can
/// implement it over a lookup table just as well as a network.
pub trait FeatureProducer {
    /// Produces electronegativity and hardness for every atom of the batch.
    fn produce(
        &self,
        batch: &Batch,
        features: MatRef<'_, f64>,
    ) -> Result<PerAtomParameters, MoleqError>;
}

/// One realized network layer, dispatched in order during a forward pass.
#[derive(Debug)]
enum Layer {
    /// SAGE-style mean convolution: `h'_i = W_self·h_i + W_neigh·mean_{j∈N(i)} h_j + b`.
    Conv {
        w_self: Mat<f64>,
        w_neigh: Mat<f64>,
        bias: Vec<f64>,
    },
    Activation(ActivationKind),
    /// Kept for structural fidelity with the configuration; a no-op at
    /// inference time.
    Dropout(#[allow(dead_code)] f64),
}

/// A feature network built from a [`ModelConfig`].
///
/// Weights are initialized with a seeded Xavier-uniform scheme, so two
/// networks built from the same configuration and seed are identical. The
/// network is inference-only; training updates arrive from an external
/// optimizer through whatever parameter storage the caller maintains, with
/// [`ChargeEquilibrator::backward`](crate::ChargeEquilibrator::backward)
/// supplying the gradient through the equilibration step.
#[derive(Debug)]
pub struct Network {
    input_weight: Mat<f64>,
    input_bias: Vec<f64>,
    layers: Vec<Layer>,
    input_dim: usize,
    output_width: usize,
}

impl Network {
    /// Builds a network from a configuration, with deterministic weight
    /// initialization from `seed`.
    ///
    /// # Errors
    ///
    /// Layer-token errors from [`ModelConfig::layer_specs`], plus
    /// [`MoleqError::OutputTooNarrow`] if the final hidden width is below 2
    /// and [`MoleqError::InvalidDropoutRate`] for a dropout rate of 1 or
    /// more.
    pub fn from_config(config: &ModelConfig, seed: u64) -> Result<Self, MoleqError> {
        let specs = config.layer_specs()?;
        let mut rng = StdRng::seed_from_u64(seed);

        let input_weight = xavier_uniform(config.input_dim, config.input_units, &mut rng);
        let input_bias = vec![0.0; config.input_units];

        let mut dim = config.input_units;
        let mut layers = Vec::with_capacity(specs.len());
        for spec in specs {
            match spec {
                LayerSpec::Conv(width) => {
                    layers.push(Layer::Conv {
                        w_self: xavier_uniform(dim, width, &mut rng),
                        w_neigh: xavier_uniform(dim, width, &mut rng),
                        bias: vec![0.0; width],
                    });
                    dim = width;
                }
                LayerSpec::Activation(kind) => layers.push(Layer::Activation(kind)),
                LayerSpec::Dropout(rate) => {
                    if rate >= 1.0 {
                        return Err(MoleqError::InvalidDropoutRate { rate });
                    }
                    layers.push(Layer::Dropout(rate));
                }
            }
        }

        if dim < 2 {
            return Err(MoleqError::OutputTooNarrow { width: dim });
        }

        Ok(Self {
            input_weight,
            input_bias,
            layers,
            input_dim: config.input_dim,
            output_width: dim,
        })
    }

    /// Width of the final hidden state.
    pub fn output_width(&self) -> usize {
        self.output_width
    }

    /// Runs the forward pass, returning the final hidden state with one row
    /// per atom.
    ///
    /// `features` must have one row per batch atom and `input_dim` columns.
    pub fn forward(
        &self,
        batch: &Batch,
        features: MatRef<'_, f64>,
    ) -> Result<Mat<f64>, MoleqError> {
        batch.check_atom_field("feature rows", features.nrows())?;
        if features.ncols() != self.input_dim {
            return Err(MoleqError::LengthMismatch {
                field: "feature columns",
                expected: self.input_dim,
                actual: features.ncols(),
            });
        }

        // Input projection with a fixed tanh, before the configured stack.
        let mut hidden: Mat<f64> = features * self.input_weight.as_ref();
        add_bias(&mut hidden, &self.input_bias);
        apply_activation(&mut hidden, ActivationKind::Tanh);

        for layer in &self.layers {
            match layer {
                Layer::Conv {
                    w_self,
                    w_neigh,
                    bias,
                } => {
                    let neighbor_mean = mean_over_neighbors(batch, hidden.as_ref());
                    let projected: Mat<f64> = hidden.as_ref() * w_self.as_ref();
                    let aggregated: Mat<f64> = neighbor_mean.as_ref() * w_neigh.as_ref();
                    hidden = projected + aggregated;
                    add_bias(&mut hidden, bias);
                }
                Layer::Activation(kind) => apply_activation(&mut hidden, *kind),
                Layer::Dropout(_) => {}
            }
        }

        Ok(hidden)
    }
}

impl FeatureProducer for Network {
    /// Reads electronegativity from channel 0 and hardness from channel 1 of
    /// the final hidden state.
    fn produce(
        &self,
        batch: &Batch,
        features: MatRef<'_, f64>,
    ) -> Result<PerAtomParameters, MoleqError> {
        let hidden = self.forward(batch, features)?;
        let electronegativity = (0..hidden.nrows()).map(|i| hidden[(i, 0)]).collect();
        let hardness = (0..hidden.nrows()).map(|i| hidden[(i, 1)]).collect();
        Ok(PerAtomParameters {
            electronegativity,
            hardness,
        })
    }
}

/// Samples a `rows x cols` weight matrix from the Xavier-uniform range
/// `[-sqrt(6/(rows+cols)), sqrt(6/(rows+cols))]`.
fn xavier_uniform(rows: usize, cols: usize, rng: &mut StdRng) -> Mat<f64> {
    let limit = (6.0 / (rows + cols) as f64).sqrt();
    let mut weights = Mat::zeros(rows, cols);
    for i in 0..rows {
        for j in 0..cols {
            weights[(i, j)] = limit * (2.0 * rng.random::<f64>() - 1.0);
        }
    }
    weights
}

/// Adds a per-channel bias to every row in place.
fn add_bias(hidden: &mut Mat<f64>, bias: &[f64]) {
    for i in 0..hidden.nrows() {
        for (j, &b) in bias.iter().enumerate() {
            hidden[(i, j)] += b;
        }
    }
}

/// Applies an activation elementwise in place.
fn apply_activation(hidden: &mut Mat<f64>, kind: ActivationKind) {
    for i in 0..hidden.nrows() {
        for j in 0..hidden.ncols() {
            hidden[(i, j)] = kind.apply(hidden[(i, j)]);
        }
    }
}

/// Mean of the bonded neighbors' hidden rows, per atom.
///
/// Atoms with no bonds keep a zero aggregate, so an isolated atom's update
/// reduces to its self-projection.
fn mean_over_neighbors(batch: &Batch, hidden: MatRef<'_, f64>) -> Mat<f64> {
    let (n_atoms, dim) = (hidden.nrows(), hidden.ncols());
    let mut aggregate = Mat::zeros(n_atoms, dim);
    let mut degrees = vec![0usize; n_atoms];

    for &[a, b] in batch.bonds() {
        degrees[a] += 1;
        degrees[b] += 1;
        for j in 0..dim {
            aggregate[(a, j)] += hidden[(b, j)];
            aggregate[(b, j)] += hidden[(a, j)];
        }
    }

    for (i, &degree) in degrees.iter().enumerate() {
        if degree > 1 {
            let scale = 1.0 / degree as f64;
            for j in 0..dim {
                aggregate[(i, j)] *= scale;
            }
        }
    }

    aggregate
}
