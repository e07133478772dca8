pub mod batch;
pub mod equilibrate;
pub mod error;
pub mod model;
pub mod segment;

pub use batch::Batch;
pub use equilibrate::{
    ChargeEquilibrator, EquilibrationOptions, EquilibrationResult, ParameterGradients,
};
pub use error::MoleqError;
pub use model::{FeatureProducer, ModelConfig, Network, PerAtomParameters};

use std::sync::OnceLock;

static DEFAULT_MODEL_CONFIG: OnceLock<ModelConfig> = OnceLock::new();

/// Returns the built-in feature-network configuration.
///
/// The configuration is embedded in the binary and parsed once on first use;
/// subsequent calls return the cached value.
pub fn get_default_model_config() -> &'static ModelConfig {
    DEFAULT_MODEL_CONFIG.get_or_init(|| {
        const DEFAULT_CONFIG_TOML: &str = include_str!("../resources/model.default.toml");
        ModelConfig::load_from_str(DEFAULT_CONFIG_TOML)
            .expect("Failed to parse embedded default model configuration. This is a library bug.")
    })
}
