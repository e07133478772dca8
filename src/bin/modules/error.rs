use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    /// Errors originating from the core moleq library.
    #[error("Equilibration error: {0}")]
    Equilibration(#[from] moleq::MoleqError),

    /// I/O errors associated with a specific file path.
    #[error("I/O error for '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// General I/O errors not tied to a specific file.
    #[error("I/O error: {0}")]
    GenericIo(#[from] std::io::Error),

    /// Errors parsing the TOML batch description.
    #[error("Failed to parse batch TOML from {source_name}: {source}")]
    BatchParse {
        source_name: String,
        #[source]
        source: toml::de::Error,
    },
}
