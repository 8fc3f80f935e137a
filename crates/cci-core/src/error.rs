use std::path::PathBuf;

use cci_model::ModelError;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Ingest(#[from] cci_ingest::IngestError),

    #[error(transparent)]
    Parse(#[from] cci_ingest::ParseError),

    /// No member file of the dataset yielded a parseable name.
    #[error("no identifiable files in dataset {dataset}")]
    DatasetEmpty { dataset: String },

    /// The realization registry violated an internal invariant. Fatal to the
    /// affected dataset only; the run continues.
    #[error("realization registry inconsistent for {dataset}: {message}")]
    RegistryConsistency { dataset: String, message: String },
}
