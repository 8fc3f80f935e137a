use std::path::PathBuf;

use cci_model::FacetKind;

/// A filename that matches neither ESACCI grammar. Recovered locally: the
/// file is excluded from its dataset's member set, the run continues.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("not enough '-' delimited tokens in \"{name}\"")]
    TooFewTokens { name: String },

    #[error("missing ESACCI marker in \"{name}\"")]
    MissingMarker { name: String },

    #[error("missing fv file version token in \"{name}\"")]
    MissingFileVersion { name: String },

    #[error("expected .nc extension in \"{name}\"")]
    MissingExtension { name: String },

    #[error("invalid indicative date token \"{token}\" in \"{name}\"")]
    InvalidIndicativeDate { name: String, token: String },

    #[error("unexpected token \"{token}\" before file version in \"{name}\"")]
    UnexpectedToken { name: String, token: String },
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
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

    #[error("failed to extract attributes from {path}: {message}")]
    AttributeExtraction { path: PathBuf, message: String },

    #[error(
        "\"{value}\" in {file} is not a valid value for {facet}. Should be one of {allowed}."
    )]
    ConfigValidation {
        value: String,
        file: PathBuf,
        facet: FacetKind,
        /// Sorted, comma separated allowed labels.
        allowed: String,
    },
}
