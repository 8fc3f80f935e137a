//! File-side ingestion for the CCI tagger: filename parsing, dataset member
//! discovery, global attribute extraction, and the per-dataset JSON
//! configuration layer.

pub mod attributes;
pub mod config;
pub mod discovery;
pub mod error;
pub mod filename;

pub use attributes::{
    AttributeSource, SidecarAttributeSource, attribute_facet_set, split_platform_values,
    split_values,
};
pub use config::{DatasetConfig, DatasetConfigs, ValueList};
pub use discovery::discover_files;
pub use error::{IngestError, ParseError};
pub use filename::parse_filename;
