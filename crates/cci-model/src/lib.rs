//! Data model for the CCI dataset tagger.
//!
//! Shared types for facets, raw and resolved facet sets, and the DRS
//! identity tuple. No I/O and no vocabulary lookups live here.

pub mod drs;
pub mod error;
pub mod facet;

pub use drs::{
    DRS_FACETS, DRS_PROJECT, DrsComponents, DrsIdentity, parse_realization, sanitize_component,
    strip_version, version_today,
};
pub use error::ModelError;
pub use facet::{
    Concept, FacetKind, RawFacetSet, ResolvedFacetSet, TaggedDataset, ambiguity_message,
    not_found_message,
};
