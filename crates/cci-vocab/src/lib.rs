//! Controlled vocabulary access for the CCI tagger.
//!
//! Facet values are resolved against SKOS concept schemes hosted by an
//! external ontology service. This crate holds the in-memory vocabulary
//! model, the triple store client seam, and the JSON dump load/save path.

pub mod error;
pub mod store;
pub mod vocabulary;

pub use error::VocabError;
pub use store::{CachedStore, TripleStore};
pub use vocabulary::{ConceptScheme, LEVEL_2_FREQUENCY_URI, Vocabulary, scheme_slug};
