//! The triple store seam.
//!
//! The ontology service that resolves concept schemes lives outside this
//! system; the core only depends on the [`TripleStore`] trait. A concrete
//! SPARQL client plugs in at process start and is passed by reference. The
//! [`CachedStore`] wrapper owns the per-URI label caches; cached labels are
//! never invalidated for the lifetime of the process.

use std::cell::RefCell;
use std::collections::HashMap;

use cci_model::Concept;

use crate::error::VocabError;

/// Query interface onto the vocabulary/ontology service.
pub trait TripleStore {
    /// All concepts in a scheme, keyed by preferred label.
    fn concepts_in_scheme(&self, scheme_uri: &str) -> Result<Vec<Concept>, VocabError>;

    /// All concepts in a scheme, keyed by alternative label.
    fn alt_concepts_in_scheme(&self, scheme_uri: &str) -> Result<Vec<Concept>, VocabError>;

    /// Preferred label for one concept, empty when the concept has none.
    fn pref_label(&self, uri: &str) -> Result<String, VocabError>;

    /// Alternative label for one concept, empty when the concept has none.
    fn alt_label(&self, uri: &str) -> Result<String, VocabError>;

    /// The broader (parent) concept, if any.
    fn broader(&self, uri: &str) -> Result<Option<Concept>, VocabError>;
}

/// Wraps a [`TripleStore`] with per-URI label caches.
pub struct CachedStore<S> {
    inner: S,
    pref_labels: RefCell<HashMap<String, String>>,
    alt_labels: RefCell<HashMap<String, String>>,
}

impl<S: TripleStore> CachedStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            pref_labels: RefCell::new(HashMap::new()),
            alt_labels: RefCell::new(HashMap::new()),
        }
    }
}

impl<S: TripleStore> TripleStore for CachedStore<S> {
    fn concepts_in_scheme(&self, scheme_uri: &str) -> Result<Vec<Concept>, VocabError> {
        self.inner.concepts_in_scheme(scheme_uri)
    }

    fn alt_concepts_in_scheme(&self, scheme_uri: &str) -> Result<Vec<Concept>, VocabError> {
        self.inner.alt_concepts_in_scheme(scheme_uri)
    }

    fn pref_label(&self, uri: &str) -> Result<String, VocabError> {
        if let Some(label) = self.pref_labels.borrow().get(uri) {
            return Ok(label.clone());
        }
        let label = self.inner.pref_label(uri)?;
        self.pref_labels
            .borrow_mut()
            .insert(uri.to_string(), label.clone());
        Ok(label)
    }

    fn alt_label(&self, uri: &str) -> Result<String, VocabError> {
        if let Some(label) = self.alt_labels.borrow().get(uri) {
            return Ok(label.clone());
        }
        let label = self.inner.alt_label(uri)?;
        self.alt_labels
            .borrow_mut()
            .insert(uri.to_string(), label.clone());
        Ok(label)
    }

    fn broader(&self, uri: &str) -> Result<Option<Concept>, VocabError> {
        self.inner.broader(uri)
    }
}
