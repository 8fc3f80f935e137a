//! In-memory vocabulary: concept schemes per facet plus the broader-term
//! tables derived from them.
//!
//! A `Vocabulary` is built once at process start, either from a
//! [`TripleStore`](crate::store::TripleStore) client or from a JSON dump
//! produced by an earlier run, and is read-only afterwards.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use cci_model::{Concept, FacetKind};

use crate::error::VocabError;
use crate::store::TripleStore;

/// Level 2 data is mapped to satellite orbit frequency.
pub const LEVEL_2_FREQUENCY_URI: &str =
    "http://vocab.ceda.ac.uk/collection/cci/freq/freq_sat_orb";

/// Scheme path segment under the vocabulary base URL, for facets that have a
/// concept scheme. `product_version` has no vocabulary.
pub const fn scheme_slug(facet: FacetKind) -> Option<&'static str> {
    match facet {
        FacetKind::DataType => Some("dataType"),
        FacetKind::CciProject => Some("ecv"),
        FacetKind::TimeFrequency => Some("freq"),
        FacetKind::PlatformId => Some("platform"),
        FacetKind::PlatformProgramme => Some("platformProg"),
        FacetKind::PlatformGroup => Some("platformGrp"),
        FacetKind::ProcessingLevel => Some("procLev"),
        FacetKind::SensorId => Some("sensor"),
        FacetKind::Institute => Some("org"),
        FacetKind::ProductString => Some("product"),
        _ => None,
    }
}

/// One facet's concepts, indexed both ways.
///
/// Forward keys are lower-cased labels; the reverse maps go from URI back to
/// the display-cased label.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConceptScheme {
    pref: BTreeMap<String, Concept>,
    alt: BTreeMap<String, Concept>,
    uri_to_pref: BTreeMap<String, String>,
    uri_to_alt: BTreeMap<String, String>,
}

impl ConceptScheme {
    pub fn add_pref(&mut self, concept: Concept) {
        self.uri_to_pref
            .insert(concept.uri.clone(), concept.label.clone());
        self.pref.insert(concept.label.to_lowercase(), concept);
    }

    pub fn add_alt(&mut self, concept: Concept) {
        self.uri_to_alt
            .insert(concept.uri.clone(), concept.label.clone());
        self.alt.insert(concept.label.to_lowercase(), concept);
    }

    /// Case-insensitive lookup over preferred then alternative labels.
    /// Returns every distinct matching concept.
    pub fn lookup(&self, raw: &str) -> Vec<Concept> {
        let key = raw.trim().to_lowercase();
        let mut matches = Vec::new();
        if let Some(concept) = self.pref.get(&key) {
            matches.push(concept.clone());
        }
        if let Some(concept) = self.alt.get(&key)
            && !matches.iter().any(|m| m.uri == concept.uri)
        {
            matches.push(concept.clone());
        }
        matches
    }

    pub fn pref_label_of(&self, uri: &str) -> Option<&str> {
        self.uri_to_pref.get(uri).map(String::as_str)
    }

    pub fn alt_label_of(&self, uri: &str) -> Option<&str> {
        self.uri_to_alt.get(uri).map(String::as_str)
    }

    /// All labels (pref and alt, original casing) accepted by this scheme.
    pub fn labels(&self) -> BTreeSet<String> {
        self.pref
            .values()
            .chain(self.alt.values())
            .map(|concept| concept.label.clone())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pref.is_empty() && self.alt.is_empty()
    }
}

/// The complete controlled vocabulary for a tagging run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Vocabulary {
    schemes: BTreeMap<FacetKind, ConceptScheme>,
    /// processing level URI -> broader processing level URI
    broader_processing_levels: BTreeMap<String, String>,
    /// platform URI -> programme label
    platform_programmes: BTreeMap<String, String>,
    /// programme URI -> group label
    programme_groups: BTreeMap<String, String>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the vocabulary by querying the triple store for every facet
    /// scheme, then deriving the broader-term tables.
    pub fn from_store<S: TripleStore>(base_url: &str, store: &S) -> Result<Self, VocabError> {
        let mut vocab = Self::new();
        for &facet in FacetKind::all() {
            let Some(slug) = scheme_slug(facet) else {
                continue;
            };
            let scheme_uri = format!("{base_url}/{slug}");
            let scheme = vocab.schemes.entry(facet).or_default();
            for concept in store.concepts_in_scheme(&scheme_uri)? {
                scheme.add_pref(concept);
            }
            for concept in store.alt_concepts_in_scheme(&scheme_uri)? {
                scheme.add_alt(concept);
            }
            debug!(facet = %facet, scheme = %scheme_uri, "loaded concept scheme");
        }
        vocab.init_processing_level_hierarchy(store)?;
        vocab.init_platform_hierarchy(store)?;
        Ok(vocab)
    }

    /// Load a previously dumped vocabulary. This is the offline fast path:
    /// runs against a static dump never touch the triple store.
    pub fn from_json_file(path: &Path) -> Result<Self, VocabError> {
        let data = std::fs::read_to_string(path).map_err(|source| VocabError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| VocabError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Dump the vocabulary for later offline use.
    pub fn to_json_file(&self, path: &Path) -> Result<(), VocabError> {
        let data = serde_json::to_string_pretty(self).map_err(|source| VocabError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, data).map_err(|source| VocabError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    fn init_processing_level_hierarchy<S: TripleStore>(
        &mut self,
        store: &S,
    ) -> Result<(), VocabError> {
        let level_uris: Vec<String> = self
            .scheme(FacetKind::ProcessingLevel)
            .uri_to_pref
            .keys()
            .cloned()
            .collect();
        let mut broader_scheme = ConceptScheme::default();
        for uri in level_uris {
            if let Some(broader) = store.broader(&uri)? {
                let alt = store.alt_label(&broader.uri)?;
                let label = if alt.is_empty() { broader.label.clone() } else { alt };
                broader_scheme.add_pref(Concept::new(broader.uri.clone(), label));
                self.broader_processing_levels.insert(uri, broader.uri);
            }
        }
        self.schemes
            .insert(FacetKind::BroaderProcessingLevel, broader_scheme);
        Ok(())
    }

    fn init_platform_hierarchy<S: TripleStore>(&mut self, store: &S) -> Result<(), VocabError> {
        let platform_uris: Vec<String> = self
            .scheme(FacetKind::PlatformId)
            .uri_to_pref
            .keys()
            .cloned()
            .collect();
        for uri in platform_uris {
            let Some(programme) = store.broader(&uri)? else {
                continue;
            };
            self.platform_programmes
                .insert(uri, programme.label.clone());
            if let Some(group) = store.broader(&programme.uri)?
                && !group.label.is_empty()
            {
                self.programme_groups.insert(programme.uri, group.label);
            }
        }
        Ok(())
    }

    fn scheme(&self, facet: FacetKind) -> &ConceptScheme {
        static EMPTY: std::sync::OnceLock<ConceptScheme> = std::sync::OnceLock::new();
        self.schemes
            .get(&facet)
            .unwrap_or_else(|| EMPTY.get_or_init(ConceptScheme::default))
    }

    /// Resolve a raw value against a facet's scheme. Zero, one, or many
    /// matches; the caller decides how to treat multi-hits.
    pub fn lookup(&self, facet: FacetKind, raw: &str) -> Vec<Concept> {
        self.scheme(facet).lookup(raw)
    }

    /// The display label for a resolved URI, following the per-facet label
    /// policy: alternative labels for processing level, CCI project, and
    /// data type; preferred labels elsewhere. Platform URIs may live in the
    /// platform, group, or programme scheme.
    pub fn label_for_uri(&self, facet: FacetKind, uri: &str) -> Option<String> {
        match facet {
            FacetKind::ProcessingLevel | FacetKind::CciProject | FacetKind::DataType => {
                self.scheme(facet).alt_label_of(uri).map(String::from)
            }
            FacetKind::PlatformId => [
                FacetKind::PlatformId,
                FacetKind::PlatformGroup,
                FacetKind::PlatformProgramme,
            ]
            .iter()
            .find_map(|kind| self.scheme(*kind).pref_label_of(uri))
            .map(String::from),
            // no vocabulary: the stored value is already the label
            FacetKind::ProductVersion => Some(uri.to_string()),
            _ => self.scheme(facet).pref_label_of(uri).map(String::from),
        }
    }

    /// Broader processing level URI for a processing level URI.
    pub fn broader_processing_level(&self, uri: &str) -> Option<&str> {
        self.broader_processing_levels.get(uri).map(String::as_str)
    }

    /// Programme label containing the given platform.
    pub fn platform_programme(&self, platform_uri: &str) -> Option<&str> {
        self.platform_programmes.get(platform_uri).map(String::as_str)
    }

    /// Group label containing the given programme.
    pub fn programme_group(&self, programme_uri: &str) -> Option<&str> {
        self.programme_groups.get(programme_uri).map(String::as_str)
    }

    /// All programme labels (containers of platforms).
    pub fn programme_labels(&self) -> impl Iterator<Item = &str> {
        self.platform_programmes.values().map(String::as_str)
    }

    /// All group labels (containers of programmes).
    pub fn group_labels(&self) -> impl Iterator<Item = &str> {
        self.programme_groups.values().map(String::as_str)
    }

    /// Allowed labels for a facet, used to validate configured defaults.
    pub fn allowed_labels(&self, facet: FacetKind) -> BTreeSet<String> {
        self.scheme(facet).labels()
    }

    /// True when the facet has a non-empty scheme loaded.
    pub fn has_scheme(&self, facet: FacetKind) -> bool {
        self.schemes
            .get(&facet)
            .is_some_and(|scheme| !scheme.is_empty())
    }

    // Test and tooling constructors below: build a vocabulary entry by entry.

    pub fn add_pref(&mut self, facet: FacetKind, uri: &str, label: &str) {
        self.schemes
            .entry(facet)
            .or_default()
            .add_pref(Concept::new(uri, label));
    }

    pub fn add_alt(&mut self, facet: FacetKind, uri: &str, label: &str) {
        self.schemes
            .entry(facet)
            .or_default()
            .add_alt(Concept::new(uri, label));
    }

    pub fn set_broader_processing_level(&mut self, level_uri: &str, broader: Concept) {
        self.broader_processing_levels
            .insert(level_uri.to_string(), broader.uri.clone());
        self.schemes
            .entry(FacetKind::BroaderProcessingLevel)
            .or_default()
            .add_pref(broader);
    }

    pub fn set_platform_programme(&mut self, platform_uri: &str, programme_label: &str) {
        self.platform_programmes
            .insert(platform_uri.to_string(), programme_label.to_string());
    }

    pub fn set_programme_group(&mut self, programme_uri: &str, group_label: &str) {
        self.programme_groups
            .insert(programme_uri.to_string(), group_label.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vocabulary {
        let mut vocab = Vocabulary::new();
        vocab.add_pref(
            FacetKind::ProcessingLevel,
            "http://vocab/procLev/level_4",
            "level 4",
        );
        vocab.add_alt(FacetKind::ProcessingLevel, "http://vocab/procLev/level_4", "L4");
        vocab.add_pref(FacetKind::SensorId, "http://vocab/sensor/aatsr", "AATSR");
        vocab
    }

    #[test]
    fn lookup_is_case_insensitive_over_pref_and_alt() {
        let vocab = sample();
        assert_eq!(
            vocab.lookup(FacetKind::ProcessingLevel, "l4"),
            vocab.lookup(FacetKind::ProcessingLevel, "L4")
        );
        let hits = vocab.lookup(FacetKind::ProcessingLevel, "LEVEL 4");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].uri, "http://vocab/procLev/level_4");
    }

    #[test]
    fn pref_and_alt_hits_on_same_uri_are_one_match() {
        let mut vocab = Vocabulary::new();
        vocab.add_pref(FacetKind::DataType, "http://vocab/dataType/aod", "AOD");
        vocab.add_alt(FacetKind::DataType, "http://vocab/dataType/aod", "AOD");
        assert_eq!(vocab.lookup(FacetKind::DataType, "aod").len(), 1);
    }

    #[test]
    fn label_policy_uses_alt_for_processing_level() {
        let vocab = sample();
        assert_eq!(
            vocab
                .label_for_uri(FacetKind::ProcessingLevel, "http://vocab/procLev/level_4")
                .as_deref(),
            Some("L4")
        );
        assert_eq!(
            vocab
                .label_for_uri(FacetKind::SensorId, "http://vocab/sensor/aatsr")
                .as_deref(),
            Some("AATSR")
        );
    }

    #[test]
    fn platform_label_falls_back_through_group_and_programme() {
        let mut vocab = Vocabulary::new();
        vocab.add_pref(FacetKind::PlatformProgramme, "http://vocab/platformProg/noaa", "NOAA");
        assert_eq!(
            vocab
                .label_for_uri(FacetKind::PlatformId, "http://vocab/platformProg/noaa")
                .as_deref(),
            Some("NOAA")
        );
    }

    #[test]
    fn unknown_value_yields_no_matches() {
        let vocab = sample();
        assert!(vocab.lookup(FacetKind::SensorId, "NOT-A-SENSOR").is_empty());
    }

    #[test]
    fn json_dump_round_trips() {
        let vocab = sample();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vocab.json");
        vocab.to_json_file(&path).unwrap();
        let loaded = Vocabulary::from_json_file(&path).unwrap();
        assert_eq!(
            loaded.lookup(FacetKind::SensorId, "aatsr")[0].uri,
            "http://vocab/sensor/aatsr"
        );
        assert_eq!(
            loaded
                .label_for_uri(FacetKind::ProcessingLevel, "http://vocab/procLev/level_4")
                .as_deref(),
            Some("L4")
        );
    }
}
