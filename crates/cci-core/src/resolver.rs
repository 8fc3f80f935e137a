//! Facet resolution: raw tokens to vocabulary concepts.
//!
//! Resolution order per facet: dataset `overrides` replace the extracted
//! value outright and are looked up as-is; otherwise the extracted value is
//! used, falling back to the dataset `defaults`, and `mappings` rewrite it
//! before the vocabulary lookup. Lookup misses become not-found diagnostics,
//! never errors.

use std::collections::{BTreeMap, BTreeSet};

use cci_ingest::{DatasetConfig, split_platform_values, split_values};
use cci_model::{
    FacetKind, RawFacetSet, ResolvedFacetSet, ambiguity_message, not_found_message,
};
use cci_vocab::{LEVEL_2_FREQUENCY_URI, Vocabulary};

/// Fallback display label for the level-2 frequency concept when the
/// vocabulary dump does not carry it.
const LEVEL_2_FREQUENCY_LABEL: &str = "satellite-orbit-frequency";

/// The outcome of resolving one file (or the aggregate of a dataset).
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Vocabulary URIs per facet.
    pub uris: ResolvedFacetSet,
    /// Display labels per facet, insertion-ordered and de-duplicated.
    pub labels: BTreeMap<FacetKind, Vec<String>>,
    /// Not-found and ambiguity diagnostics.
    pub diagnostics: BTreeSet<String>,
}

impl Resolution {
    fn push_label(&mut self, facet: FacetKind, label: impl Into<String>) {
        let label = label.into();
        let labels = self.labels.entry(facet).or_default();
        if !labels.contains(&label) {
            labels.push(label);
        }
    }

    /// Aggregate another file's resolution into this one.
    pub fn merge(&mut self, other: &Resolution) {
        self.uris.union(&other.uris);
        for (facet, labels) in &other.labels {
            for label in labels {
                self.push_label(*facet, label.clone());
            }
        }
        self.diagnostics
            .extend(other.diagnostics.iter().cloned());
    }

    pub fn label_values(&self, facet: FacetKind) -> &[String] {
        self.labels.get(&facet).map_or(&[], Vec::as_slice)
    }
}

/// Resolves raw facet values against the vocabulary under one dataset's
/// configuration.
pub struct FacetResolver<'a> {
    vocabulary: &'a Vocabulary,
    config: Option<&'a DatasetConfig>,
}

impl<'a> FacetResolver<'a> {
    pub fn new(vocabulary: &'a Vocabulary, config: Option<&'a DatasetConfig>) -> Self {
        Self { vocabulary, config }
    }

    /// Resolve every vocabulary-backed facet of one file.
    pub fn resolve(&self, raw: &RawFacetSet) -> Resolution {
        let mut resolution = Resolution::default();

        // Processing levels containing '2' force the satellite-orbit
        // frequency regardless of what the attributes claim.
        let level_2 = self
            .values_for(FacetKind::ProcessingLevel, raw)
            .iter()
            .any(|value| value.contains('2'));

        let facets = FacetKind::filename_vocab_facets()
            .iter()
            .chain(FacetKind::attribute_facets());
        for &facet in facets {
            if facet == FacetKind::TimeFrequency && level_2 {
                self.apply_level_2_frequency(&mut resolution);
                continue;
            }
            for value in self.values_for(facet, raw) {
                self.resolve_value(facet, &value, &mut resolution);
            }
        }
        resolution
    }

    /// The raw values to look up for one facet, after overrides, defaults,
    /// multi-value splitting, and mappings.
    fn values_for(&self, facet: FacetKind, raw: &RawFacetSet) -> Vec<String> {
        // override values are canonical already; the mapping table applies
        // only to extracted and defaulted values
        if let Some(values) = self.config.and_then(|config| config.override_values(facet)) {
            return values
                .iter()
                .filter(|value| !value.is_empty() && !value.eq_ignore_ascii_case("N/A"))
                .cloned()
                .collect();
        }
        let extracted: Vec<String> = match raw.get(facet) {
            Some(value) if facet == FacetKind::PlatformId => split_platform_values(value),
            Some(value)
                if matches!(
                    facet,
                    FacetKind::SensorId | FacetKind::Institute | FacetKind::TimeFrequency
                ) =>
            {
                split_values(value)
            }
            Some(value) => vec![value.to_string()],
            None => self
                .config
                .and_then(|config| config.default_for(facet))
                .map(|value| vec![value.to_string()])
                .unwrap_or_default(),
        };
        extracted
            .iter()
            .map(|value| self.mapped(facet, value))
            .filter(|value| !value.is_empty() && !value.eq_ignore_ascii_case("N/A"))
            .collect()
    }

    fn mapped(&self, facet: FacetKind, value: &str) -> String {
        self.config
            .map_or(value, |config| config.map_value(facet, value))
            .to_string()
    }

    fn resolve_value(&self, facet: FacetKind, value: &str, resolution: &mut Resolution) {
        // product_version has no controlled vocabulary
        if facet == FacetKind::ProductVersion {
            resolution.push_label(facet, value);
            return;
        }

        let mut concepts = self.vocabulary.lookup(facet, value);
        if concepts.is_empty() && facet == FacetKind::PlatformId {
            // some files name a programme or group where a platform is
            // expected; tag at that broader level instead
            concepts = self.vocabulary.lookup(FacetKind::PlatformProgramme, value);
            if concepts.is_empty() {
                concepts = self.vocabulary.lookup(FacetKind::PlatformGroup, value);
            }
        }
        if concepts.is_empty() {
            resolution
                .diagnostics
                .insert(not_found_message(value, facet));
            return;
        }
        if facet.is_single_valued() && concepts.len() > 1 {
            resolution
                .diagnostics
                .insert(ambiguity_message(value, facet));
            concepts.truncate(1);
        }

        for concept in concepts {
            resolution.uris.add(facet, concept.uri.clone());
            let label = self
                .vocabulary
                .label_for_uri(facet, &concept.uri)
                .unwrap_or(concept.label);
            resolution.push_label(facet, label);
            match facet {
                FacetKind::ProcessingLevel => self.broaden_level(&concept.uri, resolution),
                FacetKind::PlatformId => self.broaden_platform(&concept.uri, resolution),
                _ => {}
            }
        }
    }

    fn broaden_level(&self, level_uri: &str, resolution: &mut Resolution) {
        let Some(broader) = self.vocabulary.broader_processing_level(level_uri) else {
            return;
        };
        let broader = broader.to_string();
        if let Some(label) = self
            .vocabulary
            .label_for_uri(FacetKind::BroaderProcessingLevel, &broader)
        {
            resolution.push_label(FacetKind::BroaderProcessingLevel, label);
        }
        resolution
            .uris
            .add(FacetKind::BroaderProcessingLevel, broader);
    }

    fn broaden_platform(&self, platform_uri: &str, resolution: &mut Resolution) {
        let Some(programme) = self.vocabulary.platform_programme(platform_uri) else {
            return;
        };
        let programme = programme.to_string();
        resolution.push_label(FacetKind::PlatformProgramme, programme.clone());
        let Some(programme_concept) = self
            .vocabulary
            .lookup(FacetKind::PlatformProgramme, &programme)
            .into_iter()
            .next()
        else {
            return;
        };
        resolution
            .uris
            .add(FacetKind::PlatformProgramme, programme_concept.uri.clone());
        if let Some(group) = self.vocabulary.programme_group(&programme_concept.uri) {
            let group = group.to_string();
            resolution.push_label(FacetKind::PlatformGroup, group.clone());
            if let Some(group_concept) = self
                .vocabulary
                .lookup(FacetKind::PlatformGroup, &group)
                .into_iter()
                .next()
            {
                resolution
                    .uris
                    .add(FacetKind::PlatformGroup, group_concept.uri);
            }
        }
    }

    fn apply_level_2_frequency(&self, resolution: &mut Resolution) {
        resolution
            .uris
            .add(FacetKind::TimeFrequency, LEVEL_2_FREQUENCY_URI);
        let label = self
            .vocabulary
            .label_for_uri(FacetKind::TimeFrequency, LEVEL_2_FREQUENCY_URI)
            .unwrap_or_else(|| LEVEL_2_FREQUENCY_LABEL.to_string());
        resolution.push_label(FacetKind::TimeFrequency, label);
    }
}
