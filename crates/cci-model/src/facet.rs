//! Facet kinds and the raw/resolved facet sets that flow through the tagger.
//!
//! Facets are modelled as a closed enum with an explicit capability table
//! (single-value vs multi-value, filename-sourced vs attribute-sourced, DRS
//! participation) rather than free-form string keys. This keeps the identity
//! builder type-safe: a typo in a facet name is a compile error, not a
//! silently empty lookup.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// A named metadata dimension with a controlled vocabulary of allowed values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacetKind {
    /// Processing level token from the filename (e.g., "L4").
    ProcessingLevel,
    /// CCI project / essential climate variable token (e.g., "AEROSOL").
    CciProject,
    /// Data type token (e.g., "MERGED", "AOD").
    DataType,
    /// Product string token (e.g., "100m").
    ProductString,
    /// Optional additional segregator token from the filename.
    Segregator,
    /// Optional GDS version token (the `v<digits>` before `fv`).
    GdsVersion,
    /// File version from the `fv` token.
    FileVersion,
    /// Indicative date (with optional time) from the filename.
    IndicativeDate,
    /// Time frequency from the `time_coverage_resolution` attribute.
    TimeFrequency,
    /// Sensor identifier(s) from the `sensor` attribute.
    SensorId,
    /// Platform identifier(s) from the `platform` attribute.
    PlatformId,
    /// Product version from the `product_version` attribute. No vocabulary.
    ProductVersion,
    /// Institute from the `institution` attribute.
    Institute,
    /// Broader processing level derived from the processing level concept.
    BroaderProcessingLevel,
    /// Platform programme derived from a platform concept.
    PlatformProgramme,
    /// Platform group derived from a platform programme concept.
    PlatformGroup,
}

impl FacetKind {
    /// Canonical facet name used in diagnostics and serialized output.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ProcessingLevel => "processing_level",
            Self::CciProject => "cci_project",
            Self::DataType => "data_type",
            Self::ProductString => "product_string",
            Self::Segregator => "segregator",
            Self::GdsVersion => "gds_version",
            Self::FileVersion => "file_version",
            Self::IndicativeDate => "indicative_date",
            Self::TimeFrequency => "time_frequency",
            Self::SensorId => "sensor_id",
            Self::PlatformId => "platform_id",
            Self::ProductVersion => "product_version",
            Self::Institute => "institute",
            Self::BroaderProcessingLevel => "broader_processing_level",
            Self::PlatformProgramme => "platform_programme",
            Self::PlatformGroup => "platform_group",
        }
    }

    /// Parse a canonical facet name.
    pub fn from_name(name: &str) -> Result<Self, ModelError> {
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| ModelError::UnknownFacet {
                name: name.to_string(),
            })
    }

    /// Every facet kind, in declaration order.
    pub const fn all() -> &'static [FacetKind] {
        &[
            Self::ProcessingLevel,
            Self::CciProject,
            Self::DataType,
            Self::ProductString,
            Self::Segregator,
            Self::GdsVersion,
            Self::FileVersion,
            Self::IndicativeDate,
            Self::TimeFrequency,
            Self::SensorId,
            Self::PlatformId,
            Self::ProductVersion,
            Self::Institute,
            Self::BroaderProcessingLevel,
            Self::PlatformProgramme,
            Self::PlatformGroup,
        ]
    }

    /// Facets extracted from global file attributes, in extraction order.
    pub const fn attribute_facets() -> &'static [FacetKind] {
        &[
            Self::TimeFrequency,
            Self::SensorId,
            Self::PlatformId,
            Self::ProductVersion,
            Self::Institute,
        ]
    }

    /// Facets resolved through the vocabulary from filename tokens.
    pub const fn filename_vocab_facets() -> &'static [FacetKind] {
        &[
            Self::ProcessingLevel,
            Self::CciProject,
            Self::DataType,
            Self::ProductString,
        ]
    }

    /// Facets whose URIs are written to the MOLES tags CSV.
    pub const fn moles_facets() -> &'static [FacetKind] {
        &[
            Self::BroaderProcessingLevel,
            Self::DataType,
            Self::CciProject,
            Self::ProcessingLevel,
            Self::ProductString,
            Self::TimeFrequency,
            Self::Institute,
            Self::PlatformId,
            Self::SensorId,
        ]
    }

    /// The global attribute name this facet is read from, when
    /// attribute-sourced.
    pub const fn attribute_name(&self) -> Option<&'static str> {
        match self {
            Self::TimeFrequency => Some("time_coverage_resolution"),
            Self::SensorId => Some("sensor"),
            Self::PlatformId => Some("platform"),
            Self::ProductVersion => Some("product_version"),
            Self::Institute => Some("institution"),
            _ => None,
        }
    }

    /// True when at most one resolved value is expected. A multi-hit on a
    /// single-value facet is an ambiguity, reported but not fatal.
    pub const fn is_single_valued(&self) -> bool {
        matches!(
            self,
            Self::ProcessingLevel
                | Self::BroaderProcessingLevel
                | Self::CciProject
                | Self::DataType
                | Self::ProductString
                | Self::ProductVersion
        )
    }

    /// The DRS label substituted when a multi-value DRS facet resolved to
    /// more than one concept.
    pub const fn multi_label(&self) -> Option<&'static str> {
        match self {
            Self::TimeFrequency => Some("multi-frequency"),
            Self::SensorId => Some("multi-sensor"),
            Self::PlatformId => Some("multi-platform"),
            _ => None,
        }
    }
}

impl std::fmt::Display for FacetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A canonical vocabulary concept: URI plus its display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
    pub uri: String,
    pub label: String,
}

impl Concept {
    pub fn new(uri: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            label: label.into(),
        }
    }
}

/// Raw facet tokens for one file, before any vocabulary resolution.
///
/// Built once from the filename parse merged with the attribute extraction
/// output, then treated as immutable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFacetSet {
    values: BTreeMap<FacetKind, String>,
}

impl RawFacetSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: FacetKind, value: impl Into<String>) {
        self.values.insert(kind, value.into());
    }

    pub fn get(&self, kind: FacetKind) -> Option<&str> {
        self.values.get(&kind).map(String::as_str)
    }

    /// Merge `other` into `self`; values from `other` win on conflict.
    pub fn merge(&mut self, other: RawFacetSet) {
        self.values.extend(other.values);
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FacetKind, &str)> {
        self.values.iter().map(|(kind, value)| (*kind, value.as_str()))
    }
}

impl FromIterator<(FacetKind, String)> for RawFacetSet {
    fn from_iter<T: IntoIterator<Item = (FacetKind, String)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Resolved vocabulary URIs per facet.
///
/// A facet key is absent when no value resolved; zero-result lookups are
/// recorded in the not-found diagnostic set instead, never silently dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedFacetSet {
    uris: BTreeMap<FacetKind, Vec<String>>,
}

impl ResolvedFacetSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a URI for a facet, keeping insertion order and dropping
    /// duplicates.
    pub fn add(&mut self, kind: FacetKind, uri: impl Into<String>) {
        let uri = uri.into();
        let entry = self.uris.entry(kind).or_default();
        if !entry.contains(&uri) {
            entry.push(uri);
        }
    }

    pub fn get(&self, kind: FacetKind) -> Option<&[String]> {
        self.uris.get(&kind).map(Vec::as_slice)
    }

    /// Union another resolved set into this one. Used to aggregate member
    /// files into a per-dataset set: any member may contribute a new value.
    pub fn union(&mut self, other: &ResolvedFacetSet) {
        for (kind, uris) in &other.uris {
            for uri in uris {
                self.add(*kind, uri.clone());
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.uris.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FacetKind, &[String])> {
        self.uris.iter().map(|(kind, uris)| (*kind, uris.as_slice()))
    }
}

/// The diagnostic message recorded when a raw value fails vocabulary
/// resolution. One message per (value, facet) pair; the orchestrator
/// deduplicates across files by collecting into a set.
pub fn not_found_message(value: &str, facet: FacetKind) -> String {
    format!("\"{value}\" not found for facet \"{facet}\"")
}

/// Diagnostic for a single-value facet that matched more than one concept.
pub fn ambiguity_message(value: &str, facet: FacetKind) -> String {
    format!("ambiguous value \"{value}\" for facet \"{facet}\"")
}

/// Result of tagging one file or dataset: the generated DRS identifier (when
/// all components were identifiable), human-readable labels, and the raw URI
/// bag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaggedDataset {
    /// Rendered DRS identifier, absent when a required component was missing.
    pub drs: Option<String>,
    /// Resolved display labels per facet.
    pub labels: BTreeMap<FacetKind, Vec<String>>,
    /// Resolved vocabulary URIs per facet.
    pub uris: ResolvedFacetSet,
}
