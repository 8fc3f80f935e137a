//! Per-dataset JSON configuration.
//!
//! Each JSON file in the config store declares the dataset paths it covers
//! plus facet `defaults` (applied when a facet is absent), `mappings`
//! (raw token rewrites applied before vocabulary lookup), `overrides`
//! (values that replace whatever was extracted), and `realisations` (fixed
//! realization numbers for specific dataset paths).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use cci_model::FacetKind;
use cci_vocab::Vocabulary;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::IngestError;

/// One or many override values for a facet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValueList {
    One(String),
    Many(Vec<String>),
}

impl ValueList {
    pub fn as_slice(&self) -> &[String] {
        match self {
            Self::One(value) => std::slice::from_ref(value),
            Self::Many(values) => values,
        }
    }
}

/// The contents of a single dataset config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Dataset paths this config applies to, matched by longest prefix.
    pub datasets: Vec<String>,
    /// Facet values used when neither the filename nor the attributes
    /// provided one.
    pub defaults: BTreeMap<FacetKind, String>,
    /// Raw-token rewrites, keyed by lower-cased source token.
    pub mappings: BTreeMap<FacetKind, BTreeMap<String, String>>,
    /// Facet values that replace the extracted ones outright.
    pub overrides: BTreeMap<FacetKind, ValueList>,
    /// Fixed realization numbers per dataset path.
    pub realisations: BTreeMap<String, u32>,
}

impl DatasetConfig {
    /// Apply the lower-cased mapping table to a raw token, falling back to
    /// the token itself.
    pub fn map_value<'a>(&'a self, facet: FacetKind, raw: &'a str) -> &'a str {
        self.mappings
            .get(&facet)
            .and_then(|table| table.get(&raw.to_lowercase()))
            .map_or(raw, String::as_str)
    }

    pub fn default_for(&self, facet: FacetKind) -> Option<&str> {
        self.defaults.get(&facet).map(String::as_str)
    }

    pub fn override_values(&self, facet: FacetKind) -> Option<&[String]> {
        self.overrides.get(&facet).map(ValueList::as_slice)
    }
}

/// All dataset configs found in the config store directory.
#[derive(Debug, Default)]
pub struct DatasetConfigs {
    entries: Vec<(PathBuf, DatasetConfig)>,
}

impl DatasetConfigs {
    /// Load every `.json` file in `dir`, in sorted order. An empty or
    /// missing directory yields an empty store.
    pub fn load_dir(dir: &Path) -> Result<Self, IngestError> {
        let mut entries = Vec::new();
        if !dir.is_dir() {
            debug!(dir = %dir.display(), "no dataset config directory");
            return Ok(Self { entries });
        }
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
            .map_err(|source| IngestError::Io {
                path: dir.to_path_buf(),
                source,
            })?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();
        for path in paths {
            let config = Self::load_file(&path)?;
            entries.push((path, config));
        }
        debug!(configs = entries.len(), "loaded dataset configs");
        Ok(Self { entries })
    }

    pub fn load_file(path: &Path) -> Result<DatasetConfig, IngestError> {
        let text = std::fs::read_to_string(path).map_err(|source| IngestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| IngestError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The config covering a dataset path, by longest declared-path prefix.
    pub fn config_for(&self, dataset_path: &str) -> Option<&DatasetConfig> {
        let mut best: Option<(usize, &DatasetConfig)> = None;
        for (_, config) in &self.entries {
            for declared in &config.datasets {
                let matches = dataset_path == declared
                    || dataset_path.starts_with(&format!("{declared}/"));
                if matches && best.is_none_or(|(len, _)| declared.len() > len) {
                    best = Some((declared.len(), config));
                }
            }
        }
        best.map(|(_, config)| config)
    }

    /// A fixed realization declared for this exact dataset path, if any.
    pub fn fixed_realization(&self, dataset_path: &str) -> Option<u32> {
        self.config_for(dataset_path)
            .and_then(|config| config.realisations.get(dataset_path).copied())
    }

    /// Check every configured default against the vocabulary's allowed
    /// labels. Facets without a vocabulary scheme are not checked. The first
    /// offending value is fatal.
    pub fn validate_defaults(&self, vocabulary: &Vocabulary) -> Result<(), IngestError> {
        for (file, config) in &self.entries {
            for (facet, value) in &config.defaults {
                if !vocabulary.has_scheme(*facet) {
                    continue;
                }
                if vocabulary.lookup(*facet, value).is_empty() {
                    let allowed = vocabulary
                        .allowed_labels(*facet)
                        .into_iter()
                        .collect::<Vec<_>>()
                        .join(", ");
                    return Err(IngestError::ConfigValidation {
                        value: value.clone(),
                        file: file.clone(),
                        facet: *facet,
                        allowed,
                    });
                }
            }
        }
        Ok(())
    }

    /// Every dataset path declared across the loaded config files.
    pub fn declared_datasets(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .flat_map(|(_, config)| config.datasets.iter().map(String::as_str))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
