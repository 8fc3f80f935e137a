//! Persistent realization registry.
//!
//! The registry maps dataset paths to their most recently generated DRS
//! identifier. It is grow-only: paths are never removed, so a realization
//! assigned once stays assigned across runs. Persistence is a flat JSON
//! object, human-diffable.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CoreError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealizationRegistry {
    entries: BTreeMap<String, String>,
}

impl RealizationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the registry file, or start empty when it does not exist yet.
    pub fn load_or_default(path: &Path) -> Result<Self, CoreError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no registry file, starting empty");
                return Ok(Self::new());
            }
            Err(source) => {
                return Err(CoreError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        serde_json::from_str(&text).map_err(|source| CoreError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), CoreError> {
        let data =
            serde_json::to_string_pretty(&self).map_err(|source| CoreError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        std::fs::write(path, data).map_err(|source| CoreError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The stored DRS string for a dataset path.
    pub fn get(&self, dataset_path: &str) -> Option<&str> {
        self.entries.get(dataset_path).map(String::as_str)
    }

    pub fn insert(&mut self, dataset_path: &str, drs: String) {
        self.entries.insert(dataset_path.to_string(), drs);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(path, drs)| (path.as_str(), drs.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.json");

        let mut registry = RealizationRegistry::new();
        registry.insert("/ds/a", "esacci.a.r1.v20260830".to_string());
        registry.insert("/ds/b", "esacci.b.r2.v20260830".to_string());
        registry.save(&path).unwrap();

        let loaded = RealizationRegistry::load_or_default(&path).unwrap();
        assert_eq!(loaded, registry);
    }

    #[test]
    fn missing_file_starts_empty() {
        let registry =
            RealizationRegistry::load_or_default(Path::new("/no/such/registry.json")).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn corrupt_file_is_a_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.json");
        std::fs::write(&path, "[not an object]").unwrap();
        let result = RealizationRegistry::load_or_default(&path);
        assert!(matches!(result, Err(CoreError::Json { .. })));
    }
}
