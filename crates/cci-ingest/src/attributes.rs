//! Global attribute extraction.
//!
//! netCDF access stays behind the [`AttributeSource`] trait so the tagging
//! pipeline never depends on a netCDF binding directly. The shipped
//! implementation reads a `<file>.attrs.json` sidecar holding the global
//! attributes as a flat string map. A missing sidecar is not an error (the
//! file simply contributes no attribute facets); an unreadable or malformed
//! one is, and the caller skips the file.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use cci_model::{FacetKind, RawFacetSet};

use crate::error::IngestError;

/// Source of per-file global attributes.
pub trait AttributeSource {
    fn read_global_attributes(&self, path: &Path)
    -> Result<BTreeMap<String, String>, IngestError>;
}

/// Reads global attributes from a JSON sidecar next to the data file.
#[derive(Debug, Clone, Copy, Default)]
pub struct SidecarAttributeSource;

impl SidecarAttributeSource {
    fn sidecar_path(path: &Path) -> PathBuf {
        let mut name = OsString::from(path.as_os_str());
        name.push(".attrs.json");
        PathBuf::from(name)
    }
}

impl AttributeSource for SidecarAttributeSource {
    fn read_global_attributes(
        &self,
        path: &Path,
    ) -> Result<BTreeMap<String, String>, IngestError> {
        let sidecar = Self::sidecar_path(path);
        let text = match std::fs::read_to_string(&sidecar) {
            Ok(text) => text,
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                return Ok(BTreeMap::new());
            }
            Err(source) => {
                return Err(IngestError::Io {
                    path: sidecar,
                    source,
                });
            }
        };
        serde_json::from_str(&text).map_err(|source| IngestError::AttributeExtraction {
            path: path.to_path_buf(),
            message: format!("invalid sidecar {}: {source}", sidecar.display()),
        })
    }
}

/// Project the attribute map onto the attribute-sourced facets.
pub fn attribute_facet_set(attributes: &BTreeMap<String, String>) -> RawFacetSet {
    let mut facets = RawFacetSet::new();
    for kind in FacetKind::attribute_facets() {
        let Some(name) = kind.attribute_name() else {
            continue;
        };
        if let Some(value) = attributes.get(name) {
            let value = value.trim();
            if !value.is_empty() {
                facets.insert(*kind, value);
            }
        }
    }
    facets
}

/// Split a multi-valued attribute into individual raw values. `N/A` entries
/// are dropped.
pub fn split_values(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty() && !value.eq_ignore_ascii_case("N/A"))
        .map(String::from)
        .collect()
}

/// Split a platform attribute. Values using the `<a,b>` shorthand carry
/// commas of their own, so the outer delimiter becomes `", "`; each entry is
/// then expanded, `ERS-<1,2>` becoming `ERS-1` and `ERS-2`.
pub fn split_platform_values(raw: &str) -> Vec<String> {
    let parts: Vec<&str> = if raw.contains('<') {
        raw.split(", ").collect()
    } else {
        raw.split(',').collect()
    };
    let mut values = Vec::new();
    for part in parts {
        let part = part.trim();
        if part.is_empty() || part.eq_ignore_ascii_case("N/A") {
            continue;
        }
        match expand_multiplatform(part) {
            Some(expanded) => values.extend(expanded),
            None => values.push(part.to_string()),
        }
    }
    values
}

fn expand_multiplatform(value: &str) -> Option<Vec<String>> {
    let (prefix, rest) = value.split_once("-<")?;
    let inner = rest.strip_suffix('>')?;
    Some(
        inner
            .split(',')
            .map(|item| format!("{prefix}-{}", item.trim()))
            .collect(),
    )
}
