//! Data Reference Syntax (DRS) identity.
//!
//! A DRS identifier is an ordered, `.`-delimited tuple:
//!
//! ```text
//! esacci.<cci_project>.<time_frequency>.<processing_level>.<data_type>
//!       .<sensor_id>.<platform_id>.<product_string>.<product_version>
//!       .r<realization>.v<version>
//! ```
//!
//! `realization` disambiguates datasets whose other components are identical;
//! `version` is the date the identifier was built (YYYYMMDD) and is excluded
//! from realization matching.

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::facet::FacetKind;

/// Constant leading project component.
pub const DRS_PROJECT: &str = "esacci";

/// The facets that supply DRS components, in component order.
pub const DRS_FACETS: &[FacetKind] = &[
    FacetKind::CciProject,
    FacetKind::TimeFrequency,
    FacetKind::ProcessingLevel,
    FacetKind::DataType,
    FacetKind::SensorId,
    FacetKind::PlatformId,
    FacetKind::ProductString,
    FacetKind::ProductVersion,
];

/// The label components of a DRS identifier, realization and version
/// excluded. All components are required; the identity builder reports the
/// missing facet instead of constructing a partial tuple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrsComponents {
    pub cci_project: String,
    pub time_frequency: String,
    pub processing_level: String,
    pub data_type: String,
    pub sensor_id: String,
    pub platform_id: String,
    pub product_string: String,
    pub product_version: String,
}

impl DrsComponents {
    /// Build from per-facet labels, failing on the first missing DRS facet.
    pub fn from_labels<'a, F>(mut label: F) -> Result<Self, ModelError>
    where
        F: FnMut(FacetKind) -> Option<&'a str>,
    {
        let mut require = |kind: FacetKind| -> Result<String, ModelError> {
            label(kind)
                .filter(|value| !value.is_empty())
                .map(|value| sanitize_component(kind, value))
                .ok_or(ModelError::MissingDrsComponent { facet: kind })
        };
        Ok(Self {
            cci_project: require(FacetKind::CciProject)?,
            time_frequency: require(FacetKind::TimeFrequency)?,
            processing_level: require(FacetKind::ProcessingLevel)?,
            data_type: require(FacetKind::DataType)?,
            sensor_id: require(FacetKind::SensorId)?,
            platform_id: require(FacetKind::PlatformId)?,
            product_string: require(FacetKind::ProductString)?,
            product_version: require(FacetKind::ProductVersion)?,
        })
    }

    fn ordered(&self) -> [&str; 8] {
        [
            &self.cci_project,
            &self.time_frequency,
            &self.processing_level,
            &self.data_type,
            &self.sensor_id,
            &self.platform_id,
            &self.product_string,
            &self.product_version,
        ]
    }
}

/// A complete DRS identity for one dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrsIdentity {
    pub components: DrsComponents,
    /// Integer disambiguator, starting at 1.
    pub realization: u32,
    /// Build date, YYYYMMDD.
    pub version: String,
}

impl DrsIdentity {
    /// Create an identity with today's date as the version component.
    pub fn new(components: DrsComponents, realization: u32) -> Self {
        Self {
            components,
            realization,
            version: version_today(),
        }
    }

    /// Render the full identifier string.
    pub fn render(&self) -> String {
        format!("{}.v{}", self.render_unversioned(), self.version)
    }

    /// Render without the trailing version component. This is the string
    /// compared during realization matching.
    pub fn render_unversioned(&self) -> String {
        let mut id = String::from(DRS_PROJECT);
        for component in self.components.ordered() {
            id.push('.');
            id.push_str(component);
        }
        id.push_str(&format!(".r{}", self.realization));
        id
    }
}

impl std::fmt::Display for DrsIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

/// Today's date in DRS version form.
pub fn version_today() -> String {
    Local::now().format("%Y%m%d").to_string()
}

/// Sanitize a label for use as a DRS component: `.` and spaces become `-`,
/// and frequency labels are abbreviated (`month` to `mon`, `year` to `yr`).
pub fn sanitize_component(kind: FacetKind, label: &str) -> String {
    let mut value = label.replace(['.', ' '], "-");
    if kind == FacetKind::TimeFrequency {
        value = value.replace("month", "mon").replace("year", "yr");
    }
    value
}

/// Strip the trailing `.v<digits>` version component from a rendered DRS
/// string, returning the realization-comparable prefix. Strings without a
/// version suffix are returned unchanged.
pub fn strip_version(drs: &str) -> &str {
    if let Some((prefix, tail)) = drs.rsplit_once(".v")
        && !tail.is_empty()
        && tail.bytes().all(|b| b.is_ascii_digit())
    {
        return prefix;
    }
    drs
}

/// Parse the realization back out of a rendered DRS string.
pub fn parse_realization(drs: &str) -> Option<u32> {
    strip_version(drs)
        .rsplit('.')
        .next()
        .and_then(|token| token.strip_prefix('r'))
        .and_then(|digits| digits.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn components() -> DrsComponents {
        DrsComponents {
            cci_project: "aerosol".into(),
            time_frequency: "mon".into(),
            processing_level: "L3".into(),
            data_type: "AOD".into(),
            sensor_id: "AATSR".into(),
            platform_id: "Envisat".into(),
            product_string: "SU".into(),
            product_version: "4-21".into(),
        }
    }

    #[test]
    fn render_includes_all_components_in_order() {
        let identity = DrsIdentity {
            components: components(),
            realization: 1,
            version: "20260830".into(),
        };
        assert_eq!(
            identity.render(),
            "esacci.aerosol.mon.L3.AOD.AATSR.Envisat.SU.4-21.r1.v20260830"
        );
    }

    #[test]
    fn realization_round_trips_through_rendering() {
        for realization in [1, 2, 17] {
            let identity = DrsIdentity::new(components(), realization);
            assert_eq!(parse_realization(&identity.render()), Some(realization));
        }
    }

    #[test]
    fn strip_version_only_removes_date_suffix() {
        assert_eq!(strip_version("esacci.x.r1.v20260830"), "esacci.x.r1");
        // product versions like v4-21 are not date suffixes
        assert_eq!(strip_version("esacci.x.v4-21.r1"), "esacci.x.v4-21.r1");
        assert_eq!(strip_version("esacci.x.r1"), "esacci.x.r1");
    }

    #[test]
    fn sanitize_rewrites_dots_spaces_and_frequency_words() {
        assert_eq!(
            sanitize_component(FacetKind::ProductVersion, "1.0"),
            "1-0"
        );
        assert_eq!(
            sanitize_component(FacetKind::SensorId, "multi sensor"),
            "multi-sensor"
        );
        assert_eq!(
            sanitize_component(FacetKind::TimeFrequency, "month"),
            "mon"
        );
        assert_eq!(sanitize_component(FacetKind::TimeFrequency, "year"), "yr");
    }

    #[test]
    fn missing_component_names_the_facet() {
        let error = DrsComponents::from_labels(|kind| {
            (kind != FacetKind::SensorId).then_some("x")
        })
        .unwrap_err();
        match error {
            ModelError::MissingDrsComponent { facet } => {
                assert_eq!(facet, FacetKind::SensorId);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
