//! DRS identity construction and realization assignment.

use cci_model::{
    DrsComponents, DrsIdentity, FacetKind, ModelError, parse_realization, strip_version,
};
use tracing::debug;

use crate::error::CoreError;
use crate::registry::RealizationRegistry;
use crate::resolver::Resolution;

/// The DRS component label for a facet, given the dataset's aggregated
/// labels. Multi-valued attribute facets collapse to their `multi-*` label;
/// other facets take their first resolved value.
fn component_label(facet: FacetKind, labels: &[String]) -> Option<&str> {
    match labels {
        [] => None,
        [single] => Some(single),
        _ => facet.multi_label().or(labels.first().map(String::as_str)),
    }
}

/// Build the DRS component tuple from a dataset's aggregated resolution.
/// Fails with the first missing facet; the dataset is then non-identifiable.
pub fn components_from(resolution: &Resolution) -> Result<DrsComponents, ModelError> {
    DrsComponents::from_labels(|facet| component_label(facet, resolution.label_values(facet)))
}

/// Assigns realizations and renders DRS identities against the registry.
pub struct IdentityBuilder;

impl IdentityBuilder {
    /// Build the identity for a dataset path.
    ///
    /// A path already in the registry keeps its realization. A new path
    /// takes its configured fixed realization when one exists, otherwise the
    /// lowest realization whose unversioned rendering collides with no other
    /// registered path. The chosen identity is registered before returning,
    /// so the read-and-write is one atomic step from the caller's view.
    pub fn build(
        components: DrsComponents,
        dataset_path: &str,
        fixed_realization: Option<u32>,
        registry: &mut RealizationRegistry,
    ) -> Result<DrsIdentity, CoreError> {
        if let Some(stored) = registry.get(dataset_path) {
            let realization =
                parse_realization(stored).ok_or_else(|| CoreError::RegistryConsistency {
                    dataset: dataset_path.to_string(),
                    message: format!("stored DRS has no realization: {stored}"),
                })?;
            let identity = DrsIdentity::new(components, realization);
            debug!(dataset = dataset_path, realization, "reusing registered realization");
            registry.insert(dataset_path, identity.render());
            return Ok(identity);
        }

        if let Some(realization) = fixed_realization {
            let identity = DrsIdentity::new(components, realization);
            registry.insert(dataset_path, identity.render());
            return Ok(identity);
        }

        // at most len(registry) renderings can collide, so a realization
        // beyond len+1 means the registry lied to us
        let limit = u32::try_from(registry.len()).unwrap_or(u32::MAX).saturating_add(1);
        for realization in 1..=limit {
            let identity = DrsIdentity::new(components.clone(), realization);
            let candidate = identity.render_unversioned();
            let clash = registry.iter().any(|(path, drs)| {
                path != dataset_path && strip_version(drs) == candidate
            });
            if !clash {
                registry.insert(dataset_path, identity.render());
                return Ok(identity);
            }
        }
        Err(CoreError::RegistryConsistency {
            dataset: dataset_path.to_string(),
            message: "no free realization below the registry size".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn components(project: &str) -> DrsComponents {
        DrsComponents {
            cci_project: project.to_string(),
            time_frequency: "day".to_string(),
            processing_level: "L3".to_string(),
            data_type: "AOD".to_string(),
            sensor_id: "AATSR".to_string(),
            platform_id: "Envisat".to_string(),
            product_string: "SU".to_string(),
            product_version: "4-21".to_string(),
        }
    }

    #[test]
    fn first_dataset_gets_realization_one() {
        let mut registry = RealizationRegistry::new();
        let identity =
            IdentityBuilder::build(components("aerosol"), "/ds/a", None, &mut registry).unwrap();
        assert_eq!(identity.realization, 1);
        assert!(registry.get("/ds/a").is_some());
    }

    #[test]
    fn identical_components_get_increasing_realizations() {
        let mut registry = RealizationRegistry::new();
        for (path, expected) in [("/ds/a", 1), ("/ds/b", 2), ("/ds/c", 3)] {
            let identity =
                IdentityBuilder::build(components("aerosol"), path, None, &mut registry)
                    .unwrap();
            assert_eq!(identity.realization, expected, "{path}");
        }
    }

    #[test]
    fn known_path_reuses_its_realization() {
        let mut registry = RealizationRegistry::new();
        IdentityBuilder::build(components("aerosol"), "/ds/a", None, &mut registry).unwrap();
        IdentityBuilder::build(components("aerosol"), "/ds/b", None, &mut registry).unwrap();
        // /ds/b again, components unchanged: same realization, no growth
        let again =
            IdentityBuilder::build(components("aerosol"), "/ds/b", None, &mut registry).unwrap();
        assert_eq!(again.realization, 2);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn different_components_do_not_collide() {
        let mut registry = RealizationRegistry::new();
        IdentityBuilder::build(components("aerosol"), "/ds/a", None, &mut registry).unwrap();
        let other =
            IdentityBuilder::build(components("cloud"), "/ds/b", None, &mut registry).unwrap();
        assert_eq!(other.realization, 1);
    }

    #[test]
    fn fixed_realization_wins_for_new_paths() {
        let mut registry = RealizationRegistry::new();
        let identity =
            IdentityBuilder::build(components("aerosol"), "/ds/a", Some(7), &mut registry)
                .unwrap();
        assert_eq!(identity.realization, 7);
    }

    #[test]
    fn corrupt_registry_entry_is_a_consistency_error() {
        let mut registry = RealizationRegistry::new();
        registry.insert("/ds/a", "not a drs string".to_string());
        let result = IdentityBuilder::build(components("aerosol"), "/ds/a", None, &mut registry);
        assert!(matches!(
            result,
            Err(CoreError::RegistryConsistency { .. })
        ));
    }

    #[test]
    fn multi_valued_attribute_facets_collapse() {
        let labels = vec!["AATSR".to_string(), "MERIS".to_string()];
        assert_eq!(
            component_label(FacetKind::SensorId, &labels),
            Some("multi-sensor")
        );
        assert_eq!(
            component_label(FacetKind::ProductString, &labels),
            Some("AATSR")
        );
        assert_eq!(component_label(FacetKind::SensorId, &[]), None);
    }
}
