//! The dataset orchestrator: discovery, per-file resolution, aggregation,
//! identity assignment, and run bookkeeping.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::time::UNIX_EPOCH;

use cci_ingest::{
    AttributeSource, DatasetConfigs, attribute_facet_set, discover_files, parse_filename,
};
use cci_model::{ResolvedFacetSet, TaggedDataset};
use cci_vocab::Vocabulary;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, info_span, warn};

use crate::error::CoreError;
use crate::identity::{IdentityBuilder, components_from};
use crate::registry::RealizationRegistry;
use crate::resolver::{FacetResolver, Resolution};

/// Per-run processing options.
#[derive(Debug, Clone, Copy)]
pub struct TagOptions {
    /// Cap on member files per dataset; `None` means unlimited.
    pub max_file_count: Option<usize>,
    /// Record SHA-256, size, and mtime per member file.
    pub checksums: bool,
}

impl Default for TagOptions {
    fn default() -> Self {
        Self {
            max_file_count: None,
            checksums: true,
        }
    }
}

/// One member file in the DRS mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mtime: Option<f64>,
}

/// Everything a run produced, ready for the report writers.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub datasets_processed: usize,
    pub failures: usize,
    /// DRS identifier -> member files.
    pub drs: BTreeMap<String, Vec<FileRecord>>,
    /// Dataset path -> resolved vocabulary URIs, for the MOLES tags CSV.
    pub dataset_uris: BTreeMap<String, ResolvedFacetSet>,
    /// Deduplicated resolution diagnostics across all datasets.
    pub not_found: BTreeSet<String>,
}

/// Tags datasets against one vocabulary, config store, and registry.
pub struct DatasetTagger<'a, A: AttributeSource> {
    vocabulary: &'a Vocabulary,
    configs: &'a DatasetConfigs,
    attributes: &'a A,
    registry: RealizationRegistry,
    options: TagOptions,
}

impl<'a, A: AttributeSource> DatasetTagger<'a, A> {
    pub fn new(
        vocabulary: &'a Vocabulary,
        configs: &'a DatasetConfigs,
        attributes: &'a A,
        registry: RealizationRegistry,
        options: TagOptions,
    ) -> Self {
        Self {
            vocabulary,
            configs,
            attributes,
            registry,
            options,
        }
    }

    /// Process every dataset path in sorted order. Individual dataset
    /// failures are counted and logged, never fatal to the run.
    pub fn process(&mut self, dataset_paths: &[String]) -> RunSummary {
        let mut paths: Vec<&String> = dataset_paths.iter().collect();
        paths.sort();
        paths.dedup();

        let mut summary = RunSummary::default();
        for dataset in paths {
            let span = info_span!("dataset", path = %dataset);
            let _guard = span.enter();
            summary.datasets_processed += 1;
            if let Err(error) = self.process_dataset(dataset, &mut summary) {
                warn!(%error, "dataset failed");
                summary.failures += 1;
            }
        }
        info!(
            datasets = summary.datasets_processed,
            failures = summary.failures,
            drs = summary.drs.len(),
            "run complete"
        );
        summary
    }

    fn process_dataset(
        &mut self,
        dataset: &str,
        summary: &mut RunSummary,
    ) -> Result<(), CoreError> {
        let files = discover_files(Path::new(dataset), self.options.max_file_count)?;
        let resolver = FacetResolver::new(self.vocabulary, self.configs.config_for(dataset));

        let mut aggregate = Resolution::default();
        let mut members = Vec::new();
        for file in &files {
            let name = file.to_string_lossy();
            let raw = match parse_filename(&name) {
                Ok(raw) => raw,
                Err(error) => {
                    warn!(%error, "member name not parseable, file excluded");
                    continue;
                }
            };
            let attributes = match self.attributes.read_global_attributes(file) {
                Ok(attributes) => attributes,
                Err(error) => {
                    warn!(%error, "attribute extraction failed, file skipped");
                    continue;
                }
            };
            let mut raw = raw;
            raw.merge(attribute_facet_set(&attributes));
            aggregate.merge(&resolver.resolve(&raw));
            members.push(file.clone());
        }

        if members.is_empty() {
            return Err(CoreError::DatasetEmpty {
                dataset: dataset.to_string(),
            });
        }

        // diagnostics and MOLES tags are kept even when no DRS can be built
        summary.not_found.extend(aggregate.diagnostics.iter().cloned());
        summary
            .dataset_uris
            .insert(dataset.to_string(), aggregate.uris.clone());

        let components = components_from(&aggregate)?;
        let identity = IdentityBuilder::build(
            components,
            dataset,
            self.configs.fixed_realization(dataset),
            &mut self.registry,
        )?;
        let records = members
            .iter()
            .map(|file| self.file_record(file))
            .collect::<Result<Vec<_>, _>>()?;
        info!(drs = %identity, files = records.len(), "dataset tagged");
        summary.drs.insert(identity.render(), records);
        Ok(())
    }

    /// Tag a single file, without touching any output files.
    pub fn tag_file(&mut self, path: &Path) -> Result<TaggedDataset, CoreError> {
        let name = path.to_string_lossy();
        let mut raw = parse_filename(&name)?;
        let attributes = self.attributes.read_global_attributes(path)?;
        raw.merge(attribute_facet_set(&attributes));

        let dataset = path
            .parent()
            .unwrap_or(path)
            .to_string_lossy()
            .into_owned();
        let resolver = FacetResolver::new(self.vocabulary, self.configs.config_for(&dataset));
        let resolution = resolver.resolve(&raw);

        let drs = match components_from(&resolution) {
            Ok(components) => Some(
                IdentityBuilder::build(
                    components,
                    &dataset,
                    self.configs.fixed_realization(&dataset),
                    &mut self.registry,
                )?
                .render(),
            ),
            Err(error) => {
                warn!(%error, "file is not DRS-identifiable");
                None
            }
        };
        Ok(TaggedDataset {
            drs,
            labels: resolution.labels,
            uris: resolution.uris,
        })
    }

    fn file_record(&self, path: &Path) -> Result<FileRecord, CoreError> {
        let file = path.to_string_lossy().into_owned();
        if !self.options.checksums {
            return Ok(FileRecord {
                file,
                sha256: None,
                size: None,
                mtime: None,
            });
        }
        let io_error = |source| CoreError::Io {
            path: path.to_path_buf(),
            source,
        };
        let metadata = path.metadata().map_err(io_error)?;
        let mtime = metadata
            .modified()
            .map_err(io_error)?
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs_f64())
            .unwrap_or_default();
        Ok(FileRecord {
            file,
            sha256: Some(sha256_hex(path)?),
            size: Some(metadata.len()),
            mtime: Some(mtime),
        })
    }

    pub fn registry(&self) -> &RealizationRegistry {
        &self.registry
    }

    pub fn into_registry(self) -> RealizationRegistry {
        self.registry
    }
}

fn sha256_hex(path: &Path) -> Result<String, CoreError> {
    let mut file = std::fs::File::open(path).map_err(|source| CoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher).map_err(|source| CoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cci_model::FacetKind;
    use cci_vocab::LEVEL_2_FREQUENCY_URI;
    use std::collections::BTreeMap as Map;

    struct FixedAttributes(Map<String, String>);

    impl AttributeSource for FixedAttributes {
        fn read_global_attributes(
            &self,
            _path: &Path,
        ) -> Result<Map<String, String>, cci_ingest::IngestError> {
            Ok(self.0.clone())
        }
    }

    fn attributes() -> FixedAttributes {
        let mut map = Map::new();
        map.insert("time_coverage_resolution".to_string(), "day".to_string());
        map.insert("sensor".to_string(), "AATSR".to_string());
        map.insert("platform".to_string(), "Envisat".to_string());
        map.insert("product_version".to_string(), "4.21".to_string());
        map.insert("institution".to_string(), "DLR".to_string());
        FixedAttributes(map)
    }

    fn vocabulary() -> Vocabulary {
        let mut vocab = Vocabulary::new();
        vocab.add_pref(FacetKind::ProcessingLevel, "http://v/procLev/l3", "Level 3");
        vocab.add_alt(FacetKind::ProcessingLevel, "http://v/procLev/l3", "L3");
        vocab.add_pref(FacetKind::CciProject, "http://v/ecv/aerosol", "Aerosol");
        vocab.add_alt(FacetKind::CciProject, "http://v/ecv/aerosol", "AEROSOL");
        vocab.add_pref(FacetKind::DataType, "http://v/dataType/aod", "aod product");
        vocab.add_alt(FacetKind::DataType, "http://v/dataType/aod", "AOD");
        vocab.add_pref(FacetKind::ProductString, "http://v/product/su", "SU");
        vocab.add_pref(FacetKind::TimeFrequency, "http://v/freq/day", "day");
        vocab.add_pref(FacetKind::TimeFrequency, LEVEL_2_FREQUENCY_URI, "satellite-orbit-frequency");
        vocab.add_pref(FacetKind::SensorId, "http://v/sensor/aatsr", "AATSR");
        vocab.add_pref(FacetKind::PlatformId, "http://v/platform/envisat", "Envisat");
        vocab.add_pref(FacetKind::Institute, "http://v/org/dlr", "DLR");
        vocab
    }

    fn write_member(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"data").unwrap();
    }

    fn run(
        dataset: &Path,
        options: TagOptions,
        registry: RealizationRegistry,
    ) -> (RunSummary, RealizationRegistry) {
        let vocab = vocabulary();
        let configs = DatasetConfigs::default();
        let attrs = attributes();
        let mut tagger = DatasetTagger::new(&vocab, &configs, &attrs, registry, options);
        let summary = tagger.process(&[dataset.to_string_lossy().into_owned()]);
        (summary, tagger.into_registry())
    }

    #[test]
    fn dataset_maps_members_under_one_drs() {
        let dir = tempfile::tempdir().unwrap();
        write_member(dir.path(), "20170101-ESACCI-L3_AEROSOL-AOD-SU-fv1.0.nc");
        write_member(dir.path(), "20170102-ESACCI-L3_AEROSOL-AOD-SU-fv1.0.nc");

        let (summary, _) = run(dir.path(), TagOptions::default(), RealizationRegistry::new());
        assert_eq!(summary.failures, 0);
        assert_eq!(summary.drs.len(), 1);
        let (drs, records) = summary.drs.iter().next().unwrap();
        assert!(drs.starts_with("esacci.AEROSOL.day.L3.AOD.AATSR.Envisat.SU.4-21.r1.v"));
        assert_eq!(records.len(), 2);
        assert!(records[0].sha256.is_some());
        assert_eq!(records[0].size, Some(4));
    }

    #[test]
    fn checksums_can_be_disabled() {
        let dir = tempfile::tempdir().unwrap();
        write_member(dir.path(), "20170101-ESACCI-L3_AEROSOL-AOD-SU-fv1.0.nc");
        let options = TagOptions {
            checksums: false,
            ..TagOptions::default()
        };
        let (summary, _) = run(dir.path(), options, RealizationRegistry::new());
        let records = summary.drs.values().next().unwrap();
        assert_eq!(records[0].sha256, None);
        assert_eq!(records[0].size, None);
        assert_eq!(records[0].mtime, None);
    }

    #[test]
    fn zero_parseable_files_is_a_counted_failure() {
        let dir = tempfile::tempdir().unwrap();
        write_member(dir.path(), "nothing-to-see-here.nc");

        let (summary, _) = run(dir.path(), TagOptions::default(), RealizationRegistry::new());
        assert_eq!(summary.datasets_processed, 1);
        assert_eq!(summary.failures, 1);
        assert!(summary.drs.is_empty());
    }

    #[test]
    fn max_file_count_caps_membership() {
        let dir = tempfile::tempdir().unwrap();
        for day in 1..=4 {
            write_member(
                dir.path(),
                &format!("2017010{day}-ESACCI-L3_AEROSOL-AOD-SU-fv1.0.nc"),
            );
        }
        let options = TagOptions {
            max_file_count: Some(2),
            ..TagOptions::default()
        };
        let (summary, _) = run(dir.path(), options, RealizationRegistry::new());
        assert_eq!(summary.drs.values().next().unwrap().len(), 2);
    }

    #[test]
    fn retagging_is_stable_modulo_version() {
        let dir = tempfile::tempdir().unwrap();
        write_member(dir.path(), "20170101-ESACCI-L3_AEROSOL-AOD-SU-fv1.0.nc");

        let (first, registry) =
            run(dir.path(), TagOptions::default(), RealizationRegistry::new());
        let (second, _) = run(dir.path(), TagOptions::default(), registry);

        let strip = |summary: &RunSummary| {
            summary
                .drs
                .keys()
                .map(|drs| cci_model::strip_version(drs).to_string())
                .collect::<Vec<_>>()
        };
        assert_eq!(strip(&first), strip(&second));
    }

    #[test]
    fn unresolved_terms_are_collected_once() {
        let dir = tempfile::tempdir().unwrap();
        write_member(dir.path(), "20170101-ESACCI-L3_AEROSOL-XYZ-SU-fv1.0.nc");
        write_member(dir.path(), "20170102-ESACCI-L3_AEROSOL-XYZ-SU-fv1.0.nc");

        let (summary, _) = run(dir.path(), TagOptions::default(), RealizationRegistry::new());
        // one diagnostic for two occurrences; data type missing, so no DRS
        assert_eq!(
            summary
                .not_found
                .iter()
                .filter(|message| message.contains("\"XYZ\""))
                .count(),
            1
        );
        assert_eq!(summary.failures, 1);
        assert_eq!(summary.dataset_uris.len(), 1);
    }

    #[test]
    fn tag_file_returns_labels_and_drs() {
        let dir = tempfile::tempdir().unwrap();
        let name = "20170101-ESACCI-L3_AEROSOL-AOD-SU-fv1.0.nc";
        write_member(dir.path(), name);

        let vocab = vocabulary();
        let configs = DatasetConfigs::default();
        let attrs = attributes();
        let mut tagger = DatasetTagger::new(
            &vocab,
            &configs,
            &attrs,
            RealizationRegistry::new(),
            TagOptions::default(),
        );
        let tagged = tagger.tag_file(&dir.path().join(name)).unwrap();
        assert!(tagged.drs.is_some());
        assert_eq!(
            tagged.labels.get(&FacetKind::CciProject).unwrap(),
            &["AEROSOL"]
        );
        assert!(tagged.uris.get(FacetKind::SensorId).is_some());
    }
}
