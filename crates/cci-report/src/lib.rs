//! Run outputs: the MOLES tags CSV and the ESGF DRS JSON mapping.
//!
//! Callers running with output suppressed simply never construct these
//! writers; everything here takes already-computed run state and has no
//! side effects beyond the named output files.

pub mod drs_json;
pub mod error;
pub mod moles;

use std::path::{Path, PathBuf};

use cci_core::RunSummary;
use tracing::info;

pub use drs_json::{render_drs_json, write_drs_json};
pub use error::ReportError;
pub use moles::MolesCsvWriter;

/// File names used inside the output directory.
pub const MOLES_TAGS_FILE: &str = "moles_tags.csv";
pub const ESGF_DRS_FILE: &str = "esgf_drs.json";

/// The files produced by [`write_reports`].
#[derive(Debug)]
pub struct ReportPaths {
    pub moles_csv: PathBuf,
    pub drs_json: PathBuf,
}

/// Write both run outputs into `output_dir`.
pub fn write_reports(output_dir: &Path, summary: &RunSummary) -> Result<ReportPaths, ReportError> {
    let moles_csv = output_dir.join(MOLES_TAGS_FILE);
    let drs_json = output_dir.join(ESGF_DRS_FILE);

    let mut writer = MolesCsvWriter::create(&moles_csv)?;
    for (dataset, uris) in &summary.dataset_uris {
        writer.write_dataset(dataset, uris)?;
    }
    writer.finish()?;
    write_drs_json(&drs_json, &summary.drs)?;

    info!(
        moles = %moles_csv.display(),
        drs = %drs_json.display(),
        "run outputs written"
    );
    Ok(ReportPaths {
        moles_csv,
        drs_json,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cci_model::{FacetKind, ResolvedFacetSet};

    #[test]
    fn write_reports_emits_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut summary = RunSummary::default();
        let mut uris = ResolvedFacetSet::new();
        uris.add(FacetKind::CciProject, "http://v/ecv/aerosol");
        summary.dataset_uris.insert("/ds/a".to_string(), uris);
        summary.drs.insert(
            "esacci.AEROSOL.day.L3.AOD.AATSR.Envisat.SU.4-21.r1.v20260830".to_string(),
            vec![],
        );

        let paths = write_reports(dir.path(), &summary).unwrap();
        assert!(paths.moles_csv.exists());
        assert!(paths.drs_json.exists());
    }
}
