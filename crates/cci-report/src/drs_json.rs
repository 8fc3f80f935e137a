//! ESGF DRS JSON output: one object mapping each DRS identifier to its
//! member file records, written once at the end of a run.

use std::collections::BTreeMap;
use std::path::Path;

use cci_core::FileRecord;
use tracing::debug;

use crate::error::ReportError;

/// Render the DRS mapping as pretty-printed JSON. Keys come out sorted
/// because the map is ordered.
pub fn render_drs_json(drs: &BTreeMap<String, Vec<FileRecord>>) -> Result<String, ReportError> {
    serde_json::to_string_pretty(drs).map_err(|source| ReportError::Json {
        path: Path::new("esgf_drs.json").to_path_buf(),
        source,
    })
}

pub fn write_drs_json(
    path: &Path,
    drs: &BTreeMap<String, Vec<FileRecord>>,
) -> Result<(), ReportError> {
    let data = serde_json::to_string_pretty(drs).map_err(|source| ReportError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, data).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), entries = drs.len(), "wrote ESGF DRS JSON");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendering_is_sorted_and_stable() {
        let mut drs = BTreeMap::new();
        drs.insert(
            "esacci.CLOUD.day.L3.CLD.AVHRR.NOAA-18.RAL.2-0.r1.v20260830".to_string(),
            vec![FileRecord {
                file: "/ds/cloud/a.nc".to_string(),
                sha256: None,
                size: None,
                mtime: None,
            }],
        );
        drs.insert(
            "esacci.AEROSOL.day.L3.AOD.AATSR.Envisat.SU.4-21.r1.v20260830".to_string(),
            vec![FileRecord {
                file: "/ds/aerosol/b.nc".to_string(),
                sha256: Some("aa11".to_string()),
                size: Some(4),
                mtime: Some(1_700_000_000.0),
            }],
        );

        insta::assert_snapshot!(render_drs_json(&drs).unwrap(), @r#"
        {
          "esacci.AEROSOL.day.L3.AOD.AATSR.Envisat.SU.4-21.r1.v20260830": [
            {
              "file": "/ds/aerosol/b.nc",
              "sha256": "aa11",
              "size": 4,
              "mtime": 1700000000.0
            }
          ],
          "esacci.CLOUD.day.L3.CLD.AVHRR.NOAA-18.RAL.2-0.r1.v20260830": [
            {
              "file": "/ds/cloud/a.nc"
            }
          ]
        }
        "#);
    }

    #[test]
    fn file_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("esgf_drs.json");
        let mut drs = BTreeMap::new();
        drs.insert(
            "esacci.AEROSOL.day.L3.AOD.AATSR.Envisat.SU.4-21.r1.v20260830".to_string(),
            vec![FileRecord {
                file: "/ds/a.nc".to_string(),
                sha256: None,
                size: None,
                mtime: None,
            }],
        );
        write_drs_json(&path, &drs).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let loaded: BTreeMap<String, Vec<FileRecord>> = serde_json::from_str(&text).unwrap();
        assert_eq!(loaded, drs);
    }
}
