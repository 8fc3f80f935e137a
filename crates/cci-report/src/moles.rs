//! MOLES tags CSV output.
//!
//! One `<dataset_path>,<uri>` row per resolved vocabulary URI of the MOLES
//! facet subset, appended dataset by dataset as the run progresses. No
//! header row.

use std::fs::File;
use std::path::{Path, PathBuf};

use cci_model::{FacetKind, ResolvedFacetSet};
use tracing::debug;

use crate::error::ReportError;

pub struct MolesCsvWriter {
    writer: csv::Writer<File>,
    path: PathBuf,
    rows: usize,
}

impl MolesCsvWriter {
    pub fn create(path: &Path) -> Result<Self, ReportError> {
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(path)
            .map_err(|source| ReportError::Csv {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self {
            writer,
            path: path.to_path_buf(),
            rows: 0,
        })
    }

    /// Append the rows for one dataset.
    pub fn write_dataset(
        &mut self,
        dataset_path: &str,
        uris: &ResolvedFacetSet,
    ) -> Result<(), ReportError> {
        for facet in FacetKind::moles_facets() {
            let Some(facet_uris) = uris.get(*facet) else {
                continue;
            };
            for uri in facet_uris {
                self.writer
                    .write_record([dataset_path, uri])
                    .map_err(|source| ReportError::Csv {
                        path: self.path.clone(),
                        source,
                    })?;
                self.rows += 1;
            }
        }
        Ok(())
    }

    pub fn finish(mut self) -> Result<(), ReportError> {
        self.writer.flush().map_err(|source| ReportError::Io {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), rows = self.rows, "wrote MOLES tags CSV");
        Ok(())
    }
}
