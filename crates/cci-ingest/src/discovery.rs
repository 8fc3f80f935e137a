//! Dataset member discovery.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::IngestError;

/// Find the `.nc` members of a dataset directory, recursively, in sorted
/// order. A path that is already a file is passed through untouched so single
/// files can be tagged directly. `max_file_count` of `None` means unlimited.
pub fn discover_files(
    dataset_path: &Path,
    max_file_count: Option<usize>,
) -> Result<Vec<PathBuf>, IngestError> {
    if dataset_path.is_file() {
        return Ok(vec![dataset_path.to_path_buf()]);
    }

    let mut files = Vec::new();
    walk(dataset_path, &mut files)?;
    files.sort();
    if let Some(cap) = max_file_count {
        files.truncate(cap);
    }
    debug!(
        dataset = %dataset_path.display(),
        files = files.len(),
        "discovered dataset members"
    );
    Ok(files)
}

fn walk(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), IngestError> {
    let entries = std::fs::read_dir(dir).map_err(|source| IngestError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| IngestError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_dir() {
            walk(&path, files)?;
        } else if path.extension().is_some_and(|ext| ext == "nc") {
            files.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        std::fs::write(path, b"").unwrap();
    }

    #[test]
    fn finds_nc_files_recursively_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir(root.join("2018")).unwrap();
        touch(&root.join("b.nc"));
        touch(&root.join("a.nc"));
        touch(&root.join("notes.txt"));
        touch(&root.join("2018/c.nc"));

        let files = discover_files(root, None).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["2018/c.nc", "a.nc", "b.nc"]);
    }

    #[test]
    fn cap_limits_the_sorted_list() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("a.nc"));
        touch(&root.join("b.nc"));
        touch(&root.join("c.nc"));

        let files = discover_files(root, Some(2)).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("a.nc"));
    }

    #[test]
    fn file_path_passes_through() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("single.nc");
        touch(&file);
        let files = discover_files(&file, Some(0)).unwrap();
        assert_eq!(files, vec![file]);
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let result = discover_files(Path::new("/no/such/dataset"), None);
        assert!(matches!(result, Err(IngestError::Io { .. })));
    }
}
