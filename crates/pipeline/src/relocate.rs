//! File relocation: copy-then-delete with per-file records

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{PipelineError, PipelineResult};

/// One successfully relocated file
#[derive(Debug, Clone, Serialize)]
pub struct MovedFile {
    pub original: PathBuf,
    pub destination: PathBuf,
}

/// One file that could not be relocated
#[derive(Debug, Clone, Serialize)]
pub struct MoveFailure {
    pub file: PathBuf,
    pub reason: String,
}

/// Aggregate result of a relocation
#[derive(Debug, Default, Serialize)]
pub struct MoveReport {
    pub moved: Vec<MovedFile>,
    pub failures: Vec<MoveFailure>,
}

impl MoveReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} file(s) moved, {} failure(s)",
            self.moved.len(),
            self.failures.len()
        )
    }
}

/// Move files from `source` into `dest` (created if absent).
///
/// With `files`, only the listed paths are moved; otherwise every regular
/// file directly inside `source` is. Each file is copied then deleted; a
/// failing file is recorded and does not abort the rest.
pub fn move_files(
    source: &Path,
    dest: &Path,
    files: Option<&[PathBuf]>,
) -> PipelineResult<MoveReport> {
    if !source.is_dir() {
        return Err(PipelineError::DirNotFound(source.to_path_buf()));
    }
    std::fs::create_dir_all(dest)?;

    let candidates: Vec<PathBuf> = match files {
        Some(list) => list.to_vec(),
        None => std::fs::read_dir(source)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect(),
    };

    let mut report = MoveReport::default();
    for file in candidates {
        match move_one(&file, dest) {
            Ok(destination) => {
                debug!("moved {} -> {}", file.display(), destination.display());
                report.moved.push(MovedFile {
                    original: file,
                    destination,
                });
            }
            Err(e) => {
                warn!("failed to move {}: {}", file.display(), e);
                report.failures.push(MoveFailure {
                    file,
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(report)
}

fn move_one(file: &Path, dest: &Path) -> std::io::Result<PathBuf> {
    let file_name = file.file_name().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name")
    })?;
    let target = dest.join(file_name);

    std::fs::copy(file, &target)?;
    std::fs::remove_file(file)?;
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path, content: &str) {
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_moves_whole_directory() {
        let source = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        touch(&source.path().join("a.pdf"), "a");
        touch(&source.path().join("b.docx"), "b");
        std::fs::create_dir(source.path().join("nested")).unwrap();

        let report = move_files(source.path(), dest.path(), None).unwrap();

        assert_eq!(report.moved.len(), 2);
        assert!(report.is_clean());
        assert!(dest.path().join("a.pdf").exists());
        assert!(!source.path().join("a.pdf").exists());
        // Directories are left alone
        assert!(source.path().join("nested").exists());
    }

    #[test]
    fn test_moves_explicit_list_only() {
        let source = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        let wanted = source.path().join("wanted.pdf");
        touch(&wanted, "w");
        touch(&source.path().join("ignored.pdf"), "i");

        let report = move_files(source.path(), dest.path(), Some(&[wanted.clone()])).unwrap();

        assert_eq!(report.moved.len(), 1);
        assert!(dest.path().join("wanted.pdf").exists());
        assert!(source.path().join("ignored.pdf").exists());
    }

    #[test]
    fn test_missing_file_is_recorded_not_fatal() {
        let source = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        let present = source.path().join("present.pdf");
        touch(&present, "p");
        let missing = source.path().join("missing.pdf");

        let report =
            move_files(source.path(), dest.path(), Some(&[missing, present])).unwrap();

        assert_eq!(report.moved.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert!(!report.is_clean());
        assert_eq!(report.summary(), "1 file(s) moved, 1 failure(s)");
    }

    #[test]
    fn test_missing_source_dir_is_an_error() {
        let dest = tempfile::tempdir().unwrap();
        let err = move_files(Path::new("/definitely/not/here"), dest.path(), None).unwrap_err();
        assert!(matches!(err, PipelineError::DirNotFound(_)));
    }
}
