//! All-or-nothing output files.
//!
//! Each rendered output is first written to a temporary file in its
//! destination directory. Only when every output has been staged are the
//! temporaries renamed over their destinations; a failed stage drops (and
//! deletes) everything staged so far.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{AppError, ErrorKind};

#[derive(Default)]
pub struct StagedOutputs {
    files: Vec<(NamedTempFile, PathBuf)>,
}

impl StagedOutputs {
    /// Write `contents` next to `path` without touching `path` itself.
    pub fn stage(&mut self, path: &Path, contents: &[u8]) -> Result<(), AppError> {
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let io_err = |e: std::io::Error| {
            AppError::new(
                ErrorKind::Io,
                format!("Failed to write '{}': {e}", path.display()),
            )
        };

        let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
        tmp.write_all(contents).map_err(io_err)?;
        tmp.flush().map_err(io_err)?;
        self.files.push((tmp, path.to_path_buf()));
        Ok(())
    }

    /// Move every staged file into place.
    pub fn commit(self) -> Result<Vec<PathBuf>, AppError> {
        let mut written = Vec::with_capacity(self.files.len());
        for (tmp, path) in self.files {
            tmp.persist(&path).map_err(|e| {
                AppError::new(
                    ErrorKind::Io,
                    format!("Failed to move output into '{}': {}", path.display(), e.error),
                )
            })?;
            written.push(path);
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_lands_before_commit() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.csv");
        let b = dir.path().join("b.json");

        let mut staged = StagedOutputs::default();
        staged.stage(&a, b"x,y\n").unwrap();
        staged.stage(&b, b"{}").unwrap();
        assert!(!a.exists() && !b.exists());

        let written = staged.commit().unwrap();
        assert_eq!(written, vec![a.clone(), b.clone()]);
        assert_eq!(std::fs::read_to_string(&a).unwrap(), "x,y\n");
        assert_eq!(std::fs::read_to_string(&b).unwrap(), "{}");
    }

    #[test]
    fn failed_stage_leaves_no_files_behind() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("fig.svg");

        let mut staged = StagedOutputs::default();
        staged.stage(&good, b"<svg/>").unwrap();
        let err = staged
            .stage(&dir.path().join("missing").join("out.csv"), b"")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        drop(staged);

        assert!(!good.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn commit_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "old").unwrap();

        let mut staged = StagedOutputs::default();
        staged.stage(&path, b"new").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "old");
        staged.commit().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }
}
