//! Output persistence with atomic replacement.
//!
//! Every write the engine performs goes through [`ArtifactStore`] in two
//! steps: [`ArtifactStore::stage`] writes the full contents to a temporary
//! file beside the target, and [`ArtifactStore::commit`] renames it into
//! place. A concurrent reader observes either the previous complete file or
//! the new complete file, never a partial one.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// A fully-written temporary file waiting to be renamed over its target.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a staged file does nothing until committed"]
pub struct StagedFile {
    pub temp_path: PathBuf,
    pub target: PathBuf,
}

/// Filesystem seam used by the engine and the hash cache.
pub trait ArtifactStore {
    fn exists(&self, path: &Path) -> bool;

    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write `contents` to a temporary path in the target's directory.
    fn stage(&self, target: &Path, contents: &[u8]) -> io::Result<StagedFile>;

    /// Atomically move a staged file into place.
    fn commit(&self, staged: StagedFile) -> io::Result<()>;

    /// Delete `path`. A file that is already gone is not an error.
    fn remove(&self, path: &Path) -> io::Result<()>;

    /// Stage and commit in one call.
    fn write_atomic(&self, target: &Path, contents: &[u8]) -> io::Result<()> {
        let staged = self.stage(target, contents)?;
        self.commit(staged)
    }
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStore;

impl ArtifactStore for FsStore {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    /// Tempfile in the same directory so the rename never crosses filesystems.
    fn stage(&self, target: &Path, contents: &[u8]) -> io::Result<StagedFile> {
        let parent = staging_dir(target)?;
        let prefix = format!(
            ".{}.",
            target
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        );

        let mut temp = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(".tmp")
            .tempfile_in(parent)?;

        temp.write_all(contents)?;
        temp.as_file().sync_all()?;

        let (_, temp_path) = temp.keep().map_err(|e| e.error)?;

        Ok(StagedFile {
            temp_path,
            target: target.to_path_buf(),
        })
    }

    fn commit(&self, staged: StagedFile) -> io::Result<()> {
        if let Err(err) = fs::rename(&staged.temp_path, &staged.target) {
            let _ = fs::remove_file(&staged.temp_path);
            return Err(err);
        }
        Ok(())
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        match fs::remove_file(path) {
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

/// Directory that will hold the temporary file for `target`.
///
/// A bare file name has an empty parent, which means the current directory.
fn staging_dir(target: &Path) -> io::Result<&Path> {
    match target.parent() {
        Some(parent) if parent.as_os_str().is_empty() => Ok(Path::new(".")),
        Some(parent) => Ok(parent),
        None => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "Path has no parent directory",
        )),
    }
}
