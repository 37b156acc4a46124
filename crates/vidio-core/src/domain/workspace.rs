//! Request-scoped scratch directories.

use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};

const WORKSPACE_PREFIX: &str = "vidio-";

/// An exclusively-owned temporary directory holding one materialized file.
///
/// The directory is removed exactly once: either by an explicit
/// [`release`](Self::release) or, failing that, when the value is dropped.
/// Ownership moves from the materializer to whoever streams the file, so the
/// last owner is always the one that tears it down.
#[derive(Debug)]
pub struct ScratchWorkspace {
    dir: Option<TempDir>,
    path: PathBuf,
}

impl ScratchWorkspace {
    /// Create a fresh workspace under the system temp directory.
    pub fn create() -> io::Result<Self> {
        Ok(Self::from_dir(
            tempfile::Builder::new().prefix(WORKSPACE_PREFIX).tempdir()?,
        ))
    }

    /// Create a fresh workspace under `parent`.
    pub fn create_in(parent: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self::from_dir(
            tempfile::Builder::new()
                .prefix(WORKSPACE_PREFIX)
                .tempdir_in(parent)?,
        ))
    }

    fn from_dir(dir: TempDir) -> Self {
        let path = dir.path().to_path_buf();
        debug!(path = %path.display(), "Created scratch workspace");
        Self {
            dir: Some(dir),
            path,
        }
    }

    /// Directory path. Still valid as a value after release, but the
    /// directory no longer exists then.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_released(&self) -> bool {
        self.dir.is_none()
    }

    /// Delete the directory and everything in it.
    ///
    /// Returns `true` if this call performed the teardown, `false` if the
    /// workspace was already released.
    pub fn release(&mut self) -> bool {
        let Some(dir) = self.dir.take() else {
            return false;
        };

        match dir.close() {
            Ok(()) => debug!(path = %self.path.display(), "Released scratch workspace"),
            Err(e) => warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to remove scratch workspace"
            ),
        }
        true
    }
}

impl Drop for ScratchWorkspace {
    fn drop(&mut self) {
        self.release();
    }
}
