//! Scoped change of the process working directory.

use std::path::{Path, PathBuf};

use jojo_common::error::{JojoError, Result};

/// Guard that restores the previous working directory when dropped.
///
/// The working directory is process-wide: holding two guards from different
/// threads at once leaves the directory of whichever was entered last.
#[derive(Debug)]
#[must_use = "the previous directory is restored as soon as the guard is dropped"]
pub struct WorkingDir {
    previous: PathBuf,
}

impl WorkingDir {
    /// Changes the working directory to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`JojoError::Io`] if the current directory cannot be read or
    /// `path` cannot be entered.
    pub fn enter(path: &Path) -> Result<Self> {
        let previous = std::env::current_dir().map_err(|e| JojoError::io(".", e))?;
        std::env::set_current_dir(path).map_err(|e| JojoError::io(path, e))?;
        tracing::debug!(dir = %path.display(), "entered directory");
        Ok(Self { previous })
    }

    /// The directory restored on drop.
    #[must_use]
    pub fn previous(&self) -> &Path {
        &self.previous
    }
}

impl Drop for WorkingDir {
    fn drop(&mut self) {
        if let Err(e) = std::env::set_current_dir(&self.previous) {
            tracing::warn!(
                dir = %self.previous.display(),
                error = %e,
                "failed to restore working directory"
            );
        }
    }
}
