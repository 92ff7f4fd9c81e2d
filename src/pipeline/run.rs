use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{ReelError, ReelResult};
use crate::ui::prelude::{Level, emit};

/// Temporary files created by one pipeline run.
///
/// Every tracked path is removed by [`PipelineRun::cleanup`], which also runs
/// on drop so an early return or a panic cannot leak artifacts. Only paths
/// registered here are ever deleted.
#[derive(Debug)]
pub struct PipelineRun {
    work_dir: PathBuf,
    artifacts: Vec<PathBuf>,
}

impl PipelineRun {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            artifacts: Vec::new(),
        }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn prepare(&self) -> ReelResult<()> {
        fs::create_dir_all(&self.work_dir).map_err(|err| {
            ReelError::io(
                format!("Failed to create work directory {}", self.work_dir.display()),
                err,
            )
        })
    }

    /// Register `file_name` inside the work directory and return its path.
    pub fn artifact(&mut self, file_name: &str) -> PathBuf {
        let path = self.work_dir.join(file_name);
        self.track(path.clone());
        path
    }

    /// Register a path outside the work directory.
    pub fn track(&mut self, path: PathBuf) {
        if !self.artifacts.contains(&path) {
            self.artifacts.push(path);
        }
    }

    /// Stop tracking `path` so cleanup leaves it in place.
    pub fn release(&mut self, path: &Path) {
        self.artifacts.retain(|tracked| tracked != path);
    }

    #[cfg(test)]
    pub fn artifacts(&self) -> &[PathBuf] {
        &self.artifacts
    }

    /// Delete every tracked artifact and forget it.
    ///
    /// Missing files are skipped; other failures are reported as warnings.
    /// Returns the number of files removed.
    pub fn cleanup(&mut self) -> usize {
        let mut removed = 0;
        for path in self.artifacts.drain(..) {
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => emit(
                    Level::Warn,
                    "reel.cleanup.failed",
                    &format!("Failed to remove temporary file {}: {}", path.display(), err),
                    None,
                ),
            }
        }
        removed
    }
}

impl Drop for PipelineRun {
    fn drop(&mut self) {
        self.cleanup();
    }
}
