//! JSON file progress store.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use latindrill_core::progress::PersistedProgress;
use latindrill_core::traits::ProgressStore;

use crate::error::StoreError;

/// Keeps the progress record as pretty-printed JSON in a single file.
///
/// Writes go to a temporary file in the same directory which then replaces
/// the target, so a crash never leaves a half-written record behind.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the record. A missing file is the default record.
    pub fn read(&self) -> Result<PersistedProgress, StoreError> {
        if !self.path.exists() {
            tracing::debug!("no progress file at {}, starting fresh", self.path.display());
            return Ok(PersistedProgress::default());
        }

        let content =
            fs::read_to_string(&self.path).map_err(|e| StoreError::io(&self.path, e))?;
        Ok(PersistedProgress::from_json_str(&content))
    }

    /// Atomically replace the record on disk.
    pub fn write(&self, progress: &PersistedProgress) -> Result<(), StoreError> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;

        let json = progress.to_json()?;
        let mut temp = NamedTempFile::new_in(parent).map_err(|e| StoreError::io(parent, e))?;
        writeln!(temp, "{json}").map_err(|e| StoreError::io(parent, e))?;

        temp.persist(&self.path).map_err(|e| StoreError::Persist {
            path: self.path.clone(),
            source: e,
        })?;
        tracing::debug!("progress saved to {}", self.path.display());
        Ok(())
    }
}

impl ProgressStore for JsonFileStore {
    fn name(&self) -> &str {
        "json-file"
    }

    fn load(&self) -> anyhow::Result<PersistedProgress> {
        Ok(self.read()?)
    }

    fn save(&self, progress: &PersistedProgress) -> anyhow::Result<()> {
        Ok(self.write(progress)?)
    }
}
