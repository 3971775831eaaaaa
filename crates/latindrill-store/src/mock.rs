//! In-memory store and recording speaker for tests and dry runs.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use latindrill_core::progress::PersistedProgress;
use latindrill_core::traits::{ProgressStore, Speaker};

/// A progress store that never touches the disk.
///
/// Clones share the same record, so a test can keep a handle after giving
/// the store to a session.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    record: Arc<Mutex<PersistedProgress>>,
    saves: Arc<AtomicU32>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing record.
    pub fn with_progress(progress: PersistedProgress) -> Self {
        Self {
            record: Arc::new(Mutex::new(progress)),
            saves: Arc::default(),
        }
    }

    /// Number of saves performed.
    pub fn save_count(&self) -> u32 {
        self.saves.load(Ordering::Relaxed)
    }

    /// The most recently saved record.
    pub fn snapshot(&self) -> PersistedProgress {
        self.record
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

impl ProgressStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn load(&self) -> anyhow::Result<PersistedProgress> {
        let record = self
            .record
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
        Ok(record.clone())
    }

    fn save(&self, progress: &PersistedProgress) -> anyhow::Result<()> {
        let mut record = self
            .record
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
        *record = progress.clone();
        self.saves.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// A speaker that remembers everything it was asked to say.
#[derive(Debug, Clone, Default)]
pub struct RecordingSpeaker {
    spoken: Arc<Mutex<Vec<String>>>,
}

impl RecordingSpeaker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl Speaker for RecordingSpeaker {
    fn speak(&self, text: &str) {
        if let Ok(mut spoken) = self.spoken.lock() {
            spoken.push(text.to_string());
        }
    }
}
