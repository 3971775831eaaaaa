//! Capabilities the game session consumes.
//!
//! Storage, speech and time are injected so the session stays deterministic
//! under test. `latindrill-store` provides the file-backed store.

use crate::progress::PersistedProgress;
use crate::round::RoundId;

// ---------------------------------------------------------------------------
// Progress store
// ---------------------------------------------------------------------------

/// Durable home of the lifetime progress record.
pub trait ProgressStore {
    /// Human-readable store name for logs (e.g. "json-file").
    fn name(&self) -> &str;

    /// Load the record. A missing or malformed record yields defaults; only
    /// environmental failures are errors.
    fn load(&self) -> anyhow::Result<PersistedProgress>;

    fn save(&self, progress: &PersistedProgress) -> anyhow::Result<()>;
}

// ---------------------------------------------------------------------------
// Speaker
// ---------------------------------------------------------------------------

/// Pronounces Latin surfaces as the learner selects them.
pub trait Speaker {
    fn speak(&self, text: &str);
}

/// Speaker that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSpeaker;

impl Speaker for NoopSpeaker {
    fn speak(&self, _: &str) {}
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// One-second tick source, armed for a single round at a time.
///
/// Every tick carries the id of the round it was armed for, so a tick that
/// arrives after the round was superseded can be recognised and dropped.
pub trait Clock {
    /// Start ticking for `round`, replacing any previous arming.
    fn arm(&mut self, round: RoundId);

    fn disarm(&mut self);

    /// The round currently armed, if any.
    fn armed(&self) -> Option<RoundId>;

    /// Let one second pass. Returns the stamp of the tick, if armed.
    fn advance(&mut self) -> Option<RoundId>;
}
