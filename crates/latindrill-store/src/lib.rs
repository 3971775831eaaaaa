//! latindrill-store — Configuration and progress persistence.
//!
//! Provides the JSON file implementation of the core `ProgressStore` trait,
//! the drill configuration loader, and in-memory doubles for tests.

pub mod config;
pub mod error;
pub mod file;
pub mod mock;

pub use config::{load_config, load_config_from, DrillConfig};
pub use error::StoreError;
pub use file::JsonFileStore;
pub use mock::{MemoryStore, RecordingSpeaker};
