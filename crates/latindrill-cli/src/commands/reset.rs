//! The `latindrill reset` command.

use std::path::PathBuf;

use anyhow::Result;

use latindrill_core::progress::PersistedProgress;
use latindrill_store::JsonFileStore;

pub fn execute(config_path: Option<PathBuf>, yes: bool) -> Result<()> {
    let config = super::load_config(config_path)?;
    let store = JsonFileStore::new(&config.save_path);

    if !yes {
        println!(
            "This erases all progress in {}. Re-run with --yes to confirm.",
            store.path().display()
        );
        return Ok(());
    }

    store.write(&PersistedProgress::default())?;
    tracing::info!("progress reset at {}", store.path().display());
    println!("Progress reset.");
    Ok(())
}
