//! The `latindrill stats` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use latindrill_core::progression::{CATALOG, UNLOCK_THRESHOLD};
use latindrill_store::JsonFileStore;

pub fn execute(config_path: Option<PathBuf>, json: bool) -> Result<()> {
    let config = super::load_config(config_path)?;
    let store = JsonFileStore::new(&config.save_path);
    let progress = store.read()?;

    if json {
        println!("{}", progress.to_json()?);
        return Ok(());
    }

    let mut summary = Table::new();
    summary.set_header(vec!["Player", "Difficulty", "Total XP", "High score", "Best streak", "Sound"]);
    summary.add_row(vec![
        Cell::new(&progress.player.name),
        Cell::new(progress.player.difficulty),
        Cell::new(progress.best.total_xp),
        Cell::new(progress.best.high_score),
        Cell::new(progress.best.best_streak),
        Cell::new(if progress.settings.sound { "on" } else { "off" }),
    ]);
    println!("{summary}");

    let mut rewards = Table::new();
    rewards.set_header(vec!["Reward", "Motto", "Status"]);
    for (i, reward) in CATALOG.iter().enumerate() {
        let status = if progress.is_unlocked(reward.id) {
            "unlocked".to_string()
        } else {
            let needed = (i as u64 + 1) * UNLOCK_THRESHOLD;
            format!("{needed} XP")
        };
        rewards.add_row(vec![
            Cell::new(reward.name),
            Cell::new(reward.motto),
            Cell::new(status),
        ]);
    }
    println!("{rewards}");
    println!("Progress file: {}", store.path().display());

    Ok(())
}
