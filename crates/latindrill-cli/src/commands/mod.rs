//! Subcommand implementations and the setup they share.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use latindrill_core::generator::ChallengeGenerator;
use latindrill_core::lexicon::Lexicon;
use latindrill_core::parser;
use latindrill_core::session::Game;
use latindrill_core::traits::ProgressStore;
use latindrill_store::config::load_config_from;
use latindrill_store::DrillConfig;

pub mod autoplay;
pub mod init;
pub mod lexicon;
pub mod play;
pub mod reset;
pub mod stats;

pub fn load_config(path: Option<PathBuf>) -> Result<DrillConfig> {
    load_config_from(path.as_deref())
}

/// Load `file`, or the configured lexicon, or the built-in one.
pub fn load_lexicon(config: &DrillConfig, file: Option<&Path>) -> Result<Lexicon> {
    match file.or(config.lexicon.as_deref()) {
        Some(path) => {
            let lexicon = parser::parse_lexicon(path)?;
            for w in parser::validate_lexicon(&lexicon) {
                tracing::warn!("lexicon [{}]: {}", w.entry_id, w.message);
            }
            Ok(lexicon)
        }
        None => Ok(Lexicon::builtin()),
    }
}

/// Build a session from config, ready for `start_round`.
pub fn open_game(
    config: &DrillConfig,
    store: Box<dyn ProgressStore>,
    seed: Option<u64>,
) -> Result<Game> {
    let lexicon = load_lexicon(config, None)?;
    let generator =
        ChallengeGenerator::new(lexicon).context("lexicon cannot produce challenges")?;
    let difficulties = config.difficulty_table()?;

    let game = Game::new(generator, store).with_difficulties(difficulties);
    Ok(match seed.or(config.seed) {
        Some(seed) => game.with_seed(seed),
        None => game,
    })
}
