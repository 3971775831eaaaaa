//! The `latindrill autoplay` command.
//!
//! A seeded bot plays whole rounds against the real session, spending a few
//! simulated seconds before each answer. Useful for demos and as an end-to-end
//! smoke test of scoring and progression.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::Result;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde_json::json;

use latindrill_core::model::{Difficulty, Mode};
use latindrill_core::progression::{self, ProgressUpdate};
use latindrill_core::round::{RoundContent, RoundSummary, Selection};
use latindrill_core::session::Game;
use latindrill_core::traits::ProgressStore;
use latindrill_store::{JsonFileStore, MemoryStore};

/// Seed used when neither the command line nor the config sets one.
const DEFAULT_SEED: u64 = 7;

pub struct AutoplayOptions {
    pub difficulty: Difficulty,
    pub mode: Mode,
    pub rounds: u32,
    pub accuracy: f64,
    pub seed: Option<u64>,
    pub no_save: bool,
    pub json: bool,
}

pub fn execute(config_path: Option<PathBuf>, options: AutoplayOptions) -> Result<()> {
    if !(0.0..=1.0).contains(&options.accuracy) {
        anyhow::bail!("accuracy must be between 0 and 1, got {}", options.accuracy);
    }

    let config = super::load_config(config_path)?;
    let seed = options.seed.or(config.seed).unwrap_or(DEFAULT_SEED);
    let store: Box<dyn ProgressStore> = if options.no_save {
        Box::new(MemoryStore::new())
    } else {
        Box::new(JsonFileStore::new(&config.save_path))
    };

    let finished: Rc<RefCell<Vec<(RoundSummary, ProgressUpdate)>>> = Rc::default();
    let sink = finished.clone();
    let mut game = super::open_game(&config, store, Some(seed))?
        .on_round_end(move |summary, update| sink.borrow_mut().push((summary.clone(), update.clone())));

    let mut bot = ChaCha8Rng::seed_from_u64(seed.wrapping_add(1));
    for _ in 0..options.rounds {
        game.start_round(options.difficulty, options.mode);
        play_round(&mut game, &mut bot, options.accuracy);
    }

    let finished = finished.borrow();
    if options.json {
        let rounds: Vec<_> = finished
            .iter()
            .map(|(summary, update)| json!({ "summary": summary, "progress": update }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&rounds)?);
        return Ok(());
    }

    for (summary, update) in finished.iter() {
        println!(
            "Round {}: {} on {}, {} - score {}, best combo {}",
            summary.round,
            summary.mode,
            summary.difficulty,
            summary.reason,
            summary.score,
            summary.max_combo
        );
        if let Some(reward) = update.unlocked.as_deref().and_then(progression::reward) {
            println!("  Unlocked: {} - \"{}\"", reward.name, reward.motto);
        }
    }
    let best = &game.progress().best;
    println!(
        "Total XP {}, high score {}, best streak {}.",
        best.total_xp, best.high_score, best.best_streak
    );
    Ok(())
}

/// Play until the round ends, by completion or by the clock.
fn play_round(game: &mut Game, bot: &mut ChaCha8Rng, accuracy: f64) {
    while game.round().is_some_and(|r| r.is_active()) {
        let think = bot.gen_range(1..=4);
        for _ in 0..think {
            game.pump_tick();
        }
        if !game.round().is_some_and(|r| r.is_active()) {
            break;
        }

        let correct = bot.gen_bool(accuracy);
        match choose(game, bot, correct) {
            Some(selection) => {
                game.submit_selection(&selection);
            }
            None => break,
        }
    }
}

/// Pick the next selection, deliberately wrong when `correct` is false and a
/// wrong answer is available.
fn choose(game: &Game, bot: &mut ChaCha8Rng, correct: bool) -> Option<Selection> {
    match game.round()?.content() {
        RoundContent::Matching { sample, resolved } => {
            let open: Vec<&str> = sample
                .items
                .iter()
                .map(|item| item.id.as_str())
                .filter(|id| !resolved.contains(*id))
                .collect();
            let latin = *open.choose(bot)?;
            let meaning = if correct || open.len() < 2 {
                latin
            } else {
                open.iter().copied().find(|id| *id != latin)?
            };
            Some(Selection::Pair {
                latin: latin.to_string(),
                meaning: meaning.to_string(),
            })
        }
        RoundContent::Construction { puzzle, placed } => {
            let tokens = &puzzle.challenge.tokens;
            let expected = &tokens.get(placed.len())?.text;
            let free = puzzle.tiles.iter().filter(|t| !placed.contains(&t.id));
            // Mistakes only on the final slot, where the gentle failure
            // returns the wrong tile.
            let last_slot = placed.len() + 1 == tokens.len();
            let right = free.clone().find(|t| &t.text == expected);
            let tile = if correct || !last_slot {
                right
            } else {
                let wrong: Vec<_> = free.filter(|t| &t.text != expected).collect();
                wrong.choose(bot).copied().or(right)
            };
            tile.map(|t| Selection::Tile { id: t.id })
        }
    }
}
