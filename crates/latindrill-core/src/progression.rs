//! Lifetime progression: experience, personal bests and reward unlocks.

use serde::{Deserialize, Serialize};

use crate::progress::PersistedProgress;
use crate::round::RoundSummary;

/// Experience needed per reward.
pub const UNLOCK_THRESHOLD: u64 = 250;

/// A collectible reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Reward {
    pub id: &'static str,
    pub name: &'static str,
    pub motto: &'static str,
}

/// Rewards in unlock order.
pub const CATALOG: &[Reward] = &[
    Reward {
        id: "laurel",
        name: "Laurel Wreath",
        motto: "Per aspera ad astra",
    },
    Reward {
        id: "stylus",
        name: "Bronze Stylus",
        motto: "Nulla dies sine linea",
    },
    Reward {
        id: "scroll",
        name: "Papyrus Scroll",
        motto: "Verba volant, scripta manent",
    },
    Reward {
        id: "amphora",
        name: "Painted Amphora",
        motto: "In vino veritas",
    },
    Reward {
        id: "gladius",
        name: "Legionary Gladius",
        motto: "Fortes fortuna adiuvat",
    },
    Reward {
        id: "aquila",
        name: "Golden Eagle",
        motto: "Senatus Populusque Romanus",
    },
];

pub fn reward(id: &str) -> Option<&'static Reward> {
    CATALOG.iter().find(|r| r.id == id)
}

/// What one round changed in the lifetime record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub xp_gained: u64,
    pub total_xp: u64,
    pub new_high_score: bool,
    pub new_best_streak: bool,
    /// Reward unlocked by this update, if any.
    pub unlocked: Option<String>,
}

/// Fold a finished round into `progress` using the built-in catalog.
pub fn record(progress: &mut PersistedProgress, summary: &RoundSummary) -> ProgressUpdate {
    record_with_catalog(progress, summary, CATALOG)
}

pub fn record_with_catalog(
    progress: &mut PersistedProgress,
    summary: &RoundSummary,
    catalog: &[Reward],
) -> ProgressUpdate {
    let best = &mut progress.best;
    let xp_gained = u64::from(summary.score);
    best.total_xp = best.total_xp.saturating_add(xp_gained);

    let new_high_score = summary.score > best.high_score;
    best.high_score = best.high_score.max(summary.score);
    let new_best_streak = summary.max_combo > best.best_streak;
    best.best_streak = best.best_streak.max(summary.max_combo);

    let total_xp = best.total_xp;
    let unlocked = evaluate_unlock(progress, catalog);
    if let Some(id) = &unlocked {
        tracing::info!(reward = %id, total_xp, "reward unlocked");
    }

    ProgressUpdate {
        xp_gained,
        total_xp,
        new_high_score,
        new_best_streak,
        unlocked,
    }
}

/// Unlock at most one reward: the first catalog entry not yet owned, when the
/// owned count is below what the experience total has earned.
fn evaluate_unlock(progress: &mut PersistedProgress, catalog: &[Reward]) -> Option<String> {
    let earned = usize::try_from(progress.best.total_xp / UNLOCK_THRESHOLD)
        .unwrap_or(usize::MAX)
        .min(catalog.len());
    let owned = catalog
        .iter()
        .filter(|r| progress.is_unlocked(r.id))
        .count();
    if owned >= earned {
        return None;
    }

    let next = catalog.iter().find(|r| !progress.is_unlocked(r.id))?;
    progress.collection.unlocked.push(next.id.to_string());
    Some(next.id.to_string())
}
