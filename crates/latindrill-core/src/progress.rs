//! Persisted lifetime progress and its versioned on-disk schema.
//!
//! Loading never fails: [`migrate`] reads each field independently from an
//! arbitrary JSON value and substitutes the default for anything missing,
//! mistyped or out of range.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::Difficulty;

/// Current schema version written by [`PersistedProgress::to_json`].
pub const SCHEMA_VERSION: u32 = 1;

/// Default player name.
pub const DEFAULT_PLAYER_NAME: &str = "Discipulus";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub difficulty: Difficulty,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            name: DEFAULT_PLAYER_NAME.to_string(),
            difficulty: Difficulty::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Best {
    pub high_score: u32,
    pub best_streak: u32,
    #[serde(rename = "totalXP")]
    pub total_xp: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    /// Unlocked reward identifiers, in unlock order.
    pub unlocked: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub sound: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self { sound: true }
    }
}

/// Everything that survives a restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedProgress {
    pub version: u32,
    pub player: Player,
    pub best: Best,
    pub collection: Collection,
    pub settings: Settings,
}

impl Default for PersistedProgress {
    fn default() -> Self {
        Self {
            version: SCHEMA_VERSION,
            player: Player::default(),
            best: Best::default(),
            collection: Collection::default(),
            settings: Settings::default(),
        }
    }
}

impl PersistedProgress {
    /// Parse a stored record. Invalid JSON yields the default record.
    pub fn from_json_str(content: &str) -> Self {
        match serde_json::from_str::<Value>(content) {
            Ok(value) => migrate(&value),
            Err(e) => {
                tracing::warn!(error = %e, "progress record is not valid JSON, using defaults");
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn is_unlocked(&self, reward_id: &str) -> bool {
        self.collection.unlocked.iter().any(|id| id == reward_id)
    }
}

/// Bring any JSON value up to the current schema, field by field.
pub fn migrate(value: &Value) -> PersistedProgress {
    let defaults = PersistedProgress::default();
    let field = |section: &str, key: &str| value.get(section).and_then(|s| s.get(key));

    let version = value
        .get("version")
        .and_then(Value::as_u64)
        .unwrap_or(u64::from(SCHEMA_VERSION));
    if version > u64::from(SCHEMA_VERSION) {
        tracing::warn!(version, "progress record is from a newer schema, reading known fields");
    }

    let name = field("player", "name")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(String::from)
        .unwrap_or(defaults.player.name);

    let difficulty = field("player", "difficulty")
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok())
        .unwrap_or(defaults.player.difficulty);

    let as_u32 = |v: &Value| v.as_u64().and_then(|n| u32::try_from(n).ok());
    let high_score = field("best", "highScore").and_then(as_u32).unwrap_or(0);
    let best_streak = field("best", "bestStreak").and_then(as_u32).unwrap_or(0);
    let total_xp = field("best", "totalXP").and_then(Value::as_u64).unwrap_or(0);

    let mut unlocked: Vec<String> = Vec::new();
    if let Some(items) = field("collection", "unlocked").and_then(Value::as_array) {
        for id in items.iter().filter_map(Value::as_str) {
            if !id.is_empty() && !unlocked.iter().any(|u| u == id) {
                unlocked.push(id.to_string());
            }
        }
    }

    let sound = field("settings", "sound")
        .and_then(Value::as_bool)
        .unwrap_or(defaults.settings.sound);

    PersistedProgress {
        version: SCHEMA_VERSION,
        player: Player { name, difficulty },
        best: Best {
            high_score,
            best_streak,
            total_xp,
        },
        collection: Collection { unlocked },
        settings: Settings { sound },
    }
}
