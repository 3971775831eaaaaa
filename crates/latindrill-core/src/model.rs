//! Core data model types for latindrill.
//!
//! Grammatical selectors, difficulty tiers, drill modes and the per-tier
//! settings table that the rest of the engine consumes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Grammatical case. Only the singular nominative and accusative are drilled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Case {
    Nominative,
    Accusative,
}

impl Case {
    /// The case a learner is most likely to confuse this one with.
    pub fn other(self) -> Case {
        match self {
            Case::Nominative => Case::Accusative,
            Case::Accusative => Case::Nominative,
        }
    }

    /// Short grammatical abbreviation used in hints.
    pub fn abbrev(self) -> &'static str {
        match self {
            Case::Nominative => "nom.",
            Case::Accusative => "acc.",
        }
    }
}

impl fmt::Display for Case {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Case::Nominative => write!(f, "nominative"),
            Case::Accusative => write!(f, "accusative"),
        }
    }
}

/// Grammatical gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "m")]
    Masculine,
    #[serde(rename = "f")]
    Feminine,
    #[serde(rename = "n")]
    Neuter,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Masculine => write!(f, "masculine"),
            Gender::Feminine => write!(f, "feminine"),
            Gender::Neuter => write!(f, "neuter"),
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "m" | "masc" | "masculine" => Ok(Gender::Masculine),
            "f" | "fem" | "feminine" => Ok(Gender::Feminine),
            "n" | "neut" | "neuter" => Ok(Gender::Neuter),
            other => Err(format!("unknown gender: {other}")),
        }
    }
}

/// Drill mode of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Pair Latin forms with their meanings.
    Matching,
    /// Build a sentence from tiles in the right order.
    Construction,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Matching => write!(f, "matching"),
            Mode::Construction => write!(f, "construction"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "matching" | "match" | "vocab" => Ok(Mode::Matching),
            "construction" | "construct" | "sentence" => Ok(Mode::Construction),
            other => Err(format!("unknown mode: {other}")),
        }
    }
}

/// Difficulty tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Normal => write!(f, "normal"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" | "e" => Ok(Difficulty::Easy),
            "normal" | "n" | "medium" => Ok(Difficulty::Normal),
            "hard" | "h" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// Settings that a difficulty tier applies to a round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultySettings {
    /// Seconds on the clock when a round starts.
    pub round_seconds: u32,
    /// Multiplier applied to every award.
    pub multiplier: f64,
    /// Number of pairs drawn for a matching round.
    pub match_pairs: usize,
    /// Whether construction challenges include an agreeing adjective.
    pub adjectives: bool,
}

/// Per-tier settings, overridable from configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyTable {
    pub easy: DifficultySettings,
    pub normal: DifficultySettings,
    pub hard: DifficultySettings,
}

impl DifficultyTable {
    pub fn get(&self, difficulty: Difficulty) -> &DifficultySettings {
        match difficulty {
            Difficulty::Easy => &self.easy,
            Difficulty::Normal => &self.normal,
            Difficulty::Hard => &self.hard,
        }
    }

    pub fn get_mut(&mut self, difficulty: Difficulty) -> &mut DifficultySettings {
        match difficulty {
            Difficulty::Easy => &mut self.easy,
            Difficulty::Normal => &mut self.normal,
            Difficulty::Hard => &mut self.hard,
        }
    }
}

impl Default for DifficultyTable {
    fn default() -> Self {
        Self {
            easy: DifficultySettings {
                round_seconds: 90,
                multiplier: 1.0,
                match_pairs: 4,
                adjectives: false,
            },
            normal: DifficultySettings {
                round_seconds: 75,
                multiplier: 1.25,
                match_pairs: 5,
                adjectives: false,
            },
            hard: DifficultySettings {
                round_seconds: 60,
                multiplier: 1.5,
                match_pairs: 6,
                adjectives: true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_display_and_parse() {
        assert_eq!(Difficulty::Hard.to_string(), "hard");
        assert_eq!("EASY".parse::<Difficulty>().unwrap(), Difficulty::Easy);
        assert_eq!("medium".parse::<Difficulty>().unwrap(), Difficulty::Normal);
        assert_eq!("h".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("legendary".parse::<Difficulty>().is_err());
    }

    #[test]
    fn mode_parse() {
        assert_eq!("match".parse::<Mode>().unwrap(), Mode::Matching);
        assert_eq!("Sentence".parse::<Mode>().unwrap(), Mode::Construction);
        assert!("quiz".parse::<Mode>().is_err());
    }

    #[test]
    fn only_hard_tier_uses_adjectives() {
        let table = DifficultyTable::default();
        assert!(!table.get(Difficulty::Easy).adjectives);
        assert!(!table.get(Difficulty::Normal).adjectives);
        assert!(table.get(Difficulty::Hard).adjectives);
    }

    #[test]
    fn case_other_is_involution() {
        assert_eq!(Case::Nominative.other(), Case::Accusative);
        assert_eq!(Case::Nominative.other().other(), Case::Nominative);
    }
}
