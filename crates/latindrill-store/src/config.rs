//! Drill configuration loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use latindrill_core::model::{Difficulty, DifficultySettings, DifficultyTable};

/// Per-tier overrides; unset fields keep the built-in value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TierOverride {
    #[serde(default)]
    pub round_seconds: Option<u32>,
    #[serde(default)]
    pub multiplier: Option<f64>,
    #[serde(default)]
    pub match_pairs: Option<usize>,
    #[serde(default)]
    pub adjectives: Option<bool>,
}

impl TierOverride {
    fn apply(&self, settings: &mut DifficultySettings) {
        if let Some(v) = self.round_seconds {
            settings.round_seconds = v;
        }
        if let Some(v) = self.multiplier {
            settings.multiplier = v;
        }
        if let Some(v) = self.match_pairs {
            settings.match_pairs = v;
        }
        if let Some(v) = self.adjectives {
            settings.adjectives = v;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DifficultyOverrides {
    #[serde(default)]
    pub easy: TierOverride,
    #[serde(default)]
    pub normal: TierOverride,
    #[serde(default)]
    pub hard: TierOverride,
}

/// Top-level latindrill configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillConfig {
    /// Where lifetime progress is stored.
    #[serde(default = "default_save_path")]
    pub save_path: PathBuf,
    /// Fixed RNG seed for reproducible rounds.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Custom lexicon TOML file; the built-in lexicon is used when unset.
    #[serde(default)]
    pub lexicon: Option<PathBuf>,
    #[serde(default)]
    pub difficulty: DifficultyOverrides,
}

fn default_save_path() -> PathBuf {
    match std::env::var("HOME") {
        Ok(home) => PathBuf::from(home)
            .join(".local")
            .join("share")
            .join("latindrill")
            .join("progress.json"),
        Err(_) => PathBuf::from("latindrill-progress.json"),
    }
}

impl Default for DrillConfig {
    fn default() -> Self {
        Self {
            save_path: default_save_path(),
            seed: None,
            lexicon: None,
            difficulty: DifficultyOverrides::default(),
        }
    }
}

impl DrillConfig {
    /// The built-in difficulty table with this config's overrides applied.
    pub fn difficulty_table(&self) -> Result<DifficultyTable> {
        let mut table = DifficultyTable::default();
        for (difficulty, tier) in [
            (Difficulty::Easy, &self.difficulty.easy),
            (Difficulty::Normal, &self.difficulty.normal),
            (Difficulty::Hard, &self.difficulty.hard),
        ] {
            let settings = table.get_mut(difficulty);
            tier.apply(settings);
            check_settings(difficulty, settings)?;
        }
        Ok(table)
    }
}

/// Largest accepted score multiplier.
const MAX_MULTIPLIER: f64 = 100.0;

fn check_settings(difficulty: Difficulty, settings: &DifficultySettings) -> Result<()> {
    if settings.round_seconds == 0 {
        anyhow::bail!("difficulty.{difficulty}.round_seconds must be at least 1");
    }
    if !settings.multiplier.is_finite()
        || settings.multiplier <= 0.0
        || settings.multiplier > MAX_MULTIPLIER
    {
        anyhow::bail!(
            "difficulty.{difficulty}.multiplier must be in (0, {MAX_MULTIPLIER}], got {}",
            settings.multiplier
        );
    }
    if settings.match_pairs == 0 {
        anyhow::bail!("difficulty.{difficulty}.match_pairs must be at least 1");
    }
    Ok(())
}

/// Starter config written by `latindrill init`.
pub const SAMPLE_CONFIG: &str = r#"# latindrill configuration

# Where lifetime progress is kept. ${VAR} references are expanded.
# save_path = "${HOME}/.local/share/latindrill/progress.json"

# Fixed seed for reproducible rounds.
# seed = 7

# Custom lexicon file; the built-in lexicon is used when unset.
# lexicon = "lexicon.toml"

[difficulty.easy]
round_seconds = 90
multiplier = 1.0
match_pairs = 4
adjectives = false

[difficulty.normal]
round_seconds = 75
multiplier = 1.25
match_pairs = 5
adjectives = false

[difficulty.hard]
round_seconds = 60
multiplier = 1.5
match_pairs = 6
adjectives = true
"#;

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `latindrill.toml` in the current directory
/// 2. `~/.config/latindrill/config.toml`
///
/// Environment variable overrides: `LATINDRILL_SAVE_PATH`, `LATINDRILL_SEED`.
pub fn load_config() -> Result<DrillConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<DrillConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("latindrill.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|dir| dir.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => DrillConfig::default(),
    };

    finish_config(config, |key| std::env::var(key).ok())
}

/// Parse a config from a TOML string.
pub fn parse_config(content: &str) -> Result<DrillConfig> {
    let config: DrillConfig = toml::from_str(content)?;
    config.difficulty_table()?;
    Ok(config)
}

/// Apply environment overrides, then expand `${VAR}` references in paths.
fn finish_config(
    mut config: DrillConfig,
    env: impl Fn(&str) -> Option<String>,
) -> Result<DrillConfig> {
    if let Some(path) = env("LATINDRILL_SAVE_PATH").filter(|p| !p.is_empty()) {
        config.save_path = PathBuf::from(path);
    }
    if let Some(seed) = env("LATINDRILL_SEED").filter(|s| !s.is_empty()) {
        let seed = seed
            .trim()
            .parse::<u64>()
            .with_context(|| format!("LATINDRILL_SEED is not a number: {seed}"))?;
        config.seed = Some(seed);
    }

    config.save_path = resolve_path(&config.save_path);
    config.lexicon = config.lexicon.as_deref().map(resolve_path);
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("latindrill"))
}
