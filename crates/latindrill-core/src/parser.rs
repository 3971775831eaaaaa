//! TOML lexicon parser.
//!
//! Loads custom lexicons from TOML files, checks them for structural errors
//! and reports content warnings.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::LexiconError;
use crate::forms::{resolve_adjective_form, resolve_noun_form};
use crate::lexicon::{Adjective, Lexicon, Noun, Verb};
use crate::model::{Case, Gender};

/// Intermediate TOML structure for lexicon files.
#[derive(Debug, Deserialize)]
struct TomlLexiconFile {
    #[serde(default)]
    nouns: Vec<TomlNoun>,
    #[serde(default)]
    verbs: Vec<TomlVerb>,
    #[serde(default)]
    adjectives: Vec<TomlAdjective>,
}

#[derive(Debug, Deserialize)]
struct TomlNoun {
    #[serde(default)]
    id: Option<String>,
    lemma: String,
    declension: u8,
    gender: String,
    gloss: String,
    #[serde(default)]
    nom: Option<String>,
    #[serde(default)]
    acc: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TomlVerb {
    id: String,
    first_person: String,
    third_person: String,
    gloss: String,
    #[serde(default)]
    conjugation: String,
}

#[derive(Debug, Deserialize)]
struct TomlAdjective {
    #[serde(default)]
    id: Option<String>,
    lemma: String,
    gloss: String,
    #[serde(default)]
    nom: BTreeMap<String, String>,
    #[serde(default)]
    acc: BTreeMap<String, String>,
}

/// Parse a lexicon TOML file.
pub fn parse_lexicon(path: &Path) -> Result<Lexicon> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read lexicon file: {}", path.display()))?;

    parse_lexicon_str(&content, path)
}

/// Parse a lexicon from a TOML string (useful for testing).
pub fn parse_lexicon_str(content: &str, source_path: &Path) -> Result<Lexicon> {
    let parsed: TomlLexiconFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let nouns = parsed
        .nouns
        .into_iter()
        .map(|n| -> Result<Noun> {
            let gender: Gender = n
                .gender
                .parse()
                .map_err(|e: String| LexiconError::Parse(format!("noun '{}': {e}", n.lemma)))?;

            let mut forms = BTreeMap::new();
            if let Some(nom) = n.nom {
                forms.insert(Case::Nominative, nom);
            }
            if let Some(acc) = n.acc {
                forms.insert(Case::Accusative, acc);
            }

            Ok(Noun {
                id: n.id.unwrap_or_else(|| n.lemma.clone()),
                lemma: n.lemma,
                declension: n.declension,
                gender,
                gloss: n.gloss,
                forms,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let verbs = parsed
        .verbs
        .into_iter()
        .map(|v| Verb {
            id: v.id,
            first_person: v.first_person,
            third_person: v.third_person,
            gloss: v.gloss,
            conjugation: v.conjugation,
        })
        .collect();

    let adjectives = parsed
        .adjectives
        .into_iter()
        .map(|a| -> Result<Adjective> {
            let mut forms: BTreeMap<Case, BTreeMap<Gender, String>> = BTreeMap::new();
            for (case, cells) in [(Case::Nominative, a.nom), (Case::Accusative, a.acc)] {
                for (gender, form) in cells {
                    let gender: Gender = gender.parse().map_err(|e: String| {
                        LexiconError::Parse(format!("adjective '{}': {e}", a.lemma))
                    })?;
                    forms.entry(case).or_default().insert(gender, form);
                }
            }

            Ok(Adjective {
                id: a.id.unwrap_or_else(|| a.lemma.clone()),
                lemma: a.lemma,
                gloss: a.gloss,
                forms,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let lexicon = Lexicon {
        nouns,
        verbs,
        adjectives,
    };
    check_lexicon(&lexicon)?;
    Ok(lexicon)
}

/// Reject structurally broken lexicons: duplicate identifiers and
/// unsupported declension classes.
pub fn check_lexicon(lexicon: &Lexicon) -> Result<(), LexiconError> {
    let mut seen = HashSet::new();
    for entry in lexicon.entries() {
        if !seen.insert(entry.id()) {
            return Err(LexiconError::DuplicateId(entry.id().to_string()));
        }
    }

    if let Some(noun) = lexicon
        .nouns
        .iter()
        .find(|n| !(1..=3).contains(&n.declension))
    {
        return Err(LexiconError::InvalidDeclension {
            id: noun.id.clone(),
            declension: noun.declension,
        });
    }

    Ok(())
}

/// A content warning from lexicon validation.
#[derive(Debug, Clone)]
pub struct ContentWarning {
    /// The entry the warning is about.
    pub entry_id: String,
    /// Warning message.
    pub message: String,
}

/// Validate a lexicon for content-authoring defects that the engine
/// tolerates at runtime.
pub fn validate_lexicon(lexicon: &Lexicon) -> Vec<ContentWarning> {
    let mut warnings = Vec::new();
    let mut warn = |entry_id: &str, message: String| {
        warnings.push(ContentWarning {
            entry_id: entry_id.to_string(),
            message,
        })
    };

    for noun in &lexicon.nouns {
        let nom = resolve_noun_form(noun, Case::Nominative);
        let acc = resolve_noun_form(noun, Case::Accusative);
        for (case, form) in [(Case::Nominative, nom), (Case::Accusative, acc)] {
            if form.is_empty() {
                warn(
                    &noun.id,
                    format!("missing {case} form; the item will be skipped"),
                );
            }
        }
        if noun.gender != Gender::Neuter && !nom.is_empty() && nom == acc {
            warn(
                &noun.id,
                "nominative and accusative are identical for a non-neuter noun".into(),
            );
        }
    }

    for verb in &lexicon.verbs {
        if verb.third_person.is_empty() {
            warn(
                &verb.id,
                "missing third person form; the item will be skipped".into(),
            );
        }
    }

    for adjective in &lexicon.adjectives {
        for case in [Case::Nominative, Case::Accusative] {
            for gender in [Gender::Masculine, Gender::Feminine, Gender::Neuter] {
                let present = adjective
                    .forms
                    .get(&case)
                    .and_then(|cells| cells.get(&gender))
                    .is_some_and(|f| !f.is_empty());
                if !present {
                    warn(
                        &adjective.id,
                        format!(
                            "no {case} {gender} form; falls back to '{}'",
                            resolve_adjective_form(adjective, case, gender)
                        ),
                    );
                }
            }
        }
    }

    warnings
}
