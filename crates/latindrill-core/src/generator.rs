//! Challenge generation for both drill modes.
//!
//! The generator owns the lexicon and the vocabulary pool derived from it.
//! All randomness comes from the caller's RNG so a seeded RNG replays the
//! exact same rounds.

use std::collections::HashSet;
use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::LexiconError;
use crate::forms::{resolve_adjective_form, resolve_noun_form, resolve_verb_form};
use crate::lexicon::{Adjective, Lexicon, Noun, Verb};
use crate::model::{Case, Gender};

/// Upper bound on the number of tiles offered in a construction round.
pub const MAX_TILES: usize = 10;

// ---------------------------------------------------------------------------
// Matching mode
// ---------------------------------------------------------------------------

/// Grammatical role of a vocabulary pool item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Nominative,
    Accusative,
    Verb,
    Adjective,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Nominative => write!(f, "nominative"),
            Role::Accusative => write!(f, "accusative"),
            Role::Verb => write!(f, "verb"),
            Role::Adjective => write!(f, "adjective"),
        }
    }
}

/// One Latin-surface/meaning pair in the vocabulary pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchPoolItem {
    /// Unique within the pool, e.g. `puella:acc`.
    pub id: String,
    pub latin: String,
    pub meaning: String,
    pub role: Role,
}

/// The content of one matching round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSample {
    /// The drawn items, in draw order.
    pub items: Vec<MatchPoolItem>,
    /// Item ids in the order the Latin column is presented.
    pub latin_column: Vec<String>,
    /// Item ids in the order the meaning column is presented.
    pub meaning_column: Vec<String>,
}

impl MatchSample {
    pub fn item(&self, id: &str) -> Option<&MatchPoolItem> {
        self.items.iter().find(|item| item.id == id)
    }
}

/// Flatten the lexicon into role-tagged pool items, dropping empty forms.
pub fn build_match_pool(lexicon: &Lexicon) -> Vec<MatchPoolItem> {
    let mut pool = Vec::new();

    for noun in &lexicon.nouns {
        pool.push(MatchPoolItem {
            id: format!("{}:nom", noun.id),
            latin: resolve_noun_form(noun, Case::Nominative).to_string(),
            meaning: format!("{} (subject)", noun.gloss),
            role: Role::Nominative,
        });
        pool.push(MatchPoolItem {
            id: format!("{}:acc", noun.id),
            latin: resolve_noun_form(noun, Case::Accusative).to_string(),
            meaning: format!("{} (object)", noun.gloss),
            role: Role::Accusative,
        });
    }

    for verb in &lexicon.verbs {
        pool.push(MatchPoolItem {
            id: format!("{}:3sg", verb.id),
            latin: resolve_verb_form(verb).to_string(),
            meaning: verb.gloss.clone(),
            role: Role::Verb,
        });
    }

    for adjective in &lexicon.adjectives {
        pool.push(MatchPoolItem {
            id: format!("{}:adj", adjective.id),
            latin: adjective.lemma.clone(),
            meaning: adjective.gloss.clone(),
            role: Role::Adjective,
        });
    }

    let before = pool.len();
    pool.retain(|item| !item.latin.is_empty());
    if pool.len() < before {
        tracing::warn!(
            skipped = before - pool.len(),
            "vocabulary pool items with empty forms were skipped"
        );
    }
    pool
}

// ---------------------------------------------------------------------------
// Construction mode
// ---------------------------------------------------------------------------

/// Which noun an adjective agrees with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgreementTarget {
    Subject,
    Object,
}

impl AgreementTarget {
    /// The case the adjective takes when agreeing with this target.
    pub fn case(self) -> Case {
        match self {
            AgreementTarget::Subject => Case::Nominative,
            AgreementTarget::Object => Case::Accusative,
        }
    }
}

impl fmt::Display for AgreementTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgreementTarget::Subject => write!(f, "subject"),
            AgreementTarget::Object => write!(f, "object"),
        }
    }
}

/// A position in the expected sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Subject,
    Verb,
    Object,
    Adjective(AgreementTarget),
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Subject => write!(f, "the subject in the nominative"),
            Slot::Verb => write!(f, "the verb in the 3rd person"),
            Slot::Object => write!(f, "the object in the accusative"),
            Slot::Adjective(target) => write!(
                f,
                "the adjective agreeing with the {target} ({})",
                target.case()
            ),
        }
    }
}

/// One token of the expected sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedToken {
    pub text: String,
    pub slot: Slot,
}

/// A sentence-construction challenge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    pub subject: String,
    pub object: String,
    pub verb: String,
    pub adjective: Option<String>,
    pub agreement: Option<AgreementTarget>,
    /// The correct sentence, in order.
    pub tokens: Vec<ExpectedToken>,
    /// English rendering of the same slot assignment.
    pub gloss: String,
    pub hint: String,
}

impl Challenge {
    /// The expected sentence, space-joined.
    pub fn sentence(&self) -> String {
        join_tokens(self.tokens.iter().map(|t| t.text.as_str()))
    }
}

/// One clickable token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub id: u32,
    pub text: String,
    /// Whether the tile is part of the expected sentence.
    pub correct: bool,
}

/// A challenge together with the tiles offered for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Puzzle {
    pub challenge: Challenge,
    pub tiles: Vec<Tile>,
}

impl Puzzle {
    pub fn tile(&self, id: u32) -> Option<&Tile> {
        self.tiles.iter().find(|t| t.id == id)
    }
}

pub(crate) fn join_tokens<'a>(tokens: impl IntoIterator<Item = &'a str>) -> String {
    tokens.into_iter().collect::<Vec<_>>().join(" ")
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// Builds round content from a fixed lexicon.
#[derive(Debug, Clone)]
pub struct ChallengeGenerator {
    lexicon: Lexicon,
    pool: Vec<MatchPoolItem>,
}

impl ChallengeGenerator {
    /// Build a generator, rejecting lexicons that cannot produce a sentence.
    pub fn new(lexicon: Lexicon) -> Result<Self, LexiconError> {
        let usable_nouns = lexicon.nouns.iter().filter(|n| usable_noun(n)).count();
        if usable_nouns < 2 {
            return Err(LexiconError::InsufficientNouns(usable_nouns));
        }
        if !lexicon.verbs.iter().any(usable_verb) {
            return Err(LexiconError::NoVerbs);
        }

        let pool = build_match_pool(&lexicon);
        tracing::debug!(
            nouns = lexicon.nouns.len(),
            verbs = lexicon.verbs.len(),
            adjectives = lexicon.adjectives.len(),
            pool = pool.len(),
            "challenge generator ready"
        );
        Ok(Self { lexicon, pool })
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// The vocabulary pool, computed once at construction.
    pub fn pool(&self) -> &[MatchPoolItem] {
        &self.pool
    }

    /// Draw `k` distinct pool items and shuffle both columns independently.
    pub fn matching<R: Rng + ?Sized>(&self, k: usize, rng: &mut R) -> MatchSample {
        let k = k.min(self.pool.len());
        let items: Vec<MatchPoolItem> = self.pool.choose_multiple(rng, k).cloned().collect();

        let mut latin_column: Vec<String> = items.iter().map(|i| i.id.clone()).collect();
        let mut meaning_column = latin_column.clone();
        latin_column.shuffle(rng);
        meaning_column.shuffle(rng);

        MatchSample {
            items,
            latin_column,
            meaning_column,
        }
    }

    /// Build a sentence challenge and its tile set.
    pub fn construction<R: Rng + ?Sized>(&self, with_adjective: bool, rng: &mut R) -> Puzzle {
        let nouns: Vec<&Noun> = self.lexicon.nouns.iter().filter(|n| usable_noun(n)).collect();
        let verbs: Vec<&Verb> = self.lexicon.verbs.iter().filter(|v| usable_verb(v)).collect();

        // Subject and object are distinct entries; both lists are non-empty by
        // construction of the generator.
        let subject_idx = rng.gen_range(0..nouns.len());
        let mut object_idx = rng.gen_range(0..nouns.len() - 1);
        if object_idx >= subject_idx {
            object_idx += 1;
        }
        let subject = nouns[subject_idx];
        let object = nouns[object_idx];
        let verb = verbs[rng.gen_range(0..verbs.len())];

        let adjectives: Vec<&Adjective> = self
            .lexicon
            .adjectives
            .iter()
            .filter(|a| usable_adjective(a))
            .collect();

        let adjective = if with_adjective && !adjectives.is_empty() {
            let adjective = adjectives[rng.gen_range(0..adjectives.len())];
            let target = if rng.gen_bool(0.5) {
                AgreementTarget::Subject
            } else {
                AgreementTarget::Object
            };
            Some((adjective, target))
        } else {
            None
        };

        let challenge = build_challenge(subject, object, verb, adjective);
        let decoys = self.decoys(&challenge, subject, object, verb, adjective, &nouns, &verbs, rng);

        let mut tiles: Vec<(String, bool)> = challenge
            .tokens
            .iter()
            .map(|t| (t.text.clone(), true))
            .chain(decoys.into_iter().map(|d| (d, false)))
            .collect();
        tiles.shuffle(rng);

        let tiles = tiles
            .into_iter()
            .enumerate()
            .map(|(i, (text, correct))| Tile {
                id: i as u32,
                text,
                correct,
            })
            .collect();

        tracing::debug!(sentence = %challenge.sentence(), "construction challenge generated");
        Puzzle { challenge, tiles }
    }

    /// Case-confusion decoys for every used slot first, then extra
    /// distractors, deduplicated against the correct tokens and capped so the
    /// tile set never exceeds [`MAX_TILES`].
    #[allow(clippy::too_many_arguments)]
    fn decoys<R: Rng + ?Sized>(
        &self,
        challenge: &Challenge,
        subject: &Noun,
        object: &Noun,
        verb: &Verb,
        adjective: Option<(&Adjective, AgreementTarget)>,
        nouns: &[&Noun],
        verbs: &[&Verb],
        rng: &mut R,
    ) -> Vec<String> {
        let mut slot_decoys = vec![
            resolve_noun_form(subject, Case::Accusative).to_string(),
            resolve_noun_form(object, Case::Nominative).to_string(),
        ];
        let other_verbs: Vec<&Verb> = verbs.iter().copied().filter(|v| v.id != verb.id).collect();
        if let Some(other) = other_verbs.choose(rng) {
            slot_decoys.push(resolve_verb_form(other).to_string());
        }
        if let Some((adj, target)) = adjective {
            let noun = match target {
                AgreementTarget::Subject => subject,
                AgreementTarget::Object => object,
            };
            slot_decoys.push(
                resolve_adjective_form(adj, target.case().other(), noun.gender).to_string(),
            );
        }

        let mut extras = vec![verb.first_person.clone()];
        for noun in nouns.iter().filter(|n| n.id != subject.id && n.id != object.id) {
            extras.push(resolve_noun_form(noun, Case::Nominative).to_string());
            extras.push(resolve_noun_form(noun, Case::Accusative).to_string());
        }
        extras.extend(other_verbs.iter().map(|v| resolve_verb_form(v).to_string()));
        if let Some((adj, target)) = adjective {
            let case = target.case();
            for gender in [Gender::Masculine, Gender::Feminine, Gender::Neuter] {
                extras.push(resolve_adjective_form(adj, case, gender).to_string());
            }
        }
        extras.shuffle(rng);

        let mut seen: HashSet<String> = challenge.tokens.iter().map(|t| t.text.clone()).collect();
        let room = MAX_TILES.saturating_sub(challenge.tokens.len());
        slot_decoys
            .into_iter()
            .chain(extras)
            .filter(|d| !d.is_empty() && seen.insert(d.clone()))
            .take(room)
            .collect()
    }
}

fn usable_noun(noun: &Noun) -> bool {
    !resolve_noun_form(noun, Case::Nominative).is_empty()
        && !resolve_noun_form(noun, Case::Accusative).is_empty()
}

fn usable_verb(verb: &Verb) -> bool {
    !resolve_verb_form(verb).is_empty()
}

/// Missing agreement cells fall back to the lemma, so a lemma is enough.
fn usable_adjective(adjective: &Adjective) -> bool {
    !adjective.lemma.is_empty()
}

fn build_challenge(
    subject: &Noun,
    object: &Noun,
    verb: &Verb,
    adjective: Option<(&Adjective, AgreementTarget)>,
) -> Challenge {
    let token = |text: &str, slot| ExpectedToken {
        text: text.to_string(),
        slot,
    };
    let subj = token(resolve_noun_form(subject, Case::Nominative), Slot::Subject);
    let obj = token(resolve_noun_form(object, Case::Accusative), Slot::Object);
    let vb = token(resolve_verb_form(verb), Slot::Verb);

    let mut hint = String::from(
        "Subject in the nominative, verb in the 3rd person, object in the accusative.",
    );

    let (tokens, subject_adj, object_adj) = match adjective {
        None => (vec![subj, vb, obj], None, None),
        Some((adj, target)) => {
            let noun = match target {
                AgreementTarget::Subject => subject,
                AgreementTarget::Object => object,
            };
            let form = resolve_adjective_form(adj, target.case(), noun.gender);
            hint.push_str(&format!(
                " The adjective agrees with the {target}: {} {}.",
                target.case(),
                noun.gender
            ));
            let adj_token = token(form, Slot::Adjective(target));
            match target {
                AgreementTarget::Subject => (
                    vec![adj_token, subj, vb, obj],
                    Some(adj.gloss.as_str()),
                    None,
                ),
                AgreementTarget::Object => (
                    vec![subj, vb, adj_token, obj],
                    None,
                    Some(adj.gloss.as_str()),
                ),
            }
        }
    };

    let gloss = capitalize(&format!(
        "{} {} {}.",
        noun_phrase(subject_adj, &subject.gloss),
        verb.gloss,
        noun_phrase(object_adj, &object.gloss)
    ));

    Challenge {
        subject: subject.id.clone(),
        object: object.id.clone(),
        verb: verb.id.clone(),
        adjective: adjective.map(|(a, _)| a.id.clone()),
        agreement: adjective.map(|(_, t)| t),
        tokens,
        gloss,
        hint,
    }
}

fn noun_phrase(adjective: Option<&str>, noun: &str) -> String {
    match adjective {
        Some(adj) => format!("the {adj} {noun}"),
        None => format!("the {noun}"),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
