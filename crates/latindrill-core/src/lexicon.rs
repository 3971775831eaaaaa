//! Lexicon tables: nouns, verbs and adjectives with their inflected forms.
//!
//! A [`Lexicon`] is built once at startup (from the built-in tables or from a
//! TOML file, see [`crate::parser`]) and is never mutated afterwards.

use std::collections::BTreeMap;

use crate::model::{Case, Gender};

/// A noun with its singular nominative and accusative forms.
#[derive(Debug, Clone, PartialEq)]
pub struct Noun {
    pub id: String,
    pub lemma: String,
    /// Declension class, 1 through 3.
    pub declension: u8,
    pub gender: Gender,
    /// English gloss, without article (e.g. "girl").
    pub gloss: String,
    pub forms: BTreeMap<Case, String>,
}

/// A verb with its present-tense singular forms.
#[derive(Debug, Clone, PartialEq)]
pub struct Verb {
    pub id: String,
    /// First person singular present (e.g. "porto").
    pub first_person: String,
    /// Third person singular present (e.g. "portat").
    pub third_person: String,
    /// English third person gloss (e.g. "carries").
    pub gloss: String,
    /// Descriptive conjugation label; not used for inflection.
    pub conjugation: String,
}

/// An adjective with its case/gender agreement table.
#[derive(Debug, Clone, PartialEq)]
pub struct Adjective {
    pub id: String,
    pub lemma: String,
    pub gloss: String,
    pub forms: BTreeMap<Case, BTreeMap<Gender, String>>,
}

/// Any lexical entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LexicalEntry<'a> {
    Noun(&'a Noun),
    Verb(&'a Verb),
    Adjective(&'a Adjective),
}

impl<'a> LexicalEntry<'a> {
    /// Identifier of the entry, borrowed from the lexicon itself.
    pub fn id(&self) -> &'a str {
        match *self {
            LexicalEntry::Noun(n) => &n.id,
            LexicalEntry::Verb(v) => &v.id,
            LexicalEntry::Adjective(a) => &a.id,
        }
    }
}

/// The full, immutable set of drillable vocabulary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Lexicon {
    pub nouns: Vec<Noun>,
    pub verbs: Vec<Verb>,
    pub adjectives: Vec<Adjective>,
}

impl Lexicon {
    pub fn noun(&self, id: &str) -> Option<&Noun> {
        self.nouns.iter().find(|n| n.id == id)
    }

    pub fn verb(&self, id: &str) -> Option<&Verb> {
        self.verbs.iter().find(|v| v.id == id)
    }

    pub fn adjective(&self, id: &str) -> Option<&Adjective> {
        self.adjectives.iter().find(|a| a.id == id)
    }

    /// Every entry in table order: nouns, verbs, adjectives.
    pub fn entries(&self) -> impl Iterator<Item = LexicalEntry<'_>> {
        self.nouns
            .iter()
            .map(LexicalEntry::Noun)
            .chain(self.verbs.iter().map(LexicalEntry::Verb))
            .chain(self.adjectives.iter().map(LexicalEntry::Adjective))
    }

    pub fn len(&self) -> usize {
        self.nouns.len() + self.verbs.len() + self.adjectives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The lexicon shipped with the game.
    pub fn builtin() -> Self {
        let nouns = vec![
            noun("puella", 1, Gender::Feminine, "girl", "puella", "puellam"),
            noun("porta", 1, Gender::Feminine, "gate", "porta", "portam"),
            noun("regina", 1, Gender::Feminine, "queen", "regina", "reginam"),
            noun("agricola", 1, Gender::Masculine, "farmer", "agricola", "agricolam"),
            noun("nauta", 1, Gender::Masculine, "sailor", "nauta", "nautam"),
            noun("servus", 2, Gender::Masculine, "slave", "servus", "servum"),
            noun("dominus", 2, Gender::Masculine, "master", "dominus", "dominum"),
            noun("amicus", 2, Gender::Masculine, "friend", "amicus", "amicum"),
            noun("equus", 2, Gender::Masculine, "horse", "equus", "equum"),
            noun("oppidum", 2, Gender::Neuter, "town", "oppidum", "oppidum"),
            noun("rex", 3, Gender::Masculine, "king", "rex", "regem"),
            noun("miles", 3, Gender::Masculine, "soldier", "miles", "militem"),
            noun("mater", 3, Gender::Feminine, "mother", "mater", "matrem"),
            noun("urbs", 3, Gender::Feminine, "city", "urbs", "urbem"),
        ];

        let verbs = vec![
            verb("amare", "amo", "amat", "loves", "1st (-are)"),
            verb("portare", "porto", "portat", "carries", "1st (-are)"),
            verb("laudare", "laudo", "laudat", "praises", "1st (-are)"),
            verb("vocare", "voco", "vocat", "calls", "1st (-are)"),
            verb("videre", "video", "videt", "sees", "2nd (-ere)"),
            verb("habere", "habeo", "habet", "has", "2nd (-ere)"),
            verb("regere", "rego", "regit", "rules", "3rd (-ere)"),
            verb("audire", "audio", "audit", "hears", "4th (-ire)"),
        ];

        let adjectives = vec![
            first_second("magnus", "big", "magn"),
            first_second("bonus", "good", "bon"),
            first_second("parvus", "small", "parv"),
            first_second("laetus", "happy", "laet"),
            // Neuter cells are deliberately absent; the resolver falls back
            // to the lemma for them.
            adjective(
                "fortis",
                "brave",
                &[
                    (Case::Nominative, Gender::Masculine, "fortis"),
                    (Case::Nominative, Gender::Feminine, "fortis"),
                    (Case::Accusative, Gender::Masculine, "fortem"),
                    (Case::Accusative, Gender::Feminine, "fortem"),
                ],
            ),
        ];

        Self {
            nouns,
            verbs,
            adjectives,
        }
    }
}

fn noun(lemma: &str, declension: u8, gender: Gender, gloss: &str, nom: &str, acc: &str) -> Noun {
    Noun {
        id: lemma.to_string(),
        lemma: lemma.to_string(),
        declension,
        gender,
        gloss: gloss.to_string(),
        forms: BTreeMap::from([
            (Case::Nominative, nom.to_string()),
            (Case::Accusative, acc.to_string()),
        ]),
    }
}

fn verb(id: &str, first: &str, third: &str, gloss: &str, conjugation: &str) -> Verb {
    Verb {
        id: id.to_string(),
        first_person: first.to_string(),
        third_person: third.to_string(),
        gloss: gloss.to_string(),
        conjugation: conjugation.to_string(),
    }
}

fn adjective<S: AsRef<str>>(lemma: &str, gloss: &str, cells: &[(Case, Gender, S)]) -> Adjective {
    let mut forms: BTreeMap<Case, BTreeMap<Gender, String>> = BTreeMap::new();
    for (case, gender, form) in cells {
        forms
            .entry(*case)
            .or_default()
            .insert(*gender, form.as_ref().to_string());
    }
    Adjective {
        id: lemma.to_string(),
        lemma: lemma.to_string(),
        gloss: gloss.to_string(),
        forms,
    }
}

/// A regular first/second declension adjective (-us, -a, -um).
fn first_second(lemma: &str, gloss: &str, stem: &str) -> Adjective {
    adjective(
        lemma,
        gloss,
        &[
            (Case::Nominative, Gender::Masculine, format!("{stem}us")),
            (Case::Nominative, Gender::Feminine, format!("{stem}a")),
            (Case::Nominative, Gender::Neuter, format!("{stem}um")),
            (Case::Accusative, Gender::Masculine, format!("{stem}um")),
            (Case::Accusative, Gender::Feminine, format!("{stem}am")),
            (Case::Accusative, Gender::Neuter, format!("{stem}um")),
        ],
    )
}
