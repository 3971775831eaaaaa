//! The `latindrill lexicon` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use latindrill_core::forms::{resolve_adjective_form, resolve_noun_form, resolve_verb_form};
use latindrill_core::generator::ChallengeGenerator;
use latindrill_core::lexicon::Lexicon;
use latindrill_core::model::{Case, Gender};
use latindrill_core::parser;

pub fn execute(config_path: Option<PathBuf>, file: Option<PathBuf>, check: bool) -> Result<()> {
    let config = super::load_config(config_path)?;
    let lexicon = match file.as_deref().or(config.lexicon.as_deref()) {
        Some(path) => parser::parse_lexicon(path)?,
        None => Lexicon::builtin(),
    };

    if check {
        return check_lexicon(lexicon);
    }

    let mut nouns = Table::new();
    nouns.set_header(vec!["Noun", "Nominative", "Accusative", "Gender", "Decl.", "Meaning"]);
    for noun in &lexicon.nouns {
        nouns.add_row(vec![
            Cell::new(&noun.id),
            Cell::new(resolve_noun_form(noun, Case::Nominative)),
            Cell::new(resolve_noun_form(noun, Case::Accusative)),
            Cell::new(noun.gender),
            Cell::new(noun.declension),
            Cell::new(&noun.gloss),
        ]);
    }
    println!("{nouns}");

    let mut verbs = Table::new();
    verbs.set_header(vec!["Verb", "1st sg.", "3rd sg.", "Conj.", "Meaning"]);
    for verb in &lexicon.verbs {
        verbs.add_row(vec![
            Cell::new(&verb.id),
            Cell::new(&verb.first_person),
            Cell::new(resolve_verb_form(verb)),
            Cell::new(&verb.conjugation),
            Cell::new(&verb.gloss),
        ]);
    }
    println!("{verbs}");

    if !lexicon.adjectives.is_empty() {
        let mut adjectives = Table::new();
        adjectives.set_header(vec!["Adjective", "Nom. m/f/n", "Acc. m/f/n", "Meaning"]);
        for adjective in &lexicon.adjectives {
            let row = |case| {
                [Gender::Masculine, Gender::Feminine, Gender::Neuter]
                    .map(|g| resolve_adjective_form(adjective, case, g))
                    .join(" / ")
            };
            adjectives.add_row(vec![
                Cell::new(&adjective.id),
                Cell::new(row(Case::Nominative)),
                Cell::new(row(Case::Accusative)),
                Cell::new(&adjective.gloss),
            ]);
        }
        println!("{adjectives}");
    }

    println!("{} entries.", lexicon.len());
    Ok(())
}

fn check_lexicon(lexicon: Lexicon) -> Result<()> {
    println!(
        "Lexicon: {} nouns, {} verbs, {} adjectives",
        lexicon.nouns.len(),
        lexicon.verbs.len(),
        lexicon.adjectives.len()
    );

    let warnings = parser::validate_lexicon(&lexicon);
    for w in &warnings {
        println!("  [{}] WARNING: {}", w.entry_id, w.message);
    }

    let generator =
        ChallengeGenerator::new(lexicon).context("lexicon cannot produce challenges")?;
    println!("Vocabulary pool: {} items", generator.pool().len());

    if warnings.is_empty() {
        println!("Lexicon valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }
    Ok(())
}
