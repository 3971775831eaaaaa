//! Form resolution: lexical entry + grammatical selector → surface string.

use crate::lexicon::{Adjective, Noun, Verb};
use crate::model::{Case, Gender};

/// Surface form of a noun in the given case.
///
/// Returns an empty string when the lexicon has no form for the case; callers
/// treat empty forms as content defects and leave them out of drills.
pub fn resolve_noun_form(noun: &Noun, case: Case) -> &str {
    noun.forms.get(&case).map(String::as_str).unwrap_or("")
}

/// Surface form of an adjective agreeing with a noun of `gender` in `case`.
///
/// Cells missing from the agreement table (or left empty) fall back to the
/// lemma.
pub fn resolve_adjective_form(adjective: &Adjective, case: Case, gender: Gender) -> &str {
    match adjective
        .forms
        .get(&case)
        .and_then(|by_gender| by_gender.get(&gender))
        .filter(|form| !form.is_empty())
    {
        Some(form) => form,
        None => {
            tracing::debug!(
                adjective = %adjective.id,
                %case,
                %gender,
                "no agreement form, falling back to lemma"
            );
            &adjective.lemma
        }
    }
}

/// Third person singular present of a verb.
pub fn resolve_verb_form(verb: &Verb) -> &str {
    &verb.third_person
}
