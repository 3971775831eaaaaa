//! Answer validation for both drill modes.

use serde::{Deserialize, Serialize};

use crate::generator::{join_tokens, Challenge, MatchSample};

/// Result of checking one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub correct: bool,
    /// Human-readable feedback for the learner.
    pub feedback: String,
}

impl Verdict {
    fn correct(feedback: impl Into<String>) -> Self {
        Self {
            correct: true,
            feedback: feedback.into(),
        }
    }

    fn incorrect(feedback: impl Into<String>) -> Self {
        Self {
            correct: false,
            feedback: feedback.into(),
        }
    }
}

/// Check a matching-mode pair.
///
/// A pair is correct iff both sides reference the same pool item.
pub fn check_pair(sample: &MatchSample, latin_id: &str, meaning_id: &str) -> Verdict {
    let (Some(latin), Some(meaning)) = (sample.item(latin_id), sample.item(meaning_id)) else {
        return Verdict::incorrect("That pair is not part of this round.");
    };

    if latin.id == meaning.id {
        return Verdict::correct(format!("{} = {}", latin.latin, meaning.meaning));
    }

    // Same lemma, different case: the classic nominative/accusative slip.
    let same_lemma = latin.id.split(':').next() == meaning.id.split(':').next();
    if same_lemma {
        Verdict::incorrect(format!(
            "Right word, wrong case: {} is {}.",
            latin.latin, latin.role
        ))
    } else {
        Verdict::incorrect(format!("{} does not mean \"{}\".", latin.latin, meaning.meaning))
    }
}

/// Check a construction-mode sentence.
///
/// Validation is sequence-exact: the space-joined submission must equal the
/// space-joined expected tokens, so word order carries grammatical role.
pub fn check_sentence(challenge: &Challenge, submitted: &[&str]) -> Verdict {
    let expected = challenge.sentence();
    let given = join_tokens(submitted.iter().copied());

    if given == expected {
        return Verdict::correct(format!("Recte! {expected} = {}", challenge.gloss));
    }

    let mismatch = challenge
        .tokens
        .iter()
        .zip(submitted)
        .position(|(token, text)| token.text != *text);

    match mismatch {
        Some(i) => Verdict::incorrect(format!(
            "Word {} should be {}.",
            i + 1,
            challenge.tokens[i].slot
        )),
        None => Verdict::incorrect(format!(
            "The sentence needs {} words.",
            challenge.tokens.len()
        )),
    }
}
