//! Lexicon configuration errors.
//!
//! These are the only fatal conditions in the engine: a lexicon that cannot
//! supply a playable challenge is rejected when the generator is built, never
//! in the middle of a round.

use thiserror::Error;

/// Errors raised when a lexicon cannot be used to generate drills.
#[derive(Debug, Error)]
pub enum LexiconError {
    /// Construction mode needs a subject and a distinct object.
    #[error("lexicon needs at least two usable nouns, found {0}")]
    InsufficientNouns(usize),

    /// Every sentence needs a verb.
    #[error("lexicon has no usable verbs")]
    NoVerbs,

    /// Two entries share an identifier.
    #[error("duplicate lexicon identifier: {0}")]
    DuplicateId(String),

    /// A noun claims a declension outside 1..=3.
    #[error("noun '{id}' has unsupported declension {declension}")]
    InvalidDeclension { id: String, declension: u8 },

    /// A lexicon file could not be parsed.
    #[error("invalid lexicon file: {0}")]
    Parse(String),
}

impl LexiconError {
    /// Returns `true` if this error comes from authoring content rather than
    /// from the lexicon simply being too small.
    pub fn is_authoring_defect(&self) -> bool {
        matches!(
            self,
            LexiconError::DuplicateId(_)
                | LexiconError::InvalidDeclension { .. }
                | LexiconError::Parse(_)
        )
    }
}
