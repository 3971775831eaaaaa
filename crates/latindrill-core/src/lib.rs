//! latindrill-core — Lexicon, challenge generation, validation and the round
//! engine for a timed Latin grammar drill.
//!
//! The crate is free of I/O apart from lexicon file parsing. Storage, speech
//! and time enter through the capabilities in [`traits`].

pub mod clock;
pub mod error;
pub mod forms;
pub mod generator;
pub mod lexicon;
pub mod model;
pub mod parser;
pub mod progress;
pub mod progression;
pub mod round;
pub mod scoring;
pub mod session;
pub mod traits;
pub mod validator;
