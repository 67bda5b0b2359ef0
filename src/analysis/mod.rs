//! Transient analyses over the headline table.
//!
//! Everything in here is pure: functions take headline text (or derived
//! tokens) and return counts and scores. Nothing touches the network or the
//! filesystem, so the whole layer is exercised directly by unit tests.
//!
//! - [`text`]: normalization, tokenization, stopword filtering, word frequency
//! - [`sentiment`]: lexicon-based polarity scoring with negation handling
//! - [`entities`]: heuristic extraction of people and places

pub mod entities;
pub mod sentiment;
pub mod text;
