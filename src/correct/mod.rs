//! Corpus-driven spelling correction.
//!
//! A [`Vocabulary`] is counted once over all extracted texts; a
//! [`SpellCorrector`] then rewrites each text against it. Both stages work on
//! the [`tokenize`] word model, which keeps separators byte-exact.

pub mod spell;
pub mod tokenize;
pub mod vocabulary;

pub use spell::SpellCorrector;
pub use tokenize::{tokenize, Token};
pub use vocabulary::Vocabulary;
