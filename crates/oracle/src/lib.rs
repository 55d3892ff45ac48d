//! The Embedding Oracle interface consumed by the rest of the workspace.
//!
//! The real pretrained word-vector model (with lemmatization and
//! part-of-speech tagging) is treated as an opaque external capability —
//! this crate defines only the interface the Vocabulary Cache and Ranking
//! Engine need, plus one concrete, dependency-free adapter good enough to
//! run the whole system end to end.

mod error;
mod lemma;
mod pos;
mod vector_file;

pub use error::OracleError;
pub use vector_file::{StaticOracle, VectorFileOracle};

/// Coarse part-of-speech tag. `Other` covers function words, proper nouns,
/// and anything the tagger declines to classify as content-bearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartOfSpeech {
    Noun,
    Verb,
    Adjective,
    Adverb,
    Other,
}

impl PartOfSpeech {
    /// Whether this tag counts as "content-bearing" for §4.1's `meaningful`
    /// filter (noun, verb, adjective, adverb).
    pub fn is_content_bearing(self) -> bool {
        !matches!(self, PartOfSpeech::Other)
    }
}

/// A pretrained word-vector table with lemmatization and POS tagging,
/// consumed — never owned — by the Vocabulary Cache and Ranking Engine.
///
/// Implementations must be internally thread-safe for concurrent read-only
/// lookups (§5 "Shared-resource policy"); `Send + Sync` captures that.
pub trait EmbeddingOracle: Send + Sync {
    /// Whether a dense vector exists for `word`.
    fn has_vector(&self, word: &str) -> bool;

    /// The raw (not necessarily normalized) vector for `word`, if any.
    fn vector(&self, word: &str) -> Option<Vec<f32>>;

    /// Coarse part-of-speech tag for `word`.
    fn pos(&self, word: &str) -> PartOfSpeech;

    /// Stable, case-insensitive lemma (family key) for `word`.
    fn lemma(&self, word: &str) -> String;
}
