//! The process-wide Vocabulary Cache (§3, §4.1 of the spec).

mod cache;
mod wordlist;

pub use cache::{VocabularyCache, VocabularyCacheCell};
pub use wordlist::load_word_list;
