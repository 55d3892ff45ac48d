use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use wordrank_config::VocabConfig;
use wordrank_oracle::EmbeddingOracle;

use crate::wordlist::load_word_list;

/// Process-wide, immutable-after-initialization vocabulary snapshot (§3
/// "Vocabulary Cache").
pub struct VocabularyCache {
    words: Vec<String>,
    meaningful: Vec<String>,
    vecs: Vec<Vec<f32>>,
    vec_words: Vec<String>,
    vec_index: HashMap<String, usize>,
    family_key: HashMap<String, String>,
    dim: usize,
}

impl VocabularyCache {
    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn meaningful(&self) -> &[String] {
        &self.meaningful
    }

    pub fn vec_words(&self) -> &[String] {
        &self.vec_words
    }

    pub fn vecs(&self) -> &[Vec<f32>] {
        &self.vecs
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Unit vector for `word` if it is among `vec_words`, read directly from
    /// the matrix (no oracle round-trip).
    pub fn vector_row(&self, word: &str) -> Option<&[f32]> {
        self.vec_index.get(word).map(|&i| self.vecs[i].as_slice())
    }

    pub fn has_vector_row(&self, word: &str) -> bool {
        self.vec_index.contains_key(word)
    }

    /// Lemma (family key) for any word in `words`. Falls back to `None` for
    /// words outside the curated list (e.g. a guess the oracle still knows
    /// about but which never appeared in the vocabulary file).
    pub fn family_key(&self, word: &str) -> Option<&str> {
        self.family_key.get(word).map(String::as_str)
    }
}

/// L2-normalize `v` in place; returns `false` (leaving `v` untouched) for a
/// degenerate zero vector, which the caller should treat as "no usable
/// vector" rather than dividing by zero.
fn normalize(v: &mut [f32]) -> bool {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm <= f32::EPSILON {
        return false;
    }
    for x in v.iter_mut() {
        *x /= norm;
    }
    true
}

fn build(
    oracle: &dyn EmbeddingOracle,
    words: Vec<String>,
    config: &VocabConfig,
) -> VocabularyCache {
    let allowed_pos: Vec<String> = config
        .meaningful_pos
        .iter()
        .map(|p| p.to_lowercase())
        .collect();

    let pool_size = config.meaningful_pool_size.min(words.len());
    let meaningful: Vec<String> = words[..pool_size]
        .iter()
        .filter(|w| {
            oracle.has_vector(w)
                && allowed_pos.contains(&pos_slug(oracle.pos(w)).to_string())
        })
        .cloned()
        .collect();

    let rank_pool = match config.rank_size {
        Some(n) => &words[..n.min(words.len())],
        None => &words[..],
    };

    let mut vecs = Vec::new();
    let mut vec_words = Vec::new();
    let mut vec_index = HashMap::new();
    let mut dim = 0usize;

    for w in rank_pool {
        let Some(mut v) = oracle.vector(w) else {
            continue;
        };
        if dim == 0 {
            dim = v.len();
        }
        if !normalize(&mut v) {
            continue;
        }
        vec_index.insert(w.clone(), vecs.len());
        vecs.push(v);
        vec_words.push(w.clone());
    }

    let family_key: HashMap<String, String> =
        words.iter().map(|w| (w.clone(), oracle.lemma(w))).collect();

    info!(
        words = words.len(),
        meaningful = meaningful.len(),
        vec_words = vec_words.len(),
        dim,
        "vocabulary cache built"
    );

    VocabularyCache {
        words,
        meaningful,
        vecs,
        vec_words,
        vec_index,
        family_key,
        dim,
    }
}

fn pos_slug(pos: wordrank_oracle::PartOfSpeech) -> &'static str {
    use wordrank_oracle::PartOfSpeech::*;
    match pos {
        Noun => "noun",
        Verb => "verb",
        Adjective => "adjective",
        Adverb => "adverb",
        Other => "other",
    }
}

/// Coalescing, one-time initializer for a [`VocabularyCache`] (§4.1
/// "Contract"). Concurrent first calls share the same in-flight build;
/// later calls return the cached result immediately.
pub struct VocabularyCacheCell {
    inner: tokio::sync::OnceCell<Arc<VocabularyCache>>,
}

impl VocabularyCacheCell {
    pub fn new() -> Self {
        Self {
            inner: tokio::sync::OnceCell::new(),
        }
    }

    /// Returns the cache if already initialized, without blocking.
    pub fn get(&self) -> Option<Arc<VocabularyCache>> {
        self.inner.get().cloned()
    }

    /// Build (or await the in-flight build of) the cache. The CPU-heavy
    /// work runs on the blocking thread pool so the caller's event loop
    /// never stalls on it (§5 "Scheduling model").
    pub async fn ensure_initialized(
        &self,
        oracle: Arc<dyn EmbeddingOracle>,
        config: VocabConfig,
    ) -> Result<Arc<VocabularyCache>> {
        self.inner
            .get_or_try_init(|| async move {
                let words = load_word_list(&config.path)
                    .with_context(|| "loading vocabulary word list")?;
                let cache = tokio::task::spawn_blocking(move || build(oracle.as_ref(), words, &config))
                    .await
                    .context("vocabulary cache build task panicked")?;
                Ok::<_, anyhow::Error>(Arc::new(cache))
            })
            .await
            .cloned()
    }
}

impl Default for VocabularyCacheCell {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap as Map;
    use wordrank_oracle::StaticOracle;

    fn sample_oracle() -> StaticOracle {
        StaticOracle::new(Map::from([
            ("cat".to_string(), vec![1.0, 0.0, 0.0]),
            ("cats".to_string(), vec![0.9, 0.1, 0.0]),
            ("dog".to_string(), vec![0.0, 1.0, 0.0]),
            ("run".to_string(), vec![0.0, 0.0, 1.0]),
        ]))
    }

    fn sample_config() -> VocabConfig {
        VocabConfig {
            path: String::new(),
            embedding_model_name: "test".to_string(),
            rank_size: None,
            meaningful_pool_size: 10,
            meaningful_pos: vec!["noun".to_string(), "verb".to_string()],
        }
    }

    #[test]
    fn rows_are_l2_normalized() {
        let words = vec!["cat".to_string(), "dog".to_string(), "run".to_string()];
        let cache = build(&sample_oracle(), words, &sample_config());
        for row in cache.vecs() {
            let norm: f32 = row.iter().map(|x| x * x).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn vec_words_excludes_words_without_vectors() {
        let words = vec!["cat".to_string(), "unknown".to_string()];
        let cache = build(&sample_oracle(), words, &sample_config());
        assert_eq!(cache.vec_words(), &["cat".to_string()]);
    }

    #[test]
    fn rank_size_caps_the_ranked_pool() {
        let words = vec!["cat".to_string(), "dog".to_string(), "run".to_string()];
        let mut config = sample_config();
        config.rank_size = Some(1);
        let cache = build(&sample_oracle(), words, &config);
        assert_eq!(cache.vec_words().len(), 1);
        assert_eq!(cache.vec_words()[0], "cat");
    }

    #[tokio::test]
    async fn ensure_initialized_is_idempotent() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        use std::io::Write;
        writeln!(file, "cat").unwrap();
        writeln!(file, "dog").unwrap();
        writeln!(file, "run").unwrap();
        file.flush().unwrap();

        let mut config = sample_config();
        config.path = file.path().to_string_lossy().to_string();

        let cell = VocabularyCacheCell::new();
        let oracle: Arc<dyn EmbeddingOracle> = Arc::new(sample_oracle());

        let first = cell
            .ensure_initialized(oracle.clone(), config.clone())
            .await
            .unwrap();
        let second = cell.ensure_initialized(oracle, config).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }
}
