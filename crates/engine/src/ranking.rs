use std::collections::HashMap;

use rand::seq::SliceRandom;
use tracing::info;

use wordrank_oracle::EmbeddingOracle;
use wordrank_vocab::VocabularyCache;

use crate::error::EngineError;

/// One family's position in the similarity ranking against a target.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry {
    pub family_key: String,
    pub representative_word: String,
    pub similarity: f32,
}

/// The immutable, per-room output of ranking the entire vocabulary against
/// one target word (§3 "Ranking Engine output").
#[derive(Debug, Clone)]
pub struct RankingOutput {
    pub target_word: String,
    pub target_vec: Vec<f32>,
    pub ranked: Vec<RankedEntry>,
    pub rank_of_family: HashMap<String, usize>,
}

impl RankingOutput {
    /// `total_words` in the spec's vocabulary — the "N" shown to users.
    pub fn total_words(&self) -> usize {
        self.ranked.len()
    }

    pub fn rank_of(&self, family_key: &str) -> Option<usize> {
        self.rank_of_family.get(family_key).copied()
    }

    pub fn top(&self, n: usize) -> &[RankedEntry] {
        &self.ranked[..n.min(self.ranked.len())]
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn l2_normalize(mut v: Vec<f32>) -> Vec<f32> {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
    v
}

/// Resolve the target's unit vector, preferring the cache's precomputed
/// (already-normalized) row over a fresh oracle lookup (§4.2 step 1).
fn target_vector(
    cache: &VocabularyCache,
    oracle: &dyn EmbeddingOracle,
    target: &str,
) -> Result<Vec<f32>, EngineError> {
    if let Some(row) = cache.vector_row(target) {
        return Ok(row.to_vec());
    }
    let raw = oracle
        .vector(target)
        .ok_or_else(|| EngineError::UnknownTarget(target.to_string()))?;
    Ok(l2_normalize(raw))
}

/// Build the per-room Ranking Engine output for `target_word` (§4.2
/// "Algorithm"). Pure function of the target and the Vocabulary Cache —
/// safe to run on a blocking thread pool worker.
pub fn build(
    target_word: &str,
    cache: &VocabularyCache,
    oracle: &dyn EmbeddingOracle,
) -> Result<RankingOutput, EngineError> {
    let target_vec = target_vector(cache, oracle, target_word)?;

    // Group by family, keeping the highest-similarity representative.
    let mut best_by_family: HashMap<String, (String, f32)> = HashMap::new();
    for word in cache.vec_words() {
        let row = cache
            .vector_row(word)
            .expect("vec_words entries always have a row");
        let sim = dot(row, &target_vec);
        let fk = cache
            .family_key(word)
            .map(str::to_string)
            .unwrap_or_else(|| oracle.lemma(word));

        best_by_family
            .entry(fk)
            .and_modify(|(rep, best_sim)| {
                if sim > *best_sim || (sim == *best_sim && word < rep.as_str()) {
                    *rep = word.clone();
                    *best_sim = sim;
                }
            })
            .or_insert((word.clone(), sim));
    }

    // Sort descending by similarity; ties broken lexicographically ascending
    // for determinism (§4.2 step 4).
    let mut ranked: Vec<RankedEntry> = best_by_family
        .into_iter()
        .map(|(family_key, (representative_word, similarity))| RankedEntry {
            family_key,
            representative_word,
            similarity,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.representative_word.cmp(&b.representative_word))
    });

    let rank_of_family: HashMap<String, usize> = ranked
        .iter()
        .enumerate()
        .map(|(i, entry)| (entry.family_key.clone(), i + 1))
        .collect();

    info!(
        target = target_word,
        total_words = ranked.len(),
        "ranking engine built"
    );

    Ok(RankingOutput {
        target_word: target_word.to_string(),
        target_vec,
        ranked,
        rank_of_family,
    })
}

/// Pick a target: the caller-supplied word (validated against the oracle)
/// or a uniform-random pick from `meaningful` (§4.2 "Target selection").
pub fn select_target(
    cache: &VocabularyCache,
    oracle: &dyn EmbeddingOracle,
    requested: Option<&str>,
) -> Result<String, EngineError> {
    if let Some(word) = requested {
        let word = word.to_lowercase();
        if !oracle.has_vector(&word) {
            return Err(EngineError::UnknownTarget(word));
        }
        return Ok(word);
    }

    cache
        .meaningful()
        .choose(&mut rand::thread_rng())
        .cloned()
        .ok_or(EngineError::EmptyVocabulary)
}
