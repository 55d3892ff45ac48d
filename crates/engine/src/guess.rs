use wordrank_oracle::EmbeddingOracle;
use wordrank_vocab::VocabularyCache;

use crate::error::EngineError;
use crate::ranking::RankingOutput;

/// Outcome of resolving one guess against a room's [`RankingOutput`]
/// (§4.2 "Guess resolution").
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuessResolution {
    pub rank: usize,
    pub similarity: f32,
    pub is_correct: bool,
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

/// Resolve `guess` (already validated as non-empty lowercase letters) to a
/// rank and similarity against `ranking`.
///
/// Takes the O(1) exact path when the guess's lemma family is already in
/// `ranking.rank_of_family`; otherwise falls back to the O(total_words)
/// estimated path (§4.2).
pub fn resolve_guess(
    guess: &str,
    cache: &VocabularyCache,
    ranking: &RankingOutput,
    oracle: &dyn EmbeddingOracle,
) -> Result<GuessResolution, EngineError> {
    if !oracle.has_vector(guess) {
        return Err(EngineError::UnknownWord(guess.to_string()));
    }

    let family_key = oracle.lemma(guess);

    if let Some(rank) = ranking.rank_of(&family_key) {
        let similarity = ranking.ranked[rank - 1].similarity;
        return Ok(GuessResolution {
            rank,
            similarity,
            is_correct: rank == 1,
        });
    }

    let guess_vec = match cache.vector_row(guess) {
        Some(row) => row.to_vec(),
        None => l2_normalize(
            oracle
                .vector(guess)
                .ok_or_else(|| EngineError::UnknownWord(guess.to_string()))?,
        ),
    };
    let similarity = dot(&guess_vec, &ranking.target_vec);
    let rank = 1 + ranking
        .ranked
        .iter()
        .filter(|entry| entry.similarity > similarity)
        .count();

    Ok(GuessResolution {
        rank,
        similarity,
        is_correct: rank == 1,
    })
}
