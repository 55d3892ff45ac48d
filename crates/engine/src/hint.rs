use std::collections::HashSet;

use crate::ranking::{RankedEntry, RankingOutput};

/// Pick the next hint (§4.2 "Hints").
///
/// `best_rank` is the best rank achieved by any guess in the room so far
/// (or `total_words` if nothing has been guessed yet). Starts at
/// `max(1, best_rank / 2)` and walks down toward rank 1 looking for a
/// representative that hasn't already been hinted, stopping unconditionally
/// at rank 1.
pub fn next_hint<'a>(ranking: &'a RankingOutput, best_rank: usize, hints_given: &HashSet<String>) -> &'a RankedEntry {
    let start = (best_rank / 2).max(1).min(ranking.total_words());
    let mut rank_one = &ranking.ranked[0];
    for r in (1..=start).rev() {
        let entry = &ranking.ranked[r - 1];
        if r == 1 {
            rank_one = entry;
        }
        if !hints_given.contains(&entry.representative_word) {
            return entry;
        }
    }
    rank_one
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranking(total: usize) -> RankingOutput {
        let ranked: Vec<RankedEntry> = (0..total)
            .map(|i| RankedEntry {
                family_key: format!("f{i}"),
                representative_word: format!("w{i}"),
                similarity: 1.0 - (i as f32) * 0.01,
            })
            .collect();
        let rank_of_family = ranked
            .iter()
            .enumerate()
            .map(|(i, e)| (e.family_key.clone(), i + 1))
            .collect();
        RankingOutput {
            target_word: "w0".to_string(),
            target_vec: vec![1.0, 0.0],
            ranked,
            rank_of_family,
        }
    }

    #[test]
    fn first_hint_is_halfway_to_the_best_rank() {
        let ranking = ranking(8000);
        let hinted = HashSet::new();
        let hint = next_hint(&ranking, 8000, &hinted);
        assert_eq!(hint.representative_word, "w3999");
    }

    #[test]
    fn second_hint_skips_the_already_hinted_word() {
        let ranking = ranking(8000);
        let mut hinted = HashSet::new();
        let first = next_hint(&ranking, 8000, &hinted).representative_word.clone();
        hinted.insert(first.clone());

        let second = next_hint(&ranking, 4000, &hinted);
        assert_ne!(second.representative_word, first);
    }

    #[test]
    fn falls_back_to_rank_one_when_everything_below_is_hinted() {
        let ranking = ranking(4);
        let mut hinted = HashSet::new();
        hinted.insert("w0".to_string());
        hinted.insert("w1".to_string());
        let hint = next_hint(&ranking, 2, &hinted);
        assert_eq!(hint.representative_word, "w0");
    }
}
