use std::collections::HashMap;
use std::sync::LazyLock;

/// Irregular surface → lemma mappings that the suffix-stripping rules below
/// would get wrong (`ran` → `run`, not `ran`; `mice` → `mouse`).
static IRREGULAR: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("ran", "run"),
        ("running", "run"),
        ("runs", "run"),
        ("went", "go"),
        ("going", "go"),
        ("goes", "go"),
        ("ate", "eat"),
        ("eating", "eat"),
        ("eats", "eat"),
        ("mice", "mouse"),
        ("children", "child"),
        ("feet", "foot"),
        ("teeth", "tooth"),
        ("geese", "goose"),
        ("men", "man"),
        ("women", "woman"),
        ("better", "good"),
        ("best", "good"),
        ("worse", "bad"),
        ("worst", "bad"),
    ])
});

/// Returns the lemma (family key) for a lowercase word.
///
/// Groups morphological variants under a single surface so the Ranking
/// Engine can treat `"cat"`, `"cats"` as the same family (§4.2). This is a
/// suffix-stripping heuristic, not a dictionary lemmatizer — adequate for
/// grouping common English inflections, not a claim of completeness.
pub fn lemmatize(word: &str) -> String {
    if let Some(&lemma) = IRREGULAR.get(word) {
        return lemma.to_string();
    }

    if let Some(stem) = word.strip_suffix("ies") {
        if stem.len() >= 2 {
            return format!("{stem}y");
        }
    }
    if let Some(stem) = word.strip_suffix("ied") {
        if stem.len() >= 2 {
            return format!("{stem}y");
        }
    }
    if let Some(stem) = word.strip_suffix("sses") {
        return format!("{stem}ss");
    }
    if let Some(stem) = word.strip_suffix("es") {
        if stem.ends_with(['s', 'x', 'z', 'h']) {
            return stem.to_string();
        }
    }
    if let Some(stem) = word.strip_suffix("ing") {
        return restore_silent_e(stem);
    }
    if let Some(stem) = word.strip_suffix("ed") {
        return restore_silent_e(stem);
    }
    if let Some(stem) = word.strip_suffix('s') {
        if !word.ends_with("ss") && stem.len() >= 2 {
            return stem.to_string();
        }
    }

    word.to_string()
}

/// `hoping` → `hope`, `running` → `runn` (caller handles doubled consonants
/// via the irregular table when the double-strip result isn't a real word;
/// for unknown words we accept the imperfect stem since it still groups
/// `hoping`/`hoped` together, which is what rank grouping needs).
fn restore_silent_e(stem: &str) -> String {
    if stem.len() < 2 {
        return stem.to_string();
    }
    let bytes = stem.as_bytes();
    let last = bytes[bytes.len() - 1];
    let second_last = bytes[bytes.len() - 2];
    let consonants = b"bcdfgjklmnpqrtvwxz";
    if last == second_last && consonants.contains(&last) {
        return stem[..stem.len() - 1].to_string();
    }
    stem.to_string()
}
