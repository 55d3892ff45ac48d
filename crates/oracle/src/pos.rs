use crate::PartOfSpeech;

/// Curated closed-class and high-frequency word lists used to assign a
/// coarse part-of-speech tag. This is a deliberately small heuristic
/// stand-in for the real tagger the spec treats as an opaque capability
/// (§6 "Embedding Oracle interface (consumed)") — good enough to exercise
/// `meaningful` filtering, not a claim of linguistic accuracy.
const COMMON_VERBS: &[&str] = &[
    "run", "walk", "jump", "eat", "drink", "sleep", "think", "speak", "write", "read",
    "play", "sing", "dance", "swim", "fly", "drive", "build", "break", "make", "take",
    "give", "see", "hear", "feel", "know", "go", "come", "love", "hate", "want",
    "need", "work", "rest", "grow", "fall", "rise", "fight", "win", "lose", "help",
];

const COMMON_ADJECTIVES: &[&str] = &[
    "happy", "sad", "big", "small", "fast", "slow", "hot", "cold", "bright", "dark",
    "loud", "quiet", "strong", "weak", "rich", "poor", "clean", "dirty", "new", "old",
    "young", "tall", "short", "heavy", "light", "soft", "hard", "sweet", "bitter", "smooth",
];

const COMMON_ADVERBS: &[&str] = &[
    "quickly", "slowly", "quietly", "loudly", "happily", "sadly", "often", "rarely",
    "always", "never", "soon", "later", "today", "yesterday", "tomorrow", "here", "there",
];

/// Best-effort part-of-speech guess for a lowercase word. Falls back to
/// [`PartOfSpeech::Noun`] for anything not found in a closed-class list and
/// not matching an adverbial `-ly` suffix, mirroring the fact that nouns
/// dominate a typical curated word list.
pub fn tag(word: &str) -> PartOfSpeech {
    if COMMON_VERBS.contains(&word) {
        return PartOfSpeech::Verb;
    }
    if COMMON_ADJECTIVES.contains(&word) {
        return PartOfSpeech::Adjective;
    }
    if COMMON_ADVERBS.contains(&word) || (word.ends_with("ly") && word.len() > 3) {
        return PartOfSpeech::Adverb;
    }
    if word.ends_with("ing") || word.ends_with("ed") {
        return PartOfSpeech::Verb;
    }
    PartOfSpeech::Noun
}
