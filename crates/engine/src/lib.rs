//! The per-room Ranking Engine (§4.2 of the spec): builds a dense,
//! family-grouped similarity ranking of the vocabulary against a target, and
//! resolves guesses against it via an O(1) exact path or an O(N) estimated
//! path.

mod error;
mod guess;
mod hint;
mod ranking;

pub use error::EngineError;
pub use guess::{GuessResolution, resolve_guess};
pub use hint::next_hint;
pub use ranking::{RankedEntry, RankingOutput, build, select_target};
