/// Per-guess / per-hint errors reported to the originating session only
/// (§7 "Error handling design"). Room state is untouched and the guess is
/// not logged when one of these is returned.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum GuessError {
    #[error("Not a legal guess.")]
    MalformedGuess,

    #[error("Word not known.")]
    UnknownWord,

    #[error("Game not ready yet.")]
    NotReady,

    #[error("Game already won.")]
    AlreadyWon,

    #[error("Unknown room.")]
    UnknownRoom,

    #[error("Game could not start.")]
    BuildFailed,
}
