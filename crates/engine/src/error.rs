/// Errors raised while building a ranking or resolving a guess against one
/// (§4.2 "Algorithm" / "Guess resolution").
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("target word '{0}' has no known embedding")]
    UnknownTarget(String),

    #[error("word '{0}' has no known embedding")]
    UnknownWord(String),

    #[error("vocabulary cache has no ranked words")]
    EmptyVocabulary,
}
