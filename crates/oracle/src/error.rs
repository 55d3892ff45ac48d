use std::io;

/// Errors surfaced while loading or querying an [`crate::EmbeddingOracle`]
/// adapter. Kept distinct from [`anyhow::Error`] because vocabulary-cache
/// initialization (§4.1 of the spec) treats failures here as process-fatal
/// and wants to match on the kind before logging.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("reading embedding table: {0}")]
    Io(#[from] io::Error),

    #[error("malformed embedding row at line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },

    #[error("embedding table declares dimension {declared} but row at line {line} has {found}")]
    DimensionMismatch {
        line: usize,
        declared: usize,
        found: usize,
    },
}
