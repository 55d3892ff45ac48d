use std::path::Path;

use anyhow::{Context, Result};

/// Load a newline-separated word list (§6 "Vocabulary file (consumed)").
///
/// Blank lines and lines containing anything but ASCII letters are skipped.
/// File order is preserved — it is meaningful, since the first
/// `meaningful_pool_size` surviving entries feed `meaningful`.
pub fn load_word_list(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading vocabulary file at {}", path.display()))?;

    Ok(raw
        .lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .filter(|line| line.chars().all(|c| c.is_ascii_lowercase()))
        .map(|line| line.to_string())
        .collect())
}
