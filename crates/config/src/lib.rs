use std::env;
use std::fs;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabConfig {
    /// Newline-separated candidate word list, ordered most- to
    /// least-common (§6 "Vocabulary file (consumed)").
    pub path: String,
    pub embedding_model_name: String,
    /// Path to the GloVe-style `word f1 f2 ... fD` embedding table backing
    /// the Embedding Oracle.
    pub embedding_table_path: String,
    /// Cap on how many of `words` feed the ranked vector matrix. `None` means
    /// every word the oracle has a vector for is ranked.
    pub rank_size: Option<usize>,
    /// How many of the leading entries of `words` are eligible as targets.
    pub meaningful_pool_size: usize,
    /// Coarse POS tags (lowercase) eligible for target selection.
    pub meaningful_pos: Vec<String>,
}

impl Default for VocabConfig {
    fn default() -> Self {
        Self {
            path: "vocab.txt".to_string(),
            embedding_model_name: "glove-300d".to_string(),
            embedding_table_path: "glove.300d.txt".to_string(),
            rank_size: None,
            meaningful_pool_size: 2000,
            meaningful_pos: vec![
                "noun".to_string(),
                "verb".to_string(),
                "adjective".to_string(),
                "adverb".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub vocab: VocabConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let mut config = Self::default();
        if let Ok(raw) = fs::read_to_string(path) {
            config = toml::from_str(&raw)?;
        }

        if let Ok(value) = env::var("WORDRANK_VOCAB_PATH") {
            if !value.is_empty() {
                config.vocab.path = value;
            }
        }
        if let Ok(value) = env::var("WORDRANK_EMBEDDING_TABLE_PATH") {
            if !value.is_empty() {
                config.vocab.embedding_table_path = value;
            }
        }
        if let Ok(value) = env::var("WORDRANK_BIND_ADDR") {
            if !value.is_empty() {
                config.server.bind_addr = value;
            }
        }

        Ok(config)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        let rendered = toml::to_string_pretty(self)?;
        fs::write(path, rendered)?;
        Ok(())
    }
}
