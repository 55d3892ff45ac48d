use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use wordrank_config::AppConfig;
use wordrank_oracle::{EmbeddingOracle, VectorFileOracle};

#[derive(Debug, Parser)]
#[command(name = "wordrank", version, about = "Cooperative word-guessing game server")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the game server until killed.
    Serve {
        #[arg(long, default_value = "config/default.toml")]
        config: PathBuf,
    },
    /// Load a vocabulary word list and embedding table and report basic
    /// health — useful before pointing a deployment at a new data file.
    CheckVocab {
        #[arg(long)]
        vocab: PathBuf,
        #[arg(long)]
        embeddings: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => {
            let config = AppConfig::load_from(&config)
                .with_context(|| format!("loading config from {}", config.display()))?;
            wordrank_server::run(config).await
        }
        Commands::CheckVocab { vocab, embeddings } => check_vocab(&vocab, &embeddings),
    }
}

fn check_vocab(vocab_path: &PathBuf, embeddings_path: &PathBuf) -> Result<()> {
    let words = wordrank_vocab::load_word_list(vocab_path)
        .with_context(|| format!("reading word list from {}", vocab_path.display()))?;
    let oracle = VectorFileOracle::load(embeddings_path)
        .with_context(|| format!("reading embedding table from {}", embeddings_path.display()))?;

    let with_vectors = words.iter().filter(|w| oracle.has_vector(w)).count();
    println!("words in list: {}", words.len());
    println!("embedding table dimension: {}", oracle.dimension());
    println!(
        "words with a vector: {} ({:.1}%)",
        with_vectors,
        100.0 * with_vectors as f64 / words.len().max(1) as f64
    );

    if with_vectors == 0 {
        anyhow::bail!("none of the words in the list have a vector — check that both files use the same casing/tokenization");
    }

    Ok(())
}
