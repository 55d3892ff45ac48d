//! Session Router — the TCP front door that turns wire events into
//! [`wordrank_room`] operations (§4.5).

mod connection;

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{error, info};

use wordrank_config::AppConfig;
use wordrank_oracle::{EmbeddingOracle, VectorFileOracle};
use wordrank_room::RoomRegistry;

pub use connection::handle_connection;

/// Bind `config.server.bind_addr` and serve connections until the process is
/// killed. Each connection runs its own session loop; rooms and the shared
/// vocabulary cache live in the returned [`RoomRegistry`] for as long as the
/// process runs.
pub async fn run(config: AppConfig) -> Result<()> {
    let oracle: Arc<dyn EmbeddingOracle> = Arc::new(
        VectorFileOracle::load(&config.vocab.embedding_table_path).with_context(|| {
            format!(
                "loading embedding table from {}",
                config.vocab.embedding_table_path
            )
        })?,
    );

    let registry = Arc::new(RoomRegistry::new(oracle, config.vocab.clone()));

    let listener = TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.server.bind_addr))?;
    info!(addr = %config.server.bind_addr, "wordrank server listening");

    loop {
        let (stream, peer) = listener.accept().await?;
        let registry = Arc::clone(&registry);
        tokio::spawn(async move {
            info!(%peer, "connection accepted");
            if let Err(err) = connection::handle_connection(stream, registry).await {
                error!(%peer, ?err, "connection handler failed");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use std::time::Duration;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpStream;
    use tokio::net::tcp::OwnedReadHalf;

    async fn spawn_test_server() -> (std::net::SocketAddr, Arc<RoomRegistry>) {
        let mut vectors = tempfile::NamedTempFile::new().unwrap();
        writeln!(vectors, "cat 1.0 0.0 0.0").unwrap();
        writeln!(vectors, "dog 0.0 1.0 0.0").unwrap();
        writeln!(vectors, "mouse 0.8 0.0 0.2").unwrap();
        vectors.flush().unwrap();

        let mut words = tempfile::NamedTempFile::new().unwrap();
        writeln!(words, "cat").unwrap();
        writeln!(words, "dog").unwrap();
        writeln!(words, "mouse").unwrap();
        words.flush().unwrap();

        let oracle: Arc<dyn EmbeddingOracle> =
            Arc::new(VectorFileOracle::load(vectors.path()).unwrap());
        let mut vocab_config = wordrank_config::VocabConfig::default();
        vocab_config.path = words.path().to_string_lossy().to_string();
        vocab_config.meaningful_pool_size = 10;

        let registry = Arc::new(RoomRegistry::new(oracle, vocab_config));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let reg = Arc::clone(&registry);
        tokio::spawn(async move {
            loop {
                let (stream, _) = match listener.accept().await {
                    Ok(pair) => pair,
                    Err(_) => return,
                };
                let reg = Arc::clone(&reg);
                tokio::spawn(async move {
                    let _ = connection::handle_connection(stream, reg).await;
                });
            }
        });

        // The embedding table is already fully parsed into `oracle`, but the
        // word list is read lazily by the background build; keep it alive
        // for the rest of the test.
        std::mem::forget(words);

        (addr, registry)
    }

    #[tokio::test]
    async fn join_then_guess_round_trip_over_tcp() {
        let (addr, _registry) = spawn_test_server().await;
        let stream = TcpStream::connect(addr).await.unwrap();
        let (read_half, mut write_half) = stream.into_split();
        let mut reader = BufReader::new(read_half);

        write_half
            .write_all(b"{\"type\":\"join_room\",\"room_id\":\"lobby\",\"player_name\":\"alice\"}\n")
            .await
            .unwrap();

        // The very first room in the process also gets a `room_loading`
        // notice ahead of its `room_state` snapshot (§4.5), so skip past it
        // if present rather than assuming `room_state` is the first line.
        let mut line = String::new();
        reader.read_line(&mut line).await.unwrap();
        if line.contains("\"room_loading\"") {
            line.clear();
            reader.read_line(&mut line).await.unwrap();
        }
        assert!(line.contains("\"room_state\""));

        // Wait for the background build to finish and broadcast readiness.
        let mut ready = line.contains("\"ready\":true");
        for _ in 0..200 {
            if ready {
                break;
            }
            line.clear();
            tokio::time::timeout(Duration::from_millis(50), reader.read_line(&mut line))
                .await
                .ok();
            ready = line.contains("\"ready\":true");
        }
        assert!(ready, "room never reached ready over the wire");

        write_half
            .write_all(b"{\"type\":\"make_guess\",\"room_id\":\"lobby\",\"player_name\":\"alice\",\"guess\":\"dog\"}\n")
            .await
            .unwrap();

        line.clear();
        reader.read_line(&mut line).await.unwrap();
        assert!(line.contains("\"new_guess\""));
    }

    #[tokio::test]
    async fn guessing_in_an_unknown_room_reports_unknown_room() {
        let (addr, _registry) = spawn_test_server().await;
        let stream = TcpStream::connect(addr).await.unwrap();
        let (read_half, mut write_half) = stream.into_split();
        let mut reader = BufReader::new(read_half);

        write_half
            .write_all(b"{\"type\":\"make_guess\",\"room_id\":\"ghost-town\",\"player_name\":\"alice\",\"guess\":\"dog\"}\n")
            .await
            .unwrap();

        let mut line = String::new();
        reader.read_line(&mut line).await.unwrap();
        assert!(line.contains("Unknown room."));
    }

    /// Reads lines until one contains `needle`, skipping unrelated
    /// broadcast traffic (e.g. a leading `room_loading`).
    async fn read_until(reader: &mut BufReader<OwnedReadHalf>, needle: &str) -> String {
        let mut line = String::new();
        for _ in 0..50 {
            line.clear();
            tokio::time::timeout(Duration::from_millis(500), reader.read_line(&mut line))
                .await
                .expect("timed out waiting for expected line")
                .unwrap();
            if line.contains(needle) {
                return line;
            }
        }
        panic!("never saw a line containing {needle:?}");
    }

    #[tokio::test]
    async fn guessing_in_a_room_this_session_never_joined_reports_unknown_room() {
        let (addr, _registry) = spawn_test_server().await;

        // Session A actually joins "lobby".
        let stream_a = TcpStream::connect(addr).await.unwrap();
        let (read_half_a, mut write_half_a) = stream_a.into_split();
        let mut reader_a = BufReader::new(read_half_a);
        write_half_a
            .write_all(b"{\"type\":\"join_room\",\"room_id\":\"lobby\",\"player_name\":\"alice\"}\n")
            .await
            .unwrap();
        read_until(&mut reader_a, "\"room_state\"").await;

        // Session B joins a different room, making "lobby" exist globally
        // without session B ever having joined it.
        let stream_b = TcpStream::connect(addr).await.unwrap();
        let (read_half_b, mut write_half_b) = stream_b.into_split();
        let mut reader_b = BufReader::new(read_half_b);
        write_half_b
            .write_all(b"{\"type\":\"join_room\",\"room_id\":\"elsewhere\",\"player_name\":\"bob\"}\n")
            .await
            .unwrap();
        read_until(&mut reader_b, "\"room_state\"").await;

        // Session B tries to guess in "lobby" by id/player_name alone.
        write_half_b
            .write_all(b"{\"type\":\"make_guess\",\"room_id\":\"lobby\",\"player_name\":\"bob\",\"guess\":\"dog\"}\n")
            .await
            .unwrap();

        let line = read_until(&mut reader_b, "\"guess_error\"").await;
        assert!(line.contains("Unknown room."));
    }
}
