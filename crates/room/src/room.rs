use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use wordrank_config::VocabConfig;
use wordrank_engine::{self, RankingOutput};
use wordrank_oracle::EmbeddingOracle;
use wordrank_vocab::{VocabularyCache, VocabularyCacheCell};

use crate::error::GuessError;
use crate::events::{GuessRecord, RoomStateView, ServerEvent, TopEntry, HINT_AUTHOR};
use crate::validate::is_legal_guess;

/// Broadcast channel capacity; matches the per-room fan-out depth the
/// reference daemon uses for its global event bus. Slow subscribers drop
/// the oldest events rather than back-pressuring the room.
const BROADCAST_CAP: usize = 256;

/// Number of consecutive target-selection/build failures tolerated before a
/// room is given up on (§7 "Build failure").
const MAX_BUILD_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomPhase {
    Created,
    Initializing,
    Ready,
    Won,
    /// Build failed after `MAX_BUILD_ATTEMPTS` retries; the room is
    /// considered destroyed and the registry will evict it on next lookup.
    Failed,
}

struct RoomInner {
    phase: RoomPhase,
    members: Vec<(String, String)>,
    guesses: Vec<GuessRecord>,
    target: Option<String>,
    cache: Option<Arc<VocabularyCache>>,
    engine: Option<Arc<RankingOutput>>,
    hints_given: HashSet<String>,
    winner: Option<GuessRecord>,
    init_handle: Option<JoinHandle<()>>,
}

impl RoomInner {
    fn new() -> Self {
        Self {
            phase: RoomPhase::Created,
            members: Vec::new(),
            guesses: Vec::new(),
            target: None,
            cache: None,
            engine: None,
            hints_given: HashSet::new(),
            winner: None,
            init_handle: None,
        }
    }

    fn player_names(&self) -> Vec<String> {
        self.members.iter().map(|(_, name)| name.clone()).collect()
    }

    fn room_state_view(&self) -> RoomStateView {
        RoomStateView {
            ready: matches!(self.phase, RoomPhase::Ready | RoomPhase::Won),
            total_words: self.engine.as_ref().map(|e| e.total_words()).unwrap_or(0),
            guesses: self.guesses.clone(),
            players: self.player_names(),
        }
    }
}

/// Stateful per-room aggregate (§3 "Room state", §4.3).
pub struct Room {
    id: String,
    oracle: Arc<dyn EmbeddingOracle>,
    vocab_cell: Arc<VocabularyCacheCell>,
    vocab_config: VocabConfig,
    broadcast_tx: broadcast::Sender<ServerEvent>,
    inner: Mutex<RoomInner>,
}

impl Room {
    pub fn new(
        id: String,
        oracle: Arc<dyn EmbeddingOracle>,
        vocab_cell: Arc<VocabularyCacheCell>,
        vocab_config: VocabConfig,
    ) -> Arc<Self> {
        let (broadcast_tx, _rx) = broadcast::channel(BROADCAST_CAP);
        Arc::new(Self {
            id,
            oracle,
            vocab_cell,
            vocab_config,
            broadcast_tx,
            inner: Mutex::new(RoomInner::new()),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.broadcast_tx.subscribe()
    }

    pub async fn phase(&self) -> RoomPhase {
        self.inner.lock().await.phase
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.members.is_empty()
    }

    /// Add a member; if this is the first join the room transitions
    /// CREATED → INITIALIZING and the background build is scheduled.
    /// Returns the `room_state` snapshot to send to the joiner directly
    /// (not broadcast), plus a `room_loading` message to send alongside it
    /// when the process-wide vocabulary cache is not yet warm (§4.5
    /// "room_loading ... while the cache is being built on first-ever
    /// room"). `player_joined` and a refreshed `room_state` are broadcast
    /// to the rest of the room internally.
    pub async fn join(
        self: &Arc<Self>,
        session_id: String,
        player_name: String,
        requested_target: Option<String>,
    ) -> (RoomStateView, Option<ServerEvent>) {
        let (to_joiner, to_room, to_room_state, should_build) = {
            let mut inner = self.inner.lock().await;
            inner.members.push((session_id, player_name.clone()));
            let should_build = inner.phase == RoomPhase::Created;
            if should_build {
                inner.phase = RoomPhase::Initializing;
            }
            let to_joiner = inner.room_state_view();
            let to_room = ServerEvent::PlayerJoined {
                player_name,
                players: inner.player_names(),
            };
            let to_room_state = ServerEvent::RoomState(inner.room_state_view());
            (to_joiner, to_room, to_room_state, should_build)
        };

        let _ = self.broadcast_tx.send(to_room);
        let _ = self.broadcast_tx.send(to_room_state);

        // `room_loading` is a single-session progress notice, only relevant
        // when this join is the one triggering the background build and the
        // process-wide vocabulary cache hasn't been warmed by an earlier
        // room yet (§4.5 "on first-ever room").
        let loading = (should_build && self.vocab_cell.get().is_none()).then(|| {
            ServerEvent::RoomLoading {
                msg: "Warming up the vocabulary cache for the first room — this can take a moment."
                    .to_string(),
            }
        });

        if should_build {
            self.spawn_build(requested_target).await;
        }

        (to_joiner, loading)
    }

    /// Remove a member; returns `true` if the room is now empty (the
    /// registry should destroy it). Broadcasts `player_left` and a
    /// refreshed `room_state` internally.
    pub async fn leave(&self, session_id: &str) -> bool {
        let (to_room, to_room_state, empty) = {
            let mut inner = self.inner.lock().await;
            let mut left_name = None;
            inner.members.retain(|(sid, name)| {
                if left_name.is_none() && sid == session_id {
                    left_name = Some(name.clone());
                    false
                } else {
                    true
                }
            });
            let empty = inner.members.is_empty();
            if empty {
                if let Some(handle) = inner.init_handle.take() {
                    handle.abort();
                }
            }
            (
                ServerEvent::PlayerLeft {
                    player_name: left_name.unwrap_or_default(),
                    players: inner.player_names(),
                },
                ServerEvent::RoomState(inner.room_state_view()),
                empty,
            )
        };

        let _ = self.broadcast_tx.send(to_room);
        if !empty {
            let _ = self.broadcast_tx.send(to_room_state);
        }
        empty
    }

    pub async fn submit_guess(&self, player_name: &str, raw_guess: &str) -> Result<(), GuessError> {
        if !is_legal_guess(raw_guess) {
            return Err(GuessError::MalformedGuess);
        }
        let guess = raw_guess.to_string();

        let broadcast_record = {
            let mut inner = self.inner.lock().await;
            match inner.phase {
                RoomPhase::Created | RoomPhase::Initializing => return Err(GuessError::NotReady),
                RoomPhase::Won => return Err(GuessError::AlreadyWon),
                RoomPhase::Failed => return Err(GuessError::BuildFailed),
                RoomPhase::Ready => {}
            }

            if let Some(existing) = inner.guesses.iter_mut().find(|g| g.word == guess) {
                existing.times_guessed += 1;
                existing.clone()
            } else {
                let cache = inner.cache.clone().expect("ready room has a cache");
                let ranking = inner.engine.clone().expect("ready room has an engine");
                let resolution =
                    wordrank_engine::resolve_guess(&guess, &cache, &ranking, self.oracle.as_ref())
                        .map_err(|_| GuessError::UnknownWord)?;

                let top_10 = if resolution.is_correct {
                    Some(
                        ranking
                            .top(10)
                            .iter()
                            .map(|e| TopEntry {
                                word: e.representative_word.clone(),
                                rank: ranking.rank_of(&e.family_key).unwrap_or(0),
                                similarity: e.similarity,
                            })
                            .collect(),
                    )
                } else {
                    None
                };

                let record = GuessRecord {
                    word: guess.clone(),
                    player_name: player_name.to_string(),
                    similarity: resolution.similarity,
                    rank: resolution.rank,
                    is_correct: resolution.is_correct,
                    top_10,
                    times_guessed: 1,
                };
                inner.guesses.push(record.clone());
                if resolution.is_correct {
                    inner.phase = RoomPhase::Won;
                    inner.winner = Some(record.clone());
                }
                record
            }
        };

        let _ = self.broadcast_tx.send(ServerEvent::NewGuess(broadcast_record));
        Ok(())
    }

    pub async fn request_hint(&self, player_name: &str) -> Result<(), GuessError> {
        let record = {
            let mut inner = self.inner.lock().await;
            match inner.phase {
                RoomPhase::Created | RoomPhase::Initializing => return Err(GuessError::NotReady),
                RoomPhase::Won => return Err(GuessError::AlreadyWon),
                RoomPhase::Failed => return Err(GuessError::BuildFailed),
                RoomPhase::Ready => {}
            }

            let ranking = inner.engine.clone().expect("ready room has an engine");
            let best_rank = inner
                .guesses
                .iter()
                .map(|g| g.rank)
                .min()
                .unwrap_or_else(|| ranking.total_words());
            let entry = wordrank_engine::next_hint(&ranking, best_rank, &inner.hints_given).clone();
            inner.hints_given.insert(entry.representative_word.clone());

            let record = GuessRecord {
                word: entry.representative_word.clone(),
                player_name: HINT_AUTHOR.to_string(),
                similarity: entry.similarity,
                rank: ranking.rank_of(&entry.family_key).unwrap_or(0),
                is_correct: false,
                top_10: None,
                times_guessed: 1,
            };
            inner.guesses.push(record.clone());
            record
        };

        info!(room_id = %self.id, player_name, hint = %record.word, "hint issued");
        let _ = self.broadcast_tx.send(ServerEvent::NewGuess(record));
        Ok(())
    }

    async fn spawn_build(self: &Arc<Self>, requested_target: Option<String>) {
        let room = Arc::clone(self);
        let handle = tokio::spawn(async move {
            room.run_build(requested_target).await;
        });
        self.inner.lock().await.init_handle = Some(handle);
    }

    async fn run_build(self: Arc<Self>, requested_target: Option<String>) {
        info!(room_id = %self.id, "vocabulary cache warm-up starting");
        let cache = match self
            .vocab_cell
            .ensure_initialized(Arc::clone(&self.oracle), self.vocab_config.clone())
            .await
        {
            Ok(cache) => cache,
            Err(err) => {
                warn!(room_id = %self.id, error = %err, "vocabulary cache initialization failed");
                self.fail_build().await;
                return;
            }
        };

        for attempt in 1..=MAX_BUILD_ATTEMPTS {
            let cache = Arc::clone(&cache);
            let oracle = Arc::clone(&self.oracle);
            let target_choice = requested_target.clone();

            let built = tokio::task::spawn_blocking(move || {
                let target = wordrank_engine::select_target(
                    &cache,
                    oracle.as_ref(),
                    target_choice.as_deref(),
                )?;
                let ranking = wordrank_engine::build(&target, &cache, oracle.as_ref())?;
                Ok::<_, wordrank_engine::EngineError>((target, ranking))
            })
            .await;

            match built {
                Ok(Ok((target, ranking))) => {
                    let view = {
                        let mut inner = self.inner.lock().await;
                        if inner.members.is_empty() {
                            info!(room_id = %self.id, "room emptied before build completed; discarding result");
                            return;
                        }
                        inner.target = Some(target);
                        inner.cache = Some(Arc::clone(&cache));
                        inner.engine = Some(Arc::new(ranking));
                        inner.phase = RoomPhase::Ready;
                        inner.room_state_view()
                    };
                    info!(room_id = %self.id, total_words = view.total_words, "room ready");
                    let _ = self.broadcast_tx.send(ServerEvent::RoomState(view));
                    return;
                }
                Ok(Err(err)) => {
                    warn!(room_id = %self.id, attempt, error = %err, "ranking build attempt failed");
                }
                Err(join_err) => {
                    warn!(room_id = %self.id, attempt, error = %join_err, "ranking build task panicked");
                }
            }
        }

        self.fail_build().await;
    }

    async fn fail_build(&self) {
        let mut inner = self.inner.lock().await;
        if inner.members.is_empty() {
            return;
        }
        inner.phase = RoomPhase::Failed;
        drop(inner);
        let _ = self
            .broadcast_tx
            .send(ServerEvent::guess_error(GuessError::BuildFailed));
    }
}
