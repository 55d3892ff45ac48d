use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use wordrank_config::VocabConfig;
use wordrank_oracle::EmbeddingOracle;
use wordrank_vocab::VocabularyCacheCell;

use crate::room::{Room, RoomPhase};

/// Process-wide map from room id to live `Room` (§4.4 "Room registry").
/// Room ids are lowercased so `Foo` and `foo` address the same game.
pub struct RoomRegistry {
    oracle: Arc<dyn EmbeddingOracle>,
    vocab_cell: Arc<VocabularyCacheCell>,
    vocab_config: VocabConfig,
    rooms: Mutex<HashMap<String, Arc<Room>>>,
}

impl RoomRegistry {
    pub fn new(oracle: Arc<dyn EmbeddingOracle>, vocab_config: VocabConfig) -> Self {
        Self {
            oracle,
            vocab_cell: Arc::new(VocabularyCacheCell::new()),
            vocab_config,
            rooms: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the room for `room_id`, creating it if absent or if the
    /// previous room with that id failed to build and was left for lazy
    /// eviction.
    pub async fn get_or_create(&self, room_id: &str) -> Arc<Room> {
        let key = room_id.to_lowercase();
        let mut rooms = self.rooms.lock().await;

        if let Some(room) = rooms.get(&key) {
            if room.phase().await != RoomPhase::Failed {
                return Arc::clone(room);
            }
        }

        let room = Room::new(
            key.clone(),
            Arc::clone(&self.oracle),
            Arc::clone(&self.vocab_cell),
            self.vocab_config.clone(),
        );
        rooms.insert(key, Arc::clone(&room));
        room
    }

    /// Looks up a room without creating one; used for guess/hint dispatch
    /// where a missing room is a client error (§7 "Unknown room.").
    pub async fn get(&self, room_id: &str) -> Option<Arc<Room>> {
        let key = room_id.to_lowercase();
        self.rooms.lock().await.get(&key).cloned()
    }

    /// Drops `room_id` from the registry if it has no members left.
    pub async fn drop_if_empty(&self, room_id: &str) {
        let key = room_id.to_lowercase();
        let mut rooms = self.rooms.lock().await;
        let should_drop = match rooms.get(&key) {
            Some(room) => room.is_empty().await,
            None => false,
        };
        if should_drop {
            rooms.remove(&key);
        }
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use wordrank_config::VocabConfig;
    use wordrank_oracle::StaticOracle;

    fn registry() -> RoomRegistry {
        let oracle: Arc<dyn EmbeddingOracle> = Arc::new(StaticOracle::new(HashMap::from([
            ("cat".to_string(), vec![1.0, 0.0]),
            ("dog".to_string(), vec![0.9, 0.1]),
        ])));
        RoomRegistry::new(oracle, VocabConfig::default())
    }

    #[tokio::test]
    async fn room_ids_are_case_insensitive() {
        let registry = registry();
        let a = registry.get_or_create("Lobby").await;
        let b = registry.get_or_create("lobby").await;
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.room_count().await, 1);
    }

    #[tokio::test]
    async fn unknown_room_lookup_returns_none() {
        let registry = registry();
        assert!(registry.get("nope").await.is_none());
    }

    #[tokio::test]
    async fn empty_room_is_dropped() {
        let registry = registry();
        let room = registry.get_or_create("room1").await;
        room.join("s1".to_string(), "alice".to_string(), None).await;
        assert!(room.leave("s1").await);
        registry.drop_if_empty("room1").await;
        assert!(registry.get("room1").await.is_none());
    }

    #[tokio::test]
    async fn nonempty_room_is_not_dropped() {
        let registry = registry();
        let room = registry.get_or_create("room1").await;
        room.join("s1".to_string(), "alice".to_string(), None).await;
        registry.drop_if_empty("room1").await;
        assert!(registry.get("room1").await.is_some());
    }
}
