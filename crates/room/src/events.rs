use serde::{Deserialize, Serialize};

/// Player name reserved for synthetic hint entries in the guess log (§4.2
/// "Hints").
pub const HINT_AUTHOR: &str = "hint";

/// One row of the top-10 payload attached to a winning guess.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopEntry {
    pub word: String,
    pub rank: usize,
    pub similarity: f32,
}

/// A single guess (or hint) entry in a room's guess log (§3 "Guess record").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GuessRecord {
    pub word: String,
    pub player_name: String,
    pub similarity: f32,
    pub rank: usize,
    pub is_correct: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_10: Option<Vec<TopEntry>>,
    /// Server-side counter for repeated submissions of the same surface
    /// word (§9 "Duplicate guess semantics" — resolved in favor of a
    /// counter for testability).
    pub times_guessed: usize,
}

/// Inbound events the Session Router dispatches to a Room (§4.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    JoinRoom { room_id: String, player_name: String },
    MakeGuess { room_id: String, player_name: String, guess: String },
    RequestHint { room_id: String, player_name: String },
}

/// A room snapshot sent on join and after every `ready`/membership change
/// (§4.5 "room_state").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomStateView {
    pub ready: bool,
    pub total_words: usize,
    pub guesses: Vec<GuessRecord>,
    pub players: Vec<String>,
}

/// Outbound events the Session Router emits, scoped per §4.5's table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    RoomLoading { msg: String },
    RoomState(RoomStateView),
    NewGuess(GuessRecord),
    PlayerJoined { player_name: String, players: Vec<String> },
    PlayerLeft { player_name: String, players: Vec<String> },
    GuessError { msg: String },
}

impl ServerEvent {
    pub fn guess_error(err: crate::error::GuessError) -> Self {
        ServerEvent::GuessError { msg: err.to_string() }
    }
}
