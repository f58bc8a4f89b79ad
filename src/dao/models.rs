use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Numeric identifier of a registered user.
pub type UserId = u64;

/// User record as seen by the lobby core: only the identity and the stable token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserEntity {
    /// Primary key of the user.
    pub id: UserId,
    /// Display name.
    pub username: String,
    /// Stable auth token, also used to identify the player in painter rotation.
    pub token: String,
}

/// Aggregate lobby entity persisted by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LobbyEntity {
    /// Primary key of the lobby.
    pub id: Uuid,
    /// Optimistic concurrency counter; 0 means the lobby was never stored.
    #[serde(default)]
    pub revision: u64,
    /// User that created the lobby.
    pub owner_id: UserId,
    /// Capacity bound of the lobby.
    pub max_players: u32,
    /// Member ids in join order.
    pub player_ids: Vec<UserId>,
    /// Word language code (e.g. "en", "de").
    pub language: String,
    /// Word category (e.g. "animals").
    pub category: String,
    /// Number of rounds to play.
    pub rounds: u32,
    /// Seconds available to draw a word.
    pub draw_time_secs: u32,
    /// Word currently being drawn.
    #[serde(default)]
    pub current_word: Option<String>,
    /// Token of the player currently painting.
    #[serde(default)]
    pub current_painter_token: Option<String>,
    /// Tokens that already painted in the current cycle, in selection order.
    #[serde(default)]
    pub painter_history: Vec<String>,
}
