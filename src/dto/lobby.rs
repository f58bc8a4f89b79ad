use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::UserId,
    dto::validation::{validate_language, validate_not_blank},
    state::{Lobby, RosterView, RotationState},
};

/// Payload used to open a new lobby.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateLobbyRequest {
    /// User creating the lobby; becomes its first member.
    pub owner_id: UserId,
    #[serde(default)]
    #[validate(range(min = 2, max = 32))]
    pub max_players: Option<u32>,
    #[serde(default)]
    #[validate(custom(function = "validate_language"))]
    pub language: Option<String>,
    #[serde(default)]
    #[validate(length(max = 64), custom(function = "validate_not_blank"))]
    pub category: Option<String>,
    #[serde(default)]
    #[validate(range(min = 1, max = 20))]
    pub rounds: Option<u32>,
    #[serde(default)]
    #[validate(range(min = 10, max = 600))]
    pub draw_time_secs: Option<u32>,
}

/// Partial lobby update; omitted fields keep their value.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct UpdateLobbyRequest {
    #[serde(default)]
    #[validate(range(min = 2, max = 32))]
    pub max_players: Option<u32>,
    #[serde(default)]
    #[validate(custom(function = "validate_language"))]
    pub language: Option<String>,
    #[serde(default)]
    #[validate(length(max = 64), custom(function = "validate_not_blank"))]
    pub category: Option<String>,
    #[serde(default)]
    #[validate(range(min = 1, max = 20))]
    pub rounds: Option<u32>,
    #[serde(default)]
    #[validate(range(min = 10, max = 600))]
    pub draw_time_secs: Option<u32>,
    /// Replaces the whole member list when present.
    #[serde(default)]
    pub player_ids: Option<Vec<UserId>>,
}

/// Lobby as returned by the REST API.
#[derive(Debug, Serialize, ToSchema)]
pub struct LobbySummary {
    pub id: Uuid,
    pub owner_id: UserId,
    pub max_players: u32,
    pub player_ids: Vec<UserId>,
    pub language: String,
    pub category: String,
    pub rounds: u32,
    pub draw_time_secs: u32,
    /// How many players already painted in the running cycle.
    pub painted_in_cycle: usize,
}

impl From<Lobby> for LobbySummary {
    fn from(lobby: Lobby) -> Self {
        Self {
            id: lobby.id,
            owner_id: lobby.owner_id,
            max_players: lobby.max_players,
            player_ids: lobby.player_ids,
            language: lobby.language,
            category: lobby.category,
            rounds: lobby.rounds,
            draw_time_secs: lobby.draw_time_secs,
            painted_in_cycle: lobby.rotation.history.len(),
        }
    }
}

/// Query string naming the player that joins or leaves.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PlayerQuery {
    pub player_id: UserId,
}

/// Word the painter has to draw this round.
#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
pub struct LobbyWord {
    #[validate(length(min = 1, max = 64), custom(function = "validate_not_blank"))]
    pub word: String,
}

/// Result of advancing the turn of a lobby.
#[derive(Debug, Serialize, ToSchema)]
pub struct TurnResponse {
    pub lobby_id: Uuid,
    /// Player that paints this round.
    pub painter_id: UserId,
    /// Players that already painted in this cycle, in order, the new painter last.
    pub painted_ids: Vec<UserId>,
    /// Players still waiting for their turn in this cycle.
    pub waiting_ids: Vec<UserId>,
}

impl TurnResponse {
    /// Describe `rotation` in terms of player ids, ignoring tokens that left the roster.
    pub fn new(lobby_id: Uuid, painter_id: UserId, roster: &RosterView, rotation: &RotationState) -> Self {
        let painted_ids = rotation
            .history
            .iter()
            .filter_map(|token| roster.player_id(token))
            .collect();
        let waiting_ids = roster
            .members()
            .iter()
            .filter(|member| !rotation.history.contains(&member.token))
            .map(|member| member.player_id)
            .collect();

        Self {
            lobby_id,
            painter_id,
            painted_ids,
            waiting_ids,
        }
    }
}

/// Query string of the lobby word draw.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LobbyWordsQuery {
    #[serde(default = "default_word_count")]
    pub count: i64,
}

pub(crate) fn default_word_count() -> i64 {
    3
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::PlayerToken;

    #[test]
    fn create_request_applies_field_rules() {
        let valid: CreateLobbyRequest = serde_json::from_value(serde_json::json!({
            "owner_id": 1,
            "language": "de",
            "category": "animals"
        }))
        .unwrap();
        assert!(valid.validate().is_ok());

        let invalid: CreateLobbyRequest = serde_json::from_value(serde_json::json!({
            "owner_id": 1,
            "max_players": 1,
            "language": "German",
            "category": "  "
        }))
        .unwrap();
        let errors = invalid.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("max_players"));
        assert!(fields.contains_key("language"));
        assert!(fields.contains_key("category"));
    }

    #[test]
    fn turn_response_lists_painted_and_waiting_players() {
        let roster = RosterView::from_resolutions([
            (1, Some(PlayerToken::from("a"))),
            (2, Some(PlayerToken::from("b"))),
            (3, Some(PlayerToken::from("c"))),
        ]);
        let rotation = RotationState {
            current_painter: Some("b".into()),
            history: ["gone", "a", "b"].into_iter().map(PlayerToken::from).collect(),
        };

        let response = TurnResponse::new(Uuid::nil(), 2, &roster, &rotation);
        assert_eq!(response.painted_ids, vec![1, 2]);
        assert_eq!(response.waiting_ids, vec![3]);
    }
}
