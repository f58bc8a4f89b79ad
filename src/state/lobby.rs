use uuid::Uuid;

use super::rotation::{PlayerToken, RotationState};
use crate::dao::models::{LobbyEntity, UserId};

/// Runtime view of a lobby with its rotation state decoded into native types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lobby {
    /// Lobby identifier.
    pub id: Uuid,
    /// Storage revision the lobby was loaded at.
    pub revision: u64,
    /// Member allowed to manage the lobby.
    pub owner_id: UserId,
    /// Capacity of the lobby.
    pub max_players: u32,
    /// Member ids in join order.
    pub player_ids: Vec<UserId>,
    /// Word language code.
    pub language: String,
    /// Word category.
    pub category: String,
    /// Number of rounds to play.
    pub rounds: u32,
    /// Seconds available per drawing.
    pub draw_time_secs: u32,
    /// Word of the running round.
    pub current_word: Option<String>,
    /// Painter rotation of the lobby.
    pub rotation: RotationState,
}

impl Lobby {
    /// Whether `player_id` is a member.
    pub fn has_member(&self, player_id: UserId) -> bool {
        self.player_ids.contains(&player_id)
    }

    /// Whether no further player may join.
    pub fn is_full(&self) -> bool {
        self.player_ids.len() >= self.max_players as usize
    }
}

impl From<LobbyEntity> for Lobby {
    fn from(entity: LobbyEntity) -> Self {
        let rotation = RotationState {
            current_painter: entity.current_painter_token.map(PlayerToken::from),
            history: entity
                .painter_history
                .into_iter()
                .map(PlayerToken::from)
                .collect(),
        };

        Self {
            id: entity.id,
            revision: entity.revision,
            owner_id: entity.owner_id,
            max_players: entity.max_players,
            player_ids: entity.player_ids,
            language: entity.language,
            category: entity.category,
            rounds: entity.rounds,
            draw_time_secs: entity.draw_time_secs,
            current_word: entity.current_word,
            rotation,
        }
    }
}

impl From<Lobby> for LobbyEntity {
    fn from(lobby: Lobby) -> Self {
        Self {
            id: lobby.id,
            revision: lobby.revision,
            owner_id: lobby.owner_id,
            max_players: lobby.max_players,
            player_ids: lobby.player_ids,
            language: lobby.language,
            category: lobby.category,
            rounds: lobby.rounds,
            draw_time_secs: lobby.draw_time_secs,
            current_word: lobby.current_word,
            current_painter_token: lobby.rotation.current_painter.map(PlayerToken::into_inner),
            painter_history: lobby
                .rotation
                .history
                .into_iter()
                .map(PlayerToken::into_inner)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity() -> LobbyEntity {
        LobbyEntity {
            id: Uuid::new_v4(),
            revision: 4,
            owner_id: 7,
            max_players: 2,
            player_ids: vec![7, 9],
            language: "de".into(),
            category: "animals".into(),
            rounds: 3,
            draw_time_secs: 60,
            current_word: Some("Hund".into()),
            current_painter_token: Some("t9".into()),
            painter_history: vec!["t7".into(), "t9".into()],
        }
    }

    #[test]
    fn rotation_survives_the_persistence_boundary() {
        let original = entity();
        let lobby = Lobby::from(original.clone());

        let history: Vec<&str> = lobby.rotation.history.iter().map(PlayerToken::as_str).collect();
        assert_eq!(history, vec!["t7", "t9"]);
        assert!(lobby.is_full());
        assert!(lobby.has_member(9));

        assert_eq!(LobbyEntity::from(lobby), original);
    }

    #[test]
    fn empty_rotation_round_trips() {
        let mut original = entity();
        original.current_painter_token = None;
        original.painter_history.clear();

        let lobby = Lobby::from(original.clone());
        assert!(lobby.rotation.is_empty());
        assert_eq!(LobbyEntity::from(lobby), original);

        let json = serde_json::to_value(&original).unwrap();
        assert_eq!(json["painter_history"], serde_json::json!([]));
    }
}
