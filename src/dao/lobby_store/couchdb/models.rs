use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::dao::models::{LobbyEntity, UserEntity, UserId};

use super::error::CouchDaoError;

pub const LOBBY_PREFIX: &str = "lobby::";
pub const USER_PREFIX: &str = "user::";
pub const USERNAME_PREFIX: &str = "username::";
pub const END_SUFFIX: &str = "\u{ffff}";

#[derive(Debug, Deserialize)]
pub struct AllDocsResponse {
    pub rows: Vec<AllDocsRow>,
}

#[derive(Debug, Deserialize)]
pub struct AllDocsRow {
    #[serde(default)]
    pub doc: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchLobbyDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(flatten)]
    pub lobby: LobbyBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LobbyBody {
    #[serde(default)]
    pub revision: u64,
    pub owner_id: UserId,
    pub max_players: u32,
    pub player_ids: Vec<UserId>,
    pub language: String,
    pub category: String,
    pub rounds: u32,
    pub draw_time_secs: u32,
    #[serde(default)]
    pub current_word: Option<String>,
    #[serde(default)]
    pub current_painter_token: Option<String>,
    #[serde(default)]
    pub painter_history: Vec<String>,
}

impl From<(LobbyEntity, Option<String>)> for CouchLobbyDocument {
    fn from((lobby, rev): (LobbyEntity, Option<String>)) -> Self {
        Self {
            id: lobby_doc_id(lobby.id),
            rev,
            lobby: LobbyBody {
                revision: lobby.revision,
                owner_id: lobby.owner_id,
                max_players: lobby.max_players,
                player_ids: lobby.player_ids,
                language: lobby.language,
                category: lobby.category,
                rounds: lobby.rounds,
                draw_time_secs: lobby.draw_time_secs,
                current_word: lobby.current_word,
                current_painter_token: lobby.current_painter_token,
                painter_history: lobby.painter_history,
            },
        }
    }
}

impl TryFrom<CouchLobbyDocument> for LobbyEntity {
    type Error = CouchDaoError;

    fn try_from(doc: CouchLobbyDocument) -> Result<Self, Self::Error> {
        let body = doc.lobby;
        Ok(Self {
            id: extract_uuid(&doc.id)?,
            revision: body.revision,
            owner_id: body.owner_id,
            max_players: body.max_players,
            player_ids: body.player_ids,
            language: body.language,
            category: body.category,
            rounds: body.rounds,
            draw_time_secs: body.draw_time_secs,
            current_word: body.current_word,
            current_painter_token: body.current_painter_token,
            painter_history: body.painter_history,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchUserDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    pub user_id: UserId,
    pub username: String,
    pub token: String,
}

impl From<(UserEntity, Option<String>)> for CouchUserDocument {
    fn from((user, rev): (UserEntity, Option<String>)) -> Self {
        Self {
            id: user_doc_id(user.id),
            rev,
            user_id: user.id,
            username: user.username,
            token: user.token,
        }
    }
}

impl From<CouchUserDocument> for UserEntity {
    fn from(doc: CouchUserDocument) -> Self {
        Self {
            id: doc.user_id,
            username: doc.username,
            token: doc.token,
        }
    }
}

/// Reservation making a username unique; CouchDB rejects a second document with the same id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchUsernameDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: UserId,
}

pub fn lobby_doc_id(id: Uuid) -> String {
    format!("{}{}", LOBBY_PREFIX, id)
}

pub fn user_doc_id(id: UserId) -> String {
    format!("{}{}", USER_PREFIX, id)
}

pub fn username_doc_id(username: &str) -> String {
    format!("{}{}", USERNAME_PREFIX, username)
}

pub fn extract_uuid(doc_id: &str) -> Result<Uuid, CouchDaoError> {
    let (_, id) = doc_id
        .split_once("::")
        .ok_or_else(|| CouchDaoError::InvalidDocId {
            doc_id: doc_id.to_string(),
            kind: "missing separator",
        })?;

    Uuid::parse_str(id).map_err(|_| CouchDaoError::InvalidDocId {
        doc_id: doc_id.to_string(),
        kind: "invalid UUID",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lobby_document_keeps_empty_history() {
        let id = Uuid::new_v4();
        let entity = LobbyEntity {
            id,
            revision: 4,
            owner_id: 7,
            max_players: 8,
            player_ids: vec![7, 9],
            language: "de".into(),
            category: "tiere".into(),
            rounds: 3,
            draw_time_secs: 80,
            current_word: None,
            current_painter_token: None,
            painter_history: Vec::new(),
        };

        let doc = CouchLobbyDocument::from((entity.clone(), Some("2-abc".into())));
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["_id"], format!("lobby::{id}"));
        assert_eq!(json["painter_history"], serde_json::json!([]));

        let decoded: CouchLobbyDocument = serde_json::from_value(json).unwrap();
        assert_eq!(LobbyEntity::try_from(decoded).unwrap(), entity);
    }

    #[test]
    fn malformed_doc_id_is_rejected() {
        assert!(matches!(
            extract_uuid("lobby-123"),
            Err(CouchDaoError::InvalidDocId {
                kind: "missing separator",
                ..
            })
        ));
        assert!(matches!(
            extract_uuid("lobby::nope"),
            Err(CouchDaoError::InvalidDocId {
                kind: "invalid UUID",
                ..
            })
        ));
    }
}
