//! Process-local [`LobbyStore`] used when no database is configured and in tests.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use dashmap::{DashMap, mapref::entry::Entry};
use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::{
    lobby_store::LobbyStore,
    models::{LobbyEntity, UserEntity, UserId},
    storage::{StorageError, StorageResult},
};

/// Lobby and user records kept in concurrent maps.
#[derive(Clone, Default)]
pub struct InMemoryLobbyStore {
    lobbies: Arc<DashMap<Uuid, LobbyEntity>>,
    users: Arc<DashMap<UserId, UserEntity>>,
    usernames: Arc<DashMap<String, UserId>>,
    last_user_id: Arc<AtomicU64>,
}

impl InMemoryLobbyStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn store_lobby(&self, mut lobby: LobbyEntity) -> StorageResult<LobbyEntity> {
        match self.lobbies.entry(lobby.id) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().revision != lobby.revision {
                    return Err(StorageError::conflict(lobby.id));
                }
                lobby.revision += 1;
                occupied.insert(lobby.clone());
                Ok(lobby)
            }
            Entry::Vacant(vacant) => {
                // A non-zero revision means the lobby was deleted after it was loaded.
                if lobby.revision != 0 {
                    return Err(StorageError::conflict(lobby.id));
                }
                lobby.revision = 1;
                vacant.insert(lobby.clone());
                Ok(lobby)
            }
        }
    }
}

impl LobbyStore for InMemoryLobbyStore {
    fn save_lobby(&self, lobby: LobbyEntity) -> BoxFuture<'static, StorageResult<LobbyEntity>> {
        let result = self.store_lobby(lobby);
        Box::pin(async move { result })
    }

    fn find_lobby(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<LobbyEntity>>> {
        let found = self.lobbies.get(&id).map(|entry| entry.value().clone());
        Box::pin(async move { Ok(found) })
    }

    fn delete_lobby(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let removed = self.lobbies.remove(&id).is_some();
        Box::pin(async move { Ok(removed) })
    }

    fn list_lobbies(&self) -> BoxFuture<'static, StorageResult<Vec<LobbyEntity>>> {
        let lobbies = self
            .lobbies
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        Box::pin(async move { Ok(lobbies) })
    }

    fn find_user(&self, id: UserId) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let found = self.users.get(&id).map(|entry| entry.value().clone());
        Box::pin(async move { Ok(found) })
    }

    fn save_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.last_user_id.fetch_max(user.id, Ordering::SeqCst);
        self.usernames.insert(user.username.clone(), user.id);
        self.users.insert(user.id, user);
        Box::pin(async { Ok(()) })
    }

    fn create_user(
        &self,
        username: String,
        token: String,
    ) -> BoxFuture<'static, StorageResult<UserEntity>> {
        let result = match self.usernames.entry(username.clone()) {
            Entry::Occupied(_) => Err(StorageError::Duplicate { key: username }),
            Entry::Vacant(vacant) => {
                let id = self.last_user_id.fetch_add(1, Ordering::SeqCst) + 1;
                vacant.insert(id);
                let user = UserEntity {
                    id,
                    username,
                    token,
                };
                self.users.insert(id, user.clone());
                Ok(user)
            }
        };
        Box::pin(async move { result })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lobby(id: Uuid) -> LobbyEntity {
        LobbyEntity {
            id,
            revision: 0,
            owner_id: 1,
            max_players: 4,
            player_ids: vec![1],
            language: "en".into(),
            category: "animals".into(),
            rounds: 3,
            draw_time_secs: 80,
            current_word: None,
            current_painter_token: None,
            painter_history: Vec::new(),
        }
    }

    #[tokio::test]
    async fn save_bumps_revision() {
        let store = InMemoryLobbyStore::new();
        let id = Uuid::new_v4();

        let first = store.save_lobby(lobby(id)).await.unwrap();
        assert_eq!(first.revision, 1);

        let second = store.save_lobby(first).await.unwrap();
        assert_eq!(second.revision, 2);
        assert_eq!(store.find_lobby(id).await.unwrap().unwrap().revision, 2);
    }

    #[tokio::test]
    async fn stale_revision_is_rejected() {
        let store = InMemoryLobbyStore::new();
        let id = Uuid::new_v4();
        let stored = store.save_lobby(lobby(id)).await.unwrap();

        store.save_lobby(stored.clone()).await.unwrap();
        let err = store.save_lobby(stored).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict { .. }));
    }

    #[tokio::test]
    async fn saving_a_deleted_lobby_conflicts() {
        let store = InMemoryLobbyStore::new();
        let id = Uuid::new_v4();
        let stored = store.save_lobby(lobby(id)).await.unwrap();

        assert!(store.delete_lobby(id).await.unwrap());
        assert!(!store.delete_lobby(id).await.unwrap());
        assert!(matches!(
            store.save_lobby(stored).await,
            Err(StorageError::Conflict { .. })
        ));
    }

    #[tokio::test]
    async fn rotation_fields_round_trip() {
        let store = InMemoryLobbyStore::new();
        let id = Uuid::new_v4();
        let mut entity = lobby(id);
        entity.current_painter_token = Some("b".into());
        entity.painter_history = vec!["a".into(), "b".into()];

        store.save_lobby(entity).await.unwrap();
        let loaded = store.find_lobby(id).await.unwrap().unwrap();
        assert_eq!(loaded.current_painter_token.as_deref(), Some("b"));
        assert_eq!(loaded.painter_history, vec!["a".to_string(), "b".to_string()]);
    }

    #[tokio::test]
    async fn created_users_get_fresh_ids_and_unique_names() {
        let store = InMemoryLobbyStore::new();
        store
            .save_user(UserEntity {
                id: 7,
                username: "seeded".into(),
                token: "t7".into(),
            })
            .await
            .unwrap();

        let alice = store.create_user("alice".into(), "ta".into()).await.unwrap();
        let bob = store.create_user("bob".into(), "tb".into()).await.unwrap();
        assert_eq!((alice.id, bob.id), (8, 9));
        assert_eq!(store.find_user(8).await.unwrap(), Some(alice));

        for taken in ["alice", "seeded"] {
            assert!(matches!(
                store.create_user(taken.into(), "tx".into()).await,
                Err(StorageError::Duplicate { .. })
            ));
        }
    }
}
