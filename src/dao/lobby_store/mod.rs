/// CouchDB backend.
#[cfg(feature = "couch-store")]
pub mod couchdb;
/// Process-local backend.
pub mod memory;

use crate::dao::models::{LobbyEntity, UserEntity, UserId};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;
use uuid::Uuid;

pub use memory::InMemoryLobbyStore;

/// Abstraction over the persistence layer for lobbies and the users they reference.
pub trait LobbyStore: Send + Sync {
    /// Persist a lobby if its revision matches the stored one, returning the stored copy.
    fn save_lobby(&self, lobby: LobbyEntity) -> BoxFuture<'static, StorageResult<LobbyEntity>>;
    fn find_lobby(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<LobbyEntity>>>;
    /// Remove a lobby, returning whether it existed.
    fn delete_lobby(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;
    fn list_lobbies(&self) -> BoxFuture<'static, StorageResult<Vec<LobbyEntity>>>;
    fn find_user(&self, id: UserId) -> BoxFuture<'static, StorageResult<Option<UserEntity>>>;
    fn save_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Store a new user under a fresh id. Fails with `Duplicate` when the username is taken.
    fn create_user(
        &self,
        username: String,
        token: String,
    ) -> BoxFuture<'static, StorageResult<UserEntity>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
