//! Shared application state and the in-memory domain types.

/// Runtime lobby type.
pub mod lobby;
/// Resolved lobby members.
pub mod roster;
/// Painter selection.
pub mod rotation;
/// Per-key queues of candidate words.
pub mod word_pool;
/// Registry of word pools.
pub mod word_supply;

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock, watch};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dao::{lobby_store::LobbyStore, word_provider::WordProvider},
    error::ServiceError,
};

pub use self::lobby::Lobby;
pub use self::roster::{RosterMember, RosterView};
pub use self::rotation::{PlayerToken, RotationError, RotationState, select_next};
pub use self::word_supply::{WordPoolKey, WordSupplyError, WordSupplyRegistry};

/// Handle to the state shared by every request.
pub type SharedState = Arc<AppState>;

/// Central application state: storage handle, lobby locks and the word supply.
pub struct AppState {
    lobby_store: RwLock<Option<Arc<dyn LobbyStore>>>,
    degraded: watch::Sender<bool>,
    lobby_locks: DashMap<Uuid, Arc<Mutex<()>>>,
    words: Arc<WordSupplyRegistry>,
    config: AppConfig,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig, provider: Arc<dyn WordProvider>) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        let words = Arc::new(WordSupplyRegistry::new(
            provider,
            config.word_supply.clone(),
        ));
        Arc::new(Self {
            lobby_store: RwLock::new(None),
            degraded: degraded_tx,
            lobby_locks: DashMap::new(),
            words,
            config,
        })
    }

    /// Obtain a handle to the current lobby store, if one is installed.
    pub async fn lobby_store(&self) -> Option<Arc<dyn LobbyStore>> {
        let guard = self.lobby_store.read().await;
        guard.as_ref().cloned()
    }

    /// Current lobby store, or [`ServiceError::Degraded`] when none is usable.
    pub async fn require_lobby_store(&self) -> Result<Arc<dyn LobbyStore>, ServiceError> {
        if *self.degraded.borrow() {
            return Err(ServiceError::Degraded);
        }
        self.lobby_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new lobby store implementation and leave degraded mode.
    pub async fn install_lobby_store(&self, store: Arc<dyn LobbyStore>) {
        {
            let mut guard = self.lobby_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Remove the current lobby store and enter degraded mode.
    pub async fn clear_lobby_store(&self) {
        {
            let mut guard = self.lobby_store.write().await;
            guard.take();
        }
        self.update_degraded(true);
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });
    }

    /// Serialize mutations of one lobby until the returned guard is dropped.
    pub async fn lock_lobby(&self, id: Uuid) -> LobbyGuard<'_> {
        let lock = Arc::clone(self.lobby_locks.entry(id).or_default().value());
        LobbyGuard {
            locks: &self.lobby_locks,
            id,
            guard: Some(lock.lock_owned().await),
        }
    }

    #[cfg(test)]
    pub(crate) fn lobby_lock_count(&self) -> usize {
        self.lobby_locks.len()
    }

    /// Process-wide word pools.
    pub fn words(&self) -> &Arc<WordSupplyRegistry> {
        &self.words
    }

    /// Configuration the state was built with.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

/// Exclusive access to one lobby, see [`AppState::lock_lobby`].
///
/// Dropping the guard forgets the lobby's mutex unless another task holds or awaits it.
pub struct LobbyGuard<'a> {
    locks: &'a DashMap<Uuid, Arc<Mutex<()>>>,
    id: Uuid,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for LobbyGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.locks
            .remove_if(&self.id, |_, lock| Arc::strong_count(lock) == 1);
    }
}
