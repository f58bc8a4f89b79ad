//! Registry of per-key word pools shared by every game session of the process.

use std::{fmt, sync::Arc, time::Duration};

use dashmap::DashMap;
use thiserror::Error;
use tracing::{debug, info};

use super::word_pool::WordPool;
use crate::{config::WordSupplyConfig, dao::word_provider::WordProvider};

/// Rejected word draw requests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WordSupplyError {
    /// A component of the pool key is empty.
    #[error("`{field}` must not be empty")]
    InvalidKey { field: &'static str },
}

/// Identity of an independent word pool.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WordPoolKey {
    /// Game session the words belong to.
    pub session: String,
    /// Language code.
    pub language: String,
    /// Word category.
    pub category: String,
}

impl WordPoolKey {
    /// Build a key from trimmed components, rejecting empty ones.
    pub fn new(session: &str, language: &str, category: &str) -> Result<Self, WordSupplyError> {
        fn required(value: &str, field: &'static str) -> Result<String, WordSupplyError> {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                Err(WordSupplyError::InvalidKey { field })
            } else {
                Ok(trimmed.to_string())
            }
        }

        Ok(Self {
            session: required(session, "session")?,
            language: required(language, "language")?,
            category: required(category, "category")?,
        })
    }
}

impl fmt::Display for WordPoolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.session, self.language, self.category)
    }
}

/// Lazily created word pools keyed by `(session, language, category)`.
pub struct WordSupplyRegistry {
    pools: DashMap<WordPoolKey, Arc<WordPool>>,
    provider: Arc<dyn WordProvider>,
    config: Arc<WordSupplyConfig>,
}

impl WordSupplyRegistry {
    /// Empty registry whose pools refill from `provider`.
    pub fn new(provider: Arc<dyn WordProvider>, config: WordSupplyConfig) -> Self {
        Self {
            pools: DashMap::new(),
            provider,
            config: Arc::new(config),
        }
    }

    /// Draw `count` words from the pool of the given key.
    ///
    /// A zero count returns no words and does not create the pool.
    pub async fn next_words(
        &self,
        session: &str,
        language: &str,
        category: &str,
        count: usize,
    ) -> Result<Vec<String>, WordSupplyError> {
        let key = WordPoolKey::new(session, language, category)?;
        if count == 0 {
            return Ok(Vec::new());
        }

        let pool = self.pool(key);
        Ok(pool.draw(count).await)
    }

    fn pool(&self, key: WordPoolKey) -> Arc<WordPool> {
        let entry = self.pools.entry(key.clone()).or_insert_with(|| {
            debug!(key = %key, "creating word pool");
            Arc::new(WordPool::new(
                key,
                self.provider.clone(),
                self.config.clone(),
            ))
        });
        Arc::clone(entry.value())
    }

    /// Drop pools unused for at least `max_idle`.
    ///
    /// Pools some caller still holds are kept, whether or not its draw has started.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut evicted = 0;
        self.pools.retain(|key, pool| {
            if Arc::strong_count(pool) > 1 {
                return true;
            }
            match pool.idle_for() {
                Some(idle) if idle >= max_idle => {
                    debug!(key = %key, idle_secs = idle.as_secs(), "evicting idle word pool");
                    evicted += 1;
                    false
                }
                _ => true,
            }
        });

        if evicted > 0 {
            info!(evicted, remaining = self.pools.len(), "evicted idle word pools");
        }
        evicted
    }

    /// Number of live pools.
    pub fn len(&self) -> usize {
        self.pools.len()
    }

    /// Whether no pool is live.
    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}
