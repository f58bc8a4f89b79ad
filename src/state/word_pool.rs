use std::{collections::VecDeque, sync::Arc, time::Duration};

use indexmap::IndexSet;
use rand::seq::SliceRandom;
use tokio::{sync::Mutex, time::Instant};
use tracing::{debug, warn};

use super::word_supply::WordPoolKey;
use crate::{
    config::WordSupplyConfig,
    dao::word_provider::{WordProvider, WordRequest},
};

/// Queue of unused candidate words for one [`WordPoolKey`].
///
/// Draws and refills run under the pool's mutex, so at most one refill per key is in flight
/// and concurrent drawers wait for it instead of fetching again.
pub struct WordPool {
    key: WordPoolKey,
    provider: Arc<dyn WordProvider>,
    config: Arc<WordSupplyConfig>,
    state: Mutex<PoolState>,
}

/// Outcome of one refill.
struct Refill {
    added: usize,
    from_fallback: bool,
}

struct PoolState {
    words: VecDeque<String>,
    last_used: Instant,
}

impl WordPool {
    pub(crate) fn new(
        key: WordPoolKey,
        provider: Arc<dyn WordProvider>,
        config: Arc<WordSupplyConfig>,
    ) -> Self {
        Self {
            key,
            provider,
            config,
            state: Mutex::new(PoolState {
                words: VecDeque::new(),
                last_used: Instant::now(),
            }),
        }
    }

    /// Key the pool serves.
    pub fn key(&self) -> &WordPoolKey {
        &self.key
    }

    /// Take up to `count` words from the front of the pool, refilling as needed.
    ///
    /// Fewer than `count` words come back only when neither the provider nor the fallback
    /// list can supply new words.
    pub async fn draw(&self, count: usize) -> Vec<String> {
        if count == 0 {
            return Vec::new();
        }

        let mut state = self.state.lock().await;
        state.last_used = Instant::now();

        let mut provider_down = false;
        while state.words.len() < count {
            let refill = self.refill(&mut state.words, count).await;
            provider_down |= refill.from_fallback;
            if refill.added == 0 {
                break;
            }
        }

        let take = count.min(state.words.len());
        let drawn: Vec<String> = state.words.drain(..take).collect();

        if state.words.len() < count && !provider_down {
            self.refill(&mut state.words, count).await;
        }

        state.last_used = Instant::now();
        drawn
    }

    /// Time since the last draw, or `None` while a draw is running.
    pub(crate) fn idle_for(&self) -> Option<Duration> {
        self.state
            .try_lock()
            .ok()
            .map(|state| state.last_used.elapsed())
    }

    #[cfg(test)]
    pub(crate) async fn remaining(&self) -> usize {
        self.state.lock().await.words.len()
    }

    /// Append a fresh batch to `words`, from the provider or else from the fallback list.
    async fn refill(&self, words: &mut VecDeque<String>, wanted: usize) -> Refill {
        let request = WordRequest {
            language: self.key.language.clone(),
            category: self.key.category.clone(),
            count: wanted.max(self.config.batch_size),
        };
        let mut delay = self.config.retry_delay;
        let mut unavailable = false;

        for attempt in 1..=self.config.max_attempts {
            match self.provider.fetch_words(request.clone()).await {
                Ok(batch) => {
                    let mut fresh = fresh_words(batch, words);
                    if !fresh.is_empty() {
                        fresh.shuffle(&mut rand::rng());
                        let added = fresh.len();
                        words.extend(fresh);
                        debug!(
                            session = %self.key.session,
                            language = %self.key.language,
                            category = %self.key.category,
                            added,
                            "word pool refilled"
                        );
                        return Refill {
                            added,
                            from_fallback: false,
                        };
                    }
                    warn!(
                        attempt,
                        provider = self.provider.name(),
                        "word provider returned no new words"
                    );
                }
                Err(err) if !err.is_retryable() => {
                    debug!(
                        provider = self.provider.name(),
                        error = %err,
                        "word provider cannot serve; skipping retries"
                    );
                    unavailable = true;
                    break;
                }
                Err(err) => warn!(
                    attempt,
                    provider = self.provider.name(),
                    error = %err,
                    "word provider attempt failed"
                ),
            }

            if attempt < self.config.max_attempts && !delay.is_zero() {
                tokio::time::sleep(delay).await;
                delay = delay.saturating_mul(2);
            }
        }

        let fallback = fresh_words(self.config.fallback_words.clone(), words);
        let added = fallback.len();
        if unavailable {
            debug!(key = %self.key, added, "serving fallback words");
        } else {
            warn!(
                session = %self.key.session,
                language = %self.key.language,
                category = %self.key.category,
                added,
                "word provider exhausted; serving fallback words"
            );
        }
        words.extend(fallback);
        Refill {
            added,
            from_fallback: true,
        }
    }
}

/// Trim, drop empties and duplicates (first occurrence wins) and skip words already queued.
fn fresh_words(batch: Vec<String>, queued: &VecDeque<String>) -> Vec<String> {
    batch
        .into_iter()
        .map(|word| word.trim().to_string())
        .filter(|word| !word.is_empty() && !queued.contains(word))
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}
