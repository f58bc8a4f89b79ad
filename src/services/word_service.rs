use std::{sync::Arc, time::Duration};

use tokio::time::{MissedTickBehavior, interval};
use tracing::debug;
use uuid::Uuid;

use crate::{
    error::ServiceError,
    services::lobby_service::load_lobby,
    state::{SharedState, WordSupplyRegistry},
};

/// Upper bound of words handed out by a single draw.
pub const MAX_WORDS_PER_DRAW: usize = 100;

/// Draw words for a `(session, language, category)` key. Negative counts yield no words.
pub async fn draw_words(
    state: &SharedState,
    session: &str,
    language: &str,
    category: &str,
    count: i64,
) -> Result<Vec<String>, ServiceError> {
    let count = usize::try_from(count).unwrap_or(0);
    if count > MAX_WORDS_PER_DRAW {
        return Err(ServiceError::InvalidInput(format!(
            "at most {MAX_WORDS_PER_DRAW} words can be drawn at once"
        )));
    }

    let words = state
        .words()
        .next_words(session, language, category, count)
        .await?;
    Ok(words)
}

/// Draw words for a lobby, keyed by the lobby id and its language and category.
pub async fn draw_lobby_words(
    state: &SharedState,
    id: Uuid,
    count: i64,
) -> Result<Vec<String>, ServiceError> {
    let store = state.require_lobby_store().await?;
    let lobby = load_lobby(store.as_ref(), id).await?;
    draw_words(
        state,
        &lobby.id.to_string(),
        &lobby.language,
        &lobby.category,
        count,
    )
    .await
}

/// Periodically evict word pools that stayed idle for longer than `max_idle`.
pub async fn run_eviction_sweeper(
    registry: Arc<WordSupplyRegistry>,
    every: Duration,
    max_idle: Duration,
) {
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let evicted = registry.evict_idle(max_idle);
        debug!(evicted, pools = registry.len(), "word pool sweep finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{
        fixtures::{create_request, state_with_users},
        lobby_service,
    };

    #[tokio::test]
    async fn negative_and_zero_counts_return_nothing() {
        let (state, _) = state_with_users(&[]).await;

        assert!(draw_words(&state, "s1", "en", "animals", -4).await.unwrap().is_empty());
        assert!(draw_words(&state, "s1", "en", "animals", 0).await.unwrap().is_empty());
        assert!(state.words().is_empty());
    }

    #[tokio::test]
    async fn oversized_and_keyless_draws_are_rejected() {
        let (state, _) = state_with_users(&[]).await;

        assert!(matches!(
            draw_words(&state, "s1", "en", "animals", 1_000).await,
            Err(ServiceError::InvalidInput(_))
        ));
        assert!(matches!(
            draw_words(&state, " ", "en", "animals", 2).await,
            Err(ServiceError::InvalidInput(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn offline_provider_falls_back_to_safe_words() {
        let (state, _) = state_with_users(&[]).await;

        let started = tokio::time::Instant::now();

        let words = draw_words(&state, "s1", "en", "animals", 3).await.unwrap();
        assert_eq!(words, vec!["house", "tree", "sun"]);
        let words = draw_words(&state, "s1", "en", "animals", 3).await.unwrap();
        assert_eq!(words, vec!["house", "tree", "sun"]);

        // Nothing to retry without a configured provider.
        assert_eq!(started.elapsed(), std::time::Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn lobby_words_use_the_lobby_key() {
        let (state, _) = state_with_users(&[(1, "a")]).await;
        let lobby = lobby_service::create_lobby(&state, create_request(1))
            .await
            .unwrap();

        let words = draw_lobby_words(&state, lobby.id, 2).await.unwrap();
        assert_eq!(words.len(), 2);
        assert_eq!(state.words().len(), 1);

        assert!(matches!(
            draw_lobby_words(&state, Uuid::new_v4(), 2).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
