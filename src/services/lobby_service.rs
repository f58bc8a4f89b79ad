use std::collections::HashSet;

use tracing::info;
use uuid::Uuid;

use crate::{
    dao::{lobby_store::LobbyStore, models::UserId},
    dto::lobby::{CreateLobbyRequest, LobbySummary, LobbyWord, UpdateLobbyRequest},
    error::ServiceError,
    state::{Lobby, RotationState, SharedState},
};

/// Open a lobby owned by an existing user, who becomes its first member.
pub async fn create_lobby(
    state: &SharedState,
    request: CreateLobbyRequest,
) -> Result<LobbySummary, ServiceError> {
    let store = state.require_lobby_store().await?;
    ensure_user_exists(store.as_ref(), request.owner_id).await?;

    let defaults = &state.config().lobby_defaults;
    let lobby = Lobby {
        id: Uuid::new_v4(),
        revision: 0,
        owner_id: request.owner_id,
        max_players: request.max_players.unwrap_or(defaults.max_players),
        player_ids: vec![request.owner_id],
        language: request.language.unwrap_or_else(|| defaults.language.clone()),
        category: request
            .category
            .map(|category| category.trim().to_string())
            .unwrap_or_else(|| defaults.category.clone()),
        rounds: request.rounds.unwrap_or(defaults.rounds),
        draw_time_secs: request.draw_time_secs.unwrap_or(defaults.draw_time_secs),
        current_word: None,
        rotation: RotationState::default(),
    };

    let stored = Lobby::from(store.save_lobby(lobby.into()).await?);
    info!(lobby_id = %stored.id, owner_id = stored.owner_id, "lobby created");
    Ok(stored.into())
}

/// Lobby `id`, or `NotFound`.
pub async fn get_lobby(state: &SharedState, id: Uuid) -> Result<LobbySummary, ServiceError> {
    let store = state.require_lobby_store().await?;
    Ok(load_lobby(store.as_ref(), id).await?.into())
}

/// Every stored lobby.
pub async fn list_lobbies(state: &SharedState) -> Result<Vec<LobbySummary>, ServiceError> {
    let store = state.require_lobby_store().await?;
    let lobbies = store.list_lobbies().await?;
    Ok(lobbies
        .into_iter()
        .map(|entity| Lobby::from(entity).into())
        .collect())
}

/// Apply the fields present in `request`.
pub async fn update_lobby(
    state: &SharedState,
    id: Uuid,
    request: UpdateLobbyRequest,
) -> Result<LobbySummary, ServiceError> {
    let updated = modify_lobby(state, id, |lobby| {
        if let Some(max_players) = request.max_players {
            lobby.max_players = max_players;
        }
        if let Some(language) = request.language {
            lobby.language = language;
        }
        if let Some(category) = request.category {
            lobby.category = category.trim().to_string();
        }
        if let Some(rounds) = request.rounds {
            lobby.rounds = rounds;
        }
        if let Some(draw_time_secs) = request.draw_time_secs {
            lobby.draw_time_secs = draw_time_secs;
        }
        if let Some(player_ids) = request.player_ids {
            let unique: HashSet<UserId> = player_ids.iter().copied().collect();
            if unique.len() != player_ids.len() {
                return Err(ServiceError::InvalidInput(
                    "player list contains duplicates".into(),
                ));
            }
            lobby.player_ids = player_ids;
        }
        if lobby.player_ids.len() > lobby.max_players as usize {
            return Err(ServiceError::InvalidInput(format!(
                "lobby holds at most {} players",
                lobby.max_players
            )));
        }
        Ok(())
    })
    .await?;

    info!(lobby_id = %id, "lobby updated");
    Ok(updated.into())
}

/// Delete lobby `id` under its lock.
pub async fn delete_lobby(state: &SharedState, id: Uuid) -> Result<(), ServiceError> {
    let _guard = state.lock_lobby(id).await;

    let store = state.require_lobby_store().await?;
    if !store.delete_lobby(id).await? {
        return Err(not_found(id));
    }
    info!(lobby_id = %id, "lobby deleted");
    Ok(())
}

/// Add an existing user to the lobby.
pub async fn join_lobby(
    state: &SharedState,
    id: Uuid,
    player_id: UserId,
) -> Result<LobbySummary, ServiceError> {
    let store = state.require_lobby_store().await?;
    ensure_user_exists(store.as_ref(), player_id).await?;

    let joined = modify_lobby(state, id, |lobby| {
        if lobby.has_member(player_id) {
            return Err(ServiceError::InvalidState(format!(
                "player `{player_id}` already joined lobby `{id}`"
            )));
        }
        if lobby.is_full() {
            return Err(ServiceError::InvalidState(format!("lobby `{id}` is full")));
        }
        lobby.player_ids.push(player_id);
        Ok(())
    })
    .await?;

    info!(lobby_id = %id, player_id, "player joined lobby");
    Ok(joined.into())
}

/// Remove a member. The lobby is deleted once its last member left; `None` is returned then.
///
/// The rotation state is left as is: a departed painter is skipped by the next selection.
pub async fn leave_lobby(
    state: &SharedState,
    id: Uuid,
    player_id: UserId,
) -> Result<Option<LobbySummary>, ServiceError> {
    let _guard = state.lock_lobby(id).await;

    let store = state.require_lobby_store().await?;
    let mut lobby = load_lobby(store.as_ref(), id).await?;
    if !lobby.has_member(player_id) {
        return Err(ServiceError::NotFound(format!(
            "player `{player_id}` is not in lobby `{id}`"
        )));
    }

    lobby.player_ids.retain(|member| *member != player_id);
    info!(lobby_id = %id, player_id, "player left lobby");

    let Some(&next_owner) = lobby.player_ids.first() else {
        store.delete_lobby(id).await?;
        info!(lobby_id = %id, "last player left; lobby deleted");
        return Ok(None);
    };
    if lobby.owner_id == player_id {
        lobby.owner_id = next_owner;
    }

    let stored = store.save_lobby(lobby.into()).await?;
    Ok(Some(Lobby::from(stored).into()))
}

/// Set the word of the running round.
pub async fn set_lobby_word(
    state: &SharedState,
    id: Uuid,
    word: LobbyWord,
) -> Result<LobbyWord, ServiceError> {
    let word = word.word.trim().to_string();
    if word.is_empty() {
        return Err(ServiceError::InvalidInput("word must not be empty".into()));
    }

    let updated = modify_lobby(state, id, |lobby| {
        lobby.current_word = Some(word);
        Ok(())
    })
    .await?;

    updated
        .current_word
        .map(|word| LobbyWord { word })
        .ok_or_else(|| ServiceError::InvalidState("word was not stored".into()))
}

/// Word of the running round, or `NotFound` before one was set.
pub async fn get_lobby_word(state: &SharedState, id: Uuid) -> Result<LobbyWord, ServiceError> {
    let store = state.require_lobby_store().await?;
    let lobby = load_lobby(store.as_ref(), id).await?;
    lobby
        .current_word
        .map(|word| LobbyWord { word })
        .ok_or_else(|| ServiceError::NotFound(format!("lobby `{id}` has no word yet")))
}

/// Load a lobby or report it as missing.
pub(crate) async fn load_lobby(store: &dyn LobbyStore, id: Uuid) -> Result<Lobby, ServiceError> {
    store
        .find_lobby(id)
        .await?
        .map(Lobby::from)
        .ok_or_else(|| not_found(id))
}

/// Run `apply` on the stored lobby under its lock and persist the result.
async fn modify_lobby<F>(state: &SharedState, id: Uuid, apply: F) -> Result<Lobby, ServiceError>
where
    F: FnOnce(&mut Lobby) -> Result<(), ServiceError>,
{
    let _guard = state.lock_lobby(id).await;

    let store = state.require_lobby_store().await?;
    let mut lobby = load_lobby(store.as_ref(), id).await?;
    apply(&mut lobby)?;

    let stored = store.save_lobby(lobby.into()).await?;
    Ok(stored.into())
}

async fn ensure_user_exists(store: &dyn LobbyStore, id: UserId) -> Result<(), ServiceError> {
    match store.find_user(id).await? {
        Some(_) => Ok(()),
        None => Err(ServiceError::NotFound(format!("user `{id}` not found"))),
    }
}

fn not_found(id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("lobby `{id}` not found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fixtures::{create_request, state_with_users};

    #[tokio::test]
    async fn create_applies_defaults_and_adds_owner() {
        let (state, _) = state_with_users(&[(1, "t1")]).await;

        let lobby = create_lobby(&state, create_request(1)).await.unwrap();
        assert_eq!(lobby.player_ids, vec![1]);
        assert_eq!(lobby.max_players, 8);
        assert_eq!(lobby.language, "en");
        assert_eq!(lobby.category, "anything");
        assert_eq!(lobby.painted_in_cycle, 0);

        assert_eq!(list_lobbies(&state).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn create_requires_a_known_owner() {
        let (state, _) = state_with_users(&[]).await;
        assert!(matches!(
            create_lobby(&state, create_request(42)).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn join_rejects_unknown_duplicate_and_overflow() {
        let (state, _) = state_with_users(&[(1, "t1"), (2, "t2"), (3, "t3")]).await;
        let mut request = create_request(1);
        request.max_players = Some(2);
        let lobby = create_lobby(&state, request).await.unwrap();

        assert!(matches!(
            join_lobby(&state, lobby.id, 99).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            join_lobby(&state, lobby.id, 1).await,
            Err(ServiceError::InvalidState(_))
        ));

        let joined = join_lobby(&state, lobby.id, 2).await.unwrap();
        assert_eq!(joined.player_ids, vec![1, 2]);
        assert!(matches!(
            join_lobby(&state, lobby.id, 3).await,
            Err(ServiceError::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn last_player_leaving_deletes_the_lobby() {
        let (state, _) = state_with_users(&[(1, "t1"), (2, "t2")]).await;
        let lobby = create_lobby(&state, create_request(1)).await.unwrap();
        join_lobby(&state, lobby.id, 2).await.unwrap();

        let remaining = leave_lobby(&state, lobby.id, 1).await.unwrap().unwrap();
        assert_eq!(remaining.player_ids, vec![2]);
        assert_eq!(remaining.owner_id, 2);

        assert!(matches!(
            leave_lobby(&state, lobby.id, 1).await,
            Err(ServiceError::NotFound(_))
        ));

        assert!(leave_lobby(&state, lobby.id, 2).await.unwrap().is_none());
        assert!(matches!(
            get_lobby(&state, lobby.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn update_checks_membership_rules() {
        let (state, _) = state_with_users(&[(1, "t1")]).await;
        let lobby = create_lobby(&state, create_request(1)).await.unwrap();

        let duplicates = UpdateLobbyRequest {
            player_ids: Some(vec![1, 1]),
            ..UpdateLobbyRequest::default()
        };
        assert!(matches!(
            update_lobby(&state, lobby.id, duplicates).await,
            Err(ServiceError::InvalidInput(_))
        ));

        let changed = UpdateLobbyRequest {
            category: Some(" food ".into()),
            rounds: Some(5),
            player_ids: Some(vec![1, 7]),
            ..UpdateLobbyRequest::default()
        };
        let updated = update_lobby(&state, lobby.id, changed).await.unwrap();
        assert_eq!(updated.category, "food");
        assert_eq!(updated.rounds, 5);
        assert_eq!(updated.player_ids, vec![1, 7]);
    }

    #[tokio::test]
    async fn word_round_trips() {
        let (state, _) = state_with_users(&[(1, "t1")]).await;
        let lobby = create_lobby(&state, create_request(1)).await.unwrap();

        assert!(matches!(
            get_lobby_word(&state, lobby.id).await,
            Err(ServiceError::NotFound(_))
        ));

        set_lobby_word(&state, lobby.id, LobbyWord { word: " giraffe ".into() })
            .await
            .unwrap();
        assert_eq!(get_lobby_word(&state, lobby.id).await.unwrap().word, "giraffe");
    }

    #[tokio::test]
    async fn delete_reports_missing_lobbies() {
        let (state, _) = state_with_users(&[(1, "t1")]).await;
        let lobby = create_lobby(&state, create_request(1)).await.unwrap();

        delete_lobby(&state, lobby.id).await.unwrap();
        assert!(matches!(
            delete_lobby(&state, lobby.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
