use tracing::info;
use uuid::Uuid;

use crate::{
    dao::models::UserId,
    dto::user::{RegisterUserRequest, RegisteredUser, UserSummary},
    error::ServiceError,
    state::SharedState,
};

/// Register a player under a unique username and issue the token used by the painter rotation.
pub async fn register_user(
    state: &SharedState,
    request: RegisterUserRequest,
) -> Result<RegisteredUser, ServiceError> {
    let store = state.require_lobby_store().await?;
    let token = Uuid::new_v4().to_string();

    let user = store.create_user(request.username, token).await?;
    info!(user_id = user.id, username = %user.username, "user registered");
    Ok(user.into())
}

/// Public view of user `id`.
pub async fn get_user(state: &SharedState, id: UserId) -> Result<UserSummary, ServiceError> {
    let store = state.require_lobby_store().await?;
    store
        .find_user(id)
        .await?
        .map(Into::into)
        .ok_or_else(|| ServiceError::NotFound(format!("user `{id}` not found")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dao::lobby_store::LobbyStore,
        services::{
            fixtures::{create_request, state_with_users},
            lobby_service, turn_service,
        },
    };

    fn request(username: &str) -> RegisterUserRequest {
        RegisterUserRequest {
            username: username.into(),
        }
    }

    #[tokio::test]
    async fn registration_issues_distinct_tokens() {
        let (state, store) = state_with_users(&[]).await;

        let alice = register_user(&state, request("alice")).await.unwrap();
        let bob = register_user(&state, request("bob")).await.unwrap();

        assert_ne!(alice.id, bob.id);
        assert_ne!(alice.token, bob.token);
        assert!(Uuid::parse_str(&alice.token).is_ok());
        let stored = store.find_user(alice.id).await.unwrap().unwrap();
        assert_eq!(stored.token, alice.token);
    }

    #[tokio::test]
    async fn taken_usernames_are_rejected() {
        let (state, _) = state_with_users(&[]).await;
        register_user(&state, request("alice")).await.unwrap();

        assert!(matches!(
            register_user(&state, request("alice")).await,
            Err(ServiceError::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn lookup_hides_the_token() {
        let (state, _) = state_with_users(&[]).await;
        let alice = register_user(&state, request("alice")).await.unwrap();

        let found = get_user(&state, alice.id).await.unwrap();
        assert_eq!(found.username, "alice");
        assert!(matches!(
            get_user(&state, alice.id + 100).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn registered_users_can_paint() {
        let (state, _) = state_with_users(&[]).await;
        let alice = register_user(&state, request("alice")).await.unwrap();
        let bob = register_user(&state, request("bob")).await.unwrap();

        let lobby = lobby_service::create_lobby(&state, create_request(alice.id))
            .await
            .unwrap();
        lobby_service::join_lobby(&state, lobby.id, bob.id)
            .await
            .unwrap();

        let first = turn_service::advance_turn(&state, lobby.id).await.unwrap();
        let second = turn_service::advance_turn(&state, lobby.id).await.unwrap();
        assert_eq!((first.painter_id, second.painter_id), (alice.id, bob.id));
    }
}
