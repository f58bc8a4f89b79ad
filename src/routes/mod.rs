use axum::Router;

use crate::state::SharedState;

/// Swagger UI.
pub mod docs;
/// Health check.
pub mod health;
/// Lobby management and painter rotation.
pub mod lobby;
/// Player registration.
pub mod users;
/// Word draws per game session.
pub mod words;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(users::router())
        .merge(lobby::router())
        .merge(words::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
