use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::lobby::{
        CreateLobbyRequest, LobbySummary, LobbyWord, LobbyWordsQuery, PlayerQuery, TurnResponse,
        UpdateLobbyRequest,
    },
    error::AppError,
    services::{lobby_service, turn_service, word_service},
    state::SharedState,
};

/// Routes managing lobbies, their members and their rounds.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/lobbies", get(list_lobbies).post(create_lobby))
        .route(
            "/lobbies/{id}",
            get(get_lobby).put(update_lobby).delete(delete_lobby),
        )
        .route("/lobbies/{id}/join", put(join_lobby))
        .route("/lobbies/{id}/leave", put(leave_lobby))
        .route("/lobbies/{id}/next-painter", post(next_painter))
        .route("/lobbies/{id}/word", get(get_word).put(set_word))
        .route("/lobbies/{id}/words", get(lobby_words))
}

/// List every lobby.
#[utoipa::path(
    get,
    path = "/lobbies",
    tag = "lobby",
    responses((status = 200, description = "All lobbies", body = [LobbySummary]))
)]
pub async fn list_lobbies(
    State(state): State<SharedState>,
) -> Result<Json<Vec<LobbySummary>>, AppError> {
    Ok(Json(lobby_service::list_lobbies(&state).await?))
}

/// Open a new lobby.
#[utoipa::path(
    post,
    path = "/lobbies",
    tag = "lobby",
    request_body = CreateLobbyRequest,
    responses(
        (status = 201, description = "Lobby created", body = LobbySummary),
        (status = 400, description = "Invalid lobby settings"),
        (status = 404, description = "Owner not found")
    )
)]
pub async fn create_lobby(
    State(state): State<SharedState>,
    Json(payload): Json<CreateLobbyRequest>,
) -> Result<(StatusCode, Json<LobbySummary>), AppError> {
    payload.validate()?;
    let summary = lobby_service::create_lobby(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

/// Fetch one lobby.
#[utoipa::path(
    get,
    path = "/lobbies/{id}",
    tag = "lobby",
    params(("id" = Uuid, Path, description = "Lobby identifier")),
    responses(
        (status = 200, description = "Lobby found", body = LobbySummary),
        (status = 404, description = "Lobby not found")
    )
)]
pub async fn get_lobby(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<LobbySummary>, AppError> {
    Ok(Json(lobby_service::get_lobby(&state, id).await?))
}

/// Change lobby settings or replace its member list.
#[utoipa::path(
    put,
    path = "/lobbies/{id}",
    tag = "lobby",
    params(("id" = Uuid, Path, description = "Lobby identifier")),
    request_body = UpdateLobbyRequest,
    responses(
        (status = 200, description = "Lobby updated", body = LobbySummary),
        (status = 400, description = "Invalid lobby settings"),
        (status = 404, description = "Lobby not found")
    )
)]
pub async fn update_lobby(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateLobbyRequest>,
) -> Result<Json<LobbySummary>, AppError> {
    payload.validate()?;
    Ok(Json(lobby_service::update_lobby(&state, id, payload).await?))
}

/// Delete a lobby.
#[utoipa::path(
    delete,
    path = "/lobbies/{id}",
    tag = "lobby",
    params(("id" = Uuid, Path, description = "Lobby identifier")),
    responses(
        (status = 204, description = "Lobby deleted"),
        (status = 404, description = "Lobby not found")
    )
)]
pub async fn delete_lobby(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    lobby_service::delete_lobby(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Add a player to the lobby.
#[utoipa::path(
    put,
    path = "/lobbies/{id}/join",
    tag = "lobby",
    params(("id" = Uuid, Path, description = "Lobby identifier"), PlayerQuery),
    responses(
        (status = 200, description = "Player joined", body = LobbySummary),
        (status = 404, description = "Lobby or player not found"),
        (status = 409, description = "Lobby full or player already joined")
    )
)]
pub async fn join_lobby(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Query(query): Query<PlayerQuery>,
) -> Result<Json<LobbySummary>, AppError> {
    Ok(Json(
        lobby_service::join_lobby(&state, id, query.player_id).await?,
    ))
}

/// Remove a player; the lobby is deleted when its last player leaves.
#[utoipa::path(
    put,
    path = "/lobbies/{id}/leave",
    tag = "lobby",
    params(("id" = Uuid, Path, description = "Lobby identifier"), PlayerQuery),
    responses(
        (status = 200, description = "Player left", body = LobbySummary),
        (status = 204, description = "Last player left, lobby deleted"),
        (status = 404, description = "Lobby not found or player not a member")
    )
)]
pub async fn leave_lobby(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Query(query): Query<PlayerQuery>,
) -> Result<Response, AppError> {
    let remaining = lobby_service::leave_lobby(&state, id, query.player_id).await?;
    Ok(match remaining {
        Some(summary) => Json(summary).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

/// Select the next painter of the lobby.
#[utoipa::path(
    post,
    path = "/lobbies/{id}/next-painter",
    tag = "lobby",
    params(("id" = Uuid, Path, description = "Lobby identifier")),
    responses(
        (status = 200, description = "Painter selected", body = TurnResponse),
        (status = 400, description = "Lobby has no players"),
        (status = 404, description = "Lobby not found"),
        (status = 409, description = "No lobby player resolves to a user"),
        (status = 503, description = "Lobby busy or storage unavailable, retry later")
    )
)]
pub async fn next_painter(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TurnResponse>, AppError> {
    let outcome = turn_service::advance_turn(&state, id).await?;
    Ok(Json(TurnResponse::new(
        id,
        outcome.painter_id,
        &outcome.roster,
        &outcome.lobby.rotation,
    )))
}

/// Word of the running round.
#[utoipa::path(
    get,
    path = "/lobbies/{id}/word",
    tag = "lobby",
    params(("id" = Uuid, Path, description = "Lobby identifier")),
    responses(
        (status = 200, description = "Current word", body = LobbyWord),
        (status = 404, description = "Lobby not found or no word set")
    )
)]
pub async fn get_word(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<LobbyWord>, AppError> {
    Ok(Json(lobby_service::get_lobby_word(&state, id).await?))
}

/// Set the word the painter has to draw.
#[utoipa::path(
    put,
    path = "/lobbies/{id}/word",
    tag = "lobby",
    params(("id" = Uuid, Path, description = "Lobby identifier")),
    request_body = LobbyWord,
    responses(
        (status = 200, description = "Word stored", body = LobbyWord),
        (status = 400, description = "Invalid word"),
        (status = 404, description = "Lobby not found")
    )
)]
pub async fn set_word(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<LobbyWord>,
) -> Result<Json<LobbyWord>, AppError> {
    payload.validate()?;
    Ok(Json(lobby_service::set_lobby_word(&state, id, payload).await?))
}

/// Candidate words for the lobby's language and category.
#[utoipa::path(
    get,
    path = "/lobbies/{id}/words",
    tag = "lobby",
    params(("id" = Uuid, Path, description = "Lobby identifier"), LobbyWordsQuery),
    responses(
        (status = 200, description = "Candidate words", body = [String]),
        (status = 404, description = "Lobby not found")
    )
)]
pub async fn lobby_words(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Query(query): Query<LobbyWordsQuery>,
) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(
        word_service::draw_lobby_words(&state, id, query.count).await?,
    ))
}
