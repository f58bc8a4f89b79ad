use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use validator::Validate;

use crate::{
    dao::models::UserId,
    dto::user::{RegisterUserRequest, RegisteredUser, UserSummary},
    error::AppError,
    services::user_service,
    state::SharedState,
};

/// Player registration routes.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/users", post(register_user))
        .route("/users/{id}", get(get_user))
}

/// Register a player and issue their token.
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "User registered", body = RegisteredUser),
        (status = 400, description = "Invalid username"),
        (status = 409, description = "Username already taken")
    )
)]
pub async fn register_user(
    State(state): State<SharedState>,
    Json(payload): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<RegisteredUser>), AppError> {
    payload.validate()?;
    let user = user_service::register_user(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Look a player up by id.
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    params(("id" = u64, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User found", body = UserSummary),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<SharedState>,
    Path(id): Path<UserId>,
) -> Result<Json<UserSummary>, AppError> {
    Ok(Json(user_service::get_user(&state, id).await?))
}
