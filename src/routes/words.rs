use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::words::WordsQuery, error::AppError, services::word_service, state::SharedState,
};

/// Word generation routes.
pub fn router() -> Router<SharedState> {
    Router::new().route("/api/words/gpt", get(draw_words))
}

/// Draw candidate words for a game session.
#[utoipa::path(
    get,
    path = "/api/words/gpt",
    tag = "words",
    params(WordsQuery),
    responses(
        (status = 200, description = "Candidate words", body = [String]),
        (status = 400, description = "Missing session, language or category")
    )
)]
pub async fn draw_words(
    State(state): State<SharedState>,
    Query(query): Query<WordsQuery>,
) -> Result<Json<Vec<String>>, AppError> {
    let words = word_service::draw_words(
        &state,
        &query.session,
        &query.lang,
        &query.category,
        query.count,
    )
    .await?;
    Ok(Json(words))
}
