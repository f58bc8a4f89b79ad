use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Pictura Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::users::register_user,
        crate::routes::users::get_user,
        crate::routes::lobby::list_lobbies,
        crate::routes::lobby::create_lobby,
        crate::routes::lobby::get_lobby,
        crate::routes::lobby::update_lobby,
        crate::routes::lobby::delete_lobby,
        crate::routes::lobby::join_lobby,
        crate::routes::lobby::leave_lobby,
        crate::routes::lobby::next_painter,
        crate::routes::lobby::get_word,
        crate::routes::lobby::set_word,
        crate::routes::lobby::lobby_words,
        crate::routes::words::draw_words,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::user::RegisterUserRequest,
            crate::dto::user::RegisteredUser,
            crate::dto::user::UserSummary,
            crate::dto::lobby::CreateLobbyRequest,
            crate::dto::lobby::UpdateLobbyRequest,
            crate::dto::lobby::LobbySummary,
            crate::dto::lobby::LobbyWord,
            crate::dto::lobby::TurnResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "users", description = "Player registration"),
        (name = "lobby", description = "Lobby membership, painter rotation and round words"),
        (name = "words", description = "Candidate words per game session"),
    )
)]
pub struct ApiDoc;
