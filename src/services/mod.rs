/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Lobby lifecycle and membership operations.
pub mod lobby_service;
/// Storage connection supervisor with reconnect backoff.
pub mod storage_supervisor;
/// Painter rotation across persisted lobbies.
pub mod turn_service;
/// Player registration and lookup.
pub mod user_service;
/// Word draws and idle pool eviction.
pub mod word_service;
