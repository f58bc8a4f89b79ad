/// Lobby and user persistence backends.
pub mod lobby_store;
/// Database model definitions.
pub mod models;
/// Storage abstraction layer for database operations.
pub mod storage;
/// Remote word-generation backends.
pub mod word_provider;
