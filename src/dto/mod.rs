pub mod health;
pub mod lobby;
pub mod user;
pub mod validation;
pub mod words;
