//! Library crate for pictura-back: painter rotation, word pools and the lobby REST layer.

mod config;
pub mod dao;
mod dto;
mod error;
pub mod routes;
pub mod services;
pub mod state;

pub use config::AppConfig;
