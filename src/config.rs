//! Application-level configuration loading: word supply tuning, lobby defaults and rotation limits.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "PICTURA_BACK_CONFIG_PATH";
/// Words served when the provider fails on every attempt.
pub const DEFAULT_FALLBACK_WORDS: [&str; 3] = ["house", "tree", "sun"];

#[derive(Debug, Clone, Default)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Word pool refill and eviction settings.
    pub word_supply: WordSupplyConfig,
    /// Values applied to lobby fields the creator left unset.
    pub lobby_defaults: LobbyDefaults,
    /// Painter rotation persistence settings.
    pub rotation: RotationConfig,
}

/// Tuning of the per-key word pools.
#[derive(Debug, Clone)]
pub struct WordSupplyConfig {
    /// Words requested from the provider per refill.
    pub batch_size: usize,
    /// Provider attempts per refill before the fallback list is used.
    pub max_attempts: u32,
    /// Pause before the second attempt, doubled for each further one.
    pub retry_delay: Duration,
    /// Words served when every attempt failed.
    pub fallback_words: Vec<String>,
    /// Pools unused for longer than this are evicted by the sweeper.
    pub idle_ttl: Duration,
    /// Interval between eviction sweeps.
    pub sweep_interval: Duration,
}

impl Default for WordSupplyConfig {
    fn default() -> Self {
        Self {
            batch_size: 50,
            max_attempts: 3,
            retry_delay: Duration::from_millis(250),
            fallback_words: DEFAULT_FALLBACK_WORDS.iter().map(|w| w.to_string()).collect(),
            idle_ttl: Duration::from_secs(30 * 60),
            sweep_interval: Duration::from_secs(5 * 60),
        }
    }
}

/// Defaults for newly created lobbies.
#[derive(Debug, Clone)]
pub struct LobbyDefaults {
    pub max_players: u32,
    pub rounds: u32,
    pub draw_time_secs: u32,
    pub language: String,
    pub category: String,
}

impl Default for LobbyDefaults {
    fn default() -> Self {
        Self {
            max_players: 8,
            rounds: 3,
            draw_time_secs: 80,
            language: "en".into(),
            category: "anything".into(),
        }
    }
}

/// Limits of the load/select/persist loop behind turn advancement.
#[derive(Debug, Clone)]
pub struct RotationConfig {
    /// How many times a conflicting save is retried before giving up.
    pub save_attempts: u32,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self { save_attempts: 3 }
    }
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|err| {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to parse config; falling back to defaults"
                );
                Self::default()
            }),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse a JSON document; absent sections and fields keep their defaults.
    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        let raw = serde_json::from_str::<RawConfig>(contents)?;
        let config: Self = raw.into();
        info!(
            batch_size = config.word_supply.batch_size,
            fallback_words = config.word_supply.fallback_words.len(),
            "loaded configuration"
        );
        Ok(config)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    word_supply: RawWordSupply,
    lobby_defaults: RawLobbyDefaults,
    rotation: RawRotation,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawWordSupply {
    batch_size: Option<usize>,
    max_attempts: Option<u32>,
    retry_delay_ms: Option<u64>,
    fallback_words: Option<Vec<String>>,
    idle_ttl_secs: Option<u64>,
    sweep_interval_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawLobbyDefaults {
    max_players: Option<u32>,
    rounds: Option<u32>,
    draw_time_secs: Option<u32>,
    language: Option<String>,
    category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRotation {
    save_attempts: Option<u32>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            word_supply: value.word_supply.into(),
            lobby_defaults: value.lobby_defaults.into(),
            rotation: value.rotation.into(),
        }
    }
}

impl From<RawWordSupply> for WordSupplyConfig {
    fn from(value: RawWordSupply) -> Self {
        let defaults = Self::default();
        let fallback_words = value
            .fallback_words
            .map(|words| {
                words
                    .into_iter()
                    .map(|word| word.trim().to_string())
                    .filter(|word| !word.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|words| !words.is_empty())
            .unwrap_or(defaults.fallback_words);

        Self {
            batch_size: value.batch_size.filter(|n| *n > 0).unwrap_or(defaults.batch_size),
            max_attempts: value
                .max_attempts
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_attempts),
            retry_delay: value
                .retry_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.retry_delay),
            fallback_words,
            idle_ttl: value
                .idle_ttl_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.idle_ttl),
            sweep_interval: value
                .sweep_interval_secs
                .filter(|n| *n > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.sweep_interval),
        }
    }
}

impl From<RawLobbyDefaults> for LobbyDefaults {
    fn from(value: RawLobbyDefaults) -> Self {
        let defaults = Self::default();
        Self {
            max_players: value
                .max_players
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_players),
            rounds: value.rounds.filter(|n| *n > 0).unwrap_or(defaults.rounds),
            draw_time_secs: value
                .draw_time_secs
                .filter(|n| *n > 0)
                .unwrap_or(defaults.draw_time_secs),
            language: value.language.unwrap_or(defaults.language),
            category: value.category.unwrap_or(defaults.category),
        }
    }
}

impl From<RawRotation> for RotationConfig {
    fn from(value: RawRotation) -> Self {
        Self {
            save_attempts: value
                .save_attempts
                .filter(|n| *n > 0)
                .unwrap_or(Self::default().save_attempts),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = AppConfig::from_json("{}").unwrap();
        assert_eq!(config.word_supply.batch_size, 50);
        assert_eq!(config.word_supply.max_attempts, 3);
        assert_eq!(config.word_supply.fallback_words, vec!["house", "tree", "sun"]);
        assert_eq!(config.lobby_defaults.max_players, 8);
        assert_eq!(config.lobby_defaults.language, "en");
        assert_eq!(config.rotation.save_attempts, 3);
    }

    #[test]
    fn partial_sections_override_selected_fields() {
        let config = AppConfig::from_json(
            r#"{
                "word_supply": { "batch_size": 20, "retry_delay_ms": 0, "fallback_words": [" Ball ", ""] },
                "lobby_defaults": { "category": "animals" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.word_supply.batch_size, 20);
        assert_eq!(config.word_supply.retry_delay, Duration::ZERO);
        assert_eq!(config.word_supply.fallback_words, vec!["Ball"]);
        assert_eq!(config.word_supply.max_attempts, 3);
        assert_eq!(config.lobby_defaults.category, "animals");
        assert_eq!(config.lobby_defaults.rounds, 3);
    }

    #[test]
    fn zero_limits_are_ignored() {
        let config = AppConfig::from_json(
            r#"{ "word_supply": { "batch_size": 0, "max_attempts": 0, "fallback_words": [] },
                 "rotation": { "save_attempts": 0 } }"#,
        )
        .unwrap();

        assert_eq!(config.word_supply.batch_size, 50);
        assert_eq!(config.word_supply.max_attempts, 3);
        assert_eq!(config.word_supply.fallback_words.len(), 3);
        assert_eq!(config.rotation.save_attempts, 3);
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let config = AppConfig::from_json(include_str!("../config/app.json")).unwrap();
        let defaults = AppConfig::default();

        assert_eq!(config.word_supply.batch_size, defaults.word_supply.batch_size);
        assert_eq!(config.word_supply.retry_delay, defaults.word_supply.retry_delay);
        assert_eq!(config.word_supply.idle_ttl, defaults.word_supply.idle_ttl);
        assert_eq!(config.word_supply.fallback_words, defaults.word_supply.fallback_words);
        assert_eq!(config.lobby_defaults.draw_time_secs, defaults.lobby_defaults.draw_time_secs);
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(AppConfig::from_json("{ not json").is_err());
    }
}
