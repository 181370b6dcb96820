//! Shared configuration types for the tweetpulse workspace.

mod app_config;
mod config;

use thiserror::Error;

pub use app_config::{AppConfig, ClassifierKind, Environment, SearchFilter};
pub use config::{load_app_config, load_app_config_from_env, parse_search_filters};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
