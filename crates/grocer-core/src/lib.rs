//! Shared domain types and pure logic for the grocer workspace.
//!
//! Everything in this crate is free of I/O: the free-text item parser, the
//! name similarity heuristic, shopping-list entities, and the environment
//! configuration loader.

pub mod app_config;
pub mod config;
pub mod items;
pub mod parser;
pub mod similarity;
pub mod units;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use items::{is_resolvable_name, ItemState, Principal, ShoppingItem, ShoppingList};
pub use parser::{parse_item, ParsedItem};
pub use similarity::similarity_score;
pub use units::Unit;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
