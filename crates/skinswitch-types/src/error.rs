//! Error types for skinswitch.

use std::io;

/// Errors produced by skinswitch.
///
/// Hook vetoes are not errors and never appear here; see
/// `skinswitch_core::hooks::Veto`.
#[derive(Debug, thiserror::Error)]
pub enum SwitchError {
    #[error("target error: {0}")]
    Target(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("catalog error: {0}")]
    Catalog(String),

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, SwitchError>;
