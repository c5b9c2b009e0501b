// src/errors.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML config: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Compiler '{bin}' is unavailable: {reason}")]
    ToolUnavailable { bin: String, reason: String },

    #[error("Invalid artifact name '{0}'")]
    InvalidArtifactName(String),

    #[error("don't have a file named {0}")]
    ArtifactMissing(String),
}

pub type Result<T> = std::result::Result<T, ServiceError>;
