//! Error types for the style resolution engine

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StyleError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Theme error at '{path}': {message}")]
    Theme { path: String, message: String },

    #[error("Strict mode violation in {component}: '{key}' uses raw value {value} instead of a theme token")]
    Strict { component: String, key: String, value: String },

    #[error("Registry error: {message}")]
    Registry { message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Watch error: {message}")]
    Watch { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },
}

pub type Result<T> = std::result::Result<T, StyleError>;

impl StyleError {
    pub fn theme(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Theme {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn strict(component: impl Into<String>, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Strict {
            component: component.into(),
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn registry(message: impl Into<String>) -> Self {
        Self::Registry {
            message: message.into(),
        }
    }

    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }
}
