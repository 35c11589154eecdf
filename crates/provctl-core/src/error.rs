//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid provider type: {value}")]
    InvalidProviderType { value: String },

    #[error("Invalid version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidTemplateOption { field: String, reason: String },

    #[error("Provider not found: {name}")]
    ProviderNotFound { name: String },

    #[error("Provider name '{name}' is ambiguous, specify one of: {types}")]
    AmbiguousProvider { name: String, types: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Failed to parse config file: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
