//! CLI error types with exit code handling
//!
//! Library errors are flattened into a message plus an optional hint telling
//! the user how to fix the problem.

use miette::Diagnostic;
use provctl_core::CoreError;
use provctl_engine::EngineError;
use provctl_repo::RepoError;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// Configuration could not be loaded or a provider could not be found
    #[error("Configuration error: {message}")]
    #[diagnostic(code(provctl::cli::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Input provided by the user is invalid
    #[error("Invalid input: {message}")]
    #[diagnostic(code(provctl::cli::input))]
    Input {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Fetching or rendering a provider artifact failed
    #[error("{message}")]
    #[diagnostic(code(provctl::cli::repository))]
    Repository {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(provctl::cli::io))]
    Io { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Config { .. }
            | CliError::Input { .. }
            | CliError::Repository { .. }
            | CliError::Io { .. } => exit_codes::ERROR,
        }
    }

    /// Create an input error (user provided invalid input)
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input {
            message: message.into(),
            help: None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        let help = match &err {
            CoreError::ProviderNotFound { .. } => {
                Some("Run `provctl providers` to list the configured providers".to_string())
            }
            CoreError::AmbiguousProvider { .. } => Some("Pick one with --type".to_string()),
            CoreError::InvalidConfig { .. } | CoreError::YamlParse(_) => {
                Some("Check the file passed with --config or ~/.provctl/provctl.yaml".to_string())
            }
            _ => None,
        };

        match err {
            CoreError::InvalidProviderType { .. }
            | CoreError::InvalidVersion { .. }
            | CoreError::InvalidTemplateOption { .. } => CliError::Input {
                message: err.to_string(),
                help,
            },
            CoreError::Io(err) => CliError::from(err),
            _ => CliError::Config {
                message: err.to_string(),
                help,
            },
        }
    }
}

impl From<RepoError> for CliError {
    fn from(err: RepoError) -> Self {
        let help = match &err {
            RepoError::Render { source, .. } if source.missing_variables().is_some() => Some(
                "Set the missing variables in the environment or in the config file".to_string(),
            ),
            RepoError::NotFound { provider, .. } | RepoError::InvalidVersion { provider, .. } => {
                Some(format!(
                    "Run `provctl versions` to list the versions published by {}",
                    provider
                ))
            }
            RepoError::Remote { .. } => {
                Some("Setting GITHUB_TOKEN raises the GitHub API rate limit".to_string())
            }
            _ => None,
        };

        match err {
            RepoError::Core(err) => CliError::from(err),
            RepoError::InvalidArguments { message } => CliError::Input { message, help },
            err => CliError::Repository {
                message: err.to_string(),
                help,
            },
        }
    }
}

impl From<EngineError> for CliError {
    fn from(err: EngineError) -> Self {
        CliError::Repository {
            message: err.to_string(),
            help: None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CliError>;
