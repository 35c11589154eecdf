//! Engine error types

use miette::Diagnostic;
use thiserror::Error;

/// Main engine error type
#[derive(Error, Debug, Diagnostic)]
pub enum EngineError {
    #[error("value for variables [{}] is not set", .names.join(", "))]
    #[diagnostic(
        code(provctl::engine::missing_variable),
        help("set the variables in the environment or in the provctl config file")
    )]
    MissingVariable { names: Vec<String> },

    #[error("failed to parse YAML document {document}: {message}")]
    #[diagnostic(code(provctl::engine::conversion))]
    Conversion { document: usize, message: String },

    #[error("target namespace can't be defaulted: {reason}")]
    #[diagnostic(
        code(provctl::engine::target_namespace),
        help("specify a target namespace explicitly")
    )]
    NoTargetNamespace { reason: String },

    #[error("artifact is not valid UTF-8: {0}")]
    #[diagnostic(code(provctl::engine::encoding))]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("YAML error: {0}")]
    #[diagnostic(code(provctl::engine::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl EngineError {
    /// Names of the missing variables, if this is a substitution failure
    pub fn missing_variables(&self) -> Option<&[String]> {
        match self {
            EngineError::MissingVariable { names } => Some(names),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
