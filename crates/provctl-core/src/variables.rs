//! Variable sources used for template substitution
//!
//! Values are resolved through layers, highest precedence first:
//! explicit overrides, the environment, the config file and finally defaults.

use std::collections::HashMap;

/// Read-only lookup of named string variables
pub trait VariablesGetter: Send + Sync {
    /// Get the value of a variable, if it is defined
    fn get(&self, name: &str) -> Option<String>;
}

impl VariablesGetter for HashMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        HashMap::get(self, name).cloned()
    }
}

/// Where environment variables are read from
#[derive(Debug, Clone, Default)]
pub enum EnvSource {
    /// The process environment
    #[default]
    Process,

    /// A fixed set of values (for tests and embedding)
    Fixed(HashMap<String, String>),
}

impl EnvSource {
    fn get(&self, name: &str) -> Option<String> {
        match self {
            EnvSource::Process => std::env::var(name).ok(),
            EnvSource::Fixed(values) => values.get(name).cloned(),
        }
    }
}

/// Layered variable source
#[derive(Debug, Clone, Default)]
pub struct VariablesClient {
    overrides: HashMap<String, String>,
    env: EnvSource,
    file: HashMap<String, String>,
    defaults: HashMap<String, String>,
}

impl VariablesClient {
    /// Create a client reading the process environment only
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the environment layer
    pub fn with_env(mut self, env: EnvSource) -> Self {
        self.env = env;
        self
    }

    /// Replace the config file layer
    pub fn with_file_values(mut self, values: HashMap<String, String>) -> Self {
        self.file = values;
        self
    }

    /// Replace the defaults layer
    pub fn with_defaults(mut self, defaults: HashMap<String, String>) -> Self {
        self.defaults = defaults;
        self
    }

    /// Add an explicit value that takes precedence over every other layer
    pub fn with_override(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.insert(name.into(), value.into());
        self
    }
}

impl VariablesGetter for VariablesClient {
    fn get(&self, name: &str) -> Option<String> {
        self.overrides
            .get(name)
            .cloned()
            .or_else(|| self.env.get(name))
            .or_else(|| self.file.get(name).cloned())
            .or_else(|| self.defaults.get(name).cloned())
    }
}
