//! provctl Core - Core types for fetching and rendering provider artifacts
//!
//! This crate provides the foundational types used throughout provctl:
//! - `Provider`: A named, typed source of installable components and templates
//! - `version`: Semantic version tags and the `latest` sentinel
//! - `ConfigClient`: The configuration file and the default provider list
//! - `VariablesClient`: Layered variable source used for substitution
//! - `ClusterTemplateOptions`: Well-known variables for cluster templates

pub mod config;
pub mod error;
pub mod provider;
pub mod template_options;
pub mod variables;
pub mod version;

pub use config::{ConfigClient, ConfigFile, ProviderEntry};
pub use error::{CoreError, Result};
pub use provider::{Provider, ProviderType};
pub use template_options::ClusterTemplateOptions;
pub use variables::{EnvSource, VariablesClient, VariablesGetter};
pub use version::LATEST;
