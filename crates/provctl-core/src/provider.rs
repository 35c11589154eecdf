//! Provider identity

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, Result};

pub(crate) static DNS1123_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$").expect("valid regex"));

/// Check that `name` is usable as a provider name: a DNS-1123 label, which
/// keeps the manifest label a single path segment
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > 63 || !DNS1123_LABEL.is_match(name) {
        return Err(CoreError::InvalidConfig {
            message: format!(
                "invalid provider name '{}': must consist of lower case alphanumeric characters or '-', and must start and end with an alphanumeric character",
                name
            ),
        });
    }
    Ok(())
}

/// Kind of provider, which determines its role in a management cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProviderType {
    #[serde(rename = "CoreProvider", alias = "core")]
    Core,

    #[serde(rename = "BootstrapProvider", alias = "bootstrap")]
    Bootstrap,

    #[serde(rename = "ControlPlaneProvider", alias = "control-plane")]
    ControlPlane,

    #[serde(rename = "InfrastructureProvider", alias = "infrastructure")]
    Infrastructure,
}

impl ProviderType {
    /// All provider types, in installation order
    pub const ALL: [ProviderType; 4] = [
        ProviderType::Core,
        ProviderType::Bootstrap,
        ProviderType::ControlPlane,
        ProviderType::Infrastructure,
    ];

    /// Canonical type name as used in configuration files
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderType::Core => "CoreProvider",
            ProviderType::Bootstrap => "BootstrapProvider",
            ProviderType::ControlPlane => "ControlPlaneProvider",
            ProviderType::Infrastructure => "InfrastructureProvider",
        }
    }

    /// Short name, used as prefix of the manifest label and of components file names
    pub fn short_name(&self) -> &'static str {
        match self {
            ProviderType::Core => "core",
            ProviderType::Bootstrap => "bootstrap",
            ProviderType::ControlPlane => "control-plane",
            ProviderType::Infrastructure => "infrastructure",
        }
    }
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        ProviderType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s) || t.short_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| CoreError::InvalidProviderType {
                value: s.to_string(),
            })
    }
}

/// A named, typed source of installable components and cluster templates
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Provider {
    name: String,
    url: String,
    #[serde(rename = "type")]
    provider_type: ProviderType,
}

impl Provider {
    pub fn new(name: impl Into<String>, url: impl Into<String>, provider_type: ProviderType) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            provider_type,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn provider_type(&self) -> ProviderType {
        self.provider_type
    }

    /// Filesystem-safe label identifying this provider.
    ///
    /// The core provider is labelled by its bare name (e.g. `cluster-api`); the
    /// other types get their short type name as prefix (e.g. `bootstrap-kubeadm`).
    /// The same label is used for local overrides and local repositories.
    pub fn manifest_label(&self) -> String {
        match self.provider_type {
            ProviderType::Core => self.name.clone(),
            other => format!("{}-{}", other.short_name(), self.name),
        }
    }

    /// Ordering used when listing providers: by type, then by name
    pub fn sort_key(&self) -> (ProviderType, &str) {
        (self.provider_type, self.name.as_str())
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.manifest_label())
    }
}
