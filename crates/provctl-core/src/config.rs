//! Configuration management
//!
//! Reads `~/.provctl/provctl.yaml` (or an explicit config file). The file holds
//! a `providers` list plus arbitrary top-level variables:
//!
//! ```yaml
//! providers:
//!   - name: my-infra
//!     url: /home/me/dev/infrastructure-my-infra/latest/infrastructure-components.yaml
//!     type: InfrastructureProvider
//! AWS_REGION: eu-west-1
//! WORKER_MACHINE_COUNT: 3
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result};
use crate::provider::{self, Provider, ProviderType};
use crate::variables::{EnvSource, VariablesClient};

/// Name of the folder holding the configuration in the user's home
pub const CONFIG_FOLDER: &str = ".provctl";

/// Name of the configuration file inside the config folder
pub const CONFIG_FILE: &str = "provctl.yaml";

/// Name of the folder holding local overrides inside the config folder
pub const OVERRIDES_FOLDER: &str = "overrides";

const PROVIDERS_KEY: &str = "providers";

const DEFAULT_PROVIDERS: &[(&str, ProviderType, &str)] = &[
    (
        "cluster-api",
        ProviderType::Core,
        "https://github.com/kubernetes-sigs/cluster-api/releases/latest/core-components.yaml",
    ),
    (
        "kubeadm",
        ProviderType::Bootstrap,
        "https://github.com/kubernetes-sigs/cluster-api/releases/latest/bootstrap-components.yaml",
    ),
    (
        "kubeadm",
        ProviderType::ControlPlane,
        "https://github.com/kubernetes-sigs/cluster-api/releases/latest/control-plane-components.yaml",
    ),
    (
        "aws",
        ProviderType::Infrastructure,
        "https://github.com/kubernetes-sigs/cluster-api-provider-aws/releases/latest/infrastructure-components.yaml",
    ),
    (
        "azure",
        ProviderType::Infrastructure,
        "https://github.com/kubernetes-sigs/cluster-api-provider-azure/releases/latest/infrastructure-components.yaml",
    ),
    (
        "metal3",
        ProviderType::Infrastructure,
        "https://github.com/metal3-io/cluster-api-provider-metal3/releases/latest/infrastructure-components.yaml",
    ),
    (
        "openstack",
        ProviderType::Infrastructure,
        "https://github.com/kubernetes-sigs/cluster-api-provider-openstack/releases/latest/infrastructure-components.yaml",
    ),
    (
        "vsphere",
        ProviderType::Infrastructure,
        "https://github.com/kubernetes-sigs/cluster-api-provider-vsphere/releases/latest/infrastructure-components.yaml",
    ),
];

/// Provider entry as written in the config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEntry {
    pub name: String,
    pub url: String,
    #[serde(rename = "type")]
    pub provider_type: ProviderType,
}

impl From<ProviderEntry> for Provider {
    fn from(entry: ProviderEntry) -> Self {
        Provider::new(entry.name, entry.url, entry.provider_type)
    }
}

/// Parsed content of the config file
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    /// User defined providers
    pub providers: Vec<ProviderEntry>,

    /// Top-level scalar values, exposed as variables
    pub variables: HashMap<String, String>,
}

impl ConfigFile {
    /// Load a config file; a missing file is an empty configuration
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse config file content
    pub fn parse(content: &str) -> Result<Self> {
        let value: serde_yaml::Value = serde_yaml::from_str(content)?;
        let mapping = match value {
            serde_yaml::Value::Null => return Ok(Self::default()),
            serde_yaml::Value::Mapping(mapping) => mapping,
            _ => {
                return Err(CoreError::InvalidConfig {
                    message: "config file must be a YAML mapping".to_string(),
                });
            }
        };

        let mut config = Self::default();
        for (key, value) in mapping {
            let Some(key) = key.as_str().map(str::to_string) else {
                continue;
            };

            if key == PROVIDERS_KEY {
                let providers: Vec<ProviderEntry> = serde_yaml::from_value(value)?;
                for entry in &providers {
                    provider::validate_name(&entry.name)?;
                }
                config.providers = providers;
                continue;
            }

            match scalar_to_string(&value) {
                Some(s) => {
                    config.variables.insert(key, s);
                }
                None => {
                    tracing::debug!(key = %key, "ignoring non-scalar config value");
                }
            }
        }

        Ok(config)
    }
}

fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Access to the provctl configuration
#[derive(Debug, Clone)]
pub struct ConfigClient {
    home: PathBuf,
    file: ConfigFile,
    env: EnvSource,
}

impl ConfigClient {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let home = Self::default_home()?;
        let file = ConfigFile::load_from(&home.join(CONFIG_FILE))?;
        Ok(Self {
            home,
            file,
            env: EnvSource::Process,
        })
    }

    /// Load configuration from an explicit file.
    ///
    /// The directory containing the file becomes the configuration home, so
    /// overrides are searched next to it. Unlike [`ConfigClient::load`], the
    /// file must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(CoreError::InvalidConfig {
                message: format!("config file {} does not exist", path.display()),
            });
        }
        let home = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let file = ConfigFile::load_from(path)?;
        Ok(Self {
            home,
            file,
            env: EnvSource::Process,
        })
    }

    /// Load from an explicit file when given, from the default location otherwise
    pub fn load_optional(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => Self::load(),
        }
    }

    /// Build a configuration from already parsed content
    pub fn from_parts(home: impl Into<PathBuf>, file: ConfigFile) -> Self {
        Self {
            home: home.into(),
            file,
            env: EnvSource::Process,
        }
    }

    /// Replace the environment used for the variables layer
    pub fn with_env(mut self, env: EnvSource) -> Self {
        self.env = env;
        self
    }

    /// Get the default configuration home
    pub fn default_home() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| CoreError::InvalidConfig {
            message: "Could not determine home directory".to_string(),
        })?;
        Ok(home.join(CONFIG_FOLDER))
    }

    /// Configuration home directory
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Directory holding local overrides
    pub fn overrides_path(&self) -> PathBuf {
        self.home.join(OVERRIDES_FOLDER)
    }

    /// Default providers merged with the user defined ones.
    ///
    /// A user entry replaces the default with the same name and type.
    pub fn providers(&self) -> Vec<Provider> {
        let mut providers: Vec<Provider> = DEFAULT_PROVIDERS
            .iter()
            .filter(|(name, provider_type, _)| {
                !self
                    .file
                    .providers
                    .iter()
                    .any(|p| p.name == *name && p.provider_type == *provider_type)
            })
            .map(|(name, provider_type, url)| Provider::new(*name, *url, *provider_type))
            .collect();

        providers.extend(self.file.providers.iter().cloned().map(Provider::from));
        providers.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        providers
    }

    /// Find a provider by name, optionally restricted to a type
    pub fn get_provider(&self, name: &str, provider_type: Option<ProviderType>) -> Result<Provider> {
        let mut matches: Vec<Provider> = self
            .providers()
            .into_iter()
            .filter(|p| p.name() == name)
            .filter(|p| provider_type.is_none_or(|t| p.provider_type() == t))
            .collect();

        if matches.len() > 1 {
            return Err(CoreError::AmbiguousProvider {
                name: name.to_string(),
                types: matches
                    .iter()
                    .map(|p| p.provider_type().short_name())
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }

        matches.pop().ok_or_else(|| CoreError::ProviderNotFound {
            name: name.to_string(),
        })
    }

    /// Variables defined by the environment and the config file
    pub fn variables(&self) -> VariablesClient {
        VariablesClient::new()
            .with_env(self.env.clone())
            .with_file_values(self.file.variables.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variables::VariablesGetter;

    #[test]
    fn test_overrides_path_from_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("provctl.yaml");
        std::fs::write(&path, "").unwrap();

        let config = ConfigClient::load_from(&path).unwrap();
        assert_eq!(config.overrides_path(), dir.path().join(OVERRIDES_FOLDER));
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ConfigClient::load_from(&dir.path().join("missing.yaml")).is_err());
    }

    #[test]
    fn test_parse_rejects_unsafe_provider_names() {
        for name in ["../..", "a/b", "Upper", "-leading", ""] {
            let content = format!(
                "providers:\n  - name: \"{}\"\n    url: /tmp/repo\n    type: CoreProvider\n",
                name
            );
            let err = ConfigFile::parse(&content).unwrap_err();
            assert!(matches!(err, CoreError::InvalidConfig { .. }), "{}", name);
        }

        let content = "providers:\n  - name: my-infra2\n    url: /tmp/repo\n    type: CoreProvider\n";
        assert_eq!(ConfigFile::parse(content).unwrap().providers[0].name, "my-infra2");
    }

    #[test]
    fn test_parse_providers_and_variables() {
        let content = r#"
providers:
  - name: custom
    url: /tmp/repo/bootstrap-custom/latest/bootstrap-components.yaml
    type: BootstrapProvider
CLUSTER_NAME: demo
WORKER_MACHINE_COUNT: 3
EXP_FEATURE: true
nested:
  ignored: yes
"#;
        let file = ConfigFile::parse(content).unwrap();
        assert_eq!(file.providers.len(), 1);
        assert_eq!(file.providers[0].provider_type, ProviderType::Bootstrap);
        assert_eq!(file.variables.get("CLUSTER_NAME").map(String::as_str), Some("demo"));
        assert_eq!(file.variables.get("WORKER_MACHINE_COUNT").map(String::as_str), Some("3"));
        assert_eq!(file.variables.get("EXP_FEATURE").map(String::as_str), Some("true"));
        assert!(!file.variables.contains_key("nested"));
    }

    #[test]
    fn test_parse_empty_and_invalid() {
        assert!(ConfigFile::parse("").unwrap().providers.is_empty());
        assert!(ConfigFile::parse("- a\n- b\n").is_err());
    }

    #[test]
    fn test_default_providers() {
        let config = ConfigClient::from_parts("/tmp/home", ConfigFile::default());
        let names: Vec<String> = config.providers().iter().map(|p| p.manifest_label()).collect();
        assert_eq!(
            names,
            vec![
                "cluster-api",
                "bootstrap-kubeadm",
                "control-plane-kubeadm",
                "infrastructure-aws",
                "infrastructure-azure",
                "infrastructure-metal3",
                "infrastructure-openstack",
                "infrastructure-vsphere",
            ]
        );
    }

    #[test]
    fn test_custom_providers_extend_and_replace_defaults() {
        let file = ConfigFile {
            providers: vec![
                ProviderEntry {
                    name: "custom".to_string(),
                    url: "url".to_string(),
                    provider_type: ProviderType::Bootstrap,
                },
                ProviderEntry {
                    name: "aws".to_string(),
                    url: "/my/fork/infrastructure-aws/v9.9.9/infrastructure-components.yaml"
                        .to_string(),
                    provider_type: ProviderType::Infrastructure,
                },
            ],
            variables: HashMap::new(),
        };
        let config = ConfigClient::from_parts("/tmp/home", file);
        let providers = config.providers();

        assert_eq!(providers.len(), 9);
        assert_eq!(providers[1].name(), "custom");
        assert_eq!(providers[1].provider_type(), ProviderType::Bootstrap);

        let aws = config.get_provider("aws", None).unwrap();
        assert!(aws.url().starts_with("/my/fork"));
    }

    #[test]
    fn test_get_provider_ambiguous() {
        let config = ConfigClient::from_parts("/tmp/home", ConfigFile::default());
        assert!(matches!(
            config.get_provider("kubeadm", None),
            Err(CoreError::AmbiguousProvider { .. })
        ));
        let cp = config
            .get_provider("kubeadm", Some(ProviderType::ControlPlane))
            .unwrap();
        assert_eq!(cp.manifest_label(), "control-plane-kubeadm");
        assert!(matches!(
            config.get_provider("nope", None),
            Err(CoreError::ProviderNotFound { .. })
        ));
    }

    #[test]
    fn test_variables_from_file_and_env() {
        let mut values = HashMap::new();
        values.insert("A".to_string(), "file".to_string());
        values.insert("B".to_string(), "file".to_string());
        let file = ConfigFile {
            providers: Vec::new(),
            variables: values,
        };

        let mut env = HashMap::new();
        env.insert("A".to_string(), "env".to_string());
        let config = ConfigClient::from_parts("/tmp/home", file).with_env(EnvSource::Fixed(env));

        let vars = config.variables();
        assert_eq!(vars.get("A").as_deref(), Some("env"));
        assert_eq!(vars.get("B").as_deref(), Some("file"));
    }
}
