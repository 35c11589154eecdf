//! CLI commands

pub mod components;
pub mod providers;
pub mod template;
pub mod versions;

use std::path::Path;
use std::sync::Arc;

use provctl_core::{ConfigClient, Provider, ProviderType, VariablesClient};
use provctl_repo::RepositoryClient;

use crate::error::{CliError, Result};

/// Parse a provider reference: `name[:version]`
pub(crate) fn parse_provider_ref(reference: &str) -> Result<(&str, &str)> {
    let (name, version) = reference.split_once(':').unwrap_or((reference, ""));

    if name.is_empty() {
        return Err(CliError::input(format!(
            "Invalid provider reference '{}': missing provider name",
            reference
        )));
    }

    Ok((name, version))
}

pub(crate) fn parse_provider_type(value: Option<&str>) -> Result<Option<ProviderType>> {
    value
        .map(|v| v.parse::<ProviderType>())
        .transpose()
        .map_err(CliError::from)
}

pub(crate) fn load_config(path: Option<&Path>) -> Result<ConfigClient> {
    let config = ConfigClient::load_optional(path)?;
    tracing::debug!(home = %config.home().display(), "configuration loaded");
    Ok(config)
}

/// Build a repository client for `provider`, reading overrides next to the config
pub(crate) async fn repository_client(
    config: &ConfigClient,
    provider: Provider,
    variables: VariablesClient,
) -> Result<RepositoryClient> {
    let client = RepositoryClient::builder(provider, Arc::new(variables))
        .overrides_dir(config.overrides_path())
        .build()
        .await?;
    Ok(client)
}
