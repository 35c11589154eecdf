//! Versions command - list the versions published by a provider

use provctl_core::VariablesGetter;
use provctl_repo::github::GITHUB_TOKEN_VAR;
use std::path::Path;

use crate::commands::{load_config, parse_provider_type, repository_client};
use crate::error::Result;

pub async fn run(config: Option<&Path>, name: &str, provider_type: Option<&str>) -> Result<()> {
    let config = load_config(config)?;
    let provider = config.get_provider(name, parse_provider_type(provider_type)?)?;
    let variables = config.variables();

    if variables.get(GITHUB_TOKEN_VAR).is_none() {
        tracing::debug!("GITHUB_TOKEN is not set, GitHub API calls are unauthenticated");
    }

    let client = repository_client(&config, provider, variables).await?;
    let versions = client.get_versions().await?;

    for version in versions {
        if version == client.default_version() {
            println!("{} (default)", version);
        } else {
            println!("{}", version);
        }
    }

    Ok(())
}
