//! Components command - print the rendered components of a provider

use std::io::Write;
use std::path::Path;

use crate::commands::{load_config, parse_provider_ref, parse_provider_type, repository_client};
use crate::error::Result;

pub async fn run(
    config: Option<&Path>,
    reference: &str,
    provider_type: Option<&str>,
    target_namespace: &str,
    watching_namespace: &str,
    skip_variables: bool,
) -> Result<()> {
    let (name, version) = parse_provider_ref(reference)?;

    let config = load_config(config)?;
    let provider = config.get_provider(name, parse_provider_type(provider_type)?)?;
    let client = repository_client(&config, provider, config.variables()).await?;

    let components = client
        .components()
        .skip_variables(skip_variables)
        .get(version, target_namespace, watching_namespace)
        .await?;

    tracing::info!(
        provider = %components.provider(),
        version = components.version(),
        target_namespace = components.target_namespace(),
        objects = components.objects().len(),
        "components rendered"
    );

    std::io::stdout().write_all(&components.yaml()?)?;
    Ok(())
}
