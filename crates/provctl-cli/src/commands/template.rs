//! Template command - print a rendered cluster template or its variables

use console::style;
use provctl_core::{ClusterTemplateOptions, ProviderType};
use std::io::Write;
use std::path::Path;

use crate::commands::{load_config, parse_provider_ref, repository_client};
use crate::error::Result;

pub async fn run(
    config: Option<&Path>,
    reference: &str,
    flavor: &str,
    options: &ClusterTemplateOptions,
    list_variables: bool,
) -> Result<()> {
    let (name, version) = parse_provider_ref(reference)?;

    let config = load_config(config)?;
    let provider = config.get_provider(name, Some(ProviderType::Infrastructure))?;
    let variables = options.apply(config.variables())?;
    let client = repository_client(&config, provider, variables).await?;

    let template = client
        .templates()
        .list_variables_only(list_variables)
        .get(version, flavor, &options.target_namespace)
        .await?;

    if list_variables {
        println!("{}", style("Variables:").bold());
        for variable in template.variables() {
            println!("  - {}", variable);
        }
        return Ok(());
    }

    std::io::stdout().write_all(&template.yaml()?)?;
    Ok(())
}
