//! Providers command - list the configured providers

use console::style;
use std::path::Path;

use crate::commands::load_config;
use crate::error::Result;

pub fn run(config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let providers = config.providers();

    let name_width = providers
        .iter()
        .map(|p| p.name().len())
        .max()
        .unwrap_or(0)
        .max("NAME".len());
    let type_width = providers
        .iter()
        .map(|p| p.provider_type().as_str().len())
        .max()
        .unwrap_or(0)
        .max("TYPE".len());

    println!(
        "{}",
        style(format!(
            "{:<name_width$}  {:<type_width$}  URL",
            "NAME", "TYPE"
        ))
        .bold()
    );
    for provider in &providers {
        println!(
            "{:<name_width$}  {:<type_width$}  {}",
            provider.name(),
            provider.provider_type().as_str(),
            style(provider.url()).dim()
        );
    }

    Ok(())
}
