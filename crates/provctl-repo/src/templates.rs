//! Cluster templates published by infrastructure providers

use provctl_engine::{Renderer, YamlProcessor};

use crate::client::RepositoryClient;
use crate::error::{RepoError, Result};

pub use provctl_engine::RenderedArtifact as Template;

/// Fetches and renders cluster templates
pub struct TemplatesClient<'a> {
    client: &'a RepositoryClient,
    list_variables_only: bool,
}

impl<'a> TemplatesClient<'a> {
    pub(crate) fn new(client: &'a RepositoryClient) -> Self {
        Self {
            client,
            list_variables_only: false,
        }
    }

    /// Only discover the variables of the template
    pub fn list_variables_only(mut self, enabled: bool) -> Self {
        self.list_variables_only = enabled;
        self
    }

    /// Get the template for `flavor` (empty for the default template).
    ///
    /// Templates are named `cluster-template[-<flavor>].yaml`. Unlike
    /// components, templates never guess their target namespace.
    pub async fn get(
        &self,
        version: &str,
        flavor: &str,
        target_namespace: &str,
    ) -> Result<Template> {
        if target_namespace.is_empty() {
            return Err(RepoError::InvalidArguments {
                message: "please provide a target namespace".to_string(),
            });
        }

        let provider = self.client.provider();
        let version = self.client.resolve_version(version);
        let renderer = Renderer::new().list_variables_only(self.list_variables_only);
        let name = renderer.processor().artifact_name(version, flavor);

        let raw = self.client.fetch(version, &name).await?;

        renderer
            .render(&raw, self.client.variables(), Some(target_namespace))
            .map_err(|source| RepoError::Render {
                provider: provider.manifest_label(),
                version: version.to_string(),
                path: name.clone(),
                source,
            })
    }
}
