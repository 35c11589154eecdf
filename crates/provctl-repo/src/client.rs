//! Repository client bound to a single provider

use std::path::PathBuf;
use std::sync::Arc;

use provctl_core::config::OVERRIDES_FOLDER;
use provctl_core::{ConfigClient, Provider, VariablesGetter, version};

use crate::components::ComponentsClient;
use crate::error::Result;
use crate::github::{GITHUB_TOKEN_VAR, GitHubApi};
use crate::metadata::MetadataClient;
use crate::overrides::LocalOverrides;
use crate::repository::{Repository, create_repository};
use crate::templates::TemplatesClient;

/// Access to the artifacts of one provider
///
/// The client is read-only once built and can be shared between tasks.
#[derive(Clone)]
pub struct RepositoryClient {
    provider: Provider,
    variables: Arc<dyn VariablesGetter>,
    repository: Arc<dyn Repository>,
    overrides: LocalOverrides,
}

impl RepositoryClient {
    /// Start building a client for `provider`
    pub fn builder(
        provider: Provider,
        variables: Arc<dyn VariablesGetter>,
    ) -> RepositoryClientBuilder {
        RepositoryClientBuilder::new(provider, variables)
    }

    pub fn provider(&self) -> &Provider {
        &self.provider
    }

    pub fn repository(&self) -> &Arc<dyn Repository> {
        &self.repository
    }

    pub fn variables(&self) -> &dyn VariablesGetter {
        self.variables.as_ref()
    }

    pub fn overrides(&self) -> &LocalOverrides {
        &self.overrides
    }

    /// Version used when the caller does not pick one
    pub fn default_version(&self) -> &str {
        self.repository.default_version()
    }

    /// Versions published by the provider, newest first
    pub async fn get_versions(&self) -> Result<Vec<String>> {
        self.repository.get_versions().await
    }

    pub fn components(&self) -> ComponentsClient<'_> {
        ComponentsClient::new(self)
    }

    pub fn templates(&self) -> TemplatesClient<'_> {
        TemplatesClient::new(self)
    }

    pub fn metadata(&self) -> MetadataClient<'_> {
        MetadataClient::new(self)
    }

    /// Map an empty or `latest` version to the repository default
    pub(crate) fn resolve_version<'a>(&'a self, version: &'a str) -> &'a str {
        if version.is_empty() || version::is_latest(version) {
            self.repository.default_version()
        } else {
            version
        }
    }

    /// Read a provider file, preferring a local override
    pub(crate) async fn fetch(&self, version: &str, path: &str) -> Result<Vec<u8>> {
        let label = self.provider.manifest_label();

        if let Some(content) = self.overrides.resolve(&self.provider, version, path).await? {
            tracing::info!(provider = %label, version, file = path, "using local override");
            return Ok(content);
        }

        tracing::debug!(provider = %label, version, file = path, "fetching from repository");
        self.repository.get_file(version, path).await
    }
}

/// Builder for [`RepositoryClient`]
pub struct RepositoryClientBuilder {
    provider: Provider,
    variables: Arc<dyn VariablesGetter>,
    repository: Option<Arc<dyn Repository>>,
    overrides_dir: Option<PathBuf>,
    github_api: Option<GitHubApi>,
}

impl RepositoryClientBuilder {
    pub fn new(provider: Provider, variables: Arc<dyn VariablesGetter>) -> Self {
        Self {
            provider,
            variables,
            repository: None,
            overrides_dir: None,
            github_api: None,
        }
    }

    /// Use this repository instead of the one selected from the provider URL
    pub fn repository(mut self, repository: Arc<dyn Repository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Directory holding local overrides (default: `~/.provctl/overrides`)
    pub fn overrides_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.overrides_dir = Some(dir.into());
        self
    }

    /// GitHub API settings (default: public API, token from `GITHUB_TOKEN`)
    pub fn github_api(mut self, api: GitHubApi) -> Self {
        self.github_api = Some(api);
        self
    }

    /// Build the client, selecting and initializing the repository if needed
    pub async fn build(self) -> Result<RepositoryClient> {
        let overrides_dir = match self.overrides_dir {
            Some(dir) => dir,
            None => ConfigClient::default_home()?.join(OVERRIDES_FOLDER),
        };

        let repository = match self.repository {
            Some(repository) => repository,
            None => {
                let mut api = self.github_api.unwrap_or_default();
                if !api.has_token() {
                    api = api.with_token(self.variables.get(GITHUB_TOKEN_VAR));
                }
                create_repository(&self.provider, &api).await?
            }
        };

        Ok(RepositoryClient {
            provider: self.provider,
            variables: self.variables,
            repository,
            overrides: LocalOverrides::new(overrides_dir),
        })
    }
}
