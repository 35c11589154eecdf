//! Repository contract shared by every provider backend
//!
//! A repository is resolved once from the provider URL and is read-only
//! afterwards, so a single instance can serve concurrent fetches.

use std::sync::Arc;

use async_trait::async_trait;
use provctl_core::Provider;
use url::Url;

use crate::error::{RepoError, Result};
use crate::github::{GitHubApi, GitHubRepository};
use crate::local::LocalRepository;

/// Host serving remote release artifacts
pub const GITHUB_HOST: &str = "github.com";

/// Source of the artifacts published by a provider
#[async_trait]
pub trait Repository: Send + Sync {
    /// Concrete version used when the caller does not ask for one
    fn default_version(&self) -> &str;

    /// Path inside the repository where the artifacts are stored
    fn root_path(&self) -> &str;

    /// File name of the components manifest
    fn components_path(&self) -> &str;

    /// Read a file published with `version`
    async fn get_file(&self, version: &str, path: &str) -> Result<Vec<u8>>;

    /// All the concrete versions, newest first
    async fn get_versions(&self) -> Result<Vec<String>>;
}

/// Backend implementations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryKind {
    /// GitHub release assets
    GitHub,
    /// Local filesystem tree
    Local,
}

impl RepositoryKind {
    /// Select the backend serving `url`
    pub fn detect(url: &str) -> Result<Self> {
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(url::ParseError::RelativeUrlWithoutBase) => return Ok(RepositoryKind::Local),
            Err(e) => {
                return Err(RepoError::MalformedProviderUrl {
                    url: url.to_string(),
                    reason: e.to_string(),
                });
            }
        };

        match (parsed.scheme(), parsed.host_str()) {
            ("https", Some(GITHUB_HOST)) => Ok(RepositoryKind::GitHub),
            ("file", _) => Ok(RepositoryKind::Local),
            (scheme, _) => Err(RepoError::UnsupportedScheme {
                scheme: scheme.to_string(),
                url: url.to_string(),
            }),
        }
    }
}

/// Create the repository serving `provider`
pub async fn create_repository(provider: &Provider, api: &GitHubApi) -> Result<Arc<dyn Repository>> {
    match RepositoryKind::detect(provider.url())? {
        RepositoryKind::GitHub => {
            let repo = GitHubRepository::new(provider, api.clone()).await?;
            Ok(Arc::new(repo))
        }
        RepositoryKind::Local => {
            let repo = LocalRepository::new(provider)?;
            Ok(Arc::new(repo))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_github() {
        let kind =
            RepositoryKind::detect("https://github.com/org/repo/releases/v1.0.0/components.yaml");
        assert_eq!(kind.unwrap(), RepositoryKind::GitHub);
    }

    #[test]
    fn test_detect_local() {
        for url in [
            "/abs/path/v2.0.0/components.yaml",
            "file:///abs/path/v2.0.0/components.yaml",
            "relative/path/latest/components.yaml",
        ] {
            assert_eq!(RepositoryKind::detect(url).unwrap(), RepositoryKind::Local, "{}", url);
        }
    }

    #[test]
    fn test_detect_unsupported_scheme() {
        let err = RepositoryKind::detect("http://github.com/org/repo").unwrap_err();
        assert!(matches!(err, RepoError::UnsupportedScheme { ref scheme, .. } if scheme == "http"));

        let err = RepositoryKind::detect("https://gitlab.com/org/repo").unwrap_err();
        assert!(matches!(err, RepoError::UnsupportedScheme { ref scheme, .. } if scheme == "https"));
    }

    #[test]
    fn test_detect_malformed() {
        let err = RepositoryKind::detect("https://[::1").unwrap_err();
        assert!(matches!(err, RepoError::MalformedProviderUrl { .. }));
    }
}
