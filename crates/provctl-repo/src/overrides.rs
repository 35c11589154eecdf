//! Local overrides for provider artifacts
//!
//! A file at `<overrides>/<provider label>/<version>/<path>` replaces the
//! artifact the repository would have served. This is meant for provider
//! development and for working around broken upstream releases.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use provctl_core::{Provider, version};

use crate::error::{RepoError, Result};

/// Resolver for override files under a root directory
#[derive(Debug, Clone)]
pub struct LocalOverrides {
    root: PathBuf,
}

impl LocalOverrides {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of the override for a provider file.
    ///
    /// `version` must be a concrete version tag and `path` a relative path
    /// without `.` or `..` segments; the result always stays below the root.
    pub fn path(&self, provider: &Provider, version: &str, path: &str) -> Result<PathBuf> {
        let label = provider.manifest_label();

        version::parse_tag(version).map_err(|e| RepoError::InvalidVersion {
            provider: label.clone(),
            version: version.to_string(),
            reason: e.to_string(),
        })?;

        if !is_plain_relative(Path::new(&label)) {
            return Err(RepoError::InvalidArguments {
                message: format!("provider label '{}' is not a valid directory name", label),
            });
        }
        if !is_plain_relative(Path::new(path)) {
            return Err(RepoError::InvalidArguments {
                message: format!("override path '{}' must be relative to the version folder", path),
            });
        }

        Ok(self.root.join(label).join(version).join(path))
    }

    /// Read the override, `None` when there is none.
    ///
    /// Errors other than a missing file are returned, so an unreadable
    /// override never falls back to the repository silently.
    pub async fn resolve(
        &self,
        provider: &Provider,
        version: &str,
        path: &str,
    ) -> Result<Option<Vec<u8>>> {
        let file = self.path(provider, version, path)?;

        match tokio::fs::read(&file).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(RepoError::Override { path: file, source }),
        }
    }
}

fn is_plain_relative(path: &Path) -> bool {
    let mut components = path.components().peekable();
    components.peek().is_some() && components.all(|c| matches!(c, Component::Normal(_)))
}
