//! Local filesystem repository
//!
//! Two layouts are accepted for the provider URL, with or without `file://`:
//! - `<root>/<version|latest>/<components file>`
//! - `<root>`, an existing directory holding one sub-directory per version
//!   and a `components.yaml` in each of them

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use provctl_core::{Provider, version};
use url::Url;
use walkdir::WalkDir;

use crate::error::{RepoError, Result};
use crate::repository::Repository;

/// Components file name used with the bare `<root>` layout
pub const DEFAULT_COMPONENTS_FILE: &str = "components.yaml";

/// Repository backed by a directory tree
#[derive(Debug, Clone)]
pub struct LocalRepository {
    provider: String,
    base_path: PathBuf,
    components_path: String,
    default_version: String,
}

impl LocalRepository {
    /// Create a local repository from the provider URL
    pub fn new(provider: &Provider) -> Result<Self> {
        let label = provider.manifest_label();
        let path = url_to_path(provider.url())?;

        let (base_path, version_token, components_path) = if path.is_dir() {
            (path, version::LATEST.to_string(), DEFAULT_COMPONENTS_FILE.to_string())
        } else {
            split_version_file(provider.url(), &path)?
        };

        let default_version = if version::is_latest(&version_token) {
            let versions = list_versions(&label, &base_path)?;
            version::latest_release(versions)
                .ok_or_else(|| RepoError::NoVersionsAvailable { provider: label.clone() })?
        } else {
            check_version(&label, &version_token)?;
            version_token
        };

        tracing::debug!(
            provider = %label,
            path = %base_path.display(),
            version = %default_version,
            "using local repository"
        );

        Ok(Self {
            provider: label,
            base_path,
            components_path,
            default_version,
        })
    }

    /// Directory holding one sub-directory per version
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn resolve_version<'a>(&'a self, version: &'a str) -> Result<&'a str> {
        if version::is_latest(version) || version.is_empty() {
            return Ok(&self.default_version);
        }
        check_version(&self.provider, version)?;
        Ok(version)
    }
}

#[async_trait]
impl Repository for LocalRepository {
    fn default_version(&self) -> &str {
        &self.default_version
    }

    fn root_path(&self) -> &str {
        "."
    }

    fn components_path(&self) -> &str {
        &self.components_path
    }

    async fn get_file(&self, version: &str, path: &str) -> Result<Vec<u8>> {
        let version = self.resolve_version(version)?;
        let file = self.base_path.join(version).join(path);

        tracing::debug!(provider = %self.provider, file = %file.display(), "reading local file");

        match tokio::fs::read(&file).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(RepoError::not_found(&self.provider, version, path))
            }
            Err(e) => Err(RepoError::Io(e)),
        }
    }

    async fn get_versions(&self) -> Result<Vec<String>> {
        let versions = list_versions(&self.provider, &self.base_path)?;
        Ok(version::sort_descending(versions))
    }
}

fn url_to_path(raw: &str) -> Result<PathBuf> {
    match Url::parse(raw) {
        Ok(url) if url.scheme() == "file" => {
            url.to_file_path()
                .map_err(|()| RepoError::MalformedProviderUrl {
                    url: raw.to_string(),
                    reason: "not a valid local file path".to_string(),
                })
        }
        Ok(url) => Err(RepoError::UnsupportedScheme {
            scheme: url.scheme().to_string(),
            url: raw.to_string(),
        }),
        Err(_) => Ok(PathBuf::from(raw)),
    }
}

fn split_version_file(raw: &str, path: &Path) -> Result<(PathBuf, String, String)> {
    let malformed = |reason: &str| RepoError::MalformedProviderUrl {
        url: raw.to_string(),
        reason: reason.to_string(),
    };

    let file = path
        .file_name()
        .and_then(|f| f.to_str())
        .ok_or_else(|| malformed("missing components file name"))?;
    let version_dir = path
        .parent()
        .ok_or_else(|| malformed("expected <root>/<version>/<file>"))?;
    let version = version_dir
        .file_name()
        .and_then(|v| v.to_str())
        .ok_or_else(|| malformed("expected <root>/<version>/<file>"))?;
    let base = version_dir
        .parent()
        .ok_or_else(|| malformed("expected <root>/<version>/<file>"))?;

    Ok((base.to_path_buf(), version.to_string(), file.to_string()))
}

fn check_version(provider: &str, tag: &str) -> Result<()> {
    version::parse_tag(tag).map(|_| ()).map_err(|e| RepoError::InvalidVersion {
        provider: provider.to_string(),
        version: tag.to_string(),
        reason: e.to_string(),
    })
}

fn list_versions(provider: &str, base: &Path) -> Result<Vec<String>> {
    let mut versions = Vec::new();

    for entry in WalkDir::new(base).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| {
            let kind = e.io_error().map(|io| io.kind());
            match kind {
                Some(ErrorKind::NotFound) => {
                    RepoError::not_found(provider, version::LATEST, base.display().to_string())
                }
                _ => RepoError::Io(e.into()),
            }
        })?;

        if !entry.file_type().is_dir() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if version::parse_tag(name).is_ok() {
                versions.push(name.to_string());
            }
        }
    }

    Ok(versions)
}
