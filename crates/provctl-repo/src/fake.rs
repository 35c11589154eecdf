//! In-memory repository for testing
//!
//! Serves files registered up front and counts the calls it receives, so
//! tests can check that a fetch was or was not delegated to the repository.

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock};

use provctl_core::version;

use crate::error::{RepoError, Result};
use crate::repository::Repository;

/// In-memory repository for testing
#[derive(Clone)]
pub struct FakeRepository {
    default_version: String,
    root_path: String,
    components_path: String,
    /// Storage: (version, path) -> content
    files: Arc<RwLock<HashMap<(String, String), Vec<u8>>>>,
    versions: Arc<RwLock<BTreeSet<String>>>,
    /// Track calls for assertions
    calls: Arc<RwLock<CallCounts>>,
}

/// Counts of repository calls for testing assertions
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CallCounts {
    pub get_file: usize,
    pub get_versions: usize,
}

impl FakeRepository {
    /// Create an empty repository with default version `v1.0.0`
    pub fn new() -> Self {
        Self {
            default_version: "v1.0.0".to_string(),
            root_path: ".".to_string(),
            components_path: "components.yaml".to_string(),
            files: Arc::new(RwLock::new(HashMap::new())),
            versions: Arc::new(RwLock::new(BTreeSet::new())),
            calls: Arc::new(RwLock::new(CallCounts::default())),
        }
    }

    pub fn with_default_version(mut self, version: impl Into<String>) -> Self {
        self.default_version = version.into();
        self
    }

    pub fn with_components_path(mut self, path: impl Into<String>) -> Self {
        self.components_path = path.into();
        self
    }

    /// Register a file; its version becomes listable
    pub fn with_file(self, version: &str, path: &str, content: impl Into<Vec<u8>>) -> Self {
        self.versions.write().unwrap().insert(version.to_string());
        self.files
            .write()
            .unwrap()
            .insert((version.to_string(), path.to_string()), content.into());
        self
    }

    /// Get call counts for assertions
    pub fn call_counts(&self) -> CallCounts {
        self.calls.read().unwrap().clone()
    }

    /// Reset call counts
    pub fn reset_counts(&self) {
        *self.calls.write().unwrap() = CallCounts::default();
    }
}

impl Default for FakeRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Repository for FakeRepository {
    fn default_version(&self) -> &str {
        &self.default_version
    }

    fn root_path(&self) -> &str {
        &self.root_path
    }

    fn components_path(&self) -> &str {
        &self.components_path
    }

    async fn get_file(&self, version: &str, path: &str) -> Result<Vec<u8>> {
        self.calls.write().unwrap().get_file += 1;

        let version = if version.is_empty() || version::is_latest(version) {
            self.default_version.as_str()
        } else {
            version
        };

        let files = self.files.read().unwrap();
        files
            .get(&(version.to_string(), path.to_string()))
            .cloned()
            .ok_or_else(|| RepoError::not_found("fake", version, path))
    }

    async fn get_versions(&self) -> Result<Vec<String>> {
        self.calls.write().unwrap().get_versions += 1;

        let versions = self.versions.read().unwrap();
        Ok(version::sort_descending(versions.iter().cloned()))
    }
}
