//! Provider metadata: release series and the API contract they implement

use provctl_core::version;
use serde::{Deserialize, Serialize};

use crate::client::RepositoryClient;
use crate::error::{RepoError, Result};

/// File name of the metadata artifact
pub const METADATA_FILE: &str = "metadata.yaml";

/// Content of `metadata.yaml`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub release_series: Vec<ReleaseSeries>,
}

/// A minor release line and its contract, e.g. `v0.3.x` implementing `v1alpha3`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseSeries {
    pub major: u64,
    pub minor: u64,
    pub contract: String,
}

impl Metadata {
    /// The release series `version` belongs to
    pub fn release_series_for(&self, tag: &str) -> Option<&ReleaseSeries> {
        let parsed = version::parse_tag(tag).ok()?;
        self.release_series
            .iter()
            .find(|s| s.major == parsed.major && s.minor == parsed.minor)
    }
}

/// Fetches provider metadata
pub struct MetadataClient<'a> {
    client: &'a RepositoryClient,
}

impl<'a> MetadataClient<'a> {
    pub(crate) fn new(client: &'a RepositoryClient) -> Self {
        Self { client }
    }

    /// Get the metadata published with `version` (empty means the default version)
    pub async fn get(&self, version: &str) -> Result<Metadata> {
        let version = self.client.resolve_version(version);
        let raw = self.client.fetch(version, METADATA_FILE).await?;

        serde_yaml::from_slice(&raw).map_err(|e| RepoError::InvalidMetadata {
            provider: self.client.provider().manifest_label(),
            version: version.to_string(),
            message: e.to_string(),
        })
    }
}
