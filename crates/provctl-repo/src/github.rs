//! GitHub releases repository
//!
//! Provider URLs have the shape
//! `https://github.com/{owner}/{repo}/releases/{version|latest}/{file}` and
//! artifacts are release assets fetched through the GitHub REST API.

use std::time::Duration;

use async_trait::async_trait;
use provctl_core::{Provider, version};
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{RepoError, Result};
use crate::repository::Repository;

/// Public GitHub REST API endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Variable holding an optional GitHub token
pub const GITHUB_TOKEN_VAR: &str = "GITHUB_TOKEN";

const USER_AGENT: &str = concat!("provctl/", env!("CARGO_PKG_VERSION"));
const RELEASES_PER_PAGE: u32 = 100;

/// Connection settings for the GitHub REST API
#[derive(Debug, Clone)]
pub struct GitHubApi {
    base_url: String,
    token: Option<String>,
}

impl Default for GitHubApi {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

impl GitHubApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Authenticate requests with a personal access token
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }
}

/// Components location parsed from a GitHub release URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubReleaseUrl {
    pub owner: String,
    pub repository: String,
    pub version: String,
    pub root_path: String,
    pub components_path: String,
}

impl GitHubReleaseUrl {
    pub fn parse(raw: &str) -> Result<Self> {
        let malformed = |reason: &str| RepoError::MalformedProviderUrl {
            url: raw.to_string(),
            reason: reason.to_string(),
        };

        let url = Url::parse(raw).map_err(|e| malformed(&e.to_string()))?;
        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();

        if segments.len() < 5 || segments[2] != "releases" {
            return Err(malformed(
                "expected https://github.com/{owner}/{repository}/releases/{version}/{components file}",
            ));
        }

        let (file, dirs) = segments[4..]
            .split_last()
            .ok_or_else(|| malformed("missing components file"))?;
        let root_path = if dirs.is_empty() {
            ".".to_string()
        } else {
            dirs.join("/")
        };

        Ok(Self {
            owner: segments[0].to_string(),
            repository: segments[1].to_string(),
            version: segments[3].to_string(),
            root_path,
            components_path: file.to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct Release {
    tag_name: String,
    #[serde(default)]
    draft: bool,
    #[serde(default)]
    assets: Vec<ReleaseAsset>,
}

#[derive(Debug, Deserialize)]
struct ReleaseAsset {
    name: String,
    url: String,
}

/// Repository backed by GitHub release assets
pub struct GitHubRepository {
    provider: String,
    api: GitHubApi,
    client: reqwest::Client,
    location: GitHubReleaseUrl,
    default_version: String,
}

impl GitHubRepository {
    /// Create a GitHub repository; `latest` is resolved right away
    pub async fn new(provider: &Provider, api: GitHubApi) -> Result<Self> {
        let label = provider.manifest_label();
        let location = GitHubReleaseUrl::parse(provider.url())?;

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                RepoError::remote(
                    &label,
                    &location.version,
                    &location.components_path,
                    e.to_string(),
                )
            })?;

        let mut repo = Self {
            provider: label,
            api,
            client,
            default_version: location.version.clone(),
            location,
        };

        if version::is_latest(&repo.default_version) {
            let versions = repo.list_releases().await?;
            repo.default_version = version::latest_release(versions).ok_or_else(|| {
                RepoError::NoVersionsAvailable {
                    provider: repo.provider.clone(),
                }
            })?;
        } else {
            version::parse_tag(&repo.default_version).map_err(|e| RepoError::InvalidVersion {
                provider: repo.provider.clone(),
                version: repo.default_version.clone(),
                reason: e.to_string(),
            })?;
        }

        tracing::debug!(
            provider = %repo.provider,
            owner = %repo.location.owner,
            repository = %repo.location.repository,
            version = %repo.default_version,
            "using GitHub repository"
        );

        Ok(repo)
    }

    pub fn location(&self) -> &GitHubReleaseUrl {
        &self.location
    }

    fn repo_url(&self, suffix: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.api.base_url, self.location.owner, self.location.repository, suffix
        )
    }

    fn get(&self, url: &str, accept: &'static str) -> reqwest::RequestBuilder {
        let request = self
            .client
            .get(url)
            .header(ACCEPT, HeaderValue::from_static(accept));
        match &self.api.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        version: &str,
        resource: &str,
    ) -> Result<reqwest::Response> {
        let response = request.send().await.map_err(|e| {
            let message = format!("request failed: {}", e);
            RepoError::remote(&self.provider, version, resource, message)
        })?;

        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::NOT_FOUND => Err(RepoError::not_found(&self.provider, version, resource)),
            status => Err(RepoError::remote(
                &self.provider,
                version,
                resource,
                format!("HTTP {}", status),
            )),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        version: &str,
        resource: &str,
    ) -> Result<T> {
        let response = self
            .send(self.get(url, "application/vnd.github+json"), version, resource)
            .await?;
        response.json::<T>().await.map_err(|e| {
            let message = format!("invalid response: {}", e);
            RepoError::remote(&self.provider, version, resource, message)
        })
    }

    async fn list_releases(&self) -> Result<Vec<String>> {
        let url = self.repo_url(&format!("releases?per_page={}", RELEASES_PER_PAGE));
        let releases: Vec<Release> = self.get_json(&url, version::LATEST, "releases").await?;

        Ok(releases
            .into_iter()
            .filter(|r| !r.draft)
            .map(|r| r.tag_name)
            .collect())
    }
}

#[async_trait]
impl Repository for GitHubRepository {
    fn default_version(&self) -> &str {
        &self.default_version
    }

    fn root_path(&self) -> &str {
        &self.location.root_path
    }

    fn components_path(&self) -> &str {
        &self.location.components_path
    }

    async fn get_file(&self, version: &str, path: &str) -> Result<Vec<u8>> {
        let version = if version.is_empty() || version::is_latest(version) {
            self.default_version.as_str()
        } else {
            version
        };
        version::parse_tag(version).map_err(|e| RepoError::InvalidVersion {
            provider: self.provider.clone(),
            version: version.to_string(),
            reason: e.to_string(),
        })?;

        let release_url = self.repo_url(&format!("releases/tags/{}", version));
        let release: Release = self
            .get_json(&release_url, version, &format!("release {}", version))
            .await?;

        let asset_name = path.rsplit('/').next().unwrap_or(path);
        let asset = release
            .assets
            .iter()
            .find(|a| a.name == asset_name)
            .ok_or_else(|| RepoError::not_found(&self.provider, version, path))?;

        tracing::debug!(
            provider = %self.provider,
            version = %version,
            file = %asset.name,
            "downloading release asset"
        );

        let response = self
            .send(self.get(&asset.url, "application/octet-stream"), version, path)
            .await?;
        let bytes = response.bytes().await.map_err(|e| {
            let message = format!("download failed: {}", e);
            RepoError::remote(&self.provider, version, path, message)
        })?;

        Ok(bytes.to_vec())
    }

    async fn get_versions(&self) -> Result<Vec<String>> {
        let releases = self.list_releases().await?;
        Ok(version::sort_descending(releases))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use provctl_core::ProviderType;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const URL_V1: &str = "https://github.com/org/repo/releases/v1.0.0/components.yaml";
    const URL_LATEST: &str = "https://github.com/org/repo/releases/latest/components.yaml";

    fn provider(url: &str) -> Provider {
        Provider::new("foo", url, ProviderType::Bootstrap)
    }

    async fn mock_releases(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/repos/org/repo/releases"))
            .and(query_param("per_page", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "tag_name": "v1.0.0", "draft": false, "assets": [] },
                { "tag_name": "v2.0.0", "draft": false, "assets": [] },
                { "tag_name": "v2.1.0-beta.0", "draft": false, "assets": [] },
                { "tag_name": "v3.0.0", "draft": true, "assets": [] },
                { "tag_name": "nightly", "draft": false, "assets": [] }
            ])))
            .mount(server)
            .await;
    }

    async fn mock_release_v1(server: &MockServer) {
        let asset_url = format!("{}/repos/org/repo/releases/assets/1", server.uri());
        Mock::given(method("GET"))
            .and(path("/repos/org/repo/releases/tags/v1.0.0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "tag_name": "v1.0.0",
                "draft": false,
                "assets": [{ "name": "components.yaml", "url": asset_url }]
            })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/org/repo/releases/assets/1"))
            .and(header("accept", "application/octet-stream"))
            .respond_with(ResponseTemplate::new(200).set_body_string("kind: Deployment\n"))
            .mount(server)
            .await;
    }

    #[test]
    fn test_parse_release_url() {
        let location = GitHubReleaseUrl::parse(URL_V1).unwrap();
        assert_eq!(location.owner, "org");
        assert_eq!(location.repository, "repo");
        assert_eq!(location.version, "v1.0.0");
        assert_eq!(location.root_path, ".");
        assert_eq!(location.components_path, "components.yaml");
    }

    #[test]
    fn test_parse_release_url_with_sub_path() {
        let location =
            GitHubReleaseUrl::parse("https://github.com/org/repo/releases/v1.0.0/dir/file.yaml")
                .unwrap();
        assert_eq!(location.root_path, "dir");
        assert_eq!(location.components_path, "file.yaml");
    }

    #[test]
    fn test_parse_malformed_release_url() {
        for url in [
            "https://github.com/org/repo",
            "https://github.com/org/repo/releases/v1.0.0",
            "https://github.com/org/repo/tags/v1.0.0/components.yaml",
        ] {
            let err = GitHubReleaseUrl::parse(url).unwrap_err();
            assert!(matches!(err, RepoError::MalformedProviderUrl { .. }), "{}", url);
        }
    }

    #[tokio::test]
    async fn test_concrete_version_does_not_hit_the_network() {
        // Nothing listens on this address
        let api = GitHubApi::new("http://127.0.0.1:9");
        let repo = GitHubRepository::new(&provider(URL_V1), api).await.unwrap();
        assert_eq!(repo.default_version(), "v1.0.0");
    }

    #[tokio::test]
    async fn test_latest_resolves_to_newest_release() {
        let server = MockServer::start().await;
        mock_releases(&server).await;

        let repo = GitHubRepository::new(&provider(URL_LATEST), GitHubApi::new(server.uri()))
            .await
            .unwrap();
        assert_eq!(repo.default_version(), "v2.0.0");
    }

    #[tokio::test]
    async fn test_get_versions_skips_drafts_and_invalid_tags() {
        let server = MockServer::start().await;
        mock_releases(&server).await;

        let repo = GitHubRepository::new(&provider(URL_V1), GitHubApi::new(server.uri()))
            .await
            .unwrap();
        let versions = repo.get_versions().await.unwrap();
        assert_eq!(versions, vec!["v2.1.0-beta.0", "v2.0.0", "v1.0.0"]);
    }

    #[tokio::test]
    async fn test_get_file_downloads_asset() {
        let server = MockServer::start().await;
        mock_release_v1(&server).await;

        let repo = GitHubRepository::new(&provider(URL_V1), GitHubApi::new(server.uri()))
            .await
            .unwrap();
        let content = repo.get_file("v1.0.0", "components.yaml").await.unwrap();
        assert_eq!(content, b"kind: Deployment\n");
    }

    #[tokio::test]
    async fn test_get_file_missing_asset() {
        let server = MockServer::start().await;
        mock_release_v1(&server).await;

        let repo = GitHubRepository::new(&provider(URL_V1), GitHubApi::new(server.uri()))
            .await
            .unwrap();
        let err = repo.get_file("v1.0.0", "metadata.yaml").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_get_file_missing_release() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/org/repo/releases/tags/v9.0.0"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let repo = GitHubRepository::new(&provider(URL_V1), GitHubApi::new(server.uri()))
            .await
            .unwrap();
        let err = repo.get_file("v9.0.0", "components.yaml").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_server_error_is_remote() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/org/repo/releases"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = GitHubRepository::new(&provider(URL_LATEST), GitHubApi::new(server.uri()))
            .await
            .err()
            .unwrap();
        match err {
            RepoError::Remote {
                provider,
                version,
                path,
                message,
            } => {
                assert_eq!(provider, "bootstrap-foo");
                assert_eq!(version, "latest");
                assert_eq!(path, "releases");
                assert!(message.contains("500"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_asset_download_error_names_version_and_file() {
        let server = MockServer::start().await;
        let asset_url = format!("{}/repos/org/repo/releases/assets/1", server.uri());
        Mock::given(method("GET"))
            .and(path("/repos/org/repo/releases/tags/v1.0.0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "tag_name": "v1.0.0",
                "draft": false,
                "assets": [{ "name": "components.yaml", "url": asset_url }]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/org/repo/releases/assets/1"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let repo = GitHubRepository::new(&provider(URL_V1), GitHubApi::new(server.uri()))
            .await
            .unwrap();
        let err = repo.get_file("v1.0.0", "components.yaml").await.unwrap_err();

        assert!(matches!(
            &err,
            RepoError::Remote { version, path, .. }
                if version == "v1.0.0" && path == "components.yaml"
        ));
        assert!(err.to_string().contains("v1.0.0"));
    }

    #[tokio::test]
    async fn test_token_is_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/org/repo/releases"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "tag_name": "v0.1.0" }
            ])))
            .mount(&server)
            .await;

        let api = GitHubApi::new(server.uri()).with_token(Some("secret".to_string()));
        let repo = GitHubRepository::new(&provider(URL_LATEST), api).await.unwrap();
        assert_eq!(repo.default_version(), "v0.1.0");
    }

    #[tokio::test]
    async fn test_invalid_version() {
        let api = GitHubApi::new("http://127.0.0.1:9");
        let repo = GitHubRepository::new(&provider(URL_V1), api).await.unwrap();
        let err = repo.get_file("not-semver", "components.yaml").await.unwrap_err();
        assert!(matches!(err, RepoError::InvalidVersion { .. }));
    }
}
