//! Provider components: the manifest installing a provider

use provctl_core::Provider;
use provctl_engine::{EngineError, Object, RenderedArtifact, Renderer};

use crate::client::RepositoryClient;
use crate::error::{RepoError, Result};

/// Rendered components of a provider version
#[derive(Debug, Clone)]
pub struct Components {
    provider: Provider,
    version: String,
    watching_namespace: String,
    artifact: RenderedArtifact,
}

impl Components {
    pub fn provider(&self) -> &Provider {
        &self.provider
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn target_namespace(&self) -> &str {
        self.artifact.target_namespace().unwrap_or_default()
    }

    /// Namespace the provider controllers watch, empty for all namespaces
    pub fn watching_namespace(&self) -> &str {
        &self.watching_namespace
    }

    pub fn variables(&self) -> &[String] {
        self.artifact.variables()
    }

    pub fn objects(&self) -> &[Object] {
        self.artifact.objects()
    }

    pub fn artifact(&self) -> &RenderedArtifact {
        &self.artifact
    }

    /// The components as a multi-document YAML stream
    pub fn yaml(&self) -> Result<Vec<u8>> {
        self.artifact.yaml().map_err(|source| RepoError::Render {
            provider: self.provider.manifest_label(),
            version: self.version.clone(),
            path: "components".to_string(),
            source,
        })
    }
}

/// Fetches and renders provider components
pub struct ComponentsClient<'a> {
    client: &'a RepositoryClient,
    skip_variables: bool,
}

impl<'a> ComponentsClient<'a> {
    pub(crate) fn new(client: &'a RepositoryClient) -> Self {
        Self {
            client,
            skip_variables: false,
        }
    }

    /// Keep placeholders without a value instead of failing
    pub fn skip_variables(mut self, skip: bool) -> Self {
        self.skip_variables = skip;
        self
    }

    /// Get the components for `version` (empty means the default version).
    ///
    /// An empty `target_namespace` falls back to the only Namespace object
    /// defined by the manifest.
    pub async fn get(
        &self,
        version: &str,
        target_namespace: &str,
        watching_namespace: &str,
    ) -> Result<Components> {
        let provider = self.client.provider();
        let version = self.client.resolve_version(version);
        let path = self.client.repository().components_path();

        let raw = self.client.fetch(version, path).await?;

        let renderer = Renderer::new().skip_missing(self.skip_variables);
        let target = Some(target_namespace).filter(|ns| !ns.is_empty());
        let artifact = renderer
            .render(&raw, self.client.variables(), target)
            .map_err(|source| match source {
                EngineError::NoTargetNamespace { reason } => RepoError::InvalidArguments {
                    message: format!(
                        "target namespace for {} can't be defaulted, please provide one: {}",
                        provider.manifest_label(),
                        reason
                    ),
                },
                source => RepoError::Render {
                    provider: provider.manifest_label(),
                    version: version.to_string(),
                    path: path.to_string(),
                    source,
                },
            })?;

        Ok(Components {
            provider: provider.clone(),
            version: version.to_string(),
            watching_namespace: watching_namespace.to_string(),
            artifact,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeRepository;
    use provctl_core::ProviderType;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tempfile::TempDir;

    const COMPONENTS: &str = r#"apiVersion: v1
kind: Namespace
metadata:
  name: capi-system
---
apiVersion: apps/v1
kind: Deployment
metadata:
  name: controller-manager
  namespace: capi-system
spec:
  template:
    spec:
      containers:
      - name: manager
        image: ${IMAGE}
"#;

    async fn client(
        tmp: &TempDir,
        fake: FakeRepository,
        vars: &[(&str, &str)],
    ) -> RepositoryClient {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RepositoryClient::builder(
            Provider::new("cluster-api", "https://example.com", ProviderType::Core),
            Arc::new(vars),
        )
        .repository(Arc::new(fake))
        .overrides_dir(tmp.path())
        .build()
        .await
        .unwrap()
    }

    fn repo() -> FakeRepository {
        FakeRepository::new()
            .with_file("v1.0.0", "components.yaml", COMPONENTS)
            .with_file("v1.1.0", "components.yaml", COMPONENTS)
    }

    #[tokio::test]
    async fn test_get_with_target_namespace() {
        let tmp = TempDir::new().unwrap();
        let client = client(&tmp, repo(), &[("IMAGE", "manager:v1")]).await;

        let components = client.components().get("v1.1.0", "custom-ns", "").await.unwrap();

        assert_eq!(components.version(), "v1.1.0");
        assert_eq!(components.target_namespace(), "custom-ns");
        assert_eq!(components.variables(), &["IMAGE"]);
        assert_eq!(components.objects()[1].namespace(), Some("custom-ns"));
        assert_eq!(components.objects()[0].namespace(), None);
    }

    #[tokio::test]
    async fn test_get_defaults_version_and_namespace() {
        let tmp = TempDir::new().unwrap();
        let client = client(&tmp, repo(), &[("IMAGE", "manager:v1")]).await;

        let components = client.components().get("", "", "watched").await.unwrap();

        assert_eq!(components.version(), "v1.0.0");
        assert_eq!(components.target_namespace(), "capi-system");
        assert_eq!(components.watching_namespace(), "watched");
    }

    #[tokio::test]
    async fn test_get_without_namespace_object_needs_target() {
        let tmp = TempDir::new().unwrap();
        let fake = FakeRepository::new().with_file(
            "v1.0.0",
            "components.yaml",
            "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: cfg\n",
        );
        let client = client(&tmp, fake, &[]).await;

        let err = client.components().get("v1.0.0", "", "").await.unwrap_err();
        assert!(matches!(err, RepoError::InvalidArguments { .. }));
    }

    #[tokio::test]
    async fn test_get_reads_repository_components_path() {
        let tmp = TempDir::new().unwrap();
        let fake = FakeRepository::new()
            .with_components_path("core-components.yaml")
            .with_file("v1.0.0", "core-components.yaml", COMPONENTS);
        let client = client(&tmp, fake, &[("IMAGE", "manager:v1")]).await;

        let components = client.components().get("v1.0.0", "ns", "").await.unwrap();
        assert_eq!(components.objects().len(), 2);
    }

    #[tokio::test]
    async fn test_get_missing_variable() {
        let tmp = TempDir::new().unwrap();
        let client = client(&tmp, repo(), &[]).await;

        let err = client.components().get("v1.0.0", "ns", "").await.unwrap_err();
        match err {
            RepoError::Render { source, path, .. } => {
                assert_eq!(path, "components.yaml");
                assert_eq!(source.missing_variables(), Some(&["IMAGE".to_string()][..]));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_skip_variables() {
        let tmp = TempDir::new().unwrap();
        let client = client(&tmp, repo(), &[]).await;

        let components = client
            .components()
            .skip_variables(true)
            .get("v1.0.0", "ns", "")
            .await
            .unwrap();
        let yaml = String::from_utf8(components.yaml().unwrap()).unwrap();
        assert!(yaml.contains("${IMAGE}"));
    }

    #[tokio::test]
    async fn test_override_replaces_repository_content() {
        let tmp = TempDir::new().unwrap();
        let fake = repo();
        let counts = fake.clone();
        let client = client(&tmp, fake, &[]).await;

        let file = client
            .overrides()
            .path(client.provider(), "v1.0.0", "components.yaml")
            .unwrap();
        std::fs::create_dir_all(file.parent().unwrap()).unwrap();
        std::fs::write(&file, "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: patched\n")
            .unwrap();

        let components = client.components().get("v1.0.0", "ns", "").await.unwrap();

        assert_eq!(components.objects().len(), 1);
        assert_eq!(components.objects()[0].name(), Some("patched"));
        assert_eq!(counts.call_counts().get_file, 0);
    }
}
