//! provctl Repository - Provider artifact sources
//!
//! This crate resolves where a provider publishes its artifacts and fetches them:
//! - GitHub releases (`https://github.com/{owner}/{repo}/releases/{version}/{file}`)
//! - Local directory trees (`/path/{version}/{file}` or `file://...`)
//! - Local overrides that replace any published file
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use provctl_core::ConfigClient;
//! use provctl_repo::RepositoryClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigClient::load()?;
//! let provider = config.get_provider("aws", None)?;
//!
//! let client = RepositoryClient::builder(provider, Arc::new(config.variables()))
//!     .build()
//!     .await?;
//!
//! let components = client.components().get("", "capa-system", "").await?;
//! let template = client.templates().get("v1.0.0", "dev", "default").await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod components;
pub mod error;
pub mod fake;
pub mod github;
pub mod local;
pub mod metadata;
pub mod overrides;
pub mod repository;
pub mod templates;

pub use client::{RepositoryClient, RepositoryClientBuilder};
pub use components::{Components, ComponentsClient};
pub use error::{RepoError, Result};
pub use fake::{CallCounts, FakeRepository};
pub use github::{GitHubApi, GitHubReleaseUrl, GitHubRepository};
pub use local::LocalRepository;
pub use metadata::{Metadata, MetadataClient, ReleaseSeries};
pub use overrides::LocalOverrides;
pub use repository::{Repository, RepositoryKind, create_repository};
pub use templates::{Template, TemplatesClient};
