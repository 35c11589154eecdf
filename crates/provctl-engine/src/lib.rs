//! provctl Engine - Variable substitution and manifest rendering
//!
//! This crate turns the raw YAML published by a provider repository into
//! objects ready to be applied:
//! - Placeholder discovery and substitution (`${NAME}` and `$NAME`)
//! - Multi-document YAML to generic objects and back
//! - Target namespace enforcement for namespaced objects
//! - Variables-only preview of an artifact

pub mod error;
pub mod objects;
pub mod processor;
pub mod render;
pub mod variables;

pub use error::{EngineError, Result};
pub use objects::{
    Object, fix_target_namespace, from_objects, inspect_target_namespace, is_cluster_scoped,
    to_objects,
};
pub use processor::{SimpleProcessor, YamlProcessor, cluster_template_name};
pub use render::{RenderedArtifact, Renderer};
pub use variables::{discover, substitute};
