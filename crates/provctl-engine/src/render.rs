//! Rendering of fetched artifacts into namespaced objects

use provctl_core::VariablesGetter;

use crate::error::{EngineError, Result};
use crate::objects::{self, Object};
use crate::processor::{SimpleProcessor, YamlProcessor};

/// Result of rendering an artifact
///
/// In variables-only mode `objects` is empty and `target_namespace` unset.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedArtifact {
    variables: Vec<String>,
    target_namespace: Option<String>,
    objects: Vec<Object>,
}

impl RenderedArtifact {
    fn variables_only(variables: Vec<String>) -> Self {
        Self {
            variables,
            target_namespace: None,
            objects: Vec::new(),
        }
    }

    /// Variables referenced by the artifact, in order of first appearance
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn target_namespace(&self) -> Option<&str> {
        self.target_namespace.as_deref()
    }

    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    pub fn into_objects(self) -> Vec<Object> {
        self.objects
    }

    pub fn is_variables_only(&self) -> bool {
        self.target_namespace.is_none()
    }

    /// Serialize the objects as a multi-document YAML stream
    pub fn yaml(&self) -> Result<Vec<u8>> {
        objects::from_objects(&self.objects)
    }
}

/// Renders raw artifacts: discover, substitute, convert, fix namespaces
pub struct Renderer<P = SimpleProcessor> {
    processor: P,
    list_variables_only: bool,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self::with_processor(SimpleProcessor::new())
    }

    /// Keep placeholders without a value instead of failing
    pub fn skip_missing(mut self, skip: bool) -> Self {
        self.processor = self.processor.skip_missing(skip);
        self
    }
}

impl<P: YamlProcessor> Renderer<P> {
    /// Render with a custom processor
    pub fn with_processor(processor: P) -> Self {
        Self {
            processor,
            list_variables_only: false,
        }
    }

    /// Stop after variable discovery
    pub fn list_variables_only(mut self, enabled: bool) -> Self {
        self.list_variables_only = enabled;
        self
    }

    pub fn processor(&self) -> &P {
        &self.processor
    }

    /// Render `raw` with values from `getter`.
    ///
    /// Without a target namespace, the name of the single Namespace object in
    /// the artifact is used; an artifact with zero or several of them fails.
    pub fn render(
        &self,
        raw: &[u8],
        getter: &dyn VariablesGetter,
        target_namespace: Option<&str>,
    ) -> Result<RenderedArtifact> {
        let variables = self.processor.get_variables(raw)?;
        if self.list_variables_only {
            tracing::debug!(count = variables.len(), "listing variables only");
            return Ok(RenderedArtifact::variables_only(variables));
        }

        let processed = self.processor.process(raw, getter)?;
        let objects = objects::to_objects(&processed)?;

        let target_namespace = match target_namespace.filter(|ns| !ns.is_empty()) {
            Some(ns) => ns.to_string(),
            None => objects::inspect_target_namespace(&objects).ok_or_else(|| {
                EngineError::NoTargetNamespace {
                    reason: "the artifact does not define exactly one Namespace object"
                        .to_string(),
                }
            })?,
        };

        let objects = objects::fix_target_namespace(objects, &target_namespace);
        tracing::debug!(
            objects = objects.len(),
            namespace = %target_namespace,
            "rendered artifact"
        );

        Ok(RenderedArtifact {
            variables,
            target_namespace: Some(target_namespace),
            objects,
        })
    }
}
