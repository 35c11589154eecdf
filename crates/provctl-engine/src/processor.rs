//! Pluggable YAML processors
//!
//! A processor knows how a provider names its cluster templates, which
//! variables a template needs and how to fill them in. Processors are
//! stateless: every call works on the bytes it is given.

use provctl_core::VariablesGetter;

use crate::error::Result;
use crate::variables;

/// Prefix shared by every cluster template file name
pub const CLUSTER_TEMPLATE_PREFIX: &str = "cluster-template";

/// File name of a cluster template, e.g. `cluster-template-dev.yaml`
pub fn cluster_template_name(flavor: &str) -> String {
    if flavor.is_empty() {
        format!("{}.yaml", CLUSTER_TEMPLATE_PREFIX)
    } else {
        format!("{}-{}.yaml", CLUSTER_TEMPLATE_PREFIX, flavor)
    }
}

/// Trait for template processors
pub trait YamlProcessor: Send + Sync {
    /// Name of the artifact holding the template for `flavor`
    fn artifact_name(&self, version: &str, flavor: &str) -> String;

    /// Variables referenced by the template, in order of first appearance
    fn get_variables(&self, raw: &[u8]) -> Result<Vec<String>>;

    /// Produce the final YAML with every variable substituted
    fn process(&self, raw: &[u8], getter: &dyn VariablesGetter) -> Result<Vec<u8>>;
}

/// Processor for `${VAR}` / `$VAR` placeholders
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleProcessor {
    skip_missing: bool,
}

impl SimpleProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep placeholders whose value is missing instead of failing
    pub fn skip_missing(mut self, skip: bool) -> Self {
        self.skip_missing = skip;
        self
    }
}

impl YamlProcessor for SimpleProcessor {
    fn artifact_name(&self, _version: &str, flavor: &str) -> String {
        cluster_template_name(flavor)
    }

    fn get_variables(&self, raw: &[u8]) -> Result<Vec<String>> {
        let text = std::str::from_utf8(raw)?;
        Ok(variables::discover(text))
    }

    fn process(&self, raw: &[u8], getter: &dyn VariablesGetter) -> Result<Vec<u8>> {
        let text = std::str::from_utf8(raw)?;
        let names = variables::discover(text);
        let rendered = variables::substitute(text, &names, getter, self.skip_missing)?;
        Ok(rendered.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use std::collections::HashMap;

    #[test]
    fn test_artifact_name() {
        let p = SimpleProcessor::new();
        assert_eq!(p.artifact_name("v1.0.0", ""), "cluster-template.yaml");
        assert_eq!(p.artifact_name("v1.0.0", "dev"), "cluster-template-dev.yaml");
    }

    #[test]
    fn test_get_variables() {
        let p = SimpleProcessor::new();
        let vars = p.get_variables(b"a: ${B}\nc: $D\ne: ${B}\n").unwrap();
        assert_eq!(vars, vec!["B", "D"]);
    }

    #[test]
    fn test_process_missing_fails() {
        let p = SimpleProcessor::new();
        let err = p.process(b"a: ${B}\n", &HashMap::<String, String>::new()).unwrap_err();
        assert!(matches!(err, EngineError::MissingVariable { .. }));
    }

    #[test]
    fn test_process_skip_missing() {
        let p = SimpleProcessor::new().skip_missing(true);
        let out = p.process(b"a: ${B}\n", &HashMap::<String, String>::new()).unwrap();
        assert_eq!(out, b"a: ${B}\n");
    }

    #[test]
    fn test_invalid_utf8() {
        let p = SimpleProcessor::new();
        assert!(matches!(
            p.get_variables(&[0xff, 0xfe]),
            Err(EngineError::InvalidUtf8(_))
        ));
    }
}
