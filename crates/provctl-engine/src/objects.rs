//! Generic Kubernetes objects parsed from multi-document YAML
//!
//! Objects keep their keys in source order so that rendering an artifact
//! changes nothing but the substituted values and the namespace fix-up.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::error::{EngineError, Result};

/// Kinds that are not namespaced in a stock cluster
const CLUSTER_SCOPED_KINDS: &[&str] = &[
    "APIService",
    "ClusterIssuer",
    "CSIDriver",
    "CSINode",
    "CertificateSigningRequest",
    "ClusterRole",
    "ClusterRoleBinding",
    "ComponentStatus",
    "CustomResourceDefinition",
    "FlowSchema",
    "IngressClass",
    "MutatingWebhookConfiguration",
    "Namespace",
    "Node",
    "PersistentVolume",
    "PodSecurityPolicy",
    "PriorityClass",
    "PriorityLevelConfiguration",
    "RuntimeClass",
    "StorageClass",
    "ValidatingAdmissionPolicy",
    "ValidatingAdmissionPolicyBinding",
    "ValidatingWebhookConfiguration",
    "VolumeAttachment",
];

/// Whether objects of `kind` are cluster-scoped
pub fn is_cluster_scoped(kind: &str) -> bool {
    CLUSTER_SCOPED_KINDS.contains(&kind)
}

/// A single Kubernetes object with arbitrary content
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Object(Mapping);

impl Object {
    /// Top-level field lookup
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn api_version(&self) -> Option<&str> {
        self.get("apiVersion").and_then(Value::as_str)
    }

    pub fn kind(&self) -> Option<&str> {
        self.get("kind").and_then(Value::as_str)
    }

    /// API group, empty for the core group
    pub fn group(&self) -> &str {
        match self.api_version().and_then(|v| v.rsplit_once('/')) {
            Some((group, _)) => group,
            None => "",
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.metadata()
            .and_then(|m| m.get("name"))
            .and_then(Value::as_str)
    }

    pub fn namespace(&self) -> Option<&str> {
        self.metadata()
            .and_then(|m| m.get("namespace"))
            .and_then(Value::as_str)
    }

    /// Set `metadata.namespace`, creating `metadata` when needed
    pub fn set_namespace(&mut self, namespace: &str) {
        let metadata = self
            .0
            .entry(Value::from("metadata"))
            .or_insert_with(|| Value::Mapping(Mapping::new()));

        if !metadata.is_mapping() {
            *metadata = Value::Mapping(Mapping::new());
        }
        if let Value::Mapping(metadata) = metadata {
            metadata.insert(Value::from("namespace"), Value::from(namespace));
        }
    }

    fn metadata(&self) -> Option<&Mapping> {
        self.get("metadata").and_then(Value::as_mapping)
    }

    fn path(&self, keys: &[&str]) -> Option<&Value> {
        let (first, rest) = keys.split_first()?;
        rest.iter()
            .try_fold(self.get(first)?, |value, key| value.get(*key))
    }
}

/// Parse a multi-document YAML stream into objects.
///
/// Empty documents, comment-only documents and explicit nulls are skipped.
/// Any other non-mapping document is rejected.
pub fn to_objects(raw: &[u8]) -> Result<Vec<Object>> {
    let mut objects = Vec::new();

    for (index, document) in serde_yaml::Deserializer::from_slice(raw).enumerate() {
        let value = Value::deserialize(document).map_err(|e| EngineError::Conversion {
            document: index,
            message: e.to_string(),
        })?;

        match value {
            Value::Null => continue,
            Value::Mapping(mapping) => objects.push(Object(mapping)),
            other => {
                return Err(EngineError::Conversion {
                    document: index,
                    message: format!("expected a mapping, found {}", value_type(&other)),
                });
            }
        }
    }

    Ok(objects)
}

/// Serialize objects back into a multi-document YAML stream
pub fn from_objects(objects: &[Object]) -> Result<Vec<u8>> {
    let documents = objects
        .iter()
        .map(serde_yaml::to_string)
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(documents.join("---\n").into_bytes())
}

/// Force `namespace` on every namespaced object.
///
/// Objects without a kind are left alone, as are cluster-scoped kinds. Kinds
/// declared cluster-scoped by a CustomResourceDefinition in the same list are
/// treated as cluster-scoped as well.
pub fn fix_target_namespace(objects: Vec<Object>, namespace: &str) -> Vec<Object> {
    let declared = declared_cluster_scoped(&objects);

    objects
        .into_iter()
        .map(|mut object| {
            let namespaced = match object.kind() {
                Some(kind) => {
                    !is_cluster_scoped(kind)
                        && !declared.contains(&(object.group().to_string(), kind.to_string()))
                }
                None => false,
            };
            if namespaced {
                object.set_namespace(namespace);
            }
            object
        })
        .collect()
}

/// Name of the only Namespace object in the list, if there is exactly one
pub fn inspect_target_namespace(objects: &[Object]) -> Option<String> {
    let mut namespaces = objects
        .iter()
        .filter(|o| o.kind() == Some("Namespace"))
        .filter_map(Object::name);

    match (namespaces.next(), namespaces.next()) {
        (Some(name), None) => Some(name.to_string()),
        _ => None,
    }
}

fn declared_cluster_scoped(objects: &[Object]) -> HashSet<(String, String)> {
    objects
        .iter()
        .filter(|o| o.kind() == Some("CustomResourceDefinition"))
        .filter(|o| o.path(&["spec", "scope"]).and_then(Value::as_str) == Some("Cluster"))
        .filter_map(|crd| {
            let group = crd.path(&["spec", "group"]).and_then(Value::as_str)?;
            let kind = crd.path(&["spec", "names", "kind"]).and_then(Value::as_str)?;
            Some((group.to_string(), kind.to_string()))
        })
        .collect()
}

fn value_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
