//! Well-known variables every cluster template is expected to use
//!
//! Providers may define more variables; those are only settable through the
//! environment or the config file.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{CoreError, Result};
use crate::provider::DNS1123_LABEL;
use crate::variables::{VariablesClient, VariablesGetter};
use crate::version;

pub const CLUSTER_NAME_VAR: &str = "CLUSTER_NAME";
pub const NAMESPACE_VAR: &str = "NAMESPACE";
pub const KUBERNETES_VERSION_VAR: &str = "KUBERNETES_VERSION";
pub const CONTROL_PLANE_MACHINE_COUNT_VAR: &str = "CONTROL_PLANE_MACHINE_COUNT";
pub const WORKER_MACHINE_COUNT_VAR: &str = "WORKER_MACHINE_COUNT";

const DEFAULT_CONTROL_PLANE_MACHINE_COUNT: i64 = 1;
const DEFAULT_WORKER_MACHINE_COUNT: i64 = 0;

static DNS1123_SUBDOMAIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$")
        .expect("valid regex")
});

/// Options for generating a workload cluster from a template
#[derive(Debug, Clone, Default)]
pub struct ClusterTemplateOptions {
    pub cluster_name: String,
    pub target_namespace: String,
    /// Empty means "keep the value from the environment or config file"
    pub kubernetes_version: Option<String>,
    pub control_plane_machine_count: Option<i64>,
    pub worker_machine_count: Option<i64>,
}

impl ClusterTemplateOptions {
    /// Validate the options and layer them on top of `variables`
    pub fn apply(&self, variables: VariablesClient) -> Result<VariablesClient> {
        validate_subdomain("cluster name", &self.cluster_name)?;
        validate_label("target namespace", &self.target_namespace)?;

        let mut variables = variables
            .with_override(CLUSTER_NAME_VAR, self.cluster_name.as_str())
            .with_override(NAMESPACE_VAR, self.target_namespace.as_str());

        if let Some(kubernetes_version) = self.kubernetes_version.as_deref().filter(|v| !v.is_empty())
        {
            version::parse_tag(kubernetes_version).map_err(|e| invalid("kubernetes version", e))?;
            variables = variables.with_override(KUBERNETES_VERSION_VAR, kubernetes_version);
        }

        variables = apply_count(
            variables,
            CONTROL_PLANE_MACHINE_COUNT_VAR,
            "control plane machine count",
            self.control_plane_machine_count,
            DEFAULT_CONTROL_PLANE_MACHINE_COUNT,
        )?;
        variables = apply_count(
            variables,
            WORKER_MACHINE_COUNT_VAR,
            "worker machine count",
            self.worker_machine_count,
            DEFAULT_WORKER_MACHINE_COUNT,
        )?;

        Ok(variables)
    }
}

fn apply_count(
    variables: VariablesClient,
    name: &str,
    field: &str,
    value: Option<i64>,
    default: i64,
) -> Result<VariablesClient> {
    match value {
        Some(count) if count < 0 => Err(CoreError::InvalidTemplateOption {
            field: field.to_string(),
            reason: format!("{} must be a non-negative number", count),
        }),
        Some(count) => Ok(variables.with_override(name, count.to_string())),
        None if variables.get(name).is_some() => Ok(variables),
        None => Ok(variables.with_override(name, default.to_string())),
    }
}

fn validate_subdomain(field: &str, value: &str) -> Result<()> {
    if value.is_empty() || value.len() > 253 || !DNS1123_SUBDOMAIN.is_match(value) {
        return Err(CoreError::InvalidTemplateOption {
            field: field.to_string(),
            reason: format!(
                "'{}' must consist of lower case alphanumeric characters, '-' or '.', and must start and end with an alphanumeric character",
                value
            ),
        });
    }
    Ok(())
}

fn validate_label(field: &str, value: &str) -> Result<()> {
    if value.is_empty() || value.len() > 63 || !DNS1123_LABEL.is_match(value) {
        return Err(CoreError::InvalidTemplateOption {
            field: field.to_string(),
            reason: format!(
                "'{}' must consist of at most 63 lower case alphanumeric characters or '-', and must start and end with an alphanumeric character",
                value
            ),
        });
    }
    Ok(())
}

fn invalid(field: &str, err: CoreError) -> CoreError {
    CoreError::InvalidTemplateOption {
        field: field.to_string(),
        reason: err.to_string(),
    }
}
