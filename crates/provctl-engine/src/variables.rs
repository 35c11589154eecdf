//! Placeholder discovery and substitution
//!
//! Two placeholder forms are recognized: `${NAME}` and a bare `$NAME`.
//! Names follow `[A-Za-z_][A-Za-z0-9_]*`. A bare placeholder only starts a
//! name when it is not glued to a preceding identifier character.

use std::collections::HashMap;
use std::ops::Range;

use indexmap::IndexSet;
use once_cell::sync::Lazy;
use provctl_core::VariablesGetter;
use regex::Regex;

use crate::error::{EngineError, Result};

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}|\$([A-Za-z_][A-Za-z0-9_]*)")
        .expect("valid regex")
});

struct Placeholder<'a> {
    span: Range<usize>,
    name: &'a str,
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn placeholders(raw: &str) -> impl Iterator<Item = Placeholder<'_>> {
    PLACEHOLDER.captures_iter(raw).filter_map(move |caps| {
        let whole = caps.get(0)?;
        if let Some(braced) = caps.get(1) {
            return Some(Placeholder {
                span: whole.range(),
                name: braced.as_str(),
            });
        }

        let bare = caps.get(2)?;
        let glued = raw[..whole.start()]
            .chars()
            .next_back()
            .is_some_and(is_ident_char);
        if glued {
            return None;
        }
        Some(Placeholder {
            span: whole.range(),
            name: bare.as_str(),
        })
    })
}

/// List the distinct variable names referenced by `raw`, in order of first appearance
pub fn discover(raw: &str) -> Vec<String> {
    placeholders(raw)
        .map(|p| p.name.to_string())
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

/// Replace the placeholders of `variables` with values from `getter`.
///
/// Only names listed in `variables` are touched. Substituted values are never
/// rescanned. When values are missing the call fails with every missing name,
/// unless `skip_missing` is set, in which case those placeholders are kept
/// verbatim.
pub fn substitute(
    raw: &str,
    variables: &[String],
    getter: &dyn VariablesGetter,
    skip_missing: bool,
) -> Result<String> {
    let mut values: HashMap<&str, String> = HashMap::with_capacity(variables.len());
    let mut missing = Vec::new();

    for name in variables {
        match getter.get(name) {
            Some(value) => {
                values.insert(name.as_str(), value);
            }
            None => missing.push(name.clone()),
        }
    }

    if !missing.is_empty() && !skip_missing {
        return Err(EngineError::MissingVariable { names: missing });
    }

    let mut out = String::with_capacity(raw.len());
    let mut last = 0;
    for placeholder in placeholders(raw) {
        if let Some(value) = values.get(placeholder.name) {
            out.push_str(&raw[last..placeholder.span.start]);
            out.push_str(value);
            last = placeholder.span.end;
        }
    }
    out.push_str(&raw[last..]);

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn getter(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_discover_both_forms() {
        let raw = "a: ${ CLUSTER_NAME }\nb: $NAMESPACE\nc: ${CLUSTER_NAME}\n";
        assert_eq!(discover(raw), vec!["CLUSTER_NAME", "NAMESPACE"]);
    }

    #[test]
    fn test_discover_ignores_glued_bare_names() {
        assert_eq!(discover("user$HOME and x_$Y"), Vec::<String>::new());
        assert_eq!(discover("prefix-$SUFFIX"), vec!["SUFFIX"]);
        assert_eq!(discover("x${INNER}"), vec!["INNER"]);
    }

    #[test]
    fn test_discover_rejects_invalid_names() {
        assert!(discover("${1ABC} $9 ${} ${A-B}").is_empty());
    }

    #[test]
    fn test_discover_empty() {
        assert!(discover("").is_empty());
        assert!(discover("kind: ConfigMap\n").is_empty());
    }

    #[test]
    fn test_substitute_replaces_listed_names() {
        let raw = "cluster: ${CLUSTER_NAME}\nnamespace: $NAMESPACE\n";
        let vars = getter(&[("CLUSTER_NAME", "foo"), ("NAMESPACE", "bar")]);
        let out = substitute(raw, &names(&["CLUSTER_NAME", "NAMESPACE"]), &vars, false).unwrap();
        assert_eq!(out, "cluster: foo\nnamespace: bar\n");
    }

    #[test]
    fn test_substitute_leaves_unlisted_names() {
        let raw = "a: ${A}\nb: ${B}\n";
        let vars = getter(&[("A", "1"), ("B", "2")]);
        let out = substitute(raw, &names(&["A"]), &vars, false).unwrap();
        assert_eq!(out, "a: 1\nb: ${B}\n");
    }

    #[test]
    fn test_substitute_reports_all_missing_names() {
        let raw = "a: ${A}\nb: ${B}\nc: ${C}\n";
        let vars = getter(&[("B", "2")]);
        let err = substitute(raw, &names(&["A", "B", "C"]), &vars, false).unwrap_err();
        assert_eq!(err.missing_variables(), Some(&names(&["A", "C"])[..]));
    }

    #[test]
    fn test_substitute_skip_missing_keeps_placeholders() {
        let raw = "a: ${A}\nb: $B\n";
        let vars = getter(&[("A", "1")]);
        let out = substitute(raw, &names(&["A", "B"]), &vars, true).unwrap();
        assert_eq!(out, "a: 1\nb: $B\n");
    }

    #[test]
    fn test_substitute_does_not_rescan_values() {
        let raw = "a: ${A}\n";
        let vars = getter(&[("A", "${B}"), ("B", "nested")]);
        let out = substitute(raw, &names(&["A", "B"]), &vars, false).unwrap();
        assert_eq!(out, "a: ${B}\n");
    }

    #[test]
    fn test_substitute_without_placeholders_is_identity() {
        let raw = "kind: ConfigMap\ndata:\n  key: value\n";
        let vars = getter(&[]);
        assert_eq!(substitute(raw, &discover(raw), &vars, false).unwrap(), raw);
    }

    #[test]
    fn test_substitute_twice_is_stable() {
        let raw = "name: ${CLUSTER_NAME}\nnamespace: $NAMESPACE\nreplicas: ${ COUNT }\n";
        let vars = getter(&[("CLUSTER_NAME", "foo"), ("NAMESPACE", "bar"), ("COUNT", "3")]);

        let once = substitute(raw, &discover(raw), &vars, false).unwrap();
        let twice = substitute(&once, &discover(&once), &vars, false).unwrap();

        assert_eq!(once, "name: foo\nnamespace: bar\nreplicas: 3\n");
        assert_eq!(twice, once);
    }

    #[test]
    fn test_substitute_empty_value() {
        let vars = getter(&[("A", "")]);
        assert_eq!(substitute("x${A}y", &names(&["A"]), &vars, false).unwrap(), "xy");
    }
}
