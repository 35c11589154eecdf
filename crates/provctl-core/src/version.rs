//! Version tags published by provider repositories
//!
//! Tags are semantic versions with an optional leading `v` (e.g. `v1.0.0`).
//! The sentinel [`LATEST`] stands for the newest release and is resolved by
//! the repository backends.

use semver::Version;

use crate::error::{CoreError, Result};

/// Sentinel version resolved to the newest release of a repository
pub const LATEST: &str = "latest";

/// Check whether a version token is the `latest` sentinel
pub fn is_latest(tag: &str) -> bool {
    tag == LATEST
}

/// Parse a version tag, accepting an optional leading `v`
pub fn parse_tag(tag: &str) -> Result<Version> {
    let trimmed = tag.strip_prefix('v').unwrap_or(tag);
    Version::parse(trimmed).map_err(|e| CoreError::InvalidVersion {
        version: tag.to_string(),
        reason: e.to_string(),
    })
}

/// Keep only the tags that parse as semantic versions, newest first
pub fn sort_descending<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut parsed: Vec<(Version, String)> = tags
        .into_iter()
        .map(Into::into)
        .filter_map(|tag| parse_tag(&tag).ok().map(|v| (v, tag)))
        .collect();

    parsed.sort_by(|(a, _), (b, _)| b.cmp(a));
    parsed.dedup_by(|(a, _), (b, _)| a == b);
    parsed.into_iter().map(|(_, tag)| tag).collect()
}

/// Pick the newest tag to use for `latest`.
///
/// Pre-release tags are considered only when no release tag exists.
pub fn latest_release<I, S>(tags: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let sorted = sort_descending(tags);

    sorted
        .iter()
        .find(|tag| parse_tag(tag).map(|v| v.pre.is_empty()).unwrap_or(false))
        .or_else(|| sorted.first())
        .cloned()
}
