//! Scope hierarchy - materialized paths over the organizational tree.
//!
//! A [`ScopePath`] addresses one node of the tree as its root-to-leaf label
//! sequence (`root.acme.region-east`). The only meaningful relation between
//! two paths is the prefix relation: a prefix is an ancestor, and an ancestor
//! is a *wider* scope than each of its descendants.
//!
//! Competing scopes for the same permission are ranked by
//! [`ScopePath::widest_order`]: fewer labels first, then lexicographic order
//! of the label sequence so that equal-depth scopes on divergent branches
//! still resolve deterministically.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Separator between labels in the textual form.
pub const SCOPE_SEPARATOR: char = '.';

/// Maximum number of labels in a path.
pub const MAX_SCOPE_DEPTH: usize = 64;

/// Maximum byte length of a single label.
pub const MAX_LABEL_LEN: usize = 256;

/// Address of a node in the organizational hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ScopePath {
    labels: Vec<String>,
}

impl ScopePath {
    /// Parse a dotted path such as `root.acme.region-east`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidScope`] if the path is empty or padded
    /// with whitespace, contains an empty label, a label with characters
    /// outside `[A-Za-z0-9_-]`, or exceeds the depth or label length limits.
    pub fn parse(path: &str) -> CoreResult<Self> {
        if path.trim().is_empty() {
            return Err(invalid(path, "path is empty"));
        }
        if path.trim() != path {
            return Err(invalid(path, "leading or trailing whitespace"));
        }

        let labels: Vec<String> = path
            .split(SCOPE_SEPARATOR)
            .map(str::to_owned)
            .collect();
        Self::from_labels(labels).map_err(|e| match e {
            CoreError::InvalidScope { reason, .. } => invalid(path, &reason),
            other => other,
        })
    }

    /// Build a path from an explicit label sequence.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidScope`] under the same rules as [`parse`](Self::parse).
    pub fn from_labels<I, S>(labels: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        let joined = labels.join(".");

        if labels.is_empty() {
            return Err(invalid(&joined, "path is empty"));
        }
        if labels.len() > MAX_SCOPE_DEPTH {
            return Err(invalid(
                &joined,
                &format!("depth {} exceeds the limit of {MAX_SCOPE_DEPTH}", labels.len()),
            ));
        }
        for label in &labels {
            validate_label(label).map_err(|reason| invalid(&joined, &reason))?;
        }

        Ok(Self { labels })
    }

    /// The conventional single-label tree root (`root`).
    #[must_use]
    pub fn root() -> Self {
        Self {
            labels: vec!["root".to_owned()],
        }
    }

    /// Number of labels in the path.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.labels.len()
    }

    /// The labels, root first.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Whether `self` is a prefix of `other` (inclusive).
    ///
    /// This is the ancestor-or-self relation: a permission held at `self`
    /// covers every node addressed by `other`.
    #[must_use]
    pub fn is_ancestor_or_equal(&self, other: &Self) -> bool {
        other.labels.starts_with(&self.labels)
    }

    /// Whether `self` is a strict ancestor of `other`.
    #[must_use]
    pub fn is_wider_than(&self, other: &Self) -> bool {
        self.labels.len() < other.labels.len() && self.is_ancestor_or_equal(other)
    }

    /// Whether `self` is a strict descendant of `other`.
    #[must_use]
    pub fn is_narrower_than(&self, other: &Self) -> bool {
        other.is_wider_than(self)
    }

    /// The parent path, or `None` for a single-label path.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let (_, ancestors) = self.labels.split_last()?;
        if ancestors.is_empty() {
            return None;
        }
        Some(Self {
            labels: ancestors.to_vec(),
        })
    }

    /// Append a label, producing a child path.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidScope`] if the label is invalid or the
    /// depth limit would be exceeded.
    pub fn child(&self, label: impl Into<String>) -> CoreResult<Self> {
        let mut labels = self.labels.clone();
        labels.push(label.into());
        Self::from_labels(labels)
    }

    /// Total order used to pick the widest of several candidate scopes.
    ///
    /// `Less` means `a` is the better (wider) candidate. Depth decides first;
    /// equal depths fall back to lexicographic comparison of the labels.
    #[must_use]
    pub fn widest_order(a: &Self, b: &Self) -> Ordering {
        a.depth()
            .cmp(&b.depth())
            .then_with(|| a.labels.cmp(&b.labels))
    }
}

fn validate_label(label: &str) -> Result<(), String> {
    if label.is_empty() {
        return Err("empty label".to_owned());
    }
    if label.len() > MAX_LABEL_LEN {
        return Err(format!(
            "label of {} bytes exceeds the limit of {MAX_LABEL_LEN}",
            label.len()
        ));
    }
    if let Some(bad) = label
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
    {
        return Err(format!("label '{label}' contains invalid character '{bad}'"));
    }
    Ok(())
}

fn invalid(path: &str, reason: &str) -> CoreError {
    CoreError::InvalidScope {
        path: path.to_owned(),
        reason: reason.to_owned(),
    }
}

impl fmt::Display for ScopePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.labels.join("."))
    }
}

impl FromStr for ScopePath {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ScopePath {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ScopePath> for String {
    fn from(scope: ScopePath) -> Self {
        scope.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope(s: &str) -> ScopePath {
        ScopePath::parse(s).unwrap()
    }

    #[test]
    fn test_parse_and_display() {
        let path = scope("root.acme.region-east");
        assert_eq!(path.depth(), 3);
        assert_eq!(path.labels()[1], "acme");
        assert_eq!(path.to_string(), "root.acme.region-east");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(ScopePath::parse("").is_err());
        assert!(ScopePath::parse("   ").is_err());
        assert!(ScopePath::parse("root..acme").is_err());
        assert!(ScopePath::parse("root.acme.").is_err());
        assert!(ScopePath::parse("root.ac me").is_err());
        assert!(ScopePath::parse("root.acme/east").is_err());

        let err = ScopePath::parse("root..acme").unwrap_err();
        assert!(matches!(err, CoreError::InvalidScope { ref path, .. } if path == "root..acme"));
    }

    #[test]
    fn test_parse_rejects_padding() {
        for padded in [" root.acme", "root.acme ", " root.acme ", "\troot", "root\n"] {
            let err = ScopePath::parse(padded).unwrap_err();
            assert!(
                matches!(err, CoreError::InvalidScope { ref reason, .. } if reason.contains("whitespace")),
                "{padded:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_depth_limit() {
        let deep = vec!["n"; MAX_SCOPE_DEPTH + 1];
        assert!(ScopePath::from_labels(deep).is_err());

        let ok = vec!["n"; MAX_SCOPE_DEPTH];
        assert_eq!(ScopePath::from_labels(ok).unwrap().depth(), MAX_SCOPE_DEPTH);
    }

    #[test]
    fn test_ancestor_or_equal() {
        let root = scope("root");
        let acme = scope("root.acme");
        let branch = scope("root.acme.branch1");
        let other = scope("root.other");

        assert!(root.is_ancestor_or_equal(&branch));
        assert!(acme.is_ancestor_or_equal(&branch));
        assert!(acme.is_ancestor_or_equal(&acme));
        assert!(!branch.is_ancestor_or_equal(&acme));
        assert!(!acme.is_ancestor_or_equal(&other));
    }

    #[test]
    fn test_label_prefix_is_not_ancestor() {
        // `root.ac` is a string prefix of `root.acme` but not a path prefix.
        assert!(!scope("root.ac").is_ancestor_or_equal(&scope("root.acme")));
    }

    #[test]
    fn test_wider_and_narrower() {
        let acme = scope("root.acme");
        let branch = scope("root.acme.branch1");

        assert!(acme.is_wider_than(&branch));
        assert!(!acme.is_wider_than(&acme));
        assert!(branch.is_narrower_than(&acme));
        assert!(!scope("root.other").is_wider_than(&branch));
    }

    #[test]
    fn test_parent_and_child() {
        let branch = scope("root.acme.branch1");
        assert_eq!(branch.parent().unwrap(), scope("root.acme"));
        assert_eq!(scope("root").parent(), None);

        let child = scope("root.acme").child("branch1").unwrap();
        assert_eq!(child, branch);
        assert!(scope("root").child("bad label").is_err());
    }

    #[test]
    fn test_widest_order() {
        let root = scope("root");
        let acme = scope("root.acme");
        let beta = scope("root.beta");

        assert_eq!(ScopePath::widest_order(&root, &acme), Ordering::Less);
        assert_eq!(ScopePath::widest_order(&acme, &root), Ordering::Greater);
        assert_eq!(ScopePath::widest_order(&acme, &beta), Ordering::Less);
        assert_eq!(ScopePath::widest_order(&acme, &acme), Ordering::Equal);
    }

    #[test]
    fn test_serde_as_string() {
        let path = scope("root.acme");
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, "\"root.acme\"");

        let back: ScopePath = serde_json::from_str(&json).unwrap();
        assert_eq!(back, path);

        assert!(serde_json::from_str::<ScopePath>("\"root..x\"").is_err());
    }
}
