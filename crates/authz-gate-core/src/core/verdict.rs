// crates/authz-gate-core/src/core/verdict.rs
// ============================================================================
// Module: Authorization Verdicts
// Description: Nested allow/deny results mirroring checked data.
// Purpose: Carry detailed per-field outcomes and reduce them to one decision.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! A [`Verdict`] mirrors the shape of the checked value: records become
//! ordered field maps, lists become ordered element lists, and leaves are
//! booleans. [`summarize`] reduces a verdict to one decision by AND-ing every
//! leaf. The whole tree is always visited because the detailed verdict is
//! reported on failure.
//!
//! ## Invariants
//! - Record verdicts preserve the field order of the checked data.
//! - Every field present in checked data has a leaf or subtree.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Serialize;
use serde::Serializer;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Verdict
// ============================================================================

/// Nested authorization outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Leaf decision.
    Bool(bool),
    /// Per-field outcomes in data order.
    Record(Vec<(String, Verdict)>),
    /// Per-element outcomes in data order.
    List(Vec<Verdict>),
}

impl Verdict {
    /// Returns an allowing leaf.
    #[must_use]
    pub const fn allow() -> Self {
        Self::Bool(true)
    }

    /// Returns a denying leaf.
    #[must_use]
    pub const fn deny() -> Self {
        Self::Bool(false)
    }

    /// Builds a record verdict from `(field, verdict)` pairs.
    #[must_use]
    pub fn record<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Self)>,
        K: Into<String>,
    {
        Self::Record(fields.into_iter().map(|(field, verdict)| (field.into(), verdict)).collect())
    }

    /// Returns the verdict for a record field, if this is a record containing it.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Self> {
        match self {
            Self::Record(fields) => {
                fields.iter().find(|(field, _)| field == name).map(|(_, verdict)| verdict)
            }
            Self::Bool(_) | Self::List(_) => None,
        }
    }

    /// Returns true when every leaf allows.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        summarize(self)
    }

    /// Returns dotted paths of every denying leaf, e.g. `data.id` or `1.email`.
    ///
    /// A denying root leaf is reported as [`ROOT_PATH`].
    #[must_use]
    pub fn denied_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        collect_denied(self, &mut String::new(), &mut paths);
        paths
    }

    /// Converts the verdict into a JSON value preserving field order.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Bool(value) => Value::Bool(*value),
            Self::Record(fields) => {
                let mut map = Map::with_capacity(fields.len());
                for (field, verdict) in fields {
                    map.insert(field.clone(), verdict.to_value());
                }
                Value::Object(map)
            }
            Self::List(items) => Value::Array(items.iter().map(Self::to_value).collect()),
        }
    }
}

impl From<bool> for Verdict {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl Serialize for Verdict {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_value().serialize(serializer)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_value(), f)
    }
}

/// Reduces a verdict to a single decision.
///
/// Booleans pass through; records and lists AND their children. Every child
/// is visited (no short-circuit).
#[must_use]
pub fn summarize(verdict: &Verdict) -> bool {
    match verdict {
        Verdict::Bool(value) => *value,
        Verdict::Record(fields) => {
            fields.iter().fold(true, |allowed, (_, child)| summarize(child) & allowed)
        }
        Verdict::List(items) => items.iter().fold(true, |allowed, child| summarize(child) & allowed),
    }
}

/// Path reported for a denied root value.
pub const ROOT_PATH: &str = "$";

/// Appends denied leaf paths under `prefix` to `paths`.
fn collect_denied(verdict: &Verdict, prefix: &mut String, paths: &mut Vec<String>) {
    match verdict {
        Verdict::Bool(true) => {}
        Verdict::Bool(false) if prefix.is_empty() => paths.push(ROOT_PATH.to_string()),
        Verdict::Bool(false) => paths.push(prefix.clone()),
        Verdict::Record(fields) => {
            for (field, child) in fields {
                with_segment(prefix, field, |prefix| collect_denied(child, prefix, paths));
            }
        }
        Verdict::List(items) => {
            for (index, child) in items.iter().enumerate() {
                with_segment(prefix, &index.to_string(), |prefix| {
                    collect_denied(child, prefix, paths);
                });
            }
        }
    }
}

/// Runs `visit` with `segment` temporarily appended to `prefix`.
fn with_segment(prefix: &mut String, segment: &str, visit: impl FnOnce(&mut String)) {
    let len = prefix.len();
    if !prefix.is_empty() {
        prefix.push('.');
    }
    prefix.push_str(segment);
    visit(prefix);
    prefix.truncate(len);
}

// ============================================================================
// SECTION: Authorization Error
// ============================================================================

/// Per-request denial carrying the complete verdict.
///
/// The message embeds the verdict as JSON so callers and logs can see exactly
/// which fields failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Detailed access result: {verdict}")]
pub struct AuthorizationError {
    /// Detailed verdict that failed summarization.
    pub verdict: Verdict,
}

impl AuthorizationError {
    /// Creates an error from a failing verdict.
    #[must_use]
    pub const fn new(verdict: Verdict) -> Self {
        Self {
            verdict,
        }
    }
}
