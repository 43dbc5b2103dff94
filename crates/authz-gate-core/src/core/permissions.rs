// crates/authz-gate-core/src/core/permissions.rs
// ============================================================================
// Module: Permission Model
// Description: Role-keyed permission mapping, type permissions, and field rules.
// Purpose: Model the declarative authorization mapping as closed sum types.
// Dependencies: crate::{core::identifiers, interfaces}, serde
// ============================================================================

//! ## Overview
//! A [`PermissionMapping`] maps each role to a [`RoleEntry`]: an optional
//! parent role plus per-type [`TypePermission`] bundles. Each bundle carries a
//! `read` and a `write` [`ModeRule`], and field maps hold [`FieldRule`]s.
//!
//! ## Invariants
//! - Mappings are built once and never mutated after they are handed to the
//!   authorizer.
//! - Field rules are exhaustive: static, predicate, or nested type.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::RoleName;
use crate::core::identifiers::TypeName;
use crate::interfaces::SharedPredicate;

// ============================================================================
// SECTION: Authorization Mode
// ============================================================================

/// Authorization mode applied to a data value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// Reading response data.
    Read,
    /// Writing input data.
    Write,
}

impl AuthMode {
    /// Returns a stable label for the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Rules
// ============================================================================

/// Authorization rule for a single field.
#[derive(Clone)]
pub enum FieldRule {
    /// Statically allow (`true`) or deny (`false`) the field.
    Static(bool),
    /// Evaluate a predicate against the field value and request context.
    Predicate(SharedPredicate),
    /// Recurse into the field value using the named type's rules.
    Nested(TypeName),
}

impl FieldRule {
    /// Returns a rule that always allows the field.
    #[must_use]
    pub const fn allow() -> Self {
        Self::Static(true)
    }

    /// Returns a rule that always denies the field.
    #[must_use]
    pub const fn deny() -> Self {
        Self::Static(false)
    }

    /// Returns a rule that recurses using the named type.
    #[must_use]
    pub fn nested(type_name: impl Into<TypeName>) -> Self {
        Self::Nested(type_name.into())
    }

    /// Returns a rule backed by a predicate.
    #[must_use]
    pub fn predicate(predicate: SharedPredicate) -> Self {
        Self::Predicate(predicate)
    }
}

impl fmt::Debug for FieldRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(value) => f.debug_tuple("Static").field(value).finish(),
            Self::Predicate(predicate) => f.debug_tuple("Predicate").field(&predicate.name()).finish(),
            Self::Nested(type_name) => f.debug_tuple("Nested").field(type_name).finish(),
        }
    }
}

impl From<bool> for FieldRule {
    fn from(value: bool) -> Self {
        Self::Static(value)
    }
}

/// Rule applied to one type for one mode.
#[derive(Debug, Clone)]
pub enum ModeRule {
    /// Every field of the type is allowed (`true`) or denied (`false`).
    All(bool),
    /// Per-field rules; fields without an entry are denied.
    Fields(BTreeMap<String, FieldRule>),
    /// Use the named type's rule for the same mode.
    Delegate(TypeName),
}

impl ModeRule {
    /// Builds a field-map rule from `(field, rule)` pairs.
    #[must_use]
    pub fn fields<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, FieldRule)>,
        K: Into<String>,
    {
        Self::Fields(entries.into_iter().map(|(field, rule)| (field.into(), rule)).collect())
    }

    /// Builds a delegating rule.
    #[must_use]
    pub fn delegate(type_name: impl Into<TypeName>) -> Self {
        Self::Delegate(type_name.into())
    }
}

/// Read and write rules for one schema type.
///
/// # Invariants
/// - A missing mode rule denies every field checked under that mode.
#[derive(Debug, Clone, Default)]
pub struct TypePermission {
    /// Rule applied when reading response data.
    pub read: Option<ModeRule>,
    /// Rule applied when validating input data.
    pub write: Option<ModeRule>,
}

impl TypePermission {
    /// Creates an empty type permission (everything denied).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            read: None,
            write: None,
        }
    }

    /// Sets the read rule.
    #[must_use]
    pub fn with_read(mut self, rule: ModeRule) -> Self {
        self.read = Some(rule);
        self
    }

    /// Sets the write rule.
    #[must_use]
    pub fn with_write(mut self, rule: ModeRule) -> Self {
        self.write = Some(rule);
        self
    }

    /// Returns the rule for the requested mode.
    #[must_use]
    pub const fn rule(&self, mode: AuthMode) -> Option<&ModeRule> {
        match mode {
            AuthMode::Read => self.read.as_ref(),
            AuthMode::Write => self.write.as_ref(),
        }
    }

    /// Replaces the rule for the requested mode.
    pub fn set_rule(&mut self, mode: AuthMode, rule: Option<ModeRule>) {
        match mode {
            AuthMode::Read => self.read = rule,
            AuthMode::Write => self.write = rule,
        }
    }
}

// ============================================================================
// SECTION: Mapping
// ============================================================================

/// Permissions declared by one role.
#[derive(Debug, Clone, Default)]
pub struct RoleEntry {
    /// Parent role whose permissions this role extends.
    pub inherits: Option<RoleName>,
    /// Type permissions declared directly by this role.
    pub permissions: BTreeMap<TypeName, TypePermission>,
}

impl RoleEntry {
    /// Creates an entry with no parent and no permissions.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inherits: None,
            permissions: BTreeMap::new(),
        }
    }

    /// Sets the parent role.
    #[must_use]
    pub fn inherits(mut self, parent: impl Into<RoleName>) -> Self {
        self.inherits = Some(parent.into());
        self
    }

    /// Adds the permission bundle for a type.
    #[must_use]
    pub fn with_type(mut self, type_name: impl Into<TypeName>, permission: TypePermission) -> Self {
        self.permissions.insert(type_name.into(), permission);
        self
    }
}

/// Role-keyed permission mapping.
///
/// # Invariants
/// - Role names are unique keys.
#[derive(Debug, Clone, Default)]
pub struct PermissionMapping {
    /// Role entries keyed by role name.
    roles: BTreeMap<RoleName, RoleEntry>,
}

impl PermissionMapping {
    /// Creates an empty mapping.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            roles: BTreeMap::new(),
        }
    }

    /// Adds a role entry, replacing any existing entry with the same name.
    #[must_use]
    pub fn with_role(mut self, role: impl Into<RoleName>, entry: RoleEntry) -> Self {
        self.roles.insert(role.into(), entry);
        self
    }

    /// Inserts a role entry, returning the previous entry if present.
    pub fn insert(&mut self, role: RoleName, entry: RoleEntry) -> Option<RoleEntry> {
        self.roles.insert(role, entry)
    }

    /// Returns the entry for a role.
    #[must_use]
    pub fn role(&self, role: &str) -> Option<&RoleEntry> {
        self.roles.get(role)
    }

    /// Iterates over role entries in name order.
    pub fn roles(&self) -> impl Iterator<Item = (&RoleName, &RoleEntry)> {
        self.roles.iter()
    }

    /// Returns the number of roles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Returns true when no roles are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}
