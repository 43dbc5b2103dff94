// crates/authz-gate-core/src/runtime/roles.rs
// ============================================================================
// Module: Role Resolver
// Description: Flattens role inheritance into effective permission sets.
// Purpose: Merge inherited permissions under each role's own permissions.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! A role may declare `inherits: parent`. The effective permissions of a role
//! are built from its root ancestor down, applying each descendant's own
//! permissions on top. For a given `(type, mode)`:
//! - when both levels declare field maps, the result is the per-field union
//!   and the more specific role wins on duplicate fields;
//! - otherwise the more specific rule replaces the inherited one.
//!
//! ## Invariants
//! - Inheritance chains are walked iteratively with a visited set, so cycles
//!   are rejected instead of recursing without bound.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use thiserror::Error;

use crate::core::AuthMode;
use crate::core::ModeRule;
use crate::core::PermissionMapping;
use crate::core::RoleEntry;
use crate::core::RoleName;
use crate::core::TypeName;
use crate::core::TypePermission;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Role resolution failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoleError {
    /// The requested role is not declared.
    #[error("unknown role: {0}")]
    UnknownRole(String),
    /// A role inherits from an undeclared role.
    #[error("role {role} inherits unknown role {parent}")]
    UnknownParent {
        /// Declaring role.
        role: String,
        /// Missing parent role.
        parent: String,
    },
    /// A role transitively inherits itself.
    #[error("cyclic role inheritance: {}", .chain.join(" -> "))]
    CyclicInheritance {
        /// Role being resolved.
        role: String,
        /// Inheritance chain, ending with the repeated role.
        chain: Vec<String>,
    },
}

// ============================================================================
// SECTION: Effective Permissions
// ============================================================================

/// Flattened, inheritance-resolved permissions of one role.
///
/// # Invariants
/// - Immutable after resolution; shared across requests by reference.
#[derive(Debug, Clone)]
pub struct EffectivePermissions {
    /// Role the permissions were resolved for.
    role: RoleName,
    /// Merged type permissions.
    types: BTreeMap<TypeName, TypePermission>,
}

impl EffectivePermissions {
    /// Returns the role these permissions belong to.
    #[must_use]
    pub const fn role(&self) -> &RoleName {
        &self.role
    }

    /// Returns the merged permission bundle for a type.
    #[must_use]
    pub fn type_permission(&self, type_name: &str) -> Option<&TypePermission> {
        self.types.get(type_name)
    }

    /// Returns the merged rule for a type and mode, without following delegation.
    #[must_use]
    pub fn rule(&self, type_name: &str, mode: AuthMode) -> Option<&ModeRule> {
        self.types.get(type_name).and_then(|permission| permission.rule(mode))
    }

    /// Iterates over merged type permissions in name order.
    pub fn types(&self) -> impl Iterator<Item = (&TypeName, &TypePermission)> {
        self.types.iter()
    }
}

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Resolves the effective permissions of one role.
///
/// # Errors
///
/// Returns [`RoleError`] when the role or an ancestor is undeclared, or when
/// the inheritance chain loops.
pub fn effective_permissions(
    mapping: &PermissionMapping,
    role: &str,
) -> Result<EffectivePermissions, RoleError> {
    let chain = ancestry(mapping, role)?;
    let mut types: BTreeMap<TypeName, TypePermission> = BTreeMap::new();
    for entry in chain.iter().rev() {
        for (type_name, own) in &entry.permissions {
            let merged = types.entry(type_name.clone()).or_default();
            for mode in [AuthMode::Read, AuthMode::Write] {
                if let Some(rule) = own.rule(mode) {
                    let next = merge_rule(merged.rule(mode), rule);
                    merged.set_rule(mode, Some(next));
                }
            }
        }
    }
    Ok(EffectivePermissions {
        role: RoleName::new(role),
        types,
    })
}

/// Resolves the effective permissions of every declared role.
///
/// # Errors
///
/// Returns the first [`RoleError`] encountered, in role name order.
pub fn resolve_all(
    mapping: &PermissionMapping,
) -> Result<BTreeMap<RoleName, EffectivePermissions>, RoleError> {
    mapping
        .roles()
        .map(|(role, _)| Ok((role.clone(), effective_permissions(mapping, role.as_str())?)))
        .collect()
}

/// Returns the role's entry followed by each ancestor's entry.
fn ancestry<'m>(mapping: &'m PermissionMapping, role: &str) -> Result<Vec<&'m RoleEntry>, RoleError> {
    let mut entry =
        mapping.role(role).ok_or_else(|| RoleError::UnknownRole(role.to_string()))?;
    let mut visited = BTreeSet::from([role.to_string()]);
    let mut path = vec![role.to_string()];
    let mut chain = vec![entry];
    while let Some(parent) = entry.inherits.as_ref() {
        let declaring = path.last().cloned().unwrap_or_default();
        path.push(parent.to_string());
        if !visited.insert(parent.to_string()) {
            return Err(RoleError::CyclicInheritance {
                role: role.to_string(),
                chain: path,
            });
        }
        entry = mapping.role(parent.as_str()).ok_or_else(|| RoleError::UnknownParent {
            role: declaring,
            parent: parent.to_string(),
        })?;
        chain.push(entry);
    }
    Ok(chain)
}

/// Merges a role's own rule over the inherited rule for the same type and mode.
fn merge_rule(inherited: Option<&ModeRule>, own: &ModeRule) -> ModeRule {
    match (inherited, own) {
        (Some(ModeRule::Fields(base)), ModeRule::Fields(overrides)) => {
            let mut fields = base.clone();
            fields.extend(overrides.iter().map(|(field, rule)| (field.clone(), rule.clone())));
            ModeRule::Fields(fields)
        }
        _ => own.clone(),
    }
}
