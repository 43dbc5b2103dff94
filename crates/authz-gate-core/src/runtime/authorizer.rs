// crates/authz-gate-core/src/runtime/authorizer.rs
// ============================================================================
// Module: Field Authorizer
// Description: Recursive evaluation of permission rules against nested data.
// Purpose: Produce per-field verdicts mirroring the shape of checked data.
// Dependencies: crate::{core, interfaces, runtime::roles}, futures, serde_json
// ============================================================================

//! ## Overview
//! The authorizer walks a data value against the effective rule of a type:
//! - lists are evaluated element by element into a list verdict;
//! - `null` is always allowed, since absent data cannot violate a rule;
//! - records are evaluated field by field into an ordered record verdict;
//! - scalars are allowed only by a type-wide `true` rule.
//!
//! Field dispatch is exhaustive over [`FieldRule`]: static literals, async
//! predicates, and nested type references that recurse. Fields without a rule
//! are denied. Sibling fields and list elements are evaluated concurrently and
//! all of them are awaited, so the full verdict is available on failure.
//!
//! ## Invariants
//! - Delegating mode rules are validated for every role at construction.
//! - Evaluation never mutates shared state.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use futures::future::join_all;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::core::AuthContext;
use crate::core::AuthMode;
use crate::core::FieldRule;
use crate::core::ModeRule;
use crate::core::PermissionMapping;
use crate::core::RoleName;
use crate::core::RootData;
use crate::core::TypeName;
use crate::core::Verdict;
use crate::interfaces::PredicateError;
use crate::interfaces::PredicateInput;
use crate::runtime::roles::EffectivePermissions;
use crate::runtime::roles::RoleError;
use crate::runtime::roles::resolve_all;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Evaluation failures that are not authorization denials.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorizeError {
    /// A delegating rule points at a type with no rule for the mode.
    #[error("type {type_name} delegates {mode} rules to {target}, which has no {mode} rule")]
    UnknownTypeReference {
        /// Type whose rule was being resolved.
        type_name: TypeName,
        /// Delegation target without a rule.
        target: TypeName,
        /// Mode being resolved.
        mode: AuthMode,
    },
    /// Delegating rules loop back on themselves.
    #[error("{mode} rule delegation cycle: {}", .chain.join(" -> "))]
    DelegationCycle {
        /// Type whose rule was being resolved.
        type_name: TypeName,
        /// Mode being resolved.
        mode: AuthMode,
        /// Delegation chain, ending with the repeated type.
        chain: Vec<String>,
    },
    /// A predicate failed to produce a verdict.
    #[error("predicate {predicate} failed on {type_name}.{field}: {source}")]
    Predicate {
        /// Predicate name.
        predicate: String,
        /// Type holding the field.
        type_name: TypeName,
        /// Field being authorized.
        field: String,
        /// Underlying failure.
        #[source]
        source: PredicateError,
    },
}

/// Authorizer construction failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// Role inheritance could not be resolved.
    #[error(transparent)]
    Role(#[from] RoleError),
    /// A delegating rule is invalid.
    #[error(transparent)]
    Authorize(#[from] AuthorizeError),
}

// ============================================================================
// SECTION: Rule Resolution
// ============================================================================

/// Mode rule after delegation has been followed.
#[derive(Debug, Clone, Copy)]
pub enum ResolvedRule<'a> {
    /// No rule for the mode; every field is denied.
    Absent,
    /// Type-wide literal.
    All(bool),
    /// Per-field rules.
    Fields(&'a BTreeMap<String, FieldRule>),
}

impl EffectivePermissions {
    /// Resolves the rule of a type for a mode, following delegations.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorizeError::UnknownTypeReference`] when a delegation
    /// target has no rule for the mode, or
    /// [`AuthorizeError::DelegationCycle`] when delegations loop.
    pub fn resolve_rule(
        &self,
        type_name: &str,
        mode: AuthMode,
    ) -> Result<ResolvedRule<'_>, AuthorizeError> {
        let mut current = type_name;
        let mut chain = vec![type_name.to_string()];
        loop {
            match self.rule(current, mode) {
                None if chain.len() > 1 => {
                    return Err(AuthorizeError::UnknownTypeReference {
                        type_name: TypeName::new(type_name),
                        target: TypeName::new(current),
                        mode,
                    });
                }
                None => return Ok(ResolvedRule::Absent),
                Some(ModeRule::All(allowed)) => return Ok(ResolvedRule::All(*allowed)),
                Some(ModeRule::Fields(fields)) => return Ok(ResolvedRule::Fields(fields)),
                Some(ModeRule::Delegate(target)) => {
                    let looped = chain.iter().any(|seen| seen == target.as_str());
                    chain.push(target.to_string());
                    if looped {
                        return Err(AuthorizeError::DelegationCycle {
                            type_name: TypeName::new(type_name),
                            mode,
                            chain,
                        });
                    }
                    current = target.as_str();
                }
            }
        }
    }

    /// Checks that every delegating rule resolves.
    ///
    /// # Errors
    ///
    /// Returns the first [`AuthorizeError`] produced by [`Self::resolve_rule`].
    pub fn validate_delegations(&self) -> Result<(), AuthorizeError> {
        for (type_name, permission) in self.types() {
            for mode in [AuthMode::Read, AuthMode::Write] {
                if let Some(ModeRule::Delegate(_)) = permission.rule(mode) {
                    self.resolve_rule(type_name.as_str(), mode)?;
                }
            }
        }
        Ok(())
    }

    /// Authorizes `data` as a value of `type_name` under `mode`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorizeError`] when a rule cannot be resolved or a
    /// predicate fails. Denials are reported in the verdict, not as errors.
    pub async fn authorize(
        &self,
        type_name: &TypeName,
        mode: AuthMode,
        data: &Value,
        context: &AuthContext,
        root: &RootData,
    ) -> Result<Verdict, AuthorizeError> {
        let evaluation = Evaluation {
            permissions: self,
            mode,
            context,
            root,
        };
        evaluation.evaluate(type_name, data).await
    }
}

// ============================================================================
// SECTION: Authorizer
// ============================================================================

/// Process-wide authorizer built once from a permission mapping.
///
/// # Invariants
/// - Every role's effective permissions are resolved and validated up front.
/// - Immutable after construction; share it behind an [`Arc`].
#[derive(Debug, Clone)]
pub struct Authorizer {
    /// Effective permissions keyed by role.
    roles: BTreeMap<RoleName, Arc<EffectivePermissions>>,
}

impl Authorizer {
    /// Resolves and validates every role in the mapping.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] on unknown or cyclic inheritance and on invalid
    /// delegating rules.
    pub fn new(mapping: &PermissionMapping) -> Result<Self, BuildError> {
        let resolved = resolve_all(mapping)?;
        let mut roles = BTreeMap::new();
        for (role, permissions) in resolved {
            permissions.validate_delegations()?;
            roles.insert(role, Arc::new(permissions));
        }
        Ok(Self {
            roles,
        })
    }

    /// Returns the effective permissions of a role.
    ///
    /// # Errors
    ///
    /// Returns [`RoleError::UnknownRole`] when the role is not declared.
    pub fn permissions(&self, role: &str) -> Result<Arc<EffectivePermissions>, RoleError> {
        self.roles.get(role).cloned().ok_or_else(|| RoleError::UnknownRole(role.to_string()))
    }

    /// Iterates over declared roles in name order.
    pub fn roles(&self) -> impl Iterator<Item = &RoleName> {
        self.roles.keys()
    }
}

// ============================================================================
// SECTION: Evaluation
// ============================================================================

/// Per-call evaluation state shared by every level of the walk.
struct Evaluation<'a> {
    /// Effective permissions of the acting role.
    permissions: &'a EffectivePermissions,
    /// Mode being authorized.
    mode: AuthMode,
    /// Request context handed to predicates.
    context: &'a AuthContext,
    /// Root call metadata handed to predicates.
    root: &'a RootData,
}

impl Evaluation<'_> {
    /// Evaluates a value of `type_name`.
    fn evaluate<'s>(
        &'s self,
        type_name: &'s TypeName,
        data: &'s Value,
    ) -> BoxFuture<'s, Result<Verdict, AuthorizeError>> {
        async move {
            match data {
                Value::Null => Ok(Verdict::Bool(true)),
                Value::Array(items) => {
                    let verdicts =
                        join_all(items.iter().map(|item| self.evaluate(type_name, item))).await;
                    verdicts.into_iter().collect::<Result<Vec<_>, _>>().map(Verdict::List)
                }
                Value::Object(record) => self.evaluate_record(type_name, record).await,
                Value::Bool(_) | Value::Number(_) | Value::String(_) => {
                    self.evaluate_scalar(type_name)
                }
            }
        }
        .boxed()
    }

    /// Evaluates every field of a record concurrently.
    async fn evaluate_record(
        &self,
        type_name: &TypeName,
        record: &Map<String, Value>,
    ) -> Result<Verdict, AuthorizeError> {
        let rule = self.permissions.resolve_rule(type_name.as_str(), self.mode)?;
        let mut names = Vec::with_capacity(record.len());
        let mut pending = Vec::with_capacity(record.len());
        for (field, value) in record {
            names.push(field.clone());
            pending.push(self.evaluate_field(type_name, rule, field, value, record));
        }
        let verdicts = join_all(pending).await;
        names
            .into_iter()
            .zip(verdicts)
            .map(|(name, verdict)| verdict.map(|verdict| (name, verdict)))
            .collect::<Result<Vec<_>, _>>()
            .map(Verdict::Record)
    }

    /// Evaluates one field of a record against the resolved type rule.
    async fn evaluate_field(
        &self,
        type_name: &TypeName,
        rule: ResolvedRule<'_>,
        field: &str,
        value: &Value,
        record: &Map<String, Value>,
    ) -> Result<Verdict, AuthorizeError> {
        if value.is_null() {
            return Ok(Verdict::Bool(true));
        }
        let fields = match rule {
            ResolvedRule::Absent => return Ok(Verdict::Bool(false)),
            ResolvedRule::All(allowed) => return Ok(Verdict::Bool(allowed)),
            ResolvedRule::Fields(fields) => fields,
        };
        match fields.get(field) {
            None => Ok(Verdict::Bool(false)),
            Some(FieldRule::Static(allowed)) => Ok(Verdict::Bool(*allowed)),
            Some(FieldRule::Predicate(predicate)) => {
                let input = PredicateInput {
                    type_name,
                    mode: self.mode,
                    field,
                    value,
                    record,
                };
                predicate.evaluate(input, self.context, self.root).await.map_err(|source| {
                    AuthorizeError::Predicate {
                        predicate: predicate.name().to_string(),
                        type_name: type_name.clone(),
                        field: field.to_string(),
                        source,
                    }
                })
            }
            Some(FieldRule::Nested(nested)) => self.evaluate(nested, value).await,
        }
    }

    /// Evaluates a scalar value; only a type-wide `true` rule allows it.
    fn evaluate_scalar(&self, type_name: &TypeName) -> Result<Verdict, AuthorizeError> {
        let rule = self.permissions.resolve_rule(type_name.as_str(), self.mode)?;
        Ok(Verdict::Bool(matches!(rule, ResolvedRule::All(true))))
    }
}
