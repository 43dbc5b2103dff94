// crates/authz-gate-core/src/runtime/predicates.rs
// ============================================================================
// Module: Built-in Predicates
// Description: Identity and ownership predicates for field rules.
// Purpose: Cover the common "is this me" and "is this mine" checks.
// Dependencies: crate::{core, interfaces}, async-trait, serde_json
// ============================================================================

//! ## Overview
//! [`IsMe`] allows a field when the record being authorized is the acting
//! user. [`IsMine`] allows a field when the record is owned by the acting
//! user, either through an embedded `user.id` or through an ownership lookup
//! on the data client.
//!
//! Subject identifiers are taken from the enclosing record's `id` first and
//! from the root call's `where.id` argument second, so the same predicate
//! works for response records and for update inputs that omit the id.
//! Identifiers may be strings or numbers; numbers match the acting user's id
//! by their decimal rendering.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use serde_json::Value;
use serde_json::json;

use crate::core::AuthContext;
use crate::core::RootData;
use crate::core::TypeName;
use crate::core::Verdict;
use crate::interfaces::FieldPredicate;
use crate::interfaces::PredicateError;
use crate::interfaces::PredicateInput;

// ============================================================================
// SECTION: Identity Predicate
// ============================================================================

/// Allows the field when the subject record is the acting user.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsMe;

#[async_trait]
impl FieldPredicate for IsMe {
    fn name(&self) -> &str {
        "is_me"
    }

    async fn evaluate(
        &self,
        input: PredicateInput<'_>,
        context: &AuthContext,
        root: &RootData,
    ) -> Result<Verdict, PredicateError> {
        let allowed =
            subject_id(&input, root).is_some_and(|id| is_user(id, context.user.id.as_str()));
        Ok(Verdict::Bool(allowed))
    }
}

// ============================================================================
// SECTION: Ownership Predicate
// ============================================================================

/// Allows the field when the subject record belongs to the acting user.
#[derive(Debug, Clone)]
pub struct IsMine {
    /// Record type used for ownership lookups.
    type_name: TypeName,
}

impl IsMine {
    /// Creates an ownership predicate for records of `type_name`.
    #[must_use]
    pub fn new(type_name: impl Into<TypeName>) -> Self {
        Self {
            type_name: type_name.into(),
        }
    }

    /// Returns the record type used for ownership lookups.
    #[must_use]
    pub const fn type_name(&self) -> &TypeName {
        &self.type_name
    }
}

#[async_trait]
impl FieldPredicate for IsMine {
    fn name(&self) -> &str {
        "is_mine"
    }

    async fn evaluate(
        &self,
        input: PredicateInput<'_>,
        context: &AuthContext,
        root: &RootData,
    ) -> Result<Verdict, PredicateError> {
        let user_id = context.user.id.as_str();
        let owner = input
            .record
            .get("user")
            .and_then(|user| user.get("id"))
            .filter(|owner| is_identifier(owner));
        if let Some(owner) = owner {
            return Ok(Verdict::Bool(is_user(owner, user_id)));
        }
        let Some(record_id) = subject_id(&input, root) else {
            return Ok(Verdict::Bool(false));
        };
        let filter = json!({ "id": record_id, "user": { "id": user_id } });
        let owned = context.client.exists(self.type_name.as_str(), &filter).await?;
        Ok(Verdict::Bool(owned))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the id of the record being authorized.
fn subject_id<'a>(input: &PredicateInput<'a>, root: &'a RootData) -> Option<&'a Value> {
    input
        .record
        .get("id")
        .filter(|id| is_identifier(id))
        .or_else(|| value_at(&root.inputs, &["where", "id"]).filter(|id| is_identifier(id)))
}

/// Returns the value at a nested object path.
fn value_at<'v>(value: &'v Value, path: &[&str]) -> Option<&'v Value> {
    path.iter().try_fold(value, |current, segment| current.get(segment))
}

/// Returns true for string and numeric identifiers.
const fn is_identifier(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_))
}

/// Compares an identifier with the acting user's id.
fn is_user(id: &Value, user_id: &str) -> bool {
    match id {
        Value::String(id) => id == user_id,
        Value::Number(id) => id.to_string() == user_id,
        Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_) => false,
    }
}
