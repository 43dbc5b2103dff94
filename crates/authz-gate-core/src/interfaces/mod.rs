// crates/authz-gate-core/src/interfaces/mod.rs
// ============================================================================
// Module: Authz Gate Interfaces
// Description: Data client and field predicate contracts.
// Purpose: Define the seams between the authorizer and external systems.
// Dependencies: crate::core, async-trait, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Interfaces define how Authz Gate talks to the wrapped data client and how
//! dynamic field rules are evaluated. Both are async because predicates may
//! issue their own data lookups. Implementations must be `Send + Sync` so one
//! instance can serve concurrent requests.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::core::AuthContext;
use crate::core::AuthMode;
use crate::core::RootData;
use crate::core::RootType;
use crate::core::TypeName;
use crate::core::Verdict;

// ============================================================================
// SECTION: Data Client
// ============================================================================

/// Data client errors, passed through the authorization layer unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataClientError {
    /// The client does not expose the requested root field.
    #[error("unknown {root} field: {field}")]
    UnknownField {
        /// Root operation type.
        root: RootType,
        /// Requested field.
        field: String,
    },
    /// Backend execution failure.
    #[error("data client error: {0}")]
    Backend(String),
}

/// ORM-style data client exposing root fields.
#[async_trait]
pub trait DataClient: Send + Sync {
    /// Returns the query root fields the client exposes.
    fn query_fields(&self) -> Vec<String>;

    /// Returns the mutation root fields the client exposes.
    fn mutation_fields(&self) -> Vec<String>;

    /// Executes a root field with inputs and a selection set.
    ///
    /// # Errors
    ///
    /// Returns [`DataClientError`] when execution fails.
    async fn execute(
        &self,
        root: RootType,
        field: &str,
        inputs: &Value,
        selection: &str,
    ) -> Result<Value, DataClientError>;

    /// Returns whether a record of `type_name` matching `filter` exists.
    ///
    /// # Errors
    ///
    /// Returns [`DataClientError`] when the lookup fails.
    async fn exists(&self, type_name: &str, filter: &Value) -> Result<bool, DataClientError>;

    /// Sends a raw request to the backend.
    ///
    /// # Errors
    ///
    /// Returns [`DataClientError`] when the request fails.
    async fn request(&self, query: &str, variables: &Value) -> Result<Value, DataClientError>;
}

// ============================================================================
// SECTION: Field Predicates
// ============================================================================

/// Predicate evaluation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PredicateError {
    /// A lookup issued by the predicate failed.
    #[error("predicate lookup failed: {0}")]
    Lookup(#[from] DataClientError),
    /// The predicate could not evaluate its inputs.
    #[error("predicate evaluation failed: {0}")]
    Evaluation(String),
}

/// Field-level input handed to a predicate.
#[derive(Debug, Clone, Copy)]
pub struct PredicateInput<'a> {
    /// Type whose rule holds the predicate.
    pub type_name: &'a TypeName,
    /// Mode being authorized.
    pub mode: AuthMode,
    /// Field name being authorized.
    pub field: &'a str,
    /// Value at the field.
    pub value: &'a Value,
    /// Enclosing record holding the field.
    pub record: &'a Map<String, Value>,
}

/// Dynamic field rule.
#[async_trait]
pub trait FieldPredicate: Send + Sync {
    /// Stable predicate name for diagnostics.
    fn name(&self) -> &str;

    /// Evaluates the predicate; the returned verdict becomes the field verdict.
    ///
    /// # Errors
    ///
    /// Returns [`PredicateError`] when evaluation cannot complete.
    async fn evaluate(
        &self,
        input: PredicateInput<'_>,
        context: &AuthContext,
        root: &RootData,
    ) -> Result<Verdict, PredicateError>;
}

/// Shared predicate handle stored in field rules.
pub type SharedPredicate = Arc<dyn FieldPredicate>;

/// Predicate backed by a synchronous closure.
pub struct PredicateFn<F> {
    /// Predicate name.
    name: String,
    /// Evaluation closure.
    func: F,
}

impl<F> fmt::Debug for PredicateFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateFn").field("name", &self.name).finish_non_exhaustive()
    }
}

#[async_trait]
impl<F> FieldPredicate for PredicateFn<F>
where
    F: Fn(&PredicateInput<'_>, &AuthContext, &RootData) -> Verdict + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn evaluate(
        &self,
        input: PredicateInput<'_>,
        context: &AuthContext,
        root: &RootData,
    ) -> Result<Verdict, PredicateError> {
        Ok((self.func)(&input, context, root))
    }
}

/// Wraps a synchronous closure as a shared predicate.
#[must_use]
pub fn predicate_fn<F>(name: impl Into<String>, func: F) -> SharedPredicate
where
    F: Fn(&PredicateInput<'_>, &AuthContext, &RootData) -> Verdict + Send + Sync + 'static,
{
    Arc::new(PredicateFn {
        name: name.into(),
        func,
    })
}
