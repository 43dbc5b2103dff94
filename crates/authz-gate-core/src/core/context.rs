// crates/authz-gate-core/src/core/context.rs
// ============================================================================
// Module: Authorization Context
// Description: Per-request acting user, request context, and root call data.
// Purpose: Give predicates everything they need to correlate and look up data.
// Dependencies: crate::{core::identifiers, interfaces}, serde, serde_json
// ============================================================================

//! ## Overview
//! [`AuthContext`] bundles the acting user, the ambient request context, and a
//! shared handle to the data client so predicates can issue their own lookups.
//! [`RootData`] describes the root call being authorized. Both are built fresh
//! per call and never mutated.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::identifiers::RoleName;
use crate::core::identifiers::UserId;
use crate::interfaces::DataClient;

// ============================================================================
// SECTION: Root Types
// ============================================================================

/// Schema root operation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RootType {
    /// Read-only root (`Query`).
    Query,
    /// Mutating root (`Mutation`).
    Mutation,
}

impl RootType {
    /// Returns the schema type name of the root.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Query => "Query",
            Self::Mutation => "Mutation",
        }
    }
}

impl fmt::Display for RootType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Context Types
// ============================================================================

/// Acting user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// User identity.
    pub id: UserId,
    /// Role whose effective permissions apply.
    pub role: RoleName,
}

impl AuthUser {
    /// Creates a new acting user.
    #[must_use]
    pub fn new(id: impl Into<UserId>, role: impl Into<RoleName>) -> Self {
        Self {
            id: id.into(),
            role: role.into(),
        }
    }
}

/// Per-request authorization context.
///
/// # Invariants
/// - Immutable for the lifetime of one request.
#[derive(Clone)]
pub struct AuthContext {
    /// Acting user.
    pub user: AuthUser,
    /// Ambient request context supplied by the resolver layer.
    pub request: Value,
    /// Data client handle available to predicates.
    pub client: Arc<dyn DataClient>,
}

impl AuthContext {
    /// Creates a new context.
    #[must_use]
    pub fn new(user: AuthUser, request: Value, client: Arc<dyn DataClient>) -> Self {
        Self {
            user,
            request,
            client,
        }
    }
}

/// Per-call root metadata passed to every predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RootData {
    /// Root field being invoked, e.g. `updateUser`.
    pub root_field: String,
    /// Root operation type.
    pub root_type: RootType,
    /// Raw input arguments of the root call.
    pub inputs: Value,
}

impl RootData {
    /// Creates root data for a call.
    #[must_use]
    pub fn new(root_type: RootType, root_field: impl Into<String>, inputs: Value) -> Self {
        Self {
            root_field: root_field.into(),
            root_type,
            inputs,
        }
    }
}
