// crates/authz-gate-core/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Shared permission mappings and data client doubles.
// Purpose: Provide deterministic fixtures for authorizer integration tests.
// Dependencies: authz-gate-core, async-trait, serde_json
// ============================================================================

//! ## Overview
//! Fixtures mirror a small two-role application: `ANONYMOUS` can read public
//! user fields, and `USER` inherits from it while adding identity and
//! ownership checked rules for users and things.

#![allow(dead_code, reason = "Shared test helpers are selectively used across suites.")]
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::unwrap_in_result,
    reason = "Test fixtures favor direct unwraps for setup clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use authz_gate_core::AuthContext;
use authz_gate_core::AuthUser;
use authz_gate_core::DataClient;
use authz_gate_core::DataClientError;
use authz_gate_core::FieldRule;
use authz_gate_core::IsMe;
use authz_gate_core::IsMine;
use authz_gate_core::ModeRule;
use authz_gate_core::PermissionMapping;
use authz_gate_core::RoleEntry;
use authz_gate_core::RootData;
use authz_gate_core::RootType;
use authz_gate_core::TypePermission;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Permission Fixtures
// ============================================================================

/// Anonymous role name.
pub const ANONYMOUS: &str = "ANONYMOUS";
/// Signed-in role name.
pub const USER: &str = "USER";

/// Builds the two-role fixture mapping.
pub fn fixture_mapping() -> PermissionMapping {
    let anonymous = RoleEntry::new().with_type(
        "User",
        TypePermission::new()
            .with_read(ModeRule::fields([("id", FieldRule::allow()), ("name", FieldRule::allow())])),
    );
    let user = RoleEntry::new()
        .inherits(ANONYMOUS)
        .with_type(
            "User",
            TypePermission::new()
                .with_read(ModeRule::fields([("email", FieldRule::predicate(Arc::new(IsMe)))]))
                .with_write(ModeRule::fields([("name", FieldRule::predicate(Arc::new(IsMe)))])),
        )
        .with_type("UserCreateInput", TypePermission::new().with_write(ModeRule::delegate("User")))
        .with_type(
            "UserWhereUniqueInput",
            TypePermission::new().with_write(ModeRule::fields([("id", FieldRule::allow())])),
        )
        .with_type(
            "Thing",
            TypePermission::new()
                .with_read(ModeRule::fields([
                    ("foo", FieldRule::allow()),
                    ("bar", FieldRule::predicate(Arc::new(IsMine::new("Thing")))),
                ]))
                .with_write(ModeRule::fields([("foo", FieldRule::allow())])),
        )
        .with_type(
            "ThingCreateInput",
            TypePermission::new().with_write(ModeRule::delegate("Thing")),
        );
    PermissionMapping::new().with_role(ANONYMOUS, anonymous).with_role(USER, user)
}

// ============================================================================
// SECTION: Data Client Double
// ============================================================================

/// Recorded `exists` lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistsCall {
    /// Type looked up.
    pub type_name: String,
    /// Filter sent.
    pub filter: Value,
}

/// In-memory data client with canned responses and ownership records.
#[derive(Default)]
pub struct MockDataClient {
    /// Canned responses keyed by root field.
    responses: BTreeMap<String, Value>,
    /// Owned records as `(type, record id, owner id)`.
    owned: Vec<(String, String, String)>,
    /// Root fields executed, in order.
    pub executed: Mutex<Vec<String>>,
    /// Ownership lookups issued, in order.
    pub lookups: Mutex<Vec<ExistsCall>>,
    /// Fails every ownership lookup when set.
    pub fail_lookups: bool,
}

impl MockDataClient {
    /// Creates an empty client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a canned response for a root field.
    pub fn with_response(mut self, field: &str, value: Value) -> Self {
        self.responses.insert(field.to_string(), value);
        self
    }

    /// Records that `owner` owns `type_name` record `id`.
    pub fn with_owned(mut self, type_name: &str, id: &str, owner: &str) -> Self {
        self.owned.push((type_name.to_string(), id.to_string(), owner.to_string()));
        self
    }

    /// Makes every ownership lookup fail.
    pub fn failing_lookups(mut self) -> Self {
        self.fail_lookups = true;
        self
    }

    /// Returns the executed root fields.
    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().expect("executed lock").clone()
    }

    /// Returns the ownership lookups issued.
    pub fn lookups(&self) -> Vec<ExistsCall> {
        self.lookups.lock().expect("lookups lock").clone()
    }
}

#[async_trait]
impl DataClient for MockDataClient {
    fn query_fields(&self) -> Vec<String> {
        vec!["user".to_string(), "users".to_string(), "thing".to_string()]
    }

    fn mutation_fields(&self) -> Vec<String> {
        vec!["createUser".to_string(), "updateUser".to_string(), "createThing".to_string()]
    }

    async fn execute(
        &self,
        root: RootType,
        field: &str,
        _inputs: &Value,
        _selection: &str,
    ) -> Result<Value, DataClientError> {
        self.executed.lock().expect("executed lock").push(field.to_string());
        self.responses.get(field).cloned().ok_or_else(|| DataClientError::UnknownField {
            root,
            field: field.to_string(),
        })
    }

    async fn exists(&self, type_name: &str, filter: &Value) -> Result<bool, DataClientError> {
        self.lookups.lock().expect("lookups lock").push(ExistsCall {
            type_name: type_name.to_string(),
            filter: filter.clone(),
        });
        if self.fail_lookups {
            return Err(DataClientError::Backend("lookup unavailable".to_string()));
        }
        let id = filter.get("id").and_then(Value::as_str);
        let owner = filter.pointer("/user/id").and_then(Value::as_str);
        Ok(self.owned.iter().any(|(kind, record, holder)| {
            kind == type_name && Some(record.as_str()) == id && Some(holder.as_str()) == owner
        }))
    }

    async fn request(&self, query: &str, variables: &Value) -> Result<Value, DataClientError> {
        Ok(json!({ "query": query, "variables": variables }))
    }
}

// ============================================================================
// SECTION: Context Helpers
// ============================================================================

/// Builds a context for `user_id` acting as `role`.
pub fn context(user_id: &str, role: &str, client: Arc<MockDataClient>) -> AuthContext {
    AuthContext::new(AuthUser::new(user_id, role), Value::Null, client)
}

/// Builds query root data with no inputs.
pub fn query_root(field: &str) -> RootData {
    RootData::new(RootType::Query, field, json!({}))
}

/// Builds mutation root data with the given inputs.
pub fn mutation_root(field: &str, inputs: Value) -> RootData {
    RootData::new(RootType::Mutation, field, inputs)
}
