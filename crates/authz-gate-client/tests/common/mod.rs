// crates/authz-gate-client/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Schema, permissions, data client, and audit doubles.
// Purpose: Drive the authorization layer end to end without a backend.
// Dependencies: authz-gate-client, authz-gate-core, async-trait, serde_json
// ============================================================================

//! ## Overview
//! Fixtures model a small user directory: `ANONYMOUS` reads public user
//! fields, `USER` inherits that and may read its own email, rename itself,
//! and read the private half of things it owns.

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
use authz_gate_client::AuthorizationLayer;
use authz_gate_client::AuthzAuditSink;
use authz_gate_client::AuthzDecisionEvent;
use authz_gate_client::LayerReadyEvent;
use authz_gate_core::Authorizer;
use authz_gate_core::DataClient;
use authz_gate_core::DataClientError;
use authz_gate_core::FieldRule;
use authz_gate_core::IsMe;
use authz_gate_core::IsMine;
use authz_gate_core::ModeRule;
use authz_gate_core::PermissionMapping;
use authz_gate_core::RoleEntry;
use authz_gate_core::RootType;
use authz_gate_core::TypeGraph;
use authz_gate_core::TypePermission;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Fixtures
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
        .with_type("UserUpdateInput", TypePermission::new().with_write(ModeRule::delegate("User")))
        .with_type(
            "UserWhereUniqueInput",
            TypePermission::new().with_write(ModeRule::fields([("id", FieldRule::allow())])),
        )
        .with_type(
            "Thing",
            TypePermission::new().with_read(ModeRule::fields([
                ("foo", FieldRule::allow()),
                ("bar", FieldRule::predicate(Arc::new(IsMine::new("Thing")))),
            ])),
        );
    PermissionMapping::new().with_role(ANONYMOUS, anonymous).with_role(USER, user)
}

/// Builds the schema covering every root field of [`MockDataClient`].
pub fn fixture_schema() -> TypeGraph {
    let none: [(&str, &str); 0] = [];
    TypeGraph::new()
        .with_field("Query", "user", "User", [("where", "UserWhereUniqueInput!")])
        .with_field("Query", "users", "[User!]!", none)
        .with_field("Query", "thing", "Thing", [("where", "ThingWhereUniqueInput!")])
        .with_field("Mutation", "createUser", "User!", [("data", "UserCreateInput!")])
        .with_field("Mutation", "updateUser", "User", [
            ("data", "UserUpdateInput!"),
            ("where", "UserWhereUniqueInput!"),
        ])
}

/// Builds a layer over `client` recording into `audit`.
pub fn layer(client: Arc<MockDataClient>, audit: Arc<RecordingAuditSink>) -> AuthorizationLayer {
    let authorizer = Arc::new(Authorizer::new(&fixture_mapping()).expect("authorizer"));
    AuthorizationLayer::new(authorizer, &fixture_schema(), client, audit).expect("layer")
}

// ============================================================================
// SECTION: Data Client Double
// ============================================================================

/// In-memory data client with canned responses and ownership records.
#[derive(Default)]
pub struct MockDataClient {
    /// Canned responses keyed by root field.
    responses: BTreeMap<String, Value>,
    /// Owned records as `(type, record id, owner id)`.
    owned: Vec<(String, String, String)>,
    /// Extra mutation field not declared in the schema.
    extra_mutation: Option<String>,
    /// Root fields executed with their inputs, in order.
    executed: Mutex<Vec<(String, Value)>>,
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

    /// Exposes a mutation field the schema does not declare.
    pub fn with_extra_mutation(mut self, field: &str) -> Self {
        self.extra_mutation = Some(field.to_string());
        self
    }

    /// Returns the executed root fields.
    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().expect("executed lock").iter().map(|(field, _)| field.clone()).collect()
    }

    /// Returns the inputs forwarded with each execution.
    pub fn executed_inputs(&self) -> Vec<Value> {
        self.executed.lock().expect("executed lock").iter().map(|(_, inputs)| inputs.clone()).collect()
    }
}

#[async_trait]
impl DataClient for MockDataClient {
    fn query_fields(&self) -> Vec<String> {
        vec!["user".to_string(), "users".to_string(), "thing".to_string()]
    }

    fn mutation_fields(&self) -> Vec<String> {
        let mut fields = vec!["createUser".to_string(), "updateUser".to_string()];
        fields.extend(self.extra_mutation.clone());
        fields
    }

    async fn execute(
        &self,
        root: RootType,
        field: &str,
        inputs: &Value,
        _selection: &str,
    ) -> Result<Value, DataClientError> {
        self.executed.lock().expect("executed lock").push((field.to_string(), inputs.clone()));
        self.responses.get(field).cloned().ok_or_else(|| {
            DataClientError::Backend(format!("no response for {root}.{field}"))
        })
    }

    async fn exists(&self, type_name: &str, filter: &Value) -> Result<bool, DataClientError> {
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
// SECTION: Audit Double
// ============================================================================

/// Audit sink that keeps every event in memory.
#[derive(Default)]
pub struct RecordingAuditSink {
    /// Recorded decision events.
    decisions: Mutex<Vec<AuthzDecisionEvent>>,
    /// Recorded layer-ready events.
    ready: Mutex<Vec<LayerReadyEvent>>,
}

impl RecordingAuditSink {
    /// Returns recorded decision events.
    pub fn decisions(&self) -> Vec<AuthzDecisionEvent> {
        self.decisions.lock().expect("decisions lock").clone()
    }

    /// Returns recorded layer-ready events.
    pub fn ready(&self) -> Vec<LayerReadyEvent> {
        self.ready.lock().expect("ready lock").clone()
    }
}

impl AuthzAuditSink for RecordingAuditSink {
    fn record_decision(&self, event: &AuthzDecisionEvent) {
        self.decisions.lock().expect("decisions lock").push(event.clone());
    }

    fn record_ready(&self, event: &LayerReadyEvent) {
        self.ready.lock().expect("ready lock").push(event.clone());
    }
}
