// crates/authz-gate-core/src/core/mod.rs
// ============================================================================
// Module: Authz Gate Core Types
// Description: Identifiers, permission model, schema oracle, and verdicts.
// Purpose: Group the data model shared by the runtime and adapters.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Core types are immutable values: permission mappings are built once at
//! startup, request contexts once per call, and verdicts once per check.

pub mod context;
pub mod identifiers;
pub mod permissions;
pub mod schema;
pub mod verdict;

pub use context::AuthContext;
pub use context::AuthUser;
pub use context::RootData;
pub use context::RootType;
pub use identifiers::RoleName;
pub use identifiers::TypeName;
pub use identifiers::UserId;
pub use permissions::AuthMode;
pub use permissions::FieldRule;
pub use permissions::ModeRule;
pub use permissions::PermissionMapping;
pub use permissions::RoleEntry;
pub use permissions::TypePermission;
pub use schema::FieldDefinition;
pub use schema::FieldSignature;
pub use schema::ObjectType;
pub use schema::SchemaLookupError;
pub use schema::TypeGraph;
pub use schema::TypeOracle;
pub use schema::named_type;
pub use verdict::AuthorizationError;
pub use verdict::ROOT_PATH;
pub use verdict::Verdict;
pub use verdict::summarize;
