// crates/authz-gate-core/src/runtime/mod.rs
// ============================================================================
// Module: Authz Gate Runtime
// Description: Role resolution, rule evaluation, and built-in predicates.
// Purpose: Turn a permission mapping into verdicts over concrete data.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! The runtime resolves role inheritance once, validates delegating rules, and
//! evaluates data against the resulting effective permissions.

pub mod authorizer;
pub mod predicates;
pub mod roles;

pub use authorizer::AuthorizeError;
pub use authorizer::Authorizer;
pub use authorizer::BuildError;
pub use authorizer::ResolvedRule;
pub use predicates::IsMe;
pub use predicates::IsMine;
pub use roles::EffectivePermissions;
pub use roles::RoleError;
pub use roles::effective_permissions;
pub use roles::resolve_all;
