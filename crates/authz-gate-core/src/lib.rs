// crates/authz-gate-core/src/lib.rs
// ============================================================================
// Module: Authz Gate Core Library
// Description: Public API surface for the Authz Gate core.
// Purpose: Expose permission types, interfaces, and the field authorizer.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Authz Gate core evaluates role-keyed, field-level read/write permissions
//! against arbitrary nested data. It resolves role inheritance, consults a
//! schema type oracle for argument and result types, invokes async
//! predicates, and produces nested verdicts that mirror the checked data.
//! It is client-agnostic and integrates through explicit interfaces.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use self::core::*;

pub use interfaces::DataClient;
pub use interfaces::DataClientError;
pub use interfaces::FieldPredicate;
pub use interfaces::PredicateError;
pub use interfaces::PredicateFn;
pub use interfaces::PredicateInput;
pub use interfaces::SharedPredicate;
pub use interfaces::predicate_fn;
pub use runtime::AuthorizeError;
pub use runtime::Authorizer;
pub use runtime::BuildError;
pub use runtime::EffectivePermissions;
pub use runtime::IsMe;
pub use runtime::IsMine;
pub use runtime::ResolvedRule;
pub use runtime::RoleError;
pub use runtime::effective_permissions;
pub use runtime::resolve_all;
