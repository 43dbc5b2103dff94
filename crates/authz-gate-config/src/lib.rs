// crates/authz-gate-config/src/lib.rs
// ============================================================================
// Module: Authz Gate Config Library
// Description: Configuration model for permission mappings and type graphs.
// Purpose: Single source of truth for authz-gate.toml semantics.
// Dependencies: authz-gate-core, serde, toml
// ============================================================================

//! ## Overview
//! `authz-gate-config` loads the permission mapping, the schema type graph,
//! and audit settings from TOML. Validation is strict and fails closed.
//! Named predicates in the mapping are resolved through a
//! [`PredicateRegistry`] when the configuration is built.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod predicates;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use predicates::PredicateArgs;
pub use predicates::PredicateFactory;
pub use predicates::PredicateRegistry;
