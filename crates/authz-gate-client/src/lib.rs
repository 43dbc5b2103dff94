// crates/authz-gate-client/src/lib.rs
// ============================================================================
// Module: Authz Gate Client Library
// Description: Authorization layer and per-user authorized data clients.
// Purpose: Enforce field-level permissions around every query and mutation.
// Dependencies: authz-gate-core, authz-gate-config
// ============================================================================

//! ## Overview
//! The authorization layer is built once from an authorizer, a type oracle,
//! and the wrapped data client. It caches the signature of every root field
//! the client exposes, then hands out [`AuthorizedClient`] values per user.
//! Each call validates mutation inputs under `write`, delegates to the data
//! client, and validates the response under `read`. Every decision is
//! recorded through an [`AuthzAuditSink`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod client;
pub mod error;
pub mod layer;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AuthzAuditSink;
pub use audit::AuthzDecisionEvent;
pub use audit::AuthzDecisionEventParams;
pub use audit::DecisionPhase;
pub use audit::FileAuditSink;
pub use audit::LayerReadyEvent;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use audit::audit_sink_from_config;
pub use client::AuthorizedClient;
pub use error::ClientError;
pub use layer::AuthorizationLayer;
