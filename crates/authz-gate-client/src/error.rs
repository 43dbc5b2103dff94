// crates/authz-gate-client/src/error.rs
// ============================================================================
// Module: Client Errors
// Description: Error surface of the authorization layer and wrapped clients.
// Purpose: Separate denials from misconfiguration and data client failures.
// Dependencies: authz-gate-config, authz-gate-core, thiserror
// ============================================================================

//! ## Overview
//! [`ClientError::Unauthorized`] is the only per-request denial. Schema, role,
//! and build failures indicate misconfiguration. Data client failures pass
//! through unmodified.

use authz_gate_config::ConfigError;
use authz_gate_core::AuthorizationError;
use authz_gate_core::AuthorizeError;
use authz_gate_core::BuildError;
use authz_gate_core::DataClientError;
use authz_gate_core::RoleError;
use authz_gate_core::SchemaLookupError;
use thiserror::Error;

/// Authorization layer and authorized client errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// At least one checked field was denied.
    #[error(transparent)]
    Unauthorized(#[from] AuthorizationError),
    /// A root field could not be resolved in the schema.
    #[error(transparent)]
    Schema(#[from] SchemaLookupError),
    /// The acting role could not be resolved.
    #[error(transparent)]
    Role(#[from] RoleError),
    /// Rule evaluation failed.
    #[error(transparent)]
    Authorize(#[from] AuthorizeError),
    /// The authorizer could not be built.
    #[error(transparent)]
    Build(#[from] BuildError),
    /// Configuration could not be turned into a layer.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The configured audit sink could not be opened.
    #[error("audit sink unavailable: {0}")]
    AuditSink(String),
    /// The wrapped data client failed.
    #[error(transparent)]
    Data(#[from] DataClientError),
}

impl ClientError {
    /// Returns the authorization failure, if this is a denial.
    #[must_use]
    pub const fn as_unauthorized(&self) -> Option<&AuthorizationError> {
        match self {
            Self::Unauthorized(error) => Some(error),
            _ => None,
        }
    }
}
