// crates/authz-gate-client/src/layer.rs
// ============================================================================
// Module: Authorization Layer
// Description: Process-wide wiring of authorizer, schema, client, and audit.
// Purpose: Resolve everything that can fail once, then serve per-user clients.
// Dependencies: authz-gate-config, authz-gate-core
// ============================================================================

//! ## Overview
//! [`AuthorizationLayer::new`] looks up the signature of every query and
//! mutation field the data client exposes. A field missing from the schema
//! fails construction instead of failing its first request.
//! [`AuthorizationLayer::for_user`] resolves the acting role and returns an
//! [`AuthorizedClient`] bound to that user.
//!
//! ## Invariants
//! - Shared state is immutable after construction and behind [`Arc`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use authz_gate_config::AuthzConfig;
use authz_gate_config::PredicateRegistry;
use authz_gate_core::AuthUser;
use authz_gate_core::Authorizer;
use authz_gate_core::DataClient;
use authz_gate_core::FieldSignature;
use authz_gate_core::RootType;
use authz_gate_core::TypeOracle;

use crate::audit::AuthzAuditSink;
use crate::audit::LayerReadyEvent;
use crate::audit::audit_sink_from_config;
use crate::client::AuthorizedClient;
use crate::error::ClientError;

// ============================================================================
// SECTION: Shared State
// ============================================================================

/// State shared by the layer and every client it hands out.
pub(crate) struct LayerState {
    /// Role-resolved authorizer.
    pub(crate) authorizer: Arc<Authorizer>,
    /// Wrapped data client.
    pub(crate) client: Arc<dyn DataClient>,
    /// Cached query field signatures.
    pub(crate) queries: BTreeMap<String, FieldSignature>,
    /// Cached mutation field signatures.
    pub(crate) mutations: BTreeMap<String, FieldSignature>,
    /// Audit sink for decision events.
    pub(crate) audit: Arc<dyn AuthzAuditSink>,
    /// Attach full verdicts to decision events.
    pub(crate) log_verdicts: bool,
}

impl LayerState {
    /// Returns the cached signature of a root field.
    pub(crate) fn signature(&self, root: RootType, field: &str) -> Option<&FieldSignature> {
        match root {
            RootType::Query => self.queries.get(field),
            RootType::Mutation => self.mutations.get(field),
        }
    }
}

// ============================================================================
// SECTION: Layer
// ============================================================================

/// Authorization layer wrapping one data client.
#[derive(Clone)]
pub struct AuthorizationLayer {
    /// Shared layer state.
    state: Arc<LayerState>,
}

impl AuthorizationLayer {
    /// Builds the layer and caches every root field signature.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Schema`] when a field exposed by the client is
    /// missing from the schema or has a malformed type.
    pub fn new(
        authorizer: Arc<Authorizer>,
        oracle: &dyn TypeOracle,
        client: Arc<dyn DataClient>,
        audit: Arc<dyn AuthzAuditSink>,
    ) -> Result<Self, ClientError> {
        Self::assemble(authorizer, oracle, client, audit, false)
    }

    /// Builds the layer from configuration, resolving predicates via `registry`.
    ///
    /// The audit sink and verdict logging follow `config.audit`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the mapping, authorizer, audit sink, or
    /// schema signatures cannot be built.
    pub fn from_config(
        config: &AuthzConfig,
        registry: &PredicateRegistry,
        client: Arc<dyn DataClient>,
    ) -> Result<Self, ClientError> {
        let built = config.build(registry)?;
        let authorizer = Arc::new(Authorizer::new(&built.mapping)?);
        let audit = audit_sink_from_config(&config.audit)
            .map_err(|err| ClientError::AuditSink(err.to_string()))?;
        Self::assemble(authorizer, &built.schema, client, audit, config.audit.log_verdicts)
    }

    /// Caches signatures, announces readiness, and freezes the shared state.
    fn assemble(
        authorizer: Arc<Authorizer>,
        oracle: &dyn TypeOracle,
        client: Arc<dyn DataClient>,
        audit: Arc<dyn AuthzAuditSink>,
        log_verdicts: bool,
    ) -> Result<Self, ClientError> {
        let queries = signatures(oracle, RootType::Query, client.query_fields())?;
        let mutations = signatures(oracle, RootType::Mutation, client.mutation_fields())?;
        audit.record_ready(&LayerReadyEvent::new(
            queries.len(),
            mutations.len(),
            authorizer.roles().map(ToString::to_string).collect(),
        ));
        Ok(Self {
            state: Arc::new(LayerState {
                authorizer,
                client,
                queries,
                mutations,
                audit,
                log_verdicts,
            }),
        })
    }

    /// Returns an authorized client acting as `user`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Role`] when the user's role is not declared.
    pub fn for_user(&self, user: AuthUser) -> Result<AuthorizedClient, ClientError> {
        let permissions = self.state.authorizer.permissions(user.role.as_str())?;
        Ok(AuthorizedClient::new(Arc::clone(&self.state), user, permissions))
    }

    /// Iterates over wrapped query fields.
    pub fn query_fields(&self) -> impl Iterator<Item = &str> {
        self.state.queries.keys().map(String::as_str)
    }

    /// Iterates over wrapped mutation fields.
    pub fn mutation_fields(&self) -> impl Iterator<Item = &str> {
        self.state.mutations.keys().map(String::as_str)
    }

    /// Returns the cached signature of a root field.
    #[must_use]
    pub fn signature(&self, root: RootType, field: &str) -> Option<&FieldSignature> {
        self.state.signature(root, field)
    }
}

/// Looks up the signature of every field under `root`.
fn signatures(
    oracle: &dyn TypeOracle,
    root: RootType,
    fields: Vec<String>,
) -> Result<BTreeMap<String, FieldSignature>, ClientError> {
    fields
        .into_iter()
        .map(|field| {
            let signature = oracle.field_signature(root.as_str(), &field)?;
            Ok((field, signature))
        })
        .collect()
}
