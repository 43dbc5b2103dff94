// crates/authz-gate-client/src/client.rs
// ============================================================================
// Module: Authorized Client
// Description: Per-user wrapper enforcing field permissions on every call.
// Purpose: Validate mutation inputs and responses around the data client.
// Dependencies: authz-gate-core, futures, serde_json
// ============================================================================

//! ## Overview
//! A query is delegated to the data client and its response is checked under
//! `read`. A mutation first checks every input argument under `write` using
//! the argument's declared type, and only runs when all inputs pass. Any
//! failed check raises [`ClientError::Unauthorized`] carrying the detailed
//! verdict; passing responses are returned unchanged.
//!
//! Input arguments that the schema does not declare are denied. `exists` and
//! `request` pass through without checks.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use authz_gate_core::AuthContext;
use authz_gate_core::AuthMode;
use authz_gate_core::AuthUser;
use authz_gate_core::AuthorizationError;
use authz_gate_core::DataClientError;
use authz_gate_core::EffectivePermissions;
use authz_gate_core::FieldSignature;
use authz_gate_core::RootData;
use authz_gate_core::RootType;
use authz_gate_core::Verdict;
use futures::future::join_all;
use serde_json::Value;

use crate::audit::AuthzDecisionEvent;
use crate::audit::AuthzDecisionEventParams;
use crate::audit::DecisionPhase;
use crate::error::ClientError;
use crate::layer::LayerState;

// ============================================================================
// SECTION: Client
// ============================================================================

/// Data client wrapper bound to one acting user.
#[derive(Clone)]
pub struct AuthorizedClient {
    /// Shared layer state.
    layer: Arc<LayerState>,
    /// Acting user.
    user: AuthUser,
    /// Effective permissions of the user's role.
    permissions: Arc<EffectivePermissions>,
}

impl AuthorizedClient {
    /// Creates a client for `user`.
    pub(crate) const fn new(
        layer: Arc<LayerState>,
        user: AuthUser,
        permissions: Arc<EffectivePermissions>,
    ) -> Self {
        Self {
            layer,
            user,
            permissions,
        }
    }

    /// Returns the acting user.
    #[must_use]
    pub const fn user(&self) -> &AuthUser {
        &self.user
    }

    /// Runs a query and checks its response under `read`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Unauthorized`] when any response field is
    /// denied, and passes data client failures through.
    pub async fn query(
        &self,
        field: &str,
        inputs: Value,
        selection: &str,
        request: Value,
    ) -> Result<Value, ClientError> {
        self.call(RootType::Query, field, inputs, selection, request).await
    }

    /// Checks inputs under `write`, runs a mutation, and checks its response.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Unauthorized`] when any input or response field
    /// is denied; the mutation is not run when inputs are denied.
    pub async fn mutation(
        &self,
        field: &str,
        inputs: Value,
        selection: &str,
        request: Value,
    ) -> Result<Value, ClientError> {
        self.call(RootType::Mutation, field, inputs, selection, request).await
    }

    /// Checks existence of a record without authorization.
    ///
    /// # Errors
    ///
    /// Passes data client failures through.
    pub async fn exists(&self, type_name: &str, filter: &Value) -> Result<bool, ClientError> {
        Ok(self.layer.client.exists(type_name, filter).await?)
    }

    /// Sends a raw request without authorization.
    ///
    /// # Errors
    ///
    /// Passes data client failures through.
    pub async fn request(&self, query: &str, variables: &Value) -> Result<Value, ClientError> {
        Ok(self.layer.client.request(query, variables).await?)
    }

    /// Authorizes and executes one root call.
    async fn call(
        &self,
        root: RootType,
        field: &str,
        inputs: Value,
        selection: &str,
        request: Value,
    ) -> Result<Value, ClientError> {
        let signature = self.layer.signature(root, field).ok_or_else(|| {
            DataClientError::UnknownField {
                root,
                field: field.to_string(),
            }
        })?;
        let context = AuthContext::new(self.user.clone(), request, Arc::clone(&self.layer.client));
        let root_data = RootData::new(root, field, inputs);
        if root == RootType::Mutation {
            let verdict = self.authorize_inputs(signature, &context, &root_data).await?;
            self.enforce(&root_data, DecisionPhase::Input, verdict)?;
        }
        let response =
            self.layer.client.execute(root, field, &root_data.inputs, selection).await?;
        let verdict = self
            .permissions
            .authorize(&signature.result, AuthMode::Read, &response, &context, &root_data)
            .await?;
        self.enforce(&root_data, DecisionPhase::Response, verdict)?;
        Ok(response)
    }

    /// Checks every input argument concurrently under `write`.
    async fn authorize_inputs(
        &self,
        signature: &FieldSignature,
        context: &AuthContext,
        root_data: &RootData,
    ) -> Result<Verdict, ClientError> {
        let arguments = match &root_data.inputs {
            Value::Null => return Ok(Verdict::Record(Vec::new())),
            Value::Object(arguments) => arguments,
            Value::Bool(_) | Value::Number(_) | Value::String(_) | Value::Array(_) => {
                return Ok(Verdict::Bool(false));
            }
        };
        let mut names = Vec::with_capacity(arguments.len());
        let mut pending = Vec::with_capacity(arguments.len());
        for (name, value) in arguments {
            names.push(name.clone());
            pending.push(async move {
                match signature.arguments.get(name) {
                    Some(type_name) => {
                        self.permissions
                            .authorize(type_name, AuthMode::Write, value, context, root_data)
                            .await
                    }
                    None => Ok(Verdict::Bool(value.is_null())),
                }
            });
        }
        let verdicts = join_all(pending).await;
        let mut fields = Vec::with_capacity(names.len());
        for (name, verdict) in names.into_iter().zip(verdicts) {
            fields.push((name, verdict?));
        }
        Ok(Verdict::Record(fields))
    }

    /// Records the decision and fails when the verdict denies anything.
    fn enforce(
        &self,
        root_data: &RootData,
        phase: DecisionPhase,
        verdict: Verdict,
    ) -> Result<(), ClientError> {
        let allowed = verdict.is_allowed();
        self.layer.audit.record_decision(&AuthzDecisionEvent::new(AuthzDecisionEventParams {
            root_type: root_data.root_type,
            root_field: root_data.root_field.clone(),
            user_id: self.user.id.clone(),
            role: self.user.role.clone(),
            phase,
            allowed,
            denied_paths: verdict.denied_paths(),
            verdict: self.layer.log_verdicts.then(|| verdict.to_value()),
        }));
        if allowed {
            Ok(())
        } else {
            Err(AuthorizationError::new(verdict).into())
        }
    }
}
