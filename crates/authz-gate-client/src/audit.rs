// crates/authz-gate-client/src/audit.rs
// ============================================================================
// Module: Authorization Audit Logging
// Description: Structured audit events for authorization decisions.
// Purpose: Emit JSON-line decision logs without hard dependencies.
// Dependencies: authz-gate-config, authz-gate-core, serde, serde_json
// ============================================================================

//! ## Overview
//! Every input and response check produces an [`AuthzDecisionEvent`] naming
//! the root call, the acting user, the outcome, and the dotted paths of denied
//! fields. Full verdict payloads are only attached when explicitly enabled.
//! Sinks are lightweight so deployments can route events to their preferred
//! logging pipeline.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use authz_gate_config::AuditConfig;
use authz_gate_core::RoleName;
use authz_gate_core::RootType;
use authz_gate_core::UserId;
use serde::Serialize;
use serde_json::Value;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Phase of a root call that was authorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionPhase {
    /// Mutation inputs checked under `write`.
    Input,
    /// Response data checked under `read`.
    Response,
}

/// Authorization decision audit event.
#[derive(Debug, Clone, Serialize)]
pub struct AuthzDecisionEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Root operation type.
    pub root_type: RootType,
    /// Root field invoked.
    pub root_field: String,
    /// Acting user.
    pub user_id: UserId,
    /// Acting role.
    pub role: RoleName,
    /// Checked phase.
    pub phase: DecisionPhase,
    /// Summarized outcome.
    pub allowed: bool,
    /// Dotted paths of denied fields.
    pub denied_paths: Vec<String>,
    /// Full verdict when verdict logging is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<Value>,
}

/// Inputs required to construct a decision event.
pub struct AuthzDecisionEventParams {
    /// Root operation type.
    pub root_type: RootType,
    /// Root field invoked.
    pub root_field: String,
    /// Acting user.
    pub user_id: UserId,
    /// Acting role.
    pub role: RoleName,
    /// Checked phase.
    pub phase: DecisionPhase,
    /// Summarized outcome.
    pub allowed: bool,
    /// Dotted paths of denied fields.
    pub denied_paths: Vec<String>,
    /// Full verdict when verdict logging is enabled.
    pub verdict: Option<Value>,
}

impl AuthzDecisionEvent {
    /// Creates a new decision event with a consistent timestamp.
    #[must_use]
    pub fn new(params: AuthzDecisionEventParams) -> Self {
        Self {
            event: "authz_decision",
            timestamp_ms: now_ms(),
            root_type: params.root_type,
            root_field: params.root_field,
            user_id: params.user_id,
            role: params.role,
            phase: params.phase,
            allowed: params.allowed,
            denied_paths: params.denied_paths,
            verdict: params.verdict,
        }
    }
}

/// Layer construction audit event.
#[derive(Debug, Clone, Serialize)]
pub struct LayerReadyEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Number of wrapped query fields.
    pub query_fields: usize,
    /// Number of wrapped mutation fields.
    pub mutation_fields: usize,
    /// Declared roles.
    pub roles: Vec<String>,
}

impl LayerReadyEvent {
    /// Creates a new layer-ready event with a consistent timestamp.
    #[must_use]
    pub fn new(query_fields: usize, mutation_fields: usize, roles: Vec<String>) -> Self {
        Self {
            event: "authz_layer_ready",
            timestamp_ms: now_ms(),
            query_fields,
            mutation_fields,
            roles,
        }
    }
}

/// Returns the current time in milliseconds since the epoch.
fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for authorization events.
pub trait AuthzAuditSink: Send + Sync {
    /// Record a decision event.
    fn record_decision(&self, event: &AuthzDecisionEvent);

    /// Record a layer-ready event.
    fn record_ready(&self, _event: &LayerReadyEvent) {}
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl AuthzAuditSink for StderrAuditSink {
    fn record_decision(&self, event: &AuthzDecisionEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(io::stderr(), "{payload}");
        }
    }

    fn record_ready(&self, event: &LayerReadyEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Appends one serialized event.
    fn append<T: Serialize>(&self, event: &T) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

impl AuthzAuditSink for FileAuditSink {
    fn record_decision(&self, event: &AuthzDecisionEvent) {
        self.append(event);
    }

    fn record_ready(&self, event: &LayerReadyEvent) {
        self.append(event);
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl AuthzAuditSink for NoopAuditSink {
    fn record_decision(&self, _event: &AuthzDecisionEvent) {}
}

// ============================================================================
// SECTION: Wiring
// ============================================================================

/// Builds the sink selected by audit configuration.
///
/// Disabled audit yields [`NoopAuditSink`]; an unset path logs to stderr.
///
/// # Errors
///
/// Returns an error if the configured audit file cannot be opened.
pub fn audit_sink_from_config(config: &AuditConfig) -> io::Result<Arc<dyn AuthzAuditSink>> {
    if !config.enabled {
        return Ok(Arc::new(NoopAuditSink));
    }
    match config.path.as_deref() {
        Some(path) => Ok(Arc::new(FileAuditSink::new(Path::new(path.trim()))?)),
        None => Ok(Arc::new(StderrAuditSink)),
    }
}
