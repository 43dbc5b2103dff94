// crates/authz-gate-config/src/config.rs
// ============================================================================
// Module: Authz Gate Configuration
// Description: Configuration loading, validation, and mapping construction.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: authz-gate-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! It declares roles with their type permissions, the schema type graph the
//! query wrapper consults, and audit sink settings. Missing or invalid
//! configuration fails closed.
//!
//! Mode rules accept three shapes: a boolean, a delegated type name, or a
//! table of field rules. Field rules accept a boolean, a nested type name, or
//! a predicate reference such as `{ predicate = "is_mine", type = "Thing" }`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use authz_gate_core::FieldRule;
use authz_gate_core::ModeRule;
use authz_gate_core::PermissionMapping;
use authz_gate_core::RoleEntry;
use authz_gate_core::RoleName;
use authz_gate_core::TypeGraph;
use authz_gate_core::TypeName;
use authz_gate_core::TypePermission;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::predicates::PredicateArgs;
use crate::predicates::PredicateRegistry;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "authz-gate.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "AUTHZ_GATE_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of declared roles.
pub(crate) const MAX_ROLES: usize = 256;
/// Maximum number of type permissions per role.
pub(crate) const MAX_TYPES_PER_ROLE: usize = 1024;
/// Maximum number of schema types.
pub(crate) const MAX_SCHEMA_TYPES: usize = 4096;
/// Maximum length of role, type, field, and predicate names.
pub(crate) const MAX_NAME_LENGTH: usize = 128;

// ============================================================================
// SECTION: Top-Level Config
// ============================================================================

/// Authz Gate configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthzConfig {
    /// Role declarations keyed by role name.
    #[serde(default)]
    pub roles: BTreeMap<String, RoleConfig>,
    /// Schema type graph used for argument and result type lookups.
    #[serde(default)]
    pub schema: TypeGraph,
    /// Audit logging configuration.
    #[serde(default)]
    pub audit: AuditConfig,
}

/// Permission mapping and type graph built from configuration.
#[derive(Debug, Clone)]
pub struct BuiltConfig {
    /// Permission mapping with predicates resolved.
    pub mapping: PermissionMapping,
    /// Schema type graph.
    pub schema: TypeGraph,
}

impl AuthzConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// The path is taken from `path`, then `AUTHZ_GATE_CONFIG`, then
    /// `authz-gate.toml` in the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::parse(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed TOML and
    /// [`ConfigError::Invalid`] when validation fails.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        if content.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] on the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.roles.is_empty() {
            return Err(ConfigError::Invalid("at least one role must be declared".to_string()));
        }
        if self.roles.len() > MAX_ROLES {
            return Err(ConfigError::Invalid(format!("roles exceed limit of {MAX_ROLES}")));
        }
        for (name, role) in &self.roles {
            validate_name("role", name)?;
            role.validate(name, &self.roles)?;
        }
        self.validate_inheritance()?;
        if self.schema.types.len() > MAX_SCHEMA_TYPES {
            return Err(ConfigError::Invalid(format!(
                "schema types exceed limit of {MAX_SCHEMA_TYPES}"
            )));
        }
        self.schema.validate().map_err(|err| ConfigError::Invalid(format!("schema: {err}")))?;
        self.audit.validate()
    }

    /// Builds the permission mapping, resolving predicates via `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a predicate reference is unknown
    /// or rejects its arguments.
    pub fn build(&self, registry: &PredicateRegistry) -> Result<BuiltConfig, ConfigError> {
        let mut mapping = PermissionMapping::new();
        for (name, role) in &self.roles {
            mapping.insert(RoleName::new(name), role.build(registry)?);
        }
        Ok(BuiltConfig {
            mapping,
            schema: self.schema.clone(),
        })
    }

    /// Rejects inheritance chains that loop back on themselves.
    fn validate_inheritance(&self) -> Result<(), ConfigError> {
        for start in self.roles.keys() {
            let mut seen = BTreeSet::from([start.as_str()]);
            let mut current = start.as_str();
            while let Some(parent) =
                self.roles.get(current).and_then(|role| role.inherits.as_deref())
            {
                if !seen.insert(parent) {
                    return Err(ConfigError::Invalid(format!(
                        "roles.{start}: cyclic inheritance through {parent}"
                    )));
                }
                current = parent;
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Roles
// ============================================================================

/// Role declaration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoleConfig {
    /// Parent role whose permissions are extended.
    #[serde(default)]
    pub inherits: Option<String>,
    /// Type permissions keyed by schema type name.
    #[serde(default)]
    pub permissions: BTreeMap<String, TypePermissionConfig>,
}

impl RoleConfig {
    /// Validates the role declaration.
    fn validate(&self, name: &str, roles: &BTreeMap<String, Self>) -> Result<(), ConfigError> {
        if let Some(parent) = &self.inherits
            && !roles.contains_key(parent)
        {
            return Err(ConfigError::Invalid(format!(
                "roles.{name}.inherits references unknown role {parent}"
            )));
        }
        if self.permissions.len() > MAX_TYPES_PER_ROLE {
            return Err(ConfigError::Invalid(format!(
                "roles.{name}.permissions exceed limit of {MAX_TYPES_PER_ROLE}"
            )));
        }
        for (type_name, permission) in &self.permissions {
            validate_name("type", type_name)?;
            let field = format!("roles.{name}.permissions.{type_name}");
            if let Some(rule) = &permission.read {
                rule.validate(&format!("{field}.read"))?;
            }
            if let Some(rule) = &permission.write {
                rule.validate(&format!("{field}.write"))?;
            }
        }
        Ok(())
    }

    /// Builds the runtime role entry.
    fn build(&self, registry: &PredicateRegistry) -> Result<RoleEntry, ConfigError> {
        let mut entry = RoleEntry::new();
        entry.inherits = self.inherits.as_deref().map(RoleName::new);
        for (type_name, permission) in &self.permissions {
            let built = TypePermission {
                read: permission.read.as_ref().map(|rule| rule.build(registry)).transpose()?,
                write: permission.write.as_ref().map(|rule| rule.build(registry)).transpose()?,
            };
            entry.permissions.insert(TypeName::new(type_name), built);
        }
        Ok(entry)
    }
}

/// Read and write rules for one type.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypePermissionConfig {
    /// Rule applied when reading response data.
    #[serde(default)]
    pub read: Option<ModeRuleConfig>,
    /// Rule applied when validating input data.
    #[serde(default)]
    pub write: Option<ModeRuleConfig>,
}

/// Mode rule as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ModeRuleConfig {
    /// Type-wide literal.
    Literal(bool),
    /// Delegate to another type's rule for the same mode.
    Delegate(String),
    /// Per-field rules.
    Fields(BTreeMap<String, FieldRuleConfig>),
}

impl ModeRuleConfig {
    /// Validates names referenced by the rule.
    fn validate(&self, field: &str) -> Result<(), ConfigError> {
        match self {
            Self::Literal(_) => Ok(()),
            Self::Delegate(target) => validate_name(field, target),
            Self::Fields(fields) => {
                for (name, rule) in fields {
                    validate_name(field, name)?;
                    rule.validate(&format!("{field}.{name}"))?;
                }
                Ok(())
            }
        }
    }

    /// Builds the runtime mode rule.
    fn build(&self, registry: &PredicateRegistry) -> Result<ModeRule, ConfigError> {
        match self {
            Self::Literal(allowed) => Ok(ModeRule::All(*allowed)),
            Self::Delegate(target) => Ok(ModeRule::delegate(target.as_str())),
            Self::Fields(fields) => fields
                .iter()
                .map(|(name, rule)| Ok((name.clone(), rule.build(registry)?)))
                .collect::<Result<BTreeMap<_, _>, ConfigError>>()
                .map(ModeRule::Fields),
        }
    }
}

/// Field rule as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FieldRuleConfig {
    /// Static allow or deny.
    Literal(bool),
    /// Recurse into the value using the named type.
    Nested(String),
    /// Named predicate reference.
    Predicate(PredicateRefConfig),
}

impl FieldRuleConfig {
    /// Validates names referenced by the rule.
    fn validate(&self, field: &str) -> Result<(), ConfigError> {
        match self {
            Self::Literal(_) => Ok(()),
            Self::Nested(target) => validate_name(field, target),
            Self::Predicate(reference) => validate_name(field, &reference.predicate),
        }
    }

    /// Builds the runtime field rule.
    fn build(&self, registry: &PredicateRegistry) -> Result<FieldRule, ConfigError> {
        match self {
            Self::Literal(allowed) => Ok(FieldRule::Static(*allowed)),
            Self::Nested(target) => Ok(FieldRule::nested(target.as_str())),
            Self::Predicate(reference) => {
                let args = PredicateArgs::new(reference.args.clone());
                registry.resolve(&reference.predicate, &args).map(FieldRule::Predicate)
            }
        }
    }
}

/// Predicate reference with string arguments.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PredicateRefConfig {
    /// Registered predicate name.
    pub predicate: String,
    /// Remaining keys, passed to the predicate factory.
    #[serde(flatten)]
    pub args: BTreeMap<String, String>,
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Audit logging configuration for authorization decisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Enable structured audit logging.
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,
    /// Optional audit log path (JSON lines); stderr when unset.
    #[serde(default)]
    pub path: Option<String>,
    /// Include full verdict payloads in decision events (explicit opt-in).
    #[serde(default)]
    pub log_verdicts: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_audit_enabled(),
            path: None,
            log_verdicts: false,
        }
    }
}

impl AuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            validate_path_string("audit.path", path)?;
        }
        Ok(())
    }
}

/// Default audit logging enabled.
const fn default_audit_enabled() -> bool {
    true
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from input or environment.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates a role, type, field, or predicate name.
fn validate_name(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{field} names must be non-empty")));
    }
    if value.len() > MAX_NAME_LENGTH {
        return Err(ConfigError::Invalid(format!(
            "{field} name {value} exceeds {MAX_NAME_LENGTH} bytes"
        )));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(ConfigError::Invalid(format!("{field} name `{value}` contains whitespace")));
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
