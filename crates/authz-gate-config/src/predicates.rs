// crates/authz-gate-config/src/predicates.rs
// ============================================================================
// Module: Predicate Registry
// Description: Name-keyed factories turning config references into predicates.
// Purpose: Resolve `{ predicate = "..." }` field rules at build time.
// Dependencies: authz-gate-core
// ============================================================================

//! ## Overview
//! Configuration refers to predicates by name plus string arguments. The
//! registry maps each name to a factory that validates the arguments and
//! returns a shared predicate. Built-ins cover identity (`is_me`) and
//! ownership (`is_mine`, requiring a `type` argument).
//!
//! ## Invariants
//! - Names are unique; registering a name twice is an error.
//! - Unknown names and bad arguments fail the build, never a request.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use authz_gate_core::IsMe;
use authz_gate_core::IsMine;
use authz_gate_core::SharedPredicate;

use crate::config::ConfigError;

// ============================================================================
// SECTION: Arguments
// ============================================================================

/// String arguments attached to a predicate reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PredicateArgs {
    /// Argument values keyed by argument name.
    values: BTreeMap<String, String>,
}

impl PredicateArgs {
    /// Creates an argument set.
    #[must_use]
    pub const fn new(values: BTreeMap<String, String>) -> Self {
        Self {
            values,
        }
    }

    /// Returns an argument value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Returns a required, non-empty argument value.
    ///
    /// # Errors
    ///
    /// Returns a message naming the missing argument.
    pub fn require(&self, name: &str) -> Result<&str, String> {
        match self.get(name).map(str::trim) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(format!("missing required argument `{name}`")),
        }
    }

    /// Iterates over argument names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Factory building a predicate from its reference arguments.
pub type PredicateFactory =
    Arc<dyn Fn(&PredicateArgs) -> Result<SharedPredicate, String> + Send + Sync>;

/// Predicate factories keyed by name.
#[derive(Clone, Default)]
pub struct PredicateRegistry {
    /// Registered factories.
    factories: BTreeMap<String, PredicateFactory>,
}

impl fmt::Debug for PredicateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateRegistry")
            .field("names", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl PredicateRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Creates a registry with `is_me` and `is_mine` registered.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a built-in name collides.
    pub fn with_builtins() -> Result<Self, ConfigError> {
        let mut registry = Self::new();
        registry.register_builtins()?;
        Ok(registry)
    }

    /// Registers the built-in predicates.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a built-in name is already taken.
    pub fn register_builtins(&mut self) -> Result<(), ConfigError> {
        self.register(
            "is_me",
            Arc::new(|args: &PredicateArgs| -> Result<SharedPredicate, String> {
                reject_extra(args, &[])?;
                Ok(Arc::new(IsMe) as SharedPredicate)
            }),
        )?;
        self.register(
            "is_mine",
            Arc::new(|args: &PredicateArgs| -> Result<SharedPredicate, String> {
                reject_extra(args, &["type"])?;
                let type_name = args.require("type")?;
                Ok(Arc::new(IsMine::new(type_name)) as SharedPredicate)
            }),
        )
    }

    /// Registers a factory under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the name is empty or taken.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: PredicateFactory,
    ) -> Result<(), ConfigError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ConfigError::Invalid("predicate name must be non-empty".to_string()));
        }
        if self.factories.contains_key(&name) {
            return Err(ConfigError::Invalid(format!("predicate {name} is already registered")));
        }
        self.factories.insert(name, factory);
        Ok(())
    }

    /// Registers an argument-free predicate under its own name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the name is empty or taken.
    pub fn register_predicate(&mut self, predicate: SharedPredicate) -> Result<(), ConfigError> {
        let name = predicate.name().to_string();
        self.register(
            name,
            Arc::new(move |args: &PredicateArgs| -> Result<SharedPredicate, String> {
                reject_extra(args, &[])?;
                Ok(Arc::clone(&predicate))
            }),
        )
    }

    /// Returns true when a predicate name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Iterates over registered names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Builds the predicate referenced by `name` with `args`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for unknown names or rejected arguments.
    pub fn resolve(&self, name: &str, args: &PredicateArgs) -> Result<SharedPredicate, ConfigError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| ConfigError::Invalid(format!("unknown predicate: {name}")))?;
        factory(args).map_err(|reason| ConfigError::Invalid(format!("predicate {name}: {reason}")))
    }
}

/// Rejects arguments outside `allowed`.
fn reject_extra(args: &PredicateArgs, allowed: &[&str]) -> Result<(), String> {
    match args.names().find(|name| !allowed.contains(name)) {
        Some(name) => Err(format!("unexpected argument `{name}`")),
        None => Ok(()),
    }
}
