// crates/authz-gate-core/src/core/schema.rs
// ============================================================================
// Module: Schema Type Oracle
// Description: Structured type graph and field signature lookups.
// Purpose: Resolve root field argument and result types as bare type names.
// Dependencies: crate::core::identifiers, serde, thiserror
// ============================================================================

//! ## Overview
//! The authorizer never parses schema text. It consumes a [`TypeOracle`]
//! that answers two questions for a `(root type, field)` pair: the declared
//! argument types and the result type. Both are returned as bare names with
//! list and non-null wrappers stripped (`[User!]!` becomes `User`).
//!
//! [`TypeGraph`] is the bundled oracle: a serde-friendly map of object types to
//! field definitions that can be loaded from configuration.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::identifiers::TypeName;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Schema lookup failures.
///
/// # Invariants
/// - These indicate misconfiguration and are never caused by request data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaLookupError {
    /// The root type is not declared in the type graph.
    #[error("unknown schema type: {0}")]
    UnknownType(String),
    /// The field is not declared on the root type.
    #[error("unknown field {field} on schema type {type_name}")]
    UnknownField {
        /// Type that was searched.
        type_name: String,
        /// Missing field name.
        field: String,
    },
    /// A type reference could not be reduced to a named type.
    #[error("invalid type reference `{type_ref}`: {reason}")]
    InvalidTypeRef {
        /// Raw type reference text.
        type_ref: String,
        /// Reason the reference was rejected.
        reason: &'static str,
    },
}

// ============================================================================
// SECTION: Oracle Trait
// ============================================================================

/// Argument and result types of one root field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSignature {
    /// Argument name to bare argument type.
    pub arguments: BTreeMap<String, TypeName>,
    /// Bare result type.
    pub result: TypeName,
}

/// Schema lookup abstraction used by the query wrapper.
pub trait TypeOracle: Send + Sync {
    /// Returns the bare argument types of `root_type.field`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaLookupError`] when the type or field is unknown.
    fn field_argument_types(
        &self,
        root_type: &str,
        field: &str,
    ) -> Result<BTreeMap<String, TypeName>, SchemaLookupError>;

    /// Returns the bare result type of `root_type.field`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaLookupError`] when the type or field is unknown.
    fn field_result_type(&self, root_type: &str, field: &str)
    -> Result<TypeName, SchemaLookupError>;

    /// Returns both argument and result types of `root_type.field`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaLookupError`] when the type or field is unknown.
    fn field_signature(
        &self,
        root_type: &str,
        field: &str,
    ) -> Result<FieldSignature, SchemaLookupError> {
        Ok(FieldSignature {
            arguments: self.field_argument_types(root_type, field)?,
            result: self.field_result_type(root_type, field)?,
        })
    }
}

// ============================================================================
// SECTION: Type Graph
// ============================================================================

/// Field declaration within an object type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDefinition {
    /// Declared result type reference, possibly wrapped (`[User!]!`).
    #[serde(rename = "type")]
    pub type_ref: String,
    /// Argument name to declared (possibly wrapped) argument type reference.
    #[serde(default)]
    pub arguments: BTreeMap<String, String>,
}

/// Object type declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObjectType {
    /// Field declarations keyed by field name.
    #[serde(default)]
    pub fields: BTreeMap<String, FieldDefinition>,
}

/// Structured schema graph.
///
/// # Invariants
/// - Read-only once shared; safe for unsynchronized concurrent reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeGraph {
    /// Object types keyed by type name.
    #[serde(default)]
    pub types: BTreeMap<String, ObjectType>,
}

impl TypeGraph {
    /// Creates an empty graph.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            types: BTreeMap::new(),
        }
    }

    /// Adds a field declaration to a type, creating the type if needed.
    #[must_use]
    pub fn with_field<I, K, V>(
        mut self,
        type_name: &str,
        field: &str,
        type_ref: &str,
        arguments: I,
    ) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let definition = FieldDefinition {
            type_ref: type_ref.to_string(),
            arguments: arguments.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        };
        self.types
            .entry(type_name.to_string())
            .or_default()
            .fields
            .insert(field.to_string(), definition);
        self
    }

    /// Checks that every declared type reference reduces to a named type.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaLookupError::InvalidTypeRef`] for the first malformed reference.
    pub fn validate(&self) -> Result<(), SchemaLookupError> {
        for object in self.types.values() {
            for definition in object.fields.values() {
                named_type(&definition.type_ref)?;
                for argument in definition.arguments.values() {
                    named_type(argument)?;
                }
            }
        }
        Ok(())
    }

    /// Looks up a field declaration.
    fn field(&self, root_type: &str, field: &str) -> Result<&FieldDefinition, SchemaLookupError> {
        let object = self
            .types
            .get(root_type)
            .ok_or_else(|| SchemaLookupError::UnknownType(root_type.to_string()))?;
        object.fields.get(field).ok_or_else(|| SchemaLookupError::UnknownField {
            type_name: root_type.to_string(),
            field: field.to_string(),
        })
    }
}

impl TypeOracle for TypeGraph {
    fn field_argument_types(
        &self,
        root_type: &str,
        field: &str,
    ) -> Result<BTreeMap<String, TypeName>, SchemaLookupError> {
        let definition = self.field(root_type, field)?;
        definition
            .arguments
            .iter()
            .map(|(name, type_ref)| Ok((name.clone(), named_type(type_ref)?)))
            .collect()
    }

    fn field_result_type(
        &self,
        root_type: &str,
        field: &str,
    ) -> Result<TypeName, SchemaLookupError> {
        named_type(&self.field(root_type, field)?.type_ref)
    }
}

// ============================================================================
// SECTION: Type References
// ============================================================================

/// Strips list and non-null wrappers from a type reference.
///
/// # Errors
///
/// Returns [`SchemaLookupError::InvalidTypeRef`] when brackets are unbalanced
/// or the remaining name is not a valid identifier.
pub fn named_type(type_ref: &str) -> Result<TypeName, SchemaLookupError> {
    let invalid = |reason| SchemaLookupError::InvalidTypeRef {
        type_ref: type_ref.to_string(),
        reason,
    };
    let mut current = type_ref.trim();
    loop {
        if let Some(inner) = current.strip_suffix('!') {
            current = inner.trim_end();
            continue;
        }
        if let Some(rest) = current.strip_prefix('[') {
            let inner = rest.strip_suffix(']').ok_or_else(|| invalid("unbalanced list brackets"))?;
            current = inner.trim();
            continue;
        }
        break;
    }
    if current.is_empty() {
        return Err(invalid("missing type name"));
    }
    if !is_identifier(current) {
        return Err(invalid("type name must be an identifier"));
    }
    Ok(TypeName::new(current))
}

/// Returns true when the text is a schema identifier (`[_A-Za-z][_0-9A-Za-z]*`).
fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    chars.next().is_some_and(|first| first == '_' || first.is_ascii_alphabetic())
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}
