//! Name validation for MongoDB identifiers
//!
//! Database, collection, and field names are wrapped in validated newtypes
//! before they reach the driver, so model metadata and condition trees cannot
//! put operators or reserved names into identifier positions. A finished
//! query document additionally gets swept for server-side execution operators
//! that a value could have smuggled in.

use bson::Bson;
use jadeite_common::JadeiteError;
use tracing::warn;

use crate::Result;

/// MongoDB caps database names at 64 bytes; stay one under
const MAX_DATABASE_NAME_LEN: usize = 63;

/// MongoDB allows 255 bytes for collection names; we are more conservative
const MAX_COLLECTION_NAME_LEN: usize = 120;

const MAX_FIELD_NAME_LEN: usize = 1024;

/// Characters the server rejects in database names
const FORBIDDEN_DATABASE_CHARS: &[char] = &[
    '/', '\\', '.', ' ', '"', '$', '*', '<', '>', ':', '|', '?',
];

/// Operators that execute JavaScript server-side. The translator never emits
/// them, so finding one in a finished document means a value smuggled it in.
const DANGEROUS_OPERATORS: &[&str] = &["$where", "$function", "$accumulator"];

macro_rules! name_newtype {
    ($type:ident) => {
        impl $type {
            /// The validated name as a string slice
            pub fn as_str(&self) -> &str {
                &self.name
            }

            /// Unwrap into the inner `String`
            pub fn into_string(self) -> String {
                self.name
            }
        }

        impl AsRef<str> for $type {
            fn as_ref(&self) -> &str {
                &self.name
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.name)
            }
        }
    };
}

/// Database name from model metadata, checked against MongoDB's naming rules
///
/// Holding one guarantees the name is non-blank, at most 63 bytes, and free
/// of null bytes and the characters the server rejects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedDatabaseName {
    name: String,
}

impl ValidatedDatabaseName {
    /// Validate `name` as a database name
    ///
    /// # Errors
    /// Returns `Metadata` on any rule violation.
    pub fn new(name: &str) -> Result<Self> {
        if name.trim().is_empty() {
            return Err(JadeiteError::Metadata(
                "database name is blank".to_string(),
            ));
        }
        if name.len() > MAX_DATABASE_NAME_LEN {
            return Err(JadeiteError::Metadata(format!(
                "database name '{}' is longer than {} bytes",
                name, MAX_DATABASE_NAME_LEN
            )));
        }
        if name.contains('\0') {
            return Err(JadeiteError::Metadata(
                "database name contains a null byte".to_string(),
            ));
        }
        if let Some(bad) = name.chars().find(|c| FORBIDDEN_DATABASE_CHARS.contains(c)) {
            return Err(JadeiteError::Metadata(format!(
                "database name '{}' contains forbidden character '{}'",
                name, bad
            )));
        }
        Ok(Self {
            name: name.to_string(),
        })
    }
}

name_newtype!(ValidatedDatabaseName);

/// Collection name from model metadata
///
/// Non-blank, at most 120 bytes, no null bytes, no `$`, and not under the
/// reserved `system.` namespace. Suspicious but legal patterns (`..`, `//`)
/// are allowed with a warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCollectionName {
    name: String,
}

impl ValidatedCollectionName {
    /// Validate `name` as a collection name
    ///
    /// # Errors
    /// Returns `Metadata` on any rule violation.
    pub fn new(name: &str) -> Result<Self> {
        if name.trim().is_empty() {
            return Err(JadeiteError::Metadata(
                "collection name is blank".to_string(),
            ));
        }
        if name.len() > MAX_COLLECTION_NAME_LEN {
            return Err(JadeiteError::Metadata(format!(
                "collection name '{}' is longer than {} bytes",
                name, MAX_COLLECTION_NAME_LEN
            )));
        }
        if name.contains('\0') {
            return Err(JadeiteError::Metadata(
                "collection name contains a null byte".to_string(),
            ));
        }
        if name.starts_with("system.") {
            return Err(JadeiteError::Metadata(format!(
                "collection name '{}' is under the reserved system. namespace",
                name
            )));
        }
        if name.contains('$') {
            return Err(JadeiteError::Metadata(format!(
                "collection name '{}' contains '$'",
                name
            )));
        }
        if name.contains("..") || name.contains("//") {
            warn!("collection name '{}' looks suspicious", name);
        }
        Ok(Self {
            name: name.to_string(),
        })
    }
}

name_newtype!(ValidatedCollectionName);

/// Field name used in condition and update trees
///
/// Dotted paths (`address.city`) are fine; a leading `$` is not, which keeps
/// caller-supplied field names out of operator position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedFieldName {
    name: String,
}

impl ValidatedFieldName {
    /// Validate `name` as a field name
    ///
    /// # Errors
    /// Returns `Condition` on any rule violation. Field names come from
    /// query expressions rather than model metadata, hence the different
    /// error kind.
    pub fn new(name: &str) -> Result<Self> {
        if name.is_empty() {
            return Err(JadeiteError::Condition(
                "field name is empty".to_string(),
            ));
        }
        if name.len() > MAX_FIELD_NAME_LEN {
            return Err(JadeiteError::Condition(format!(
                "field name is longer than {} bytes",
                MAX_FIELD_NAME_LEN
            )));
        }
        if name.contains('\0') {
            return Err(JadeiteError::Condition(
                "field name contains a null byte".to_string(),
            ));
        }
        if name.starts_with('$') {
            return Err(JadeiteError::Condition(format!(
                "field name '{}' starts with '$', which is reserved for operators",
                name
            )));
        }
        Ok(Self {
            name: name.to_string(),
        })
    }
}

name_newtype!(ValidatedFieldName);

/// Sweep a finished native document for dangerous operators
///
/// Recurses through nested documents and arrays.
///
/// # Errors
/// Returns `Condition` naming the first dangerous operator found.
pub fn validate_native_document(document: &bson::Document) -> Result<()> {
    for (key, value) in document.iter() {
        if DANGEROUS_OPERATORS.contains(&key.as_str()) {
            return Err(JadeiteError::Condition(format!(
                "operator '{}' is not allowed in query documents",
                key
            )));
        }
        sweep_value(value)?;
    }
    Ok(())
}

fn sweep_value(value: &Bson) -> Result<()> {
    match value {
        Bson::Document(inner) => validate_native_document(inner),
        Bson::Array(items) => items.iter().try_for_each(sweep_value),
        _ => Ok(()),
    }
}
