//! Model trait and record mapping
//!
//! This module provides the `Model` trait implemented by every domain type
//! stored through jadeite. A model declares which database and collection it
//! lives in and converts to and from the untyped [`Record`] representation.
//! Field mapping is fully static: it is whatever the type's serde derives
//! declare, so there is no runtime reflection and no partially-mapped object.

use bson::{oid::ObjectId, Document as BsonDocument};
use serde::{de::DeserializeOwned, Serialize};

use crate::validation::{ValidatedCollectionName, ValidatedDatabaseName};
use crate::Result;

/// Untyped key-value representation of one stored document.
///
/// Records are transient: one is created per read or write call and handed
/// straight to the driver or the model mapping.
pub type Record = BsonDocument;

/// Core trait for domain objects stored in MongoDB
///
/// Implementing types must be `Serialize + DeserializeOwned`; the serde
/// derives are the statically-declared field-mapping table. The two name
/// functions pin the model to its storage location: both must be non-blank,
/// which is enforced when a DAO is constructed, not when an operation is
/// already in flight.
///
/// # Example
///
/// ```ignore
/// use bson::oid::ObjectId;
/// use jadeite_mongodb::Model;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Serialize, Deserialize)]
/// struct User {
///     #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
///     id: Option<ObjectId>,
///     email: String,
///     name: String,
/// }
///
/// impl Model for User {
///     fn database_name() -> &'static str {
///         "app"
///     }
///
///     fn collection_name() -> &'static str {
///         "users"
///     }
///
///     fn id(&self) -> Option<ObjectId> {
///         self.id
///     }
///
///     fn set_id(&mut self, id: ObjectId) {
///         self.id = Some(id);
///     }
/// }
/// ```
pub trait Model: Serialize + DeserializeOwned + Send + Sync + Sized {
    /// Database this model's collection lives in
    fn database_name() -> &'static str;

    /// Collection this model is stored in
    fn collection_name() -> &'static str;

    /// The model's ObjectId, if it has one
    fn id(&self) -> Option<ObjectId> {
        None
    }

    /// Store the ObjectId generated by an insert
    fn set_id(&mut self, _id: ObjectId) {
        // Default implementation does nothing
        // Override this if your model has an _id field
    }

    /// Convert this model into a record
    ///
    /// # Errors
    /// Fails with `Mapping` if a field cannot be serialized.
    fn to_record(&self) -> Result<Record> {
        Ok(bson::to_document(self)?)
    }

    /// Build a model from a record
    ///
    /// Absence of a record is not represented here: a missing document
    /// surfaces as `Ok(None)` from the DAO's find operations, never as a
    /// half-initialized model.
    ///
    /// # Errors
    /// Fails with `Mapping` if a field is missing or has the wrong type.
    fn from_record(record: Record) -> Result<Self> {
        Ok(bson::from_document(record)?)
    }
}

/// Validated database/collection pair for a model type
///
/// This is the explicit metadata struct the DAO keeps for its lifetime. It
/// can only be obtained through validation, so holding one means both names
/// were present and well-formed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelMetadata {
    database: ValidatedDatabaseName,
    collection: ValidatedCollectionName,
}

impl ModelMetadata {
    /// Validate and capture the metadata declared by `T`
    ///
    /// # Errors
    /// Returns `Metadata` if either name is blank or malformed.
    pub fn of<T: Model>() -> Result<Self> {
        let database = ValidatedDatabaseName::new(T::database_name())?;
        let collection = ValidatedCollectionName::new(T::collection_name())?;
        Ok(Self {
            database,
            collection,
        })
    }

    /// The validated database name
    pub fn database(&self) -> &str {
        self.database.as_str()
    }

    /// The validated collection name
    pub fn collection(&self) -> &str {
        self.collection.as_str()
    }

    /// `database.collection`, the way the server names a namespace
    pub fn namespace(&self) -> String {
        format!("{}.{}", self.database(), self.collection())
    }
}
