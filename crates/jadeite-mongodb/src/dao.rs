//! Generic data access object
//!
//! One [`MongoDao`] serves one model type and therefore one collection,
//! resolved from the model's metadata when the DAO is built. All write and
//! query operations translate their condition and update trees up front, so
//! a malformed expression fails before anything reaches the wire.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};

use bson::oid::ObjectId;
use bson::Bson;
use mongodb::{Client, Collection};
use tracing::{debug, info};

use jadeite_common::{JadeiteError, Result};

use crate::condition::{Condition, Update};
use crate::connection::{Connection, ServerSpec};
use crate::cursor::ResultSet;
use crate::document::{Model, ModelMetadata, Record};
use crate::query::{translate_condition, translate_update};

/// Result of an update operation
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOutcome {
    /// Number of records the condition matched
    pub matched: u64,
    /// Number of records actually changed
    pub modified: u64,
    /// Identifier of the record created by an upsert, when one was created
    pub upserted_id: Option<Bson>,
}

impl From<mongodb::results::UpdateResult> for UpdateOutcome {
    fn from(result: mongodb::results::UpdateResult) -> Self {
        Self {
            matched: result.matched_count,
            modified: result.modified_count,
            upserted_id: result.upserted_id,
        }
    }
}

/// Data access object for one model type
///
/// # Example
///
/// ```ignore
/// use jadeite_mongodb::{Condition, MongoDao, ServerSpec, Update};
///
/// let dao: MongoDao<User> = MongoDao::connect(&[ServerSpec::new("localhost", 27017)]).await?;
///
/// let mut user = User::new("ada");
/// let id = dao.insert(&mut user).await?;
///
/// dao.update_one(&Condition::eq("_id", id), &Update::new().set("name", "ada l.")).await?;
/// dao.close().await;
/// ```
#[derive(Debug)]
pub struct MongoDao<T: Model> {
    client: Client,
    collection: Collection<Record>,
    metadata: ModelMetadata,
    closed: AtomicBool,
    _model: PhantomData<T>,
}

impl<T: Model> MongoDao<T> {
    /// Build a DAO with its own connection to the given servers
    ///
    /// The model's metadata is validated before any connection work happens.
    /// Prefer [`MongoDao::with_connection`] when several DAOs should share
    /// one client.
    pub async fn connect(servers: &[ServerSpec]) -> Result<Self> {
        let metadata = ModelMetadata::of::<T>()?;
        let connection = Connection::connect(servers).await?;
        Ok(Self::from_parts(connection, metadata))
    }

    /// Build a DAO on top of an existing connection
    pub fn with_connection(connection: &Connection) -> Result<Self> {
        let metadata = ModelMetadata::of::<T>()?;
        Ok(Self::from_parts(connection.clone(), metadata))
    }

    fn from_parts(connection: Connection, metadata: ModelMetadata) -> Self {
        let collection = connection.collection(metadata.database(), metadata.collection());
        info!("DAO ready for {}", metadata.namespace());
        Self {
            client: connection.client().clone(),
            collection,
            metadata,
            closed: AtomicBool::new(false),
            _model: PhantomData,
        }
    }

    /// Metadata resolved from the model type
    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    /// True once [`close`](Self::close) has been called
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn ensure_open(&self, operation: &str) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(JadeiteError::Closed(format!(
                "cannot {} on {}: DAO is closed",
                operation,
                self.metadata.namespace()
            )));
        }
        Ok(())
    }

    /// Insert a model and write the generated identifier back into it
    ///
    /// Returns the identifier assigned by the database. A model that
    /// serializes its own `_id` keeps it; otherwise the server generates
    /// one.
    pub async fn insert(&self, model: &mut T) -> Result<ObjectId> {
        self.ensure_open("insert")?;
        let record = model.to_record()?;
        let result = self.collection.insert_one(record).await?;
        let id = result.inserted_id.as_object_id().ok_or_else(|| {
            JadeiteError::Database("inserted _id is not an ObjectId".to_string())
        })?;
        model.set_id(id);
        debug!("Inserted {} into {}", id, self.metadata.namespace());
        Ok(id)
    }

    /// First record matching the condition, if any
    pub async fn find_one(&self, condition: &Condition) -> Result<Option<T>> {
        self.ensure_open("find_one")?;
        let filter = translate_condition(condition)?;
        debug!(
            "find_one on {} with filter {}",
            self.metadata.namespace(),
            filter
        );
        let record = self.collection.find_one(filter).await?;
        record.map(T::from_record).transpose()
    }

    /// Record with the given identifier, if any
    pub async fn find_by_id(&self, id: ObjectId) -> Result<Option<T>> {
        self.find_one(&Condition::eq("_id", id)).await
    }

    /// Stream of every record matching the condition, in natural order
    pub async fn find_many(&self, condition: &Condition) -> Result<ResultSet<T>> {
        self.ensure_open("find_many")?;
        let filter = translate_condition(condition)?;
        debug!(
            "find_many on {} with filter {}",
            self.metadata.namespace(),
            filter
        );
        let cursor = self.collection.find(filter).await?;
        Ok(ResultSet::from_cursor(cursor))
    }

    /// Apply the update to the first matching record
    pub async fn update_one(&self, condition: &Condition, update: &Update) -> Result<UpdateOutcome> {
        self.ensure_open("update_one")?;
        self.update(condition, update, false, false).await
    }

    /// Apply the update to every matching record
    pub async fn update_all(&self, condition: &Condition, update: &Update) -> Result<UpdateOutcome> {
        self.ensure_open("update_all")?;
        self.update(condition, update, false, true).await
    }

    /// Apply the update to the first matching record, inserting a new one
    /// when nothing matches
    ///
    /// The created record's identifier is reported in
    /// [`UpdateOutcome::upserted_id`].
    pub async fn upsert(&self, condition: &Condition, update: &Update) -> Result<UpdateOutcome> {
        self.ensure_open("upsert")?;
        self.update(condition, update, true, false).await
    }

    async fn update(
        &self,
        condition: &Condition,
        update: &Update,
        upsert: bool,
        multi: bool,
    ) -> Result<UpdateOutcome> {
        let filter = translate_condition(condition)?;
        let document = translate_update(update)?;
        debug!(
            "update on {} (upsert: {}, multi: {}) with filter {}",
            self.metadata.namespace(),
            upsert,
            multi,
            filter
        );
        let result = if multi {
            self.collection
                .update_many(filter, document)
                .upsert(upsert)
                .await?
        } else {
            self.collection
                .update_one(filter, document)
                .upsert(upsert)
                .await?
        };
        Ok(result.into())
    }

    /// Delete the first matching record; true if one was deleted
    pub async fn delete_one(&self, condition: &Condition) -> Result<bool> {
        self.ensure_open("delete_one")?;
        let filter = translate_condition(condition)?;
        let result = self.collection.delete_one(filter).await?;
        Ok(result.deleted_count > 0)
    }

    /// Delete every matching record; returns how many were deleted
    pub async fn delete_all(&self, condition: &Condition) -> Result<u64> {
        self.ensure_open("delete_all")?;
        let filter = translate_condition(condition)?;
        let result = self.collection.delete_many(filter).await?;
        debug!(
            "Deleted {} record(s) from {}",
            result.deleted_count,
            self.metadata.namespace()
        );
        Ok(result.deleted_count)
    }

    /// Number of records matching the condition
    pub async fn count(&self, condition: &Condition) -> Result<u64> {
        self.ensure_open("count")?;
        let filter = translate_condition(condition)?;
        let count = self.collection.count_documents(filter).await?;
        Ok(count)
    }

    /// Close the DAO and shut down its client
    ///
    /// Safe to call more than once; every call after the first is a no-op.
    /// Operations on a closed DAO return a `Closed` error. DAOs sharing the
    /// connection this one was built from stop working as well, since they
    /// share the client being shut down.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        info!("Closing DAO for {}", self.metadata.namespace());
        self.client.clone().shutdown().await;
    }
}
