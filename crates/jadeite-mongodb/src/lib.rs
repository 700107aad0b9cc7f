//! # Jadeite MongoDB
//!
//! Typed data access layer for MongoDB built on the official Rust driver.
//!
//! ## Features
//!
//! - **Models**: map any serde type onto a database and collection through
//!   the [`Model`] trait
//! - **Typed queries**: build filters from [`Condition`] trees and updates
//!   from [`Update`] builders; both are validated and translated to native
//!   BSON before anything reaches the wire
//! - **Generic DAO**: insert, find, update, upsert, delete, and count for
//!   one model type per [`MongoDao`]
//! - **Streaming results**: [`ResultSet`] deserializes matches lazily as a
//!   [`futures::Stream`]
//! - **Shared connections**: one [`Connection`] backs any number of DAOs
//!
//! ## Example
//!
//! ```ignore
//! use jadeite_mongodb::{Condition, Model, MongoDao, ServerSpec, Update};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! struct User {
//!     name: String,
//!     age: i32,
//! }
//!
//! impl Model for User {
//!     fn database_name() -> &'static str { "app" }
//!     fn collection_name() -> &'static str { "users" }
//! }
//!
//! # async fn demo() -> jadeite_mongodb::Result<()> {
//! let dao: MongoDao<User> = MongoDao::connect(&[ServerSpec::new("localhost", 27017)]).await?;
//!
//! let mut user = User { name: "ada".into(), age: 36 };
//! dao.insert(&mut user).await?;
//!
//! let adults = dao.find_many(&Condition::gte("age", 18)).await?.to_vec().await?;
//! dao.update_one(&Condition::eq("name", "ada"), &Update::new().inc("age", 1)).await?;
//!
//! dao.close().await;
//! # Ok(())
//! # }
//! ```

pub mod condition;
pub mod connection;
pub mod cursor;
pub mod dao;
pub mod document;
pub mod query;
pub mod validation;

pub use condition::{CompareOp, Condition, LogicOp, Update, UpdateOp};
pub use connection::{Connection, ServerSpec};
pub use cursor::ResultSet;
pub use dao::{MongoDao, UpdateOutcome};
pub use document::{Model, ModelMetadata, Record};
pub use query::{translate_condition, translate_update};
pub use validation::{
    validate_native_document, ValidatedCollectionName, ValidatedDatabaseName, ValidatedFieldName,
};

pub use jadeite_common::{JadeiteError, Result};
