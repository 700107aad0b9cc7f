//! End-to-end CRUD walkthrough for the generic DAO
//!
//! Run this example with:
//! ```
//! # Needs a reachable MongoDB; set MONGODB_URL or use the default below
//! cargo run -p jadeite-mongodb --example user_crud
//! ```

use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use jadeite_mongodb::{Condition, Connection, Model, MongoDao, Update};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    name: String,
    age: i32,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    created_at: DateTime<Utc>,
}

impl User {
    fn new(name: &str, age: i32) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            age,
            created_at: Utc::now(),
        }
    }
}

impl Model for User {
    fn database_name() -> &'static str {
        "jadeite_demo"
    }

    fn collection_name() -> &'static str {
        "users"
    }

    fn id(&self) -> Option<ObjectId> {
        self.id
    }

    fn set_id(&mut self, id: ObjectId) {
        self.id = Some(id);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    println!("=== Jadeite User CRUD Example ===\n");

    let uri = std::env::var("MONGODB_URL")
        .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());

    // Connect and share one connection with the DAO
    println!("Connecting to {}...", uri);
    let connection = Connection::with_uri(&uri).await?;
    connection.ping().await?;
    println!("Connected!\n");

    let dao: MongoDao<User> = MongoDao::with_connection(&connection)?;
    dao.delete_all(&Condition::All).await?;

    // Insert
    println!("1. Inserting users...");
    let mut ada = User::new("ada", 36);
    let mut grace = User::new("grace", 45);
    let ada_id = dao.insert(&mut ada).await?;
    dao.insert(&mut grace).await?;
    println!("   Inserted ada with id {}\n", ada_id);

    // Find one
    println!("2. Finding one user by name...");
    if let Some(user) = dao.find_one(&Condition::eq("name", "grace")).await? {
        println!("   Found: {} (age {})\n", user.name, user.age);
    }

    // Find by identifier
    println!("3. Finding by identifier...");
    if let Some(user) = dao.find_by_id(ada_id).await? {
        println!("   {} was created at {}\n", user.name, user.created_at);
    }

    // Stream many
    println!("4. Streaming users older than 30...");
    let mut users = dao.find_many(&Condition::gt("age", 30)).await?;
    while let Some(user) = users.next().await {
        let user = user?;
        println!("   - {} ({})", user.name, user.age);
    }
    println!();

    // Update one
    println!("5. Updating a single user...");
    let outcome = dao
        .update_one(&Condition::eq("name", "ada"), &Update::new().set("age", 37))
        .await?;
    println!("   Matched {}, modified {}\n", outcome.matched, outcome.modified);

    // Update all
    println!("6. Incrementing every age...");
    let outcome = dao
        .update_all(&Condition::All, &Update::new().inc("age", 1))
        .await?;
    println!("   Matched {}, modified {}\n", outcome.matched, outcome.modified);

    // Upsert
    println!("7. Upserting a missing user...");
    let outcome = dao
        .upsert(
            &Condition::eq("name", "margaret"),
            &Update::new().set("age", 52).set("created_at", Utc::now()),
        )
        .await?;
    println!("   Upserted id: {:?}\n", outcome.upserted_id);

    // Count
    println!("8. Counting users...");
    let total = dao.count(&Condition::All).await?;
    let seniors = dao.count(&Condition::gte("age", 40)).await?;
    println!("   {} users total, {} aged 40 or more\n", total, seniors);

    // Delete
    println!("9. Cleaning up...");
    let deleted = dao.delete_one(&Condition::eq("name", "margaret")).await?;
    println!("   Deleted margaret: {}", deleted);
    let removed = dao.delete_all(&Condition::All).await?;
    println!("   Removed {} remaining users\n", removed);

    dao.close().await;
    println!("=== Example Complete ===");
    Ok(())
}
