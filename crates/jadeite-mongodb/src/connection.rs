//! Connection handling
//!
//! [`Connection`] owns one driver [`Client`] and can be shared by any number
//! of DAOs. The client multiplexes every server in the deployment behind a
//! single handle, so opening a connection per DAO is unnecessary; build one
//! [`Connection`] at startup and hand it to each DAO through
//! [`crate::dao::MongoDao::with_connection`].
//!
//! Construction performs no network I/O. The driver connects lazily on the
//! first operation, which keeps startup independent of server availability;
//! use [`Connection::ping`] when a reachability check is wanted up front.

use std::fmt;

use bson::doc;
use mongodb::options::{ClientOptions, ServerApi, ServerApiVersion};
use mongodb::{Client, Collection, Database};
use tracing::{debug, info};

use jadeite_common::{JadeiteError, Result};

use crate::document::Record;

/// Application name reported to the server in connection metadata
const APP_NAME: &str = "jadeite";

/// Address of one server in the deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSpec {
    pub host: String,
    pub port: u16,
}

impl ServerSpec {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for ServerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // IPv6 literals need brackets to keep the port separator unambiguous
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// Shared handle to a MongoDB deployment
///
/// Cloning is cheap; clones share the same underlying client and connection
/// pool.
#[derive(Debug, Clone)]
pub struct Connection {
    client: Client,
}

impl Connection {
    /// Connect to the servers of one deployment
    ///
    /// Every address belongs to the same replica set or sharded cluster; the
    /// driver treats the list as seeds for discovering the full topology.
    /// Returns a `Connection` error when the list is empty or an address
    /// cannot be parsed.
    pub async fn connect(servers: &[ServerSpec]) -> Result<Self> {
        if servers.is_empty() {
            return Err(JadeiteError::Connection(
                "server list is empty".to_string(),
            ));
        }
        let hosts: Vec<String> = servers.iter().map(ToString::to_string).collect();
        let uri = format!("mongodb://{}", hosts.join(","));
        Self::with_uri(&uri).await
    }

    /// Connect using a full MongoDB connection string
    ///
    /// Accepts everything the driver accepts, including `mongodb+srv://` and
    /// URI options such as credentials and replica set names.
    pub async fn with_uri(uri: &str) -> Result<Self> {
        let options = ClientOptions::parse(uri).await?;
        Self::from_options(options)
    }

    fn from_options(mut options: ClientOptions) -> Result<Self> {
        if options.app_name.is_none() {
            options.app_name = Some(APP_NAME.to_string());
        }
        options.server_api = Some(ServerApi::builder().version(ServerApiVersion::V1).build());

        let host_count = options.hosts.len();
        let client = Client::with_options(options)?;
        info!("Opened MongoDB connection across {} host(s)", host_count);
        Ok(Self { client })
    }

    /// The underlying driver client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Handle to a database by name
    pub fn database(&self, name: &str) -> Database {
        self.client.database(name)
    }

    /// Handle to a collection of raw records
    pub fn collection(&self, database: &str, name: &str) -> Collection<Record> {
        self.client.database(database).collection(name)
    }

    /// Round-trip a ping command to verify the deployment is reachable
    pub async fn ping(&self) -> Result<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|err| JadeiteError::Connection(format!("ping failed: {}", err)))?;
        debug!("Ping acknowledged");
        Ok(())
    }

    /// Names of the databases visible on the deployment
    pub async fn list_database_names(&self) -> Result<Vec<String>> {
        let names = self.client.list_database_names().await?;
        Ok(names)
    }

    /// Shut down the client and release its pooled connections
    ///
    /// Clones of this connection, and DAOs built from it, stop working once
    /// any holder closes it.
    pub async fn close(self) {
        info!("Closing MongoDB connection");
        self.client.shutdown().await;
    }
}
