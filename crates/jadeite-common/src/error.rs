//! Error types for jadeite

use thiserror::Error;

/// Result type alias for jadeite operations
pub type Result<T> = std::result::Result<T, JadeiteError>;

/// Unified error type for all jadeite operations
#[derive(Error, Debug, Clone)]
pub enum JadeiteError {
    /// Missing or invalid model metadata (database/collection name)
    #[error("Metadata error: {0}")]
    Metadata(String),

    /// Record serialization/deserialization failure
    #[error("Mapping error: {0}")]
    Mapping(String),

    /// Malformed condition or update tree
    #[error("Condition error: {0}")]
    Condition(String),

    /// Operation attempted after the client was closed
    #[error("Closed resource: {0}")]
    Closed(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<serde_json::Error> for JadeiteError {
    fn from(err: serde_json::Error) -> Self {
        JadeiteError::Mapping(err.to_string())
    }
}

// MongoDB-specific error conversions (when mongodb-errors feature is enabled)
#[cfg(feature = "mongodb-errors")]
impl From<mongodb::error::Error> for JadeiteError {
    fn from(err: mongodb::error::Error) -> Self {
        use mongodb::error::ErrorKind;

        // Classify driver errors: reachability problems surface as Connection,
        // codec problems as Mapping, everything else as Database.
        match err.kind.as_ref() {
            ErrorKind::ServerSelection { .. }
            | ErrorKind::Io(_)
            | ErrorKind::DnsResolve { .. }
            | ErrorKind::Authentication { .. }
            | ErrorKind::ConnectionPoolCleared { .. }
            | ErrorKind::InvalidArgument { .. } => JadeiteError::Connection(err.to_string()),
            ErrorKind::BsonSerialization(_) | ErrorKind::BsonDeserialization(_) => {
                JadeiteError::Mapping(err.to_string())
            }
            _ => JadeiteError::Database(err.to_string()),
        }
    }
}

#[cfg(feature = "mongodb-errors")]
impl From<bson::ser::Error> for JadeiteError {
    fn from(err: bson::ser::Error) -> Self {
        JadeiteError::Mapping(format!("BSON serialization error: {}", err))
    }
}

#[cfg(feature = "mongodb-errors")]
impl From<bson::de::Error> for JadeiteError {
    fn from(err: bson::de::Error) -> Self {
        JadeiteError::Mapping(format!("BSON deserialization error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes_each_kind() {
        let cases = [
            (
                JadeiteError::Metadata("collection name is blank".into()),
                "Metadata error: collection name is blank",
            ),
            (
                JadeiteError::Mapping("missing field".into()),
                "Mapping error: missing field",
            ),
            (
                JadeiteError::Condition("empty composite".into()),
                "Condition error: empty composite",
            ),
            (
                JadeiteError::Closed("insert on closed DAO".into()),
                "Closed resource: insert on closed DAO",
            ),
            (
                JadeiteError::Connection("timeout".into()),
                "Connection error: timeout",
            ),
            (
                JadeiteError::Database("write failed".into()),
                "Database error: write failed",
            ),
        ];
        for (err, rendered) in cases {
            assert_eq!(err.to_string(), rendered);
        }
    }

    #[test]
    fn test_serde_json_errors_become_mapping() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: JadeiteError = json_err.into();
        assert!(matches!(err, JadeiteError::Mapping(_)));
    }

    #[test]
    fn test_result_alias_carries_the_error() {
        fn fails() -> Result<i32> {
            Err(JadeiteError::Condition("failed".to_string()))
        }
        assert!(matches!(fails(), Err(JadeiteError::Condition(_))));
    }
}
