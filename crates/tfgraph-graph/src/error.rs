//! Error types for graph database access.

use neo4rs::{Neo4jClientErrorKind, Neo4jErrorKind};
use thiserror::Error;

/// Errors raised while talking to the graph database.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The database is unreachable or rejected the credentials.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A single write statement failed.
    #[error("Write error: {0}")]
    Write(String),

    /// A read query failed.
    #[error("Query error: {0}")]
    Query(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for graph store operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    pub fn write(msg: impl Into<String>) -> Self {
        Self::Write(msg.into())
    }

    /// Errors that must abort a whole ingestion rather than a single record.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Config(_))
    }

    /// Classify a driver error. Transport, pool and authentication failures
    /// become [`StoreError::Connection`]; anything else is a statement failure
    /// built with `statement`.
    pub fn from_driver(err: neo4rs::Error, context: &str, statement: fn(String) -> StoreError) -> Self {
        let msg = format!("{}: {}", context, err);
        if is_connection_failure(&err) {
            Self::Connection(msg)
        } else {
            statement(msg)
        }
    }
}

/// Whether a driver error means the database cannot be used at all.
fn is_connection_failure(err: &neo4rs::Error) -> bool {
    match err {
        neo4rs::Error::IOError { .. }
        | neo4rs::Error::ConnectionError
        | neo4rs::Error::AuthenticationError(_)
        | neo4rs::Error::UrlParseError(_)
        | neo4rs::Error::UnsupportedScheme(_)
        | neo4rs::Error::InvalidDnsName(_)
        | neo4rs::Error::UnsupportedVersion(_) => true,
        neo4rs::Error::Neo4j(e) => matches!(
            e.kind(),
            Neo4jErrorKind::Client(Neo4jClientErrorKind::Security(_) | Neo4jClientErrorKind::FatalDiscovery)
        ),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_transport_failures_are_connection_errors() {
        let refused = neo4rs::Error::IOError {
            detail: io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"),
        };
        let err = StoreError::from_driver(refused, "Neo4j statement failed", StoreError::Write);
        assert!(matches!(err, StoreError::Connection(_)));
        assert!(err.is_fatal());
        assert!(err.to_string().contains("connection refused"));

        let pool = StoreError::from_driver(neo4rs::Error::ConnectionError, "Neo4j query failed", StoreError::Query);
        assert!(matches!(pool, StoreError::Connection(_)));
    }

    #[test]
    fn test_authentication_failure_is_connection_error() {
        let auth = neo4rs::Error::AuthenticationError("The client is unauthorized".to_string());
        assert!(is_connection_failure(&auth));
        assert!(StoreError::from_driver(auth, "Neo4j statement failed", StoreError::Write).is_fatal());
    }

    #[test]
    fn test_statement_failures_keep_their_kind() {
        let write = StoreError::from_driver(
            neo4rs::Error::UnexpectedMessage("unexpected response for RUN".to_string()),
            "Neo4j statement failed",
            StoreError::Write,
        );
        assert!(matches!(write, StoreError::Write(_)));
        assert!(!write.is_fatal());

        let query = StoreError::from_driver(neo4rs::Error::ConversionError, "Neo4j query failed", StoreError::Query);
        assert!(matches!(query, StoreError::Query(_)));
        assert!(!query.is_fatal());
    }
}
