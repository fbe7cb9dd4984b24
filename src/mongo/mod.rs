//! Capabilities the watcher needs from a `MongoDB` driver
//!
//! The watcher only talks to these traits. `client` implements them on top of
//! the official `mongodb` crate; tests plug in their own implementations.

pub mod client;

pub use client::{MongoConnection, MongoDatabase};

use async_trait::async_trait;
use mongodb::bson::Document;
use std::{fmt, sync::Arc};
use thiserror::Error;

/// Documents returned by a query
pub type QueryResult = Vec<Document>;

#[derive(Debug, Error)]
pub enum Error {
    /// Reported by the driver, the watched deployment is unhealthy
    #[error(transparent)]
    Driver(#[from] mongodb::error::Error),

    /// Anything the driver did not report (bad query text, broken adapter)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    #[must_use]
    pub const fn is_driver(&self) -> bool {
        matches!(self, Self::Driver(_))
    }
}

/// Handle able to resolve the watched database
#[async_trait]
pub trait Connection: Send + Sync {
    /// Resolve the database, `None` when it does not exist
    ///
    /// # Errors
    ///
    /// Returns an error if the server can not be reached
    async fn get_database(&self) -> Result<Option<Arc<dyn Database>>, Error>;
}

/// Handle able to run a query against one of its collections
#[async_trait]
pub trait Database: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the query text is invalid or the driver fails
    async fn query(&self, collection: &str, query: &str) -> Result<QueryResult, Error>;
}

/// Builds a connection out of a connection string
pub type ConnectionProvider = Arc<dyn Fn(&str) -> Arc<dyn Connection> + Send + Sync>;

/// Secondary source of a database when the connection yields none
pub type DatabaseProvider = Arc<dyn Fn() -> Option<Arc<dyn Database>> + Send + Sync>;

impl fmt::Debug for dyn Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Connection")
    }
}

impl fmt::Debug for dyn Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Database")
    }
}
