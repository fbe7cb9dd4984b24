use super::{
    Error,
    validator::{AsyncPredicate, SyncPredicate, Validator},
};
use crate::{
    mongo::{
        Connection, ConnectionProvider, Database, DatabaseProvider, MongoConnection, QueryResult,
    },
    tls::TlsConfig,
};
use futures::FutureExt;
use std::{fmt, future::Future, sync::Arc, time::Duration};

/// Everything a watcher needs to run its check
#[derive(Clone)]
pub struct Configuration {
    pub(crate) connection_string: String,
    pub(crate) database: String,
    pub(crate) collection: String,
    pub(crate) query: String,
    pub(crate) timeout: Option<Duration>,
    pub(crate) connection_provider: ConnectionProvider,
    pub(crate) database_provider: DatabaseProvider,
    pub(crate) validators: Vec<Validator>,
}

impl Configuration {
    /// Start a configuration for `database` reachable through `connection_string`
    #[must_use]
    pub fn builder(connection_string: &str, database: &str) -> ConfigurationBuilder {
        ConfigurationBuilder::new(connection_string, database)
    }

    #[must_use]
    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    #[must_use]
    pub fn database(&self) -> &str {
        &self.database
    }

    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    #[must_use]
    pub fn validators(&self) -> &[Validator] {
        &self.validators
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("connection_string", &self.connection_string)
            .field("database", &self.database)
            .field("collection", &self.collection)
            .field("query", &self.query)
            .field("timeout", &self.timeout)
            .field("validators", &self.validators)
            .finish_non_exhaustive()
    }
}

pub struct ConfigurationBuilder {
    connection_string: String,
    database: String,
    collection: String,
    query: String,
    timeout: Option<Duration>,
    tls: TlsConfig,
    connection_provider: Option<ConnectionProvider>,
    database_provider: Option<DatabaseProvider>,
    validators: Vec<Validator>,
}

impl ConfigurationBuilder {
    #[must_use]
    pub fn new(connection_string: &str, database: &str) -> Self {
        Self {
            connection_string: connection_string.to_string(),
            database: database.to_string(),
            collection: String::new(),
            query: String::new(),
            timeout: None,
            tls: TlsConfig::default(),
            connection_provider: None,
            database_provider: None,
            validators: Vec::new(),
        }
    }

    /// Run `query`, a JSON filter document, against `collection` on every check
    #[must_use]
    pub fn with_query(mut self, collection: &str, query: &str) -> Self {
        collection.clone_into(&mut self.collection);
        query.clone_into(&mut self.query);
        self
    }

    /// Passed through to the driver, the watcher enforces nothing itself
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// TLS settings for the default connection provider
    #[must_use]
    pub fn with_tls(mut self, tls: TlsConfig) -> Self {
        self.tls = tls;
        self
    }

    #[must_use]
    pub fn with_connection_provider<F>(mut self, provider: F) -> Self
    where
        F: Fn(&str) -> Arc<dyn Connection> + Send + Sync + 'static,
    {
        self.connection_provider = Some(Arc::new(provider));
        self
    }

    /// Used when the connection does not yield a database
    #[must_use]
    pub fn with_database_provider<F>(mut self, provider: F) -> Self
    where
        F: Fn() -> Option<Arc<dyn Database>> + Send + Sync + 'static,
    {
        self.database_provider = Some(Arc::new(provider));
        self
    }

    /// Require `predicate` to accept the query result
    #[must_use]
    pub fn ensure<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&QueryResult) -> bool + Send + Sync + 'static,
    {
        let predicate: SyncPredicate = Arc::new(predicate);
        self.validators.push(Validator::Sync(predicate));
        self
    }

    /// Require the future returned by `predicate` to accept the query result
    #[must_use]
    pub fn ensure_async<F, Fut>(mut self, predicate: F) -> Self
    where
        F: Fn(Arc<QueryResult>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        let boxed: AsyncPredicate =
            Arc::new(move |result: Arc<QueryResult>| predicate(result).boxed());
        self.validators.push(Validator::Async(boxed));
        self
    }

    /// # Errors
    ///
    /// Returns `Error::InvalidConfiguration` if the connection string or the
    /// database name is empty, or a query was set without a collection
    pub fn build(self) -> Result<Configuration, Error> {
        if self.connection_string.trim().is_empty() {
            return Err(Error::InvalidConfiguration(
                "MongoDB connection string can not be empty".to_string(),
            ));
        }

        if self.database.trim().is_empty() {
            return Err(Error::InvalidConfiguration(
                "MongoDB database name can not be empty".to_string(),
            ));
        }

        if !self.query.trim().is_empty() && self.collection.trim().is_empty() {
            return Err(Error::InvalidConfiguration(
                "MongoDB collection name can not be empty when a query is set".to_string(),
            ));
        }

        let connection_provider: ConnectionProvider = match self.connection_provider {
            Some(provider) => provider,
            None => mongo_connection_provider(&self.database, self.timeout, self.tls),
        };

        let database_provider: DatabaseProvider = match self.database_provider {
            Some(provider) => provider,
            None => Arc::new(no_database),
        };

        Ok(Configuration {
            connection_string: self.connection_string,
            database: self.database,
            collection: self.collection,
            query: self.query,
            timeout: self.timeout,
            connection_provider,
            database_provider,
            validators: self.validators,
        })
    }
}

fn mongo_connection_provider(
    database: &str,
    timeout: Option<Duration>,
    tls: TlsConfig,
) -> ConnectionProvider {
    let database = database.to_string();
    Arc::new(move |connection_string: &str| -> Arc<dyn Connection> {
        Arc::new(MongoConnection::new(
            connection_string,
            &database,
            timeout,
            tls.clone(),
        ))
    })
}

const fn no_database() -> Option<Arc<dyn Database>> {
    None
}
