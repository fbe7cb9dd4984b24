//! `MongoDB` watcher
//!
//! A [`Watcher`] resolves the configured database, optionally runs a query
//! and validates its result, and reports a [`CheckResult`].
//!
//! Failures are split in two:
//! - the driver reported something, the database is unhealthy: a failed
//!   `CheckResult`, never an `Err`
//! - anything else, the watcher itself is broken: [`Error::Fault`]

pub mod config;
pub mod validator;

pub use config::{Configuration, ConfigurationBuilder};
pub use validator::Validator;

use crate::mongo::{self, Connection, Database, QueryResult};
use anyhow::anyhow;
use chrono::{DateTime, Utc};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::{any::Any, panic::AssertUnwindSafe, sync::Arc, time::Duration};
use thiserror::Error;
use tracing::{debug, error, warn};

/// Fixed description of [`Error::Fault`]
pub const FAULT_DESCRIPTION: &str = "There was an error while trying to access MongoDB.";

#[derive(Debug, Error)]
pub enum Error {
    #[error("Watcher name can not be empty.")]
    EmptyName,

    #[error("{0}")]
    InvalidConfiguration(String),

    /// Unexpected failure while checking, `source` holds the cause
    #[error("{description}")]
    Fault {
        description: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl Error {
    fn fault(source: anyhow::Error) -> Self {
        Self::Fault {
            description: FAULT_DESCRIPTION,
            source,
        }
    }
}

/// Which provider resolved the database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseSource {
    /// The watcher's connection
    Primary,
    /// The configured fallback database provider
    Fallback,
}

/// Outcome of a single watcher execution
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CheckResult {
    pub watcher: String,
    pub is_valid: bool,
    pub database: String,
    pub connection_string: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<DatabaseSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_result: Option<QueryResult>,
    pub checked_at: DateTime<Utc>,
}

/// Tagged form of [`Watcher::execute`]
#[derive(Debug)]
pub enum Outcome {
    /// The check passed
    Healthy(CheckResult),
    /// The database is unreachable, missing, or returned an invalid result
    Unhealthy(CheckResult),
    /// The watcher itself failed
    Fault(Error),
}

impl Outcome {
    #[must_use]
    pub const fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy(_))
    }

    /// # Errors
    ///
    /// Returns the fault if the watcher itself failed
    pub fn into_result(self) -> Result<CheckResult, Error> {
        match self {
            Self::Healthy(result) | Self::Unhealthy(result) => Ok(result),
            Self::Fault(err) => Err(err),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Watcher {
    name: String,
    configuration: Configuration,
    connection: Arc<dyn Connection>,
}

impl Watcher {
    /// Create a watcher, its connection comes from the configuration's
    /// connection provider
    ///
    /// # Errors
    ///
    /// Returns `Error::EmptyName` if `name` is blank
    pub fn new(name: &str, configuration: Configuration) -> Result<Self, Error> {
        if name.trim().is_empty() {
            return Err(Error::EmptyName);
        }

        let connection = (configuration.connection_provider)(&configuration.connection_string);

        Ok(Self {
            name: name.to_string(),
            configuration,
            connection,
        })
    }

    /// # Errors
    ///
    /// Returns an error if the name, the connection string or the database
    /// name is blank
    pub fn create(
        name: &str,
        connection_string: &str,
        database: &str,
        timeout: Option<Duration>,
    ) -> Result<Self, Error> {
        Self::create_with(name, connection_string, database, timeout, |builder| builder)
    }

    /// Like [`Watcher::create`], `configure` can amend the configuration
    /// before it is built
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank or the configuration is invalid
    pub fn create_with<F>(
        name: &str,
        connection_string: &str,
        database: &str,
        timeout: Option<Duration>,
        configure: F,
    ) -> Result<Self, Error>
    where
        F: FnOnce(ConfigurationBuilder) -> ConfigurationBuilder,
    {
        let mut builder = Configuration::builder(connection_string, database);
        if let Some(timeout) = timeout {
            builder = builder.with_timeout(timeout);
        }

        Self::new(name, configure(builder).build()?)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    /// Run the check
    ///
    /// # Errors
    ///
    /// Returns `Error::Fault` on anything but a driver failure
    pub async fn execute(&self) -> Result<CheckResult, Error> {
        self.check().await.into_result()
    }

    /// Run the check and tell apart an unhealthy database from a broken
    /// watcher
    pub async fn check(&self) -> Outcome {
        let run = AssertUnwindSafe(self.run()).catch_unwind().await;

        match run {
            Ok(Ok(result)) if result.is_valid => Outcome::Healthy(result),
            Ok(Ok(result)) => Outcome::Unhealthy(result),
            Ok(Err(mongo::Error::Driver(err))) => {
                Outcome::Unhealthy(self.driver_failure(&err, None, None))
            }
            Ok(Err(mongo::Error::Other(err))) => {
                error!(watcher = %self.name, error = ?err, "{}", FAULT_DESCRIPTION);
                Outcome::Fault(Error::fault(err))
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!(watcher = %self.name, panic = %message, "{}", FAULT_DESCRIPTION);
                Outcome::Fault(Error::fault(anyhow!("check panicked: {message}")))
            }
        }
    }

    async fn run(&self) -> Result<CheckResult, mongo::Error> {
        let database_name = &self.configuration.database;

        let Some((database, source)) = self.resolve_database().await? else {
            return Ok(self.result(
                false,
                None,
                format!("Database: '{database_name}' has not been found."),
            ));
        };

        let Some(query) = self.query() else {
            return Ok(self.result(
                true,
                Some(source),
                format!("Database: '{database_name}' has been successfully checked."),
            ));
        };

        let collection = &self.configuration.collection;
        let documents = match database.query(collection, query).await {
            Ok(documents) => Arc::new(documents),
            Err(mongo::Error::Driver(err)) => {
                return Ok(self.driver_failure(&err, Some(source), Some(query)));
            }
            Err(err) => return Err(err),
        };

        let is_valid =
            validator::validate_all(&self.configuration.validators, Arc::clone(&documents)).await;

        let description = format!(
            "Database: '{database_name}' has returned {} document(s) from '{collection}' that {} validation.",
            documents.len(),
            if is_valid { "passed" } else { "failed" }
        );

        let mut result = self.result(is_valid, Some(source), description);
        result.query = Some(query.to_string());
        result.query_result =
            Some(Arc::try_unwrap(documents).unwrap_or_else(|shared| shared.as_ref().clone()));

        Ok(result)
    }

    async fn resolve_database(
        &self,
    ) -> Result<Option<(Arc<dyn Database>, DatabaseSource)>, mongo::Error> {
        let (database, source) = match self.connection.get_database().await? {
            Some(database) => (database, DatabaseSource::Primary),
            None => match (self.configuration.database_provider)() {
                Some(database) => (database, DatabaseSource::Fallback),
                None => return Ok(None),
            },
        };

        debug!(
            watcher = %self.name,
            database = %self.configuration.database,
            source = ?source,
            "database resolved"
        );

        Ok(Some((database, source)))
    }

    /// Failed result for an error reported by the driver, `query` is set
    /// only when the query itself failed
    fn driver_failure(
        &self,
        err: &mongodb::error::Error,
        source: Option<DatabaseSource>,
        query: Option<&str>,
    ) -> CheckResult {
        warn!(
            watcher = %self.name,
            database = %self.configuration.database,
            query_failed = query.is_some(),
            error = %err,
            "MongoDB check failed"
        );

        let mut result = self.result(false, source, err.to_string());
        result.query = query.map(ToString::to_string);
        result
    }

    fn query(&self) -> Option<&str> {
        let query = self.configuration.query.as_str();
        (!query.trim().is_empty()).then_some(query)
    }

    fn result(
        &self,
        is_valid: bool,
        source: Option<DatabaseSource>,
        description: String,
    ) -> CheckResult {
        CheckResult {
            watcher: self.name.clone(),
            is_valid,
            database: self.configuration.database.clone(),
            connection_string: self.configuration.connection_string.clone(),
            description: Some(description),
            source,
            query: None,
            query_result: None,
            checked_at: Utc::now(),
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
