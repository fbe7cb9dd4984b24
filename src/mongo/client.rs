use super::{Connection, Database, Error, QueryResult};
use crate::tls::TlsConfig;
use anyhow::Context;
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    Client,
    bson::Document,
    options::ClientOptions,
};
use std::{sync::Arc, time::Duration};
use tokio::sync::OnceCell;
use tracing::debug;

const APP_NAME: &str = "mongopulse";

/// Connection backed by the `mongodb` driver
///
/// The client is created on first use and shared by every check afterwards.
#[derive(Debug)]
pub struct MongoConnection {
    connection_string: String,
    database: String,
    timeout: Option<Duration>,
    tls: TlsConfig,
    client: OnceCell<Client>,
}

impl MongoConnection {
    #[must_use]
    pub fn new(
        connection_string: &str,
        database: &str,
        timeout: Option<Duration>,
        tls: TlsConfig,
    ) -> Self {
        Self {
            connection_string: connection_string.to_string(),
            database: database.to_string(),
            timeout,
            tls,
            client: OnceCell::new(),
        }
    }

    async fn client(&self) -> Result<&Client, Error> {
        self.client
            .get_or_try_init(|| async {
                let mut options = ClientOptions::parse(&self.connection_string).await?;

                if let Some(timeout) = self.timeout {
                    options.connect_timeout = Some(timeout);
                    options.server_selection_timeout = Some(timeout);
                }

                if options.app_name.is_none() {
                    options.app_name = Some(APP_NAME.to_string());
                }

                if let Some(tls) = self.tls.to_driver_tls() {
                    options.tls = Some(tls);
                }

                debug!(database = %self.database, "creating MongoDB client");

                Ok::<_, Error>(Client::with_options(options)?)
            })
            .await
    }
}

#[async_trait]
impl Connection for MongoConnection {
    async fn get_database(&self) -> Result<Option<Arc<dyn Database>>, Error> {
        let client = self.client().await?;

        let names = client.list_database_names().await?;
        if !names.iter().any(|name| name == &self.database) {
            return Ok(None);
        }

        Ok(Some(Arc::new(MongoDatabase::new(
            client.database(&self.database),
            self.timeout,
        ))))
    }
}

/// Database backed by the `mongodb` driver
#[derive(Debug, Clone)]
pub struct MongoDatabase {
    database: mongodb::Database,
    timeout: Option<Duration>,
}

impl MongoDatabase {
    #[must_use]
    pub const fn new(database: mongodb::Database, timeout: Option<Duration>) -> Self {
        Self { database, timeout }
    }
}

/// Parse the query text as a JSON filter document
///
/// # Errors
///
/// Returns an error if the text is not a JSON object
pub fn parse_filter(query: &str) -> anyhow::Result<Document> {
    serde_json::from_str::<Document>(query)
        .with_context(|| format!("Invalid query, expected a JSON filter document: {query}"))
}

#[async_trait]
impl Database for MongoDatabase {
    async fn query(&self, collection: &str, query: &str) -> Result<QueryResult, Error> {
        let filter = parse_filter(query)?;

        let collection = self.database.collection::<Document>(collection);
        let find = collection.find(filter);
        let cursor = match self.timeout {
            Some(timeout) => find.max_time(timeout).await?,
            None => find.await?,
        };

        let documents: QueryResult = cursor.try_collect().await?;
        Ok(documents)
    }
}
