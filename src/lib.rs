//! Watch a `MongoDB` database: check that it is reachable, optionally run a
//! query and validate what it returns.
//!
//! ```rust,ignore
//! use mongopulse::watcher::Watcher;
//!
//! let watcher = Watcher::create_with(
//!     "orders-db",
//!     "mongodb://localhost:27017",
//!     "orders",
//!     None,
//!     |builder| {
//!         builder
//!             .with_query("items", r#"{"status": "shipped"}"#)
//!             .ensure(|documents| !documents.is_empty())
//!     },
//! )?;
//!
//! let result = watcher.execute().await?;
//! ```

pub mod cli;
pub mod metrics;
pub mod mongo;
pub mod pulse;
pub mod tls;
pub mod watcher;
