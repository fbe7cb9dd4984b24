//! TLS configuration for the `MongoDB` connection
//!
//! The driver performs the handshake itself, this module only maps the
//! command line settings onto its options.
//!
//! # Example
//!
//! ```rust,ignore
//! use mongopulse::tls::{TlsConfig, TlsMode};
//!
//! let tls_config = TlsConfig {
//!     mode: TlsMode::VerifyFull,
//!     ca: Some("/etc/ssl/certs/ca.crt".into()),
//!     ..Default::default()
//! };
//!
//! let tls = tls_config.to_driver_tls();
//! ```

pub mod config;

pub use config::{TlsConfig, TlsMode};
