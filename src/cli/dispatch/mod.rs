use crate::{
    cli::actions::Action,
    tls::{TlsConfig, TlsMode},
    watcher::Watcher,
};
use anyhow::{Context, Result};
use clap::ArgMatches;
use std::{net::IpAddr, path::PathBuf, time::Duration};

/// Extract TLS configuration from the `--tls-*` arguments
fn extract_tls_config(matches: &ArgMatches) -> Result<TlsConfig> {
    let mode = matches
        .get_one::<String>("tls-mode")
        .map(|mode| mode.parse::<TlsMode>().map_err(anyhow::Error::msg))
        .transpose()?
        .unwrap_or_default();

    Ok(TlsConfig {
        mode,
        ca: matches.get_one::<String>("tls-ca").map(PathBuf::from),
        cert: matches.get_one::<String>("tls-cert").map(PathBuf::from),
    })
}

/// Convert `ArgMatches` into typed Action enum with validation
///
/// # Errors
///
/// Returns an error if the watcher configuration is invalid or required
/// parameters are missing
pub fn dispatch(matches: &ArgMatches) -> Result<Action> {
    let uri = matches
        .get_one::<String>("uri")
        .context("MongoDB connection string is required")?;

    let database = matches
        .get_one::<String>("database")
        .context("MongoDB database is required")?;

    let name = matches
        .get_one::<String>("name")
        .map_or("mongodb", String::as_str);

    let collection = matches.get_one::<String>("collection");
    let query = matches.get_one::<String>("query");
    let min_documents = matches.get_one::<usize>("min-documents").copied();

    let timeout = matches
        .get_one::<u64>("timeout")
        .copied()
        .map(Duration::from_secs);

    // Extract interval with default
    let interval = matches.get_one::<u16>("interval").copied().unwrap_or(30);

    // Extract and validate listen address
    let listen = matches
        .get_one::<String>("listen")
        .map(|addr| {
            addr.parse::<IpAddr>()
                .with_context(|| format!("Invalid IP address: {addr}"))
        })
        .transpose()?;

    // Extract port with default
    let port = matches.get_one::<u16>("port").copied().unwrap_or(9300);

    let tls = extract_tls_config(matches)?;

    let watcher = Watcher::create_with(name, uri, database, timeout, |builder| {
        let mut builder = builder.with_tls(tls);

        if let (Some(collection), Some(query)) = (collection, query) {
            builder = builder.with_query(collection, query);
        }

        if let Some(min) = min_documents {
            builder = builder.ensure(move |documents| documents.len() >= min);
        }

        builder
    })
    .context("Invalid watcher configuration")?;

    Ok(Action::Monitor {
        watcher,
        interval,
        listen,
        port,
    })
}
