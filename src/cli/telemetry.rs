use anyhow::Result;
use clap::ArgMatches;
use tracing::Level;
use tracing_subscriber::{EnvFilter, filter::LevelFilter, fmt, prelude::*};

/// Map the `-v` count to a log level
#[must_use]
pub fn extract_verbosity(matches: &ArgMatches) -> Level {
    match matches.get_count("verbose") {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn filter(level: Level) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy()
}

/// Install the global subscriber, `RUST_LOG` overrides `level`
///
/// Logs go to stderr, stdout carries one JSON line per check.
///
/// # Errors
///
/// Returns an error if a global subscriber is already set
pub fn init(level: Level) -> Result<()> {
    tracing_subscriber::registry()
        .with(filter(level))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()?;

    Ok(())
}
