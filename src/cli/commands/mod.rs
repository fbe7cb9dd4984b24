use clap::{
    Arg, ArgAction, ColorChoice, Command,
    builder::styling::{AnsiColor, Effects, Styles},
};

/// Pure clap command definitions with zero business logic
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new(env!("CARGO_PKG_NAME"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("uri")
                .env("MONGOPULSE_URI")
                .help("mongodb://<username>:<password>@<host>:<port>/?<options>")
                .long("uri")
                .short('u')
                .value_name("URI")
                .required(true),
        )
        .arg(
            Arg::new("database")
                .env("MONGOPULSE_DATABASE")
                .help("database to watch, the check fails if it does not exist")
                .long("database")
                .short('d')
                .value_name("NAME")
                .required(true),
        )
        .arg(
            Arg::new("collection")
                .env("MONGOPULSE_COLLECTION")
                .help("collection the query runs against")
                .long("collection")
                .short('c')
                .value_name("NAME"),
        )
        .arg(
            Arg::new("query")
                .env("MONGOPULSE_QUERY")
                .help("JSON filter document to run on every check")
                .long("query")
                .long_help(
                    "JSON filter document to run on every check.\n\
                    Without a query only the database availability is checked.\n\n\
                    Example: '{\"status\": \"shipped\"}'",
                )
                .short('q')
                .value_name("JSON")
                .requires("collection"),
        )
        .arg(
            Arg::new("min-documents")
                .env("MONGOPULSE_MIN_DOCUMENTS")
                .help("fail the check when the query returns fewer documents")
                .long("min-documents")
                .value_name("N")
                .requires("query")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("timeout")
                .env("MONGOPULSE_TIMEOUT")
                .help("seconds to wait for the server and the query")
                .long("timeout")
                .short('t')
                .value_name("SECONDS")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new("name")
                .default_value("mongodb")
                .env("MONGOPULSE_NAME")
                .help("watcher name, used as the metrics label")
                .long("name")
                .short('n'),
        )
        .arg(
            Arg::new("interval")
                .default_value("30")
                .env("MONGOPULSE_INTERVAL")
                .help("number of seconds between checks")
                .long("interval")
                .short('i')
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("listen")
                .env("MONGOPULSE_LISTEN")
                .help("IP address to bind to (default: [::]:port, accepts both IPv6 and IPv4)")
                .long("listen")
                .long_help(
                    "IP address to bind to:\n\
                    Not specified (default) binds to [::]:port which accepts both IPv6 and IPv4 connections.\n\
                    Falls back to 0.0.0.0:port if IPv6 is unavailable.\n\n\
                    Usage examples:\n\
                    - `--listen 0.0.0.0` binds IPv4 only\n\
                    - `--listen ::1` binds IPv6 loopback",
                )
                .short('l')
                .value_name("IP"),
        )
        .arg(
            Arg::new("port")
                .default_value("9300")
                .env("MONGOPULSE_PORT")
                .help("listening port for /metrics")
                .long("port")
                .short('p')
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("tls-mode")
                .default_value("disable")
                .env("MONGOPULSE_TLS_MODE")
                .help("TLS/SSL mode: disable, require, verify-ca, verify-full")
                .long("tls-mode")
                .long_help(
                    "TLS/SSL connection mode:\n\n\
                    - disable: keep whatever the connection string says (default)\n\
                    - require: TLS required, no certificate verification\n\
                    - verify-ca: verify the server certificate against the CA\n\
                    - verify-full: verify certificate and hostname",
                )
                .value_name("MODE")
                .value_parser(["disable", "require", "verify-ca", "verify-full"]),
        )
        .arg(
            Arg::new("tls-ca")
                .env("MONGOPULSE_TLS_CA")
                .help("Path to CA certificate file for TLS verification")
                .long("tls-ca")
                .value_name("PATH"),
        )
        .arg(
            Arg::new("tls-cert")
                .env("MONGOPULSE_TLS_CERT")
                .help("Path to client certificate and key (single PEM) for TLS client authentication")
                .long("tls-cert")
                .value_name("PATH"),
        )
        .arg(
            Arg::new("verbose")
                .help("increase log verbosity, -vv for debug")
                .long("verbose")
                .short('v')
                .action(ArgAction::Count),
        )
}
