use crate::{
    metrics::{
        DOCUMENTS_RETURNED, ERRORS, ITERATIONS_TOTAL, LAST_RUNTIME_MS, LAST_SUCCESS,
        PANICS_RECOVERED, PULSE, RUNTIME, WATCHER_FAULTS, encode_metrics,
    },
    watcher::{CheckResult, Error, Outcome, Watcher},
};
use axum::{Router, http::StatusCode, response::IntoResponse, routing::get};
use chrono::{DateTime, Duration, Utc};
use futures::FutureExt;
use serde::Serialize;
use std::net::IpAddr;
use tokio::{net::TcpListener, task, time};
use tracing::{error, info};

/// One line of output per check
#[derive(Serialize, Debug)]
struct Pulse<'a> {
    runtime_ms: i64,
    #[serde(flatten)]
    result: Option<&'a CheckResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fault: Option<String>,
}

impl<'a> Pulse<'a> {
    fn new(outcome: &'a Outcome, runtime_ms: i64) -> Self {
        match outcome {
            Outcome::Healthy(result) | Outcome::Unhealthy(result) => Self {
                runtime_ms,
                result: Some(result),
                fault: None,
            },
            Outcome::Fault(err) => Self {
                runtime_ms,
                result: None,
                fault: Some(fault_message(err)),
            },
        }
    }
}

/// Start the monitoring service
///
/// # Errors
///
/// Returns an error if the service fails to start or bind to the port
pub async fn start(
    watcher: Watcher,
    interval: u16,
    listen: Option<IpAddr>,
    port: u16,
) -> anyhow::Result<()> {
    // Metrics are registered with REGISTRY on first use
    let app = Router::new().route("/metrics", get(metrics_handler));

    // Bind to socket with smart fallback
    let (listener, bind_addr) = match listen {
        Some(addr) => {
            let socket_addr = format!("{addr}:{port}");
            let listener = TcpListener::bind(&socket_addr).await?;
            (listener, socket_addr)
        }
        None => {
            // Auto mode: try IPv6 first, fallback to IPv4
            if let Ok(l) = TcpListener::bind(format!("::0:{port}")).await {
                (l, format!("[::]:{port}"))
            } else {
                let socket_addr = format!("0.0.0.0:{port}");
                (TcpListener::bind(&socket_addr).await?, socket_addr)
            }
        }
    };

    info!(
        listen = %bind_addr,
        interval,
        watcher = watcher.name(),
        database = watcher.configuration().database(),
        "Listening"
    );

    // keep JoinHandle to detect task failures
    let monitor_handle = task::spawn(async move { run_loop(watcher, interval).await });

    let server = axum::serve(listener, app.into_make_service());

    tokio::select! {
        result = server => {
            result?;
        }
        result = monitor_handle => {
            match result {
                Ok(()) => {
                    error!("Monitoring loop exited unexpectedly");
                    anyhow::bail!("Monitoring loop stopped");
                }
                Err(e) => {
                    error!("Monitoring loop panicked: {e}");
                    anyhow::bail!("Monitoring loop panicked: {e}");
                }
            }
        }
    }

    Ok(())
}

async fn metrics_handler() -> impl IntoResponse {
    match encode_metrics() {
        Ok(buffer) => (StatusCode::OK, buffer),
        Err(e) => {
            error!("{e}");
            (StatusCode::INTERNAL_SERVER_ERROR, Vec::new())
        }
    }
}

fn fault_message(err: &Error) -> String {
    match std::error::Error::source(err) {
        Some(source) => format!("{err} {source}"),
        None => err.to_string(),
    }
}

/// Label for `mongopulse_errors_total`
fn classify_failure(result: &CheckResult) -> &'static str {
    if result.query_result.is_some() {
        return "validation";
    }

    let description = result
        .description
        .as_deref()
        .unwrap_or_default()
        .to_lowercase();

    if description.ends_with("has not been found.") {
        "not_found"
    } else if description.contains("authentication") || description.contains("unauthorized") {
        "authentication"
    } else if description.contains("timed out") {
        "timeout"
    } else if description.contains("refused")
        || description.contains("i/o error")
        || description.contains("connection")
    {
        // server selection timeouts carry the underlying I/O error
        "connection"
    } else if description.contains("timeout") {
        "timeout"
    } else {
        "query"
    }
}

fn record(watcher: &str, outcome: &Outcome, now: DateTime<Utc>, runtime_ms: i64) {
    LAST_RUNTIME_MS.with_label_values(&[watcher]).set(runtime_ms);

    match outcome {
        Outcome::Healthy(result) => {
            PULSE.set(1);
            ITERATIONS_TOTAL
                .with_label_values(&[watcher, "success"])
                .inc();
            LAST_SUCCESS
                .with_label_values(&[watcher])
                .set(now.timestamp());
            record_documents(watcher, result);
        }
        Outcome::Unhealthy(result) => {
            PULSE.set(0);
            ITERATIONS_TOTAL.with_label_values(&[watcher, "error"]).inc();
            ERRORS
                .with_label_values(&[watcher, classify_failure(result)])
                .inc();
            record_documents(watcher, result);
        }
        Outcome::Fault(_) => {
            PULSE.set(0);
            ITERATIONS_TOTAL.with_label_values(&[watcher, "fault"]).inc();
            WATCHER_FAULTS.with_label_values(&[watcher]).inc();
        }
    }
}

fn record_documents(watcher: &str, result: &CheckResult) {
    if let Some(documents) = &result.query_result {
        DOCUMENTS_RETURNED
            .with_label_values(&[watcher])
            .set(i64::try_from(documents.len()).unwrap_or(i64::MAX));
    }
}

#[inline]
fn remaining_sleep_duration(wait_time: Duration, runtime: Duration) -> Option<time::Duration> {
    wait_time
        .checked_sub(&runtime)
        .and_then(|remaining| remaining.to_std().ok())
        .filter(|duration| !duration.is_zero())
}

async fn run_loop(watcher: Watcher, every: u16) {
    loop {
        // Catch panics in individual iterations to keep loop alive
        let iteration_result = std::panic::AssertUnwindSafe(async {
            let now = Utc::now();
            let wait_time = Duration::seconds(every.into());

            let timer = RUNTIME.start_timer();
            let outcome = watcher.check().await;
            timer.observe_duration();

            let runtime = Utc::now().signed_duration_since(now);
            let runtime_ms = runtime.num_milliseconds();

            record(watcher.name(), &outcome, now, runtime_ms);

            if let Ok(serialized) = serde_json::to_string(&Pulse::new(&outcome, runtime_ms)) {
                println!("{serialized}");
            }

            // Sleep for remaining interval time to maintain fixed interval
            if let Some(remaining) = remaining_sleep_duration(wait_time, runtime) {
                time::sleep(remaining).await;
            }
        })
        .catch_unwind()
        .await;

        if let Err(panic_info) = iteration_result {
            error!("Panic in monitoring loop iteration: {panic_info:?}");
            PULSE.set(0);
            PANICS_RECOVERED.inc();
            time::sleep(time::Duration::from_secs(every.into())).await;
        }
    }
}
