//! Process-level plumbing shared by every service binary
//!
//! - Tracing subscriber setup
//! - Prometheus exporter installation
//! - Graceful shutdown signal and bounded drain

use crate::config::ObservabilityConfig;
use crate::errors::{AppError, Result};
use crate::metrics::UPSTREAM_BUCKETS;
use axum::Router;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::oneshot;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber
///
/// `RUST_LOG` wins over the configured level when set.
pub fn init_tracing(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.json_logging {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Start the Prometheus scrape endpoint when a metrics port is configured
pub fn install_metrics_exporter(config: &ObservabilityConfig) -> Result<()> {
    if config.metrics_port == 0 {
        info!("Metrics exporter disabled");
        return Ok(());
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
    let exporter_error = |e: metrics_exporter_prometheus::BuildError| AppError::Configuration {
        message: format!("Failed to install metrics exporter: {}", e),
    };

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .set_buckets_for_metric(
            Matcher::Suffix("duration_seconds".to_string()),
            UPSTREAM_BUCKETS,
        )
        .map_err(exporter_error)?
        .install()
        .map_err(exporter_error)?;

    info!(%addr, "Metrics exporter listening");
    Ok(())
}

/// Graceful shutdown signal handler
pub async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}

/// Serve `app` until `shutdown` resolves, then give in-flight requests
/// `drain` to finish before returning anyway.
pub async fn serve_until<F>(
    listener: TcpListener,
    app: Router,
    shutdown: F,
    drain: Duration,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (started_tx, started_rx) = oneshot::channel::<()>();
    let signal = async move {
        shutdown.await;
        let _ = started_tx.send(());
    };

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(signal)
        .into_future();
    tokio::pin!(server);

    let deadline = async move {
        if started_rx.await.is_err() {
            std::future::pending::<()>().await;
        }
        tokio::time::sleep(drain).await;
    };

    tokio::select! {
        result = &mut server => result?,
        _ = deadline => {
            warn!(
                drain_secs = drain.as_secs_f64(),
                "Shutdown drain timed out, dropping open connections"
            );
        }
    }

    Ok(())
}
