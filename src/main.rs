use log::*;
use service::config::{Config, ValueSourceKind};
use service::logging::Logger;
use sse::source::{CounterSource, Json, PersonSource};
use sse::{RefreshTask, ValueCell, ValueSource};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use web::fallback::{tasks, FallbackHandler, RouterFallback, Upstream};
use web::{AppState, Feed};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::new();
    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to start logger: {e}");
    }

    info!(
        "Starting live gateway (value source: {}, refresh every {:?})",
        config.value_source,
        config.refresh_interval()
    );

    let shutdown = CancellationToken::new();
    let cell = Arc::new(ValueCell::new());

    let refresh = match config.value_source {
        ValueSourceKind::Person => {
            start_refresh(Json(PersonSource::new()), &cell, &config, &shutdown).await
        }
        ValueSourceKind::Counter => {
            start_refresh(Json(CounterSource::default()), &cell, &config, &shutdown).await
        }
    };

    let fallback: Arc<dyn FallbackHandler> = match config.fallback_url() {
        Some(url) => match Upstream::new(url, config.fallback_timeout()) {
            Ok(upstream) => {
                info!("Forwarding unmatched routes to {url}");
                Arc::new(upstream)
            }
            Err(e) => {
                error!("Failed to set up fallback upstream {url}: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => {
            info!("Serving unmatched routes with the built-in task API");
            Arc::new(RouterFallback::new(tasks::router()))
        }
    };

    let listener = match TcpListener::bind((config.interface(), config.port)).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(
                "Failed to bind {}:{}: {e}",
                config.interface(),
                config.port
            );
            return ExitCode::FAILURE;
        }
    };

    tokio::spawn(shutdown_on_signal(shutdown.clone()));

    let feed = Arc::new(Feed::new(cell, shutdown.clone()));
    let app_state = AppState::new(config, feed, fallback);

    let served_cleanly = report_served(web::serve(listener, app_state, shutdown.clone()).await);

    shutdown.cancel();
    if let Err(e) = refresh.await {
        warn!("Refresh task ended abnormally: {e}");
    }
    info!("Shutdown complete");

    if served_cleanly {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Logs a server that stopped on an I/O error. Such a stop exits non-zero.
fn report_served(served: std::io::Result<()>) -> bool {
    match served {
        Ok(()) => true,
        Err(e) => {
            error!("Server error: {e}");
            false
        }
    }
}

/// Seeds the cell with a first value, then keeps it fresh on a timer.
async fn start_refresh<S>(
    source: S,
    cell: &Arc<ValueCell<serde_json::Value>>,
    config: &Config,
    shutdown: &CancellationToken,
) -> JoinHandle<()>
where
    S: ValueSource<Value = serde_json::Value>,
{
    let refresh = RefreshTask::new(
        source,
        Arc::clone(cell),
        config.refresh_interval(),
        shutdown.clone(),
    );

    if let Err(e) = refresh.prime().await {
        warn!("Starting without an initial value: {e}");
    }

    refresh.spawn()
}

async fn shutdown_on_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for interrupt signal: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for terminate signal: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Interrupt received, shutting down"),
        _ = terminate => info!("Terminate received, shutting down"),
    }

    shutdown.cancel();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_stop_exits_successfully() {
        assert!(report_served(Ok(())));
    }

    #[test]
    fn test_server_error_exits_with_failure() {
        let served = Err(std::io::Error::other("accept failed"));
        assert!(!report_served(served));
    }
}
