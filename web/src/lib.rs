//! HTTP surface of the gateway: the route table, the event stream endpoint,
//! static assets, and the fallback collaborator that answers everything else.

use axum::Router;
use log::*;
use service::config::Config;
use sse::Manager;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

pub mod controller;
pub mod error;
pub mod fallback;
pub mod router;

pub use fallback::FallbackHandler;
pub use router::RouteTable;

/// The value type published by the gateway.
pub type Feed = Manager<serde_json::Value>;

// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub feed: Arc<Feed>,
    pub fallback: Arc<dyn FallbackHandler>,
}

impl AppState {
    pub fn new(config: Config, feed: Arc<Feed>, fallback: Arc<dyn FallbackHandler>) -> Self {
        Self {
            config,
            feed,
            fallback,
        }
    }
}

pub fn app(app_state: AppState) -> Router {
    RouteTable::standard().into_router(app_state)
}

/// Serves the gateway on `listener` until `shutdown` is cancelled, then
/// waits for in-flight responses to finish.
pub async fn serve(
    listener: TcpListener,
    app_state: AppState,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let local_addr = listener.local_addr()?;
    info!("Server starting... listening for connections on http://{local_addr}");

    axum::serve(listener, app(app_state))
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    info!("Server stopped accepting connections");
    Ok(())
}
