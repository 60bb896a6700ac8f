//! The fallback collaborator answers every request no other route claims.
//!
//! The gateway hands over the full request and returns the collaborator's
//! response untouched; it never looks inside either.

pub mod tasks;
pub mod upstream;

use crate::error::Result;
use crate::AppState;
use async_trait::async_trait;
use axum::extract::{Request, State};
use axum::response::Response;
use axum::Router;
use tower::ServiceExt;

pub use upstream::Upstream;

/// Request in, response out.
#[async_trait]
pub trait FallbackHandler: Send + Sync {
    async fn handle(&self, request: Request) -> Result<Response>;
}

/// Catch-all route: forwards to the configured collaborator.
pub(crate) async fn forward(
    State(app_state): State<AppState>,
    request: Request,
) -> Result<Response> {
    app_state.fallback.handle(request).await
}

/// Serves fallback requests with an in-process axum application.
pub struct RouterFallback {
    router: Router,
}

impl RouterFallback {
    pub fn new(router: Router) -> Self {
        Self { router }
    }
}

#[async_trait]
impl FallbackHandler for RouterFallback {
    async fn handle(&self, request: Request) -> Result<Response> {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .unwrap_or_else(|never| match never {});
        Ok(response)
    }
}
