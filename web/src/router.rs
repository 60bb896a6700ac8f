use crate::controller::{event_stream_controller, root_controller};
use crate::error::{Error, ErrorKind, Result, RoutingErrorKind};
use crate::{fallback, AppState};
use axum::extract::Request;
use axum::http::Uri;
use axum::routing::get;
use axum::Router;
use log::*;
use service::config::{EVENTS_PATH, STATIC_PREFIX};
use tower::util::MapRequest;
use tower::ServiceExt;
use tower_http::services::ServeDir;

/// What a matched request is dispatched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    RootRedirect,
    EventStream,
    StaticAssets,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// The path must equal this string.
    Exact(&'static str),
    /// The path must be this string or continue with `/` after it.
    Prefix(&'static str),
    /// Matches every path. Only valid as the last entry.
    Any,
}

impl Pattern {
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Pattern::Exact(exact) => path == *exact,
            Pattern::Prefix(prefix) => path
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/')),
            Pattern::Any => true,
        }
    }

    /// True when every path `other` matches is also matched by `self`.
    fn covers(&self, other: &Pattern) -> bool {
        match (self, other) {
            (Pattern::Any, _) => true,
            (_, Pattern::Any) => false,
            (Pattern::Exact(path), Pattern::Exact(other)) => path == other,
            (Pattern::Exact(_), Pattern::Prefix(_)) => false,
            (Pattern::Prefix(_), Pattern::Exact(other) | Pattern::Prefix(other)) => {
                self.matches(other)
            }
        }
    }
}

/// Ordered (pattern, route) pairs. The first matching pattern wins and the
/// table always ends with a catch-all. Built once at startup, never changed.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<(Pattern, Route)>,
}

impl RouteTable {
    pub fn new(routes: Vec<(Pattern, Route)>) -> Result<Self> {
        let catch_all = routes
            .iter()
            .position(|(pattern, _)| *pattern == Pattern::Any)
            .ok_or_else(|| Error::new(ErrorKind::Routing(RoutingErrorKind::MissingCatchAll)))?;
        if catch_all != routes.len() - 1 {
            return Err(Error::new(ErrorKind::Routing(
                RoutingErrorKind::CatchAllNotLast,
            )));
        }

        let supported = routes.iter().all(|(pattern, route)| {
            matches!(
                (pattern, route),
                (Pattern::Exact(_), Route::RootRedirect)
                    | (Pattern::Exact(_), Route::EventStream)
                    | (Pattern::Prefix(_), Route::StaticAssets)
                    | (Pattern::Any, Route::Fallback)
            )
        });
        if !supported {
            return Err(Error::new(ErrorKind::Routing(
                RoutingErrorKind::UnsupportedPattern,
            )));
        }

        Ok(Self { routes })
    }

    /// `/` redirect, `/events` stream, `/static/...` files, everything else
    /// to the fallback collaborator.
    pub fn standard() -> Self {
        Self {
            routes: vec![
                (Pattern::Exact("/"), Route::RootRedirect),
                (Pattern::Exact(EVENTS_PATH), Route::EventStream),
                (Pattern::Prefix(STATIC_PREFIX), Route::StaticAssets),
                (Pattern::Any, Route::Fallback),
            ],
        }
    }

    pub fn resolve(&self, path: &str) -> Route {
        self.routes
            .iter()
            .find(|(pattern, _)| pattern.matches(path))
            .map(|(_, route)| *route)
            .unwrap_or(Route::Fallback)
    }

    /// Mounts every entry that an earlier entry does not fully cover. A
    /// prefix whose bare path is claimed earlier still serves everything
    /// below it, so the router agrees with `resolve`.
    pub fn into_router(self, app_state: AppState) -> Router {
        let mut router = Router::new();
        let mut earlier: Vec<Pattern> = Vec::with_capacity(self.routes.len());

        for (pattern, route) in self.routes {
            if earlier.iter().any(|claimed| claimed.covers(&pattern)) {
                debug!("Route {route:?} at {pattern:?} is shadowed by an earlier entry");
                continue;
            }

            router = match (&pattern, route) {
                (Pattern::Exact(path), Route::RootRedirect) => {
                    router.route(path, get(root_controller::redirect))
                }
                (Pattern::Exact(path), Route::EventStream) => {
                    router.route(path, get(event_stream_controller::subscribe))
                }
                (Pattern::Prefix(prefix), Route::StaticAssets) => {
                    let files = static_files(&app_state, *prefix);
                    let below = format!("{}/{{*path}}", prefix.trim_end_matches('/'));
                    let router = router.route_service(&below, files.clone());

                    if earlier.iter().any(|claimed| claimed.matches(prefix)) {
                        debug!("Bare path {prefix} is claimed by an earlier entry");
                        router
                    } else {
                        router.route_service(prefix, files)
                    }
                }
                (Pattern::Any, Route::Fallback) => router.fallback(fallback::forward),
                // Rejected by `RouteTable::new`
                _ => router,
            };

            earlier.push(pattern);
        }

        router.with_state(app_state)
    }
}

/// Files under `static_dir`, addressed by the path below `prefix`.
fn static_files(
    app_state: &AppState,
    prefix: &'static str,
) -> MapRequest<ServeDir, impl Fn(Request) -> Request + Clone> {
    let strip = move |request: Request| strip_prefix(prefix, request);
    ServeDir::new(app_state.config.static_dir())
        .append_index_html_on_directories(false)
        .map_request(strip)
}

fn strip_prefix(prefix: &str, mut request: Request) -> Request {
    let uri = request.uri();
    let below = uri.path().strip_prefix(prefix).unwrap_or(uri.path());
    let below = if below.is_empty() { "/" } else { below };
    let path_and_query = match uri.query() {
        Some(query) => format!("{below}?{query}"),
        None => below.to_string(),
    };

    if let Ok(stripped) = path_and_query.parse::<Uri>() {
        *request.uri_mut() = stripped;
    }
    request
}
