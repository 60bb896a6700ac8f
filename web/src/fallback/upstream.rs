use super::FallbackHandler;
use crate::error::{Error, Result};
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::extract::Request;
use axum::http::{header, HeaderMap, HeaderName, Uri};
use axum::response::Response;
use log::*;
use std::time::Duration;

/// Largest request body forwarded upstream.
const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// Headers that describe a single hop and must not be forwarded.
const HOP_BY_HOP_HEADERS: [HeaderName; 7] = [
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Forwards fallback requests to a separate HTTP service.
pub struct Upstream {
    client: reqwest::Client,
    base_url: String,
}

impl Upstream {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn target_url(&self, uri: &Uri) -> String {
        let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
        format!("{}{}", self.base_url, path_and_query)
    }
}

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP_HEADERS {
        headers.remove(name);
    }
    headers.remove("keep-alive");
}

#[async_trait]
impl FallbackHandler for Upstream {
    async fn handle(&self, request: Request) -> Result<Response> {
        let (parts, body) = request.into_parts();
        let url = self.target_url(&parts.uri);
        let body = to_bytes(body, MAX_BODY_BYTES)
            .await
            .map_err(Error::request_body)?;

        let mut headers = parts.headers;
        strip_hop_by_hop(&mut headers);
        headers.remove(header::HOST);

        debug!("Forwarding {} {} to {url}", parts.method, parts.uri);

        let upstream = self
            .client
            .request(parts.method, url)
            .headers(headers)
            .body(body)
            .send()
            .await?;

        let status = upstream.status();
        let mut headers = upstream.headers().clone();
        strip_hop_by_hop(&mut headers);
        let bytes = upstream.bytes().await?;

        let mut response = Response::new(Body::from(bytes));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, FallbackErrorKind, RequestErrorKind};
    use axum::http::{Method, StatusCode};
    use axum::response::IntoResponse;
    use axum::Router;
    use tokio::net::TcpListener;

    /// Echoes the request line and body back with a custom status and header.
    async fn echo(request: Request) -> impl IntoResponse {
        let (parts, body) = request.into_parts();
        let body = to_bytes(body, usize::MAX).await.unwrap();
        let line = format!(
            "{} {} {}",
            parts.method,
            parts.uri,
            String::from_utf8_lossy(&body)
        );
        (StatusCode::CREATED, [("x-upstream", "echo")], line)
    }

    async fn spawn_echo() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, Router::new().fallback(echo))
                .await
                .unwrap();
        });
        format!("http://{addr}/")
    }

    #[test]
    fn test_target_url_keeps_path_and_query() {
        let upstream = Upstream::new("http://backend:5000/", Duration::from_secs(1)).unwrap();
        let uri: Uri = "/tasks/3?verbose=1".parse().unwrap();

        assert_eq!(
            upstream.target_url(&uri),
            "http://backend:5000/tasks/3?verbose=1"
        );
    }

    #[test]
    fn test_hop_by_hop_headers_are_stripped() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONNECTION, "close".parse().unwrap());
        headers.insert("keep-alive", "timeout=5".parse().unwrap());
        headers.insert(header::CONTENT_TYPE, "text/plain".parse().unwrap());

        strip_hop_by_hop(&mut headers);

        assert_eq!(headers.len(), 1);
        assert!(headers.contains_key(header::CONTENT_TYPE));
    }

    #[tokio::test]
    async fn test_response_is_returned_verbatim() {
        let base_url = spawn_echo().await;
        let upstream = Upstream::new(&base_url, Duration::from_secs(5)).unwrap();

        let request = axum::http::Request::builder()
            .method(Method::POST)
            .uri("/tasks?page=2")
            .body(Body::from("payload"))
            .unwrap();
        let response = upstream.handle(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()["x-upstream"], "echo");
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"POST /tasks?page=2 payload");
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_a_network_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let upstream = Upstream::new(&format!("http://{addr}"), Duration::from_secs(5)).unwrap();
        let request = axum::http::Request::get("/anything")
            .body(Body::empty())
            .unwrap();

        let err = upstream.handle(request).await.unwrap_err();
        assert_eq!(
            err.error_kind,
            ErrorKind::Fallback(FallbackErrorKind::Network)
        );
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected_before_forwarding() {
        let upstream = Upstream::new("http://127.0.0.1:9", Duration::from_secs(5)).unwrap();
        let request = axum::http::Request::post("/upload")
            .body(Body::from(vec![b'x'; MAX_BODY_BYTES + 1]))
            .unwrap();

        let err = upstream.handle(request).await.unwrap_err();
        assert_eq!(
            err.error_kind,
            ErrorKind::Request(RequestErrorKind::BodyTooLarge)
        );
        assert_eq!(err.into_response().status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
