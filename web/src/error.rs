use std::error::Error as StdError;
use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use http_body_util::LengthLimitError;
use log::*;

pub type Result<T> = core::result::Result<T, Error>;

/// Root error of the `web` layer. `error_kind` decides the HTTP status a
/// client sees; `source` keeps the underlying cause for the logs.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    Routing(RoutingErrorKind),
    Fallback(FallbackErrorKind),
    Request(RequestErrorKind),
}

/// Problems with a route table, detected once at startup.
#[derive(Debug, PartialEq)]
pub enum RoutingErrorKind {
    MissingCatchAll,
    CatchAllNotLast,
    /// A route kind paired with a pattern shape it cannot serve.
    UnsupportedPattern,
}

#[derive(Debug, PartialEq)]
pub enum FallbackErrorKind {
    /// The collaborator could not be set up (bad URL, TLS backend, ...).
    Config,
    /// The collaborator could not be reached or timed out.
    Network,
    /// The collaborator answered with something unreadable.
    InvalidResponse,
}

#[derive(Debug, PartialEq)]
pub enum RequestErrorKind {
    UnreadableBody,
    /// The body is longer than the gateway forwards.
    BodyTooLarge,
}

impl Error {
    pub fn new(error_kind: ErrorKind) -> Self {
        Error {
            source: None,
            error_kind,
        }
    }

    pub fn request_body(err: axum::Error) -> Self {
        let source = err.into_inner();
        let kind = if source.is::<LengthLimitError>() {
            RequestErrorKind::BodyTooLarge
        } else {
            RequestErrorKind::UnreadableBody
        };

        Error {
            source: Some(source),
            error_kind: ErrorKind::Request(kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Web Error: {:?}", self.error_kind)?;
        if let Some(source) = &self.source {
            write!(f, " ({source})")?;
        }
        Ok(())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        warn!("{self}");

        match self.error_kind {
            ErrorKind::Fallback(FallbackErrorKind::Network)
            | ErrorKind::Fallback(FallbackErrorKind::InvalidResponse) => {
                (StatusCode::BAD_GATEWAY, "BAD GATEWAY").into_response()
            }
            ErrorKind::Request(RequestErrorKind::UnreadableBody) => {
                (StatusCode::BAD_REQUEST, "BAD REQUEST").into_response()
            }
            ErrorKind::Request(RequestErrorKind::BodyTooLarge) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD TOO LARGE").into_response()
            }
            ErrorKind::Fallback(FallbackErrorKind::Config) | ErrorKind::Routing(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
            }
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_builder() {
            FallbackErrorKind::Config
        } else if err.is_connect() || err.is_timeout() || err.is_request() {
            FallbackErrorKind::Network
        } else {
            FallbackErrorKind::InvalidResponse
        };

        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Fallback(kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreachable_fallback_maps_to_bad_gateway() {
        let response =
            Error::new(ErrorKind::Fallback(FallbackErrorKind::Network)).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_unreadable_body_maps_to_bad_request() {
        let response =
            Error::new(ErrorKind::Request(RequestErrorKind::UnreadableBody)).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_body_over_limit_maps_to_payload_too_large() {
        let err = axum::body::to_bytes(axum::body::Body::from("too long"), 3)
            .await
            .unwrap_err();
        let err = Error::request_body(err);

        assert_eq!(
            err.error_kind,
            ErrorKind::Request(RequestErrorKind::BodyTooLarge)
        );
        assert_eq!(err.into_response().status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_routing_error_maps_to_internal_error() {
        let response =
            Error::new(ErrorKind::Routing(RoutingErrorKind::MissingCatchAll)).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
