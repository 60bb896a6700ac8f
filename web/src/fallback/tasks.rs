//! Built-in task API used as the fallback collaborator when no upstream is
//! configured. Every task is generated on the fly, deterministically from
//! its id, so the same id always yields the same task.

use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use sse::source::fake;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub done: bool,
}

impl Task {
    pub fn generate(id: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(id);
        Task {
            id,
            title: fake::catch_phrase(&mut rng),
            description: fake::text(&mut rng),
            done: false,
        }
    }
}

#[derive(Debug, Serialize)]
struct TaskResponse {
    task: Task,
}

pub fn router() -> Router {
    Router::new().route("/tasks/{task_id}", get(read))
}

/// GET a generated task by its integer id. Non-integer ids are not routes.
async fn read(Path(task_id): Path<String>) -> Response {
    match task_id.parse::<u64>() {
        Ok(id) => Json(TaskResponse {
            task: Task::generate(id),
        })
        .into_response(),
        Err(_) => StatusCode::NOT_FOUND.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    async fn get_json(uri: &str) -> (StatusCode, Option<Value>) {
        let response = router()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).ok())
    }

    #[tokio::test]
    async fn test_read_returns_task_envelope() {
        let (status, body) = get_json("/tasks/42").await;
        let task = &body.unwrap()["task"];

        assert_eq!(status, StatusCode::OK);
        assert_eq!(task["id"], 42);
        assert_eq!(task["done"], false);
        assert!(task["title"].as_str().is_some_and(|t| !t.is_empty()));
        assert!(task["description"].as_str().is_some_and(|d| !d.is_empty()));
    }

    #[tokio::test]
    async fn test_read_is_deterministic_per_id() {
        let (_, first) = get_json("/tasks/7").await;
        let (_, second) = get_json("/tasks/7").await;

        assert_eq!(first, second);
        assert_ne!(Task::generate(7), Task::generate(8));
    }

    #[tokio::test]
    async fn test_non_integer_id_is_not_found() {
        let (status, _) = get_json("/tasks/seven").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
