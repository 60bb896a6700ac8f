use crate::AppState;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;

/// GET / sends browsers to the static entry document.
pub(crate) async fn redirect(State(app_state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::FOUND,
        [(header::LOCATION, app_state.config.index_location())],
    )
}
