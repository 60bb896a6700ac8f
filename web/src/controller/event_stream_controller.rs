use crate::AppState;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use futures::StreamExt;
use log::*;
use std::convert::Infallible;

/// SSE handler that holds the connection open and pushes the shared value
/// every time it changes. Each message is `data: <json>` followed by a
/// blank line.
pub(crate) async fn subscribe(State(app_state): State<AppState>) -> Response {
    let session = app_state.feed.open_session();
    debug!(
        "Establishing event stream for session {}",
        session.connection_id().as_str()
    );

    let stream = session
        .into_stream()
        .map(|snapshot| Ok::<_, Infallible>(Event::default().data(snapshot.data())));

    let sse = Sse::new(stream);
    match app_state.config.keep_alive() {
        Some(interval) => sse
            .keep_alive(KeepAlive::new().interval(interval))
            .into_response(),
        None => sse.into_response(),
    }
}
