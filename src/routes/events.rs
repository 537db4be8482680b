use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::{Stream, StreamExt};

use crate::{middleware::auth::AuthUser, state::AppState};

#[utoipa::path(
    get,
    path = "/api/events",
    responses(
        (status = 200, description = "Server-sent stream of order and restaurant changes", content_type = "text/event-stream"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Events"
)]
pub async fn subscribe(
    State(state): State<AppState>,
    user: AuthUser,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    tracing::debug!(user_id = %user.user_id, staff = user.is_staff(), "event stream opened");

    let stream = state
        .events
        .stream_for(user.user_id, user.is_staff())
        .filter_map(|event| async move {
            match Event::default().event(event.name()).json_data(&event) {
                Ok(sse_event) => Some(Ok(sse_event)),
                Err(err) => {
                    tracing::warn!(error = %err, "failed to encode change event");
                    None
                }
            }
        });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
