use axum::{
    extract::State,
    response::sse::{KeepAliveStream, Sse},
};

use crate::{
    events::{event_stream, ConnectionHandle},
    AppState,
};

pub struct EventController;

impl EventController {
    pub async fn subscribe(State(state): State<AppState>) -> Sse<KeepAliveStream<ConnectionHandle>> {
        tracing::debug!(
            "new event subscriber ({} already connected)",
            state.events.connection_count()
        );
        event_stream(&state.events)
    }
}
