//! Live counters pushed to every connected client over server-sent events.
//!
//! Delivery is best effort: a client that is not connected when an event is
//! broadcast never sees it, and nothing is replayed on reconnect.

use axum::response::sse::{Event, KeepAlive, KeepAliveStream, Sse};
use futures_util::Stream;
use parking_lot::Mutex;
use serde::Serialize;
use std::{
    collections::VecDeque,
    convert::Infallible,
    pin::Pin,
    sync::{Arc, Weak},
    task::{Context, Poll, Waker},
};
use uuid::Uuid;

/// Events kept for a client that is not reading. Older ones are dropped.
const MAX_PENDING_EVENTS: usize = 64;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum ServerEvent {
    /// An artist gained or lost a follower.
    ArtistFollow { artist_id: String, followers: usize },
    /// A video was liked or unliked.
    VideoLike { video_id: String, likes: usize },
    /// A comment was posted under a video.
    VideoComment { video_id: String, comments: usize },
}

/// Manages server sent event connections
pub struct ServerSentEvents {
    me: Weak<Self>,
    connections: Mutex<Vec<Connection>>,
}

struct Connection {
    id: Uuid,
    pending_messages: Arc<Mutex<VecDeque<ServerEvent>>>,
    waker: Arc<Mutex<Option<Waker>>>,
}

pub struct ConnectionHandle {
    id: Uuid,
    /// A reference to [Connection]'s pending messages
    pending_messages: Arc<Mutex<VecDeque<ServerEvent>>>,
    /// A reference to [Connection]'s stored [Waker]
    waker: Arc<Mutex<Option<Waker>>>,
    /// Required to remove connection when dropped
    manager: Weak<ServerSentEvents>,
}

impl ServerSentEvents {
    pub fn new() -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            me: me.clone(),
            connections: Default::default(),
        })
    }

    pub fn broadcast(&self, event: ServerEvent) {
        let connections = self.connections.lock();
        tracing::debug!("broadcasting {:?} to {} client(s)", event, connections.len());

        for connection in connections.iter() {
            connection.send(event.clone())
        }
    }

    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    pub fn connect(&self) -> ConnectionHandle {
        let connection = Connection::new();
        let handle = connection.handle(self.me.clone());

        self.connections.lock().push(connection);
        handle
    }

    fn disconnect(&self, id: Uuid) {
        self.connections.lock().retain(|c| c.id != id)
    }
}

impl Connection {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            pending_messages: Default::default(),
            waker: Default::default(),
        }
    }

    fn send(&self, message: ServerEvent) {
        {
            let mut pending = self.pending_messages.lock();
            if pending.len() >= MAX_PENDING_EVENTS {
                pending.pop_front();
            }
            pending.push_back(message);
        }

        if let Some(waker) = self.waker.lock().take() {
            waker.wake()
        }
    }

    fn handle(&self, manager: Weak<ServerSentEvents>) -> ConnectionHandle {
        ConnectionHandle {
            id: self.id,
            pending_messages: self.pending_messages.clone(),
            waker: self.waker.clone(),
            manager,
        }
    }
}

impl Stream for ConnectionHandle {
    type Item = Result<Event, Infallible>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut pending_messages = self.pending_messages.lock();

        while let Some(message) = pending_messages.pop_front() {
            match Event::default().json_data(&message) {
                Ok(event) => return Poll::Ready(Some(Ok(event))),
                Err(e) => tracing::error!("could not serialize {:?}: {}", message, e),
            }
        }

        *self.waker.lock() = Some(cx.waker().clone());
        Poll::Pending
    }
}

impl Drop for ConnectionHandle {
    fn drop(&mut self) {
        if let Some(manager) = self.manager.upgrade() {
            manager.disconnect(self.id)
        }
    }
}

pub fn event_stream(events: &ServerSentEvents) -> Sse<KeepAliveStream<ConnectionHandle>> {
    Sse::new(events.connect()).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::{FutureExt, StreamExt};

    #[tokio::test]
    async fn test_broadcast_reaches_every_connection() {
        let events = ServerSentEvents::new();
        let mut first = events.connect();
        let mut second = events.connect();
        assert_eq!(events.connection_count(), 2);

        events.broadcast(ServerEvent::ArtistFollow {
            artist_id: "a1".into(),
            followers: 3,
        });

        assert!(first.next().await.is_some());
        assert!(second.next().await.is_some());
    }

    #[tokio::test]
    async fn test_dropped_connection_is_removed() {
        let events = ServerSentEvents::new();
        let handle = events.connect();
        assert_eq!(events.connection_count(), 1);

        drop(handle);
        assert_eq!(events.connection_count(), 0);

        // Broadcasting with nobody listening is a no-op.
        events.broadcast(ServerEvent::VideoLike {
            video_id: "v1".into(),
            likes: 1,
        });
    }

    #[tokio::test]
    async fn test_stalled_client_keeps_latest_events() {
        let events = ServerSentEvents::new();
        let mut stalled = events.connect();

        for likes in 0..MAX_PENDING_EVENTS + 10 {
            events.broadcast(ServerEvent::VideoLike {
                video_id: "v1".into(),
                likes,
            });
        }
        assert_eq!(stalled.pending_messages.lock().len(), MAX_PENDING_EVENTS);

        let first = stalled.pending_messages.lock().front().cloned();
        assert_eq!(
            first,
            Some(ServerEvent::VideoLike {
                video_id: "v1".into(),
                likes: 10,
            })
        );
        assert!(stalled.next().await.is_some());
    }

    #[tokio::test]
    async fn test_late_subscriber_gets_no_replay() {
        let events = ServerSentEvents::new();
        events.broadcast(ServerEvent::VideoComment {
            video_id: "v1".into(),
            comments: 1,
        });

        let mut late = events.connect();
        assert!(late.next().now_or_never().is_none());
    }
}
