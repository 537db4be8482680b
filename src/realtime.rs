//! In-process change notifications fanned out to SSE subscribers.

use futures_util::{Stream, stream};
use serde::Serialize;
use tokio::sync::broadcast::{self, error::RecvError};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::OrderStatus;

const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangeEvent {
    OrderChanged {
        order_id: Uuid,
        user_id: Uuid,
        status: OrderStatus,
    },
    RestaurantStatus {
        is_open: bool,
    },
}

impl ChangeEvent {
    /// SSE event name.
    pub fn name(&self) -> &'static str {
        match self {
            ChangeEvent::OrderChanged { .. } => "order_changed",
            ChangeEvent::RestaurantStatus { .. } => "restaurant_status",
        }
    }

    /// Staff see everything; customers see their own orders and the open flag.
    pub fn visible_to(&self, user_id: Uuid, is_staff: bool) -> bool {
        match self {
            ChangeEvent::OrderChanged {
                user_id: owner, ..
            } => is_staff || *owner == user_id,
            ChangeEvent::RestaurantStatus { .. } => true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventHub {
    sender: broadcast::Sender<ChangeEvent>,
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new(CHANNEL_CAPACITY)
    }
}

impl EventHub {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishing with no subscribers is not an error.
    pub fn publish(&self, event: ChangeEvent) {
        let receivers = self.sender.send(event.clone()).unwrap_or(0);
        tracing::debug!(event = event.name(), receivers, "change event published");
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }

    /// Events visible to one viewer. A slow viewer skips what it missed.
    pub fn stream_for(&self, user_id: Uuid, is_staff: bool) -> impl Stream<Item = ChangeEvent> + use<> {
        stream::unfold(self.subscribe(), move |mut receiver| async move {
            loop {
                match receiver.recv().await {
                    Ok(event) if event.visible_to(user_id, is_staff) => {
                        return Some((event, receiver));
                    }
                    Ok(_) => continue,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(%user_id, skipped, "event subscriber lagged");
                    }
                    Err(RecvError::Closed) => return None,
                }
            }
        })
    }
}
