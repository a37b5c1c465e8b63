//! Order event notifier.

use std::sync::Arc;

use domain::OrderEvent;
use tokio::sync::broadcast;

/// Fire-and-forget publisher for order events.
///
/// Publishing never fails from the caller's point of view and carries no
/// delivery guarantee.
pub trait Notifier: Send + Sync {
    fn publish(&self, event: OrderEvent);
}

impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    fn publish(&self, event: OrderEvent) {
        (**self).publish(event)
    }
}

/// In-process notifier over a tokio broadcast channel.
///
/// Events published with no live subscriber are dropped; slow subscribers
/// lose the oldest events once `capacity` is exceeded.
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    sender: broadcast::Sender<OrderEvent>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(256)
    }
}

impl Notifier for BroadcastNotifier {
    fn publish(&self, event: OrderEvent) {
        let name = event.name();
        let order_id = event.order().id();
        match self.sender.send(event) {
            Ok(receivers) => {
                metrics::counter!("order_events_published_total", "event" => name).increment(1);
                tracing::debug!(event = name, %order_id, receivers, "order event published");
            }
            Err(_) => {
                tracing::debug!(event = name, %order_id, "order event dropped, no subscribers");
            }
        }
    }
}
