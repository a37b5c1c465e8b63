//! Events published to listeners outside the request.

use serde::{Deserialize, Serialize};

use super::PlacedOrder;

/// Notifications emitted by the order workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum OrderEvent {
    /// A card order was charged and its payment recorded.
    #[serde(rename = "orderPlaced")]
    OrderPlaced(PlacedOrder),
}

impl OrderEvent {
    /// The event name listeners subscribe to.
    pub fn name(&self) -> &'static str {
        match self {
            OrderEvent::OrderPlaced(_) => "orderPlaced",
        }
    }

    pub fn order(&self) -> &PlacedOrder {
        match self {
            OrderEvent::OrderPlaced(order) => order,
        }
    }
}
