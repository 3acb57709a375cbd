//! Order events - immutable facts recorded after command processing
//!
//! Events are the outbound contract of the core: kitchen displays,
//! notification feeds, reporting and inventory deduction all subscribe to
//! this stream. Delivery is fire-and-forget from the core's perspective.

use super::snapshot::OrderStatus;
use super::ticket::{KitchenTicket, KotStatus};
use super::types::{OrderItemSnapshot, OrderType, PricingParams};
use serde::{Deserialize, Serialize};

/// Order event - immutable audit record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderEvent {
    /// Event unique ID
    pub event_id: String,
    /// Global sequence number (for ordering and replay)
    /// This is the AUTHORITATIVE ordering mechanism for state evolution
    pub sequence: u64,
    /// Order this event belongs to
    pub order_id: String,
    /// Server timestamp (Unix milliseconds) - AUTHORITATIVE for state evolution
    pub timestamp: i64,
    /// Client timestamp (Unix milliseconds) - for audit and debugging
    /// Preserved from the original command, may differ due to clock skew
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_timestamp: Option<i64>,
    /// Operator who triggered this event
    pub operator_id: String,
    /// Operator name (snapshot for audit)
    pub operator_name: String,
    /// Command that triggered this event (for audit tracing)
    pub command_id: String,
    /// Event type
    pub event_type: OrderEventType,
    /// Event payload
    pub payload: EventPayload,
}

/// Event type enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderEventType {
    // Lifecycle
    OrderCreated,
    OrderStatusChanged,

    // Items
    ItemsAdded,
    ItemRemoved,
    ItemQuantityChanged,

    // Pricing & payment
    PricingParamsUpdated,
    PaymentRecorded,

    // Kitchen tickets
    TicketCreated,
    TicketStatusChanged,
    TicketLineCancelled,

    // Table binding
    TableOccupied,
    TableReleased,
}

impl std::fmt::Display for OrderEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderEventType::OrderCreated => "ORDER_CREATED",
            OrderEventType::OrderStatusChanged => "ORDER_STATUS_CHANGED",
            OrderEventType::ItemsAdded => "ITEMS_ADDED",
            OrderEventType::ItemRemoved => "ITEM_REMOVED",
            OrderEventType::ItemQuantityChanged => "ITEM_QUANTITY_CHANGED",
            OrderEventType::PricingParamsUpdated => "PRICING_PARAMS_UPDATED",
            OrderEventType::PaymentRecorded => "PAYMENT_RECORDED",
            OrderEventType::TicketCreated => "TICKET_CREATED",
            OrderEventType::TicketStatusChanged => "TICKET_STATUS_CHANGED",
            OrderEventType::TicketLineCancelled => "TICKET_LINE_CANCELLED",
            OrderEventType::TableOccupied => "TABLE_OCCUPIED",
            OrderEventType::TableReleased => "TABLE_RELEASED",
        };
        write!(f, "{}", s)
    }
}

/// Event payload variants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventPayload {
    // ========== Lifecycle ==========
    OrderCreated {
        order_type: OrderType,
        /// Server-generated order number (always present)
        order_number: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        table_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        customer_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        server_id: Option<String>,
        guest_count: i32,
        /// Complete snapshots of the initial items
        items: Vec<OrderItemSnapshot>,
        pricing: PricingParams,
    },

    OrderStatusChanged {
        from: OrderStatus,
        to: OrderStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    // ========== Items ==========
    ItemsAdded {
        /// Complete snapshots of added items
        items: Vec<OrderItemSnapshot>,
    },

    ItemRemoved {
        line_id: String,
        item_name: String,
        /// Ticket that still references this item, if any
        #[serde(skip_serializing_if = "Option::is_none")]
        ticket_number: Option<String>,
        /// Whether the dispatched ticket line was cancelled (vs a free removal)
        #[serde(default)]
        cancelled_on_ticket: bool,
    },

    ItemQuantityChanged {
        line_id: String,
        previous_quantity: i32,
        quantity: i32,
    },

    // ========== Pricing & Payment ==========
    PricingParamsUpdated {
        pricing: PricingParams,
    },

    PaymentRecorded {
        payment_id: String,
        method: String,
        amount: f64,
    },

    // ========== Kitchen Tickets ==========
    TicketCreated {
        /// Complete ticket snapshot at creation
        ticket: KitchenTicket,
    },

    TicketStatusChanged {
        ticket_number: String,
        from: KotStatus,
        to: KotStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        chef_id: Option<String>,
    },

    TicketLineCancelled {
        ticket_number: String,
        line_id: String,
    },

    // ========== Table Binding ==========
    TableOccupied {
        table_id: String,
    },

    TableReleased {
        table_id: String,
    },
}

impl OrderEvent {
    /// Create a new event
    ///
    /// The server timestamp is always set here and is authoritative; the
    /// client timestamp is preserved from the command for audit only.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sequence: u64,
        order_id: String,
        operator_id: String,
        operator_name: String,
        command_id: String,
        client_timestamp: Option<i64>,
        event_type: OrderEventType,
        payload: EventPayload,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            sequence,
            order_id,
            timestamp: chrono::Utc::now().timestamp_millis(),
            client_timestamp,
            operator_id,
            operator_name,
            command_id,
            event_type,
            payload,
        }
    }

    /// Create event from command (extracts metadata including client timestamp)
    pub fn from_command(
        sequence: u64,
        order_id: String,
        command: &super::OrderCommand,
        event_type: OrderEventType,
        payload: EventPayload,
    ) -> Self {
        Self::new(
            sequence,
            order_id,
            command.operator_id.clone(),
            command.operator_name.clone(),
            command.command_id.clone(),
            Some(command.timestamp),
            event_type,
            payload,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_payload_tag() {
        let payload = EventPayload::TableReleased {
            table_id: "T1".to_string(),
        };
        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains("\"type\":\"TABLE_RELEASED\""));
    }

    #[test]
    fn test_status_changed_round_trip() {
        let payload = EventPayload::OrderStatusChanged {
            from: OrderStatus::Preparing,
            to: OrderStatus::Cancelled,
            reason: Some("guest left".to_string()),
        };
        let json = serde_json::to_string(&payload).unwrap();
        let back: EventPayload = serde_json::from_str(&json).unwrap();
        match back {
            EventPayload::OrderStatusChanged { from, to, reason } => {
                assert_eq!(from, OrderStatus::Preparing);
                assert_eq!(to, OrderStatus::Cancelled);
                assert_eq!(reason.as_deref(), Some("guest left"));
            }
            _ => panic!("wrong payload variant"),
        }
    }
}
