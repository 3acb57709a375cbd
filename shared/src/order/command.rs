//! Order commands - requests from clients to mutate orders
//!
//! Every mutating operation on the core enters as an `OrderCommand`. The
//! optional `expected_sequence` is an optimistic concurrency token: when
//! supplied, the command is rejected with `CONCURRENT_MODIFICATION` if the
//! order has moved past that sequence, and the caller should reread and
//! resubmit.

use super::snapshot::OrderStatus;
use super::types::{ItemSetEntry, OrderItemInput, OrderType, PricingParams};
use serde::{Deserialize, Serialize};

/// Order command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCommand {
    /// Command unique ID (for idempotency and audit tracing)
    pub command_id: String,
    /// Operator submitting the command
    pub operator_id: String,
    /// Operator name (snapshot for audit)
    pub operator_name: String,
    /// Client timestamp (Unix milliseconds)
    pub timestamp: i64,
    /// Optimistic concurrency token: the order's last_sequence the client saw
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_sequence: Option<u64>,
    /// Command payload
    pub payload: OrderCommandPayload,
}

impl OrderCommand {
    /// Create a new command with a generated id and current timestamp
    pub fn new(
        operator_id: impl Into<String>,
        operator_name: impl Into<String>,
        payload: OrderCommandPayload,
    ) -> Self {
        Self {
            command_id: uuid::Uuid::new_v4().to_string(),
            operator_id: operator_id.into(),
            operator_name: operator_name.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            expected_sequence: None,
            payload,
        }
    }

    /// Attach an optimistic concurrency token
    pub fn with_expected_sequence(mut self, sequence: u64) -> Self {
        self.expected_sequence = Some(sequence);
        self
    }

    /// The order this command targets, if it targets an existing one
    pub fn order_id(&self) -> Option<&str> {
        use OrderCommandPayload::*;
        match &self.payload {
            CreateOrder { .. } => None,
            UpdateItems { order_id, .. }
            | TransitionStatus { order_id, .. }
            | UpdatePricingParams { order_id, .. }
            | RecordPayment { order_id, .. }
            | AcknowledgeTicket { order_id, .. }
            | StartTicket { order_id, .. }
            | CompleteTicket { order_id, .. } => Some(order_id),
        }
    }
}

/// Command payload variants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderCommandPayload {
    /// Create a new order in `Pending`
    ///
    /// Dine-in orders must carry a `table_id`; the table is bound
    /// atomically with the creation.
    CreateOrder {
        order_type: OrderType,
        #[serde(skip_serializing_if = "Option::is_none")]
        table_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        customer_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        server_id: Option<String>,
        #[serde(default)]
        guest_count: i32,
        items: Vec<OrderItemInput>,
        pricing: PricingParams,
    },

    /// Replace the order's item set with the desired set
    ///
    /// The delta against existing items is computed server-side and
    /// reconciled against open kitchen tickets.
    UpdateItems {
        order_id: String,
        entries: Vec<ItemSetEntry>,
        /// Explicit override: cancel dispatched ticket lines for removed
        /// items instead of rejecting with ITEM_ALREADY_DISPATCHED
        #[serde(default)]
        cancel_dispatched: bool,
    },

    /// Apply a lifecycle transition
    TransitionStatus {
        order_id: String,
        target: OrderStatus,
        /// Cancellation/void reason (audit)
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    /// Update discount/tax parameters; triggers recomputation only
    UpdatePricingParams {
        order_id: String,
        pricing: PricingParams,
    },

    /// Record a payment against the order (paid amount is independent input)
    RecordPayment {
        order_id: String,
        method: String,
        amount: f64,
    },

    /// Kitchen acknowledged the ticket
    AcknowledgeTicket {
        order_id: String,
        ticket_number: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        chef_id: Option<String>,
    },

    /// Kitchen started preparing the ticket
    StartTicket {
        order_id: String,
        ticket_number: String,
    },

    /// Kitchen finished the ticket
    CompleteTicket {
        order_id: String,
        ticket_number: String,
    },
}
