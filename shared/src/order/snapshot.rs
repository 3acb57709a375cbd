//! Order snapshot - the canonical aggregate state
//!
//! The snapshot includes a `state_checksum` field for drift detection:
//! consumers can compare a locally computed checksum with the server's to
//! detect divergence and trigger a full resync.

use super::ticket::KitchenTicket;
use super::types::{
    ItemStatus, OrderItemSnapshot, OrderType, PaymentRecord, PaymentStatus, PricingParams,
};
use serde::{Deserialize, Serialize};

/// Order status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Served,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Terminal states reject all further status changes and item mutations
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Whether items may still be added, changed, or removed
    ///
    /// After `Ready` the kitchen has finished cooking; item changes are
    /// rejected with `OrderLocked`.
    pub fn allows_item_changes(&self) -> bool {
        matches!(
            self,
            OrderStatus::Pending | OrderStatus::Confirmed | OrderStatus::Preparing
        )
    }

    /// The order lifecycle transition table
    ///
    /// Cancellation is a deliberate fast-exit accepted from any
    /// non-terminal state, independent of kitchen progress. Every other
    /// transition must follow the forward chain.
    pub fn can_transition_to(&self, target: OrderStatus) -> bool {
        use OrderStatus::*;
        if target == Cancelled {
            return !self.is_terminal();
        }
        matches!(
            (self, target),
            (Pending, Confirmed) | (Confirmed, Preparing) | (Preparing, Ready) | (Ready, Served) | (Served, Completed)
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Preparing => "PREPARING",
            OrderStatus::Ready => "READY",
            OrderStatus::Served => "SERVED",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
        };
        write!(f, "{}", s)
    }
}

/// Order snapshot - computed from the event stream
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderSnapshot {
    /// Order ID (assigned by server)
    pub order_id: String,
    /// Tenant scope
    pub restaurant_id: String,
    /// Human-readable order number (server-generated, immutable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_number: Option<String>,
    /// Order type
    pub order_type: OrderType,
    /// Order status
    pub status: OrderStatus,
    /// Items in the order (insertion order preserved for display)
    pub items: Vec<OrderItemSnapshot>,
    /// Kitchen tickets derived from the items (retained for audit)
    #[serde(default)]
    pub tickets: Vec<KitchenTicket>,
    /// Bound table (required iff dine-in; weak reference by id)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_id: Option<String>,
    /// Customer reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    /// Waiter or delivery person reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_id: Option<String>,
    /// Guest count (dine-in)
    #[serde(default)]
    pub guest_count: i32,
    /// Tax and adjustment parameters
    pub pricing: PricingParams,
    /// Subtotal before adjustments (derived)
    pub subtotal: f64,
    /// Discount amount (derived)
    #[serde(default)]
    pub discount_amount: f64,
    /// GST amount (derived)
    #[serde(default)]
    pub gst_amount: f64,
    /// VAT amount (derived)
    #[serde(default)]
    pub vat_amount: f64,
    /// Extra charges (from pricing params)
    #[serde(default)]
    pub extra_charges: f64,
    /// Grand total (derived)
    pub grand_total: f64,
    /// Amount paid - independent input, never derived
    #[serde(default)]
    pub paid_amount: f64,
    /// Payment status
    #[serde(default)]
    pub payment_status: PaymentStatus,
    /// Payment records (audit)
    #[serde(default)]
    pub payments: Vec<PaymentRecord>,
    /// Cancellation reason, set when the order is cancelled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_reason: Option<String>,
    /// Creation timestamp
    pub created_at: i64,
    /// Last update timestamp
    pub updated_at: i64,
    /// Last applied event sequence - doubles as the optimistic version
    pub last_sequence: u64,
    /// State checksum for drift detection (hex string)
    #[serde(default)]
    pub state_checksum: String,
}

impl OrderSnapshot {
    /// Create a new empty order
    pub fn new(order_id: String, restaurant_id: String) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        let mut snapshot = Self {
            order_id,
            restaurant_id,
            order_number: None,
            order_type: OrderType::DineIn,
            status: OrderStatus::Pending,
            items: Vec::new(),
            tickets: Vec::new(),
            table_id: None,
            customer_id: None,
            server_id: None,
            guest_count: 0,
            pricing: PricingParams::default(),
            subtotal: 0.0,
            discount_amount: 0.0,
            gst_amount: 0.0,
            vat_amount: 0.0,
            extra_charges: 0.0,
            grand_total: 0.0,
            paid_amount: 0.0,
            payment_status: PaymentStatus::Unpaid,
            payments: Vec::new(),
            cancel_reason: None,
            created_at: now,
            updated_at: now,
            last_sequence: 0,
            state_checksum: String::new(),
        };
        snapshot.update_checksum();
        snapshot
    }

    /// Check if the order can still be mutated
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Active (non-cancelled) items - the order's current item set
    pub fn active_items(&self) -> impl Iterator<Item = &OrderItemSnapshot> {
        self.items
            .iter()
            .filter(|i| i.status != ItemStatus::Cancelled)
    }

    /// Find an item by line id
    pub fn item(&self, line_id: &str) -> Option<&OrderItemSnapshot> {
        self.items.iter().find(|i| i.line_id == line_id)
    }

    /// Find a ticket by ticket number
    pub fn ticket(&self, ticket_number: &str) -> Option<&KitchenTicket> {
        self.tickets.iter().find(|t| t.ticket_number == ticket_number)
    }

    /// Tickets still counting toward order readiness
    pub fn open_tickets(&self) -> impl Iterator<Item = &KitchenTicket> {
        self.tickets.iter().filter(|t| t.is_open())
    }

    /// Live (non-cancelled) tickets - the audit-retained working set
    pub fn live_tickets(&self) -> impl Iterator<Item = &KitchenTicket> {
        self.tickets.iter().filter(|t| t.is_live())
    }

    /// Calculate remaining amount to pay
    pub fn remaining_amount(&self) -> f64 {
        (self.grand_total - self.paid_amount).max(0.0)
    }

    /// Check if fully paid
    pub fn is_fully_paid(&self) -> bool {
        self.paid_amount >= self.grand_total
    }

    /// Compute state checksum for drift detection
    ///
    /// Fields included: item count, grand_total and paid_amount in cents
    /// (avoids float precision issues), ticket count, last_sequence, and
    /// the status discriminant. Returns a 16-character hex string.
    pub fn compute_checksum(&self) -> String {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();

        self.items.len().hash(&mut hasher);
        ((self.grand_total * 100.0).round() as i64).hash(&mut hasher);
        ((self.paid_amount * 100.0).round() as i64).hash(&mut hasher);
        self.tickets.len().hash(&mut hasher);
        self.last_sequence.hash(&mut hasher);
        (self.status as u8).hash(&mut hasher);

        format!("{:016x}", hasher.finish())
    }

    /// Update the state_checksum field based on current state
    pub fn update_checksum(&mut self) {
        self.state_checksum = self.compute_checksum();
    }

    /// Verify that the state_checksum matches the computed checksum
    pub fn verify_checksum(&self) -> bool {
        self.state_checksum == self.compute_checksum()
    }
}
