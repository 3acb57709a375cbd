//! Shared types for the order lifecycle core

use serde::{Deserialize, Serialize};

// ============================================================================
// Order Type
// ============================================================================

/// Order type - dine-in orders require a bound table for their duration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    #[default]
    DineIn,
    Takeaway,
    Delivery,
    Online,
}

impl OrderType {
    /// Dine-in is the only type that binds a physical table
    pub fn requires_table(&self) -> bool {
        matches!(self, OrderType::DineIn)
    }
}

// ============================================================================
// Payment
// ============================================================================

/// Payment status - driven by recorded payments, finalized at close
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    PartiallyPaid,
    Paid,
}

/// Payment record in snapshot (audit trail; paid_amount is the sum)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentRecord {
    pub payment_id: String,
    pub method: String,
    pub amount: f64,
    pub timestamp: i64,
}

// ============================================================================
// Line Item Types
// ============================================================================

/// Per-item status mirroring the owning ticket's progress
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemStatus {
    /// Not yet on any ticket (order still pending)
    #[default]
    Queued,
    Sent,
    Acknowledged,
    Preparing,
    Ready,
    Cancelled,
}

/// Order line item snapshot - complete snapshot for event recording
///
/// `name` and `unit_price` are denormalized at add time; later catalog
/// price changes never retroactively alter an existing order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItemSnapshot {
    /// Line instance ID (unique within the order)
    pub line_id: String,
    /// Menu item reference
    pub menu_item_id: String,
    /// Item name snapshot
    pub name: String,
    /// Unit price snapshot at add time
    pub unit_price: f64,
    /// Quantity (positive)
    pub quantity: i32,
    /// Line total (computed: unit_price * quantity)
    pub total_price: f64,
    /// Status mirroring ticket progress
    #[serde(default)]
    pub status: ItemStatus,
    /// Kitchen station this item routes to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub station_id: Option<String>,
    /// Item note
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Order item input - for adding items (without line_id)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemInput {
    /// Menu item reference
    pub menu_item_id: String,
    /// Item name (overridden by catalog metadata when a catalog is configured)
    pub name: String,
    /// Unit price (overridden by catalog metadata when a catalog is configured)
    pub unit_price: f64,
    /// Quantity
    pub quantity: i32,
    /// Item note
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// One entry of the desired item set passed to UpdateItems
///
/// `Keep` carries over an existing line (optionally with a new quantity);
/// lines absent from the set are removed. `Add` introduces a new line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemSetEntry {
    Keep {
        line_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        quantity: Option<i32>,
    },
    Add { item: OrderItemInput },
}

// ============================================================================
// Pricing Parameters
// ============================================================================

/// Tax and adjustment parameters for an order
///
/// All derived monetary fields on the snapshot are recomputed from these
/// plus the line items; they are never mutated independently.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct PricingParams {
    /// Discount percentage applied to the subtotal (0-100)
    #[serde(default)]
    pub discount_percent: f64,
    /// GST percentage applied to the discount-adjusted amount (0-100)
    #[serde(default)]
    pub gst_percent: f64,
    /// Whether GST applies to this order
    #[serde(default)]
    pub is_gst_applied: bool,
    /// VAT percentage applied to the discount-adjusted amount (0-100)
    #[serde(default)]
    pub vat_percent: f64,
    /// Flat extra charges (service, packing, delivery)
    #[serde(default)]
    pub extra_charges: f64,
}

// ============================================================================
// Command Response
// ============================================================================

/// Command response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    /// The command ID this responds to
    pub command_id: String,
    /// Whether the command succeeded
    pub success: bool,
    /// Order the command acted on (assigned by server for CreateOrder)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Updated order snapshot after a successful mutation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<super::snapshot::OrderSnapshot>,
    /// Error details if failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CommandError>,
}

impl CommandResponse {
    pub fn success(
        command_id: String,
        order_id: Option<String>,
        order: Option<super::snapshot::OrderSnapshot>,
    ) -> Self {
        Self {
            command_id,
            success: true,
            order_id,
            order,
            error: None,
        }
    }

    pub fn error(command_id: String, error: CommandError) -> Self {
        Self {
            command_id,
            success: false,
            order_id: None,
            order: None,
            error: Some(error),
        }
    }

    /// Acknowledge a command that was already processed (idempotent replay)
    pub fn duplicate(command_id: String) -> Self {
        Self {
            command_id,
            success: true,
            order_id: None,
            order: None,
            error: None,
        }
    }
}

/// Command error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandError {
    pub code: CommandErrorCode,
    pub message: String,
}

impl CommandError {
    pub fn new(code: CommandErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Command error codes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandErrorCode {
    // Validation
    EmptyOrder,
    InvalidOrder,
    InvalidItem,
    InvalidPricingParams,
    InvalidAmount,
    // State conflicts
    InvalidTransition,
    OrderClosed,
    OrderLocked,
    TicketsPending,
    TableUnavailable,
    ItemAlreadyDispatched,
    // Concurrency
    ConcurrentModification,
    // Invariant defects
    PricingInvariantViolation,
    // Lookups
    OrderNotFound,
    TicketNotFound,
    ItemNotFound,
    TableNotFound,
    MenuItemUnavailable,
    // System
    InternalError,
}
