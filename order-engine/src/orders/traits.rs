//! Core traits and errors for the command/event pipeline
//!
//! Commands are handled by `CommandHandler` implementations that validate
//! against an immutable view and produce events; `EventApplier`
//! implementations fold events into snapshots and are pure.

use async_trait::async_trait;
use enum_dispatch::enum_dispatch;
use shared::models::KitchenStation;
use shared::order::snapshot::OrderStatus;
use shared::order::ticket::KotStatus;
use shared::order::{CommandError, CommandErrorCode, OrderEvent, OrderSnapshot};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// Core errors
#[derive(Debug, Error)]
pub enum OrderError {
    // ========== Validation (rejected before any mutation) ==========
    #[error("order contains no items")]
    EmptyOrder,

    #[error("invalid order: {0}")]
    InvalidOrder(String),

    #[error("invalid item: {0}")]
    InvalidItem(String),

    #[error("invalid pricing params: {0}")]
    InvalidPricingParams(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    // ========== State conflicts (business rule violations) ==========
    #[error("invalid transition from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("invalid ticket transition from {from:?} to {to:?}")]
    InvalidTicketTransition { from: KotStatus, to: KotStatus },

    #[error("order {0} is closed ({1})")]
    OrderClosed(String, OrderStatus),

    #[error("order {0} is locked for item changes ({1})")]
    OrderLocked(String, OrderStatus),

    #[error("{0} ticket(s) not yet ready")]
    TicketsPending(usize),

    #[error("table {0} is unavailable")]
    TableUnavailable(String),

    #[error("item {0} already dispatched to kitchen (ticket {1})")]
    ItemAlreadyDispatched(String, String),

    #[error("menu item {0} is unavailable")]
    MenuItemUnavailable(String),

    // ========== Concurrency ==========
    #[error("concurrent modification: expected sequence {expected}, current {current}")]
    ConcurrentModification { expected: u64, current: u64 },

    #[error("order {0} is being modified by another command")]
    OrderBusy(String),

    // ========== Invariant defects ==========
    #[error("pricing invariant violation: {0}")]
    PricingInvariant(String),

    // ========== Lookups ==========
    #[error("order not found: {0}")]
    OrderNotFound(String),

    #[error("ticket not found: {0}")]
    TicketNotFound(String),

    #[error("item not found: {0}")]
    ItemNotFound(String),

    #[error("table not found: {0}")]
    TableNotFound(String),

    // ========== System ==========
    #[error("internal error: {0}")]
    Internal(String),
}

impl OrderError {
    /// The serializable error code for this error
    pub fn code(&self) -> CommandErrorCode {
        use OrderError::*;
        match self {
            EmptyOrder => CommandErrorCode::EmptyOrder,
            InvalidOrder(_) => CommandErrorCode::InvalidOrder,
            InvalidItem(_) => CommandErrorCode::InvalidItem,
            InvalidPricingParams(_) => CommandErrorCode::InvalidPricingParams,
            InvalidAmount(_) => CommandErrorCode::InvalidAmount,
            InvalidTransition { .. } | InvalidTicketTransition { .. } => {
                CommandErrorCode::InvalidTransition
            }
            OrderClosed(_, _) => CommandErrorCode::OrderClosed,
            OrderLocked(_, _) => CommandErrorCode::OrderLocked,
            TicketsPending(_) => CommandErrorCode::TicketsPending,
            TableUnavailable(_) => CommandErrorCode::TableUnavailable,
            ItemAlreadyDispatched(_, _) => CommandErrorCode::ItemAlreadyDispatched,
            MenuItemUnavailable(_) => CommandErrorCode::MenuItemUnavailable,
            ConcurrentModification { .. } | OrderBusy(_) => CommandErrorCode::ConcurrentModification,
            PricingInvariant(_) => CommandErrorCode::PricingInvariantViolation,
            OrderNotFound(_) => CommandErrorCode::OrderNotFound,
            TicketNotFound(_) => CommandErrorCode::TicketNotFound,
            ItemNotFound(_) => CommandErrorCode::ItemNotFound,
            TableNotFound(_) => CommandErrorCode::TableNotFound,
            Internal(_) => CommandErrorCode::InternalError,
        }
    }
}

impl From<OrderError> for CommandError {
    fn from(err: OrderError) -> Self {
        let code = err.code();
        let message = err.to_string();
        match &err {
            // Invariant breaches indicate an upstream data or configuration
            // defect, not user input
            OrderError::PricingInvariant(_) | OrderError::Internal(_) => {
                tracing::error!(error = %err, error_code = ?code, "Invariant violation");
            }
            _ => {
                tracing::warn!(error = %err, error_code = ?code, "Command rejected");
            }
        }
        CommandError::new(code, message)
    }
}

/// Command metadata extracted from the triggering command
#[derive(Debug, Clone)]
pub struct CommandMetadata {
    pub command_id: String,
    pub operator_id: String,
    pub operator_name: String,
    /// Client timestamp (Unix milliseconds)
    pub timestamp: i64,
}

/// Execution context handed to command handlers
///
/// Holds an immutable view of the target order (None when creating),
/// restaurant station configuration, and the sequence/ticket-number
/// allocators. Handlers never mutate state directly; they emit events.
pub struct CommandContext<'a> {
    current: Option<&'a OrderSnapshot>,
    stations: &'a [KitchenStation],
    sequence: &'a AtomicU64,
    ticket_counter: &'a AtomicU64,
}

impl<'a> CommandContext<'a> {
    pub fn new(
        current: Option<&'a OrderSnapshot>,
        stations: &'a [KitchenStation],
        sequence: &'a AtomicU64,
        ticket_counter: &'a AtomicU64,
    ) -> Self {
        Self {
            current,
            stations,
            sequence,
            ticket_counter,
        }
    }

    /// The target order's current snapshot
    pub fn current(&self) -> Result<&'a OrderSnapshot, OrderError> {
        self.current
            .ok_or_else(|| OrderError::Internal("no target order in context".to_string()))
    }

    /// Configured kitchen stations (empty for single-station restaurants)
    pub fn stations(&self) -> &'a [KitchenStation] {
        self.stations
    }

    /// Allocate the next global event sequence number
    ///
    /// Sequences allocated by a command that later fails are skipped,
    /// never reused; gaps are expected.
    pub fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Allocate the next ticket number, unique per restaurant
    ///
    /// Numbers allocated by a command that later fails are skipped, never
    /// reused.
    pub fn next_ticket_number(&self) -> String {
        let n = self.ticket_counter.fetch_add(1, Ordering::SeqCst) + 1;
        format!("KOT-{:04}", n)
    }
}

/// Command handler - validates and produces events
#[async_trait]
pub trait CommandHandler {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError>;
}

// enum_dispatch expands the EventAction impl at the trait site, so the
// applier types must be in scope here.
use super::appliers::{
    EventAction, ItemQuantityChangedApplier, ItemRemovedApplier, ItemsAddedApplier,
    OrderCreatedApplier, PaymentRecordedApplier, PricingUpdatedApplier, StatusChangedApplier,
    TableOccupiedApplier, TableReleasedApplier, TicketCreatedApplier, TicketLineCancelledApplier,
    TicketStatusChangedApplier,
};

/// Event applier - pure fold of one event into a snapshot
#[enum_dispatch]
pub trait EventApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent);
}
