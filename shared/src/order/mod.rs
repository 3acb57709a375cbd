//! Order Lifecycle Module
//!
//! This module provides types for the order lifecycle core:
//! - Commands: Requests from clients to mutate orders
//! - Events: Immutable facts recorded after command processing
//! - Snapshots: Canonical order state, including derived kitchen tickets

pub mod command;
pub mod event;
pub mod snapshot;
pub mod ticket;
pub mod types;

// Re-exports
pub use command::{OrderCommand, OrderCommandPayload};
pub use event::{EventPayload, OrderEvent, OrderEventType};
pub use snapshot::{OrderSnapshot, OrderStatus};
pub use ticket::{KitchenTicket, KotStatus, TicketLine, TicketPriority};
pub use types::*;
