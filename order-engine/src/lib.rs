//! Order Lifecycle & Kitchen Ticket Orchestration core
//!
//! The engine owns the canonical order aggregates for one restaurant
//! (tenant): lifecycle transitions, pricing recomputation, kitchen ticket
//! derivation and progression, and table occupancy binding. Persistence,
//! transport, rendering and notification delivery are external
//! collaborators; the core only emits logical events.

pub mod catalog;
pub mod orders;

pub use catalog::Catalog;
pub use orders::manager::{OrderManager, RestaurantConfig};
