//! Order lifecycle and kitchen ticket orchestration
//!
//! Commands come in, events come out, the snapshot is a fold over the
//! events. Pricing and ticket coverage are recomputed after every fold.

pub mod actions;
pub mod appliers;
pub mod manager;
pub mod pricing;
pub mod tables;
pub mod tickets;
pub mod traits;

pub use manager::{OrderManager, RestaurantConfig};
pub use tables::TableBindingManager;
pub use traits::{CommandContext, CommandHandler, CommandMetadata, EventApplier, OrderError};
