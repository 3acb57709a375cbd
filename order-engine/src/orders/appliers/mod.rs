//! Event applier implementations
//!
//! Each applier implements the `EventApplier` trait and handles
//! one specific event type. Appliers are PURE functions.

use enum_dispatch::enum_dispatch;

use shared::order::{EventPayload, OrderEvent};

mod item_quantity_changed;
mod item_removed;
mod items_added;
mod order_created;
mod payment_recorded;
mod pricing_updated;
mod status_changed;
mod table_binding;
mod ticket_created;
mod ticket_line_cancelled;
mod ticket_status_changed;

pub use item_quantity_changed::ItemQuantityChangedApplier;
pub use item_removed::ItemRemovedApplier;
pub use items_added::ItemsAddedApplier;
pub use order_created::OrderCreatedApplier;
pub use payment_recorded::PaymentRecordedApplier;
pub use pricing_updated::PricingUpdatedApplier;
pub use status_changed::StatusChangedApplier;
pub use table_binding::{TableOccupiedApplier, TableReleasedApplier};
pub use ticket_created::TicketCreatedApplier;
pub use ticket_line_cancelled::TicketLineCancelledApplier;
pub use ticket_status_changed::TicketStatusChangedApplier;

/// EventAction enum - dispatches to concrete applier implementations
///
/// Uses enum_dispatch for zero-cost static dispatch.
#[enum_dispatch(EventApplier)]
pub enum EventAction {
    OrderCreated(OrderCreatedApplier),
    StatusChanged(StatusChangedApplier),
    ItemsAdded(ItemsAddedApplier),
    ItemRemoved(ItemRemovedApplier),
    ItemQuantityChanged(ItemQuantityChangedApplier),
    PricingUpdated(PricingUpdatedApplier),
    PaymentRecorded(PaymentRecordedApplier),
    TicketCreated(TicketCreatedApplier),
    TicketStatusChanged(TicketStatusChangedApplier),
    TicketLineCancelled(TicketLineCancelledApplier),
    TableOccupied(TableOccupiedApplier),
    TableReleased(TableReleasedApplier),
}

/// Convert OrderEvent reference to EventAction
///
/// This is the ONLY place with a match on EventPayload.
impl From<&OrderEvent> for EventAction {
    fn from(event: &OrderEvent) -> Self {
        match &event.payload {
            EventPayload::OrderCreated { .. } => EventAction::OrderCreated(OrderCreatedApplier),
            EventPayload::OrderStatusChanged { .. } => {
                EventAction::StatusChanged(StatusChangedApplier)
            }
            EventPayload::ItemsAdded { .. } => EventAction::ItemsAdded(ItemsAddedApplier),
            EventPayload::ItemRemoved { .. } => EventAction::ItemRemoved(ItemRemovedApplier),
            EventPayload::ItemQuantityChanged { .. } => {
                EventAction::ItemQuantityChanged(ItemQuantityChangedApplier)
            }
            EventPayload::PricingParamsUpdated { .. } => {
                EventAction::PricingUpdated(PricingUpdatedApplier)
            }
            EventPayload::PaymentRecorded { .. } => {
                EventAction::PaymentRecorded(PaymentRecordedApplier)
            }
            EventPayload::TicketCreated { .. } => EventAction::TicketCreated(TicketCreatedApplier),
            EventPayload::TicketStatusChanged { .. } => {
                EventAction::TicketStatusChanged(TicketStatusChangedApplier)
            }
            EventPayload::TicketLineCancelled { .. } => {
                EventAction::TicketLineCancelled(TicketLineCancelledApplier)
            }
            EventPayload::TableOccupied { .. } => EventAction::TableOccupied(TableOccupiedApplier),
            EventPayload::TableReleased { .. } => EventAction::TableReleased(TableReleasedApplier),
        }
    }
}
