//! ItemRemoved event applier
//!
//! A free removal (item never dispatched) drops the line entirely. A
//! removal that cancelled a dispatched ticket line keeps the item with
//! `Cancelled` status for audit; the ticket line itself is cancelled by
//! the accompanying TicketLineCancelled event.

use crate::orders::traits::EventApplier;
use shared::order::types::ItemStatus;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// ItemRemoved applier
pub struct ItemRemovedApplier;

impl EventApplier for ItemRemovedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::ItemRemoved {
            line_id,
            cancelled_on_ticket,
            ..
        } = &event.payload
        {
            if *cancelled_on_ticket {
                if let Some(item) = snapshot.items.iter_mut().find(|i| &i.line_id == line_id) {
                    item.status = ItemStatus::Cancelled;
                }
            } else {
                snapshot.items.retain(|i| &i.line_id != line_id);
            }
            snapshot.updated_at = event.timestamp;
            snapshot.last_sequence = event.sequence;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::types::OrderItemSnapshot;

    fn snapshot_with_item() -> OrderSnapshot {
        let mut snapshot = OrderSnapshot::new("order-1".to_string(), "rest-1".to_string());
        snapshot.items = vec![OrderItemSnapshot {
            line_id: "a".to_string(),
            menu_item_id: "m1".to_string(),
            name: "Item".to_string(),
            unit_price: 10.0,
            quantity: 1,
            total_price: 10.0,
            status: ItemStatus::Sent,
            station_id: None,
            note: None,
        }];
        snapshot
    }

    fn removed_event(cancelled_on_ticket: bool) -> OrderEvent {
        OrderEvent::new(
            2,
            "order-1".to_string(),
            "user-1".to_string(),
            "Test User".to_string(),
            "cmd-1".to_string(),
            None,
            shared::order::OrderEventType::ItemRemoved,
            EventPayload::ItemRemoved {
                line_id: "a".to_string(),
                item_name: "Item".to_string(),
                ticket_number: cancelled_on_ticket.then(|| "KOT-0001".to_string()),
                cancelled_on_ticket,
            },
        )
    }

    #[test]
    fn test_free_removal_drops_line() {
        let mut snapshot = snapshot_with_item();
        ItemRemovedApplier.apply(&mut snapshot, &removed_event(false));
        assert!(snapshot.items.is_empty());
    }

    #[test]
    fn test_dispatched_removal_keeps_cancelled_line() {
        let mut snapshot = snapshot_with_item();
        ItemRemovedApplier.apply(&mut snapshot, &removed_event(true));
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.items[0].status, ItemStatus::Cancelled);
    }
}
