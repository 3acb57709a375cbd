//! OrderCreated event applier
//!
//! Applies the OrderCreated event to build initial snapshot state.

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot, OrderStatus};

/// OrderCreated applier
pub struct OrderCreatedApplier;

impl EventApplier for OrderCreatedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::OrderCreated {
            order_type,
            order_number,
            table_id,
            customer_id,
            server_id,
            guest_count,
            items,
            pricing,
        } = &event.payload
        {
            // Set order_id from event (important for replay scenarios)
            snapshot.order_id = event.order_id.clone();
            snapshot.order_number = Some(order_number.clone());
            snapshot.order_type = *order_type;
            snapshot.status = OrderStatus::Pending;
            snapshot.items = items.clone();
            snapshot.table_id = table_id.clone();
            snapshot.customer_id = customer_id.clone();
            snapshot.server_id = server_id.clone();
            snapshot.guest_count = *guest_count;
            snapshot.pricing = *pricing;
            snapshot.created_at = event.timestamp;
            snapshot.updated_at = event.timestamp;
            snapshot.last_sequence = event.sequence;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::types::{ItemStatus, OrderItemSnapshot, OrderType, PricingParams};

    #[test]
    fn test_order_created_applier() {
        let mut snapshot = OrderSnapshot::new("order-1".to_string(), "rest-1".to_string());

        let event = OrderEvent::new(
            1,
            "order-1".to_string(),
            "user-1".to_string(),
            "Test User".to_string(),
            "cmd-1".to_string(),
            Some(1234567890),
            shared::order::OrderEventType::OrderCreated,
            EventPayload::OrderCreated {
                order_type: OrderType::DineIn,
                order_number: "ORD202601240001".to_string(),
                table_id: Some("T1".to_string()),
                customer_id: None,
                server_id: Some("srv-1".to_string()),
                guest_count: 4,
                items: vec![OrderItemSnapshot {
                    line_id: "a".to_string(),
                    menu_item_id: "m1".to_string(),
                    name: "Item".to_string(),
                    unit_price: 10.0,
                    quantity: 2,
                    total_price: 20.0,
                    status: ItemStatus::Queued,
                    station_id: None,
                    note: None,
                }],
                pricing: PricingParams::default(),
            },
        );

        OrderCreatedApplier.apply(&mut snapshot, &event);

        assert_eq!(snapshot.order_number.as_deref(), Some("ORD202601240001"));
        assert_eq!(snapshot.status, OrderStatus::Pending);
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.table_id.as_deref(), Some("T1"));
        assert_eq!(snapshot.guest_count, 4);
        assert_eq!(snapshot.last_sequence, 1);
    }
}
