//! ItemQuantityChanged event applier

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// ItemQuantityChanged applier
pub struct ItemQuantityChangedApplier;

impl EventApplier for ItemQuantityChangedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::ItemQuantityChanged {
            line_id, quantity, ..
        } = &event.payload
        {
            if let Some(item) = snapshot.items.iter_mut().find(|i| &i.line_id == line_id) {
                item.quantity = *quantity;
            }
            snapshot.updated_at = event.timestamp;
            snapshot.last_sequence = event.sequence;
        }
    }
}
