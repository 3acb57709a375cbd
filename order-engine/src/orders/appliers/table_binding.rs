//! Table binding event appliers
//!
//! The actual occupancy slot lives in the table binding manager; on the
//! snapshot these events only maintain the weak table reference. The
//! reference is kept after release so closed orders still show where
//! they were served.

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// TableOccupied applier
pub struct TableOccupiedApplier;

impl EventApplier for TableOccupiedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::TableOccupied { table_id } = &event.payload {
            snapshot.table_id = Some(table_id.clone());
            snapshot.updated_at = event.timestamp;
            snapshot.last_sequence = event.sequence;
        }
    }
}

/// TableReleased applier
pub struct TableReleasedApplier;

impl EventApplier for TableReleasedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::TableReleased { .. } = &event.payload {
            snapshot.updated_at = event.timestamp;
            snapshot.last_sequence = event.sequence;
        }
    }
}
