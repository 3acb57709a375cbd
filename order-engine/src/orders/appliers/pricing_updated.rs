//! PricingParamsUpdated event applier
//!
//! Only swaps the parameters; the derived monetary fields are recomputed
//! by the manager's finalize step after all events of a command applied.

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// PricingParamsUpdated applier
pub struct PricingUpdatedApplier;

impl EventApplier for PricingUpdatedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::PricingParamsUpdated { pricing } = &event.payload {
            snapshot.pricing = *pricing;
            snapshot.updated_at = event.timestamp;
            snapshot.last_sequence = event.sequence;
        }
    }
}
