//! TicketCreated event applier

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// TicketCreated applier
pub struct TicketCreatedApplier;

impl EventApplier for TicketCreatedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::TicketCreated { ticket } = &event.payload {
            snapshot.tickets.push(ticket.clone());
            snapshot.updated_at = event.timestamp;
            snapshot.last_sequence = event.sequence;
        }
    }
}
