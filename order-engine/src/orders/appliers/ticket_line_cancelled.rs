//! TicketLineCancelled event applier
//!
//! The line stays on the ticket for audit, flagged as cancelled. The
//! order item's cancellation is carried by the paired ItemRemoved event.

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// TicketLineCancelled applier
pub struct TicketLineCancelledApplier;

impl EventApplier for TicketLineCancelledApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::TicketLineCancelled {
            ticket_number,
            line_id,
        } = &event.payload
        {
            if let Some(ticket) = snapshot
                .tickets
                .iter_mut()
                .find(|t| &t.ticket_number == ticket_number)
                && let Some(line) = ticket.lines.iter_mut().find(|l| &l.line_id == line_id)
            {
                line.cancelled = true;
            }
            snapshot.updated_at = event.timestamp;
            snapshot.last_sequence = event.sequence;
        }
    }
}
