//! TicketStatusChanged event applier
//!
//! Moves a ticket through its status machine, stamps the matching
//! timestamp, and mirrors the new status onto the items behind the
//! ticket's non-cancelled lines.

use crate::orders::traits::EventApplier;
use shared::order::ticket::KotStatus;
use shared::order::types::ItemStatus;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

fn mirror_item_status(status: KotStatus) -> Option<ItemStatus> {
    match status {
        KotStatus::Sent => Some(ItemStatus::Sent),
        KotStatus::Acknowledged => Some(ItemStatus::Acknowledged),
        KotStatus::Preparing => Some(ItemStatus::Preparing),
        KotStatus::Ready => Some(ItemStatus::Ready),
        KotStatus::Cancelled => Some(ItemStatus::Cancelled),
        KotStatus::NotSent => None,
    }
}

/// TicketStatusChanged applier
pub struct TicketStatusChangedApplier;

impl EventApplier for TicketStatusChangedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::TicketStatusChanged {
            ticket_number,
            to,
            chef_id,
            ..
        } = &event.payload
        {
            let Some(ticket) = snapshot
                .tickets
                .iter_mut()
                .find(|t| &t.ticket_number == ticket_number)
            else {
                return;
            };

            ticket.status = *to;
            match to {
                KotStatus::Sent => ticket.sent_at = Some(event.timestamp),
                KotStatus::Acknowledged => {
                    ticket.acknowledged_at = Some(event.timestamp);
                    if chef_id.is_some() {
                        ticket.chef_id = chef_id.clone();
                    }
                }
                KotStatus::Preparing => ticket.started_at = Some(event.timestamp),
                KotStatus::Ready => ticket.completed_at = Some(event.timestamp),
                _ => {}
            }

            if let Some(item_status) = mirror_item_status(*to) {
                let line_ids: Vec<String> = ticket
                    .active_lines()
                    .map(|l| l.line_id.clone())
                    .collect();
                for item in &mut snapshot.items {
                    if line_ids.contains(&item.line_id) && item.status != ItemStatus::Cancelled {
                        item.status = item_status;
                    }
                }
            }

            snapshot.updated_at = event.timestamp;
            snapshot.last_sequence = event.sequence;
        }
    }
}
