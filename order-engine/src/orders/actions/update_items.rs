//! UpdateItems command handler
//!
//! Takes the caller's desired item set and reconciles it against the
//! current order and its kitchen tickets:
//! - lines absent from the set are removed; if a line was already
//!   dispatched, removal requires the `cancel_dispatched` override and
//!   leaves the ticket line behind as cancelled
//! - quantity changes are allowed only for lines the kitchen has not
//!   seen yet
//! - added lines after dispatch produce supplemental tickets for the
//!   affected stations; existing tickets are never rewritten

use async_trait::async_trait;
use std::collections::HashMap;
use tracing::info;

use crate::orders::actions::create_order::resolve_item;
use crate::orders::pricing;
use crate::orders::tickets;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::models::MenuItemMeta;
use shared::order::snapshot::OrderStatus;
use shared::order::ticket::KotStatus;
use shared::order::types::{ItemSetEntry, ItemStatus, OrderItemSnapshot};
use shared::order::{EventPayload, OrderEvent, OrderEventType};

/// UpdateItems action
#[derive(Debug, Clone)]
pub struct UpdateItemsAction {
    pub order_id: String,
    pub entries: Vec<ItemSetEntry>,
    pub cancel_dispatched: bool,
    /// Catalog metadata injected by the manager (empty without a catalog)
    pub item_meta: HashMap<String, MenuItemMeta>,
}

impl UpdateItemsAction {
    fn event(
        &self,
        ctx: &CommandContext<'_>,
        metadata: &CommandMetadata,
        event_type: OrderEventType,
        payload: EventPayload,
    ) -> OrderEvent {
        OrderEvent::new(
            ctx.next_sequence(),
            self.order_id.clone(),
            metadata.operator_id.clone(),
            metadata.operator_name.clone(),
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            event_type,
            payload,
        )
    }
}

#[async_trait]
impl CommandHandler for UpdateItemsAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let snapshot = ctx.current()?;

        if snapshot.is_terminal() {
            return Err(OrderError::OrderClosed(
                self.order_id.clone(),
                snapshot.status,
            ));
        }
        if !snapshot.status.allows_item_changes() {
            return Err(OrderError::OrderLocked(
                self.order_id.clone(),
                snapshot.status,
            ));
        }

        // desired set: kept lines (with optional new quantity) and additions
        let mut kept: HashMap<&str, Option<i32>> = HashMap::new();
        let mut added_inputs = Vec::new();
        for entry in &self.entries {
            match entry {
                ItemSetEntry::Keep { line_id, quantity } => {
                    let item = snapshot
                        .item(line_id)
                        .filter(|i| i.status != ItemStatus::Cancelled)
                        .ok_or_else(|| OrderError::ItemNotFound(line_id.clone()))?;
                    if let Some(q) = quantity {
                        pricing::validate_quantity(*q)?;
                        if *q != item.quantity && item.status != ItemStatus::Queued {
                            let ticket = tickets::dispatched_ticket_for(snapshot, line_id)
                                .map(|t| t.ticket_number.clone())
                                .unwrap_or_default();
                            return Err(OrderError::ItemAlreadyDispatched(
                                line_id.clone(),
                                ticket,
                            ));
                        }
                    }
                    kept.insert(line_id.as_str(), *quantity);
                }
                ItemSetEntry::Add { item } => added_inputs.push(item),
            }
        }

        let added: Vec<OrderItemSnapshot> = added_inputs
            .iter()
            .map(|input| resolve_item(input, &self.item_meta))
            .collect::<Result<_, _>>()?;

        if kept.is_empty() && added.is_empty() {
            return Err(OrderError::EmptyOrder);
        }

        let mut events = Vec::new();

        // removals: active lines absent from the desired set
        for item in snapshot.active_items() {
            if kept.contains_key(item.line_id.as_str()) {
                continue;
            }
            match tickets::dispatched_ticket_for(snapshot, &item.line_id) {
                Some(ticket) if !self.cancel_dispatched => {
                    return Err(OrderError::ItemAlreadyDispatched(
                        item.line_id.clone(),
                        ticket.ticket_number.clone(),
                    ));
                }
                Some(ticket) => {
                    let ticket_number = ticket.ticket_number.clone();
                    events.push(self.event(
                        ctx,
                        metadata,
                        OrderEventType::ItemRemoved,
                        EventPayload::ItemRemoved {
                            line_id: item.line_id.clone(),
                            item_name: item.name.clone(),
                            ticket_number: Some(ticket_number.clone()),
                            cancelled_on_ticket: true,
                        },
                    ));
                    events.push(self.event(
                        ctx,
                        metadata,
                        OrderEventType::TicketLineCancelled,
                        EventPayload::TicketLineCancelled {
                            ticket_number,
                            line_id: item.line_id.clone(),
                        },
                    ));
                }
                None => {
                    events.push(self.event(
                        ctx,
                        metadata,
                        OrderEventType::ItemRemoved,
                        EventPayload::ItemRemoved {
                            line_id: item.line_id.clone(),
                            item_name: item.name.clone(),
                            ticket_number: None,
                            cancelled_on_ticket: false,
                        },
                    ));
                }
            }
        }

        // quantity changes on kept lines
        for (line_id, quantity) in &kept {
            if let Some(q) = quantity {
                let item = snapshot.item(line_id).ok_or_else(|| {
                    OrderError::ItemNotFound(line_id.to_string())
                })?;
                if *q != item.quantity {
                    events.push(self.event(
                        ctx,
                        metadata,
                        OrderEventType::ItemQuantityChanged,
                        EventPayload::ItemQuantityChanged {
                            line_id: line_id.to_string(),
                            previous_quantity: item.quantity,
                            quantity: *q,
                        },
                    ));
                }
            }
        }

        if !added.is_empty() {
            events.push(self.event(
                ctx,
                metadata,
                OrderEventType::ItemsAdded,
                EventPayload::ItemsAdded {
                    items: added.clone(),
                },
            ));

            // supplemental tickets for additions after dispatch
            if snapshot.status != OrderStatus::Pending {
                let priority = tickets::derive_priority(snapshot, metadata.timestamp);
                let refs: Vec<&OrderItemSnapshot> = added.iter().collect();
                for (station_id, batch) in tickets::group_by_station(&refs, ctx.stations()) {
                    let ticket = tickets::build_ticket(
                        ctx.next_ticket_number(),
                        station_id,
                        &batch,
                        priority,
                        metadata.timestamp,
                    );
                    let ticket_number = ticket.ticket_number.clone();
                    events.push(self.event(
                        ctx,
                        metadata,
                        OrderEventType::TicketCreated,
                        EventPayload::TicketCreated { ticket },
                    ));
                    events.push(self.event(
                        ctx,
                        metadata,
                        OrderEventType::TicketStatusChanged,
                        EventPayload::TicketStatusChanged {
                            ticket_number,
                            from: KotStatus::NotSent,
                            to: KotStatus::Sent,
                            chef_id: None,
                        },
                    ));
                }
            }
        }

        info!(
            order_id = %self.order_id,
            kept = kept.len(),
            added = added.len(),
            events = events.len(),
            "Item set reconciled"
        );
        Ok(events)
    }
}
