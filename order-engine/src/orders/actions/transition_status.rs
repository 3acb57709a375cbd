//! TransitionStatus command handler
//!
//! Applies one order lifecycle transition and its side effects:
//! - `Pending → Confirmed` derives and dispatches the initial kitchen
//!   tickets
//! - `Preparing → Ready` is gated on every live ticket being ready
//! - cancellation cancels all open tickets
//! - reaching a terminal state releases the bound table

use async_trait::async_trait;
use tracing::info;

use crate::orders::tickets;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::snapshot::OrderStatus;
use shared::order::ticket::KotStatus;
use shared::order::types::OrderItemSnapshot;
use shared::order::{EventPayload, OrderEvent, OrderEventType};

/// TransitionStatus action
#[derive(Debug, Clone)]
pub struct TransitionStatusAction {
    pub order_id: String,
    pub target: OrderStatus,
    pub reason: Option<String>,
}

impl TransitionStatusAction {
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
impl CommandHandler for TransitionStatusAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let snapshot = ctx.current()?;
        let from = snapshot.status;

        if from.is_terminal() {
            return Err(OrderError::OrderClosed(self.order_id.clone(), from));
        }
        if !from.can_transition_to(self.target) {
            return Err(OrderError::InvalidTransition {
                from,
                to: self.target,
            });
        }

        // transition gates
        match self.target {
            OrderStatus::Confirmed => {
                if snapshot.active_items().next().is_none() {
                    return Err(OrderError::EmptyOrder);
                }
            }
            OrderStatus::Ready => {
                let open = snapshot.open_tickets().count();
                if open > 0 {
                    return Err(OrderError::TicketsPending(open));
                }
            }
            _ => {}
        }

        let mut events = vec![self.event(
            ctx,
            metadata,
            OrderEventType::OrderStatusChanged,
            EventPayload::OrderStatusChanged {
                from,
                to: self.target,
                reason: self.reason.clone(),
            },
        )];

        match self.target {
            // derive and dispatch the initial tickets
            OrderStatus::Confirmed => {
                let items: Vec<&OrderItemSnapshot> = snapshot.active_items().collect();
                let priority = tickets::derive_priority(snapshot, metadata.timestamp);
                for (station_id, batch) in tickets::group_by_station(&items, ctx.stations()) {
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
            // cancellation takes every open ticket with it
            OrderStatus::Cancelled => {
                for ticket in snapshot.open_tickets() {
                    events.push(self.event(
                        ctx,
                        metadata,
                        OrderEventType::TicketStatusChanged,
                        EventPayload::TicketStatusChanged {
                            ticket_number: ticket.ticket_number.clone(),
                            from: ticket.status,
                            to: KotStatus::Cancelled,
                            chef_id: None,
                        },
                    ));
                }
            }
            _ => {}
        }

        // terminal states free the table
        if self.target.is_terminal()
            && let Some(table_id) = &snapshot.table_id
        {
            events.push(self.event(
                ctx,
                metadata,
                OrderEventType::TableReleased,
                EventPayload::TableReleased {
                    table_id: table_id.clone(),
                },
            ));
        }

        info!(
            order_id = %self.order_id,
            from = %from,
            to = %self.target,
            events = events.len(),
            "Order status transition"
        );
        Ok(events)
    }
}
