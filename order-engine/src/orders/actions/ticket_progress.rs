//! Kitchen ticket progression handlers
//!
//! Acknowledge, start and complete move a ticket forward through its
//! status machine. Acknowledgment is optional; the kitchen may go
//! straight from `Sent` to `Preparing`.

use async_trait::async_trait;

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::ticket::KotStatus;
use shared::order::{EventPayload, OrderEvent, OrderEventType};

fn progress(
    ctx: &CommandContext<'_>,
    metadata: &CommandMetadata,
    order_id: &str,
    ticket_number: &str,
    to: KotStatus,
    chef_id: Option<String>,
) -> Result<Vec<OrderEvent>, OrderError> {
    let snapshot = ctx.current()?;
    if snapshot.is_terminal() {
        return Err(OrderError::OrderClosed(
            order_id.to_string(),
            snapshot.status,
        ));
    }

    let ticket = snapshot
        .ticket(ticket_number)
        .ok_or_else(|| OrderError::TicketNotFound(ticket_number.to_string()))?;
    if !ticket.status.can_progress_to(to) {
        return Err(OrderError::InvalidTicketTransition {
            from: ticket.status,
            to,
        });
    }

    Ok(vec![OrderEvent::new(
        ctx.next_sequence(),
        order_id.to_string(),
        metadata.operator_id.clone(),
        metadata.operator_name.clone(),
        metadata.command_id.clone(),
        Some(metadata.timestamp),
        OrderEventType::TicketStatusChanged,
        EventPayload::TicketStatusChanged {
            ticket_number: ticket_number.to_string(),
            from: ticket.status,
            to,
            chef_id,
        },
    )])
}

/// AcknowledgeTicket action - kitchen saw the ticket
#[derive(Debug, Clone)]
pub struct AcknowledgeTicketAction {
    pub order_id: String,
    pub ticket_number: String,
    pub chef_id: Option<String>,
}

#[async_trait]
impl CommandHandler for AcknowledgeTicketAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        progress(
            ctx,
            metadata,
            &self.order_id,
            &self.ticket_number,
            KotStatus::Acknowledged,
            self.chef_id.clone(),
        )
    }
}

/// StartTicket action - kitchen started cooking
#[derive(Debug, Clone)]
pub struct StartTicketAction {
    pub order_id: String,
    pub ticket_number: String,
}

#[async_trait]
impl CommandHandler for StartTicketAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        progress(
            ctx,
            metadata,
            &self.order_id,
            &self.ticket_number,
            KotStatus::Preparing,
            None,
        )
    }
}

/// CompleteTicket action - ticket is plated and ready to serve
#[derive(Debug, Clone)]
pub struct CompleteTicketAction {
    pub order_id: String,
    pub ticket_number: String,
}

#[async_trait]
impl CommandHandler for CompleteTicketAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        progress(
            ctx,
            metadata,
            &self.order_id,
            &self.ticket_number,
            KotStatus::Ready,
            None,
        )
    }
}
