//! Command action implementations
//!
//! Each action implements the `CommandHandler` trait and handles
//! one specific command type.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::models::MenuItemMeta;
use shared::order::{OrderCommand, OrderCommandPayload, OrderEvent};

pub mod create_order;
mod record_payment;
mod ticket_progress;
mod transition_status;
mod update_items;
mod update_pricing;

pub use create_order::CreateOrderAction;
pub use record_payment::RecordPaymentAction;
pub use ticket_progress::{AcknowledgeTicketAction, CompleteTicketAction, StartTicketAction};
pub use transition_status::TransitionStatusAction;
pub use update_items::UpdateItemsAction;
pub use update_pricing::UpdatePricingAction;

/// CommandAction enum - dispatches to concrete action implementations
pub enum CommandAction {
    CreateOrder(CreateOrderAction),
    UpdateItems(UpdateItemsAction),
    TransitionStatus(TransitionStatusAction),
    UpdatePricing(UpdatePricingAction),
    RecordPayment(RecordPaymentAction),
    AcknowledgeTicket(AcknowledgeTicketAction),
    StartTicket(StartTicketAction),
    CompleteTicket(CompleteTicketAction),
}

impl CommandAction {
    /// Inject catalog metadata into item-carrying actions
    ///
    /// The manager resolves metadata before execution; actions that do
    /// not add items ignore it.
    pub fn inject_item_meta(&mut self, meta: HashMap<String, MenuItemMeta>) {
        match self {
            CommandAction::CreateOrder(action) => action.item_meta = meta,
            CommandAction::UpdateItems(action) => action.item_meta = meta,
            _ => {}
        }
    }
}

/// Manual implementation of CommandHandler for CommandAction
#[async_trait]
impl CommandHandler for CommandAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        match self {
            CommandAction::CreateOrder(action) => action.execute(ctx, metadata).await,
            CommandAction::UpdateItems(action) => action.execute(ctx, metadata).await,
            CommandAction::TransitionStatus(action) => action.execute(ctx, metadata).await,
            CommandAction::UpdatePricing(action) => action.execute(ctx, metadata).await,
            CommandAction::RecordPayment(action) => action.execute(ctx, metadata).await,
            CommandAction::AcknowledgeTicket(action) => action.execute(ctx, metadata).await,
            CommandAction::StartTicket(action) => action.execute(ctx, metadata).await,
            CommandAction::CompleteTicket(action) => action.execute(ctx, metadata).await,
        }
    }
}

/// Convert OrderCommand to CommandAction
///
/// This is the ONLY place with a match on OrderCommandPayload.
impl From<&OrderCommand> for CommandAction {
    fn from(cmd: &OrderCommand) -> Self {
        match &cmd.payload {
            OrderCommandPayload::CreateOrder { .. } => {
                // CreateOrder is built by the manager, which generates the
                // order number first
                unreachable!("CreateOrder is constructed by OrderManager")
            }
            OrderCommandPayload::UpdateItems {
                order_id,
                entries,
                cancel_dispatched,
            } => CommandAction::UpdateItems(UpdateItemsAction {
                order_id: order_id.clone(),
                entries: entries.clone(),
                cancel_dispatched: *cancel_dispatched,
                item_meta: HashMap::new(), // injected by OrderManager
            }),
            OrderCommandPayload::TransitionStatus {
                order_id,
                target,
                reason,
            } => CommandAction::TransitionStatus(TransitionStatusAction {
                order_id: order_id.clone(),
                target: *target,
                reason: reason.clone(),
            }),
            OrderCommandPayload::UpdatePricingParams { order_id, pricing } => {
                CommandAction::UpdatePricing(UpdatePricingAction {
                    order_id: order_id.clone(),
                    pricing: *pricing,
                })
            }
            OrderCommandPayload::RecordPayment {
                order_id,
                method,
                amount,
            } => CommandAction::RecordPayment(RecordPaymentAction {
                order_id: order_id.clone(),
                method: method.clone(),
                amount: *amount,
            }),
            OrderCommandPayload::AcknowledgeTicket {
                order_id,
                ticket_number,
                chef_id,
            } => CommandAction::AcknowledgeTicket(AcknowledgeTicketAction {
                order_id: order_id.clone(),
                ticket_number: ticket_number.clone(),
                chef_id: chef_id.clone(),
            }),
            OrderCommandPayload::StartTicket {
                order_id,
                ticket_number,
            } => CommandAction::StartTicket(StartTicketAction {
                order_id: order_id.clone(),
                ticket_number: ticket_number.clone(),
            }),
            OrderCommandPayload::CompleteTicket {
                order_id,
                ticket_number,
            } => CommandAction::CompleteTicket(CompleteTicketAction {
                order_id: order_id.clone(),
                ticket_number: ticket_number.clone(),
            }),
        }
    }
}
