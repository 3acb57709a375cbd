//! CreateOrder command handler
//!
//! Creates a new order in `Pending`. Dine-in orders must carry a table;
//! the table binding itself is performed by the manager when committing
//! the emitted `TableOccupied` event.

use async_trait::async_trait;
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

use crate::orders::pricing;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::models::MenuItemMeta;
use shared::order::types::{ItemStatus, OrderItemInput, OrderItemSnapshot, OrderType, PricingParams};
use shared::order::{EventPayload, OrderEvent, OrderEventType};

/// Build an item snapshot from client input, applying catalog metadata
///
/// When the catalog knows the menu item, its name and price replace the
/// caller-supplied values and the item inherits the catalog's station
/// routing. Unavailable items are rejected.
pub(crate) fn resolve_item(
    input: &OrderItemInput,
    item_meta: &HashMap<String, MenuItemMeta>,
) -> Result<OrderItemSnapshot, OrderError> {
    pricing::validate_item_input(input)?;

    let (name, unit_price, station_id) = match item_meta.get(&input.menu_item_id) {
        Some(meta) => {
            if !meta.available {
                return Err(OrderError::MenuItemUnavailable(input.menu_item_id.clone()));
            }
            (meta.name.clone(), meta.price, meta.station_id.clone())
        }
        None => (input.name.clone(), input.unit_price, None),
    };

    Ok(OrderItemSnapshot {
        line_id: Uuid::new_v4().to_string(),
        menu_item_id: input.menu_item_id.clone(),
        name,
        unit_price,
        quantity: input.quantity,
        total_price: unit_price * input.quantity as f64,
        status: ItemStatus::Queued,
        station_id,
        note: input.note.clone(),
    })
}

/// CreateOrder action
#[derive(Debug, Clone)]
pub struct CreateOrderAction {
    pub order_type: OrderType,
    pub table_id: Option<String>,
    pub customer_id: Option<String>,
    pub server_id: Option<String>,
    pub guest_count: i32,
    pub items: Vec<OrderItemInput>,
    pub pricing: PricingParams,
    /// Server-generated order number
    pub order_number: String,
    /// Catalog metadata injected by the manager (empty without a catalog)
    pub item_meta: HashMap<String, MenuItemMeta>,
}

#[async_trait]
impl CommandHandler for CreateOrderAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        if self.items.is_empty() {
            return Err(OrderError::EmptyOrder);
        }
        if self.order_type.requires_table() && self.table_id.is_none() {
            return Err(OrderError::InvalidOrder(
                "dine-in order requires a table".to_string(),
            ));
        }
        pricing::validate_pricing_params(&self.pricing)?;

        let items: Vec<OrderItemSnapshot> = self
            .items
            .iter()
            .map(|input| resolve_item(input, &self.item_meta))
            .collect::<Result<_, _>>()?;

        // tables are bound only for dine-in
        let table_id = if self.order_type.requires_table() {
            self.table_id.clone()
        } else {
            None
        };

        let order_id = Uuid::new_v4().to_string();
        let mut events = vec![OrderEvent::new(
            ctx.next_sequence(),
            order_id.clone(),
            metadata.operator_id.clone(),
            metadata.operator_name.clone(),
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            OrderEventType::OrderCreated,
            EventPayload::OrderCreated {
                order_type: self.order_type,
                order_number: self.order_number.clone(),
                table_id: table_id.clone(),
                customer_id: self.customer_id.clone(),
                server_id: self.server_id.clone(),
                guest_count: self.guest_count,
                items,
                pricing: self.pricing,
            },
        )];

        if let Some(table_id) = table_id {
            events.push(OrderEvent::new(
                ctx.next_sequence(),
                order_id.clone(),
                metadata.operator_id.clone(),
                metadata.operator_name.clone(),
                metadata.command_id.clone(),
                Some(metadata.timestamp),
                OrderEventType::TableOccupied,
                EventPayload::TableOccupied { table_id },
            ));
        }

        info!(
            order_id = %order_id,
            order_number = %self.order_number,
            order_type = ?self.order_type,
            item_count = self.items.len(),
            "Order created"
        );
        Ok(events)
    }
}
