//! UpdatePricingParams command handler

use async_trait::async_trait;
use tracing::info;

use crate::orders::pricing;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::types::PricingParams;
use shared::order::{EventPayload, OrderEvent, OrderEventType};

/// UpdatePricingParams action
///
/// Replaces the order's tax and adjustment parameters; all derived
/// monetary fields are recomputed when the event is applied.
#[derive(Debug, Clone)]
pub struct UpdatePricingAction {
    pub order_id: String,
    pub pricing: PricingParams,
}

#[async_trait]
impl CommandHandler for UpdatePricingAction {
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
        pricing::validate_pricing_params(&self.pricing)?;

        info!(
            order_id = %self.order_id,
            discount_percent = self.pricing.discount_percent,
            gst_percent = self.pricing.gst_percent,
            vat_percent = self.pricing.vat_percent,
            "Pricing params updated"
        );
        Ok(vec![OrderEvent::new(
            ctx.next_sequence(),
            self.order_id.clone(),
            metadata.operator_id.clone(),
            metadata.operator_name.clone(),
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            OrderEventType::PricingParamsUpdated,
            EventPayload::PricingParamsUpdated {
                pricing: self.pricing,
            },
        )])
    }
}
