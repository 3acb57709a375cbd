//! RecordPayment command handler
//!
//! Payments are an independent input, never derived: the paid amount only
//! moves when a payment is recorded. Overpayment (tendered above the
//! grand total) is accepted; payment status caps at `Paid`.

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use crate::orders::pricing;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{EventPayload, OrderEvent, OrderEventType};

/// RecordPayment action
#[derive(Debug, Clone)]
pub struct RecordPaymentAction {
    pub order_id: String,
    pub method: String,
    pub amount: f64,
}

#[async_trait]
impl CommandHandler for RecordPaymentAction {
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
        pricing::validate_payment_amount(self.amount)?;

        let payment_id = Uuid::new_v4().to_string();
        info!(
            order_id = %self.order_id,
            payment_id = %payment_id,
            method = %self.method,
            amount = self.amount,
            "Payment recorded"
        );
        Ok(vec![OrderEvent::new(
            ctx.next_sequence(),
            self.order_id.clone(),
            metadata.operator_id.clone(),
            metadata.operator_name.clone(),
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            OrderEventType::PaymentRecorded,
            EventPayload::PaymentRecorded {
                payment_id,
                method: self.method.clone(),
                amount: self.amount,
            },
        )])
    }
}
