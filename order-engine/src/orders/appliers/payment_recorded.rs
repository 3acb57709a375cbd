//! PaymentRecorded event applier

use crate::orders::traits::EventApplier;
use shared::order::types::PaymentRecord;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// PaymentRecorded applier
pub struct PaymentRecordedApplier;

impl EventApplier for PaymentRecordedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::PaymentRecorded {
            payment_id,
            method,
            amount,
        } = &event.payload
        {
            snapshot.payments.push(PaymentRecord {
                payment_id: payment_id.clone(),
                method: method.clone(),
                amount: *amount,
                timestamp: event.timestamp,
            });
            snapshot.paid_amount += amount;
            snapshot.updated_at = event.timestamp;
            snapshot.last_sequence = event.sequence;
        }
    }
}
