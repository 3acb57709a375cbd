//! Pricing engine - deterministic monetary computation using rust_decimal
//!
//! Pure and stateless. Every order mutation recomputes all derived
//! monetary fields from the canonical inputs (line items + pricing
//! params); nothing is accumulated incrementally, so totals can never
//! drift from what a fresh recomputation would produce.
//!
//! Rounding policy: each derived amount (discount, GST, VAT) is rounded
//! independently to the currency's minor unit (2 decimal places, half-up)
//! before it enters the grand total. This matches the displayed breakdown
//! and is bit-reproducible.

use crate::orders::traits::OrderError;
use rust_decimal::prelude::*;
use shared::order::types::{ItemStatus, OrderItemInput, PaymentStatus, PricingParams};
use shared::order::{OrderItemSnapshot, OrderSnapshot};

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed unit price per item
const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum allowed quantity per line
const MAX_QUANTITY: i32 = 9999;
/// Maximum allowed payment amount
const MAX_PAYMENT_AMOUNT: f64 = 1_000_000.0;

/// Validate that a f64 value is finite (not NaN, not Infinity)
#[inline]
fn require_finite(value: f64, field_name: &str) -> Result<(), OrderError> {
    if !value.is_finite() {
        return Err(OrderError::InvalidItem(format!(
            "{} must be a finite number, got {}",
            field_name, value
        )));
    }
    Ok(())
}

/// Validate an OrderItemInput before processing
pub fn validate_item_input(item: &OrderItemInput) -> Result<(), OrderError> {
    require_finite(item.unit_price, "unit_price")?;
    if item.unit_price < 0.0 {
        return Err(OrderError::InvalidItem(format!(
            "unit_price must be non-negative, got {}",
            item.unit_price
        )));
    }
    if item.unit_price > MAX_PRICE {
        return Err(OrderError::InvalidItem(format!(
            "unit_price exceeds maximum allowed ({}), got {}",
            MAX_PRICE, item.unit_price
        )));
    }

    validate_quantity(item.quantity)?;

    if item.menu_item_id.is_empty() {
        return Err(OrderError::InvalidItem("menu_item_id is empty".to_string()));
    }

    Ok(())
}

/// Validate a line quantity
pub fn validate_quantity(quantity: i32) -> Result<(), OrderError> {
    if quantity <= 0 {
        return Err(OrderError::InvalidItem(format!(
            "quantity must be positive, got {}",
            quantity
        )));
    }
    if quantity > MAX_QUANTITY {
        return Err(OrderError::InvalidItem(format!(
            "quantity exceeds maximum allowed ({}), got {}",
            MAX_QUANTITY, quantity
        )));
    }
    Ok(())
}

/// Validate pricing parameters before processing
pub fn validate_pricing_params(params: &PricingParams) -> Result<(), OrderError> {
    for (value, name) in [
        (params.discount_percent, "discount_percent"),
        (params.gst_percent, "gst_percent"),
        (params.vat_percent, "vat_percent"),
    ] {
        require_finite(value, name)
            .map_err(|_| OrderError::InvalidPricingParams(format!("{} is not finite", name)))?;
        if !(0.0..=100.0).contains(&value) {
            return Err(OrderError::InvalidPricingParams(format!(
                "{} must be between 0 and 100, got {}",
                name, value
            )));
        }
    }

    require_finite(params.extra_charges, "extra_charges")
        .map_err(|_| OrderError::InvalidPricingParams("extra_charges is not finite".to_string()))?;
    if params.extra_charges < 0.0 {
        return Err(OrderError::InvalidPricingParams(format!(
            "extra_charges must be non-negative, got {}",
            params.extra_charges
        )));
    }

    Ok(())
}

/// Validate a payment amount before recording
pub fn validate_payment_amount(amount: f64) -> Result<(), OrderError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(OrderError::InvalidAmount(format!(
            "payment amount must be positive, got {}",
            amount
        )));
    }
    if amount > MAX_PAYMENT_AMOUNT {
        return Err(OrderError::InvalidAmount(format!(
            "payment amount exceeds maximum allowed ({}), got {}",
            MAX_PAYMENT_AMOUNT, amount
        )));
    }
    Ok(())
}

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

#[inline]
fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// All derived monetary fields of an order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderTotals {
    pub subtotal: f64,
    pub discount_amount: f64,
    pub gst_amount: f64,
    pub vat_amount: f64,
    pub extra_charges: f64,
    pub grand_total: f64,
}

/// Compute order totals from line items and pricing parameters
///
/// Formula (the discount applies before tax; both taxes are computed on
/// the discount-adjusted amount):
/// ```text
/// subtotal    = Σ(unit_price × quantity)
/// discount    = round(subtotal × discount% / 100)
/// taxable     = subtotal − discount
/// gst         = is_gst_applied ? round(taxable × gst% / 100) : 0
/// vat         = round(taxable × vat% / 100)
/// grand_total = taxable + gst + vat + extra_charges
/// ```
///
/// A negative derived value (e.g. a discount exceeding the subtotal) is a
/// `PricingInvariant` error, never silently clamped.
pub fn compute_totals(
    items: &[&OrderItemSnapshot],
    params: &PricingParams,
) -> Result<OrderTotals, OrderError> {
    let mut subtotal = Decimal::ZERO;
    for item in items {
        subtotal += to_decimal(item.unit_price) * Decimal::from(item.quantity);
    }
    let subtotal = round_money(subtotal);

    let discount_amount =
        round_money(subtotal * to_decimal(params.discount_percent) / Decimal::ONE_HUNDRED);
    let taxable = subtotal - discount_amount;

    let gst_amount = if params.is_gst_applied {
        round_money(taxable * to_decimal(params.gst_percent) / Decimal::ONE_HUNDRED)
    } else {
        Decimal::ZERO
    };
    let vat_amount = round_money(taxable * to_decimal(params.vat_percent) / Decimal::ONE_HUNDRED);
    let extra_charges = round_money(to_decimal(params.extra_charges));

    let grand_total = taxable + gst_amount + vat_amount + extra_charges;

    for (value, name) in [
        (subtotal, "subtotal"),
        (discount_amount, "discount_amount"),
        (taxable, "taxable"),
        (gst_amount, "gst_amount"),
        (vat_amount, "vat_amount"),
        (extra_charges, "extra_charges"),
        (grand_total, "grand_total"),
    ] {
        if value < Decimal::ZERO {
            return Err(OrderError::PricingInvariant(format!(
                "{} is negative: {}",
                name, value
            )));
        }
    }

    Ok(OrderTotals {
        subtotal: to_f64(subtotal),
        discount_amount: to_f64(discount_amount),
        gst_amount: to_f64(gst_amount),
        vat_amount: to_f64(vat_amount),
        extra_charges: to_f64(extra_charges),
        grand_total: to_f64(grand_total),
    })
}

/// Recalculate every derived monetary field of a snapshot in place
///
/// Line totals are rewritten from unit price × quantity; order totals are
/// recomputed from the active (non-cancelled) item set; payment status is
/// derived from paid_amount against the new grand total.
pub fn recalculate(snapshot: &mut OrderSnapshot) -> Result<(), OrderError> {
    for item in &mut snapshot.items {
        let line_total = to_decimal(item.unit_price) * Decimal::from(item.quantity);
        item.total_price = to_f64(line_total);
    }

    let active: Vec<&OrderItemSnapshot> = snapshot
        .items
        .iter()
        .filter(|i| i.status != ItemStatus::Cancelled)
        .collect();
    let totals = compute_totals(&active, &snapshot.pricing)?;

    snapshot.subtotal = totals.subtotal;
    snapshot.discount_amount = totals.discount_amount;
    snapshot.gst_amount = totals.gst_amount;
    snapshot.vat_amount = totals.vat_amount;
    snapshot.extra_charges = totals.extra_charges;
    snapshot.grand_total = totals.grand_total;

    snapshot.payment_status = if snapshot.paid_amount <= 0.0 {
        PaymentStatus::Unpaid
    } else if snapshot.is_fully_paid() {
        PaymentStatus::Paid
    } else {
        PaymentStatus::PartiallyPaid
    };

    Ok(())
}
