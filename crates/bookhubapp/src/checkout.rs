//! # Checkout
//!
//! Checkout has two halves, split by the external payment gateway:
//!
//! 1. [`crate::api::BookhubApi::begin_checkout`] prices the cart and builds
//!    a [`PaymentRequest`]. It never creates an order.
//! 2. The gateway reports exactly one [`PaymentOutcome`]. Only
//!    [`PaymentOutcome::Succeeded`] lets
//!    [`crate::api::BookhubApi::complete_checkout`] create the order and
//!    clear the cart.
//!
//! Tax is a flat rate applied to the cart subtotal. It is never stored on a
//! book.

use crate::error::{BookhubError, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

/// Figures shown on the cart and checkout pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PricingSummary {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl PricingSummary {
    pub fn from_subtotal(subtotal: Decimal, tax_rate: Decimal) -> Result<Self> {
        let tax = subtotal.checked_mul(tax_rate).ok_or_else(too_large)?;
        let total = subtotal.checked_add(tax).ok_or_else(too_large)?;
        Ok(Self {
            subtotal,
            tax,
            total,
        })
    }

    /// Total in the currency's minor unit (paise for INR), rounded half away
    /// from zero. Amounts the gateway cannot represent are an error.
    pub fn amount_minor_units(&self) -> Result<i64> {
        self.total
            .checked_mul(Decimal::ONE_HUNDRED)
            .map(|minor| minor.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
            .and_then(|minor| minor.to_i64())
            .ok_or_else(|| {
                BookhubError::Validation(format!(
                    "amount too large for the payment gateway: {}",
                    self.total
                ))
            })
    }
}

fn too_large() -> BookhubError {
    BookhubError::Validation("order total is too large".into())
}

/// Prefill details handed to the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Payer {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// What the external gateway needs to collect a payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentRequest {
    pub amount_minor_units: i64,
    pub currency: String,
    pub payer: Payer,
    pub pricing: PricingSummary,
}

/// The gateway's single terminal callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    Succeeded { payment_reference: String },
    Failed { reason: String },
}
