use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::orders::PricingError;
use crate::validation::validate_unit_price;

/// Booking fee charged on the subtotal (5%)
pub const BOOKING_FEE_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

/// VAT charged on subtotal plus booking fee (16%)
pub const VAT_RATE: Decimal = Decimal::from_parts(16, 0, 0, false, 2);

/// Highest unit price accepted from a buyer-supplied item
pub const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Decimal places shown to buyers
const DISPLAY_DECIMAL_PLACES: u32 = 2;

/// One priced input to the calculator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct PricedItem {
    #[validate(custom = "validate_unit_price")]
    #[schema(value_type = String, example = "120")]
    pub unit_price: Decimal,
    #[validate(range(min = 1, max = 10, message = "Quantity must be between 1 and 10"))]
    #[schema(example = 2)]
    pub quantity: u32,
}

impl PricedItem {
    pub fn new(unit_price: Decimal, quantity: u32) -> Self {
        Self { unit_price, quantity }
    }
}

/// Order totals derived from priced items
///
/// Values are exact; `rounded` produces the two-decimal display form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub struct OrderSummary {
    #[schema(value_type = String, example = "240.00")]
    pub subtotal: Decimal,
    #[schema(value_type = String, example = "12.00")]
    pub booking_fee: Decimal,
    #[schema(value_type = String, example = "40.32")]
    pub vat: Decimal,
    #[schema(value_type = String, example = "292.32")]
    pub total: Decimal,
}

impl OrderSummary {
    /// Display form: half away from zero, always two decimal places
    pub fn rounded(&self) -> Self {
        Self {
            subtotal: PriceCalculator::round_for_display(self.subtotal),
            booking_fee: PriceCalculator::round_for_display(self.booking_fee),
            vat: PriceCalculator::round_for_display(self.vat),
            total: PriceCalculator::round_for_display(self.total),
        }
    }
}

/// Service for calculating line totals and order summaries
///
/// The single pricing formula used by the selection view, the cart and
/// checkout.
pub struct PriceCalculator;

impl PriceCalculator {
    /// Line total (quantity * unit_price)
    pub fn calculate_subtotal(quantity: u32, unit_price: Decimal) -> Result<Decimal, PricingError> {
        Decimal::from(quantity)
            .checked_mul(unit_price)
            .ok_or(PricingError::Overflow)
    }

    /// Sum of line totals
    pub fn calculate_total(subtotals: &[Decimal]) -> Result<Decimal, PricingError> {
        subtotals.iter().try_fold(Decimal::ZERO, |acc, subtotal| {
            acc.checked_add(*subtotal).ok_or(PricingError::Overflow)
        })
    }

    pub fn booking_fee(subtotal: Decimal) -> Result<Decimal, PricingError> {
        subtotal
            .checked_mul(BOOKING_FEE_RATE)
            .ok_or(PricingError::Overflow)
    }

    pub fn vat(subtotal: Decimal, booking_fee: Decimal) -> Result<Decimal, PricingError> {
        subtotal
            .checked_add(booking_fee)
            .and_then(|taxable| taxable.checked_mul(VAT_RATE))
            .ok_or(PricingError::Overflow)
    }

    /// Half away from zero, always two decimal places
    pub fn round_for_display(amount: Decimal) -> Decimal {
        let mut rounded = amount
            .round_dp_with_strategy(DISPLAY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(DISPLAY_DECIMAL_PLACES);
        rounded
    }

    /// Full summary for a sequence of priced items
    ///
    /// An empty sequence yields an all-zero summary. Amounts beyond the
    /// decimal range fail with `PricingError::Overflow`.
    pub fn summarize(items: &[PricedItem]) -> Result<OrderSummary, PricingError> {
        let subtotals = items
            .iter()
            .map(|item| Self::calculate_subtotal(item.quantity, item.unit_price))
            .collect::<Result<Vec<Decimal>, PricingError>>()?;
        let subtotal = Self::calculate_total(&subtotals)?;
        let booking_fee = Self::booking_fee(subtotal)?;
        let vat = Self::vat(subtotal, booking_fee)?;
        let total = Self::calculate_total(&[subtotal, booking_fee, vat])?;

        Ok(OrderSummary {
            subtotal,
            booking_fee,
            vat,
            total,
        })
    }
}
