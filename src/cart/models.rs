use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::cart::error::CartError;
use crate::orders::{OrderSummary, PriceCalculator, PricedItem, PricingError, MAX_UNIT_PRICE};

/// Upper bound on tickets in a single cart line
pub const MAX_TICKETS_PER_LINE: u32 = 10;

/// One priced group of seats in a single row of one match
///
/// Carries one label per seat and keeps `quantity` equal to the number of
/// labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CartLine {
    pub id: Uuid,
    #[schema(example = "2")]
    pub match_id: String,
    /// Display name of the block ("VIP A1")
    #[schema(example = "VIP A1")]
    pub zone: String,
    #[schema(example = "A1")]
    pub block_id: String,
    #[schema(example = "5")]
    pub row: String,
    pub seats: Vec<String>,
    #[schema(value_type = String, example = "200")]
    pub unit_price: Decimal,
    pub quantity: u32,
}

impl CartLine {
    /// Line for specific seats in one row
    pub fn seated(
        match_id: &str,
        zone: &str,
        block_id: &str,
        row_number: u32,
        seat_numbers: &[u32],
        unit_price: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            match_id: match_id.to_string(),
            zone: zone.to_string(),
            block_id: block_id.to_string(),
            row: row_number.to_string(),
            seats: seat_numbers.iter().map(|n| n.to_string()).collect(),
            unit_price,
            quantity: seat_numbers.len() as u32,
        }
    }

    pub fn line_total(&self) -> Result<Decimal, PricingError> {
        PriceCalculator::calculate_subtotal(self.quantity, self.unit_price)
    }

    pub fn priced_item(&self) -> PricedItem {
        PricedItem::new(self.unit_price, self.quantity)
    }

    fn check(&self) -> Result<(), CartError> {
        if self.quantity < 1 || self.quantity > MAX_TICKETS_PER_LINE {
            return Err(CartError::InvalidLine(format!(
                "quantity must be between 1 and {}, got {}",
                MAX_TICKETS_PER_LINE, self.quantity
            )));
        }
        if self.seats.len() != self.quantity as usize {
            return Err(CartError::InvalidLine(format!(
                "{} seat labels for quantity {}",
                self.seats.len(),
                self.quantity
            )));
        }
        if self.unit_price < Decimal::ZERO || self.unit_price > MAX_UNIT_PRICE {
            return Err(CartError::InvalidLine(format!(
                "unit price must be between 0 and {}, got {}",
                MAX_UNIT_PRICE, self.unit_price
            )));
        }
        Ok(())
    }
}

/// Cart aggregate for one browsing session
///
/// In memory only. `hold_started_at` is set when the first line enters an
/// empty cart and cleared whenever the cart empties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
    hold_started_at: Option<DateTime<Utc>>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn hold_started_at(&self) -> Option<DateTime<Utc>> {
        self.hold_started_at
    }

    /// Append a line, starting the hold window if the cart was empty
    pub fn add(&mut self, line: CartLine) -> Result<(), CartError> {
        self.add_at(line, Utc::now())
    }

    pub fn add_at(&mut self, line: CartLine, now: DateTime<Utc>) -> Result<(), CartError> {
        line.check()?;
        if self.lines.iter().any(|l| l.id == line.id) {
            return Err(CartError::InvalidLine(format!("duplicate line id {}", line.id)));
        }
        if self.lines.is_empty() {
            self.hold_started_at = Some(now);
        }
        self.lines.push(line);
        Ok(())
    }

    /// Adjust a line's quantity by `delta`
    ///
    /// Each decrement releases the highest seat. A line never drops below
    /// one seat and never grows past the seats it holds.
    pub fn update_quantity(&mut self, line_id: Uuid, delta: i32) -> Result<&CartLine, CartError> {
        let line = self
            .lines
            .iter_mut()
            .find(|l| l.id == line_id)
            .ok_or(CartError::LineNotFound(line_id))?;

        let upper = line.seats.len().max(1) as i64;
        let target = (line.quantity as i64 + delta as i64).clamp(1, upper) as u32;

        line.seats.truncate(target as usize);
        line.quantity = target;
        Ok(line)
    }

    pub fn remove(&mut self, line_id: Uuid) -> Result<CartLine, CartError> {
        let index = self
            .lines
            .iter()
            .position(|l| l.id == line_id)
            .ok_or(CartError::LineNotFound(line_id))?;
        let line = self.lines.remove(index);
        if self.lines.is_empty() {
            self.hold_started_at = None;
        }
        Ok(line)
    }

    /// Empty the cart, returning the lines it held
    pub fn take_lines(&mut self) -> Vec<CartLine> {
        self.hold_started_at = None;
        std::mem::take(&mut self.lines)
    }

    /// Exact summary; callers round for display
    pub fn summary(&self) -> Result<OrderSummary, PricingError> {
        let items: Vec<PricedItem> = self.lines.iter().map(CartLine::priced_item).collect();
        PriceCalculator::summarize(&items)
    }
}

/// Request body for PATCH .../cart/lines/{line_id}
///
/// Any delta is accepted; the resulting quantity is clamped.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateQuantityRequest {
    pub delta: i32,
}

/// Cart line with its display-rounded total
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartLineView {
    #[serde(flatten)]
    pub line: CartLine,
    #[schema(value_type = String, example = "400.00")]
    pub line_total: Decimal,
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn line_strategy() -> impl Strategy<Value = CartLine> {
        (prop::collection::btree_set(1u32..=40, 1..=10), 1u32..=500).prop_map(|(seats, price)| {
            let seats: Vec<u32> = seats.into_iter().collect();
            CartLine::seated("2", "East C1", "C1", 3, &seats, Decimal::from(price))
        })
    }

    /// Adding a line then removing it restores the cart exactly
    #[test]
    fn prop_add_then_remove_restores_cart() {
        proptest!(|(
            existing in prop::collection::vec(line_strategy(), 0..5),
            extra in line_strategy()
        )| {
            let mut cart = Cart::new();
            for line in existing {
                cart.add(line).unwrap();
            }
            let before = cart.clone();

            let id = extra.id;
            cart.add(extra).unwrap();
            cart.remove(id).unwrap();

            prop_assert_eq!(cart, before);
        });
    }

    /// Quantity stays in [1, 10] and always matches the seat labels
    #[test]
    fn prop_quantity_stays_in_bounds() {
        proptest!(|(
            line in line_strategy(),
            deltas in prop::collection::vec(-12i32..=12, 1..20)
        )| {
            let mut cart = Cart::new();
            let id = line.id;
            let assigned = line.seats.clone();
            cart.add(line).unwrap();

            for delta in deltas {
                let updated = cart.update_quantity(id, delta).unwrap();
                prop_assert!(updated.quantity >= 1);
                prop_assert!(updated.quantity <= MAX_TICKETS_PER_LINE);
                prop_assert_eq!(updated.seats.len(), updated.quantity as usize);
                prop_assert_eq!(&updated.seats[..], &assigned[..updated.quantity as usize]);
            }
        });
    }
}
