use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::cart::{CartLine, MAX_TICKETS_PER_LINE};
use crate::catalog::{Block, Row, StadiumMap};
use crate::notice::Notice;
use crate::orders::{OrderSummary, PriceCalculator, PricedItem, PricingError};
use crate::selection::error::SelectionError;

/// A buyer's in-progress choice on one match page
///
/// `seats` is kept sorted ascending with no duplicates. A row is only ever
/// set together with a block, and seats only together with a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SelectionState {
    pub match_id: String,
    pub block_id: Option<String>,
    pub row_number: Option<u32>,
    pub seats: Vec<u32>,
}

impl SelectionState {
    /// Empty selection on entering a match page
    pub fn new(match_id: &str) -> Self {
        Self {
            match_id: match_id.to_string(),
            block_id: None,
            row_number: None,
            seats: Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.block_id.is_some() && self.row_number.is_some() && !self.seats.is_empty()
    }

    fn clear_below_block(&mut self) {
        self.row_number = None;
        self.seats.clear();
    }
}

/// What a selection operation did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    Updated,
    /// Nothing changed: same choice again, unavailable seat or empty block
    Unchanged,
    /// Nothing changed and the buyer should be told why
    Rejected(Notice),
}

impl SelectionOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            SelectionOutcome::Updated => "updated",
            SelectionOutcome::Unchanged => "unchanged",
            SelectionOutcome::Rejected(_) => "rejected",
        }
    }

    pub fn notice(&self) -> Option<&Notice> {
        match self {
            SelectionOutcome::Rejected(notice) => Some(notice),
            _ => None,
        }
    }
}

/// Applies drill-down operations against one stadium map
pub struct SeatSelector<'a> {
    map: &'a StadiumMap,
    limit: usize,
}

impl<'a> SeatSelector<'a> {
    /// `limit` never exceeds what one cart line can hold
    pub fn new(map: &'a StadiumMap, limit: usize) -> Self {
        Self {
            map,
            limit: limit.min(MAX_TICKETS_PER_LINE as usize),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    fn block(&self, block_id: &str) -> Result<&'a Block, SelectionError> {
        self.map
            .block(block_id)
            .ok_or_else(|| SelectionError::UnknownBlock(block_id.to_string()))
    }

    fn selected_block(&self, state: &SelectionState) -> Result<&'a Block, SelectionError> {
        let block_id = state.block_id.as_deref().ok_or(SelectionError::BlockRequired)?;
        self.block(block_id)
    }

    fn selected_row(&self, state: &SelectionState) -> Result<&'a Row, SelectionError> {
        let block = self.selected_block(state)?;
        let row_number = state.row_number.ok_or(SelectionError::RowRequired)?;
        block.row(row_number).ok_or_else(|| SelectionError::UnknownRow {
            block_id: block.id.clone(),
            row_number,
        })
    }

    /// Select a block, clearing any row and seats
    ///
    /// Blocks with no available seat are ignored.
    pub fn select_block(
        &self,
        state: &mut SelectionState,
        block_id: &str,
    ) -> Result<SelectionOutcome, SelectionError> {
        let block = self.block(block_id)?;

        if state.block_id.as_deref() == Some(block_id) {
            return Ok(SelectionOutcome::Unchanged);
        }
        if block.available_count() == 0 {
            return Ok(SelectionOutcome::Unchanged);
        }

        state.block_id = Some(block.id.clone());
        state.clear_below_block();
        Ok(SelectionOutcome::Updated)
    }

    /// Select a row within the current block, clearing seats
    pub fn select_row(
        &self,
        state: &mut SelectionState,
        row_number: u32,
    ) -> Result<SelectionOutcome, SelectionError> {
        let block = self.selected_block(state)?;
        if block.row(row_number).is_none() {
            return Err(SelectionError::UnknownRow {
                block_id: block.id.clone(),
                row_number,
            });
        }

        if state.row_number == Some(row_number) {
            return Ok(SelectionOutcome::Unchanged);
        }

        state.row_number = Some(row_number);
        state.seats.clear();
        Ok(SelectionOutcome::Updated)
    }

    /// Toggle one seat in the current row
    ///
    /// Deselecting always succeeds. Selecting requires an available seat and
    /// room under the seat limit.
    pub fn toggle_seat(
        &self,
        state: &mut SelectionState,
        seat_number: u32,
    ) -> Result<SelectionOutcome, SelectionError> {
        let row = self.selected_row(state)?;
        let seat = row.seat(seat_number).ok_or(SelectionError::UnknownSeat {
            row_number: row.row_number,
            seat_number,
        })?;

        match state.seats.binary_search(&seat_number) {
            Ok(index) => {
                state.seats.remove(index);
                Ok(SelectionOutcome::Updated)
            }
            Err(_) if !seat.is_available() => Ok(SelectionOutcome::Unchanged),
            Err(_) if state.seats.len() >= self.limit => {
                Ok(SelectionOutcome::Rejected(Notice::seat_limit(self.limit)))
            }
            Err(index) => {
                state.seats.insert(index, seat_number);
                Ok(SelectionOutcome::Updated)
            }
        }
    }

    /// Convert a complete selection into a cart line and reset it
    ///
    /// An incomplete selection is left untouched.
    pub fn take_line(&self, state: &mut SelectionState) -> Result<CartLine, SelectionError> {
        if !state.is_complete() {
            return Err(SelectionError::Incomplete);
        }
        let block = self.selected_block(state)?;
        let row = self.selected_row(state)?;

        let line = CartLine::seated(
            &state.match_id,
            &block.name,
            &block.id,
            row.row_number,
            &state.seats,
            block.price,
        );

        state.block_id = None;
        state.clear_below_block();
        Ok(line)
    }

    /// Running price of the current seats, display-rounded
    pub fn view(&self, state: &SelectionState) -> Result<SelectionView, PricingError> {
        let block = state.block_id.as_deref().and_then(|id| self.map.block(id));
        let unit_price = block.map(|b| b.price);
        let items: Vec<PricedItem> = unit_price
            .filter(|_| !state.seats.is_empty())
            .map(|price| vec![PricedItem::new(price, state.seats.len() as u32)])
            .unwrap_or_default();

        Ok(SelectionView {
            selection: state.clone(),
            block_name: block.map(|b| b.name.clone()),
            unit_price,
            seat_limit: self.limit,
            summary: PriceCalculator::summarize(&items)?.rounded(),
        })
    }
}

/// Selection as returned to the match page
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SelectionView {
    #[serde(flatten)]
    pub selection: SelectionState,
    pub block_name: Option<String>,
    #[schema(value_type = Option<String>)]
    pub unit_price: Option<Decimal>,
    pub seat_limit: usize,
    pub summary: OrderSummary,
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::catalog::{levy_mwanawasa, SeatStatus};
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Op {
        Block(usize),
        Row(u32),
        Seat(u32),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            1 => (0usize..19).prop_map(Op::Block),
            2 => (1u32..=22).prop_map(Op::Row),
            6 => (1u32..=40).prop_map(Op::Seat),
        ]
    }

    /// Sold seats never enter the selection
    #[test]
    fn prop_sold_seats_are_never_selected() {
        let map = levy_mwanawasa();
        let sold: Vec<(String, u32, u32)> = map
            .blocks
            .iter()
            .flat_map(|b| {
                b.rows.iter().flat_map(move |r| {
                    r.seats
                        .iter()
                        .filter(|s| s.status == SeatStatus::Sold)
                        .map(move |s| (b.id.clone(), r.row_number, s.seat_number))
                })
            })
            .collect();
        let selector = SeatSelector::new(&map, 10);

        proptest!(|(index in 0..sold.len())| {
            let (block_id, row_number, seat_number) = &sold[index];
            let mut state = SelectionState::new("1");
            state.block_id = Some(block_id.clone());
            state.row_number = Some(*row_number);

            let outcome = selector.toggle_seat(&mut state, *seat_number).unwrap();
            prop_assert_eq!(outcome, SelectionOutcome::Unchanged);
            prop_assert!(!state.seats.contains(seat_number));
        });
    }

    /// Invariants hold after any sequence of operations
    #[test]
    fn prop_selection_invariants() {
        let map = levy_mwanawasa();

        proptest!(|(limit in 1usize..=10, ops in prop::collection::vec(op_strategy(), 1..60))| {
            let selector = SeatSelector::new(&map, limit);
            let mut state = SelectionState::new("1");

            for op in ops {
                let before = state.clone();
                let result = match op {
                    Op::Block(i) => {
                        let id = map.blocks[i].id.clone();
                        let result = selector.select_block(&mut state, &id);
                        if result == Ok(SelectionOutcome::Updated) {
                            prop_assert_eq!(state.row_number, None);
                            prop_assert!(state.seats.is_empty());
                        }
                        result
                    }
                    Op::Row(n) => {
                        let result = selector.select_row(&mut state, n);
                        if result == Ok(SelectionOutcome::Updated) {
                            prop_assert_eq!(&state.block_id, &before.block_id);
                            prop_assert!(state.seats.is_empty());
                        }
                        result
                    }
                    Op::Seat(n) => selector.toggle_seat(&mut state, n),
                };

                match result {
                    Ok(SelectionOutcome::Updated) => {}
                    _ => prop_assert_eq!(&state, &before),
                }
                prop_assert!(state.seats.windows(2).all(|w| w[0] < w[1]));
                prop_assert!(state.seats.len() <= limit);
            }
        });
    }
}
