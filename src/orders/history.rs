use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::cart::CartLine;
use crate::catalog::{CatalogRepository, FixtureResponse};
use crate::error::ApiError;
use crate::orders::{Confirmation, Order, PriceCalculator};

/// Kickoff times are local to the venues (Central Africa Time, UTC+2)
const VENUE_UTC_OFFSET_HOURS: i64 = 2;

/// One purchased line as the account page lists it
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TicketEntry {
    #[schema(example = "FAZ-2025-001234")]
    pub order_id: String,
    #[schema(example = "FAZ-TICKET:FAZ-2025-001234")]
    pub ticket_code: String,
    pub fixture: FixtureResponse,
    pub line: CartLine,
    /// Display-rounded quantity * unit price
    #[schema(value_type = String, example = "240.00")]
    pub line_total: Decimal,
    pub paid_at: DateTime<Utc>,
}

/// Purchased tickets split around the current time by kickoff
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct TicketHistory {
    /// Soonest kickoff first
    pub upcoming: Vec<TicketEntry>,
    /// Most recent kickoff first
    pub past: Vec<TicketEntry>,
}

impl TicketHistory {
    /// Current time on the venues' clocks
    pub fn venue_now() -> NaiveDateTime {
        Utc::now().naive_utc() + Duration::hours(VENUE_UTC_OFFSET_HOURS)
    }

    /// A match whose kickoff is still ahead of `now` is upcoming
    pub fn build(
        orders: &[Order],
        catalog: &dyn CatalogRepository,
        now: NaiveDateTime,
    ) -> Result<Self, ApiError> {
        let mut history = Self::default();

        for order in orders {
            let ticket_code = Confirmation::from(order.clone()).ticket_code;
            for line in &order.lines {
                let fixture = catalog.find_fixture(&line.match_id)?;
                let upcoming = fixture.kickoff > now;
                let entry = TicketEntry {
                    order_id: order.order_id.clone(),
                    ticket_code: ticket_code.clone(),
                    fixture: fixture.into(),
                    line: line.clone(),
                    line_total: PriceCalculator::round_for_display(line.line_total()?),
                    paid_at: order.paid_at,
                };
                if upcoming {
                    history.upcoming.push(entry);
                } else {
                    history.past.push(entry);
                }
            }
        }

        history.upcoming.sort_by_key(|e| e.fixture.fixture.kickoff);
        history
            .past
            .sort_by(|a, b| b.fixture.fixture.kickoff.cmp(&a.fixture.fixture.kickoff));
        Ok(history)
    }
}
