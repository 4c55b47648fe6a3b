// HTTP handlers for cart endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::cart::{Cart, CartLineView, HoldStatus, HoldTimer, UpdateQuantityRequest};
use crate::error::ApiError;
use crate::orders::{OrderSummary, PriceCalculator, PricingError};
use crate::AppState;

/// Cart contents with totals and the hold countdown
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    /// Display-rounded totals
    pub summary: OrderSummary,
    pub ticket_count: u32,
    /// Absent while the cart is empty
    pub hold: Option<HoldStatus>,
}

impl CartView {
    pub fn new(cart: &Cart, timer: HoldTimer) -> Result<Self, PricingError> {
        let now = Utc::now();
        let lines = cart
            .lines()
            .iter()
            .map(|line| {
                Ok(CartLineView {
                    line_total: PriceCalculator::round_for_display(line.line_total()?),
                    line: line.clone(),
                })
            })
            .collect::<Result<Vec<_>, PricingError>>()?;

        Ok(Self {
            lines,
            summary: cart.summary()?.rounded(),
            ticket_count: cart.lines().iter().map(|l| l.quantity).sum(),
            hold: cart.hold_started_at().map(|started| timer.status(started, now)),
        })
    }
}

fn hold_timer(state: &AppState) -> HoldTimer {
    HoldTimer::new(state.config.cart_hold)
}

#[utoipa::path(
    get,
    path = "/api/frontend/sessions/{session_id}/cart",
    params(
        ("session_id" = Uuid, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "Cart contents", body = CartView),
        (status = 404, description = "Session not found")
    ),
    tag = "cart"
)]
pub async fn get_cart(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<CartView>, ApiError> {
    let timer = hold_timer(&state);
    let view = state
        .sessions
        .read(session_id, |session| {
            Ok::<_, ApiError>(CartView::new(&session.cart, timer)?)
        })
        .await?;
    Ok(Json(view))
}

/// Handler for PATCH /api/frontend/sessions/{session_id}/cart/lines/{line_id}
/// Changes a line's quantity by a signed delta
#[utoipa::path(
    patch,
    path = "/api/frontend/sessions/{session_id}/cart/lines/{line_id}",
    params(
        ("session_id" = Uuid, Path, description = "Session ID"),
        ("line_id" = Uuid, Path, description = "Cart line ID")
    ),
    request_body = UpdateQuantityRequest,
    responses(
        (status = 200, description = "Updated cart", body = CartView),
        (status = 404, description = "Session or line not found")
    ),
    tag = "cart"
)]
pub async fn update_line_quantity(
    State(state): State<AppState>,
    Path((session_id, line_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateQuantityRequest>,
) -> Result<Json<CartView>, ApiError> {
    debug!("Updating cart line {} by {}", line_id, payload.delta);
    let timer = hold_timer(&state);
    let view = state
        .sessions
        .update(session_id, |session| {
            session.cart.update_quantity(line_id, payload.delta)?;
            Ok::<_, ApiError>(CartView::new(&session.cart, timer)?)
        })
        .await?;
    Ok(Json(view))
}

#[utoipa::path(
    delete,
    path = "/api/frontend/sessions/{session_id}/cart/lines/{line_id}",
    params(
        ("session_id" = Uuid, Path, description = "Session ID"),
        ("line_id" = Uuid, Path, description = "Cart line ID")
    ),
    responses(
        (status = 200, description = "Updated cart", body = CartView),
        (status = 404, description = "Session or line not found")
    ),
    tag = "cart"
)]
pub async fn remove_line(
    State(state): State<AppState>,
    Path((session_id, line_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<CartView>, ApiError> {
    let timer = hold_timer(&state);
    let view = state
        .sessions
        .update(session_id, |session| {
            let removed = session.cart.remove(line_id)?;
            info!(
                "Removed {} tickets ({}) from session {}",
                removed.quantity, removed.zone, session_id
            );
            Ok::<_, ApiError>(CartView::new(&session.cart, timer)?)
        })
        .await?;
    Ok(Json(view))
}
