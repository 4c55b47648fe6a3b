// HTTP handlers for pricing and checkout endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::orders::{
    spawn_payment, CheckoutRequest, CheckoutService, CheckoutView, OrderSummary, PriceCalculator,
    QuoteRequest, Submission, TicketHistory,
};
use crate::AppState;

/// Handler for POST /api/public/pricing/quote
/// Prices arbitrary items with the same formula the cart uses
#[utoipa::path(
    post,
    path = "/api/public/pricing/quote",
    request_body = QuoteRequest,
    responses(
        (status = 200, description = "Display-rounded order summary", body = OrderSummary),
        (status = 400, description = "Invalid items or total out of range")
    ),
    tag = "pricing"
)]
pub async fn quote(Json(payload): Json<QuoteRequest>) -> Result<Json<OrderSummary>, ApiError> {
    payload.validate()?;
    for item in &payload.items {
        item.validate()?;
    }

    let summary = PriceCalculator::summarize(&payload.items)?.rounded();
    debug!("Quoted {} items at {}", payload.items.len(), summary.total);
    Ok(Json(summary))
}

/// Handler for POST /api/frontend/sessions/{session_id}/checkout
/// Submits the cart for payment; the outcome arrives asynchronously
#[utoipa::path(
    post,
    path = "/api/frontend/sessions/{session_id}/checkout",
    params(
        ("session_id" = Uuid, Path, description = "Session ID")
    ),
    request_body = CheckoutRequest,
    responses(
        (status = 202, description = "Payment processing", body = CheckoutView),
        (status = 400, description = "Invalid payment details"),
        (status = 404, description = "Session not found"),
        (status = 422, description = "Terms not accepted or cart empty")
    ),
    tag = "checkout"
)]
pub async fn submit_checkout(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutView>), ApiError> {
    payload.validate()?;

    let sessions = state.sessions.clone();
    let gateway = Arc::clone(&state.payments);
    let order_numbers = state.sessions.order_numbers().clone();
    let view = state
        .sessions
        .update(session_id, move |session| {
            let submission = CheckoutService::submit(session, &payload, &order_numbers)?;
            if let Submission::Started(payment) = submission {
                let handle = spawn_payment(sessions, gateway, session_id, payment);
                session.set_payment_task(handle);
            }
            Ok::<_, ApiError>(CheckoutService::view(session))
        })
        .await?;

    info!("Checkout for session {} is {}", session_id, view.status);
    Ok((StatusCode::ACCEPTED, Json(view)))
}

#[utoipa::path(
    get,
    path = "/api/frontend/sessions/{session_id}/checkout",
    params(
        ("session_id" = Uuid, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "Current checkout state", body = CheckoutView),
        (status = 404, description = "Session not found")
    ),
    tag = "checkout"
)]
pub async fn get_checkout(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<CheckoutView>, ApiError> {
    let view = state
        .sessions
        .read(session_id, |session| Ok::<_, ApiError>(CheckoutService::view(session)))
        .await?;
    Ok(Json(view))
}

/// Handler for DELETE /api/frontend/sessions/{session_id}/checkout
/// Leaving the processing page cancels the pending payment
#[utoipa::path(
    delete,
    path = "/api/frontend/sessions/{session_id}/checkout",
    params(
        ("session_id" = Uuid, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "Checkout cancelled", body = CheckoutView),
        (status = 404, description = "Session or checkout not found"),
        (status = 409, description = "Checkout is not processing")
    ),
    tag = "checkout"
)]
pub async fn cancel_checkout(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<CheckoutView>, ApiError> {
    let view = state
        .sessions
        .update(session_id, |session| {
            CheckoutService::cancel(session)?;
            Ok::<_, ApiError>(CheckoutService::view(session))
        })
        .await?;

    info!("Checkout for session {} cancelled", session_id);
    Ok(Json(view))
}

/// Handler for GET /api/frontend/sessions/{session_id}/orders
/// Tickets paid in this session, split into upcoming and past matches
#[utoipa::path(
    get,
    path = "/api/frontend/sessions/{session_id}/orders",
    params(
        ("session_id" = Uuid, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "Purchased tickets", body = TicketHistory),
        (status = 404, description = "Session not found")
    ),
    tag = "orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<TicketHistory>, ApiError> {
    let now = TicketHistory::venue_now();
    let history = state
        .sessions
        .read(session_id, |session| {
            TicketHistory::build(&session.orders, state.catalog.as_ref(), now)
        })
        .await?;

    debug!(
        "Session {} has {} upcoming and {} past tickets",
        session_id,
        history.upcoming.len(),
        history.past.len()
    );
    Ok(Json(history))
}
