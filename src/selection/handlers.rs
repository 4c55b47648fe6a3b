// HTTP handlers for the seat selection endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::cart::{CartLine, CartView, HoldTimer};
use crate::catalog::CatalogRepository;
use crate::error::ApiError;
use crate::notice::Notice;
use crate::selection::{
    SeatSelector, SelectionError, SelectionOutcome, SelectionState, SelectionView,
};
use crate::session::Session;
use crate::validation::validate_block_id;
use crate::AppState;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct EnterMatchRequest {
    #[validate(length(min = 1, max = 32, message = "match_id is required"))]
    #[schema(example = "2")]
    pub match_id: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SelectBlockRequest {
    #[validate(custom = "validate_block_id")]
    #[schema(example = "A1")]
    pub block_id: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SelectRowRequest {
    #[validate(range(min = 1, message = "row_number must be at least 1"))]
    #[schema(example = 5)]
    pub row_number: u32,
}

/// Result of a selection operation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SelectionResponse {
    /// "updated", "unchanged" or "rejected"
    #[schema(example = "updated")]
    pub outcome: String,
    /// Toast to show when the operation was rejected
    pub notice: Option<Notice>,
    pub selection: SelectionView,
}

impl SelectionResponse {
    fn new(outcome: &SelectionOutcome, selection: SelectionView) -> Self {
        Self {
            outcome: outcome.label().to_string(),
            notice: outcome.notice().cloned(),
            selection,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddToCartResponse {
    pub line: CartLine,
    pub cart: CartView,
}

/// Run `f` against the session's current selection and its stadium map
fn with_selection<R, F>(state: &AppState, session: &mut Session, f: F) -> Result<R, ApiError>
where
    F: FnOnce(&SeatSelector, &mut SelectionState, &mut Session) -> Result<R, ApiError>,
{
    let mut selection = session
        .selection
        .take()
        .ok_or(SelectionError::NoMatchSelected)?;
    let map = match state.catalog.stadium_map(&selection.match_id) {
        Ok(map) => map,
        Err(e) => {
            session.selection = Some(selection);
            return Err(e.into());
        }
    };

    let selector = SeatSelector::new(&map, state.config.seat_limit);
    let result = f(&selector, &mut selection, session);
    session.selection = Some(selection);
    result
}

/// Handler for POST /api/frontend/sessions/{session_id}/selection
/// Entering a match page starts a fresh selection for that match
#[utoipa::path(
    post,
    path = "/api/frontend/sessions/{session_id}/selection",
    params(
        ("session_id" = Uuid, Path, description = "Session ID")
    ),
    request_body = EnterMatchRequest,
    responses(
        (status = 200, description = "Empty selection for the match", body = SelectionView),
        (status = 404, description = "Session or match not found")
    ),
    tag = "selection"
)]
pub async fn enter_match(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<EnterMatchRequest>,
) -> Result<Json<SelectionView>, ApiError> {
    payload.validate()?;
    let map = state.catalog.stadium_map(&payload.match_id)?;
    let selector = SeatSelector::new(&map, state.config.seat_limit);

    let view = state
        .sessions
        .update(session_id, |session| {
            let selection = SelectionState::new(&payload.match_id);
            let view = selector.view(&selection)?;
            session.selection = Some(selection);
            Ok::<_, ApiError>(view)
        })
        .await?;

    debug!("Session {} entered match {}", session_id, payload.match_id);
    Ok(Json(view))
}

#[utoipa::path(
    get,
    path = "/api/frontend/sessions/{session_id}/selection",
    params(
        ("session_id" = Uuid, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "Current selection and running price", body = SelectionView),
        (status = 404, description = "Session not found"),
        (status = 409, description = "No match selected")
    ),
    tag = "selection"
)]
pub async fn get_selection(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SelectionView>, ApiError> {
    let view = state
        .sessions
        .read(session_id, |session| {
            let selection = session
                .selection
                .as_ref()
                .ok_or(SelectionError::NoMatchSelected)?;
            let map = state.catalog.stadium_map(&selection.match_id)?;
            let selector = SeatSelector::new(&map, state.config.seat_limit);
            Ok::<_, ApiError>(selector.view(selection)?)
        })
        .await?;
    Ok(Json(view))
}

#[utoipa::path(
    put,
    path = "/api/frontend/sessions/{session_id}/selection/block",
    params(
        ("session_id" = Uuid, Path, description = "Session ID")
    ),
    request_body = SelectBlockRequest,
    responses(
        (status = 200, description = "Selection after the change", body = SelectionResponse),
        (status = 400, description = "Malformed block id"),
        (status = 404, description = "Session or block not found"),
        (status = 409, description = "No match selected")
    ),
    tag = "selection"
)]
pub async fn select_block(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<SelectBlockRequest>,
) -> Result<Json<SelectionResponse>, ApiError> {
    payload.validate()?;

    let response = state
        .sessions
        .update(session_id, |session| {
            with_selection(&state, session, |selector, selection, _| {
                let outcome = selector.select_block(selection, &payload.block_id)?;
                Ok(SelectionResponse::new(&outcome, selector.view(selection)?))
            })
        })
        .await?;

    debug!("Block {} for session {}: {}", payload.block_id, session_id, response.outcome);
    Ok(Json(response))
}

#[utoipa::path(
    put,
    path = "/api/frontend/sessions/{session_id}/selection/row",
    params(
        ("session_id" = Uuid, Path, description = "Session ID")
    ),
    request_body = SelectRowRequest,
    responses(
        (status = 200, description = "Selection after the change", body = SelectionResponse),
        (status = 404, description = "Session or row not found"),
        (status = 409, description = "No block selected")
    ),
    tag = "selection"
)]
pub async fn select_row(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<SelectRowRequest>,
) -> Result<Json<SelectionResponse>, ApiError> {
    payload.validate()?;

    let response = state
        .sessions
        .update(session_id, |session| {
            with_selection(&state, session, |selector, selection, _| {
                let outcome = selector.select_row(selection, payload.row_number)?;
                Ok(SelectionResponse::new(&outcome, selector.view(selection)?))
            })
        })
        .await?;
    Ok(Json(response))
}

/// Handler for POST /api/frontend/sessions/{session_id}/selection/seats/{seat_number}
/// Toggles one seat; hitting the seat limit returns a notice, not an error
#[utoipa::path(
    post,
    path = "/api/frontend/sessions/{session_id}/selection/seats/{seat_number}",
    params(
        ("session_id" = Uuid, Path, description = "Session ID"),
        ("seat_number" = u32, Path, description = "Seat number in the selected row")
    ),
    responses(
        (status = 200, description = "Selection after the toggle", body = SelectionResponse),
        (status = 404, description = "Session or seat not found"),
        (status = 409, description = "No row selected")
    ),
    tag = "selection"
)]
pub async fn toggle_seat(
    State(state): State<AppState>,
    Path((session_id, seat_number)): Path<(Uuid, u32)>,
) -> Result<Json<SelectionResponse>, ApiError> {
    let response = state
        .sessions
        .update(session_id, |session| {
            with_selection(&state, session, |selector, selection, _| {
                let outcome = selector.toggle_seat(selection, seat_number)?;
                Ok(SelectionResponse::new(&outcome, selector.view(selection)?))
            })
        })
        .await?;

    if let Some(notice) = &response.notice {
        debug!("Seat {} rejected for session {}: {}", seat_number, session_id, notice);
    }
    Ok(Json(response))
}

/// Handler for POST /api/frontend/sessions/{session_id}/selection/add-to-cart
/// Converts the complete selection into a cart line
#[utoipa::path(
    post,
    path = "/api/frontend/sessions/{session_id}/selection/add-to-cart",
    params(
        ("session_id" = Uuid, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "Line added", body = AddToCartResponse),
        (status = 404, description = "Session not found"),
        (status = 409, description = "No match selected"),
        (status = 422, description = "Selection incomplete")
    ),
    tag = "selection"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<AddToCartResponse>, ApiError> {
    let timer = HoldTimer::new(state.config.cart_hold);
    let response = state
        .sessions
        .update(session_id, |session| {
            with_selection(&state, session, |selector, selection, session| {
                let mut candidate = selection.clone();
                let line = selector.take_line(&mut candidate)?;
                session.cart.add(line.clone())?;
                *selection = candidate;
                Ok(AddToCartResponse {
                    line,
                    cart: CartView::new(&session.cart, timer)?,
                })
            })
        })
        .await?;

    info!(
        "Session {} added {} x {} to cart",
        session_id, response.line.quantity, response.line.zone
    );
    Ok(Json(response))
}
