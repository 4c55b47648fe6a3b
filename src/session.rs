// In-memory browsing sessions
//
// A session stands in for the state one browser tab would hold: the
// current seat selection, the cart, the checkout attempt and the orders
// paid so far.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::AbortHandle;
use tracing::{debug, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::cart::Cart;
use crate::error::ApiError;
use crate::orders::{CheckoutAttempt, Order, OrderNumbers};
use crate::selection::SelectionState;
use crate::AppState;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(Uuid),
}

#[derive(Debug)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Set while the buyer is on a match page
    pub selection: Option<SelectionState>,
    pub cart: Cart,
    pub checkout: Option<CheckoutAttempt>,
    /// Paid orders, oldest first
    pub orders: Vec<Order>,
    payment_task: Option<AbortHandle>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            selection: None,
            cart: Cart::new(),
            checkout: None,
            orders: Vec::new(),
            payment_task: None,
        }
    }

    /// Track the task driving the current payment, replacing any previous one
    pub fn set_payment_task(&mut self, handle: AbortHandle) {
        if let Some(previous) = self.payment_task.replace(handle) {
            previous.abort();
        }
    }

    /// Forget the payment task once it has finished on its own
    pub fn clear_payment_task(&mut self) {
        self.payment_task = None;
    }

    /// Abort the pending payment task, if any
    ///
    /// Returns true when a task was actually cancelled.
    pub fn cancel_payment_task(&mut self) -> bool {
        match self.payment_task.take() {
            Some(handle) => {
                let running = !handle.is_finished();
                handle.abort();
                running
            }
            None => false,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.cancel_payment_task();
    }
}

/// Shared session map
///
/// Cloning is cheap; every clone refers to the same sessions and the same
/// order number sequence.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
    order_numbers: OrderNumbers,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn order_numbers(&self) -> &OrderNumbers {
        &self.order_numbers
    }

    pub async fn create(&self) -> Uuid {
        let session = Session::new();
        let id = session.id;
        self.sessions.write().await.insert(id, session);
        info!("Created session {}", id);
        id
    }

    /// Discard a session; a pending payment timer is cancelled with it
    pub async fn remove(&self, id: Uuid) -> Result<(), SessionError> {
        let mut sessions = self.sessions.write().await;
        let mut session = sessions.remove(&id).ok_or(SessionError::NotFound(id))?;
        if session.cancel_payment_task() {
            debug!("Cancelled pending payment for discarded session {}", id);
        }
        info!("Discarded session {}", id);
        Ok(())
    }

    /// Run `f` with shared access to one session
    pub async fn read<R, E, F>(&self, id: Uuid, f: F) -> Result<R, E>
    where
        F: FnOnce(&Session) -> Result<R, E>,
        E: From<SessionError>,
    {
        let sessions = self.sessions.read().await;
        let session = sessions.get(&id).ok_or(SessionError::NotFound(id))?;
        f(session)
    }

    /// Run `f` with exclusive access to one session
    pub async fn update<R, E, F>(&self, id: Uuid, f: F) -> Result<R, E>
    where
        F: FnOnce(&mut Session) -> Result<R, E>,
        E: From<SessionError>,
    {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;
        f(session)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionCreated {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Handler for POST /api/frontend/sessions
#[utoipa::path(
    post,
    path = "/api/frontend/sessions",
    responses(
        (status = 201, description = "Session created", body = SessionCreated)
    ),
    tag = "sessions"
)]
pub async fn create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionCreated>), ApiError> {
    let session_id = state.sessions.create().await;
    let created_at = state
        .sessions
        .read(session_id, |session| Ok::<_, ApiError>(session.created_at))
        .await?;
    Ok((StatusCode::CREATED, Json(SessionCreated { session_id, created_at })))
}

#[utoipa::path(
    delete,
    path = "/api/frontend/sessions/{session_id}",
    params(
        ("session_id" = Uuid, Path, description = "Session ID")
    ),
    responses(
        (status = 204, description = "Session discarded"),
        (status = 404, description = "Session not found")
    ),
    tag = "sessions"
)]
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.sessions.remove(session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
