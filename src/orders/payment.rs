// Payment gateway seam
//
// Checkout talks to a PaymentGateway only. The bundled SimulatedGateway waits a
// fixed delay and approves every charge.

use axum::async_trait;
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::debug;

use crate::orders::PaymentMethod;

/// One charge handed to a gateway
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRequest {
    /// Idempotency key; a gateway must not charge the same order twice
    pub order_id: String,
    pub amount: Decimal,
    pub method: PaymentMethod,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    Approved,
    Declined { reason: String },
    TimedOut,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn charge(&self, request: PaymentRequest) -> PaymentOutcome;
}

/// Gateway stand-in with a fixed latency and no failure path
#[derive(Debug, Clone)]
pub struct SimulatedGateway {
    delay: Duration,
}

impl SimulatedGateway {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn charge(&self, request: PaymentRequest) -> PaymentOutcome {
        debug!(
            "Simulating payment of {} for order {} ({:?} delay)",
            request.amount, request.order_id, self.delay
        );
        tokio::time::sleep(self.delay).await;
        PaymentOutcome::Approved
    }
}
