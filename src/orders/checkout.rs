use chrono::{DateTime, Datelike, Utc};
use rand::Rng;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::cart::CartLine;
use crate::error::ApiError;
use crate::orders::{
    CheckoutError, CheckoutRequest, CheckoutStatus, CheckoutView, Confirmation, Order,
    OrderSummary, PaymentGateway, PaymentOutcome, PaymentRequest, StatusMachine,
};
use crate::session::{Session, SessionStore};

/// Gateways that have not answered after this long are treated as timed out
pub const PAYMENT_TIMEOUT: Duration = Duration::from_secs(60);

/// Number of distinct six-digit order serials
const ORDER_SERIAL_SPACE: u32 = 1_000_000;

/// Issues order identifiers of the form FAZ-<year>-<6 digits>
///
/// Clones share one counter, so identifiers never repeat until the serial
/// space wraps. The counter starts at a random serial.
#[derive(Debug, Clone)]
pub struct OrderNumbers {
    next: Arc<AtomicU32>,
}

impl OrderNumbers {
    pub fn new() -> Self {
        Self::starting_at(rand::thread_rng().gen_range(0..ORDER_SERIAL_SPACE))
    }

    pub fn starting_at(serial: u32) -> Self {
        Self {
            next: Arc::new(AtomicU32::new(serial % ORDER_SERIAL_SPACE)),
        }
    }

    pub fn next_id(&self, now: DateTime<Utc>) -> String {
        let serial = self
            .next
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| {
                Some((n + 1) % ORDER_SERIAL_SPACE)
            })
            .unwrap_or_else(|n| n);
        format!("FAZ-{}-{:06}", now.year(), serial)
    }
}

impl Default for OrderNumbers {
    fn default() -> Self {
        Self::new()
    }
}

/// One payment attempt and the cart snapshot it charges for
#[derive(Debug, Clone)]
pub struct CheckoutAttempt {
    pub order_id: String,
    pub status: CheckoutStatus,
    pub request: CheckoutRequest,
    pub lines: Vec<CartLine>,
    /// Exact totals of `lines`
    pub summary: OrderSummary,
    pub started_at: DateTime<Utc>,
    pub failure_reason: Option<String>,
    pub order: Option<Order>,
}

impl CheckoutAttempt {
    fn transition(&mut self, to: CheckoutStatus) -> Result<(), CheckoutError> {
        self.status =
            StatusMachine::transition(self.status, to).map_err(CheckoutError::InvalidTransition)?;
        Ok(())
    }

    pub fn view(&self) -> CheckoutView {
        CheckoutView {
            status: self.status,
            order_id: Some(self.order_id.clone()),
            summary: Some(self.summary.rounded()),
            started_at: Some(self.started_at),
            failure_reason: self.failure_reason.clone(),
            confirmation: self.order.clone().map(Confirmation::from),
        }
    }
}

/// Result of a checkout submission
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// A new attempt is processing; the charge still has to be dispatched
    Started(PaymentRequest),
    /// The attempt already in flight (or just paid) was returned as is
    Existing,
}

/// Service for checkout business logic
pub struct CheckoutService;

impl CheckoutService {
    /// Open a payment attempt for the session's cart
    ///
    /// Resubmitting while a payment is processing, or after it succeeded
    /// with nothing new in the cart, returns the existing attempt. A refused
    /// submission leaves the checkout state untouched.
    pub fn submit(
        session: &mut Session,
        request: &CheckoutRequest,
        order_numbers: &OrderNumbers,
    ) -> Result<Submission, CheckoutError> {
        if let Some(attempt) = &session.checkout {
            let retry_after_success =
                attempt.status == CheckoutStatus::Succeeded && session.cart.is_empty();
            if attempt.status == CheckoutStatus::Processing || retry_after_success {
                debug!("Returning existing checkout attempt {}", attempt.order_id);
                return Ok(Submission::Existing);
            }
        }

        if !request.terms_accepted {
            return Err(CheckoutError::TermsNotAccepted);
        }
        if session.cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let from = session
            .checkout
            .as_ref()
            .map(|a| a.status)
            .unwrap_or(CheckoutStatus::Idle);
        let status = StatusMachine::transition(from, CheckoutStatus::Submitting)
            .map_err(CheckoutError::InvalidTransition)?;
        let summary = session.cart.summary()?;

        let now = Utc::now();
        let lines = session.cart.lines().to_vec();
        let mut attempt = CheckoutAttempt {
            order_id: order_numbers.next_id(now),
            status,
            request: CheckoutRequest {
                terms_accepted: request.terms_accepted,
                payment_method: request.payment_method.normalized(),
            },
            summary,
            lines,
            started_at: now,
            failure_reason: None,
            order: None,
        };
        attempt.transition(CheckoutStatus::Processing)?;

        let payment = PaymentRequest {
            order_id: attempt.order_id.clone(),
            amount: attempt.summary.rounded().total,
            method: attempt.request.payment_method.clone(),
        };
        info!(
            "Checkout {} processing for session {} ({} lines, total {})",
            attempt.order_id,
            session.id,
            attempt.lines.len(),
            payment.amount
        );
        session.checkout = Some(attempt);
        Ok(Submission::Started(payment))
    }

    /// Apply a gateway outcome to the attempt identified by `order_id`
    ///
    /// On approval the paid lines leave the cart and the order is frozen
    /// into the session's order history.
    pub fn complete(
        session: &mut Session,
        order_id: &str,
        outcome: PaymentOutcome,
    ) -> Result<CheckoutStatus, CheckoutError> {
        let attempt = session
            .checkout
            .as_mut()
            .filter(|a| a.order_id == order_id)
            .ok_or(CheckoutError::NotStarted)?;

        match outcome {
            PaymentOutcome::Approved => {
                attempt.transition(CheckoutStatus::Succeeded)?;
                let order = Order {
                    order_id: attempt.order_id.clone(),
                    lines: attempt.lines.clone(),
                    summary: attempt.summary.rounded(),
                    paid_with: attempt.request.payment_method.receipt_label(),
                    paid_at: Utc::now(),
                };
                session.orders.push(order.clone());
                attempt.order = Some(order);
                for line in &attempt.lines {
                    // lines removed by the buyer meanwhile are already gone
                    let _ = session.cart.remove(line.id);
                }
            }
            PaymentOutcome::Declined { reason } => {
                attempt.transition(CheckoutStatus::Declined)?;
                attempt.failure_reason = Some(reason);
            }
            PaymentOutcome::TimedOut => {
                attempt.transition(CheckoutStatus::TimedOut)?;
            }
        }

        let status = attempt.status;
        session.clear_payment_task();
        Ok(status)
    }

    /// Leave the processing page, cancelling the pending payment
    pub fn cancel(session: &mut Session) -> Result<CheckoutStatus, CheckoutError> {
        let attempt = session.checkout.as_mut().ok_or(CheckoutError::NotStarted)?;
        attempt.transition(CheckoutStatus::Cancelled)?;
        let status = attempt.status;
        if session.cancel_payment_task() {
            debug!("Aborted payment task for session {}", session.id);
        }
        Ok(status)
    }

    pub fn view(session: &Session) -> CheckoutView {
        session
            .checkout
            .as_ref()
            .map(CheckoutAttempt::view)
            .unwrap_or_else(CheckoutView::idle)
    }
}

/// Dispatch a charge in the background and record its outcome
///
/// The returned handle aborts the charge when the buyer leaves.
pub fn spawn_payment(
    sessions: SessionStore,
    gateway: Arc<dyn PaymentGateway>,
    session_id: Uuid,
    payment: PaymentRequest,
) -> AbortHandle {
    let task = tokio::spawn(async move {
        let order_id = payment.order_id.clone();
        let outcome = tokio::time::timeout(PAYMENT_TIMEOUT, gateway.charge(payment))
            .await
            .unwrap_or(PaymentOutcome::TimedOut);

        let result: Result<CheckoutStatus, ApiError> = sessions
            .update(session_id, |session| {
                Ok(CheckoutService::complete(session, &order_id, outcome)?)
            })
            .await;

        match result {
            Ok(status) => info!("Checkout {} finished as {}", order_id, status),
            Err(e) => warn!("Discarding payment outcome for {}: {:?}", order_id, e),
        }
    });
    task.abort_handle()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::{MobileProvider, PaymentMethod};
    use regex::Regex;
    use rust_decimal_macros::dec;

    fn request(terms_accepted: bool) -> CheckoutRequest {
        CheckoutRequest {
            terms_accepted,
            payment_method: PaymentMethod::MobileMoney {
                provider: MobileProvider::Mtn,
                phone_number: "97 123 4567".to_string(),
            },
        }
    }

    fn session_with_cart() -> Session {
        let mut session = Session::new();
        session
            .cart
            .add(CartLine::seated("1", "Covered B1", "B1", 3, &[5, 6], dec!(120)))
            .unwrap();
        session
    }

    fn submit(
        session: &mut Session,
        request: &CheckoutRequest,
    ) -> Result<Submission, CheckoutError> {
        CheckoutService::submit(session, request, &OrderNumbers::new())
    }

    fn started_order_id(session: &mut Session) -> String {
        match submit(session, &request(true)).unwrap() {
            Submission::Started(payment) => payment.order_id,
            Submission::Existing => panic!("expected a new attempt"),
        }
    }

    #[test]
    fn test_order_id_format() {
        let pattern = Regex::new(r"^FAZ-\d{4}-\d{6}$").unwrap();
        let id = OrderNumbers::new().next_id(Utc::now());
        assert!(pattern.is_match(&id), "unexpected order id {}", id);
    }

    #[test]
    fn test_order_numbers_are_shared_and_wrap() {
        let now = Utc::now();
        let numbers = OrderNumbers::starting_at(999_998);
        let clone = numbers.clone();
        let year = now.year();

        assert_eq!(numbers.next_id(now), format!("FAZ-{}-999998", year));
        assert_eq!(clone.next_id(now), format!("FAZ-{}-999999", year));
        assert_eq!(numbers.next_id(now), format!("FAZ-{}-000000", year));
    }

    #[test]
    fn test_order_ids_do_not_repeat() {
        let numbers = OrderNumbers::new();
        let now = Utc::now();
        let ids: std::collections::HashSet<String> =
            (0..5_000).map(|_| numbers.next_id(now)).collect();
        assert_eq!(ids.len(), 5_000);
    }

    #[test]
    fn test_terms_not_accepted_stays_idle() {
        let mut session = session_with_cart();
        assert_eq!(
            submit(&mut session, &request(false)),
            Err(CheckoutError::TermsNotAccepted)
        );
        assert!(session.checkout.is_none());
        assert_eq!(CheckoutService::view(&session).status, CheckoutStatus::Idle);
    }

    #[test]
    fn test_empty_cart_is_refused() {
        let mut session = Session::new();
        assert_eq!(
            submit(&mut session, &request(true)),
            Err(CheckoutError::EmptyCart)
        );
        assert!(session.checkout.is_none());
    }

    #[test]
    fn test_submit_starts_processing() {
        let mut session = session_with_cart();
        let submission = submit(&mut session, &request(true)).unwrap();

        let Submission::Started(payment) = submission else {
            panic!("expected a new attempt");
        };
        assert_eq!(payment.amount, dec!(292.32));
        assert_eq!(
            payment.method,
            PaymentMethod::MobileMoney {
                provider: MobileProvider::Mtn,
                phone_number: "971234567".to_string()
            }
        );
        let view = CheckoutService::view(&session);
        assert_eq!(view.status, CheckoutStatus::Processing);
        assert_eq!(view.order_id, Some(payment.order_id));
    }

    #[test]
    fn test_resubmit_while_processing_is_idempotent() {
        let mut session = session_with_cart();
        let order_id = started_order_id(&mut session);

        assert_eq!(
            submit(&mut session, &request(true)),
            Ok(Submission::Existing)
        );
        assert_eq!(session.checkout.as_ref().unwrap().order_id, order_id);
    }

    #[test]
    fn test_approval_freezes_order_and_clears_cart() {
        let mut session = session_with_cart();
        let order_id = started_order_id(&mut session);

        let status =
            CheckoutService::complete(&mut session, &order_id, PaymentOutcome::Approved).unwrap();
        assert_eq!(status, CheckoutStatus::Succeeded);
        assert!(session.cart.is_empty());

        let view = CheckoutService::view(&session);
        let confirmation = view.confirmation.unwrap();
        assert_eq!(confirmation.order.order_id, order_id);
        assert_eq!(confirmation.ticket_code, format!("FAZ-TICKET:{}", order_id));
        assert_eq!(confirmation.ticket_count, 2);
        assert_eq!(confirmation.order.summary.total, dec!(292.32));
        assert_eq!(confirmation.order.paid_with, "MTN Mobile Money ***4567");

        // retrying after success does not charge again
        assert_eq!(
            submit(&mut session, &request(true)),
            Ok(Submission::Existing)
        );
    }

    #[test]
    fn test_lines_added_during_processing_survive() {
        let mut session = session_with_cart();
        let order_id = started_order_id(&mut session);
        session
            .cart
            .add(CartLine::seated("2", "East C1", "C1", 3, &[1, 2], dec!(50)))
            .unwrap();

        CheckoutService::complete(&mut session, &order_id, PaymentOutcome::Approved).unwrap();
        assert_eq!(session.cart.lines().len(), 1);
        assert_eq!(session.cart.lines()[0].block_id, "C1");

        // the remaining line can be paid in a new attempt
        assert!(matches!(
            submit(&mut session, &request(true)),
            Ok(Submission::Started(_))
        ));
    }

    #[test]
    fn test_second_purchase_keeps_first_order() {
        let mut session = session_with_cart();
        let first = started_order_id(&mut session);
        CheckoutService::complete(&mut session, &first, PaymentOutcome::Approved).unwrap();

        session
            .cart
            .add(CartLine::seated("2", "East C1", "C1", 3, &[1, 2], dec!(50)))
            .unwrap();
        let second = started_order_id(&mut session);
        CheckoutService::complete(&mut session, &second, PaymentOutcome::Approved).unwrap();

        let ids: Vec<&str> = session.orders.iter().map(|o| o.order_id.as_str()).collect();
        assert_eq!(ids, vec![first.as_str(), second.as_str()]);
        assert_eq!(session.orders[0].lines[0].block_id, "B1");
        assert_eq!(session.orders[1].lines[0].block_id, "C1");
    }

    #[test]
    fn test_declined_payment_is_not_recorded() {
        let mut session = session_with_cart();
        let order_id = started_order_id(&mut session);
        CheckoutService::complete(
            &mut session,
            &order_id,
            PaymentOutcome::Declined {
                reason: "Insufficient funds".to_string(),
            },
        )
        .unwrap();
        assert!(session.orders.is_empty());
    }

    #[test]
    fn test_decline_then_retry() {
        let mut session = session_with_cart();
        let order_id = started_order_id(&mut session);

        let status = CheckoutService::complete(
            &mut session,
            &order_id,
            PaymentOutcome::Declined {
                reason: "Insufficient funds".to_string(),
            },
        )
        .unwrap();
        assert_eq!(status, CheckoutStatus::Declined);
        assert_eq!(session.cart.lines().len(), 1);
        assert_eq!(
            CheckoutService::view(&session).failure_reason.as_deref(),
            Some("Insufficient funds")
        );

        started_order_id(&mut session);
        assert_eq!(CheckoutService::view(&session).status, CheckoutStatus::Processing);
    }

    #[test]
    fn test_cancel_discards_late_outcome() {
        let mut session = session_with_cart();
        let order_id = started_order_id(&mut session);

        assert_eq!(CheckoutService::cancel(&mut session), Ok(CheckoutStatus::Cancelled));
        assert!(matches!(
            CheckoutService::complete(&mut session, &order_id, PaymentOutcome::Approved),
            Err(CheckoutError::InvalidTransition(_))
        ));
        assert_eq!(session.cart.lines().len(), 1);
    }

    #[test]
    fn test_cancel_without_attempt() {
        let mut session = Session::new();
        assert_eq!(CheckoutService::cancel(&mut session), Err(CheckoutError::NotStarted));
    }

    #[test]
    fn test_outcome_for_other_attempt_is_ignored() {
        let mut session = session_with_cart();
        started_order_id(&mut session);
        assert_eq!(
            CheckoutService::complete(&mut session, "FAZ-1999-000000", PaymentOutcome::Approved),
            Err(CheckoutError::NotStarted)
        );
    }

    #[test]
    fn test_timed_out_outcome() {
        let mut session = session_with_cart();
        let order_id = started_order_id(&mut session);
        assert_eq!(
            CheckoutService::complete(&mut session, &order_id, PaymentOutcome::TimedOut),
            Ok(CheckoutStatus::TimedOut)
        );
    }
}
