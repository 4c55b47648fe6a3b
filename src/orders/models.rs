use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::cart::CartLine;
use crate::orders::OrderSummary;
use crate::validation::{normalize_mobile_number, validate_cardholder_name, validate_mobile_number};

/// Checkout status enum representing the lifecycle of one payment attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStatus {
    Idle,
    Submitting,
    Processing,
    Succeeded,
    Declined,
    TimedOut,
    Cancelled,
}

impl CheckoutStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutStatus::Idle => "idle",
            CheckoutStatus::Submitting => "submitting",
            CheckoutStatus::Processing => "processing",
            CheckoutStatus::Succeeded => "succeeded",
            CheckoutStatus::Declined => "declined",
            CheckoutStatus::TimedOut => "timed_out",
            CheckoutStatus::Cancelled => "cancelled",
        }
    }

    /// No further transition happens without a new submission
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CheckoutStatus::Succeeded
                | CheckoutStatus::Declined
                | CheckoutStatus::TimedOut
                | CheckoutStatus::Cancelled
        )
    }
}

impl Default for CheckoutStatus {
    fn default() -> Self {
        CheckoutStatus::Idle
    }
}

impl std::fmt::Display for CheckoutStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MobileProvider {
    Mtn,
    Airtel,
    Zamtel,
}

impl MobileProvider {
    pub fn display_name(&self) -> &'static str {
        match self {
            MobileProvider::Mtn => "MTN Mobile Money",
            MobileProvider::Airtel => "Airtel Money",
            MobileProvider::Zamtel => "Zamtel Kwacha",
        }
    }
}

/// How the buyer pays
///
/// Card details beyond the cardholder name are never sent to the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaymentMethod {
    MobileMoney {
        provider: MobileProvider,
        /// Local number without +260, spaces allowed
        #[schema(example = "97 123 4567")]
        phone_number: String,
    },
    Card {
        #[schema(example = "Mutale Banda")]
        cardholder_name: String,
    },
}

impl PaymentMethod {
    /// Copy with the phone number stripped of spaces
    pub fn normalized(&self) -> Self {
        match self {
            PaymentMethod::MobileMoney {
                provider,
                phone_number,
            } => PaymentMethod::MobileMoney {
                provider: *provider,
                phone_number: normalize_mobile_number(phone_number),
            },
            PaymentMethod::Card { cardholder_name } => PaymentMethod::Card {
                cardholder_name: cardholder_name.trim().to_string(),
            },
        }
    }

    /// Short label for receipts, e.g. "Airtel Money ***4567"
    pub fn receipt_label(&self) -> String {
        match self {
            PaymentMethod::MobileMoney {
                provider,
                phone_number,
            } => {
                let digits = normalize_mobile_number(phone_number);
                let tail: String = digits
                    .chars()
                    .rev()
                    .take(4)
                    .collect::<Vec<_>>()
                    .into_iter()
                    .rev()
                    .collect();
                format!("{} ***{}", provider.display_name(), tail)
            }
            PaymentMethod::Card { cardholder_name } => format!("Card ({})", cardholder_name.trim()),
        }
    }
}

fn validate_payment_method(method: &PaymentMethod) -> Result<(), ValidationError> {
    match method {
        PaymentMethod::MobileMoney { phone_number, .. } => validate_mobile_number(phone_number),
        PaymentMethod::Card { cardholder_name } => validate_cardholder_name(cardholder_name),
    }
}

/// Request body for POST .../checkout
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CheckoutRequest {
    /// Must be true for the payment to be submitted
    pub terms_accepted: bool,
    #[validate(custom = "validate_payment_method")]
    pub payment_method: PaymentMethod,
}

/// Paid order, frozen at the moment payment succeeded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Order {
    #[schema(example = "FAZ-2025-001234")]
    pub order_id: String,
    pub lines: Vec<CartLine>,
    /// Display-rounded totals
    pub summary: OrderSummary,
    #[schema(example = "MTN Mobile Money ***4567")]
    pub paid_with: String,
    pub paid_at: DateTime<Utc>,
}

impl Order {
    pub fn ticket_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}

/// What the payment-success page renders
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Confirmation {
    pub order: Order,
    /// Payload for the scannable code; nothing validates it
    #[schema(example = "FAZ-TICKET:FAZ-2025-001234")]
    pub ticket_code: String,
    pub ticket_count: u32,
}

impl From<Order> for Confirmation {
    fn from(order: Order) -> Self {
        Self {
            ticket_code: format!("FAZ-TICKET:{}", order.order_id),
            ticket_count: order.ticket_count(),
            order,
        }
    }
}

/// Checkout state as returned to the storefront
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckoutView {
    pub status: CheckoutStatus,
    pub order_id: Option<String>,
    /// Display-rounded totals of the attempt
    pub summary: Option<OrderSummary>,
    pub started_at: Option<DateTime<Utc>>,
    /// Gateway reason for a declined payment
    pub failure_reason: Option<String>,
    pub confirmation: Option<Confirmation>,
}

impl CheckoutView {
    pub fn idle() -> Self {
        Self {
            status: CheckoutStatus::Idle,
            order_id: None,
            summary: None,
            started_at: None,
            failure_reason: None,
            confirmation: None,
        }
    }
}

/// Request body for POST /api/public/pricing/quote
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct QuoteRequest {
    #[validate(length(max = 50, message = "At most 50 items per quote"))]
    pub items: Vec<crate::orders::PricedItem>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_payment_method_deserialization() {
        let mobile: PaymentMethod = serde_json::from_value(json!({
            "type": "mobile_money",
            "provider": "airtel",
            "phone_number": "97 123 4567"
        }))
        .unwrap();
        assert_eq!(
            mobile,
            PaymentMethod::MobileMoney {
                provider: MobileProvider::Airtel,
                phone_number: "97 123 4567".to_string()
            }
        );

        let card: PaymentMethod = serde_json::from_value(json!({
            "type": "card",
            "cardholder_name": "Mutale Banda"
        }))
        .unwrap();
        assert!(matches!(card, PaymentMethod::Card { .. }));
    }

    #[test]
    fn test_checkout_request_validation() {
        let valid = CheckoutRequest {
            terms_accepted: true,
            payment_method: PaymentMethod::MobileMoney {
                provider: MobileProvider::Mtn,
                phone_number: "971234567".to_string(),
            },
        };
        assert!(valid.validate().is_ok());

        let short_number = CheckoutRequest {
            terms_accepted: true,
            payment_method: PaymentMethod::MobileMoney {
                provider: MobileProvider::Mtn,
                phone_number: "97123".to_string(),
            },
        };
        assert!(short_number.validate().is_err());

        let blank_name = CheckoutRequest {
            terms_accepted: true,
            payment_method: PaymentMethod::Card {
                cardholder_name: "  ".to_string(),
            },
        };
        assert!(blank_name.validate().is_err());
    }

    #[test]
    fn test_receipt_label_masks_number() {
        let method = PaymentMethod::MobileMoney {
            provider: MobileProvider::Zamtel,
            phone_number: "95 555 1234".to_string(),
        };
        assert_eq!(method.receipt_label(), "Zamtel Kwacha ***1234");
        assert_eq!(
            method.normalized(),
            PaymentMethod::MobileMoney {
                provider: MobileProvider::Zamtel,
                phone_number: "955551234".to_string()
            }
        );
    }

    #[test]
    fn test_confirmation_ticket_code() {
        let order = Order {
            order_id: "FAZ-2025-004321".to_string(),
            lines: vec![CartLine::seated("1", "VIP A1", "A1", 2, &[1, 2, 3], dec!(200))],
            summary: OrderSummary::default(),
            paid_with: "Card (T. Phiri)".to_string(),
            paid_at: Utc::now(),
        };
        let confirmation = Confirmation::from(order);
        assert_eq!(confirmation.ticket_code, "FAZ-TICKET:FAZ-2025-004321");
        assert_eq!(confirmation.ticket_count, 3);
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_string(&CheckoutStatus::TimedOut).unwrap(), "\"timed_out\"");
        assert_eq!(CheckoutStatus::default(), CheckoutStatus::Idle);
        assert!(CheckoutStatus::Cancelled.is_terminal());
        assert!(!CheckoutStatus::Processing.is_terminal());
    }
}
