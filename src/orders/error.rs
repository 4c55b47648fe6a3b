/// Error types for checkout operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckoutError {
    #[error("Terms and conditions must be accepted")]
    TermsNotAccepted,

    #[error("Cart is empty")]
    EmptyCart,

    #[error("No checkout has been started")]
    NotStarted,

    #[error("{0}")]
    InvalidTransition(String),

    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// Arithmetic failures while pricing an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PricingError {
    #[error("Order total is out of range")]
    Overflow,
}
