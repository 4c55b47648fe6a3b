use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Transient user-facing warning, rendered by the frontend as a toast
///
/// Notices never abort an operation with a failure; the state they refer to
/// is left exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Notice {
    #[schema(example = "Max 10 seats")]
    pub title: String,
    #[schema(example = "You reached the ticket limit per order.")]
    pub description: String,
}

impl Notice {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn seat_limit(limit: usize) -> Self {
        Self::new(
            format!("Max {} seats", limit),
            "You reached the ticket limit per order.",
        )
    }

    pub fn select_seats() -> Self {
        Self::new("Select seats", "Choose a block, a row, and one or more seats.")
    }

    pub fn empty_cart() -> Self {
        Self::new("Your Cart is Empty", "Browse matches and add tickets to get started!")
    }

    pub fn accept_terms() -> Self {
        Self::new(
            "Accept the terms",
            "You must agree to the terms and conditions before paying.",
        )
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.title, self.description)
    }
}
