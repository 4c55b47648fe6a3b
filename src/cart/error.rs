use uuid::Uuid;

/// Error types for cart operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CartError {
    #[error("Cart line not found: {0}")]
    LineNotFound(Uuid),

    #[error("Invalid cart line: {0}")]
    InvalidLine(String),
}
