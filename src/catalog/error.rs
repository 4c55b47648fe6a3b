/// Error types for catalog lookups
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("Match not found: {0}")]
    MatchNotFound(String),
}
