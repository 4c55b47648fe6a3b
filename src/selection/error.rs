/// Error types for the block → row → seat drill-down
///
/// Seat-limit refusals are not errors; see `SelectionOutcome::Rejected`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("Unknown block: {0}")]
    UnknownBlock(String),

    #[error("Row {row_number} does not exist in block {block_id}")]
    UnknownRow { block_id: String, row_number: u32 },

    #[error("Seat {seat_number} does not exist in row {row_number}")]
    UnknownSeat { row_number: u32, seat_number: u32 },

    #[error("No match selected, open a match first")]
    NoMatchSelected,

    #[error("Select a block before choosing a row")]
    BlockRequired,

    #[error("Select a row before choosing seats")]
    RowRequired,

    #[error("Selection is incomplete")]
    Incomplete,
}
