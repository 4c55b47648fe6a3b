pub mod error;
pub mod handlers;
pub mod hold_timer;
pub mod models;

pub use error::*;
pub use handlers::*;
pub use hold_timer::*;
pub use models::*;
