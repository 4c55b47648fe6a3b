pub mod checkout;
pub mod error;
pub mod handlers;
pub mod history;
pub mod models;
pub mod payment;
pub mod price_calculator;
pub mod status_machine;

pub use checkout::*;
pub use error::*;
pub use handlers::*;
pub use history::*;
pub use models::*;
pub use payment::*;
pub use price_calculator::*;
pub use status_machine::*;
