pub mod controller;
pub mod error;
pub mod handlers;

pub use controller::*;
pub use error::*;
pub use handlers::*;
