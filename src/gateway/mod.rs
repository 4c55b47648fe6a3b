// HTTP edge concerns shared by every route

pub mod cors;
pub mod health;
pub mod rate_limit;
pub mod security;

pub use cors::*;
pub use health::*;
pub use rate_limit::*;
pub use security::*;
