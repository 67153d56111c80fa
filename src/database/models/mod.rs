pub mod balance;
pub mod leave_request;
mod macros;

pub use balance::*;
pub use leave_request::*;
