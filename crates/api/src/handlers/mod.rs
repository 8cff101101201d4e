//! Route handlers

mod delivery;
mod execute;

pub use delivery::handle_delivery;
pub use execute::{ExecuteRequest, execute_action};
