//! Data models returned by the session API.
//!
//! Responses serialize with snake_case field names and are what the RPC layer
//! sends back unchanged.

mod progress;
mod responses;

pub use progress::*;
pub use responses::*;
