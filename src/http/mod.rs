//! HTTP protocol layer module
//!
//! Response builders shared by the request handler, decoupled from the
//! command routing logic.

pub mod response;

// Re-export commonly used builders
pub use response::{build_413_response, build_json_response, build_options_response};
