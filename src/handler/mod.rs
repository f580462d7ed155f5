//! Request handler module
//!
//! Turns hyper requests into command router calls and router output into
//! JSON responses, with access logging.

pub mod router;

// Re-export main entry point
pub use router::handle_request;
