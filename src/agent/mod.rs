//! Agent module
//!
//! The command router and its collaborators: chat command parsing, reply
//! payloads, the capability descriptor store and A2A JSON-RPC handling.

mod a2a;
pub mod command;
pub mod descriptor;
pub mod reply;
mod router;

pub use command::Command;
pub use router::{server_error, Router};
