mod error;
mod handlers;
mod router;
mod types;

pub use router::{handle_generated, handle_line, handle_request};
pub use types::{AppState, Inbound, Request};
