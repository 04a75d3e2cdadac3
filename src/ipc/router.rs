use super::handlers;
use super::types::{AppState, Request};
use crate::generate::GenerationError;
use crate::ipc::error::err;
use crate::plan::Plan;
use serde_json::json;
use tracing::{debug, warn};

pub fn handle_request(state: &mut AppState, req: Request) -> serde_json::Value {
    debug!(id = %req.id, method = %req.method, "request");
    if let Some(resp) = handlers::core::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::form::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::presets::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::lesson::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::setup::try_handle(state, &req) {
        return resp;
    }

    err(
        &req.id,
        "not_implemented",
        format!("unknown method: {}", req.method),
        None,
    )
}

/// Parses and dispatches one stdin line. Blank lines produce no output.
pub fn handle_line(state: &mut AppState, line: &str) -> Option<serde_json::Value> {
    if line.trim().is_empty() {
        return None;
    }
    match serde_json::from_str::<Request>(line) {
        Ok(req) => Some(handle_request(state, req)),
        Err(e) => {
            // Can't reply without id.
            warn!(error = %e, "unparseable request line");
            Some(json!({
                "ok": false,
                "error": { "code": "bad_json", "message": e.to_string() }
            }))
        }
    }
}

pub fn handle_generated(
    state: &mut AppState,
    ticket: u64,
    outcome: Result<Plan, GenerationError>,
) -> Option<serde_json::Value> {
    handlers::lesson::handle_generated(state, ticket, outcome)
}
