use serde_json::json;

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    json!({
        "id": id,
        "ok": false,
        "error": error_body(code, message, details),
    })
}

/// Unsolicited line pushed when background work finishes.
pub fn event_ok(event: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "event": event,
        "ok": true,
        "result": result
    })
}

pub fn event_err(event: &str, code: &str, message: impl Into<String>) -> serde_json::Value {
    json!({
        "event": event,
        "ok": false,
        "error": error_body(code, message, None),
    })
}

fn error_body(
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    error
}
