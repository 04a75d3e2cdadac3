mod test_support;

use serde_json::json;
use test_support::{request, request_ok, spawn_sidecar};
use std::io::Write;

#[test]
fn router_dispatch_smoke_covers_handler_families() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let health = request_ok(&mut stdin, &mut reader, "1", "health", json!({}));
    assert_eq!(health["phase"], "idle");
    assert_eq!(health["generationConfigured"], false);
    assert!(health["workspacePath"].is_null());

    let options = request_ok(&mut stdin, &mut reader, "2", "form.options", json!({}));
    assert_eq!(options["durations"], json!(["45 Minutes", "1 Hour"]));

    let builtin = request_ok(&mut stdin, &mut reader, "3", "presets.builtin", json!({}));
    assert!(builtin["presets"].as_array().map(|a| !a.is_empty()).unwrap_or(false));

    let status = request_ok(&mut stdin, &mut reader, "4", "lesson.status", json!({}));
    assert_eq!(status["hasPlan"], false);

    let current = request(&mut stdin, &mut reader, "5", "lesson.current", json!({}));
    assert_eq!(current["error"]["code"], "no_plan");

    let presets = request(&mut stdin, &mut reader, "6", "presets.list", json!({}));
    assert_eq!(presets["error"]["code"], "no_workspace");

    let setup = request(&mut stdin, &mut reader, "7", "setup.get", json!({}));
    assert_eq!(setup["error"]["code"], "no_workspace");

    let unknown = request(&mut stdin, &mut reader, "8", "grid.get", json!({}));
    assert_eq!(unknown["error"]["code"], "not_implemented");
}

#[test]
fn malformed_lines_get_bad_json_and_blank_lines_are_ignored() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    writeln!(stdin).expect("blank line");
    writeln!(stdin, "{{\"id\": 1").expect("bad line");
    stdin.flush().expect("flush");
    let bad = test_support::read_line_json(&mut reader);
    assert_eq!(bad["ok"], false);
    assert_eq!(bad["error"]["code"], "bad_json");

    // The session keeps serving after a bad line.
    let health = request_ok(&mut stdin, &mut reader, "after", "health", json!({}));
    assert_eq!(health["phase"], "idle");
}

#[test]
fn generate_without_api_key_reports_generic_failure() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "form.update",
        json!({ "field": "topic", "value": "Fractions" }),
    );
    let started = request_ok(&mut stdin, &mut reader, "2", "lesson.generate", json!({}));
    assert_eq!(started["phase"], "generating");

    let event = test_support::read_event(&mut reader);
    assert_eq!(event["event"], "lesson.generationFailed");
    assert_eq!(
        event["error"]["message"],
        "AI generation failed. Please refine your topic or check your internet connection."
    );
}
