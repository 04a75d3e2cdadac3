use std::path::PathBuf;
use std::sync::Arc;

use crate::document::LessonDocument;
use crate::docx;
use crate::generate::{GeminiClient, GenerationError, LessonGenerator, USER_FAILURE_MESSAGE};
use crate::ipc::error::{err, event_err, event_ok, ok};
use crate::ipc::handlers::form::form_error;
use crate::ipc::handlers::setup::{load_section, SetupSection};
use crate::ipc::types::{AppState, Inbound, Request};
use crate::plan::Plan;
use crate::render;
use crate::shell::{Phase, ShellError};
use serde_json::json;
use tracing::{error, info, warn};

fn status(state: &AppState) -> serde_json::Value {
    json!({
        "phase": state.shell.phase(),
        "error": state.shell.error(),
        "hasPlan": state.shell.plan().is_some(),
        "pendingTopic": state.shell.pending_request().map(|r| r.topic.clone())
    })
}

fn generator_for(state: &AppState) -> Result<Arc<dyn LessonGenerator>, GenerationError> {
    if let Some(g) = state.generator.as_ref() {
        return Ok(Arc::clone(g));
    }
    let overrides = load_section(state, SetupSection::Generation).unwrap_or_else(|e| {
        warn!(error = %e, "failed to read generation setup; using process settings");
        serde_json::Value::Null
    });
    let config = state.config.clone().with_workspace_overrides(&overrides);
    Ok(Arc::new(GeminiClient::new(config)?))
}

fn current_document(state: &AppState, id: &str) -> Result<LessonDocument, serde_json::Value> {
    state
        .shell
        .require_plan()
        .map(LessonDocument::from_plan)
        .map_err(|e| err(id, "no_plan", e.to_string(), None))
}

fn handle_lesson_generate(state: &mut AppState, req: &Request) -> serde_json::Value {
    if state.shell.phase() == Phase::Generating {
        return err(&req.id, "busy", ShellError::Busy.to_string(), None);
    }
    let request = match state.form.submit() {
        Ok(r) => r,
        Err(e) => return form_error(&req.id, &e),
    };
    let generator = match generator_for(state) {
        Ok(g) => g,
        Err(e) => {
            error!(error = %e, "failed to prepare generation client");
            return err(&req.id, "generation_failed", USER_FAILURE_MESSAGE, None);
        }
    };
    let ticket = match state.shell.begin(request.clone()) {
        Ok(t) => t,
        Err(e) => return err(&req.id, "busy", e.to_string(), None),
    };

    if let Some(tx) = state.inbox.clone() {
        std::thread::spawn(move || {
            let outcome = generator.generate(&request);
            // The receiver is gone only when the process is shutting down.
            let _ = tx.send(Inbound::Generated { ticket, outcome });
        });
        return ok(
            &req.id,
            json!({ "ticket": ticket, "phase": state.shell.phase() }),
        );
    }

    let outcome = generator.generate(&request);
    state.shell.complete(ticket, outcome);
    match state.shell.phase() {
        Phase::Showing => ok(
            &req.id,
            json!({
                "ticket": ticket,
                "status": status(state),
                "plan": state.shell.plan().map(Plan::to_wire)
            }),
        ),
        _ => err(&req.id, "generation_failed", USER_FAILURE_MESSAGE, None),
    }
}

/// Folds a worker's outcome into the shell and builds the event line for it.
/// Outcomes for a ticket the shell no longer waits on produce nothing.
pub fn handle_generated(
    state: &mut AppState,
    ticket: u64,
    outcome: Result<Plan, GenerationError>,
) -> Option<serde_json::Value> {
    if !state.shell.complete(ticket, outcome) {
        info!(ticket, "dropping stale generation outcome");
        return None;
    }
    Some(match state.shell.phase() {
        Phase::Showing => event_ok(
            "lesson.generated",
            json!({
                "ticket": ticket,
                "status": status(state),
                "plan": state.shell.plan().map(Plan::to_wire)
            }),
        ),
        _ => event_err(
            "lesson.generationFailed",
            "generation_failed",
            USER_FAILURE_MESSAGE,
        ),
    })
}

fn handle_lesson_status(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, status(state))
}

fn handle_lesson_current(state: &mut AppState, req: &Request) -> serde_json::Value {
    match state.shell.require_plan() {
        Ok(plan) => ok(&req.id, json!({ "plan": plan.to_wire() })),
        Err(e) => err(&req.id, "no_plan", e.to_string(), None),
    }
}

fn handle_lesson_discard(state: &mut AppState, req: &Request) -> serde_json::Value {
    match state.shell.discard() {
        Ok(()) => ok(&req.id, status(state)),
        Err(e) => err(&req.id, "busy", e.to_string(), None),
    }
}

fn handle_lesson_document_model(state: &mut AppState, req: &Request) -> serde_json::Value {
    match current_document(state, &req.id) {
        Ok(doc) => ok(&req.id, json!({ "document": doc })),
        Err(resp) => resp,
    }
}

fn handle_lesson_render_html(state: &mut AppState, req: &Request) -> serde_json::Value {
    match current_document(state, &req.id) {
        Ok(doc) => ok(&req.id, json!({ "html": render::html_fragment(&doc) })),
        Err(resp) => resp,
    }
}

fn handle_lesson_print_view(state: &mut AppState, req: &Request) -> serde_json::Value {
    match current_document(state, &req.id) {
        Ok(doc) => ok(&req.id, json!({ "html": render::print_page(&doc) })),
        Err(resp) => resp,
    }
}

fn handle_lesson_copy_text(state: &mut AppState, req: &Request) -> serde_json::Value {
    match current_document(state, &req.id) {
        Ok(doc) => ok(&req.id, json!({ "text": render::plain_text(&doc) })),
        Err(resp) => resp,
    }
}

fn export_dir(state: &AppState, req: &Request, section: &serde_json::Value) -> Option<PathBuf> {
    let explicit = req
        .params
        .get("outDir")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let saved = section
        .get("defaultOutDir")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty());
    explicit
        .or(saved)
        .map(PathBuf::from)
        .or_else(|| state.workspace.as_ref().map(|w| w.join("exports")))
}

fn handle_lesson_export_docx(state: &mut AppState, req: &Request) -> serde_json::Value {
    let doc = match current_document(state, &req.id) {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    let section = match load_section(state, SetupSection::Export) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    let Some(out_dir) = export_dir(state, req, &section) else {
        return err(
            &req.id,
            "bad_params",
            "outDir is required when no workspace is selected",
            None,
        );
    };
    let font = section
        .get("font")
        .and_then(|v| v.as_str())
        .unwrap_or(docx::DEFAULT_FONT);

    match docx::export_docx(&doc, font, &out_dir) {
        Ok(path) => {
            info!(path = %path.to_string_lossy(), "lesson plan exported");
            ok(
                &req.id,
                json!({
                    "path": path.to_string_lossy(),
                    "fileName": docx::export_file_name(&doc.topic)
                }),
            )
        }
        Err(e) => {
            error!(error = ?e, "docx export failed");
            err(&req.id, "export_failed", format!("{e:#}"), None)
        }
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "lesson.generate" => Some(handle_lesson_generate(state, req)),
        "lesson.status" => Some(handle_lesson_status(state, req)),
        "lesson.current" => Some(handle_lesson_current(state, req)),
        "lesson.discard" => Some(handle_lesson_discard(state, req)),
        "lesson.documentModel" => Some(handle_lesson_document_model(state, req)),
        "lesson.renderHtml" => Some(handle_lesson_render_html(state, req)),
        "lesson.printView" => Some(handle_lesson_print_view(state, req)),
        "lesson.copyText" => Some(handle_lesson_copy_text(state, req)),
        "lesson.exportDocx" => Some(handle_lesson_export_docx(state, req)),
        _ => None,
    }
}
