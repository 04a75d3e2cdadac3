use crate::form::FormError;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::plan::{
    GenerationRequest, GradeLevel, InstructionalModel, LessonDuration, QuestionType, Quarter,
    Subject, DAY_RANGE, ITEM_COUNT_RANGE, WEEK_RANGE,
};
use serde_json::json;

pub(crate) fn form_error(id: &str, e: &FormError) -> serde_json::Value {
    let field = match e {
        FormError::UnknownField(f) => Some(f.clone()),
        FormError::InvalidChoice { field, .. }
        | FormError::NotText(field)
        | FormError::NotNumber(field)
        | FormError::OutOfRange { field, .. } => Some(field.to_string()),
        FormError::MissingTopic => Some("topic".to_string()),
        FormError::NoQuestionTypes => Some("questionTypes".to_string()),
    };
    err(id, "bad_params", e.to_string(), field.map(|f| json!({ "field": f })))
}

fn snapshot(request: &GenerationRequest) -> serde_json::Value {
    json!({ "request": request })
}

fn handle_form_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, snapshot(state.form.current()))
}

fn handle_form_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    // Either a single {field, value} edit or a {patch: {...}} of several.
    if let Some(field) = req.params.get("field").and_then(|v| v.as_str()) {
        let value = req.params.get("value").cloned().unwrap_or(serde_json::Value::Null);
        if let Err(e) = state.form.update(field, &value) {
            return form_error(&req.id, &e);
        }
        return ok(&req.id, snapshot(state.form.current()));
    }

    let Some(patch) = req.params.get("patch").and_then(|v| v.as_object()) else {
        return err(&req.id, "bad_params", "missing field or patch", None);
    };
    // Validate against a scratch copy so a bad key leaves the form untouched.
    let mut scratch = state.form.clone();
    for (k, v) in patch {
        if let Err(e) = scratch.update(k, v) {
            return form_error(&req.id, &e);
        }
    }
    state.form = scratch;
    ok(&req.id, snapshot(state.form.current()))
}

fn handle_form_toggle(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(raw) = req.params.get("questionType").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing questionType", None);
    };
    let Some(qt) = QuestionType::parse(raw) else {
        return err(
            &req.id,
            "bad_params",
            format!("unknown question type: {}", raw),
            None,
        );
    };
    let changed = state.form.toggle_question_type(qt);
    ok(
        &req.id,
        json!({
            "changed": changed,
            "request": state.form.current()
        }),
    )
}

fn handle_form_reset(state: &mut AppState, req: &Request) -> serde_json::Value {
    state.form.reset();
    ok(&req.id, snapshot(state.form.current()))
}

fn handle_form_options(_state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "gradeLevels": GradeLevel::ALL.iter().map(|v| v.as_str()).collect::<Vec<_>>(),
            "subjects": Subject::ALL.iter().map(|v| v.as_str()).collect::<Vec<_>>(),
            "quarters": Quarter::ALL.iter().map(|v| v.as_str()).collect::<Vec<_>>(),
            "durations": LessonDuration::ALL.iter().map(|v| v.as_str()).collect::<Vec<_>>(),
            "instructionalModels": InstructionalModel::ALL.iter().map(|v| v.as_str()).collect::<Vec<_>>(),
            "questionTypes": QuestionType::ALL.iter().map(|v| v.as_str()).collect::<Vec<_>>(),
            "week": { "min": WEEK_RANGE.start(), "max": WEEK_RANGE.end() },
            "day": { "min": DAY_RANGE.start(), "max": DAY_RANGE.end() },
            "itemCount": { "min": ITEM_COUNT_RANGE.start(), "max": ITEM_COUNT_RANGE.end() },
            "defaults": GenerationRequest::default()
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "form.get" => Some(handle_form_get(state, req)),
        "form.update" => Some(handle_form_update(state, req)),
        "form.toggleQuestionType" => Some(handle_form_toggle(state, req)),
        "form.reset" => Some(handle_form_reset(state, req)),
        "form.options" => Some(handle_form_options(state, req)),
        _ => None,
    }
}
