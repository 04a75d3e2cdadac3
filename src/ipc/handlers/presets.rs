use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::presets::{builtin_templates, Preset, PresetError};
use serde_json::json;
use tracing::info;

fn preset_error(id: &str, e: &PresetError) -> serde_json::Value {
    match e {
        PresetError::EmptyName | PresetError::OutOfRange(_) => {
            err(id, "bad_params", e.to_string(), None)
        }
        PresetError::Persist(_) => err(id, "db_update_failed", e.to_string(), None),
    }
}

fn get_index(req: &Request) -> Result<usize, serde_json::Value> {
    req.params
        .get("index")
        .and_then(|v| v.as_u64())
        .map(|n| n as usize)
        .ok_or_else(|| err(&req.id, "bad_params", "missing index", None))
}

fn rows(presets: &[Preset]) -> Vec<serde_json::Value> {
    presets
        .iter()
        .enumerate()
        .map(|(index, p)| json!({ "index": index, "name": p.name, "data": p.data }))
        .collect()
}

fn handle_presets_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    if state.db.is_none() {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    }
    ok(&req.id, json!({ "presets": rows(state.presets.list()) }))
}

fn handle_presets_save(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(name) = req.params.get("name").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing name", None);
    };
    match state.presets.save(conn, name, state.form.current()) {
        Ok(index) => {
            info!(index, name = name.trim(), "preset saved");
            ok(
                &req.id,
                json!({ "index": index, "presets": rows(state.presets.list()) }),
            )
        }
        Err(e) => preset_error(&req.id, &e),
    }
}

fn handle_presets_apply(state: &mut AppState, req: &Request) -> serde_json::Value {
    if state.db.is_none() {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    }
    let index = match get_index(req) {
        Ok(i) => i,
        Err(resp) => return resp,
    };
    let data = match state.presets.get(index) {
        Ok(p) => p.data.clone(),
        Err(e) => return preset_error(&req.id, &e),
    };
    state.form.apply(data);
    ok(&req.id, json!({ "request": state.form.current() }))
}

fn handle_presets_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let index = match get_index(req) {
        Ok(i) => i,
        Err(resp) => return resp,
    };
    match state.presets.delete(conn, index) {
        Ok(removed) => {
            info!(index, name = %removed.name, "preset deleted");
            ok(&req.id, json!({ "presets": rows(state.presets.list()) }))
        }
        Err(e) => preset_error(&req.id, &e),
    }
}

fn handle_presets_builtin(_state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!({ "presets": rows(&builtin_templates()) }))
}

fn handle_presets_apply_builtin(state: &mut AppState, req: &Request) -> serde_json::Value {
    let index = match get_index(req) {
        Ok(i) => i,
        Err(resp) => return resp,
    };
    let Some(template) = builtin_templates().into_iter().nth(index) else {
        return preset_error(&req.id, &PresetError::OutOfRange(index));
    };
    state.form.apply(template.data);
    ok(&req.id, json!({ "request": state.form.current() }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "presets.list" => Some(handle_presets_list(state, req)),
        "presets.save" => Some(handle_presets_save(state, req)),
        "presets.apply" => Some(handle_presets_apply(state, req)),
        "presets.delete" => Some(handle_presets_delete(state, req)),
        "presets.builtin" => Some(handle_presets_builtin(state, req)),
        "presets.applyBuiltin" => Some(handle_presets_apply_builtin(state, req)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationConfig;
    use crate::db;
    use crate::presets::PresetLibrary;
    use serde_json::Value;

    fn call(state: &mut AppState, method: &str, params: Value) -> Value {
        let req = Request {
            id: "p".to_string(),
            method: method.to_string(),
            params,
        };
        try_handle(state, &req).expect("handled")
    }

    fn state_with_db() -> AppState {
        let mut state = AppState::new(GenerationConfig::default());
        state.db = Some(db::open_in_memory().expect("db"));
        state
    }

    #[test]
    fn save_apply_delete() {
        let mut state = state_with_db();
        state
            .form
            .update("topic", &json!("Photosynthesis"))
            .expect("topic");
        let saved = call(&mut state, "presets.save", json!({ "name": "  Science day " }));
        assert_eq!(saved["result"]["index"], 0);
        assert_eq!(saved["result"]["presets"][0]["name"], "Science day");

        state.form.reset();
        let applied = call(&mut state, "presets.apply", json!({ "index": 0 }));
        assert_eq!(applied["result"]["request"]["topic"], "Photosynthesis");

        // Persisted list survives a reload from the same connection.
        let reloaded = PresetLibrary::load(state.db.as_ref().expect("db"));
        assert_eq!(reloaded.list().len(), 1);

        let deleted = call(&mut state, "presets.delete", json!({ "index": 0 }));
        assert_eq!(deleted["result"]["presets"], json!([]));
        let missing = call(&mut state, "presets.delete", json!({ "index": 0 }));
        assert_eq!(missing["error"]["code"], "bad_params");
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut state = state_with_db();
        let resp = call(&mut state, "presets.save", json!({ "name": "   " }));
        assert_eq!(resp["error"]["code"], "bad_params");
        assert_eq!(state.presets.list().len(), 0);
    }

    #[test]
    fn builtins_need_no_workspace() {
        let mut state = AppState::new(GenerationConfig::default());
        let list = call(&mut state, "presets.builtin", json!({}));
        assert!(!list["result"]["presets"].as_array().expect("list").is_empty());

        let applied = call(&mut state, "presets.applyBuiltin", json!({ "index": 0 }));
        assert_eq!(
            applied["result"]["request"]["topic"],
            "Phonological Awareness: Identifying Rhyming Words"
        );

        let user = call(&mut state, "presets.list", json!({}));
        assert_eq!(user["error"]["code"], "no_workspace");
    }
}
