use crate::db;
use crate::docx::DEFAULT_FONT;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::{json, Map, Value};

#[derive(Clone, Copy)]
pub(crate) enum SetupSection {
    Generation,
    Export,
}

impl SetupSection {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "generation" => Some(Self::Generation),
            "export" => Some(Self::Export),
            _ => None,
        }
    }

    fn key(self) -> &'static str {
        match self {
            Self::Generation => "setup.generation",
            Self::Export => "setup.export",
        }
    }
}

fn default_section(state: &AppState, section: SetupSection) -> Value {
    match section {
        SetupSection::Generation => json!({
            "model": state.config.model,
            "temperature": state.config.temperature
        }),
        SetupSection::Export => json!({
            "font": DEFAULT_FONT,
            "defaultOutDir": null
        }),
    }
}

fn as_object_mut(value: &mut Value) -> Result<&mut Map<String, Value>, String> {
    value
        .as_object_mut()
        .ok_or_else(|| "internal setup object must be a JSON object".to_string())
}

fn parse_f64_range(v: &Value, key: &str, min: f64, max: f64) -> Result<f64, String> {
    let n = v.as_f64().ok_or_else(|| format!("{} must be a number", key))?;
    if !(min..=max).contains(&n) {
        return Err(format!("{} must be in {}..={}", key, min, max));
    }
    Ok(n)
}

fn parse_string_max(v: &Value, key: &str, max_len: usize) -> Result<String, String> {
    let s = v.as_str().ok_or_else(|| format!("{} must be string", key))?;
    let s = s.trim();
    if s.len() > max_len {
        return Err(format!("{} length must be <= {}", key, max_len));
    }
    Ok(s.to_string())
}

fn parse_nullable_string_max(v: &Value, key: &str, max_len: usize) -> Result<Value, String> {
    if v.is_null() {
        return Ok(Value::Null);
    }
    let s = parse_string_max(v, key, max_len)?;
    if s.is_empty() {
        return Ok(Value::Null);
    }
    Ok(Value::String(s))
}

fn merge_section_patch(
    section: SetupSection,
    current: &mut Value,
    patch: &Map<String, Value>,
) -> Result<(), String> {
    let obj = as_object_mut(current)?;
    for (k, v) in patch {
        match section {
            SetupSection::Generation => match k.as_str() {
                "model" => {
                    let s = parse_string_max(v, k, 120)?;
                    if s.is_empty() {
                        return Err("model must not be empty".into());
                    }
                    obj.insert(k.clone(), Value::String(s));
                }
                "temperature" => {
                    obj.insert(k.clone(), Value::from(parse_f64_range(v, k, 0.0, 2.0)?));
                }
                _ => return Err(format!("unknown generation field: {}", k)),
            },
            SetupSection::Export => match k.as_str() {
                "font" => {
                    let s = parse_string_max(v, k, 64)?;
                    if s.is_empty() {
                        return Err("font must not be empty".into());
                    }
                    obj.insert(k.clone(), Value::String(s));
                }
                "defaultOutDir" => {
                    obj.insert(k.clone(), parse_nullable_string_max(v, k, 1024)?);
                }
                _ => return Err(format!("unknown export field: {}", k)),
            },
        }
    }
    Ok(())
}

pub(crate) fn load_section(state: &AppState, section: SetupSection) -> anyhow::Result<Value> {
    let mut current = default_section(state, section);
    let Some(conn) = state.db.as_ref() else {
        return Ok(current);
    };
    if let Some(saved) = db::settings_get_json(conn, section.key())? {
        if let Some(saved_obj) = saved.as_object() {
            // Best-effort apply: malformed historical values should not block setup UI.
            let _ = merge_section_patch(section, &mut current, saved_obj);
        }
    }
    Ok(current)
}

fn handle_setup_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    if state.db.is_none() {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    }
    let generation = match load_section(state, SetupSection::Generation) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    let export = match load_section(state, SetupSection::Export) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };

    ok(
        &req.id,
        json!({
            "generation": generation,
            "export": export
        }),
    )
}

fn handle_setup_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    if state.db.is_none() {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    }
    let Some(section_raw) = req.params.get("section").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing section", None);
    };
    let Some(section) = SetupSection::parse(section_raw) else {
        return err(&req.id, "bad_params", "unknown section", None);
    };
    let Some(patch_obj) = req.params.get("patch").and_then(|v| v.as_object()) else {
        return err(&req.id, "bad_params", "patch must be an object", None);
    };

    let mut current = match load_section(state, section) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    if let Err(msg) = merge_section_patch(section, &mut current, patch_obj) {
        return err(&req.id, "bad_params", msg, None);
    }
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    if let Err(e) = db::settings_set_json(conn, section.key(), &current) {
        return err(&req.id, "db_update_failed", e.to_string(), None);
    }
    ok(&req.id, json!({ "ok": true, section_raw: current }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "setup.get" => Some(handle_setup_get(state, req)),
        "setup.update" => Some(handle_setup_update(state, req)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationConfig;

    fn state_with_db() -> AppState {
        let mut state = AppState::new(GenerationConfig::default());
        state.db = Some(db::open_in_memory().expect("db"));
        state
    }

    fn request(method: &str, params: Value) -> Request {
        Request {
            id: "1".to_string(),
            method: method.to_string(),
            params,
        }
    }

    #[test]
    fn defaults_come_from_process_config() {
        let mut state = state_with_db();
        let resp = try_handle(&mut state, &request("setup.get", json!({}))).expect("handled");
        assert_eq!(resp["result"]["generation"]["model"], "gemini-3-pro-preview");
        assert_eq!(resp["result"]["export"]["font"], "Aptos");
        assert!(resp["result"]["export"]["defaultOutDir"].is_null());
    }

    #[test]
    fn update_validates_and_persists() {
        let mut state = state_with_db();
        let bad = try_handle(
            &mut state,
            &request(
                "setup.update",
                json!({ "section": "generation", "patch": { "temperature": 3.5 } }),
            ),
        )
        .expect("handled");
        assert_eq!(bad["error"]["code"], "bad_params");

        let good = try_handle(
            &mut state,
            &request(
                "setup.update",
                json!({ "section": "generation", "patch": { "temperature": 0.2, "model": "gemini-flash" } }),
            ),
        )
        .expect("handled");
        assert_eq!(good["ok"], true);

        let section = load_section(&state, SetupSection::Generation).expect("load");
        assert_eq!(section["model"], "gemini-flash");
        assert!((section["temperature"].as_f64().expect("temp") - 0.2).abs() < 1e-9);
    }

    #[test]
    fn malformed_saved_values_fall_back_to_defaults() {
        let state = state_with_db();
        let conn = state.db.as_ref().expect("db");
        db::settings_set_json(conn, "setup.export", &json!({ "font": 12 })).expect("seed");
        let section = load_section(&state, SetupSection::Export).expect("load");
        assert_eq!(section["font"], "Aptos");
    }

    #[test]
    fn requires_workspace() {
        let mut state = AppState::new(GenerationConfig::default());
        let resp = try_handle(&mut state, &request("setup.get", json!({}))).expect("handled");
        assert_eq!(resp["error"]["code"], "no_workspace");
    }
}
