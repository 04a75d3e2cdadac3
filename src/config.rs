use tracing::warn;

pub const DEFAULT_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

const API_KEY_VARS: [&str; 3] = ["MATATAG_API_KEY", "GEMINI_API_KEY", "API_KEY"];

/// Process-level settings for the generation service.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    pub api_key: Option<String>,
    pub api_base: String,
    pub model: String,
    pub temperature: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl GenerationConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |k: &str| lookup(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mut cfg = Self::default();
        cfg.api_key = API_KEY_VARS.iter().find_map(|k| non_empty(k));
        if let Some(base) = non_empty("MATATAG_API_BASE") {
            cfg.api_base = base.trim_end_matches('/').to_string();
        }
        if let Some(model) = non_empty("MATATAG_MODEL") {
            cfg.model = model;
        }
        if let Some(raw) = non_empty("MATATAG_TEMPERATURE") {
            match raw.parse::<f32>() {
                Ok(t) if (0.0..=2.0).contains(&t) => cfg.temperature = t,
                _ => warn!(value = %raw, "ignoring invalid MATATAG_TEMPERATURE"),
            }
        }
        cfg
    }

    /// Applies the workspace `setup.generation` section on top of the process settings.
    pub fn with_workspace_overrides(mut self, section: &serde_json::Value) -> Self {
        if let Some(model) = section
            .get("model")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            self.model = model.to_string();
        }
        if let Some(t) = section.get("temperature").and_then(|v| v.as_f64()) {
            self.temperature = t as f32;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let cfg = GenerationConfig::from_lookup(lookup(&[]));
        assert_eq!(cfg, GenerationConfig::default());
        assert_eq!(cfg.model, "gemini-3-pro-preview");
        assert!(cfg.api_key.is_none());
    }

    #[test]
    fn api_key_falls_back_in_order() {
        let cfg = GenerationConfig::from_lookup(lookup(&[("API_KEY", "c"), ("GEMINI_API_KEY", "b")]));
        assert_eq!(cfg.api_key.as_deref(), Some("b"));
        let cfg = GenerationConfig::from_lookup(lookup(&[("MATATAG_API_KEY", "  "), ("API_KEY", "c")]));
        assert_eq!(cfg.api_key.as_deref(), Some("c"));
    }

    #[test]
    fn out_of_range_temperature_is_ignored() {
        let cfg = GenerationConfig::from_lookup(lookup(&[("MATATAG_TEMPERATURE", "5")]));
        assert_eq!(cfg.temperature, DEFAULT_TEMPERATURE);
        let cfg = GenerationConfig::from_lookup(lookup(&[("MATATAG_TEMPERATURE", "0.2")]));
        assert_eq!(cfg.temperature, 0.2);
    }

    #[test]
    fn workspace_section_overrides_model_and_temperature() {
        let cfg = GenerationConfig::from_lookup(lookup(&[("MATATAG_API_BASE", "http://x/v1beta/")]))
            .with_workspace_overrides(&json!({ "model": "gemini-flash", "temperature": 1.0 }));
        assert_eq!(cfg.api_base, "http://x/v1beta");
        assert_eq!(cfg.model, "gemini-flash");
        assert_eq!(cfg.temperature, 1.0);

        let unchanged = GenerationConfig::default().with_workspace_overrides(&json!({ "model": "" }));
        assert_eq!(unchanged.model, DEFAULT_MODEL);
    }
}
