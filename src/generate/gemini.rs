use super::{build_prompt, parse_plan_text, response_schema, GenerationError, LessonGenerator};
use crate::config::GenerationConfig;
use crate::plan::{GenerationRequest, Plan};
use reqwest::blocking::Client;
use serde_json::{json, Value};
use tracing::{debug, info};

/// Blocking client for the Generative Language `generateContent` endpoint.
pub struct GeminiClient {
    config: GenerationConfig,
    client: Client,
}

impl GeminiClient {
    pub fn new(config: GenerationConfig) -> Result<Self, GenerationError> {
        // One attempt, no deadline: the request stays open until the service answers.
        let client = Client::builder().timeout(None).build()?;
        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        )
    }

    fn request_body(&self, request: &GenerationRequest) -> Value {
        json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": build_prompt(request) }]
            }],
            "generationConfig": {
                "temperature": self.config.temperature,
                "responseMimeType": "application/json",
                "responseSchema": response_schema()
            }
        })
    }
}

/// Concatenated text of the first candidate's parts, if any.
fn candidate_text(response: &Value) -> Option<String> {
    let parts = response["candidates"]
        .as_array()
        .and_then(|arr| arr.first())
        .and_then(|c| c["content"]["parts"].as_array())?;
    let text: String = parts.iter().filter_map(|p| p["text"].as_str()).collect();
    Some(text)
}

impl LessonGenerator for GeminiClient {
    fn generate(&self, request: &GenerationRequest) -> Result<Plan, GenerationError> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            return Err(GenerationError::NotConfigured(
                "set MATATAG_API_KEY (or GEMINI_API_KEY)".to_string(),
            ));
        };

        let url = self.endpoint();
        info!(model = %self.config.model, topic = %request.topic, "requesting lesson plan");
        let resp = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .header("x-goog-api-key", api_key)
            .json(&self.request_body(request))
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().unwrap_or_default();
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        let json: Value = resp.json()?;
        let text = candidate_text(&json).unwrap_or_default();
        debug!(bytes = text.len(), "received generation payload");
        parse_plan_text(&text, request)
    }
}
