use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::sync::Arc;

use rusqlite::Connection;
use serde::Deserialize;

use crate::config::GenerationConfig;
use crate::form::FormController;
use crate::generate::{GenerationError, LessonGenerator};
use crate::plan::Plan;
use crate::presets::PresetLibrary;
use crate::shell::Shell;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Everything the main loop reacts to, in arrival order.
pub enum Inbound {
    Line(String),
    Generated {
        ticket: u64,
        outcome: Result<Plan, GenerationError>,
    },
    Closed,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub db: Option<Connection>,
    pub form: FormController,
    pub presets: PresetLibrary,
    pub shell: Shell,
    pub config: GenerationConfig,
    /// Fixed generator; when unset a client is built from `config` per submission.
    pub generator: Option<Arc<dyn LessonGenerator>>,
    /// Where worker threads report back. Without one, generation runs inline.
    pub inbox: Option<Sender<Inbound>>,
}

impl AppState {
    pub fn new(config: GenerationConfig) -> Self {
        Self {
            workspace: None,
            db: None,
            form: FormController::default(),
            presets: PresetLibrary::default(),
            shell: Shell::default(),
            config,
            generator: None,
            inbox: None,
        }
    }
}
