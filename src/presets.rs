use crate::plan::{
    AssessmentConfig, GenerationRequest, GradeLevel, InstructionalModel, LessonDuration,
    QuestionType, Quarter, Subject,
};
use crate::store::PreferenceStore;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const PRESETS_KEY: &str = "matatag_user_templates";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub data: GenerationRequest,
}

#[derive(Debug, thiserror::Error)]
pub enum PresetError {
    #[error("preset name must not be empty")]
    EmptyName,
    #[error("no preset at index {0}")]
    OutOfRange(usize),
    #[error("failed to persist presets: {0}")]
    Persist(String),
}

/// User-named form snapshots, kept in insertion order.
#[derive(Debug, Clone, Default)]
pub struct PresetLibrary {
    presets: Vec<Preset>,
}

impl PresetLibrary {
    /// Reads the persisted list. Unreadable or corrupt data yields an empty library.
    pub fn load(store: &dyn PreferenceStore) -> Self {
        let raw = match store.get(PRESETS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Self::default(),
            Err(e) => {
                warn!(error = %e, "failed to read stored presets");
                return Self::default();
            }
        };
        match serde_json::from_str::<Vec<Preset>>(&raw) {
            Ok(presets) => {
                debug!(count = presets.len(), "loaded presets");
                Self { presets }
            }
            Err(e) => {
                warn!(error = %e, "failed to parse stored presets");
                Self::default()
            }
        }
    }

    pub fn list(&self) -> &[Preset] {
        &self.presets
    }

    pub fn get(&self, index: usize) -> Result<&Preset, PresetError> {
        self.presets.get(index).ok_or(PresetError::OutOfRange(index))
    }

    /// Appends a snapshot under `name` (trimmed). Names need not be unique.
    pub fn save(
        &mut self,
        store: &dyn PreferenceStore,
        name: &str,
        data: &GenerationRequest,
    ) -> Result<usize, PresetError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PresetError::EmptyName);
        }
        let mut next = self.presets.clone();
        next.push(Preset {
            name: name.to_string(),
            data: data.clone(),
        });
        persist(store, &next)?;
        self.presets = next;
        Ok(self.presets.len() - 1)
    }

    pub fn delete(
        &mut self,
        store: &dyn PreferenceStore,
        index: usize,
    ) -> Result<Preset, PresetError> {
        if index >= self.presets.len() {
            return Err(PresetError::OutOfRange(index));
        }
        let mut next = self.presets.clone();
        let removed = next.remove(index);
        persist(store, &next)?;
        self.presets = next;
        Ok(removed)
    }
}

fn persist(store: &dyn PreferenceStore, presets: &[Preset]) -> Result<(), PresetError> {
    let raw = serde_json::to_string(presets).map_err(|e| PresetError::Persist(e.to_string()))?;
    store
        .set(PRESETS_KEY, &raw)
        .map_err(|e| PresetError::Persist(e.to_string()))
}

/// Read-only starter templates shipped with the app.
pub fn builtin_templates() -> Vec<Preset> {
    vec![
        Preset {
            name: "G1 English: Rhymes".to_string(),
            data: GenerationRequest {
                grade_level: GradeLevel::Grade1,
                subject: Subject::English,
                topic: "Phonological Awareness: Identifying Rhyming Words".to_string(),
                quarter: Quarter::First,
                week: 1,
                day: 1,
                duration: LessonDuration::FortyFiveMinutes,
                instructional_model: InstructionalModel::Standard,
                assessment_config: AssessmentConfig {
                    item_count: 5,
                    question_types: vec![QuestionType::MultipleChoice],
                },
                additional_context: "Include interactive games.".to_string(),
            },
        },
        Preset {
            name: "G7 Science: Cells".to_string(),
            data: GenerationRequest {
                grade_level: GradeLevel::Grade7,
                subject: Subject::Science,
                topic: "Biological Organization: The Cell".to_string(),
                quarter: Quarter::Second,
                week: 5,
                day: 1,
                duration: LessonDuration::OneHour,
                instructional_model: InstructionalModel::FiveE,
                assessment_config: AssessmentConfig {
                    item_count: 10,
                    question_types: vec![QuestionType::MultipleChoice, QuestionType::ShortAnswer],
                },
                additional_context: "Microscopy focus.".to_string(),
            },
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::store::MemoryStore;

    fn request(topic: &str) -> GenerationRequest {
        GenerationRequest {
            topic: topic.to_string(),
            ..GenerationRequest::default()
        }
    }

    #[test]
    fn blank_name_is_rejected_without_touching_storage() {
        let store = MemoryStore::default();
        let mut lib = PresetLibrary::load(&store);
        lib.save(&store, "First", &request("a")).expect("save");
        let before = store.raw(PRESETS_KEY);

        assert!(matches!(
            lib.save(&store, "   ", &request("b")),
            Err(PresetError::EmptyName)
        ));
        assert!(matches!(lib.save(&store, "", &request("b")), Err(PresetError::EmptyName)));
        assert_eq!(store.raw(PRESETS_KEY), before);
        assert_eq!(lib.list().len(), 1);
    }

    #[test]
    fn delete_removes_only_that_index_and_keeps_order() {
        let store = MemoryStore::default();
        let mut lib = PresetLibrary::default();
        for name in ["a", "b", "c", "d"] {
            lib.save(&store, name, &request(name)).expect("save");
        }
        let removed = lib.delete(&store, 1).expect("delete");
        assert_eq!(removed.name, "b");
        let names: Vec<&str> = lib.list().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c", "d"]);
        assert!(matches!(lib.delete(&store, 3), Err(PresetError::OutOfRange(3))));
    }

    #[test]
    fn list_survives_a_fresh_session() {
        let conn = db::open_in_memory().expect("db");
        let mut lib = PresetLibrary::load(&conn);
        lib.save(&conn, "Morning", &request("Fractions")).expect("save");
        lib.save(&conn, "Morning", &request("Decimals")).expect("save duplicate name");
        lib.save(&conn, "  Afternoon ", &request("Rhymes")).expect("save");

        let reloaded = PresetLibrary::load(&conn);
        assert_eq!(reloaded.list(), lib.list());
        assert_eq!(reloaded.list()[2].name, "Afternoon");
    }

    #[test]
    fn corrupt_storage_loads_as_empty() {
        let store = MemoryStore::with_value(PRESETS_KEY, "{not json");
        let lib = PresetLibrary::load(&store);
        assert!(lib.list().is_empty());
    }

    #[test]
    fn failed_write_leaves_library_unchanged() {
        let store = MemoryStore::failing();
        let mut lib = PresetLibrary::default();
        assert!(matches!(
            lib.save(&store, "x", &request("x")),
            Err(PresetError::Persist(_))
        ));
        assert!(lib.list().is_empty());
    }

    #[test]
    fn reads_snapshots_with_string_week_and_day() {
        let raw = r#"[{"name":"Legacy","data":{"gradeLevel":"Grade 3","subject":"Filipino","topic":"Pang-uri","quarter":"3rd Quarter","week":"4","day":"2","duration":"1 Hour","instructionalModel":"4As Model","assessmentConfig":{"itemCount":8,"questionTypes":["Essay"]},"additionalContext":""}}]"#;
        let store = MemoryStore::with_value(PRESETS_KEY, raw);
        let lib = PresetLibrary::load(&store);
        let preset = lib.get(0).expect("preset");
        assert_eq!(preset.data.week, 4);
        assert_eq!(preset.data.instructional_model, InstructionalModel::FourAs);
    }

    #[test]
    fn builtin_templates_are_submittable() {
        for t in builtin_templates() {
            assert!(!t.data.topic.trim().is_empty());
            assert!(!t.data.assessment_config.question_types.is_empty());
        }
    }
}
