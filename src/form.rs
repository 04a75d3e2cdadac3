use crate::plan::{
    GenerationRequest, GradeLevel, InstructionalModel, LessonDuration, QuestionType, Quarter,
    Subject, DAY_RANGE, ITEM_COUNT_RANGE, WEEK_RANGE,
};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormError {
    #[error("unknown form field: {0}")]
    UnknownField(String),
    #[error("{field} must be one of: {allowed}")]
    InvalidChoice { field: &'static str, allowed: String },
    #[error("{0} must be a string")]
    NotText(&'static str),
    #[error("{0} must be a whole number")]
    NotNumber(&'static str),
    #[error("topic is required")]
    MissingTopic,
    #[error("{field} must be in {min}..={max}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
    },
    #[error("at least one question type is required")]
    NoQuestionTypes,
}

/// Holds the request being edited until it is submitted.
#[derive(Debug, Clone, Default)]
pub struct FormController {
    current: GenerationRequest,
}

impl FormController {
    pub fn current(&self) -> &GenerationRequest {
        &self.current
    }

    pub fn reset(&mut self) {
        self.current = GenerationRequest::default();
    }

    /// Full replace, used when a preset is applied.
    pub fn apply(&mut self, data: GenerationRequest) {
        self.current = data;
    }

    pub fn update(&mut self, field: &str, value: &Value) -> Result<(), FormError> {
        match field {
            "gradeLevel" => {
                let s = text(value, "gradeLevel")?;
                self.current.grade_level = GradeLevel::parse(&s).ok_or_else(|| {
                    invalid_choice("gradeLevel", GradeLevel::ALL.iter().map(|v| v.as_str()))
                })?;
            }
            "subject" => {
                let s = text(value, "subject")?;
                self.current.subject = Subject::parse(&s).ok_or_else(|| {
                    invalid_choice("subject", Subject::ALL.iter().map(|v| v.as_str()))
                })?;
            }
            "quarter" => {
                let s = text(value, "quarter")?;
                self.current.quarter = Quarter::parse(&s).ok_or_else(|| {
                    invalid_choice("quarter", Quarter::ALL.iter().map(|v| v.as_str()))
                })?;
            }
            "duration" => {
                let s = text(value, "duration")?;
                self.current.duration = LessonDuration::parse(&s).ok_or_else(|| {
                    invalid_choice("duration", LessonDuration::ALL.iter().map(|v| v.as_str()))
                })?;
            }
            "instructionalModel" => {
                let s = text(value, "instructionalModel")?;
                self.current.instructional_model =
                    InstructionalModel::parse(&s).ok_or_else(|| {
                        invalid_choice(
                            "instructionalModel",
                            InstructionalModel::ALL.iter().map(|v| v.as_str()),
                        )
                    })?;
            }
            "topic" => self.current.topic = text(value, "topic")?,
            "additionalContext" => self.current.additional_context = text(value, "additionalContext")?,
            "week" => self.current.week = small_int(value, "week")?,
            "day" => self.current.day = small_int(value, "day")?,
            "itemCount" => self.current.assessment_config.item_count = lenient_count(value),
            other => return Err(FormError::UnknownField(other.to_string())),
        }
        Ok(())
    }

    /// Adds or removes `qt`. Returns false when removal would leave no types selected.
    pub fn toggle_question_type(&mut self, qt: QuestionType) -> bool {
        let types = &mut self.current.assessment_config.question_types;
        if let Some(pos) = types.iter().position(|t| *t == qt) {
            if types.len() == 1 {
                return false;
            }
            types.remove(pos);
        } else {
            types.push(qt);
        }
        true
    }

    /// Checks the input constraints and hands out an independent copy.
    pub fn submit(&self) -> Result<GenerationRequest, FormError> {
        let req = &self.current;
        if req.topic.trim().is_empty() {
            return Err(FormError::MissingTopic);
        }
        if !WEEK_RANGE.contains(&req.week) {
            return Err(out_of_range("week", *WEEK_RANGE.start() as i64, *WEEK_RANGE.end() as i64));
        }
        if !DAY_RANGE.contains(&req.day) {
            return Err(out_of_range("day", *DAY_RANGE.start() as i64, *DAY_RANGE.end() as i64));
        }
        if !ITEM_COUNT_RANGE.contains(&req.assessment_config.item_count) {
            return Err(out_of_range(
                "itemCount",
                *ITEM_COUNT_RANGE.start() as i64,
                *ITEM_COUNT_RANGE.end() as i64,
            ));
        }
        if req.assessment_config.question_types.is_empty() {
            return Err(FormError::NoQuestionTypes);
        }
        Ok(req.clone())
    }
}

fn out_of_range(field: &'static str, min: i64, max: i64) -> FormError {
    FormError::OutOfRange { field, min, max }
}

fn invalid_choice<'a>(field: &'static str, allowed: impl Iterator<Item = &'a str>) -> FormError {
    FormError::InvalidChoice {
        field,
        allowed: allowed.collect::<Vec<_>>().join(", "),
    }
}

fn text(value: &Value, field: &'static str) -> Result<String, FormError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Null => Ok(String::new()),
        _ => Err(FormError::NotText(field)),
    }
}

fn small_int(value: &Value, field: &'static str) -> Result<u8, FormError> {
    let n = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    n.and_then(|n| u8::try_from(n).ok())
        .ok_or(FormError::NotNumber(field))
}

// Number inputs report raw text; anything that is not a leading positive integer becomes 0.
fn lenient_count(value: &Value) -> u32 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .filter(|n| *n > 0)
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0),
        Value::String(s) => {
            let digits: String = s.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
            digits.parse::<u32>().unwrap_or(0)
        }
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn last_question_type_cannot_be_toggled_off() {
        let mut form = FormController::default();
        assert_eq!(
            form.current().assessment_config.question_types,
            vec![QuestionType::MultipleChoice]
        );
        assert!(!form.toggle_question_type(QuestionType::MultipleChoice));
        assert_eq!(
            form.current().assessment_config.question_types,
            vec![QuestionType::MultipleChoice]
        );

        for qt in QuestionType::ALL {
            let mut form = FormController::default();
            form.toggle_question_type(QuestionType::ShortAnswer);
            form.toggle_question_type(QuestionType::Essay);
            // Drain everything we can; one type always survives.
            for _ in 0..3 {
                form.toggle_question_type(qt);
                for other in QuestionType::ALL {
                    if other != qt {
                        form.toggle_question_type(other);
                    }
                }
            }
            assert!(!form.current().assessment_config.question_types.is_empty());
        }
    }

    #[test]
    fn toggle_appends_in_selection_order() {
        let mut form = FormController::default();
        assert!(form.toggle_question_type(QuestionType::Essay));
        assert!(form.toggle_question_type(QuestionType::ShortAnswer));
        assert!(form.toggle_question_type(QuestionType::MultipleChoice));
        assert_eq!(
            form.current().assessment_config.question_types,
            vec![QuestionType::Essay, QuestionType::ShortAnswer]
        );
    }

    #[test]
    fn item_count_parses_like_a_number_input() {
        let mut form = FormController::default();
        form.update("itemCount", &json!("12")).expect("update");
        assert_eq!(form.current().assessment_config.item_count, 12);
        form.update("itemCount", &json!("abc")).expect("update");
        assert_eq!(form.current().assessment_config.item_count, 0);
        form.update("itemCount", &json!(7)).expect("update");
        assert_eq!(form.current().assessment_config.item_count, 7);
        form.update("itemCount", &json!("15 items")).expect("update");
        assert_eq!(form.current().assessment_config.item_count, 15);
    }

    #[test]
    fn enum_fields_reject_unknown_choices() {
        let mut form = FormController::default();
        form.update("gradeLevel", &json!("Grade 7")).expect("grade");
        form.update("instructionalModel", &json!("4As Model")).expect("model");
        assert_eq!(form.current().grade_level, GradeLevel::Grade7);
        assert_eq!(form.current().instructional_model, InstructionalModel::FourAs);

        let e = form.update("subject", &json!("Astrology")).unwrap_err();
        assert!(matches!(e, FormError::InvalidChoice { field: "subject", .. }));
        assert_eq!(form.current().subject, Subject::English);
        assert!(matches!(
            form.update("colour", &json!("red")),
            Err(FormError::UnknownField(_))
        ));
    }

    #[test]
    fn submit_enforces_input_constraints() {
        let mut form = FormController::default();
        assert_eq!(form.submit(), Err(FormError::MissingTopic));
        form.update("topic", &json!("   ")).expect("topic");
        assert_eq!(form.submit(), Err(FormError::MissingTopic));
        form.update("topic", &json!("Fractions")).expect("topic");
        form.update("week", &json!("11")).expect("week");
        assert!(matches!(
            form.submit(),
            Err(FormError::OutOfRange { field: "week", .. })
        ));
        form.update("week", &json!(10)).expect("week");
        form.update("itemCount", &json!("0")).expect("count");
        assert!(matches!(
            form.submit(),
            Err(FormError::OutOfRange { field: "itemCount", .. })
        ));
        form.update("itemCount", &json!("20")).expect("count");
        let submitted = form.submit().expect("valid");
        assert_eq!(submitted.topic, "Fractions");
    }

    #[test]
    fn submitted_copy_is_independent_of_later_edits() {
        let mut form = FormController::default();
        form.update("topic", &json!("Plants")).expect("topic");
        let submitted = form.submit().expect("valid");
        form.update("topic", &json!("Animals")).expect("topic");
        assert_eq!(submitted.topic, "Plants");
    }

    #[test]
    fn apply_replaces_every_field() {
        let mut form = FormController::default();
        form.update("topic", &json!("Old")).expect("topic");
        form.update("additionalContext", &json!("keep me?")).expect("ctx");
        let preset = GenerationRequest {
            topic: "New".to_string(),
            ..GenerationRequest::default()
        };
        form.apply(preset.clone());
        assert_eq!(form.current(), &preset);
        assert_eq!(form.current().additional_context, "");
    }
}
