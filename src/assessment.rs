use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

pub const ANSWER_KEY_MARKER: &str = "--- ANSWER KEY ---";

fn numbered_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*\d{1,3}[.)]\s+\S").expect("static regex"))
}

/// What could be recognised in a generated quiz. The text itself is never rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentOutline {
    pub title: Option<String>,
    pub has_answer_key: bool,
    /// Numbered lines before the answer key.
    pub question_count: usize,
    pub answer_count: usize,
}

impl AssessmentOutline {
    pub fn inspect(text: &str) -> Self {
        let title = text
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .filter(|l| l.to_ascii_uppercase().starts_with("QUIZ:"))
            .map(str::to_string);

        let (questions, answers) = match text.find(ANSWER_KEY_MARKER) {
            Some(pos) => (&text[..pos], Some(&text[pos + ANSWER_KEY_MARKER.len()..])),
            None => (text, None),
        };
        let count = |s: &str| s.lines().filter(|l| numbered_line().is_match(l)).count();

        Self {
            title,
            has_answer_key: answers.is_some(),
            question_count: count(questions),
            answer_count: answers.map(count).unwrap_or(0),
        }
    }

    /// Human-readable notes on where the quiz departs from the requested layout.
    pub fn warnings(&self, topic: &str, expected_items: u32) -> Vec<String> {
        let mut out = Vec::new();
        let expected_title = format!("QUIZ: {}", topic.to_uppercase());
        match &self.title {
            None => out.push(format!("quiz does not start with \"{expected_title}\"")),
            Some(t) if t.to_uppercase() != expected_title.to_uppercase() => {
                out.push(format!("quiz title is \"{t}\", expected \"{expected_title}\""))
            }
            Some(_) => {}
        }
        if !self.has_answer_key {
            out.push(format!("quiz has no \"{ANSWER_KEY_MARKER}\" section"));
        }
        let expected = expected_items as usize;
        if self.question_count != expected {
            out.push(format!(
                "quiz has {} numbered items, {} were requested",
                self.question_count, expected
            ));
        }
        if self.has_answer_key && self.answer_count != self.question_count {
            out.push(format!(
                "answer key lists {} answers for {} items",
                self.answer_count, self.question_count
            ));
        }
        out
    }
}
