//! Lesson plan generation: prompt construction, the response schema sent to
//! the model, and the HTTP client that talks to the Generative Language API.

pub mod gemini;
mod prompt;
mod schema;

pub use gemini::GeminiClient;
pub use prompt::build_prompt;
pub use schema::response_schema;

use crate::plan::{GenerationRequest, Plan, WirePlan};

/// The only failure text a teacher ever sees, whatever went wrong underneath.
pub const USER_FAILURE_MESSAGE: &str =
    "AI generation failed. Please refine your topic or check your internet connection.";

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("generation service not configured: {0}")]
    NotConfigured(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("No response from AI")]
    EmptyResponse,

    #[error("response is not a valid lesson plan: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Produces a plan for a submitted request. Implementations run on a worker
/// thread, one call per submission.
pub trait LessonGenerator: Send + Sync {
    fn generate(&self, request: &GenerationRequest) -> Result<Plan, GenerationError>;
}

/// Turns the model's text payload into a [`Plan`].
pub fn parse_plan_text(text: &str, request: &GenerationRequest) -> Result<Plan, GenerationError> {
    if text.trim().is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    let wire: WirePlan = serde_json::from_str(text)?;
    Ok(Plan::from_wire(wire, request))
}

/// Answers every request with the same canned payload.
#[cfg(test)]
pub struct CannedGenerator(pub String);

#[cfg(test)]
impl LessonGenerator for CannedGenerator {
    fn generate(&self, request: &GenerationRequest) -> Result<Plan, GenerationError> {
        parse_plan_text(&self.0, request)
    }
}

/// A complete "The Cell" payload in the shape the service returns.
#[cfg(test)]
pub fn cell_payload(model: &str) -> serde_json::Value {
    serde_json::json!({
        "gradeLevel": "Grade 7",
        "subject": "Science",
        "quarter": "2nd Quarter",
        "week": "5",
        "day": "1",
        "topic": "The Cell",
        "duration": "1 Hour",
        "instructionalModel": model,
        "assessmentConfig": { "itemCount": 3, "questionTypes": ["Multiple Choice", "Short Answer"] },
        "curriculumContent": {
            "contentStandards": "The learners demonstrate understanding of the parts of a cell.",
            "performanceStandards": "The learners construct a model of a cell.",
            "learningCompetencies": ["Identify the parts of plant and animal cells"],
            "learningObjectives": ["Name the organelles", "Compare plant and animal cells"],
            "contentDetails": "Cell membrane, nucleus, cytoplasm",
            "integration": "Arts: cell model building"
        },
        "learningResources": {
            "references": ["Science 7 Learner's Material pp. 40-52"],
            "materials": ["Microscope", "Onion skin slides"]
        },
        "procedures": {
            "activatingPriorKnowledge": "Quick review of living vs non-living things.",
            "establishingPurpose": {
                "lessonPurpose": "Why do we need to know what we are made of?",
                "vocabulary": ["organelle", "membrane"]
            },
            "developingDeepening": {
                "explicitation": "Teacher discusses organelles.",
                "workedExample": "Labelled diagram walkthrough.",
                "lessonActivity": "Microscope observation."
            },
            "makingGeneralization": {
                "takeaways": "Cells are the basic unit of life.",
                "reflectionOnLearning": "What surprised you today?"
            },
            "fiveE": {
                "engage": "Show a magnified photo of cork.",
                "explore": "Observe onion cells.",
                "explain": "Discuss cell parts.",
                "elaborate": "Compare with cheek cells.",
                "evaluate": "Exit ticket."
            },
            "fourAs": {
                "activity": "Cell puzzle.",
                "analysis": "What did you notice?",
                "abstraction": "Cell theory.",
                "application": "Build a model."
            }
        },
        "evaluatingLearning": {
            "assessment": "QUIZ: THE CELL\n\n1. What is the control center of the cell?\n   a. Nucleus\n   b. Ribosome\n   c. Vacuole\n   d. Wall\n\n2. Which structure is found only in plant cells?\n   a. Membrane\n   b. Cell wall\n   c. Cytoplasm\n   d. Nucleus\n\n3. Define cytoplasm.\nAnswer: ___________________________________\n\n--- ANSWER KEY ---\n1. a\n2. b\n3. The jelly-like fluid inside the cell",
            "teacherReflection": {
                "learnerStats": "__ of __ learners reached mastery.",
                "strategies": "Hands-on microscopy.",
                "difficulties": "Focusing the microscope.",
                "innovation": "Use phone cameras as magnifiers."
            }
        },
        "jadeCreativeIdea": "Turn the classroom into a giant cell; each group plays an organelle."
    })
}
