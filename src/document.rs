//! Presentation-neutral layout of a lesson plan.
//!
//! Every output surface (HTML preview, print page, clipboard text, DOCX)
//! walks the same [`LessonDocument`], so section order, labels and
//! placeholders cannot drift between them.

use crate::assessment::AssessmentOutline;
use crate::plan::{Plan, Procedure};
use serde::Serialize;

pub const MISSING_CONTENT: &str = "Content missing";
pub const SUBTITLE: &str = "Official DepEd MATATAG Curriculum Alignment";
pub const CREATIVE_CAPTION: &str = "Integration Idea by Jade N. Bucatcat";
pub const DISCLAIMER: &str = "DISCLAIMER: This lesson plan is generated by AI (MATATAG AI Intelligence) and is intended for professional review. It must be checked and validated by the educator for curriculum alignment and accuracy before implementation.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TextStyle {
    Plain,
    Emphasis,
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Block {
    Paragraph {
        text: String,
        style: TextStyle,
    },
    /// `label` is printed bold ahead of the body, e.g. "a. Explicitation".
    Field {
        label: String,
        text: String,
        style: TextStyle,
    },
    BulletList {
        caption: Option<String>,
        items: Vec<String>,
    },
    NumberedList {
        caption: Option<String>,
        items: Vec<String>,
    },
    /// Whitespace and line breaks are significant.
    Preformatted {
        text: String,
    },
    Quote {
        caption: String,
        text: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subsection {
    pub label: Option<String>,
    pub title: String,
    pub subtitle: Option<String>,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Shade {
    Dark,
    Highlight,
}

impl Shade {
    pub fn hex(self) -> &'static str {
        match self {
            Self::Dark => "000000",
            Self::Highlight => "1e3a8a",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub index: &'static str,
    pub title: String,
    pub shade: Shade,
    pub subsections: Vec<Subsection>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetaField {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signature {
    pub caption: &'static str,
    pub role: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonDocument {
    pub title: String,
    pub subtitle: &'static str,
    pub topic: String,
    /// Grade Level, Quarter, Week, Day, then Lesson Duration and Instructional Model.
    pub metadata: Vec<MetaField>,
    pub sections: Vec<Section>,
    pub signatures: Vec<Signature>,
    pub disclaimer: &'static str,
    pub assessment: AssessmentOutline,
    pub warnings: Vec<String>,
}

fn step(text: &Option<String>) -> (String, TextStyle) {
    match text.as_deref().map(str::trim) {
        Some(t) if !t.is_empty() => (t.to_string(), TextStyle::Plain),
        _ => (MISSING_CONTENT.to_string(), TextStyle::Placeholder),
    }
}

fn step_paragraph(text: &Option<String>) -> Block {
    let (text, style) = step(text);
    Block::Paragraph { text, style }
}

fn step_field(label: &str, text: &Option<String>) -> Block {
    let (text, style) = step(text);
    Block::Field {
        label: label.to_string(),
        text,
        style,
    }
}

fn paragraph(text: &str, style: TextStyle) -> Block {
    Block::Paragraph {
        text: text.to_string(),
        style,
    }
}

fn sub(label: &str, title: &str, blocks: Vec<Block>) -> Subsection {
    Subsection {
        label: Some(label.to_string()),
        title: title.to_string(),
        subtitle: None,
        blocks,
    }
}

fn lettered_steps(steps: &[(&str, &Option<String>)]) -> Vec<Subsection> {
    steps
        .iter()
        .zip('a'..)
        .map(|((title, body), letter)| sub(&letter.to_string(), title, vec![step_paragraph(body)]))
        .collect()
}

fn procedure_subsections(procedure: &Procedure) -> Vec<Subsection> {
    match procedure {
        Procedure::Standard(p) => {
            let vocabulary = if p.establishing_purpose.vocabulary.is_empty() {
                None
            } else {
                Some(p.establishing_purpose.vocabulary.join(", "))
            };
            vec![
                sub(
                    "A",
                    "Activating Prior Knowledge",
                    vec![step_paragraph(&p.activating_prior_knowledge)],
                ),
                sub(
                    "B",
                    "Establishing Lesson Purpose",
                    vec![
                        step_field("a. Lesson Purpose", &p.establishing_purpose.lesson_purpose),
                        step_field("b. Unlocking Content Vocabulary", &vocabulary),
                    ],
                ),
                sub(
                    "C",
                    "Developing and Deepening Understanding",
                    vec![
                        step_field("a. Explicitation", &p.developing_deepening.explicitation),
                        step_field("b. Worked Example", &p.developing_deepening.worked_example),
                        step_field("c. Lesson Activity", &p.developing_deepening.lesson_activity),
                    ],
                ),
                sub(
                    "D",
                    "Making Generalization",
                    vec![
                        step_field("a. Learners' Takeaways", &p.making_generalization.takeaways),
                        step_field(
                            "b. Reflection on Learning",
                            &p.making_generalization.reflection_on_learning,
                        ),
                    ],
                ),
            ]
        }
        Procedure::FiveE(p) => lettered_steps(&[
            ("Engage", &p.engage),
            ("Explore", &p.explore),
            ("Explain", &p.explain),
            ("Elaborate", &p.elaborate),
            ("Evaluate", &p.evaluate),
        ]),
        Procedure::FourAs(p) => lettered_steps(&[
            ("Activity", &p.activity),
            ("Analysis", &p.analysis),
            ("Abstraction", &p.abstraction),
            ("Application", &p.application),
        ]),
    }
}

impl LessonDocument {
    pub fn from_plan(plan: &Plan) -> Self {
        let cc = &plan.curriculum;
        let curriculum = Section {
            index: "I",
            title: "Curriculum Content, Standards, and Lesson Competencies".to_string(),
            shade: Shade::Dark,
            subsections: vec![
                sub(
                    "A",
                    "Content Standard",
                    vec![paragraph(&cc.content_standards, TextStyle::Emphasis)],
                ),
                sub(
                    "B",
                    "Performance Standards",
                    vec![paragraph(&cc.performance_standards, TextStyle::Emphasis)],
                ),
                sub(
                    "C",
                    "Learning Competencies and Objectives",
                    vec![
                        Block::BulletList {
                            caption: Some("Target Learning Competencies".to_string()),
                            items: cc.learning_competencies.clone(),
                        },
                        Block::NumberedList {
                            caption: Some("Specific Learning Objectives".to_string()),
                            items: cc.learning_objectives.clone(),
                        },
                    ],
                ),
                sub("D", "Content", vec![paragraph(&cc.content_details, TextStyle::Plain)]),
                sub(
                    "E",
                    "Integration",
                    vec![paragraph(&cc.integration, TextStyle::Emphasis)],
                ),
            ],
        };

        let resources = Section {
            index: "II",
            title: "Learning Resources".to_string(),
            shade: Shade::Dark,
            subsections: vec![
                Subsection {
                    label: None,
                    title: "References".to_string(),
                    subtitle: None,
                    blocks: vec![Block::NumberedList {
                        caption: None,
                        items: plan.resources.references.clone(),
                    }],
                },
                Subsection {
                    label: None,
                    title: "Materials".to_string(),
                    subtitle: None,
                    blocks: vec![Block::BulletList {
                        caption: None,
                        items: plan.resources.materials.clone(),
                    }],
                },
            ],
        };

        let procedure = Section {
            index: "III",
            title: "Teaching and Learning Procedure".to_string(),
            shade: Shade::Dark,
            subsections: procedure_subsections(&plan.procedure),
        };

        let reflection = &plan.evaluation.teacher_reflection;
        let evaluation = Section {
            index: "IV",
            title: "Evaluating Learning: Formative Assessment and Teacher's Reflection"
                .to_string(),
            shade: Shade::Dark,
            subsections: vec![
                Subsection {
                    label: Some("A".to_string()),
                    title: "Evaluating Learning".to_string(),
                    subtitle: Some(format!(
                        "Official Quiz Format \u{2022} {} Items",
                        plan.assessment_config.item_count
                    )),
                    blocks: vec![Block::Preformatted {
                        text: plan.evaluation.assessment.clone(),
                    }],
                },
                sub(
                    "B",
                    "Teacher's Reflection",
                    [
                        ("Learner Stats", &reflection.learner_stats),
                        ("Strategies", &reflection.strategies),
                        ("Difficulties", &reflection.difficulties),
                        ("Innovation", &reflection.innovation),
                    ]
                    .into_iter()
                    .map(|(label, text)| Block::Field {
                        label: label.to_string(),
                        text: text.clone(),
                        style: TextStyle::Emphasis,
                    })
                    .collect(),
                ),
            ],
        };

        let spark = Section {
            index: "V",
            title: "Jade's Creative Spark".to_string(),
            shade: Shade::Highlight,
            subsections: vec![Subsection {
                label: None,
                title: String::new(),
                subtitle: None,
                blocks: vec![Block::Quote {
                    caption: CREATIVE_CAPTION.to_string(),
                    text: plan.creative_idea.clone(),
                }],
            }],
        };

        let assessment = AssessmentOutline::inspect(&plan.evaluation.assessment);
        let warnings = assessment.warnings(&plan.topic, plan.assessment_config.item_count);

        Self {
            title: format!("DETAILED LESSON PLAN IN {}", plan.subject.to_uppercase()),
            subtitle: SUBTITLE,
            topic: plan.topic.clone(),
            metadata: vec![
                MetaField { label: "Grade Level", value: plan.grade_level.clone() },
                MetaField { label: "Quarter", value: plan.quarter.clone() },
                MetaField { label: "Week", value: plan.week.clone() },
                MetaField { label: "Day", value: plan.day.clone() },
                MetaField { label: "Lesson Duration", value: plan.duration.clone() },
                MetaField {
                    label: "Instructional Model",
                    value: plan.instructional_model().as_str().to_string(),
                },
            ],
            sections: vec![curriculum, resources, procedure, evaluation, spark],
            signatures: vec![
                Signature { caption: "Prepared by:", role: "Teacher" },
                Signature { caption: "Checked by:", role: "Master Teacher / Dept. Head" },
                Signature { caption: "Approved by:", role: "Principal" },
            ],
            disclaimer: DISCLAIMER,
            assessment,
            warnings,
        }
    }

    pub fn section(&self, index: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.index == index)
    }
}
