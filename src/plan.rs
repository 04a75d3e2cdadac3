use serde::{Deserialize, Deserializer, Serialize};
use std::ops::RangeInclusive;

pub const WEEK_RANGE: RangeInclusive<u8> = 1..=10;
pub const DAY_RANGE: RangeInclusive<u8> = 1..=5;
pub const ITEM_COUNT_RANGE: RangeInclusive<u32> = 1..=20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GradeLevel {
    #[serde(rename = "Kindergarten")]
    Kindergarten,
    #[serde(rename = "Grade 1")]
    Grade1,
    #[serde(rename = "Grade 2")]
    Grade2,
    #[serde(rename = "Grade 3")]
    Grade3,
    #[serde(rename = "Grade 4")]
    Grade4,
    #[serde(rename = "Grade 5")]
    Grade5,
    #[serde(rename = "Grade 6")]
    Grade6,
    #[serde(rename = "Grade 7")]
    Grade7,
    #[serde(rename = "Grade 8")]
    Grade8,
    #[serde(rename = "Grade 9")]
    Grade9,
    #[serde(rename = "Grade 10")]
    Grade10,
}

impl GradeLevel {
    pub const ALL: [GradeLevel; 11] = [
        Self::Kindergarten,
        Self::Grade1,
        Self::Grade2,
        Self::Grade3,
        Self::Grade4,
        Self::Grade5,
        Self::Grade6,
        Self::Grade7,
        Self::Grade8,
        Self::Grade9,
        Self::Grade10,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Kindergarten => "Kindergarten",
            Self::Grade1 => "Grade 1",
            Self::Grade2 => "Grade 2",
            Self::Grade3 => "Grade 3",
            Self::Grade4 => "Grade 4",
            Self::Grade5 => "Grade 5",
            Self::Grade6 => "Grade 6",
            Self::Grade7 => "Grade 7",
            Self::Grade8 => "Grade 8",
            Self::Grade9 => "Grade 9",
            Self::Grade10 => "Grade 10",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.as_str() == s.trim())
    }
}

/// The ten fixed learning areas offered by the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Subject {
    #[serde(rename = "English")]
    English,
    #[serde(rename = "Mathematics")]
    Mathematics,
    #[serde(rename = "Science")]
    Science,
    #[serde(rename = "Filipino")]
    Filipino,
    #[serde(rename = "Araling Panlipunan")]
    AralingPanlipunan,
    #[serde(rename = "Edukasyon sa Pagpapakatao (EsP)")]
    EsP,
    #[serde(rename = "MAPEH (Music, Arts, PE, Health)")]
    Mapeh,
    #[serde(rename = "EPP / TLE")]
    EppTle,
    #[serde(rename = "Makabansa")]
    Makabansa,
    #[serde(rename = "Reading and Literacy")]
    ReadingAndLiteracy,
}

impl Subject {
    pub const ALL: [Subject; 10] = [
        Self::English,
        Self::Mathematics,
        Self::Science,
        Self::Filipino,
        Self::AralingPanlipunan,
        Self::EsP,
        Self::Mapeh,
        Self::EppTle,
        Self::Makabansa,
        Self::ReadingAndLiteracy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Mathematics => "Mathematics",
            Self::Science => "Science",
            Self::Filipino => "Filipino",
            Self::AralingPanlipunan => "Araling Panlipunan",
            Self::EsP => "Edukasyon sa Pagpapakatao (EsP)",
            Self::Mapeh => "MAPEH (Music, Arts, PE, Health)",
            Self::EppTle => "EPP / TLE",
            Self::Makabansa => "Makabansa",
            Self::ReadingAndLiteracy => "Reading and Literacy",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.as_str() == s.trim())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quarter {
    #[serde(rename = "1st Quarter")]
    First,
    #[serde(rename = "2nd Quarter")]
    Second,
    #[serde(rename = "3rd Quarter")]
    Third,
    #[serde(rename = "4th Quarter")]
    Fourth,
}

impl Quarter {
    pub const ALL: [Quarter; 4] = [Self::First, Self::Second, Self::Third, Self::Fourth];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::First => "1st Quarter",
            Self::Second => "2nd Quarter",
            Self::Third => "3rd Quarter",
            Self::Fourth => "4th Quarter",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.as_str() == s.trim())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LessonDuration {
    #[serde(rename = "45 Minutes")]
    FortyFiveMinutes,
    #[serde(rename = "1 Hour")]
    OneHour,
}

impl LessonDuration {
    pub const ALL: [LessonDuration; 2] = [Self::FortyFiveMinutes, Self::OneHour];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::FortyFiveMinutes => "45 Minutes",
            Self::OneHour => "1 Hour",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.as_str() == s.trim())
    }
}

/// Selects which procedure layout the plan carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstructionalModel {
    #[serde(rename = "MATATAG Standard")]
    Standard,
    #[serde(rename = "5E Model")]
    FiveE,
    #[serde(rename = "4As Model")]
    FourAs,
}

impl InstructionalModel {
    pub const ALL: [InstructionalModel; 3] = [Self::Standard, Self::FiveE, Self::FourAs];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "MATATAG Standard",
            Self::FiveE => "5E Model",
            Self::FourAs => "4As Model",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.as_str() == s.trim())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionType {
    #[serde(rename = "Multiple Choice")]
    MultipleChoice,
    #[serde(rename = "Short Answer")]
    ShortAnswer,
    #[serde(rename = "Essay")]
    Essay,
}

impl QuestionType {
    pub const ALL: [QuestionType; 3] = [Self::MultipleChoice, Self::ShortAnswer, Self::Essay];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::MultipleChoice => "Multiple Choice",
            Self::ShortAnswer => "Short Answer",
            Self::Essay => "Essay",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.as_str() == s.trim())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentConfig {
    pub item_count: u32,
    pub question_types: Vec<QuestionType>,
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            item_count: 5,
            question_types: vec![QuestionType::MultipleChoice],
        }
    }
}

/// Everything the form collects before a plan is requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub grade_level: GradeLevel,
    pub subject: Subject,
    #[serde(default)]
    pub topic: String,
    pub quarter: Quarter,
    #[serde(deserialize_with = "de_small_int")]
    pub week: u8,
    #[serde(deserialize_with = "de_small_int")]
    pub day: u8,
    pub duration: LessonDuration,
    pub instructional_model: InstructionalModel,
    pub assessment_config: AssessmentConfig,
    #[serde(default)]
    pub additional_context: String,
}

impl Default for GenerationRequest {
    fn default() -> Self {
        Self {
            grade_level: GradeLevel::Grade1,
            subject: Subject::English,
            topic: String::new(),
            quarter: Quarter::First,
            week: 1,
            day: 1,
            duration: LessonDuration::FortyFiveMinutes,
            instructional_model: InstructionalModel::Standard,
            assessment_config: AssessmentConfig::default(),
            additional_context: String::new(),
        }
    }
}

// Older snapshots stored week/day as strings.
fn de_small_int<'de, D: Deserializer<'de>>(d: D) -> Result<u8, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u64),
        Text(String),
    }
    match Raw::deserialize(d)? {
        Raw::Num(n) => u8::try_from(n).map_err(serde::de::Error::custom),
        Raw::Text(s) => s.trim().parse::<u8>().map_err(serde::de::Error::custom),
    }
}

fn de_lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Num(serde_json::Number),
        Null,
    }
    Ok(match Raw::deserialize(d)? {
        Raw::Text(s) => s,
        Raw::Num(n) => n.to_string(),
        Raw::Null => String::new(),
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CurriculumContent {
    pub content_standards: String,
    pub performance_standards: String,
    pub learning_competencies: Vec<String>,
    pub learning_objectives: Vec<String>,
    pub content_details: String,
    pub integration: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningResources {
    pub references: Vec<String>,
    pub materials: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EstablishingPurpose {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lesson_purpose: Option<String>,
    pub vocabulary: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DevelopingDeepening {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explicitation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worked_example: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lesson_activity: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MakingGeneralization {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub takeaways: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reflection_on_learning: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StandardProcedure {
    pub activating_prior_knowledge: Option<String>,
    pub establishing_purpose: EstablishingPurpose,
    pub developing_deepening: DevelopingDeepening,
    pub making_generalization: MakingGeneralization,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FiveEProcedure {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explore: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elaborate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluate: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FourAsProcedure {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abstraction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application: Option<String>,
}

/// Teaching and learning procedure; exactly one layout per plan.
#[derive(Debug, Clone, PartialEq)]
pub enum Procedure {
    Standard(StandardProcedure),
    FiveE(FiveEProcedure),
    FourAs(FourAsProcedure),
}

impl Procedure {
    pub fn model(&self) -> InstructionalModel {
        match self {
            Self::Standard(_) => InstructionalModel::Standard,
            Self::FiveE(_) => InstructionalModel::FiveE,
            Self::FourAs(_) => InstructionalModel::FourAs,
        }
    }

    /// Picks the variant named by `model`; fields of the other layouts are dropped.
    pub fn from_wire(model: InstructionalModel, wire: WireProcedures) -> Self {
        match model {
            InstructionalModel::Standard => Self::Standard(StandardProcedure {
                activating_prior_knowledge: wire.activating_prior_knowledge,
                establishing_purpose: wire.establishing_purpose.unwrap_or_default(),
                developing_deepening: wire.developing_deepening.unwrap_or_default(),
                making_generalization: wire.making_generalization.unwrap_or_default(),
            }),
            InstructionalModel::FiveE => Self::FiveE(wire.five_e.unwrap_or_default()),
            InstructionalModel::FourAs => Self::FourAs(wire.four_as.unwrap_or_default()),
        }
    }

    pub fn to_wire(&self) -> WireProcedures {
        match self {
            Self::Standard(p) => WireProcedures {
                activating_prior_knowledge: p.activating_prior_knowledge.clone(),
                establishing_purpose: Some(p.establishing_purpose.clone()),
                developing_deepening: Some(p.developing_deepening.clone()),
                making_generalization: Some(p.making_generalization.clone()),
                ..WireProcedures::default()
            },
            Self::FiveE(p) => WireProcedures {
                five_e: Some(p.clone()),
                ..WireProcedures::default()
            },
            Self::FourAs(p) => WireProcedures {
                four_as: Some(p.clone()),
                ..WireProcedures::default()
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TeacherReflection {
    pub learner_stats: String,
    pub strategies: String,
    pub difficulties: String,
    pub innovation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EvaluatingLearning {
    /// Quiz text exactly as generated; layout conventions are not enforced.
    pub assessment: String,
    pub teacher_reflection: TeacherReflection,
}

/// A generated lesson plan with the procedure already narrowed to one layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub grade_level: String,
    pub subject: String,
    pub quarter: String,
    pub week: String,
    pub day: String,
    pub topic: String,
    pub duration: String,
    pub assessment_config: AssessmentConfig,
    pub curriculum: CurriculumContent,
    pub resources: LearningResources,
    pub procedure: Procedure,
    pub evaluation: EvaluatingLearning,
    pub creative_idea: String,
}

impl Plan {
    pub fn instructional_model(&self) -> InstructionalModel {
        self.procedure.model()
    }

    /// Builds a plan from the service payload. Echo fields the payload leaves
    /// blank are filled from the request that produced it.
    pub fn from_wire(wire: WirePlan, request: &GenerationRequest) -> Self {
        let model = InstructionalModel::parse(&wire.instructional_model)
            .unwrap_or(request.instructional_model);

        let assessment_config = match wire.assessment_config {
            Some(raw) => {
                let question_types: Vec<QuestionType> = raw
                    .question_types
                    .iter()
                    .filter_map(|s| QuestionType::parse(s))
                    .collect();
                AssessmentConfig {
                    item_count: raw
                        .item_count
                        .filter(|n| *n > 0)
                        .unwrap_or(request.assessment_config.item_count),
                    question_types: if question_types.is_empty() {
                        request.assessment_config.question_types.clone()
                    } else {
                        question_types
                    },
                }
            }
            None => request.assessment_config.clone(),
        };

        Self {
            grade_level: or_echo(wire.grade_level, request.grade_level.as_str()),
            subject: or_echo(wire.subject, request.subject.as_str()),
            quarter: or_echo(wire.quarter, request.quarter.as_str()),
            week: or_echo(wire.week, &request.week.to_string()),
            day: or_echo(wire.day, &request.day.to_string()),
            topic: or_echo(wire.topic, &request.topic),
            duration: or_echo(wire.duration, request.duration.as_str()),
            assessment_config,
            curriculum: wire.curriculum_content,
            resources: wire.learning_resources,
            procedure: Procedure::from_wire(model, wire.procedures),
            evaluation: wire.evaluating_learning,
            creative_idea: wire.jade_creative_idea,
        }
    }

    pub fn to_wire(&self) -> WirePlan {
        WirePlan {
            grade_level: self.grade_level.clone(),
            subject: self.subject.clone(),
            quarter: self.quarter.clone(),
            week: self.week.clone(),
            day: self.day.clone(),
            topic: self.topic.clone(),
            duration: self.duration.clone(),
            instructional_model: self.instructional_model().as_str().to_string(),
            assessment_config: Some(WireAssessmentConfig {
                item_count: Some(self.assessment_config.item_count),
                question_types: self
                    .assessment_config
                    .question_types
                    .iter()
                    .map(|q| q.as_str().to_string())
                    .collect(),
            }),
            curriculum_content: self.curriculum.clone(),
            learning_resources: self.resources.clone(),
            procedures: self.procedure.to_wire(),
            evaluating_learning: self.evaluation.clone(),
            jade_creative_idea: self.creative_idea.clone(),
        }
    }
}

fn or_echo(value: String, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WireAssessmentConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_count: Option<u32>,
    pub question_types: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WireProcedures {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activating_prior_knowledge: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub establishing_purpose: Option<EstablishingPurpose>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub developing_deepening: Option<DevelopingDeepening>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub making_generalization: Option<MakingGeneralization>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub five_e: Option<FiveEProcedure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub four_as: Option<FourAsProcedure>,
}

/// JSON shape exchanged with the generation service and the front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePlan {
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub grade_level: String,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub subject: String,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub quarter: String,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub week: String,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub day: String,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub topic: String,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub duration: String,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub instructional_model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessment_config: Option<WireAssessmentConfig>,
    pub curriculum_content: CurriculumContent,
    pub learning_resources: LearningResources,
    #[serde(default)]
    pub procedures: WireProcedures,
    pub evaluating_learning: EvaluatingLearning,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub jade_creative_idea: String,
}
