use serde_json::{json, Value};

fn string() -> Value {
    json!({ "type": "STRING" })
}

fn strings() -> Value {
    json!({ "type": "ARRAY", "items": { "type": "STRING" } })
}

fn object_of(fields: &[&str]) -> Value {
    let props: serde_json::Map<String, Value> =
        fields.iter().map(|f| (f.to_string(), string())).collect();
    json!({ "type": "OBJECT", "properties": props })
}

/// Structured-output schema handed to the model with every request.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "gradeLevel": string(),
            "subject": string(),
            "quarter": string(),
            "week": string(),
            "day": string(),
            "topic": string(),
            "duration": string(),
            "instructionalModel": string(),
            "assessmentConfig": {
                "type": "OBJECT",
                "properties": {
                    "itemCount": { "type": "INTEGER" },
                    "questionTypes": strings()
                }
            },
            "curriculumContent": {
                "type": "OBJECT",
                "properties": {
                    "contentStandards": string(),
                    "performanceStandards": string(),
                    "learningCompetencies": strings(),
                    "learningObjectives": strings(),
                    "contentDetails": string(),
                    "integration": string()
                },
                "required": [
                    "contentStandards", "performanceStandards", "learningCompetencies",
                    "learningObjectives", "contentDetails", "integration"
                ]
            },
            "learningResources": {
                "type": "OBJECT",
                "properties": { "references": strings(), "materials": strings() },
                "required": ["references", "materials"]
            },
            "procedures": {
                "type": "OBJECT",
                "properties": {
                    "activatingPriorKnowledge": string(),
                    "establishingPurpose": {
                        "type": "OBJECT",
                        "properties": { "lessonPurpose": string(), "vocabulary": strings() }
                    },
                    "developingDeepening": object_of(&["explicitation", "workedExample", "lessonActivity"]),
                    "makingGeneralization": object_of(&["takeaways", "reflectionOnLearning"]),
                    "fiveE": object_of(&["engage", "explore", "explain", "elaborate", "evaluate"]),
                    "fourAs": object_of(&["activity", "analysis", "abstraction", "application"])
                }
            },
            "evaluatingLearning": {
                "type": "OBJECT",
                "properties": {
                    "assessment": string(),
                    "teacherReflection": {
                        "type": "OBJECT",
                        "properties": {
                            "learnerStats": string(),
                            "strategies": string(),
                            "difficulties": string(),
                            "innovation": string()
                        },
                        "required": ["learnerStats", "strategies", "difficulties", "innovation"]
                    }
                },
                "required": ["assessment", "teacherReflection"]
            },
            "jadeCreativeIdea": string()
        },
        "required": [
            "gradeLevel", "subject", "topic", "duration", "instructionalModel",
            "curriculumContent", "learningResources", "procedures",
            "evaluatingLearning", "jadeCreativeIdea"
        ]
    })
}
