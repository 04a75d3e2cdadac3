#![allow(dead_code)]

use serde_json::json;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

pub fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

/// Starts the sidecar with a scrubbed generation environment plus `env`.
pub fn spawn_sidecar_with_env(env: &[(&str, &str)]) -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_matatagd");
    let mut cmd = Command::new(exe);
    for key in [
        "MATATAG_API_KEY",
        "GEMINI_API_KEY",
        "API_KEY",
        "MATATAG_API_BASE",
        "MATATAG_MODEL",
        "MATATAG_TEMPERATURE",
    ] {
        cmd.env_remove(key);
    }
    cmd.envs(env.iter().copied());
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn matatagd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

pub fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    spawn_sidecar_with_env(&[])
}

/// Sidecar pointed at a mock generation service.
pub fn spawn_sidecar_against(mock_uri: &str) -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let base = format!("{}/v1beta", mock_uri);
    spawn_sidecar_with_env(&[
        ("MATATAG_API_BASE", base.as_str()),
        ("MATATAG_MODEL", "gemini-test"),
        ("MATATAG_API_KEY", "test-key"),
    ])
}

pub fn read_line_json(reader: &mut BufReader<ChildStdout>) -> serde_json::Value {
    let mut line = String::new();
    reader.read_line(&mut line).expect("read line");
    assert!(!line.trim().is_empty(), "sidecar closed stdout");
    serde_json::from_str(line.trim()).expect("parse line json")
}

pub fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let value = read_line_json(reader);
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

pub fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert_eq!(
        value.get("ok").and_then(|v| v.as_bool()),
        Some(true),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or(json!({}))
}

/// Blocks until the next unsolicited event line.
pub fn read_event(reader: &mut BufReader<ChildStdout>) -> serde_json::Value {
    let value = read_line_json(reader);
    assert!(value.get("event").is_some(), "expected event, got {}", value);
    value
}

pub fn select_workspace(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    workspace: &Path,
) {
    let _ = request_ok(
        stdin,
        reader,
        "ws",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
}

/// Concatenated `w:t` text of `word/document.xml`, one line per paragraph.
pub fn docx_text(path: &Path) -> String {
    let file = std::fs::File::open(path).expect("open docx");
    let mut archive = zip::ZipArchive::new(file).expect("zip archive");
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .expect("document part")
        .read_to_string(&mut xml)
        .expect("read document part");

    let mut reader = quick_xml::Reader::from_str(&xml);
    let mut out = String::new();
    let mut in_text = false;
    loop {
        match reader.read_event().expect("xml event") {
            quick_xml::events::Event::Start(e) if e.name().as_ref() == b"w:t" => in_text = true,
            quick_xml::events::Event::End(e) if e.name().as_ref() == b"w:t" => in_text = false,
            quick_xml::events::Event::End(e) if e.name().as_ref() == b"w:p" => out.push('\n'),
            quick_xml::events::Event::Text(t) if in_text => {
                out.push_str(&t.unescape().expect("unescape"));
            }
            quick_xml::events::Event::Eof => break,
            _ => {}
        }
    }
    out
}

/// Generation service body wrapping `plan` as the candidate's text part.
pub fn gemini_body(plan: &serde_json::Value) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": plan.to_string() }] },
            "finishReason": "STOP"
        }]
    })
}

pub fn cell_plan(model: &str) -> serde_json::Value {
    json!({
        "gradeLevel": "Grade 7",
        "subject": "Science",
        "quarter": "2nd Quarter",
        "week": "5",
        "day": "1",
        "topic": "The Cell",
        "duration": "1 Hour",
        "instructionalModel": model,
        "assessmentConfig": { "itemCount": 2, "questionTypes": ["Multiple Choice"] },
        "curriculumContent": {
            "contentStandards": "The learners demonstrate understanding of the parts of a cell.",
            "performanceStandards": "The learners construct a model of a cell.",
            "learningCompetencies": ["Identify the parts of plant and animal cells"],
            "learningObjectives": ["Name the organelles"],
            "contentDetails": "Cell membrane, nucleus, cytoplasm",
            "integration": "Arts: drawing cells"
        },
        "learningResources": {
            "references": ["Science 7 Learner's Material"],
            "materials": ["Microscope"]
        },
        "procedures": {
            "activatingPriorKnowledge": "Recall living things.",
            "establishingPurpose": {
                "lessonPurpose": "Understand what cells are.",
                "vocabulary": ["organelle", "membrane"]
            },
            "developingDeepening": {
                "explicitation": "Lecture on organelles.",
                "workedExample": "Label a diagram.",
                "lessonActivity": "Pairs label cells."
            },
            "makingGeneralization": {
                "takeaways": "Cells are the basic unit of life.",
                "reflectionOnLearning": "How do cells resemble a school?"
            },
            "fiveE": {
                "engage": "Show a magnified photo of cork.",
                "explore": "Observe onion skin.",
                "explain": "Discuss organelles.",
                "elaborate": "Compare plant and animal cells.",
                "evaluate": "Exit ticket."
            }
        },
        "evaluatingLearning": {
            "assessment": "QUIZ: THE CELL\n\n1. Which organelle controls the cell?\n   a. Nucleus\n   b. Wall\n\n2. What surrounds the cell?\n   a. Membrane\n   b. Nucleus\n\n--- ANSWER KEY ---\n1. a\n2. a",
            "teacherReflection": {
                "learnerStats": "__ of __ learners reached mastery.",
                "strategies": "Which strategy worked?",
                "difficulties": "What difficulties were met?",
                "innovation": "What innovation was used?"
            }
        },
        "jadeCreativeIdea": "Build a cell model out of recycled materials."
    })
}
