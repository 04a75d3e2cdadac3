use crate::plan::{GenerationRequest, InstructionalModel};

fn procedure_block(model: InstructionalModel) -> &'static str {
    match model {
        InstructionalModel::FiveE => {
            "For III. TEACHING AND LEARNING PROCEDURE, follow the 5E Instructional Model:
   a. Engage: Activating prior knowledge and capturing interest.
   b. Explore: Hands-on inquiry and investigation.
   c. Explain: Conceptualization and explicitation of the new skill/topic.
   d. Elaborate: Deepening and applying understanding to new contexts.
   e. Evaluate: Assessment of learning within the procedure."
        }
        InstructionalModel::FourAs => {
            "For III. TEACHING AND LEARNING PROCEDURE, follow the 4As Instructional Model:
   a. Activity: Interactive/hands-on activity to start the lesson.
   b. Analysis: Processing and analyzing the activity to draw out observations.
   c. Abstraction: Formulating generalizations, teaching the main concepts.
   d. Application: Providing exercises or real-life situations where learners apply the knowledge."
        }
        InstructionalModel::Standard => {
            "For III. TEACHING AND LEARNING PROCEDURE, strictly follow these MATATAG components:
   A. Activating Prior Knowledge: Describe what learners do and what learners know. This activity must be a Short Review or a Feedback activity.
   B. Establishing Lesson Purpose: Focus on preparing the learners for what is to come and providing learners the necessary language that the teacher will use.
      Include specific content for: a. Lesson Purpose, and b. Unlocking Content Vocabulary.
   C. Developing and Deepening Understanding: Ensure learners develop and deepen understanding of the concept/skill.
      Provide content for: a. Explicitation, b. Worked Example, c. Lesson Activity.
   D. Making Generalization: Provide an opportunity for the learners to discuss the idea they have understood.
      Include content for: a. Learners' Takeaways, and b. Reflection on Learning."
        }
    }
}

fn assessment_block(req: &GenerationRequest) -> String {
    let types = req
        .assessment_config
        .question_types
        .iter()
        .map(|q| q.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "For IV. EVALUATING LEARNING: FORMATIVE ASSESSMENT, generate exactly {count} items in a highly structured, professional QUIZ format.
The quiz must consist of: {types}.

VISUAL FORMATTING RULES:
1. Start with a clear Title: \"QUIZ: {title}\".
2. Spacing: Use a double newline between EVERY question block for clear separation.
3. Multiple Choice:
   - Question on one line.
   - Each option (a, b, c, d) MUST be on its own line, indented with three spaces.
4. Short Answer:
   - Question on one line.
   - Followed by \"Answer: ___________________________________\".
5. Essay:
   - Clear prompt/question.
   - Followed by at least 4 lines of underscores (______________________) to signify writing space.
6. Answer Key: Include a distinct section at the very end labeled \"--- ANSWER KEY ---\" with numbered answers corresponding to the questions.
7. Language: Use academic language appropriate for {grade} and {subject}.",
        count = req.assessment_config.item_count,
        types = types,
        title = req.topic.to_uppercase(),
        grade = req.grade_level.as_str(),
        subject = req.subject.as_str(),
    )
}

/// Full instruction text for one submission.
pub fn build_prompt(req: &GenerationRequest) -> String {
    let mut out = String::new();
    out.push_str("Generate a professional lesson plan strictly aligned with the DepEd MATATAG Curriculum.\n\n");

    out.push_str("Parameters:\n");
    out.push_str(&format!("- Grade Level: {}\n", req.grade_level.as_str()));
    out.push_str(&format!("- Subject: {}\n", req.subject.as_str()));
    out.push_str(&format!("- Topic: {}\n", req.topic));
    out.push_str(&format!("- Quarter: {}\n", req.quarter.as_str()));
    out.push_str(&format!("- Week: {}\n", req.week));
    out.push_str(&format!("- Day: {}\n", req.day));
    out.push_str(&format!("- Duration: {}\n", req.duration.as_str()));
    out.push_str(&format!(
        "- Instructional Model: {}\n",
        req.instructional_model.as_str()
    ));
    if !req.additional_context.trim().is_empty() {
        out.push_str(&format!("- Context: {}\n", req.additional_context));
    }

    out.push_str(
        "\nStructure Requirement:
I. CURRICULUM CONTENT, STANDARDS, AND LESSON COMPETENCIES
A. Content Standard: key concepts and skills covered in the quarter.
B. Performance Standards: evidence of performance expected by the end of the quarter.
C. Learning Competencies and Objectives: unpacked target competencies for the quarter.
D. Content: enumerate key ideas/skills, topics, and subtopics.
E. Integration: connect the lesson within and across learning areas.

II. LEARNING RESOURCES: list teaching and learning resources used.

III. TEACHING AND LEARNING PROCEDURE
",
    );
    out.push_str(procedure_block(req.instructional_model));

    out.push_str("\n\nIV. EVALUATING LEARNING: FORMATIVE ASSESSMENT AND TEACHER'S REFLECTION\n");
    out.push_str(&assessment_block(req));
    out.push_str(
        "\nB. Teacher's Reflection: Provide reflective placeholders for learner stats, strategies, difficulties, and innovation.\n",
    );

    out.push_str(
        "\nEXTRA FEATURE:
V. JADE'S CREATIVE SPARK: Provide a unique, high-engagement, and creative integration idea or localized activity designed specifically for this lesson by Jade N. Bucatcat. This should be a 'out-of-the-box' pedagogical strategy.
",
    );
    out
}
