#![allow(dead_code)]

use adaptive_placement::assessment::SessionId;
use adaptive_placement::cli::runner::simulated_answer;
use adaptive_placement::program::{Program, QuestionKind, load_program_file};
use adaptive_placement::session::{
    AssessmentService, CreateSessionRequest, CurrentQuestion, SubmitOutcome,
    SubmitResponseRequest,
};
use std::collections::HashMap;
use std::path::PathBuf;

pub fn demo_program_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos/programs/english.toml")
}

pub fn demo_program() -> Program {
    load_program_file(demo_program_path()).expect("demo program should load")
}

pub fn answer_keys(program: &Program) -> HashMap<String, QuestionKind> {
    program
        .levels
        .iter()
        .flat_map(|level| &level.questions)
        .map(|question| (question.id.clone(), question.kind.clone()))
        .collect()
}

pub fn request(student: &str) -> CreateSessionRequest {
    CreateSessionRequest {
        student_id: student.to_string(),
        school_id: "school-1".to_string(),
        proctor_id: "proctor-1".to_string(),
        program_id: "english".to_string(),
        config: None,
    }
}

/// Answer the current question, graded as `correct`
pub async fn answer(
    service: &AssessmentService,
    keys: &HashMap<String, QuestionKind>,
    session_id: SessionId,
    correct: bool,
) -> SubmitOutcome {
    let next = match service
        .get_current_question(session_id)
        .await
        .expect("session should exist")
    {
        CurrentQuestion::Next(next) => next,
        CurrentQuestion::Finished(finished) => {
            panic!("Session already finished: {:?}", finished.stop_reason)
        }
    };

    service
        .submit_response(
            session_id,
            SubmitResponseRequest {
                user_answer: simulated_answer(&keys[&next.question.id], correct),
                question_id: next.question.id,
                time_spent: 7.5,
            },
        )
        .await
        .expect("response should be accepted")
}
