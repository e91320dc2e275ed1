//! Subcommand runners for the `placement` binary.

use super::args::{SimulateConfig, TakeConfig};
use super::config::PlacementConfig;
use crate::assessment::{AnswerInput, SessionId};
use crate::program::{InMemoryCatalog, QuestionId, QuestionKind, load_program_file};
use crate::session::{
    AssessmentService, CreateSessionRequest, CurrentQuestion, FileStore, MemoryStore,
    NextQuestion, SessionFinished, SessionResults, SessionStore, SubmitResponseRequest,
};
use anyhow::{Context, Result, bail};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Interactive console assessment, persisted to the file store
pub async fn run_take(config: TakeConfig, settings: &PlacementConfig) -> Result<()> {
    let catalog = Arc::new(InMemoryCatalog::new());
    let program_id = catalog.load_file(&config.program)?;

    let data_dir = settings.data_dir();
    let store = Arc::new(FileStore::new(&data_dir)?);
    let service = AssessmentService::new(settings.service_config(), catalog, store)?;
    let restored = service.restore().await?;
    info!("Restored {} sessions from {}", restored, data_dir.display());

    let session_id = match service.active_session(&config.student_id, &program_id) {
        Some(existing) => {
            println!("▶ Resuming session {}", existing);
            existing
        }
        None => {
            let created = service
                .create_session(CreateSessionRequest {
                    student_id: config.student_id.clone(),
                    school_id: config.school_id.clone(),
                    proctor_id: config.proctor_id.clone(),
                    program_id,
                    config: None,
                })
                .await?;
            println!(
                "📝 Started {} assessment {} ({} questions)",
                created.subject, created.id, created.total_questions
            );
            created.id
        }
    };
    println!("Type 'quit' to abandon the assessment.");

    loop {
        let next = match service.get_current_question(session_id).await? {
            CurrentQuestion::Next(next) => next,
            CurrentQuestion::Finished(finished) => {
                print_finished(session_id, &finished);
                return Ok(());
            }
        };

        print_question(&next);
        let started = Instant::now();
        let Some(input) = prompt("> ")? else {
            break;
        };
        if input == "quit" || input == "exit" {
            break;
        }

        let user_answer = match parse_answer(&next, &input) {
            Ok(answer) => answer,
            Err(e) => {
                println!("❌ {}", e);
                continue;
            }
        };

        let request = SubmitResponseRequest {
            question_id: next.question.id.clone(),
            user_answer,
            time_spent: started.elapsed().as_secs_f64().max(f64::EPSILON),
        };
        match service.submit_response(session_id, request).await {
            Ok(outcome) => {
                println!(
                    "{} Level {} ({}/{} correct)",
                    if outcome.is_correct { "✅" } else { "❌" },
                    outcome.current_level,
                    outcome.progress.total_correct_answers,
                    outcome.progress.total_questions
                );
                if let Some(transition) = outcome.progression {
                    println!(
                        "   Level {} → {} ({})",
                        transition.previous_level, transition.new_level, transition.reason
                    );
                }
            }
            Err(e) => println!("❌ {}", e),
        }
    }

    let results = service.abandon(session_id).await?;
    println!(
        "Assessment {} abandoned at level {:?} after {} questions",
        session_id, results.final_level, results.total_questions
    );
    Ok(())
}

/// Play a whole assessment with a student answering correctly with probability `accuracy`
pub async fn run_simulate(config: SimulateConfig, settings: &PlacementConfig) -> Result<()> {
    let program = load_program_file(&config.program)?;
    let program_id = program.id.clone();
    let answer_keys: HashMap<QuestionId, QuestionKind> = program
        .levels
        .iter()
        .flat_map(|level| &level.questions)
        .map(|question| (question.id.clone(), question.kind.clone()))
        .collect();

    let catalog = Arc::new(InMemoryCatalog::with_programs([program]));
    let service = AssessmentService::new(
        settings.service_config(),
        catalog,
        Arc::new(MemoryStore::new()),
    )?;

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let created = service
        .create_session(CreateSessionRequest {
            student_id: config.student_id.clone(),
            school_id: "simulation".to_string(),
            proctor_id: "simulation".to_string(),
            program_id,
            config: None,
        })
        .await?;
    info!(
        "Simulating session {} with accuracy {}",
        created.id, config.accuracy
    );

    while let CurrentQuestion::Next(next) = service.get_current_question(created.id).await? {
        let kind = answer_keys
            .get(&next.question.id)
            .with_context(|| format!("Question {} has no answer key", next.question.id))?;

        let correct = rng.random_bool(config.accuracy);
        let request = SubmitResponseRequest {
            question_id: next.question.id.clone(),
            user_answer: simulated_answer(kind, correct),
            time_spent: rng.random_range(5.0..60.0),
        };
        let outcome = service.submit_response(created.id, request).await?;
        println!(
            "{:>3}. level {} {} → level {}",
            outcome.progress.total_questions,
            next.current_level,
            if outcome.is_correct { "✓" } else { "✗" },
            outcome.current_level
        );
    }

    let results = service.get_results(created.id).await?;
    println!();
    println!("📊 Simulation results");
    println!(
        "  Stop reason:   {}",
        results
            .algorithm_state
            .stop_reason
            .map(|reason| reason.to_string())
            .unwrap_or_else(|| "none".to_string())
    );
    println!("  Final level:   {:?}", results.final_level);
    println!(
        "  Answers:       {}/{} ({:.1}%)",
        results.total_correct_answers, results.total_questions, results.accuracy
    );
    println!("  Level history: {:?}", results.algorithm_state.level_history);
    Ok(())
}

/// Print the stored results of a session as JSON
pub async fn run_results(session_id: SessionId, settings: &PlacementConfig) -> Result<()> {
    let store = FileStore::new(&settings.data_dir())?;
    let Some(session) = store.load(session_id).await? else {
        bail!("Session {} not found in {}", session_id, store.sessions_dir().display());
    };

    let results = SessionResults::from(&session);
    let rendered =
        serde_json::to_string_pretty(&results).context("Failed to render session results")?;
    println!("{}", rendered);
    Ok(())
}

/// Build an answer that the keyed evaluator grades as `correct`
pub fn simulated_answer(kind: &QuestionKind, correct: bool) -> AnswerInput {
    match kind {
        QuestionKind::MultipleChoice {
            options,
            correct_index,
        } => {
            if correct {
                AnswerInput::Choice(*correct_index)
            } else if options.len() > 1 {
                AnswerInput::Choice((correct_index + 1) % options.len())
            } else {
                AnswerInput::Text(String::new())
            }
        }
        QuestionKind::OneWordAnswer { accepted_answers } => match accepted_answers.first() {
            Some(answer) if correct => AnswerInput::Text(answer.clone()),
            _ => AnswerInput::Text(String::new()),
        },
        QuestionKind::VerbalEvaluation => AnswerInput::Verdict(correct),
    }
}

/// Turn console input into an answer for the displayed question
pub fn parse_answer(next: &NextQuestion, input: &str) -> Result<AnswerInput> {
    match next.question.question_type.as_str() {
        "multiple_choice" => {
            let option_count = next.question.options.as_ref().map_or(0, Vec::len);
            match input.parse::<usize>() {
                Ok(number) if (1..=option_count).contains(&number) => {
                    Ok(AnswerInput::Choice(number - 1))
                }
                Ok(number) => bail!("Choose an option between 1 and {}, got {}", option_count, number),
                Err(_) => Ok(AnswerInput::Text(input.to_string())),
            }
        }
        "verbal_evaluation" => match input.to_lowercase().as_str() {
            "y" | "yes" | "true" => Ok(AnswerInput::Verdict(true)),
            "n" | "no" | "false" => Ok(AnswerInput::Verdict(false)),
            _ => bail!("Enter y or n for the rater's verdict"),
        },
        _ => Ok(AnswerInput::Text(input.to_string())),
    }
}

fn print_question(next: &NextQuestion) {
    println!();
    println!(
        "Question {} (level {}, {:.0}% so far)",
        next.progress.current_question_index + 1,
        next.current_level,
        next.progress.accuracy
    );
    println!("{}", next.question.text);
    if let Some(options) = &next.question.options {
        for (i, option) in options.iter().enumerate() {
            println!("  {}. {}", i + 1, option);
        }
    }
    if next.question.question_type == "verbal_evaluation" {
        println!("  (rater verdict: y/n)");
    }
}

fn print_finished(session_id: SessionId, finished: &SessionFinished) {
    let results = &finished.final_results;
    println!();
    println!("🏁 Assessment {} {}", session_id, finished.status);
    if let Some(reason) = finished.stop_reason {
        println!("  Stop reason: {}", reason);
    }
    match results.final_level {
        Some(level) => println!("  Placed at level {}", level),
        None => warn!("Session {} finished without a final level", session_id),
    }
    println!(
        "  {}/{} correct ({:.1}%) in {}s",
        results.total_correct_answers, results.total_questions, results.accuracy, results.duration
    );
}

/// Read one trimmed line from stdin; `None` on end of input
fn prompt(label: &str) -> Result<Option<String>> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim().to_string()))
}
