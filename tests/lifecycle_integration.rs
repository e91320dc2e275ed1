mod common;

use adaptive_placement::assessment::{AssessmentStatus, StopReason};
use adaptive_placement::error::ErrorKind;
use adaptive_placement::program::InMemoryCatalog;
use adaptive_placement::session::{
    AssessmentService, CurrentQuestion, FileStore, MemoryStore, ServiceConfig, SessionStore,
};
use common::{answer, answer_keys, demo_program, request};
use std::sync::Arc;
use tempfile::TempDir;

fn memory_service() -> AssessmentService {
    let catalog = Arc::new(InMemoryCatalog::with_programs([demo_program()]));
    AssessmentService::new(
        ServiceConfig::default(),
        catalog,
        Arc::new(MemoryStore::new()),
    )
    .unwrap()
}

fn file_service(data_dir: &std::path::Path) -> AssessmentService {
    let catalog = Arc::new(InMemoryCatalog::with_programs([demo_program()]));
    let store = Arc::new(FileStore::new(data_dir).unwrap());
    AssessmentService::new(ServiceConfig::default(), catalog, store).unwrap()
}

#[tokio::test]
async fn test_high_performer_reaches_the_ceiling() {
    let service = memory_service();
    let keys = answer_keys(&demo_program());
    let created = service.create_session(request("ace")).await.unwrap();

    let mut last = None;
    while service
        .get_current_question(created.id)
        .await
        .unwrap()
        .has_next_question()
    {
        last = Some(answer(&service, &keys, created.id, true).await);
    }

    let last = last.unwrap();
    assert!(last.session_complete);
    assert_eq!(last.stop_reason, Some(StopReason::MaximumPerformance));

    let results = service.get_results(created.id).await.unwrap();
    assert_eq!(results.status, AssessmentStatus::Completed);
    assert_eq!(results.final_level, Some(9));
    assert_eq!(results.total_questions, 17);
    assert_eq!(results.accuracy, 100.0);
    // Skip-ahead from 6 lands on 8
    assert_eq!(
        results.algorithm_state.level_history,
        vec![0, 1, 2, 3, 4, 5, 6, 8, 9]
    );
    assert!(results.end_time.is_some());
    assert!(results.total_duration.is_some());
}

#[tokio::test]
async fn test_struggling_student_stops_at_the_floor() {
    let service = memory_service();
    let keys = answer_keys(&demo_program());
    let created = service.create_session(request("novice")).await.unwrap();

    for _ in 0..9 {
        let outcome = answer(&service, &keys, created.id, false).await;
        assert!(!outcome.session_complete);
        assert_eq!(outcome.current_level, 0);
    }
    let outcome = answer(&service, &keys, created.id, false).await;
    assert!(outcome.session_complete);
    assert_eq!(outcome.stop_reason, Some(StopReason::MinimumPerformance));

    match service.get_current_question(created.id).await.unwrap() {
        CurrentQuestion::Finished(finished) => {
            assert_eq!(finished.status, AssessmentStatus::Completed);
            assert_eq!(finished.final_results.final_level, Some(0));
            assert_eq!(finished.final_results.total_correct_answers, 0);
        }
        CurrentQuestion::Next(_) => panic!("Expected finished session"),
    }

    let err = service.abandon(created.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
}

#[tokio::test]
async fn test_results_json_uses_documented_names() {
    let service = memory_service();
    let keys = answer_keys(&demo_program());
    let created = service.create_session(request("json")).await.unwrap();

    answer(&service, &keys, created.id, true).await;
    answer(&service, &keys, created.id, true).await;

    let results = service.get_results(created.id).await.unwrap();
    let json = serde_json::to_value(&results).unwrap();

    assert_eq!(json["status"], "in_progress");
    assert_eq!(json["algorithmState"]["currentLevel"], 1);
    assert_eq!(json["algorithmState"]["levelHistory"], serde_json::json!([0, 1]));
    assert_eq!(json["responses"].as_array().unwrap().len(), 2);
    assert_eq!(json["responses"][0]["isCorrect"], true);
    assert_eq!(json["responses"][0]["levelNumber"], 0);
    assert_eq!(json["levelAssessments"][0]["questionsAnswered"], 2);
    assert_eq!(json["owner"]["studentId"], "json");
    assert!(json["owner"].get("student_id").is_none());
    assert_eq!(json["config"]["maxQuestionsPerLevel"], 5);
    assert!(json["config"].get("randomize_questions").is_none());
    assert_eq!(json["config"]["randomizeQuestions"], true);
}

#[tokio::test]
async fn test_file_store_resumes_after_restart() {
    let temp_dir = TempDir::new().unwrap();
    let program = demo_program();
    let keys = answer_keys(&program);

    let session_id = {
        let service = file_service(temp_dir.path());
        let created = service.create_session(request("resume")).await.unwrap();
        for correct in [true, false, true] {
            answer(&service, &keys, created.id, correct).await;
        }
        created.id
    };

    let service = file_service(temp_dir.path());
    assert_eq!(service.restore().await.unwrap(), 1);
    assert_eq!(service.active_session("resume", "english"), Some(session_id));

    // The pair is still held by the restored session
    let err = service.create_session(request("resume")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    match service.get_current_question(session_id).await.unwrap() {
        CurrentQuestion::Next(next) => {
            assert_eq!(next.progress.current_question_index, 3);
            assert_eq!(next.progress.total_questions, 3);
        }
        CurrentQuestion::Finished(_) => panic!("Expected an open question"),
    }

    let final_results = service.abandon(session_id).await.unwrap();
    assert_eq!(final_results.total_questions, 3);
    assert_eq!(final_results.total_correct_answers, 2);
    assert_eq!(service.active_session("resume", "english"), None);

    let store = FileStore::new(temp_dir.path()).unwrap();
    let stored = store.load(session_id).await.unwrap().unwrap();
    assert_eq!(stored.status, AssessmentStatus::Abandoned);
    assert_eq!(stored.responses.len(), 3);
    assert!(stored.end_time.is_some());
}

#[tokio::test]
async fn test_list_sessions_reports_history() {
    let service = memory_service();
    let keys = answer_keys(&demo_program());

    let first = service.create_session(request("history")).await.unwrap();
    answer(&service, &keys, first.id, true).await;
    service.abandon(first.id).await.unwrap();
    let second = service.create_session(request("history")).await.unwrap();

    let summaries = service.list_sessions("history").await;
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].id, first.id);
    assert_eq!(summaries[0].status, AssessmentStatus::Abandoned);
    assert_eq!(summaries[1].id, second.id);
    assert_eq!(summaries[1].status, AssessmentStatus::InProgress);
    assert!(service.list_sessions("nobody").await.is_empty());
}
