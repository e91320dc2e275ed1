mod common;

use adaptive_placement::cli::runner::simulated_answer;
use adaptive_placement::error::ErrorKind;
use adaptive_placement::program::InMemoryCatalog;
use adaptive_placement::session::{
    AssessmentService, CurrentQuestion, MemoryStore, ServiceConfig, SubmitResponseRequest,
};
use common::{answer, answer_keys, demo_program, request};
use futures::future::join_all;
use std::sync::Arc;

fn shared_service() -> Arc<AssessmentService> {
    let catalog = Arc::new(InMemoryCatalog::with_programs([demo_program()]));
    Arc::new(
        AssessmentService::new(
            ServiceConfig::default(),
            catalog,
            Arc::new(MemoryStore::new()),
        )
        .unwrap(),
    )
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_submissions_for_one_question_apply_once() {
    let service = shared_service();
    let keys = Arc::new(answer_keys(&demo_program()));
    let created = service.create_session(request("racer")).await.unwrap();

    let question_id = match service.get_current_question(created.id).await.unwrap() {
        CurrentQuestion::Next(next) => next.question.id,
        CurrentQuestion::Finished(_) => panic!("Expected a question"),
    };

    let session_id = created.id;
    let submissions = (0..8).map(|_| {
        let service = Arc::clone(&service);
        let keys = Arc::clone(&keys);
        let question_id = question_id.clone();
        tokio::spawn(async move {
            service
                .submit_response(
                    session_id,
                    SubmitResponseRequest {
                        user_answer: simulated_answer(&keys[&question_id], true),
                        question_id,
                        time_spent: 3.0,
                    },
                )
                .await
        })
    });

    let results: Vec<_> = join_all(submissions)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let accepted = results.iter().filter(|result| result.is_ok()).count();
    assert_eq!(accepted, 1);
    for rejected in results.iter().filter_map(|result| result.as_ref().err()) {
        assert_eq!(rejected.kind(), ErrorKind::ValidationError);
    }

    let session = service.get_results(created.id).await.unwrap();
    assert_eq!(session.total_questions, 1);
    assert_eq!(session.responses.len(), 1);
    assert_eq!(session.algorithm_state.correct_streak, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_for_one_pair_allow_a_single_session() {
    let service = shared_service();

    let creates = (0..8).map(|_| {
        let service = Arc::clone(&service);
        tokio::spawn(async move { service.create_session(request("twin")).await })
    });

    let results: Vec<_> = join_all(creates)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let created: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(created.len(), 1);
    assert!(
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| e.kind() == ErrorKind::Conflict)
    );
    assert_eq!(service.active_session("twin", "english"), Some(created[0].id));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_independent_sessions_progress_in_parallel() {
    let service = shared_service();
    let keys = Arc::new(answer_keys(&demo_program()));

    let students: Vec<String> = (0..6).map(|i| format!("student-{}", i)).collect();
    let runs = students.iter().map(|student| {
        let service = Arc::clone(&service);
        let keys = Arc::clone(&keys);
        let student = student.clone();
        tokio::spawn(async move {
            let created = service.create_session(request(&student)).await.unwrap();
            for _ in 0..4 {
                answer(&service, &keys, created.id, true).await;
            }
            created.id
        })
    });

    let ids: Vec<_> = join_all(runs)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    for id in ids {
        let results = service.get_results(id).await.unwrap();
        assert_eq!(results.total_questions, 4);
        assert_eq!(results.algorithm_state.current_level, 2);
        assert_eq!(results.algorithm_state.level_history, vec![0, 1, 2]);
    }
}
