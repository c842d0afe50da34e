mod common;

use common::{FakeProgressStream, FakeSearchBackend, log_event, sample_result, wait_for};
use ksearch_application::{FEEDBACK_UNAVAILABLE_MESSAGE, SearchUseCase};
use ksearch_core::KsearchError;
use ksearch_core::progress::phase::labels;
use ksearch_core::search::FeedbackScore;
use ksearch_core::session::SessionState;
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn test_second_search_cancels_first() {
    let stream = FakeProgressStream::new();
    let backend = FakeSearchBackend::answering(sample_result("run-1"));
    let usecase = SearchUseCase::new(backend, stream.clone());

    let mut first = usecase.begin("What are the fees?").await.unwrap();
    stream
        .sender(&first.session_id)
        .unbounded_send(Ok(log_event(labels::BREAKING_DOWN_QUERY, None)))
        .unwrap();
    wait_for(&mut first.progress, |s| s.steps.len() == 1).await;

    let mut second = usecase.begin("How do I open an account?").await.unwrap();
    assert_ne!(first.session_id, second.session_id);

    // The previous session is fully torn down before the new one opens
    let cancelled =
        wait_for(&mut first.progress, |s| s.state == SessionState::Cancelled).await;
    assert!(cancelled.steps.is_empty());
    assert_eq!(stream.released(), 1);

    stream
        .sender(&second.session_id)
        .unbounded_send(Ok(log_event(labels::SEARCHING_DOCUMENTS, None)))
        .unwrap();
    let fresh = wait_for(&mut second.progress, |s| s.steps.len() == 1).await;
    assert!(usecase.is_current(&second.session_id).await);
    assert!(!usecase.is_current(&first.session_id).await);
    assert_eq!(fresh.steps[0].phase_label, labels::SEARCHING_DOCUMENTS);
    assert_eq!(fresh.session_id.as_ref(), Some(&second.session_id));
    assert_eq!(stream.opened(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_resubmitting_same_query_discards_pending_reveals() {
    let stream = FakeProgressStream::new();
    let backend = FakeSearchBackend::answering(sample_result("run-1"));
    let usecase = SearchUseCase::new(backend, stream.clone());

    let first = usecase.begin("q").await.unwrap();
    stream
        .sender(&first.session_id)
        .unbounded_send(Ok(log_event(labels::SUB_QUERIES, Some("['a', 'b', 'c']"))))
        .unwrap();
    let second = usecase.begin("q").await.unwrap();
    assert_ne!(first.session_id, second.session_id);

    tokio::time::sleep(Duration::from_millis(1600)).await;

    let stale = first.progress.borrow().clone();
    assert_eq!(stale.state, SessionState::Cancelled);
    assert!(stale.steps.is_empty());
    assert!(stale.sub_queries.is_empty());

    let fresh = second.progress.borrow().clone();
    assert!(fresh.steps.is_empty());
    assert!(fresh.sub_queries.is_empty());
    assert_eq!(fresh.session_id.as_ref(), Some(&second.session_id));
    // Only the second session still holds a connection
    assert_eq!(stream.opened() - stream.released(), 1);
    assert!(usecase.is_current(&second.session_id).await);
}

#[tokio::test(start_paused = true)]
async fn test_successful_search_completes_session() {
    let stream = FakeProgressStream::new();
    let backend = FakeSearchBackend::answering(sample_result("run-1"));
    let usecase = SearchUseCase::new(backend.clone(), stream.clone());

    let mut ticket = usecase.begin("  What are the fees?  ").await.unwrap();
    assert_eq!(ticket.query, "What are the fees?");
    stream
        .sender(&ticket.session_id)
        .unbounded_send(Ok(log_event(labels::GENERATING_ANSWER, None)))
        .unwrap();
    wait_for(&mut ticket.progress, |s| s.steps.len() == 1).await;

    let result = usecase.run(&ticket).await.unwrap();
    assert_eq!(result.run_id, "run-1");

    let snapshot =
        wait_for(&mut ticket.progress, |s| s.state == SessionState::Completed).await;
    assert_eq!(snapshot.steps.len(), 1);

    let searches = backend.searches.lock().unwrap().clone();
    assert_eq!(
        searches,
        vec![("What are the fees?".to_string(), ticket.session_id.clone())]
    );
}

#[tokio::test(start_paused = true)]
async fn test_failed_search_surfaces_server_message() {
    let stream = FakeProgressStream::new();
    let backend =
        FakeSearchBackend::failing(KsearchError::http(500, "Processing error: index offline"));
    let usecase = SearchUseCase::new(backend, stream.clone());

    let mut ticket = usecase.begin("fees").await.unwrap();
    let err = usecase.run(&ticket).await.unwrap_err();
    assert_eq!(err, "Processing error: index offline");

    wait_for(&mut ticket.progress, |s| s.state == SessionState::Cancelled).await;
}

#[tokio::test]
async fn test_blank_query_is_rejected() {
    let stream = FakeProgressStream::new();
    let backend = FakeSearchBackend::answering(sample_result("r"));
    let usecase = SearchUseCase::new(backend, stream.clone());

    assert!(usecase.begin("   ").await.is_err());
    assert!(usecase.search("").await.is_err());
    assert_eq!(stream.opened(), 0);
    assert!(usecase.progress().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_cancel_active_releases_stream() {
    let stream = FakeProgressStream::new();
    let backend = FakeSearchBackend::answering(sample_result("r"));
    let usecase = SearchUseCase::new(backend, stream.clone());

    let ticket = usecase.begin("fees").await.unwrap();
    let _events = stream.sender(&ticket.session_id);
    usecase.cancel_active().await;

    assert_eq!(ticket.progress.borrow().state, SessionState::Cancelled);
    assert!(usecase.progress().await.is_none());
    assert_eq!(stream.released(), stream.opened());
}

#[tokio::test]
async fn test_feedback_is_sent_with_score() {
    let stream = FakeProgressStream::new();
    let backend = FakeSearchBackend::answering(sample_result("run-7"));
    let usecase = SearchUseCase::new(backend.clone(), stream);

    usecase
        .submit_feedback(
            &sample_result("run-7"),
            FeedbackScore::NotHelpful,
            Some("Outdated".to_string()),
        )
        .await
        .unwrap();

    let sent = backend.feedback.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].run_id, "run-7");
    assert_eq!(sent[0].score, 0.0);
    assert_eq!(sent[0].comment.as_deref(), Some("Outdated"));
}

#[tokio::test]
async fn test_feedback_refused_without_run_id() {
    let stream = FakeProgressStream::new();
    let backend = FakeSearchBackend::answering(sample_result(""));
    let usecase = SearchUseCase::new(backend.clone(), stream);

    let err = usecase
        .submit_feedback(&sample_result(""), FeedbackScore::Helpful, None)
        .await
        .unwrap_err();
    assert_eq!(err, FEEDBACK_UNAVAILABLE_MESSAGE);
    assert!(backend.feedback.lock().unwrap().is_empty());
}
