use anyhow::Result;
use proptest::prelude::*;

use super::DocumentSession;
use crate::domain::models::Analysis;
use crate::domain::models::DocumentState;
use crate::domain::models::Intent;
use crate::domain::models::ReviewError;
use crate::domain::models::Suggestion;

fn server_error(detail: &str) -> ReviewError {
    return ReviewError::ServerError {
        status: 500,
        detail: detail.to_string(),
    };
}

fn analysis(suggestions: Vec<Suggestion>) -> Analysis {
    return Analysis {
        suggestions,
        redline_document_id: None,
    };
}

fn reviewing_session() -> Result<DocumentSession> {
    let mut session = DocumentSession::new("contract.docx");
    session.submit()?;
    session.upload_succeeded("d1")?;
    session.analyze_succeeded(analysis(vec![
        Suggestion::new("Term: 1 year", "Term: 2 years"),
        Suggestion::new("Governing law: NY", "Governing law: CH"),
    ]))?;

    return Ok(session);
}

#[test]
fn it_creates_short_keys() {
    let key = DocumentSession::create_key();

    assert_eq!(key.split('-').count(), 2);
    assert_ne!(key, DocumentSession::create_key());
}

#[test]
fn it_reaches_reviewing() -> Result<()> {
    let session = reviewing_session()?;

    assert_eq!(session.state(), DocumentState::Reviewing);
    assert_eq!(session.document_id(), Some("d1"));
    assert_eq!(session.suggestions().len(), 2);
    assert_eq!(session.request_seq(), 2);
    assert!(session.is_current(2));
    assert!(!session.is_current(1));

    return Ok(());
}

#[test]
fn it_mirrors_the_guard_in_snapshots() -> Result<()> {
    let snapshot = reviewing_session()?.snapshot();

    assert_eq!(
        snapshot.allowed_intents,
        vec![Intent::Accept, Intent::SubmitFeedback, Intent::NavigateBack]
    );
    assert!(snapshot.allows(Intent::Accept));
    assert!(!snapshot.allows(Intent::Submit));

    let idle = DocumentSession::default().snapshot();
    assert_eq!(idle.allowed_intents, vec![Intent::Submit]);

    return Ok(());
}

#[test]
fn it_rejects_intents_without_mutating() -> Result<()> {
    let mut session = reviewing_session()?;
    session.accept()?;
    let seq = session.request_seq();

    let res = session.accept();

    assert!(matches!(res, Err(ReviewError::IllegalTransition { .. })));
    assert_eq!(session.state(), DocumentState::Accepting);
    assert_eq!(session.request_seq(), seq);

    return Ok(());
}

#[test]
fn it_sets_clean_document_only_when_accepted() -> Result<()> {
    let mut session = reviewing_session()?;
    session.accept()?;
    assert_eq!(session.clean_document_id(), None);

    session.accept_succeeded("c1")?;

    assert_eq!(session.state(), DocumentState::Accepted);
    assert_eq!(session.clean_document_id(), Some("c1"));
    assert!(session.suggestions().is_empty());
    assert!(session.is_download_in_flight());

    return Ok(());
}

#[test]
fn it_retains_review_when_accept_fails() -> Result<()> {
    let mut session = reviewing_session()?;
    session.accept()?;
    session.accept_failed(&server_error("could not build document"))?;

    assert_eq!(session.state(), DocumentState::Failed);
    assert!(session.suggestions().is_empty());
    assert_eq!(session.retained_suggestions().map(|s| return s.len()), Some(2));
    assert_eq!(session.last_error(), Some("could not build document"));
    assert!(session.permits(Intent::Accept));
    assert!(session.permits(Intent::SubmitFeedback));

    session.accept()?;

    assert_eq!(session.state(), DocumentState::Accepting);
    assert_eq!(session.suggestions().len(), 2);
    assert_eq!(session.retained_suggestions(), None);
    assert_eq!(session.last_error(), None);

    return Ok(());
}

#[test]
fn it_does_not_allow_accept_after_upload_failure() -> Result<()> {
    let mut session = DocumentSession::new("contract.docx");
    session.submit()?;
    session.upload_failed(&server_error("bad file"))?;

    assert_eq!(session.state(), DocumentState::Failed);
    assert!(!session.permits(Intent::Accept));
    assert!(!session.permits(Intent::SubmitFeedback));
    assert!(session.permits(Intent::Submit));

    return Ok(());
}

#[test]
fn it_replaces_suggestions_after_feedback() -> Result<()> {
    let mut session = reviewing_session()?;
    session.submit_feedback()?;
    session.feedback_acknowledged()?;

    assert_eq!(session.state(), DocumentState::Analyzing);
    assert!(session.suggestions().is_empty());

    session.analyze_succeeded(analysis(vec![Suggestion::new("Clause 3: X", "Clause 3: Y")]))?;

    assert_eq!(
        session.suggestions(),
        &[Suggestion::new("Clause 3: X", "Clause 3: Y")]
    );

    return Ok(());
}

#[test]
fn it_keeps_suggestions_when_feedback_fails() -> Result<()> {
    let mut session = reviewing_session()?;
    session.submit_feedback()?;
    session.feedback_failed(&ReviewError::NetworkFailure("timed out".to_string()))?;

    assert_eq!(session.state(), DocumentState::Reviewing);
    assert_eq!(session.suggestions().len(), 2);
    assert_eq!(
        session.last_error(),
        Some("Unable to reach the review backend: timed out")
    );

    return Ok(());
}

#[test]
fn it_retries_downloads_once_at_a_time() -> Result<()> {
    let mut session = reviewing_session()?;
    session.accept()?;
    session.accept_succeeded("c1")?;

    assert!(!session.permits(Intent::RetryDownload));

    session.download_finished(Some(&ReviewError::NotFound("gone".to_string())))?;

    assert_eq!(session.state(), DocumentState::Accepted);
    assert_eq!(session.last_error(), Some("gone"));
    assert!(session.permits(Intent::RetryDownload));

    let seq = session.retry_download()?;

    assert_eq!(seq, session.request_seq());
    assert!(session.is_download_in_flight());
    assert!(!session.permits(Intent::RetryDownload));

    return Ok(());
}

#[test]
fn it_resets_when_resubmitted_from_failed() -> Result<()> {
    let mut session = reviewing_session()?;
    session.accept()?;
    session.accept_failed(&server_error("boom"))?;

    session.submit()?;

    assert_eq!(session.state(), DocumentState::Uploading);
    assert_eq!(session.document_id(), None);
    assert_eq!(session.retained_suggestions(), None);
    assert_eq!(session.last_error(), None);

    return Ok(());
}

#[test]
fn it_starts_over_when_navigating_back() -> Result<()> {
    let mut session = reviewing_session()?;
    session.accept()?;
    session.accept_succeeded("c1")?;
    let key = session.key.to_string();

    session.navigate_back()?;

    assert_eq!(session.state(), DocumentState::Idle);
    assert_ne!(session.key, key);
    assert_eq!(session.document_id(), None);
    assert_eq!(session.clean_document_id(), None);
    assert!(session.suggestions().is_empty());
    assert!(!session.is_download_in_flight());
    assert!(!session.is_current(3));

    return Ok(());
}

#[test]
fn it_rejects_navigating_back_from_idle() {
    let mut session = DocumentSession::new("contract.docx");
    let key = session.key.to_string();

    let res = session.navigate_back();

    assert!(matches!(res, Err(ReviewError::IllegalTransition { .. })));
    assert_eq!(session.key, key);
    assert_eq!(session.file_name(), "contract.docx");
}

#[derive(Clone, Debug)]
enum Step {
    Submit,
    Accept,
    SubmitFeedback,
    NavigateBack,
    RetryDownload,
    UploadSucceeded,
    UploadFailed,
    AnalyzeSucceeded(Vec<(String, String)>),
    AnalyzeFailed,
    AcceptSucceeded,
    AcceptFailed,
    FeedbackAcknowledged,
    FeedbackFailed,
    DownloadSucceeded,
    DownloadFailed,
}

fn step_strategy() -> impl Strategy<Value = Step> {
    return prop_oneof![
        Just(Step::Submit),
        Just(Step::Accept),
        Just(Step::SubmitFeedback),
        Just(Step::NavigateBack),
        Just(Step::RetryDownload),
        Just(Step::UploadSucceeded),
        Just(Step::UploadFailed),
        prop::collection::vec(("[a-z ]{1,8}", "[a-z ]{1,8}"), 0..4)
            .prop_map(Step::AnalyzeSucceeded),
        Just(Step::AnalyzeFailed),
        Just(Step::AcceptSucceeded),
        Just(Step::AcceptFailed),
        Just(Step::FeedbackAcknowledged),
        Just(Step::FeedbackFailed),
        Just(Step::DownloadSucceeded),
        Just(Step::DownloadFailed),
    ];
}

fn apply(session: &mut DocumentSession, step: &Step) -> Result<(), ReviewError> {
    let err = server_error("failed");
    match step {
        Step::Submit => session.submit().map(|_| return ()),
        Step::Accept => session.accept().map(|_| return ()),
        Step::SubmitFeedback => session.submit_feedback().map(|_| return ()),
        Step::NavigateBack => session.navigate_back(),
        Step::RetryDownload => session.retry_download().map(|_| return ()),
        Step::UploadSucceeded => session.upload_succeeded("d1").map(|_| return ()),
        Step::UploadFailed => session.upload_failed(&err),
        Step::AnalyzeSucceeded(pairs) => session.analyze_succeeded(analysis(
            pairs
                .iter()
                .map(|(original, suggestion)| return Suggestion::new(original, suggestion))
                .collect(),
        )),
        Step::AnalyzeFailed => session.analyze_failed(&err),
        Step::AcceptSucceeded => session.accept_succeeded("c1").map(|_| return ()),
        Step::AcceptFailed => session.accept_failed(&err),
        Step::FeedbackAcknowledged => session.feedback_acknowledged().map(|_| return ()),
        Step::FeedbackFailed => session.feedback_failed(&err),
        Step::DownloadSucceeded => session.download_finished(None),
        Step::DownloadFailed => session.download_finished(Some(&err)),
    }
}

fn legal_successors(state: DocumentState) -> Vec<DocumentState> {
    let mut successors = forward_successors(state);
    if state != DocumentState::Idle {
        successors.push(DocumentState::Idle);
    }

    return successors;
}

fn forward_successors(state: DocumentState) -> Vec<DocumentState> {
    match state {
        DocumentState::Idle => return vec![DocumentState::Uploading],
        DocumentState::Uploading => return vec![DocumentState::Analyzing, DocumentState::Failed],
        DocumentState::Analyzing => return vec![DocumentState::Reviewing, DocumentState::Failed],
        DocumentState::Reviewing => {
            return vec![DocumentState::Accepting, DocumentState::SubmittingFeedback]
        }
        DocumentState::Accepting => return vec![DocumentState::Accepted, DocumentState::Failed],
        DocumentState::Accepted => return vec![DocumentState::Accepted],
        DocumentState::SubmittingFeedback => {
            return vec![DocumentState::Analyzing, DocumentState::Reviewing]
        }
        DocumentState::Failed => {
            return vec![
                DocumentState::Uploading,
                DocumentState::Accepting,
                DocumentState::SubmittingFeedback,
            ]
        }
    }
}

proptest! {
    #[test]
    fn it_only_takes_legal_edges(steps in prop::collection::vec(step_strategy(), 0..40)) {
        let mut session = DocumentSession::new("contract.docx");

        for step in steps {
            let before = session.state();
            let seq_before = session.request_seq();
            let key_before = session.key.to_string();

            match apply(&mut session, &step) {
                Ok(()) => {
                    prop_assert!(
                        legal_successors(before).contains(&session.state()),
                        "{:?} took {} -> {}", step, before, session.state()
                    );
                }
                Err(err) => {
                    let illegal = matches!(err, ReviewError::IllegalTransition { .. });
                    prop_assert!(illegal, "{:?} failed with {:?}", step, err);
                    prop_assert_eq!(session.state(), before);
                    prop_assert_eq!(session.request_seq(), seq_before);
                    prop_assert_eq!(&session.key, &key_before);
                }
            }

            if matches!(step, Step::NavigateBack) && before != DocumentState::Idle {
                prop_assert_ne!(&session.key, &key_before);
                prop_assert_eq!(session.document_id(), None);
                prop_assert_eq!(session.request_seq(), 0);
                prop_assert!(session.retained_suggestions().is_none());
                prop_assert!(!session.is_download_in_flight());
            }

            prop_assert_eq!(
                session.clean_document_id().is_some(),
                session.state() == DocumentState::Accepted
            );
            if !session.suggestions().is_empty() {
                prop_assert!(session.state().holds_suggestions());
            }
            if let Step::AnalyzeSucceeded(pairs) = &step {
                if before == DocumentState::Analyzing {
                    let originals = session
                        .suggestions()
                        .iter()
                        .map(|s| return s.original.to_string())
                        .collect::<Vec<String>>();
                    let expected = pairs
                        .iter()
                        .map(|(original, _)| return original.to_string())
                        .collect::<Vec<String>>();
                    prop_assert_eq!(originals, expected);
                }
            }
        }
    }
}
