#[cfg(test)]
#[path = "controller_test.rs"]
mod tests;

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::domain::models::Action;
use crate::domain::models::BackendBox;
use crate::domain::models::CleanDocument;
use crate::domain::models::DocumentFile;
use crate::domain::models::DocumentSession;
use crate::domain::models::Event;
use crate::domain::models::Feedback;
use crate::domain::models::Intent;
use crate::domain::models::Reply;
use crate::domain::models::ReviewError;
use crate::domain::models::TaggedReply;

enum Request {
    Upload(DocumentFile),
    Analyze(String),
    Accept(String),
    Download(String),
    Feedback(Feedback),
}

/// Owns the live document session and is the only thing allowed to move it
/// between states. Backend calls run on spawned tasks and report back through
/// `replies`, so every transition is applied from a single place.
pub struct LifecycleController {
    backend: BackendBox,
    session: DocumentSession,
    events: mpsc::UnboundedSender<Event>,
    replies: mpsc::UnboundedSender<Action>,
    workers: Vec<JoinHandle<()>>,
}

impl LifecycleController {
    pub fn new(
        backend: BackendBox,
        events: mpsc::UnboundedSender<Event>,
        replies: mpsc::UnboundedSender<Action>,
    ) -> LifecycleController {
        return LifecycleController {
            backend,
            session: DocumentSession::default(),
            events,
            replies,
            workers: vec![],
        };
    }

    pub fn session(&self) -> &DocumentSession {
        return &self.session;
    }

    pub fn handle(&mut self, action: Action) -> Result<(), ReviewError> {
        match action {
            Action::Submit(file_name, bytes) => return self.submit(&file_name, bytes),
            Action::Accept() => return self.accept(),
            Action::SubmitFeedback(text) => return self.submit_feedback(&text),
            Action::NavigateBack() => return self.navigate_back(),
            Action::RetryDownload() => return self.retry_download(),
            Action::BackendReply(reply) => return self.receive(reply),
        }
    }

    /// Starts a brand new session for the file. The previous session, and any
    /// request still running for it, is dropped.
    pub fn submit(&mut self, file_name: &str, bytes: Vec<u8>) -> Result<(), ReviewError> {
        self.session.guard(Intent::Submit)?;

        let file = match DocumentFile::new(file_name, bytes) {
            Ok(file) => file,
            Err(err) => {
                self.session.reject(&err);
                self.publish();
                return Err(err);
            }
        };

        let mut session = DocumentSession::new(file_name);
        let seq = session.submit()?;
        self.replace_session(session);
        self.dispatch(seq, Request::Upload(file));
        self.publish();

        return Ok(());
    }

    pub fn accept(&mut self) -> Result<(), ReviewError> {
        self.session.guard(Intent::Accept)?;
        let document_id = self.current_document_id()?;
        let seq = self.session.accept()?;
        self.dispatch(seq, Request::Accept(document_id));
        self.publish();

        return Ok(());
    }

    pub fn submit_feedback(&mut self, text: &str) -> Result<(), ReviewError> {
        self.session.guard(Intent::SubmitFeedback)?;
        let document_id = self.current_document_id()?;

        let feedback = match Feedback::new(&document_id, text) {
            Ok(feedback) => feedback,
            Err(err) => {
                self.session.reject(&err);
                self.publish();
                return Err(err);
            }
        };

        let seq = self.session.submit_feedback()?;
        self.dispatch(seq, Request::Feedback(feedback));
        self.publish();

        return Ok(());
    }

    /// Leaves the review flow. Replies still on their way for the old session
    /// are ignored when they arrive.
    pub fn navigate_back(&mut self) -> Result<(), ReviewError> {
        let previous = self.session.key.to_string();
        self.session.navigate_back()?;
        self.cancel_workers();
        tracing::info!(previous = %previous, session = %self.session.key, "Left the session");
        self.publish();

        return Ok(());
    }

    pub fn retry_download(&mut self) -> Result<(), ReviewError> {
        self.session.guard(Intent::RetryDownload)?;
        let clean_document_id = match self.session.clean_document_id() {
            Some(id) => id.to_string(),
            None => {
                return Err(ReviewError::IllegalTransition {
                    from: self.session.state(),
                    transition: Intent::RetryDownload.transition(),
                })
            }
        };

        let seq = self.session.retry_download()?;
        self.dispatch(seq, Request::Download(clean_document_id));
        self.publish();

        return Ok(());
    }

    /// Applies a backend reply. Replies for another session or for a
    /// superseded request are dropped without touching any state.
    pub fn receive(&mut self, tagged: TaggedReply) -> Result<(), ReviewError> {
        if tagged.session_key != self.session.key {
            tracing::debug!(
                session = %tagged.session_key,
                seq = tagged.seq,
                "Dropping reply for a cancelled session"
            );
            return Ok(());
        }

        if !self.session.is_current(tagged.seq) {
            tracing::debug!(
                session = %tagged.session_key,
                seq = tagged.seq,
                current = self.session.request_seq(),
                "Dropping stale reply"
            );
            return Ok(());
        }

        match tagged.reply {
            Reply::Uploaded(Ok(document_id)) => {
                let seq = self.session.upload_succeeded(&document_id)?;
                self.dispatch(seq, Request::Analyze(document_id));
            }
            Reply::Uploaded(Err(err)) => {
                self.session.upload_failed(&err)?;
            }
            Reply::Analyzed(Ok(analysis)) => {
                self.session.analyze_succeeded(analysis)?;
            }
            Reply::Analyzed(Err(err)) => {
                self.session.analyze_failed(&err)?;
            }
            Reply::Accepted(Ok(clean_document_id)) => {
                let seq = self.session.accept_succeeded(&clean_document_id)?;
                self.dispatch(seq, Request::Download(clean_document_id));
            }
            Reply::Accepted(Err(err)) => {
                self.session.accept_failed(&err)?;
            }
            Reply::Downloaded(Ok(bytes)) => {
                self.session.download_finished(None)?;
                self.emit(Event::DocumentReady(CleanDocument::new(bytes)));
            }
            Reply::Downloaded(Err(err)) => {
                self.session.download_finished(Some(&err))?;
                self.emit(Event::DownloadFailed(format!(
                    "Download failed, retry download. {err}"
                )));
            }
            Reply::FeedbackAcknowledged(Ok(())) => {
                let document_id = self.current_document_id()?;
                let seq = self.session.feedback_acknowledged()?;
                self.dispatch(seq, Request::Analyze(document_id));
            }
            Reply::FeedbackAcknowledged(Err(err)) => {
                self.session.feedback_failed(&err)?;
            }
        }

        self.publish();
        return Ok(());
    }

    pub fn publish(&self) {
        self.emit(Event::SessionUpdated(self.session.snapshot()));
    }

    fn emit(&self, event: Event) {
        if self.events.send(event).is_err() {
            tracing::debug!(session = %self.session.key, "No one is listening for events");
        }
    }

    fn current_document_id(&self) -> Result<String, ReviewError> {
        if let Some(document_id) = self.session.document_id() {
            return Ok(document_id.to_string());
        }

        return Err(ReviewError::ValidationFailure(
            "The document has not been uploaded yet".to_string(),
        ));
    }

    fn cancel_workers(&mut self) {
        for worker in self.workers.drain(..) {
            worker.abort();
        }
    }

    fn replace_session(&mut self, session: DocumentSession) {
        self.cancel_workers();

        tracing::info!(
            previous = %self.session.key,
            session = %session.key,
            "Starting a new session"
        );
        self.session = session;
    }

    fn dispatch(&mut self, seq: u64, request: Request) {
        self.workers.retain(|worker| return !worker.is_finished());

        let backend = Arc::clone(&self.backend);
        let replies = self.replies.clone();
        let session_key = self.session.key.to_string();

        let worker = tokio::spawn(async move {
            let reply = match request {
                Request::Upload(file) => Reply::Uploaded(backend.upload(file).await),
                Request::Analyze(document_id) => {
                    Reply::Analyzed(backend.analyze(&document_id).await)
                }
                Request::Accept(document_id) => Reply::Accepted(backend.accept(&document_id).await),
                Request::Download(clean_document_id) => {
                    Reply::Downloaded(backend.download(&clean_document_id).await)
                }
                Request::Feedback(feedback) => {
                    Reply::FeedbackAcknowledged(backend.submit_feedback(feedback).await)
                }
            };

            let tagged = TaggedReply {
                session_key,
                seq,
                reply,
            };
            if replies.send(Action::BackendReply(tagged)).is_err() {
                tracing::debug!(seq, "Controller stopped before the reply arrived");
            }
        });

        self.workers.push(worker);
    }
}

pub struct ControllerService {}

impl ControllerService {
    pub async fn start(
        backend: BackendBox,
        tx: mpsc::UnboundedSender<Event>,
        action_tx: mpsc::UnboundedSender<Action>,
        rx: &mut mpsc::UnboundedReceiver<Action>,
    ) -> Result<()> {
        let mut controller = LifecycleController::new(backend, tx, action_tx);
        controller.publish();

        while let Some(action) = rx.recv().await {
            match controller.handle(action) {
                Ok(()) => {}
                Err(err @ ReviewError::IllegalTransition { .. }) => {
                    tracing::warn!(error = %err, "Ignored intent");
                }
                Err(err) if err.is_local() => {
                    tracing::debug!(error = %err, "Rejected intent");
                }
                Err(err) => {
                    tracing::error!(error = %err, "Failed to apply action");
                }
            }
        }

        return Ok(());
    }
}
