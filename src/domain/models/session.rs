#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

use std::mem;

use strum::IntoEnumIterator;
use uuid::Uuid;

use super::Analysis;
use super::DocumentState;
use super::Intent;
use super::ReviewError;
use super::Suggestion;
use super::Transition;

/// Client side record of one submitted document. Every mutation goes through
/// a transition, so `state` always follows the lifecycle graph.
#[derive(Clone, Debug)]
pub struct DocumentSession {
    pub key: String,
    file_name: String,
    document_id: Option<String>,
    state: DocumentState,
    suggestions: Vec<Suggestion>,
    retained_suggestions: Option<Vec<Suggestion>>,
    redline_document_id: Option<String>,
    clean_document_id: Option<String>,
    last_error: Option<String>,
    request_seq: u64,
    download_in_flight: bool,
}

/// Read-only view handed to the presentation layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub key: String,
    pub file_name: String,
    pub document_id: Option<String>,
    pub state: DocumentState,
    pub suggestions: Vec<Suggestion>,
    pub retained_suggestions: Option<Vec<Suggestion>>,
    pub redline_document_id: Option<String>,
    pub clean_document_id: Option<String>,
    pub last_error: Option<String>,
    pub allowed_intents: Vec<Intent>,
}

impl SessionSnapshot {
    pub fn allows(&self, intent: Intent) -> bool {
        return self.allowed_intents.contains(&intent);
    }
}

impl Default for DocumentSession {
    fn default() -> DocumentSession {
        return DocumentSession::new("");
    }
}

impl DocumentSession {
    pub fn new(file_name: &str) -> DocumentSession {
        return DocumentSession {
            key: DocumentSession::create_key(),
            file_name: file_name.to_string(),
            document_id: None,
            state: DocumentState::Idle,
            suggestions: vec![],
            retained_suggestions: None,
            redline_document_id: None,
            clean_document_id: None,
            last_error: None,
            request_seq: 0,
            download_in_flight: false,
        };
    }

    pub fn create_key() -> String {
        return Uuid::new_v4()
            .to_string()
            .split('-')
            .take(2)
            .collect::<Vec<&str>>()
            .join("-");
    }

    pub fn file_name(&self) -> &str {
        return &self.file_name;
    }

    pub fn document_id(&self) -> Option<&str> {
        return self.document_id.as_deref();
    }

    pub fn state(&self) -> DocumentState {
        return self.state;
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        return &self.suggestions;
    }

    pub fn retained_suggestions(&self) -> Option<&[Suggestion]> {
        return self.retained_suggestions.as_deref();
    }

    pub fn clean_document_id(&self) -> Option<&str> {
        return self.clean_document_id.as_deref();
    }

    pub fn last_error(&self) -> Option<&str> {
        return self.last_error.as_deref();
    }

    pub fn request_seq(&self) -> u64 {
        return self.request_seq;
    }

    pub fn is_download_in_flight(&self) -> bool {
        return self.download_in_flight;
    }

    /// True when a reply tagged with `seq` answers the latest request.
    pub fn is_current(&self, seq: u64) -> bool {
        return seq == self.request_seq;
    }

    pub fn permits(&self, intent: Intent) -> bool {
        if self.state.next(intent.transition()).is_err() {
            return false;
        }

        match (self.state, intent) {
            (DocumentState::Failed, Intent::Accept | Intent::SubmitFeedback) => {
                return self.retained_suggestions.is_some() && self.document_id.is_some();
            }
            (_, Intent::RetryDownload) => {
                return self.clean_document_id.is_some() && !self.download_in_flight;
            }
            _ => return true,
        }
    }

    pub fn guard(&self, intent: Intent) -> Result<(), ReviewError> {
        if self.permits(intent) {
            return Ok(());
        }

        return Err(ReviewError::IllegalTransition {
            from: self.state,
            transition: intent.transition(),
        });
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        return SessionSnapshot {
            key: self.key.to_string(),
            file_name: self.file_name.to_string(),
            document_id: self.document_id.clone(),
            state: self.state,
            suggestions: self.suggestions.clone(),
            retained_suggestions: self.retained_suggestions.clone(),
            redline_document_id: self.redline_document_id.clone(),
            clean_document_id: self.clean_document_id.clone(),
            last_error: self.last_error.clone(),
            allowed_intents: Intent::iter()
                .filter(|intent| return self.permits(*intent))
                .collect(),
        };
    }

    /// Records a locally rejected intent without moving the state.
    pub fn reject(&mut self, err: &ReviewError) {
        self.last_error = Some(err.to_string());
    }

    pub fn submit(&mut self) -> Result<u64, ReviewError> {
        self.guard(Intent::Submit)?;
        self.advance(Transition::Submit)?;
        self.document_id = None;
        self.suggestions.clear();
        self.retained_suggestions = None;
        self.redline_document_id = None;
        self.clean_document_id = None;
        self.download_in_flight = false;
        self.last_error = None;

        return Ok(self.begin_request());
    }

    pub fn upload_succeeded(&mut self, document_id: &str) -> Result<u64, ReviewError> {
        self.advance(Transition::UploadSucceeded)?;
        self.document_id = Some(document_id.to_string());
        self.last_error = None;

        return Ok(self.begin_request());
    }

    pub fn upload_failed(&mut self, err: &ReviewError) -> Result<(), ReviewError> {
        self.advance(Transition::UploadFailed)?;
        self.last_error = Some(err.to_string());

        return Ok(());
    }

    pub fn analyze_succeeded(&mut self, analysis: Analysis) -> Result<(), ReviewError> {
        self.advance(Transition::AnalyzeSucceeded)?;
        self.suggestions = analysis.suggestions;
        self.redline_document_id = analysis.redline_document_id;
        self.last_error = None;

        return Ok(());
    }

    pub fn analyze_failed(&mut self, err: &ReviewError) -> Result<(), ReviewError> {
        self.advance(Transition::AnalyzeFailed)?;
        self.suggestions.clear();
        self.retained_suggestions = None;
        self.last_error = Some(err.to_string());

        return Ok(());
    }

    pub fn accept(&mut self) -> Result<u64, ReviewError> {
        self.guard(Intent::Accept)?;
        self.restore_retained();
        self.advance(Transition::Accept)?;
        self.last_error = None;

        return Ok(self.begin_request());
    }

    pub fn accept_succeeded(&mut self, clean_document_id: &str) -> Result<u64, ReviewError> {
        self.advance(Transition::AcceptSucceeded)?;
        self.clean_document_id = Some(clean_document_id.to_string());
        self.suggestions.clear();
        self.download_in_flight = true;
        self.last_error = None;

        return Ok(self.begin_request());
    }

    /// Accepting failed, but the document itself is unaffected. The reviewed
    /// suggestions are kept aside so accept or feedback can be retried.
    pub fn accept_failed(&mut self, err: &ReviewError) -> Result<(), ReviewError> {
        self.advance(Transition::AcceptFailed)?;
        self.retained_suggestions = Some(mem::take(&mut self.suggestions));
        self.last_error = Some(err.to_string());

        return Ok(());
    }

    pub fn submit_feedback(&mut self) -> Result<u64, ReviewError> {
        self.guard(Intent::SubmitFeedback)?;
        self.restore_retained();
        self.advance(Transition::SubmitFeedback)?;
        self.last_error = None;

        return Ok(self.begin_request());
    }

    /// The backend took the feedback. The old suggestions are dropped here so
    /// they can never mix with the next analysis.
    pub fn feedback_acknowledged(&mut self) -> Result<u64, ReviewError> {
        self.advance(Transition::FeedbackAcknowledged)?;
        self.suggestions.clear();
        self.last_error = None;

        return Ok(self.begin_request());
    }

    pub fn feedback_failed(&mut self, err: &ReviewError) -> Result<(), ReviewError> {
        self.advance(Transition::FeedbackFailed)?;
        self.last_error = Some(err.to_string());

        return Ok(());
    }

    pub fn retry_download(&mut self) -> Result<u64, ReviewError> {
        self.guard(Intent::RetryDownload)?;
        self.advance(Transition::RetryDownload)?;
        self.download_in_flight = true;
        self.last_error = None;

        return Ok(self.begin_request());
    }

    /// Leaves the current document behind. The session comes back as a fresh
    /// Idle one under a new key, so replies still on their way for the old key
    /// no longer match.
    pub fn navigate_back(&mut self) -> Result<(), ReviewError> {
        self.guard(Intent::NavigateBack)?;
        self.advance(Transition::NavigateBack)?;
        *self = DocumentSession::default();

        return Ok(());
    }

    pub fn download_finished(&mut self, err: Option<&ReviewError>) -> Result<(), ReviewError> {
        self.advance(Transition::DownloadFinished)?;
        self.download_in_flight = false;
        self.last_error = err.map(|e| return e.to_string());

        return Ok(());
    }

    fn advance(&mut self, transition: Transition) -> Result<DocumentState, ReviewError> {
        let next = self.state.next(transition)?;
        tracing::debug!(
            session = %self.key,
            from = %self.state,
            to = %next,
            transition = %transition,
            "transition"
        );
        self.state = next;

        return Ok(next);
    }

    fn restore_retained(&mut self) {
        if let Some(retained) = self.retained_suggestions.take() {
            self.suggestions = retained;
        }
    }

    fn begin_request(&mut self) -> u64 {
        self.request_seq += 1;
        return self.request_seq;
    }
}
