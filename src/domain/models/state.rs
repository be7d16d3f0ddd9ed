#[cfg(test)]
#[path = "state_test.rs"]
mod tests;

use strum::EnumIter;

use super::ReviewError;
use super::Transition;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, EnumIter, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum DocumentState {
    #[default]
    Idle,
    Uploading,
    Analyzing,
    Reviewing,
    Accepting,
    Accepted,
    SubmittingFeedback,
    Failed,
}

impl DocumentState {
    /// The transition table. Anything not listed is an illegal transition and
    /// leaves the state untouched.
    pub fn next(self, transition: Transition) -> Result<DocumentState, ReviewError> {
        let next = match (self, transition) {
            (DocumentState::Idle | DocumentState::Failed, Transition::Submit) => {
                DocumentState::Uploading
            }
            (DocumentState::Uploading, Transition::UploadSucceeded) => DocumentState::Analyzing,
            (DocumentState::Uploading, Transition::UploadFailed) => DocumentState::Failed,
            (DocumentState::Analyzing, Transition::AnalyzeSucceeded) => DocumentState::Reviewing,
            (DocumentState::Analyzing, Transition::AnalyzeFailed) => DocumentState::Failed,
            (DocumentState::Reviewing | DocumentState::Failed, Transition::Accept) => {
                DocumentState::Accepting
            }
            (DocumentState::Accepting, Transition::AcceptSucceeded) => DocumentState::Accepted,
            (DocumentState::Accepting, Transition::AcceptFailed) => DocumentState::Failed,
            (DocumentState::Accepted, Transition::RetryDownload | Transition::DownloadFinished) => {
                DocumentState::Accepted
            }
            (DocumentState::Reviewing | DocumentState::Failed, Transition::SubmitFeedback) => {
                DocumentState::SubmittingFeedback
            }
            (DocumentState::SubmittingFeedback, Transition::FeedbackAcknowledged) => {
                DocumentState::Analyzing
            }
            (DocumentState::SubmittingFeedback, Transition::FeedbackFailed) => {
                DocumentState::Reviewing
            }
            (state, Transition::NavigateBack) if state != DocumentState::Idle => {
                DocumentState::Idle
            }
            (from, transition) => {
                return Err(ReviewError::IllegalTransition { from, transition });
            }
        };

        return Ok(next);
    }

    /// A request to the backend is outstanding while in one of these states.
    pub fn is_in_flight(&self) -> bool {
        return matches!(
            self,
            DocumentState::Uploading
                | DocumentState::Analyzing
                | DocumentState::Accepting
                | DocumentState::SubmittingFeedback
        );
    }

    /// States in which the current suggestion sequence is visible.
    pub fn holds_suggestions(&self) -> bool {
        return matches!(
            self,
            DocumentState::Reviewing | DocumentState::Accepting | DocumentState::SubmittingFeedback
        );
    }
}
