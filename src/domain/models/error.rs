use thiserror::Error;

use super::DocumentState;
use super::Transition;

/// Every failure a review can run into. Backend-origin variants carry the text
/// shown to the user, local variants never reach the backend.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ReviewError {
    #[error("Please upload a Word document (.docx)")]
    InvalidFormat { file_name: String },

    #[error("{0}")]
    ValidationFailure(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{detail}")]
    ServerError { status: u16, detail: String },

    #[error("Unable to reach the review backend: {0}")]
    NetworkFailure(String),

    #[error("{transition} is not allowed while the document is {from}")]
    IllegalTransition {
        from: DocumentState,
        transition: Transition,
    },
}

impl ReviewError {
    /// Local errors are resolved before any request is made.
    pub fn is_local(&self) -> bool {
        return matches!(
            self,
            ReviewError::InvalidFormat { .. }
                | ReviewError::ValidationFailure(_)
                | ReviewError::IllegalTransition { .. }
        );
    }
}
