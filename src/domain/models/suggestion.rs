#[cfg(test)]
#[path = "suggestion_test.rs"]
mod tests;

use serde_derive::Deserialize;

use super::ReviewError;

/// A proposed replacement for a span of the submitted document. Suggestions
/// have no identity beyond their position in an analysis.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Suggestion {
    pub original: String,
    pub suggestion: String,
}

impl Suggestion {
    pub fn new(original: &str, suggestion: &str) -> Suggestion {
        return Suggestion {
            original: original.to_string(),
            suggestion: suggestion.to_string(),
        };
    }
}

/// The result of one analysis run. Extra fields in the backend reply are
/// ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Analysis {
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
    #[serde(default)]
    pub redline_document_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Feedback {
    pub document_id: String,
    pub text: String,
}

impl Feedback {
    pub fn new(document_id: &str, text: &str) -> Result<Feedback, ReviewError> {
        if text.trim().is_empty() {
            return Err(ReviewError::ValidationFailure(
                "Feedback must not be empty".to_string(),
            ));
        }

        return Ok(Feedback {
            document_id: document_id.to_string(),
            text: text.to_string(),
        });
    }
}
