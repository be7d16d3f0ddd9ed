use anyhow::Result;
use test_utils::analysis_fixture;

use super::Analysis;
use super::Feedback;
use super::Suggestion;
use crate::domain::models::ReviewError;

#[test]
fn it_parses_analysis_in_backend_order() -> Result<()> {
    let analysis: Analysis = serde_json::from_str(analysis_fixture())?;

    assert_eq!(
        analysis.suggestions,
        vec![
            Suggestion::new("Term: 1 year", "Term: 2 years"),
            Suggestion::new("Governing law: NY", "Governing law: CH"),
        ]
    );
    assert_eq!(analysis.redline_document_id, Some("r1".to_string()));

    return Ok(());
}

#[test]
fn it_parses_analysis_without_suggestions() -> Result<()> {
    let analysis: Analysis = serde_json::from_str(r#"{"redline_document_id": "r2"}"#)?;

    assert!(analysis.suggestions.is_empty());
    assert_eq!(analysis.redline_document_id, Some("r2".to_string()));

    return Ok(());
}

#[test]
fn it_creates_feedback() -> Result<()> {
    let feedback = Feedback::new("d1", "Clause 3 is wrong")?;

    assert_eq!(feedback.document_id, "d1");
    assert_eq!(feedback.text, "Clause 3 is wrong");

    return Ok(());
}

#[test]
fn it_rejects_blank_feedback() {
    for text in ["", "   ", "\n\t "] {
        let res = Feedback::new("d1", text);
        assert_eq!(
            res,
            Err(ReviewError::ValidationFailure(
                "Feedback must not be empty".to_string()
            ))
        );
    }
}
