use std::sync::Arc;

use async_trait::async_trait;

use super::Analysis;
use super::DocumentFile;
use super::Feedback;
use super::ReviewError;

pub type BackendBox = Arc<dyn ReviewBackend + Send + Sync>;

/// The analysis service a document is reviewed against. Implementations map
/// every transport failure to a `ReviewError` and never retry on their own.
#[async_trait]
pub trait ReviewBackend {
    /// Uploads a validated document and returns the id the backend assigned
    /// to it.
    async fn upload(&self, file: DocumentFile) -> Result<String, ReviewError>;

    /// Runs a fresh analysis. Every call is treated as a new request, no
    /// caching is assumed.
    async fn analyze(&self, document_id: &str) -> Result<Analysis, ReviewError>;

    /// Accepts all suggestions and returns the id of the clean document.
    async fn accept(&self, document_id: &str) -> Result<String, ReviewError>;

    async fn download(&self, clean_document_id: &str) -> Result<Vec<u8>, ReviewError>;

    async fn submit_feedback(&self, feedback: Feedback) -> Result<(), ReviewError>;
}
