#[cfg(test)]
#[path = "http_test.rs"]
mod tests;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart;
use reqwest::RequestBuilder;
use reqwest::Response;
use reqwest::StatusCode;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_derive::Deserialize;
use serde_derive::Serialize;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Analysis;
use crate::domain::models::DocumentFile;
use crate::domain::models::Feedback;
use crate::domain::models::ReviewBackend;
use crate::domain::models::ReviewError;
use crate::domain::models::DOCUMENT_MIME_TYPE;

const DEFAULT_TIMEOUT_MS: u64 = 30000;

#[derive(Default, Debug, Clone, PartialEq, Eq, Deserialize)]
struct UploadResponse {
    document_id: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Deserialize)]
struct AcceptResponse {
    clean_document_id: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize)]
struct FeedbackRequest {
    document_id: String,
    feedback_text: String,
}

#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
struct ErrorResponse {
    detail: Option<serde_json::Value>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
enum Operation {
    Upload,
    Analyze,
    Accept,
    Download,
    Feedback,
}

impl Operation {
    fn generic_error(&self) -> &'static str {
        match self {
            Operation::Upload => return "An error occurred while uploading the document",
            Operation::Analyze => return "An error occurred while analyzing the document",
            Operation::Accept => return "An error occurred while accepting suggestions",
            Operation::Download => return "An error occurred while downloading the document",
            Operation::Feedback => return "An error occurred while submitting feedback",
        }
    }

    fn targets_document(&self) -> bool {
        return matches!(
            self,
            Operation::Analyze | Operation::Accept | Operation::Download
        );
    }
}

fn network_failure(operation: Operation, err: reqwest::Error) -> ReviewError {
    tracing::error!(%operation, error = ?err, "Request to review backend failed");
    if err.is_timeout() {
        return ReviewError::NetworkFailure(format!("{operation} request timed out"));
    }

    return ReviewError::NetworkFailure(err.to_string());
}

/// Picks the human readable `detail` out of an error body, falling back to a
/// per operation message.
fn error_detail(operation: Operation, body: &str) -> String {
    if let Ok(ErrorResponse {
        detail: Some(serde_json::Value::String(detail)),
    }) = serde_json::from_str::<ErrorResponse>(body)
    {
        if !detail.trim().is_empty() {
            return detail;
        }
    }

    return operation.generic_error().to_string();
}

/// Client for the document analysis service.
pub struct HttpBackend {
    url: String,
    timeout: Duration,
}

impl Default for HttpBackend {
    fn default() -> HttpBackend {
        let timeout = Config::get(ConfigKey::BackendTimeout)
            .parse::<u64>()
            .unwrap_or(DEFAULT_TIMEOUT_MS);

        return HttpBackend::new(&Config::get(ConfigKey::BackendURL), timeout);
    }
}

impl HttpBackend {
    pub fn new(url: &str, timeout_ms: u64) -> HttpBackend {
        return HttpBackend {
            url: url.trim_end_matches('/').to_string(),
            timeout: Duration::from_millis(timeout_ms),
        };
    }

    /// Appends `segments` to the backend url. Each segment is percent-encoded,
    /// so an id containing `/` or `?` stays a single segment.
    fn endpoint(&self, operation: Operation, segments: &[&str]) -> Result<Url, ReviewError> {
        let invalid_url = || {
            tracing::error!(%operation, url = %self.url, "Invalid review backend url");
            return ReviewError::NetworkFailure(format!("Invalid backend url {}", self.url));
        };

        let mut url = Url::parse(&self.url).map_err(|_| return invalid_url())?;
        url.path_segments_mut()
            .map_err(|_| return invalid_url())?
            .pop_if_empty()
            .extend(segments);

        return Ok(url);
    }

    async fn send(
        &self,
        operation: Operation,
        req: RequestBuilder,
    ) -> Result<Response, ReviewError> {
        let res = req
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| return network_failure(operation, err))?;

        let status = res.status();
        tracing::debug!(%operation, status = status.as_u16(), "Review backend responded");
        if status.is_success() {
            return Ok(res);
        }

        let body = res.text().await.unwrap_or_default();
        let detail = error_detail(operation, &body);
        tracing::error!(%operation, status = status.as_u16(), detail = %detail, "Review backend returned an error");

        if status == StatusCode::NOT_FOUND && operation.targets_document() {
            return Err(ReviewError::NotFound(detail));
        }

        return Err(ReviewError::ServerError {
            status: status.as_u16(),
            detail,
        });
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        operation: Operation,
        req: RequestBuilder,
    ) -> Result<T, ReviewError> {
        let res = self.send(operation, req).await?;
        let status = res.status().as_u16();

        return res.json::<T>().await.map_err(|err| {
            tracing::error!(%operation, error = ?err, "Unexpected response from review backend");
            return ReviewError::ServerError {
                status,
                detail: "Unexpected response from backend".to_string(),
            };
        });
    }
}

#[async_trait]
impl ReviewBackend for HttpBackend {
    #[allow(clippy::implicit_return)]
    async fn upload(&self, file: DocumentFile) -> Result<String, ReviewError> {
        let file_name = file.file_name().to_string();
        let part = multipart::Part::bytes(file.into_bytes())
            .file_name(file_name)
            .mime_str(DOCUMENT_MIME_TYPE)
            .map_err(|err| return network_failure(Operation::Upload, err))?;
        let form = multipart::Form::new().part("file", part);

        let req = reqwest::Client::new()
            .post(self.endpoint(Operation::Upload, &["upload"])?)
            .multipart(form);
        let res = self
            .send_json::<UploadResponse>(Operation::Upload, req)
            .await?;

        return Ok(res.document_id);
    }

    #[allow(clippy::implicit_return)]
    async fn analyze(&self, document_id: &str) -> Result<Analysis, ReviewError> {
        let url = self.endpoint(Operation::Analyze, &["analyze", document_id])?;
        let req = reqwest::Client::new().post(url);
        let analysis = self.send_json::<Analysis>(Operation::Analyze, req).await?;
        tracing::debug!(
            document_id,
            suggestions = analysis.suggestions.len(),
            "Analysis finished"
        );

        return Ok(analysis);
    }

    #[allow(clippy::implicit_return)]
    async fn accept(&self, document_id: &str) -> Result<String, ReviewError> {
        let url = self.endpoint(Operation::Accept, &["accept", document_id])?;
        let req = reqwest::Client::new().post(url);
        let res = self
            .send_json::<AcceptResponse>(Operation::Accept, req)
            .await?;

        return Ok(res.clean_document_id);
    }

    #[allow(clippy::implicit_return)]
    async fn download(&self, clean_document_id: &str) -> Result<Vec<u8>, ReviewError> {
        let url = self.endpoint(Operation::Download, &["download", clean_document_id])?;
        let req = reqwest::Client::new().get(url);
        let res = self.send(Operation::Download, req).await?;
        let bytes = res
            .bytes()
            .await
            .map_err(|err| return network_failure(Operation::Download, err))?;

        return Ok(bytes.to_vec());
    }

    #[allow(clippy::implicit_return)]
    async fn submit_feedback(&self, feedback: Feedback) -> Result<(), ReviewError> {
        let body = FeedbackRequest {
            document_id: feedback.document_id,
            feedback_text: feedback.text,
        };

        let req = reqwest::Client::new()
            .post(self.endpoint(Operation::Feedback, &["feedback"])?)
            .json(&body);
        self.send(Operation::Feedback, req).await?;

        return Ok(());
    }
}
