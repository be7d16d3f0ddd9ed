use super::Analysis;
use super::ReviewError;

/// Inputs to the controller worker. User intents come from the presentation
/// layer, replies come back from spawned backend requests.
#[derive(Debug)]
pub enum Action {
    Submit(String, Vec<u8>),
    Accept(),
    SubmitFeedback(String),
    NavigateBack(),
    RetryDownload(),
    BackendReply(TaggedReply),
}

/// A backend reply stamped with the session and request that produced it.
#[derive(Debug)]
pub struct TaggedReply {
    pub session_key: String,
    pub seq: u64,
    pub reply: Reply,
}

#[derive(Debug)]
pub enum Reply {
    Uploaded(Result<String, ReviewError>),
    Analyzed(Result<Analysis, ReviewError>),
    Accepted(Result<String, ReviewError>),
    Downloaded(Result<Vec<u8>, ReviewError>),
    FeedbackAcknowledged(Result<(), ReviewError>),
}
