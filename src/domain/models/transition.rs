use strum::EnumIter;

/// Everything that can move a document between states. The first group are
/// user intents, the second are backend outcomes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Transition {
    Submit,
    Accept,
    SubmitFeedback,
    NavigateBack,
    RetryDownload,

    UploadSucceeded,
    UploadFailed,
    AnalyzeSucceeded,
    AnalyzeFailed,
    AcceptSucceeded,
    AcceptFailed,
    FeedbackAcknowledged,
    FeedbackFailed,
    DownloadFinished,
}

/// User intents forwarded by the presentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Intent {
    Submit,
    Accept,
    SubmitFeedback,
    NavigateBack,
    RetryDownload,
}

impl Intent {
    pub fn transition(&self) -> Transition {
        match self {
            Intent::Submit => return Transition::Submit,
            Intent::Accept => return Transition::Accept,
            Intent::SubmitFeedback => return Transition::SubmitFeedback,
            Intent::NavigateBack => return Transition::NavigateBack,
            Intent::RetryDownload => return Transition::RetryDownload,
        }
    }
}
