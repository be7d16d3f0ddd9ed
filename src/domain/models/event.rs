use super::CleanDocument;
use super::SessionSnapshot;

pub enum Event {
    SessionUpdated(SessionSnapshot),
    DocumentReady(CleanDocument),
    DownloadFailed(String),
}
