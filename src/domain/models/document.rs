#[cfg(test)]
#[path = "document_test.rs"]
mod tests;

use std::fmt;

use super::ReviewError;

pub const DOCUMENT_EXTENSION: &str = ".docx";
pub const DOCUMENT_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const CLEAN_DOCUMENT_FILE_NAME: &str = "clean_nda.docx";

/// A file that passed the local format check and may be uploaded.
#[derive(Clone, PartialEq, Eq)]
pub struct DocumentFile {
    file_name: String,
    bytes: Vec<u8>,
}

impl DocumentFile {
    pub fn new(file_name: &str, bytes: Vec<u8>) -> Result<DocumentFile, ReviewError> {
        if !has_document_extension(file_name) {
            return Err(ReviewError::InvalidFormat {
                file_name: file_name.to_string(),
            });
        }

        return Ok(DocumentFile {
            file_name: file_name.to_string(),
            bytes,
        });
    }

    pub fn file_name(&self) -> &str {
        return &self.file_name;
    }

    pub fn into_bytes(self) -> Vec<u8> {
        return self.bytes;
    }
}

// Skip the payload, a contract can be megabytes long.
impl fmt::Debug for DocumentFile {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        return f
            .debug_struct("DocumentFile")
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish();
    }
}

fn has_document_extension(file_name: &str) -> bool {
    let lower = file_name.to_lowercase();
    return lower.len() > DOCUMENT_EXTENSION.len() && lower.ends_with(DOCUMENT_EXTENSION);
}

/// The accepted document, handed to the presentation layer as an opaque blob.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CleanDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl CleanDocument {
    pub fn new(bytes: Vec<u8>) -> CleanDocument {
        return CleanDocument {
            file_name: CLEAN_DOCUMENT_FILE_NAME.to_string(),
            bytes,
        };
    }
}
