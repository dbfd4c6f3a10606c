use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("input is not well-formed XML (byte {position}): {message}")]
    MalformedInput { position: u64, message: String },

    #[error("{element} element is missing required attribute '{attribute}'")]
    SchemaMismatch {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("failed to serialize transcoded document: {message}")]
    Serialize { message: String },
}

impl TranscodeError {
    pub(crate) fn malformed(position: u64, message: impl Into<String>) -> Self {
        TranscodeError::MalformedInput {
            position,
            message: message.into(),
        }
    }

    pub fn is_malformed_input(&self) -> bool {
        matches!(self, TranscodeError::MalformedInput { .. })
    }

    pub fn is_schema_mismatch(&self) -> bool {
        matches!(self, TranscodeError::SchemaMismatch { .. })
    }
}

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("ZIP operation failed: {0}")]
    Zip(#[from] ::zip::result::ZipError),
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),
}
