use thiserror::Error;

/// Rule violations found while checking operator-authored records.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A single value is malformed: a page id, a mode name, a layout header
    /// without the title placeholder.
    #[error("invalid record: {message}")]
    Validation { message: String },
    /// The values are individually fine but do not fit together, such as a
    /// layout whose header and footer leave tags open.
    #[error("record invariant violated: {message}")]
    Invariant { message: String },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        Self::Invariant {
            message: message.into(),
        }
    }
}
