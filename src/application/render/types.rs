use thiserror::Error;
use time::OffsetDateTime;

/// Final output of a page render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub body: String,
    /// The page's `updated_at`, usable as `Last-Modified` or an ETag seed.
    pub last_modified: OffsetDateTime,
}

/// Structured errors surfaced by the render core.
///
/// Every variant aborts the single render it came from; no partial document
/// is ever returned. The type is `Clone` because coalesced cache waiters each
/// receive the same outcome.
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error("page `{page_id}` not found")]
    PageNotFound { page_id: String },
    #[error("mode {mode_id} (`{name}`) has no registered transformer")]
    UnknownMode { mode_id: i32, name: String },
    #[error("page `{page_id}` references missing mode {mode_id}")]
    BrokenModeReference { page_id: String, mode_id: i32 },
    #[error("page `{page_id}` references missing layout {layout_id}")]
    BrokenLayoutReference { page_id: String, layout_id: i32 },
    #[error("repository unavailable: {message}")]
    RepositoryUnavailable { message: String },
    #[error("content transformation failed for mode `{mode}`: {message}")]
    Transform { mode: String, message: String },
    #[error("render task aborted: {message}")]
    Aborted { message: String },
}

impl RenderError {
    pub fn repository_unavailable(message: impl Into<String>) -> Self {
        Self::RepositoryUnavailable {
            message: message.into(),
        }
    }

    pub fn aborted(message: impl Into<String>) -> Self {
        Self::Aborted {
            message: message.into(),
        }
    }

    /// HTTP-equivalent status a caller should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            RenderError::PageNotFound { .. } => 404,
            RenderError::RepositoryUnavailable { .. } => 503,
            RenderError::UnknownMode { .. }
            | RenderError::BrokenModeReference { .. }
            | RenderError::BrokenLayoutReference { .. }
            | RenderError::Transform { .. }
            | RenderError::Aborted { .. } => 500,
        }
    }

    /// Transient infrastructure faults the caller may retry with backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RenderError::RepositoryUnavailable { .. })
    }

    /// Faults caused by inconsistent stored records rather than the request.
    pub fn is_integrity_fault(&self) -> bool {
        matches!(
            self,
            RenderError::UnknownMode { .. }
                | RenderError::BrokenModeReference { .. }
                | RenderError::BrokenLayoutReference { .. }
        )
    }
}
