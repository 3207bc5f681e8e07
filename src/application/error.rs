use std::error::Error as StdError;

use thiserror::Error;

use crate::{
    application::{render::RenderError, repos::RepoError},
    domain::error::DomainError,
    infra::error::InfraError,
};

/// Flattened error chain, outermost message first.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, error: &dyn StdError) -> Self {
        let mut messages = Vec::new();
        messages.push(error.to_string());
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self { source, messages }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    /// Process exit code, loosely following sysexits(3).
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Render(RenderError::PageNotFound { .. })
            | AppError::Repo(RepoError::NotFound) => 66,
            AppError::Domain(DomainError::Validation { .. })
            | AppError::Repo(RepoError::InvalidInput { .. })
            | AppError::Validation(_) => 65,
            AppError::Render(err) if err.is_retryable() => 75,
            AppError::Repo(RepoError::Timeout) => 75,
            AppError::Infra(InfraError::Configuration { .. }) => 78,
            AppError::Infra(InfraError::Database { .. }) => 69,
            _ => 70,
        }
    }

    pub fn presentation_message(&self) -> &'static str {
        match self {
            AppError::Render(RenderError::PageNotFound { .. })
            | AppError::Repo(RepoError::NotFound) => "Resource not found",
            AppError::Domain(DomainError::Validation { .. })
            | AppError::Repo(RepoError::InvalidInput { .. })
            | AppError::Validation(_) => "Request could not be processed",
            AppError::Render(err) if err.is_retryable() => "Storage temporarily unavailable",
            AppError::Render(_) => "Page could not be rendered",
            AppError::Infra(InfraError::Database { .. }) | AppError::Repo(_) => {
                "Storage temporarily unavailable"
            }
            AppError::Infra(InfraError::Configuration { .. }) => "Service misconfigured",
            AppError::Infra(InfraError::Telemetry(_)) => "Logging subsystem could not start",
            AppError::Infra(InfraError::Migration(_)) => "Schema migration failed",
            AppError::Infra(InfraError::Io(_)) => "I/O failure",
            AppError::Domain(DomainError::Invariant { .. }) | AppError::Unexpected(_) => {
                "Unexpected error occurred"
            }
        }
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport::from_error("application::error::AppError", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_page_maps_to_not_found() {
        let err = AppError::from(RenderError::PageNotFound {
            page_id: "nope".into(),
        });
        assert_eq!(err.exit_code(), 66);
        assert_eq!(err.presentation_message(), "Resource not found");
    }

    #[test]
    fn repository_outage_is_temporary() {
        let err = AppError::from(RenderError::repository_unavailable("pool timed out"));
        assert_eq!(err.exit_code(), 75);
        assert_eq!(err.presentation_message(), "Storage temporarily unavailable");
    }

    #[test]
    fn malformed_record_is_a_data_error() {
        let err = AppError::from(DomainError::validation("page id must not be empty"));
        assert_eq!(err.exit_code(), 65);
        assert_eq!(err.presentation_message(), "Request could not be processed");
    }

    #[test]
    fn report_flattens_the_chain() {
        let err = AppError::from(DomainError::invariant("layout 1 is unbalanced"));
        let report = err.report();
        assert_eq!(report.messages.len(), 1);
        assert!(report.messages[0].contains("layout 1 is unbalanced"));
    }
}
