//! Repository traits describing persistence adapters.
//!
//! The render core only needs the read side (`ModesRepo`, `LayoutsRepo`,
//! `PagesRepo`). Authoring and provisioning go through the write traits.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::{LayoutRecord, ModeRecord, PageRecord};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }

    pub fn integrity(message: impl Into<String>) -> Self {
        Self::Integrity {
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait ModesRepo: Send + Sync {
    async fn find_mode_by_id(&self, id: i32) -> Result<Option<ModeRecord>, RepoError>;

    async fn list_modes(&self) -> Result<Vec<ModeRecord>, RepoError>;
}

#[async_trait]
pub trait LayoutsRepo: Send + Sync {
    async fn find_layout_by_id(&self, id: i32) -> Result<Option<LayoutRecord>, RepoError>;

    async fn list_layouts(&self) -> Result<Vec<LayoutRecord>, RepoError>;
}

#[async_trait]
pub trait PagesRepo: Send + Sync {
    async fn find_page_by_id(&self, id: &str) -> Result<Option<PageRecord>, RepoError>;

    async fn list_page_ids(&self) -> Result<Vec<String>, RepoError>;
}

#[derive(Debug, Clone)]
pub struct CreatePageParams {
    pub id: String,
    pub mode_id: i32,
    pub layout_id: i32,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct UpdatePageParams {
    pub id: String,
    pub mode_id: i32,
    pub layout_id: i32,
    pub title: String,
    pub content: String,
}

/// Authoring operations. Every successful mutation leaves `updated_at`
/// strictly greater than before.
#[async_trait]
pub trait PagesWriteRepo: Send + Sync {
    async fn create_page(&self, params: CreatePageParams) -> Result<PageRecord, RepoError>;

    async fn update_page(&self, params: UpdatePageParams) -> Result<PageRecord, RepoError>;

    async fn delete_page(&self, id: &str) -> Result<(), RepoError>;
}

/// Provisioning operations for modes, layouts and seeded pages.
///
/// The `*_if_absent` methods return `true` when a record was written and
/// `false` when one with the same id already existed.
#[async_trait]
pub trait ReferenceDataRepo: Send + Sync {
    async fn insert_mode_if_absent(&self, mode: &ModeRecord) -> Result<bool, RepoError>;

    async fn insert_layout_if_absent(&self, layout: &LayoutRecord) -> Result<bool, RepoError>;

    async fn insert_page_if_absent(&self, page: &PageRecord) -> Result<bool, RepoError>;

    /// Overwrite an existing layout's header and footer.
    ///
    /// Page `updated_at` values do not move, so a running
    /// [`RenderCache`](crate::cache::RenderCache) keeps serving documents
    /// composed with the old layout until `invalidate_all` is called.
    async fn replace_layout(&self, layout: &LayoutRecord) -> Result<(), RepoError>;

    /// Fails with [`RepoError::Integrity`] while any page references the mode.
    async fn delete_mode(&self, id: i32) -> Result<(), RepoError>;

    /// Fails with [`RepoError::Integrity`] while any page references the layout.
    async fn delete_layout(&self, id: i32) -> Result<(), RepoError>;
}
