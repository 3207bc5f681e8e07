use async_trait::async_trait;

use crate::application::repos::{ReferenceDataRepo, RepoError};
use crate::domain::entities::{LayoutRecord, ModeRecord, PageRecord};

use super::PostgresRepositories;

/// Foreign keys are `ON DELETE RESTRICT`, so deleting a referenced mode or
/// layout surfaces as a `23503` violation and maps to `RepoError::Integrity`.
#[async_trait]
impl ReferenceDataRepo for PostgresRepositories {
    async fn insert_mode_if_absent(&self, mode: &ModeRecord) -> Result<bool, RepoError> {
        self.insert_mode(mode).await
    }

    async fn insert_layout_if_absent(&self, layout: &LayoutRecord) -> Result<bool, RepoError> {
        self.insert_layout(layout).await
    }

    async fn insert_page_if_absent(&self, page: &PageRecord) -> Result<bool, RepoError> {
        self.insert_page(page).await
    }

    async fn replace_layout(&self, layout: &LayoutRecord) -> Result<(), RepoError> {
        self.overwrite_layout(layout).await
    }

    async fn delete_mode(&self, id: i32) -> Result<(), RepoError> {
        self.remove_mode(id).await
    }

    async fn delete_layout(&self, id: i32) -> Result<(), RepoError> {
        self.remove_layout(id).await
    }
}
