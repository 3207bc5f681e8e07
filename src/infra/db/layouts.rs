use async_trait::async_trait;

use crate::application::repos::{LayoutsRepo, RepoError};
use crate::domain::entities::LayoutRecord;

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct LayoutRow {
    id: i32,
    header: String,
    footer: String,
}

impl From<LayoutRow> for LayoutRecord {
    fn from(row: LayoutRow) -> Self {
        Self {
            id: row.id,
            header: row.header,
            footer: row.footer,
        }
    }
}

impl PostgresRepositories {
    pub(super) async fn insert_layout(&self, layout: &LayoutRecord) -> Result<bool, RepoError> {
        let result = sqlx::query(
            r#"
            INSERT INTO layouts (id, header, footer)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(layout.id)
        .bind(&layout.header)
        .bind(&layout.footer)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() == 1)
    }

    pub(super) async fn overwrite_layout(&self, layout: &LayoutRecord) -> Result<(), RepoError> {
        let result = sqlx::query("UPDATE layouts SET header = $2, footer = $3 WHERE id = $1")
            .bind(layout.id)
            .bind(&layout.header)
            .bind(&layout.footer)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    pub(super) async fn remove_layout(&self, id: i32) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM layouts WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl LayoutsRepo for PostgresRepositories {
    async fn find_layout_by_id(&self, id: i32) -> Result<Option<LayoutRecord>, RepoError> {
        let row = sqlx::query_as::<_, LayoutRow>(
            "SELECT id, header, footer FROM layouts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(LayoutRecord::from))
    }

    async fn list_layouts(&self) -> Result<Vec<LayoutRecord>, RepoError> {
        let rows =
            sqlx::query_as::<_, LayoutRow>("SELECT id, header, footer FROM layouts ORDER BY id")
                .fetch_all(self.pool())
                .await
                .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(LayoutRecord::from).collect())
    }
}
