use async_trait::async_trait;
use time::OffsetDateTime;

use crate::application::repos::{
    CreatePageParams, PagesRepo, PagesWriteRepo, RepoError, UpdatePageParams,
};
use crate::domain::entities::PageRecord;
use crate::domain::pages::validate_page_id;

use super::{PostgresRepositories, map_sqlx_error};

const PAGE_COLUMNS: &str = "id, created_at, updated_at, mode_id, layout_id, title, content";

#[derive(sqlx::FromRow)]
struct PageRow {
    id: String,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
    mode_id: i32,
    layout_id: i32,
    title: String,
    content: String,
}

impl From<PageRow> for PageRecord {
    fn from(row: PageRow) -> Self {
        Self {
            id: row.id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            mode_id: row.mode_id,
            layout_id: row.layout_id,
            title: row.title,
            content: row.content,
        }
    }
}

fn checked_id(id: &str) -> Result<(), RepoError> {
    validate_page_id(id).map_err(|err| RepoError::InvalidInput {
        message: err.to_string(),
    })
}

impl PostgresRepositories {
    pub(super) async fn insert_page(&self, page: &PageRecord) -> Result<bool, RepoError> {
        checked_id(&page.id)?;
        let result = sqlx::query(
            r#"
            INSERT INTO pages (id, created_at, updated_at, mode_id, layout_id, title, content)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(&page.id)
        .bind(page.created_at)
        .bind(page.updated_at)
        .bind(page.mode_id)
        .bind(page.layout_id)
        .bind(&page.title)
        .bind(&page.content)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() == 1)
    }
}

#[async_trait]
impl PagesRepo for PostgresRepositories {
    async fn find_page_by_id(&self, id: &str) -> Result<Option<PageRecord>, RepoError> {
        let sql = format!("SELECT {PAGE_COLUMNS} FROM pages WHERE id = $1");
        let row = sqlx::query_as::<_, PageRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(PageRecord::from))
    }

    async fn list_page_ids(&self) -> Result<Vec<String>, RepoError> {
        sqlx::query_scalar::<_, String>("SELECT id FROM pages ORDER BY id")
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)
    }
}

#[async_trait]
impl PagesWriteRepo for PostgresRepositories {
    async fn create_page(&self, params: CreatePageParams) -> Result<PageRecord, RepoError> {
        checked_id(&params.id)?;
        let sql = format!(
            "INSERT INTO pages (id, created_at, updated_at, mode_id, layout_id, title, content) \
             VALUES ($1, now(), now(), $2, $3, $4, $5) \
             RETURNING {PAGE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, PageRow>(&sql)
            .bind(&params.id)
            .bind(params.mode_id)
            .bind(params.layout_id)
            .bind(&params.title)
            .bind(&params.content)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(PageRecord::from(row))
    }

    async fn update_page(&self, params: UpdatePageParams) -> Result<PageRecord, RepoError> {
        // Clock repeats must still advance updated_at.
        let sql = format!(
            "UPDATE pages SET \
                mode_id = $2, layout_id = $3, title = $4, content = $5, \
                updated_at = GREATEST(now(), updated_at + interval '1 microsecond') \
             WHERE id = $1 \
             RETURNING {PAGE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, PageRow>(&sql)
            .bind(&params.id)
            .bind(params.mode_id)
            .bind(params.layout_id)
            .bind(&params.title)
            .bind(&params.content)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        row.map(PageRecord::from).ok_or(RepoError::NotFound)
    }

    async fn delete_page(&self, id: &str) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM pages WHERE id = $1")
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
