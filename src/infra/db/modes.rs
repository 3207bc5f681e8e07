use async_trait::async_trait;

use crate::application::repos::{ModesRepo, RepoError};
use crate::domain::entities::ModeRecord;

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct ModeRow {
    id: i32,
    name: String,
}

impl From<ModeRow> for ModeRecord {
    fn from(row: ModeRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
        }
    }
}

impl PostgresRepositories {
    pub(super) async fn insert_mode(&self, mode: &ModeRecord) -> Result<bool, RepoError> {
        let result = sqlx::query(
            "INSERT INTO modes (id, name) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING",
        )
        .bind(mode.id)
        .bind(&mode.name)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() == 1)
    }

    pub(super) async fn remove_mode(&self, id: i32) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM modes WHERE id = $1")
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
impl ModesRepo for PostgresRepositories {
    async fn find_mode_by_id(&self, id: i32) -> Result<Option<ModeRecord>, RepoError> {
        let row = sqlx::query_as::<_, ModeRow>("SELECT id, name FROM modes WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(ModeRecord::from))
    }

    async fn list_modes(&self) -> Result<Vec<ModeRecord>, RepoError> {
        let rows = sqlx::query_as::<_, ModeRow>("SELECT id, name FROM modes ORDER BY id")
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(ModeRecord::from).collect())
    }
}
