use crate::catalog::ports::FileStore;
use crate::error::Result;
use crate::model::RemoteFile;
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::info;

#[derive(Clone)]
pub struct PostgresFileStore {
    pool: PgPool,
}

impl PostgresFileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_files(&self, query: &str) -> Result<Vec<RemoteFile>> {
        let rows = sqlx::query(query).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(row_to_file).collect())
    }
}

fn row_to_file(row: &sqlx::postgres::PgRow) -> RemoteFile {
    RemoteFile {
        id: row.get("id"),
        name: row.get("name"),
        size: row.get("size"),
        modified_time: row.get("modified_time"),
    }
}

#[async_trait]
impl FileStore for PostgresFileStore {
    async fn movie_files(&self) -> Result<Vec<RemoteFile>> {
        self.fetch_files(
            r#"
            SELECT f.id, f.name, f.size, f.modified_time
            FROM files f
            INNER JOIN movies m ON f.id = m.file_id
            ORDER BY f.id
            "#,
        )
        .await
    }

    async fn episode_files(&self) -> Result<Vec<RemoteFile>> {
        self.fetch_files(
            r#"
            SELECT f.id, f.name, f.size, f.modified_time
            FROM files f
            INNER JOIN episodes e ON f.id = e.file_id
            ORDER BY f.id
            "#,
        )
        .await
    }

    async fn file_by_id(&self, id: &str) -> Result<Option<RemoteFile>> {
        let row = sqlx::query("SELECT id, name, size, modified_time FROM files WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(row_to_file))
    }

    async fn update_modified_times(&self, files: &[RemoteFile]) -> Result<()> {
        if files.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await?;
        for file in files {
            sqlx::query("UPDATE files SET modified_time = $1 WHERE id = $2")
                .bind(file.modified_time)
                .bind(&file.id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        info!(count = files.len(), "updated file modified times");
        Ok(())
    }

    async fn delete_files(&self, ids: &[String]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        sqlx::query("DELETE FROM files WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;
        info!(count = ids.len(), "deleted files");
        Ok(())
    }
}
