use crate::catalog::ports::GenreStore;
use crate::error::Result;
use crate::model::{Genre, GenreKind};
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::info;

#[derive(Clone)]
pub struct PostgresGenreStore {
    pool: PgPool,
}

impl PostgresGenreStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GenreStore for PostgresGenreStore {
    async fn all_genres(&self) -> Result<Vec<Genre>> {
        let rows = sqlx::query("SELECT id, name FROM genres ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .iter()
            .map(|row| Genre {
                id: row.get("id"),
                name: row.get("name"),
            })
            .collect())
    }

    async fn batch_add_genres(&self, genres: &[Genre], kind: GenreKind) -> Result<()> {
        if genres.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await?;
        for genre in genres {
            sqlx::query(
                r#"
                INSERT INTO genres (id, name, type)
                VALUES ($1, $2, $3)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(genre.id)
            .bind(&genre.name)
            .bind(kind.as_str())
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        info!(count = genres.len(), kind = kind.as_str(), "genres inserted");
        Ok(())
    }
}
