use crate::catalog::ports::FacetStore;
use crate::error::Result;
use crate::model::Genre;
use async_trait::async_trait;
use sqlx::{PgPool, Row};

/// Facet reads over the array columns on `movies` and `shows`. Genre and
/// studio references are resolved through `ANY()` joins against the
/// reference tables so only values actually in use surface as filters.
#[derive(Clone)]
pub struct PostgresFacetStore {
    pool: PgPool,
}

impl PostgresFacetStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_genres(&self, media_table: &str) -> Result<Vec<Genre>> {
        let query = format!(
            r#"
            SELECT DISTINCT g.id, g.name
            FROM genres g
            INNER JOIN {media_table} m ON g.id = ANY(m.genres)
            ORDER BY g.name
            "#
        );
        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;
        Ok(rows
            .iter()
            .map(|row| Genre {
                id: row.get("id"),
                name: row.get("name"),
            })
            .collect())
    }

    async fn fetch_studios(&self, media_table: &str) -> Result<Vec<(i32, String)>> {
        let query = format!(
            r#"
            SELECT DISTINCT s.id, s.name
            FROM studios s
            INNER JOIN {media_table} m ON s.id = ANY(m.studios)
            ORDER BY s.name
            "#
        );
        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;
        Ok(rows
            .iter()
            .map(|row| (row.get("id"), row.get("name")))
            .collect())
    }

    async fn fetch_ratings(&self, media_table: &str) -> Result<Vec<String>> {
        let query = format!(
            r#"
            SELECT DISTINCT parental_rating
            FROM {media_table}
            WHERE parental_rating IS NOT NULL
            ORDER BY parental_rating
            "#
        );
        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(|row| row.get("parental_rating")).collect())
    }

    async fn fetch_years(&self, query: &str) -> Result<Vec<i32>> {
        let rows = sqlx::query(query).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(|row| row.get("year")).collect())
    }
}

#[async_trait]
impl FacetStore for PostgresFacetStore {
    async fn show_genres(&self) -> Result<Vec<Genre>> {
        self.fetch_genres("shows").await
    }

    async fn movie_genres(&self) -> Result<Vec<Genre>> {
        self.fetch_genres("movies").await
    }

    async fn show_studios(&self) -> Result<Vec<(i32, String)>> {
        self.fetch_studios("shows").await
    }

    async fn movie_studios(&self) -> Result<Vec<(i32, String)>> {
        self.fetch_studios("movies").await
    }

    async fn show_parental_ratings(&self) -> Result<Vec<String>> {
        self.fetch_ratings("shows").await
    }

    async fn movie_parental_ratings(&self) -> Result<Vec<String>> {
        self.fetch_ratings("movies").await
    }

    async fn show_years(&self) -> Result<Vec<i32>> {
        self.fetch_years(
            r#"
            SELECT DISTINCT release_year_from AS year
            FROM shows
            ORDER BY release_year_from
            "#,
        )
        .await
    }

    async fn movie_years(&self) -> Result<Vec<i32>> {
        self.fetch_years(
            r#"
            SELECT DISTINCT release_year AS year
            FROM movies
            ORDER BY release_year
            "#,
        )
        .await
    }
}
