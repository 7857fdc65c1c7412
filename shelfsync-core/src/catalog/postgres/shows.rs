use crate::catalog::ports::ShowStore;
use crate::catalog::postgres::people;
use crate::error::Result;
use crate::model::{Episode, RemoteFile, Season, Show, StoredShow};
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::info;

#[derive(Clone)]
pub struct PostgresShowStore {
    pool: PgPool,
}

impl PostgresShowStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_ids(&self, query: &str) -> Result<Vec<i32>> {
        let rows = sqlx::query(query).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(|row| row.get("id")).collect())
    }
}

#[async_trait]
impl ShowStore for PostgresShowStore {
    async fn all_shows(&self) -> Result<Vec<StoredShow>> {
        let rows = sqlx::query("SELECT id, title, modified_time FROM shows ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .iter()
            .map(|row| StoredShow {
                id: row.get("id"),
                title: row.get("title"),
                modified_time: row.get("modified_time"),
            })
            .collect())
    }

    async fn all_show_ids(&self) -> Result<Vec<i32>> {
        self.fetch_ids("SELECT id FROM shows ORDER BY id").await
    }

    async fn all_season_ids(&self) -> Result<Vec<i32>> {
        self.fetch_ids("SELECT id FROM seasons ORDER BY id").await
    }

    async fn batch_add_shows(&self, shows: &[Show]) -> Result<()> {
        if shows.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await?;
        for show in shows {
            people::insert_studios(&mut tx, &show.studios).await?;

            let genre_ids: Vec<i32> = show.genres.iter().map(|g| g.id).collect();
            let studio_ids: Vec<i32> = show.studios.iter().map(|s| s.id).collect();
            sqlx::query(
                r#"
                INSERT INTO shows (
                    id, title, imdb_id, imdb_rating, imdb_votes, release_date,
                    release_year_from, release_year_to, parental_rating, poster_path,
                    backdrop_path, logo_image, trailer_link, plot, director,
                    genres, studios, modified_time
                ) VALUES (
                    $1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                    $11, $12, $13, $14, $15, $16, $17, $18
                )
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(show.id)
            .bind(&show.title)
            .bind(&show.imdb_id)
            .bind(show.imdb_rating)
            .bind(show.imdb_votes)
            .bind(show.release_date)
            .bind(show.release_year_from)
            .bind(show.release_year_to)
            .bind(&show.parental_rating)
            .bind(&show.poster_path)
            .bind(&show.backdrop_path)
            .bind(&show.logo_image)
            .bind(&show.trailer_link)
            .bind(&show.plot)
            .bind(&show.director)
            .bind(&genre_ids)
            .bind(&studio_ids)
            .bind(show.modified_time)
            .execute(&mut *tx)
            .await?;

            people::insert_cast(&mut tx, &show.cast).await?;
            people::insert_crew(&mut tx, &show.crew).await?;
            people::insert_external_links(&mut tx, &show.external_links).await?;
        }
        tx.commit().await?;
        info!(count = shows.len(), "shows inserted");
        Ok(())
    }

    async fn batch_add_seasons(&self, seasons: &[Season]) -> Result<()> {
        if seasons.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await?;
        for season in seasons {
            sqlx::query(
                r#"
                INSERT INTO seasons (
                    id, name, overview, release_year, release_date, season_number, show_id
                ) VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(season.id)
            .bind(&season.name)
            .bind(&season.overview)
            .bind(season.release_year)
            .bind(season.release_date)
            .bind(season.season_number)
            .bind(season.show_id)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        info!(count = seasons.len(), "seasons inserted");
        Ok(())
    }

    async fn batch_add_episodes_and_files(
        &self,
        episodes: &[Episode],
        files: &[RemoteFile],
    ) -> Result<()> {
        if episodes.is_empty() && files.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await?;
        for file in files {
            sqlx::query(
                r#"
                INSERT INTO files (id, name, size, modified_time)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(&file.id)
            .bind(&file.name)
            .bind(file.size)
            .bind(file.modified_time)
            .execute(&mut *tx)
            .await?;
        }
        for episode in episodes {
            sqlx::query(
                r#"
                INSERT INTO episodes (
                    id, title, episode_number, season_number, still_path, overview,
                    airdate, runtime, season_id, file_id
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(episode.id)
            .bind(&episode.title)
            .bind(episode.episode_number)
            .bind(episode.season_number)
            .bind(&episode.still_path)
            .bind(&episode.overview)
            .bind(episode.airdate)
            .bind(episode.runtime)
            .bind(episode.season_id)
            .bind(&episode.file_id)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        info!(
            episodes = episodes.len(),
            files = files.len(),
            "episodes and files inserted"
        );
        Ok(())
    }

    async fn update_shows_modified_time(&self, updates: &[(i32, i64)]) -> Result<()> {
        if updates.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await?;
        for (show_id, modified_time) in updates {
            sqlx::query("UPDATE shows SET modified_time = $1 WHERE id = $2")
                .bind(modified_time)
                .bind(show_id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        info!(count = updates.len(), "updated show modified times");
        Ok(())
    }

    async fn delete_show(&self, id: i32) -> Result<()> {
        sqlx::query("DELETE FROM shows WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        info!(show_id = id, "show deleted");
        Ok(())
    }

    async fn delete_season(&self, id: i32) -> Result<()> {
        sqlx::query("DELETE FROM seasons WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        info!(season_id = id, "season deleted");
        Ok(())
    }
}
