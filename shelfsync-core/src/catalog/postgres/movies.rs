use crate::catalog::ports::MovieStore;
use crate::catalog::postgres::people;
use crate::error::Result;
use crate::model::{Movie, RemoteFile};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

#[derive(Clone)]
pub struct PostgresMovieStore {
    pool: PgPool,
}

impl PostgresMovieStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MovieStore for PostgresMovieStore {
    async fn upsert_movie(&self, movie: &Movie, file: &RemoteFile) -> Result<()> {
        let mut tx = self.pool.begin().await?;

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

        people::insert_studios(&mut tx, &movie.studios).await?;

        let genre_ids: Vec<i32> = movie.genres.iter().map(|g| g.id).collect();
        let studio_ids: Vec<i32> = movie.studios.iter().map(|s| s.id).collect();
        sqlx::query(
            r#"
            INSERT INTO movies (
                id, title, collection_id, file_id, imdb_id, imdb_rating, imdb_votes,
                release_date, release_year, parental_rating, runtime, poster_path,
                backdrop_path, logo_image, trailer_link, tagline, plot, director,
                genres, studios
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                $11, $12, $13, $14, $15, $16, $17, $18, $19, $20
            )
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(movie.id)
        .bind(&movie.title)
        .bind(movie.collection_id)
        .bind(&movie.file_id)
        .bind(&movie.imdb_id)
        .bind(movie.imdb_rating)
        .bind(movie.imdb_votes)
        .bind(movie.release_date)
        .bind(movie.release_year)
        .bind(&movie.parental_rating)
        .bind(movie.runtime)
        .bind(&movie.poster_path)
        .bind(&movie.backdrop_path)
        .bind(&movie.logo_image)
        .bind(&movie.trailer_link)
        .bind(&movie.tagline)
        .bind(&movie.plot)
        .bind(&movie.director)
        .bind(&genre_ids)
        .bind(&studio_ids)
        .execute(&mut *tx)
        .await?;

        people::insert_cast(&mut tx, &movie.cast).await?;
        people::insert_crew(&mut tx, &movie.crew).await?;
        people::insert_external_links(&mut tx, &movie.external_links).await?;

        tx.commit().await?;
        info!(title = %movie.title, file_id = %file.id, "movie inserted");
        Ok(())
    }
}
