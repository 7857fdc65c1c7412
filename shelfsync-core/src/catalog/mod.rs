//! The media catalog: a Postgres database holding files, movies, shows,
//! seasons, episodes and the reference tables they point at.

pub mod ports;
pub mod postgres;

use crate::error::Result;
use sqlx::Row;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub use ports::{FacetStore, FileStore, GenreStore, MovieStore, ShowStore};

/// The store bundle the reconciliation engine consumes, as trait objects so
/// tests can substitute in-memory implementations.
#[derive(Clone)]
pub struct Stores {
    pub files: Arc<dyn FileStore>,
    pub movies: Arc<dyn MovieStore>,
    pub shows: Arc<dyn ShowStore>,
    pub genres: Arc<dyn GenreStore>,
    pub facets: Arc<dyn FacetStore>,
}

pub struct Catalog {
    pub files: postgres::PostgresFileStore,
    pub movies: postgres::PostgresMovieStore,
    pub shows: postgres::PostgresShowStore,
    pub genres: postgres::PostgresGenreStore,
    pub facets: postgres::PostgresFacetStore,
    pool: PgPool,
}

impl Catalog {
    /// Connects, applies pending migrations, and wires up the stores over a
    /// shared pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect(database_url)
            .await?;

        sqlx::migrate!("../migrations").run(&pool).await?;

        Ok(Self {
            files: postgres::PostgresFileStore::new(pool.clone()),
            movies: postgres::PostgresMovieStore::new(pool.clone()),
            shows: postgres::PostgresShowStore::new(pool.clone()),
            genres: postgres::PostgresGenreStore::new(pool.clone()),
            facets: postgres::PostgresFacetStore::new(pool.clone()),
            pool,
        })
    }

    pub fn stores(&self) -> Stores {
        Stores {
            files: Arc::new(self.files.clone()),
            movies: Arc::new(self.movies.clone()),
            shows: Arc::new(self.shows.clone()),
            genres: Arc::new(self.genres.clone()),
            facets: Arc::new(self.facets.clone()),
        }
    }

    /// Logs catalog row counts at startup.
    pub async fn log_statistics(&self) -> Result<()> {
        let movies = self.table_count("movies").await?;
        let shows = self.table_count("shows").await?;
        info!(movies, shows, "catalog statistics");
        Ok(())
    }

    async fn table_count(&self, table: &str) -> Result<i64> {
        let query = format!("SELECT COUNT(*) AS row_count FROM {table}");
        let row = sqlx::query(&query).fetch_one(&self.pool).await?;
        Ok(row.get("row_count"))
    }
}
