//! Catalog port traits.
//!
//! The reconciliation engine depends on these seams rather than on Postgres
//! directly; the implementations live under [`super::postgres`].

use crate::error::Result;
use crate::model::{
    Episode, Genre, GenreKind, Movie, RemoteFile, Season, Show, StoredShow,
};
use async_trait::async_trait;

#[async_trait]
pub trait FileStore: Send + Sync {
    /// Files referenced by a movie row, id-ordered.
    async fn movie_files(&self) -> Result<Vec<RemoteFile>>;

    /// Files referenced by an episode row, id-ordered.
    async fn episode_files(&self) -> Result<Vec<RemoteFile>>;

    async fn file_by_id(&self, id: &str) -> Result<Option<RemoteFile>>;

    async fn update_modified_times(&self, files: &[RemoteFile]) -> Result<()>;

    async fn delete_files(&self, ids: &[String]) -> Result<()>;
}

#[async_trait]
pub trait MovieStore: Send + Sync {
    /// Inserts a movie and its file, plus the studios, cast, crew and
    /// external links it references, in one transaction.
    async fn upsert_movie(&self, movie: &Movie, file: &RemoteFile) -> Result<()>;
}

#[async_trait]
pub trait ShowStore: Send + Sync {
    async fn all_shows(&self) -> Result<Vec<StoredShow>>;

    async fn all_show_ids(&self) -> Result<Vec<i32>>;

    async fn all_season_ids(&self) -> Result<Vec<i32>>;

    async fn batch_add_shows(&self, shows: &[Show]) -> Result<()>;

    async fn batch_add_seasons(&self, seasons: &[Season]) -> Result<()>;

    /// Inserts the episode files and then the episodes pointing at them, in
    /// one transaction.
    async fn batch_add_episodes_and_files(
        &self,
        episodes: &[Episode],
        files: &[RemoteFile],
    ) -> Result<()>;

    /// `(show_id, modified_time)` pairs.
    async fn update_shows_modified_time(&self, updates: &[(i32, i64)]) -> Result<()>;

    async fn delete_show(&self, id: i32) -> Result<()>;

    async fn delete_season(&self, id: i32) -> Result<()>;
}

#[async_trait]
pub trait GenreStore: Send + Sync {
    async fn all_genres(&self) -> Result<Vec<Genre>>;

    async fn batch_add_genres(&self, genres: &[Genre], kind: GenreKind) -> Result<()>;
}

/// Read side for the filter cache publisher. "Common" here means the value
/// occurs on at least one catalogued title, so the facet is worth offering
/// as a filter.
#[async_trait]
pub trait FacetStore: Send + Sync {
    async fn show_genres(&self) -> Result<Vec<Genre>>;

    async fn movie_genres(&self) -> Result<Vec<Genre>>;

    async fn show_studios(&self) -> Result<Vec<(i32, String)>>;

    async fn movie_studios(&self) -> Result<Vec<(i32, String)>>;

    async fn show_parental_ratings(&self) -> Result<Vec<String>>;

    async fn movie_parental_ratings(&self) -> Result<Vec<String>>;

    async fn show_years(&self) -> Result<Vec<i32>>;

    async fn movie_years(&self) -> Result<Vec<i32>>;
}
