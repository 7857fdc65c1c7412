//! Genre vocabulary synchronization.
//!
//! TMDB keeps separate movie and show genre lists whose ids overlap. New
//! entries are partitioned into movie-only, show-only and shared before
//! insertion so each row lands with the right applicability tag.

use crate::catalog::GenreStore;
use crate::drive::DriveApi;
use crate::error::Result;
use crate::model::{Genre, GenreKind};
use crate::providers::tmdb::MetadataApi;
use crate::sync::Indexer;
use tracing::info;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct GenrePlan {
    pub movie_only: Vec<Genre>,
    pub show_only: Vec<Genre>,
    pub both: Vec<Genre>,
}

impl GenrePlan {
    pub fn is_empty(&self) -> bool {
        self.movie_only.is_empty() && self.show_only.is_empty() && self.both.is_empty()
    }
}

/// Partitions the provider vocabularies against what the catalog already
/// holds. A genre id present in both provider lists is tagged shared even if
/// only one list introduced it.
pub fn partition_genres(existing: &[Genre], movie: &[Genre], show: &[Genre]) -> GenrePlan {
    let known = |genre: &Genre| existing.iter().any(|g| g.id == genre.id);
    let new_movie: Vec<&Genre> = movie.iter().filter(|g| !known(g)).collect();
    let new_show: Vec<&Genre> = show.iter().filter(|g| !known(g)).collect();

    GenrePlan {
        movie_only: new_movie
            .iter()
            .filter(|g| !show.iter().any(|s| s.id == g.id))
            .map(|g| (*g).clone())
            .collect(),
        show_only: new_show
            .iter()
            .filter(|g| !movie.iter().any(|m| m.id == g.id))
            .map(|g| (*g).clone())
            .collect(),
        both: new_movie
            .iter()
            .filter(|g| show.iter().any(|s| s.id == g.id))
            .map(|g| (*g).clone())
            .collect(),
    }
}

impl<A: DriveApi + 'static> Indexer<A> {
    pub(crate) async fn sync_genres(&self) -> Result<()> {
        info!("beginning genre synchronization");

        let existing = self.catalog.genres.all_genres().await?;
        let movie_genres = self.tmdb.movie_genres().await?;
        let show_genres = self.tmdb.show_genres().await?;

        let plan = partition_genres(&existing, &movie_genres, &show_genres);
        if plan.is_empty() {
            info!("no new genres found");
            return Ok(());
        }

        self.catalog
            .genres
            .batch_add_genres(&plan.movie_only, GenreKind::Movie)
            .await?;
        self.catalog
            .genres
            .batch_add_genres(&plan.show_only, GenreKind::Show)
            .await?;
        self.catalog
            .genres
            .batch_add_genres(&plan.both, GenreKind::Both)
            .await?;

        info!("genre synchronization ended");
        Ok(())
    }
}
