//! Movie indexing: flat listing of the movies folder, file diff against the
//! catalog, and a metadata fetch pair (TMDB then OMDb) per new file.

use crate::catalog::{FileStore, MovieStore};
use crate::diff::diff_files;
use crate::drive::DriveApi;
use crate::error::Result;
use crate::model::{Movie, RemoteFile};
use crate::naming::{MediaName, parse_media_name};
use crate::providers::omdb::{OmdbMovieResponse, RatingsApi};
use crate::providers::tmdb::{MetadataApi, MovieResponse};
use crate::sync::Indexer;
use tracing::{error, info, warn};

impl<A: DriveApi + 'static> Indexer<A> {
    pub(crate) async fn sync_movies(&self) -> Result<()> {
        let Some(folder) = &self.movies_folder else {
            info!("movies folder not configured, skipping movie indexing");
            return Ok(());
        };
        info!("beginning movie indexing");

        let listing = self.drive.list_children(folder, false).await?;
        let remote: Vec<RemoteFile> = listing
            .iter()
            .filter(|item| item.mime_type.starts_with("video/"))
            .map(|item| item.to_remote_file())
            .collect();
        let stored = self.catalog.files.movie_files().await?;

        let diff = diff_files(&remote, &stored);
        info!(
            new = diff.new.len(),
            stale = diff.stale_ids.len(),
            modified = diff.modified.len(),
            "movie file diff"
        );
        self.catalog
            .files
            .update_modified_times(&diff.modified)
            .await?;
        self.catalog.files.delete_files(&diff.stale_ids).await?;

        for file in &diff.new {
            let Some(name) = parse_media_name(&file.name) else {
                warn!(name = %file.name, "unrecognized movie file name, skipping");
                continue;
            };
            if let Err(e) = self.insert_new_movie(&name, file).await {
                error!(title = %name.title, error = %e, "failed to index movie");
            }
        }

        info!("ended movie indexing");
        Ok(())
    }

    async fn insert_new_movie(&self, name: &MediaName, file: &RemoteFile) -> Result<()> {
        info!(title = %name.title, year = name.year, "new movie, fetching metadata");

        let movie_response = self.tmdb.movie(name.tmdb_id).await?;
        let Some(imdb_id) = movie_response.imdb_id() else {
            warn!(title = %name.title, "imdb id missing from metadata, skipping");
            return Ok(());
        };
        let Some(omdb_response) = self.omdb.movie_by_imdb_id(&imdb_id).await else {
            warn!(title = %name.title, imdb_id = %imdb_id, "ratings provider has no record, skipping");
            return Ok(());
        };

        let movie = build_movie(&movie_response, &omdb_response, &file.id);
        self.catalog.movies.upsert_movie(&movie, file).await
    }
}

/// Merges the two provider responses into a catalog movie. OMDb wins for
/// title, plot, rating, year, parental rating and runtime; TMDB supplies
/// everything visual plus credits, genres, studios and links.
pub fn build_movie(tmdb: &MovieResponse, omdb: &OmdbMovieResponse, file_id: &str) -> Movie {
    Movie {
        id: tmdb.id,
        title: omdb.title.clone(),
        imdb_id: omdb.imdb_id.clone(),
        imdb_rating: omdb.rating_value(),
        imdb_votes: omdb.votes_value(),
        release_date: omdb.released_epoch_ms(),
        release_year: omdb.release_year().unwrap_or(0),
        parental_rating: omdb.parental_rating(),
        runtime: omdb.runtime_minutes(),
        poster_path: tmdb.poster_path.clone(),
        backdrop_path: tmdb.backdrop_path.clone(),
        logo_image: tmdb.best_logo_image(),
        trailer_link: tmdb.official_trailer(),
        tagline: tmdb.tagline.clone(),
        plot: omdb.plot_value(),
        director: tmdb.director_name(),
        cast: tmdb.cast_members(),
        crew: tmdb.crew_members(),
        genres: tmdb.genres.clone(),
        studios: tmdb.studios(),
        external_links: tmdb.external_links(),
        collection_id: tmdb.belongs_to_collection.as_ref().map(|c| c.id),
        file_id: file_id.to_string(),
    }
}
