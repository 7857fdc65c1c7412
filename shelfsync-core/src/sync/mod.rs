//! The reconciliation engine.
//!
//! One run is four sequential stages: genre vocabulary, movies, shows,
//! filter facets. Stages are independent — a failed stage is logged and the
//! run moves on, so a TMDB outage during movie indexing still lets the show
//! catalog and the facet cache converge.

pub mod filters;
pub mod genres;
pub mod movies;
pub mod shows;

use crate::cache::FacetCache;
use crate::catalog::Stores;
use crate::drive::{DriveApi, Walker};
use crate::providers::{MetadataApi, RatingsApi};
use std::sync::Arc;
use tracing::{error, info};

/// The engine talks to every collaborator through a seam: [`DriveApi`] as a
/// type parameter (the walker is generic over it), the rest as trait
/// objects. Production wires in the real clients; tests wire in fakes.
pub struct Indexer<A: DriveApi + 'static> {
    drive: Arc<A>,
    walker: Walker<A>,
    tmdb: Arc<dyn MetadataApi>,
    omdb: Arc<dyn RatingsApi>,
    catalog: Stores,
    cache: Arc<dyn FacetCache>,
    /// Root folder ids; a missing one skips that stage.
    movies_folder: Option<String>,
    shows_folder: Option<String>,
}

impl<A: DriveApi + 'static> Indexer<A> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        drive: Arc<A>,
        tmdb: Arc<dyn MetadataApi>,
        omdb: Arc<dyn RatingsApi>,
        catalog: Stores,
        cache: Arc<dyn FacetCache>,
        movies_folder: Option<String>,
        shows_folder: Option<String>,
    ) -> Self {
        Self {
            walker: Walker::new(drive.clone()),
            drive,
            tmdb,
            omdb,
            catalog,
            cache,
            movies_folder,
            shows_folder,
        }
    }

    /// Runs the full pipeline. Individual stage failures are logged here and
    /// never abort the run.
    pub async fn run(&self) {
        info!("indexing run started");

        if let Err(e) = self.sync_genres().await {
            error!(error = %e, "genre synchronization failed");
        }
        if let Err(e) = self.sync_movies().await {
            error!(error = %e, "movie indexing failed");
        }
        if let Err(e) = self.sync_shows().await {
            error!(error = %e, "show indexing failed");
        }
        if let Err(e) = self.publish_filters().await {
            error!(error = %e, "filter cache publish failed");
        }

        info!("indexing run ended");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ports::{FacetStore, FileStore, GenreStore, MovieStore, ShowStore};
    use crate::error::{Result, SyncError};
    use crate::model::{
        DriveItem, Episode, Genre, GenreKind, Movie, RemoteFile, Season, Show, StoredShow,
    };
    use crate::providers::omdb::{OmdbMovieResponse, OmdbTvResponse};
    use crate::providers::tmdb::{
        Credits, ExternalIds, Images, MovieResponse, SeasonEpisode, SeasonResponse, TvResponse,
        TvSeason, Videos,
    };
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct FakeDrive {
        tree: HashMap<String, Vec<DriveItem>>,
    }

    #[async_trait]
    impl DriveApi for FakeDrive {
        async fn list_children(
            &self,
            folder_id: &str,
            folders_only: bool,
        ) -> Result<Vec<DriveItem>> {
            match self.tree.get(folder_id) {
                Some(children) => Ok(children
                    .iter()
                    .filter(|c| !folders_only || c.is_folder())
                    .cloned()
                    .collect()),
                None => Err(SyncError::Api(format!("no such folder: {folder_id}"))),
            }
        }
    }

    #[derive(Default)]
    struct FakeMetadata {
        movies: HashMap<i32, MovieResponse>,
        shows: HashMap<i32, TvResponse>,
        seasons: HashMap<(i32, u32), SeasonResponse>,
    }

    #[async_trait]
    impl MetadataApi for FakeMetadata {
        async fn movie(&self, id: i32) -> Result<MovieResponse> {
            self.movies
                .get(&id)
                .cloned()
                .ok_or_else(|| SyncError::Api(format!("no movie {id}")))
        }

        async fn show(&self, id: i32) -> Result<TvResponse> {
            self.shows
                .get(&id)
                .cloned()
                .ok_or_else(|| SyncError::Api(format!("no show {id}")))
        }

        async fn season(&self, show_id: i32, season_number: u32) -> Result<SeasonResponse> {
            self.seasons
                .get(&(show_id, season_number))
                .cloned()
                .ok_or_else(|| SyncError::Api(format!("no season {show_id}/{season_number}")))
        }

        async fn movie_genres(&self) -> Result<Vec<Genre>> {
            Ok(Vec::new())
        }

        async fn show_genres(&self) -> Result<Vec<Genre>> {
            Ok(Vec::new())
        }
    }

    #[derive(Default)]
    struct FakeRatings {
        movies: HashMap<String, OmdbMovieResponse>,
        shows: HashMap<String, OmdbTvResponse>,
    }

    #[async_trait]
    impl RatingsApi for FakeRatings {
        async fn movie_by_imdb_id(&self, imdb_id: &str) -> Option<OmdbMovieResponse> {
            self.movies.get(imdb_id).cloned()
        }

        async fn show_by_imdb_id(&self, imdb_id: &str) -> Option<OmdbTvResponse> {
            self.shows.get(imdb_id).cloned()
        }
    }

    /// In-memory catalog with the same conflict-skip and id semantics as the
    /// Postgres stores.
    #[derive(Default)]
    struct MemoryCatalog {
        files: Mutex<Vec<RemoteFile>>,
        movies: Mutex<Vec<Movie>>,
        shows: Mutex<Vec<Show>>,
        seasons: Mutex<Vec<Season>>,
        episodes: Mutex<Vec<Episode>>,
        genres: Mutex<Vec<(Genre, GenreKind)>>,
    }

    #[async_trait]
    impl FileStore for MemoryCatalog {
        async fn movie_files(&self) -> Result<Vec<RemoteFile>> {
            let movies = self.movies.lock().unwrap();
            let files = self.files.lock().unwrap();
            Ok(files
                .iter()
                .filter(|f| movies.iter().any(|m| m.file_id == f.id))
                .cloned()
                .collect())
        }

        async fn episode_files(&self) -> Result<Vec<RemoteFile>> {
            let episodes = self.episodes.lock().unwrap();
            let files = self.files.lock().unwrap();
            Ok(files
                .iter()
                .filter(|f| episodes.iter().any(|e| e.file_id == f.id))
                .cloned()
                .collect())
        }

        async fn file_by_id(&self, id: &str) -> Result<Option<RemoteFile>> {
            Ok(self.files.lock().unwrap().iter().find(|f| f.id == id).cloned())
        }

        async fn update_modified_times(&self, updates: &[RemoteFile]) -> Result<()> {
            let mut files = self.files.lock().unwrap();
            for update in updates {
                if let Some(file) = files.iter_mut().find(|f| f.id == update.id) {
                    file.modified_time = update.modified_time;
                }
            }
            Ok(())
        }

        async fn delete_files(&self, ids: &[String]) -> Result<()> {
            self.files.lock().unwrap().retain(|f| !ids.contains(&f.id));
            // Same cascade as the movie/episode foreign keys.
            self.movies.lock().unwrap().retain(|m| !ids.contains(&m.file_id));
            self.episodes.lock().unwrap().retain(|e| !ids.contains(&e.file_id));
            Ok(())
        }
    }

    #[async_trait]
    impl MovieStore for MemoryCatalog {
        async fn upsert_movie(&self, movie: &Movie, file: &RemoteFile) -> Result<()> {
            {
                let mut files = self.files.lock().unwrap();
                if !files.iter().any(|f| f.id == file.id) {
                    files.push(file.clone());
                }
            }
            let mut movies = self.movies.lock().unwrap();
            if !movies.iter().any(|m| m.id == movie.id) {
                movies.push(movie.clone());
            }
            Ok(())
        }
    }

    #[async_trait]
    impl ShowStore for MemoryCatalog {
        async fn all_shows(&self) -> Result<Vec<StoredShow>> {
            Ok(self
                .shows
                .lock()
                .unwrap()
                .iter()
                .map(|show| StoredShow {
                    id: show.id,
                    title: show.title.clone(),
                    modified_time: show.modified_time,
                })
                .collect())
        }

        async fn all_show_ids(&self) -> Result<Vec<i32>> {
            Ok(self.shows.lock().unwrap().iter().map(|s| s.id).collect())
        }

        async fn all_season_ids(&self) -> Result<Vec<i32>> {
            Ok(self.seasons.lock().unwrap().iter().map(|s| s.id).collect())
        }

        async fn batch_add_shows(&self, new: &[Show]) -> Result<()> {
            let mut shows = self.shows.lock().unwrap();
            for show in new {
                if !shows.iter().any(|s| s.id == show.id) {
                    shows.push(show.clone());
                }
            }
            Ok(())
        }

        async fn batch_add_seasons(&self, new: &[Season]) -> Result<()> {
            let mut seasons = self.seasons.lock().unwrap();
            for season in new {
                if !seasons.iter().any(|s| s.id == season.id) {
                    seasons.push(season.clone());
                }
            }
            Ok(())
        }

        async fn batch_add_episodes_and_files(
            &self,
            new_episodes: &[Episode],
            new_files: &[RemoteFile],
        ) -> Result<()> {
            {
                let mut files = self.files.lock().unwrap();
                for file in new_files {
                    if !files.iter().any(|f| f.id == file.id) {
                        files.push(file.clone());
                    }
                }
            }
            let mut episodes = self.episodes.lock().unwrap();
            for episode in new_episodes {
                if !episodes.iter().any(|e| e.id == episode.id) {
                    episodes.push(episode.clone());
                }
            }
            Ok(())
        }

        async fn update_shows_modified_time(&self, updates: &[(i32, i64)]) -> Result<()> {
            let mut shows = self.shows.lock().unwrap();
            for (show_id, modified_time) in updates {
                if let Some(show) = shows.iter_mut().find(|s| s.id == *show_id) {
                    show.modified_time = *modified_time;
                }
            }
            Ok(())
        }

        async fn delete_show(&self, id: i32) -> Result<()> {
            self.shows.lock().unwrap().retain(|s| s.id != id);
            self.seasons.lock().unwrap().retain(|s| s.show_id != id);
            Ok(())
        }

        async fn delete_season(&self, id: i32) -> Result<()> {
            self.seasons.lock().unwrap().retain(|s| s.id != id);
            Ok(())
        }
    }

    #[async_trait]
    impl GenreStore for MemoryCatalog {
        async fn all_genres(&self) -> Result<Vec<Genre>> {
            Ok(self.genres.lock().unwrap().iter().map(|(g, _)| g.clone()).collect())
        }

        async fn batch_add_genres(&self, new: &[Genre], kind: GenreKind) -> Result<()> {
            let mut genres = self.genres.lock().unwrap();
            for genre in new {
                if !genres.iter().any(|(g, _)| g.id == genre.id) {
                    genres.push((genre.clone(), kind));
                }
            }
            Ok(())
        }
    }

    #[async_trait]
    impl FacetStore for MemoryCatalog {
        async fn show_genres(&self) -> Result<Vec<Genre>> {
            let mut out: Vec<Genre> = Vec::new();
            for show in self.shows.lock().unwrap().iter() {
                for genre in &show.genres {
                    if !out.iter().any(|g| g.id == genre.id) {
                        out.push(genre.clone());
                    }
                }
            }
            Ok(out)
        }

        async fn movie_genres(&self) -> Result<Vec<Genre>> {
            let mut out: Vec<Genre> = Vec::new();
            for movie in self.movies.lock().unwrap().iter() {
                for genre in &movie.genres {
                    if !out.iter().any(|g| g.id == genre.id) {
                        out.push(genre.clone());
                    }
                }
            }
            Ok(out)
        }

        async fn show_studios(&self) -> Result<Vec<(i32, String)>> {
            let mut out: Vec<(i32, String)> = Vec::new();
            for show in self.shows.lock().unwrap().iter() {
                for studio in &show.studios {
                    if !out.iter().any(|(id, _)| *id == studio.id) {
                        out.push((studio.id, studio.name.clone()));
                    }
                }
            }
            Ok(out)
        }

        async fn movie_studios(&self) -> Result<Vec<(i32, String)>> {
            let mut out: Vec<(i32, String)> = Vec::new();
            for movie in self.movies.lock().unwrap().iter() {
                for studio in &movie.studios {
                    if !out.iter().any(|(id, _)| *id == studio.id) {
                        out.push((studio.id, studio.name.clone()));
                    }
                }
            }
            Ok(out)
        }

        async fn show_parental_ratings(&self) -> Result<Vec<String>> {
            let mut out: Vec<String> = self
                .shows
                .lock()
                .unwrap()
                .iter()
                .filter_map(|s| s.parental_rating.clone())
                .collect();
            out.sort();
            out.dedup();
            Ok(out)
        }

        async fn movie_parental_ratings(&self) -> Result<Vec<String>> {
            let mut out: Vec<String> = self
                .movies
                .lock()
                .unwrap()
                .iter()
                .filter_map(|m| m.parental_rating.clone())
                .collect();
            out.sort();
            out.dedup();
            Ok(out)
        }

        async fn show_years(&self) -> Result<Vec<i32>> {
            let mut out: Vec<i32> = self
                .shows
                .lock()
                .unwrap()
                .iter()
                .map(|s| s.release_year_from)
                .collect();
            out.sort_unstable();
            out.dedup();
            Ok(out)
        }

        async fn movie_years(&self) -> Result<Vec<i32>> {
            let mut out: Vec<i32> =
                self.movies.lock().unwrap().iter().map(|m| m.release_year).collect();
            out.sort_unstable();
            out.dedup();
            Ok(out)
        }
    }

    #[derive(Default)]
    struct MemoryCache {
        blobs: Mutex<HashMap<String, serde_json::Value>>,
        lists: Mutex<HashMap<String, Vec<String>>>,
    }

    #[async_trait]
    impl FacetCache for MemoryCache {
        async fn overwrite_json(&self, key: &str, value: serde_json::Value) -> Result<()> {
            self.blobs.lock().unwrap().insert(key.to_string(), value);
            Ok(())
        }

        async fn sync_list(&self, key: &str, values: &[String]) -> Result<(usize, usize)> {
            let mut lists = self.lists.lock().unwrap();
            let list = lists.entry(key.to_string()).or_default();
            let removed = list.iter().filter(|v| !values.contains(v)).count();
            list.retain(|v| values.contains(v));
            let mut added = 0;
            for value in values {
                if !list.contains(value) {
                    list.push(value.clone());
                    added += 1;
                }
            }
            Ok((added, removed))
        }
    }

    fn folder(id: &str, name: &str) -> DriveItem {
        DriveItem {
            id: id.to_string(),
            name: name.to_string(),
            mime_type: crate::drive::FOLDER_MIME_TYPE.to_string(),
            size: None,
            modified_time: 5,
        }
    }

    fn video(id: &str, name: &str) -> DriveItem {
        DriveItem {
            id: id.to_string(),
            name: name.to_string(),
            mime_type: "video/x-matroska".to_string(),
            size: Some(700),
            modified_time: 1,
        }
    }

    fn ids_with_imdb(imdb_id: &str) -> ExternalIds {
        let mut ids = ExternalIds::new();
        ids.insert("imdb_id".to_string(), serde_json::json!(imdb_id));
        ids
    }

    fn movie_response(id: i32, imdb_id: Option<&str>) -> MovieResponse {
        MovieResponse {
            id,
            title: Some("Bar".to_string()),
            poster_path: None,
            backdrop_path: None,
            tagline: None,
            genres: Vec::new(),
            production_companies: None,
            belongs_to_collection: None,
            external_ids: imdb_id.map(ids_with_imdb),
            credits: Credits::default(),
            images: Images::default(),
            videos: Videos::default(),
        }
    }

    fn tv_response(id: i32, season_id: i32, imdb_id: &str) -> TvResponse {
        TvResponse {
            id,
            name: Some("Foo".to_string()),
            poster_path: None,
            backdrop_path: None,
            seasons: Some(vec![TvSeason {
                id: season_id,
                name: Some("Season 1".to_string()),
                season_number: 1,
                overview: Some("The first season.".to_string()),
                air_date: Some("2020-01-06".to_string()),
            }]),
            genres: Vec::new(),
            production_companies: None,
            external_ids: Some(ids_with_imdb(imdb_id)),
            credits: Credits::default(),
            images: Images::default(),
            videos: Videos::default(),
        }
    }

    fn season_response(id: i32, episodes: Vec<SeasonEpisode>) -> SeasonResponse {
        SeasonResponse {
            id,
            episodes: Some(episodes),
        }
    }

    fn provider_episode(id: i32, season: i32, number: i32) -> SeasonEpisode {
        SeasonEpisode {
            id,
            name: Some("Pilot".to_string()),
            overview: None,
            air_date: Some("2020-01-06".to_string()),
            episode_number: number,
            season_number: season,
            still_path: None,
            runtime: Some(24),
        }
    }

    fn omdb_movie(imdb_id: &str) -> OmdbMovieResponse {
        serde_json::from_value(serde_json::json!({
            "imdbID": imdb_id,
            "imdbRating": "7.1",
            "imdbVotes": "100",
            "Title": "Bar",
            "Plot": "A plot.",
            "Rated": "PG",
            "Released": "12 Jul 2019",
            "Runtime": "100 min",
            "Year": "2019"
        }))
        .unwrap()
    }

    fn omdb_tv(imdb_id: &str) -> OmdbTvResponse {
        serde_json::from_value(serde_json::json!({
            "imdbID": imdb_id,
            "imdbRating": "8.2",
            "imdbVotes": "2,000",
            "Title": "Foo",
            "Plot": "A show.",
            "Rated": "TV-14",
            "Released": "06 Jan 2020",
            "Year": "2020\u{2013}"
        }))
        .unwrap()
    }

    fn show_tree() -> FakeDrive {
        let mut tree = HashMap::new();
        tree.insert(
            "shows".to_string(),
            vec![folder("show-foo", "Foo (2020) [123]")],
        );
        tree.insert("show-foo".to_string(), vec![folder("s1", "Season 1")]);
        tree.insert("s1".to_string(), vec![video("ep1", "Foo S01E01.mkv")]);
        FakeDrive { tree }
    }

    fn movie_tree() -> FakeDrive {
        let mut tree = HashMap::new();
        tree.insert(
            "movies".to_string(),
            vec![video("m1", "Bar (2019) [456].mkv")],
        );
        FakeDrive { tree }
    }

    fn indexer(
        drive: FakeDrive,
        metadata: FakeMetadata,
        ratings: FakeRatings,
        catalog: Arc<MemoryCatalog>,
        movies_folder: Option<&str>,
        shows_folder: Option<&str>,
    ) -> Indexer<FakeDrive> {
        let stores = Stores {
            files: catalog.clone(),
            movies: catalog.clone(),
            shows: catalog.clone(),
            genres: catalog.clone(),
            facets: catalog,
        };
        Indexer::new(
            Arc::new(drive),
            Arc::new(metadata),
            Arc::new(ratings),
            stores,
            Arc::new(MemoryCache::default()),
            movies_folder.map(str::to_string),
            shows_folder.map(str::to_string),
        )
    }

    #[tokio::test]
    async fn indexes_new_episode_under_show_and_season() {
        let catalog = Arc::new(MemoryCatalog::default());
        let mut metadata = FakeMetadata::default();
        metadata.shows.insert(123, tv_response(123, 77, "tt0100"));
        metadata
            .seasons
            .insert((123, 1), season_response(77, vec![provider_episode(999, 1, 1)]));
        let mut ratings = FakeRatings::default();
        ratings.shows.insert("tt0100".to_string(), omdb_tv("tt0100"));

        let indexer = indexer(show_tree(), metadata, ratings, catalog.clone(), None, Some("shows"));
        indexer.sync_shows().await.unwrap();

        let shows = catalog.shows.lock().unwrap();
        assert_eq!(shows.len(), 1);
        assert_eq!(shows[0].id, 123);
        assert_eq!(shows[0].title, "Foo");
        // Stamped with the show folder's modified time, not the file's.
        assert_eq!(shows[0].modified_time, 5);

        let seasons = catalog.seasons.lock().unwrap();
        assert_eq!(seasons.len(), 1);
        assert_eq!(seasons[0].id, 77);
        assert_eq!(seasons[0].show_id, 123);

        let episodes = catalog.episodes.lock().unwrap();
        assert_eq!(episodes.len(), 1);
        assert_eq!(episodes[0].id, 999);
        assert_eq!(episodes[0].season_id, 77);
        assert_eq!(episodes[0].file_id, "ep1");

        let files = catalog.files.lock().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].id, "ep1");
    }

    #[tokio::test]
    async fn second_show_run_inserts_nothing() {
        let catalog = Arc::new(MemoryCatalog::default());
        let mut metadata = FakeMetadata::default();
        metadata.shows.insert(123, tv_response(123, 77, "tt0100"));
        metadata
            .seasons
            .insert((123, 1), season_response(77, vec![provider_episode(999, 1, 1)]));
        let mut ratings = FakeRatings::default();
        ratings.shows.insert("tt0100".to_string(), omdb_tv("tt0100"));

        let indexer = indexer(show_tree(), metadata, ratings, catalog.clone(), None, Some("shows"));
        indexer.sync_shows().await.unwrap();
        indexer.sync_shows().await.unwrap();

        assert_eq!(catalog.shows.lock().unwrap().len(), 1);
        assert_eq!(catalog.seasons.lock().unwrap().len(), 1);
        assert_eq!(catalog.episodes.lock().unwrap().len(), 1);
        assert_eq!(catalog.files.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn indexes_new_movie_exactly_once() {
        let catalog = Arc::new(MemoryCatalog::default());
        let mut metadata = FakeMetadata::default();
        metadata.movies.insert(456, movie_response(456, Some("tt0456")));
        let mut ratings = FakeRatings::default();
        ratings.movies.insert("tt0456".to_string(), omdb_movie("tt0456"));

        let indexer = indexer(movie_tree(), metadata, ratings, catalog.clone(), Some("movies"), None);
        indexer.sync_movies().await.unwrap();
        indexer.sync_movies().await.unwrap();

        let movies = catalog.movies.lock().unwrap();
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].id, 456);
        assert_eq!(movies[0].file_id, "m1");
        assert_eq!(catalog.files.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn movie_without_imdb_id_writes_no_rows() {
        let catalog = Arc::new(MemoryCatalog::default());
        let mut metadata = FakeMetadata::default();
        metadata.movies.insert(456, movie_response(456, None));
        let mut ratings = FakeRatings::default();
        ratings.movies.insert("tt0456".to_string(), omdb_movie("tt0456"));

        let indexer = indexer(movie_tree(), metadata, ratings, catalog.clone(), Some("movies"), None);
        indexer.sync_movies().await.unwrap();

        assert!(catalog.movies.lock().unwrap().is_empty());
        assert!(catalog.files.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn movie_unknown_to_ratings_provider_writes_no_rows() {
        let catalog = Arc::new(MemoryCatalog::default());
        let mut metadata = FakeMetadata::default();
        metadata.movies.insert(456, movie_response(456, Some("tt0456")));
        // Ratings provider has no record for tt0456.
        let ratings = FakeRatings::default();

        let indexer = indexer(movie_tree(), metadata, ratings, catalog.clone(), Some("movies"), None);
        indexer.sync_movies().await.unwrap();

        assert!(catalog.movies.lock().unwrap().is_empty());
        assert!(catalog.files.lock().unwrap().is_empty());
    }
}
