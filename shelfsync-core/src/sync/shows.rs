//! Show indexing: recursive walk of the shows tree, file and modified-time
//! reconciliation, then per-show metadata assembly and batched inserts.
//!
//! Grouping is purely path-shaped: `show folder / season folder / episode
//! file`. Anything shallower is ignored. Episode files join against the
//! provider's season listing strictly by `SNNENN` label equality.

use crate::catalog::{FileStore, ShowStore};
use crate::diff::diff_files;
use crate::drive::DriveApi;
use crate::error::Result;
use crate::model::{Episode, PathFile, RemoteFile, Season, Show};
use crate::naming::{
    MediaName, format_episode_label, parse_episode_label, parse_media_name, parse_season_folder,
};
use crate::providers::omdb::{OmdbTvResponse, RatingsApi};
use crate::providers::tmdb::{MetadataApi, SeasonEpisode, TvResponse, TvSeason};
use crate::sync::Indexer;
use std::collections::{BTreeMap, HashSet};
use tracing::{error, info, warn};

/// Everything one show group contributes to the batched inserts.
pub struct ShowPlan {
    pub show: Show,
    pub seasons: Vec<Season>,
    pub episodes: Vec<Episode>,
    pub files: Vec<RemoteFile>,
}

impl<A: DriveApi + 'static> Indexer<A> {
    pub(crate) async fn sync_shows(&self) -> Result<()> {
        let Some(folder) = &self.shows_folder else {
            info!("shows folder not configured, skipping show indexing");
            return Ok(());
        };
        info!("beginning show indexing");

        let remote = self.walker.list_recursive(folder).await?;
        info!(count = remote.len(), "files found in shows folder");

        let stored = self.catalog.files.episode_files().await?;
        let remote_files: Vec<RemoteFile> =
            remote.iter().map(|pf| pf.file.to_remote_file()).collect();
        let diff = diff_files(&remote_files, &stored);
        info!(
            new = diff.new.len(),
            stale = diff.stale_ids.len(),
            modified = diff.modified.len(),
            "show file diff"
        );
        self.catalog.files.delete_files(&diff.stale_ids).await?;
        self.catalog
            .files
            .update_modified_times(&diff.modified)
            .await?;
        self.sync_show_modified_times(folder).await?;

        let new_ids: HashSet<&str> = diff.new.iter().map(|f| f.id.as_str()).collect();
        let new_files: Vec<PathFile> = remote
            .iter()
            .filter(|pf| new_ids.contains(pf.file.id.as_str()))
            .cloned()
            .collect();

        self.process_shows(folder, &new_files).await?;
        info!("ended show indexing");
        Ok(())
    }

    /// Show folders carry the library's change signal: when a folder's
    /// modified time moves, the stored show row follows.
    async fn sync_show_modified_times(&self, folder: &str) -> Result<()> {
        let remote_folders = self.drive.list_children(folder, true).await?;
        let stored = self.catalog.shows.all_shows().await?;

        let mut updates = Vec::new();
        for remote_folder in &remote_folders {
            let Some(name) = parse_media_name(&remote_folder.name) else {
                continue;
            };
            let moved = stored
                .iter()
                .find(|show| show.id == name.tmdb_id)
                .filter(|show| show.modified_time != remote_folder.modified_time);
            if let Some(show) = moved {
                updates.push((show.id, remote_folder.modified_time));
            }
        }
        info!(count = updates.len(), "shows need a modified time update");
        self.catalog.shows.update_shows_modified_time(&updates).await
    }

    async fn process_shows(&self, folder: &str, new_files: &[PathFile]) -> Result<()> {
        let remote_folders = self.drive.list_children(folder, true).await?;

        let mut shows: BTreeMap<i32, Show> = BTreeMap::new();
        let mut seasons: Vec<Season> = Vec::new();
        let mut episodes: Vec<Episode> = Vec::new();
        let mut files: Vec<RemoteFile> = Vec::new();

        for (name, group) in group_show_files(new_files) {
            let folder_match = remote_folders
                .iter()
                .find(|item| item.name == name.folder_name());
            let Some(show_folder) = folder_match else {
                warn!(show = %name.title, "show folder not found remotely, skipping");
                continue;
            };

            match self.plan_show_group(&name, &group, show_folder.modified_time).await {
                Ok(Some(plan)) => {
                    // De-dup: the same show id can surface under two folder
                    // spellings; first plan wins.
                    shows.entry(plan.show.id).or_insert(plan.show);
                    seasons.extend(plan.seasons);
                    episodes.extend(plan.episodes);
                    files.extend(plan.files);
                }
                Ok(None) => {}
                Err(e) => {
                    error!(show = %name.title, error = %e, "failed to plan show, skipping");
                }
            }
        }

        if shows.is_empty() && episodes.is_empty() {
            info!("no new show content to insert");
            return Ok(());
        }

        let stored_seasons: HashSet<i32> =
            self.catalog.shows.all_season_ids().await?.into_iter().collect();
        let mut new_seasons: Vec<Season> = seasons
            .into_iter()
            .filter(|season| !stored_seasons.contains(&season.id))
            .collect();
        new_seasons.sort_by_key(|s| s.id);
        new_seasons.dedup_by_key(|s| s.id);

        let shows: Vec<Show> = shows.into_values().collect();
        info!(
            shows = shows.len(),
            seasons = new_seasons.len(),
            episodes = episodes.len(),
            files = files.len(),
            "inserting show content"
        );
        self.catalog.shows.batch_add_shows(&shows).await?;
        self.catalog.shows.batch_add_seasons(&new_seasons).await?;
        self.catalog
            .shows
            .batch_add_episodes_and_files(&episodes, &files)
            .await
    }

    /// Builds the insert plan for a single show folder. `Ok(None)` means the
    /// show was skipped with a log line; season and episode level problems
    /// only shrink the plan.
    async fn plan_show_group(
        &self,
        name: &MediaName,
        group: &[PathFile],
        folder_modified_time: i64,
    ) -> Result<Option<ShowPlan>> {
        let tv = self.tmdb.show(name.tmdb_id).await?;
        let Some(imdb_id) = tv.imdb_id() else {
            warn!(show = %name.title, "imdb id missing from metadata, skipping show");
            return Ok(None);
        };
        let Some(omdb) = self.omdb.show_by_imdb_id(&imdb_id).await else {
            warn!(show = %name.title, imdb_id = %imdb_id, "ratings provider has no record, skipping show");
            return Ok(None);
        };

        let show = build_show(&tv, &omdb, folder_modified_time);
        let mut plan = ShowPlan {
            show,
            seasons: Vec::new(),
            episodes: Vec::new(),
            files: Vec::new(),
        };

        let mut by_season: BTreeMap<String, Vec<PathFile>> = BTreeMap::new();
        for file in group {
            if let Some(season_folder) = path_segment(file, 1) {
                by_season.entry(season_folder.to_string()).or_default().push(file.clone());
            }
        }

        for (season_folder, season_files) in by_season {
            let Some(season_number) = parse_season_folder(&season_folder) else {
                warn!(show = %name.title, folder = %season_folder, "unrecognized season folder, skipping");
                continue;
            };

            let season_response = match self.tmdb.season(name.tmdb_id, season_number).await {
                Ok(response) => response,
                Err(e) => {
                    error!(show = %name.title, season = season_number, error = %e, "season fetch failed, skipping");
                    continue;
                }
            };
            let Some(provider_episodes) = season_response.episodes else {
                warn!(show = %name.title, season = season_number, "provider lists no episodes, skipping season");
                continue;
            };

            let (matched, matched_files) =
                match_episodes(&season_files, &provider_episodes, season_response.id);
            plan.episodes.extend(matched);
            plan.files.extend(matched_files);

            let tv_season = tv
                .seasons
                .as_deref()
                .unwrap_or_default()
                .iter()
                .find(|s| s.season_number == season_number as i32);
            if let Some(tv_season) = tv_season {
                plan.seasons
                    .push(build_season(tv_season, &plan.show.title, name.tmdb_id));
            }
        }

        Ok(Some(plan))
    }
}

fn path_segment(file: &PathFile, index: usize) -> Option<&str> {
    file.path.split('/').nth(index)
}

/// Groups walker output by show folder, dropping paths shallower than
/// `show/season/file` and folders that do not parse. Groups come back
/// title-sorted.
pub fn group_show_files(files: &[PathFile]) -> Vec<(MediaName, Vec<PathFile>)> {
    let mut by_folder: BTreeMap<String, Vec<PathFile>> = BTreeMap::new();
    for file in files {
        if file.path.split('/').count() < 3 {
            continue;
        }
        if let Some(show_folder) = path_segment(file, 0) {
            by_folder.entry(show_folder.to_string()).or_default().push(file.clone());
        }
    }

    let mut groups: Vec<(MediaName, Vec<PathFile>)> = by_folder
        .into_iter()
        .filter_map(|(folder, group)| parse_media_name(&folder).map(|name| (name, group)))
        .collect();
    groups.sort_by(|a, b| a.0.title.cmp(&b.0.title));
    groups
}

/// Joins episode files against the provider's season listing by `SNNENN`
/// label. Unmatched files are logged and dropped; the rest become episode
/// rows plus their backing files.
pub fn match_episodes(
    files: &[PathFile],
    provider: &[SeasonEpisode],
    season_id: i32,
) -> (Vec<Episode>, Vec<RemoteFile>) {
    let by_label: BTreeMap<String, &SeasonEpisode> = provider
        .iter()
        .map(|ep| {
            (
                format_episode_label(ep.season_number as u32, ep.episode_number as u32),
                ep,
            )
        })
        .collect();

    let mut episodes = Vec::new();
    let mut matched_files = Vec::new();
    for file in files {
        let Some(label) = parse_episode_label(&file.file.name) else {
            warn!(path = %file.path, "no episode label in file name, skipping file");
            continue;
        };
        let Some(found) = by_label.get(&format_episode_label(label.season, label.episode)) else {
            warn!(path = %file.path, "episode not in provider listing, skipping file");
            continue;
        };
        episodes.push(build_episode(found, season_id, &file.file.id));
        matched_files.push(file.file.to_remote_file());
    }
    (episodes, matched_files)
}

fn build_episode(episode: &SeasonEpisode, season_id: i32, file_id: &str) -> Episode {
    Episode {
        id: episode.id,
        title: episode.name.clone(),
        episode_number: episode.episode_number,
        season_number: episode.season_number,
        still_path: episode.still_path.clone(),
        overview: episode.overview.clone(),
        airdate: episode.air_date.as_deref().and_then(ymd_epoch_ms),
        runtime: episode.runtime,
        season_id,
        file_id: file_id.to_string(),
    }
}

fn build_season(season: &TvSeason, show_title: &str, show_id: i32) -> Season {
    Season {
        id: season.id,
        name: season.name.clone().unwrap_or_else(|| format!("Season {}", season.season_number)),
        overview: season.overview_or_default(show_title),
        release_year: season.release_year(),
        release_date: season.air_date.as_deref().and_then(ymd_epoch_ms),
        season_number: season.season_number,
        show_id,
    }
}

/// Merges the provider pair into a catalog show, same split as movies:
/// OMDb for textual/rating fields, TMDB for visuals and credits.
pub fn build_show(tmdb: &TvResponse, omdb: &OmdbTvResponse, modified_time: i64) -> Show {
    Show {
        id: tmdb.id,
        title: omdb.title.clone(),
        imdb_id: omdb.imdb_id.clone(),
        imdb_rating: omdb.rating_value(),
        imdb_votes: omdb.votes_value(),
        release_date: omdb.released_epoch_ms(),
        release_year_from: omdb.release_year_from().unwrap_or(0),
        release_year_to: omdb.release_year_to(),
        parental_rating: omdb.parental_rating(),
        poster_path: tmdb.poster_path.clone(),
        backdrop_path: tmdb.backdrop_path.clone(),
        logo_image: tmdb.best_logo_image(),
        trailer_link: tmdb.official_trailer(),
        plot: omdb.plot_value(),
        director: tmdb.director_name(),
        cast: tmdb.cast_members(),
        crew: tmdb.crew_members(),
        genres: tmdb.genres.clone(),
        studios: tmdb.studios(),
        external_links: tmdb.external_links(),
        modified_time,
    }
}

/// "2020-01-06" → epoch milliseconds at midnight UTC.
fn ymd_epoch_ms(date: &str) -> Option<i64> {
    let parsed = chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    Some(parsed.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis())
}
