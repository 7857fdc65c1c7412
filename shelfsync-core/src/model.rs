//! Domain entities shared by the walker, the reconciliation engine and the
//! catalog store.
//!
//! Identifiers originate outside this system: `RemoteFile::id` is the Drive
//! file id, Show/Season/Episode/Movie ids are TMDB ids. Nothing here is ever
//! generated locally.

use serde::{Deserialize, Serialize};

/// The catalog's view of a remote file. One row per media file, owned by
/// exactly one movie or episode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub id: String,
    pub name: String,
    pub size: i64,
    /// Epoch milliseconds.
    pub modified_time: i64,
}

/// A single entry of a Drive folder listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriveItem {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub size: Option<i64>,
    pub modified_time: i64,
}

impl DriveItem {
    pub fn is_folder(&self) -> bool {
        self.mime_type == crate::drive::FOLDER_MIME_TYPE
    }

    pub fn to_remote_file(&self) -> RemoteFile {
        RemoteFile {
            id: self.id.clone(),
            name: self.name.clone(),
            size: self.size.unwrap_or(0),
            modified_time: self.modified_time,
        }
    }
}

/// A file plus its folder path relative to the listing root, produced by the
/// recursive walker. Paths use `/` separators regardless of platform since
/// they describe Drive folders, not local ones.
#[derive(Debug, Clone)]
pub struct PathFile {
    pub path: String,
    pub file: DriveItem,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: i32,
    pub name: String,
}

/// Which vocabulary a genre belongs to. TMDB keeps separate movie and show
/// genre lists with overlapping ids; overlapping entries are tagged `Both`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenreKind {
    Movie,
    Show,
    Both,
}

impl GenreKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenreKind::Movie => "movie",
            GenreKind::Show => "show",
            GenreKind::Both => "both",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Studio {
    pub id: i32,
    pub name: String,
    pub logo: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CastMember {
    pub id: i32,
    pub name: String,
    pub image: Option<String>,
    pub role: Option<String>,
    pub gender: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrewMember {
    pub id: i32,
    pub name: String,
    pub image: Option<String>,
    pub job: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalLink {
    pub id: i32,
    pub name: String,
    pub url: String,
}

/// Marker for an open-ended year range ("2019-" in the ratings provider),
/// stored instead of a real upper bound for still-running shows.
pub const YEAR_PRESENT: i32 = i32::MAX;

#[derive(Debug, Clone)]
pub struct Show {
    pub id: i32,
    pub title: String,
    pub imdb_id: String,
    pub imdb_rating: Option<f64>,
    pub imdb_votes: Option<i32>,
    /// Epoch milliseconds.
    pub release_date: Option<i64>,
    pub release_year_from: i32,
    /// `None` for a single-year run, [`YEAR_PRESENT`] for an ongoing one.
    pub release_year_to: Option<i32>,
    pub parental_rating: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub logo_image: Option<String>,
    pub trailer_link: Option<String>,
    pub plot: Option<String>,
    pub director: Option<String>,
    pub cast: Vec<CastMember>,
    pub crew: Vec<CrewMember>,
    pub genres: Vec<Genre>,
    pub studios: Vec<Studio>,
    pub external_links: Vec<ExternalLink>,
    /// Modified time of the show's Drive folder, epoch milliseconds.
    pub modified_time: i64,
}

/// Slim catalog snapshot of a show, enough for modified-time reconciliation.
#[derive(Debug, Clone)]
pub struct StoredShow {
    pub id: i32,
    pub title: String,
    pub modified_time: i64,
}

#[derive(Debug, Clone)]
pub struct Season {
    pub id: i32,
    pub name: String,
    pub overview: String,
    pub release_year: i32,
    pub release_date: Option<i64>,
    pub season_number: i32,
    pub show_id: i32,
}

#[derive(Debug, Clone)]
pub struct Episode {
    pub id: i32,
    pub title: Option<String>,
    pub episode_number: i32,
    pub season_number: i32,
    pub still_path: Option<String>,
    pub overview: Option<String>,
    /// Epoch milliseconds.
    pub airdate: Option<i64>,
    pub runtime: Option<i32>,
    pub season_id: i32,
    pub file_id: String,
}

#[derive(Debug, Clone)]
pub struct Movie {
    pub id: i32,
    pub title: String,
    pub imdb_id: String,
    pub imdb_rating: Option<f64>,
    pub imdb_votes: Option<i32>,
    /// Epoch milliseconds.
    pub release_date: Option<i64>,
    pub release_year: i32,
    pub parental_rating: Option<String>,
    pub runtime: Option<i32>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub logo_image: Option<String>,
    pub trailer_link: Option<String>,
    pub tagline: Option<String>,
    pub plot: Option<String>,
    pub director: Option<String>,
    pub cast: Vec<CastMember>,
    pub crew: Vec<CrewMember>,
    pub genres: Vec<Genre>,
    pub studios: Vec<Studio>,
    pub external_links: Vec<ExternalLink>,
    pub collection_id: Option<i32>,
    pub file_id: String,
}
