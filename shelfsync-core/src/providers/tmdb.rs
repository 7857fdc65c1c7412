//! TMDB client and response models.
//!
//! Show and movie fetches append `external_ids,credits,images,videos` so a
//! single call carries everything the reconciliation engine needs, including
//! the IMDb cross-reference id used to query the secondary provider.

use crate::error::Result;
use crate::model::{CastMember, CrewMember, ExternalLink, Genre, Studio};
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;

const TMDB_API_URL: &str = "https://api.themoviedb.org";
const APPEND_EXTRAS: &str = "external_ids,credits,images,videos";

/// Primary metadata seam for the reconciliation engine. The production
/// implementation is [`TmdbClient`]; tests substitute prepared responses.
#[async_trait]
pub trait MetadataApi: Send + Sync {
    async fn movie(&self, id: i32) -> Result<MovieResponse>;

    async fn show(&self, id: i32) -> Result<TvResponse>;

    async fn season(&self, show_id: i32, season_number: u32) -> Result<SeasonResponse>;

    async fn movie_genres(&self) -> Result<Vec<Genre>>;

    async fn show_genres(&self) -> Result<Vec<Genre>>;
}

pub struct TmdbClient {
    http: reqwest::Client,
    api_key: String,
}

impl TmdbClient {
    pub fn new(api_key: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { http, api_key })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, append_extras: bool) -> Result<T> {
        let mut request = self
            .http
            .get(format!("{TMDB_API_URL}{path}"))
            .query(&[("api_key", self.api_key.as_str())]);
        if append_extras {
            request = request.query(&[("append_to_response", APPEND_EXTRAS)]);
        }
        let response = request.send().await?.error_for_status()?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl MetadataApi for TmdbClient {
    async fn movie(&self, id: i32) -> Result<MovieResponse> {
        self.get(&format!("/3/movie/{id}"), true).await
    }

    async fn show(&self, id: i32) -> Result<TvResponse> {
        self.get(&format!("/3/tv/{id}"), true).await
    }

    async fn season(&self, show_id: i32, season_number: u32) -> Result<SeasonResponse> {
        self.get(&format!("/3/tv/{show_id}/season/{season_number}"), false)
            .await
    }

    async fn movie_genres(&self) -> Result<Vec<Genre>> {
        let list: GenreList = self.get("/3/genre/movie/list", false).await?;
        Ok(list.genres)
    }

    async fn show_genres(&self) -> Result<Vec<Genre>> {
        let list: GenreList = self.get("/3/genre/tv/list", false).await?;
        Ok(list.genres)
    }
}

#[derive(Debug, Deserialize)]
struct GenreList {
    genres: Vec<Genre>,
}

/// External id map from `append_to_response=external_ids`. Values are mixed
/// (strings for most sites, numbers for tvdb), hence the loose value type.
pub type ExternalIds = HashMap<String, serde_json::Value>;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credits {
    pub cast: Option<Vec<TmdbCast>>,
    pub crew: Option<Vec<TmdbCrew>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbCast {
    pub id: i32,
    pub name: String,
    pub profile_path: Option<String>,
    pub character: Option<String>,
    pub gender: Option<i32>,
}

impl TmdbCast {
    pub fn to_cast_member(&self) -> CastMember {
        CastMember {
            id: self.id,
            name: self.name.clone(),
            image: self.profile_path.clone(),
            role: self.character.clone(),
            gender: match self.gender {
                Some(1) => "female",
                Some(2) => "male",
                Some(3) => "non_binary",
                _ => "unknown",
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbCrew {
    pub id: i32,
    pub name: String,
    pub profile_path: Option<String>,
    pub job: Option<String>,
}

impl TmdbCrew {
    pub fn to_crew_member(&self) -> CrewMember {
        CrewMember {
            id: self.id,
            name: self.name.clone(),
            image: self.profile_path.clone(),
            job: self.job.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Images {
    pub logos: Option<Vec<TmdbImage>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbImage {
    pub file_path: Option<String>,
    pub vote_average: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Videos {
    pub results: Option<Vec<TmdbVideo>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbVideo {
    pub key: Option<String>,
    pub site: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub official: Option<bool>,
    pub published_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductionCompany {
    pub id: i32,
    pub name: String,
    pub logo_path: Option<String>,
    pub origin_country: Option<String>,
}

impl ProductionCompany {
    pub fn to_studio(&self) -> Studio {
        Studio {
            id: self.id,
            name: self.name.clone(),
            logo: self.logo_path.clone(),
            country: self.origin_country.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Collection {
    pub id: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MovieResponse {
    pub id: i32,
    pub title: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub tagline: Option<String>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    pub production_companies: Option<Vec<ProductionCompany>>,
    pub belongs_to_collection: Option<Collection>,
    pub external_ids: Option<ExternalIds>,
    #[serde(default)]
    pub credits: Credits,
    #[serde(default)]
    pub images: Images,
    #[serde(default)]
    pub videos: Videos,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TvResponse {
    pub id: i32,
    pub name: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub seasons: Option<Vec<TvSeason>>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    pub production_companies: Option<Vec<ProductionCompany>>,
    pub external_ids: Option<ExternalIds>,
    #[serde(default)]
    pub credits: Credits,
    #[serde(default)]
    pub images: Images,
    #[serde(default)]
    pub videos: Videos,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TvSeason {
    pub id: i32,
    pub name: Option<String>,
    pub season_number: i32,
    pub overview: Option<String>,
    pub air_date: Option<String>,
}

impl TvSeason {
    /// TMDB frequently leaves season overviews empty; synthesize one from
    /// the show name and premiere date in that case.
    pub fn overview_or_default(&self, show_name: &str) -> String {
        if let Some(overview) = &self.overview {
            if !overview.is_empty() {
                return overview.clone();
            }
        }
        let premiered = self
            .air_date
            .as_deref()
            .and_then(|d| chrono::NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .map(|d| format!(" premiered on {}.", d.format("%A %d, %Y")))
            .unwrap_or_default();
        format!("Season {} of {show_name}{premiered}", self.season_number)
    }

    pub fn release_year(&self) -> i32 {
        self.air_date
            .as_deref()
            .and_then(|d| d.split('-').next())
            .and_then(|y| y.parse().ok())
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeasonResponse {
    pub id: i32,
    pub episodes: Option<Vec<SeasonEpisode>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeasonEpisode {
    pub id: i32,
    pub name: Option<String>,
    pub overview: Option<String>,
    pub air_date: Option<String>,
    pub episode_number: i32,
    pub season_number: i32,
    pub still_path: Option<String>,
    pub runtime: Option<i32>,
}

fn imdb_id(external_ids: &Option<ExternalIds>) -> Option<String> {
    external_ids
        .as_ref()?
        .get("imdb_id")?
        .as_str()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn external_links(id: i32, external_ids: &Option<ExternalIds>) -> Vec<ExternalLink> {
    let Some(ids) = external_ids else {
        return Vec::new();
    };
    let mut links: Vec<ExternalLink> = ids
        .iter()
        .filter_map(|(site, value)| {
            let value = value.as_str()?;
            if value.is_empty() {
                return None;
            }
            Some(ExternalLink {
                id,
                name: site.clone(),
                url: value.to_string(),
            })
        })
        .collect();
    links.sort_by(|a, b| a.name.cmp(&b.name));
    links
}

fn best_logo_image(images: &Images) -> Option<String> {
    images
        .logos
        .as_ref()?
        .iter()
        .max_by(|a, b| {
            a.vote_average
                .unwrap_or(0.0)
                .total_cmp(&b.vote_average.unwrap_or(0.0))
        })?
        .file_path
        .clone()
}

/// The most recently published official YouTube trailer; unofficial ones are
/// considered only when nothing official exists at the same timestamp.
fn official_trailer(videos: &Videos) -> Option<String> {
    videos
        .results
        .as_ref()?
        .iter()
        .filter(|v| v.kind.as_deref() == Some("Trailer") && v.site.as_deref() == Some("YouTube"))
        .max_by_key(|v| {
            let published = v
                .published_at
                .as_deref()
                .and_then(|t| chrono::DateTime::parse_from_rfc3339(t).ok())
                .map(|t| t.timestamp_millis())
                .unwrap_or(0);
            (published, v.official.unwrap_or(false))
        })?
        .key
        .as_deref()
        .filter(|k| !k.is_empty())
        .map(|k| format!("https://www.youtube.com/watch?v={k}"))
}

fn director_name(credits: &Credits) -> Option<String> {
    credits
        .crew
        .as_ref()?
        .iter()
        .find(|c| c.job.as_deref() == Some("Director"))
        .map(|c| c.name.clone())
}

macro_rules! response_helpers {
    ($ty:ty) => {
        impl $ty {
            pub fn imdb_id(&self) -> Option<String> {
                imdb_id(&self.external_ids)
            }

            pub fn external_links(&self) -> Vec<ExternalLink> {
                external_links(self.id, &self.external_ids)
            }

            pub fn best_logo_image(&self) -> Option<String> {
                best_logo_image(&self.images)
            }

            pub fn official_trailer(&self) -> Option<String> {
                official_trailer(&self.videos)
            }

            pub fn director_name(&self) -> Option<String> {
                director_name(&self.credits)
            }

            pub fn cast_members(&self) -> Vec<CastMember> {
                self.credits
                    .cast
                    .as_deref()
                    .unwrap_or_default()
                    .iter()
                    .map(TmdbCast::to_cast_member)
                    .collect()
            }

            pub fn crew_members(&self) -> Vec<CrewMember> {
                self.credits
                    .crew
                    .as_deref()
                    .unwrap_or_default()
                    .iter()
                    .map(TmdbCrew::to_crew_member)
                    .collect()
            }

            pub fn studios(&self) -> Vec<Studio> {
                self.production_companies
                    .as_deref()
                    .unwrap_or_default()
                    .iter()
                    .map(ProductionCompany::to_studio)
                    .collect()
            }
        }
    };
}

response_helpers!(MovieResponse);
response_helpers!(TvResponse);
