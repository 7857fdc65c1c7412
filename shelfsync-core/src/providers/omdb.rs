//! OMDb client and response decoding.
//!
//! The provider reports "not found" with a 200 status and
//! `{"Response": "False"}`, and uses the literal string `"N/A"` where other
//! APIs would use null. Fetches therefore return `Option` — any transport
//! error or non-`True` response is absence, never an error — and the field
//! accessors strip the `N/A` sentinel and ad-hoc formatting.

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

const OMDB_API_URL: &str = "https://www.omdbapi.com/";

/// Year-range separator in OMDb `Year` fields ("2019–2023"); an en dash,
/// not a hyphen.
const YEAR_RANGE_DASH: char = '\u{2013}';

/// Secondary ratings/plot seam. `None` means the provider has no usable
/// record; the engine logs and skips the item.
#[async_trait]
pub trait RatingsApi: Send + Sync {
    async fn movie_by_imdb_id(&self, imdb_id: &str) -> Option<OmdbMovieResponse>;

    async fn show_by_imdb_id(&self, imdb_id: &str) -> Option<OmdbTvResponse>;
}

pub struct OmdbClient {
    http: reqwest::Client,
    api_key: String,
}

impl OmdbClient {
    pub fn new(api_key: String) -> crate::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { http, api_key })
    }

    async fn fetch_by_id<T: DeserializeOwned>(&self, imdb_id: &str, kind: &str) -> Option<T> {
        let response = self
            .http
            .get(OMDB_API_URL)
            .query(&[
                ("apikey", self.api_key.as_str()),
                ("i", imdb_id),
                ("type", kind),
            ])
            .send()
            .await
            .ok()?;

        let value: serde_json::Value = response.json().await.ok()?;
        if value.get("Response").and_then(|v| v.as_str()) != Some("True") {
            debug!(imdb_id, kind, "omdb reported not found");
            return None;
        }
        serde_json::from_value(value).ok()
    }
}

#[async_trait]
impl RatingsApi for OmdbClient {
    async fn movie_by_imdb_id(&self, imdb_id: &str) -> Option<OmdbMovieResponse> {
        self.fetch_by_id(imdb_id, "movie").await
    }

    async fn show_by_imdb_id(&self, imdb_id: &str) -> Option<OmdbTvResponse> {
        self.fetch_by_id(imdb_id, "series").await
    }
}

pub fn null_if_na(value: &str) -> Option<&str> {
    if value == "N/A" { None } else { Some(value) }
}

fn parse_rating(value: Option<&str>) -> Option<f64> {
    null_if_na(value?)?.replace(',', "").parse().ok()
}

fn parse_votes(value: Option<&str>) -> Option<i32> {
    null_if_na(value?)?.replace(',', "").parse().ok()
}

/// "134 min" → 134.
fn parse_runtime_minutes(value: Option<&str>) -> Option<i32> {
    null_if_na(value?)?.split(' ').next()?.parse().ok()
}

/// "12 Jul 2019" → epoch milliseconds at midnight UTC.
fn parse_released(value: Option<&str>) -> Option<i64> {
    let date = chrono::NaiveDate::parse_from_str(null_if_na(value?)?, "%d %b %Y").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis())
}

/// First year of a `Year` field: "2019", "2019–2023" and "2019–" all
/// yield 2019.
fn parse_first_year(value: &str) -> Option<i32> {
    let first = value.split(YEAR_RANGE_DASH).next()?;
    null_if_na(first.trim())?.parse().ok()
}

/// Upper bound of a `Year` range: "2019–2023" → Some(2023), ongoing
/// "2019–" → Some(YEAR_PRESENT), single "2019" → None.
fn parse_latest_year(value: &str) -> Option<i32> {
    let (_, rest) = value.split_once(YEAR_RANGE_DASH)?;
    let rest = rest.trim();
    if rest.is_empty() {
        Some(crate::model::YEAR_PRESENT)
    } else {
        rest.parse().ok()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OmdbMovieResponse {
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    #[serde(rename = "imdbRating")]
    pub imdb_rating: Option<String>,
    #[serde(rename = "imdbVotes")]
    pub imdb_votes: Option<String>,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Plot")]
    pub plot: Option<String>,
    #[serde(rename = "Rated")]
    pub rated: Option<String>,
    #[serde(rename = "Released")]
    pub released: Option<String>,
    #[serde(rename = "Runtime")]
    pub runtime: Option<String>,
    #[serde(rename = "Year")]
    pub year: String,
}

impl OmdbMovieResponse {
    pub fn rating_value(&self) -> Option<f64> {
        parse_rating(self.imdb_rating.as_deref())
    }

    pub fn votes_value(&self) -> Option<i32> {
        parse_votes(self.imdb_votes.as_deref())
    }

    pub fn runtime_minutes(&self) -> Option<i32> {
        parse_runtime_minutes(self.runtime.as_deref())
    }

    pub fn released_epoch_ms(&self) -> Option<i64> {
        parse_released(self.released.as_deref())
    }

    pub fn parental_rating(&self) -> Option<String> {
        null_if_na(self.rated.as_deref()?).map(str::to_string)
    }

    pub fn plot_value(&self) -> Option<String> {
        null_if_na(self.plot.as_deref()?).map(str::to_string)
    }

    pub fn release_year(&self) -> Option<i32> {
        parse_first_year(&self.year)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OmdbTvResponse {
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    #[serde(rename = "imdbRating")]
    pub imdb_rating: Option<String>,
    #[serde(rename = "imdbVotes")]
    pub imdb_votes: Option<String>,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Plot")]
    pub plot: Option<String>,
    #[serde(rename = "Rated")]
    pub rated: Option<String>,
    #[serde(rename = "Released")]
    pub released: Option<String>,
    #[serde(rename = "Year")]
    pub year: String,
}

impl OmdbTvResponse {
    pub fn rating_value(&self) -> Option<f64> {
        parse_rating(self.imdb_rating.as_deref())
    }

    pub fn votes_value(&self) -> Option<i32> {
        parse_votes(self.imdb_votes.as_deref())
    }

    pub fn released_epoch_ms(&self) -> Option<i64> {
        parse_released(self.released.as_deref())
    }

    pub fn parental_rating(&self) -> Option<String> {
        null_if_na(self.rated.as_deref()?).map(str::to_string)
    }

    pub fn plot_value(&self) -> Option<String> {
        null_if_na(self.plot.as_deref()?).map(str::to_string)
    }

    pub fn release_year_from(&self) -> Option<i32> {
        parse_first_year(&self.year)
    }

    pub fn release_year_to(&self) -> Option<i32> {
        parse_latest_year(&self.year)
    }
}
