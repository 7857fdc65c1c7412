//! Read-only metadata clients: TMDB (primary) and OMDb (secondary ratings
//! and plot source). No caching, no rate limiting, no retries — one blocking
//! round trip per call, by design of the surrounding job.

pub mod omdb;
pub mod tmdb;

pub use omdb::{OmdbClient, RatingsApi};
pub use tmdb::{MetadataApi, TmdbClient};
