//! Filter facet publishing.
//!
//! Genres and studios go out as whole JSON blobs; parental ratings and years
//! are kept as Redis lists and reconciled member by member. The asymmetry is
//! load-bearing for downstream readers, so both shapes stay.

use crate::cache::FacetCache;
use crate::catalog::FacetStore;
use crate::drive::DriveApi;
use crate::error::Result;
use crate::sync::Indexer;
use serde_json::json;
use tracing::info;

impl<A: DriveApi + 'static> Indexer<A> {
    pub(crate) async fn publish_filters(&self) -> Result<()> {
        info!("publishing filter facets");

        let genres = self.catalog.facets.show_genres().await?;
        self.cache
            .overwrite_json("commonShowGenres", serde_json::to_value(&genres)?)
            .await?;
        info!(count = genres.len(), "published show genres");

        let studios = studio_entries(self.catalog.facets.show_studios().await?);
        let count = studios.len();
        self.cache
            .overwrite_json("commonShowStudios", serde_json::Value::Array(studios))
            .await?;
        info!(count, "published show studios");

        let ratings = self.catalog.facets.show_parental_ratings().await?;
        let (added, removed) = self
            .cache
            .sync_list("commonShowParentalRatings", &ratings)
            .await?;
        info!(count = ratings.len(), added, removed, "published show parental ratings");

        let years = as_strings(self.catalog.facets.show_years().await?);
        let (added, removed) = self.cache.sync_list("commonShowYears", &years).await?;
        info!(count = years.len(), added, removed, "published show years");

        let genres = self.catalog.facets.movie_genres().await?;
        self.cache
            .overwrite_json("commonMovieGenres", serde_json::to_value(&genres)?)
            .await?;
        info!(count = genres.len(), "published movie genres");

        let studios = studio_entries(self.catalog.facets.movie_studios().await?);
        let count = studios.len();
        self.cache
            .overwrite_json("commonMovieStudios", serde_json::Value::Array(studios))
            .await?;
        info!(count, "published movie studios");

        let ratings = self.catalog.facets.movie_parental_ratings().await?;
        let (added, removed) = self
            .cache
            .sync_list("commonMovieParentalRatings", &ratings)
            .await?;
        info!(count = ratings.len(), added, removed, "published movie parental ratings");

        let years = as_strings(self.catalog.facets.movie_years().await?);
        let (added, removed) = self.cache.sync_list("commonMovieYears", &years).await?;
        info!(count = years.len(), added, removed, "published movie years");

        Ok(())
    }
}

fn studio_entries(studios: Vec<(i32, String)>) -> Vec<serde_json::Value> {
    studios
        .into_iter()
        .map(|(id, name)| json!({ "id": id, "name": name }))
        .collect()
}

fn as_strings(years: Vec<i32>) -> Vec<String> {
    years.into_iter().map(|y| y.to_string()).collect()
}
