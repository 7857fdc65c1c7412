//! Postgres implementations of the catalog ports. Queries are written
//! against the schema in the workspace `migrations/` directory and bound at
//! runtime; nothing here requires a live database to compile.

pub mod facets;
pub mod files;
pub mod genres;
pub mod movies;
mod people;
pub mod shows;

pub use facets::PostgresFacetStore;
pub use files::PostgresFileStore;
pub use genres::PostgresGenreStore;
pub use movies::PostgresMovieStore;
pub use shows::PostgresShowStore;
