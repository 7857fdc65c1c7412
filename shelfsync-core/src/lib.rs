//! Core library for the shelfsync batch job.
//!
//! One run walks a Google Drive media tree, diffs it against the Postgres
//! catalog, enriches newly discovered files with TMDB and OMDb metadata,
//! persists the result, and republishes the denormalized filter facets to
//! Redis. Everything here is read-mostly plumbing around the reconciliation
//! engine in [`sync`].

pub mod cache;
pub mod catalog;
pub mod diff;
pub mod drive;
pub mod error;
pub mod model;
pub mod naming;
pub mod providers;
pub mod sync;

pub use error::{Result, SyncError};
