//! Read-only Google Drive access: service-account auth, paged folder
//! listing, and the bounded recursive walker.

pub mod api;
pub mod auth;
pub mod walker;

pub use api::{DriveApi, GoogleDriveClient};
pub use auth::{ServiceAccount, TokenProvider};
pub use walker::Walker;

pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";
