use anyhow::Context;
use std::env;

/// Runtime configuration, entirely from environment variables. A `.env`
/// file is honored when present (loaded in `main`).
#[derive(Debug, Clone)]
pub struct Config {
    // Catalog
    pub database_url: String,

    // Filter cache
    pub redis_host: String,
    pub redis_port: u16,
    pub redis_username: Option<String>,
    pub redis_password: Option<String>,

    // Metadata providers
    pub tmdb_api_key: String,
    pub omdb_api_key: String,

    // Library roots; a missing one skips that stage
    pub movies_folder: Option<String>,
    pub shows_folder: Option<String>,

    // Drive service account
    pub drive_client_id: String,
    pub drive_client_email: String,
    pub drive_private_key: String,
    pub drive_private_key_id: String,

    pub is_debug: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: required("DATABASE_URL")?,

            redis_host: required("REDIS_HOST")?,
            redis_port: required("REDIS_PORT")?
                .parse()
                .context("REDIS_PORT must be a port number")?,
            redis_username: env::var("REDIS_USERNAME").ok(),
            redis_password: env::var("REDIS_PASSWORD").ok(),

            tmdb_api_key: required("TMDB_API_KEY")?,
            omdb_api_key: required("OMDB_API_KEY")?,

            movies_folder: env::var("MOVIES_FOLDER").ok(),
            shows_folder: env::var("SHOWS_FOLDER").ok(),

            drive_client_id: required("GOOGLE_DRIVE_CLIENT_ID")?,
            drive_client_email: required("GOOGLE_DRIVE_CLIENT_EMAIL")?,
            drive_private_key: required("GOOGLE_DRIVE_PRIVATE_KEY_PKCS8")?,
            drive_private_key_id: required("GOOGLE_DRIVE_PRIVATE_KEY_ID")?,

            is_debug: env::var("IS_DEBUG")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
        })
    }
}

fn required(name: &str) -> anyhow::Result<String> {
    env::var(name).with_context(|| format!("{name} must be set"))
}
