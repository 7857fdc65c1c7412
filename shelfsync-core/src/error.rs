use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("drive auth error: {0}")]
    Auth(String),

    #[error("api error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, SyncError>;
