//! Redis-backed filter facet cache.
//!
//! Two write shapes: JSON blobs (genres, studios) are overwritten wholesale
//! on every publish, while plain lists (parental ratings, years) are brought
//! in line with the catalog by removing and pushing individual members.

use crate::error::Result;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, ConnectionAddr, ConnectionInfo, RedisConnectionInfo};
use std::collections::HashSet;
use tracing::info;

/// Facet publishing seam. The production implementation is [`FilterCache`]
/// over Redis; tests substitute an in-memory map.
#[async_trait]
pub trait FacetCache: Send + Sync {
    /// Replaces the value under `key` with the JSON serialization of `value`.
    async fn overwrite_json(&self, key: &str, value: serde_json::Value) -> Result<()>;

    /// Reconciles the list under `key` with `values`: members missing from
    /// `values` are removed, new ones are pushed. Returns `(added, removed)`
    /// counts. Existing members keep their position.
    async fn sync_list(&self, key: &str, values: &[String]) -> Result<(usize, usize)>;
}

#[derive(Clone)]
pub struct FilterCache {
    conn: ConnectionManager,
}

pub struct FilterCacheConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl FilterCache {
    pub async fn connect(config: FilterCacheConfig) -> Result<Self> {
        let info = ConnectionInfo {
            addr: ConnectionAddr::Tcp(config.host, config.port),
            redis: RedisConnectionInfo {
                username: config.username,
                password: config.password,
                ..Default::default()
            },
        };
        let client = redis::Client::open(info)?;
        let conn = ConnectionManager::new(client).await?;
        info!("filter cache connected");
        Ok(Self { conn })
    }
}

#[async_trait]
impl FacetCache for FilterCache {
    async fn overwrite_json(&self, key: &str, value: serde_json::Value) -> Result<()> {
        let payload = serde_json::to_string(&value)?;
        let mut conn = self.conn.clone();
        let _: () = conn.set(key, payload).await?;
        Ok(())
    }

    async fn sync_list(&self, key: &str, values: &[String]) -> Result<(usize, usize)> {
        let mut conn = self.conn.clone();
        let existing: Vec<String> = conn.lrange(key, 0, -1).await?;
        let existing: HashSet<String> = existing.into_iter().collect();
        let wanted: HashSet<&String> = values.iter().collect();

        let to_add: Vec<&String> = values.iter().filter(|v| !existing.contains(*v)).collect();
        let to_remove: Vec<&String> = existing.iter().filter(|v| !wanted.contains(v)).collect();

        for member in &to_remove {
            let _: () = conn.lrem(key, 0, member).await?;
        }
        if !to_add.is_empty() {
            let _: () = conn.lpush(key, &to_add).await?;
        }
        Ok((to_add.len(), to_remove.len()))
    }
}
