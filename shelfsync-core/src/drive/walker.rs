//! Recursive folder walker with bounded fan-out.
//!
//! Child folders are walked on spawned tasks gated by a semaphore; files are
//! funneled to a single collector over a channel, so the walk has exactly one
//! writer of the result set. The caller blocks until the entire subtree has
//! been listed.

use crate::drive::api::DriveApi;
use crate::error::Result;
use crate::model::PathFile;
use std::sync::Arc;
use tokio::sync::{Semaphore, mpsc};
use tracing::debug;

/// Maximum in-flight folder branches.
const MAX_BRANCHES: usize = 100;

pub struct Walker<A: DriveApi + 'static> {
    api: Arc<A>,
    permits: Arc<Semaphore>,
}

impl<A: DriveApi + 'static> Walker<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            permits: Arc::new(Semaphore::new(MAX_BRANCHES)),
        }
    }

    /// Exhaustively lists every file under `root_folder_id`, paired with its
    /// folder path relative to the root. Any branch listing failure fails the
    /// whole walk.
    pub async fn list_recursive(&self, root_folder_id: &str) -> Result<Vec<PathFile>> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        Self::spawn_branch(
            self.api.clone(),
            self.permits.clone(),
            root_folder_id.to_string(),
            String::new(),
            tx,
        );

        let mut files = Vec::new();
        while let Some(item) = rx.recv().await {
            match item {
                Ok(path_file) => files.push(path_file),
                // Dropping the receiver unwinds the remaining branches.
                Err(e) => return Err(e),
            }
        }
        debug!(count = files.len(), "recursive listing complete");
        Ok(files)
    }

    fn spawn_branch(
        api: Arc<A>,
        permits: Arc<Semaphore>,
        folder_id: String,
        prefix: String,
        tx: mpsc::UnboundedSender<Result<PathFile>>,
    ) {
        tokio::spawn(async move {
            let _permit = match permits.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return,
            };

            let children = match api.list_children(&folder_id, false).await {
                Ok(children) => children,
                Err(e) => {
                    let _ = tx.send(Err(e));
                    return;
                }
            };

            for child in children {
                let path = format!("{prefix}{}", child.name);
                if child.is_folder() {
                    Self::spawn_branch(
                        api.clone(),
                        permits.clone(),
                        child.id.clone(),
                        format!("{path}/"),
                        tx.clone(),
                    );
                } else {
                    let _ = tx.send(Ok(PathFile { path, file: child }));
                }
            }
        });
    }
}
