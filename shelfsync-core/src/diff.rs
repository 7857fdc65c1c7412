//! Pure set diff between a remote listing and the catalog's file snapshot.

use crate::model::RemoteFile;
use std::collections::{HashMap, HashSet};

/// Outcome of diffing remote files against stored files by id.
///
/// The three sets are disjoint: `new` is remote-only, `stale_ids` is
/// catalog-only, `modified` is the intersection where the modified time
/// changed.
#[derive(Debug, Default)]
pub struct FileDiff {
    pub new: Vec<RemoteFile>,
    pub stale_ids: Vec<String>,
    pub modified: Vec<RemoteFile>,
}

pub fn diff_files(remote: &[RemoteFile], stored: &[RemoteFile]) -> FileDiff {
    let stored_by_id: HashMap<&str, &RemoteFile> =
        stored.iter().map(|f| (f.id.as_str(), f)).collect();

    let mut diff = FileDiff::default();
    for file in remote {
        match stored_by_id.get(file.id.as_str()) {
            None => diff.new.push(file.clone()),
            Some(db_file) if db_file.modified_time != file.modified_time => {
                diff.modified.push(file.clone());
            }
            Some(_) => {}
        }
    }

    let remote_ids: HashSet<&str> = remote.iter().map(|f| f.id.as_str()).collect();
    diff.stale_ids = stored
        .iter()
        .filter(|f| !remote_ids.contains(f.id.as_str()))
        .map(|f| f.id.clone())
        .collect();

    diff
}
