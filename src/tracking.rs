//! Content fingerprints for change detection.
//!
//! After a source directory has been bundled, every file the walk yields
//! and every bundle currently in the output directory is hashed with
//! SHA-256. The two maps are written to `change_tracking-<index>.json`
//! next to the bundles, where `index` is the source directory's position
//! in the configured list.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use glob::Pattern;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;

use crate::filter::IgnoreFilter;
use crate::output::{BUNDLE_PREFIX, BUNDLE_SUFFIX};
use crate::walker::{walk, WalkEntry, WalkError};

/// Prefix of every change-tracking file.
pub const TRACKING_PREFIX: &str = "change_tracking-";

/// Errors that can occur while building or persisting a tracking record.
#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("walk error: {0}")]
    Walk(#[from] WalkError),

    #[error("failed to list output directory {path}: {source}")]
    ListOutput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid bundle pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to access tracking file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Fingerprints of one source directory and of the bundles present
/// alongside its tracking file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeTracking {
    /// Source path relative to its directory, `/`-separated → hex SHA-256.
    pub remote_files: BTreeMap<String, String>,
    /// Bundle file name → hex SHA-256.
    pub local_files: BTreeMap<String, String>,
}

impl ChangeTracking {
    /// Read a previously persisted record, if one exists.
    pub fn load(output_dir: &Path, index: usize) -> Result<Option<Self>, TrackingError> {
        let path = output_dir.join(tracking_file_name(index));
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(TrackingError::Io { path, source }),
        };
        Ok(Some(serde_json::from_str(&text)?))
    }

    /// Write the record as pretty-printed JSON, replacing any previous one.
    pub fn save(&self, output_dir: &Path, index: usize) -> Result<PathBuf, TrackingError> {
        let path = output_dir.join(tracking_file_name(index));
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&path, json).map_err(|source| TrackingError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

/// Name of the tracking file for a source directory index.
pub fn tracking_file_name(index: usize) -> String {
    format!("{TRACKING_PREFIX}{index}.json")
}

/// Lower-case hex SHA-256 of a byte slice.
pub fn fingerprint_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Lower-case hex SHA-256 of a file's raw bytes.
pub fn fingerprint(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(fingerprint_bytes(&bytes))
}

/// Compute the tracking record for `source_dir` and persist it as
/// `change_tracking-<index>.json` in `output_dir`.
///
/// The source tree is walked again with `filter`, independent of any
/// earlier bundling pass. Files that cannot be read are left out of the
/// maps.
pub fn track(
    source_dir: &Path,
    output_dir: &Path,
    filter: &IgnoreFilter,
    index: usize,
) -> Result<ChangeTracking, TrackingError> {
    let tracking = compute(source_dir, output_dir, filter)?;
    let path = tracking.save(output_dir, index)?;
    debug!(
        path = %path.display(),
        remote = tracking.remote_files.len(),
        local = tracking.local_files.len(),
        "wrote change tracking"
    );
    Ok(tracking)
}

/// Compute the tracking record without writing it.
pub fn compute(
    source_dir: &Path,
    output_dir: &Path,
    filter: &IgnoreFilter,
) -> Result<ChangeTracking, TrackingError> {
    let entries = walk(source_dir, filter).collect::<Result<Vec<WalkEntry>, _>>()?;

    let remote_files = entries
        .par_iter()
        .filter_map(|entry| {
            hash_or_skip(&entry.path).map(|hash| (entry.relative_display(), hash))
        })
        .collect();

    let mut local_files = BTreeMap::new();
    for name in bundle_names(output_dir)? {
        if let Some(hash) = hash_or_skip(&output_dir.join(&name)) {
            local_files.insert(name, hash);
        }
    }

    Ok(ChangeTracking {
        remote_files,
        local_files,
    })
}

/// Sorted names of the bundle files currently in `output_dir`.
pub fn bundle_names(output_dir: &Path) -> Result<Vec<String>, TrackingError> {
    let pattern = Pattern::new(&format!("{BUNDLE_PREFIX}*{BUNDLE_SUFFIX}"))?;
    let list_err = |source| TrackingError::ListOutput {
        path: output_dir.to_path_buf(),
        source,
    };

    let mut names = Vec::new();
    for entry in fs::read_dir(output_dir).map_err(list_err)? {
        let entry = entry.map_err(list_err)?;
        if let Some(name) = entry.file_name().to_str() {
            if pattern.matches(name) {
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}

fn hash_or_skip(path: &Path) -> Option<String> {
    match fingerprint(path) {
        Ok(hash) => Some(hash),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "unreadable file left out of tracking");
            None
        }
    }
}
