//! Deterministic, lazy directory traversal.
//!
//! Uses the `ignore` crate's walker with its standard filters switched
//! off: nested, global and `.git/info/exclude` rules never apply. Entries
//! at each level are sorted by raw file name bytes, hidden entries
//! (leading `.`) are skipped, and every candidate is checked against the
//! source directory's [`IgnoreFilter`] using its path relative to the walk
//! root. An excluded directory is never descended into.

use std::io;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use thiserror::Error;

use crate::filter::IgnoreFilter;

/// Errors that can occur during directory walking.
#[derive(Debug, Error)]
pub enum WalkError {
    #[error("path not found: {path}")]
    NotFound { path: PathBuf },

    #[error("not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A file discovered by the walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    /// Absolute (root-joined) path to the file.
    pub path: PathBuf,
    /// Path relative to the walk root.
    pub relative: PathBuf,
}

impl WalkEntry {
    /// Relative path with `/` separators on every platform.
    pub fn relative_display(&self) -> String {
        to_slash(&self.relative)
    }
}

/// Render a relative path with forward slashes.
pub fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Depth-first iterator over the files under a root directory.
///
/// Finite and non-restartable. Two walks over the same directory snapshot
/// with the same rules yield identical sequences. Symlinks are neither
/// yielded nor followed.
pub struct Walker {
    root: PathBuf,
    pending: Option<WalkError>,
    inner: Option<ignore::Walk>,
}

impl Walker {
    pub fn new(root: impl Into<PathBuf>, filter: &IgnoreFilter) -> Self {
        let root = root.into();

        if !root.exists() {
            return Self::failed(root.clone(), WalkError::NotFound { path: root });
        }
        if !root.is_dir() {
            return Self::failed(root.clone(), WalkError::NotADirectory { path: root });
        }

        let rules = filter.clone();
        let base = root.clone();

        let mut builder = WalkBuilder::new(&root);
        builder
            .standard_filters(false)
            .hidden(true)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                let Ok(relative) = entry.path().strip_prefix(&base) else {
                    return true;
                };
                let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
                !rules.matches(relative, is_dir)
            });

        Self {
            root,
            pending: None,
            inner: Some(builder.build()),
        }
    }

    fn failed(root: PathBuf, error: WalkError) -> Self {
        Self {
            root,
            pending: Some(error),
            inner: None,
        }
    }

    /// Root this walker was created for.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Iterator for Walker {
    type Item = Result<WalkEntry, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(error) = self.pending.take() {
            return Some(Err(error));
        }

        let inner = self.inner.as_mut()?;
        loop {
            match inner.next()? {
                Ok(entry) => {
                    if entry.depth() == 0 || !entry.file_type().is_some_and(|ft| ft.is_file()) {
                        continue;
                    }
                    let path = entry.into_path();
                    let relative = match path.strip_prefix(&self.root) {
                        Ok(relative) => relative.to_path_buf(),
                        Err(_) => continue,
                    };
                    return Some(Ok(WalkEntry { path, relative }));
                }
                Err(e) => {
                    // Skip non-IO errors (like malformed ignore globs)
                    if let Some(error) = convert_error(e, None) {
                        return Some(Err(error));
                    }
                }
            }
        }
    }
}

/// Walk `root`, skipping hidden entries and anything `filter` excludes.
///
/// # Examples
///
/// ```no_run
/// use ai_crawler::filter::IgnoreFilter;
/// use ai_crawler::walker::walk;
/// use std::path::Path;
///
/// let root = Path::new("./project");
/// let filter = IgnoreFilter::load(root);
/// for entry in walk(root, &filter).flatten() {
///     println!("{}", entry.relative_display());
/// }
/// ```
pub fn walk(root: &Path, filter: &IgnoreFilter) -> Walker {
    Walker::new(root, filter)
}

/// Convert ignore errors to our error type, keeping the innermost path.
fn convert_error(error: ignore::Error, path: Option<PathBuf>) -> Option<WalkError> {
    match error {
        ignore::Error::WithPath { path, err } => convert_error(*err, Some(path)),
        ignore::Error::WithDepth { err, .. } => convert_error(*err, path),
        ignore::Error::Io(io_err) => {
            let path = path.unwrap_or_else(|| PathBuf::from("<walk error>"));
            if io_err.kind() == io::ErrorKind::PermissionDenied {
                Some(WalkError::PermissionDenied { path })
            } else {
                Some(WalkError::Io {
                    path,
                    source: io_err,
                })
            }
        }
        _ => None,
    }
}
