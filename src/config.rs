//! Run configuration.
//!
//! A crawl takes an ordered list of source directories and one output
//! directory. [`Config::from_settings`] accepts the raw host settings: a
//! comma-separated directory list and an output path, both resolved
//! against a workspace root when relative.

use std::path::{Path, PathBuf};

use crate::errors::CrawlError;
use crate::output::DEFAULT_MAX_BUNDLE_BYTES;

/// Setting name for the comma-separated source directory list.
pub const DIRECTORY_SETTING: &str = "directory";

/// Setting name for the bundle output directory.
pub const OUTPUT_DIRECTORY_SETTING: &str = "output_directory";

/// Explicit configuration for one crawl run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Source directories, processed in order; position is the tracking index.
    pub source_directories: Vec<PathBuf>,
    /// Directory receiving bundles and tracking files for the whole run.
    pub output_directory: PathBuf,
    /// Upper bound on a bundle's size in bytes.
    pub max_bundle_bytes: usize,
}

impl Config {
    pub fn new<I, P>(source_directories: I, output_directory: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            source_directories: source_directories.into_iter().map(Into::into).collect(),
            output_directory: output_directory.into(),
            max_bundle_bytes: DEFAULT_MAX_BUNDLE_BYTES,
        }
    }

    /// Build a configuration from raw host settings.
    ///
    /// `directory` is split on commas; entries are trimmed and blank ones
    /// dropped. Relative paths are joined onto `workspace_root`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ai_crawler::config::Config;
    /// use std::path::{Path, PathBuf};
    ///
    /// let config = Config::from_settings(Path::new("/ws"), "src, /abs/lib", "out").unwrap();
    /// assert_eq!(
    ///     config.source_directories,
    ///     vec![PathBuf::from("/ws/src"), PathBuf::from("/abs/lib")]
    /// );
    /// assert_eq!(config.output_directory, PathBuf::from("/ws/out"));
    /// ```
    pub fn from_settings(
        workspace_root: &Path,
        directory: &str,
        output_directory: &str,
    ) -> Result<Self, CrawlError> {
        let sources: Vec<PathBuf> = directory
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| resolve(workspace_root, Path::new(s)))
            .collect();

        if sources.is_empty() {
            return Err(CrawlError::MissingSetting(DIRECTORY_SETTING));
        }

        let output_directory = output_directory.trim();
        if output_directory.is_empty() {
            return Err(CrawlError::MissingSetting(OUTPUT_DIRECTORY_SETTING));
        }

        Ok(Self::new(
            sources,
            resolve(workspace_root, Path::new(output_directory)),
        ))
    }

    /// Override the bundle size bound.
    pub fn max_bundle_bytes(mut self, bytes: usize) -> Self {
        self.max_bundle_bytes = bytes;
        self
    }

    /// Check required values are present. Performs no I/O.
    pub fn validate(&self) -> Result<(), CrawlError> {
        if self.source_directories.is_empty()
            || self
                .source_directories
                .iter()
                .any(|p| p.as_os_str().is_empty())
        {
            return Err(CrawlError::MissingSetting(DIRECTORY_SETTING));
        }
        if self.output_directory.as_os_str().is_empty() {
            return Err(CrawlError::MissingSetting(OUTPUT_DIRECTORY_SETTING));
        }
        Ok(())
    }
}

/// Join `path` onto `base` unless it is already absolute.
pub fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
