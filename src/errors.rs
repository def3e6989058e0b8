//! Error types for ai-crawler.

use std::path::PathBuf;

use crate::output::OutputError;
use crate::tracking::TrackingError;
use crate::walker::WalkError;

/// Top-level error type for a crawl run.
///
/// Only fatal conditions end up here; unreadable ignore files, undecodable
/// content and unhashable files are absorbed where they occur.
#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    #[error("configuration must specify '{0}'")]
    MissingSetting(&'static str),

    #[error("path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("walk error: {0}")]
    Walk(#[from] WalkError),

    #[error("output error: {0}")]
    Output(#[from] OutputError),

    #[error("change tracking error: {0}")]
    Tracking(#[from] TrackingError),
}

/// Map an error to its exit code.
pub fn exit_code(error: &CrawlError) -> i32 {
    match error {
        CrawlError::MissingSetting(_) => 2,
        CrawlError::PathNotFound(_) => 3,
        CrawlError::Io(_) => 1,
        CrawlError::Walk(WalkError::NotFound { .. }) => 3,
        CrawlError::Walk(_) => 1,
        CrawlError::Output(_) => 1,
        CrawlError::Tracking(_) => 1,
    }
}
