//! Crawl orchestration.
//!
//! Provides both a function entry point ([`run`]) and a builder-style API
//! ([`Crawler`]). Source directories are processed strictly one at a time:
//! each walk is fully drained into bundles before its change-tracking
//! record is written and the next directory starts.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::config::{resolve, Config};
use crate::errors::CrawlError;
use crate::filter::IgnoreFilter;
use crate::format::render_file;
use crate::output::BundleWriter;
use crate::tracking::{track, ChangeTracking};
use crate::walker::walk;

/// Builder for a crawl run.
///
/// # Examples
///
/// ```no_run
/// use ai_crawler::builder::Crawler;
///
/// let report = Crawler::new("./snapshots")
///     .source("./backend")
///     .source("./frontend")
///     .run()
///     .unwrap();
///
/// println!("generated {} markdown file(s)", report.bundle_count);
/// ```
#[derive(Debug, Clone)]
pub struct Crawler {
    config: Config,
}

impl Crawler {
    /// Create a crawler writing into `output_directory`.
    pub fn new(output_directory: impl Into<PathBuf>) -> Self {
        Self {
            config: Config::new(Vec::<PathBuf>::new(), output_directory),
        }
    }

    /// Create a crawler from an existing configuration.
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    /// Append a source directory.
    pub fn source(mut self, directory: impl Into<PathBuf>) -> Self {
        self.config.source_directories.push(directory.into());
        self
    }

    /// Override the bundle size bound.
    pub fn max_bundle_bytes(mut self, bytes: usize) -> Self {
        self.config.max_bundle_bytes = bytes;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the crawl.
    pub fn run(self) -> Result<CrawlReport, CrawlError> {
        run(&self.config)
    }
}

/// Outcome of one source directory.
#[derive(Debug, Clone, Serialize)]
pub struct DirectoryReport {
    /// Position in the configured list; also the tracking file index.
    pub index: usize,
    /// Absolute source directory.
    pub source: PathBuf,
    /// Basename shown in bundle headers.
    pub label: String,
    /// Bundles written for this directory.
    pub bundles: usize,
    pub tracking: ChangeTracking,
}

/// Outcome of a whole crawl run.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    /// Total bundle files written, equal to the last global part number.
    pub bundle_count: usize,
    /// Every bundle written, in part order.
    pub bundles: Vec<PathBuf>,
    pub directories: Vec<DirectoryReport>,
}

/// Bundle every configured source directory and record fingerprints.
///
/// Configuration is validated before any filesystem access. Part numbers
/// are global: the second directory continues where the first stopped.
pub fn run(config: &Config) -> Result<CrawlReport, CrawlError> {
    config.validate()?;

    let cwd = std::env::current_dir()?;
    let output_directory = resolve(&cwd, &config.output_directory);
    let mut writer = BundleWriter::create(&output_directory, config.max_bundle_bytes)?;

    let mut directories = Vec::with_capacity(config.source_directories.len());
    for (index, source) in config.source_directories.iter().enumerate() {
        let source = resolve(&cwd, source);
        if !source.exists() {
            return Err(CrawlError::PathNotFound(source));
        }

        let filter = IgnoreFilter::load(&source);
        let label = directory_label(&source);

        let mut session = writer.directory(label.as_str());
        let mut files = 0usize;
        for entry in walk(&source, &filter) {
            let entry = entry?;
            session.push(render_file(&entry.path, &entry.relative_display()))?;
            files += 1;
        }
        let bundles = session.finish()?;

        let tracking = track(&source, &output_directory, &filter, index)?;
        info!(
            index,
            source = %source.display(),
            files,
            bundles,
            "crawled directory"
        );

        directories.push(DirectoryReport {
            index,
            source,
            label,
            bundles,
            tracking,
        });
    }

    let report = CrawlReport {
        bundle_count: writer.parts_written(),
        bundles: writer.written().to_vec(),
        directories,
    };
    info!(
        bundles = report.bundle_count,
        output = %output_directory.display(),
        "crawl complete"
    );
    Ok(report)
}

/// Basename of a source directory, used in bundle headers.
pub fn directory_label(directory: &Path) -> String {
    directory.file_name().map_or_else(
        || directory.to_string_lossy().into_owned(),
        |n| n.to_string_lossy().into_owned(),
    )
}
