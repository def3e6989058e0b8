//! ai-crawler - Snapshot source trees into size-bounded markdown bundles.
//!
//! ai-crawler walks one or more source directories in a deterministic
//! order, renders every non-ignored file as a fenced markdown section, and
//! packs the sections into `directory_contents_<n>.md` bundles no larger
//! than a configured bound. After each directory it records SHA-256
//! fingerprints of the sources and of the bundles so callers can tell
//! whether anything changed since the last run.
//!
//! # Quick Start
//!
//! ```no_run
//! use ai_crawler::builder::Crawler;
//!
//! let report = Crawler::new("./snapshots")
//!     .source("./my-project")
//!     .run()
//!     .unwrap();
//!
//! println!("Generated {} bundle(s)", report.bundle_count);
//! ```
//!
//! # Modules
//!
//! - [`filter`] - `.gitignore` / `.aiignore` rule resolution
//! - [`walker`] - Sorted, lazy, depth-first directory traversal
//! - [`format`] - Language detection and markdown rendering
//! - [`output`] - Size-bounded bundle writing
//! - [`tracking`] - Content fingerprints and change-tracking records
//! - [`config`] - Run configuration
//! - [`builder`] - Orchestration and fluent API

pub mod config;
pub mod errors;
pub mod filter;
pub mod walker;
pub mod format;
pub mod output;
pub mod tracking;
pub mod builder;

// Re-export key types at crate root for convenience
pub use builder::{run, CrawlReport, Crawler, DirectoryReport};
pub use config::Config;
pub use errors::CrawlError;
pub use filter::IgnoreFilter;
pub use format::{detect_language, RenderedBlock};
pub use output::{BundleWriter, OutputError};
pub use tracking::{ChangeTracking, TrackingError};
pub use walker::{WalkEntry, WalkError, Walker};
