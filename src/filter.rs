//! Ignore-rule resolution for a single source directory.
//!
//! Rules come from two optional files at the directory root: `.gitignore`
//! first, then `.aiignore`. Patterns from the second file are layered on
//! top of the first, so a `!negation` in `.aiignore` re-includes a path
//! that `.gitignore` excluded.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use tracing::{debug, warn};

/// General-purpose ignore file, read first.
pub const GITIGNORE_FILE: &str = ".gitignore";

/// Tool-specific ignore file, layered on top of [`GITIGNORE_FILE`].
pub const AIIGNORE_FILE: &str = ".aiignore";

/// Ignore files in the order their rules are applied.
pub const IGNORE_FILES: [&str; 2] = [GITIGNORE_FILE, AIIGNORE_FILE];

/// Layered ignore rules for one source directory.
///
/// Immutable after [`IgnoreFilter::load`]; paths passed to
/// [`IgnoreFilter::matches`] are relative to the directory it was loaded from.
#[derive(Debug, Clone)]
pub struct IgnoreFilter {
    root: PathBuf,
    rules: Gitignore,
}

impl IgnoreFilter {
    /// Load `.gitignore` and `.aiignore` from `directory`.
    ///
    /// Never fails: a missing or unreadable file contributes no rules, and a
    /// malformed pattern is skipped.
    pub fn load(directory: &Path) -> Self {
        let mut builder = GitignoreBuilder::new(directory);

        for name in IGNORE_FILES {
            let path = directory.join(name);
            match fs::read_to_string(&path) {
                Ok(text) => add_rules(&mut builder, &path, &text),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    debug!(path = %path.display(), "no ignore file");
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "unreadable ignore file, skipping");
                }
            }
        }

        let rules = builder.build().unwrap_or_else(|e| {
            warn!(root = %directory.display(), error = %e, "failed to build ignore rules");
            Gitignore::empty()
        });

        Self {
            root: directory.to_path_buf(),
            rules,
        }
    }

    /// A filter with no rules; nothing is excluded.
    pub fn empty(directory: &Path) -> Self {
        Self {
            root: directory.to_path_buf(),
            rules: Gitignore::empty(),
        }
    }

    /// Directory the rules were loaded from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of patterns in the layered rule set.
    pub fn len(&self) -> usize {
        self.rules.num_ignores() as usize + self.rules.num_whitelists() as usize
    }

    /// Returns true when no patterns were loaded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Is `relative` excluded by the layered rules?
    ///
    /// `relative` is interpreted against the filter root. A path below an
    /// excluded directory is excluded as well.
    pub fn matches(&self, relative: &Path, is_dir: bool) -> bool {
        if relative.as_os_str().is_empty() || relative.has_root() {
            return false;
        }
        self.rules
            .matched_path_or_any_parents(relative, is_dir)
            .is_ignore()
    }
}

fn add_rules(builder: &mut GitignoreBuilder, from: &Path, text: &str) {
    for line in text.lines() {
        if let Err(e) = builder.add_line(Some(from.to_path_buf()), line) {
            warn!(path = %from.display(), pattern = line, error = %e, "skipping malformed ignore pattern");
        }
    }
}
