//! Size-bounded bundle writing.
//!
//! Rendered blocks for one source directory are accumulated in memory and
//! flushed to `directory_contents_<n>.md` files. A bundle is flushed before
//! the next block would push it past the configured byte bound; part
//! numbers are global to the [`BundleWriter`] and keep counting across
//! source directories.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::format::RenderedBlock;

/// File name prefix of every bundle.
pub const BUNDLE_PREFIX: &str = "directory_contents_";

/// File name suffix of every bundle.
pub const BUNDLE_SUFFIX: &str = ".md";

/// Default upper bound on a bundle's size (5 MiB).
pub const DEFAULT_MAX_BUNDLE_BYTES: usize = 5_242_880;

/// Errors that can occur while writing bundles.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write bundle {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Name of the bundle file for a global part number.
pub fn bundle_file_name(part: usize) -> String {
    format!("{BUNDLE_PREFIX}{part}{BUNDLE_SUFFIX}")
}

/// Header line opening every bundle.
pub fn bundle_header(label: &str, part: usize) -> String {
    format!("# Directory Contents: {label} (Part {part})\n\n")
}

/// Writes bundles into one output directory, numbering parts globally.
#[derive(Debug)]
pub struct BundleWriter {
    output_dir: PathBuf,
    max_bytes: usize,
    parts: usize,
    written: Vec<PathBuf>,
}

impl BundleWriter {
    /// Create a writer rooted at `output_dir`, creating the directory
    /// (and any missing parents) if needed.
    pub fn create(output_dir: impl Into<PathBuf>, max_bytes: usize) -> Result<Self, OutputError> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir).map_err(|source| OutputError::CreateDir {
            path: output_dir.clone(),
            source,
        })?;

        Ok(Self {
            output_dir,
            max_bytes,
            parts: 0,
            written: Vec::new(),
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Number of bundle files written so far (also the last part number used).
    pub fn parts_written(&self) -> usize {
        self.parts
    }

    /// Paths of every bundle written so far, in part order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// Start accumulating blocks for one source directory.
    ///
    /// `label` is the directory basename shown in each part's header. The
    /// session always opens a fresh part, so bundles never mix directories.
    pub fn directory(&mut self, label: impl Into<String>) -> DirectoryBundles<'_> {
        let label = label.into();
        let part = self.parts + 1;
        let header = bundle_header(&label, part);
        let current_size = header.len();

        DirectoryBundles {
            writer: self,
            label,
            part,
            header,
            current_size,
            buffer: Vec::new(),
            produced: 0,
        }
    }

    fn flush(&mut self, part: usize, header: &str, buffer: &[String]) -> Result<(), OutputError> {
        let path = self.output_dir.join(bundle_file_name(part));

        let len = header.len() + buffer.iter().map(String::len).sum::<usize>();
        let mut contents = String::with_capacity(len);
        contents.push_str(header);
        for text in buffer {
            contents.push_str(text);
        }

        fs::write(&path, contents).map_err(|source| OutputError::Write {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), part, bytes = len, files = buffer.len(), "wrote bundle");

        self.parts = part;
        self.written.push(path);
        Ok(())
    }
}

/// Bundle accumulator for a single source directory.
///
/// Call [`DirectoryBundles::push`] for each block in traversal order, then
/// [`DirectoryBundles::finish`] to flush the remainder.
#[derive(Debug)]
pub struct DirectoryBundles<'w> {
    writer: &'w mut BundleWriter,
    label: String,
    part: usize,
    header: String,
    current_size: usize,
    buffer: Vec<String>,
    produced: usize,
}

impl DirectoryBundles<'_> {
    /// Part number the next flush will write.
    pub fn current_part(&self) -> usize {
        self.part
    }

    /// Bytes accumulated for the current part, header included.
    pub fn current_size(&self) -> usize {
        self.current_size
    }

    /// Add a block, flushing the current part first if the block would
    /// push it past the bound.
    ///
    /// A block larger than the bound on its own is never split; it ends up
    /// alone in its part.
    pub fn push(&mut self, block: RenderedBlock) -> Result<(), OutputError> {
        let size = block.byte_size();

        if !self.buffer.is_empty() && self.current_size + size > self.writer.max_bytes {
            self.flush()?;
            self.part += 1;
            self.header = bundle_header(&self.label, self.part);
            self.current_size = self.header.len();
        }

        self.buffer.push(block.text);
        self.current_size += size;
        Ok(())
    }

    /// Flush any buffered blocks and return how many bundles this
    /// directory produced.
    pub fn finish(mut self) -> Result<usize, OutputError> {
        if !self.buffer.is_empty() {
            self.flush()?;
        }
        Ok(self.produced)
    }

    fn flush(&mut self) -> Result<(), OutputError> {
        self.writer.flush(self.part, &self.header, &self.buffer)?;
        self.buffer.clear();
        self.produced += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::render;
    use tempfile::TempDir;

    fn read(dir: &Path, part: usize) -> String {
        fs::read_to_string(dir.join(bundle_file_name(part))).unwrap()
    }

    #[test]
    fn test_names_and_header() {
        assert_eq!(bundle_file_name(3), "directory_contents_3.md");
        assert_eq!(bundle_header("src", 2), "# Directory Contents: src (Part 2)\n\n");
    }

    #[test]
    fn test_create_makes_nested_output_dir() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("a/b/out");

        let writer = BundleWriter::create(&out, DEFAULT_MAX_BUNDLE_BYTES).unwrap();
        assert!(out.is_dir());
        assert_eq!(writer.output_dir(), out.as_path());
        assert_eq!(writer.max_bytes(), DEFAULT_MAX_BUNDLE_BYTES);
        assert_eq!(writer.parts_written(), 0);
    }

    #[test]
    fn test_single_bundle_when_under_bound() {
        let dir = TempDir::new().unwrap();
        let mut writer = BundleWriter::create(dir.path(), DEFAULT_MAX_BUNDLE_BYTES).unwrap();

        let mut session = writer.directory("proj");
        session.push(render("a.py", "1", "python")).unwrap();
        session.push(render("b.txt", "2", "text")).unwrap();
        assert_eq!(session.finish().unwrap(), 1);

        assert_eq!(
            read(dir.path(), 1),
            "# Directory Contents: proj (Part 1)\n\n\
             ## File: a.py\n\n```python\n1\n```\n\n\
             ## File: b.txt\n\n```text\n2\n```\n\n"
        );
        assert_eq!(writer.parts_written(), 1);
    }

    #[test]
    fn test_splits_when_bound_exceeded() {
        let dir = TempDir::new().unwrap();
        let mut writer = BundleWriter::create(dir.path(), 100).unwrap();

        let a = render("a.py", "0123456789", "python");
        let b = render("b.txt", "0123456789", "text");
        let header = bundle_header("proj", 1).len();
        assert!(header + a.byte_size() <= 100);
        assert!(header + a.byte_size() + b.byte_size() > 100);

        let mut session = writer.directory("proj");
        session.push(a).unwrap();
        session.push(b).unwrap();
        assert_eq!(session.finish().unwrap(), 2);

        let first = read(dir.path(), 1);
        let second = read(dir.path(), 2);
        assert!(first.starts_with("# Directory Contents: proj (Part 1)\n\n"));
        assert!(first.contains("## File: a.py"));
        assert!(!first.contains("## File: b.txt"));
        assert!(second.starts_with("# Directory Contents: proj (Part 2)\n\n"));
        assert!(second.contains("## File: b.txt"));
        assert!(first.len() <= 100 && second.len() <= 100);
    }

    fn parts_for_bound(max: usize) -> usize {
        let dir = TempDir::new().unwrap();
        let mut writer = BundleWriter::create(dir.path(), max).unwrap();

        let mut session = writer.directory("proj");
        session.push(render("a.py", "0123456789", "python")).unwrap();
        session.push(render("b.py", "0123456789", "python")).unwrap();
        session.finish().unwrap()
    }

    #[test]
    fn test_block_landing_exactly_on_bound_stays() {
        let block = render("a.py", "0123456789", "python").byte_size();
        let exact = bundle_header("proj", 1).len() + 2 * block;

        assert_eq!(parts_for_bound(exact), 1);
        assert_eq!(parts_for_bound(exact - 1), 2);
    }

    #[test]
    fn test_current_size_tracks_header_and_blocks() {
        let dir = TempDir::new().unwrap();
        let mut writer = BundleWriter::create(dir.path(), 100).unwrap();
        let header = bundle_header("proj", 1).len();

        let mut session = writer.directory("proj");
        assert_eq!(session.current_size(), header);

        let block = render("a.py", "0123456789", "python");
        let size = block.byte_size();
        session.push(block).unwrap();
        assert_eq!(session.current_size(), header + size);

        // Rolling over resets to the new part's header plus the pushed block.
        let next = render("b.txt", "0123456789", "text");
        let next_size = next.byte_size();
        session.push(next).unwrap();
        assert_eq!(session.current_part(), 2);
        assert_eq!(
            session.current_size(),
            bundle_header("proj", 2).len() + next_size
        );
        session.finish().unwrap();
    }

    #[test]
    fn test_oversized_block_is_written_alone() {
        let dir = TempDir::new().unwrap();
        let mut writer = BundleWriter::create(dir.path(), 80).unwrap();

        let big = "x".repeat(500);
        let mut session = writer.directory("proj");
        session.push(render("small.txt", "s", "text")).unwrap();
        session.push(render("big.txt", &big, "text")).unwrap();
        session.push(render("tail.txt", "t", "text")).unwrap();
        assert_eq!(session.finish().unwrap(), 3);

        let middle = read(dir.path(), 2);
        assert!(middle.contains("## File: big.txt"));
        assert!(!middle.contains("small.txt"));
        assert!(!middle.contains("tail.txt"));
        assert!(middle.len() > 80);
    }

    #[test]
    fn test_oversized_first_block_writes_no_empty_bundle() {
        let dir = TempDir::new().unwrap();
        let mut writer = BundleWriter::create(dir.path(), 10).unwrap();

        let mut session = writer.directory("proj");
        session.push(render("big.txt", "0123456789", "text")).unwrap();
        assert_eq!(session.finish().unwrap(), 1);

        assert!(read(dir.path(), 1).contains("## File: big.txt"));
        assert!(!dir.path().join(bundle_file_name(2)).exists());
    }

    #[test]
    fn test_empty_directory_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let mut writer = BundleWriter::create(dir.path(), 100).unwrap();

        assert_eq!(writer.directory("empty").finish().unwrap(), 0);
        assert_eq!(writer.parts_written(), 0);
        assert!(!dir.path().join(bundle_file_name(1)).exists());
    }

    #[test]
    fn test_parts_continue_across_directories() {
        let dir = TempDir::new().unwrap();
        let mut writer = BundleWriter::create(dir.path(), DEFAULT_MAX_BUNDLE_BYTES).unwrap();

        let mut first = writer.directory("one");
        first.push(render("a.py", "a", "python")).unwrap();
        first.finish().unwrap();

        let mut second = writer.directory("two");
        assert_eq!(second.current_part(), 2);
        second.push(render("b.py", "b", "python")).unwrap();
        second.finish().unwrap();

        assert!(read(dir.path(), 1).starts_with("# Directory Contents: one (Part 1)"));
        assert!(read(dir.path(), 2).starts_with("# Directory Contents: two (Part 2)"));
        assert!(!read(dir.path(), 2).contains("a.py"));
        assert_eq!(writer.written().len(), 2);
    }

    #[test]
    fn test_write_failure_is_reported() {
        let dir = TempDir::new().unwrap();
        let mut writer = BundleWriter::create(dir.path(), 100).unwrap();
        // A directory squatting on the bundle name makes the write fail.
        fs::create_dir(dir.path().join(bundle_file_name(1))).unwrap();

        let mut session = writer.directory("proj");
        session.push(render("a.py", "a", "python")).unwrap();
        assert!(matches!(session.finish(), Err(OutputError::Write { .. })));
    }
}
