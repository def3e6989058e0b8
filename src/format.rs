//! Per-file content formatting.
//!
//! Each source file becomes one markdown section: a `## File:` heading,
//! a fenced block tagged with the detected language label, and a trailing
//! blank line. The rendered byte size is computed once here and reused by
//! the bundle writer for its size accounting.

use std::fs;
use std::path::Path;

use tracing::warn;

/// Content substituted for files that cannot be read or decoded as UTF-8.
pub const UNREADABLE_PLACEHOLDER: &str =
    "Unable to read file contents (binary or unsupported encoding).";

/// Label for extensions missing from [`LANGUAGE_TABLE`].
pub const DEFAULT_LANGUAGE: &str = "text";

/// Lower-case extension to fenced-block label.
pub const LANGUAGE_TABLE: &[(&str, &str)] = &[
    ("py", "python"),
    ("php", "php"),
    ("js", "javascript"),
    ("json", "json"),
    ("html", "html"),
    ("css", "css"),
    ("java", "java"),
    ("cpp", "cpp"),
    ("c", "c"),
    ("cs", "csharp"),
    ("rb", "ruby"),
    ("go", "go"),
    ("ts", "typescript"),
    ("sql", "sql"),
    ("sh", "bash"),
    ("md", "markdown"),
    ("xml", "xml"),
    ("yaml", "yaml"),
    ("yml", "yaml"),
];

/// Detect a fenced-block language label from the file extension.
///
/// Case-insensitive. Unknown or missing extensions map to [`DEFAULT_LANGUAGE`].
pub fn detect_language(path: &Path) -> &'static str {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return DEFAULT_LANGUAGE;
    };
    let ext = ext.to_ascii_lowercase();

    LANGUAGE_TABLE
        .iter()
        .find(|(e, _)| *e == ext)
        .map_or(DEFAULT_LANGUAGE, |&(_, label)| label)
}

/// One source file rendered as a markdown section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBlock {
    /// Path relative to the source directory, `/`-separated.
    pub relative: String,
    pub language: &'static str,
    /// Full section text, heading through trailing blank line.
    pub text: String,
}

impl RenderedBlock {
    /// Exact UTF-8 byte length of [`RenderedBlock::text`].
    pub fn byte_size(&self) -> usize {
        self.text.len()
    }
}

/// Render a file's content as a markdown section.
///
/// # Examples
///
/// ```
/// use ai_crawler::format::render;
///
/// let block = render("src/app.py", "print(1)", "python");
/// assert_eq!(block.text, "## File: src/app.py\n\n```python\nprint(1)\n```\n\n");
/// assert_eq!(block.byte_size(), block.text.len());
/// ```
pub fn render(relative: &str, content: &str, language: &'static str) -> RenderedBlock {
    let text = format!("## File: {relative}\n\n```{language}\n{content}\n```\n\n");
    RenderedBlock {
        relative: relative.to_string(),
        language,
        text,
    }
}

/// Read a file as UTF-8 text, substituting [`UNREADABLE_PLACEHOLDER`] on failure.
pub fn read_content(path: &Path) -> String {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "unreadable file, using placeholder");
            return UNREADABLE_PLACEHOLDER.to_string();
        }
    };

    String::from_utf8(bytes).unwrap_or_else(|_| {
        warn!(path = %path.display(), "file is not valid UTF-8, using placeholder");
        UNREADABLE_PLACEHOLDER.to_string()
    })
}

/// Read, detect and render a single file.
pub fn render_file(path: &Path, relative: &str) -> RenderedBlock {
    let language = detect_language(path);
    let content = read_content(path);
    render(relative, &content, language)
}
