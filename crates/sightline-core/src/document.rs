//! Read-only source documents and line spans

use std::ops::RangeInclusive;
use std::path::Path;

/// Inclusive, 1-based span of lines. A span whose start is after its end
/// is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineSpan {
    pub start: usize,
    pub end: usize,
}

impl LineSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn single(line: usize) -> Self {
        Self {
            start: line,
            end: line,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    pub fn len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            (self.end - self.start).saturating_add(1)
        }
    }

    pub fn contains(&self, line: usize) -> bool {
        self.start <= line && line <= self.end
    }

    /// Restrict the span to lines that exist in a document of `line_count` lines
    pub fn clamp_to(&self, line_count: usize) -> LineSpan {
        LineSpan {
            start: self.start.max(1),
            end: self.end.min(line_count),
        }
    }

    pub fn iter(&self) -> RangeInclusive<usize> {
        self.start..=self.end
    }
}

/// File extensions mapped to the language hint handed to the text renderer.
const LANGUAGE_HINTS: &[(&str, &str)] = &[
    ("rs", "rust"),
    ("c", "c"),
    ("h", "c"),
    ("cc", "cpp"),
    ("cpp", "cpp"),
    ("cxx", "cpp"),
    ("hpp", "cpp"),
    ("hh", "cpp"),
    ("java", "java"),
    ("py", "python"),
    ("js", "javascript"),
    ("ts", "typescript"),
    ("go", "go"),
    ("sh", "bash"),
    ("bash", "bash"),
    ("bb", "bitbake"),
    ("bbappend", "bitbake"),
    ("bbclass", "bitbake"),
    ("inc", "bitbake"),
    ("conf", "bitbake"),
    ("json", "json"),
    ("yaml", "yaml"),
    ("yml", "yaml"),
    ("toml", "toml"),
    ("xml", "xml"),
    ("md", "markdown"),
];

/// A source file opened in the viewer. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    path: String,
    text: String,
    /// Byte offset where each line starts
    line_starts: Vec<usize>,
}

impl SourceDocument {
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        let mut line_starts = Vec::new();
        if !text.is_empty() {
            line_starts.push(0);
        }
        for (i, byte) in text.bytes().enumerate() {
            if byte == b'\n' && i + 1 < text.len() {
                line_starts.push(i + 1);
            }
        }
        Self {
            path: path.into(),
            text,
            line_starts,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    pub fn contains_line(&self, line: usize) -> bool {
        line >= 1 && line <= self.line_count()
    }

    /// Text of a 1-based line, without its terminator
    pub fn line(&self, line: usize) -> Option<&str> {
        if !self.contains_line(line) {
            return None;
        }
        let start = self.line_starts[line - 1];
        let end = self
            .line_starts
            .get(line)
            .copied()
            .unwrap_or(self.text.len());
        let raw = &self.text[start..end];
        let raw = raw.strip_suffix('\n').unwrap_or(raw);
        Some(raw.strip_suffix('\r').unwrap_or(raw))
    }

    pub fn language_hint(&self) -> &'static str {
        let path = Path::new(&self.path);
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        LANGUAGE_HINTS
            .iter()
            .find(|(e, _)| *e == ext)
            .map(|(_, lang)| *lang)
            .unwrap_or("plaintext")
    }
}
