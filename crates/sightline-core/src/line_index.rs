//! Line number → findings lookup

use std::collections::HashMap;

use crate::finding::Finding;

/// Findings of one document, indexed by every line they touch.
///
/// Built once when a document is loaded and never mutated afterwards.
/// Line findings are stored under their line; range findings under every
/// line of their inclusive range, so lookups are O(1) at the cost of
/// O(range length) work at build time.
#[derive(Debug, Clone, Default)]
pub struct LineIndex {
    findings: Vec<Finding>,
    by_line: HashMap<usize, Vec<usize>>,
}

impl LineIndex {
    pub fn build(findings: impl IntoIterator<Item = Finding>) -> Self {
        Self::index(findings.into_iter().collect(), None)
    }

    /// Like [`build`](Self::build), but only lines `1..=line_count` are
    /// indexed. Findings reaching past the end of the document are kept
    /// and stay visible in [`findings`](Self::findings).
    pub fn build_within(findings: impl IntoIterator<Item = Finding>, line_count: usize) -> Self {
        Self::index(findings.into_iter().collect(), Some(line_count))
    }

    fn index(findings: Vec<Finding>, line_count: Option<usize>) -> Self {
        let mut by_line: HashMap<usize, Vec<usize>> = HashMap::new();

        for (slot, finding) in findings.iter().enumerate() {
            let span = match line_count {
                Some(count) => finding.span().clamp_to(count),
                None => finding.span(),
            };
            // Reversed ranges touch nothing
            for line in span.iter() {
                by_line.entry(line).or_default().push(slot);
            }
        }

        Self { findings, by_line }
    }

    /// Findings touching `line`, in the order they were supplied.
    /// Lines without findings (including out-of-range lines) yield nothing.
    pub fn query(&self, line: usize) -> Vec<&Finding> {
        self.by_line
            .get(&line)
            .map(|slots| slots.iter().map(|&slot| &self.findings[slot]).collect())
            .unwrap_or_default()
    }

    pub fn has_findings_at(&self, line: usize) -> bool {
        self.by_line.contains_key(&line)
    }

    /// All findings, in supply order
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    /// Number of distinct lines touched by at least one finding
    pub fn indexed_lines(&self) -> usize {
        self.by_line.len()
    }
}
