//! Detail panel: the findings touching the selected line
//!
//! The panel is a pure projection of `(selection, line index)`. It holds no
//! state of its own and is recomputed whenever the selection changes.

use crate::finding::{AnalysisKind, Finding};
use crate::line_index::LineIndex;

/// What the detail panel shows.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailView {
    /// Nothing selected yet ("click a line")
    NoSelection,
    /// The analysis has no data for this document at all
    NotAvailable,
    /// Findings touching the selected line. `groups` is empty when the line
    /// has none.
    Line { line: usize, groups: Vec<DetailGroup> },
}

/// Findings of one analysis kind
#[derive(Debug, Clone, PartialEq)]
pub struct DetailGroup {
    pub kind: AnalysisKind,
    pub entries: Vec<DetailEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailEntry {
    pub finding: Finding,
}

impl DetailView {
    /// Project the findings at `selection`.
    ///
    /// `kind` is the analysis the document was opened under; it labels
    /// findings whose variant alone is ambiguous (violations).
    pub fn render(selection: Option<usize>, index: &LineIndex, kind: AnalysisKind) -> Self {
        if index.is_empty() {
            return DetailView::NotAvailable;
        }
        let Some(line) = selection else {
            return DetailView::NoSelection;
        };

        let mut groups: Vec<DetailGroup> = Vec::new();
        for finding in index.query(line) {
            let group_kind = kind_of(finding, kind);
            let entry = DetailEntry {
                finding: finding.clone(),
            };
            match groups.iter_mut().find(|g| g.kind == group_kind) {
                Some(group) => group.entries.push(entry),
                None => groups.push(DetailGroup {
                    kind: group_kind,
                    entries: vec![entry],
                }),
            }
        }
        groups.sort_by_key(|g| g.kind);

        DetailView::Line { line, groups }
    }

    pub fn selected_line(&self) -> Option<usize> {
        match self {
            DetailView::Line { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// All findings shown, in display order
    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        let groups: &[DetailGroup] = match self {
            DetailView::Line { groups, .. } => groups,
            _ => &[],
        };
        groups
            .iter()
            .flat_map(|g| g.entries.iter().map(|e| &e.finding))
    }

    pub fn is_empty(&self) -> bool {
        self.findings().next().is_none()
    }
}

fn kind_of(finding: &Finding, context: AnalysisKind) -> AnalysisKind {
    match finding {
        Finding::Line(f) if f.index.is_some() => AnalysisKind::BranchCoverage,
        Finding::Line(_) if context == AnalysisKind::BranchCoverage => AnalysisKind::BranchCoverage,
        Finding::Line(_) => AnalysisKind::StatementCoverage,
        Finding::Range(_) => AnalysisKind::Complexity,
        Finding::Overlap(_) => AnalysisKind::Duplication,
        Finding::Status(_) => AnalysisKind::MutationTest,
        Finding::Point(_) if context == AnalysisKind::RecipeViolation => {
            AnalysisKind::RecipeViolation
        }
        Finding::Point(_) => AnalysisKind::CodeViolation,
    }
}

impl DetailEntry {
    /// One-line label for the finding
    pub fn summary(&self) -> String {
        match &self.finding {
            Finding::Line(f) => {
                let state = if f.covered { "covered" } else { "not covered" };
                match f.index {
                    Some(arm) => format!("line {} branch {arm} {state}", f.line),
                    None => format!("line {} {state}", f.line),
                }
            }
            Finding::Range(f) => {
                let subject = match &f.function {
                    Some(name) => format!("{name} (lines {}-{})", f.start, f.end),
                    None => format!("lines {}-{}", f.start, f.end),
                };
                format!("{subject} complexity {}", f.value)
            }
            Finding::Overlap(f) => {
                let places = f.duplicate_blocks.len();
                let noun = if places == 1 { "place" } else { "places" };
                format!("lines {}-{} duplicated in {places} {noun}", f.start, f.end)
            }
            Finding::Status(f) => {
                let mutator = if f.mutator.is_empty() { "-" } else { &f.mutator };
                let killer = f.killing_test.as_deref().unwrap_or("-");
                format!("{}  {mutator} (killed by: {killer})", f.status)
            }
            Finding::Point(f) => {
                let mut summary = format!("{} {}: {}", f.severity, f.rule_id, f.message);
                if let Some(column) = f.column {
                    summary = format!("{summary} (column {column})");
                }
                if let Some(tool) = &f.tool {
                    summary = format!("{summary} [{tool}]");
                }
                summary
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::{
        DuplicateBlock, LineFinding, MultiStatusFinding, MutationStatus, OverlapFinding,
        PointFinding, RangeFinding, Severity,
    };

    fn line(line: usize, covered: bool) -> Finding {
        Finding::Line(LineFinding {
            line,
            covered,
            index: None,
        })
    }

    #[test]
    fn empty_index_is_not_available() {
        let index = LineIndex::build(Vec::new());
        assert_eq!(
            DetailView::render(Some(3), &index, AnalysisKind::StatementCoverage),
            DetailView::NotAvailable
        );
    }

    #[test]
    fn no_selection_renders_placeholder() {
        let index = LineIndex::build(vec![line(5, true)]);
        assert_eq!(
            DetailView::render(None, &index, AnalysisKind::StatementCoverage),
            DetailView::NoSelection
        );
    }

    #[test]
    fn shows_only_findings_on_selected_line() {
        let index = LineIndex::build(vec![line(5, true), line(6, false)]);

        let view = DetailView::render(Some(6), &index, AnalysisKind::StatementCoverage);
        let shown: Vec<&Finding> = view.findings().collect();
        assert_eq!(shown, vec![&line(6, false)]);

        let view = DetailView::render(Some(1), &index, AnalysisKind::StatementCoverage);
        assert_eq!(view.selected_line(), Some(1));
        assert!(view.is_empty());
    }

    #[test]
    fn ranges_group_by_kind() {
        let findings = vec![
            Finding::Range(RangeFinding {
                start: 1,
                end: 20,
                value: 4,
                function: Some("outer".into()),
            }),
            Finding::Overlap(OverlapFinding {
                start: 8,
                end: 12,
                duplicate_blocks: vec![],
            }),
            Finding::Point(PointFinding {
                line: 10,
                severity: Severity::Major,
                rule_id: "var".into(),
                message: "unquoted variable".into(),
                tool: None,
                column: None,
                description: None,
            }),
        ];
        let index = LineIndex::build(findings);
        let DetailView::Line { groups, .. } =
            DetailView::render(Some(10), &index, AnalysisKind::RecipeViolation)
        else {
            panic!("expected a line view");
        };
        let kinds: Vec<AnalysisKind> = groups.iter().map(|g| g.kind).collect();
        assert_eq!(
            kinds,
            vec![
                AnalysisKind::Complexity,
                AnalysisKind::Duplication,
                AnalysisKind::RecipeViolation
            ]
        );
    }

    #[test]
    fn summaries() {
        let entry = |finding: Finding| DetailEntry { finding }.summary();

        assert_eq!(entry(line(6, false)), "line 6 not covered");
        assert_eq!(
            entry(Finding::Overlap(OverlapFinding {
                start: 10,
                end: 24,
                duplicate_blocks: vec![
                    DuplicateBlock {
                        file: "a.c".into(),
                        start: 1,
                        end: 15
                    },
                    DuplicateBlock {
                        file: "b.c".into(),
                        start: 40,
                        end: 54
                    },
                ],
            })),
            "lines 10-24 duplicated in 2 places"
        );
        assert_eq!(
            entry(Finding::Status(MultiStatusFinding {
                line: 3,
                status: MutationStatus::Survived,
                mutator: "NegateConditionals".into(),
                mutated_class: String::new(),
                mutated_method: String::new(),
                killing_test: None,
            })),
            "SURVIVED  NegateConditionals (killed by: -)"
        );
        assert_eq!(
            entry(Finding::Range(RangeFinding {
                start: 3,
                end: 9,
                value: 12,
                function: Some("parse".into()),
            })),
            "parse (lines 3-9) complexity 12"
        );
    }
}
