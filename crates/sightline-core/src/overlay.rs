//! Overlay policies: resolving the findings on a line into one decoration
//!
//! Each analysis kind has its own rule for collapsing possibly-many findings
//! on a line into a single decoration class. Policies are total functions:
//! empty or mismatched input yields no decoration, never an error.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::document::LineSpan;
use crate::finding::{AnalysisKind, Finding, MutationStatus};
use crate::line_index::LineIndex;

/// Palette size for duplication intensity
pub const DEFAULT_DUPLICATION_LEVELS: u8 = 5;

/// Complexity at or above which a function is flagged
pub const DEFAULT_COMPLEXITY_TOLERANCE: u64 = 10;

/// Visual class attached to a source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Decoration {
    Covered,
    Uncovered,
    Complex,
    NotComplex,
    /// Duplication intensity, from 1 up to `levels - 1`
    Duplicated(u8),
    Killed,
    Survived,
    Skipped,
    MixedWithSurvived,
    MixedWithoutSurvived,
}

impl Decoration {
    pub fn class_name(&self) -> Cow<'static, str> {
        match self {
            Decoration::Covered => Cow::Borrowed("covered"),
            Decoration::Uncovered => Cow::Borrowed("uncovered"),
            Decoration::Complex => Cow::Borrowed("complex"),
            Decoration::NotComplex => Cow::Borrowed("not-complex"),
            Decoration::Duplicated(level) => Cow::Owned(format!("duplicated-{level}")),
            Decoration::Killed => Cow::Borrowed("killed"),
            Decoration::Survived => Cow::Borrowed("survived"),
            Decoration::Skipped => Cow::Borrowed("skipped"),
            Decoration::MixedWithSurvived => Cow::Borrowed("mixed-with-survived"),
            Decoration::MixedWithoutSurvived => Cow::Borrowed("mixed-without-survived"),
        }
    }
}

impl fmt::Display for Decoration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.class_name())
    }
}

/// Per-deployment knobs consumed when picking a policy for a kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlaySettings {
    pub complexity_tolerance: u64,
    pub duplication_levels: u8,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            complexity_tolerance: DEFAULT_COMPLEXITY_TOLERANCE,
            duplication_levels: DEFAULT_DUPLICATION_LEVELS,
        }
    }
}

/// Decoration strategy for one analysis kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayPolicy {
    /// Line and branch coverage
    Coverage,
    /// Function complexity against a tolerance
    Complexity { tolerance: u64 },
    /// Number of duplicated blocks overlapping a line
    Duplication { levels: u8 },
    /// Priority rule over the statuses of the mutants on a line
    MutationTest,
    /// Violations never decorate; they surface only in the detail panel
    Violation,
}

impl OverlayPolicy {
    pub fn for_kind(kind: AnalysisKind, settings: &OverlaySettings) -> Self {
        match kind {
            AnalysisKind::StatementCoverage | AnalysisKind::BranchCoverage => {
                OverlayPolicy::Coverage
            }
            AnalysisKind::Complexity => OverlayPolicy::Complexity {
                tolerance: settings.complexity_tolerance,
            },
            AnalysisKind::Duplication => OverlayPolicy::Duplication {
                levels: settings.duplication_levels,
            },
            AnalysisKind::MutationTest => OverlayPolicy::MutationTest,
            AnalysisKind::CodeViolation | AnalysisKind::RecipeViolation => {
                OverlayPolicy::Violation
            }
        }
    }

    /// Replace the complexity tolerance with one delivered alongside a
    /// document. Other policies are returned unchanged.
    pub fn with_tolerance(self, tolerance: Option<u64>) -> Self {
        match (self, tolerance) {
            (OverlayPolicy::Complexity { .. }, Some(tolerance)) => {
                OverlayPolicy::Complexity { tolerance }
            }
            (policy, _) => policy,
        }
    }

    /// Resolve the findings touching one line into a decoration.
    pub fn decorate(&self, findings: &[&Finding]) -> Option<Decoration> {
        match *self {
            OverlayPolicy::Coverage => decorate_coverage(findings),
            OverlayPolicy::Complexity { tolerance } => decorate_complexity(findings, tolerance),
            OverlayPolicy::Duplication { levels } => decorate_duplication(findings, levels),
            OverlayPolicy::MutationTest => decorate_mutation(findings),
            OverlayPolicy::Violation => None,
        }
    }

    /// Decorations for every line in `span` that has one.
    pub fn decorate_span(&self, index: &LineIndex, span: LineSpan) -> BTreeMap<usize, Decoration> {
        let mut decorations = BTreeMap::new();
        if matches!(self, OverlayPolicy::Violation) {
            return decorations;
        }
        for line in span.iter() {
            if !index.has_findings_at(line) {
                continue;
            }
            if let Some(decoration) = self.decorate(&index.query(line)) {
                decorations.insert(line, decoration);
            }
        }
        decorations
    }
}

fn decorate_coverage(findings: &[&Finding]) -> Option<Decoration> {
    let mut seen = false;
    let mut all_covered = true;
    for finding in findings {
        if let Finding::Line(f) = finding {
            seen = true;
            all_covered &= f.covered;
        }
    }
    match (seen, all_covered) {
        (false, _) => None,
        (true, true) => Some(Decoration::Covered),
        (true, false) => Some(Decoration::Uncovered),
    }
}

fn decorate_complexity(findings: &[&Finding], tolerance: u64) -> Option<Decoration> {
    let mut seen = false;
    for finding in findings {
        if let Finding::Range(f) = finding {
            if f.value >= tolerance {
                return Some(Decoration::Complex);
            }
            seen = true;
        }
    }
    seen.then_some(Decoration::NotComplex)
}

fn decorate_duplication(findings: &[&Finding], levels: u8) -> Option<Decoration> {
    let overlap = findings
        .iter()
        .filter(|f| matches!(f, Finding::Overlap(_)))
        .count();
    if overlap == 0 {
        return None;
    }
    let cap = usize::from(levels.saturating_sub(1));
    let level = (overlap - 1).min(cap);
    if level == 0 {
        return None;
    }
    // level <= cap <= u8::MAX
    Some(Decoration::Duplicated(level as u8))
}

fn decorate_mutation(findings: &[&Finding]) -> Option<Decoration> {
    let statuses: BTreeSet<MutationStatus> = findings
        .iter()
        .filter_map(|f| match f {
            Finding::Status(m) => Some(m.status),
            _ => None,
        })
        .collect();

    if statuses.is_empty() {
        return None;
    }
    // A survivor anywhere on the line dominates
    if statuses.len() > 1 {
        return Some(if statuses.contains(&MutationStatus::Survived) {
            Decoration::MixedWithSurvived
        } else {
            Decoration::MixedWithoutSurvived
        });
    }
    Some(match statuses.first() {
        Some(MutationStatus::Killed) => Decoration::Killed,
        Some(MutationStatus::Survived) => Decoration::Survived,
        _ => Decoration::Skipped,
    })
}
