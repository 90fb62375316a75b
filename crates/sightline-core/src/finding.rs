//! Analysis findings attached to source lines

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::document::LineSpan;

/// The analysis that produced a finding.
///
/// Ordering follows the dashboard's column order and is used to group
/// findings in the detail panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisKind {
    StatementCoverage,
    BranchCoverage,
    Complexity,
    Duplication,
    MutationTest,
    CodeViolation,
    RecipeViolation,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 7] = [
        AnalysisKind::StatementCoverage,
        AnalysisKind::BranchCoverage,
        AnalysisKind::Complexity,
        AnalysisKind::Duplication,
        AnalysisKind::MutationTest,
        AnalysisKind::CodeViolation,
        AnalysisKind::RecipeViolation,
    ];

    /// Slug used in URLs, report file names and the CLI
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::StatementCoverage => "statement-coverage",
            AnalysisKind::BranchCoverage => "branch-coverage",
            AnalysisKind::Complexity => "complexity",
            AnalysisKind::Duplication => "duplication",
            AnalysisKind::MutationTest => "mutation-test",
            AnalysisKind::CodeViolation => "code-violation",
            AnalysisKind::RecipeViolation => "recipe-violation",
        }
    }

    /// Human-readable title
    pub fn title(&self) -> &'static str {
        match self {
            AnalysisKind::StatementCoverage => "Statement Coverage",
            AnalysisKind::BranchCoverage => "Branch Coverage",
            AnalysisKind::Complexity => "Complexity",
            AnalysisKind::Duplication => "Duplications",
            AnalysisKind::MutationTest => "Mutation Tests",
            AnalysisKind::CodeViolation => "Code Violations",
            AnalysisKind::RecipeViolation => "Recipe Violations",
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnalysisKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = AnalysisKind::ALL.iter().map(|k| k.as_str()).collect();
                format!("unknown analysis kind '{s}' (expected one of: {})", known.join(", "))
            })
    }
}

/// Outcome of a single mutant
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MutationStatus {
    Killed,
    Survived,
    Skipped,
    Error,
}

impl MutationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationStatus::Killed => "KILLED",
            MutationStatus::Survived => "SURVIVED",
            MutationStatus::Skipped => "SKIPPED",
            MutationStatus::Error => "ERROR",
        }
    }
}

impl fmt::Display for MutationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Violation level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Major,
    Minor,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Major => "MAJOR",
            Severity::Minor => "MINOR",
            Severity::Info => "INFO",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coverage of one instrumented line (or one branch arm on it)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineFinding {
    pub line: usize,
    pub covered: bool,
    /// Branch arm index for branch coverage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

/// Complexity of a function body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeFinding {
    pub start: usize,
    pub end: usize,
    pub value: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
}

/// Another location holding the same duplicated block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateBlock {
    pub file: String,
    pub start: usize,
    pub end: usize,
}

/// A duplicated block. Only the number of overlapping blocks matters for
/// decoration; `duplicate_blocks` is shown in the detail panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlapFinding {
    pub start: usize,
    pub end: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub duplicate_blocks: Vec<DuplicateBlock>,
}

/// One mutant. Several mutants may share a line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiStatusFinding {
    pub line: usize,
    pub status: MutationStatus,
    #[serde(default)]
    pub mutator: String,
    #[serde(default)]
    pub mutated_class: String,
    #[serde(default)]
    pub mutated_method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub killing_test: Option<String>,
}

/// A code or recipe violation reported at a single line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointFinding {
    pub line: usize,
    pub severity: Severity,
    pub rule_id: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One analysis result attached to a line or a line range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Finding {
    Line(LineFinding),
    Range(RangeFinding),
    Overlap(OverlapFinding),
    Status(MultiStatusFinding),
    Point(PointFinding),
}

impl Finding {
    /// Lines this finding touches (inclusive)
    pub fn span(&self) -> LineSpan {
        match self {
            Finding::Line(f) => LineSpan::single(f.line),
            Finding::Range(f) => LineSpan::new(f.start, f.end),
            Finding::Overlap(f) => LineSpan::new(f.start, f.end),
            Finding::Status(f) => LineSpan::single(f.line),
            Finding::Point(f) => LineSpan::single(f.line),
        }
    }

    pub fn touches(&self, line: usize) -> bool {
        self.span().contains(line)
    }

    /// Whether the finding is keyed by a range rather than a single line
    pub fn is_ranged(&self) -> bool {
        matches!(self, Finding::Range(_) | Finding::Overlap(_))
    }
}

impl From<LineFinding> for Finding {
    fn from(f: LineFinding) -> Self {
        Finding::Line(f)
    }
}

impl From<RangeFinding> for Finding {
    fn from(f: RangeFinding) -> Self {
        Finding::Range(f)
    }
}

impl From<OverlapFinding> for Finding {
    fn from(f: OverlapFinding) -> Self {
        Finding::Overlap(f)
    }
}

impl From<MultiStatusFinding> for Finding {
    fn from(f: MultiStatusFinding) -> Self {
        Finding::Status(f)
    }
}

impl From<PointFinding> for Finding {
    fn from(f: PointFinding) -> Self {
        Finding::Point(f)
    }
}
