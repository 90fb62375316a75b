//! sightline-core - Source annotation engine for build-quality findings
//!
//! This crate provides the building blocks for:
//! - Indexing analysis findings (coverage, complexity, duplication, mutation
//!   testing, violations) by the source lines they touch
//! - Resolving the findings on a line into a single decoration, with one
//!   overlay policy per analysis kind
//! - A source viewer that tracks the visible range and the selected line,
//!   and a detail panel projecting the findings at that line
//! - Paged, multi-column sorted lists whose page, sort order, selected row
//!   and scroll position round-trip through a URL query string
//!
//! Nothing here performs I/O. Documents and rows come from [`FileSource`]
//! and [`RowSource`] implementations supplied by the caller.
//!
//! # Decorating a document
//!
//! ```
//! use sightline_core::{
//!     AnalysisKind, Decoration, FileDetail, Finding, LineFinding, LineSpan,
//!     OverlaySettings, SourceViewer,
//! };
//!
//! let settings = OverlaySettings::default();
//! let mut viewer = SourceViewer::new(AnalysisKind::StatementCoverage, &settings);
//! let ticket = viewer.begin_load("src/main.c");
//! let detail = FileDetail {
//!     content: "int main() {\n  return 0;\n}\n".into(),
//!     findings: vec![Finding::Line(LineFinding { line: 2, covered: true, index: None })],
//!     tolerance: None,
//! };
//! viewer.finish_load(ticket, Ok(detail)).unwrap();
//!
//! let decorations = viewer.on_viewport_changed(LineSpan::new(1, 3));
//! assert_eq!(decorations.get(&2), Some(&Decoration::Covered));
//! ```
//!
//! # Restoring a list
//!
//! ```
//! use sightline_core::{ListNavigationState, Sorter};
//!
//! let state = ListNavigationState::deserialize(
//!     "page=2&sort=ratio:desc&selected=recipeA&scrollX=0&scrollY=120.5",
//!     &Sorter::asc("name"),
//! );
//! assert_eq!(state.page, 2);
//! assert_eq!(state.sorters, vec![Sorter::desc("ratio")]);
//! assert_eq!(state.selected_row.as_deref(), Some("recipeA"));
//! ```

pub mod detail;
pub mod document;
pub mod error;
pub mod finding;
pub mod line_index;
pub mod list_view;
pub mod navigation;
pub mod overlay;
pub mod paging;
pub mod sources;
pub mod viewer;

pub use detail::{DetailEntry, DetailGroup, DetailView};
pub use document::{LineSpan, SourceDocument};
pub use error::FetchError;
pub use finding::{
    AnalysisKind, DuplicateBlock, Finding, LineFinding, MultiStatusFinding, MutationStatus,
    OverlapFinding, PointFinding, RangeFinding, Severity,
};
pub use line_index::LineIndex;
pub use list_view::ListView;
pub use navigation::{ListNavigationState, MemoryHost, NavigationHost, NavigationLink};
pub use overlay::{
    DEFAULT_COMPLEXITY_TOLERANCE, DEFAULT_DUPLICATION_LEVELS, Decoration, OverlayPolicy,
    OverlaySettings,
};
pub use paging::{
    Page, PageRequest, SortDirection, SortKey, SortableList, SortableRow, Sorter, compare_rows,
};
pub use sources::{FileDetail, FileSource, MemorySource, RowSource};
pub use viewer::{LoadOutcome, LoadTicket, SelectionChange, SourceViewer};
