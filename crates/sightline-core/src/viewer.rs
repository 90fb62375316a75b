//! The source viewer: one document, its findings and the current selection
//!
//! ```text
//! Empty ──load──▶ Loaded(selection = none) ──click──▶ Loaded(selection = line)
//!                   ▲                                        │
//!                   └────────────── load / clear ◀───────────┘
//! ```
//!
//! A viewer is parameterized by an [`OverlayPolicy`] rather than by the
//! analysis kind's own type, so every kind shares the same state machine.
//! Decorations are computed only for the visible line range and replaced
//! wholesale whenever the viewport moves.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::detail::DetailView;
use crate::document::{LineSpan, SourceDocument};
use crate::error::FetchError;
use crate::finding::AnalysisKind;
use crate::line_index::LineIndex;
use crate::overlay::{Decoration, OverlayPolicy, OverlaySettings};
use crate::sources::{FileDetail, FileSource};

/// Lines decorated right after a load, before the renderer reports its
/// actual viewport
pub const INITIAL_VIEWPORT_LINES: usize = 50;

/// Handle for one in-flight document fetch.
///
/// Tickets carry the generation current when the fetch started. Completing
/// a ticket after a newer fetch began is a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct LoadTicket {
    generation: u64,
    path: String,
}

impl LoadTicket {
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Result of completing a fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The document replaced whatever was loaded
    Loaded,
    /// A newer fetch superseded this one; nothing changed
    Discarded,
}

/// Effect of a selection event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    /// Same line re-activated, line out of range, or nothing loaded
    Unchanged,
    Selected(usize),
    Cleared,
}

impl SelectionChange {
    /// Whether the detail panel must be re-rendered
    pub fn is_changed(&self) -> bool {
        !matches!(self, SelectionChange::Unchanged)
    }
}

#[derive(Debug)]
struct Loaded {
    document: SourceDocument,
    index: LineIndex,
    /// Base policy adjusted by the document's own tolerance, if any
    policy: OverlayPolicy,
    selection: Option<usize>,
}

#[derive(Debug)]
enum ViewerState {
    Empty,
    Loaded(Box<Loaded>),
}

/// Viewer for a single document under one analysis kind.
#[derive(Debug)]
pub struct SourceViewer {
    kind: AnalysisKind,
    policy: OverlayPolicy,
    state: ViewerState,
    generation: u64,
    viewport: Option<LineSpan>,
    decorations: BTreeMap<usize, Decoration>,
}

impl SourceViewer {
    pub fn new(kind: AnalysisKind, settings: &OverlaySettings) -> Self {
        Self::with_policy(kind, OverlayPolicy::for_kind(kind, settings))
    }

    pub fn with_policy(kind: AnalysisKind, policy: OverlayPolicy) -> Self {
        Self {
            kind,
            policy,
            state: ViewerState::Empty,
            generation: 0,
            viewport: None,
            decorations: BTreeMap::new(),
        }
    }

    pub fn kind(&self) -> AnalysisKind {
        self.kind
    }

    /// Policy in effect for the loaded document
    pub fn policy(&self) -> OverlayPolicy {
        match &self.state {
            ViewerState::Loaded(loaded) => loaded.policy,
            ViewerState::Empty => self.policy,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, ViewerState::Loaded(_))
    }

    pub fn document(&self) -> Option<&SourceDocument> {
        match &self.state {
            ViewerState::Loaded(loaded) => Some(&loaded.document),
            ViewerState::Empty => None,
        }
    }

    pub fn line_index(&self) -> Option<&LineIndex> {
        match &self.state {
            ViewerState::Loaded(loaded) => Some(&loaded.index),
            ViewerState::Empty => None,
        }
    }

    pub fn selection(&self) -> Option<usize> {
        match &self.state {
            ViewerState::Loaded(loaded) => loaded.selection,
            ViewerState::Empty => None,
        }
    }

    /// Visible range the current decorations were computed for
    pub fn viewport(&self) -> Option<LineSpan> {
        self.viewport
    }

    /// Decorations of the visible lines
    pub fn decorations(&self) -> &BTreeMap<usize, Decoration> {
        &self.decorations
    }

    /// Start fetching `path`. Any ticket issued earlier becomes stale.
    pub fn begin_load(&mut self, path: impl Into<String>) -> LoadTicket {
        self.generation += 1;
        let ticket = LoadTicket {
            generation: self.generation,
            path: path.into(),
        };
        debug!(path = %ticket.path, generation = ticket.generation, "loading document");
        ticket
    }

    /// Complete a fetch started with [`begin_load`](Self::begin_load).
    ///
    /// Stale tickets are discarded whatever their result. A failed current
    /// fetch leaves the previous document (or the empty state) in place and
    /// hands the error back to the caller.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<FileDetail, FetchError>,
    ) -> Result<LoadOutcome, FetchError> {
        if ticket.generation != self.generation {
            debug!(
                path = %ticket.path,
                generation = ticket.generation,
                current = self.generation,
                "discarding stale document fetch"
            );
            return Ok(LoadOutcome::Discarded);
        }

        match result {
            Ok(detail) => {
                self.install(ticket.path, detail);
                Ok(LoadOutcome::Loaded)
            }
            Err(e) => {
                warn!(path = %ticket.path, error = %e, "document fetch failed");
                Err(e)
            }
        }
    }

    /// Fetch `path` from `source` and load it.
    pub async fn load_document<S>(
        &mut self,
        source: &S,
        path: &str,
    ) -> Result<LoadOutcome, FetchError>
    where
        S: FileSource + ?Sized,
    {
        let ticket = self.begin_load(path);
        let result = source.fetch_file(path).await;
        self.finish_load(ticket, result)
    }

    fn install(&mut self, path: String, detail: FileDetail) {
        let document = SourceDocument::new(path, detail.content);
        let index = LineIndex::build_within(detail.findings, document.line_count());
        let policy = self.policy.with_tolerance(detail.tolerance);
        debug!(
            path = document.path(),
            lines = document.line_count(),
            findings = index.len(),
            "document loaded"
        );

        let height = self
            .viewport
            .map(|v| v.len())
            .filter(|&h| h > 0)
            .unwrap_or(INITIAL_VIEWPORT_LINES);

        self.state = ViewerState::Loaded(Box::new(Loaded {
            document,
            index,
            policy,
            selection: None,
        }));
        self.on_viewport_changed(LineSpan::new(1, height));
    }

    /// Recompute decorations for `visible`, replacing those of the previous
    /// viewport. The selection is untouched.
    pub fn on_viewport_changed(&mut self, visible: LineSpan) -> &BTreeMap<usize, Decoration> {
        let ViewerState::Loaded(loaded) = &self.state else {
            return &self.decorations;
        };
        let span = visible.clamp_to(loaded.document.line_count());
        self.decorations = loaded.policy.decorate_span(&loaded.index, span);
        self.viewport = Some(span);
        &self.decorations
    }

    /// Select `line`. Re-activating the selected line does nothing, as do
    /// lines outside the document.
    pub fn on_line_activated(&mut self, line: usize) -> SelectionChange {
        let ViewerState::Loaded(loaded) = &mut self.state else {
            return SelectionChange::Unchanged;
        };
        if !loaded.document.contains_line(line) {
            debug!(
                line,
                lines = loaded.document.line_count(),
                "ignoring activation outside document"
            );
            return SelectionChange::Unchanged;
        }
        if loaded.selection == Some(line) {
            return SelectionChange::Unchanged;
        }
        loaded.selection = Some(line);
        SelectionChange::Selected(line)
    }

    pub fn clear_selection(&mut self) -> SelectionChange {
        match &mut self.state {
            ViewerState::Loaded(loaded) if loaded.selection.is_some() => {
                loaded.selection = None;
                SelectionChange::Cleared
            }
            _ => SelectionChange::Unchanged,
        }
    }

    /// Decoration of a single line, whether or not it is visible
    pub fn decoration_at(&self, line: usize) -> Option<Decoration> {
        let ViewerState::Loaded(loaded) = &self.state else {
            return None;
        };
        if let Some(decoration) = self.decorations.get(&line) {
            return Some(*decoration);
        }
        loaded.policy.decorate(&loaded.index.query(line))
    }

    /// Detail panel contents for the current selection
    pub fn detail(&self) -> DetailView {
        match &self.state {
            ViewerState::Loaded(loaded) => {
                DetailView::render(loaded.selection, &loaded.index, self.kind)
            }
            ViewerState::Empty => DetailView::NoSelection,
        }
    }
}
