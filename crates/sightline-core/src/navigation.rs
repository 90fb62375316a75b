//! List navigation state carried through the URL
//!
//! When a row of a paged list is activated, the list's page, sort order,
//! selected row and scroll position are written to the query string of the
//! URL it navigates to. A list constructed from that URL later (after the
//! user comes back) decodes the same state and restores itself exactly.
//!
//! Query string form:
//!
//! ```text
//! page=2&sort=ratio:desc,name:asc&selected=recipeA&scrollX=0&scrollY=120.5
//! ```
//!
//! Column names and row ids are percent-encoded, so `,` and `:` inside them
//! survive. Decoding is lenient: unknown keys are ignored and malformed
//! values fall back to their defaults.

use std::borrow::Cow;

use crate::paging::{SortDirection, Sorter};

const KEY_PAGE: &str = "page";
const KEY_SORT: &str = "sort";
const KEY_SELECTED: &str = "selected";
const KEY_SCROLL_X: &str = "scrollX";
const KEY_SCROLL_Y: &str = "scrollY";

/// Page, sort order, selection and scroll position of a list view.
#[derive(Debug, Clone, PartialEq)]
pub struct ListNavigationState {
    /// 1-based page number
    pub page: usize,
    /// Ordered sort specification; the first sorter is primary
    pub sorters: Vec<Sorter>,
    pub selected_row: Option<String>,
    pub scroll_x: f64,
    pub scroll_y: f64,
}

impl Default for ListNavigationState {
    fn default() -> Self {
        Self {
            page: 1,
            sorters: Vec::new(),
            selected_row: None,
            scroll_x: 0.0,
            scroll_y: 0.0,
        }
    }
}

impl ListNavigationState {
    /// Encode as a query string (without the leading `?`)
    pub fn serialize(&self) -> String {
        let mut pairs: Vec<String> = Vec::with_capacity(5);
        pairs.push(format!("{KEY_PAGE}={}", self.page.max(1)));
        if !self.sorters.is_empty() {
            let sort: Vec<String> = self
                .sorters
                .iter()
                .map(|s| format!("{}:{}", urlencoding::encode(&s.column), s.direction))
                .collect();
            pairs.push(format!("{KEY_SORT}={}", sort.join(",")));
        }
        if let Some(row) = &self.selected_row {
            pairs.push(format!("{KEY_SELECTED}={}", urlencoding::encode(row)));
        }
        pairs.push(format!("{KEY_SCROLL_X}={}", finite_or_zero(self.scroll_x)));
        pairs.push(format!("{KEY_SCROLL_Y}={}", finite_or_zero(self.scroll_y)));
        pairs.join("&")
    }

    /// Decode a query string (or a full URL) carrying list state.
    ///
    /// Returns `None` if none of the state keys are present, i.e. the list
    /// was opened fresh rather than returned to.
    pub fn parse(query: &str) -> Option<Self> {
        let mut state = ListNavigationState::default();
        let mut recognized = false;

        for (key, raw) in query_pairs(query) {
            match key {
                KEY_PAGE => {
                    recognized = true;
                    state.page = raw.parse::<usize>().unwrap_or(1).max(1);
                }
                KEY_SORT => {
                    recognized = true;
                    state.sorters = parse_sorters(raw);
                }
                KEY_SELECTED => {
                    recognized = true;
                    state.selected_row = decode_component(raw).map(Cow::into_owned);
                }
                KEY_SCROLL_X => {
                    recognized = true;
                    state.scroll_x = parse_offset(raw);
                }
                KEY_SCROLL_Y => {
                    recognized = true;
                    state.scroll_y = parse_offset(raw);
                }
                _ => {}
            }
        }

        recognized.then_some(state)
    }

    /// Decode a query string, substituting `default_sorter` when it carries
    /// no sort order so the list is never left unsorted.
    pub fn deserialize(query: &str, default_sorter: &Sorter) -> Self {
        Self::parse(query)
            .unwrap_or_default()
            .with_default_sorter(default_sorter)
    }

    pub fn with_default_sorter(mut self, default_sorter: &Sorter) -> Self {
        if self.sorters.is_empty() {
            self.sorters.push(default_sorter.clone());
        }
        self
    }
}

/// A navigation target plus the list state to restore on return
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationLink {
    pub target: String,
    pub state: ListNavigationState,
}

impl NavigationLink {
    pub fn new(target: impl Into<String>, state: ListNavigationState) -> Self {
        Self {
            target: target.into(),
            state,
        }
    }

    /// `target?query`, with each path segment of the target percent-encoded
    pub fn to_url(&self) -> String {
        let target: Vec<Cow<'_, str>> = self.target.split('/').map(urlencoding::encode).collect();
        format!("{}?{}", target.join("/"), self.state.serialize())
    }

    pub fn parse(url: &str, default_sorter: &Sorter) -> Self {
        let url = strip_fragment(url);
        let (path, query) = url.split_once('?').unwrap_or((url, ""));
        let target: Vec<String> = path
            .split('/')
            .map(|segment| {
                decode_component(segment)
                    .map(Cow::into_owned)
                    .unwrap_or_else(|| segment.to_string())
            })
            .collect();
        Self {
            target: target.join("/"),
            state: ListNavigationState::deserialize(query, default_sorter),
        }
    }
}

/// Boundary to the browser location and window scroll position.
pub trait NavigationHost {
    /// Current query string, without the leading `?`
    fn query(&self) -> String;

    /// Current window scroll offsets `(x, y)`
    fn scroll_offset(&self) -> (f64, f64);

    fn navigate(&mut self, url: &str);
}

/// Navigation host backed by plain fields, with a back stack.
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    pub location: String,
    pub scroll: (f64, f64),
    history: Vec<String>,
}

impl MemoryHost {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            scroll: (0.0, 0.0),
            history: Vec::new(),
        }
    }

    pub fn scrolled_to(mut self, x: f64, y: f64) -> Self {
        self.scroll = (x, y);
        self
    }

    /// Return to the previous location. Returns false at the start of history.
    pub fn back(&mut self) -> bool {
        match self.history.pop() {
            Some(previous) => {
                self.location = previous;
                true
            }
            None => false,
        }
    }
}

impl NavigationHost for MemoryHost {
    fn query(&self) -> String {
        let location = strip_fragment(&self.location);
        location
            .split_once('?')
            .map(|(_, query)| query.to_string())
            .unwrap_or_default()
    }

    fn scroll_offset(&self) -> (f64, f64) {
        self.scroll
    }

    fn navigate(&mut self, url: &str) {
        let previous = std::mem::replace(&mut self.location, url.to_string());
        self.history.push(previous);
    }
}

fn strip_fragment(url: &str) -> &str {
    url.split_once('#').map(|(head, _)| head).unwrap_or(url)
}

fn query_pairs(query: &str) -> impl Iterator<Item = (&str, &str)> {
    let query = strip_fragment(query);
    let query = query.split_once('?').map(|(_, q)| q).unwrap_or(query);
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
}

fn decode_component(raw: &str) -> Option<Cow<'_, str>> {
    if raw.contains('+') {
        let spaced = raw.replace('+', " ");
        return urlencoding::decode(&spaced)
            .ok()
            .map(|decoded| Cow::Owned(decoded.into_owned()));
    }
    urlencoding::decode(raw).ok()
}

fn parse_sorters(raw: &str) -> Vec<Sorter> {
    raw.split(',')
        .filter(|piece| !piece.is_empty())
        .filter_map(|piece| {
            let (column, direction) = match piece.rsplit_once(':') {
                Some((column, dir)) => (column, dir.parse::<SortDirection>().ok()?),
                None => (piece, SortDirection::Asc),
            };
            let column = decode_component(column)?;
            (!column.is_empty()).then(|| Sorter::new(column.into_owned(), direction))
        })
        .collect()
}

fn parse_offset(raw: &str) -> f64 {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}
