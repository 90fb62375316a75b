//! Multi-column sorting and page slicing for aggregate tables

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(format!("unknown sort direction '{other}'")),
        }
    }
}

/// One entry of a sort specification
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sorter {
    pub column: String,
    pub direction: SortDirection,
}

impl Sorter {
    pub fn new(column: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }

    pub fn asc(column: impl Into<String>) -> Self {
        Self::new(column, SortDirection::Asc)
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self::new(column, SortDirection::Desc)
    }
}

impl fmt::Display for Sorter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.column, self.direction)
    }
}

/// Parses `column` or `column:dir`
impl FromStr for Sorter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (column, direction) = match s.rsplit_once(':') {
            Some((column, dir)) => (column, dir.parse()?),
            None => (s, SortDirection::Asc),
        };
        if column.is_empty() {
            return Err(format!("empty sort column in '{s}'"));
        }
        Ok(Sorter::new(column, direction))
    }
}

/// Value a row exposes for a sortable column
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Text(String),
    Number(f64),
    /// A ratio that may be "not available" for the row
    Qualifier { available: bool, ratio: f64 },
}

impl SortKey {
    /// Unavailable qualifiers, then numbers, then text
    fn rank(&self) -> u8 {
        match self {
            SortKey::Qualifier {
                available: false, ..
            } => 0,
            SortKey::Number(_) | SortKey::Qualifier { .. } => 1,
            SortKey::Text(_) => 2,
        }
    }

    fn numeric(&self) -> Option<f64> {
        match self {
            SortKey::Number(n) => Some(*n),
            SortKey::Qualifier {
                available: true,
                ratio,
            } => Some(*ratio),
            _ => None,
        }
    }

    fn compare(&self, other: &SortKey) -> Ordering {
        let by_rank = self.rank().cmp(&other.rank());
        if by_rank != Ordering::Equal {
            return by_rank;
        }
        match (self, other) {
            (SortKey::Text(a), SortKey::Text(b)) => a
                .to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b)),
            _ => match (self.numeric(), other.numeric()) {
                (Some(a), Some(b)) => a.total_cmp(&b),
                _ => Ordering::Equal,
            },
        }
    }
}

/// A row of an aggregate table
pub trait SortableRow {
    /// Stable identifier used for selection and navigation
    fn row_id(&self) -> &str;

    /// Sort key for `column`, or `None` if the row has no such column
    fn sort_key(&self, column: &str) -> Option<SortKey>;
}

/// Compare two rows under an ordered sort specification. Rows lacking a
/// column sort after rows that have it, whatever the direction.
pub fn compare_rows<R: SortableRow>(a: &R, b: &R, sorters: &[Sorter]) -> Ordering {
    for sorter in sorters {
        let ordering = match (a.sort_key(&sorter.column), b.sort_key(&sorter.column)) {
            (Some(x), Some(y)) => {
                let ordering = x.compare(&y);
                match sorter.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            }
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// One page of rows
#[derive(Debug, Clone, PartialEq)]
pub struct Page<R> {
    /// 1-based page actually returned (0 when there are no rows)
    pub page: usize,
    pub last_page: usize,
    pub total_count: usize,
    pub rows: Vec<R>,
}

impl<R> Page<R> {
    pub fn empty() -> Self {
        Self {
            page: 0,
            last_page: 0,
            total_count: 0,
            rows: Vec::new(),
        }
    }
}

/// Parameters of a page fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub page_size: usize,
    pub sorters: Vec<Sorter>,
}

/// Rows held in memory, sortable and sliceable into pages.
#[derive(Debug, Clone, Default)]
pub struct SortableList<R> {
    items: Vec<R>,
}

impl<R: SortableRow + Clone> SortableList<R> {
    pub fn new(items: Vec<R>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[R] {
        &self.items
    }

    /// Stable sort; the first sorter is the primary key. An empty
    /// specification leaves the order untouched.
    pub fn sort(&mut self, sorters: &[Sorter]) -> &mut Self {
        if !sorters.is_empty() {
            self.items.sort_by(|a, b| compare_rows(a, b, sorters));
        }
        self
    }

    /// Slice out a 1-based page, clamping out-of-range page numbers to the
    /// first or last page.
    pub fn page(&self, page: usize, page_size: usize) -> Page<R> {
        let page_size = page_size.max(1);
        let total_count = self.items.len();
        if total_count == 0 {
            return Page::empty();
        }
        let last_page = total_count.div_ceil(page_size);
        let page = page.clamp(1, last_page);
        let start = (page - 1) * page_size;
        let end = (start + page_size).min(total_count);
        Page {
            page,
            last_page,
            total_count,
            rows: self.items[start..end].to_vec(),
        }
    }

    /// Sort a copy and return the requested page
    pub fn query(&self, request: &PageRequest) -> Page<R> {
        let mut sorted = self.clone();
        sorted.sort(&request.sorters);
        sorted.page(request.page, request.page_size)
    }
}
