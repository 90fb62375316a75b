//! Paginated list of aggregate rows that survives a round trip to a detail
//! view and back.

use tracing::{debug, warn};

use crate::error::FetchError;
use crate::navigation::{ListNavigationState, NavigationHost, NavigationLink};
use crate::paging::{Page, PageRequest, SortableRow, Sorter};
use crate::sources::RowSource;

/// A sortable, paged table of rows fetched from a [`RowSource`].
#[derive(Debug, Clone)]
pub struct ListView<R> {
    default_sorter: Sorter,
    page_size: usize,
    state: ListNavigationState,
    page: Page<R>,
    scroll_target: Option<(f64, f64)>,
}

impl<R: SortableRow + Clone> ListView<R> {
    /// A fresh list on page 1, sorted by `default_sorter`
    pub fn new(default_sorter: Sorter, page_size: usize) -> Self {
        let state = ListNavigationState::default().with_default_sorter(&default_sorter);
        Self {
            default_sorter,
            page_size: page_size.max(1),
            state,
            page: Page::empty(),
            scroll_target: None,
        }
    }

    /// Construct a list, restoring whatever state the host's URL carries
    pub fn from_host(default_sorter: Sorter, page_size: usize, host: &impl NavigationHost) -> Self {
        let mut list = Self::new(default_sorter, page_size);
        list.restore(&host.query());
        list
    }

    /// Apply navigation state decoded from `query`. Returns false (and
    /// changes nothing) when the query carries no list state.
    pub fn restore(&mut self, query: &str) -> bool {
        let Some(state) = ListNavigationState::parse(query) else {
            return false;
        };
        let state = state.with_default_sorter(&self.default_sorter);
        debug!(
            page = state.page,
            sort = ?state.sorters,
            selected = ?state.selected_row,
            "restoring list state"
        );
        self.scroll_target = Some((state.scroll_x, state.scroll_y));
        self.state = state;
        true
    }

    pub fn state(&self) -> &ListNavigationState {
        &self.state
    }

    pub fn default_sorter(&self) -> &Sorter {
        &self.default_sorter
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page(&self) -> &Page<R> {
        &self.page
    }

    pub fn rows(&self) -> &[R] {
        &self.page.rows
    }

    pub fn sorters(&self) -> &[Sorter] {
        &self.state.sorters
    }

    pub fn selected_row_id(&self) -> Option<&str> {
        self.state.selected_row.as_deref()
    }

    /// Scroll offsets to restore once the page is rendered
    pub fn scroll_target(&self) -> Option<(f64, f64)> {
        self.scroll_target
    }

    fn request(&self) -> PageRequest {
        PageRequest {
            page: self.state.page,
            page_size: self.page_size,
            sorters: self.state.sorters.clone(),
        }
    }

    /// Fetch the page described by the current state.
    ///
    /// On failure the previously loaded page stays. A selected row that is
    /// not on the fetched page is dropped.
    pub async fn load<S>(&mut self, source: &S) -> Result<&Page<R>, FetchError>
    where
        S: RowSource<R> + ?Sized,
    {
        let request = self.request();
        let page = match source.fetch_page(&request).await {
            Ok(page) => page,
            Err(e) => {
                warn!(page = request.page, error = %e, "row fetch failed");
                return Err(e);
            }
        };

        if page.page >= 1 {
            self.state.page = page.page;
        }
        let selection_missing = self
            .state
            .selected_row
            .as_deref()
            .is_some_and(|id| !page.rows.iter().any(|row| row.row_id() == id));
        if selection_missing {
            debug!(row = ?self.state.selected_row, "selected row not on page, clearing selection");
            self.state.selected_row = None;
        }
        self.page = page;
        Ok(&self.page)
    }

    /// Replace the sort order and go back to the first page. An empty
    /// order falls back to the default sorter.
    pub fn set_sorters(&mut self, sorters: Vec<Sorter>) {
        self.state.sorters = sorters;
        if self.state.sorters.is_empty() {
            self.state.sorters.push(self.default_sorter.clone());
        }
        self.state.page = 1;
    }

    pub fn set_page(&mut self, page: usize) {
        self.state.page = page.max(1);
    }

    /// Select a row of the current page. Unknown ids leave the selection as is.
    pub fn select_row(&mut self, row_id: &str) -> bool {
        if !self.page.rows.iter().any(|row| row.row_id() == row_id) {
            return false;
        }
        self.state.selected_row = Some(row_id.to_string());
        true
    }

    pub fn clear_selection(&mut self) {
        self.state.selected_row = None;
    }

    /// URL of the detail view for `row_id`, carrying the current state
    pub fn link_for(&self, row_id: &str) -> String {
        NavigationLink::new(row_id, self.state.clone()).to_url()
    }

    /// Select `row_id`, capture the host's scroll position and navigate to
    /// the row's detail view. Returns the URL navigated to, or `None` if the
    /// row is not on the current page.
    pub fn activate_row(&mut self, row_id: &str, host: &mut impl NavigationHost) -> Option<String> {
        if !self.select_row(row_id) {
            debug!(row = %row_id, "ignoring activation of row not on page");
            return None;
        }
        let (scroll_x, scroll_y) = host.scroll_offset();
        self.state.scroll_x = scroll_x;
        self.state.scroll_y = scroll_y;

        let url = self.link_for(row_id);
        host.navigate(&url);
        Some(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::MemoryHost;
    use crate::paging::SortKey;
    use crate::sources::MemorySource;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        name: String,
        ratio: f64,
    }

    impl SortableRow for Row {
        fn row_id(&self) -> &str {
            &self.name
        }

        fn sort_key(&self, column: &str) -> Option<SortKey> {
            match column {
                "name" => Some(SortKey::Text(self.name.clone())),
                "ratio" => Some(SortKey::Number(self.ratio)),
                _ => None,
            }
        }
    }

    fn source() -> MemorySource<Row> {
        MemorySource::new().rows(
            (0..5)
                .map(|i| Row {
                    name: format!("recipe{i}"),
                    ratio: f64::from(i) / 10.0,
                })
                .collect(),
        )
    }

    #[tokio::test]
    async fn fresh_list_uses_default_sort() {
        let mut list = ListView::new(Sorter::asc("name"), 2);
        let page = list.load(&source()).await.unwrap();
        assert_eq!(page.last_page, 3);
        let names: Vec<&str> = list.rows().iter().map(|r| r.row_id()).collect();
        assert_eq!(names, ["recipe0", "recipe1"]);
        assert_eq!(list.sorters(), [Sorter::asc("name")]);
    }

    #[tokio::test]
    async fn activation_navigates_with_state() {
        let mut list = ListView::new(Sorter::asc("name"), 2);
        list.set_sorters(vec![Sorter::desc("ratio")]);
        list.set_page(2);
        list.load(&source()).await.unwrap();

        let mut host = MemoryHost::new("list").scrolled_to(0.0, 80.0);
        let url = list.activate_row("recipe2", &mut host).unwrap();
        assert_eq!(url, "recipe2?page=2&sort=ratio:desc&selected=recipe2&scrollX=0&scrollY=80");
        assert_eq!(host.location, url);

        assert!(list.activate_row("recipe0", &mut host).is_none());
    }

    #[tokio::test]
    async fn vanished_selection_resolves_to_none() {
        let mut list: ListView<Row> = ListView::new(Sorter::asc("name"), 2);
        assert!(list.restore("page=1&selected=recipe9"));
        list.load(&source()).await.unwrap();
        assert_eq!(list.selected_row_id(), None);
    }

    #[tokio::test]
    async fn failed_fetch_keeps_previous_page() {
        let mut list = ListView::new(Sorter::asc("name"), 2);
        list.load(&source()).await.unwrap();

        let down = source().unreachable("connection refused");
        list.set_page(2);
        assert!(list.load(&down).await.is_err());
        let names: Vec<&str> = list.rows().iter().map(|r| r.row_id()).collect();
        assert_eq!(names, ["recipe0", "recipe1"]);
    }

    #[tokio::test]
    async fn out_of_range_page_is_clamped() {
        let mut list: ListView<Row> = ListView::new(Sorter::asc("name"), 2);
        list.restore("page=40");
        list.load(&source()).await.unwrap();
        assert_eq!(list.state().page, 3);
    }

    #[test]
    fn restore_without_state_changes_nothing() {
        let mut list: ListView<Row> = ListView::new(Sorter::asc("name"), 2);
        assert!(!list.restore("utm_source=mail"));
        assert_eq!(list.scroll_target(), None);
        assert_eq!(list.state().page, 1);
    }
}
