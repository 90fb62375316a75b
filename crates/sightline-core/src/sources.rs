//! Data sources consumed by the viewer and the list view

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::FetchError;
use crate::finding::Finding;
use crate::paging::{Page, PageRequest, SortableList, SortableRow};

/// Everything the viewer needs to open one file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDetail {
    pub content: String,
    /// Absent in the payload means "no findings", not an error
    #[serde(default)]
    pub findings: Vec<Finding>,
    /// Complexity tolerance the findings were evaluated against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<u64>,
}

/// Fetches a file's content and findings, keyed by path
#[async_trait]
pub trait FileSource: Send + Sync {
    async fn fetch_file(&self, path: &str) -> Result<FileDetail, FetchError>;
}

/// Fetches one sorted page of aggregate rows
#[async_trait]
pub trait RowSource<R>: Send + Sync {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page<R>, FetchError>;
}

/// In-memory source for tests and embedding
#[derive(Debug, Clone)]
pub struct MemorySource<R> {
    files: HashMap<String, FileDetail>,
    rows: SortableList<R>,
    outage: Option<String>,
}

impl<R: SortableRow + Clone> MemorySource<R> {
    pub fn new() -> Self {
        Self {
            files: HashMap::new(),
            rows: SortableList::new(Vec::new()),
            outage: None,
        }
    }

    /// Add a file with its findings
    pub fn file(mut self, path: impl Into<String>, detail: FileDetail) -> Self {
        self.files.insert(path.into(), detail);
        self
    }

    /// Replace the table rows
    pub fn rows(mut self, rows: Vec<R>) -> Self {
        self.rows = SortableList::new(rows);
        self
    }

    /// Make every fetch fail with a transport error
    pub fn unreachable(mut self, message: impl Into<String>) -> Self {
        self.outage = Some(message.into());
        self
    }
}

impl<R: SortableRow + Clone> Default for MemorySource<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R> FileSource for MemorySource<R>
where
    R: SortableRow + Clone + Send + Sync,
{
    async fn fetch_file(&self, path: &str) -> Result<FileDetail, FetchError> {
        if let Some(message) = &self.outage {
            return Err(FetchError::transport(path, message));
        }
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| FetchError::not_found(path))
    }
}

#[async_trait]
impl<R> RowSource<R> for MemorySource<R>
where
    R: SortableRow + Clone + Send + Sync,
{
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page<R>, FetchError> {
        if let Some(message) = &self.outage {
            return Err(FetchError::transport("rows", message));
        }
        Ok(self.rows.query(request))
    }
}
