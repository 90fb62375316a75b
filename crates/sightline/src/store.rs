//! On-disk analysis reports
//!
//! Each analysis writes one JSON report into the report directory, named
//! after the analysis kind (`statement-coverage.json`, `mutation-test.json`,
//! ...):
//!
//! ```json
//! {
//!   "rows": [{"name": "busybox", "values": {"lines": 1200}}],
//!   "files": {
//!     "busybox/src/main.c": {"findings": [{"type": "line", "line": 5, "covered": true}]}
//!   }
//! }
//! ```
//!
//! File contents are read from the source directory at request time.

use std::collections::BTreeMap;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use eyre::{Result, WrapErr};
use serde::Deserialize;
use sightline_api::ApiRow;
use sightline_core::{
    AnalysisKind, FetchError, FileDetail, FileSource, Finding, Page, PageRequest, RowSource,
    SortableList,
};
use tracing::{debug, info, warn};

use crate::config::Config;

#[derive(Debug, Default, Deserialize)]
struct ReportFile {
    #[serde(default)]
    rows: Vec<ApiRow>,
    #[serde(default)]
    files: BTreeMap<String, FileEntry>,
}

/// Findings recorded for one file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileEntry {
    #[serde(default)]
    pub findings: Vec<Finding>,
    #[serde(default)]
    pub tolerance: Option<u64>,
}

/// One analysis report, loaded into memory
#[derive(Debug)]
pub struct Report {
    pub kind: AnalysisKind,
    rows: SortableList<ApiRow>,
    files: BTreeMap<String, FileEntry>,
}

impl Report {
    pub fn rows(&self) -> &[ApiRow] {
        self.rows.items()
    }

    pub fn file(&self, path: &str) -> Option<&FileEntry> {
        self.files.get(path)
    }
}

/// All reports found in the report directory
#[derive(Debug, Clone)]
pub struct ReportStore {
    source_dir: PathBuf,
    reports: BTreeMap<AnalysisKind, Arc<Report>>,
}

impl ReportStore {
    /// Load every report present. Kinds without a report file are skipped;
    /// a report that exists but does not parse is an error.
    pub fn open(config: &Config) -> Result<Self> {
        let mut reports = BTreeMap::new();

        if !config.report_dir.is_dir() {
            warn!(
                dir = %config.report_dir.display(),
                "report directory does not exist, no reports loaded"
            );
        } else {
            for kind in AnalysisKind::ALL {
                let path = report_path(&config.report_dir, kind);
                if !path.is_file() {
                    continue;
                }
                let report = load_report(kind, &path)?;
                info!(
                    kind = %kind,
                    rows = report.rows().len(),
                    files = report.files.len(),
                    "loaded report"
                );
                reports.insert(kind, Arc::new(report));
            }
        }

        Ok(Self {
            source_dir: config.source_dir.clone(),
            reports,
        })
    }

    /// Kinds with a loaded report, in dashboard order
    pub fn kinds(&self) -> Vec<AnalysisKind> {
        self.reports.keys().copied().collect()
    }

    pub fn report(&self, kind: AnalysisKind) -> Option<&Report> {
        self.reports.get(&kind).map(Arc::as_ref)
    }

    pub fn rows(&self, kind: AnalysisKind) -> Option<&[ApiRow]> {
        self.report(kind).map(Report::rows)
    }

    /// Data source over one kind's report
    pub fn source(&self, kind: AnalysisKind) -> Option<KindSource> {
        self.reports.get(&kind).map(|report| KindSource {
            report: Arc::clone(report),
            source_dir: self.source_dir.clone(),
        })
    }
}

/// Location of a kind's report in `report_dir`
pub fn report_path(report_dir: &Path, kind: AnalysisKind) -> PathBuf {
    report_dir.join(format!("{}.json", kind.as_str()))
}

fn load_report(kind: AnalysisKind, path: &Path) -> Result<Report> {
    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read report: {}", path.display()))?;
    let file: ReportFile = serde_json::from_str(&content)
        .wrap_err_with(|| format!("Failed to parse report: {}", path.display()))?;
    Ok(Report {
        kind,
        rows: SortableList::new(file.rows),
        files: file.files,
    })
}

/// Rows and files of one analysis.
#[derive(Debug, Clone)]
pub struct KindSource {
    report: Arc<Report>,
    source_dir: PathBuf,
}

impl KindSource {
    pub fn kind(&self) -> AnalysisKind {
        self.report.kind
    }
}

/// Relative paths that stay inside the source directory
fn is_safe_path(path: &str) -> bool {
    let path = Path::new(path);
    !path.as_os_str().is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

#[async_trait]
impl FileSource for KindSource {
    async fn fetch_file(&self, path: &str) -> Result<FileDetail, FetchError> {
        if !is_safe_path(path) {
            debug!(path, "rejecting path outside source directory");
            return Err(FetchError::not_found(path));
        }

        let full_path = self.source_dir.join(path);
        let content = match tokio::fs::read_to_string(&full_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(FetchError::not_found(path));
            }
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                return Err(FetchError::decode(path, "file is not valid UTF-8"));
            }
            Err(e) => return Err(FetchError::transport(path, e)),
        };

        // A file the analysis never saw still opens, with nothing to show
        let entry = self.report.file(path).cloned().unwrap_or_default();
        Ok(FileDetail {
            content,
            findings: entry.findings,
            tolerance: entry.tolerance,
        })
    }
}

#[async_trait]
impl RowSource<ApiRow> for KindSource {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page<ApiRow>, FetchError> {
        Ok(self.report.rows.query(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_safety() {
        assert!(is_safe_path("src/main.c"));
        assert!(is_safe_path("./src/main.c"));
        assert!(!is_safe_path("../etc/passwd"));
        assert!(!is_safe_path("src/../../etc/passwd"));
        assert!(!is_safe_path("/etc/passwd"));
        assert!(!is_safe_path(""));
    }

    #[test]
    fn report_file_names_use_kind_slug() {
        assert_eq!(
            report_path(Path::new("reports"), AnalysisKind::MutationTest),
            PathBuf::from("reports/mutation-test.json")
        );
    }
}
