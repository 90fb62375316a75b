//! API types for the sightline dashboard
//!
//! This crate contains only the JSON type definitions exchanged between the
//! sightline HTTP server and dashboard clients.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sightline_core::{AnalysisKind, FileDetail, Finding, Page, SortKey, SortableRow};

/// Column every row carries, holding the row's identifier
pub const NAME_COLUMN: &str = "name";

/// A file with the findings of one analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiFileDetail {
    pub path: String,
    pub content: String,
    #[serde(default)]
    pub findings: Vec<Finding>,
    /// Complexity tolerance, for complexity reports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<u64>,
}

impl ApiFileDetail {
    pub fn new(path: impl Into<String>, detail: FileDetail) -> Self {
        Self {
            path: path.into(),
            content: detail.content,
            findings: detail.findings,
            tolerance: detail.tolerance,
        }
    }
}

/// One page of a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPage<R> {
    pub page: usize,
    pub last_page: usize,
    pub total_count: usize,
    #[serde(default = "Vec::new")]
    pub data: Vec<R>,
}

impl<R> From<Page<R>> for ApiPage<R> {
    fn from(page: Page<R>) -> Self {
        Self {
            page: page.page,
            last_page: page.last_page,
            total_count: page.total_count,
            data: page.rows,
        }
    }
}

/// A ratio that may not be available for a row (e.g. a recipe without
/// tests has no coverage, which is not the same as 0% coverage)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ApiQualifier {
    pub available: bool,
    #[serde(default)]
    pub numerator: f64,
    #[serde(default)]
    pub denominator: f64,
    #[serde(default)]
    pub ratio: f64,
}

impl ApiQualifier {
    pub fn new(numerator: f64, denominator: f64) -> Self {
        if denominator > 0.0 {
            Self {
                available: true,
                numerator,
                denominator,
                ratio: numerator / denominator,
            }
        } else {
            Self::not_available()
        }
    }

    pub fn not_available() -> Self {
        Self {
            available: false,
            numerator: 0.0,
            denominator: 0.0,
            ratio: 0.0,
        }
    }

    /// Ratio as a whole percentage, rounded down
    pub fn percent(&self) -> Option<u64> {
        self.available
            .then(|| (self.ratio * 100.0).floor().max(0.0) as u64)
    }
}

/// A table cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiValue {
    Number(f64),
    Text(String),
    Qualifier(ApiQualifier),
}

impl ApiValue {
    pub fn sort_key(&self) -> SortKey {
        match self {
            ApiValue::Number(n) => SortKey::Number(*n),
            ApiValue::Text(s) => SortKey::Text(s.clone()),
            ApiValue::Qualifier(q) => SortKey::Qualifier {
                available: q.available,
                ratio: q.ratio,
            },
        }
    }
}

/// A row of an aggregate table, keyed by `name`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiRow {
    pub name: String,
    #[serde(default)]
    pub values: BTreeMap<String, ApiValue>,
}

impl ApiRow {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn with(mut self, column: impl Into<String>, value: ApiValue) -> Self {
        self.values.insert(column.into(), value);
        self
    }

    pub fn get(&self, column: &str) -> Option<&ApiValue> {
        self.values.get(column)
    }
}

impl SortableRow for ApiRow {
    fn row_id(&self) -> &str {
        &self.name
    }

    fn sort_key(&self, column: &str) -> Option<SortKey> {
        if column == NAME_COLUMN {
            return Some(SortKey::Text(self.name.clone()));
        }
        self.values.get(column).map(ApiValue::sort_key)
    }
}

/// An analysis with a report available
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKindInfo {
    pub kind: AnalysisKind,
    pub title: String,
    pub default_sort: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiHealth {
    pub status: String,
    pub version: String,
}

/// Error body returned by every endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use sightline_core::{SortableList, Sorter};

    #[test]
    fn row_values_decode_untagged() {
        let json = r#"{
            "name": "busybox",
            "values": {
                "lines": 1200,
                "license": "GPL-2.0",
                "coverage": {"available": true, "numerator": 3, "denominator": 4, "ratio": 0.75}
            }
        }"#;
        let row: ApiRow = serde_json::from_str(json).unwrap();
        assert_eq!(row.get("lines"), Some(&ApiValue::Number(1200.0)));
        assert_eq!(row.get("license"), Some(&ApiValue::Text("GPL-2.0".into())));
        match row.get("coverage") {
            Some(ApiValue::Qualifier(q)) => assert_eq!(q.percent(), Some(75)),
            other => panic!("expected qualifier, got {other:?}"),
        }
    }

    #[test]
    fn row_without_values_is_accepted() {
        let row: ApiRow = serde_json::from_str(r#"{"name": "zlib"}"#).unwrap();
        assert!(row.values.is_empty());
        assert_eq!(row.sort_key("name"), Some(SortKey::Text("zlib".into())));
        assert_eq!(row.sort_key("coverage"), None);
    }

    #[test]
    fn percent_is_floored() {
        assert_eq!(ApiQualifier::new(2.0, 3.0).percent(), Some(66));
        assert_eq!(ApiQualifier::new(0.0, 0.0).percent(), None);
        assert!(!ApiQualifier::new(5.0, 0.0).available);
    }

    #[test]
    fn not_available_sorts_apart_from_zero() {
        let rows = vec![
            ApiRow::new("a").with("coverage", ApiValue::Qualifier(ApiQualifier::new(0.0, 10.0))),
            ApiRow::new("b").with("coverage", ApiValue::Qualifier(ApiQualifier::not_available())),
            ApiRow::new("c").with("coverage", ApiValue::Qualifier(ApiQualifier::new(5.0, 10.0))),
        ];
        let mut list = SortableList::new(rows);
        list.sort(&[Sorter::desc("coverage")]);
        let names: Vec<&str> = list.items().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["c", "a", "b"]);
    }

    #[test]
    fn page_field_names() {
        let page: ApiPage<ApiRow> = Page {
            page: 1,
            last_page: 1,
            total_count: 1,
            rows: vec![ApiRow::new("a")],
        }
        .into();
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["lastPage"], 1);
        assert_eq!(json["totalCount"], 1);
        assert_eq!(json["data"][0]["name"], "a");
    }
}
