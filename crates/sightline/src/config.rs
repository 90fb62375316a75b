//! Configuration schema for sightline
//!
//! Config lives at `.config/sightline/config.toml` relative to the project
//! root. Every field is optional.
//!
//! ```toml
//! report_dir = "build/reports"
//! source_dir = "."
//! page_size = 25
//! duplication_levels = 5
//! complexity_tolerance = 10
//! default_sort = "name"
//!
//! [server]
//! port = 3000
//! open = true
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sightline_api::NAME_COLUMN;
use sightline_core::{
    DEFAULT_COMPLEXITY_TOLERANCE, DEFAULT_DUPLICATION_LEVELS, OverlaySettings, Sorter,
};

/// Config path relative to the project root
pub const CONFIG_PATH: &str = ".config/sightline/config.toml";

/// Root configuration for sightline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory holding one `<kind>.json` report per analysis
    pub report_dir: PathBuf,

    /// Directory that report file paths are relative to
    pub source_dir: PathBuf,

    /// Rows per page in tables
    pub page_size: usize,

    /// Size of the duplication palette
    pub duplication_levels: u8,

    /// Complexity at or above which a function is flagged, unless a report
    /// carries its own tolerance
    pub complexity_tolerance: u64,

    /// Sort applied when a table has none, as `column` or `column:dir`
    pub default_sort: String,

    pub server: ServerConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Port to bind; a free one is picked when unset
    pub port: Option<u16>,

    /// Open the dashboard in a browser once listening
    pub open: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            report_dir: PathBuf::from("reports"),
            source_dir: PathBuf::from("."),
            page_size: 10,
            duplication_levels: DEFAULT_DUPLICATION_LEVELS,
            complexity_tolerance: DEFAULT_COMPLEXITY_TOLERANCE,
            default_sort: NAME_COLUMN.to_string(),
            server: ServerConfig::default(),
        }
    }
}

impl Config {
    pub fn overlay_settings(&self) -> OverlaySettings {
        OverlaySettings {
            complexity_tolerance: self.complexity_tolerance,
            duplication_levels: self.duplication_levels,
        }
    }

    /// The configured default sort, or ascending by name if it does not parse
    pub fn default_sorter(&self) -> Sorter {
        self.default_sort
            .parse()
            .unwrap_or_else(|_| Sorter::asc(NAME_COLUMN))
    }

    /// Make relative directories relative to `root`
    pub fn resolve(mut self, root: &Path) -> Self {
        if self.report_dir.is_relative() {
            self.report_dir = root.join(&self.report_dir);
        }
        if self.source_dir.is_relative() {
            self.source_dir = root.join(&self.source_dir);
        }
        self
    }
}
