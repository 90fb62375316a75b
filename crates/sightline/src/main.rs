//! sightline - Browse build-quality findings over source files
//!
//! sightline reads per-analysis JSON reports (coverage, complexity,
//! duplication, mutation testing, violations), serves them to the dashboard
//! over HTTP and renders tables and annotated sources in the terminal.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use eyre::{Result, WrapErr};
use owo_colors::OwoColorize;
use sightline::config::{CONFIG_PATH, Config};
use sightline::output::{render_detail, render_page, render_source};
use sightline::server::{self, AppState};
use sightline::store::ReportStore;
use sightline::{find_project_root, load_config, load_config_or_default};
use sightline_api::ApiRow;
use sightline_core::{AnalysisKind, LineSpan, ListView, MemoryHost, SourceViewer, Sorter};
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// CLI arguments
#[derive(Debug, Parser)]
#[command(name = "sightline", version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Path to config file (default: .config/sightline/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Subcommands
#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the dashboard API
    Serve {
        /// Port to listen on (default: first free port from 3000)
        #[arg(long)]
        port: Option<u16>,

        /// Open the dashboard in a browser
        #[arg(long)]
        open: bool,
    },

    /// Print one page of an analysis table
    List {
        /// Analysis kind, e.g. statement-coverage
        kind: AnalysisKind,

        /// Navigation state to restore, as a query string
        #[arg(long)]
        state: Option<String>,

        /// Page to show
        #[arg(long)]
        page: Option<usize>,

        /// Sort order, as column or column:dir (repeatable)
        #[arg(long, value_delimiter = ',')]
        sort: Vec<Sorter>,

        /// Activate a row and print the URL it navigates to
        #[arg(long)]
        activate: Option<String>,
    },

    /// Print a source file with its findings
    Show {
        /// Analysis kind, e.g. mutation-test
        kind: AnalysisKind,

        /// File path, relative to the source directory
        path: String,

        /// First line to show
        #[arg(long)]
        from: Option<usize>,

        /// Last line to show
        #[arg(long)]
        to: Option<usize>,

        /// Select a line and show its findings
        #[arg(long)]
        line: Option<usize>,
    },
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,sightline={level},sightline_core={level},sightline_api={level}"
        ))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let project_root = find_project_root()?;
    let config = resolve_config(&project_root, args.config.as_deref())?;

    match args.command {
        Command::Serve { port, open } => {
            let store = ReportStore::open(&config)?;
            let port = port.or(config.server.port);
            let open = open || config.server.open;
            server::run(AppState::new(store, &config), port, open).await
        }
        Command::List {
            kind,
            state,
            page,
            sort,
            activate,
        } => run_list(&config, kind, state, page, sort, activate).await,
        Command::Show {
            kind,
            path,
            from,
            to,
            line,
        } => run_show(&config, kind, &path, from, to, line).await,
    }
}

/// An explicit `--config` must exist; the default location is optional.
fn resolve_config(project_root: &Path, explicit: Option<&Path>) -> Result<Config> {
    let config = match explicit {
        Some(path) => load_config(path)?,
        None => load_config_or_default(&project_root.join(CONFIG_PATH)),
    };
    Ok(config.resolve(project_root))
}

async fn run_list(
    config: &Config,
    kind: AnalysisKind,
    state: Option<String>,
    page: Option<usize>,
    sort: Vec<Sorter>,
    activate: Option<String>,
) -> Result<()> {
    let store = ReportStore::open(config)?;
    let source = store
        .source(kind)
        .ok_or_else(|| eyre::eyre!("No {} report in {}", kind, config.report_dir.display()))?;

    let mut list: ListView<ApiRow> = ListView::new(config.default_sorter(), config.page_size);
    if let Some(query) = &state {
        list.restore(query);
    }
    if !sort.is_empty() {
        list.set_sorters(sort);
    }
    if let Some(page) = page {
        list.set_page(page);
    }

    list.load(&source)
        .await
        .wrap_err_with(|| format!("Failed to load {kind} rows"))?;

    if let Some(row) = activate {
        let mut host = MemoryHost::new(kind.as_str());
        match list.activate_row(&row, &mut host) {
            Some(url) => println!("{}/{}", kind, url),
            None => eyre::bail!("Row '{}' is not on page {}", row, list.state().page),
        }
        return Ok(());
    }

    eprintln!("{} {}", "->".blue().bold(), kind.title().cyan());
    print!("{}", render_page(&list));
    Ok(())
}

async fn run_show(
    config: &Config,
    kind: AnalysisKind,
    path: &str,
    from: Option<usize>,
    to: Option<usize>,
    line: Option<usize>,
) -> Result<()> {
    let store = ReportStore::open(config)?;
    let source = store
        .source(kind)
        .ok_or_else(|| eyre::eyre!("No {} report in {}", kind, config.report_dir.display()))?;

    let mut viewer = SourceViewer::new(kind, &config.overlay_settings());
    viewer
        .load_document(&source, path)
        .await
        .wrap_err_with(|| format!("Failed to open {path}"))?;

    let line_count = viewer.document().map(|d| d.line_count()).unwrap_or(0);
    let start = from.unwrap_or(1);
    let end = to.unwrap_or(line_count);
    viewer.on_viewport_changed(LineSpan::new(start, end));

    if let Some(line) = line {
        if !viewer.on_line_activated(line).is_changed() {
            warn!(line, lines = line_count, "line is outside the document, nothing selected");
        }
    }

    print!("{}", render_source(&viewer));
    println!();
    print!("{}", render_detail(&viewer.detail()));
    Ok(())
}
