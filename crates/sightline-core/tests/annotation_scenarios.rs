//! End-to-end scenarios over the in-memory sources: open a file, click
//! lines, leave for a detail view and come back to the list.

use sightline_core::{
    AnalysisKind, DetailView, FetchError, FileDetail, Finding, LineFinding, ListView,
    LoadOutcome, MemoryHost, MemorySource, MultiStatusFinding, MutationStatus, NavigationHost,
    OverlaySettings, SelectionChange, SortKey, SortableRow, Sorter, SourceViewer,
};

#[derive(Debug, Clone, PartialEq)]
struct Recipe {
    name: String,
    ratio: Option<f64>,
}

impl SortableRow for Recipe {
    fn row_id(&self) -> &str {
        &self.name
    }

    fn sort_key(&self, column: &str) -> Option<SortKey> {
        match column {
            "name" => Some(SortKey::Text(self.name.clone())),
            "ratio" => Some(SortKey::Qualifier {
                available: self.ratio.is_some(),
                ratio: self.ratio.unwrap_or_default(),
            }),
            _ => None,
        }
    }
}

fn recipes() -> Vec<Recipe> {
    [
        ("recipeA", Some(0.55)),
        ("recipeB", Some(0.95)),
        ("recipeC", None),
        ("recipeD", Some(0.75)),
        ("recipeE", Some(0.15)),
        ("recipeF", Some(0.35)),
    ]
    .into_iter()
    .map(|(name, ratio)| Recipe {
        name: name.to_string(),
        ratio,
    })
    .collect()
}

fn coverage_source() -> MemorySource<Recipe> {
    let content: String = (1..=10).map(|n| format!("statement {n};\n")).collect();
    MemorySource::new().file(
        "src/main.c",
        FileDetail {
            content,
            findings: vec![
                Finding::Line(LineFinding {
                    line: 5,
                    covered: true,
                    index: None,
                }),
                Finding::Line(LineFinding {
                    line: 6,
                    covered: false,
                    index: None,
                }),
            ],
            tolerance: None,
        },
    )
}

#[tokio::test]
async fn clicking_lines_filters_the_detail_panel() {
    let source = coverage_source();
    let mut viewer =
        SourceViewer::new(AnalysisKind::StatementCoverage, &OverlaySettings::default());

    let outcome = viewer.load_document(&source, "src/main.c").await.unwrap();
    assert_eq!(outcome, LoadOutcome::Loaded);
    assert_eq!(viewer.detail(), DetailView::NoSelection);

    assert_eq!(viewer.on_line_activated(6), SelectionChange::Selected(6));
    let detail = viewer.detail();
    let shown: Vec<&Finding> = detail.findings().collect();
    assert_eq!(
        shown,
        vec![&Finding::Line(LineFinding {
            line: 6,
            covered: false,
            index: None,
        })]
    );

    assert_eq!(viewer.on_line_activated(1), SelectionChange::Selected(1));
    assert!(viewer.detail().is_empty());
    assert_eq!(viewer.decoration_at(1), None);
    assert!(!viewer.decorations().contains_key(&1));
}

#[tokio::test]
async fn missing_file_keeps_viewer_empty() {
    let source = coverage_source();
    let mut viewer =
        SourceViewer::new(AnalysisKind::StatementCoverage, &OverlaySettings::default());
    let err = viewer.load_document(&source, "src/gone.c").await.unwrap_err();
    assert_eq!(err, FetchError::not_found("src/gone.c"));
    assert!(!viewer.is_loaded());
}

#[tokio::test]
async fn unavailable_analysis_renders_not_available() {
    let source: MemorySource<Recipe> = MemorySource::new().file(
        "README",
        FileDetail {
            content: "hello\n".into(),
            ..Default::default()
        },
    );
    let mut viewer = SourceViewer::new(AnalysisKind::MutationTest, &OverlaySettings::default());
    viewer.load_document(&source, "README").await.unwrap();
    viewer.on_line_activated(1);
    assert_eq!(viewer.detail(), DetailView::NotAvailable);
    assert!(viewer.decorations().is_empty());
}

#[tokio::test]
async fn mutation_line_with_survivor_is_mixed() {
    let mutant = |status| {
        Finding::Status(MultiStatusFinding {
            line: 2,
            status,
            mutator: "ConditionalsBoundary".into(),
            mutated_class: "Parser".into(),
            mutated_method: "next".into(),
            killing_test: None,
        })
    };
    let source: MemorySource<Recipe> = MemorySource::new().file(
        "Parser.java",
        FileDetail {
            content: "a\nb\nc\n".into(),
            findings: vec![mutant(MutationStatus::Killed), mutant(MutationStatus::Survived)],
            tolerance: None,
        },
    );
    let mut viewer = SourceViewer::new(AnalysisKind::MutationTest, &OverlaySettings::default());
    viewer.load_document(&source, "Parser.java").await.unwrap();
    assert_eq!(
        viewer.decorations().get(&2).map(|d| d.class_name().into_owned()),
        Some("mixed-with-survived".to_string())
    );
}

#[tokio::test]
async fn returning_to_the_list_restores_it() {
    let source = MemorySource::new().rows(recipes());

    // the list the user leaves
    let mut list = ListView::new(Sorter::asc("name"), 2);
    list.set_sorters(vec![Sorter::desc("ratio")]);
    list.set_page(2);
    list.load(&source).await.unwrap();
    let visible: Vec<String> = list.rows().iter().map(|r| r.name.clone()).collect();
    assert_eq!(visible, ["recipeA", "recipeF"]);

    let mut host = MemoryHost::new("recipes").scrolled_to(0.0, 120.5);
    let url = list.activate_row("recipeA", &mut host).unwrap();
    assert!(url.starts_with("recipeA?"));

    // the list the user comes back to
    let mut restored = ListView::from_host(Sorter::asc("name"), 2, &host);
    restored.load(&source).await.unwrap();

    assert_eq!(restored.state().page, 2);
    assert_eq!(restored.sorters(), [Sorter::desc("ratio")]);
    assert_eq!(restored.selected_row_id(), Some("recipeA"));
    assert_eq!(restored.scroll_target(), Some((0.0, 120.5)));
    let restored_rows: Vec<String> = restored.rows().iter().map(|r| r.name.clone()).collect();
    assert_eq!(restored_rows, visible);
    assert_eq!(host.query(), url.split_once('?').unwrap().1);
}

#[tokio::test]
async fn unavailable_ratio_sorts_before_available_values() {
    let source = MemorySource::new().rows(recipes());
    let mut list = ListView::new(Sorter::asc("ratio"), 10);
    list.load(&source).await.unwrap();
    let names: Vec<&str> = list.rows().iter().map(|r| r.row_id()).collect();
    assert_eq!(
        names,
        ["recipeC", "recipeE", "recipeF", "recipeA", "recipeD", "recipeB"]
    );
}
