//! Common test utilities.

#![allow(dead_code)]

use std::path::Path;

use sightline::config::Config;

const COVERAGE_REPORT: &str = r#"{
    "rows": [
        {"name": "recipeA", "values": {"lines": 120, "coverage": {"available": true, "numerator": 66, "denominator": 120, "ratio": 0.55}}},
        {"name": "recipeB", "values": {"lines": 40, "coverage": {"available": true, "numerator": 38, "denominator": 40, "ratio": 0.95}}},
        {"name": "recipeC", "values": {"lines": 10, "coverage": {"available": false}}},
        {"name": "recipeD", "values": {"lines": 75, "coverage": {"available": true, "numerator": 56, "denominator": 75, "ratio": 0.75}}}
    ],
    "files": {
        "recipeA/main.c": {
            "findings": [
                {"type": "line", "line": 5, "covered": true},
                {"type": "line", "line": 6, "covered": false}
            ]
        },
        "recipeA/missing.c": {"findings": []}
    }
}"#;

const MUTATION_REPORT: &str = r#"{
    "rows": [{"name": "recipeA"}],
    "files": {
        "recipeA/main.c": {
            "findings": [
                {"type": "status", "line": 2, "status": "KILLED", "mutator": "NegateConditionals", "killingTest": "test_main"},
                {"type": "status", "line": 2, "status": "SURVIVED", "mutator": "ReturnVals"},
                {"type": "status", "line": 3, "status": "SKIPPED"}
            ]
        }
    }
}"#;

/// Write a project with coverage and mutation reports over one source file.
pub fn create_temp_project() -> tempfile::TempDir {
    let temp = tempfile::tempdir().expect("Failed to create temp dir");
    let root = temp.path();

    std::fs::create_dir_all(root.join("reports")).expect("Failed to create reports dir");
    std::fs::write(root.join("reports/statement-coverage.json"), COVERAGE_REPORT)
        .expect("Failed to write coverage report");
    std::fs::write(root.join("reports/mutation-test.json"), MUTATION_REPORT)
        .expect("Failed to write mutation report");

    std::fs::create_dir_all(root.join("src/recipeA")).expect("Failed to create src dir");
    let source: String = (1..=8).map(|n| format!("int line{n} = {n};\n")).collect();
    std::fs::write(root.join("src/recipeA/main.c"), source).expect("Failed to write main.c");
    std::fs::write(root.join("src/README"), "no findings here\n").expect("Failed to write README");

    temp
}

/// Config pointing at the project written by [`create_temp_project`].
pub fn project_config(root: &Path) -> Config {
    Config {
        source_dir: "src".into(),
        page_size: 2,
        ..Config::default()
    }
    .resolve(root)
}
