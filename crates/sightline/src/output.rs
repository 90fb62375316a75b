//! Terminal rendering for tables, decorated sources and the detail panel

use owo_colors::OwoColorize;
use sightline_api::{ApiRow, ApiValue, NAME_COLUMN};
use sightline_core::{Decoration, DetailView, ListView, SourceViewer};

/// Render a table cell. Unavailable ratios are "N/A", never 0%.
pub fn format_value(value: &ApiValue) -> String {
    match value {
        ApiValue::Number(n) if n.fract() == 0.0 => format!("{n:.0}"),
        ApiValue::Number(n) => format!("{n:.2}"),
        ApiValue::Text(s) => s.clone(),
        ApiValue::Qualifier(q) => match q.percent() {
            Some(percent) => format!("{percent}% ({}/{})", q.numerator, q.denominator),
            None => "N/A".to_string(),
        },
    }
}

/// Columns present on any row, `name` first
fn columns(rows: &[ApiRow]) -> Vec<String> {
    let mut columns = vec![NAME_COLUMN.to_string()];
    for row in rows {
        for column in row.values.keys() {
            if !columns.contains(column) {
                columns.push(column.clone());
            }
        }
    }
    columns[1..].sort();
    columns
}

/// Render the current page of a list, marking the selected row
pub fn render_page(list: &ListView<ApiRow>) -> String {
    let mut output = String::new();
    let page = list.page();

    if page.rows.is_empty() {
        output.push_str(&format!("{}\n", "No rows".dimmed()));
        return output;
    }

    let columns = columns(&page.rows);
    let cells: Vec<Vec<String>> = page
        .rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|column| {
                    if column == NAME_COLUMN {
                        row.name.clone()
                    } else {
                        row.get(column).map(format_value).unwrap_or_default()
                    }
                })
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(column.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(column, width)| format!("{column:<width$}"))
        .collect();
    output.push_str(&format!("  {}\n", header.join("  ").bold()));

    let selected = list.selected_row_id();
    for (row, cells) in page.rows.iter().zip(&cells) {
        let line: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        let line = line.join("  ");
        if Some(row.name.as_str()) == selected {
            output.push_str(&format!("{} {}\n", ">".cyan().bold(), line.cyan()));
        } else {
            output.push_str(&format!("  {}\n", line));
        }
    }

    let sort: Vec<String> = list.sorters().iter().map(ToString::to_string).collect();
    output.push_str(&format!(
        "\n{}\n",
        format!(
            "page {} of {} ({} rows), sorted by {}",
            page.page,
            page.last_page,
            page.total_count,
            sort.join(",")
        )
        .dimmed()
    ));
    output
}

fn marker(decoration: Option<Decoration>) -> String {
    let Some(decoration) = decoration else {
        return " ".to_string();
    };
    match decoration {
        Decoration::Covered | Decoration::Killed | Decoration::NotComplex => {
            "+".green().to_string()
        }
        Decoration::Uncovered | Decoration::Survived | Decoration::Complex => {
            "-".red().to_string()
        }
        Decoration::Skipped => "~".dimmed().to_string(),
        Decoration::MixedWithSurvived => "!".magenta().bold().to_string(),
        Decoration::MixedWithoutSurvived => "*".yellow().to_string(),
        Decoration::Duplicated(level) if level >= 3 => level.to_string().red().to_string(),
        Decoration::Duplicated(level) => level.to_string().yellow().to_string(),
    }
}

/// Render the viewer's visible lines with a gutter of line numbers and
/// decoration markers. The selected line is highlighted.
pub fn render_source(viewer: &SourceViewer) -> String {
    let mut output = String::new();
    let Some(document) = viewer.document() else {
        output.push_str(&format!("{}\n", "No document loaded".dimmed()));
        return output;
    };
    let Some(viewport) = viewer.viewport() else {
        return output;
    };

    output.push_str(&format!(
        "{} {} {}\n",
        "##".bold(),
        document.path().cyan().bold(),
        format!(
            "({}, lines {}-{} of {})",
            document.language_hint(),
            viewport.start,
            viewport.end,
            document.line_count()
        )
        .dimmed()
    ));

    let width = document.line_count().to_string().len();
    let selection = viewer.selection();
    for line in viewport.iter() {
        let text = document.line(line).unwrap_or("");
        let number = format!("{line:>width$}");
        let gutter = marker(viewer.decorations().get(&line).copied());
        if selection == Some(line) {
            output.push_str(&format!(
                "{} {} {}\n",
                number.cyan().bold(),
                gutter,
                text.bold()
            ));
        } else {
            output.push_str(&format!("{} {} {}\n", number.dimmed(), gutter, text));
        }
    }
    output
}

/// Render the detail panel
pub fn render_detail(view: &DetailView) -> String {
    match view {
        DetailView::NoSelection => format!("{}\n", "Select a line to see its findings".dimmed()),
        DetailView::NotAvailable => format!("{}\n", "N/A".yellow()),
        DetailView::Line { line, groups } => {
            let mut output = format!("{} Line {}\n", "##".bold(), line.to_string().cyan());
            if groups.is_empty() {
                output.push_str(&format!("  {}\n", "No findings on this line".dimmed()));
            }
            for group in groups {
                output.push_str(&format!("  {}\n", group.kind.title().bold()));
                for entry in &group.entries {
                    output.push_str(&format!("    {} {}\n", "-".blue(), entry.summary()));
                }
            }
            output
        }
    }
}
