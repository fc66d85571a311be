//! Per-file Markdown table

use crate::changes::RelevantFile;
use crate::config::Config;
use crate::coverage::{validate_threshold, CoverageTotals, MetricPercentages};

use super::path::{shorten_path, DEFAULT_MAX_PATH_LEN};

pub const PASS_GLYPH: &str = "✅";
pub const FAIL_GLYPH: &str = "❌";
pub const NO_DATA: &str = "-";

const COLUMNS: usize = 7;

/// Render the coverage table.
///
/// Rows keep report order; anything past `report.max_rows` goes into a
/// `<details>` block with its own header.
pub fn render_table(files: &[RelevantFile], config: &Config, commit_sha: Option<&str>) -> String {
    let heading = heading(config.report.show_all_files);
    let separator = table_row(&[":-:"; COLUMNS]);

    let rows: Vec<String> = files
        .iter()
        .map(|file| render_row(file, config, commit_sha))
        .collect();

    let visible_count = rows.len().min(config.report.max_rows);
    let (visible, hidden) = rows.split_at(visible_count);

    let mut lines = vec![heading.clone(), separator.clone()];
    lines.extend(visible.iter().cloned());
    let mut table = lines.join("\n");

    if !hidden.is_empty() {
        table.push_str(&format!(
            "\n\n<details>\n<summary>and {} more...</summary>\n\n{}\n{}\n{}\n\n</details>",
            hidden.len(),
            heading,
            separator,
            hidden.join("\n")
        ));
    }

    table
}

/// GFM needs the outer pipes, otherwise a trailing empty cell is dropped
fn table_row<S: AsRef<str>>(cells: &[S]) -> String {
    let cells: Vec<&str> = cells.iter().map(AsRef::as_ref).collect();
    format!("|{}|", cells.join("|"))
}

fn heading(show_all_files: bool) -> String {
    let first = if show_all_files { "Files" } else { "Impacted Files" };
    table_row(&[first, "% Stmts", "% Branch", "% Funcs", "% Lines", "Uncovered", ""])
}

fn render_row(file: &RelevantFile, config: &Config, commit_sha: Option<&str>) -> String {
    let short = shorten_path(&file.relative_path, DEFAULT_MAX_PATH_LEN);
    let name = match commit_sha {
        Some(sha) => format!("[{}]({})", short, blob_link(sha, &file.link_path)),
        None => short,
    };
    let name = escape_cell(&name);

    // Without line data every other number is meaningless
    if !file.record.has_lines() {
        return table_row(&[name.as_str(), NO_DATA, NO_DATA, NO_DATA, NO_DATA, "", NO_DATA]);
    }

    let pct = CoverageTotals::from_file(file.record).percentages();
    let status = if validate_threshold(&config.thresholds, &pct).passed() {
        PASS_GLYPH
    } else {
        FAIL_GLYPH
    };

    let mut cells = vec![name];
    cells.extend(percentage_cells(&pct));
    cells.push(uncovered_cell(file, config.report.max_uncovered, commit_sha));
    cells.push(status.to_string());
    table_row(&cells)
}

fn escape_cell(cell: &str) -> String {
    cell.replace('|', "\\|")
}

fn percentage_cells(pct: &MetricPercentages) -> [String; 4] {
    [
        pct.statements.to_string(),
        pct.branches.to_string(),
        pct.functions.to_string(),
        pct.lines.to_string(),
    ]
}

fn uncovered_cell(file: &RelevantFile, max_uncovered: usize, commit_sha: Option<&str>) -> String {
    let uncovered: Vec<u32> = file.record.uncovered_lines().collect();

    let shown: Vec<String> = uncovered
        .iter()
        .take(max_uncovered)
        .map(|line| match commit_sha {
            Some(sha) => escape_cell(&format!("[{}]({}#L{})", line, blob_link(sha, &file.link_path), line)),
            None => line.to_string(),
        })
        .collect();

    let mut cell = shown.join(", ");
    if uncovered.len() > max_uncovered {
        cell.push_str("...");
    }
    cell
}

/// `link_path` is relative to the repository root, which is what blob URLs expect
fn blob_link(sha: &str, link_path: &str) -> String {
    format!("../blob/{}/{}", sha, link_path)
}
