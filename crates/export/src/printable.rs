//! The landscape paginated printable renderer.
//!
//! This is the one non-trivial transform: a greedy row-packing loop that
//! accumulates (possibly wrapped, multi-line) row heights until the next
//! row would exceed the printable area, then starts a new page and
//! redraws the header. Every page carries the title block at the top and
//! a `page N of M` footer at the bottom; pages are separated by a form
//! feed so the document prints one page per sheet.

use crate::document::TabularDocument;
use crate::error::ExportResult;
use std::ops::Range;

/// Body lines available to data rows on one landscape page, after the
/// title block, header row and footer are accounted for.
const PAGE_BODY_LINES: usize = 40;
/// Widest a single column may render; longer cells wrap.
const MAX_COLUMN_WIDTH: usize = 24;
const COLUMN_GAP: &str = "  ";
const FORM_FEED: char = '\u{0C}';

pub fn render_printable(doc: &TabularDocument, title: &str) -> ExportResult<Vec<u8>> {
    let widths = column_widths(doc);
    let wrapped: Vec<Vec<Vec<String>>> = doc
        .rows
        .iter()
        .map(|row| wrap_row(row, &widths))
        .collect();
    let heights: Vec<usize> = wrapped.iter().map(|row| row_height(row)).collect();
    let pages = plan_pages(&heights, PAGE_BODY_LINES);
    let total_pages = pages.len();

    let header = render_line(
        &doc.columns
            .iter()
            .map(|c| c.label.clone())
            .collect::<Vec<_>>(),
        &widths,
    );
    let rule: String = "-".repeat(header.chars().count());

    let mut out = String::new();
    for (index, range) in pages.iter().enumerate() {
        if index > 0 {
            out.push(FORM_FEED);
            out.push('\n');
        }
        out.push_str(title);
        out.push('\n');
        out.push('\n');
        out.push_str(&header);
        out.push('\n');
        out.push_str(&rule);
        out.push('\n');
        for row in &wrapped[range.clone()] {
            for line_index in 0..row_height(row) {
                let cells: Vec<String> = row
                    .iter()
                    .map(|cell| cell.get(line_index).cloned().unwrap_or_default())
                    .collect();
                out.push_str(&render_line(&cells, &widths));
                out.push('\n');
            }
        }
        out.push('\n');
        out.push_str(&format!("page {} of {}", index + 1, total_pages));
        out.push('\n');
    }
    Ok(out.into_bytes())
}

/// Greedy packing: fill a page until the next row would exceed `budget`,
/// then open a new page. A row taller than the whole budget still gets a
/// page of its own, so the loop always advances.
pub(crate) fn plan_pages(heights: &[usize], budget: usize) -> Vec<Range<usize>> {
    let mut pages = Vec::new();
    let mut start = 0usize;
    let mut used = 0usize;

    for (index, &height) in heights.iter().enumerate() {
        if index > start || used > 0 {
            if used + height > budget {
                pages.push(start..index);
                start = index;
                used = 0;
            }
        }
        used += height;
    }
    if start < heights.len() {
        pages.push(start..heights.len());
    }
    pages
}

fn column_widths(doc: &TabularDocument) -> Vec<usize> {
    doc.columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            let cells_max = doc
                .rows
                .iter()
                .map(|row| row.get(i).map(|c| c.chars().count()).unwrap_or(0))
                .max()
                .unwrap_or(0);
            column
                .label
                .chars()
                .count()
                .max(cells_max)
                .min(MAX_COLUMN_WIDTH)
        })
        .collect()
}

/// Splits every cell of a row into width-bounded line chunks.
fn wrap_row(row: &[String], widths: &[usize]) -> Vec<Vec<String>> {
    widths
        .iter()
        .enumerate()
        .map(|(i, &width)| {
            let cell = row.get(i).map(String::as_str).unwrap_or("");
            wrap_cell(cell, width)
        })
        .collect()
}

fn wrap_cell(cell: &str, width: usize) -> Vec<String> {
    if cell.is_empty() {
        return vec![String::new()];
    }
    let chars: Vec<char> = cell.chars().collect();
    chars
        .chunks(width.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}

fn row_height(row: &[Vec<String>]) -> usize {
    row.iter().map(Vec::len).max().unwrap_or(1)
}

fn render_line(cells: &[String], widths: &[usize]) -> String {
    let mut line = String::new();
    for (i, &width) in widths.iter().enumerate() {
        if i > 0 {
            line.push_str(COLUMN_GAP);
        }
        let cell = cells.get(i).map(String::as_str).unwrap_or("");
        line.push_str(cell);
        let pad = width.saturating_sub(cell.chars().count());
        line.extend(std::iter::repeat(' ').take(pad));
    }
    line.trim_end().to_string()
}
