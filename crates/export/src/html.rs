//! Self-contained styled HTML rendering.

use crate::document::TabularDocument;
use crate::error::ExportResult;
use std::fmt::Write;

pub fn render_html(doc: &TabularDocument, title: &str) -> ExportResult<Vec<u8>> {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(out, "<title>{}</title>", escape(title));
    out.push_str(
        "<style>\n\
         body { font-family: sans-serif; margin: 2rem; }\n\
         h1 { font-size: 1.3rem; }\n\
         table { border-collapse: collapse; width: 100%; }\n\
         th, td { border: 1px solid #999; padding: 0.3rem 0.6rem; text-align: left; }\n\
         th { background: #eee; }\n\
         tr:nth-child(even) { background: #f7f7f7; }\n\
         @page { size: landscape; }\n\
         </style>\n</head>\n<body>\n",
    );
    let _ = writeln!(out, "<h1>{}</h1>", escape(title));
    out.push_str("<table>\n<thead>\n<tr>");
    for column in &doc.columns {
        let _ = write!(out, "<th>{}</th>", escape(&column.label));
    }
    out.push_str("</tr>\n</thead>\n<tbody>\n");
    for row in &doc.rows {
        out.push_str("<tr>");
        for cell in row {
            let _ = write!(out, "<td>{}</td>", escape(cell));
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody>\n</table>\n</body>\n</html>\n");
    Ok(out.into_bytes())
}

fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
