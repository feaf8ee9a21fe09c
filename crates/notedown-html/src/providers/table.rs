//! GFM tables.
//!
//! The column count and alignments come from the delimiter row. Body rows
//! with fewer cells are padded with empty ones, extra cells are dropped.

use notedown_syntax::SyntaxNode;
use notedown_syntax::ast::{self, AstNode, Row};
use notedown_syntax::blocks::kinds::table::Alignment;

use crate::HtmlGenerator;
use crate::providers::GeneratingProvider;

pub struct Table;

fn align_attribute(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::None => "",
        Alignment::Left => " align=\"left\"",
        Alignment::Center => " align=\"center\"",
        Alignment::Right => " align=\"right\"",
    }
}

fn generate_row(html: &mut HtmlGenerator<'_>, row: &Row, alignments: &[Alignment]) {
    let tag = if row.is_header() { "th" } else { "td" };
    let cells: Vec<SyntaxNode> = row.cells().collect();
    html.push("<tr>\n");
    for (column, alignment) in alignments.iter().enumerate() {
        html.push(&format!("<{tag}{}>", align_attribute(*alignment)));
        if let Some(cell) = cells.get(column) {
            html.generate_inner(cell, 0);
        }
        html.push(&format!("</{tag}>\n"));
    }
    html.push("</tr>\n");
}

impl GeneratingProvider for Table {
    fn generate(&self, node: &SyntaxNode, html: &mut HtmlGenerator<'_>) {
        let Some(table) = ast::Table::cast(node.clone()) else {
            return;
        };
        let alignments = table.alignments();
        html.cr();
        html.push("<table>\n<thead>\n");
        if let Some(header) = table.header() {
            generate_row(html, &header, &alignments);
        }
        html.push("</thead>\n");
        let rows: Vec<Row> = table.rows().collect();
        if !rows.is_empty() {
            html.push("<tbody>\n");
            for row in &rows {
                generate_row(html, row, &alignments);
            }
            html.push("</tbody>\n");
        }
        html.push("</table>\n");
    }
}
