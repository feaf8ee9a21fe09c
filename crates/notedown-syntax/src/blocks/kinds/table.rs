//! GFM tables.
//!
//! A table starts when the line after a paragraph line is a delimiter row
//! (`| --- | :-: |`) with as many cells as that paragraph line. The last
//! paragraph line becomes the header; the lines before it stay a paragraph.
//! Body rows follow until a blank line or another block start.

use std::ops::Range;

use crate::blocks::provider::{BlockProvider, BlockStart, ContainerKind, StartContext};
use crate::scanner::{LineCursor, is_space_or_tab};

/// One table row split into cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    /// The row without surrounding whitespace.
    pub range: Range<usize>,
    /// Trimmed cell contents. An empty cell is a zero-width range.
    pub cells: Vec<Range<usize>>,
    /// Unescaped `|` separators.
    pub pipes: Vec<Range<usize>>,
}

fn trim(bytes: &[u8], mut start: usize, mut end: usize) -> Range<usize> {
    while start < end && is_space_or_tab(bytes[start]) {
        start += 1;
    }
    while end > start && is_space_or_tab(bytes[end - 1]) {
        end -= 1;
    }
    start..end
}

/// Splits `text[start..end]` at unescaped pipes. A leading and a trailing
/// pipe do not delimit an extra empty cell.
pub fn parse_row(text: &str, start: usize, end: usize) -> TableRow {
    let bytes = text.as_bytes();
    let range = trim(bytes, start, end);
    let mut cells = Vec::new();
    let mut pipes = Vec::new();

    let mut i = range.start;
    if i < range.end && bytes[i] == b'|' {
        pipes.push(i..i + 1);
        i += 1;
    }
    let mut cell_start = i;
    while i < range.end {
        match bytes[i] {
            b'\\' => i += 2,
            b'|' => {
                cells.push(trim(bytes, cell_start, i));
                pipes.push(i..i + 1);
                i += 1;
                cell_start = i;
            }
            _ => i += 1,
        }
    }
    if cell_start < range.end {
        cells.push(trim(bytes, cell_start, range.end));
    }
    TableRow {
        range,
        cells,
        pipes,
    }
}

/// A delimiter row cell: `---`, `:---`, `---:` or `:---:`.
pub fn is_delimiter_cell(s: &str) -> bool {
    let s = s.strip_prefix(':').unwrap_or(s);
    let s = s.strip_suffix(':').unwrap_or(s);
    !s.is_empty() && s.bytes().all(|b| b == b'-')
}

/// Column alignment from a delimiter cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    None,
    Left,
    Center,
    Right,
}

impl Alignment {
    pub fn from_delimiter(s: &str) -> Self {
        match (s.starts_with(':'), s.len() > 1 && s.ends_with(':')) {
            (true, true) => Self::Center,
            (true, false) => Self::Left,
            (false, true) => Self::Right,
            (false, false) => Self::None,
        }
    }
}

/// GFM table provider.
pub struct Table;

impl BlockProvider for Table {
    fn name(&self) -> &'static str {
        "table"
    }

    fn try_start(&self, cursor: &LineCursor<'_>, ctx: &StartContext<'_>) -> Option<BlockStart> {
        if ctx.container != ContainerKind::Paragraph || cursor.indent() > 3 {
            return None;
        }
        let header_line = ctx.paragraph.last()?;
        let (first, _) = cursor.first_nonspace();
        let delimiter = parse_row(cursor.text, first, cursor.line.end);
        if delimiter.pipes.is_empty()
            || delimiter.cells.is_empty()
            || !delimiter
                .cells
                .iter()
                .all(|cell| is_delimiter_cell(&cursor.text[cell.clone()]))
        {
            return None;
        }
        let header = parse_row(cursor.text, header_line.start, header_line.end);
        if header.cells.len() != delimiter.cells.len() {
            return None;
        }
        Some(BlockStart::Table { header, delimiter })
    }
}
