//! Link reference definitions.
//!
//! Definitions are recognised when a paragraph closes (or turns into a
//! setext heading or a table header): as many leading definitions as
//! possible are removed from it. The paragraph lines are first joined into a
//! [`LogicalText`] with container prefixes removed, so a definition can span
//! lines of a block quote.

use std::ops::Range;

use crate::blocks::marker_block::ParagraphLine;
use crate::scanner::is_space_or_tab;

/// Maximum nesting of parentheses in a bare destination.
const MAX_PAREN_DEPTH: usize = 32;
/// Maximum length of a label, brackets excluded.
const MAX_LABEL_LEN: usize = 999;

/// Paragraph lines joined by `\n`, with a map back to source offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalText {
    pub text: String,
    /// Source offset of every byte of `text`, plus one entry for its end.
    offsets: Vec<usize>,
    /// Offset in `text` where each line starts.
    line_starts: Vec<usize>,
}

impl LogicalText {
    pub fn new(source: &str, lines: &[ParagraphLine]) -> Self {
        let mut text = String::new();
        let mut offsets = Vec::new();
        let mut line_starts = Vec::with_capacity(lines.len());
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                text.push('\n');
                offsets.push(lines[i - 1].end);
            }
            line_starts.push(text.len());
            text.push_str(&source[line.start..line.end]);
            offsets.extend(line.start..line.end);
        }
        offsets.push(lines.last().map_or(0, |line| line.end));
        Self {
            text,
            offsets,
            line_starts,
        }
    }

    /// Source range of a logical range.
    pub fn source_range(&self, range: Range<usize>) -> Range<usize> {
        self.offsets[range.start]..self.offsets[range.end]
    }

    /// Index of the first line starting at or after `pos`.
    pub fn line_at(&self, pos: usize) -> usize {
        self.line_starts.partition_point(|&start| start < pos)
    }
}

/// A parsed definition, as logical ranges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    /// `[label]` including the brackets.
    pub label: Range<usize>,
    /// Destination including `<>` if present.
    pub destination: Range<usize>,
    /// Title including its delimiters.
    pub title: Option<Range<usize>>,
    /// End of the definition, trailing whitespace excluded.
    pub end: usize,
    /// Start of the next line, or the text length.
    pub next: usize,
}

impl Definition {
    /// Destination without angle brackets.
    pub fn destination_text<'a>(&self, text: &'a str) -> &'a str {
        let dest = &text[self.destination.clone()];
        dest.strip_prefix('<')
            .and_then(|d| d.strip_suffix('>'))
            .unwrap_or(dest)
    }

    /// Title without its delimiters.
    pub fn title_text<'a>(&self, text: &'a str) -> Option<&'a str> {
        self.title
            .clone()
            .map(|title| &text[title.start + 1..title.end - 1])
    }

    /// Label without brackets.
    pub fn label_text<'a>(&self, text: &'a str) -> &'a str {
        &text[self.label.start + 1..self.label.end - 1]
    }
}

fn skip_spaces(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && is_space_or_tab(bytes[i]) {
        i += 1;
    }
    i
}

/// Skips spaces and at most one line ending.
pub fn skip_spnl(bytes: &[u8], i: usize) -> usize {
    let i = skip_spaces(bytes, i);
    if bytes.get(i) == Some(&b'\n') {
        skip_spaces(bytes, i + 1)
    } else {
        i
    }
}

/// `[label]` starting at `i`, returning the index after `]`.
pub fn scan_label(bytes: &[u8], i: usize) -> Option<usize> {
    if bytes.get(i) != Some(&b'[') {
        return None;
    }
    let mut j = i + 1;
    let mut has_content = false;
    while j < bytes.len() && j - i - 1 <= MAX_LABEL_LEN {
        match bytes[j] {
            b'\\' if j + 1 < bytes.len() && bytes[j + 1].is_ascii_punctuation() => {
                has_content = true;
                j += 2;
                continue;
            }
            b'[' => return None,
            b']' => {
                return (has_content && j - i - 1 <= MAX_LABEL_LEN).then_some(j + 1);
            }
            b' ' | b'\t' | b'\n' => {}
            _ => has_content = true,
        }
        j += 1;
    }
    None
}

/// Destination starting at `i`, returning the index after it.
pub fn scan_destination(bytes: &[u8], i: usize) -> Option<usize> {
    if bytes.get(i) == Some(&b'<') {
        let mut j = i + 1;
        while j < bytes.len() {
            match bytes[j] {
                b'\\' if j + 1 < bytes.len() && bytes[j + 1].is_ascii_punctuation() => j += 2,
                b'\n' | b'<' => return None,
                b'>' => return Some(j + 1),
                _ => j += 1,
            }
        }
        return None;
    }
    let mut j = i;
    let mut depth = 0usize;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' if j + 1 < bytes.len() && bytes[j + 1].is_ascii_punctuation() => {
                j += 2;
                continue;
            }
            b if b <= b' ' || b == 0x7f => break,
            b'(' => {
                depth += 1;
                if depth > MAX_PAREN_DEPTH {
                    return None;
                }
            }
            b')' => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            _ => {}
        }
        j += 1;
    }
    (j > i && depth == 0).then_some(j)
}

/// Title starting at `i`, returning the index after its closing delimiter.
pub fn scan_title(bytes: &[u8], i: usize) -> Option<usize> {
    let close = match bytes.get(i)? {
        b'"' => b'"',
        b'\'' => b'\'',
        b'(' => b')',
        _ => return None,
    };
    let mut j = i + 1;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' if j + 1 < bytes.len() && bytes[j + 1].is_ascii_punctuation() => j += 2,
            b if b == close => return Some(j + 1),
            b'(' if close == b')' => return None,
            _ => j += 1,
        }
    }
    None
}

/// Only spaces up to the end of the line.
fn line_ends_at(bytes: &[u8], i: usize) -> Option<usize> {
    let i = skip_spaces(bytes, i);
    match bytes.get(i) {
        None => Some(i),
        Some(b'\n') => Some(i + 1),
        Some(_) => None,
    }
}

/// Parses one definition starting at the line beginning at `pos`.
pub fn parse_definition(text: &str, pos: usize) -> Option<Definition> {
    let bytes = text.as_bytes();
    let start = skip_spaces(bytes, pos);
    let label_end = scan_label(bytes, start)?;
    if bytes.get(label_end) != Some(&b':') {
        return None;
    }
    let dest_start = skip_spnl(bytes, label_end + 1);
    let dest_end = scan_destination(bytes, dest_start)?;

    let title_start = skip_spnl(bytes, dest_end);
    if title_start > dest_end
        && let Some(title_end) = scan_title(bytes, title_start)
        && let Some(next) = line_ends_at(bytes, title_end)
    {
        return Some(Definition {
            label: start..label_end,
            destination: dest_start..dest_end,
            title: Some(title_start..title_end),
            end: title_end,
            next,
        });
    }

    let next = line_ends_at(bytes, dest_end)?;
    Some(Definition {
        label: start..label_end,
        destination: dest_start..dest_end,
        title: None,
        end: dest_end,
        next,
    })
}
