//! # Text scanner
//!
//! Low-level helpers shared by the block engine and the inline parsers:
//!
//! - [`Line`] / [`lines`]: split the source into lines, keeping the byte span
//!   of the content and of the line ending separately.
//! - [`LineCursor`]: a position inside one line that tracks both the byte
//!   offset and the visual column, so that tabs expand to the next multiple
//!   of [`TAB_STOP`]. A cursor may stop inside a tab; the tab's remaining
//!   columns still count as indentation.
//! - Character classification used by the flanking rules
//!   ([`is_unicode_whitespace`], [`is_unicode_punctuation`]).

use unicode_categories::UnicodeCategories;

/// Tab stops are every four columns.
pub const TAB_STOP: usize = 4;

/// Columns of indentation that start an indented code block.
pub const CODE_INDENT: usize = 4;

/// One line of the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line {
    /// Byte offset of the first character of the line.
    pub start: usize,
    /// Byte offset just past the last content character (before the EOL).
    pub end: usize,
    /// Byte offset just past the line ending (equals `end` on the last line
    /// when the input has no trailing newline).
    pub eol_end: usize,
}

impl Line {
    /// Content of the line without its line ending.
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }

    /// Returns true if the line has a line ending.
    pub fn has_eol(&self) -> bool {
        self.eol_end > self.end
    }
}

/// Split `text` into lines. `\n`, `\r\n` and a lone `\r` all end a line.
///
/// A trailing line ending does not produce an extra empty line.
pub fn lines(text: &str) -> Vec<Line> {
    let bytes = text.as_bytes();
    let mut out = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                out.push(Line {
                    start,
                    end: i,
                    eol_end: i + 1,
                });
                i += 1;
                start = i;
            }
            b'\r' => {
                let eol_end = if bytes.get(i + 1) == Some(&b'\n') {
                    i + 2
                } else {
                    i + 1
                };
                out.push(Line {
                    start,
                    end: i,
                    eol_end,
                });
                i = eol_end;
                start = i;
            }
            _ => i += 1,
        }
    }
    if start < bytes.len() {
        out.push(Line {
            start,
            end: bytes.len(),
            eol_end: bytes.len(),
        });
    }
    out
}

/// Returns true for a space or a tab.
pub fn is_space_or_tab(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

/// Returns true if `s` contains only spaces and tabs.
pub fn is_blank(s: &str) -> bool {
    s.bytes().all(is_space_or_tab)
}

/// Column reached after `byte` when starting at `column`.
pub fn next_column(column: usize, byte: u8) -> usize {
    if byte == b'\t' {
        column + TAB_STOP - column % TAB_STOP
    } else if byte & 0xC0 == 0x80 {
        // UTF-8 continuation byte: the column was counted on the lead byte.
        column
    } else {
        column + 1
    }
}

/// Unicode whitespace in the CommonMark sense: Zs plus tab, LF, FF and CR.
pub fn is_unicode_whitespace(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\u{0C}' | '\r') || c.is_separator_space()
}

/// Unicode punctuation: ASCII punctuation, P* and S* categories.
pub fn is_unicode_punctuation(c: char) -> bool {
    c.is_ascii_punctuation() || c.is_punctuation() || c.is_symbol()
}

/// A saved [`LineCursor`] position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    pub offset: usize,
    pub column: usize,
    /// `column` lies inside the tab at `offset`.
    pub partial_tab: bool,
}

/// A position inside one line with column tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineCursor<'a> {
    /// The full source text.
    pub text: &'a str,
    /// The line being scanned.
    pub line: Line,
    /// Current byte offset (absolute).
    pub offset: usize,
    /// Current visual column, relative to the start of the line.
    pub column: usize,
    /// Part of the tab at `offset` is already consumed.
    pub partial_tab: bool,
}

impl<'a> LineCursor<'a> {
    /// Cursor at the start of `line`.
    pub fn new(text: &'a str, line: Line) -> Self {
        Self {
            text,
            line,
            offset: line.start,
            column: 0,
            partial_tab: false,
        }
    }

    /// Cursor at an already known position.
    pub fn at(text: &'a str, line: Line, position: Position) -> Self {
        Self {
            text,
            line,
            offset: position.offset,
            column: position.column,
            partial_tab: position.partial_tab,
        }
    }

    pub fn position(&self) -> Position {
        Position {
            offset: self.offset,
            column: self.column,
            partial_tab: self.partial_tab,
        }
    }

    /// Columns of the tab at the cursor that are not consumed yet, when the
    /// cursor stopped inside it.
    pub fn tab_remainder(&self) -> usize {
        if self.partial_tab {
            next_column(self.column, b'\t') - self.column
        } else {
            0
        }
    }

    /// Remaining content of the line from the current offset.
    pub fn rest(&self) -> &'a str {
        &self.text[self.offset..self.line.end]
    }

    /// Byte at the current offset.
    pub fn peek(&self) -> Option<u8> {
        self.peek_at(self.offset)
    }

    /// Byte at an absolute offset, bounded by the line end.
    pub fn peek_at(&self, offset: usize) -> Option<u8> {
        if offset < self.line.end {
            Some(self.text.as_bytes()[offset])
        } else {
            None
        }
    }

    /// Returns true if the rest of the line is blank.
    pub fn is_blank(&self) -> bool {
        is_blank(self.rest())
    }

    /// First non-space offset and its column, without moving.
    pub fn first_nonspace(&self) -> (usize, usize) {
        let mut offset = self.offset;
        let mut column = self.column;
        while let Some(b) = self.peek_at(offset) {
            if !is_space_or_tab(b) {
                break;
            }
            column = next_column(column, b);
            offset += 1;
        }
        (offset, column)
    }

    /// Columns of indentation before the first non-space character.
    pub fn indent(&self) -> usize {
        self.first_nonspace().1 - self.column
    }

    /// Advances by `n` bytes, updating the column.
    pub fn advance_bytes(&mut self, n: usize) {
        let target = (self.offset + n).min(self.line.end);
        while self.offset < target {
            let b = self.text.as_bytes()[self.offset];
            self.column = next_column(self.column, b);
            self.offset += 1;
            self.partial_tab = false;
        }
    }

    /// Consumes at most `columns` columns of spaces and tabs.
    ///
    /// A tab that would overshoot is only partly consumed: the cursor stays
    /// on it with `partial_tab` set.
    pub fn advance_columns(&mut self, columns: usize) {
        let target = self.column + columns;
        while self.column < target {
            match self.peek() {
                Some(b'\t') => {
                    let next = next_column(self.column, b'\t');
                    if next > target {
                        self.column = target;
                        self.partial_tab = true;
                        return;
                    }
                    self.column = next;
                }
                Some(b' ') => self.column += 1,
                _ => return,
            }
            self.offset += 1;
            self.partial_tab = false;
        }
    }

    /// Moves to the first non-space character.
    pub fn skip_spaces(&mut self) {
        let (offset, column) = self.first_nonspace();
        if offset != self.offset {
            self.partial_tab = false;
        }
        self.offset = offset;
        self.column = column;
    }

    /// Offset of the end of the line with trailing whitespace removed.
    pub fn trimmed_end(&self) -> usize {
        let bytes = self.text.as_bytes();
        let mut end = self.line.end;
        while end > self.offset && is_space_or_tab(bytes[end - 1]) {
            end -= 1;
        }
        end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn splits_all_line_endings() {
        let text = "a\nb\r\nc\rd";
        let got: Vec<&str> = lines(text).iter().map(|l| l.text(text)).collect();
        assert_eq!(got, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn trailing_newline_does_not_add_line() {
        let got = lines("a\n");
        assert_eq!(
            got,
            vec![Line {
                start: 0,
                end: 1,
                eol_end: 2
            }]
        );
    }

    #[test]
    fn blank_lines_are_kept() {
        assert_eq!(lines("a\n\nb").len(), 3);
    }

    #[rstest]
    #[case(0, b'\t', 4)]
    #[case(1, b'\t', 4)]
    #[case(4, b'\t', 8)]
    #[case(2, b' ', 3)]
    fn tab_stops(#[case] column: usize, #[case] byte: u8, #[case] expected: usize) {
        assert_eq!(next_column(column, byte), expected);
    }

    #[test]
    fn cursor_indent_counts_tabs() {
        let text = " \tfoo";
        let line = lines(text)[0];
        let cursor = LineCursor::new(text, line);
        assert_eq!(cursor.indent(), 4);
        assert_eq!(cursor.first_nonspace(), (2, 4));
    }

    #[test]
    fn advance_columns_stops_at_content() {
        let text = "  foo";
        let line = lines(text)[0];
        let mut cursor = LineCursor::new(text, line);
        cursor.advance_columns(4);
        assert_eq!(cursor.offset, 2);
        assert_eq!(cursor.rest(), "foo");
    }

    #[test]
    fn advance_columns_stops_inside_a_tab() {
        let text = "-\t\tfoo";
        let line = lines(text)[0];
        let mut cursor = LineCursor::new(text, line);
        cursor.advance_bytes(1);
        cursor.advance_columns(1);
        assert_eq!((cursor.offset, cursor.column), (1, 2));
        assert!(cursor.partial_tab);
        assert_eq!(cursor.tab_remainder(), 2);
        assert_eq!(cursor.indent(), 6);

        cursor.advance_columns(4);
        assert_eq!((cursor.offset, cursor.column), (2, 6));
        assert_eq!(cursor.tab_remainder(), 2);

        cursor.skip_spaces();
        assert_eq!((cursor.rest(), cursor.column), ("foo", 8));
        assert!(!cursor.partial_tab);
    }

    #[test]
    fn positions_restore_a_cursor() {
        let text = " \tx";
        let line = lines(text)[0];
        let mut cursor = LineCursor::new(text, line);
        cursor.advance_columns(2);
        let copy = LineCursor::at(text, line, cursor.position());
        assert_eq!(copy, cursor);
        assert_eq!(copy.tab_remainder(), 2);
    }

    #[rstest]
    #[case(' ', true)]
    #[case('\u{a0}', true)]
    #[case('a', false)]
    fn whitespace_classes(#[case] c: char, #[case] expected: bool) {
        assert_eq!(is_unicode_whitespace(c), expected);
    }

    #[rstest]
    #[case('!', true)]
    #[case('£', true)]
    #[case('“', true)]
    #[case('a', false)]
    fn punctuation_classes(#[case] c: char, #[case] expected: bool) {
        assert_eq!(is_unicode_punctuation(c), expected);
    }
}
