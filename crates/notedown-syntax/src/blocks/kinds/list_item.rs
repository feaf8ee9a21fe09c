use crate::blocks::provider::{BlockProvider, BlockStart, ListMarker, StartContext};
use crate::scanner::{LineCursor, Position, is_space_or_tab};

/// Bullet (`-`, `+`, `*`) and ordered (`1.`, `1)`) list items.
pub struct ListItem {
    /// Recognise GFM task list checkboxes after the marker.
    pub task_lists: bool,
}

impl ListItem {
    pub const BULLETS: [u8; 3] = [b'-', b'+', b'*'];
    pub const MAX_DIGITS: usize = 9;
    /// Content indented further than this after the marker starts an
    /// indented code block inside the item instead.
    pub const MAX_PADDING: usize = 4;

    fn checkbox(cursor: &LineCursor<'_>, at: usize) -> Option<std::ops::Range<usize>> {
        let bytes = cursor.text.as_bytes();
        let end = cursor.line.end;
        if at + 3 >= end {
            return None;
        }
        let is_box = bytes[at] == b'['
            && matches!(bytes[at + 1], b' ' | b'x' | b'X')
            && bytes[at + 2] == b']'
            && is_space_or_tab(bytes[at + 3]);
        is_box.then_some(at..at + 3)
    }
}

impl BlockProvider for ListItem {
    fn name(&self) -> &'static str {
        "list_item"
    }

    fn try_start(&self, cursor: &LineCursor<'_>, ctx: &StartContext<'_>) -> Option<BlockStart> {
        if cursor.indent() > 3 {
            return None;
        }
        let bytes = cursor.text.as_bytes();
        let end = cursor.line.end;
        let (first, first_column) = cursor.first_nonspace();
        let b = cursor.peek_at(first)?;

        let (ordered, marker, number, marker_end) = if Self::BULLETS.contains(&b) {
            (false, b as char, 0, first + 1)
        } else if b.is_ascii_digit() {
            let mut i = first;
            while i < end && bytes[i].is_ascii_digit() {
                i += 1;
            }
            if i - first > Self::MAX_DIGITS || i >= end || !matches!(bytes[i], b'.' | b')') {
                return None;
            }
            let number = cursor.text[first..i].parse().ok()?;
            (true, bytes[i] as char, number, i + 1)
        } else {
            return None;
        };
        if marker_end < end && !is_space_or_tab(bytes[marker_end]) {
            return None;
        }

        let width = marker_end - first;
        let after = LineCursor::at(
            cursor.text,
            cursor.line,
            Position {
                offset: marker_end,
                column: first_column + width,
                partial_tab: false,
            },
        );
        let blank = after.is_blank();
        if ctx.interrupts_paragraph() && (blank || (ordered && number != 1)) {
            return None;
        }

        let spaces = after.indent();
        let (padding, content) = if blank || spaces < 1 || spaces > Self::MAX_PADDING {
            let mut content = after;
            content.advance_columns(1);
            (width + 1, content)
        } else {
            let mut content = after;
            content.skip_spaces();
            (width + spaces, content)
        };

        let checkbox = if self.task_lists && !blank {
            Self::checkbox(cursor, content.offset)
        } else {
            None
        };

        Some(BlockStart::ListItem(ListMarker {
            ordered,
            marker,
            number,
            range: first..marker_end,
            marker_offset: first_column - cursor.column,
            padding,
            content: content.position(),
            checkbox,
        }))
    }
}
