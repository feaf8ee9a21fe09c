use std::ops::Range;

use crate::blocks::provider::{BlockProvider, BlockStart, FenceStart, StartContext};
use crate::scanner::{LineCursor, is_blank, is_space_or_tab};

/// Fenced code blocks opened by three or more backticks or tildes.
pub struct CodeFence;

impl CodeFence {
    pub const BACKTICK: u8 = b'`';
    pub const TILDE: u8 = b'~';
    pub const MIN_LEN: usize = 3;

    fn fence_at(cursor: &LineCursor<'_>) -> Option<(Range<usize>, u8)> {
        if cursor.indent() > 3 {
            return None;
        }
        let bytes = cursor.text.as_bytes();
        let (first, _) = cursor.first_nonspace();
        let fence_char = cursor.peek_at(first)?;
        if fence_char != Self::BACKTICK && fence_char != Self::TILDE {
            return None;
        }
        let mut i = first;
        while i < cursor.line.end && bytes[i] == fence_char {
            i += 1;
        }
        (i - first >= Self::MIN_LEN).then_some((first..i, fence_char))
    }

    /// Closing fence for an open block: at least `len` of the same
    /// character, with nothing but whitespace after it.
    pub fn closing(cursor: &LineCursor<'_>, fence_char: u8, len: usize) -> Option<Range<usize>> {
        let (fence, ch) = Self::fence_at(cursor)?;
        let rest = &cursor.text[fence.end..cursor.line.end];
        (ch == fence_char && fence.len() >= len && is_blank(rest)).then_some(fence)
    }
}

impl BlockProvider for CodeFence {
    fn name(&self) -> &'static str {
        "code_fence"
    }

    fn try_start(&self, cursor: &LineCursor<'_>, _ctx: &StartContext<'_>) -> Option<BlockStart> {
        let (fence, fence_char) = Self::fence_at(cursor)?;
        let bytes = cursor.text.as_bytes();
        let mut info_start = fence.end;
        while info_start < cursor.line.end && is_space_or_tab(bytes[info_start]) {
            info_start += 1;
        }
        let mut info_end = cursor.line.end;
        while info_end > info_start && is_space_or_tab(bytes[info_end - 1]) {
            info_end -= 1;
        }
        if fence_char == Self::BACKTICK
            && bytes[info_start..info_end].contains(&Self::BACKTICK)
        {
            return None;
        }
        Some(BlockStart::FencedCode(FenceStart {
            fence,
            fence_char,
            indent: cursor.indent(),
            info: (info_start < info_end).then_some(info_start..info_end),
        }))
    }
}
