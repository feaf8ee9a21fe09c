use crate::blocks::provider::{BlockProvider, BlockStart, ContainerKind, StartContext};
use crate::scanner::{LineCursor, is_blank};

/// Setext underlines turn the paragraph above them into a heading.
pub struct SetextHeading;

impl SetextHeading {
    pub const LEVEL_1: u8 = b'=';
    pub const LEVEL_2: u8 = b'-';
}

impl BlockProvider for SetextHeading {
    fn name(&self) -> &'static str {
        "setext_heading"
    }

    fn try_start(&self, cursor: &LineCursor<'_>, ctx: &StartContext<'_>) -> Option<BlockStart> {
        if ctx.container != ContainerKind::Paragraph || cursor.indent() > 3 {
            return None;
        }
        let (first, _) = cursor.first_nonspace();
        let marker = cursor.peek_at(first)?;
        let level = match marker {
            Self::LEVEL_1 => 1,
            Self::LEVEL_2 => 2,
            _ => return None,
        };
        let bytes = cursor.text.as_bytes();
        let mut end = first;
        while end < cursor.line.end && bytes[end] == marker {
            end += 1;
        }
        if !is_blank(&cursor.text[end..cursor.line.end]) {
            return None;
        }
        Some(BlockStart::SetextUnderline {
            level,
            underline: first..end,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::provider::test_support::{start, start_in};
    use pretty_assertions::assert_eq;

    #[test]
    fn underline_after_paragraph() {
        assert_eq!(
            start_in(&SetextHeading, "Foo\n  ===  ", ContainerKind::Paragraph, &[]),
            Some(BlockStart::SetextUnderline {
                level: 1,
                underline: 6..9
            })
        );
    }

    #[test]
    fn needs_a_paragraph() {
        assert_eq!(start(&SetextHeading, "---"), None);
    }

    #[test]
    fn internal_spaces_break_the_underline() {
        assert_eq!(
            start_in(&SetextHeading, "Foo\n= =", ContainerKind::Paragraph, &[]),
            None
        );
    }
}
