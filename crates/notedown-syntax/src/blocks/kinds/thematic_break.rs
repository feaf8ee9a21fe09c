use crate::blocks::provider::{BlockProvider, BlockStart, StartContext};
use crate::scanner::{LineCursor, is_space_or_tab};

/// `***`, `---` and `___`, optionally separated by spaces.
pub struct ThematicBreak;

impl ThematicBreak {
    pub const CHARS: [u8; 3] = [b'*', b'-', b'_'];
    pub const MIN_LEN: usize = 3;
}

impl BlockProvider for ThematicBreak {
    fn name(&self) -> &'static str {
        "thematic_break"
    }

    fn try_start(&self, cursor: &LineCursor<'_>, _ctx: &StartContext<'_>) -> Option<BlockStart> {
        if cursor.indent() > 3 {
            return None;
        }
        let (first, _) = cursor.first_nonspace();
        let marker = cursor.peek_at(first)?;
        if !Self::CHARS.contains(&marker) {
            return None;
        }
        let bytes = cursor.text.as_bytes();
        let mut count = 0;
        let mut last = first;
        for (i, &b) in bytes[first..cursor.line.end].iter().enumerate() {
            if b == marker {
                count += 1;
                last = first + i + 1;
            } else if !is_space_or_tab(b) {
                return None;
            }
        }
        (count >= Self::MIN_LEN).then_some(BlockStart::ThematicBreak(first..last))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::provider::test_support::start;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("***", Some(0..3))]
    #[case(" - - -  ", Some(1..6))]
    #[case("_____________________________________", Some(0..37))]
    #[case("--", None)]
    #[case("*-*", None)]
    #[case("---a", None)]
    #[case("    ---", None)]
    fn breaks(#[case] text: &str, #[case] expected: Option<std::ops::Range<usize>>) {
        assert_eq!(start(&ThematicBreak, text), expected.map(BlockStart::ThematicBreak));
    }
}
