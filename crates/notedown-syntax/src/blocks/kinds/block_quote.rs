use crate::blocks::provider::{BlockProvider, BlockStart, StartContext};
use crate::scanner::LineCursor;

/// `>` block quotes.
pub struct BlockQuote;

impl BlockQuote {
    pub const MARKER: u8 = b'>';
    /// Columns of indentation allowed before the marker.
    pub const MAX_INDENT: usize = 3;
}

impl BlockProvider for BlockQuote {
    fn name(&self) -> &'static str {
        "block_quote"
    }

    fn try_start(&self, cursor: &LineCursor<'_>, _ctx: &StartContext<'_>) -> Option<BlockStart> {
        let (first, _) = cursor.first_nonspace();
        if cursor.indent() > Self::MAX_INDENT || cursor.peek_at(first) != Some(Self::MARKER) {
            return None;
        }
        Some(BlockStart::BlockQuote {
            marker: first..first + 1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::provider::test_support::start;
    use pretty_assertions::assert_eq;

    #[test]
    fn marker_after_indent() {
        assert_eq!(
            start(&BlockQuote, "   > foo"),
            Some(BlockStart::BlockQuote { marker: 3..4 })
        );
    }

    #[test]
    fn too_much_indent() {
        assert_eq!(start(&BlockQuote, "    > foo"), None);
    }

    #[test]
    fn not_a_quote() {
        assert_eq!(start(&BlockQuote, "foo > bar"), None);
    }
}
