use crate::blocks::provider::{AtxStart, BlockProvider, BlockStart, StartContext};
use crate::scanner::{LineCursor, is_space_or_tab};

/// `# Heading` through `###### Heading`.
pub struct AtxHeading;

impl AtxHeading {
    pub const MARKER: u8 = b'#';
    pub const MAX_LEVEL: usize = 6;
}

impl BlockProvider for AtxHeading {
    fn name(&self) -> &'static str {
        "atx_heading"
    }

    fn try_start(&self, cursor: &LineCursor<'_>, _ctx: &StartContext<'_>) -> Option<BlockStart> {
        if cursor.indent() > 3 {
            return None;
        }
        let bytes = cursor.text.as_bytes();
        let end = cursor.line.end;
        let (first, _) = cursor.first_nonspace();

        let mut i = first;
        while i < end && bytes[i] == Self::MARKER {
            i += 1;
        }
        let level = i - first;
        if level == 0 || level > Self::MAX_LEVEL || (i < end && !is_space_or_tab(bytes[i])) {
            return None;
        }
        let opening = first..i;

        let mut content_start = i;
        while content_start < end && is_space_or_tab(bytes[content_start]) {
            content_start += 1;
        }
        let mut content_end = end;
        while content_end > content_start && is_space_or_tab(bytes[content_end - 1]) {
            content_end -= 1;
        }

        // optional closing sequence, which must follow a space
        let mut closing = None;
        let mut hashes = content_end;
        while hashes > content_start && bytes[hashes - 1] == Self::MARKER {
            hashes -= 1;
        }
        if hashes < content_end
            && (hashes == content_start || is_space_or_tab(bytes[hashes - 1]))
        {
            closing = Some(hashes..content_end);
            content_end = hashes;
            while content_end > content_start && is_space_or_tab(bytes[content_end - 1]) {
                content_end -= 1;
            }
        }

        Some(BlockStart::AtxHeading(AtxStart {
            level,
            opening,
            content: (content_start < content_end).then_some(content_start..content_end),
            closing,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::provider::test_support::start;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn atx(text: &str) -> Option<AtxStart> {
        match start(&AtxHeading, text) {
            Some(BlockStart::AtxHeading(atx)) => Some(atx),
            _ => None,
        }
    }

    #[test]
    fn plain_heading() {
        assert_eq!(
            atx("## foo"),
            Some(AtxStart {
                level: 2,
                opening: 0..2,
                content: Some(3..6),
                closing: None,
            })
        );
    }

    #[test]
    fn closing_sequence_is_split_off() {
        let heading = atx("# foo ##   ").expect("heading");
        assert_eq!(heading.content, Some(2..5));
        assert_eq!(heading.closing, Some(6..8));
    }

    #[test]
    fn hashes_glued_to_content_stay_content() {
        let heading = atx("# foo#").expect("heading");
        assert_eq!(heading.content, Some(2..6));
        assert_eq!(heading.closing, None);
    }

    #[test]
    fn empty_heading_with_closing_sequence() {
        let heading = atx("### ###").expect("heading");
        assert_eq!(heading.content, None);
        assert_eq!(heading.closing, Some(4..7));
    }

    #[rstest]
    #[case("#5 bolt")]
    #[case("####### foo")]
    #[case("    # foo")]
    #[case("\\## foo")]
    fn not_headings(#[case] text: &str) {
        assert_eq!(atx(text), None);
    }

    #[test]
    fn bare_marker_is_an_empty_heading() {
        assert_eq!(atx("#").map(|h| h.content), Some(None));
    }
}
