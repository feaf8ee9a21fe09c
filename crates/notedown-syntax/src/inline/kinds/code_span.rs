//! Code spans: a backtick run closed by a run of the same length.

use crate::inline::{
    InlineContext, InlineNode, ParsingResult, ParsingSpace, SequentialParser, TokensCache,
};
use crate::syntax_kind::SyntaxKind;

pub struct CodeSpan;

/// Backtick count of a closing candidate at `pos`, and the position of its
/// last token. A backslash cannot escape inside a code span, so an escaped
/// backtick counts as a backtick here, together with a run right after it.
fn closing_run(cache: &TokensCache<'_>, space: &ParsingSpace, pos: usize) -> Option<(usize, usize)> {
    let index = space.index(pos);
    match cache.kind(index) {
        SyntaxKind::BACKTICK => {
            let after_escape = index > 0
                && cache.kind(index - 1) == SyntaxKind::ESCAPED_BACKTICKS
                && cache.range(index - 1).end == cache.range(index).start;
            (!after_escape).then(|| (cache.token_text(index).len(), pos))
        }
        SyntaxKind::ESCAPED_BACKTICKS => {
            let next = pos + 1;
            if space.is_contiguous(pos)
                && cache.kind(space.index(next)) == SyntaxKind::BACKTICK
                && cache.range(index).end == cache.range(space.index(next)).start
            {
                Some((1 + cache.token_text(space.index(next)).len(), next))
            } else {
                Some((1, pos))
            }
        }
        _ => None,
    }
}

/// Position of the last token closing the code span opened at `pos`.
pub fn find_closer(cache: &TokensCache<'_>, space: &ParsingSpace, pos: usize) -> Option<usize> {
    let opener = space.index(pos);
    if cache.kind(opener) != SyntaxKind::BACKTICK {
        return None;
    }
    let len = cache.token_text(opener).len();
    (pos + 1..space.len()).find_map(|candidate| {
        closing_run(cache, space, candidate)
            .filter(|(run, _)| *run == len)
            .map(|(_, last)| last)
    })
}

impl SequentialParser for CodeSpan {
    fn name(&self) -> &'static str {
        "code_span"
    }

    fn parse(
        &self,
        cache: &TokensCache<'_>,
        _ctx: &InlineContext<'_>,
        space: &ParsingSpace,
    ) -> ParsingResult {
        let mut nodes = Vec::new();
        let mut claimed = Vec::new();
        let mut pos = 0;
        while pos < space.len() {
            if let Some(last) = find_closer(cache, space, pos) {
                let range = cache.span(space.index(pos), space.index(last));
                nodes.push(InlineNode::new(SyntaxKind::CODE_SPAN, range));
                claimed.push(pos..last + 1);
                pos = last + 1;
            } else {
                pos += 1;
            }
        }
        ParsingResult {
            nodes,
            further: vec![space.without(&claimed)],
        }
    }
}
