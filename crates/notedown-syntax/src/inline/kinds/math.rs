//! `$inline$` and `$$display$$` math.

use crate::inline::{
    InlineContext, InlineNode, ParsingResult, ParsingSpace, SequentialParser, TokensCache,
};
use crate::syntax_kind::SyntaxKind;

pub struct Math;

impl Math {
    pub const INLINE: usize = 1;
    pub const DISPLAY: usize = 2;
}

/// Length of the `$` run starting at `pos`.
fn run_len(cache: &TokensCache<'_>, space: &ParsingSpace, pos: usize) -> usize {
    let mut len = 0;
    while pos + len < space.len() && cache.kind(space.index(pos + len)) == SyntaxKind::DOLLAR {
        len += 1;
        if !space.is_contiguous(pos + len - 1) {
            break;
        }
    }
    len
}

fn is_space(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::WHITE_SPACE | SyntaxKind::EOL | SyntaxKind::HARD_LINE_BREAK
    )
}

/// Position of the last `$` closing the run of `len` at `pos`.
fn find_closer(cache: &TokensCache<'_>, space: &ParsingSpace, pos: usize, len: usize) -> Option<usize> {
    let mut candidate = pos + len;
    while candidate < space.len() {
        let run = run_len(cache, space, candidate);
        if run == 0 {
            candidate += 1;
            continue;
        }
        let preceded_by_dollar = cache.char_before(space.index(candidate)) == Some('$');
        if run == len && !preceded_by_dollar {
            return Some(candidate + len - 1);
        }
        candidate += run;
    }
    None
}

impl SequentialParser for Math {
    fn name(&self) -> &'static str {
        "math"
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
            let len = run_len(cache, space, pos);
            if len == 0 {
                pos += 1;
                continue;
            }
            let kind = match len {
                Self::INLINE => SyntaxKind::INLINE_MATH,
                Self::DISPLAY => SyntaxKind::BLOCK_MATH,
                _ => {
                    pos += len;
                    continue;
                }
            };
            let Some(last) = find_closer(cache, space, pos, len) else {
                pos += len;
                continue;
            };
            let first_content = space.index(pos + len);
            let last_content = space.index(last + 1 - len - 1);
            let close = space.index(last);
            let valid = last + 1 - len > pos + len
                && (kind == SyntaxKind::BLOCK_MATH
                    || (!is_space(cache.kind(first_content))
                        && !is_space(cache.kind(last_content))
                        && !cache.char_after(close).is_some_and(|c| c.is_ascii_digit())));
            if !valid {
                pos += len;
                continue;
            }
            let range = cache.span(space.index(pos), close);
            nodes.push(InlineNode::new(kind, range));
            claimed.push(pos..last + 1);
            pos = last + 1;
        }
        ParsingResult {
            nodes,
            further: vec![space.without(&claimed)],
        }
    }
}
