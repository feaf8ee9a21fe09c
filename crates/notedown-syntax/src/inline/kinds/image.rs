//! Images: `!` followed by any link form. The link text is the alt text and
//! may itself contain links and images.

use crate::inline::kinds::link_parts::{Brackets, try_link};
use crate::inline::{
    InlineContext, InlineNode, ParsingResult, ParsingSpace, SequentialParser, TokensCache,
};
use crate::syntax_kind::SyntaxKind;

pub struct Image;

impl SequentialParser for Image {
    fn name(&self) -> &'static str {
        "image"
    }

    fn parse(
        &self,
        cache: &TokensCache<'_>,
        ctx: &InlineContext<'_>,
        space: &ParsingSpace,
    ) -> ParsingResult {
        let mut nodes = Vec::new();
        let mut further = Vec::new();
        let mut pending = vec![space.clone()];
        while let Some(space) = pending.pop() {
            let brackets = Brackets::new(cache, &space);
            let mut claimed = Vec::new();
            let mut pos = 0;
            while pos < space.len() {
                if cache.kind(space.index(pos)) == SyntaxKind::EXCLAMATION_MARK
                    && space.is_contiguous(pos)
                    && let Some(link) = try_link(cache, ctx, &space, &brackets, pos + 1)
                {
                    let range = cache.span(space.index(pos), space.index(link.last));
                    nodes.push(InlineNode::new(SyntaxKind::IMAGE, range));
                    nodes.extend(link.nodes(cache, &space));
                    pending.push(link.text_space(&space));
                    claimed.push(pos..link.last + 1);
                    pos = link.last + 1;
                    continue;
                }
                pos += 1;
            }
            further.push(space.without(&claimed));
        }
        ParsingResult { nodes, further }
    }
}
