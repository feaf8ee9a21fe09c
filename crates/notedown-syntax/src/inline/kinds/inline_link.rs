//! Inline links: `[text](destination "title")`.

use crate::inline::kinds::link_parts::{Brackets, LinkForm, contains_link, try_link};
use crate::inline::{
    InlineContext, ParsingResult, ParsingSpace, SequentialParser, TokensCache,
};
use crate::syntax_kind::SyntaxKind;

pub struct InlineLink;

impl SequentialParser for InlineLink {
    fn name(&self) -> &'static str {
        "inline_link"
    }

    fn parse(
        &self,
        cache: &TokensCache<'_>,
        ctx: &InlineContext<'_>,
        space: &ParsingSpace,
    ) -> ParsingResult {
        let brackets = Brackets::new(cache, space);
        let mut nodes = Vec::new();
        let mut further = Vec::new();
        let mut claimed = Vec::new();
        let mut openers = Vec::new();
        let mut pos = 0;
        while pos < space.len() {
            if let Some(link) = try_link(cache, ctx, space, &brackets, pos)
                && link.form == LinkForm::Inline
                && !contains_link(cache, ctx, space, &brackets, link.open, link.close)
            {
                nodes.extend(link.nodes(cache, space));
                further.push(link.text_space(space));
                openers.push(link.open);
                claimed.push(pos..link.last + 1);
                pos = link.last + 1;
                continue;
            }
            pos += 1;
        }

        // a `[` around a link can no longer open one
        let links = claimed.len();
        for pos in 0..space.len() {
            if cache.kind(space.index(pos)) != SyntaxKind::LBRACKET {
                continue;
            }
            let inside = claimed[..links].partition_point(|claim| claim.end <= pos);
            if claimed[..links].get(inside).is_some_and(|claim| claim.contains(&pos)) {
                continue;
            }
            let close = brackets.matching(pos).unwrap_or(space.len());
            let next_link = openers.partition_point(|&open| open <= pos);
            if openers.get(next_link).is_some_and(|&open| open < close) {
                claimed.push(pos..pos + 1);
            }
        }
        claimed.sort_by_key(|claim| claim.start);

        further.push(space.without(&claimed));
        ParsingResult { nodes, further }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inline::test_support::run_one;
    use crate::link_map::LinkMap;
    use pretty_assertions::assert_eq;
    use SyntaxKind::*;

    fn links(text: &str) -> Vec<(SyntaxKind, &str)> {
        run_one(&InlineLink, text, &LinkMap::new())
    }

    #[test]
    fn link_parts() {
        assert_eq!(
            links("a [b](c 'd') e"),
            vec![
                (INLINE_LINK, "[b](c 'd')"),
                (LINK_TEXT, "[b]"),
                (LINK_DESTINATION, "c"),
                (LINK_TITLE, "'d'"),
            ]
        );
    }

    #[test]
    fn inner_link_wins() {
        assert_eq!(
            links("[a [b](c) d](e)"),
            vec![
                (INLINE_LINK, "[b](c)"),
                (LINK_TEXT, "[b]"),
                (LINK_DESTINATION, "c"),
            ]
        );
    }

    #[test]
    fn destination_with_balanced_parens() {
        assert_eq!(
            links("[a](foo(and(bar)))"),
            vec![
                (INLINE_LINK, "[a](foo(and(bar)))"),
                (LINK_TEXT, "[a]"),
                (LINK_DESTINATION, "foo(and(bar))"),
            ]
        );
    }

    #[test]
    fn title_on_next_line() {
        assert_eq!(
            links("[a](/u\n\"t\")"),
            vec![
                (INLINE_LINK, "[a](/u\n\"t\")"),
                (LINK_TEXT, "[a]"),
                (LINK_DESTINATION, "/u"),
                (LINK_TITLE, "\"t\""),
            ]
        );
    }

    #[test]
    fn brackets_around_a_link_stay_text() {
        assert_eq!(
            links("[[a](b)](c)"),
            vec![
                (INLINE_LINK, "[a](b)"),
                (LINK_TEXT, "[a]"),
                (LINK_DESTINATION, "b"),
            ]
        );
    }

    #[test]
    fn unclosed_brackets_in_bulk() {
        let text = "[a".repeat(20_000) + "[b](c)";
        assert_eq!(
            links(&text),
            vec![
                (INLINE_LINK, "[b](c)"),
                (LINK_TEXT, "[b]"),
                (LINK_DESTINATION, "c"),
            ]
        );
    }

    #[test]
    fn space_before_paren_is_not_a_link() {
        assert_eq!(links("[a] (b)"), vec![]);
    }
}
