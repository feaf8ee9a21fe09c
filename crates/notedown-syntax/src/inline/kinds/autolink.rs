//! Autolinks and raw inline HTML.
//!
//! Both start with `<` and are matched by regex against the logical text, so
//! a tag may continue on the next line of a block quote. Backtick runs that
//! open a code span are skipped: `` `<a>` `` is code, not HTML.

use crate::html::{autolink_len, raw_html_len};
use crate::inline::kinds::code_span::find_closer;
use crate::inline::{
    InlineContext, InlineNode, ParsingResult, ParsingSpace, SequentialParser, TokensCache,
};
use crate::syntax_kind::SyntaxKind;

pub struct Autolink;

/// Position of the token ending `len` logical bytes after the start of the
/// token at `pos`.
fn end_position(cache: &TokensCache<'_>, space: &ParsingSpace, pos: usize, len: usize) -> Option<usize> {
    let end = cache.logical_start(space.index(pos)) + len;
    let last = cache.token_ending_at(end)?;
    space.position_of(last)
}

impl SequentialParser for Autolink {
    fn name(&self) -> &'static str {
        "autolink"
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
            let index = space.index(pos);
            match cache.kind(index) {
                SyntaxKind::BACKTICK => {
                    if let Some(last) = find_closer(cache, space, pos) {
                        pos = last + 1;
                        continue;
                    }
                }
                SyntaxKind::LT => {
                    let rest = cache.logical_from(index);
                    let found = match autolink_len(rest) {
                        Some((_, len)) => Some((SyntaxKind::AUTOLINK, len)),
                        None => raw_html_len(rest).map(|len| (SyntaxKind::HTML_TAG, len)),
                    };
                    if let Some((kind, len)) = found
                        && let Some(last) = end_position(cache, space, pos, len)
                    {
                        let range = cache.span(index, space.index(last));
                        nodes.push(InlineNode::new(kind, range));
                        claimed.push(pos..last + 1);
                        pos = last + 1;
                        continue;
                    }
                }
                SyntaxKind::GFM_AUTOLINK => {
                    nodes.push(InlineNode::new(SyntaxKind::AUTOLINK, cache.range(index)));
                    claimed.push(pos..pos + 1);
                }
                _ => {}
            }
            pos += 1;
        }
        ParsingResult {
            nodes,
            further: vec![space.without(&claimed)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inline::test_support::run_one;
    use crate::link_map::LinkMap;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn found(text: &str) -> Vec<(SyntaxKind, &str)> {
        run_one(&Autolink, text, &LinkMap::new())
    }

    #[rstest]
    #[case("<http://foo.bar.baz>", SyntaxKind::AUTOLINK)]
    #[case("<foo@bar.example.com>", SyntaxKind::AUTOLINK)]
    #[case("<a href=\"x\">", SyntaxKind::HTML_TAG)]
    #[case("</em>", SyntaxKind::HTML_TAG)]
    #[case("<!-- note -->", SyntaxKind::HTML_TAG)]
    fn whole_input(#[case] text: &str, #[case] kind: SyntaxKind) {
        assert_eq!(found(text), vec![(kind, text)]);
    }

    #[test]
    fn code_spans_take_precedence() {
        assert_eq!(found("`<a>` <b>"), vec![(SyntaxKind::HTML_TAG, "<b>")]);
    }

    #[test]
    fn tag_spans_lines() {
        assert_eq!(
            found("x <a\nhref='y'> z"),
            vec![(SyntaxKind::HTML_TAG, "<a\nhref='y'>")]
        );
    }

    #[test]
    fn gfm_autolink_token_becomes_a_node() {
        assert_eq!(
            found("see www.example.com"),
            vec![(SyntaxKind::AUTOLINK, "www.example.com")]
        );
    }

    #[rstest]
    #[case("<http://foo.bar/baz bim>")]
    #[case("< a>")]
    #[case("a < b")]
    fn not_autolinks(#[case] text: &str) {
        assert_eq!(found(text), vec![]);
    }
}
