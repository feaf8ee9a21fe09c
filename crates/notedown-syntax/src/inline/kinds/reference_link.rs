//! Reference links resolved against the link map: `[text][label]`,
//! `[label][]` and `[label]`. Undefined labels stay literal.

use crate::inline::kinds::link_parts::{Brackets, LinkForm, contains_link, try_link};
use crate::inline::{
    InlineContext, ParsingResult, ParsingSpace, SequentialParser, TokensCache,
};

pub struct ReferenceLink;

impl SequentialParser for ReferenceLink {
    fn name(&self) -> &'static str {
        "reference_link"
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
        let mut pos = 0;
        while pos < space.len() {
            if let Some(link) = try_link(cache, ctx, space, &brackets, pos)
                && link.form != LinkForm::Inline
                && !contains_link(cache, ctx, space, &brackets, link.open, link.close)
            {
                nodes.extend(link.nodes(cache, space));
                further.push(link.text_space(space));
                claimed.push(pos..link.last + 1);
                pos = link.last + 1;
                continue;
            }
            pos += 1;
        }
        further.push(space.without(&claimed));
        ParsingResult { nodes, further }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inline::test_support::run_one;
    use crate::link_map::{LinkInfo, LinkMap};
    use crate::syntax_kind::SyntaxKind::{self, *};
    use pretty_assertions::assert_eq;

    fn map(labels: &[&str]) -> LinkMap {
        let mut map = LinkMap::new();
        for label in labels {
            map.insert(
                label,
                LinkInfo {
                    destination: format!("/{label}"),
                    title: None,
                },
            );
        }
        map
    }

    fn links<'t>(text: &'t str, labels: &[&str]) -> Vec<(SyntaxKind, &'t str)> {
        run_one(&ReferenceLink, text, &map(labels))
    }

    #[test]
    fn full_reference() {
        assert_eq!(
            links("[text][ref]", &["ref"]),
            vec![
                (FULL_REFERENCE_LINK, "[text][ref]"),
                (LINK_TEXT, "[text]"),
                (LINK_LABEL, "[ref]"),
            ]
        );
    }

    #[test]
    fn shortcut_reference() {
        assert_eq!(
            links("see [Ref].", &["ref"]),
            vec![(SHORT_REFERENCE_LINK, "[Ref]"), (LINK_LABEL, "[Ref]")]
        );
    }

    #[test]
    fn label_followed_by_label_is_not_a_shortcut() {
        assert_eq!(
            links("[foo][bar][baz]", &["baz", "foo"]),
            vec![
                (FULL_REFERENCE_LINK, "[bar][baz]"),
                (LINK_TEXT, "[bar]"),
                (LINK_LABEL, "[baz]"),
            ]
        );
    }

    #[test]
    fn undefined_label_is_literal() {
        assert_eq!(links("[nope]", &["ref"]), vec![]);
    }

    #[test]
    fn inner_reference_wins() {
        assert_eq!(
            links("[a [b] c][d]", &["b", "d"]),
            vec![
                (SHORT_REFERENCE_LINK, "[b]"),
                (LINK_LABEL, "[b]"),
                (SHORT_REFERENCE_LINK, "[d]"),
                (LINK_LABEL, "[d]"),
            ]
        );
    }
}
