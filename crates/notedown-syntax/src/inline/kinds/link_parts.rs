//! Link syntax shared by the image, inline link and reference link parsers.
//!
//! A link starts at `[` and its text runs to the matching `]`, counting
//! nested brackets. What follows decides the form:
//!
//! | Form      | Source              | Node                   |
//! |-----------|---------------------|------------------------|
//! | Inline    | `[text](dest "t")`  | `INLINE_LINK`          |
//! | Full      | `[text][label]`     | `FULL_REFERENCE_LINK`  |
//! | Collapsed | `[label][]`         | `SHORT_REFERENCE_LINK` |
//! | Shortcut  | `[label]`           | `SHORT_REFERENCE_LINK` |
//!
//! The destination and title are scanned on the logical text with the same
//! scanners as link reference definitions.

use std::ops::Range;

use crate::blocks::kinds::link_definition::{scan_destination, scan_label, scan_title, skip_spnl};
use crate::inline::{InlineContext, InlineNode, ParsingSpace, TokensCache};
use crate::syntax_kind::SyntaxKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkForm {
    Inline,
    Full,
    Collapsed,
    Shortcut,
}

/// A recognised link. Positions are positions in the parsing space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkMatch {
    pub form: LinkForm,
    /// The `[` opening the text.
    pub open: usize,
    /// The `]` closing the text.
    pub close: usize,
    /// Last token of the link.
    pub last: usize,
    pub destination: Option<Range<usize>>,
    pub title: Option<Range<usize>>,
    /// Bracket positions of the label of a full reference.
    pub label: Option<(usize, usize)>,
}

impl LinkMatch {
    /// The link node followed by its parts.
    pub fn nodes(&self, cache: &TokensCache<'_>, space: &ParsingSpace) -> Vec<InlineNode> {
        let range = cache.span(space.index(self.open), space.index(self.last));
        let text = cache.span(space.index(self.open), space.index(self.close));
        match self.form {
            LinkForm::Inline => {
                let mut nodes = vec![
                    InlineNode::new(SyntaxKind::INLINE_LINK, range),
                    InlineNode::new(SyntaxKind::LINK_TEXT, text),
                ];
                if let Some(destination) = self.destination.clone().filter(|d| !d.is_empty()) {
                    nodes.push(InlineNode::new(SyntaxKind::LINK_DESTINATION, destination));
                }
                if let Some(title) = self.title.clone() {
                    nodes.push(InlineNode::new(SyntaxKind::LINK_TITLE, title));
                }
                nodes
            }
            LinkForm::Full => {
                let mut nodes = vec![
                    InlineNode::new(SyntaxKind::FULL_REFERENCE_LINK, range),
                    InlineNode::new(SyntaxKind::LINK_TEXT, text),
                ];
                if let Some((open, close)) = self.label {
                    let label = cache.span(space.index(open), space.index(close));
                    nodes.push(InlineNode::new(SyntaxKind::LINK_LABEL, label));
                }
                nodes
            }
            LinkForm::Collapsed | LinkForm::Shortcut => vec![
                InlineNode::new(SyntaxKind::SHORT_REFERENCE_LINK, range),
                InlineNode::new(SyntaxKind::LINK_LABEL, text),
            ],
        }
    }

    /// The link text without its brackets, parsed on its own.
    pub fn text_space(&self, space: &ParsingSpace) -> ParsingSpace {
        space.slice(self.open + 1..self.close)
    }
}

/// The `]` matching each `[` of a parsing space, found in a single pass.
#[derive(Debug)]
pub struct Brackets {
    closing: Vec<Option<usize>>,
}

impl Brackets {
    pub fn new(cache: &TokensCache<'_>, space: &ParsingSpace) -> Self {
        let mut closing = vec![None; space.len()];
        let mut open = Vec::new();
        for pos in 0..space.len() {
            match cache.kind(space.index(pos)) {
                SyntaxKind::LBRACKET => open.push(pos),
                SyntaxKind::RBRACKET => {
                    if let Some(start) = open.pop() {
                        closing[start] = Some(pos);
                    }
                }
                _ => {}
            }
        }
        Self { closing }
    }

    /// Position of the `]` matching the `[` at `open`.
    pub fn matching(&self, open: usize) -> Option<usize> {
        self.closing.get(open).copied().flatten()
    }
}

/// Source range of a logical range starting at `base`.
fn source_range(cache: &TokensCache<'_>, base: usize, range: Range<usize>) -> Option<Range<usize>> {
    let first = cache.token_starting_at(base + range.start)?;
    let last = cache.token_ending_at(base + range.end)?;
    Some(cache.span(first, last))
}

/// A part must not cut through a construct claimed earlier.
fn cuts_through(part: &Range<usize>, hole: &Range<usize>) -> bool {
    let overlaps = part.start < hole.end && hole.start < part.end;
    let contains = part.start <= hole.start && hole.end <= part.end;
    overlaps && !contains
}

struct InlineTail {
    last: usize,
    destination: Option<Range<usize>>,
    title: Option<Range<usize>>,
}

/// `(dest "title")` right after the `]` at `close`.
fn inline_tail(cache: &TokensCache<'_>, space: &ParsingSpace, close: usize) -> Option<InlineTail> {
    let paren = close + 1;
    if !space.is_contiguous(close) || cache.kind(space.index(paren)) != SyntaxKind::LPAREN {
        return None;
    }
    let paren_index = space.index(paren);
    let base = cache.logical_start(paren_index);
    let bytes = cache.logical_from(paren_index).as_bytes();

    let mut i = skip_spnl(bytes, 1);
    let mut destination = None;
    let mut title = None;
    if bytes.get(i) != Some(&b')') {
        let end = scan_destination(bytes, i)?;
        destination = Some(i..end);
        i = skip_spnl(bytes, end);
        if i > end
            && let Some(title_end) = scan_title(bytes, i)
        {
            title = Some(i..title_end);
            i = skip_spnl(bytes, title_end);
        }
    }
    if bytes.get(i) != Some(&b')') {
        return None;
    }
    let last = space.position_of(cache.token_starting_at(base + i)?)?;

    let destination = match destination {
        Some(range) if !range.is_empty() => Some(source_range(cache, base, range)?),
        _ => None,
    };
    let title = match title {
        Some(range) => Some(source_range(cache, base, range)?),
        None => None,
    };
    for pos in paren..last {
        if let Some(hole) = space.hole_after(pos) {
            let hole = cache.span(hole.start, hole.end - 1);
            if [&destination, &title]
                .into_iter()
                .flatten()
                .any(|part| cuts_through(part, &hole))
            {
                return None;
            }
        }
    }
    Some(InlineTail {
        last,
        destination,
        title,
    })
}

/// The label of `[...]` spanning positions `open..=close`, if it is a valid
/// link label.
fn label_text<'c>(
    cache: &'c TokensCache<'_>,
    space: &ParsingSpace,
    open: usize,
    close: usize,
) -> Option<&'c str> {
    let (first, last) = (space.index(open), space.index(close));
    let text = cache.logical_text(first, last);
    let end = scan_label(text.as_bytes(), 0)?;
    (end == text.len()).then(|| &text[1..text.len() - 1])
}

/// Recognises a link whose text starts at `open`.
pub fn try_link(
    cache: &TokensCache<'_>,
    ctx: &InlineContext<'_>,
    space: &ParsingSpace,
    brackets: &Brackets,
    open: usize,
) -> Option<LinkMatch> {
    let close = brackets.matching(open)?;
    let found = |form, last| LinkMatch {
        form,
        open,
        close,
        last,
        destination: None,
        title: None,
        label: None,
    };

    if let Some(tail) = inline_tail(cache, space, close) {
        return Some(LinkMatch {
            destination: tail.destination,
            title: tail.title,
            ..found(LinkForm::Inline, tail.last)
        });
    }

    let next = close + 1;
    if space.is_contiguous(close) && cache.kind(space.index(next)) == SyntaxKind::LBRACKET {
        let next_index = space.index(next);
        let rest = cache.logical_from(next_index);
        if rest.starts_with("[]") {
            let empty_close = next + 1;
            if !space.is_contiguous(next) {
                return None;
            }
            let label = label_text(cache, space, open, close)?;
            return ctx
                .link_map
                .contains(label)
                .then(|| found(LinkForm::Collapsed, empty_close));
        }
        if let Some(end) = scan_label(rest.as_bytes(), 0) {
            let base = cache.logical_start(next_index);
            let label_close = space.position_of(cache.token_starting_at(base + end - 1)?)?;
            let label = &rest[1..end - 1];
            return ctx.link_map.contains(label).then(|| LinkMatch {
                label: Some((next, label_close)),
                ..found(LinkForm::Full, label_close)
            });
        }
    }

    let label = label_text(cache, space, open, close)?;
    ctx.link_map
        .contains(label)
        .then(|| found(LinkForm::Shortcut, close))
}

/// Any link inside the text `open..close`. Links do not nest.
pub fn contains_link(
    cache: &TokensCache<'_>,
    ctx: &InlineContext<'_>,
    space: &ParsingSpace,
    brackets: &Brackets,
    open: usize,
    close: usize,
) -> bool {
    (open + 1..close).any(|pos| {
        try_link(cache, ctx, space, brackets, pos).is_some_and(|inner| inner.last < close)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inline::test_support::cache;
    use crate::link_map::{LinkInfo, LinkMap};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn map() -> LinkMap {
        let mut map = LinkMap::new();
        map.insert(
            "foo",
            LinkInfo {
                destination: "/foo".to_string(),
                title: None,
            },
        );
        map
    }

    fn link(text: &str) -> Option<(LinkForm, String, Option<String>, Option<String>)> {
        let cache = cache(text);
        let map = map();
        let ctx = InlineContext { link_map: &map };
        let space = ParsingSpace::full(cache.len());
        let brackets = Brackets::new(&cache, &space);
        let found = try_link(&cache, &ctx, &space, &brackets, 0)?;
        let whole = cache.span(space.index(found.open), space.index(found.last));
        Some((
            found.form,
            text[whole].to_string(),
            found.destination.map(|d| text[d].to_string()),
            found.title.map(|t| text[t].to_string()),
        ))
    }

    #[test]
    fn inline_with_title() {
        assert_eq!(
            link(r#"[a](/uri "title") x"#),
            Some((
                LinkForm::Inline,
                r#"[a](/uri "title")"#.to_string(),
                Some("/uri".to_string()),
                Some(r#""title""#.to_string())
            ))
        );
    }

    #[test]
    fn pointy_destination_with_spaces() {
        let (_, _, destination, _) = link("[a](<my uri>)").expect("link");
        assert_eq!(destination.as_deref(), Some("<my uri>"));
    }

    #[test]
    fn nested_brackets_in_text() {
        let (form, whole, _, _) = link("[a [b] c](/u)").expect("link");
        assert_eq!(form, LinkForm::Inline);
        assert_eq!(whole, "[a [b] c](/u)");
    }

    #[test]
    fn empty_destination() {
        let (form, _, destination, _) = link("[a]()").expect("link");
        assert_eq!(form, LinkForm::Inline);
        assert_eq!(destination, None);
    }

    #[rstest]
    #[case("[foo]", LinkForm::Shortcut, "[foo]")]
    #[case("[Foo][]", LinkForm::Collapsed, "[Foo][]")]
    #[case("[text][FOO]", LinkForm::Full, "[text][FOO]")]
    #[case("[foo] (x y)", LinkForm::Shortcut, "[foo]")]
    fn references(#[case] text: &str, #[case] form: LinkForm, #[case] whole: &str) {
        let (got_form, got_whole, _, _) = link(text).expect("link");
        assert_eq!((got_form, got_whole.as_str()), (form, whole));
    }

    #[rstest]
    #[case("[bar]")]
    #[case("[foo][bar]")]
    #[case("[a](/u b)")]
    #[case("[a](<b\nc>)")]
    #[case("[a](<b>c)")]
    #[case("[a")]
    #[case("[a](/u\n\n)")]
    fn not_links(#[case] text: &str) {
        assert_eq!(link(text), None);
    }

    #[test]
    fn brackets_pair_innermost_first() {
        let cache = cache("[a [b] ]] [c");
        let space = ParsingSpace::full(cache.len());
        let brackets = Brackets::new(&cache, &space);
        let offset = |pos: usize| cache.span(space.index(pos), space.index(pos)).start;
        let pairs: Vec<_> = (0..space.len())
            .filter_map(|pos| Some((offset(pos), offset(brackets.matching(pos)?))))
            .collect();
        assert_eq!(pairs, vec![(0, 7), (3, 5)]);
    }
}
