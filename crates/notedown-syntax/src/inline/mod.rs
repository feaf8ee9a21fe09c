//! # Inline Parsing
//!
//! The second parsing phase. Each inline-holding block (paragraph, heading
//! text, table cell) is lexed into tokens, and a fixed sequence of parsers
//! runs over them. Each parser claims the constructs it recognises and hands
//! the remaining tokens on.
//!
//! ## Parsing spaces
//!
//! A [`ParsingSpace`] is the list of token indices a parser may look at.
//! Tokens claimed by an earlier parser are removed, leaving *holes*: a code
//! span is opaque to the link parser, a link is opaque to the emphasis
//! parser. Link text is handed on as a space of its own, so emphasis can
//! never match across a link boundary.
//!
//! ## Modules
//!
//! - **`kinds`**: one [`SequentialParser`] per construct (autolinks, code
//!   spans, math, images, inline and reference links)
//! - **`delimiter`**: the emphasis-style delimiter run algorithm
//!
//! ## Precedence
//!
//! Parsers run in flavour order, by default autolink, code span, math,
//! image, inline link, reference link and finally delimiters. A construct
//! claimed earlier wins over everything later: `` `<http://a>` `` is a code
//! span, `<a title="*">*` has no emphasis.

pub mod delimiter;
pub mod kinds;

use std::ops::Range;

use log::trace;

use crate::error::{CancellationToken, ParseError};
use crate::lexer::Token;
use crate::link_map::LinkMap;
use crate::syntax_kind::SyntaxKind;

/// A recognised inline construct over an absolute byte range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineNode {
    pub kind: SyntaxKind,
    pub range: Range<usize>,
}

impl InlineNode {
    pub fn new(kind: SyntaxKind, range: Range<usize>) -> Self {
        Self { kind, range }
    }
}

/// Read-only data shared by all inline parsers of one document.
#[derive(Debug, Clone, Copy)]
pub struct InlineContext<'a> {
    pub link_map: &'a LinkMap,
}

/// The token stream of one inline range, with foreign tokens filtered out.
///
/// Parsers address tokens by their index among the non-foreign tokens. The
/// cache also keeps the *logical text*: the token texts joined without
/// container prefixes, which is what multi-line constructs are matched
/// against.
#[derive(Debug)]
pub struct TokensCache<'a> {
    pub text: &'a str,
    tokens: Vec<Token>,
    filtered: Vec<usize>,
    logical: String,
    /// Logical offset of each filtered token, plus the logical length.
    logical_starts: Vec<usize>,
}

impl<'a> TokensCache<'a> {
    pub fn new(text: &'a str, tokens: Vec<Token>) -> Self {
        let filtered: Vec<usize> = tokens
            .iter()
            .enumerate()
            .filter(|(_, token)| !token.foreign)
            .map(|(index, _)| index)
            .collect();
        let mut logical = String::new();
        let mut logical_starts = Vec::with_capacity(filtered.len() + 1);
        for &index in &filtered {
            logical_starts.push(logical.len());
            logical.push_str(&text[tokens[index].range.clone()]);
        }
        logical_starts.push(logical.len());
        Self {
            text,
            tokens,
            filtered,
            logical,
            logical_starts,
        }
    }

    /// All tokens, foreign ones included, in source order.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    /// Number of non-foreign tokens.
    pub fn len(&self) -> usize {
        self.filtered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filtered.is_empty()
    }

    fn token(&self, index: usize) -> &Token {
        &self.tokens[self.filtered[index]]
    }

    pub fn kind(&self, index: usize) -> SyntaxKind {
        self.token(index).kind
    }

    pub fn range(&self, index: usize) -> Range<usize> {
        self.token(index).range.clone()
    }

    pub fn token_text(&self, index: usize) -> &'a str {
        &self.text[self.range(index)]
    }

    /// Source range from the start of token `first` to the end of `last`.
    pub fn span(&self, first: usize, last: usize) -> Range<usize> {
        self.range(first).start..self.range(last).end
    }

    /// Last character of the token before `index`, if any.
    pub fn char_before(&self, index: usize) -> Option<char> {
        index
            .checked_sub(1)
            .and_then(|prev| self.token_text(prev).chars().next_back())
    }

    /// First character of the token after `index`, if any.
    pub fn char_after(&self, index: usize) -> Option<char> {
        (index + 1 < self.len())
            .then(|| self.token_text(index + 1).chars().next())
            .flatten()
    }

    /// Logical text from the start of token `index` to the end of the range.
    pub fn logical_from(&self, index: usize) -> &str {
        &self.logical[self.logical_starts[index]..]
    }

    /// Logical text of tokens `first..=last`.
    pub fn logical_text(&self, first: usize, last: usize) -> &str {
        &self.logical[self.logical_starts[first]..self.logical_starts[last + 1]]
    }

    pub fn logical_start(&self, index: usize) -> usize {
        self.logical_starts[index]
    }

    /// The token that starts at logical offset `offset`.
    pub fn token_starting_at(&self, offset: usize) -> Option<usize> {
        self.logical_starts[..self.len()].binary_search(&offset).ok()
    }

    /// The token that ends at logical offset `offset`.
    pub fn token_ending_at(&self, offset: usize) -> Option<usize> {
        let next = self.logical_starts.binary_search(&offset).ok()?;
        next.checked_sub(1)
    }
}

/// Token indices (into a [`TokensCache`]) a parser may look at, ascending.
///
/// Parsers walk a space by *position*; `index(pos)` gives the token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsingSpace {
    indices: Vec<usize>,
}

impl ParsingSpace {
    pub fn new(indices: Vec<usize>) -> Self {
        Self { indices }
    }

    /// Every token of the cache.
    pub fn full(len: usize) -> Self {
        Self::new((0..len).collect())
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn index(&self, pos: usize) -> usize {
        self.indices[pos]
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Position of token `index`, if it is part of the space.
    pub fn position_of(&self, index: usize) -> Option<usize> {
        self.indices.binary_search(&index).ok()
    }

    /// No claimed tokens between `pos` and the next position.
    pub fn is_contiguous(&self, pos: usize) -> bool {
        pos + 1 < self.len() && self.indices[pos] + 1 == self.indices[pos + 1]
    }

    /// Claimed tokens between `pos` and the next position.
    pub fn hole_after(&self, pos: usize) -> Option<Range<usize>> {
        (pos + 1 < self.len() && !self.is_contiguous(pos))
            .then(|| self.indices[pos] + 1..self.indices[pos + 1])
    }

    /// Positions `range` as a space of their own.
    pub fn slice(&self, range: Range<usize>) -> Self {
        Self::new(self.indices[range].to_vec())
    }

    /// The space with the positions in `claimed` (sorted) removed.
    pub fn without(&self, claimed: &[Range<usize>]) -> Self {
        let mut indices = Vec::with_capacity(self.len());
        let mut claims = claimed.iter().peekable();
        for (pos, &index) in self.indices.iter().enumerate() {
            while claims.peek().is_some_and(|claim| claim.end <= pos) {
                claims.next();
            }
            if !claims.peek().is_some_and(|claim| claim.contains(&pos)) {
                indices.push(index);
            }
        }
        Self::new(indices)
    }
}

/// Output of one parser over one space.
#[derive(Debug, Default)]
pub struct ParsingResult {
    pub nodes: Vec<InlineNode>,
    /// Spaces the following parsers should process.
    pub further: Vec<ParsingSpace>,
}

impl ParsingResult {
    /// Nothing recognised; the space goes on unchanged.
    pub fn unchanged(space: &ParsingSpace) -> Self {
        Self {
            nodes: Vec::new(),
            further: vec![space.clone()],
        }
    }
}

/// One step of the inline pipeline.
pub trait SequentialParser: Send + Sync {
    fn name(&self) -> &'static str;

    fn parse(
        &self,
        cache: &TokensCache<'_>,
        ctx: &InlineContext<'_>,
        space: &ParsingSpace,
    ) -> ParsingResult;
}

/// Runs a parser sequence over one inline range.
pub struct SequentialParserManager<'p> {
    parsers: &'p [Box<dyn SequentialParser>],
}

impl<'p> SequentialParserManager<'p> {
    pub fn new(parsers: &'p [Box<dyn SequentialParser>]) -> Self {
        Self { parsers }
    }

    /// All nodes found, sorted outermost first.
    pub fn run(
        &self,
        cache: &TokensCache<'_>,
        ctx: &InlineContext<'_>,
        cancel: &CancellationToken,
    ) -> Result<Vec<InlineNode>, ParseError> {
        let mut nodes = Vec::new();
        let mut spaces = vec![ParsingSpace::full(cache.len())];
        for parser in self.parsers {
            cancel.check()?;
            let mut next = Vec::new();
            for space in &spaces {
                let result = parser.parse(cache, ctx, space);
                if !result.nodes.is_empty() {
                    trace!("{} found {} nodes", parser.name(), result.nodes.len());
                }
                nodes.extend(result.nodes);
                next.extend(result.further.into_iter().filter(|s| !s.is_empty()));
            }
            spaces = next;
        }
        sort_nodes(&mut nodes);
        Ok(nodes)
    }
}

/// Containers before their parts when ranges are equal.
fn nesting_rank(kind: SyntaxKind) -> u8 {
    match kind {
        SyntaxKind::IMAGE
        | SyntaxKind::INLINE_LINK
        | SyntaxKind::FULL_REFERENCE_LINK
        | SyntaxKind::SHORT_REFERENCE_LINK => 0,
        SyntaxKind::LINK_TEXT
        | SyntaxKind::LINK_LABEL
        | SyntaxKind::LINK_DESTINATION
        | SyntaxKind::LINK_TITLE => 1,
        _ => 2,
    }
}

/// Start ascending, wider first, containers first.
pub fn sort_nodes(nodes: &mut [InlineNode]) {
    nodes.sort_by_key(|node| {
        (
            node.range.start,
            std::cmp::Reverse(node.range.end),
            nesting_rank(node.kind),
        )
    });
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Token;
    use pretty_assertions::assert_eq;

    fn token(kind: SyntaxKind, range: Range<usize>, foreign: bool) -> Token {
        Token {
            kind,
            range,
            foreign,
        }
    }

    #[test]
    fn cache_hides_foreign_tokens() {
        let text = "a\n> b";
        let cache = TokensCache::new(
            text,
            vec![
                token(SyntaxKind::TEXT, 0..1, false),
                token(SyntaxKind::EOL, 1..2, false),
                token(SyntaxKind::QUOTE_MARKER, 2..3, true),
                token(SyntaxKind::WHITE_SPACE, 3..4, true),
                token(SyntaxKind::TEXT, 4..5, false),
            ],
        );
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.kind(2), SyntaxKind::TEXT);
        assert_eq!(cache.logical_from(0), "a\nb");
        assert_eq!(cache.char_before(2), Some('\n'));
        assert_eq!(cache.token_ending_at(3), Some(2));
        assert_eq!(cache.token_starting_at(2), Some(2));
        assert_eq!(cache.span(0, 2), 0..5);
    }

    #[test]
    fn space_without_leaves_holes() {
        let space = ParsingSpace::full(6);
        let rest = space.without(&[1..3, 4..5]);
        assert_eq!(rest.indices(), &[0, 3, 5]);
        assert!(!rest.is_contiguous(0));
        assert_eq!(rest.hole_after(0), Some(1..3));
        assert_eq!(rest.position_of(5), Some(2));
        assert_eq!(rest.position_of(4), None);
    }

    #[test]
    fn equal_ranges_put_the_link_outside_its_label() {
        let mut nodes = vec![
            InlineNode::new(SyntaxKind::LINK_LABEL, 0..3),
            InlineNode::new(SyntaxKind::SHORT_REFERENCE_LINK, 0..3),
            InlineNode::new(SyntaxKind::EMPHASIS, 1..2),
        ];
        sort_nodes(&mut nodes);
        let kinds: Vec<SyntaxKind> = nodes.iter().map(|n| n.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SyntaxKind::SHORT_REFERENCE_LINK,
                SyntaxKind::LINK_LABEL,
                SyntaxKind::EMPHASIS
            ]
        );
    }
}
