//! # notedown-syntax
//!
//! A lossless CommonMark / GitHub-flavoured Markdown syntax tree using
//! [Rowan] + [Logos].
//!
//! [Rowan]: https://docs.rs/rowan
//! [Logos]: https://docs.rs/logos
//!
//! ## Architecture Overview
//!
//! Markdown block structure cannot be parsed with a grammar over a token
//! stream: whether a line continues a list item depends on its indentation
//! relative to every open container. So parsing runs in two phases, joined
//! by a flat list of *productions* (kinds over byte ranges):
//!
//! ```text
//! Source Text → Block Engine → Productions → Tree Builder → Rowan Tree
//!               (Constraints,                 (GreenNodeBuilder)
//!                Providers)                        │
//!                                                  ▼ per inline range
//!                                   Lexer → Inline Parsers → Inline Nodes
//!                                  (Logos)   (Sequential)
//! ```
//!
//! ### 1. Block engine ([`blocks`] module)
//!
//! Reads the text line by line. The [`constraints`] of the open containers
//! decide how much of each line belongs to them; the flavour's block
//! providers recognise new blocks in priority order. Link reference
//! definitions are collected into a [`link_map::LinkMap`].
//!
//! ### 2. Tree builder ([`tree`] module)
//!
//! Nests the sorted productions into a green tree and fills every byte no
//! production covers with whitespace, line ending or text leaves.
//!
//! ### 3. Inline parsing ([`lexer`] and [`inline`] modules)
//!
//! Paragraphs, heading text and table cells are lexed, then a fixed
//! sequence of parsers claims code spans, links, emphasis and the rest.
//!
//! ## Quick Start
//!
//! ```
//! use notedown_syntax::{parse, SyntaxKind};
//!
//! let tree = parse("# Hello\n");
//!
//! // The tree preserves all text
//! assert_eq!(tree.text().to_string(), "# Hello\n");
//!
//! assert_eq!(tree.kind(), SyntaxKind::DOCUMENT);
//! let heading = tree.children().next().unwrap();
//! assert_eq!(heading.kind(), SyntaxKind::ATX_1);
//! ```
//!
//! For a specific flavour, strict error reporting or cancellation use
//! [`MarkdownParser`].

pub mod ast;
pub mod blocks;
pub mod constraints;
pub mod error;
pub mod flavour;
pub mod html;
pub mod inline;
pub mod lexer;
pub mod link_map;
pub mod scanner;
pub mod syntax_kind;
pub mod tree;

use std::ops::Range;
use std::sync::{Arc, OnceLock};

use log::debug;
use rowan::GreenNodeBuilder;

use crate::blocks::BlockEngine;
use crate::blocks::production::Production;
use crate::inline::{InlineContext, SequentialParserManager, TokensCache};
use crate::lexer::lex;
use crate::tree::{InlineExpander, InlineExpansion, TreeBuilder};

pub use error::{CancellationToken, ParseError};
pub use flavour::{Flavour, FlavourKind};
pub use link_map::{LinkInfo, LinkMap};
pub use syntax_kind::{MarkdownLang, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken};

/// Lexes and inline-parses the ranges the tree builder hands it.
struct InlineRunner<'a> {
    text: &'a str,
    flavour: &'a Flavour,
    link_map: &'a LinkMap,
    cancel: &'a CancellationToken,
}

impl InlineExpander for InlineRunner<'_> {
    fn expand(&self, range: Range<usize>, foreign: &[Production]) -> Result<InlineExpansion, ParseError> {
        self.cancel.check()?;
        let tokens = lex(self.text, range, foreign, self.flavour.lex_options());
        let cache = TokensCache::new(self.text, tokens);
        let ctx = InlineContext {
            link_map: self.link_map,
        };
        let nodes = SequentialParserManager::new(self.flavour.inline_parsers()).run(&cache, &ctx, self.cancel)?;
        Ok(InlineExpansion {
            tokens: cache.into_tokens(),
            nodes,
        })
    }
}

/// Parses Markdown text into a [`SyntaxNode`] tree rooted at `DOCUMENT`.
///
/// With assertions off (the default) a structural failure degrades to a
/// document holding the whole text as one paragraph. With assertions on it
/// is returned as an error. Cancellation is always returned.
#[derive(Debug, Clone)]
pub struct MarkdownParser {
    flavour: Arc<Flavour>,
    assertions: bool,
}

impl MarkdownParser {
    pub fn new(flavour: impl Into<Arc<Flavour>>) -> Self {
        Self {
            flavour: flavour.into(),
            assertions: false,
        }
    }

    pub fn with_assertions(mut self, enabled: bool) -> Self {
        self.assertions = enabled;
        self
    }

    pub fn flavour(&self) -> &Flavour {
        &self.flavour
    }

    pub fn parse(&self, text: &str) -> Result<SyntaxNode, ParseError> {
        self.parse_with_cancellation(text, &CancellationToken::new())
    }

    pub fn parse_with_cancellation(
        &self,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<SyntaxNode, ParseError> {
        debug!("parsing {} bytes as {}", text.len(), self.flavour.name());
        match self.build(text, cancel) {
            Ok(tree) => Ok(tree),
            Err(err) if err.is_cancelled() || self.assertions => Err(err),
            Err(err) => {
                debug!("falling back to a single paragraph: {err}");
                Ok(fallback_tree(text))
            }
        }
    }

    fn build(&self, text: &str, cancel: &CancellationToken) -> Result<SyntaxNode, ParseError> {
        let output = BlockEngine::new(text, self.flavour.block_providers()).run(cancel)?;
        let productions = output.productions.into_sorted();
        debug!(
            "block phase: {} productions, {} link definitions",
            productions.len(),
            output.link_map.len()
        );
        let runner = InlineRunner {
            text,
            flavour: &self.flavour,
            link_map: &output.link_map,
            cancel,
        };
        let tree = TreeBuilder::new(text).build(&productions, &runner, cancel)?;
        debug!("parsed tree of {} nodes", tree.descendants().count());
        Ok(tree)
    }

    /// Inline-parses `text[range]` as the content of a `kind` node. Offsets
    /// in the result are relative to `range.start`. Reference links only
    /// resolve against definitions in the document, so none resolve here.
    pub fn parse_inline(
        &self,
        kind: SyntaxKind,
        text: &str,
        range: Range<usize>,
    ) -> Result<SyntaxNode, ParseError> {
        let source = text
            .get(range.clone())
            .ok_or_else(|| ParseError::structure(range, "range is not inside the text"))?;
        let link_map = LinkMap::new();
        let cancel = CancellationToken::new();
        let runner = InlineRunner {
            text: source,
            flavour: &self.flavour,
            link_map: &link_map,
            cancel: &cancel,
        };
        let expansion = runner.expand(0..source.len(), &[])?;
        TreeBuilder::new(source).build_inline(kind, &expansion)
    }
}

impl Default for MarkdownParser {
    fn default() -> Self {
        Self::new(Flavour::gfm())
    }
}

/// `DOCUMENT > PARAGRAPH > TEXT` over the raw text.
pub(crate) fn fallback_tree(text: &str) -> SyntaxNode {
    let mut builder = GreenNodeBuilder::new();
    builder.start_node(SyntaxKind::DOCUMENT.into());
    if !text.is_empty() {
        builder.start_node(SyntaxKind::PARAGRAPH.into());
        builder.token(SyntaxKind::TEXT.into(), text);
        builder.finish_node();
    }
    builder.finish_node();
    SyntaxNode::new_root(builder.finish())
}

/// Parses GFM text with the default parser.
pub fn parse(text: &str) -> SyntaxNode {
    static PARSER: OnceLock<MarkdownParser> = OnceLock::new();
    PARSER
        .get_or_init(MarkdownParser::default)
        .parse(text)
        .unwrap_or_else(|_| fallback_tree(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inline::{InlineNode, ParsingResult, ParsingSpace, SequentialParser};
    use crate::tree::debug_tree;
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn snapshot_heading() {
        assert_snapshot!(debug_tree(&parse("# Hello\n")), @r##"
        DOCUMENT@0..8
          ATX_1@0..7
            ATX_HEADER@0..1 "#"
            WHITE_SPACE@1..2 " "
            ATX_CONTENT@2..7
              TEXT@2..7 "Hello"
          EOL@7..8 "\n"
        "##);
    }

    #[test]
    fn snapshot_emphasis() {
        assert_snapshot!(debug_tree(&parse("*a* b")), @r#"
        DOCUMENT@0..5
          PARAGRAPH@0..5
            EMPHASIS@0..3
              EMPH@0..1 "*"
              TEXT@1..2 "a"
              EMPH@2..3 "*"
            WHITE_SPACE@3..4 " "
            TEXT@4..5 "b"
        "#);
    }

    #[test]
    fn snapshot_quoted_paragraph() {
        assert_snapshot!(debug_tree(&parse("> a\n> b")), @r#"
        DOCUMENT@0..7
          BLOCK_QUOTE@0..7
            QUOTE_MARKER@0..1 ">"
            WHITE_SPACE@1..2 " "
            PARAGRAPH@2..7
              TEXT@2..3 "a"
              EOL@3..4 "\n"
              QUOTE_MARKER@4..5 ">"
              WHITE_SPACE@5..6 " "
              TEXT@6..7 "b"
        "#);
    }

    #[rstest]
    #[case("Hello, world!\n")]
    #[case("# Heading\n\nText *with* **emphasis** and `code`.\n")]
    #[case("> quote\nlazy\n\n- item\n  continued\n- [x] task\n")]
    #[case("```rust\nfn main() {}\n```\n")]
    #[case("| a | b |\n|---|:-:|\n| 1 | 2 |\n| 3 |\n")]
    #[case("[foo]: /url \"title\"\n\n[foo] and [bar](<a b> 'c')\n")]
    #[case("Some <b>html that's not closed\n\n<div>\nblock\n</div>\n")]
    #[case("Check out [[this page\n\nAnd `unclosed code span\n\n*half done\n")]
    fn roundtrip_preserves_text(#[case] input: &str) {
        for flavour in [Flavour::commonmark(), Flavour::gfm()] {
            let tree = MarkdownParser::new(flavour)
                .with_assertions(true)
                .parse(input)
                .expect("parse");
            assert_eq!(tree.text().to_string(), input);
        }
    }

    #[test]
    fn parsing_is_deterministic() {
        let input = "# T\n\n1. a\n2. *b*\n\n> [x]: /y\n> [x]\n";
        assert_eq!(debug_tree(&parse(input)), debug_tree(&parse(input)));
    }

    #[test]
    fn cancelled_parse_returns_an_error() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = MarkdownParser::default().parse_with_cancellation("a", &cancel);
        assert_eq!(result.map(|_| ()), Err(ParseError::Cancelled));
    }

    /// Emits two inline nodes that cross each other.
    struct Crossing;

    impl SequentialParser for Crossing {
        fn name(&self) -> &'static str {
            "crossing"
        }

        fn parse(&self, _: &TokensCache<'_>, _: &InlineContext<'_>, _: &ParsingSpace) -> ParsingResult {
            ParsingResult {
                nodes: vec![
                    InlineNode::new(SyntaxKind::EMPHASIS, 0..3),
                    InlineNode::new(SyntaxKind::STRONG, 2..5),
                ],
                further: Vec::new(),
            }
        }
    }

    /// Cancels its token the first time it runs.
    struct CancelOnFirstRange(CancellationToken);

    impl SequentialParser for CancelOnFirstRange {
        fn name(&self) -> &'static str {
            "cancel"
        }

        fn parse(&self, _: &TokensCache<'_>, _: &InlineContext<'_>, space: &ParsingSpace) -> ParsingResult {
            self.0.cancel();
            ParsingResult::unchanged(space)
        }
    }

    #[test]
    fn structure_error_depends_on_assertions() {
        let parser = MarkdownParser::new(Flavour::gfm().with_inline_parser(Crossing));
        let cancel = CancellationToken::new();

        let tree = parser
            .parse_with_cancellation("a b c", &cancel)
            .expect("fallback");
        assert_eq!(debug_tree(&tree), debug_tree(&fallback_tree("a b c")));

        let err = parser
            .with_assertions(true)
            .parse_with_cancellation("a b c", &cancel)
            .expect_err("strict");
        assert!(matches!(err, ParseError::Structure { .. }));
    }

    #[test]
    fn cancelled_during_the_parse() {
        let cancel = CancellationToken::new();
        let flavour = Flavour::gfm().with_inline_parser(CancelOnFirstRange(cancel.clone()));
        let result = MarkdownParser::new(flavour).parse_with_cancellation("a\n\nb\n", &cancel);
        assert_eq!(result.map(|_| ()), Err(ParseError::Cancelled));
        assert!(cancel.is_cancelled());
    }

    #[test]
    fn fallback_holds_the_raw_text() {
        let tree = fallback_tree("a\n*b*");
        assert_eq!(
            debug_tree(&tree),
            "DOCUMENT@0..5\n  PARAGRAPH@0..5\n    TEXT@0..5 \"a\\n*b*\"\n"
        );
        assert_eq!(debug_tree(&fallback_tree("")), "DOCUMENT@0..0\n");
    }

    #[test]
    fn inline_parse_is_relative_to_the_range() {
        let text = "xx *a* yy";
        let node = MarkdownParser::default()
            .parse_inline(SyntaxKind::PARAGRAPH, text, 3..6)
            .expect("inline parse");
        assert_eq!(node.kind(), SyntaxKind::PARAGRAPH);
        let emphasis = node.children().next().expect("emphasis");
        assert_eq!(emphasis.kind(), SyntaxKind::EMPHASIS);
        assert_eq!(u32::from(emphasis.text_range().end()), 3);
    }

    #[test]
    fn inline_range_outside_the_text() {
        let err = MarkdownParser::default()
            .parse_inline(SyntaxKind::PARAGRAPH, "ab", 1..5)
            .expect_err("out of range");
        assert!(matches!(err, ParseError::Structure { .. }));
    }
}
