//! # Tree builder
//!
//! Turns the flat, sorted production list of the block phase into a Rowan
//! green tree. Productions arrive outermost first; the builder keeps a stack
//! of open composites and closes each once the next production starts past
//! its end.
//!
//! Every byte ends up in a leaf. Bytes no production covers (indentation,
//! line endings between blocks, the text of a definition) become
//! `WHITE_SPACE`, `EOL` and `TEXT` leaves. Inline-holding nodes are handed
//! to an [`InlineExpander`] and the result is spliced in.

use std::ops::Range;

use log::trace;
use rowan::GreenNodeBuilder;

use crate::blocks::production::Production;
use crate::error::{CancellationToken, ParseError};
use crate::inline::InlineNode;
use crate::lexer::Token;
use crate::syntax_kind::{SyntaxKind, SyntaxNode};

/// Tokens and inline nodes of one inline range.
#[derive(Debug, Default)]
pub struct InlineExpansion {
    /// Every byte of the range, foreign tokens included.
    pub tokens: Vec<Token>,
    /// Sorted outermost first.
    pub nodes: Vec<InlineNode>,
}

/// Parses the content of inline-holding nodes.
pub trait InlineExpander {
    /// Expands `range`, keeping the `foreign` token productions inside it
    /// as they are.
    fn expand(&self, range: Range<usize>, foreign: &[Production]) -> Result<InlineExpansion, ParseError>;
}

pub struct TreeBuilder<'a> {
    text: &'a str,
    builder: GreenNodeBuilder<'static>,
    cursor: usize,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            builder: GreenNodeBuilder::new(),
            cursor: 0,
        }
    }

    /// Builds a `DOCUMENT` over the whole text from sorted productions.
    pub fn build(
        mut self,
        productions: &[Production],
        expander: &dyn InlineExpander,
        cancel: &CancellationToken,
    ) -> Result<SyntaxNode, ParseError> {
        self.builder.start_node(SyntaxKind::DOCUMENT.into());
        let mut open: Vec<Range<usize>> = Vec::new();
        let mut i = 0;
        while i < productions.len() {
            let production = &productions[i];
            let range = production.range.clone();
            while let Some(top) = open.last()
                && top.end <= range.start
            {
                let end = top.end;
                self.fill_gap(end);
                self.builder.finish_node();
                open.pop();
            }
            let limit = open.last().map_or(self.text.len(), |top| top.end);
            if range.start < self.cursor || range.end > limit {
                return Err(ParseError::structure(
                    range,
                    format!("{:?} overlaps its neighbours", production.kind),
                ));
            }
            self.fill_gap(range.start);

            if production.kind.is_token() {
                self.token(production.kind, range.clone());
                i += 1;
                continue;
            }

            cancel.check()?;
            if production.kind.holds_inlines() {
                let mut j = i + 1;
                while j < productions.len()
                    && productions[j].range.start < range.end
                    && productions[j].range.end <= range.end
                {
                    j += 1;
                }
                let foreign = &productions[i + 1..j];
                if let Some(node) = foreign.iter().find(|p| !p.kind.is_token()) {
                    return Err(ParseError::structure(
                        node.range.clone(),
                        format!("{:?} inside inline content", node.kind),
                    ));
                }
                trace!("expanding {:?} at {:?}", production.kind, range);
                let expansion = expander.expand(range.clone(), foreign)?;
                self.builder.start_node(production.kind.into());
                self.inline_content(&expansion)?;
                self.fill_gap(range.end);
                self.builder.finish_node();
                i = j;
                continue;
            }

            self.builder.start_node(production.kind.into());
            if range.is_empty() {
                self.builder.finish_node();
            } else {
                open.push(range);
            }
            i += 1;
        }
        while let Some(top) = open.pop() {
            self.fill_gap(top.end);
            self.builder.finish_node();
        }
        self.fill_gap(self.text.len());
        self.builder.finish_node();
        Ok(SyntaxNode::new_root(self.builder.finish()))
    }

    /// Builds a single node of `kind` from an inline expansion of the whole
    /// text.
    pub fn build_inline(mut self, kind: SyntaxKind, expansion: &InlineExpansion) -> Result<SyntaxNode, ParseError> {
        self.builder.start_node(kind.into());
        self.inline_content(expansion)?;
        self.fill_gap(self.text.len());
        self.builder.finish_node();
        Ok(SyntaxNode::new_root(self.builder.finish()))
    }

    fn token(&mut self, kind: SyntaxKind, range: Range<usize>) {
        self.builder.token(kind.into(), &self.text[range.clone()]);
        self.cursor = range.end;
    }

    /// Emits leaves for `cursor..end`: runs of spaces and tabs, line
    /// endings, and everything else as text.
    fn fill_gap(&mut self, end: usize) {
        let bytes = self.text.as_bytes();
        let mut i = self.cursor;
        while i < end {
            let start = i;
            let kind = match bytes[i] {
                b'\r' if bytes.get(i + 1) == Some(&b'\n') && i + 1 < end => {
                    i += 2;
                    SyntaxKind::EOL
                }
                b'\n' | b'\r' => {
                    i += 1;
                    SyntaxKind::EOL
                }
                b' ' | b'\t' => {
                    while i < end && matches!(bytes[i], b' ' | b'\t') {
                        i += 1;
                    }
                    SyntaxKind::WHITE_SPACE
                }
                _ => {
                    while i < end && !matches!(bytes[i], b' ' | b'\t' | b'\n' | b'\r') {
                        i += 1;
                    }
                    SyntaxKind::TEXT
                }
            };
            self.builder.token(kind.into(), &self.text[start..i]);
        }
        self.cursor = self.cursor.max(end);
    }

    /// Nests the inline nodes into the token stream.
    fn inline_content(&mut self, expansion: &InlineExpansion) -> Result<(), ParseError> {
        let tokens = &expansion.tokens;
        let nodes = &expansion.nodes;
        let mut open: Vec<usize> = Vec::new();
        let mut next_node = 0;
        let mut t = 0;
        while t < tokens.len() {
            let token = &tokens[t];
            while let Some(&end) = open.last()
                && end <= token.range.start
            {
                self.builder.finish_node();
                open.pop();
            }
            if self.cursor < token.range.start {
                self.fill_gap(token.range.start);
            }

            let mut collapsed = None;
            while next_node < nodes.len() && nodes[next_node].range.start <= token.range.start {
                let node = &nodes[next_node];
                next_node += 1;
                if node.range.start < token.range.start
                    || open.last().is_some_and(|&end| node.range.end > end)
                {
                    return Err(ParseError::structure(
                        node.range.clone(),
                        format!("{:?} crosses another inline node", node.kind),
                    ));
                }
                if node.kind.is_token() {
                    collapsed = Some(node.clone());
                    break;
                }
                self.builder.start_node(node.kind.into());
                open.push(node.range.end);
            }

            match collapsed {
                Some(node) => t = self.collapsed_token(tokens, t, &node),
                None => {
                    if !token.range.is_empty() {
                        self.token(token.kind, token.range.clone());
                    }
                    t += 1;
                }
            }
        }
        for _ in open {
            self.builder.finish_node();
        }
        Ok(())
    }

    /// A token-kind inline node (raw HTML) over several tokens: each run of
    /// its own tokens becomes one leaf, container prefixes stay as they are.
    /// Returns the index of the first token after the node.
    fn collapsed_token(&mut self, tokens: &[Token], mut t: usize, node: &InlineNode) -> usize {
        while t < tokens.len() && tokens[t].range.end <= node.range.end {
            if tokens[t].foreign {
                self.token(tokens[t].kind, tokens[t].range.clone());
                t += 1;
                continue;
            }
            let start = tokens[t].range.start;
            let mut end = tokens[t].range.end;
            t += 1;
            while t < tokens.len() && !tokens[t].foreign && tokens[t].range.end <= node.range.end {
                end = tokens[t].range.end;
                t += 1;
            }
            self.token(node.kind, start..end);
        }
        t
    }
}

/// Indented dump of a tree, one element per line: `KIND@start..end` for
/// nodes and `KIND@start..end "text"` for tokens.
pub fn debug_tree(node: &SyntaxNode) -> String {
    let mut out = String::new();
    dump(node, 0, &mut out);
    out
}

fn dump(node: &SyntaxNode, depth: usize, out: &mut String) {
    let range = node.text_range();
    out.push_str(&format!(
        "{}{:?}@{}..{}\n",
        "  ".repeat(depth),
        node.kind(),
        u32::from(range.start()),
        u32::from(range.end())
    ));
    for child in node.children_with_tokens() {
        match child {
            rowan::NodeOrToken::Node(child) => dump(&child, depth + 1, out),
            rowan::NodeOrToken::Token(token) => {
                let range = token.text_range();
                out.push_str(&format!(
                    "{}{:?}@{}..{} {:?}\n",
                    "  ".repeat(depth + 1),
                    token.kind(),
                    u32::from(range.start()),
                    u32::from(range.end()),
                    token.text()
                ));
            }
        }
    }
}
