//! The depth-first HTML walk.
//!
//! [`HtmlGenerator`] owns the output buffer and dispatches every composite
//! node to the [`GeneratingProvider`](crate::providers::GeneratingProvider)
//! registered for its kind. Tokens are rendered by the generator itself:
//! in block context only thematic breaks produce output, in inline context
//! every token becomes (escaped) text.

use std::borrow::Cow;

use log::{trace, warn};
use notedown_syntax::ast::logical_text;
use notedown_syntax::{LinkMap, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken};
use rowan::NodeOrToken;

use crate::RenderOptions;
use crate::providers::HtmlProviders;
use crate::text::{decode_entity, escape, filter_tags};

pub struct HtmlGenerator<'a> {
    text: &'a str,
    root: &'a SyntaxNode,
    providers: &'a HtmlProviders,
    options: &'a RenderOptions,
    link_map: LinkMap,
    /// Tightness of the lists being rendered, innermost last.
    lists: Vec<bool>,
    out: String,
}

impl<'a> HtmlGenerator<'a> {
    pub fn new(
        text: &'a str,
        root: &'a SyntaxNode,
        providers: &'a HtmlProviders,
        options: &'a RenderOptions,
    ) -> Self {
        let tree_len = usize::from(root.text_range().end());
        if tree_len != text.len() {
            warn!(
                "tree covers {tree_len} bytes but the source has {}",
                text.len()
            );
        }
        Self {
            text,
            root,
            providers,
            options,
            link_map: LinkMap::from_tree(root),
            lists: Vec::new(),
            out: String::with_capacity(text.len() + text.len() / 2),
        }
    }

    pub fn generate_html(mut self) -> String {
        let root = self.root;
        self.generate_node(root);
        self.out
    }

    pub fn options(&self) -> &RenderOptions {
        self.options
    }

    pub fn link_map(&self) -> &LinkMap {
        &self.link_map
    }

    /// Source text of `node`, or its tree text when the two disagree.
    pub fn source(&self, node: &SyntaxNode) -> Cow<'a, str> {
        let range = node.text_range();
        match self.text.get(usize::from(range.start())..usize::from(range.end())) {
            Some(source) => Cow::Borrowed(source),
            None => Cow::Owned(node.text().to_string()),
        }
    }

    pub fn push(&mut self, html: &str) {
        self.out.push_str(html);
    }

    /// Starts a new line unless the output is empty or already at one.
    pub fn cr(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
    }

    pub fn escape(&mut self, text: &str) {
        self.out.push_str(&escape(text));
    }

    /// Raw HTML, through the tag filter when it is on.
    pub fn raw(&mut self, html: &str) {
        if self.options.tag_filter {
            self.out.push_str(&filter_tags(html));
        } else {
            self.out.push_str(html);
        }
    }

    pub fn enter_list(&mut self, tight: bool) {
        self.lists.push(tight);
    }

    pub fn exit_list(&mut self) {
        self.lists.pop();
    }

    /// Paragraphs directly inside an item of a tight list render without
    /// `<p>`.
    pub fn in_tight_list(&self) -> bool {
        self.lists.last().copied().unwrap_or(false)
    }

    pub fn generate_node(&mut self, node: &SyntaxNode) {
        let providers = self.providers;
        match providers.get(node.kind()) {
            Some(provider) => provider.generate(node, self),
            None if node.ancestors().any(|n| n.kind().holds_inlines()) => {
                trace!("no provider for {:?}, rendering its text", node.kind());
                self.generate_inner(node, 0);
            }
            None => {
                trace!("no provider for {:?}, rendering its blocks", node.kind());
                self.generate_blocks(node);
            }
        }
    }

    /// Child blocks of a container.
    pub fn generate_blocks(&mut self, node: &SyntaxNode) {
        for element in node.children_with_tokens() {
            match element {
                NodeOrToken::Node(child) => self.generate_node(&child),
                NodeOrToken::Token(token) if token.kind() == SyntaxKind::HORIZONTAL_RULE => {
                    self.cr();
                    self.push("<hr />\n");
                }
                NodeOrToken::Token(_) => {}
            }
        }
    }

    /// Inline children of `node`, leaving out `skip` elements at each end
    /// (the delimiters of emphasis, the brackets of link text).
    pub fn generate_inner(&mut self, node: &SyntaxNode, skip: usize) {
        let children: Vec<SyntaxElement> = node.children_with_tokens().collect();
        let end = children.len().saturating_sub(skip);
        for element in children.iter().take(end).skip(skip) {
            match element {
                NodeOrToken::Node(child) => self.generate_node(child),
                NodeOrToken::Token(token) => self.generate_token(token),
            }
        }
    }

    fn generate_token(&mut self, token: &SyntaxToken) {
        match token.kind() {
            SyntaxKind::HARD_LINE_BREAK => self.push("<br />\n"),
            SyntaxKind::EOL => self.push("\n"),
            SyntaxKind::HTML_TAG => self.raw(token.text()),
            _ => {
                if let Some(text) = token_text(token) {
                    self.escape(&text);
                }
            }
        }
    }
}

/// Literal text of an inline token: escapes resolved, character references
/// decoded, container prefixes and line-edge whitespace dropped.
pub fn token_text(token: &SyntaxToken) -> Option<Cow<'_, str>> {
    match token.kind() {
        SyntaxKind::QUOTE_MARKER => None,
        SyntaxKind::WHITE_SPACE if at_line_start(token) || at_line_end(token) => None,
        SyntaxKind::ESCAPED_CHAR | SyntaxKind::ESCAPED_BACKTICKS => {
            Some(Cow::Borrowed(&token.text()[1..]))
        }
        SyntaxKind::ENTITY => Some(decode_entity(token.text())),
        _ => Some(Cow::Borrowed(token.text())),
    }
}

fn at_line_start(token: &SyntaxToken) -> bool {
    let mut prev = token.prev_token();
    while let Some(current) = prev {
        match current.kind() {
            SyntaxKind::QUOTE_MARKER => return true,
            SyntaxKind::WHITE_SPACE => prev = current.prev_token(),
            _ => return current.text().ends_with(['\n', '\r']),
        }
    }
    true
}

fn at_line_end(token: &SyntaxToken) -> bool {
    token
        .next_token()
        .is_none_or(|next| next.kind() == SyntaxKind::EOL)
}

/// Number of delimiter children at each end of an emphasis-like node.
pub fn delimiter_count(node: &SyntaxNode) -> usize {
    match node.kind() {
        SyntaxKind::EMPHASIS => 1,
        SyntaxKind::STRIKETHROUGH => node
            .children_with_tokens()
            .take_while(|element| element.kind() == SyntaxKind::TILDE)
            .count()
            .min(2),
        _ => 2,
    }
}

/// Text between the `fence` characters that open and close a code span or
/// math node, with line endings turned into spaces.
pub fn fenced_content(node: &SyntaxNode, fence: char) -> String {
    let text = logical_text(node);
    let open = text.chars().take_while(|&c| c == fence).count();
    let inner = text
        .get(open..text.len().saturating_sub(open))
        .unwrap_or_default();
    inner.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

/// Text content for attributes such as an image's `alt`: inline markup is
/// dropped, line breaks become spaces.
pub fn plain_text(node: &SyntaxNode) -> String {
    let mut out = String::new();
    collect_plain(node, &mut out);
    out
}

fn collect_plain(node: &SyntaxNode, out: &mut String) {
    let skip = match node.kind() {
        SyntaxKind::CODE_SPAN => {
            out.push_str(&crate::providers::inline::code_span_text(node));
            return;
        }
        SyntaxKind::INLINE_MATH | SyntaxKind::BLOCK_MATH => {
            out.push_str(&fenced_content(node, '$'));
            return;
        }
        SyntaxKind::AUTOLINK => {
            out.push_str(logical_text(node).trim_start_matches('<').trim_end_matches('>'));
            return;
        }
        SyntaxKind::EMPHASIS
        | SyntaxKind::STRONG
        | SyntaxKind::STRIKETHROUGH
        | SyntaxKind::UNDERLINE
        | SyntaxKind::HIGHLIGHT => delimiter_count(node),
        SyntaxKind::LINK_TEXT | SyntaxKind::LINK_LABEL => 1,
        kind if kind.is_link() => {
            let text_kind = match kind {
                SyntaxKind::SHORT_REFERENCE_LINK => SyntaxKind::LINK_LABEL,
                _ => SyntaxKind::LINK_TEXT,
            };
            if let Some(text) = node.children().find(|child| child.kind() == text_kind) {
                collect_plain(&text, out);
            }
            return;
        }
        SyntaxKind::IMAGE => {
            if let Some(link) = node.children().find(|child| child.kind().is_link()) {
                collect_plain(&link, out);
            }
            return;
        }
        _ => 0,
    };
    let children: Vec<SyntaxElement> = node.children_with_tokens().collect();
    let end = children.len().saturating_sub(skip);
    for element in children.iter().take(end).skip(skip) {
        match element {
            NodeOrToken::Node(child) => collect_plain(child, out),
            NodeOrToken::Token(token) => match token.kind() {
                SyntaxKind::EOL | SyntaxKind::HARD_LINE_BREAK => out.push(' '),
                SyntaxKind::HTML_TAG => out.push_str(token.text()),
                _ => {
                    if let Some(text) = token_text(token) {
                        out.push_str(&text);
                    }
                }
            },
        }
    }
}
