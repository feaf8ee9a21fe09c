//! # Typed AST wrappers
//!
//! Thin views over [`SyntaxNode`]s, following the rust-analyzer pattern: a
//! wrapper is a newtype that can only be built by [`AstNode::cast`] from a
//! node of the right kind, and exposes the structure of that construct
//! (heading level, list looseness, link destination, table alignment).
//!
//! Wrappers never copy the tree. Text accessors return the *logical* text:
//! quote markers and continuation indentation inside the node are left out
//! (see [`logical_text`]).

use crate::blocks::kinds::table::Alignment;
use crate::syntax_kind::{SyntaxKind, SyntaxNode, SyntaxToken};

/// A typed view of a syntax node.
pub trait AstNode: Sized {
    fn can_cast(kind: SyntaxKind) -> bool;

    fn cast(syntax: SyntaxNode) -> Option<Self>;

    fn syntax(&self) -> &SyntaxNode;
}

macro_rules! ast_node {
    ($(#[$meta:meta])* $name:ident, $($kind:ident)|+) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(SyntaxNode);

        impl AstNode for $name {
            fn can_cast(kind: SyntaxKind) -> bool {
                matches!(kind, $(SyntaxKind::$kind)|+)
            }

            fn cast(syntax: SyntaxNode) -> Option<Self> {
                Self::can_cast(syntax.kind()).then(|| Self(syntax))
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.0
            }
        }
    };
}

pub(crate) mod support {
    use super::AstNode;
    use crate::syntax_kind::{SyntaxKind, SyntaxNode, SyntaxToken};

    pub(crate) fn child<N: AstNode>(node: &SyntaxNode) -> Option<N> {
        node.children().find_map(N::cast)
    }

    pub(crate) fn child_of_kind(node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxNode> {
        node.children().find(|child| child.kind() == kind)
    }

    pub(crate) fn tokens(node: &SyntaxNode, kind: SyntaxKind) -> impl Iterator<Item = SyntaxToken> {
        node.children_with_tokens()
            .filter_map(|element| element.into_token())
            .filter(move |token| token.kind() == kind)
    }
}

/// Concatenated token text of `node`, without container prefixes: quote
/// markers, and whitespace that starts a continuation line.
pub fn logical_text(node: &SyntaxNode) -> String {
    let mut out = String::new();
    let mut line_start = false;
    for token in node
        .descendants_with_tokens()
        .filter_map(|element| element.into_token())
    {
        match token.kind() {
            SyntaxKind::QUOTE_MARKER => line_start = true,
            SyntaxKind::WHITE_SPACE if line_start => {}
            SyntaxKind::EOL | SyntaxKind::HARD_LINE_BREAK => {
                out.push_str(token.text());
                line_start = true;
            }
            _ => {
                out.push_str(token.text());
                line_start = false;
            }
        }
    }
    out
}

/// Removes one pair of delimiters, if `text` is long enough to hold them.
fn strip_delimiters(text: &str) -> String {
    let mut chars = text.chars();
    chars.next();
    chars.next_back();
    chars.as_str().to_string()
}

fn destination_text(node: &SyntaxNode) -> String {
    let text = logical_text(node);
    match text.strip_prefix('<').and_then(|t| t.strip_suffix('>')) {
        Some(inner) => inner.to_string(),
        None => text,
    }
}

/// True when two block children of `node` are separated by a blank line.
fn has_blank_between_children(node: &SyntaxNode, counted: impl Fn(&SyntaxNode) -> bool) -> bool {
    let mut seen = false;
    let mut eols = 0;
    for element in node.children_with_tokens() {
        match element {
            rowan::NodeOrToken::Node(child) if counted(&child) => {
                if seen && eols >= 2 {
                    return true;
                }
                seen = true;
                eols = 0;
            }
            rowan::NodeOrToken::Token(token) if token.kind() == SyntaxKind::EOL => eols += 1,
            _ => {}
        }
    }
    false
}

ast_node!(Document, DOCUMENT);
ast_node!(Paragraph, PARAGRAPH);

ast_node!(
    /// ATX or setext heading.
    Heading,
    ATX_1 | ATX_2 | ATX_3 | ATX_4 | ATX_5 | ATX_6 | SETEXT_1 | SETEXT_2
);

impl Heading {
    pub fn level(&self) -> u8 {
        self.0.kind().heading_level().unwrap_or(1)
    }

    /// The inline content node, absent for an empty ATX heading.
    pub fn content(&self) -> Option<SyntaxNode> {
        self.0
            .children()
            .find(|child| matches!(child.kind(), SyntaxKind::ATX_CONTENT | SyntaxKind::SETEXT_CONTENT))
    }
}

ast_node!(BlockQuote, BLOCK_QUOTE);

ast_node!(
    /// Bullet or ordered list.
    List,
    UNORDERED_LIST | ORDERED_LIST
);

impl List {
    pub fn is_ordered(&self) -> bool {
        self.0.kind() == SyntaxKind::ORDERED_LIST
    }

    pub fn items(&self) -> impl Iterator<Item = ListItem> + '_ {
        self.0.children().filter_map(ListItem::cast)
    }

    /// Number of the first item of an ordered list.
    pub fn start(&self) -> Option<u64> {
        if !self.is_ordered() {
            return None;
        }
        let marker = self.items().next()?.marker()?;
        let digits = marker.text().trim_end_matches(['.', ')']);
        digits.parse().ok()
    }

    /// A list is loose when its items, or two blocks of one item, are
    /// separated by a blank line.
    pub fn is_loose(&self) -> bool {
        has_blank_between_children(&self.0, |child| child.kind() == SyntaxKind::LIST_ITEM)
            || self.items().any(|item| item.has_blank_between_blocks())
    }
}

ast_node!(ListItem, LIST_ITEM);

impl ListItem {
    /// The bullet or number token.
    pub fn marker(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|element| element.into_token())
            .find(|token| matches!(token.kind(), SyntaxKind::LIST_BULLET | SyntaxKind::LIST_NUMBER))
    }

    /// `Some(checked)` for a task list item.
    pub fn checkbox(&self) -> Option<bool> {
        let token = support::tokens(&self.0, SyntaxKind::CHECK_BOX).next()?;
        Some(token.text() != "[ ]")
    }

    pub fn blocks(&self) -> impl Iterator<Item = SyntaxNode> {
        self.0.children()
    }

    fn has_blank_between_blocks(&self) -> bool {
        has_blank_between_children(&self.0, |_| true)
    }
}

ast_node!(CodeFence, CODE_FENCE);

impl CodeFence {
    /// Info string as written, escapes and entities not yet decoded.
    pub fn info(&self) -> Option<String> {
        support::tokens(&self.0, SyntaxKind::FENCE_LANG)
            .next()
            .map(|token| token.text().to_string())
    }

    /// The code, one `\n`-terminated line per content line.
    pub fn content(&self) -> String {
        let mut out = String::new();
        let mut past_opening = false;
        for element in self.0.children_with_tokens() {
            let Some(token) = element.into_token() else {
                continue;
            };
            match token.kind() {
                SyntaxKind::EOL if !past_opening => past_opening = true,
                SyntaxKind::EOL => out.push('\n'),
                SyntaxKind::CODE_FENCE_CONTENT => out.push_str(token.text()),
                SyntaxKind::CODE_FENCE_END => return out,
                kind => push_tab_remainder(&mut out, kind),
            }
        }
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out
    }
}

ast_node!(CodeBlock, CODE_BLOCK);

impl CodeBlock {
    pub fn content(&self) -> String {
        lines_of(&self.0, SyntaxKind::CODE_LINE)
    }
}

ast_node!(HtmlBlock, HTML_BLOCK);

impl HtmlBlock {
    pub fn content(&self) -> String {
        lines_of(&self.0, SyntaxKind::HTML_BLOCK_CONTENT)
    }
}

/// Tokens of `kind` joined by the line endings between them, with a final
/// `\n`.
fn lines_of(node: &SyntaxNode, kind: SyntaxKind) -> String {
    let mut out = String::new();
    for token in node
        .children_with_tokens()
        .filter_map(|element| element.into_token())
    {
        if token.kind() == kind {
            out.push_str(token.text());
        } else if token.kind() == SyntaxKind::EOL {
            out.push('\n');
        } else {
            push_tab_remainder(&mut out, token.kind());
        }
    }
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

/// A partly consumed tab contributes its remaining columns as spaces.
fn push_tab_remainder(out: &mut String, kind: SyntaxKind) {
    if let Some(columns) = kind.tab_remainder_columns() {
        out.extend(std::iter::repeat_n(' ', columns));
    }
}

ast_node!(
    /// Inline, full reference or short reference link.
    Link,
    INLINE_LINK | FULL_REFERENCE_LINK | SHORT_REFERENCE_LINK
);

impl Link {
    /// The node holding the link text, brackets included.
    pub fn text(&self) -> Option<SyntaxNode> {
        let kind = match self.0.kind() {
            SyntaxKind::SHORT_REFERENCE_LINK => SyntaxKind::LINK_LABEL,
            _ => SyntaxKind::LINK_TEXT,
        };
        support::child_of_kind(&self.0, kind)
    }

    /// Destination of an inline link, without angle brackets. Empty for
    /// `[a]()`.
    pub fn destination(&self) -> Option<String> {
        if self.0.kind() != SyntaxKind::INLINE_LINK {
            return None;
        }
        Some(
            support::child_of_kind(&self.0, SyntaxKind::LINK_DESTINATION)
                .map(|node| destination_text(&node))
                .unwrap_or_default(),
        )
    }

    /// Title of an inline link, without its delimiters.
    pub fn title(&self) -> Option<String> {
        support::child_of_kind(&self.0, SyntaxKind::LINK_TITLE)
            .map(|node| strip_delimiters(&logical_text(&node)))
    }

    /// Label a reference link is resolved with.
    pub fn label(&self) -> Option<String> {
        if self.0.kind() == SyntaxKind::INLINE_LINK {
            return None;
        }
        support::child_of_kind(&self.0, SyntaxKind::LINK_LABEL)
            .map(|node| strip_delimiters(&logical_text(&node)))
    }
}

ast_node!(Image, IMAGE);

impl Image {
    pub fn link(&self) -> Option<Link> {
        support::child(&self.0)
    }
}

ast_node!(Autolink, AUTOLINK);

impl Autolink {
    /// The address without angle brackets.
    pub fn address(&self) -> String {
        destination_text(&self.0)
    }

    /// `<...>` form, as opposed to a GFM bare link.
    pub fn is_bracketed(&self) -> bool {
        self.0.text().to_string().starts_with('<')
    }
}

ast_node!(LinkDefinition, LINK_DEFINITION);

impl LinkDefinition {
    pub fn label(&self) -> Option<String> {
        support::child_of_kind(&self.0, SyntaxKind::LINK_LABEL)
            .map(|node| strip_delimiters(&logical_text(&node)))
    }

    pub fn destination(&self) -> Option<String> {
        support::child_of_kind(&self.0, SyntaxKind::LINK_DESTINATION).map(|node| destination_text(&node))
    }

    pub fn title(&self) -> Option<String> {
        support::child_of_kind(&self.0, SyntaxKind::LINK_TITLE)
            .map(|node| strip_delimiters(&logical_text(&node)))
    }
}

ast_node!(Table, TABLE);

impl Table {
    /// One alignment per column, from the delimiter row.
    pub fn alignments(&self) -> Vec<Alignment> {
        support::tokens(&self.0, SyntaxKind::TABLE_SEPARATOR)
            .map(|token| Alignment::from_delimiter(token.text()))
            .collect()
    }

    pub fn header(&self) -> Option<Row> {
        self.0
            .children()
            .find(|child| child.kind() == SyntaxKind::HEADER)
            .and_then(Row::cast)
    }

    pub fn rows(&self) -> impl Iterator<Item = Row> + '_ {
        self.0
            .children()
            .filter(|child| child.kind() == SyntaxKind::ROW)
            .filter_map(Row::cast)
    }
}

ast_node!(
    /// Header or body row of a table.
    Row,
    HEADER | ROW
);

impl Row {
    pub fn is_header(&self) -> bool {
        self.0.kind() == SyntaxKind::HEADER
    }

    pub fn cells(&self) -> impl Iterator<Item = SyntaxNode> + '_ {
        self.0.children().filter(|child| child.kind() == SyntaxKind::CELL)
    }
}
