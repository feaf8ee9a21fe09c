//! SyntaxKind enum for all tokens and nodes in the Markdown CST.
//!
//! Following the rust-analyzer model, all tokens and nodes share a single enum.
//! Every byte in the source must appear as a token in the tree.

/// All syntax kinds for the Markdown CST.
///
/// This enum represents both tokens (leaves) and composite nodes. Token kinds
/// come first so that [`SyntaxKind::is_token`] is a single comparison.
/// The `repr(u16)` ensures efficient storage in rowan's green tree.
///
/// We use SCREAMING_CASE following the rust-analyzer convention for SyntaxKind.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // === Inline tokens (lexer output) ===
    /// Plain text content
    TEXT,
    /// Horizontal whitespace (spaces, tabs)
    WHITE_SPACE,
    /// Line ending (LF, CRLF or CR)
    EOL,
    /// Two or more spaces, or a backslash, followed by a line ending
    HARD_LINE_BREAK,
    /// Backslash escape of an ASCII punctuation character (`\*`)
    ESCAPED_CHAR,
    /// Backslash-escaped backtick (`` \` ``)
    ESCAPED_BACKTICKS,
    /// Named or numeric character reference (`&amp;`, `&#35;`)
    ENTITY,
    /// A backslash that escapes nothing
    BACKSLASH,
    /// `*` or `_`, one token per character
    EMPH,
    /// `~`
    TILDE,
    /// `+`
    PLUS,
    /// `=`
    EQ,
    /// A run of backticks
    BACKTICK,
    /// `$`
    DOLLAR,
    /// `!`
    EXCLAMATION_MARK,
    /// `[`
    LBRACKET,
    /// `]`
    RBRACKET,
    /// `(`
    LPAREN,
    /// `)`
    RPAREN,
    /// `<`
    LT,
    /// `>` inside inline content
    GT,
    /// `:`
    COLON,
    /// `'`
    SINGLE_QUOTE,
    /// `"`
    DOUBLE_QUOTE,
    /// `|`
    PIPE,
    /// Raw inline HTML (open/close tag, comment, processing instruction, ...)
    HTML_TAG,
    /// GFM autolink without angle brackets (`www.example.com`)
    GFM_AUTOLINK,

    // === Block tokens (block engine output) ===
    /// `>` opening or continuing a block quote
    QUOTE_MARKER,
    /// `-`, `+` or `*` list item marker
    LIST_BULLET,
    /// Ordered list marker including its delimiter (`1.`, `2)`)
    LIST_NUMBER,
    /// GFM task list checkbox (`[ ]`, `[x]`)
    CHECK_BOX,
    /// Opening or closing `#` sequence of an ATX heading
    ATX_HEADER,
    /// `===` or `---` underline of a setext heading
    SETEXT_UNDERLINE,
    /// Thematic break (`***`, `---`, `___`)
    HORIZONTAL_RULE,
    /// Opening code fence (```` ``` ```` or `~~~`)
    CODE_FENCE_START,
    /// Closing code fence
    CODE_FENCE_END,
    /// Info string after an opening code fence
    FENCE_LANG,
    /// One line of fenced code content
    CODE_FENCE_CONTENT,
    /// One line of indented code content
    CODE_LINE,
    /// Tab whose first columns belong to the container or code indentation;
    /// one column of it is code content
    TAB_REMAINDER_1,
    /// Partly consumed tab, two columns of content
    TAB_REMAINDER_2,
    /// Partly consumed tab, three columns of content
    TAB_REMAINDER_3,
    /// One line of an HTML block
    HTML_BLOCK_CONTENT,
    /// One cell of a table delimiter row (`:---:`)
    TABLE_SEPARATOR,

    // === Composite Nodes ===
    /// Root document node
    DOCUMENT,
    /// Paragraph block
    PARAGRAPH,
    /// ATX heading level 1 (`# ...`)
    ATX_1,
    /// ATX heading level 2
    ATX_2,
    /// ATX heading level 3
    ATX_3,
    /// ATX heading level 4
    ATX_4,
    /// ATX heading level 5
    ATX_5,
    /// ATX heading level 6
    ATX_6,
    /// Inline content of an ATX heading
    ATX_CONTENT,
    /// Setext heading underlined with `=`
    SETEXT_1,
    /// Setext heading underlined with `-`
    SETEXT_2,
    /// Inline content of a setext heading
    SETEXT_CONTENT,
    /// Block quote container
    BLOCK_QUOTE,
    /// Bullet list
    UNORDERED_LIST,
    /// Numbered list
    ORDERED_LIST,
    /// Individual list item
    LIST_ITEM,
    /// Fenced code block
    CODE_FENCE,
    /// Indented code block
    CODE_BLOCK,
    /// Raw HTML block
    HTML_BLOCK,
    /// Link reference definition (`[label]: /url "title"`)
    LINK_DEFINITION,
    /// `[label]` of a definition or reference link
    LINK_LABEL,
    /// Link destination
    LINK_DESTINATION,
    /// Link title including its delimiters
    LINK_TITLE,
    /// `[text]` of a link or image
    LINK_TEXT,
    /// GFM table
    TABLE,
    /// Table header row
    HEADER,
    /// Table body row
    ROW,
    /// Table cell
    CELL,
    /// Emphasis `*text*`
    EMPHASIS,
    /// Strong emphasis `**text**`
    STRONG,
    /// Strikethrough `~~text~~`
    STRIKETHROUGH,
    /// Underline `++text++`
    UNDERLINE,
    /// Highlight `==text==`
    HIGHLIGHT,
    /// Inline code span
    CODE_SPAN,
    /// Inline math `$x$`
    INLINE_MATH,
    /// Display math `$$x$$`
    BLOCK_MATH,
    /// Inline link `[text](url "title")`
    INLINE_LINK,
    /// Full reference link `[text][label]`
    FULL_REFERENCE_LINK,
    /// Collapsed or shortcut reference link `[label][]`, `[label]`
    SHORT_REFERENCE_LINK,
    /// Image `![alt](url)` or `![alt][label]`
    IMAGE,
    /// Autolink `<https://example.com>` or GFM bare autolink
    AUTOLINK,
}

impl SyntaxKind {
    /// Returns true if this kind represents a token (leaf).
    pub fn is_token(self) -> bool {
        (self as u16) <= (Self::TABLE_SEPARATOR as u16)
    }

    /// Returns true if this kind represents a composite node.
    pub fn is_node(self) -> bool {
        !self.is_token()
    }

    /// Returns true if this kind is trivia (whitespace/line endings).
    pub fn is_trivia(self) -> bool {
        matches!(self, Self::WHITE_SPACE | Self::EOL)
    }

    /// Heading level for ATX and setext heading nodes.
    pub fn heading_level(self) -> Option<u8> {
        match self {
            Self::ATX_1 | Self::SETEXT_1 => Some(1),
            Self::ATX_2 | Self::SETEXT_2 => Some(2),
            Self::ATX_3 => Some(3),
            Self::ATX_4 => Some(4),
            Self::ATX_5 => Some(5),
            Self::ATX_6 => Some(6),
            _ => None,
        }
    }

    /// ATX heading kind for a level between 1 and 6.
    pub fn atx(level: usize) -> Self {
        match level {
            1 => Self::ATX_1,
            2 => Self::ATX_2,
            3 => Self::ATX_3,
            4 => Self::ATX_4,
            5 => Self::ATX_5,
            _ => Self::ATX_6,
        }
    }

    /// Token for a tab of which `columns` columns are still content.
    pub fn tab_remainder(columns: usize) -> Self {
        match columns {
            1 => Self::TAB_REMAINDER_1,
            2 => Self::TAB_REMAINDER_2,
            _ => Self::TAB_REMAINDER_3,
        }
    }

    /// Columns of content a partly consumed tab stands for.
    pub fn tab_remainder_columns(self) -> Option<usize> {
        match self {
            Self::TAB_REMAINDER_1 => Some(1),
            Self::TAB_REMAINDER_2 => Some(2),
            Self::TAB_REMAINDER_3 => Some(3),
            _ => None,
        }
    }

    /// Nodes whose content is expanded by the inline parsers.
    pub fn holds_inlines(self) -> bool {
        matches!(
            self,
            Self::PARAGRAPH | Self::ATX_CONTENT | Self::SETEXT_CONTENT | Self::CELL
        )
    }

    /// Inline nodes that render as a link.
    pub fn is_link(self) -> bool {
        matches!(
            self,
            Self::INLINE_LINK | Self::FULL_REFERENCE_LINK | Self::SHORT_REFERENCE_LINK
        )
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

/// Language definition for rowan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MarkdownLang {}

impl rowan::Language for MarkdownLang {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(raw.0 <= SyntaxKind::AUTOLINK as u16);
        // SAFETY: We check bounds above and SyntaxKind is repr(u16)
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type alias for our syntax nodes.
pub type SyntaxNode = rowan::SyntaxNode<MarkdownLang>;
/// Type alias for our syntax tokens.
pub type SyntaxToken = rowan::SyntaxToken<MarkdownLang>;
/// Type alias for syntax elements (node or token).
pub type SyntaxElement = rowan::SyntaxElement<MarkdownLang>;

#[cfg(test)]
mod tests {
    use super::*;
    use rowan::Language;

    #[test]
    fn token_kinds_are_tokens() {
        assert!(SyntaxKind::TEXT.is_token());
        assert!(SyntaxKind::QUOTE_MARKER.is_token());
        assert!(SyntaxKind::TABLE_SEPARATOR.is_token());
    }

    #[test]
    fn node_kinds_are_nodes() {
        assert!(SyntaxKind::DOCUMENT.is_node());
        assert!(SyntaxKind::PARAGRAPH.is_node());
        assert!(SyntaxKind::AUTOLINK.is_node());
    }

    #[test]
    fn heading_levels() {
        assert_eq!(SyntaxKind::ATX_3.heading_level(), Some(3));
        assert_eq!(SyntaxKind::SETEXT_2.heading_level(), Some(2));
        assert_eq!(SyntaxKind::PARAGRAPH.heading_level(), None);
        assert_eq!(SyntaxKind::atx(6), SyntaxKind::ATX_6);
    }

    #[test]
    fn tab_remainders() {
        assert!(SyntaxKind::TAB_REMAINDER_3.is_token());
        assert_eq!(SyntaxKind::tab_remainder(2), SyntaxKind::TAB_REMAINDER_2);
        assert_eq!(SyntaxKind::tab_remainder(2).tab_remainder_columns(), Some(2));
        assert_eq!(SyntaxKind::CODE_LINE.tab_remainder_columns(), None);
    }

    #[test]
    fn roundtrip_through_rowan() {
        for kind in [SyntaxKind::TEXT, SyntaxKind::CELL, SyntaxKind::AUTOLINK] {
            let raw = MarkdownLang::kind_to_raw(kind);
            assert_eq!(MarkdownLang::kind_from_raw(raw), kind);
        }
    }
}
