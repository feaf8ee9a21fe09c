use crate::blocks::kinds::HtmlBlockKind;
use crate::blocks::production::ProductionMark;
use crate::constraints::Constraints;
use crate::scanner::Position;

/// One line of an open paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParagraphLine {
    /// Start of the line, container prefix included.
    pub prefix_start: usize,
    /// First non-space character.
    pub start: usize,
    /// End of the line content, before the line ending.
    pub end: usize,
}

/// What an open block is, with the state it needs to accept more lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockState {
    Document,
    BlockQuote,
    List { ordered: bool, marker: char },
    ListItem,
    Paragraph { lines: Vec<ParagraphLine> },
    FencedCode {
        fence_char: u8,
        fence_len: usize,
        fence_indent: usize,
    },
    IndentedCode {
        /// Whitespace-only lines that only belong to the block if more
        /// code follows: where their content starts, and the line end.
        pending: Vec<(Position, usize)>,
    },
    HtmlBlock { kind: HtmlBlockKind },
    Table { columns: usize },
}

/// An open block on the engine's stack.
#[derive(Debug, Clone)]
pub struct MarkerBlock {
    pub state: BlockState,
    /// Constraints in force inside the block.
    pub constraints: Constraints,
    pub mark: ProductionMark,
    /// End offset of the content seen so far.
    pub end: usize,
    pub has_children: bool,
}

impl MarkerBlock {
    pub fn new(state: BlockState, constraints: Constraints, mark: ProductionMark, end: usize) -> Self {
        Self {
            state,
            constraints,
            mark,
            end,
            has_children: false,
        }
    }

    /// Blocks that hold other blocks.
    pub fn is_container(&self) -> bool {
        matches!(
            self.state,
            BlockState::Document
                | BlockState::BlockQuote
                | BlockState::List { .. }
                | BlockState::ListItem
        )
    }

    /// Blocks that add a level to the constraints.
    pub fn is_level(&self) -> bool {
        matches!(self.state, BlockState::BlockQuote | BlockState::ListItem)
    }

    /// A list that an item with `marker` can join.
    pub fn accepts_item(&self, ordered: bool, marker: char) -> bool {
        matches!(self.state, BlockState::List { ordered: o, marker: m } if o == ordered && m == marker)
    }

    pub fn name(&self) -> &'static str {
        match self.state {
            BlockState::Document => "document",
            BlockState::BlockQuote => "block_quote",
            BlockState::List { .. } => "list",
            BlockState::ListItem => "list_item",
            BlockState::Paragraph { .. } => "paragraph",
            BlockState::FencedCode { .. } => "code_fence",
            BlockState::IndentedCode { .. } => "indented_code",
            BlockState::HtmlBlock { .. } => "html_block",
            BlockState::Table { .. } => "table",
        }
    }
}
