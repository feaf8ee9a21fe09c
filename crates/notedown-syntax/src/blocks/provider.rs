use std::ops::Range;

use crate::blocks::kinds::html_block::HtmlBlockKind;
use crate::blocks::kinds::table::TableRow;
use crate::blocks::marker_block::ParagraphLine;
use crate::scanner::{LineCursor, Position};

/// What the current line would be added to if no block started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    /// An open paragraph whose containers all matched.
    Paragraph,
    /// An open table whose containers all matched.
    Table,
    /// A list whose current item did not match.
    List,
    /// The document, a block quote or a list item.
    Other,
}

/// Read-only view of the engine state handed to providers.
#[derive(Debug, Clone, Copy)]
pub struct StartContext<'a> {
    pub container: ContainerKind,
    /// The deepest open block is a paragraph that did not match, so the
    /// line may still continue it lazily.
    pub maybe_lazy: bool,
    /// Lines of the matched paragraph when `container` is a paragraph.
    pub paragraph: &'a [ParagraphLine],
}

impl StartContext<'_> {
    pub fn interrupts_paragraph(&self) -> bool {
        self.container == ContainerKind::Paragraph
    }
}

/// A list item marker found at the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListMarker {
    pub ordered: bool,
    /// Bullet character, or the `.`/`)` delimiter of an ordered marker.
    pub marker: char,
    pub number: u64,
    pub range: Range<usize>,
    /// Columns of indentation before the marker.
    pub marker_offset: usize,
    /// Columns from the marker to the item content.
    pub padding: usize,
    /// Where the item content starts, possibly inside a tab.
    pub content: Position,
    /// GFM task list checkbox.
    pub checkbox: Option<Range<usize>>,
}

/// An ATX heading line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtxStart {
    pub level: usize,
    pub opening: Range<usize>,
    pub content: Option<Range<usize>>,
    pub closing: Option<Range<usize>>,
}

/// The opening line of a fenced code block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenceStart {
    pub fence: Range<usize>,
    pub fence_char: u8,
    /// Columns of indentation before the fence.
    pub indent: usize,
    pub info: Option<Range<usize>>,
}

/// A block start recognised by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockStart {
    BlockQuote { marker: Range<usize> },
    AtxHeading(AtxStart),
    FencedCode(FenceStart),
    HtmlBlock(HtmlBlockKind),
    SetextUnderline { level: usize, underline: Range<usize> },
    ThematicBreak(Range<usize>),
    ListItem(ListMarker),
    IndentedCode,
    Table { header: TableRow, delimiter: TableRow },
}

/// Recognises the start of one kind of block.
///
/// Providers are asked in order; the first one that returns a start wins.
/// They only look at the line, the engine does all the bookkeeping.
pub trait BlockProvider: Send + Sync {
    fn name(&self) -> &'static str;

    fn try_start(&self, cursor: &LineCursor<'_>, ctx: &StartContext<'_>) -> Option<BlockStart>;
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::scanner::lines;

    /// Runs `provider` on a one-line `text` at the document level.
    pub fn start(provider: &dyn BlockProvider, text: &str) -> Option<BlockStart> {
        start_in(provider, text, ContainerKind::Other, &[])
    }

    /// Runs `provider` on the last line of `text` with an explicit container.
    pub fn start_in(
        provider: &dyn BlockProvider,
        text: &str,
        container: ContainerKind,
        paragraph: &[ParagraphLine],
    ) -> Option<BlockStart> {
        let line = *lines(text).last()?;
        let cursor = LineCursor::new(text, line);
        let ctx = StartContext {
            container,
            maybe_lazy: false,
            paragraph,
        };
        provider.try_start(&cursor, &ctx)
    }
}
