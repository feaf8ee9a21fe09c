//! # Block engine
//!
//! The first parsing phase. Lines are consumed one at a time and turned
//! into [`Production`]s: node and token kinds over byte ranges. The tree
//! builder later sorts and nests them.
//!
//! ## Per-line algorithm
//!
//! 1. Match the line against the [`Constraints`] of the innermost open
//!    container. Quote markers of the matched levels become `QUOTE_MARKER`
//!    tokens.
//! 2. If the deepest open block is a leaf whose container matched, ask it to
//!    continue (fenced code, HTML blocks and indented code take the whole
//!    line).
//! 3. Ask the [`BlockProvider`]s, in flavour order, for block starts until
//!    none applies. Container starts (quotes, list items) loop again on the
//!    rest of the line.
//! 4. Otherwise the line is a lazy paragraph continuation, a paragraph or
//!    table line, or it closes unmatched blocks.
//!
//! Open blocks live on a stack of [`MarkerBlock`]s. Each holds a
//! [`ProductionMark`] reserved when it opened, completed when it closes.
//!
//! [`Production`]: production::Production
//! [`ProductionMark`]: production::ProductionMark

pub mod kinds;
pub mod marker_block;
pub mod production;
pub mod provider;

use log::trace;

use crate::blocks::kinds::CodeFence;
use crate::blocks::kinds::link_definition::{LogicalText, parse_definition};
use crate::blocks::kinds::table::{TableRow, parse_row};
use crate::blocks::marker_block::{BlockState, MarkerBlock, ParagraphLine};
use crate::blocks::production::{ProductionHolder, ProductionMark};
use crate::blocks::provider::{
    AtxStart, BlockProvider, BlockStart, ContainerKind, FenceStart, ListMarker, StartContext,
};
use crate::constraints::{Constraints, Level};
use crate::error::{CancellationToken, ParseError};
use crate::link_map::{LinkInfo, LinkMap};
use crate::scanner::{self, CODE_INDENT, Line, LineCursor, Position, is_space_or_tab, next_column};
use crate::syntax_kind::SyntaxKind;

/// Everything the block phase produces.
#[derive(Debug)]
pub struct BlockOutput {
    pub productions: ProductionHolder,
    pub link_map: LinkMap,
}

enum LeafContinuation {
    /// The leaf took the whole line.
    Consumed,
    /// The line continues the leaf unless a block starts.
    Matched,
    Unmatched,
}

enum Opened {
    Container(usize),
    /// A leaf opened and took the rest of the line.
    Leaf,
}

/// Line-by-line block parser.
pub struct BlockEngine<'a> {
    text: &'a str,
    providers: &'a [Box<dyn BlockProvider>],
    productions: ProductionHolder,
    link_map: LinkMap,
    stack: Vec<MarkerBlock>,
}

fn trim_end(text: &str, start: usize, mut end: usize) -> usize {
    let bytes = text.as_bytes();
    while end > start && is_space_or_tab(bytes[end - 1]) {
        end -= 1;
    }
    end
}

impl<'a> BlockEngine<'a> {
    pub fn new(text: &'a str, providers: &'a [Box<dyn BlockProvider>]) -> Self {
        let mut productions = ProductionHolder::new();
        let mark = productions.mark(0);
        let document = MarkerBlock::new(BlockState::Document, Constraints::root(), mark, 0);
        Self {
            text,
            providers,
            productions,
            link_map: LinkMap::new(),
            stack: vec![document],
        }
    }

    pub fn run(mut self, cancel: &CancellationToken) -> Result<BlockOutput, ParseError> {
        for line in scanner::lines(self.text) {
            cancel.check()?;
            self.process_line(line)?;
        }
        while self.stack.len() > 1 {
            self.close_top()?;
        }
        if let Some(document) = self.stack.pop() {
            self.productions.cancel(document.mark);
        }
        trace!("block phase produced {} productions", self.productions.len());
        Ok(BlockOutput {
            productions: self.productions,
            link_map: self.link_map,
        })
    }

    fn tip(&self) -> usize {
        self.stack.len() - 1
    }

    fn innermost_container(&self) -> usize {
        self.stack
            .iter()
            .rposition(MarkerBlock::is_container)
            .unwrap_or(0)
    }

    fn extend_end(&mut self, index: usize, end: usize) {
        let block = &mut self.stack[index];
        block.end = block.end.max(end);
    }

    fn process_line(&mut self, line: Line) -> Result<(), ParseError> {
        let text = self.text;
        let levels: Vec<usize> = self
            .stack
            .iter()
            .enumerate()
            .filter(|(_, block)| block.is_level())
            .map(|(index, _)| index)
            .collect();
        let mut matched = self.stack[self.innermost_container()]
            .constraints
            .apply_to_next_line(text, line);

        // an item that is still empty cannot continue over a blank line
        for (depth, &index) in levels.iter().enumerate().take(matched.depth()) {
            let block = &self.stack[index];
            if block.state == BlockState::ListItem
                && !block.has_children
                && scanner::is_blank(&text[matched.stops[depth].offset..line.end])
            {
                matched.truncate(depth);
                break;
            }
        }

        for (level, range) in &matched.quote_markers {
            self.productions.add(SyntaxKind::QUOTE_MARKER, range.clone());
            self.extend_end(levels[*level], range.end);
        }

        let mut cursor = LineCursor::at(text, line, matched.stop());
        let depth = matched.depth();
        let mut last_matched = 0;
        for (index, block) in self.stack.iter().enumerate().skip(1) {
            if !block.is_container() || block.constraints.len() > depth {
                break;
            }
            last_matched = index;
        }

        let mut container = last_matched;
        let tip = self.tip();
        if tip == last_matched + 1 && !self.stack[tip].is_container() {
            match self.continue_leaf(&mut cursor)? {
                LeafContinuation::Consumed => return Ok(()),
                LeafContinuation::Matched => container = tip,
                LeafContinuation::Unmatched => {}
            }
        }

        let providers = self.providers;
        let maybe_lazy = matches!(self.stack[self.tip()].state, BlockState::Paragraph { .. });
        let mut started = false;
        loop {
            let start = {
                let ctx = self.start_context(container, maybe_lazy);
                providers.iter().find_map(|p| {
                    let start = p.try_start(&cursor, &ctx)?;
                    trace!("{} starts at {}", p.name(), cursor.offset);
                    Some(start)
                })
            };
            let Some(start) = start else {
                break;
            };
            started = true;
            match self.open_block(container, start, &mut cursor)? {
                Opened::Container(index) => container = index,
                Opened::Leaf => return Ok(()),
            }
        }

        let tip = self.tip();
        if !started
            && container != tip
            && matches!(self.stack[tip].state, BlockState::Paragraph { .. })
            && !cursor.is_blank()
        {
            self.add_paragraph_line(tip, &cursor);
            return Ok(());
        }

        self.close_to(container)?;
        match self.stack[container].state {
            BlockState::Paragraph { .. } => self.add_paragraph_line(container, &cursor),
            BlockState::Table { .. } => self.add_table_row(container, &cursor),
            _ if !cursor.is_blank() => {
                let parent = self.prepare_parent(container, None)?;
                let (start, _) = cursor.first_nonspace();
                let mark = self.productions.mark(start);
                let constraints = self.stack[parent].constraints.clone();
                let paragraph = BlockState::Paragraph { lines: Vec::new() };
                self.push_block(parent, MarkerBlock::new(paragraph, constraints, mark, start));
                self.add_paragraph_line(self.tip(), &cursor);
            }
            _ => {}
        }
        Ok(())
    }

    fn start_context(&self, container: usize, maybe_lazy: bool) -> StartContext<'_> {
        let (kind, paragraph) = match &self.stack[container].state {
            BlockState::Paragraph { lines } => (ContainerKind::Paragraph, lines.as_slice()),
            BlockState::Table { .. } => (ContainerKind::Table, &[][..]),
            BlockState::List { .. } => (ContainerKind::List, &[][..]),
            _ => (ContainerKind::Other, &[][..]),
        };
        StartContext {
            container: kind,
            maybe_lazy,
            paragraph,
        }
    }

    fn continue_leaf(&mut self, cursor: &mut LineCursor<'_>) -> Result<LeafContinuation, ParseError> {
        let tip = self.tip();
        let line = cursor.line;
        match self.stack[tip].state {
            BlockState::FencedCode {
                fence_char,
                fence_len,
                fence_indent,
            } => {
                if let Some(fence) = CodeFence::closing(cursor, fence_char, fence_len) {
                    self.productions.add(SyntaxKind::CODE_FENCE_END, fence.clone());
                    self.stack[tip].end = fence.end;
                    self.close_top()?;
                    return Ok(LeafContinuation::Consumed);
                }
                cursor.advance_columns(fence_indent);
                self.add_literal_text(SyntaxKind::CODE_FENCE_CONTENT, cursor.position(), line.end);
                self.stack[tip].end = line.eol_end;
                Ok(LeafContinuation::Consumed)
            }
            BlockState::HtmlBlock { kind } => {
                if kind.ends_on_blank() && cursor.is_blank() {
                    return Ok(LeafContinuation::Unmatched);
                }
                self.add_html_line(cursor)?;
                Ok(LeafContinuation::Consumed)
            }
            BlockState::IndentedCode { .. } => {
                if cursor.indent() >= CODE_INDENT {
                    cursor.advance_columns(CODE_INDENT);
                } else if cursor.is_blank() {
                    cursor.skip_spaces();
                } else {
                    return Ok(LeafContinuation::Unmatched);
                }
                let start = cursor.position();
                let blank = cursor.is_blank();
                let BlockState::IndentedCode { pending } = &mut self.stack[tip].state else {
                    return Ok(LeafContinuation::Unmatched);
                };
                if blank {
                    if start.offset < line.end {
                        pending.push((start, line.end));
                    }
                    return Ok(LeafContinuation::Consumed);
                }
                for (blank_start, blank_end) in std::mem::take(pending) {
                    self.add_literal_text(SyntaxKind::CODE_LINE, blank_start, blank_end);
                }
                self.add_literal_text(SyntaxKind::CODE_LINE, start, line.end);
                self.stack[tip].end = line.end;
                Ok(LeafContinuation::Consumed)
            }
            BlockState::Paragraph { .. } | BlockState::Table { .. } if !cursor.is_blank() => {
                Ok(LeafContinuation::Matched)
            }
            _ => Ok(LeafContinuation::Unmatched),
        }
    }

    fn open_block(
        &mut self,
        container: usize,
        start: BlockStart,
        cursor: &mut LineCursor<'a>,
    ) -> Result<Opened, ParseError> {
        match start {
            BlockStart::BlockQuote { marker } => {
                let parent = self.prepare_parent(container, None)?;
                self.productions.add(SyntaxKind::QUOTE_MARKER, marker.clone());
                let mark = self.productions.mark(marker.start);
                let constraints = self.stack[parent].constraints.add_modifier(Level::quote());
                self.push_block(
                    parent,
                    MarkerBlock::new(BlockState::BlockQuote, constraints, mark, marker.end),
                );
                cursor.skip_spaces();
                cursor.advance_bytes(1);
                cursor.advance_columns(1);
                Ok(Opened::Container(self.tip()))
            }
            BlockStart::ListItem(marker) => self.open_list_item(container, marker, cursor),
            BlockStart::AtxHeading(atx) => {
                self.open_atx(container, atx)?;
                Ok(Opened::Leaf)
            }
            BlockStart::FencedCode(fence) => {
                self.open_fence(container, fence)?;
                Ok(Opened::Leaf)
            }
            BlockStart::HtmlBlock(kind) => {
                let parent = self.prepare_parent(container, None)?;
                let mark = self.productions.mark(cursor.offset);
                let constraints = self.stack[parent].constraints.clone();
                self.push_block(
                    parent,
                    MarkerBlock::new(BlockState::HtmlBlock { kind }, constraints, mark, cursor.offset),
                );
                self.add_html_line(cursor)?;
                Ok(Opened::Leaf)
            }
            BlockStart::SetextUnderline { level, underline } => {
                self.convert_setext(container, level, underline, cursor)
            }
            BlockStart::ThematicBreak(range) => {
                let parent = self.prepare_parent(container, None)?;
                self.productions.add(SyntaxKind::HORIZONTAL_RULE, range.clone());
                self.add_leaf(parent, range.end);
                Ok(Opened::Leaf)
            }
            BlockStart::IndentedCode => {
                let parent = self.prepare_parent(container, None)?;
                let mark = self.productions.mark(cursor.offset);
                cursor.advance_columns(CODE_INDENT);
                let line = cursor.line;
                self.add_literal_text(SyntaxKind::CODE_LINE, cursor.position(), line.end);
                let constraints = self.stack[parent].constraints.clone();
                let state = BlockState::IndentedCode {
                    pending: Vec::new(),
                };
                self.push_block(parent, MarkerBlock::new(state, constraints, mark, line.end));
                Ok(Opened::Leaf)
            }
            BlockStart::Table { header, delimiter } => {
                self.convert_table(container, header, delimiter, cursor)
            }
        }
    }

    fn open_list_item(
        &mut self,
        container: usize,
        marker: ListMarker,
        cursor: &mut LineCursor<'a>,
    ) -> Result<Opened, ParseError> {
        let parent = self.prepare_parent(container, Some((marker.ordered, marker.marker)))?;
        let list = if self.stack[parent].accepts_item(marker.ordered, marker.marker) {
            parent
        } else {
            let mark = self.productions.mark(marker.range.start);
            let constraints = self.stack[parent].constraints.clone();
            let state = BlockState::List {
                ordered: marker.ordered,
                marker: marker.marker,
            };
            self.push_block(parent, MarkerBlock::new(state, constraints, mark, marker.range.end));
            self.tip()
        };

        let kind = if marker.ordered {
            SyntaxKind::LIST_NUMBER
        } else {
            SyntaxKind::LIST_BULLET
        };
        self.productions.add(kind, marker.range.clone());
        let mark = self.productions.mark(marker.range.start);
        let mut constraints = self.stack[list].constraints.add_modifier(Level::list_item(
            marker.marker,
            marker.marker_offset + marker.padding,
        ));
        let mut end = marker.range.end;
        *cursor = LineCursor::at(self.text, cursor.line, marker.content);
        if let Some(checkbox) = marker.checkbox {
            self.productions.add(SyntaxKind::CHECK_BOX, checkbox.clone());
            constraints = constraints.with_checkbox();
            end = checkbox.end;
            cursor.advance_bytes(checkbox.len());
        }
        self.push_block(list, MarkerBlock::new(BlockState::ListItem, constraints, mark, end));
        Ok(Opened::Container(self.tip()))
    }

    fn open_atx(&mut self, container: usize, atx: AtxStart) -> Result<(), ParseError> {
        let parent = self.prepare_parent(container, None)?;
        let end = [
            Some(atx.opening.end),
            atx.content.as_ref().map(|c| c.end),
            atx.closing.as_ref().map(|c| c.end),
        ]
        .into_iter()
        .flatten()
        .max()
        .unwrap_or(atx.opening.end);
        self.productions
            .add(SyntaxKind::atx(atx.level), atx.opening.start..end);
        self.productions.add(SyntaxKind::ATX_HEADER, atx.opening);
        if let Some(content) = atx.content {
            self.productions.add(SyntaxKind::ATX_CONTENT, content);
        }
        if let Some(closing) = atx.closing {
            self.productions.add(SyntaxKind::ATX_HEADER, closing);
        }
        self.add_leaf(parent, end);
        Ok(())
    }

    fn open_fence(&mut self, container: usize, fence: FenceStart) -> Result<(), ParseError> {
        let parent = self.prepare_parent(container, None)?;
        let mark = self.productions.mark(fence.fence.start);
        self.productions
            .add(SyntaxKind::CODE_FENCE_START, fence.fence.clone());
        let mut end = fence.fence.end;
        if let Some(info) = fence.info {
            end = info.end;
            self.productions.add(SyntaxKind::FENCE_LANG, info);
        }
        let state = BlockState::FencedCode {
            fence_char: fence.fence_char,
            fence_len: fence.fence.len(),
            fence_indent: fence.indent,
        };
        let constraints = self.stack[parent].constraints.clone();
        self.push_block(parent, MarkerBlock::new(state, constraints, mark, end));
        Ok(())
    }

    /// Adds the rest of the line to the HTML block on top of the stack,
    /// closing it when the line holds its end condition.
    fn add_html_line(&mut self, cursor: &LineCursor<'_>) -> Result<(), ParseError> {
        let tip = self.tip();
        let line = cursor.line;
        self.add_literal_text(SyntaxKind::HTML_BLOCK_CONTENT, cursor.position(), line.end);
        let BlockState::HtmlBlock { kind } = self.stack[tip].state else {
            return Err(ParseError::structure(line.start..line.end, "expected an HTML block"));
        };
        if kind.ends(cursor.rest()) {
            self.stack[tip].end = line.end;
            self.close_top()?;
        } else {
            self.stack[tip].end = line.eol_end;
        }
        Ok(())
    }

    /// Adds verbatim text from `start` to `end`. A tab the cursor stopped
    /// inside becomes a `TAB_REMAINDER_*` token for its unconsumed columns.
    fn add_literal_text(&mut self, kind: SyntaxKind, start: Position, end: usize) {
        let mut offset = start.offset;
        if start.partial_tab && offset < end {
            let columns = next_column(start.column, b'\t') - start.column;
            self.productions
                .add(SyntaxKind::tab_remainder(columns), offset..offset + 1);
            offset += 1;
        }
        if offset < end {
            self.productions.add(kind, offset..end);
        }
    }

    fn convert_setext(
        &mut self,
        container: usize,
        level: usize,
        underline: std::ops::Range<usize>,
        cursor: &LineCursor<'_>,
    ) -> Result<Opened, ParseError> {
        let lines = self.take_paragraph_lines(container)?;
        let (lines, definitions_end) = self.strip_definitions(lines);
        if let Some(end) = definitions_end {
            self.extend_end(container - 1, end);
        }
        let (Some(first), Some(last)) = (lines.first().copied(), lines.last().copied()) else {
            // only definitions: the underline is paragraph text
            self.add_paragraph_line(container, cursor);
            return Ok(Opened::Leaf);
        };

        let block = self.pop_block()?;
        let parent = self.tip();
        let content = first.start..trim_end(self.text, last.start, last.end);
        let kind = if level == 1 {
            SyntaxKind::SETEXT_1
        } else {
            SyntaxKind::SETEXT_2
        };
        self.productions
            .done_with_range(block.mark, kind, content.start..underline.end);
        self.productions.add(SyntaxKind::SETEXT_CONTENT, content);
        self.add_line_prefixes(&lines[1..]);
        self.productions
            .add(SyntaxKind::SETEXT_UNDERLINE, underline.clone());
        self.extend_end(parent, underline.end);
        Ok(Opened::Leaf)
    }

    fn convert_table(
        &mut self,
        container: usize,
        header: TableRow,
        delimiter: TableRow,
        cursor: &LineCursor<'_>,
    ) -> Result<Opened, ParseError> {
        let lines = self.take_paragraph_lines(container)?;
        let header_line = lines.last().copied();
        let (lines, definitions_end) = self.strip_definitions(lines);
        if let Some(end) = definitions_end {
            self.extend_end(container - 1, end);
        }
        if header_line.is_none() || lines.last().copied() != header_line {
            // the header line was part of a definition
            if let BlockState::Paragraph { lines: kept } = &mut self.stack[container].state {
                *kept = lines;
            }
            self.add_paragraph_line(container, cursor);
            return Ok(Opened::Leaf);
        }

        let block = self.pop_block()?;
        let parent = self.tip();
        if let Some(end) = self.emit_paragraph(block.mark, &lines[..lines.len() - 1]) {
            self.extend_end(parent, end);
        }

        let mark = self.productions.mark(header.range.start);
        self.add_row(SyntaxKind::HEADER, &header);
        for cell in &delimiter.cells {
            self.productions.add(SyntaxKind::TABLE_SEPARATOR, cell.clone());
        }
        for pipe in &delimiter.pipes {
            self.productions.add(SyntaxKind::PIPE, pipe.clone());
        }
        let constraints = self.stack[parent].constraints.clone();
        let state = BlockState::Table {
            columns: header.cells.len(),
        };
        self.push_block(
            parent,
            MarkerBlock::new(state, constraints, mark, delimiter.range.end),
        );
        Ok(Opened::Leaf)
    }

    fn take_paragraph_lines(&mut self, index: usize) -> Result<Vec<ParagraphLine>, ParseError> {
        match &mut self.stack[index].state {
            BlockState::Paragraph { lines } => Ok(std::mem::take(lines)),
            _ => Err(ParseError::structure(
                self.stack[index].mark.start()..self.stack[index].end,
                "expected a paragraph",
            )),
        }
    }

    fn add_row(&mut self, kind: SyntaxKind, row: &TableRow) {
        self.productions.add(kind, row.range.clone());
        for cell in &row.cells {
            self.productions.add(SyntaxKind::CELL, cell.clone());
        }
        for pipe in &row.pipes {
            self.productions.add(SyntaxKind::PIPE, pipe.clone());
        }
    }

    fn add_table_row(&mut self, index: usize, cursor: &LineCursor<'_>) {
        let (first, _) = cursor.first_nonspace();
        let row = parse_row(self.text, first, cursor.line.end);
        self.add_row(SyntaxKind::ROW, &row);
        self.extend_end(index, row.range.end);
    }

    fn add_paragraph_line(&mut self, index: usize, cursor: &LineCursor<'_>) {
        let (start, _) = cursor.first_nonspace();
        let line = cursor.line;
        if let BlockState::Paragraph { lines } = &mut self.stack[index].state {
            lines.push(ParagraphLine {
                prefix_start: line.start,
                start,
                end: line.end,
            });
        }
    }

    /// Whitespace in continuation line prefixes belongs to the container,
    /// not to the paragraph text.
    fn add_line_prefixes(&mut self, lines: &[ParagraphLine]) {
        let bytes = self.text.as_bytes();
        for line in lines {
            let mut i = line.prefix_start;
            while i < line.start {
                if is_space_or_tab(bytes[i]) {
                    let run = i;
                    while i < line.start && is_space_or_tab(bytes[i]) {
                        i += 1;
                    }
                    self.productions.add(SyntaxKind::WHITE_SPACE, run..i);
                } else {
                    i += 1;
                }
            }
        }
    }

    /// Removes leading link reference definitions, recording them in the
    /// link map. Returns the remaining lines and the end of the last
    /// definition.
    fn strip_definitions(&mut self, lines: Vec<ParagraphLine>) -> (Vec<ParagraphLine>, Option<usize>) {
        if lines.is_empty() {
            return (lines, None);
        }
        let logical = LogicalText::new(self.text, &lines);
        let text = logical.text.as_str();
        let mut pos = 0;
        let mut end = None;
        while pos < text.len() {
            let Some(def) = parse_definition(text, pos) else {
                break;
            };
            let info = LinkInfo {
                destination: def.destination_text(text).to_string(),
                title: def.title_text(text).map(str::to_string),
            };
            if !self.link_map.insert(def.label_text(text), info) {
                trace!("duplicate definition [{}] ignored", def.label_text(text));
            }
            let range = logical.source_range(def.label.start..def.end);
            self.productions.add(SyntaxKind::LINK_DEFINITION, range.clone());
            self.productions
                .add(SyntaxKind::LINK_LABEL, logical.source_range(def.label.clone()));
            self.productions.add(
                SyntaxKind::LINK_DESTINATION,
                logical.source_range(def.destination.clone()),
            );
            if let Some(title) = def.title.clone() {
                self.productions
                    .add(SyntaxKind::LINK_TITLE, logical.source_range(title));
            }
            end = Some(range.end);
            pos = def.next;
        }
        let kept = logical.line_at(pos);
        (lines[kept..].to_vec(), end)
    }

    /// Completes a paragraph mark over `lines`, or cancels it when there are
    /// none. Returns the paragraph end.
    fn emit_paragraph(&mut self, mark: ProductionMark, lines: &[ParagraphLine]) -> Option<usize> {
        let (Some(first), Some(last)) = (lines.first(), lines.last()) else {
            self.productions.cancel(mark);
            return None;
        };
        let end = trim_end(self.text, last.start, last.end);
        self.productions
            .done_with_range(mark, SyntaxKind::PARAGRAPH, first.start..end);
        self.add_line_prefixes(&lines[1..]);
        Some(end)
    }

    fn push_block(&mut self, parent: usize, block: MarkerBlock) {
        trace!("open {} at {}", block.name(), block.mark.start());
        self.stack[parent].has_children = true;
        self.stack.push(block);
    }

    /// A leaf that is finished as soon as it starts (headings, breaks).
    fn add_leaf(&mut self, parent: usize, end: usize) {
        self.stack[parent].has_children = true;
        self.extend_end(parent, end);
    }

    fn pop_block(&mut self) -> Result<MarkerBlock, ParseError> {
        if self.stack.len() <= 1 {
            return Err(ParseError::structure(
                0..self.text.len(),
                "attempted to close the document",
            ));
        }
        self.stack
            .pop()
            .ok_or_else(|| ParseError::structure(0..self.text.len(), "empty block stack"))
    }

    fn close_to(&mut self, index: usize) -> Result<(), ParseError> {
        while self.tip() > index {
            self.close_top()?;
        }
        Ok(())
    }

    /// Closes blocks above `container` and any leaf or list that cannot
    /// hold the new block. `item` is the list key of a new list item.
    fn prepare_parent(&mut self, container: usize, item: Option<(bool, char)>) -> Result<usize, ParseError> {
        self.close_to(container)?;
        if !self.stack[self.tip()].is_container() {
            self.close_top()?;
        }
        let tip = self.tip();
        if let BlockState::List { .. } = self.stack[tip].state {
            let joins = item.is_some_and(|(ordered, marker)| self.stack[tip].accepts_item(ordered, marker));
            if !joins {
                self.close_top()?;
            }
        }
        Ok(self.tip())
    }

    fn close_top(&mut self) -> Result<(), ParseError> {
        let block = self.pop_block()?;
        trace!("close {} at {}", block.name(), block.end);
        let kind = match block.state {
            BlockState::Paragraph { lines } => {
                let (lines, definitions_end) = self.strip_definitions(lines);
                let end = self.emit_paragraph(block.mark, &lines).or(definitions_end);
                if let Some(end) = end {
                    let parent = self.tip();
                    self.extend_end(parent, end);
                }
                return Ok(());
            }
            BlockState::Document => {
                return Err(ParseError::structure(
                    0..self.text.len(),
                    "document block below the top level",
                ));
            }
            BlockState::BlockQuote => SyntaxKind::BLOCK_QUOTE,
            BlockState::List { ordered: true, .. } => SyntaxKind::ORDERED_LIST,
            BlockState::List { ordered: false, .. } => SyntaxKind::UNORDERED_LIST,
            BlockState::ListItem => SyntaxKind::LIST_ITEM,
            BlockState::FencedCode { .. } => SyntaxKind::CODE_FENCE,
            BlockState::IndentedCode { .. } => SyntaxKind::CODE_BLOCK,
            BlockState::HtmlBlock { .. } => SyntaxKind::HTML_BLOCK,
            BlockState::Table { .. } => SyntaxKind::TABLE,
        };
        self.productions.done(block.mark, kind, block.end);
        let parent = self.tip();
        self.extend_end(parent, block.end);
        Ok(())
    }
}
