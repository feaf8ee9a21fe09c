use std::ops::Range;

use crate::syntax_kind::SyntaxKind;

/// A finished element: a node or token kind over a byte range of the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    pub kind: SyntaxKind,
    pub range: Range<usize>,
}

/// A reserved slot in the [`ProductionHolder`].
///
/// Reserving the slot when a block opens fixes its position in the output
/// order, so an outer block whose range equals an inner one still sorts
/// before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductionMark {
    slot: usize,
    start: usize,
}

impl ProductionMark {
    /// Byte offset the mark was taken at.
    pub fn start(&self) -> usize {
        self.start
    }
}

/// Append-only list of productions.
///
/// `mark` reserves a slot, `done` fills exactly that slot and `cancel`
/// leaves it empty. Slots are never reordered or removed, so completing a
/// mark can never disturb other productions.
#[derive(Debug, Default)]
pub struct ProductionHolder {
    slots: Vec<Option<Production>>,
}

impl ProductionHolder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves a slot for a production starting at `start`.
    pub fn mark(&mut self, start: usize) -> ProductionMark {
        self.slots.push(None);
        ProductionMark {
            slot: self.slots.len() - 1,
            start,
        }
    }

    /// Completes `mark` as `kind`, spanning from the mark to `end`.
    pub fn done(&mut self, mark: ProductionMark, kind: SyntaxKind, end: usize) {
        self.done_with_range(mark, kind, mark.start..end);
    }

    /// Completes `mark` with an explicit range.
    pub fn done_with_range(&mut self, mark: ProductionMark, kind: SyntaxKind, range: Range<usize>) {
        self.slots[mark.slot] = Some(Production { kind, range });
    }

    /// Drops a reserved slot without producing anything.
    pub fn cancel(&mut self, mark: ProductionMark) {
        self.slots[mark.slot] = None;
    }

    /// Appends a finished production.
    pub fn add(&mut self, kind: SyntaxKind, range: Range<usize>) {
        self.slots.push(Some(Production { kind, range }));
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Productions in tree order: start ascending, zero-width before wider,
    /// wider before narrower, nodes before tokens, then slot order.
    pub fn into_sorted(self) -> Vec<Production> {
        let mut productions: Vec<(usize, Production)> = self
            .slots
            .into_iter()
            .enumerate()
            .filter_map(|(slot, p)| p.map(|p| (slot, p)))
            .collect();
        productions.sort_by_key(|(slot, p)| {
            (
                p.range.start,
                !p.range.is_empty(),
                std::cmp::Reverse(p.range.end),
                p.kind.is_token(),
                *slot,
            )
        });
        productions.into_iter().map(|(_, p)| p).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn done_fills_reserved_slot() {
        let mut holder = ProductionHolder::new();
        let outer = holder.mark(0);
        holder.add(SyntaxKind::QUOTE_MARKER, 0..1);
        holder.done(outer, SyntaxKind::BLOCK_QUOTE, 1);

        let sorted = holder.into_sorted();
        assert_eq!(
            sorted,
            vec![
                Production {
                    kind: SyntaxKind::BLOCK_QUOTE,
                    range: 0..1
                },
                Production {
                    kind: SyntaxKind::QUOTE_MARKER,
                    range: 0..1
                },
            ]
        );
    }

    #[test]
    fn cancelled_marks_produce_nothing() {
        let mut holder = ProductionHolder::new();
        let mark = holder.mark(4);
        holder.cancel(mark);
        assert!(holder.is_empty());
    }

    #[test]
    fn equal_ranges_keep_reservation_order() {
        let mut holder = ProductionHolder::new();
        let list = holder.mark(0);
        let item = holder.mark(0);
        holder.done(item, SyntaxKind::LIST_ITEM, 3);
        holder.done(list, SyntaxKind::UNORDERED_LIST, 3);

        let kinds: Vec<SyntaxKind> = holder.into_sorted().into_iter().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            vec![SyntaxKind::UNORDERED_LIST, SyntaxKind::LIST_ITEM]
        );
    }

    #[test]
    fn zero_width_sorts_before_token_at_same_offset() {
        let mut holder = ProductionHolder::new();
        holder.add(SyntaxKind::PIPE, 2..3);
        holder.add(SyntaxKind::CELL, 2..2);
        let kinds: Vec<SyntaxKind> = holder.into_sorted().into_iter().map(|p| p.kind).collect();
        assert_eq!(kinds, vec![SyntaxKind::CELL, SyntaxKind::PIPE]);
    }
}
