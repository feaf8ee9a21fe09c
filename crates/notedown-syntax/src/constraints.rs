//! # Constraints - the container stack of one line
//!
//! Every line of a Markdown document lives inside zero or more containers:
//! block quotes and list items. A [`Constraints`] value describes that
//! stack, outermost first:
//!
//! ```text
//! > - item          levels: [Quote, ListItem('-', indent 2)]
//! >   continued     same levels, the list item matches by indentation
//! > other           only [Quote] matches; the paragraph may continue lazily
//! ```
//!
//! Values are immutable. The block engine derives new values with
//! [`Constraints::add_modifier`] when a container opens, and matches the
//! next line against the innermost open container with
//! [`Constraints::apply_to_next_line`], which returns the matched prefix.
//! Levels are a chain of shared nodes, innermost first. Deriving a value
//! adds one node and every open block keeps a cheap handle to its own
//! stack.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use crate::scanner::{Line, LineCursor, Position};

/// What kind of container a level describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelKind {
    /// `>` block quote.
    Quote,
    /// List item, carrying the marker character (`-`, `+`, `*`, `.` or `)`).
    ListItem { marker: char },
}

/// One container level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Level {
    pub kind: LevelKind,
    /// Columns a continuation line must be indented by (list items), or the
    /// columns consumed by the `>` prefix (quotes).
    pub indent: usize,
    /// The level was confirmed explicitly on the current line (a `>` marker,
    /// or an indented non-blank line for list items).
    pub explicit: bool,
    /// GFM task list item.
    pub checkbox: bool,
}

impl Level {
    pub fn quote() -> Self {
        Self {
            kind: LevelKind::Quote,
            indent: 2,
            explicit: true,
            checkbox: false,
        }
    }

    pub fn list_item(marker: char, indent: usize) -> Self {
        Self {
            kind: LevelKind::ListItem { marker },
            indent,
            explicit: true,
            checkbox: false,
        }
    }

    fn same_container(&self, other: &Level) -> bool {
        self.kind == other.kind && self.indent == other.indent
    }
}

/// One link of a [`Constraints`] chain.
struct LevelNode {
    level: Level,
    parent: Option<Arc<LevelNode>>,
}

impl Drop for LevelNode {
    // Long chains are released iteratively.
    fn drop(&mut self) {
        let mut parent = self.parent.take();
        while let Some(node) = parent {
            match Arc::try_unwrap(node) {
                Ok(mut node) => parent = node.parent.take(),
                Err(_) => break,
            }
        }
    }
}

/// An immutable container stack.
#[derive(Clone, Default)]
pub struct Constraints {
    innermost: Option<Arc<LevelNode>>,
    len: usize,
    /// Bytes of the current line consumed by the matched levels.
    chars_eaten: usize,
}

/// Position reached after matching a number of levels.
pub type Stop = Position;

/// Result of matching a line against a [`Constraints`] value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMatch {
    /// The matched prefix of the levels, with `explicit` flags for this line.
    pub constraints: Constraints,
    /// `stops[i]` is the position after matching `i` levels.
    pub stops: Vec<Stop>,
    /// Byte ranges of `>` markers, paired with their level index.
    pub quote_markers: Vec<(usize, Range<usize>)>,
    /// Every level of the matched value was satisfied.
    pub all_matched: bool,
}

impl LineMatch {
    /// Number of levels matched.
    pub fn depth(&self) -> usize {
        self.constraints.len()
    }

    /// Position after the deepest matched level.
    pub fn stop(&self) -> Stop {
        self.stops[self.depth()]
    }

    /// Keeps only the first `depth` levels of the match.
    pub fn truncate(&mut self, depth: usize) {
        if depth >= self.depth() {
            return;
        }
        self.constraints = self.constraints.outer(depth);
        self.stops.truncate(depth + 1);
        self.quote_markers.retain(|(level, _)| *level < depth);
        self.all_matched = false;
        let start = self.stops[0].offset;
        self.constraints.chars_eaten = self.stops[depth].offset - start;
    }
}

impl Constraints {
    /// The document root: no containers.
    pub fn root() -> Self {
        Self::default()
    }

    fn from_levels(levels: &[Level], chars_eaten: usize) -> Self {
        let mut constraints = Self::root();
        for level in levels {
            constraints = constraints.add_modifier(*level);
        }
        constraints.chars_eaten = chars_eaten;
        constraints
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Levels from the innermost outwards.
    pub fn innermost_first(&self) -> impl Iterator<Item = &Level> {
        std::iter::successors(self.innermost.as_deref(), |node| node.parent.as_deref())
            .map(|node| &node.level)
    }

    /// Levels, outermost first.
    pub fn levels(&self) -> Vec<Level> {
        let mut levels: Vec<Level> = self.innermost_first().copied().collect();
        levels.reverse();
        levels
    }

    pub fn last(&self) -> Option<&Level> {
        self.innermost.as_deref().map(|node| &node.level)
    }

    pub fn chars_eaten(&self) -> usize {
        self.chars_eaten
    }

    /// The value made of the first `depth` levels.
    fn outer(&self, depth: usize) -> Constraints {
        let mut innermost = self.innermost.as_ref();
        for _ in depth..self.len {
            innermost = innermost.and_then(|node| node.parent.as_ref());
        }
        Constraints {
            innermost: innermost.cloned(),
            len: depth.min(self.len),
            chars_eaten: self.chars_eaten,
        }
    }

    /// Derives a value with one more, innermost, level.
    pub fn add_modifier(&self, level: Level) -> Constraints {
        Constraints {
            innermost: Some(Arc::new(LevelNode {
                level,
                parent: self.innermost.clone(),
            })),
            len: self.len + 1,
            chars_eaten: self.chars_eaten,
        }
    }

    /// Derives a value with the innermost level marked as a task list item.
    pub fn with_checkbox(&self) -> Constraints {
        let Some(node) = self.innermost.as_deref() else {
            return self.clone();
        };
        Constraints {
            innermost: Some(Arc::new(LevelNode {
                level: Level {
                    checkbox: true,
                    ..node.level
                },
                parent: node.parent.clone(),
            })),
            ..self.clone()
        }
    }

    /// `prev` is a prefix of `self`: the containers of `prev` are all still
    /// open in `self`.
    pub fn extends_prev(&self, prev: &Constraints) -> bool {
        if prev.len > self.len {
            return false;
        }
        let mut mine = self.outer(prev.len).innermost;
        let mut theirs = prev.innermost.clone();
        loop {
            match (mine, theirs) {
                (Some(a), Some(b)) => {
                    if Arc::ptr_eq(&a, &b) {
                        return true;
                    }
                    if !a.level.same_container(&b.level) {
                        return false;
                    }
                    mine = a.parent.clone();
                    theirs = b.parent.clone();
                }
                (None, None) => return true,
                _ => return false,
            }
        }
    }

    /// `self` is a prefix of `other`, so a block opened under `self` is still
    /// contained by a line matching `other`.
    pub fn upstream_with(&self, other: &Constraints) -> bool {
        other.extends_prev(self)
    }

    /// Matches `line` against the levels, outermost first.
    ///
    /// A quote level needs at most three columns of indentation, a `>` and
    /// takes one optional column of space after it. A list item level
    /// matches a blank remainder, or a line indented by at least the item's
    /// content column, in which case exactly that many columns are consumed,
    /// stopping inside a tab when needed. Matching stops at the first level
    /// that fails; matched levels are never altered.
    pub fn apply_to_next_line(&self, text: &str, line: Line) -> LineMatch {
        let levels = self.levels();
        let mut cursor = LineCursor::new(text, line);
        let mut matched = Vec::with_capacity(levels.len());
        let mut stops = vec![cursor.position()];
        let mut quote_markers = Vec::new();

        for (index, level) in levels.iter().enumerate() {
            let explicit = match level.kind {
                LevelKind::Quote => {
                    let (first, first_column) = cursor.first_nonspace();
                    if first_column - cursor.column > 3 || cursor.peek_at(first) != Some(b'>') {
                        break;
                    }
                    quote_markers.push((index, first..first + 1));
                    cursor.advance_bytes(first + 1 - cursor.offset);
                    cursor.advance_columns(1);
                    true
                }
                LevelKind::ListItem { .. } => {
                    if cursor.is_blank() {
                        cursor.skip_spaces();
                        false
                    } else if cursor.indent() >= level.indent {
                        cursor.advance_columns(level.indent);
                        true
                    } else {
                        break;
                    }
                }
            };
            matched.push(Level {
                explicit,
                ..*level
            });
            stops.push(cursor.position());
        }

        let all_matched = matched.len() == levels.len();
        LineMatch {
            constraints: Self::from_levels(&matched, cursor.offset - line.start),
            stops,
            quote_markers,
            all_matched,
        }
    }
}

impl PartialEq for Constraints {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len
            && self.chars_eaten == other.chars_eaten
            && self.innermost_first().eq(other.innermost_first())
    }
}

impl Eq for Constraints {}

impl fmt::Debug for Constraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constraints")
            .field("levels", &self.levels())
            .field("chars_eaten", &self.chars_eaten)
            .finish()
    }
}
