//! # Delimiter runs
//!
//! One algorithm for every emphasis-like construct: `*` and `_` emphasis,
//! `~` strikethrough, `++` underline and `==` highlight. It is CommonMark's
//! "process emphasis" procedure:
//!
//! 1. Collect delimiter runs and decide from the characters around each run
//!    whether it can open and/or close (left- and right-flanking).
//! 2. Walk closers left to right. For each, look back for the nearest active
//!    opener with the same marker, above the openers bottom for that kind of
//!    closer.
//! 3. A match consumes two characters (strong) when both runs have two left,
//!    otherwise one, and deactivates every run between the pair.
//!
//! Characters of unmatched runs stay literal.

use std::collections::HashMap;

use crate::inline::{
    InlineContext, InlineNode, ParsingResult, ParsingSpace, SequentialParser, TokensCache,
};
use crate::scanner::{is_unicode_punctuation, is_unicode_whitespace};
use crate::syntax_kind::SyntaxKind;

/// A run of identical delimiter characters in a parsing space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelimiterRun {
    pub marker: char,
    /// Position of the first character still unmatched.
    pub position: usize,
    /// Characters still unmatched.
    pub length: usize,
    pub original_length: usize,
    pub can_open: bool,
    pub can_close: bool,
    pub active: bool,
}

impl DelimiterRun {
    /// Emphasis runs that could both open and close only pair up when their
    /// lengths do not add up to a multiple of 3, unless both are multiples.
    fn pairs_with(&self, closer: &DelimiterRun) -> bool {
        match self.marker {
            '*' | '_' => {
                let odd_match = (self.can_close || closer.can_open)
                    && (self.original_length + closer.original_length) % 3 == 0
                    && !(self.original_length % 3 == 0 && closer.original_length % 3 == 0);
                !odd_match
            }
            '~' => self.length == closer.length,
            _ => true,
        }
    }
}

/// Emphasis, plus strikethrough, underline and highlight when `extended`.
pub struct Delimiters {
    extended: bool,
}

impl Delimiters {
    pub const STRIKETHROUGH_MAX: usize = 2;
    pub const PAIR_LEN: usize = 2;

    pub fn commonmark() -> Self {
        Self { extended: false }
    }

    pub fn gfm() -> Self {
        Self { extended: true }
    }

    fn marker(&self, cache: &TokensCache<'_>, index: usize) -> Option<char> {
        match cache.kind(index) {
            SyntaxKind::EMPH => cache.token_text(index).chars().next(),
            SyntaxKind::TILDE if self.extended => Some('~'),
            SyntaxKind::PLUS if self.extended => Some('+'),
            SyntaxKind::EQ if self.extended => Some('='),
            _ => None,
        }
    }

    /// Delimiter runs of `space`, in order.
    pub fn runs(&self, cache: &TokensCache<'_>, space: &ParsingSpace) -> Vec<DelimiterRun> {
        let mut runs = Vec::new();
        let mut pos = 0;
        while pos < space.len() {
            let Some(marker) = self.marker(cache, space.index(pos)) else {
                pos += 1;
                continue;
            };
            let mut end = pos + 1;
            while end < space.len()
                && space.is_contiguous(end - 1)
                && self.marker(cache, space.index(end)) == Some(marker)
            {
                end += 1;
            }
            let length = end - pos;
            let usable = match marker {
                '~' => length <= Self::STRIKETHROUGH_MAX,
                '+' | '=' => length == Self::PAIR_LEN,
                _ => true,
            };
            if usable {
                let before = cache.char_before(space.index(pos));
                let after = cache.char_after(space.index(end - 1));
                let (can_open, can_close) = flanking(marker, before, after);
                runs.push(DelimiterRun {
                    marker,
                    position: pos,
                    length,
                    original_length: length,
                    can_open,
                    can_close,
                    active: true,
                });
            }
            pos = end;
        }
        runs
    }
}

/// Whether a run between `before` and `after` can open and close.
/// The ends of the inline range count as whitespace.
fn flanking(marker: char, before: Option<char>, after: Option<char>) -> (bool, bool) {
    let before_space = before.is_none_or(is_unicode_whitespace);
    let after_space = after.is_none_or(is_unicode_whitespace);
    let before_punct = before.is_some_and(is_unicode_punctuation);
    let after_punct = after.is_some_and(is_unicode_punctuation);
    let left = !after_space && (!after_punct || before_space || before_punct);
    let right = !before_space && (!before_punct || after_space || after_punct);
    if marker == '_' {
        (left && (!right || before_punct), right && (!left || after_punct))
    } else {
        (left, right)
    }
}

fn node_kind(marker: char, used: usize) -> SyntaxKind {
    match (marker, used) {
        ('~', _) => SyntaxKind::STRIKETHROUGH,
        ('+', _) => SyntaxKind::UNDERLINE,
        ('=', _) => SyntaxKind::HIGHLIGHT,
        (_, 1) => SyntaxKind::EMPHASIS,
        _ => SyntaxKind::STRONG,
    }
}

/// The runs still on the delimiter stack, linked both ways by index.
struct RunStack {
    prev: Vec<Option<usize>>,
    next: Vec<Option<usize>>,
}

impl RunStack {
    fn new(len: usize) -> Self {
        Self {
            prev: (0..len).map(|i| i.checked_sub(1)).collect(),
            next: (0..len).map(|i| (i + 1 < len).then_some(i + 1)).collect(),
        }
    }

    fn remove(&mut self, index: usize) {
        let (prev, next) = (self.prev[index], self.next[index]);
        if let Some(prev) = prev {
            self.next[prev] = next;
        }
        if let Some(next) = next {
            self.prev[next] = prev;
        }
    }
}

/// Matches the runs against each other, returning the nodes found.
pub fn process_emphasis(
    cache: &TokensCache<'_>,
    space: &ParsingSpace,
    runs: &mut [DelimiterRun],
) -> Vec<InlineNode> {
    let mut nodes = Vec::new();
    let mut openers_bottom: HashMap<(char, bool, usize), usize> = HashMap::new();
    let mut stack = RunStack::new(runs.len());
    let mut current = (!runs.is_empty()).then_some(0);
    while let Some(closer) = current {
        let run = &runs[closer];
        if !run.can_close || run.length == 0 {
            current = stack.next[closer];
            continue;
        }
        let key = (run.marker, run.can_open, run.original_length % 3);
        let bottom = openers_bottom.get(&key).copied().unwrap_or(0);
        let mut opener = None;
        let mut candidate = stack.prev[closer];
        while let Some(index) = candidate
            && index >= bottom
        {
            let open = &runs[index];
            if open.can_open && open.length > 0 && open.marker == run.marker && open.pairs_with(run)
            {
                opener = Some(index);
                break;
            }
            candidate = stack.prev[index];
        }

        let Some(opener) = opener else {
            openers_bottom.insert(key, closer);
            current = stack.next[closer];
            if !runs[closer].can_open {
                runs[closer].active = false;
                stack.remove(closer);
            }
            continue;
        };

        let marker = runs[closer].marker;
        let used = match marker {
            '*' | '_' if runs[opener].length >= 2 && runs[closer].length >= 2 => 2,
            '*' | '_' => 1,
            _ => runs[closer].length,
        };
        let first = runs[opener].position + runs[opener].length - used;
        let last = runs[closer].position + used - 1;
        let range = cache.span(space.index(first), space.index(last));
        nodes.push(InlineNode::new(node_kind(marker, used), range));

        runs[opener].length -= used;
        runs[closer].position += used;
        runs[closer].length -= used;
        let mut between = stack.next[opener];
        while let Some(index) = between
            && index != closer
        {
            runs[index].active = false;
            between = stack.next[index];
            stack.remove(index);
        }
        if runs[opener].length == 0 {
            runs[opener].active = false;
            stack.remove(opener);
        }
        if runs[closer].length == 0 {
            runs[closer].active = false;
            current = stack.next[closer];
            stack.remove(closer);
        }
    }
    nodes
}

impl SequentialParser for Delimiters {
    fn name(&self) -> &'static str {
        "delimiters"
    }

    fn parse(
        &self,
        cache: &TokensCache<'_>,
        _ctx: &InlineContext<'_>,
        space: &ParsingSpace,
    ) -> ParsingResult {
        let mut runs = self.runs(cache, space);
        if runs.is_empty() {
            return ParsingResult::unchanged(space);
        }
        ParsingResult {
            nodes: process_emphasis(cache, space, &mut runs),
            further: vec![space.clone()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inline::test_support::{cache, run_one};
    use crate::link_map::LinkMap;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use SyntaxKind::*;

    fn gfm(text: &str) -> Vec<(SyntaxKind, &str)> {
        run_one(&Delimiters::gfm(), text, &LinkMap::new())
    }

    #[rstest]
    #[case("*foo**bar*", vec![(EMPHASIS, "*foo**bar*")])]
    #[case(
        "***strong emph***",
        vec![(EMPHASIS, "***strong emph***"), (STRONG, "**strong emph**")]
    )]
    #[case("**foo*", vec![(EMPHASIS, "*foo*")])]
    #[case("*a", vec![])]
    #[case("_foo_bar_", vec![(EMPHASIS, "_foo_bar_")])]
    #[case("foo*bar*", vec![(EMPHASIS, "*bar*")])]
    #[case("foo_bar_", vec![])]
    #[case("a * b *", vec![])]
    #[case("**a** *b*", vec![(STRONG, "**a**"), (EMPHASIS, "*b*")])]
    fn emphasis(#[case] text: &str, #[case] expected: Vec<(SyntaxKind, &str)>) {
        assert_eq!(gfm(text), expected);
    }

    #[rstest]
    #[case("~~del~~", vec![(STRIKETHROUGH, "~~del~~")])]
    #[case("~one~", vec![(STRIKETHROUGH, "~one~")])]
    #[case("~~a~", vec![])]
    #[case("~~~x~~~", vec![])]
    #[case("++under++", vec![(UNDERLINE, "++under++")])]
    #[case("==mark==", vec![(HIGHLIGHT, "==mark==")])]
    #[case("+a+", vec![])]
    fn extended(#[case] text: &str, #[case] expected: Vec<(SyntaxKind, &str)>) {
        assert_eq!(gfm(text), expected);
    }

    #[test]
    fn commonmark_has_no_strikethrough() {
        assert_eq!(
            run_one(&Delimiters::commonmark(), "~~a~~", &LinkMap::new()),
            vec![]
        );
    }

    #[rstest]
    #[case("*a ", 20_000)]
    #[case("_a_ ", 20_000)]
    #[case("**a *", 10_000)]
    fn long_runs_of_markers(#[case] unit: &str, #[case] count: usize) {
        let text = unit.repeat(count);
        let found = gfm(&text);
        let expected = if unit == "_a_ " { count } else { 0 };
        assert_eq!(found.len(), expected);
    }

    #[test]
    fn openers_between_a_pair_are_dropped() {
        assert_eq!(gfm("*a _b* c_"), vec![(EMPHASIS, "*a _b*")]);
    }

    #[test]
    fn runs_record_flanking() {
        let cache = cache("a **b** c");
        let runs = Delimiters::commonmark().runs(&cache, &ParsingSpace::full(cache.len()));
        let flags: Vec<(usize, bool, bool)> = runs
            .iter()
            .map(|run| (run.length, run.can_open, run.can_close))
            .collect();
        assert_eq!(flags, vec![(2, true, false), (2, false, true)]);
    }
}
