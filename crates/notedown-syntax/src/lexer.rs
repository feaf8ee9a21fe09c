//! # Lexer - Tokenizing inline content
//!
//! The block engine decides *where* inline content lives (paragraphs, heading
//! text, table cells). This module turns one such byte range into a flat
//! token stream using the [Logos] lexer generator.
//!
//! [Logos]: https://docs.rs/logos
//!
//! ## The Lossless Guarantee
//!
//! Every byte of the range appears in exactly one token. Concatenating the
//! token texts gives back the source slice:
//!
//! ```
//! use notedown_syntax::lexer::{lex, LexOptions};
//!
//! let input = "*Hello*, `world`!";
//! let tokens = lex(input, 0..input.len(), &[], LexOptions::default());
//!
//! let reconstructed: String = tokens.iter().map(|t| &input[t.range.clone()]).collect();
//! assert_eq!(input, reconstructed);
//! ```
//!
//! ## Foreign tokens
//!
//! A paragraph inside a block quote spans several lines, and each
//! continuation line starts with a container prefix (`> `, list
//! indentation). Those prefixes were already produced by the block engine as
//! tokens; the lexer receives them as *foreign* tokens, copies them into the
//! stream unchanged and lexes only the segments between them. Inline parsers
//! never see foreign tokens (see [`crate::inline::TokensCache`]).
//!
//! ## Post-passes
//!
//! Logos produces context-free tokens. Two passes then add context:
//!
//! 1. **Hard line breaks**: two or more spaces, or a backslash, directly
//!    before a line ending are merged with it into `HARD_LINE_BREAK`.
//! 2. **GFM autolinks** (optional): `www.`, `http(s)://` and e-mail
//!    addresses at a word boundary become a single `GFM_AUTOLINK` token,
//!    splitting a trailing text token where punctuation is excluded.

use std::ops::Range;

use logos::Logos;

use crate::blocks::production::Production;
use crate::syntax_kind::SyntaxKind;

/// Token kinds produced by the Logos lexer.
///
/// This enum exists separately from [`SyntaxKind`] because Logos needs to
/// derive on it. Each variant maps to a corresponding `SyntaxKind` token.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Horizontal whitespace (spaces, tabs)
    #[regex(r"[ \t]+")]
    Whitespace,

    /// Line ending (LF, CRLF or CR)
    #[regex(r"\r\n|\n|\r")]
    Eol,

    /// Backslash escape of ASCII punctuation other than the backtick
    #[regex(r"\\[!-/:-@\[-_{-~]")]
    EscapedChar,

    /// Backslash-escaped backtick
    #[token("\\`")]
    EscapedBackticks,

    /// Backslash not followed by escapable punctuation
    #[token("\\")]
    Backslash,

    /// A run of backticks
    #[regex(r"`+")]
    Backtick,

    /// Emphasis delimiter, one token per character
    #[token("*")]
    #[token("_")]
    Emph,

    #[token("~")]
    Tilde,

    #[token("+")]
    Plus,

    #[token("=")]
    Eq,

    #[token("$")]
    Dollar,

    #[token("!")]
    ExclamationMark,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("<")]
    Lt,

    #[token(">")]
    Gt,

    #[token(":")]
    Colon,

    #[token("'")]
    SingleQuote,

    #[token("\"")]
    DoubleQuote,

    #[token("|")]
    Pipe,

    /// Character reference (named, decimal or hexadecimal)
    #[regex(r"&(?:#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[A-Za-z][A-Za-z0-9]{1,31});")]
    Entity,

    /// `&` that does not start a character reference
    #[token("&")]
    Ampersand,

    /// Plain text - anything not matched by other rules
    #[regex(r#"[^ \t\r\n\\`*_~+=$!\[\]()<>:'"|&]+"#)]
    Text,
}

impl TokenKind {
    /// Convert to SyntaxKind.
    pub fn to_syntax_kind(self) -> SyntaxKind {
        match self {
            TokenKind::Whitespace => SyntaxKind::WHITE_SPACE,
            TokenKind::Eol => SyntaxKind::EOL,
            TokenKind::EscapedChar => SyntaxKind::ESCAPED_CHAR,
            TokenKind::EscapedBackticks => SyntaxKind::ESCAPED_BACKTICKS,
            TokenKind::Backslash => SyntaxKind::BACKSLASH,
            TokenKind::Backtick => SyntaxKind::BACKTICK,
            TokenKind::Emph => SyntaxKind::EMPH,
            TokenKind::Tilde => SyntaxKind::TILDE,
            TokenKind::Plus => SyntaxKind::PLUS,
            TokenKind::Eq => SyntaxKind::EQ,
            TokenKind::Dollar => SyntaxKind::DOLLAR,
            TokenKind::ExclamationMark => SyntaxKind::EXCLAMATION_MARK,
            TokenKind::LBracket => SyntaxKind::LBRACKET,
            TokenKind::RBracket => SyntaxKind::RBRACKET,
            TokenKind::LParen => SyntaxKind::LPAREN,
            TokenKind::RParen => SyntaxKind::RPAREN,
            TokenKind::Lt => SyntaxKind::LT,
            TokenKind::Gt => SyntaxKind::GT,
            TokenKind::Colon => SyntaxKind::COLON,
            TokenKind::SingleQuote => SyntaxKind::SINGLE_QUOTE,
            TokenKind::DoubleQuote => SyntaxKind::DOUBLE_QUOTE,
            TokenKind::Pipe => SyntaxKind::PIPE,
            TokenKind::Entity => SyntaxKind::ENTITY,
            TokenKind::Ampersand | TokenKind::Text => SyntaxKind::TEXT,
        }
    }
}

/// A lexed token: a kind over an absolute byte range of the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub range: Range<usize>,
    /// Produced by the block engine (container prefix), hidden from inline
    /// parsers.
    pub foreign: bool,
}

impl Token {
    fn new(kind: SyntaxKind, range: Range<usize>) -> Self {
        Self {
            kind,
            range,
            foreign: false,
        }
    }
}

/// Lexer switches that depend on the flavour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LexOptions {
    /// Recognise GFM autolinks without angle brackets.
    pub gfm_autolinks: bool,
}

/// Lex `text[range]`, keeping the `foreign` productions (sorted, inside
/// `range`) as opaque tokens.
pub fn lex(
    text: &str,
    range: Range<usize>,
    foreign: &[Production],
    options: LexOptions,
) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut pos = range.start;
    for f in foreign {
        if f.range.start < pos || f.range.end > range.end {
            continue;
        }
        lex_segment(text, pos..f.range.start, &mut tokens);
        tokens.push(Token {
            kind: f.kind,
            range: f.range.clone(),
            foreign: true,
        });
        pos = f.range.end;
    }
    lex_segment(text, pos..range.end, &mut tokens);

    merge_hard_line_breaks(text, &mut tokens);
    if options.gfm_autolinks {
        mark_gfm_autolinks(text, &mut tokens);
    }
    tokens
}

fn lex_segment(text: &str, range: Range<usize>, out: &mut Vec<Token>) {
    if range.is_empty() {
        return;
    }
    let base = range.start;
    let mut lexer = TokenKind::lexer(&text[range]);
    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let kind = match result {
            Ok(token_kind) => token_kind.to_syntax_kind(),
            // Logos error means unrecognized character - treat as TEXT
            Err(()) => SyntaxKind::TEXT,
        };
        out.push(Token::new(kind, base + span.start..base + span.end));
    }
}

fn merge_hard_line_breaks(text: &str, tokens: &mut Vec<Token>) {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    for token in tokens.drain(..) {
        if token.kind == SyntaxKind::EOL
            && let Some(prev) = out.last_mut()
            && !prev.foreign
            && prev.range.end == token.range.start
        {
            let is_break = match prev.kind {
                SyntaxKind::BACKSLASH => true,
                SyntaxKind::WHITE_SPACE => text[prev.range.clone()].ends_with("  "),
                _ => false,
            };
            if is_break {
                prev.kind = SyntaxKind::HARD_LINE_BREAK;
                prev.range.end = token.range.end;
                continue;
            }
        }
        out.push(token);
    }
    *tokens = out;
}

fn mark_gfm_autolinks(text: &str, tokens: &mut Vec<Token>) {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    // a link never runs into a foreign token
    let mut segment_ends = vec![0; tokens.len()];
    let mut segment_end = tokens.last().map_or(0, |t| t.range.end);
    for (i, token) in tokens.iter().enumerate().rev() {
        if token.foreign {
            segment_end = token.range.start;
        }
        segment_ends[i] = segment_end;
    }
    // starts inside a local part that already failed fail the same way
    let mut no_email_before = 0;
    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        let at_boundary = match out.last() {
            None => true,
            Some(prev) => {
                prev.foreign
                    || matches!(
                        prev.kind,
                        SyntaxKind::WHITE_SPACE
                            | SyntaxKind::EOL
                            | SyntaxKind::HARD_LINE_BREAK
                            | SyntaxKind::EMPH
                            | SyntaxKind::TILDE
                            | SyntaxKind::LPAREN
                    )
            }
        };
        if token.kind == SyntaxKind::TEXT && !token.foreign && at_boundary {
            let start = token.range.start;
            let candidate = &text[start..segment_ends[i]];
            let len = match url_prefix(candidate) {
                Some(domain_start) => url_len(candidate, domain_start),
                None if start < no_email_before => None,
                None => {
                    let found = email_len(candidate);
                    if found.is_none() {
                        no_email_before = start + local_part_len(candidate.as_bytes());
                    }
                    found
                }
            };
            if let Some(len) = len
                && let Some(next) = split_at(text, tokens, i, start + len)
            {
                out.push(Token::new(SyntaxKind::GFM_AUTOLINK, start..start + len));
                if let Some(rest) = next.1 {
                    out.push(rest);
                }
                i = next.0;
                continue;
            }
        }
        out.push(tokens[i].clone());
        i += 1;
    }
    *tokens = out;
}

/// Finds where a link ending at `end` stops in the token list. Returns the
/// index of the first token after the link, and the remainder of a text
/// token the link ends inside.
fn split_at(
    text: &str,
    tokens: &[Token],
    from: usize,
    end: usize,
) -> Option<(usize, Option<Token>)> {
    let mut j = from;
    while j < tokens.len() && tokens[j].range.end <= end {
        j += 1;
    }
    if j == tokens.len() || tokens[j].range.start >= end {
        return Some((j, None));
    }
    let token = &tokens[j];
    if token.kind != SyntaxKind::TEXT || !text.is_char_boundary(end) {
        return None;
    }
    Some((
        j + 1,
        Some(Token::new(SyntaxKind::TEXT, end..token.range.end)),
    ))
}

/// Length of a GFM extended autolink at the start of `s`.
pub fn gfm_autolink_len(s: &str) -> Option<usize> {
    match url_prefix(s) {
        Some(domain_start) => url_len(s, domain_start),
        None => email_len(s),
    }
}

/// Where the domain starts when `s` opens with `www.` or an http scheme.
fn url_prefix(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    ["www.", "https://", "http://"].into_iter().find_map(|prefix| {
        bytes
            .get(..prefix.len())
            .filter(|head| head.eq_ignore_ascii_case(prefix.as_bytes()))
            .map(|_| if prefix == "www." { 0 } else { prefix.len() })
    })
}

fn is_local_part_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'.' | b'+' | b'-' | b'_')
}

fn local_part_len(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|&&b| is_local_part_byte(b)).count()
}

fn url_len(s: &str, domain_start: usize) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = domain_start;
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || matches!(bytes[i], b'-' | b'_' | b'.')) {
        i += 1;
    }
    if !valid_domain(&s[domain_start..i]) {
        return None;
    }
    while i < bytes.len() && !matches!(bytes[i], b' ' | b'\t' | b'\r' | b'\n' | b'<' | b'`') {
        i += 1;
    }
    let end = trim_link_end(&s[..i]);
    (end > domain_start).then_some(end)
}

fn valid_domain(domain: &str) -> bool {
    let domain = domain.trim_end_matches('.');
    let segments: Vec<&str> = domain.split('.').collect();
    if segments.len() < 2 || segments.iter().any(|s| s.is_empty()) {
        return false;
    }
    !segments[segments.len() - 2..].iter().any(|s| s.contains('_'))
}

fn trim_link_end(link: &str) -> usize {
    let mut end = link.len();
    loop {
        let current = &link[..end];
        let Some(last) = current.chars().last() else {
            return end;
        };
        match last {
            '?' | '!' | '.' | ',' | ':' | '*' | '_' | '~' | '\'' | '"' => end -= 1,
            ')' => {
                let open = current.matches('(').count();
                let close = current.matches(')').count();
                if close > open {
                    end -= 1;
                } else {
                    return end;
                }
            }
            ';' => {
                let before = &current[..current.len() - 1];
                let word = before.trim_end_matches(|c: char| c.is_ascii_alphanumeric());
                if word.ends_with('&') && word.len() < before.len() {
                    end = word.len() - 1;
                } else {
                    return end;
                }
            }
            _ => return end,
        }
    }
}

fn email_len(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = local_part_len(bytes);
    if i == 0 || bytes.get(i) != Some(&b'@') {
        return None;
    }
    i += 1;
    let domain_start = i;
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || matches!(bytes[i], b'.' | b'-' | b'_')) {
        i += 1;
    }
    let mut end = i;
    while end > domain_start && bytes[end - 1] == b'.' {
        end -= 1;
    }
    let domain = &s[domain_start..end];
    if !domain.contains('.') || domain.split('.').any(|part| part.is_empty()) {
        return None;
    }
    if matches!(bytes[end - 1], b'-' | b'_') {
        return None;
    }
    Some(end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn kinds(input: &str, options: LexOptions) -> Vec<(SyntaxKind, &str)> {
        lex(input, 0..input.len(), &[], options)
            .into_iter()
            .map(|t| (t.kind, &input[t.range]))
            .collect()
    }

    fn commonmark(input: &str) -> Vec<(SyntaxKind, &str)> {
        kinds(input, LexOptions::default())
    }

    #[test]
    fn lex_empty_input() {
        assert_eq!(commonmark(""), vec![]);
    }

    #[test]
    fn lex_plain_text_and_whitespace() {
        assert_eq!(
            commonmark("hello  world"),
            vec![
                (SyntaxKind::TEXT, "hello"),
                (SyntaxKind::WHITE_SPACE, "  "),
                (SyntaxKind::TEXT, "world"),
            ]
        );
    }

    #[test]
    fn emphasis_chars_are_single_tokens() {
        assert_eq!(
            commonmark("**a_"),
            vec![
                (SyntaxKind::EMPH, "*"),
                (SyntaxKind::EMPH, "*"),
                (SyntaxKind::TEXT, "a"),
                (SyntaxKind::EMPH, "_"),
            ]
        );
    }

    #[test]
    fn backtick_runs_are_one_token() {
        assert_eq!(
            commonmark("``a`"),
            vec![
                (SyntaxKind::BACKTICK, "``"),
                (SyntaxKind::TEXT, "a"),
                (SyntaxKind::BACKTICK, "`"),
            ]
        );
    }

    #[rstest]
    #[case(r"\*", SyntaxKind::ESCAPED_CHAR)]
    #[case(r"\`", SyntaxKind::ESCAPED_BACKTICKS)]
    #[case("&amp;", SyntaxKind::ENTITY)]
    #[case("&#x27;", SyntaxKind::ENTITY)]
    #[case("&", SyntaxKind::TEXT)]
    fn special_tokens(#[case] input: &str, #[case] expected: SyntaxKind) {
        assert_eq!(commonmark(input), vec![(expected, input)]);
    }

    #[test]
    fn backslash_before_letter_is_plain() {
        assert_eq!(
            commonmark(r"\a"),
            vec![(SyntaxKind::BACKSLASH, "\\"), (SyntaxKind::TEXT, "a")]
        );
    }

    #[test]
    fn hard_line_breaks_absorb_the_line_ending() {
        assert_eq!(
            commonmark("a  \nb\\\nc \nd"),
            vec![
                (SyntaxKind::TEXT, "a"),
                (SyntaxKind::HARD_LINE_BREAK, "  \n"),
                (SyntaxKind::TEXT, "b"),
                (SyntaxKind::HARD_LINE_BREAK, "\\\n"),
                (SyntaxKind::TEXT, "c"),
                (SyntaxKind::WHITE_SPACE, " "),
                (SyntaxKind::EOL, "\n"),
                (SyntaxKind::TEXT, "d"),
            ]
        );
    }

    #[test]
    fn foreign_tokens_split_segments() {
        let input = "a\n> b";
        let foreign = [
            Production {
                kind: SyntaxKind::QUOTE_MARKER,
                range: 2..3,
            },
            Production {
                kind: SyntaxKind::WHITE_SPACE,
                range: 3..4,
            },
        ];
        let tokens = lex(input, 0..input.len(), &foreign, LexOptions::default());
        let got: Vec<(SyntaxKind, bool)> = tokens.iter().map(|t| (t.kind, t.foreign)).collect();
        assert_eq!(
            got,
            vec![
                (SyntaxKind::TEXT, false),
                (SyntaxKind::EOL, false),
                (SyntaxKind::QUOTE_MARKER, true),
                (SyntaxKind::WHITE_SPACE, true),
                (SyntaxKind::TEXT, false),
            ]
        );
    }

    #[test]
    fn lossless_over_mixed_input() {
        let input = "a *b* [c](d \"e\") <f> &g; `h` ~i~ $j$ \\k";
        let tokens = lex(input, 0..input.len(), &[], LexOptions { gfm_autolinks: true });
        let joined: String = tokens.iter().map(|t| &input[t.range.clone()]).collect();
        assert_eq!(joined, input);
    }

    #[test]
    fn gfm_autolink_splits_trailing_punctuation() {
        let got = kinds("see www.commonmark.org.", LexOptions { gfm_autolinks: true });
        assert_eq!(
            got,
            vec![
                (SyntaxKind::TEXT, "see"),
                (SyntaxKind::WHITE_SPACE, " "),
                (SyntaxKind::GFM_AUTOLINK, "www.commonmark.org"),
                (SyntaxKind::TEXT, "."),
            ]
        );
    }

    #[rstest]
    #[case("_a_b_c x@y.z", vec!["x@y.z"])]
    #[case("*a *b c@d.e", vec!["c@d.e"])]
    #[case(&"_a".repeat(20_000), vec![])]
    fn autolinks_after_emphasis_markers(#[case] input: &str, #[case] expected: Vec<&str>) {
        let links: Vec<&str> = kinds(input, LexOptions { gfm_autolinks: true })
            .into_iter()
            .filter(|(kind, _)| *kind == SyntaxKind::GFM_AUTOLINK)
            .map(|(_, text)| text)
            .collect();
        assert_eq!(links, expected);
    }

    #[test]
    fn gfm_autolinks_are_off_for_commonmark() {
        assert_eq!(
            commonmark("www.commonmark.org"),
            vec![(SyntaxKind::TEXT, "www.commonmark.org")]
        );
    }

    #[rstest]
    #[case("www.commonmark.org/help", Some(23))]
    #[case("https://example.com/a_(b))", Some(25))]
    #[case("http://example.com?x=1&amp;", Some(22))]
    #[case("foo@bar.baz.", Some(11))]
    #[case("www.a_b.c_d", None)]
    #[case("http://localhost", None)]
    #[case("plain", None)]
    fn autolink_lengths(#[case] input: &str, #[case] expected: Option<usize>) {
        assert_eq!(gfm_autolink_len(input), expected);
    }
}
