//! Recognisers for raw HTML and angle-bracket autolinks.
//!
//! All functions take the text starting at a `<` and return the byte length
//! of the construct when it matches.

use std::sync::OnceLock;

use regex::Regex;

const TAG_NAME: &str = r"[A-Za-z][A-Za-z0-9-]*";
const ATTRIBUTE: &str = r#"(?:[ \t\r\n]+[A-Za-z_:][A-Za-z0-9_.:-]*(?:[ \t\r\n]*=[ \t\r\n]*(?:[^ \t\r\n"'=<>`]+|'[^']*'|"[^"]*"))?)"#;

fn open_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"^<{TAG_NAME}{ATTRIBUTE}*[ \t\r\n]*/?>")).expect("Invalid open tag regex")
    })
}

fn closing_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"^</{TAG_NAME}[ \t\r\n]*>")).expect("Invalid closing tag regex")
    })
}

fn other_html_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?:<!-->|<!--->|<!--(?s:.)*?-->|<\?(?s:.)*?\?>|<![A-Za-z][^>]*>|<!\[CDATA\[(?s:.)*?\]\]>)",
        )
        .expect("Invalid HTML comment regex")
    })
}

fn uri_autolink_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^<[A-Za-z][A-Za-z0-9.+-]{1,31}:[^<>\x00-\x20]*>").expect("Invalid URI regex")
    })
}

fn email_autolink_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^<[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*>",
        )
        .expect("Invalid email regex")
    })
}

fn match_len(re: &Regex, s: &str) -> Option<usize> {
    re.find(s).map(|m| m.end())
}

/// Complete open tag (`<a href="x">`).
pub fn open_tag_len(s: &str) -> Option<usize> {
    match_len(open_tag_regex(), s)
}

/// Complete closing tag (`</a>`).
pub fn closing_tag_len(s: &str) -> Option<usize> {
    match_len(closing_tag_regex(), s)
}

/// Any inline raw HTML: tags, comments, processing instructions,
/// declarations and CDATA sections.
pub fn raw_html_len(s: &str) -> Option<usize> {
    open_tag_len(s)
        .or_else(|| closing_tag_len(s))
        .or_else(|| match_len(other_html_regex(), s))
}

/// What an angle-bracket autolink points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutolinkKind {
    Uri,
    Email,
}

/// `<scheme:...>` or `<user@host>`.
pub fn autolink_len(s: &str) -> Option<(AutolinkKind, usize)> {
    if let Some(len) = match_len(uri_autolink_regex(), s) {
        return Some((AutolinkKind::Uri, len));
    }
    match_len(email_autolink_regex(), s).map(|len| (AutolinkKind::Email, len))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("<a>", Some(3))]
    #[case(r#"<a href="x" data-y='z'>rest"#, Some(23))]
    #[case("<br/>", Some(5))]
    #[case("<33>", None)]
    #[case("<a h*#ref=\"hi\">", None)]
    fn open_tags(#[case] input: &str, #[case] expected: Option<usize>) {
        assert_eq!(open_tag_len(input), expected);
    }

    #[rstest]
    #[case("</div >", Some(7))]
    #[case("<!-- c -->x", Some(10))]
    #[case("<!-->", Some(5))]
    #[case("<?php x ?>", Some(10))]
    #[case("<!DOCTYPE html>", Some(15))]
    #[case("<![CDATA[x]]>", Some(13))]
    #[case("</a href=\"x\">", None)]
    fn raw_html(#[case] input: &str, #[case] expected: Option<usize>) {
        assert_eq!(raw_html_len(input), expected);
    }

    #[rstest]
    #[case("<http://foo.bar>", Some((AutolinkKind::Uri, 16)))]
    #[case("<foo@bar.example.com>", Some((AutolinkKind::Email, 21)))]
    #[case("<http://foo bar>", None)]
    #[case("<m:abc>", None)]
    fn autolinks(#[case] input: &str, #[case] expected: Option<(AutolinkKind, usize)>) {
        assert_eq!(autolink_len(input), expected);
    }
}
