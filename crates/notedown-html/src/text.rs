//! Text-level helpers: HTML escaping, character references, backslash
//! escapes and the GFM tag filter.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Escapes `&`, `<`, `>` and `"`, and replaces NUL with U+FFFD.
pub fn escape(text: &str) -> Cow<'_, str> {
    if text.contains('\0') {
        let replaced = text.replace('\0', "\u{FFFD}");
        return Cow::Owned(html_escape::encode_double_quoted_attribute(&replaced).into_owned());
    }
    html_escape::encode_double_quoted_attribute(text)
}

/// Decodes one character reference (`&amp;`, `&#35;`, `&#x22;`). Unknown
/// names are returned unchanged; invalid code points become U+FFFD.
pub fn decode_entity(entity: &str) -> Cow<'_, str> {
    let Some(body) = entity
        .strip_prefix('&')
        .and_then(|rest| rest.strip_suffix(';'))
    else {
        return Cow::Borrowed(entity);
    };
    if let Some(number) = body.strip_prefix('#') {
        let code = match number.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => number.parse::<u32>().ok(),
        };
        let c = code
            .filter(|&code| code != 0)
            .and_then(char::from_u32)
            .unwrap_or('\u{FFFD}');
        return Cow::Owned(c.to_string());
    }
    if let Some(text) = combining_entity(body) {
        return Cow::Borrowed(text);
    }
    html_escape::decode_html_entities(entity)
}

/// Named references that expand to a character plus a combining mark or
/// variation selector.
fn combining_entity(name: &str) -> Option<&'static str> {
    let text = match name {
        "acE" => "\u{223E}\u{0333}",
        "bne" => "=\u{20E5}",
        "bnequiv" => "\u{2261}\u{20E5}",
        "caps" => "\u{2229}\u{FE00}",
        "cups" => "\u{222A}\u{FE00}",
        "fjlig" => "fj",
        "gesl" => "\u{22DB}\u{FE00}",
        "gvertneqq" | "gvnE" => "\u{2269}\u{FE00}",
        "lates" => "\u{2AAD}\u{FE00}",
        "lesg" => "\u{22DA}\u{FE00}",
        "lvertneqq" | "lvnE" => "\u{2268}\u{FE00}",
        "nang" => "\u{2220}\u{20D2}",
        "napE" => "\u{2A70}\u{0338}",
        "napid" => "\u{224B}\u{0338}",
        "nbump" | "NotHumpDownHump" => "\u{224E}\u{0338}",
        "nbumpe" | "NotHumpEqual" => "\u{224F}\u{0338}",
        "ncongdot" => "\u{2A6D}\u{0338}",
        "nedot" => "\u{2250}\u{0338}",
        "nesim" | "NotEqualTilde" => "\u{2242}\u{0338}",
        "ngE" | "ngeqq" | "NotGreaterFullEqual" => "\u{2267}\u{0338}",
        "ngeqslant" | "nges" | "NotGreaterSlantEqual" => "\u{2A7E}\u{0338}",
        "nGg" => "\u{22D9}\u{0338}",
        "nGt" => "\u{226B}\u{20D2}",
        "nGtv" | "NotGreaterGreater" => "\u{226B}\u{0338}",
        "nlE" | "nleqq" => "\u{2266}\u{0338}",
        "nleqslant" | "nles" | "NotLessSlantEqual" => "\u{2A7D}\u{0338}",
        "nLl" => "\u{22D8}\u{0338}",
        "nLt" => "\u{226A}\u{20D2}",
        "nLtv" | "NotLessLess" => "\u{226A}\u{0338}",
        "NotLeftTriangleBar" => "\u{29CF}\u{0338}",
        "NotNestedGreaterGreater" => "\u{2AA2}\u{0338}",
        "NotNestedLessLess" => "\u{2AA1}\u{0338}",
        "NotPrecedesEqual" | "npre" | "npreceq" => "\u{2AAF}\u{0338}",
        "NotRightTriangleBar" => "\u{29D0}\u{0338}",
        "NotSquareSubset" => "\u{228F}\u{0338}",
        "NotSquareSuperset" => "\u{2290}\u{0338}",
        "NotSubset" | "nsubset" => "\u{2282}\u{20D2}",
        "NotSucceedsEqual" | "nsce" | "nsucceq" => "\u{2AB0}\u{0338}",
        "NotSucceedsTilde" => "\u{227F}\u{0338}",
        "NotSuperset" | "nsupset" => "\u{2283}\u{20D2}",
        "nparsl" => "\u{2AFD}\u{20E5}",
        "npart" => "\u{2202}\u{0338}",
        "nrarrc" => "\u{2933}\u{0338}",
        "nrarrw" => "\u{219D}\u{0338}",
        "nsubE" | "nsubseteqq" => "\u{2AC5}\u{0338}",
        "nsupE" | "nsupseteqq" => "\u{2AC6}\u{0338}",
        "nvap" => "\u{224D}\u{20D2}",
        "nvge" => "\u{2265}\u{20D2}",
        "nvgt" => ">\u{20D2}",
        "nvle" => "\u{2264}\u{20D2}",
        "nvlt" => "<\u{20D2}",
        "nvltrie" => "\u{22B4}\u{20D2}",
        "nvrtrie" => "\u{22B5}\u{20D2}",
        "nvsim" => "\u{223C}\u{20D2}",
        "race" => "\u{223D}\u{0331}",
        "smtes" => "\u{2AAC}\u{FE00}",
        "sqcaps" => "\u{2293}\u{FE00}",
        "sqcups" => "\u{2294}\u{FE00}",
        "ThickSpace" => "\u{205F}\u{200A}",
        "varsubsetneq" | "vsubne" => "\u{228A}\u{FE00}",
        "varsubsetneqq" | "vsubnE" => "\u{2ACB}\u{FE00}",
        "varsupsetneq" | "vsupne" => "\u{228B}\u{FE00}",
        "varsupsetneqq" | "vsupnE" => "\u{2ACC}\u{FE00}",
        _ => return None,
    };
    Some(text)
}

fn escape_or_entity_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\\([!-/:-@\[-`{-~])|&(?:#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[A-Za-z][A-Za-z0-9]{1,31});")
            .expect("Invalid escape regex")
    })
}

/// Resolves backslash escapes and character references, as done for link
/// destinations, titles and code fence info strings.
pub fn unescape(text: &str) -> Cow<'_, str> {
    escape_or_entity_regex().replace_all(text, |caps: &Captures<'_>| match caps.get(1) {
        Some(escaped) => escaped.as_str().to_string(),
        None => decode_entity(&caps[0]).into_owned(),
    })
}

const FILTERED_TAGS: [&str; 9] = [
    "title",
    "textarea",
    "style",
    "xmp",
    "iframe",
    "noembed",
    "noframes",
    "script",
    "plaintext",
];

/// True when `html` starts with an open or closing tag the GFM tag filter
/// disallows.
pub fn is_filtered_tag(html: &str) -> bool {
    let Some(rest) = html.strip_prefix('<') else {
        return false;
    };
    let rest = rest.strip_prefix('/').unwrap_or(rest);
    FILTERED_TAGS.iter().any(|tag| {
        let Some(name) = rest.get(..tag.len()) else {
            return false;
        };
        if !name.eq_ignore_ascii_case(tag) {
            return false;
        }
        let after = &rest[tag.len()..];
        after.starts_with(|c: char| c.is_ascii_whitespace() || c == '>') || after.starts_with("/>")
    })
}

/// Replaces the `<` of every disallowed tag in raw HTML with `&lt;`.
pub fn filter_tags(html: &str) -> Cow<'_, str> {
    if !html.match_indices('<').any(|(i, _)| is_filtered_tag(&html[i..])) {
        return Cow::Borrowed(html);
    }
    let mut out = String::with_capacity(html.len() + 8);
    let mut last = 0;
    for (i, _) in html.match_indices('<') {
        if is_filtered_tag(&html[i..]) {
            out.push_str(&html[last..i]);
            out.push_str("&lt;");
            last = i + 1;
        }
    }
    out.push_str(&html[last..]);
    Cow::Owned(out)
}
