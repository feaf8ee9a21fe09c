//! Link destination policy: decoding, base URI resolution, the safe scheme
//! check and percent-encoding.

use crate::RenderOptions;
use crate::text::unescape;

/// Schemes kept when safe links are on.
const SAFE_SCHEMES: [&str; 9] = [
    "http", "https", "mailto", "ftp", "ftps", "tel", "irc", "ircs", "xmpp",
];

/// Data URIs an image may use when safe links are on.
const SAFE_DATA_IMAGES: [&str; 4] = [
    "data:image/png",
    "data:image/gif",
    "data:image/jpeg",
    "data:image/webp",
];

/// What a destination is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkTarget {
    Link,
    Image,
}

/// `scheme` of `scheme:...`, if the destination has one.
pub fn scheme(destination: &str) -> Option<&str> {
    let colon = destination.find(':')?;
    let candidate = &destination[..colon];
    let mut chars = candidate.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '.' | '-'));
    valid.then_some(candidate)
}

pub fn is_safe(destination: &str, target: LinkTarget) -> bool {
    let Some(scheme) = scheme(destination) else {
        return true;
    };
    if SAFE_SCHEMES.iter().any(|safe| safe.eq_ignore_ascii_case(scheme)) {
        return true;
    }
    target == LinkTarget::Image
        && SAFE_DATA_IMAGES.iter().any(|prefix| {
            destination
                .get(..prefix.len())
                .is_some_and(|start| start.eq_ignore_ascii_case(prefix))
        })
}

/// Percent-encodes everything outside the URL-safe set, keeping valid `%XX`
/// sequences. `&` and `'` are entity-escaped for use in an attribute.
pub fn encode_href(url: &str) -> String {
    let bytes = url.as_bytes();
    let mut out = String::with_capacity(url.len());
    let mut i = 0;
    while i < bytes.len() {
        let byte = bytes[i];
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'+'
            | b'!'
            | b'*'
            | b'('
            | b')'
            | b','
            | b'#'
            | b'@'
            | b'?'
            | b'='
            | b';'
            | b':'
            | b'/'
            | b'$'
            | b'~' => out.push(byte as char),
            b'%' if bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit)
                && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit) =>
            {
                out.push('%')
            }
            b'&' => out.push_str("&amp;"),
            b'\'' => out.push_str("&#x27;"),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
        i += 1;
    }
    out
}

/// Splits `uri` into (everything before the path, path, rest).
fn split_uri(uri: &str) -> (&str, &str, &str) {
    let after_scheme = scheme(uri).map_or(0, |s| s.len() + 1);
    let authority_end = if uri[after_scheme..].starts_with("//") {
        let start = after_scheme + 2;
        uri[start..]
            .find(['/', '?', '#'])
            .map_or(uri.len(), |i| start + i)
    } else {
        after_scheme
    };
    let path_end = uri[authority_end..]
        .find(['?', '#'])
        .map_or(uri.len(), |i| authority_end + i);
    (
        &uri[..authority_end],
        &uri[authority_end..path_end],
        &uri[path_end..],
    )
}

/// Removes `.` and `..` segments from an absolute path.
fn remove_dot_segments(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    let parts: Vec<&str> = path.split('/').collect();
    for (i, part) in parts.iter().enumerate() {
        let last = i + 1 == parts.len();
        match *part {
            "." => {
                if last {
                    segments.push("");
                }
            }
            ".." => {
                if segments.len() > 1 {
                    segments.pop();
                }
                if last {
                    segments.push("");
                }
            }
            _ => segments.push(part),
        }
    }
    let joined = segments.join("/");
    if joined.starts_with('/') {
        joined
    } else {
        format!("/{joined}")
    }
}

/// Resolves a relative reference against `base`.
pub fn resolve(base: &str, reference: &str) -> String {
    if scheme(reference).is_some() {
        return reference.to_string();
    }
    let (prefix, path, rest) = split_uri(base);
    if reference.starts_with("//") {
        let base_scheme = scheme(base).map_or(String::new(), |s| format!("{s}:"));
        return format!("{base_scheme}{reference}");
    }
    if reference.starts_with('#') {
        let query = rest.split('#').next().unwrap_or_default();
        return format!("{prefix}{path}{query}{reference}");
    }
    if reference.starts_with('?') {
        return format!("{prefix}{path}{reference}");
    }
    let (reference_path, reference_rest) = reference
        .find(['?', '#'])
        .map_or((reference, ""), |i| reference.split_at(i));
    let merged = if reference_path.starts_with('/') {
        reference_path.to_string()
    } else {
        let directory = path.rfind('/').map_or("/", |i| &path[..=i]);
        format!("{directory}{reference_path}")
    };
    format!("{prefix}{}{reference_rest}", remove_dot_segments(&merged))
}

/// The `href`/`src` attribute value for a destination as written in the
/// source (escapes and entity references not yet decoded).
pub fn destination_href(raw: &str, target: LinkTarget, options: &RenderOptions) -> String {
    let decoded = unescape(raw);
    resolved_href(&decoded, target, options)
}

/// Like [`destination_href`], for destinations that are already literal
/// (autolinks).
pub fn resolved_href(url: &str, target: LinkTarget, options: &RenderOptions) -> String {
    let url = match options.base_uri.as_deref() {
        Some(base) if url.starts_with('#') => {
            if options.absolutize_anchor_links {
                resolve(base, url)
            } else {
                url.to_string()
            }
        }
        Some(base) if !url.is_empty() => resolve(base, url),
        _ => url.to_string(),
    };
    if options.use_safe_links && !is_safe(&url, target) {
        return "#".to_string();
    }
    encode_href(&url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("javascript:alert(1)", LinkTarget::Link, false)]
    #[case("JAVASCRIPT:x", LinkTarget::Link, false)]
    #[case("https://example.com", LinkTarget::Link, true)]
    #[case("MAILTO:a@b.c", LinkTarget::Link, true)]
    #[case("/relative/path", LinkTarget::Link, true)]
    #[case("data:image/png;base64,xyz", LinkTarget::Image, true)]
    #[case("data:image/png;base64,xyz", LinkTarget::Link, false)]
    #[case("data:text/html,x", LinkTarget::Image, false)]
    fn safety(#[case] url: &str, #[case] target: LinkTarget, #[case] safe: bool) {
        assert_eq!(is_safe(url, target), safe);
    }

    #[rstest]
    #[case("foo%20bä", "foo%20b%C3%A4")]
    #[case(r"foo\bar", "foo%5Cbar")]
    #[case("100%", "100%25")]
    #[case("a b", "a%20b")]
    #[case("?a=1&b='2'", "?a=1&amp;b=&#x27;2&#x27;")]
    #[case("[x]", "%5Bx%5D")]
    fn encoding(#[case] url: &str, #[case] expected: &str) {
        assert_eq!(encode_href(url), expected);
    }

    #[rstest]
    #[case("https://a.com/b/c", "d", "https://a.com/b/d")]
    #[case("https://a.com/b/c", "../d", "https://a.com/d")]
    #[case("https://a.com/b/c", "./d/", "https://a.com/b/d/")]
    #[case("https://a.com/b/c", "/d?q", "https://a.com/d?q")]
    #[case("https://a.com/b/c?x#y", "#frag", "https://a.com/b/c?x#frag")]
    #[case("https://a.com/b/c", "?q", "https://a.com/b/c?q")]
    #[case("https://a.com/b/c", "//cdn.net/x", "https://cdn.net/x")]
    #[case("https://a.com", "d", "https://a.com/d")]
    #[case("https://a.com/b", "mailto:x@y.z", "mailto:x@y.z")]
    fn resolution(#[case] base: &str, #[case] reference: &str, #[case] expected: &str) {
        assert_eq!(resolve(base, reference), expected);
    }

    #[test]
    fn anchors_resolve_only_when_asked() {
        let mut options = RenderOptions {
            base_uri: Some("https://a.com/doc".to_string()),
            ..RenderOptions::default()
        };
        assert_eq!(destination_href("#top", LinkTarget::Link, &options), "#top");
        assert_eq!(
            destination_href("other", LinkTarget::Link, &options),
            "https://a.com/other"
        );
        options.absolutize_anchor_links = true;
        assert_eq!(
            destination_href("#top", LinkTarget::Link, &options),
            "https://a.com/doc#top"
        );
    }

    #[test]
    fn unsafe_links_can_be_allowed() {
        let options = RenderOptions {
            use_safe_links: false,
            ..RenderOptions::default()
        };
        assert_eq!(
            destination_href("javascript:alert(1)", LinkTarget::Link, &options),
            "javascript:alert(1)"
        );
        assert_eq!(
            destination_href("javascript:alert(1)", LinkTarget::Link, &RenderOptions::default()),
            "#"
        );
    }
}
