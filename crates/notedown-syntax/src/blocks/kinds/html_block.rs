//! HTML blocks.
//!
//! There are seven kinds, distinguished by how they start and end:
//!
//! | kind | starts with                                  | ends at            |
//! |------|----------------------------------------------|--------------------|
//! | 1    | `<pre`, `<script`, `<style`, `<textarea`     | matching close tag |
//! | 2    | `<!--`                                       | `-->`              |
//! | 3    | `<?`                                         | `?>`               |
//! | 4    | `<!` and a letter                            | `>`                |
//! | 5    | `<![CDATA[`                                  | `]]>`              |
//! | 6    | open or close tag of a known block element   | blank line         |
//! | 7    | any other complete tag alone on its line     | blank line         |
//!
//! Kind 7 cannot interrupt a paragraph.

use crate::blocks::provider::{BlockProvider, BlockStart, StartContext};
use crate::html;
use crate::scanner::{LineCursor, is_blank};

const RAW_TAGS: [&str; 4] = ["pre", "script", "style", "textarea"];

const BLOCK_TAGS: [&str; 62] = [
    "address",
    "article",
    "aside",
    "base",
    "basefont",
    "blockquote",
    "body",
    "caption",
    "center",
    "col",
    "colgroup",
    "dd",
    "details",
    "dialog",
    "dir",
    "div",
    "dl",
    "dt",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "frame",
    "frameset",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "head",
    "header",
    "hr",
    "html",
    "iframe",
    "legend",
    "li",
    "link",
    "main",
    "menu",
    "menuitem",
    "nav",
    "noframes",
    "ol",
    "optgroup",
    "option",
    "p",
    "param",
    "search",
    "section",
    "summary",
    "table",
    "tbody",
    "td",
    "tfoot",
    "th",
    "thead",
    "title",
    "tr",
    "track",
    "ul",
];

/// The start/end condition pair of an HTML block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HtmlBlockKind {
    Raw,
    Comment,
    ProcessingInstruction,
    Declaration,
    Cdata,
    BlockTag,
    CompleteTag,
}

impl HtmlBlockKind {
    /// Blocks of this kind end at the first blank line, which is not part
    /// of the block.
    pub fn ends_on_blank(self) -> bool {
        matches!(self, Self::BlockTag | Self::CompleteTag)
    }

    /// The line contains the end condition.
    pub fn ends(self, line: &str) -> bool {
        match self {
            Self::Raw => {
                let lower = line.to_ascii_lowercase();
                RAW_TAGS
                    .iter()
                    .any(|tag| lower.contains(&format!("</{tag}>")))
            }
            Self::Comment => line.contains("-->"),
            Self::ProcessingInstruction => line.contains("?>"),
            Self::Declaration => line.contains('>'),
            Self::Cdata => line.contains("]]>"),
            Self::BlockTag | Self::CompleteTag => false,
        }
    }
}

fn tag_name(s: &str) -> &str {
    let len = s
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'-')
        .count();
    &s[..len]
}

fn ends_tag_name(rest: &str) -> bool {
    rest.is_empty()
        || rest.starts_with([' ', '\t', '>'])
        || rest.starts_with("/>")
}

/// Start condition of kinds 1 to 6 for a line starting at `<`.
pub fn block_start_kind(s: &str) -> Option<HtmlBlockKind> {
    let after = s.strip_prefix('<')?;
    if after.starts_with("!--") {
        return Some(HtmlBlockKind::Comment);
    }
    if after.starts_with('?') {
        return Some(HtmlBlockKind::ProcessingInstruction);
    }
    if after.starts_with("![CDATA[") {
        return Some(HtmlBlockKind::Cdata);
    }
    if let Some(decl) = after.strip_prefix('!')
        && decl.starts_with(|c: char| c.is_ascii_alphabetic())
    {
        return Some(HtmlBlockKind::Declaration);
    }

    let name = tag_name(after);
    let lower = name.to_ascii_lowercase();
    if RAW_TAGS.contains(&lower.as_str()) {
        let rest = &after[name.len()..];
        if rest.is_empty() || rest.starts_with([' ', '\t', '>']) {
            return Some(HtmlBlockKind::Raw);
        }
    }

    let after = after.strip_prefix('/').unwrap_or(after);
    let name = tag_name(after);
    let lower = name.to_ascii_lowercase();
    if !name.is_empty()
        && BLOCK_TAGS.contains(&lower.as_str())
        && ends_tag_name(&after[name.len()..])
    {
        return Some(HtmlBlockKind::BlockTag);
    }
    None
}

/// Start condition of kind 7: a complete tag followed only by whitespace.
pub fn complete_tag_start(s: &str) -> Option<HtmlBlockKind> {
    let len = html::open_tag_len(s).or_else(|| html::closing_tag_len(s))?;
    let name = tag_name(s.trim_start_matches(['<', '/']));
    if RAW_TAGS.contains(&name.to_ascii_lowercase().as_str()) {
        return None;
    }
    is_blank(&s[len..]).then_some(HtmlBlockKind::CompleteTag)
}

/// HTML block provider.
pub struct HtmlBlock;

impl BlockProvider for HtmlBlock {
    fn name(&self) -> &'static str {
        "html_block"
    }

    fn try_start(&self, cursor: &LineCursor<'_>, ctx: &StartContext<'_>) -> Option<BlockStart> {
        if cursor.indent() > 3 {
            return None;
        }
        let (first, _) = cursor.first_nonspace();
        let s = &cursor.text[first..cursor.line.end];
        if !s.starts_with('<') {
            return None;
        }
        block_start_kind(s)
            .or_else(|| {
                if ctx.interrupts_paragraph() || ctx.maybe_lazy {
                    None
                } else {
                    complete_tag_start(s)
                }
            })
            .map(BlockStart::HtmlBlock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::provider::ContainerKind;
    use crate::blocks::provider::test_support::{start, start_in};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("<script type=\"x\">", Some(HtmlBlockKind::Raw))]
    #[case("<PRE>", Some(HtmlBlockKind::Raw))]
    #[case("<!-- note", Some(HtmlBlockKind::Comment))]
    #[case("<?php", Some(HtmlBlockKind::ProcessingInstruction))]
    #[case("<!DOCTYPE html>", Some(HtmlBlockKind::Declaration))]
    #[case("<![CDATA[", Some(HtmlBlockKind::Cdata))]
    #[case("<div class=\"a\">", Some(HtmlBlockKind::BlockTag))]
    #[case("</table>", Some(HtmlBlockKind::BlockTag))]
    #[case("<hr/>", Some(HtmlBlockKind::BlockTag))]
    #[case("<custom-el attr=\"1\">", Some(HtmlBlockKind::CompleteTag))]
    #[case("<span>text", None)]
    #[case("<divx>", Some(HtmlBlockKind::CompleteTag))]
    #[case("<>", None)]
    fn start_conditions(#[case] text: &str, #[case] expected: Option<HtmlBlockKind>) {
        assert_eq!(start(&HtmlBlock, text), expected.map(BlockStart::HtmlBlock));
    }

    #[test]
    fn complete_tag_cannot_interrupt_paragraph() {
        assert_eq!(
            start_in(&HtmlBlock, "a\n<span>", ContainerKind::Paragraph, &[]),
            None
        );
        assert_eq!(
            start_in(&HtmlBlock, "a\n<div>", ContainerKind::Paragraph, &[]),
            Some(BlockStart::HtmlBlock(HtmlBlockKind::BlockTag))
        );
    }

    #[rstest]
    #[case(HtmlBlockKind::Raw, "x </SCRIPT> y", true)]
    #[case(HtmlBlockKind::Raw, "</div>", false)]
    #[case(HtmlBlockKind::Comment, "end -->", true)]
    #[case(HtmlBlockKind::ProcessingInstruction, "?>", true)]
    #[case(HtmlBlockKind::Declaration, ">", true)]
    #[case(HtmlBlockKind::Cdata, "]]>", true)]
    #[case(HtmlBlockKind::BlockTag, "</div>", false)]
    fn end_conditions(#[case] kind: HtmlBlockKind, #[case] line: &str, #[case] expected: bool) {
        assert_eq!(kind.ends(line), expected);
    }
}
