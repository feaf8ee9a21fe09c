//! Emphasis-like wrappers, code spans and math.

use notedown_syntax::{SyntaxKind, SyntaxNode};

use crate::HtmlGenerator;
use crate::generator::{delimiter_count, fenced_content};
use crate::providers::GeneratingProvider;

/// Wraps the content between the delimiters in `tag`.
pub struct Wrap {
    tag: &'static str,
}

impl Wrap {
    pub const fn new(tag: &'static str) -> Self {
        Self { tag }
    }
}

impl GeneratingProvider for Wrap {
    fn generate(&self, node: &SyntaxNode, html: &mut HtmlGenerator<'_>) {
        html.push(&format!("<{}>", self.tag));
        html.generate_inner(node, delimiter_count(node));
        html.push(&format!("</{}>", self.tag));
    }
}

/// Code span content: one leading and one trailing space are stripped when
/// both are present and the content is not all spaces. Inside a table cell
/// `\|` stands for the pipe itself.
pub fn code_span_text(node: &SyntaxNode) -> String {
    let mut content = fenced_content(node, '`');
    if node.ancestors().any(|n| n.kind() == SyntaxKind::CELL) {
        content = content.replace("\\|", "|");
    }
    let strip = content.len() >= 2
        && content.starts_with(' ')
        && content.ends_with(' ')
        && !content.bytes().all(|b| b == b' ');
    if strip {
        content[1..content.len() - 1].to_string()
    } else {
        content
    }
}

pub struct CodeSpan;

impl GeneratingProvider for CodeSpan {
    fn generate(&self, node: &SyntaxNode, html: &mut HtmlGenerator<'_>) {
        html.push("<code>");
        html.escape(&code_span_text(node));
        html.push("</code>");
    }
}

/// `$...$` and `$$...$$`, left for a client-side math renderer.
pub struct Math;

impl GeneratingProvider for Math {
    fn generate(&self, node: &SyntaxNode, html: &mut HtmlGenerator<'_>) {
        let class = match node.kind() {
            SyntaxKind::BLOCK_MATH => "math math-display",
            _ => "math math-inline",
        };
        html.push(&format!("<span class=\"{class}\">"));
        html.escape(&fenced_content(node, '$'));
        html.push("</span>");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notedown_syntax::parse;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("` a `", "a")]
    #[case("`  `", "  ")]
    #[case("`` ` ``", "`")]
    #[case("` `` `", "``")]
    #[case("`  a  `", " a ")]
    fn space_stripping(#[case] input: &str, #[case] expected: &str) {
        let root = parse(input);
        let span = root
            .descendants()
            .find(|node| node.kind() == SyntaxKind::CODE_SPAN)
            .expect("code span");
        assert_eq!(code_span_text(&span), expected);
    }

    #[test]
    fn escaped_pipe_in_a_cell() {
        let root = parse("| `a\\|b` |\n| - |\n| `\\|` |\n\n`c\\|d`");
        let spans: Vec<String> = root
            .descendants()
            .filter(|node| node.kind() == SyntaxKind::CODE_SPAN)
            .map(|span| code_span_text(&span))
            .collect();
        assert_eq!(spans, vec!["a|b", "|", "c\\|d"]);
    }
}
