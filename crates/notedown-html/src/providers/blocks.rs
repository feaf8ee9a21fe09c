//! Block-level providers.

use notedown_syntax::ast::{self, AstNode};
use notedown_syntax::{SyntaxKind, SyntaxNode};

use crate::HtmlGenerator;
use crate::providers::GeneratingProvider;
use crate::text::unescape;

pub struct Document;

impl GeneratingProvider for Document {
    fn generate(&self, node: &SyntaxNode, html: &mut HtmlGenerator<'_>) {
        html.generate_blocks(node);
    }
}

/// Renders nothing, for nodes such as link reference definitions.
pub struct Omit;

impl GeneratingProvider for Omit {
    fn generate(&self, _node: &SyntaxNode, _html: &mut HtmlGenerator<'_>) {}
}

pub struct Paragraph;

impl GeneratingProvider for Paragraph {
    fn generate(&self, node: &SyntaxNode, html: &mut HtmlGenerator<'_>) {
        let in_item = node
            .parent()
            .is_some_and(|parent| parent.kind() == SyntaxKind::LIST_ITEM);
        if in_item && html.in_tight_list() {
            html.generate_inner(node, 0);
            return;
        }
        html.cr();
        html.push("<p>");
        html.generate_inner(node, 0);
        html.push("</p>\n");
    }
}

pub struct Heading;

impl GeneratingProvider for Heading {
    fn generate(&self, node: &SyntaxNode, html: &mut HtmlGenerator<'_>) {
        let Some(heading) = ast::Heading::cast(node.clone()) else {
            return;
        };
        let level = heading.level();
        html.cr();
        html.push(&format!("<h{level}>"));
        if let Some(content) = heading.content() {
            html.generate_inner(&content, 0);
        }
        html.push(&format!("</h{level}>\n"));
    }
}

pub struct BlockQuote;

impl GeneratingProvider for BlockQuote {
    fn generate(&self, node: &SyntaxNode, html: &mut HtmlGenerator<'_>) {
        html.cr();
        html.push("<blockquote>\n");
        html.generate_blocks(node);
        html.cr();
        html.push("</blockquote>\n");
    }
}

/// `<ul>` or `<ol>`, with `start` when the first number is not 1.
pub struct List;

impl GeneratingProvider for List {
    fn generate(&self, node: &SyntaxNode, html: &mut HtmlGenerator<'_>) {
        let Some(list) = ast::List::cast(node.clone()) else {
            return;
        };
        let tag = if list.is_ordered() { "ol" } else { "ul" };
        html.cr();
        match list.start() {
            Some(start) if start != 1 => html.push(&format!("<ol start=\"{start}\">\n")),
            _ => html.push(&format!("<{tag}>\n")),
        }
        html.enter_list(!list.is_loose());
        html.generate_blocks(node);
        html.exit_list();
        html.push(&format!("</{tag}>\n"));
    }
}

pub struct ListItem;

impl GeneratingProvider for ListItem {
    fn generate(&self, node: &SyntaxNode, html: &mut HtmlGenerator<'_>) {
        html.cr();
        html.push("<li>");
        match ast::ListItem::cast(node.clone()).and_then(|item| item.checkbox()) {
            Some(true) => html.push("<input type=\"checkbox\" checked=\"\" disabled=\"\" /> "),
            Some(false) => html.push("<input type=\"checkbox\" disabled=\"\" /> "),
            None => {}
        }
        html.generate_blocks(node);
        html.push("</li>\n");
    }
}

/// `<pre><code>` with a `language-` class from the first word of the info
/// string.
pub struct CodeFence;

impl GeneratingProvider for CodeFence {
    fn generate(&self, node: &SyntaxNode, html: &mut HtmlGenerator<'_>) {
        let Some(fence) = ast::CodeFence::cast(node.clone()) else {
            return;
        };
        let info = fence.info().map(|info| unescape(&info).into_owned());
        let language = info
            .as_deref()
            .and_then(|info| info.split_whitespace().next());
        html.cr();
        match language {
            Some(language) => {
                html.push("<pre><code class=\"language-");
                html.escape(language);
                html.push("\">");
            }
            None => html.push("<pre><code>"),
        }
        html.escape(&fence.content());
        html.push("</code></pre>\n");
    }
}

pub struct CodeBlock;

impl GeneratingProvider for CodeBlock {
    fn generate(&self, node: &SyntaxNode, html: &mut HtmlGenerator<'_>) {
        let Some(block) = ast::CodeBlock::cast(node.clone()) else {
            return;
        };
        html.cr();
        html.push("<pre><code>");
        html.escape(&block.content());
        html.push("</code></pre>\n");
    }
}

pub struct HtmlBlock;

impl GeneratingProvider for HtmlBlock {
    fn generate(&self, node: &SyntaxNode, html: &mut HtmlGenerator<'_>) {
        let Some(block) = ast::HtmlBlock::cast(node.clone()) else {
            return;
        };
        html.cr();
        html.raw(&block.content());
        html.cr();
    }
}
