//! Links, images and autolinks.

use notedown_syntax::ast::{self, AstNode};
use notedown_syntax::html::{AutolinkKind, autolink_len};
use notedown_syntax::SyntaxNode;

use crate::HtmlGenerator;
use crate::generator::plain_text;
use crate::links::{LinkTarget, destination_href, resolved_href};
use crate::providers::GeneratingProvider;
use crate::text::unescape;

/// Destination and title of a link, as written. Reference links look their
/// label up in the document's definitions.
fn link_parts(link: &ast::Link, html: &HtmlGenerator<'_>) -> Option<(String, Option<String>)> {
    if let Some(destination) = link.destination() {
        return Some((destination, link.title()));
    }
    let label = link.label()?;
    let info = html.link_map().get(&label)?;
    Some((info.destination.clone(), info.title.clone()))
}

fn push_title(html: &mut HtmlGenerator<'_>, title: Option<&str>) {
    if let Some(title) = title {
        html.push(" title=\"");
        html.escape(&unescape(title));
        html.push("\"");
    }
}

pub struct Link;

impl GeneratingProvider for Link {
    fn generate(&self, node: &SyntaxNode, html: &mut HtmlGenerator<'_>) {
        let parts = ast::Link::cast(node.clone())
            .and_then(|link| link_parts(&link, html).map(|parts| (link, parts)));
        let Some((link, (destination, title))) = parts else {
            html.generate_inner(node, 0);
            return;
        };
        let href = destination_href(&destination, LinkTarget::Link, html.options());
        html.push("<a href=\"");
        html.push(&href);
        html.push("\"");
        push_title(html, title.as_deref());
        html.push(">");
        if let Some(text) = link.text() {
            html.generate_inner(&text, 1);
        }
        html.push("</a>");
    }
}

pub struct Image;

impl GeneratingProvider for Image {
    fn generate(&self, node: &SyntaxNode, html: &mut HtmlGenerator<'_>) {
        let parts = ast::Image::cast(node.clone())
            .and_then(|image| image.link())
            .and_then(|link| link_parts(&link, html));
        let Some((destination, title)) = parts else {
            html.generate_inner(node, 0);
            return;
        };
        let src = destination_href(&destination, LinkTarget::Image, html.options());
        html.push("<img src=\"");
        html.push(&src);
        html.push("\" alt=\"");
        html.escape(&plain_text(node));
        html.push("\"");
        push_title(html, title.as_deref());
        html.push(" />");
    }
}

/// `<scheme:...>`, `<user@host>` and GFM bare links.
pub struct Autolink;

impl Autolink {
    fn url(autolink: &ast::Autolink, source: &str) -> String {
        let address = autolink.address();
        let bracketed = autolink.is_bracketed();
        let is_email = if bracketed {
            matches!(autolink_len(source), Some((AutolinkKind::Email, _)))
        } else {
            crate::links::scheme(&address).is_none() && address.contains('@')
        };
        if is_email {
            format!("mailto:{address}")
        } else if !bracketed
            && address
                .get(..4)
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case("www."))
        {
            format!("http://{address}")
        } else {
            address
        }
    }
}

impl GeneratingProvider for Autolink {
    fn generate(&self, node: &SyntaxNode, html: &mut HtmlGenerator<'_>) {
        let Some(autolink) = ast::Autolink::cast(node.clone()) else {
            html.generate_inner(node, 0);
            return;
        };
        let url = Self::url(&autolink, &html.source(node));
        let href = resolved_href(&url, LinkTarget::Link, html.options());
        html.push("<a href=\"");
        html.push(&href);
        html.push("\">");
        html.escape(&autolink.address());
        html.push("</a>");
    }
}
