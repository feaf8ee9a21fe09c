//! Generating providers: one per node kind, looked up by the generator.
//!
//! A provider writes the HTML for a node and decides how its children are
//! rendered, so a custom table can replace any construct:
//!
//! ```
//! use notedown_html::{HtmlGenerator, HtmlProviders, RenderOptions};
//! use notedown_html::providers::GeneratingProvider;
//! use notedown_syntax::ast::{AstNode, Heading};
//! use notedown_syntax::{parse, SyntaxKind, SyntaxNode};
//!
//! struct Title;
//!
//! impl GeneratingProvider for Title {
//!     fn generate(&self, node: &SyntaxNode, html: &mut HtmlGenerator<'_>) {
//!         html.cr();
//!         html.push("<h1 class=\"title\">");
//!         if let Some(content) = Heading::cast(node.clone()).and_then(|h| h.content()) {
//!             html.generate_inner(&content, 0);
//!         }
//!         html.push("</h1>\n");
//!     }
//! }
//!
//! let text = "Title\n=====\n";
//! let tree = parse(text);
//! let providers = HtmlProviders::gfm().with(SyntaxKind::SETEXT_1, Title);
//! let options = RenderOptions::default();
//! let html = HtmlGenerator::new(text, &tree, &providers, &options).generate_html();
//! assert_eq!(html, "<h1 class=\"title\">Title</h1>\n");
//! ```

pub mod blocks;
pub mod inline;
pub mod links;
pub mod table;

use std::collections::HashMap;
use std::fmt;

use notedown_syntax::{FlavourKind, SyntaxKind, SyntaxNode};

use crate::HtmlGenerator;

/// Renders one kind of node.
pub trait GeneratingProvider: Send + Sync {
    fn generate(&self, node: &SyntaxNode, html: &mut HtmlGenerator<'_>);
}

/// Kind to provider table. Kinds without a provider render their children.
#[derive(Default)]
pub struct HtmlProviders {
    providers: HashMap<SyntaxKind, Box<dyn GeneratingProvider>>,
}

impl HtmlProviders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `provider` for `kind`, replacing any previous one.
    pub fn with(mut self, kind: SyntaxKind, provider: impl GeneratingProvider + 'static) -> Self {
        self.providers.insert(kind, Box::new(provider));
        self
    }

    pub fn get(&self, kind: SyntaxKind) -> Option<&dyn GeneratingProvider> {
        self.providers.get(&kind).map(|provider| provider.as_ref())
    }

    pub fn commonmark() -> Self {
        use blocks::{
            BlockQuote, CodeBlock, CodeFence, Document, Heading, HtmlBlock, List, ListItem, Omit,
            Paragraph,
        };
        use inline::{CodeSpan, Wrap};
        use links::{Autolink, Image, Link};
        use SyntaxKind::*;

        let mut providers = Self::new()
            .with(DOCUMENT, Document)
            .with(PARAGRAPH, Paragraph)
            .with(BLOCK_QUOTE, BlockQuote)
            .with(UNORDERED_LIST, List)
            .with(ORDERED_LIST, List)
            .with(LIST_ITEM, ListItem)
            .with(CODE_FENCE, CodeFence)
            .with(CODE_BLOCK, CodeBlock)
            .with(HTML_BLOCK, HtmlBlock)
            .with(LINK_DEFINITION, Omit)
            .with(EMPHASIS, Wrap::new("em"))
            .with(STRONG, Wrap::new("strong"))
            .with(CODE_SPAN, CodeSpan)
            .with(INLINE_LINK, Link)
            .with(FULL_REFERENCE_LINK, Link)
            .with(SHORT_REFERENCE_LINK, Link)
            .with(IMAGE, Image)
            .with(AUTOLINK, Autolink);
        for kind in [ATX_1, ATX_2, ATX_3, ATX_4, ATX_5, ATX_6, SETEXT_1, SETEXT_2] {
            providers = providers.with(kind, Heading);
        }
        providers
    }

    pub fn gfm() -> Self {
        use inline::{Math, Wrap};
        use table::Table;
        use SyntaxKind::*;

        Self::commonmark()
            .with(TABLE, Table)
            .with(STRIKETHROUGH, Wrap::new("del"))
            .with(UNDERLINE, Wrap::new("u"))
            .with(HIGHLIGHT, Wrap::new("mark"))
            .with(INLINE_MATH, Math)
            .with(BLOCK_MATH, Math)
    }

    pub fn for_flavour(kind: FlavourKind) -> Self {
        match kind {
            FlavourKind::CommonMark => Self::commonmark(),
            FlavourKind::Gfm => Self::gfm(),
        }
    }
}

impl fmt::Debug for HtmlProviders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<&SyntaxKind> = self.providers.keys().collect();
        kinds.sort();
        f.debug_struct("HtmlProviders").field("kinds", &kinds).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gfm_extends_commonmark() {
        let commonmark = HtmlProviders::commonmark();
        let gfm = HtmlProviders::gfm();
        assert!(commonmark.get(SyntaxKind::TABLE).is_none());
        assert!(gfm.get(SyntaxKind::TABLE).is_some());
        assert!(gfm.get(SyntaxKind::ATX_4).is_some());
        assert!(gfm.get(SyntaxKind::LINK_TEXT).is_none());
    }

    #[test]
    fn providers_are_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HtmlProviders>();
    }
}
