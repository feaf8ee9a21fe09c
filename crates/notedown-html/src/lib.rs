//! # notedown-html
//!
//! Renders a notedown syntax tree to HTML.
//!
//! ```
//! use notedown_html::{render_to_html, RenderOptions};
//!
//! let text = "# Hello\n\n[x](javascript:alert(1))\n";
//! let tree = notedown_syntax::parse(text);
//! let html = render_to_html(&tree, text, &RenderOptions::default());
//! assert_eq!(html, "<h1>Hello</h1>\n<p><a href=\"#\">x</a></p>\n");
//! ```
//!
//! The walk is driven by a table of [`providers::GeneratingProvider`]s keyed
//! by node kind. Link destinations go through one policy for every
//! construct (see [`links`]): escapes and character references are
//! resolved, relative targets may be resolved against a base URI, unsafe
//! schemes are replaced by `#`, and the result is percent-encoded.

pub mod generator;
pub mod links;
pub mod providers;
pub mod text;

use std::sync::OnceLock;

use log::debug;
use notedown_syntax::{Flavour, FlavourKind, MarkdownParser, ParseError, SyntaxNode};

pub use generator::HtmlGenerator;
pub use providers::HtmlProviders;

/// Options of one render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Selects the provider table.
    pub flavour: FlavourKind,
    /// Replace destinations with a scheme outside the allow-list by `#`.
    pub use_safe_links: bool,
    /// Resolve `#fragment` destinations against `base_uri`.
    pub absolutize_anchor_links: bool,
    /// Base for relative destinations.
    pub base_uri: Option<String>,
    /// Escape the `<` of tags such as `<script>` in raw HTML.
    pub tag_filter: bool,
}

impl RenderOptions {
    /// Defaults for `flavour`. The tag filter is a GFM feature.
    pub fn for_flavour(flavour: FlavourKind) -> Self {
        Self {
            flavour,
            use_safe_links: true,
            absolutize_anchor_links: false,
            base_uri: None,
            tag_filter: flavour == FlavourKind::Gfm,
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::for_flavour(FlavourKind::Gfm)
    }
}

fn shared_providers(flavour: FlavourKind) -> &'static HtmlProviders {
    static COMMONMARK: OnceLock<HtmlProviders> = OnceLock::new();
    static GFM: OnceLock<HtmlProviders> = OnceLock::new();
    match flavour {
        FlavourKind::CommonMark => COMMONMARK.get_or_init(HtmlProviders::commonmark),
        FlavourKind::Gfm => GFM.get_or_init(HtmlProviders::gfm),
    }
}

/// Renders `tree`, parsed from `text`, with the providers of
/// `options.flavour`.
pub fn render_to_html(tree: &SyntaxNode, text: &str, options: &RenderOptions) -> String {
    let providers = shared_providers(options.flavour);
    let html = HtmlGenerator::new(text, tree, providers, options).generate_html();
    debug!(
        "rendered {} bytes of markdown to {} bytes of html",
        text.len(),
        html.len()
    );
    html
}

/// Parses `text` with the flavour of `options` and renders it.
pub fn markdown_to_html(text: &str, options: &RenderOptions) -> Result<String, ParseError> {
    let tree = MarkdownParser::new(Flavour::from_kind(options.flavour)).parse(text)?;
    Ok(render_to_html(&tree, text, options))
}
