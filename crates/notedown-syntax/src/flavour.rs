//! Markdown flavours: which block providers and inline parsers run, and in
//! which order.
//!
//! Both flavours produce the same node model. GFM adds tables, task list
//! checkboxes, bare autolinks, math, and the strikethrough, underline and
//! highlight delimiters.

use std::fmt;

use crate::blocks::kinds::{
    AtxHeading, BlockQuote, CodeFence, HtmlBlock, IndentedCode, ListItem, SetextHeading, Table,
    ThematicBreak,
};
use crate::blocks::provider::BlockProvider;
use crate::inline::SequentialParser;
use crate::inline::delimiter::Delimiters;
use crate::inline::kinds::{Autolink, CodeSpan, Image, InlineLink, Math, ReferenceLink};
use crate::lexer::LexOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlavourKind {
    CommonMark,
    Gfm,
}

/// An immutable parser configuration, shareable between threads.
pub struct Flavour {
    kind: FlavourKind,
    block_providers: Vec<Box<dyn BlockProvider>>,
    inline_parsers: Vec<Box<dyn SequentialParser>>,
    lex_options: LexOptions,
}

impl Flavour {
    pub fn commonmark() -> Self {
        let block_providers: Vec<Box<dyn BlockProvider>> = vec![
            Box::new(BlockQuote),
            Box::new(AtxHeading),
            Box::new(CodeFence),
            Box::new(HtmlBlock),
            Box::new(SetextHeading),
            Box::new(ThematicBreak),
            Box::new(ListItem { task_lists: false }),
            Box::new(IndentedCode),
        ];
        let inline_parsers: Vec<Box<dyn SequentialParser>> = vec![
            Box::new(Autolink),
            Box::new(CodeSpan),
            Box::new(Image),
            Box::new(InlineLink),
            Box::new(ReferenceLink),
            Box::new(Delimiters::commonmark()),
        ];
        Self {
            kind: FlavourKind::CommonMark,
            block_providers,
            inline_parsers,
            lex_options: LexOptions::default(),
        }
    }

    pub fn gfm() -> Self {
        let block_providers: Vec<Box<dyn BlockProvider>> = vec![
            Box::new(BlockQuote),
            Box::new(AtxHeading),
            Box::new(CodeFence),
            Box::new(HtmlBlock),
            Box::new(SetextHeading),
            Box::new(ThematicBreak),
            Box::new(ListItem { task_lists: true }),
            Box::new(IndentedCode),
            Box::new(Table),
        ];
        let inline_parsers: Vec<Box<dyn SequentialParser>> = vec![
            Box::new(Autolink),
            Box::new(CodeSpan),
            Box::new(Math),
            Box::new(Image),
            Box::new(InlineLink),
            Box::new(ReferenceLink),
            Box::new(Delimiters::gfm()),
        ];
        Self {
            kind: FlavourKind::Gfm,
            block_providers,
            inline_parsers,
            lex_options: LexOptions { gfm_autolinks: true },
        }
    }

    pub fn from_kind(kind: FlavourKind) -> Self {
        match kind {
            FlavourKind::CommonMark => Self::commonmark(),
            FlavourKind::Gfm => Self::gfm(),
        }
    }

    /// Appends an inline parser that runs after the built-in ones.
    pub fn with_inline_parser(mut self, parser: impl SequentialParser + 'static) -> Self {
        self.inline_parsers.push(Box::new(parser));
        self
    }

    pub fn kind(&self) -> FlavourKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        match self.kind {
            FlavourKind::CommonMark => "commonmark",
            FlavourKind::Gfm => "gfm",
        }
    }

    pub fn block_providers(&self) -> &[Box<dyn BlockProvider>] {
        &self.block_providers
    }

    pub fn inline_parsers(&self) -> &[Box<dyn SequentialParser>] {
        &self.inline_parsers
    }

    pub fn lex_options(&self) -> LexOptions {
        self.lex_options
    }
}

impl Default for Flavour {
    fn default() -> Self {
        Self::gfm()
    }
}

impl fmt::Debug for Flavour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let blocks: Vec<&str> = self.block_providers.iter().map(|p| p.name()).collect();
        let inlines: Vec<&str> = self.inline_parsers.iter().map(|p| p.name()).collect();
        f.debug_struct("Flavour")
            .field("kind", &self.kind)
            .field("block_providers", &blocks)
            .field("inline_parsers", &inlines)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn inline_names(flavour: &Flavour) -> Vec<&'static str> {
        flavour.inline_parsers().iter().map(|p| p.name()).collect()
    }

    #[test]
    fn gfm_adds_math_and_tables() {
        assert_eq!(
            inline_names(&Flavour::gfm()),
            vec![
                "autolink",
                "code_span",
                "math",
                "image",
                "inline_link",
                "reference_link",
                "delimiters"
            ]
        );
        let blocks: Vec<&str> = Flavour::gfm()
            .block_providers()
            .iter()
            .map(|p| p.name())
            .collect();
        assert_eq!(blocks.last(), Some(&"table"));
        assert!(!inline_names(&Flavour::commonmark()).contains(&"math"));
    }

    #[test]
    fn flavours_are_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Flavour>();
    }

    #[test]
    fn kind_roundtrip() {
        for kind in [FlavourKind::CommonMark, FlavourKind::Gfm] {
            assert_eq!(Flavour::from_kind(kind).kind(), kind);
        }
    }
}
