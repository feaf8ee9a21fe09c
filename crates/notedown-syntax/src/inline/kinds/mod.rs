//! # Inline Kinds
//!
//! One [`SequentialParser`](crate::inline::SequentialParser) per construct.
//! Each owns its delimiters; the pipeline order lives in
//! [`Flavour`](crate::flavour::Flavour).
//!
//! - **`Autolink`**: `<scheme:...>`, `<user@host>`, GFM bare links and raw
//!   inline HTML
//! - **`CodeSpan`**: backtick runs of equal length
//! - **`Math`**: `$...$` and `$$...$$`
//! - **`Image`**, **`InlineLink`**, **`ReferenceLink`**: the link family,
//!   sharing [`link_parts`]

pub mod autolink;
pub mod code_span;
pub mod image;
pub mod inline_link;
pub mod link_parts;
pub mod math;
pub mod reference_link;

pub use autolink::Autolink;
pub use code_span::CodeSpan;
pub use image::Image;
pub use inline_link::InlineLink;
pub use math::Math;
pub use reference_link::ReferenceLink;
