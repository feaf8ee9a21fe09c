pub mod atx_heading;
pub mod block_quote;
pub mod code_fence;
pub mod html_block;
pub mod indented_code;
pub mod link_definition;
pub mod list_item;
pub mod setext_heading;
pub mod table;
pub mod thematic_break;

pub use atx_heading::AtxHeading;
pub use block_quote::BlockQuote;
pub use code_fence::CodeFence;
pub use html_block::{HtmlBlock, HtmlBlockKind};
pub use indented_code::IndentedCode;
pub use list_item::ListItem;
pub use setext_heading::SetextHeading;
pub use table::{Table, TableRow};
pub use thematic_break::ThematicBreak;
