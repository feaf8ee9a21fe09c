use crate::blocks::provider::{BlockProvider, BlockStart, StartContext};
use crate::scanner::{CODE_INDENT, LineCursor};

/// Code indented by four or more columns. Cannot interrupt a paragraph.
pub struct IndentedCode;

impl BlockProvider for IndentedCode {
    fn name(&self) -> &'static str {
        "indented_code"
    }

    fn try_start(&self, cursor: &LineCursor<'_>, ctx: &StartContext<'_>) -> Option<BlockStart> {
        (cursor.indent() >= CODE_INDENT
            && !ctx.maybe_lazy
            && !ctx.interrupts_paragraph()
            && !cursor.is_blank())
        .then_some(BlockStart::IndentedCode)
    }
}
