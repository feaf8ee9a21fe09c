use std::ops::Range;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;

/// Errors raised while parsing a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The block engine or tree builder met an inconsistent structure.
    #[error("malformed structure at {}..{}: {reason}", range.start, range.end)]
    Structure { range: Range<usize>, reason: String },

    /// The caller cancelled the parse.
    #[error("parse cancelled")]
    Cancelled,
}

impl ParseError {
    pub fn structure(range: Range<usize>, reason: impl Into<String>) -> Self {
        Self::Structure {
            range,
            reason: reason.into(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Cooperative cancellation flag shared between a caller and a running parse.
///
/// Cloning shares the flag. The parser polls it once per line, per composite
/// node and per inline range.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Returns [`ParseError::Cancelled`] once the token has been cancelled.
    pub fn check(&self) -> Result<(), ParseError> {
        if self.is_cancelled() {
            Err(ParseError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_starts_live() {
        let token = CancellationToken::new();
        assert!(token.check().is_ok());
    }

    #[test]
    fn clones_share_the_flag() {
        let token = CancellationToken::new();
        let other = token.clone();
        other.cancel();
        assert_eq!(token.check(), Err(ParseError::Cancelled));
    }

    #[test]
    fn structure_error_message() {
        let err = ParseError::structure(3..7, "overlap");
        assert_eq!(err.to_string(), "malformed structure at 3..7: overlap");
        assert!(!err.is_cancelled());
    }
}
