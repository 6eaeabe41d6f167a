use thiserror::Error;

/// A structural problem found while parsing.
///
/// Parsing never stops at these: the tree is always complete and lossless,
/// with the offending delimiter or tag wrapped in an `ERROR` node where that
/// helps. Callers decide whether errors are fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("section `{name}` opened at byte {offset} is never closed")]
    UnclosedSection { name: String, offset: usize },

    #[error("closing delimiter for `{name}` at byte {offset} has no matching opener")]
    UnexpectedClosing { name: String, offset: usize },

    #[error("invalid block name `{name}` at byte {offset}")]
    InvalidBlockName { name: String, offset: usize },

    #[error("malformed block delimiter at byte {offset}")]
    MalformedDelimiter { offset: usize },

    #[error("end tag `</{name}>` at byte {offset} has no matching element")]
    UnexpectedEndTag { name: String, offset: usize },

    #[error("elements nested deeper than {limit} levels at byte {offset}")]
    NestingTooDeep { limit: usize, offset: usize },
}

impl SyntaxError {
    /// Byte offset in the source where the problem starts.
    pub fn offset(&self) -> usize {
        match self {
            SyntaxError::UnclosedSection { offset, .. }
            | SyntaxError::UnexpectedClosing { offset, .. }
            | SyntaxError::InvalidBlockName { offset, .. }
            | SyntaxError::MalformedDelimiter { offset }
            | SyntaxError::UnexpectedEndTag { offset, .. }
            | SyntaxError::NestingTooDeep { offset, .. } => *offset,
        }
    }
}
