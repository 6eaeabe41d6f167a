use postblocks_syntax::SyntaxError;
use thiserror::Error;

/// The document's delimiter structure is broken. Fatal to the whole parse.
#[derive(Debug, Error)]
pub enum GrammarError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error("attributes of `{name}` at byte {offset} are not a JSON object: {source}")]
    InvalidAttributes {
        name: String,
        offset: usize,
        source: serde_json::Error,
    },
}

impl GrammarError {
    /// Byte offset in the document where the problem starts.
    pub fn offset(&self) -> usize {
        match self {
            GrammarError::Syntax(error) => error.offset(),
            GrammarError::InvalidAttributes { offset, .. } => *offset,
        }
    }
}

/// An extractor function or matcher rule could not process a section's content.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("cannot query section content: {0}")]
    Markup(SyntaxError),

    #[error("{0}")]
    Failed(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ExtractError {
    /// Shorthand for extractor authors reporting their own failures.
    pub fn failed(message: impl Into<String>) -> Self {
        ExtractError::Failed(message.into())
    }
}

/// Everything that can abort turning a document into blocks.
#[derive(Debug, Error)]
pub enum BlockParseError {
    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error("failed to extract attributes for `{name}`: {source}")]
    Extraction {
        name: String,
        source: ExtractError,
    },

    #[error(transparent)]
    Construction(anyhow::Error),
}
