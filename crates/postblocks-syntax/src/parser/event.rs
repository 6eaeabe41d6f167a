//! # Parser Events
//!
//! Grammar rules never touch Rowan directly. They emit a flat list of events
//! that the [`Sink`](super::sink::Sink) replays into a green tree:
//!
//! ```text
//! Start(SECTION)
//!   Start(OPENING_DELIMITER)
//!     Token(COMMENT_OPEN)
//!     Token(BLOCK_NAME, n=3)   "blk:my" "-" "note" glued into one token
//!     Token(COMMENT_CLOSE)
//!   Finish
//!   Start(CONTENT) ... Finish
//!   Start(CLOSING_DELIMITER) ... Finish
//! Finish
//! ```
//!
//! Start pushes onto the Sink's node stack, Finish pops. `forward_parent`
//! lets a completed node be wrapped after the fact (see
//! [`CompletedMarker::precede`](super::CompletedMarker::precede)).

use crate::syntax_kind::SyntaxKind;

/// An event emitted by the parser during tree construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Begin a new composite node.
    ///
    /// If `forward_parent` is set it points at another `Start` that must be
    /// opened first, becoming this node's parent.
    Start {
        kind: SyntaxKind,
        forward_parent: Option<usize>,
    },

    /// Add a token to the current node, built from `n_raw_tokens` lexer
    /// tokens. Usually 1; more when names split by the lexer are glued.
    Token { kind: SyntaxKind, n_raw_tokens: u16 },

    /// Finish the current node.
    Finish,

    /// Reserved slot from `Parser::start`, replaced on completion and
    /// ignored by the Sink if the marker was abandoned.
    Placeholder,
}

impl Event {
    /// Create a start event with no forward parent.
    pub fn start(kind: SyntaxKind) -> Self {
        Event::Start {
            kind,
            forward_parent: None,
        }
    }

    /// Create a token event for a single raw token.
    pub fn token(kind: SyntaxKind) -> Self {
        Event::Token {
            kind,
            n_raw_tokens: 1,
        }
    }
}
