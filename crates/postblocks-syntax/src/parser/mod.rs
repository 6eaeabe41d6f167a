//! # Parser
//!
//! Both grammars (post documents and HTML fragments) share one event parser.
//! Grammar rules walk the token slice, push [`Event`]s and record
//! [`SyntaxError`]s; the [`Sink`] turns the events into a green tree once the
//! rule returns. A rule never bails out: malformed delimiters and stray
//! closing tags end up in `ERROR` nodes, so [`Parse`] always carries a
//! lossless tree next to its error list.
//!
//! Nodes are opened with [`Parser::start`]. The returned [`Marker`] is
//! finished with a kind or abandoned; the HTML grammar keeps markers for
//! open elements on its own stack and completes them when an end tag,
//! an implied end or the end of input closes them.
//!
//! Lexer tokens are finer than syntax tokens where names are concerned:
//! `blk:my-note` lexes as three tokens and `/>` as two. [`Parser::bump_n`]
//! glues them back into a single `BLOCK_NAME`, `TAG_NAME` or `SLASH_R_ANGLE`.
//!
//! ```
//! use postblocks_syntax::{parse, parse_html, SyntaxKind};
//!
//! let doc = parse("<!--blk:note-->hi<!--/blk:note-->");
//! assert!(doc.errors().is_empty());
//! assert_eq!(doc.syntax().kind(), SyntaxKind::ROOT);
//!
//! let fragment = parse_html("<p>hi</p>");
//! assert_eq!(fragment.syntax().kind(), SyntaxKind::FRAGMENT);
//! ```

pub mod event;
pub mod sink;

pub(crate) mod grammar;

use rowan::GreenNode;

use crate::error::SyntaxError;
use crate::lexer::{Token, lex, lex_html};
use crate::syntax_kind::{SyntaxKind, SyntaxNode};
use event::Event;
use sink::Sink;

/// Cursor over lexer tokens that records events and errors.
///
/// Tracks the byte offset of the current token so errors can point into the
/// source text.
pub struct Parser<'t, 'input> {
    tokens: &'t [Token<'input>],
    pos: usize,
    offset: usize,
    events: Vec<Event>,
    errors: Vec<SyntaxError>,
}

impl<'t, 'input> Parser<'t, 'input> {
    pub fn new(tokens: &'t [Token<'input>]) -> Self {
        Self {
            tokens,
            pos: 0,
            offset: 0,
            events: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Run `entry` over the whole token slice and build its tree.
    pub fn parse_with(mut self, entry: fn(&mut Parser<'_, '_>)) -> Parse {
        entry(&mut self);
        Parse {
            green: Sink::new(self.tokens, self.events).finish(),
            errors: self.errors,
        }
    }

    /// Open a node at the current position.
    pub fn start(&mut self) -> Marker {
        self.events.push(Event::Placeholder);
        Marker::new(self.events.len() - 1)
    }

    fn token(&self, n: usize) -> Option<&Token<'input>> {
        self.tokens.get(self.pos + n)
    }

    /// Kind of the token `n` places ahead. `EOF` once the input runs out.
    pub fn nth(&self, n: usize) -> SyntaxKind {
        self.token(n).map_or(SyntaxKind::EOF, |t| t.kind)
    }

    /// Source text of the token `n` places ahead. Empty past the end.
    pub fn nth_text(&self, n: usize) -> &'input str {
        self.token(n).map_or("", |t| t.text)
    }

    pub fn current(&self) -> SyntaxKind {
        self.nth(0)
    }

    pub fn at(&self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Bump the current token if it has the given kind.
    pub fn eat(&mut self, kind: SyntaxKind) -> bool {
        let matched = self.at(kind);
        if matched {
            self.bump();
        }
        matched
    }

    /// Add the current token to the open node. No-op at the end of input.
    pub fn bump(&mut self) {
        let kind = self.current();
        self.bump_n(1, kind);
    }

    /// Add the next `n` lexer tokens to the open node as one token of `kind`.
    /// Does nothing if fewer than `n` remain.
    pub fn bump_n(&mut self, n: usize, kind: SyntaxKind) {
        let Some(glued) = self.tokens.get(self.pos..self.pos + n) else {
            return;
        };
        if glued.is_empty() {
            return;
        }
        self.offset += glued.iter().map(|t| t.text.len()).sum::<usize>();
        self.pos += n;
        self.events.push(Event::Token {
            kind,
            n_raw_tokens: n as u16,
        });
    }

    /// Byte offset of the current token in the source.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn error(&mut self, error: SyntaxError) {
        self.errors.push(error);
    }
}

/// An open node, created by [`Parser::start`].
///
/// Completing it gives the node its kind and closes it after everything
/// bumped since `start`. Abandoning it leaves the tokens in the parent. A
/// marker dropped without either panics, since the events would no longer
/// nest.
#[must_use = "complete or abandon the marker"]
pub struct Marker {
    pos: usize,
    settled: bool,
}

impl Marker {
    fn new(pos: usize) -> Self {
        Self {
            pos,
            settled: false,
        }
    }

    pub fn complete(mut self, p: &mut Parser<'_, '_>, kind: SyntaxKind) -> CompletedMarker {
        self.settled = true;
        let slot = &mut p.events[self.pos];
        debug_assert!(matches!(slot, Event::Placeholder));
        *slot = Event::start(kind);
        p.events.push(Event::Finish);
        CompletedMarker { pos: self.pos }
    }

    /// Drop the node. Its placeholder is popped when nothing followed it,
    /// otherwise the Sink skips it.
    pub fn abandon(mut self, p: &mut Parser<'_, '_>) {
        self.settled = true;
        if p.events.len() == self.pos + 1 {
            p.events.pop();
        }
    }
}

impl Drop for Marker {
    fn drop(&mut self) {
        if !self.settled && !std::thread::panicking() {
            panic!("marker at event {} was neither completed nor abandoned", self.pos);
        }
    }
}

/// A finished node that can still be given a parent.
#[derive(Debug, Clone, Copy)]
pub struct CompletedMarker {
    pos: usize,
}

impl CompletedMarker {
    /// Open a node that will enclose this one.
    ///
    /// The root grammar only learns that a closing delimiter is stray after
    /// parsing it as a delimiter; it then wraps it in `ERROR` this way.
    pub fn precede(self, p: &mut Parser<'_, '_>) -> Marker {
        let parent = p.start();
        if let Some(Event::Start { forward_parent, .. }) = p.events.get_mut(self.pos) {
            *forward_parent = Some(parent.pos);
        }
        parent
    }
}

/// Result of parsing: an immutable green tree and the errors found on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parse {
    green: GreenNode,
    errors: Vec<SyntaxError>,
}

impl Parse {
    /// Root node of the tree.
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    pub fn errors(&self) -> &[SyntaxError] {
        &self.errors
    }

    /// The tree if parsing was clean, otherwise the first error.
    pub fn ok(self) -> Result<SyntaxNode, SyntaxError> {
        match self.errors.into_iter().next() {
            Some(error) => Err(error),
            None => Ok(SyntaxNode::new_root(self.green)),
        }
    }
}

/// Parse a post document into a syntax tree.
pub fn parse(source: &str) -> Parse {
    let tokens = lex(source);
    Parser::new(&tokens).parse_with(grammar::root)
}

/// Parse an HTML fragment into a syntax tree.
pub fn parse_html(source: &str) -> Parse {
    let tokens = lex_html(source);
    Parser::new(&tokens).parse_with(grammar::html::fragment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_empty_input() {
        let tree = parse("").syntax();
        assert_eq!(tree.kind(), SyntaxKind::ROOT);
        assert_eq!(tree.children().count(), 0);
    }

    #[test]
    fn parse_preserves_all_text() {
        let input = "Hello <!--blk:a {\"x\":[1,{\"y\":\"}\"}]}-->, world!<!--/blk:a-->";
        assert_eq!(parse(input).syntax().text(), input);
    }

    #[test]
    fn offsets_track_bytes() {
        let tokens = lex("ab <!--");
        let mut parser = Parser::new(&tokens);
        assert_eq!(parser.offset(), 0);
        parser.bump();
        parser.bump();
        assert_eq!(parser.offset(), 3);
        assert!(parser.at(SyntaxKind::COMMENT_OPEN));
        parser.bump();
        assert!(parser.at_end());
        assert_eq!(parser.offset(), 7);
        parser.bump();
        assert_eq!(parser.current(), SyntaxKind::EOF);
    }

    #[test]
    fn parse_ok_returns_first_error() {
        let result = parse("<!--/blk:a--><!--blk:b-->").ok();
        assert_eq!(
            result.unwrap_err(),
            SyntaxError::UnexpectedClosing {
                name: "a".into(),
                offset: 0
            }
        );
    }

    #[test]
    fn bump_n_glues_tokens_and_stops_at_the_end() {
        let tokens = lex_html("<br/>");
        let mut parser = Parser::new(&tokens);
        parser.bump_n(2, SyntaxKind::L_ANGLE);
        parser.bump_n(3, SyntaxKind::SLASH_R_ANGLE);
        assert_eq!(parser.offset(), 3);
        parser.bump_n(2, SyntaxKind::SLASH_R_ANGLE);
        assert!(parser.at_end());
        assert_eq!(parser.offset(), 5);
    }

    #[test]
    fn stray_closer_is_wrapped_in_error() {
        let tree = parse("<!--/blk:a-->").syntax();
        let error = tree.first_child().unwrap();
        assert_eq!(error.kind(), SyntaxKind::ERROR);
        assert_eq!(
            error.first_child().map(|n| n.kind()),
            Some(SyntaxKind::CLOSING_DELIMITER)
        );
    }

    #[test]
    fn marker_must_be_completed() {
        let result = std::panic::catch_unwind(|| {
            let tokens = lex("test");
            let mut parser = Parser::new(&tokens);
            let _marker = parser.start();
        });
        assert!(result.is_err());
    }

    #[test]
    fn marker_can_be_abandoned() {
        let tokens = lex("test");
        let mut parser = Parser::new(&tokens);
        let marker = parser.start();
        marker.abandon(&mut parser);
    }
}
