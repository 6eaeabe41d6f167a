//! Replays parser events into a Rowan green tree.
//!
//! The only node wrapped after the fact is `ERROR` around a stray closing
//! delimiter, so forward-parent chains are at most one link long in
//! practice. Composite tokens (`BLOCK_NAME`, `TAG_NAME`, attribute names,
//! `SLASH_R_ANGLE`) are concatenated from their lexer tokens here.

use rowan::{GreenNode, GreenNodeBuilder};

use crate::lexer::Token;
use crate::parser::event::Event;
use crate::syntax_kind::SyntaxKind;

pub struct Sink<'t, 'input> {
    builder: GreenNodeBuilder<'static>,
    tokens: &'t [Token<'input>],
    cursor: usize,
    events: Vec<Event>,
}

impl<'t, 'input> Sink<'t, 'input> {
    pub fn new(tokens: &'t [Token<'input>], events: Vec<Event>) -> Self {
        Self {
            builder: GreenNodeBuilder::new(),
            tokens,
            cursor: 0,
            events,
        }
    }

    pub fn finish(mut self) -> GreenNode {
        for i in 0..self.events.len() {
            match std::mem::replace(&mut self.events[i], Event::Placeholder) {
                Event::Start {
                    kind,
                    forward_parent,
                } => self.start(kind, forward_parent),
                Event::Token { kind, n_raw_tokens } => self.token(kind, n_raw_tokens.into()),
                Event::Finish => self.builder.finish_node(),
                Event::Placeholder => {}
            }
        }
        self.builder.finish()
    }

    /// Open `kind` along with the parents chained to it, outermost first.
    /// Each parent's own `Start` is consumed so it is not opened twice.
    fn start(&mut self, kind: SyntaxKind, mut forward_parent: Option<usize>) {
        let mut kinds = vec![kind];
        while let Some(index) = forward_parent {
            forward_parent = match std::mem::replace(&mut self.events[index], Event::Placeholder) {
                Event::Start {
                    kind,
                    forward_parent,
                } => {
                    kinds.push(kind);
                    forward_parent
                }
                _ => None,
            };
        }
        for kind in kinds.into_iter().rev() {
            self.builder.start_node(kind.into());
        }
    }

    fn token(&mut self, kind: SyntaxKind, n_raw_tokens: usize) {
        let end = (self.cursor + n_raw_tokens).min(self.tokens.len());
        let glued = &self.tokens[self.cursor..end];
        self.cursor = end;
        match glued {
            [single] => self.builder.token(kind.into(), single.text),
            _ => {
                let text: String = glued.iter().map(|t| t.text).collect();
                self.builder.token(kind.into(), &text);
            }
        }
    }
}
