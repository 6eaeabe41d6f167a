//! Block delimiter rules.
//!
//! A delimiter is an HTML comment whose body starts with `blk:` (or `/blk:`
//! for a closer):
//!
//! ```text
//! <!--blk:core/image {"id":7}-->     OPENING_DELIMITER
//! <!--/blk:core/image-->             CLOSING_DELIMITER
//! <!--blk:spacer {"h":20} /-->       VOID_DELIMITER
//! ```
//!
//! The lexer splits names on `-` and `/`, so the name is glued back into a
//! single BLOCK_NAME token. The attribute payload is scanned with just enough
//! JSON awareness (strings, escapes, brace depth) to find where it ends; it
//! is validated as JSON by whoever reads the tree.

use crate::error::SyntaxError;
use crate::parser::{CompletedMarker, Parser};
use crate::syntax_kind::SyntaxKind;

/// Prefix every block name carries inside a delimiter.
pub const NAME_PREFIX: &str = "blk:";

/// A delimiter found by lookahead, not yet consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peeked {
    pub closing: bool,
    pub void: bool,
    /// Declared name without the `blk:` prefix.
    pub name: String,
    /// Raw tokens spanned, as far as the delimiter is well formed.
    pub len: usize,
}

/// Look for a block delimiter at the current position without consuming it.
///
/// Plain HTML comments return `None`; anything shaped like `<!--blk:` returns
/// `Some`, even if it turns out to be malformed.
pub fn peek(p: &Parser<'_, '_>) -> Option<Peeked> {
    if !p.at(SyntaxKind::COMMENT_OPEN) {
        return None;
    }
    let mut i = 1;
    if p.nth(i) == SyntaxKind::WHITESPACE {
        i += 1;
    }
    let closing = p.nth(i) == SyntaxKind::SLASH;
    if closing {
        i += 1;
    }
    if p.nth(i) != SyntaxKind::TEXT || !p.nth_text(i).starts_with(NAME_PREFIX) {
        return None;
    }

    let n = name_len(p, i);
    let glued: String = (i..i + n).map(|k| p.nth_text(k)).collect();
    let name = glued[NAME_PREFIX.len()..].to_string();
    i += n;
    if p.nth(i) == SyntaxKind::WHITESPACE {
        i += 1;
    }

    if !closing && p.nth(i) == SyntaxKind::L_BRACE {
        match payload_len(p, i) {
            Some(n) => i += n,
            None => {
                return Some(Peeked {
                    closing,
                    void: false,
                    name,
                    len: i,
                });
            }
        }
        if p.nth(i) == SyntaxKind::WHITESPACE {
            i += 1;
        }
    }

    let void =
        !closing && p.nth(i) == SyntaxKind::SLASH && p.nth(i + 1) == SyntaxKind::COMMENT_CLOSE;
    if void {
        i += 2;
    } else if p.nth(i) == SyntaxKind::COMMENT_CLOSE {
        i += 1;
    }

    Some(Peeked {
        closing,
        void,
        name,
        len: i,
    })
}

/// Parse the delimiter described by `peeked`, which must be at the cursor.
pub fn delimiter(p: &mut Parser<'_, '_>, peeked: &Peeked) -> CompletedMarker {
    let offset = p.offset();
    let m = p.start();

    p.bump(); // <!--
    p.eat(SyntaxKind::WHITESPACE);
    if peeked.closing {
        p.bump();
    }

    if !is_valid_name(&peeked.name) {
        p.error(SyntaxError::InvalidBlockName {
            name: peeked.name.clone(),
            offset,
        });
    }
    let n = name_len(p, 0);
    p.bump_n(n, SyntaxKind::BLOCK_NAME);
    p.eat(SyntaxKind::WHITESPACE);

    if !peeked.closing
        && p.at(SyntaxKind::L_BRACE)
        && let Some(n) = payload_len(p, 0)
    {
        let attrs = p.start();
        for _ in 0..n {
            p.bump();
        }
        attrs.complete(p, SyntaxKind::ATTRIBUTES);
        p.eat(SyntaxKind::WHITESPACE);
    }

    let kind = if peeked.closing {
        SyntaxKind::CLOSING_DELIMITER
    } else if peeked.void {
        SyntaxKind::VOID_DELIMITER
    } else {
        SyntaxKind::OPENING_DELIMITER
    };

    if peeked.void {
        p.bump(); // /
        p.bump(); // -->
    } else if !p.eat(SyntaxKind::COMMENT_CLOSE) {
        p.error(SyntaxError::MalformedDelimiter { offset });
        recover(p);
    }

    m.complete(p, kind)
}

/// Wrap everything up to the end of the broken delimiter in an ERROR node.
fn recover(p: &mut Parser<'_, '_>) {
    let m = p.start();
    while !p.at_end() && !p.at(SyntaxKind::COMMENT_CLOSE) && !p.at(SyntaxKind::COMMENT_OPEN) {
        p.bump();
    }
    p.eat(SyntaxKind::COMMENT_CLOSE);
    m.complete(p, SyntaxKind::ERROR);
}

/// Number of raw tokens making up the name starting `start` tokens ahead.
///
/// A `/` belongs to the name unless it is the `/-->` of a void delimiter.
fn name_len(p: &Parser<'_, '_>, start: usize) -> usize {
    let mut k = start;
    loop {
        match p.nth(k) {
            SyntaxKind::TEXT => k += 1,
            SyntaxKind::SLASH if p.nth(k + 1) != SyntaxKind::COMMENT_CLOSE => k += 1,
            _ => break,
        }
        if k - start == u16::MAX as usize {
            break;
        }
    }
    k - start
}

/// Number of raw tokens in the `{...}` payload starting `start` tokens ahead,
/// or `None` if it is unbalanced before the delimiter ends.
fn payload_len(p: &Parser<'_, '_>, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut k = start;
    loop {
        match p.nth(k) {
            SyntaxKind::EOF => return None,
            SyntaxKind::BACKSLASH if in_string => k += 1,
            SyntaxKind::QUOTE => in_string = !in_string,
            _ if in_string => {}
            SyntaxKind::L_BRACE => depth += 1,
            SyntaxKind::R_BRACE => {
                depth -= 1;
                if depth == 0 {
                    return Some(k + 1 - start);
                }
            }
            SyntaxKind::COMMENT_CLOSE => return None,
            _ => {}
        }
        k += 1;
    }
}

/// `[a-z][a-z0-9_-]*` with an optional `namespace/` prefix of the same shape.
pub fn is_valid_name(name: &str) -> bool {
    fn valid_part(part: &str) -> bool {
        let mut chars = part.chars();
        matches!(chars.next(), Some(c) if c.is_ascii_lowercase())
            && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
    }

    let mut parts = name.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(name), None, _) => valid_part(name),
        (Some(namespace), Some(name), None) => valid_part(namespace) && valid_part(name),
        _ => false,
    }
}
