//! # Grammar Rules
//!
//! Each function takes a `&mut Parser` and uses its methods to inspect and
//! consume tokens and to open and close nodes through markers.
//!
//! ## Module Structure
//!
//! - this module - the document grammar: freeform spans and sections
//! - [`delimiter`] - block delimiters (`<!--blk:name {...}-->` and friends)
//! - [`html`] - HTML fragments queried by attribute matchers
//!
//! ## Document Shape
//!
//! ```text
//! ROOT
//!   FREEFORM            text outside any section
//!   SECTION
//!     OPENING_DELIMITER
//!     CONTENT           raw inner text, nested delimiters are inert tokens
//!     CLOSING_DELIMITER
//!   SECTION
//!     VOID_DELIMITER    no CONTENT
//!   ERROR               closing delimiter with no opener
//! ```
//!
//! ## Error Recovery
//!
//! The tree always covers every byte. Structural problems (unclosed sections,
//! stray closers, bad names, broken payloads) are recorded as errors while the
//! parse carries on; it is up to the caller to treat them as fatal.

pub mod delimiter;
pub mod html;

use crate::error::SyntaxError;
use crate::parser::Parser;
use crate::syntax_kind::SyntaxKind;

use delimiter::Peeked;

/// Parse the root document.
pub fn root(p: &mut Parser<'_, '_>) {
    let m = p.start();

    while !p.at_end() {
        match delimiter::peek(p) {
            Some(d) if d.closing => stray_closing(p, &d),
            Some(d) => section(p, &d),
            None => freeform(p),
        }
    }

    m.complete(p, SyntaxKind::ROOT);
}

/// Text up to the next block delimiter. Plain HTML comments stay in here.
fn freeform(p: &mut Parser<'_, '_>) {
    let m = p.start();

    p.bump();
    while !p.at_end() && delimiter::peek(p).is_none() {
        p.bump();
    }

    m.complete(p, SyntaxKind::FREEFORM);
}

/// A section from its opening delimiter to the matching closer.
///
/// Same-named openers inside the content raise the depth so that the closer
/// pairs with the right opener; every nested delimiter is kept as inert
/// CONTENT tokens.
fn section(p: &mut Parser<'_, '_>, opening: &Peeked) {
    let offset = p.offset();
    let m = p.start();

    delimiter::delimiter(p, opening);

    if !opening.void {
        let content = p.start();
        let mut depth = 0usize;
        let closing = loop {
            if p.at_end() {
                break None;
            }
            match delimiter::peek(p) {
                Some(d) if d.name == opening.name && d.closing && depth == 0 => break Some(d),
                Some(d) => {
                    if d.name == opening.name {
                        if d.closing {
                            depth -= 1;
                        } else if !d.void {
                            depth += 1;
                        }
                    }
                    for _ in 0..d.len {
                        p.bump();
                    }
                }
                None => p.bump(),
            }
        };
        content.complete(p, SyntaxKind::CONTENT);

        match closing {
            Some(d) => {
                delimiter::delimiter(p, &d);
            }
            None => p.error(SyntaxError::UnclosedSection {
                name: opening.name.clone(),
                offset,
            }),
        }
    }

    m.complete(p, SyntaxKind::SECTION);
}

fn stray_closing(p: &mut Parser<'_, '_>, closing: &Peeked) {
    let offset = p.offset();
    let delimiter = delimiter::delimiter(p, closing);
    p.error(SyntaxError::UnexpectedClosing {
        name: closing.name.clone(),
        offset,
    });
    delimiter.precede(p).complete(p, SyntaxKind::ERROR);
}
