//! # Parse Nodes
//!
//! The flat view of a document the rest of the engine works from: an ordered
//! list of structured sections and the freeform spans between them.
//!
//! ```text
//! "intro <!--blk:note {\"a\":1}-->hi<!--/blk:note--> outro"
//!
//!   ParseNode { name: None,         raw: "intro ",  attrs: {},      span: 0..6   }
//!   ParseNode { name: Some("note"), raw: "hi",      attrs: {a: 1},  span: 6..47  }
//!   ParseNode { name: None,         raw: " outro",  attrs: {},      span: 47..53 }
//! ```
//!
//! Spans include the delimiters, so concatenating them in order gives the
//! document back byte for byte. Raw content is verbatim; trimming is left to
//! the assembler.

use std::ops::Range;

use postblocks_syntax::ast::{AstNode, Document, Item, Section};
use postblocks_syntax::parse;

use crate::Attributes;
use crate::error::GrammarError;

/// One structured section or freeform span of a document.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseNode {
    /// Name from the opening delimiter, without the `blk:` prefix. `None`
    /// for freeform text.
    pub declared_name: Option<String>,
    /// Text between the delimiters, or the freeform text itself.
    pub raw_content: String,
    /// Attributes from the opening delimiter's JSON payload.
    pub delimiter_attrs: Attributes,
    /// Bytes of the document this node covers, delimiters included.
    pub span: Range<usize>,
}

impl ParseNode {
    pub fn is_freeform(&self) -> bool {
        self.declared_name.is_none()
    }
}

/// Split a document into parse nodes.
///
/// Fails on the first structural problem: unclosed or stray delimiters, bad
/// block names, broken payloads, or payloads that are not JSON objects.
pub fn parse_nodes(document: &str) -> Result<Vec<ParseNode>, GrammarError> {
    let root = parse(document).ok()?;
    let Some(document) = Document::cast(root) else {
        return Ok(Vec::new());
    };

    document
        .items()
        .filter_map(|item| match item {
            Item::Freeform(freeform) => Some(Ok(ParseNode {
                declared_name: None,
                raw_content: freeform.text(),
                delimiter_attrs: Attributes::new(),
                span: freeform.span(),
            })),
            Item::Section(section) => Some(section_node(&section)),
            // Only present alongside a syntax error, which `ok()` already returned
            Item::Error(_) => None,
        })
        .collect()
}

fn section_node(section: &Section) -> Result<ParseNode, GrammarError> {
    let span = section.span();
    let name = section.name().unwrap_or_default();

    let delimiter_attrs = match section.opening().and_then(|d| d.attributes()) {
        Some(payload) => serde_json::from_str::<Attributes>(&payload).map_err(|source| {
            GrammarError::InvalidAttributes {
                name: name.clone(),
                offset: span.start,
                source,
            }
        })?,
        None => Attributes::new(),
    };

    Ok(ParseNode {
        declared_name: Some(name),
        raw_content: section.content(),
        delimiter_attrs,
        span,
    })
}
