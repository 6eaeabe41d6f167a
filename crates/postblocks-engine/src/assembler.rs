//! # Block List Assembler
//!
//! A straight map-and-filter over the parse nodes of a document:
//!
//! ```text
//! parse_nodes ─→ resolve_type ─→ suppressed? ─yes─→ (skipped)
//!                                    │ no
//!                                    ↓
//!                          resolve_attributes ─→ construct ─→ output
//! ```
//!
//! Content is trimmed before it reaches suppression and attribute
//! resolution. Output keeps document order and has no entry at all for a
//! suppressed node.

use std::convert::Infallible;

use crate::Attributes;
use crate::attributes::resolve_attributes;
use crate::block::Block;
use crate::error::BlockParseError;
use crate::nodes::parse_nodes;
use crate::registry::{BlockTypeLookup, Registry};
use crate::resolver::resolve_type;

/// Parse `document` into blocks built by a fallible `construct`.
///
/// Any grammar, extraction or construction failure aborts the whole document;
/// nothing is returned for the nodes that did succeed.
pub fn try_assemble<L, B, E, F>(
    document: &str,
    lookup: &L,
    fallback_name: Option<&str>,
    mut construct: F,
) -> Result<Vec<B>, BlockParseError>
where
    L: BlockTypeLookup + ?Sized,
    F: FnMut(String, Attributes) -> Result<B, E>,
    E: Into<anyhow::Error>,
{
    let mut blocks = Vec::new();

    for node in parse_nodes(document)? {
        let content = node.raw_content.trim();
        let resolved = resolve_type(node.declared_name.as_deref(), lookup, fallback_name);

        if resolved.is_suppressed(content, fallback_name) {
            log::debug!(
                "suppressed {} at {:?}",
                node.declared_name.as_deref().unwrap_or("freeform text"),
                node.span
            );
            continue;
        }

        // Never empty here: an unsuppressed node always has a type, and so a name
        let name = resolved.name.unwrap_or_default().to_string();
        let attributes = resolve_attributes(resolved.block_type, content, &node.delimiter_attrs)
            .map_err(|source| BlockParseError::Extraction {
                name: name.clone(),
                source,
            })?;

        let block = construct(name, attributes).map_err(|e| BlockParseError::Construction(e.into()))?;
        blocks.push(block);
    }

    Ok(blocks)
}

/// [`try_assemble`] for a `construct` that cannot fail.
pub fn assemble<L, B, F>(
    document: &str,
    lookup: &L,
    fallback_name: Option<&str>,
    mut construct: F,
) -> Result<Vec<B>, BlockParseError>
where
    L: BlockTypeLookup + ?Sized,
    F: FnMut(String, Attributes) -> B,
{
    try_assemble(document, lookup, fallback_name, |name, attributes| {
        Ok::<_, Infallible>(construct(name, attributes))
    })
}

/// Parse `document` into [`Block`]s using `registry` and its unknown-type handler.
///
/// ```
/// use postblocks_engine::{BlockType, Registry, parse_blocks};
///
/// let mut registry = Registry::new();
/// registry.register(BlockType::new("note"));
/// registry.register(BlockType::new("freeform"));
/// registry.set_unknown_type_handler("freeform");
///
/// let blocks = parse_blocks("intro <!--blk:note-->hi<!--/blk:note-->", &registry).unwrap();
/// let names: Vec<_> = blocks.iter().map(|b| b.name.as_str()).collect();
/// assert_eq!(names, ["freeform", "note"]);
/// ```
pub fn parse_blocks(document: &str, registry: &Registry) -> Result<Vec<Block>, BlockParseError> {
    assemble(
        document,
        registry,
        registry.unknown_type_handler(),
        Block::new,
    )
}
