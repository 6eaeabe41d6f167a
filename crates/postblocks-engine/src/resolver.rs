//! Type & fallback resolution.
//!
//! Each parse node is governed by the type its declared name resolves to.
//! Freeform text and unregistered names fall back to the unknown-type
//! handler, looked up once more and never further: if the handler itself is
//! unregistered the node simply has no type.

use crate::registry::{BlockType, BlockTypeLookup};

/// Outcome of [`resolve_type`].
#[derive(Debug, Clone, Copy)]
pub struct ResolvedType<'a> {
    /// Name of the type that governs the node; `None` only when there was
    /// no declared name and no fallback configured.
    pub name: Option<&'a str>,
    pub block_type: Option<&'a BlockType>,
}

/// Pick the governing type for a node with `declared_name`.
///
/// Two attempts at most: the declared name (or the fallback when there is
/// none), then the fallback.
pub fn resolve_type<'a, L>(
    declared_name: Option<&'a str>,
    lookup: &'a L,
    fallback_name: Option<&'a str>,
) -> ResolvedType<'a>
where
    L: BlockTypeLookup + ?Sized,
{
    let name = declared_name.or(fallback_name);
    let block_type = name.and_then(|n| lookup.block_type(n));
    if block_type.is_some() {
        return ResolvedType { name, block_type };
    }

    if let Some(declared) = declared_name {
        log::debug!(
            "no block type registered for `{declared}`, falling back to {fallback_name:?}"
        );
    }
    ResolvedType {
        name: fallback_name,
        block_type: fallback_name.and_then(|n| lookup.block_type(n)),
    }
}

impl ResolvedType<'_> {
    /// Whether the node should produce no block.
    ///
    /// That is the case with no type at all, and for empty content that only
    /// reached a type through the fallback name. A section explicitly named
    /// after the fallback counts as the latter too.
    pub fn is_suppressed(&self, trimmed_content: &str, fallback_name: Option<&str>) -> bool {
        self.block_type.is_none()
            || (trimmed_content.is_empty() && self.name.is_some() && self.name == fallback_name)
    }
}
