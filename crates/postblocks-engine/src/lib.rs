//! # postblocks-engine
//!
//! Turns a post document (freeform text interleaved with `<!--blk:...-->`
//! sections) into an ordered list of typed, attributed blocks.
//!
//! ```text
//! document ─→ parse nodes ─→ resolved type ─→ resolved attributes ─→ construct
//!             (nodes)        (resolver)       (attributes)           (assembler)
//! ```
//!
//! - [`nodes`] splits the document into sections and freeform spans.
//! - [`resolver`] picks each node's block type, falling back to the
//!   unknown-type handler, and decides what to suppress.
//! - [`attributes`] merges delimiter attributes, type defaults and
//!   attributes extracted from the content.
//! - [`assembler`] drives the above in document order.
//! - [`registry`] holds the block types.
//!
//! ```
//! use postblocks_engine::{BlockType, Registry, parse_blocks};
//! use postblocks_engine::attributes::matchers::{MatcherSet, attr};
//! use serde_json::json;
//!
//! let mut registry = Registry::new();
//! registry.register(
//!     BlockType::new("image")
//!         .with_default("align", json!("none"))
//!         .with_matchers(MatcherSet::from([("url".to_string(), attr("img", "src").unwrap())])),
//! );
//!
//! let doc = r#"<!--blk:image {"id":7}--><img src="cat.png"><!--/blk:image-->"#;
//! let blocks = parse_blocks(doc, &registry).unwrap();
//! assert_eq!(blocks[0].name, "image");
//! assert_eq!(json!(blocks[0].attributes), json!({"id": 7, "align": "none", "url": "cat.png"}));
//! ```

pub mod assembler;
pub mod attributes;
pub mod block;
pub mod error;
pub mod nodes;
pub mod registry;
pub mod resolver;

/// Attribute name → JSON value.
pub type Attributes = serde_json::Map<String, serde_json::Value>;

pub use assembler::{assemble, parse_blocks, try_assemble};
pub use attributes::{AttributeSpec, resolve_attributes};
pub use block::Block;
pub use error::{BlockParseError, ExtractError, GrammarError};
pub use nodes::{ParseNode, parse_nodes};
pub use registry::{BlockType, BlockTypeLookup, Registry};
pub use resolver::{ResolvedType, resolve_type};
