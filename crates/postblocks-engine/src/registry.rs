//! Block types and the registry that looks them up by name.

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;

use crate::Attributes;
use crate::attributes::AttributeSpec;
use crate::attributes::matchers::MatcherSet;
use crate::error::ExtractError;

/// Everything the engine needs to know about one kind of block.
#[derive(Debug, Clone)]
pub struct BlockType {
    pub name: String,
    pub attribute_spec: Option<AttributeSpec>,
    /// Filled in over delimiter attributes, beaten by extracted ones.
    pub default_attributes: Attributes,
}

impl BlockType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attribute_spec: None,
            default_attributes: Attributes::new(),
        }
    }

    pub fn with_extractor(
        mut self,
        f: impl Fn(&str) -> Result<Attributes, ExtractError> + Send + Sync + 'static,
    ) -> Self {
        self.attribute_spec = Some(AttributeSpec::extractor(f));
        self
    }

    pub fn with_matchers(mut self, matchers: MatcherSet) -> Self {
        self.attribute_spec = Some(AttributeSpec::Matchers(matchers));
        self
    }

    pub fn with_default(mut self, key: impl Into<String>, value: Value) -> Self {
        self.default_attributes.insert(key.into(), value);
        self
    }
}

/// Name → block type lookup, the only thing the resolver needs from a registry.
pub trait BlockTypeLookup {
    fn block_type(&self, name: &str) -> Option<&BlockType>;
}

impl BlockTypeLookup for HashMap<String, BlockType> {
    fn block_type(&self, name: &str) -> Option<&BlockType> {
        self.get(name)
    }
}

impl BlockTypeLookup for BTreeMap<String, BlockType> {
    fn block_type(&self, name: &str) -> Option<&BlockType> {
        self.get(name)
    }
}

/// Registered block types plus the name of the type that handles everything
/// else (freeform text, unregistered names).
#[derive(Debug, Clone, Default)]
pub struct Registry {
    types: BTreeMap<String, BlockType>,
    unknown_type_handler: Option<String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `block_type`, returning any type it replaces.
    pub fn register(&mut self, block_type: BlockType) -> Option<BlockType> {
        self.types.insert(block_type.name.clone(), block_type)
    }

    pub fn unregister(&mut self, name: &str) -> Option<BlockType> {
        self.types.remove(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn set_unknown_type_handler(&mut self, name: impl Into<String>) {
        self.unknown_type_handler = Some(name.into());
    }

    pub fn unknown_type_handler(&self) -> Option<&str> {
        self.unknown_type_handler.as_deref()
    }

    pub fn clear_unknown_type_handler(&mut self) {
        self.unknown_type_handler = None;
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl BlockTypeLookup for Registry {
    fn block_type(&self, name: &str) -> Option<&BlockType> {
        self.types.get(name)
    }
}

impl FromIterator<BlockType> for Registry {
    fn from_iter<I: IntoIterator<Item = BlockType>>(iter: I) -> Self {
        let mut registry = Registry::new();
        for block_type in iter {
            registry.register(block_type);
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn register_and_lookup() {
        let mut registry = Registry::new();
        assert!(registry.is_empty());
        assert!(registry.register(BlockType::new("note")).is_none());
        assert_eq!(registry.block_type("note").map(|t| t.name.as_str()), Some("note"));
        assert!(registry.block_type("other").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn register_replaces_same_name() {
        let mut registry = Registry::new();
        registry.register(BlockType::new("note").with_default("v", json!(1)));
        let previous = registry
            .register(BlockType::new("note").with_default("v", json!(2)))
            .unwrap();
        assert_eq!(previous.default_attributes["v"], json!(1));
        assert_eq!(
            registry.block_type("note").unwrap().default_attributes["v"],
            json!(2)
        );
    }

    #[test]
    fn unregister_removes() {
        let mut registry: Registry = [BlockType::new("a"), BlockType::new("b")]
            .into_iter()
            .collect();
        assert!(registry.unregister("a").is_some());
        assert!(registry.unregister("a").is_none());
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["b"]);
    }

    #[test]
    fn names_are_sorted() {
        let registry: Registry = ["zeta", "alpha", "core/quote"]
            .into_iter()
            .map(BlockType::new)
            .collect();
        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            vec!["alpha", "core/quote", "zeta"]
        );
    }

    #[test]
    fn unknown_type_handler_is_optional() {
        let mut registry = Registry::new();
        assert_eq!(registry.unknown_type_handler(), None);
        registry.set_unknown_type_handler("freeform");
        assert_eq!(registry.unknown_type_handler(), Some("freeform"));
        registry.clear_unknown_type_handler();
        assert_eq!(registry.unknown_type_handler(), None);
    }

    #[test]
    fn maps_are_lookups() {
        let map = HashMap::from([("a".to_string(), BlockType::new("a"))]);
        assert!(map.block_type("a").is_some());
        let map = BTreeMap::from([("a".to_string(), BlockType::new("a"))]);
        assert!(map.block_type("b").is_none());
    }
}
