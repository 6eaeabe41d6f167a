use std::collections::BTreeMap;

use postblocks_engine::attributes::matchers::{MatcherRule, MatcherSet, attr, html, text};
use postblocks_engine::{Attributes, BlockType, ExtractError};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// A block type declared in TOML.
///
/// ```toml
/// [[block_types]]
/// name = "image"
/// defaults = { align = "none" }
///
/// [block_types.attributes.url]
/// source = "attribute"
/// selector = "img"
/// attribute = "src"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockTypeConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "toml::Table::is_empty")]
    pub defaults: toml::Table,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, AttributeSource>,
}

/// Where a declared attribute is read from in the section's HTML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum AttributeSource {
    Attribute {
        #[serde(default)]
        selector: String,
        attribute: String,
    },
    Html {
        #[serde(default)]
        selector: String,
    },
    Text {
        #[serde(default)]
        selector: String,
    },
}

impl AttributeSource {
    /// Fails when the selector does not parse.
    pub fn to_matcher(&self) -> Result<MatcherRule, ExtractError> {
        match self {
            AttributeSource::Attribute {
                selector,
                attribute,
            } => attr(selector, attribute),
            AttributeSource::Html { selector } => html(selector),
            AttributeSource::Text { selector } => text(selector),
        }
    }
}

/// The body of an included file: just more block types.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct BlockTypesFile {
    #[serde(default)]
    pub block_types: Vec<BlockTypeConfig>,
}

impl BlockTypeConfig {
    /// Build the engine's block type. Declared attributes become matchers;
    /// with none declared the type has no attribute spec at all.
    pub fn to_block_type(&self) -> Result<BlockType, ConfigError> {
        if !postblocks_syntax::is_valid_name(&self.name) {
            return Err(ConfigError::InvalidBlockType {
                name: self.name.clone(),
                reason: "names are lowercase `[namespace/]name`".to_string(),
            });
        }

        let mut block_type = BlockType::new(&self.name);
        block_type.default_attributes = match serde_json::to_value(&self.defaults) {
            Ok(serde_json::Value::Object(map)) => map,
            Ok(_) => Attributes::new(),
            Err(e) => {
                return Err(ConfigError::InvalidBlockType {
                    name: self.name.clone(),
                    reason: format!("defaults are not representable as JSON: {e}"),
                });
            }
        };

        if !self.attributes.is_empty() {
            let matchers = self
                .attributes
                .iter()
                .map(|(key, source)| Ok((key.clone(), source.to_matcher()?)))
                .collect::<Result<MatcherSet, ExtractError>>()
                .map_err(|e| ConfigError::InvalidBlockType {
                    name: self.name.clone(),
                    reason: e.to_string(),
                })?;
            block_type = block_type.with_matchers(matchers);
        }

        Ok(block_type)
    }
}
