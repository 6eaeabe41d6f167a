//! # Attribute Resolution
//!
//! A block's final attributes come from three places, merged in ascending
//! precedence:
//!
//! ```text
//! delimiter payload  <!--blk:image {"url":"old.png","align":"left"}-->
//!        ↓ overwritten by
//! type defaults      { "align": "none", "linkTo": "none" }
//!        ↓ overwritten by
//! extracted          { "url": "new.png" }   from the section's content
//! ```
//!
//! Extraction is driven by the block type's [`AttributeSpec`]: either one
//! extractor function that sees the raw content and returns a whole map, or
//! a set of [`matchers`] each producing a single key from the parsed HTML.

pub mod cursor;
pub mod matchers;
pub mod selector;

use std::fmt;
use std::sync::Arc;

use crate::Attributes;
use crate::error::ExtractError;
use crate::registry::BlockType;
use matchers::{MatcherSet, evaluate_matchers};
use selector::Scope;

/// Function that derives a complete attribute map from raw content.
pub type ExtractorFn = dyn Fn(&str) -> Result<Attributes, ExtractError> + Send + Sync;

/// How a block type derives attributes from its content.
#[derive(Clone)]
pub enum AttributeSpec {
    Extractor(Arc<ExtractorFn>),
    Matchers(MatcherSet),
}

impl AttributeSpec {
    pub fn extractor(
        f: impl Fn(&str) -> Result<Attributes, ExtractError> + Send + Sync + 'static,
    ) -> Self {
        AttributeSpec::Extractor(Arc::new(f))
    }

    /// Attributes derived from `raw_content` alone.
    pub fn extract(&self, raw_content: &str) -> Result<Attributes, ExtractError> {
        match self {
            AttributeSpec::Extractor(extract) => extract(raw_content),
            // Don't bother parsing HTML nobody will look at
            AttributeSpec::Matchers(rules) if !rules.values().any(|r| r.is_matcher()) => {
                Ok(Attributes::new())
            }
            AttributeSpec::Matchers(rules) => evaluate_matchers(rules, &Scope::parse(raw_content)?),
        }
    }
}

impl fmt::Debug for AttributeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeSpec::Extractor(_) => f.write_str("Extractor(..)"),
            AttributeSpec::Matchers(rules) => f.debug_tuple("Matchers").field(rules).finish(),
        }
    }
}

/// Merge delimiter attributes, the type's defaults and extracted attributes.
///
/// With no block type the delimiter attributes are returned as they are.
pub fn resolve_attributes(
    block_type: Option<&BlockType>,
    raw_content: &str,
    delimiter_attrs: &Attributes,
) -> Result<Attributes, ExtractError> {
    let Some(block_type) = block_type else {
        return Ok(delimiter_attrs.clone());
    };

    let extracted = match &block_type.attribute_spec {
        Some(spec) => spec.extract(raw_content)?,
        None => Attributes::new(),
    };

    let mut resolved = delimiter_attrs.clone();
    resolved.extend(block_type.default_attributes.clone());
    resolved.extend(extracted);
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use matchers::{MatcherRule, attr};
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    fn attrs(value: Value) -> Attributes {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn no_block_type_returns_delimiter_attrs() {
        let delimiter = attrs(json!({"a": 1}));
        assert_eq!(resolve_attributes(None, "x", &delimiter).unwrap(), delimiter);
        assert_eq!(
            resolve_attributes(None, "x", &Attributes::new()).unwrap(),
            Attributes::new()
        );
    }

    #[test]
    fn extracted_beats_defaults_beat_delimiter() {
        let block_type = BlockType::new("t")
            .with_default("a", json!(1))
            .with_extractor(|_| Ok(attrs(json!({"a": 4}))));
        let resolved =
            resolve_attributes(Some(&block_type), "", &attrs(json!({"a": 2, "b": 3}))).unwrap();
        assert_eq!(resolved, attrs(json!({"a": 4, "b": 3})));
    }

    #[test]
    fn defaults_beat_delimiter() {
        let block_type = BlockType::new("t").with_default("align", json!("none"));
        let resolved = resolve_attributes(
            Some(&block_type),
            "",
            &attrs(json!({"align": "left", "id": 7})),
        )
        .unwrap();
        assert_eq!(resolved, attrs(json!({"align": "none", "id": 7})));
    }

    #[test]
    fn extractor_sees_raw_content() {
        let block_type = BlockType::new("code").with_extractor(|raw| {
            let mut out = Attributes::new();
            out.insert("content".into(), Value::String(raw.to_string()));
            Ok(out)
        });
        let resolved = resolve_attributes(Some(&block_type), "<b>x</b>", &Attributes::new());
        assert_eq!(resolved.unwrap(), attrs(json!({"content": "<b>x</b>"})));
    }

    #[test]
    fn matchers_fill_keys_they_find() {
        let block_type = BlockType::new("image").with_matchers(MatcherSet::from([
            ("url".to_string(), attr("img", "src").unwrap()),
            ("alt".to_string(), attr("img", "alt").unwrap()),
        ]));
        let resolved = resolve_attributes(
            Some(&block_type),
            r#"<img src="new.png">"#,
            &attrs(json!({"url": "old.png", "alt": "kept"})),
        )
        .unwrap();
        assert_eq!(resolved, attrs(json!({"url": "new.png", "alt": "kept"})));
    }

    #[test]
    fn only_tagged_matchers_contribute() {
        let block_type = BlockType::new("t").with_matchers(MatcherSet::from([
            ("tagged".to_string(), MatcherRule::tagged(|_| Ok(Some(json!(1))))),
            ("plain".to_string(), MatcherRule::untagged(|_| Ok(Some(json!(2))))),
        ]));
        let resolved = resolve_attributes(Some(&block_type), "", &Attributes::new()).unwrap();
        assert_eq!(resolved, attrs(json!({"tagged": 1})));
    }

    #[test]
    fn extractor_errors_propagate() {
        let block_type =
            BlockType::new("t").with_extractor(|_| Err(ExtractError::failed("bad content")));
        let err = resolve_attributes(Some(&block_type), "", &Attributes::new()).unwrap_err();
        assert!(matches!(err, ExtractError::Failed(ref m) if m == "bad content"));
    }
}
