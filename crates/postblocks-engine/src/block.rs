use serde::{Deserialize, Serialize};

use crate::Attributes;

/// A typed, attributed unit of content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub name: String,
    pub attributes: Attributes,
}

impl Block {
    /// Default construction callback for the assembler.
    pub fn new(name: String, attributes: Attributes) -> Self {
        Self { name, attributes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_as_name_and_attributes() {
        let mut attributes = Attributes::new();
        attributes.insert("pinned".into(), json!(true));
        let block = Block::new("note".into(), attributes);
        assert_eq!(
            serde_json::to_value(&block).unwrap(),
            json!({"name": "note", "attributes": {"pinned": true}})
        );
    }
}
