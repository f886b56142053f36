//! Declared output schemas for structured generation.
//!
//! Serialises to the backend's OpenAPI-subset schema dialect
//! (`type`, `properties`, `items`, `required`, `propertyOrdering`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Schema node type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SchemaType {
    String,
    Object,
    Array,
}

/// A JSON schema the model's response must conform to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "type")]
    pub kind: SchemaType,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Schema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub property_ordering: Vec<String>,
}

impl Schema {
    pub fn string() -> Self {
        Self {
            kind: SchemaType::String,
            properties: BTreeMap::new(),
            items: None,
            required: Vec::new(),
            property_ordering: Vec::new(),
        }
    }

    /// Object whose listed fields are all required strings, in that order.
    pub fn object_of_strings(fields: &[&str]) -> Self {
        Self {
            kind: SchemaType::Object,
            properties: fields
                .iter()
                .map(|f| (f.to_string(), Self::string()))
                .collect(),
            items: None,
            required: fields.iter().map(|f| f.to_string()).collect(),
            property_ordering: fields.iter().map(|f| f.to_string()).collect(),
        }
    }

    pub fn array_of(items: Schema) -> Self {
        Self {
            kind: SchemaType::Array,
            properties: BTreeMap::new(),
            items: Some(Box::new(items)),
            required: Vec::new(),
            property_ordering: Vec::new(),
        }
    }
}

pub const VOCABULARY_FIELDS: &[&str] = &["word", "vietnamese", "emoji", "sentence"];
pub const STORY_FIELDS: &[&str] = &["title", "content", "vietnamese_summary"];

/// Array of flashcard objects.
pub fn vocabulary_schema() -> Schema {
    Schema::array_of(Schema::object_of_strings(VOCABULARY_FIELDS))
}

/// Single story object.
pub fn story_schema() -> Schema {
    Schema::object_of_strings(STORY_FIELDS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn vocabulary_schema_wire_shape() {
        let value = serde_json::to_value(vocabulary_schema()).unwrap();
        assert_eq!(value["type"], "ARRAY");
        assert_eq!(value["items"]["type"], "OBJECT");
        assert_eq!(value["items"]["properties"]["emoji"], json!({ "type": "STRING" }));
        assert_eq!(
            value["items"]["required"],
            json!(["word", "vietnamese", "emoji", "sentence"])
        );
    }

    #[test]
    fn story_schema_requires_all_fields() {
        let schema = story_schema();
        assert_eq!(schema.kind, SchemaType::Object);
        assert_eq!(schema.required, STORY_FIELDS);
        assert!(schema.items.is_none());
        assert_eq!(schema.properties.len(), 3);
    }

    #[test]
    fn string_schema_omits_empty_members() {
        let value = serde_json::to_value(Schema::string()).unwrap();
        assert_eq!(value, json!({ "type": "STRING" }));
    }

    #[test]
    fn property_ordering_keeps_declared_order() {
        let value = serde_json::to_value(story_schema()).unwrap();
        assert_eq!(
            value["propertyOrdering"],
            json!(["title", "content", "vietnamese_summary"])
        );
    }
}
