//! Parameter schemas for tools.

use serde::{Deserialize, Serialize};

/// JSON Schema describing a tool's arguments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolParameters {
    pub schema: serde_json::Value,
}

impl ToolParameters {
    pub fn from_schema(schema: serde_json::Value) -> Self {
        Self { schema }
    }

    /// Strict schema that accepts no arguments.
    pub fn empty() -> Self {
        Self::object().build()
    }

    pub fn object() -> ParameterBuilder {
        ParameterBuilder {
            properties: serde_json::Map::new(),
            required: Vec::new(),
        }
    }
}

/// Builder for strict object schemas (`additionalProperties: false`).
pub struct ParameterBuilder {
    properties: serde_json::Map<String, serde_json::Value>,
    required: Vec<String>,
}

impl ParameterBuilder {
    /// Add a string property. An empty description is omitted from the schema.
    pub fn string(self, name: impl Into<String>, description: &str, required: bool) -> Self {
        let mut prop = serde_json::json!({ "type": "string" });
        if !description.is_empty() {
            prop["description"] = description.into();
        }
        self.property(name, prop, required)
    }

    /// Add an integer property with an optional lower bound.
    pub fn integer(self, name: impl Into<String>, minimum: Option<i64>, required: bool) -> Self {
        let mut prop = serde_json::json!({ "type": "integer" });
        if let Some(min) = minimum {
            prop["minimum"] = min.into();
        }
        self.property(name, prop, required)
    }

    fn property(mut self, name: impl Into<String>, prop: serde_json::Value, required: bool) -> Self {
        let name = name.into();
        self.properties.insert(name.clone(), prop);
        if required {
            self.required.push(name);
        }
        self
    }

    pub fn build(self) -> ToolParameters {
        let mut schema = serde_json::json!({
            "type": "object",
            "properties": self.properties,
            "additionalProperties": false,
        });
        if !self.required.is_empty() {
            schema["required"] = self.required.into();
        }
        ToolParameters { schema }
    }
}
