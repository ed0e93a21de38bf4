//! Tool declarations and their translation into session `tools` entries.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::Result;
use crate::protocol::models::Tool;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SchemaType {
    #[serde(alias = "object")]
    Object,
    #[serde(alias = "string")]
    String,
    #[serde(alias = "integer")]
    Integer,
    #[serde(alias = "number")]
    Number,
    #[serde(alias = "boolean")]
    Boolean,
    #[serde(alias = "array")]
    Array,
}

impl SchemaType {
    #[must_use]
    pub const fn json_type(self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
        }
    }
}

/// Typed parameter schema as the runtime declares it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
}

impl Schema {
    #[must_use]
    pub fn of(schema_type: SchemaType) -> Self {
        Self {
            schema_type: Some(schema_type),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, schema: Self) -> Self {
        self.properties
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), schema);
        self
    }

    #[must_use]
    pub fn with_required<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required = Some(names.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_items(mut self, items: Self) -> Self {
        self.items = Some(Box::new(items));
        self
    }

    #[must_use]
    pub fn with_enum<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }
}

/// Convert a typed schema into wire JSON Schema.
///
/// Empty `enum`/`required` lists and empty `properties` are left out.
#[must_use]
pub fn schema_to_json_schema(schema: &Schema) -> Value {
    let mut out = Map::new();

    if let Some(schema_type) = schema.schema_type {
        out.insert("type".into(), schema_type.json_type().into());
    }
    if let Some(description) = schema.description.as_deref().filter(|d| !d.is_empty()) {
        out.insert("description".into(), description.into());
    }
    if let Some(values) = schema.enum_values.as_ref().filter(|v| !v.is_empty()) {
        out.insert("enum".into(), json!(values));
    }
    if let Some(properties) = schema.properties.as_ref().filter(|p| !p.is_empty()) {
        let converted: Map<String, Value> = properties
            .iter()
            .map(|(name, sub)| (name.clone(), schema_to_json_schema(sub)))
            .collect();
        out.insert("properties".into(), Value::Object(converted));
        out.entry("type").or_insert_with(|| "object".into());
    }
    if let Some(required) = schema.required.as_ref().filter(|r| !r.is_empty()) {
        out.insert("required".into(), json!(required));
    }
    if let Some(items) = &schema.items {
        out.insert("items".into(), schema_to_json_schema(items));
    }

    Value::Object(out)
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FunctionDeclaration {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Schema>,
    /// Raw JSON Schema, used verbatim and in preference to `parameters`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters_json_schema: Option<Value>,
}

impl FunctionDeclaration {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_parameters(mut self, parameters: Schema) -> Self {
        self.parameters = Some(parameters);
        self
    }

    /// Declare parameters from a Rust type's derived JSON Schema.
    ///
    /// # Errors
    /// Returns an error if schema serialization fails.
    #[allow(clippy::result_large_err)]
    pub fn with_schema_for<T: JsonSchema>(mut self) -> Result<Self> {
        let schema = schemars::schema_for!(T);
        let mut value = serde_json::to_value(&schema)?;
        if let Some(object) = value.as_object_mut() {
            object.remove("$schema");
        }
        self.parameters_json_schema = Some(value);
        Ok(self)
    }

    fn parameters_schema(&self) -> Value {
        if let Some(raw) = &self.parameters_json_schema {
            return raw.clone();
        }
        self.parameters
            .as_ref()
            .map_or_else(|| json!({ "type": "object" }), schema_to_json_schema)
    }

    #[must_use]
    pub fn to_tool(&self) -> Tool {
        Tool::Function {
            name: self.name.clone(),
            description: self.description.clone(),
            parameters: self.parameters_schema(),
        }
    }
}

/// A group of function declarations offered to the model.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ToolDeclaration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_declarations: Option<Vec<FunctionDeclaration>>,
}

impl ToolDeclaration {
    #[must_use]
    pub fn functions(declarations: Vec<FunctionDeclaration>) -> Self {
        Self {
            function_declarations: Some(declarations),
        }
    }
}

/// Flatten tool declarations into session `tools` entries.
///
/// Declarations without function declarations contribute nothing.
#[must_use]
pub fn function_tools_to_session_tools(tools: &[ToolDeclaration]) -> Vec<Tool> {
    tools
        .iter()
        .filter_map(|tool| tool.function_declarations.as_deref())
        .flatten()
        .map(FunctionDeclaration::to_tool)
        .collect()
}
