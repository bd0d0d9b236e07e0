use serde_json::{json, Map, Value};

/// Shape of the JSON object the model is asked to return.
///
/// Rendered per provider: lowercase JSON Schema for OpenAI-compatible
/// endpoints, upper-case `Type` names for Gemini.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaType {
    String,
    Array(Box<SchemaType>),
    Object(Vec<SchemaProperty>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaProperty {
    pub name: String,
    pub schema: SchemaType,
    pub description: Option<String>,
    pub required: bool,
}

impl SchemaProperty {
    pub fn required(name: &str, schema: SchemaType) -> Self {
        Self {
            name: name.to_string(),
            schema,
            description: None,
            required: true,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}

#[derive(Debug, Clone, Copy)]
enum Dialect {
    JsonSchema,
    Gemini,
}

impl SchemaType {
    pub fn to_json_schema(&self) -> Value {
        self.render(Dialect::JsonSchema, None)
    }

    pub fn to_gemini_schema(&self) -> Value {
        self.render(Dialect::Gemini, None)
    }

    fn render(&self, dialect: Dialect, description: Option<&str>) -> Value {
        let type_name = |lower: &str| match dialect {
            Dialect::JsonSchema => lower.to_string(),
            Dialect::Gemini => lower.to_uppercase(),
        };

        let mut node = Map::new();
        match self {
            SchemaType::String => {
                node.insert("type".into(), json!(type_name("string")));
            }
            SchemaType::Array(items) => {
                node.insert("type".into(), json!(type_name("array")));
                node.insert("items".into(), items.render(dialect, None));
            }
            SchemaType::Object(properties) => {
                node.insert("type".into(), json!(type_name("object")));
                let mut props = Map::new();
                for prop in properties {
                    props.insert(
                        prop.name.clone(),
                        prop.schema.render(dialect, prop.description.as_deref()),
                    );
                }
                node.insert("properties".into(), Value::Object(props));

                let required: Vec<&str> = properties
                    .iter()
                    .filter(|p| p.required)
                    .map(|p| p.name.as_str())
                    .collect();
                node.insert("required".into(), json!(required));

                match dialect {
                    Dialect::JsonSchema => {
                        node.insert("additionalProperties".into(), json!(false));
                    }
                    Dialect::Gemini => {
                        let ordering: Vec<&str> =
                            properties.iter().map(|p| p.name.as_str()).collect();
                        node.insert("propertyOrdering".into(), json!(ordering));
                    }
                }
            }
        }

        if let Some(text) = description {
            node.insert("description".into(), json!(text));
        }
        Value::Object(node)
    }
}

/// One structured-output completion: a system instruction, the raw user
/// input, and the schema the reply must follow.
#[derive(Debug, Clone)]
pub struct StructuredRequest {
    pub model: String,
    pub system_instruction: String,
    pub user_input: String,
    pub schema_name: String,
    pub schema: SchemaType,
}
