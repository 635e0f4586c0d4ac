use crate::types::Tool;

use async_openai::types::{ChatCompletionTool, ChatCompletionToolType, FunctionObject};
use schemars::JsonSchema;
use schemars::schema::{Schema, SchemaObject};
use schemars::schema_for;
use serde::de::Deserialize;
use serde_json::Error as JsonError;
use serde_json::Value;
use thiserror::Error;

pub(super) type ToolTraitObject<C> = Box<dyn Tool<Context = C> + Send + Sync>;
type Deserializer<C> = Box<dyn Fn(&str) -> Result<ToolTraitObject<C>, JsonError> + Send + Sync>;

/// Type-erased catalog entry: the advertised schema plus a parser that turns
/// a raw argument payload into a runnable tool.
pub struct SyncToolObject<C> {
    pub json_schema: Value,
    pub description: String,
    pub name: String,
    deserializer: Deserializer<C>,
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("schema is missing a title")]
    MissingTitle,
    #[error("schema is missing a description")]
    MissingDescription,
    #[error("could not convert to json")]
    JsonSerialization(JsonError),
}

impl<C> SyncToolObject<C> {
    pub fn try_from_tool<T>() -> Result<Self, ValidationError>
    where
        T: JsonSchema + Tool<Context = C> + Send + Sync + for<'de> Deserialize<'de> + 'static,
    {
        let schema = schema_for!(T);

        let (name, description) = validate_tool_schema(&schema.schema)?;

        let json_schema =
            serde_json::to_value(&schema).map_err(ValidationError::JsonSerialization)?;

        let deserializer = Box::new(|data: &str| {
            serde_json::from_str::<T>(data).map(|tool| Box::new(tool) as ToolTraitObject<C>)
        });

        Ok(Self {
            name,
            json_schema,
            description,
            deserializer,
        })
    }

    pub fn try_deserialize(&self, data: &str) -> Result<ToolTraitObject<C>, JsonError> {
        (self.deserializer)(data)
    }
}

impl<C> From<&SyncToolObject<C>> for ChatCompletionTool {
    fn from(value: &SyncToolObject<C>) -> Self {
        Self {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: value.name.clone(),
                description: Some(value.description.clone()),
                parameters: Some(value.json_schema.clone()),
                strict: None,
            },
        }
    }
}

fn validate_tool_schema(schema: &SchemaObject) -> Result<(String, String), ValidationError> {
    let name = schema
        .metadata
        .as_deref()
        .and_then(|metadata| metadata.title.as_deref())
        .ok_or(ValidationError::MissingTitle)?
        .to_string();

    let description = validate_tool_description(schema)?;
    Ok((name, description))
}

// every property needs a description too, the model only sees the schema
fn validate_tool_description(schema: &SchemaObject) -> Result<String, ValidationError> {
    let description = schema
        .metadata
        .as_deref()
        .and_then(|metadata| metadata.description.as_deref())
        .ok_or(ValidationError::MissingDescription)?;

    if let Some(object) = schema.object.as_deref() {
        for sub_schema in object.properties.values() {
            if let Schema::Object(sub_schema_object) = sub_schema {
                validate_tool_description(sub_schema_object)?;
            }
        }
    }

    Ok(description.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NoContext;
    use serde::Deserialize;

    #[derive(Deserialize, JsonSchema)]
    #[schemars(title = "shout", description = "Upper-case some text")]
    struct Shout {
        #[schemars(description = "text to upper-case")]
        text: String,
    }

    impl Tool for Shout {
        type Context = NoContext;
        fn apply(&self, _: Self::Context) -> anyhow::Result<String> {
            Ok(self.text.to_uppercase())
        }
    }

    #[derive(Deserialize, JsonSchema)]
    #[schemars(title = "vague", description = "Has an undocumented field")]
    struct Vague {
        #[allow(dead_code)]
        value: u32,
    }

    impl Tool for Vague {
        type Context = NoContext;
        fn apply(&self, _: Self::Context) -> anyhow::Result<String> {
            Ok(String::new())
        }
    }

    #[test]
    fn takes_name_and_description_from_schema() {
        let object = SyncToolObject::<NoContext>::try_from_tool::<Shout>().unwrap();
        assert_eq!(object.name, "shout");
        assert_eq!(object.description, "Upper-case some text");
        assert_eq!(object.json_schema["properties"]["text"]["type"], "string");
    }

    #[test]
    fn rejects_undocumented_properties() {
        let result = SyncToolObject::<NoContext>::try_from_tool::<Vague>();
        assert!(matches!(result, Err(ValidationError::MissingDescription)));
    }

    #[test]
    fn advertises_as_function() {
        let object = SyncToolObject::<NoContext>::try_from_tool::<Shout>().unwrap();
        let tool = ChatCompletionTool::from(&object);
        assert!(matches!(tool.r#type, ChatCompletionToolType::Function));
        assert_eq!(tool.function.name, "shout");
        assert!(tool.function.parameters.is_some());
    }

    #[test]
    fn deserializes_payload_into_tool() {
        let object = SyncToolObject::<NoContext>::try_from_tool::<Shout>().unwrap();
        let tool = object.try_deserialize(r#"{"text":"hi"}"#).unwrap();
        assert_eq!(tool.apply(NoContext()).unwrap(), "HI");
        assert!(object.try_deserialize("not json").is_err());
    }
}
