//! Argument normalisation and schema coercion for tool calls.

use serde_json::{Map, Value};

use super::executor::ToolError;
use super::types::{ParamType, ToolSchema};

/// Turn raw model-supplied arguments into an object.
///
/// Backends send either an object, a JSON-encoded object string, or nothing.
pub fn parse_tool_args(raw: &Value) -> Result<Map<String, Value>, ToolError> {
    match raw {
        Value::Object(map) => Ok(map.clone()),
        Value::Null => Ok(Map::new()),
        Value::String(text) if text.trim().is_empty() => Ok(Map::new()),
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(ToolError::InvalidArguments(format!(
                "tool arguments must be object, got {}",
                json_kind(&other)
            ))),
            Err(_) => Err(ToolError::InvalidArguments(format!(
                "tool arguments not valid JSON: {text}"
            ))),
        },
        other => Err(ToolError::InvalidArguments(format!(
            "tool arguments must be object, got {}",
            json_kind(other)
        ))),
    }
}

impl ToolSchema {
    /// Check `args` against the declared parameters and coerce loosely typed
    /// values (`"10"`, `10.0`, `"true"`). Unknown keys are dropped.
    pub fn coerce_args(&self, mut args: Map<String, Value>) -> Result<Map<String, Value>, ToolError> {
        let mut coerced = Map::new();

        for param in &self.parameters {
            match args.remove(&param.name) {
                None | Some(Value::Null) => {
                    if param.required {
                        return Err(ToolError::InvalidArguments(format!(
                            "missing required parameter '{}'",
                            param.name
                        )));
                    }
                }
                Some(value) => {
                    let value = coerce_value(value, param.kind).ok_or_else(|| {
                        ToolError::InvalidArguments(format!(
                            "parameter '{}' must be {}",
                            param.name,
                            param.kind.as_json_type()
                        ))
                    })?;
                    coerced.insert(param.name.clone(), value);
                }
            }
        }

        if !args.is_empty() {
            log::debug!(
                "Dropping unknown arguments for tool '{}': {:?}",
                self.name,
                args.keys().collect::<Vec<_>>()
            );
        }

        Ok(coerced)
    }
}

fn coerce_value(value: Value, kind: ParamType) -> Option<Value> {
    match (kind, value) {
        (ParamType::String, Value::String(text)) => Some(Value::String(text)),
        (ParamType::String, Value::Number(number)) => Some(Value::String(number.to_string())),
        (ParamType::String, Value::Bool(flag)) => Some(Value::String(flag.to_string())),
        (ParamType::Integer, Value::Number(number)) => {
            if let Some(int) = number.as_i64() {
                Some(Value::from(int))
            } else {
                number
                    .as_f64()
                    .filter(|float| float.fract() == 0.0)
                    .map(|float| Value::from(float as i64))
            }
        }
        (ParamType::Integer, Value::String(text)) => {
            text.trim().parse::<i64>().ok().map(Value::from)
        }
        (ParamType::Boolean, Value::Bool(flag)) => Some(Value::Bool(flag)),
        (ParamType::Boolean, Value::String(text)) => match text.trim().to_ascii_lowercase().as_str()
        {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn schema() -> ToolSchema {
        ToolSchema::new("read", "Read a file")
            .required("path", ParamType::String, "File path")
            .optional("offset", ParamType::Integer, "Lines to skip")
            .optional("verbose", ParamType::Boolean, "Verbose output")
    }

    #[test]
    fn parse_accepts_object_string_and_null() {
        assert_eq!(
            parse_tool_args(&json!({"path": "a"})).unwrap()["path"],
            json!("a")
        );
        assert_eq!(
            parse_tool_args(&json!(r#"{"path": "b"}"#)).unwrap()["path"],
            json!("b")
        );
        assert!(parse_tool_args(&Value::Null).unwrap().is_empty());
    }

    #[test]
    fn parse_rejects_non_objects() {
        let err = parse_tool_args(&json!([1, 2])).unwrap_err();
        assert_eq!(
            err,
            ToolError::InvalidArguments("tool arguments must be object, got array".to_string())
        );

        let err = parse_tool_args(&json!("{not json")).unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));
    }

    #[test]
    fn coerce_converts_loose_types() {
        let args = parse_tool_args(&json!({
            "path": "notes.txt",
            "offset": "3",
            "verbose": "TRUE"
        }))
        .unwrap();

        let coerced = schema().coerce_args(args).unwrap();
        assert_eq!(coerced["offset"], json!(3));
        assert_eq!(coerced["verbose"], json!(true));

        let coerced = schema()
            .coerce_args(parse_tool_args(&json!({"path": "x", "offset": 5.0})).unwrap())
            .unwrap();
        assert_eq!(coerced["offset"], json!(5));
    }

    #[test]
    fn coerce_reports_missing_and_mistyped_parameters() {
        let err = schema().coerce_args(Map::new()).unwrap_err();
        assert_eq!(
            err,
            ToolError::InvalidArguments("missing required parameter 'path'".to_string())
        );

        let err = schema()
            .coerce_args(parse_tool_args(&json!({"path": "x", "offset": 1.5})).unwrap())
            .unwrap_err();
        assert_eq!(
            err,
            ToolError::InvalidArguments("parameter 'offset' must be integer".to_string())
        );
    }

    #[test]
    fn coerce_drops_unknown_keys_and_nulls() {
        let coerced = schema()
            .coerce_args(
                parse_tool_args(&json!({"path": "x", "offset": null, "extra": 1})).unwrap(),
            )
            .unwrap();

        assert_eq!(coerced.len(), 1);
        assert!(coerced.get("extra").is_none());
    }
}
