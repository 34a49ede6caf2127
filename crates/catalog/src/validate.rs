//! Input validation against a tool's `inputSchema` (§4.4 step 2): required
//! fields, enums, and JSON types. Not a general JSON-Schema engine — just
//! the subset the catalog's schemas use.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required field `{0}`")]
    MissingRequired(String),
    #[error("field `{field}` has type {actual}, expected {expected}")]
    WrongType {
        field: String,
        expected: String,
        actual: String,
    },
    #[error("field `{field}` has value `{value}`, not one of the allowed values")]
    NotInEnum { field: String, value: String },
}

/// Validates `input` against `schema` (a JSON-Schema-shaped object per
/// §4.3: `type: object`, `required: [...]`, `properties: {field: {type,
/// enum?}}`).
pub fn validate_input(schema: &Value, input: &Value) -> Result<(), ValidationError> {
    let required = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|a| a.iter().filter_map(Value::as_str).collect::<Vec<_>>())
        .unwrap_or_default();

    let properties = schema.get("properties").and_then(Value::as_object);

    for field in &required {
        if input.get(field).is_none() {
            return Err(ValidationError::MissingRequired((*field).to_string()));
        }
    }

    if let Some(properties) = properties {
        for (field, field_schema) in properties {
            let Some(value) = input.get(field) else {
                continue;
            };

            if let Some(expected_type) = field_schema.get("type").and_then(Value::as_str) {
                if !matches_json_type(value, expected_type) {
                    return Err(ValidationError::WrongType {
                        field: field.clone(),
                        expected: expected_type.to_string(),
                        actual: json_type_name(value).to_string(),
                    });
                }
            }

            if let Some(allowed) = field_schema.get("enum").and_then(Value::as_array) {
                if !allowed.contains(value) {
                    return Err(ValidationError::NotInEnum {
                        field: field.clone(),
                        value: value.to_string(),
                    });
                }
            }
        }
    }

    Ok(())
}

fn matches_json_type(value: &Value, expected: &str) -> bool {
    match expected {
        "string" => value.is_string(),
        "integer" => value.is_i64() || value.is_u64(),
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        _ => true,
    }
}

fn json_type_name(value: &Value) -> &'static str {
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
    use super::*;
    use serde_json::json;

    fn schema() -> Value {
        json!({
            "type": "object",
            "required": ["action", "package"],
            "properties": {
                "action": {"type": "string", "enum": ["install", "remove"]},
                "package": {"type": "string"}
            }
        })
    }

    #[test]
    fn valid_input_passes() {
        let input = json!({"action": "install", "package": "nginx"});
        assert!(validate_input(&schema(), &input).is_ok());
    }

    #[test]
    fn missing_required_field_fails() {
        let input = json!({"action": "install"});
        assert_eq!(
            validate_input(&schema(), &input).unwrap_err(),
            ValidationError::MissingRequired("package".into())
        );
    }

    #[test]
    fn enum_violation_fails() {
        let input = json!({"action": "destroy", "package": "nginx"});
        assert!(matches!(
            validate_input(&schema(), &input).unwrap_err(),
            ValidationError::NotInEnum { .. }
        ));
    }

    #[test]
    fn wrong_type_fails() {
        let input = json!({"action": "install", "package": 123});
        assert!(matches!(
            validate_input(&schema(), &input).unwrap_err(),
            ValidationError::WrongType { .. }
        ));
    }
}
