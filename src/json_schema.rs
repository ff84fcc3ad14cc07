//! Normalisation of DTR JSON-Schema renderings.
//!
//! The DTR marks array members with a non-standard `unique` keyword that
//! validators reject. [`convert`] drops it from every schema position and
//! checks that the document has the shape of a JSON-Schema while doing so.

use crate::error::TacosError;
use serde_json::{Map, Value};

const DTR_ONLY_KEYWORDS: &[&str] = &["unique"];

/// Keywords whose value is an object mapping names to subschemas.
const SCHEMA_MAPS: &[&str] = &[
    "properties",
    "patternProperties",
    "definitions",
    "$defs",
    "dependentSchemas",
];
/// Keywords whose value is a list of subschemas.
const SCHEMA_LISTS: &[&str] = &["allOf", "anyOf", "oneOf", "prefixItems"];
/// Keywords whose value is a single subschema.
const SCHEMA_SINGLES: &[&str] = &[
    "not",
    "if",
    "then",
    "else",
    "contains",
    "additionalProperties",
    "additionalItems",
    "propertyNames",
    "contentSchema",
    "unevaluatedProperties",
    "unevaluatedItems",
];

/// Turn a DTR JSON-Schema rendering into a standard JSON-Schema document.
pub fn convert(mut doc: Value) -> Result<Value, TacosError> {
    if !doc.is_object() {
        return Err(TacosError::Conversion(format!(
            "expected a JSON object at the schema root, got {}",
            kind(&doc)
        )));
    }
    normalize(&mut doc, "#")?;
    Ok(doc)
}

fn normalize(schema: &mut Value, at: &str) -> Result<(), TacosError> {
    let obj = match schema {
        // true/false are valid schemas in subschema positions
        Value::Bool(_) => return Ok(()),
        Value::Object(obj) => obj,
        other => {
            return Err(TacosError::Conversion(format!(
                "{at}: expected a schema object, got {}",
                kind(other)
            )))
        }
    };

    for keyword in DTR_ONLY_KEYWORDS {
        obj.remove(*keyword);
    }

    check_type(obj, at)?;
    check_required(obj, at)?;

    for keyword in SCHEMA_MAPS {
        if let Some(value) = obj.get_mut(*keyword) {
            let Value::Object(members) = value else {
                return Err(mismatch(at, keyword, "an object of schemas", value));
            };
            for (name, sub) in members.iter_mut() {
                normalize(sub, &format!("{at}/{keyword}/{name}"))?;
            }
        }
    }

    for keyword in SCHEMA_LISTS {
        if let Some(value) = obj.get_mut(*keyword) {
            let Value::Array(items) = value else {
                return Err(mismatch(at, keyword, "a list of schemas", value));
            };
            for (i, sub) in items.iter_mut().enumerate() {
                normalize(sub, &format!("{at}/{keyword}/{i}"))?;
            }
        }
    }

    for keyword in SCHEMA_SINGLES {
        if let Some(sub) = obj.get_mut(*keyword) {
            normalize(sub, &format!("{at}/{keyword}"))?;
        }
    }

    // draft-04 `dependencies` mixes schemas with lists of property names
    if let Some(value) = obj.get_mut("dependencies") {
        let Value::Object(members) = value else {
            return Err(mismatch(at, "dependencies", "an object", value));
        };
        for (name, dep) in members.iter_mut() {
            let Some(names) = dep.as_array() else {
                normalize(dep, &format!("{at}/dependencies/{name}"))?;
                continue;
            };
            if !names.iter().all(Value::is_string) {
                return Err(mismatch(
                    &format!("{at}/dependencies"),
                    name,
                    "a list of property names",
                    dep,
                ));
            }
        }
    }

    // `items` is a single schema or, in older drafts, a tuple of schemas
    match obj.get_mut("items") {
        Some(Value::Array(items)) => {
            for (i, sub) in items.iter_mut().enumerate() {
                normalize(sub, &format!("{at}/items/{i}"))?;
            }
        }
        Some(sub) => normalize(sub, &format!("{at}/items"))?,
        None => {}
    }

    Ok(())
}

fn check_type(obj: &Map<String, Value>, at: &str) -> Result<(), TacosError> {
    match obj.get("type") {
        None | Some(Value::String(_)) => Ok(()),
        Some(Value::Array(types)) if types.iter().all(Value::is_string) => Ok(()),
        Some(other) => Err(mismatch(at, "type", "a string or a list of strings", other)),
    }
}

fn check_required(obj: &Map<String, Value>, at: &str) -> Result<(), TacosError> {
    match obj.get("required") {
        None => Ok(()),
        Some(Value::Array(names)) if names.iter().all(Value::is_string) => Ok(()),
        Some(other) => Err(mismatch(at, "required", "a list of strings", other)),
    }
}

fn mismatch(at: &str, keyword: &str, expected: &str, found: &Value) -> TacosError {
    TacosError::Conversion(format!(
        "{at}/{keyword}: expected {expected}, got {}",
        kind(found)
    ))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn removes_unique_from_nested_schemas() {
        let doc = json!({
            "$schema": "http://json-schema.org/draft-04/schema#",
            "type": "object",
            "unique": false,
            "properties": {
                "authors": {
                    "type": "array",
                    "unique": true,
                    "items": {"type": "string", "unique": false}
                },
                "meta": {"anyOf": [{"type": "null"}, {"type": "object", "unique": true}]}
            },
            "required": ["authors"]
        });

        let out = convert(doc).unwrap();
        assert_eq!(
            out,
            json!({
                "$schema": "http://json-schema.org/draft-04/schema#",
                "type": "object",
                "properties": {
                    "authors": {"type": "array", "items": {"type": "string"}},
                    "meta": {"anyOf": [{"type": "null"}, {"type": "object"}]}
                },
                "required": ["authors"]
            })
        );
    }

    #[test]
    fn a_property_called_unique_survives() {
        let doc = json!({"type": "object", "properties": {"unique": {"type": "boolean"}}});
        let out = convert(doc.clone()).unwrap();
        assert_eq!(out, doc);
    }

    #[test]
    fn rejects_non_object_roots() {
        for doc in [json!([]), json!("schema"), json!(null)] {
            assert!(matches!(convert(doc), Err(TacosError::Conversion(_))));
        }
    }

    #[test]
    fn reports_the_offending_location() {
        let doc = json!({"properties": {"age": {"type": 42}}});
        match convert(doc) {
            Err(TacosError::Conversion(msg)) => assert!(msg.contains("#/properties/age/type")),
            other => panic!("unexpected {other:?}"),
        }

        let doc = json!({"properties": ["age"]});
        assert!(matches!(convert(doc), Err(TacosError::Conversion(_))));

        let doc = json!({"required": "age"});
        assert!(matches!(convert(doc), Err(TacosError::Conversion(_))));
    }

    #[test]
    fn accepts_boolean_subschemas_and_tuple_items() {
        let doc = json!({
            "type": ["array", "null"],
            "items": [{"type": "string", "unique": true}, true],
            "additionalItems": false
        });
        let out = convert(doc).unwrap();
        assert_eq!(out["items"][0], json!({"type": "string"}));
    }

    #[test]
    fn removes_unique_from_dependency_schemas() {
        let doc = json!({
            "type": "object",
            "dependencies": {
                "a": {"type": "object", "unique": true},
                "b": ["a", "c"]
            },
            "dependentSchemas": {"c": {"type": "object", "unique": true}}
        });
        let out = convert(doc).unwrap();
        assert_eq!(
            out,
            json!({
                "type": "object",
                "dependencies": {"a": {"type": "object"}, "b": ["a", "c"]},
                "dependentSchemas": {"c": {"type": "object"}}
            })
        );
    }

    #[test]
    fn removes_unique_from_unevaluated_and_content_schemas() {
        let doc = json!({
            "type": "object",
            "unevaluatedProperties": {"type": "string", "unique": true},
            "unevaluatedItems": {"type": "number", "unique": false},
            "contentSchema": {"type": "object", "unique": true}
        });
        let out = convert(doc).unwrap();
        assert_eq!(out["unevaluatedProperties"], json!({"type": "string"}));
        assert_eq!(out["unevaluatedItems"], json!({"type": "number"}));
        assert_eq!(out["contentSchema"], json!({"type": "object"}));
    }

    #[test]
    fn rejects_malformed_dependencies() {
        let doc = json!({"dependencies": {"a": [1, 2]}});
        match convert(doc) {
            Err(TacosError::Conversion(msg)) => assert!(msg.contains("#/dependencies/a")),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            convert(json!({"dependencies": "a"})),
            Err(TacosError::Conversion(_))
        ));
    }
}
