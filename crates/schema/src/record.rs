use chrono::NaiveDate;
use serde_json::Value;
use std::collections::BTreeMap;

pub(crate) const MSG_MISSING: &str = "Missing data for required field.";
const MSG_UNKNOWN: &str = "Unknown field.";
const MSG_NOT_INTEGER: &str = "Not a valid integer.";
const MSG_NOT_STRING: &str = "Not a valid string.";
const MSG_NOT_DATE: &str = "Not a valid date.";
const MSG_INVALID_INPUT: &str = "Invalid input type.";

/// Wire type a field is coerced into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Text,
    Date,
}

/// One declared field of a record schema.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

/// A coerced field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Integer(i64),
    Text(String),
    Date(NaiveDate),
}

/// Field name to human-readable messages. Returned to the caller as the body
/// of a 400 response; never treated as fatal.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// A validated record: exactly the declared fields, normalized to their
/// target types.
#[derive(Debug, Clone, Default)]
pub struct Record {
    values: BTreeMap<&'static str, FieldValue>,
}

impl Record {
    pub fn int(&self, field: &str) -> Option<i64> {
        match self.values.get(field) {
            Some(FieldValue::Integer(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        match self.values.get(field) {
            Some(FieldValue::Text(v)) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn date(&self, field: &str) -> Option<NaiveDate> {
        match self.values.get(field) {
            Some(FieldValue::Date(v)) => Some(*v),
            _ => None,
        }
    }
}

/// A named, declarative list of fields describing one record shape.
///
/// The two entity schemas are configured instances of this type; the
/// validation logic itself is entity-agnostic.
#[derive(Debug, Clone, Copy)]
pub struct RecordSchema {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

impl RecordSchema {
    pub const fn new(name: &'static str, fields: &'static [FieldSpec]) -> Self {
        Self { name, fields }
    }

    fn spec(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Validate and coerce an untyped payload against this schema.
    ///
    /// On failure every offending field is reported, not just the first;
    /// unknown fields are rejected. A non-object payload is reported under
    /// the `_schema` pseudo-field.
    pub fn load(&self, payload: &Value) -> Result<Record, FieldErrors> {
        let obj = match payload.as_object() {
            Some(obj) => obj,
            None => {
                let mut errors = FieldErrors::new();
                errors.insert("_schema".to_string(), vec![MSG_INVALID_INPUT.to_string()]);
                return Err(errors);
            }
        };

        let mut errors = FieldErrors::new();
        let mut record = Record::default();

        for key in obj.keys() {
            if self.spec(key).is_none() {
                errors
                    .entry(key.clone())
                    .or_default()
                    .push(MSG_UNKNOWN.to_string());
            }
        }

        for field in self.fields {
            match obj.get(field.name) {
                None | Some(Value::Null) => {
                    if field.required {
                        errors
                            .entry(field.name.to_string())
                            .or_default()
                            .push(MSG_MISSING.to_string());
                    }
                }
                Some(value) => match coerce(field.kind, value) {
                    Ok(coerced) => {
                        record.values.insert(field.name, coerced);
                    }
                    Err(msg) => {
                        errors
                            .entry(field.name.to_string())
                            .or_default()
                            .push(msg.to_string());
                    }
                },
            }
        }

        if errors.is_empty() {
            Ok(record)
        } else {
            Err(errors)
        }
    }
}

fn coerce(kind: FieldKind, value: &Value) -> Result<FieldValue, &'static str> {
    match kind {
        FieldKind::Integer => match value {
            Value::Number(n) => n.as_i64().map(FieldValue::Integer).ok_or(MSG_NOT_INTEGER),
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(FieldValue::Integer)
                .map_err(|_| MSG_NOT_INTEGER),
            _ => Err(MSG_NOT_INTEGER),
        },
        FieldKind::Text => match value {
            Value::String(s) => Ok(FieldValue::Text(s.clone())),
            _ => Err(MSG_NOT_STRING),
        },
        FieldKind::Date => match value {
            Value::String(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map(FieldValue::Date)
                .map_err(|_| MSG_NOT_DATE),
            _ => Err(MSG_NOT_DATE),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TEST_SCHEMA: RecordSchema = RecordSchema::new(
        "test",
        &[
            FieldSpec {
                name: "id",
                kind: FieldKind::Integer,
                required: true,
            },
            FieldSpec {
                name: "label",
                kind: FieldKind::Text,
                required: true,
            },
            FieldSpec {
                name: "when",
                kind: FieldKind::Date,
                required: false,
            },
        ],
    );

    #[test]
    fn test_load_coerces_all_kinds() {
        let record = TEST_SCHEMA
            .load(&json!({ "id": 7, "label": "leg day", "when": "2024-03-05" }))
            .unwrap();

        assert_eq!(record.int("id"), Some(7));
        assert_eq!(record.text("label"), Some("leg day"));
        assert_eq!(record.date("when"), "2024-03-05".parse().ok());
    }

    #[test]
    fn test_integer_accepts_numeric_string() {
        let record = TEST_SCHEMA
            .load(&json!({ "id": "42", "label": "x" }))
            .unwrap();
        assert_eq!(record.int("id"), Some(42));
    }

    #[test]
    fn test_missing_required_field_is_reported() {
        let errors = TEST_SCHEMA.load(&json!({ "label": "x" })).unwrap_err();
        assert_eq!(errors["id"], vec!["Missing data for required field."]);
        assert!(!errors.contains_key("when"));
    }

    #[test]
    fn test_every_bad_field_is_reported() {
        let errors = TEST_SCHEMA
            .load(&json!({ "id": true, "label": 5, "when": "not-a-date" }))
            .unwrap_err();

        assert_eq!(errors["id"], vec!["Not a valid integer."]);
        assert_eq!(errors["label"], vec!["Not a valid string."]);
        assert_eq!(errors["when"], vec!["Not a valid date."]);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let errors = TEST_SCHEMA
            .load(&json!({ "id": 1, "label": "x", "bogus": 9 }))
            .unwrap_err();
        assert_eq!(errors["bogus"], vec!["Unknown field."]);
    }

    #[test]
    fn test_float_is_not_an_integer() {
        let errors = TEST_SCHEMA
            .load(&json!({ "id": 1.5, "label": "x" }))
            .unwrap_err();
        assert_eq!(errors["id"], vec!["Not a valid integer."]);
    }

    #[test]
    fn test_non_object_payload() {
        let errors = TEST_SCHEMA.load(&json!([1, 2, 3])).unwrap_err();
        assert_eq!(errors["_schema"], vec!["Invalid input type."]);
    }

    #[test]
    fn test_null_counts_as_missing() {
        let errors = TEST_SCHEMA
            .load(&json!({ "id": null, "label": "x" }))
            .unwrap_err();
        assert_eq!(errors["id"], vec!["Missing data for required field."]);
    }
}
