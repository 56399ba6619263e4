//! Decoded server payloads
//!
//! A [`Payload`] is one JSON object from an LMS REST response. Accessors
//! address keys by dotted path (`lock_info.can_view`) and apply the decoding
//! rules every synchronized model relies on: ids accept strings or integers,
//! `null` counts as absent, and a missing optional key is never an error.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::error::DecodeError;

type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// One decoded JSON object from the server, with key order preserved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload(Map<String, Value>);

impl Payload {
    /// Wrap an already-decoded JSON object.
    pub const fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Parse a payload from raw JSON text.
    pub fn from_json_str(raw: &str) -> crate::Result<Self> {
        let value: Value = serde_json::from_str(raw)?;
        Ok(Self::try_from(value)?)
    }

    /// Borrow the underlying JSON object.
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Resolve a dotted path to a present, non-null value.
    ///
    /// Missing keys and `null` resolve to `Ok(None)`. An intermediate segment
    /// that is present but not an object is a type mismatch on that segment.
    pub fn lookup(&self, path: &str) -> DecodeResult<Option<&Value>> {
        let mut segments = path.split('.');
        let Some(first) = segments.next() else {
            return Ok(None);
        };

        let mut current = match self.0.get(first) {
            None | Some(Value::Null) => return Ok(None),
            Some(value) => value,
        };
        let mut walked = first.to_string();

        for segment in segments {
            let Value::Object(object) = current else {
                return Err(DecodeError::TypeMismatch {
                    field: walked,
                    expected: "object",
                    found: json_type_name(current),
                });
            };
            current = match object.get(segment) {
                None | Some(Value::Null) => return Ok(None),
                Some(value) => value,
            };
            walked.push('.');
            walked.push_str(segment);
        }

        Ok(Some(current))
    }

    /// Read a required identifier, coercing integers to their decimal form.
    pub fn id(&self, path: &str) -> DecodeResult<String> {
        self.optional_id(path)?
            .ok_or_else(|| DecodeError::MissingField(path.to_string()))
    }

    /// Read an optional identifier with the same coercion as [`Payload::id`].
    pub fn optional_id(&self, path: &str) -> DecodeResult<Option<String>> {
        self.lookup(path)?
            .map(|value| coerce_id(path, value))
            .transpose()
    }

    /// Read an optional array of identifiers, e.g. `student_ids`.
    pub fn optional_id_list(&self, path: &str) -> DecodeResult<Option<Vec<String>>> {
        match self.lookup(path)? {
            None => Ok(None),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(index, item)| coerce_id(&format!("{path}[{index}]"), item))
                .collect::<DecodeResult<Vec<_>>>()
                .map(Some),
            Some(other) => Err(mismatch(path, "array", other)),
        }
    }

    /// Read an optional nested object as its own payload.
    pub fn optional_object(&self, path: &str) -> DecodeResult<Option<Self>> {
        match self.lookup(path)? {
            None => Ok(None),
            Some(Value::Object(map)) => Ok(Some(Self(map.clone()))),
            Some(other) => Err(mismatch(path, "object", other)),
        }
    }

    /// Read an optional array of nested objects.
    pub fn optional_objects(&self, path: &str) -> DecodeResult<Option<Vec<Self>>> {
        match self.lookup(path)? {
            None => Ok(None),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(index, item)| match item {
                    Value::Object(map) => Ok(Self(map.clone())),
                    other => Err(mismatch(&format!("{path}[{index}]"), "object", other)),
                })
                .collect::<DecodeResult<Vec<_>>>()
                .map(Some),
            Some(other) => Err(mismatch(path, "array", other)),
        }
    }

    /// Set a top-level key unless it already holds a non-null value.
    #[must_use]
    pub fn with_default(mut self, key: &str, value: impl Into<Value>) -> Self {
        if matches!(self.0.get(key), None | Some(Value::Null)) {
            self.0.insert(key.to_string(), value.into());
        }
        self
    }

    pub fn required_str(&self, path: &str) -> DecodeResult<String> {
        self.optional_str(path)?
            .ok_or_else(|| DecodeError::MissingField(path.to_string()))
    }

    pub fn optional_str(&self, path: &str) -> DecodeResult<Option<String>> {
        match self.lookup(path)? {
            None => Ok(None),
            Some(Value::String(value)) => Ok(Some(value.clone())),
            Some(other) => Err(mismatch(path, "string", other)),
        }
    }

    pub fn optional_bool(&self, path: &str) -> DecodeResult<Option<bool>> {
        match self.lookup(path)? {
            None => Ok(None),
            Some(Value::Bool(value)) => Ok(Some(*value)),
            Some(other) => Err(mismatch(path, "boolean", other)),
        }
    }

    pub fn optional_i64(&self, path: &str) -> DecodeResult<Option<i64>> {
        match self.lookup(path)? {
            None => Ok(None),
            Some(Value::Number(number)) => number.as_i64().map(Some).ok_or_else(|| {
                DecodeError::InvalidValue {
                    field: path.to_string(),
                    reason: format!("{number} is not a 64-bit integer"),
                }
            }),
            Some(other) => Err(mismatch(path, "integer", other)),
        }
    }

    pub fn optional_f64(&self, path: &str) -> DecodeResult<Option<f64>> {
        match self.lookup(path)? {
            None => Ok(None),
            Some(Value::Number(number)) => Ok(number.as_f64()),
            Some(other) => Err(mismatch(path, "number", other)),
        }
    }

    /// Read an optional RFC 3339 timestamp, normalized to UTC.
    pub fn optional_datetime(&self, path: &str) -> DecodeResult<Option<DateTime<Utc>>> {
        let Some(raw) = self.optional_str(path)? else {
            return Ok(None);
        };

        DateTime::parse_from_rfc3339(raw.trim())
            .map(|parsed| Some(parsed.with_timezone(&Utc)))
            .map_err(|error| DecodeError::InvalidValue {
                field: path.to_string(),
                reason: format!("`{raw}` is not an RFC 3339 timestamp ({error})"),
            })
    }
}

impl TryFrom<Value> for Payload {
    type Error = DecodeError;

    fn try_from(value: Value) -> DecodeResult<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(DecodeError::NotAnObject(json_type_name(&other))),
        }
    }
}

/// Decode a JSON array of objects into payloads.
pub fn payloads_from_array(value: Value) -> DecodeResult<Vec<Payload>> {
    match value {
        Value::Array(items) => items.into_iter().map(Payload::try_from).collect(),
        other => Err(DecodeError::TypeMismatch {
            field: "<response>".to_string(),
            expected: "array",
            found: json_type_name(&other),
        }),
    }
}

/// Human-readable JSON type name for error messages.
pub const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Identifiers arrive as strings or integers and are kept as trimmed text.
fn coerce_id(field: &str, value: &Value) -> DecodeResult<String> {
    let id = match value {
        Value::String(raw) => raw.trim().to_string(),
        Value::Number(number) => match (number.as_i64(), number.as_u64()) {
            (Some(int), _) => int.to_string(),
            (None, Some(uint)) => uint.to_string(),
            (None, None) => {
                return Err(DecodeError::TypeMismatch {
                    field: field.to_string(),
                    expected: "string or integer",
                    found: "fractional number",
                })
            }
        },
        other => return Err(mismatch(field, "string or integer", other)),
    };

    if id.is_empty() {
        return Err(DecodeError::InvalidValue {
            field: field.to_string(),
            reason: "identifier must not be empty".to_string(),
        });
    }
    Ok(id)
}

fn mismatch(path: &str, expected: &'static str, found: &Value) -> DecodeError {
    DecodeError::TypeMismatch {
        field: path.to_string(),
        expected,
        found: json_type_name(found),
    }
}
