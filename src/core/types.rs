use serde::{Serialize, Deserialize};
use std::collections::BTreeMap;
use std::fmt;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::core::error::{Error, ErrorKind, Result};

/// 16-byte identifier of a record; the posting link on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId(pub Uuid);

impl RecordId {
    pub fn generate() -> Self {
        RecordId(Uuid::new_v4())
    }

    /// Accepts 32 hex characters or the hyphenated UUID form.
    pub fn parse(id: &str) -> Result<Self> {
        Ok(RecordId(Uuid::parse_str(id)?))
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }

    pub fn to_hex(&self) -> String {
        self.0.simple().to_string()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// 16-byte identifier of an index, generated once per index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IndexId(pub Uuid);

impl IndexId {
    pub fn generate() -> Self {
        IndexId(Uuid::new_v4())
    }

    pub fn parse(id: &str) -> Result<Self> {
        Ok(IndexId(Uuid::parse_str(id)?))
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }

    pub fn to_hex(&self) -> String {
        self.0.simple().to_string()
    }
}

impl fmt::Display for IndexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    /// Wide integer source; only values inside `[0, u64::MAX]` are encodable.
    /// Serialised as a decimal string.
    Integer(#[serde(with = "decimal_i128")] i128),
    Boolean(bool),
    Date(DateTime<Utc>),
    Object(BTreeMap<String, FieldValue>),
    Array(Vec<FieldValue>),
    Null,
}

impl FieldValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Text(_) => "string",
            FieldValue::Number(_) => "number",
            FieldValue::Integer(_) => "bigint",
            FieldValue::Boolean(_) => "boolean",
            FieldValue::Date(_) => "date",
            FieldValue::Object(_) => "object",
            FieldValue::Array(_) => "array",
            FieldValue::Null => "null",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, FieldValue>> {
        match self {
            FieldValue::Object(fields) => Some(fields),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value as i128)
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        FieldValue::Integer(value as i128)
    }
}

impl From<i128> for FieldValue {
    fn from(value: i128) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Date(value)
    }
}

impl From<serde_json::Value> for FieldValue {
    /// JSON numbers become `Number`; JSON has no wide-integer or date type.
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => FieldValue::Null,
            serde_json::Value::Bool(b) => FieldValue::Boolean(b),
            serde_json::Value::Number(n) => FieldValue::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => FieldValue::Text(s),
            serde_json::Value::Array(items) => {
                FieldValue::Array(items.into_iter().map(FieldValue::from).collect())
            }
            serde_json::Value::Object(fields) => FieldValue::Object(
                fields.into_iter().map(|(k, v)| (k, FieldValue::from(v))).collect(),
            ),
        }
    }
}

mod decimal_i128 {
    use serde::{Deserialize, Deserializer, Serializer};
    use serde::de::Error as _;

    pub fn serialize<S: Serializer>(value: &i128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i128, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}

/// A record to be indexed: an id plus its top-level fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new(id: RecordId) -> Self {
        Record {
            id,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    pub fn add_field(&mut self, name: String, value: FieldValue) {
        self.fields.insert(name, value);
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Builds a record from a JSON object. A missing or null `id` is replaced
    /// by a freshly generated one, which is also written back into the fields.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        let serde_json::Value::Object(object) = value else {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                "record must be a JSON object",
            ));
        };

        let mut fields: BTreeMap<String, FieldValue> = object
            .into_iter()
            .map(|(k, v)| (k, FieldValue::from(v)))
            .collect();

        let id = match fields.get("id") {
            Some(FieldValue::Text(id)) => RecordId::parse(id)?,
            None | Some(FieldValue::Null) => {
                let id = RecordId::generate();
                fields.insert("id".to_string(), FieldValue::Text(id.to_hex()));
                id
            }
            Some(other) => {
                return Err(Error::new(
                    ErrorKind::InvalidArgument,
                    format!("record id must be a string, found {}", other.type_name()),
                ));
            }
        };

        Ok(Record { id, fields })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_from_json_keeps_given_id() {
        let record = Record::from_json(json!({
            "id": "0f8a2b3c4d5e6f708192a3b4c5d6e7f8",
            "name": "Ada",
        }))
        .unwrap();

        assert_eq!(record.id.to_hex(), "0f8a2b3c4d5e6f708192a3b4c5d6e7f8");
        assert_eq!(record.get_field("name"), Some(&FieldValue::Text("Ada".into())));
    }

    #[test]
    fn test_record_from_json_generates_missing_id() {
        let record = Record::from_json(json!({ "name": "Grace" })).unwrap();
        assert_eq!(
            record.get_field("id"),
            Some(&FieldValue::Text(record.id.to_hex()))
        );
    }

    #[test]
    fn test_record_from_json_rejects_non_object() {
        let err = Record::from_json(json!([1, 2, 3])).unwrap_err();
        assert!(err.is(ErrorKind::InvalidArgument));
    }

    #[test]
    fn test_record_from_json_rejects_malformed_id() {
        let err = Record::from_json(json!({ "id": "not-an-id" })).unwrap_err();
        assert!(err.is(ErrorKind::Parse));
    }

    #[test]
    fn test_wide_integers_serialise_as_strings() {
        let value = FieldValue::Integer(-(u64::MAX as i128) - 7);
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json, json!({ "Integer": "-18446744073709551622" }));
        assert_eq!(serde_json::from_value::<FieldValue>(json).unwrap(), value);
        assert!(serde_json::from_value::<FieldValue>(json!({ "Integer": "12x" })).is_err());
    }

    #[test]
    fn test_json_numbers_become_numbers() {
        assert_eq!(FieldValue::from(json!(42)), FieldValue::Number(42.0));
        assert_eq!(FieldValue::from(json!(null)), FieldValue::Null);
    }
}
