use std::collections::BTreeMap;
use crate::core::types::FieldValue;

/// A dotted path such as `address.city`, split once and reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    raw: String,
    parts: Vec<String>,
}

impl FieldPath {
    pub fn parse(path: &str) -> Self {
        FieldPath {
            raw: path.to_string(),
            parts: path.split('.').map(str::to_string).collect(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Walks nested objects. Anything missing along the way, or a non-object
    /// where an object is needed, resolves to `None`. A `Null` leaf counts as
    /// missing too.
    pub fn resolve<'a>(&self, fields: &'a BTreeMap<String, FieldValue>) -> Option<&'a FieldValue> {
        let (first, rest) = self.parts.split_first()?;
        let mut current = fields.get(first)?;

        for part in rest {
            current = current.as_object()?.get(part)?;
        }

        match current {
            FieldValue::Null => None,
            value => Some(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> BTreeMap<String, FieldValue> {
        let mut address = BTreeMap::new();
        address.insert("city".to_string(), FieldValue::from("Melbourne"));
        address.insert("unit".to_string(), FieldValue::Null);

        let mut fields = BTreeMap::new();
        fields.insert("name".to_string(), FieldValue::from("Ada"));
        fields.insert("address".to_string(), FieldValue::Object(address));
        fields
    }

    #[test]
    fn test_resolve_nested() {
        let path = FieldPath::parse("address.city");
        assert_eq!(path.resolve(&record()), Some(&FieldValue::from("Melbourne")));
    }

    #[test]
    fn test_missing_paths_resolve_to_none() {
        let fields = record();
        assert_eq!(FieldPath::parse("address.zip").resolve(&fields), None);
        assert_eq!(FieldPath::parse("name.first").resolve(&fields), None);
        assert_eq!(FieldPath::parse("address.unit").resolve(&fields), None);
        assert_eq!(FieldPath::parse("phone").resolve(&fields), None);
    }
}
