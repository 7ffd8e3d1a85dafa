use std::collections::BTreeMap;
use crate::core::types::FieldValue;

/// Every string value in the record, descending into nested objects. Arrays
/// are skipped along with everything inside them.
pub fn string_fields(fields: &BTreeMap<String, FieldValue>) -> Vec<String> {
    let mut out = Vec::new();
    collect(fields, &mut Vec::new(), &mut |_, value| out.push(value.to_string()));
    out
}

/// Like [`string_fields`], paired with the dotted path each string sits at.
pub fn string_fields_with_path(fields: &BTreeMap<String, FieldValue>) -> Vec<(String, String)> {
    let mut out = Vec::new();
    collect(fields, &mut Vec::new(), &mut |path, value| {
        out.push((path.join("."), value.to_string()))
    });
    out
}

fn collect<'a>(
    fields: &'a BTreeMap<String, FieldValue>,
    path: &mut Vec<&'a str>,
    emit: &mut dyn FnMut(&[&'a str], &'a str),
) {
    for (name, value) in fields {
        path.push(name);
        match value {
            FieldValue::Text(text) => emit(path.as_slice(), text.as_str()),
            FieldValue::Object(children) => collect(children, path, emit),
            _ => {}
        }
        path.pop();
    }
}
