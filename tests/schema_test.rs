mod common;

use common::{FakeIndexService, FakeOreFactory};
use serde_json::json;
use std::collections::BTreeSet;
use cipherdex::query::QueryOptions;
use cipherdex::schema::settings::{open_settings, seal_settings};
use cipherdex::schema::{SchemaDefinition, SettingsCipher};
use cipherdex::{Collection, Config, ErrorKind, Result};

const BOOKS: &str = r#"{
    "type": {
        "title": "string",
        "published": "date",
        "details": { "pages": "number", "isbn": "string" }
    },
    "indexes": {
        "title": {
            "kind": "match",
            "fields": ["title"],
            "tokenizer": { "kind": "standard" },
            "tokenFilters": [{ "kind": "downcase" }, { "kind": "ngram", "tokenLength": 3 }]
        },
        "isbn": { "kind": "exact", "field": "details.isbn" },
        "pages": { "kind": "range", "field": "details.pages" },
        "anywhere": {
            "kind": "dynamic-match",
            "tokenizer": { "kind": "standard" },
            "tokenFilters": [{ "kind": "downcase" }]
        }
    }
}"#;

/// Repeating-key XOR; enough to show the blobs are opaque to the loader.
struct XorCipher(Vec<u8>);

impl SettingsCipher for XorCipher {
    fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        Ok(plaintext.iter().zip(self.0.iter().cycle()).map(|(b, k)| b ^ k).collect())
    }

    fn open(&self, sealed: &[u8]) -> Result<Vec<u8>> {
        self.seal(sealed)
    }
}

#[test]
fn test_reloaded_schema_finds_existing_records() {
    let schema = SchemaDefinition::from_json(BOOKS).unwrap().into_schema("books").unwrap();
    let cipher = XorCipher(b"settings-key".to_vec());
    let sealed = seal_settings(&schema, &cipher).unwrap();
    assert_eq!(sealed.len(), 4);

    let writer = Collection::new(schema, FakeOreFactory::shared(), Config::default()).unwrap();
    let mut service = FakeIndexService::default();
    let (record, put) = writer
        .prepare_put_json(json!({
            "title": "The Left Hand of Darkness",
            "details": { "pages": 304, "isbn": "0-441-47812-3" }
        }))
        .unwrap();
    service.put(&put.vectors);

    let reloaded = open_settings("books", &sealed, &cipher).unwrap();
    assert_eq!(&reloaded, writer.schema().as_ref());
    let reader = Collection::new(reloaded, FakeOreFactory::shared(), Config::default()).unwrap();

    let expected = BTreeSet::from([record.id]);
    let conditions = [
        reader.build_query(|q| q.index("isbn")?.eq("0-441-47812-3")).unwrap(),
        reader.build_query(|q| q.index("pages")?.between(300.0, 310.0)).unwrap(),
        reader.build_query(|q| q.index("title")?.matches("darkness")).unwrap(),
        reader.build_query(|q| q.index("anywhere")?.matches("LEFT")).unwrap(),
    ];
    for condition in &conditions {
        let request = reader.prepare_query(condition, &QueryOptions::new()).unwrap();
        assert_eq!(service.query(&request.constraints), expected, "{:?}", condition);
    }
}

#[test]
fn test_fresh_schema_cannot_read_old_postings() {
    let definition = SchemaDefinition::from_json(BOOKS).unwrap();
    let first = Collection::new(definition.clone().into_schema("books").unwrap(), FakeOreFactory::shared(), Config::default()).unwrap();
    let second = Collection::new(definition.into_schema("books").unwrap(), FakeOreFactory::shared(), Config::default()).unwrap();

    let mut service = FakeIndexService::default();
    let (_, put) = first.prepare_put_json(json!({ "details": { "isbn": "x" } })).unwrap();
    service.put(&put.vectors);

    // New keys, new index ids
    let condition = second.build_query(|q| q.index("isbn")?.eq("x")).unwrap();
    let request = second.prepare_query(&condition, &QueryOptions::new()).unwrap();
    assert!(service.query(&request.constraints).is_empty());
}

#[test]
fn test_definition_problems_reported_together() {
    let json = r#"{
        "type": { "title": "string", "pages": "number" },
        "indexes": {
            "pages": { "kind": "match", "fields": ["pages"], "tokenizer": { "kind": "standard" } },
            "missing": { "kind": "exact", "field": "subtitle" }
        }
    }"#;

    let err = SchemaDefinition::from_json(json).unwrap_err();
    assert!(err.is(ErrorKind::Schema));
    assert!(err.context.contains("'subtitle' not found"));
    assert!(err.context.contains("field 'pages' is of type number"));
}

#[test]
fn test_tampered_settings_rejected() {
    let schema = SchemaDefinition::from_json(BOOKS).unwrap().into_schema("books").unwrap();
    let sealed = seal_settings(&schema, &XorCipher(vec![7])).unwrap();
    let err = open_settings("books", &sealed, &XorCipher(vec![9])).unwrap_err();
    assert!(err.is(ErrorKind::Parse));
}
