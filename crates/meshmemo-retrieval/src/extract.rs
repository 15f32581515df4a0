//! Content tags read from the collection's declared tag field.

use meshmemo_core::config::CollectionSchema;
use meshmemo_core::models::{resolve_path, Metadata};
use serde_json::Value;

/// Tags stored at `schema.tag_field`: an array of strings, or one
/// comma-separated string. Anything else yields no tags.
pub fn content_tags(metadata: &Metadata, schema: &CollectionSchema) -> Vec<String> {
    let raw: Vec<&str> = match resolve_path(metadata, &schema.tag_field) {
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        Some(Value::String(s)) => s.split(',').collect(),
        _ => return Vec::new(),
    };

    let mut tags: Vec<String> = Vec::with_capacity(raw.len());
    for tag in raw {
        let tag = tag.trim();
        if tag.is_empty() {
            continue;
        }
        let tag = if schema.content_tags_lowercase {
            tag.to_lowercase()
        } else {
            tag.to_string()
        };
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn meta(v: Value) -> Metadata {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn array_and_csv_forms() {
        let schema = CollectionSchema::default();
        assert_eq!(
            content_tags(&meta(json!({"tags": ["Red", "formal", "red", 3]})), &schema),
            vec!["red", "formal"]
        );
        assert_eq!(
            content_tags(&meta(json!({"tags": "Red, formal ,,silk"})), &schema),
            vec!["red", "formal", "silk"]
        );
        assert!(content_tags(&meta(json!({"tags": 5})), &schema).is_empty());
        assert!(content_tags(&meta(json!({})), &schema).is_empty());
    }

    #[test]
    fn nested_field_and_case_preserved() {
        let schema = CollectionSchema {
            tag_field: "meta.labels".into(),
            content_tags_lowercase: false,
            ..Default::default()
        };
        let m = meta(json!({"meta": {"labels": ["Rust", "CLI"]}}));
        assert_eq!(content_tags(&m, &schema), vec!["Rust", "CLI"]);
    }
}
