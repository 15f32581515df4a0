use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Arbitrary nested metadata attached to a chunk.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Follow a dotted path (`"a.b.c"`) through nested metadata objects.
///
/// `None` when any segment is missing or an intermediate value is not an
/// object. Never an error.
pub fn resolve_path<'a>(metadata: &'a Metadata, path: &str) -> Option<&'a serde_json::Value> {
    let mut segments = path.split('.');
    let mut current = metadata.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// A unit of stored content as seen by the retrieval core.
///
/// Chunks are owned by the chunk store. The pipeline only borrows them for
/// the duration of a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Chunk {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            embedding: None,
            metadata: Metadata::new(),
            created_at: None,
        }
    }

    pub fn has_embedding(&self) -> bool {
        self.embedding.as_ref().is_some_and(|e| !e.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn meta(value: serde_json::Value) -> Metadata {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn resolves_nested_paths() {
        let m = meta(json!({"a": {"b": {"c": 3}}, "top": "x"}));
        assert_eq!(resolve_path(&m, "a.b.c"), Some(&json!(3)));
        assert_eq!(resolve_path(&m, "top"), Some(&json!("x")));
    }

    #[test]
    fn missing_or_non_object_segments_are_none() {
        let m = meta(json!({"a": {"b": 1}, "s": "str"}));
        assert_eq!(resolve_path(&m, "a.x"), None);
        assert_eq!(resolve_path(&m, "a.b.c"), None);
        assert_eq!(resolve_path(&m, "s.len"), None);
        assert_eq!(resolve_path(&m, ""), None);
    }
}
