//! Test fixture loader for MeshMemo golden datasets, plus builders for the
//! chunks and ranked lists that integration tests construct by hand.

use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use meshmemo_core::models::{Chunk, Metadata, RankedItem};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Root directory of the fixture data (`<workspace>/test-fixtures`).
fn fixtures_root() -> PathBuf {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let mut path = PathBuf::from(&manifest_dir);

    // The fixture crate itself is also called test-fixtures, so look for the
    // data directory by its golden/ subfolder.
    while !path.join("test-fixtures").join("golden").exists() {
        if !path.pop() {
            panic!(
                "Could not find test-fixtures/golden from CARGO_MANIFEST_DIR={}",
                manifest_dir
            );
        }
    }
    path.join("test-fixtures")
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixtures_root().join(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}

/// Load a fixture file as raw JSON Value.
pub fn load_fixture_value(relative_path: &str) -> Value {
    load_fixture(relative_path)
}

/// Check that a fixture file exists.
pub fn fixture_exists(relative_path: &str) -> bool {
    fixtures_root().join(relative_path).exists()
}

/// Load a fixture file as raw text.
pub fn load_fixture_text(relative_path: &str) -> String {
    let path = fixtures_root().join(relative_path);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e))
}

/// List all JSON files in a fixture subdirectory, sorted by name.
pub fn list_fixtures(subdir: &str) -> Vec<PathBuf> {
    let dir = fixtures_root().join(subdir);
    if !dir.exists() {
        return Vec::new();
    }
    let mut files: Vec<PathBuf> = std::fs::read_dir(&dir)
        .unwrap_or_else(|e| panic!("Failed to read directory {}: {}", dir.display(), e))
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            path.extension()
                .is_some_and(|ext| ext == "json")
                .then_some(path)
        })
        .collect();
    files.sort();
    files
}

/// Builder for [`Chunk`] values.
#[derive(Debug, Clone)]
pub struct ChunkBuilder {
    chunk: Chunk,
}

impl ChunkBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            chunk: Chunk::new(id, format!("content of {id}")),
        }
    }

    pub fn content(mut self, content: &str) -> Self {
        self.chunk.content = content.to_string();
        self
    }

    pub fn embedding(mut self, embedding: Vec<f32>) -> Self {
        self.chunk.embedding = Some(embedding);
        self
    }

    pub fn meta(mut self, key: &str, value: Value) -> Self {
        self.chunk.metadata.insert(key.to_string(), value);
        self
    }

    pub fn metadata(mut self, metadata: Value) -> Self {
        if let Value::Object(map) = metadata {
            self.chunk.metadata = map;
        }
        self
    }

    pub fn tags(self, tags: &[&str]) -> Self {
        let tags = tags.iter().map(|t| Value::String(t.to_string())).collect();
        self.meta("tags", Value::Array(tags))
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.chunk.created_at = Some(at);
        self
    }

    pub fn age_days(self, days: i64) -> Self {
        self.created_at(Utc::now() - Duration::days(days))
    }

    pub fn build(self) -> Chunk {
        self.chunk
    }
}

/// Build a metadata map from a JSON object literal. Non-objects yield an empty map.
pub fn metadata(value: Value) -> Metadata {
    match value {
        Value::Object(map) => map,
        _ => Metadata::new(),
    }
}

/// Ranked list from `(id, score)` pairs, in the given order.
pub fn ranked(items: &[(&str, f64)]) -> Vec<RankedItem> {
    items
        .iter()
        .map(|(id, score)| RankedItem::new(*id, *score).with_content(format!("content of {id}")))
        .collect()
}

/// Unit vector along `axis` in `dims` dimensions.
pub fn unit_vector(dims: usize, axis: usize) -> Vec<f32> {
    let mut v = vec![0.0; dims];
    if axis < dims {
        v[axis] = 1.0;
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_root_exists() {
        assert!(fixtures_root().join("golden").exists());
    }

    #[test]
    fn golden_files_parse_as_json() {
        for dir in ["golden/tags", "golden/retrieval", "golden/fusion", "golden/decay"] {
            let files = list_fixtures(dir);
            assert!(!files.is_empty(), "no fixtures in {dir}");
            for file in &files {
                let content = std::fs::read_to_string(file).unwrap();
                let _: Value = serde_json::from_str(&content)
                    .unwrap_or_else(|e| panic!("Failed to parse {}: {}", file.display(), e));
            }
        }
    }

    #[test]
    fn chunk_builder_sets_fields() {
        let chunk = ChunkBuilder::new("c1")
            .embedding(unit_vector(3, 1))
            .tags(&["a", "b"])
            .meta("category", Value::from("news"))
            .build();
        assert_eq!(chunk.id, "c1");
        assert_eq!(chunk.embedding.as_deref(), Some(&[0.0, 1.0, 0.0][..]));
        assert_eq!(chunk.metadata["tags"], serde_json::json!(["a", "b"]));
        assert_eq!(chunk.metadata["category"], "news");
    }
}
