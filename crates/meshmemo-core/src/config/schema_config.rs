use serde::{Deserialize, Serialize};

/// Declared metadata layout of a collection.
///
/// Tag, time and diversity fields are resolved from here instead of probing
/// arbitrary metadata keys at query time. Field names are dotted paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionSchema {
    pub tag_field: String,
    pub time_field: String,
    pub diversity_fields: Vec<String>,
    /// Lower-case content tags before matching against query tags.
    pub content_tags_lowercase: bool,
}

impl Default for CollectionSchema {
    fn default() -> Self {
        Self {
            tag_field: "tags".to_string(),
            time_field: "timestamp".to_string(),
            diversity_fields: vec!["category".to_string()],
            content_tags_lowercase: true,
        }
    }
}
