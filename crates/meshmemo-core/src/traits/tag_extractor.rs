/// Turns free text into tags for the WaveRAG lens phase.
pub trait ITagExtractor: Send + Sync {
    fn extract(&self, text: &str) -> Vec<String>;
}

/// Lower-cased, punctuation-trimmed whitespace tokens, deduplicated in
/// first-seen order. Tokens shorter than `min_len` characters are dropped.
#[derive(Debug, Clone)]
pub struct WhitespaceTagExtractor {
    pub min_len: usize,
}

impl Default for WhitespaceTagExtractor {
    fn default() -> Self {
        Self { min_len: 2 }
    }
}

impl ITagExtractor for WhitespaceTagExtractor {
    fn extract(&self, text: &str) -> Vec<String> {
        let mut tags: Vec<String> = Vec::new();
        for token in text.split_whitespace() {
            let tag = token
                .trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase();
            if tag.chars().count() >= self.min_len && !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        tags
    }
}
