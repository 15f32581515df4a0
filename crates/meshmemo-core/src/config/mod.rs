pub mod backend_config;
pub mod defaults;
pub mod diversity_config;
pub mod dynamic_k_config;
pub mod fusion_config;
pub mod observability_config;
pub mod rerank_config;
pub mod retrieval_config;
pub mod schema_config;
pub mod tag_config;
pub mod time_decay_config;
pub mod validation;
pub mod wave_rag_config;

pub use backend_config::BackendConfig;
pub use diversity_config::DiversityConfig;
pub use dynamic_k_config::DynamicKConfig;
pub use fusion_config::FusionConfig;
pub use observability_config::ObservabilityConfig;
pub use rerank_config::RerankConfig;
pub use retrieval_config::RetrievalConfig;
pub use schema_config::CollectionSchema;
pub use tag_config::TagMatrixConfig;
pub use time_decay_config::TimeDecayConfig;
pub use wave_rag_config::WaveRagConfig;

use serde::{Deserialize, Serialize};

/// Top-level configuration aggregating all sub-configs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    pub retrieval: RetrievalConfig,
    pub tags: TagMatrixConfig,
    pub dynamic_k: DynamicKConfig,
    pub fusion: FusionConfig,
    pub wave_rag: WaveRagConfig,
    pub diversity: DiversityConfig,
    pub time_decay: TimeDecayConfig,
    pub rerank: RerankConfig,
    pub backend: BackendConfig,
    pub schema: CollectionSchema,
    pub observability: ObservabilityConfig,
}

impl MeshConfig {
    /// Load from a TOML string. Missing sections and fields take their defaults.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Clamp every out-of-range numeric value to its nearest valid bound.
    /// Each adjustment is logged at warn level; nothing here fails.
    pub fn validated(self) -> Self {
        Self {
            retrieval: self.retrieval.clamped(),
            tags: self.tags.clamped(),
            dynamic_k: self.dynamic_k.clamped(),
            fusion: self.fusion.clamped(),
            wave_rag: self.wave_rag.clamped(),
            diversity: self.diversity.clamped(),
            time_decay: self.time_decay.clamped(),
            rerank: self.rerank.clamped(),
            backend: self.backend,
            schema: self.schema,
            observability: self.observability,
        }
    }
}
