//! Default values for every config section.

// Retrieval
pub const DEFAULT_SEMANTIC_THRESHOLD: f64 = 0.3;
pub const DEFAULT_RECALL_TOP_K: usize = 50;
pub const DEFAULT_FINAL_K: usize = 10;

// Tag matrix
pub const DEFAULT_TAG_ALPHA: f64 = 0.8;
pub const DEFAULT_TAG_BETA: f64 = 0.2;
pub const DEFAULT_EXPANSION_FACTOR: f64 = 0.5;
pub const DEFAULT_ASSOCIATIONS_TOP_K: usize = 10;
pub const DEFAULT_BOOST_ALPHA_MIN: f64 = 1.5;
pub const DEFAULT_BOOST_ALPHA_MAX: f64 = 3.5;
pub const DEFAULT_BOOST_BETA_BASE: f64 = 2.0;

// Dynamic K
pub const DEFAULT_BASE_K: usize = 5;
pub const DEFAULT_MIN_K: usize = 3;
pub const DEFAULT_MAX_K: usize = 20;
pub const DEFAULT_COMPLEXITY_THRESHOLD: f64 = 0.3;
pub const DEFAULT_CORPUS_SIZE_THRESHOLD: usize = 1_000;
pub const DEFAULT_SMALL_CORPUS_SIZE: usize = 100;
pub const DEFAULT_LOW_RELEVANCE: f64 = 0.4;
pub const DEFAULT_HIGH_RELEVANCE: f64 = 0.8;
pub const DEFAULT_HIGH_VARIANCE: f64 = 0.1;
pub const DEFAULT_LOW_HIGH_QUALITY_RATIO: f64 = 0.3;

// Fusion
pub const DEFAULT_RRF_K: f64 = 60.0;
pub const DEFAULT_BM25_WEIGHT: f64 = 0.5;
pub const DEFAULT_VECTOR_WEIGHT: f64 = 0.5;
pub const DEFAULT_TAG_BOOST_WEIGHT: f64 = 0.2;
pub const DEFAULT_FUSION_LIMIT: usize = 20;

// WaveRAG
pub const DEFAULT_LENS_MAX_TAGS: usize = 10;
pub const DEFAULT_EXPANSION_DEPTH: u32 = 2;
pub const DEFAULT_EXPANSION_THRESHOLD: f64 = 0.3;
pub const DEFAULT_EXPANSION_MAX_TAGS: usize = 20;
pub const DEFAULT_EXPANSION_FANOUT: usize = 5;
pub const DEFAULT_EXPANSION_DECAY: f64 = 0.7;
pub const DEFAULT_FOCUS_TOP_K: usize = 10;
pub const DEFAULT_FOCUS_SCORE_THRESHOLD: f64 = 0.5;
pub const DEFAULT_TAG_MEMO_WEIGHT: f64 = 0.65;

// Diversity
pub const DEFAULT_MMR_LAMBDA: f64 = 0.7;

// Time decay
pub const DEFAULT_HALF_LIFE_DAYS: f64 = 30.0;

// Rerank
pub const DEFAULT_MIN_KEYWORD_LEN: usize = 2;
pub const DEFAULT_KEYWORD_DENSITY_WEIGHT: f64 = 2.0;
pub const DEFAULT_MAX_DENSITY_BOOST: f64 = 0.3;
pub const DEFAULT_FIRST_PARAGRAPH_BOOST: f64 = 1.1;
pub const DEFAULT_EXACT_PHRASE_BOOST: f64 = 1.5;
pub const DEFAULT_MIN_PHRASE_LEN: usize = 4;
pub const DEFAULT_NEURAL_MAX_DOCUMENTS: usize = 50;
pub const DEFAULT_NEURAL_MIN_SCORE: f64 = 0.0;
pub const DEFAULT_NEURAL_TIMEOUT_MS: u64 = 3_000;

// Backend
pub const DEFAULT_PARALLEL_MIN_BATCH: usize = 256;

// Observability
pub const DEFAULT_QUERY_LOG_CAPACITY: usize = 10_000;
