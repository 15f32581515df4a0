//! Adaptive result count.
//!
//! K starts at `base_k` and moves by signed, recorded adjustments derived
//! from the query's shape, the corpus size, and (optionally) the quality of
//! past results. The final K is always within `[min_k, max_k]`; a clamp is
//! recorded like any other adjustment.

use std::sync::LazyLock;

use meshmemo_core::config::DynamicKConfig;
use meshmemo_core::models::{DynamicKResult, KAdjustment, QualityStats, QueryAnalysis};
use regex::Regex;
use tracing::debug;

static QUESTION: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(what|why|how|when|where|who|whom|which|whose|is|are|can|could|should|would|will|does|do|did|explain|describe)\b",
    )
    .ok()
});
static CAPITALIZED: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\b[A-Z][A-Za-z0-9]+\b").ok());
static QUOTED: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#""[^"]+"|“[^”]+”"#).ok());
static LONG_NUMBER: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\d{4,}").ok());

const CONNECTORS: &[&str] = &["and", "or", "also", "plus", "versus", "vs", "then"];
const STOPWORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "any", "can", "had", "her", "was",
    "one", "our", "out", "has", "him", "his", "how", "its", "who", "why", "what", "when", "where",
    "which", "does", "did", "this", "that", "with", "from", "they", "them", "then", "there",
    "their", "have", "been", "into", "about", "also", "plus", "versus", "would", "could",
    "should", "will", "is", "it", "of", "to", "in", "on", "or", "a", "an", "do", "be",
];
const MAX_INTENTS: usize = 5;
/// Keyword count at which the keyword term saturates.
const KEYWORD_SCALE: f64 = 15.0;
const KEYWORD_CAP: f64 = 0.3;
const QUESTION_WEIGHT: f64 = 0.1;
const ENTITY_WEIGHT: f64 = 0.15;
const INTENT_WEIGHT: f64 = 0.1;
const BRACKET_WEIGHT: f64 = 0.1;
const NUMBER_WEIGHT: f64 = 0.05;
const BASE_CONFIDENCE: f64 = 0.7;

fn matches(re: &LazyLock<Option<Regex>>, text: &str) -> bool {
    re.as_ref().is_some_and(|r| r.is_match(text))
}

fn count(re: &LazyLock<Option<Regex>>, text: &str) -> usize {
    re.as_ref().map_or(0, |r| r.find_iter(text).count())
}

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

/// Population mean, variance, and share of scores at or above
/// `high_threshold`. Empty input yields all zeros.
pub fn quality_stats(scores: &[f64], high_threshold: f64) -> QualityStats {
    if scores.is_empty() {
        return QualityStats::default();
    }
    let n = scores.len() as f64;
    let mean = scores.iter().sum::<f64>() / n;
    let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
    let high = scores.iter().filter(|s| **s >= high_threshold).count() as f64;
    QualityStats {
        avg_relevance: mean,
        score_variance: variance,
        high_quality_ratio: high / n,
    }
}

#[derive(Debug, Clone, Default)]
pub struct DynamicKCalculator {
    config: DynamicKConfig,
}

impl DynamicKCalculator {
    /// Out-of-range config values are clamped, never rejected.
    pub fn new(config: DynamicKConfig) -> Self {
        Self {
            config: config.clamped(),
        }
    }

    pub fn config(&self) -> &DynamicKConfig {
        &self.config
    }

    /// Score the query's complexity and infer its intents and entities.
    pub fn analyze_query(&self, text: &str) -> QueryAnalysis {
        let tokens: Vec<String> = words(text).collect();
        let keyword_count = tokens
            .iter()
            .filter(|w| w.chars().count() >= 3 && !STOPWORDS.contains(&w.as_str()))
            .count();
        let connectors = tokens
            .iter()
            .filter(|w| CONNECTORS.contains(&w.as_str()))
            .count();
        let intent_count = (1 + connectors).min(MAX_INTENTS);

        let is_question = text.contains('?') || text.contains('？') || matches(&QUESTION, text);

        // The leading word is capitalized by convention, not because it names something.
        let trimmed = text.trim_start();
        let rest = trimmed.find(char::is_whitespace).map_or("", |i| &trimmed[i..]);
        let capitalized = count(&CAPITALIZED, rest);
        let entities = capitalized + count(&QUOTED, text);
        let has_multiple_entities = entities >= 2;

        let mut complexity = (keyword_count as f64 / KEYWORD_SCALE).min(KEYWORD_CAP);
        if is_question {
            complexity += QUESTION_WEIGHT;
        }
        if has_multiple_entities {
            complexity += ENTITY_WEIGHT;
        }
        complexity += (intent_count - 1) as f64 * INTENT_WEIGHT;
        if text.contains(['(', ')', '[', ']', '{', '}']) {
            complexity += BRACKET_WEIGHT;
        }
        if matches(&LONG_NUMBER, text) {
            complexity += NUMBER_WEIGHT;
        }

        QueryAnalysis {
            complexity: complexity.clamp(0.0, 1.0),
            intent_count,
            has_multiple_entities,
            is_question,
            keyword_count,
        }
    }

    /// Choose K for an analyzed query.
    pub fn calculate_with_details(
        &self,
        analysis: &QueryAnalysis,
        corpus_size: usize,
        quality: Option<&QualityStats>,
    ) -> DynamicKResult {
        let cfg = &self.config;
        let mut adjustments: Vec<KAdjustment> = Vec::new();
        let mut reasons: Vec<String> = Vec::new();
        let mut adjust = |factor: &str, delta: i64, reason: String| {
            if delta != 0 {
                adjustments.push(KAdjustment {
                    factor: factor.to_string(),
                    delta,
                });
                reasons.push(reason);
            }
        };

        if analysis.complexity > cfg.complexity_threshold {
            // The epsilon keeps 0.4 - 0.3 from ceiling to 2.
            let excess = (analysis.complexity - cfg.complexity_threshold) * 10.0;
            let delta = (excess - 1e-9).ceil().max(1.0) as i64;
            adjust(
                "complexity",
                delta,
                format!("complexity {:.2} above {:.2}", analysis.complexity, cfg.complexity_threshold),
            );
        }
        if analysis.intent_count > 1 {
            adjust(
                "multi_intent",
                analysis.intent_count as i64 - 1,
                format!("{} intents", analysis.intent_count),
            );
        }
        if analysis.has_multiple_entities {
            adjust("multi_entity", 2, "multiple entities".to_string());
        }
        if analysis.is_question {
            adjust("question", 1, "question".to_string());
        }
        if corpus_size > cfg.corpus_size_threshold {
            let ratio = corpus_size as f64 / cfg.corpus_size_threshold as f64;
            let delta = (ratio.log10() * 2.0).ceil() as i64;
            adjust("corpus_size", delta, format!("large corpus ({corpus_size})"));
        } else if corpus_size < cfg.small_corpus_size {
            adjust("corpus_size", -1, format!("small corpus ({corpus_size})"));
        }

        if let Some(q) = quality {
            if q.avg_relevance < cfg.low_relevance_threshold {
                adjust("low_relevance", 2, format!("low avg relevance {:.2}", q.avg_relevance));
            } else if q.avg_relevance > cfg.high_relevance_threshold {
                adjust("high_relevance", -1, format!("high avg relevance {:.2}", q.avg_relevance));
            }
            if q.score_variance > cfg.high_variance_threshold {
                adjust("high_variance", 1, format!("score variance {:.3}", q.score_variance));
            }
            if q.high_quality_ratio < cfg.low_high_quality_ratio {
                adjust(
                    "low_high_quality_ratio",
                    1,
                    format!("high-quality ratio {:.2}", q.high_quality_ratio),
                );
            }
        }

        let raw = adjustments
            .iter()
            .fold(cfg.base_k as i64, |acc, a| acc.saturating_add(a.delta));
        let (min_k, max_k) = (cfg.min_k as i64, cfg.max_k.max(cfg.min_k) as i64);
        let k = raw.clamp(min_k, max_k);
        if k != raw {
            let factor = if raw > max_k { "clamp_max" } else { "clamp_min" };
            adjustments.push(KAdjustment {
                factor: factor.to_string(),
                delta: k - raw,
            });
            reasons.push(format!("clamped {raw} into [{min_k}, {max_k}]"));
        }

        let mut confidence = BASE_CONFIDENCE;
        if analysis.complexity <= cfg.complexity_threshold {
            confidence += 0.1;
        }
        if analysis.intent_count <= 1 {
            confidence += 0.1;
        }
        if let Some(q) = quality {
            confidence += 0.1;
            if q.score_variance <= cfg.high_variance_threshold {
                confidence += 0.05;
            }
        }

        let result = DynamicKResult {
            k: k as usize,
            reasons,
            adjustments,
            confidence: confidence.min(1.0),
        };
        debug!(
            k = result.k,
            corpus_size,
            complexity = analysis.complexity,
            confidence = result.confidence,
            "dynamic k computed"
        );
        result
    }

    /// Analyze `query` and choose K for it.
    pub fn calculate(
        &self,
        query: &str,
        corpus_size: usize,
        quality: Option<&QualityStats>,
    ) -> DynamicKResult {
        self.calculate_with_details(&self.analyze_query(query), corpus_size, quality)
    }
}
