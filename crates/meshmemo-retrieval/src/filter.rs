//! Boolean predicates over nested chunk metadata.
//!
//! A missing field never errors. It fails every operator except the negated
//! ones (`not_equals`, `not_contains`, `not_in`), which it satisfies.

use meshmemo_core::models::{
    resolve_path, Chunk, FilterCondition, FilterLogic, FilterOperator, FilterSpec, Metadata,
};
use regex::{Regex, RegexBuilder};
use serde_json::Value;
use tracing::debug;

/// Caller-supplied extra predicate, AND-ed with the condition set.
pub type ChunkPredicate<'a> = &'a (dyn Fn(&Chunk) -> bool + Sync);

/// A condition with its regex compiled once per filter pass.
struct CompiledCondition<'a> {
    condition: &'a FilterCondition,
    regex: Option<Regex>,
}

impl<'a> CompiledCondition<'a> {
    fn new(condition: &'a FilterCondition) -> Self {
        let regex = match (&condition.operator, &condition.value) {
            (FilterOperator::Regex, Value::String(pattern)) => RegexBuilder::new(pattern)
                .case_insensitive(condition.ignore_case)
                .build()
                .map_err(|e| debug!(pattern = %pattern, error = %e, "invalid filter regex"))
                .ok(),
            _ => None,
        };
        Self { condition, regex }
    }

    fn evaluate(&self, metadata: &Metadata) -> bool {
        let c = self.condition;
        let Some(field) = resolve_path(metadata, &c.field).filter(|v| !v.is_null()) else {
            return c.operator.matches_missing();
        };

        match &c.operator {
            FilterOperator::Equals => values_equal(field, &c.value, c.ignore_case),
            FilterOperator::NotEquals => !values_equal(field, &c.value, c.ignore_case),
            FilterOperator::Contains => contains(field, &c.value, c.ignore_case),
            FilterOperator::NotContains => !contains(field, &c.value, c.ignore_case),
            FilterOperator::In => is_in(field, &c.value, c.ignore_case),
            FilterOperator::NotIn => !is_in(field, &c.value, c.ignore_case),
            FilterOperator::Range => in_range(field, &c.value),
            FilterOperator::Exists => true,
            FilterOperator::Regex => match (&self.regex, scalar_text(field)) {
                (Some(re), Some(text)) => re.is_match(&text),
                _ => false,
            },
            FilterOperator::AnyOf => any_of(field, &c.value, c.ignore_case),
            FilterOperator::AllOf => all_of(field, &c.value, c.ignore_case),
            FilterOperator::Unknown(name) => {
                debug!(operator = %name, field = %c.field, "unknown filter operator, passing");
                true
            }
        }
    }
}

/// Equality with numeric comparison across integer/float encodings, and
/// case folding when `ignore_case` is set and both sides are strings.
fn values_equal(a: &Value, b: &Value, ignore_case: bool) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::String(x), Value::String(y)) if ignore_case => x.to_lowercase() == y.to_lowercase(),
        _ => a == b,
    }
}

fn contains(field: &Value, value: &Value, ignore_case: bool) -> bool {
    match (field, value) {
        (Value::String(haystack), Value::String(needle)) => {
            if ignore_case {
                haystack.to_lowercase().contains(&needle.to_lowercase())
            } else {
                haystack.contains(needle.as_str())
            }
        }
        (Value::Array(items), _) => items.iter().any(|item| values_equal(item, value, ignore_case)),
        _ => false,
    }
}

fn is_in(field: &Value, value: &Value, ignore_case: bool) -> bool {
    match value {
        Value::Array(options) => options.iter().any(|o| values_equal(field, o, ignore_case)),
        _ => false,
    }
}

/// Inclusive `{min?, max?}` bounds on a numeric field.
fn in_range(field: &Value, bounds: &Value) -> bool {
    let (Some(n), Value::Object(bounds)) = (field.as_f64(), bounds) else {
        return false;
    };
    let min_ok = bounds.get("min").and_then(Value::as_f64).map_or(true, |min| n >= min);
    let max_ok = bounds.get("max").and_then(Value::as_f64).map_or(true, |max| n <= max);
    min_ok && max_ok
}

fn any_of(field: &Value, value: &Value, ignore_case: bool) -> bool {
    match (field, value) {
        (Value::Array(have), Value::Array(want)) => want
            .iter()
            .any(|w| have.iter().any(|h| values_equal(h, w, ignore_case))),
        _ => false,
    }
}

fn all_of(field: &Value, value: &Value, ignore_case: bool) -> bool {
    match (field, value) {
        (Value::Array(have), Value::Array(want)) => want
            .iter()
            .all(|w| have.iter().any(|h| values_equal(h, w, ignore_case))),
        _ => false,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Evaluate one condition against a metadata map.
pub fn evaluate(metadata: &Metadata, condition: &FilterCondition) -> bool {
    CompiledCondition::new(condition).evaluate(metadata)
}

/// Fraction of `spec`'s conditions that `metadata` satisfies, and whether it
/// passes under the spec's logic. An empty spec passes with score 1.0.
pub fn score(metadata: &Metadata, spec: &FilterSpec) -> (bool, f64) {
    let compiled: Vec<CompiledCondition<'_>> = spec.conditions.iter().map(CompiledCondition::new).collect();
    score_compiled(metadata, &compiled, spec.logic)
}

fn score_compiled(metadata: &Metadata, compiled: &[CompiledCondition<'_>], logic: FilterLogic) -> (bool, f64) {
    if compiled.is_empty() {
        return (true, 1.0);
    }
    let satisfied = compiled.iter().filter(|c| c.evaluate(metadata)).count();
    let passed = match logic {
        FilterLogic::And => satisfied == compiled.len(),
        FilterLogic::Or => satisfied > 0,
    };
    (passed, satisfied as f64 / compiled.len() as f64)
}

/// Keep the chunks that pass `spec` (and `predicate`, when given), paired with
/// their filter score. Input order is preserved.
pub fn apply_filter<'c>(
    chunks: &'c [Chunk],
    spec: &FilterSpec,
    predicate: Option<ChunkPredicate<'_>>,
) -> Vec<(&'c Chunk, f64)> {
    let compiled: Vec<CompiledCondition<'_>> = spec.conditions.iter().map(CompiledCondition::new).collect();
    let kept: Vec<(&Chunk, f64)> = chunks
        .iter()
        .filter_map(|chunk| {
            let (passed, score) = score_compiled(&chunk.metadata, &compiled, spec.logic);
            let custom = predicate.map_or(true, |p| p(chunk));
            (passed && custom).then_some((chunk, score))
        })
        .collect();
    debug!(
        input = chunks.len(),
        kept = kept.len(),
        conditions = spec.conditions.len(),
        "metadata filter applied"
    );
    kept
}
