use std::time::Duration;

use meshmemo_core::models::DegradationEvent;
use meshmemo_observability::{tracing_setup, DegradationTracker, QueryLog, QueryLogEntry};

fn entry(ms: u64, k: Option<usize>) -> QueryLogEntry {
    QueryLogEntry::new(Some("q".into()), Duration::from_millis(ms), 10, 5, k)
}

#[test]
fn query_log_is_a_ring_buffer() {
    let mut log = QueryLog::with_capacity(3);
    for ms in [10, 20, 30, 40] {
        log.record(entry(ms, None));
    }
    assert_eq!(log.count(), 3);
    let first = log.entries().next().unwrap();
    assert_eq!(first.latency, Duration::from_millis(20));
}

#[test]
fn query_log_latency_stats() {
    let mut log = QueryLog::new();
    assert_eq!(log.avg_latency(), Duration::ZERO);
    for ms in [10, 20, 30, 40, 50] {
        log.record(entry(ms, None));
    }
    assert_eq!(log.avg_latency(), Duration::from_millis(30));
    assert_eq!(log.latency_percentile(0.0), Duration::from_millis(10));
    assert_eq!(log.latency_percentile(1.0), Duration::from_millis(50));
    assert_eq!(log.latency_percentile(0.5), Duration::from_millis(30));
}

#[test]
fn query_log_averages_dynamic_k() {
    let mut log = QueryLog::new();
    assert_eq!(log.avg_dynamic_k(), None);
    log.record(entry(1, Some(4)));
    log.record(entry(1, None));
    log.record(entry(1, Some(8)));
    assert_eq!(log.avg_dynamic_k(), Some(6.0));
}

#[test]
fn tracker_serializes_events() {
    let mut t = DegradationTracker::new();
    t.record(DegradationEvent::now("rerank", "timeout after 3000ms", "local"));
    let json = serde_json::to_value(t.events()).unwrap();
    assert_eq!(json[0]["event"]["component"], "rerank");
    assert_eq!(json[0]["recovery_status"], "active");
}

#[test]
fn init_is_idempotent() {
    let _ = tracing_setup::init("debug", false);
    assert!(!tracing_setup::init("debug", true));
}

#[test]
fn span_macros_expand() {
    let span = meshmemo_observability::search_span!(12usize, true);
    let _guard = span.enter();
    let _rerank = meshmemo_observability::rerank_span!("local", 3usize);
    let _wave = meshmemo_observability::wave_rag_span!("trace-1", 2usize);
    let _tags = meshmemo_observability::tag_update_span!(1u64, 4usize);
}
