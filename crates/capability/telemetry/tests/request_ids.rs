use alarm_telemetry::{metrics, new_request_ids, record_dispatch_latency_ms, record_notify_skipped};

#[test]
fn request_ids_non_empty() {
    let ids = new_request_ids();
    assert!(!ids.request_id.is_empty());
    assert!(!ids.trace_id.is_empty());
    assert_ne!(ids.request_id, ids.trace_id);
}

#[test]
fn counters_accumulate() {
    let before = metrics().snapshot();
    record_notify_skipped();
    record_dispatch_latency_ms(12);
    let after = metrics().snapshot();
    assert!(after.notify_skipped > before.notify_skipped);
    assert!(after.dispatch_latency_ms_total >= before.dispatch_latency_ms_total + 12);
    assert!(after.dispatch_latency_ms_count > before.dispatch_latency_ms_count);
}
