//! Tests for audit sink

use voice_slot_scheduler::core::{build_audit_event, AuditAction, AuditSink, InMemoryAuditSink};

#[test]
fn test_in_memory_audit_sink() {
    let sink = InMemoryAuditSink::new(10);

    let event = build_audit_event(AuditAction::Enqueue, Some("job1"), None, None);

    sink.record(event);
    assert_eq!(sink.events().len(), 1);

    let events = sink.events();
    assert_eq!(events[0].job_id.as_deref(), Some("job1"));
    assert_eq!(events[0].action, AuditAction::Enqueue);
    assert!(events[0].tracking_id.is_none());
}

#[test]
fn test_audit_sink_overflow() {
    let sink = InMemoryAuditSink::new(2);

    sink.record(build_audit_event(AuditAction::Enqueue, Some("job1"), None, None));
    sink.record(build_audit_event(AuditAction::Enqueue, Some("job2"), None, None));
    sink.record(build_audit_event(AuditAction::Enqueue, Some("job3"), None, None));

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].job_id.as_deref(), Some("job2")); // First one popped
    assert_eq!(events[1].job_id.as_deref(), Some("job3"));
}

#[test]
fn test_zero_capacity_sink_drops_everything() {
    let sink = InMemoryAuditSink::new(0);
    sink.record(build_audit_event(AuditAction::Release, None, Some("conv"), None));
    assert!(sink.events().is_empty());
}

#[test]
fn test_job_ids_filter_by_action() {
    let sink = InMemoryAuditSink::new(10);
    sink.record(build_audit_event(AuditAction::Enqueue, Some("a"), None, None));
    sink.record(build_audit_event(AuditAction::Dispatch, Some("a"), None, None));
    sink.record(build_audit_event(AuditAction::Enqueue, Some("b"), None, None));
    sink.record(build_audit_event(AuditAction::Release, None, Some("conv"), None));

    assert_eq!(sink.job_ids(AuditAction::Enqueue), ["a", "b"]);
    assert_eq!(sink.job_ids(AuditAction::Dispatch), ["a"]);
    assert!(sink.job_ids(AuditAction::Release).is_empty());
}

#[test]
fn test_build_audit_event() {
    let event = build_audit_event(
        AuditAction::Requeue,
        Some("job1-retry1"),
        None,
        Some("start call request failed: 500".to_string()),
    );

    assert_eq!(event.action, AuditAction::Requeue);
    assert_eq!(event.job_id.as_deref(), Some("job1-retry1"));
    assert_eq!(event.detail.as_deref(), Some("start call request failed: 500"));
    assert!(event.created_at_ms > 0);
    assert_eq!(event.action.to_string(), "requeue");
}

#[test]
fn test_default_capacity() {
    let sink = InMemoryAuditSink::default();
    for i in 0..(InMemoryAuditSink::DEFAULT_CAPACITY + 5) {
        sink.record(build_audit_event(AuditAction::Enqueue, Some(&format!("job{i}")), None, None));
    }
    let events = sink.events();
    assert_eq!(events.len(), InMemoryAuditSink::DEFAULT_CAPACITY);
    assert_eq!(events[0].job_id.as_deref(), Some("job5"));
}
