//! Tests for builder modules

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use voice_slot_scheduler::builders::build_scheduler;
use voice_slot_scheduler::config::AppConfig;
use voice_slot_scheduler::core::{AuditAction, InMemoryAuditSink, SchedulerError};
use voice_slot_scheduler::infra::elevenlabs::CallPayload;
use voice_slot_scheduler::runtime::TokioSpawner;
use voice_slot_scheduler::util::serde::Priority;

#[tokio::test]
async fn test_scheduler_builder_uses_config() {
    let config = AppConfig {
        concurrency_limit: 7,
        polling_interval: Duration::from_millis(100),
        ..AppConfig::default()
    };

    let scheduler = build_scheduler(&config, TokioSpawner::current()).unwrap();
    assert_eq!(scheduler.policy().concurrency_limit, 7);
    assert_eq!(
        scheduler.policy().effective_polling_interval(),
        Duration::from_millis(500)
    );

    let stats = scheduler.stats();
    assert_eq!(stats.queue_size, 0);
    assert_eq!(stats.available_slots, 7);
}

#[tokio::test]
async fn test_scheduler_builder_rejects_invalid_config() {
    let config = AppConfig {
        concurrency_limit: 0,
        ..AppConfig::default()
    };
    let err = build_scheduler(&config, TokioSpawner::current()).unwrap_err();
    assert!(matches!(err, SchedulerError::InvalidConfig(_)));
}

#[tokio::test]
async fn test_built_scheduler_debug_output() {
    let config = AppConfig {
        concurrency_limit: 7,
        ..AppConfig::default()
    };
    let scheduler = build_scheduler(&config, TokioSpawner::current()).unwrap();

    let rendered = format!("{scheduler:?}");
    assert!(rendered.starts_with("Scheduler {"));
    assert!(rendered.contains("concurrency_limit: 7"));
    assert!(rendered.contains("in_flight: 0"));
    assert!(rendered.contains("audited: false"));
}

#[tokio::test]
async fn test_built_scheduler_records_audit_once_attached() {
    let sink = Arc::new(InMemoryAuditSink::new(16));
    let scheduler = build_scheduler(&AppConfig::default(), TokioSpawner::current())
        .unwrap()
        .with_audit(sink.clone());
    assert!(format!("{scheduler:?}").contains("audited: true"));

    let payload: CallPayload = serde_json::from_value(json!({ "toNumber": "+1" })).unwrap();
    let submission = scheduler.submit(payload, Priority::new(2));

    assert_eq!(sink.job_ids(AuditAction::Enqueue), vec![submission.id]);
}
