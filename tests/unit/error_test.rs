//! Tests for error types

use voice_slot_scheduler::core::SchedulerError;

#[test]
fn test_status_error() {
    let err = SchedulerError::Status {
        endpoint: "start call",
        status: 502,
    };
    assert_eq!(format!("{}", err), "start call request failed: 502");
}

#[test]
fn test_not_configured_error() {
    let err = SchedulerError::NotConfigured("ELEVENLABS_START_CALL_URL");
    assert_eq!(format!("{}", err), "not configured: ELEVENLABS_START_CALL_URL");
}

#[test]
fn test_invalid_payload_error() {
    let err = SchedulerError::InvalidPayload(
        "missing required outbound-call fields: to_number".to_string(),
    );
    assert_eq!(
        format!("{}", err),
        "invalid payload: missing required outbound-call fields: to_number"
    );
}

#[test]
fn test_missing_tracking_id_error() {
    let err = SchedulerError::MissingTrackingId;
    assert_eq!(
        format!("{}", err),
        "could not determine tracking id from dispatch response"
    );
}

#[test]
fn test_app_result_wraps_scheduler_error() {
    fn fails() -> voice_slot_scheduler::core::AppResult<()> {
        Err(SchedulerError::InvalidConfig("concurrency_limit must be greater than 0".into()).into())
    }
    let err = fails().unwrap_err();
    assert!(err.to_string().contains("concurrency_limit"));
    assert!(err.downcast_ref::<SchedulerError>().is_some());
}
