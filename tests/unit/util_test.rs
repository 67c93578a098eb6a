//! Tests for utility functions

use voice_slot_scheduler::util::{new_job_id, now_ms, JobId, Priority};

#[test]
fn test_priority_ordering() {
    assert!(Priority::new(5) > Priority::new(1));
    assert!(Priority::new(0) > Priority::new(-1));
    assert!(Priority::FLOOR < Priority::new(-999));
}

#[test]
fn test_priority_floor_and_decay() {
    assert_eq!(Priority::new(-5000), Priority::FLOOR);
    assert_eq!(Priority::new(3).decayed(), Priority::new(2));
    assert_eq!(Priority::FLOOR.decayed(), Priority::FLOOR);
    assert_eq!(Priority::new(i64::MIN).decayed().value(), -1000);
}

#[test]
fn test_priority_serializes_as_integer() {
    assert_eq!(serde_json::to_string(&Priority::new(4)).unwrap(), "4");
    let p: Priority = serde_json::from_str("-2000").unwrap();
    assert_eq!(p, Priority::FLOOR);
}

#[test]
fn test_job_ids_are_unique() {
    let a: JobId = new_job_id();
    let b: JobId = new_job_id();
    assert_ne!(a, b);
    assert_eq!(a.len(), 36);
}

#[test]
fn test_clock_is_wall_time() {
    assert!(now_ms() > 1_600_000_000_000);
}
