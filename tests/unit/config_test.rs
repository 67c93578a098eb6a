//! Tests for configuration loading and validation

use std::collections::HashMap;
use std::time::Duration;

use voice_slot_scheduler::config::{AppConfig, CountStrategy};

#[test]
fn test_app_config_validation() {
    let valid = AppConfig::default();
    assert!(valid.validate().is_ok());
}

#[test]
fn test_app_config_invalid_concurrency_limit() {
    let invalid = AppConfig {
        concurrency_limit: 0,
        ..AppConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_app_config_invalid_timeout() {
    let invalid = AppConfig {
        http_timeout: Duration::ZERO,
        ..AppConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_from_lookup_uses_closure() {
    let cfg = AppConfig::from_lookup(|key| match key {
        "ELEVENLABS_CONCURRENCY_LIMIT" => Some("3".to_string()),
        "ELEVENLABS_ACTIVE_CALLS_URL" => Some("   ".to_string()),
        _ => None,
    });
    assert_eq!(cfg.concurrency_limit, 3);
    assert!(cfg.active_calls_url.is_none());
}

#[test]
fn test_empty_terminal_statuses_keep_defaults() {
    let vars: HashMap<String, String> = [("TERMINAL_STATUSES".to_string(), " , ,".to_string())]
        .into_iter()
        .collect();
    let cfg = AppConfig::from_map(&vars);
    assert_eq!(cfg.terminal_statuses, ["completed", "failed", "cancelled"]);
}

#[test]
fn test_count_strategy_parsing() {
    assert_eq!("dispatched".parse::<CountStrategy>(), Ok(CountStrategy::Dispatched));
    assert_eq!(" Batches ".parse::<CountStrategy>(), Ok(CountStrategy::Batches));
    assert!("calls".parse::<CountStrategy>().is_err());
    assert_eq!(CountStrategy::Batches.to_string(), "batches");
}

#[test]
fn test_capability_gaps_when_unconfigured() {
    let gaps = AppConfig::default().capability_gaps();
    assert_eq!(gaps.len(), 3);
    assert!(gaps[0].contains("ELEVENLABS_API_KEY"));
}
