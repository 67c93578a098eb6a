//! Process configuration read from environment variables.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::SchedulerPolicy;

/// How the active count is derived from a list of batch records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountStrategy {
    /// Sum `total_calls_dispatched` over active batches.
    #[default]
    Dispatched,
    /// Count active batches.
    Batches,
}

impl FromStr for CountStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dispatched" => Ok(Self::Dispatched),
            "batches" => Ok(Self::Batches),
            other => Err(format!("unknown active count strategy `{other}`")),
        }
    }
}

impl fmt::Display for CountStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Dispatched => "dispatched",
            Self::Batches => "batches",
        })
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Listening port.
    pub port: u16,
    /// Requested tick interval; the scheduler enforces its own minimum.
    pub polling_interval: Duration,
    /// Maximum concurrently active calls.
    pub concurrency_limit: u32,
    /// Credential sent as `xi-api-key`.
    pub api_key: String,
    /// Endpoint reporting active calls; `None` disables polling.
    pub active_calls_url: Option<String>,
    /// Endpoint that starts a call; `None` makes every dispatch fail.
    pub start_call_url: Option<String>,
    /// Lower-cased batch statuses counted as active.
    pub active_statuses: Vec<String>,
    /// Aggregation used for batch lists.
    pub count_strategy: CountStrategy,
    /// Lower-cased statuses that release a tracked call.
    pub terminal_statuses: Vec<String>,
    /// Optional staleness timeout for tracked calls.
    pub in_flight_ttl: Option<Duration>,
    /// Timeout applied to every outbound HTTP request.
    pub http_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 4000,
            polling_interval: Duration::from_millis(2000),
            concurrency_limit: 5,
            api_key: String::new(),
            active_calls_url: None,
            start_call_url: None,
            active_statuses: vec!["in_progress".to_string()],
            count_strategy: CountStrategy::Dispatched,
            terminal_statuses: SchedulerPolicy::DEFAULT_TERMINAL_STATUSES
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            in_flight_ttl: None,
            http_timeout: Duration::from_secs(10),
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration from a key/value map.
    #[must_use]
    pub fn from_map(vars: &HashMap<String, String>) -> Self {
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    /// Read configuration through an arbitrary lookup.
    ///
    /// Numbers that are missing, unparseable or not positive fall back to
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let text = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let count_strategy = match text("ELEVENLABS_ACTIVE_COUNT_STRATEGY") {
            None => defaults.count_strategy,
            Some(raw) => raw.parse().unwrap_or_else(|err: String| {
                warn!("{err}; falling back to `{}`", defaults.count_strategy);
                defaults.count_strategy
            }),
        };

        Self {
            port: positive(text("PORT")).unwrap_or(defaults.port),
            polling_interval: positive(text("POLLING_INTERVAL_MS"))
                .map_or(defaults.polling_interval, Duration::from_millis),
            concurrency_limit: positive(text("ELEVENLABS_CONCURRENCY_LIMIT"))
                .unwrap_or(defaults.concurrency_limit),
            api_key: text("ELEVENLABS_API_KEY").unwrap_or_default(),
            active_calls_url: text("ELEVENLABS_ACTIVE_CALLS_URL"),
            start_call_url: text("ELEVENLABS_START_CALL_URL"),
            active_statuses: text("ELEVENLABS_ACTIVE_STATUSES")
                .map_or(defaults.active_statuses, |raw| split_statuses(&raw)),
            count_strategy,
            terminal_statuses: text("TERMINAL_STATUSES")
                .map(|raw| split_statuses(&raw))
                .filter(|list| !list.is_empty())
                .unwrap_or(defaults.terminal_statuses),
            in_flight_ttl: positive(text("IN_FLIGHT_TTL_MS")).map(Duration::from_millis),
            http_timeout: positive(text("HTTP_TIMEOUT_MS"))
                .map_or(defaults.http_timeout, Duration::from_millis),
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.concurrency_limit == 0 {
            return Err("concurrency_limit must be greater than 0".into());
        }
        if self.polling_interval.is_zero() {
            return Err("polling_interval must be greater than 0".into());
        }
        if self.http_timeout.is_zero() {
            return Err("http_timeout must be greater than 0".into());
        }
        Ok(())
    }

    /// Human-readable notes for every optional setting left empty.
    #[must_use]
    pub fn capability_gaps(&self) -> Vec<&'static str> {
        let mut gaps = Vec::new();
        if self.api_key.is_empty() {
            gaps.push(
                "ELEVENLABS_API_KEY is not set. Outbound requests will fail until configured.",
            );
        }
        if self.active_calls_url.is_none() {
            gaps.push("ELEVENLABS_ACTIVE_CALLS_URL is not set. Active call polling is disabled.");
        }
        if self.start_call_url.is_none() {
            gaps.push(
                "ELEVENLABS_START_CALL_URL is not set. Calls cannot be started until configured.",
            );
        }
        gaps
    }

    /// Log each capability gap as a warning.
    pub fn warn_capability_gaps(&self) {
        for gap in self.capability_gaps() {
            warn!("{gap}");
        }
    }

    /// Scheduler policy derived from this configuration.
    #[must_use]
    pub fn scheduler_policy(&self) -> SchedulerPolicy {
        SchedulerPolicy::new(self.concurrency_limit)
            .with_polling_interval(self.polling_interval)
            .with_terminal_statuses(&self.terminal_statuses)
            .with_in_flight_ttl(self.in_flight_ttl)
    }
}

fn positive<T>(raw: Option<String>) -> Option<T>
where
    T: FromStr + Default + PartialOrd,
{
    raw.and_then(|v| v.parse::<T>().ok())
        .filter(|v| *v > T::default())
}

fn split_statuses(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(pairs: &[(&str, &str)]) -> AppConfig {
        let vars = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AppConfig::from_map(&vars)
    }

    #[test]
    fn test_defaults_when_unset() {
        let cfg = config(&[]);
        assert_eq!(cfg.port, 4000);
        assert_eq!(cfg.polling_interval, Duration::from_millis(2000));
        assert_eq!(cfg.concurrency_limit, 5);
        assert_eq!(cfg.active_statuses, ["in_progress"]);
        assert_eq!(cfg.count_strategy, CountStrategy::Dispatched);
        assert_eq!(cfg.terminal_statuses, ["completed", "failed", "cancelled"]);
        assert!(cfg.active_calls_url.is_none());
        assert!(cfg.in_flight_ttl.is_none());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let cfg = config(&[
            ("PORT", "not-a-port"),
            ("POLLING_INTERVAL_MS", "-5"),
            ("ELEVENLABS_CONCURRENCY_LIMIT", "0"),
        ]);
        assert_eq!(cfg.port, 4000);
        assert_eq!(cfg.polling_interval, Duration::from_millis(2000));
        assert_eq!(cfg.concurrency_limit, 5);
    }

    #[test]
    fn test_reads_all_values() {
        let cfg = config(&[
            ("PORT", "8080"),
            ("POLLING_INTERVAL_MS", "100"),
            ("ELEVENLABS_CONCURRENCY_LIMIT", "12"),
            ("ELEVENLABS_API_KEY", "secret"),
            ("ELEVENLABS_ACTIVE_CALLS_URL", "https://example.com/active"),
            ("ELEVENLABS_START_CALL_URL", " https://example.com/start "),
            ("ELEVENLABS_ACTIVE_STATUSES", "In_Progress, pending,,"),
            ("ELEVENLABS_ACTIVE_COUNT_STRATEGY", "BATCHES"),
            ("TERMINAL_STATUSES", "done,Failed"),
            ("IN_FLIGHT_TTL_MS", "600000"),
        ]);
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.polling_interval, Duration::from_millis(100));
        assert_eq!(cfg.concurrency_limit, 12);
        assert_eq!(cfg.api_key, "secret");
        assert_eq!(cfg.start_call_url.as_deref(), Some("https://example.com/start"));
        assert_eq!(cfg.active_statuses, ["in_progress", "pending"]);
        assert_eq!(cfg.count_strategy, CountStrategy::Batches);
        assert_eq!(cfg.terminal_statuses, ["done", "failed"]);
        assert_eq!(cfg.in_flight_ttl, Some(Duration::from_secs(600)));
        assert!(cfg.capability_gaps().is_empty());

        let policy = cfg.scheduler_policy();
        assert_eq!(policy.concurrency_limit, 12);
        assert_eq!(policy.effective_polling_interval(), Duration::from_millis(500));
        assert!(policy.is_terminal("DONE"));
    }

    #[test]
    fn test_unknown_strategy_defaults() {
        let cfg = config(&[("ELEVENLABS_ACTIVE_COUNT_STRATEGY", "sometimes")]);
        assert_eq!(cfg.count_strategy, CountStrategy::Dispatched);
    }

    #[test]
    fn test_capability_gaps_listed() {
        let cfg = config(&[("ELEVENLABS_API_KEY", "k")]);
        let gaps = cfg.capability_gaps();
        assert_eq!(gaps.len(), 2);
        assert!(gaps[0].contains("ELEVENLABS_ACTIVE_CALLS_URL"));
        assert!(gaps[1].contains("ELEVENLABS_START_CALL_URL"));
    }

    #[test]
    fn test_validate_rejects_zero_limit() {
        let cfg = AppConfig {
            concurrency_limit: 0,
            ..AppConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
