//! Identifier and priority types shared across the scheduler.

use serde::{Deserialize, Serialize};

/// Locally assigned job identifier.
pub type JobId = String;

/// Remote tracking identifier returned by the dispatch gateway.
pub type TrackingId = String;

/// Generate a fresh local job identifier.
#[must_use]
pub fn new_job_id() -> JobId {
    uuid::Uuid::new_v4().to_string()
}

/// Scheduling preference of a job. Higher values dispatch sooner.
///
/// Values are unbounded above and clamped at [`Priority::FLOOR`] below, so a
/// job that keeps failing sinks to the floor and stays there instead of
/// drifting towards `i64::MIN`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(from = "i64", into = "i64")]
pub struct Priority(i64);

impl Priority {
    /// Lowest priority a job can hold.
    pub const FLOOR: Self = Self(-1000);

    /// Build a priority, clamping at the floor.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        if value < Self::FLOOR.0 {
            Self::FLOOR
        } else {
            Self(value)
        }
    }

    /// Raw value.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }

    /// Priority used when re-enqueueing after a failed dispatch: one lower,
    /// never below the floor.
    #[must_use]
    pub const fn decayed(self) -> Self {
        Self::new(self.0.saturating_sub(1))
    }
}

impl From<i64> for Priority {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl From<Priority> for i64 {
    fn from(priority: Priority) -> Self {
        priority.0
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_clamps_at_floor() {
        assert_eq!(Priority::new(-5000), Priority::FLOOR);
        assert_eq!(Priority::new(-1000).value(), -1000);
        assert_eq!(Priority::new(42).value(), 42);
    }

    #[test]
    fn test_decay_steps_down_to_floor() {
        assert_eq!(Priority::new(3).decayed().value(), 2);
        assert_eq!(Priority::new(-999).decayed(), Priority::FLOOR);
        assert_eq!(Priority::FLOOR.decayed(), Priority::FLOOR);
    }

    #[test]
    fn test_priority_deserializes_with_clamp() {
        let p: Priority = serde_json::from_str("-2000").unwrap();
        assert_eq!(p, Priority::FLOOR);
        assert_eq!(serde_json::to_string(&Priority::new(7)).unwrap(), "7");
    }

    #[test]
    fn test_job_ids_are_unique() {
        assert_ne!(new_job_id(), new_job_id());
    }
}
