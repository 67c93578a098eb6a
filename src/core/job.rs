//! Dispatchable jobs and their retry lineage.

use serde::Serialize;

use crate::util::clock::now_ms;
use crate::util::serde::{new_job_id, JobId, Priority};

/// One pending unit of outbound-call work.
///
/// Jobs are never mutated while queued. A failed dispatch produces a new job
/// through [`Job::retry`] that keeps the payload and origin but carries a
/// derived id, a fresh timestamp and a decayed priority.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job<P> {
    /// Local identifier, distinct from the remote tracking id.
    pub id: JobId,
    /// Id of the first submission in this job's retry lineage.
    pub origin: JobId,
    /// Number of failed dispatches that preceded this job.
    pub attempt: u32,
    /// Scheduling preference.
    pub priority: Priority,
    /// Milliseconds since epoch when the job was created.
    pub enqueued_at_ms: u64,
    /// Opaque payload forwarded to the dispatch gateway.
    pub payload: P,
}

impl<P> Job<P> {
    /// Create a first-attempt job with a fresh id.
    pub fn new(payload: P, priority: Priority) -> Self {
        Self::with_id(new_job_id(), payload, priority)
    }

    /// Create a first-attempt job with a caller-chosen id.
    pub fn with_id(id: impl Into<JobId>, payload: P, priority: Priority) -> Self {
        let id = id.into();
        Self {
            origin: id.clone(),
            id,
            attempt: 0,
            priority,
            enqueued_at_ms: now_ms(),
            payload,
        }
    }

    /// Successor job to enqueue after this one failed to dispatch.
    #[must_use]
    pub fn retry(self) -> Self {
        let attempt = self.attempt.saturating_add(1);
        Self {
            id: format!("{}-retry{attempt}", self.origin),
            origin: self.origin,
            attempt,
            priority: self.priority.decayed(),
            enqueued_at_ms: now_ms(),
            payload: self.payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_keeps_payload_and_decays_priority() {
        let job = Job::with_id("abc", "payload".to_string(), Priority::new(5));
        let retried = job.clone().retry();

        assert_eq!(retried.payload, job.payload);
        assert_eq!(retried.priority.value(), 4);
        assert_eq!(retried.origin, "abc");
        assert_eq!(retried.attempt, 1);
        assert_eq!(retried.id, "abc-retry1");
    }

    #[test]
    fn test_retry_ids_do_not_accumulate_suffixes() {
        let job = Job::with_id("abc", (), Priority::default());
        let third = job.retry().retry().retry();
        assert_eq!(third.id, "abc-retry3");
        assert_eq!(third.priority.value(), -3);
    }

    #[test]
    fn test_retry_priority_floors() {
        let job = Job::with_id("low", (), Priority::FLOOR);
        assert_eq!(job.retry().priority, Priority::FLOOR);
    }
}
