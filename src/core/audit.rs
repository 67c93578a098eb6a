//! Audit trail of scheduler decisions.
//!
//! The scheduler reports every state transition of a job (enqueue, dispatch,
//! tracking, requeue, release, expiry) to an optional [`AuditSink`]. The
//! bundled [`InMemoryAuditSink`] keeps a bounded ring of recent events and is
//! what tests use to observe dispatch order.

use std::collections::VecDeque;
use std::fmt;

use parking_lot::Mutex;
use serde::Serialize;

use crate::util::clock::now_ms;
use crate::util::serde::{JobId, TrackingId};

/// What happened to a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Job entered the queue from a submission.
    Enqueue,
    /// Job left the queue and was handed to the gateway.
    Dispatch,
    /// Gateway accepted the job; its tracking id entered the in-flight set.
    Track,
    /// Gateway failed; a successor job was queued.
    Requeue,
    /// A terminal notification removed a tracking id.
    Release,
    /// A tracking id outlived the staleness timeout and was evicted.
    Expire,
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Enqueue => "enqueue",
            Self::Dispatch => "dispatch",
            Self::Track => "track",
            Self::Requeue => "requeue",
            Self::Release => "release",
            Self::Expire => "expire",
        };
        f.write_str(name)
    }
}

/// Audit event structure.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    /// Action taken.
    pub action: AuditAction,
    /// Local job id, when the event concerns a queued job.
    pub job_id: Option<JobId>,
    /// Remote tracking id, when one is known.
    pub tracking_id: Option<TrackingId>,
    /// Timestamp milliseconds.
    pub created_at_ms: u64,
    /// Additional context.
    pub detail: Option<String>,
}

/// Audit sink abstraction.
pub trait AuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: AuditEvent);
}

/// In-memory audit sink for testing and dev.
pub struct InMemoryAuditSink {
    events: Mutex<VecDeque<AuditEvent>>,
    max_events: usize,
}

impl Default for InMemoryAuditSink {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl InMemoryAuditSink {
    /// Events retained by [`InMemoryAuditSink::default`].
    pub const DEFAULT_CAPACITY: usize = 1024;

    /// Create a new in-memory sink with a bounded buffer.
    #[must_use]
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Mutex::new(VecDeque::with_capacity(max_events.min(1024))),
            max_events,
        }
    }

    /// Retrieve a snapshot of stored events.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().iter().cloned().collect()
    }

    /// Job ids of stored events with the given action, oldest first.
    pub fn job_ids(&self, action: AuditAction) -> Vec<JobId> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.action == action)
            .filter_map(|e| e.job_id.clone())
            .collect()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&self, event: AuditEvent) {
        if self.max_events == 0 {
            return;
        }
        let mut events = self.events.lock();
        if events.len() >= self.max_events {
            events.pop_front();
        }
        events.push_back(event);
    }
}

/// Helper to build an audit event from context.
pub fn build_audit_event(
    action: AuditAction,
    job_id: Option<&str>,
    tracking_id: Option<&str>,
    detail: Option<String>,
) -> AuditEvent {
    AuditEvent {
        action,
        job_id: job_id.map(str::to_owned),
        tracking_id: tracking_id.map(str::to_owned),
        created_at_ms: now_ms(),
        detail,
    }
}
