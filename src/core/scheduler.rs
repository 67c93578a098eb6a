//! Admission-control scheduler: priority queue, in-flight tracking and the tick.
//!
//! A tick refreshes the remote active count from the [`CapacityOracle`],
//! computes spare capacity as
//! `max(0, concurrency_limit - remote_active - in_flight)`, and releases that
//! many jobs from the queue to the [`DispatchGateway`]. Dispatches are spawned
//! and never awaited by the tick. A successful dispatch adds its tracking id
//! to the in-flight set; a failed one re-enqueues a successor job with decayed
//! priority. Terminal notifications remove tracking ids again.
//!
//! All state lives behind one `parking_lot::Mutex` that is only held for
//! non-suspending queue and set operations, never across an `.await`. Ticks
//! may therefore interleave at oracle/gateway calls without corrupting state.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::core::{
    build_audit_event, AuditAction, AuditSink, CapacityOracle, DispatchGateway, DispatchReceipt,
    Job, SchedulerError,
};
use crate::util::serde::{JobId, Priority, TrackingId};

/// Abstraction for queue backends.
///
/// Every operation is total and non-suspending so it can run under the
/// scheduler's state lock.
pub trait JobQueue<P>: Send {
    /// Insert a job, keeping priority-desc / FIFO order.
    fn enqueue(&mut self, job: Job<P>);
    /// Remove the highest-ordered job, if any.
    fn dequeue(&mut self) -> Option<Job<P>>;
    /// Current depth.
    fn len(&self) -> usize;
    /// Whether the queue holds no jobs.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Copy of the queued jobs in dispatch order.
    fn snapshot(&self) -> Vec<Job<P>>;
}

/// Abstraction for spawning task execution on a runtime.
pub trait Spawn {
    /// Spawn an async task that returns a future.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;
}

/// Knobs that govern admission and tracking.
#[derive(Debug, Clone)]
pub struct SchedulerPolicy {
    /// Maximum jobs active at once, remote and local combined.
    pub concurrency_limit: u32,
    /// Requested interval between periodic ticks.
    pub polling_interval: Duration,
    /// Lower-cased statuses after which a remote job no longer counts.
    pub terminal_statuses: Vec<String>,
    /// Evict tracking ids older than this; `None` keeps them until notified.
    pub in_flight_ttl: Option<Duration>,
}

impl SchedulerPolicy {
    /// Shortest interval the periodic ticker will run at.
    pub const MIN_POLLING_INTERVAL: Duration = Duration::from_millis(500);
    /// Terminal statuses used when none are configured.
    pub const DEFAULT_TERMINAL_STATUSES: [&'static str; 3] = ["completed", "failed", "cancelled"];

    /// Policy with the given limit and default interval, statuses and no TTL.
    #[must_use]
    pub fn new(concurrency_limit: u32) -> Self {
        Self {
            concurrency_limit,
            polling_interval: Duration::from_millis(2000),
            terminal_statuses: Self::DEFAULT_TERMINAL_STATUSES
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            in_flight_ttl: None,
        }
    }

    /// Set the polling interval.
    #[must_use]
    pub const fn with_polling_interval(mut self, interval: Duration) -> Self {
        self.polling_interval = interval;
        self
    }

    /// Replace the terminal status set.
    #[must_use]
    pub fn with_terminal_statuses<I, T>(mut self, statuses: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.terminal_statuses = statuses
            .into_iter()
            .map(|s| s.as_ref().trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        self
    }

    /// Set the staleness timeout for tracking ids.
    #[must_use]
    pub const fn with_in_flight_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.in_flight_ttl = ttl;
        self
    }

    /// Polling interval with the minimum enforced.
    #[must_use]
    pub fn effective_polling_interval(&self) -> Duration {
        self.polling_interval.max(Self::MIN_POLLING_INTERVAL)
    }

    /// Whether `status` ends a remote job. Case-insensitive.
    #[must_use]
    pub fn is_terminal(&self, status: &str) -> bool {
        let status = status.trim().to_lowercase();
        self.terminal_statuses.iter().any(|s| *s == status)
    }
}

/// Number of jobs that may be dispatched right now. Never negative.
#[must_use]
pub fn spare_capacity(concurrency_limit: u32, remote_active: u64, in_flight: usize) -> usize {
    let in_flight = u64::try_from(in_flight).unwrap_or(u64::MAX);
    let spare = u64::from(concurrency_limit)
        .saturating_sub(remote_active)
        .saturating_sub(in_flight);
    usize::try_from(spare).unwrap_or(usize::MAX)
}

/// Accepted submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    /// Id assigned to the queued job.
    pub id: JobId,
    /// Queue depth after the insert.
    pub queue_size: usize,
}

/// What a single tick observed and released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    /// Fresh remote active count, or `None` if the oracle failed.
    pub remote_active: Option<u64>,
    /// Spare capacity computed at the start of the drain.
    pub spare: usize,
    /// Jobs handed to the gateway, in dequeue order.
    pub dispatched: Vec<JobId>,
    /// Tracking ids evicted for staleness.
    pub expired: Vec<TrackingId>,
}

/// Result of one dispatch attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Gateway accepted the job; its tracking id is now in flight.
    Tracked(DispatchReceipt),
    /// Gateway failed; a successor job was queued.
    Requeued {
        /// Id of the successor job.
        job_id: JobId,
        /// Priority of the successor job.
        priority: Priority,
    },
}

/// Result of applying a status notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationOutcome {
    /// Whether the status was in the terminal set.
    pub terminal: bool,
    /// Whether a tracked id was removed.
    pub released: bool,
}

/// Point-in-time view of scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerStats {
    /// Jobs waiting in the queue.
    pub queue_size: usize,
    /// Locally tracked remote jobs.
    pub in_flight: usize,
    /// Last observed remote active count.
    pub remote_active: u64,
    /// Configured concurrency limit.
    pub concurrency_limit: u32,
    /// Spare capacity under the current counts.
    pub available_slots: usize,
}

struct SchedulerState<Q> {
    queue: Q,
    in_flight: HashMap<TrackingId, Instant>,
    latest_remote_active: u64,
}

impl<Q> SchedulerState<Q> {
    fn evict_older_than(&mut self, ttl: Duration, now: Instant) -> Vec<TrackingId> {
        let mut expired = Vec::new();
        self.in_flight.retain(|id, since| {
            let stale = now.saturating_duration_since(*since) >= ttl;
            if stale {
                expired.push(id.clone());
            }
            !stale
        });
        expired
    }
}

/// The scheduler handle.
///
/// Cloning is cheap and every clone drives the same state, so one instance
/// is built at startup and shared with request handlers and the ticker.
pub struct Scheduler<P, Q, O, G, S> {
    policy: Arc<SchedulerPolicy>,
    state: Arc<Mutex<SchedulerState<Q>>>,
    oracle: Arc<O>,
    gateway: Arc<G>,
    spawner: S,
    audit: Option<Arc<dyn AuditSink>>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    _payload: PhantomData<fn() -> P>,
}

impl<P, Q, O, G, S: Clone> Clone for Scheduler<P, Q, O, G, S> {
    fn clone(&self) -> Self {
        Self {
            policy: Arc::clone(&self.policy),
            state: Arc::clone(&self.state),
            oracle: Arc::clone(&self.oracle),
            gateway: Arc::clone(&self.gateway),
            spawner: self.spawner.clone(),
            audit: self.audit.clone(),
            ticker: Arc::clone(&self.ticker),
            _payload: PhantomData,
        }
    }
}

impl<P, Q, O, G, S> fmt::Debug for Scheduler<P, Q, O, G, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (in_flight, remote_active) = {
            let state = self.state.lock();
            (state.in_flight.len(), state.latest_remote_active)
        };
        f.debug_struct("Scheduler")
            .field("policy", &self.policy)
            .field("in_flight", &in_flight)
            .field("remote_active", &remote_active)
            .field("audited", &self.audit.is_some())
            .field("ticker_running", &self.ticker.lock().is_some())
            .finish_non_exhaustive()
    }
}

impl<P, Q, O, G, S> Scheduler<P, Q, O, G, S> {
    /// Create a scheduler from components.
    pub fn new(
        policy: SchedulerPolicy,
        queue: Q,
        oracle: Arc<O>,
        gateway: Arc<G>,
        spawner: S,
    ) -> Self {
        Self {
            policy: Arc::new(policy),
            state: Arc::new(Mutex::new(SchedulerState {
                queue,
                in_flight: HashMap::new(),
                latest_remote_active: 0,
            })),
            oracle,
            gateway,
            spawner,
            audit: None,
            ticker: Arc::new(Mutex::new(None)),
            _payload: PhantomData,
        }
    }

    /// Attach an audit sink. Without one, no audit events are recorded.
    #[must_use]
    pub fn with_audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Policy this scheduler runs with.
    pub fn policy(&self) -> &SchedulerPolicy {
        &self.policy
    }

    /// Whether a tracking id is currently in flight.
    pub fn is_tracked(&self, tracking_id: &str) -> bool {
        self.state.lock().in_flight.contains_key(tracking_id)
    }

    /// Cancel the periodic ticker, if running.
    pub fn stop(&self) {
        if let Some(handle) = self.ticker.lock().take() {
            handle.abort();
            info!("scheduler ticker stopped");
        }
    }

    fn record_audit(
        &self,
        action: AuditAction,
        job_id: Option<&str>,
        tracking_id: Option<&str>,
        detail: Option<String>,
    ) {
        if let Some(sink) = &self.audit {
            sink.record(build_audit_event(action, job_id, tracking_id, detail));
        }
    }
}

impl<P, Q, O, G, S> Scheduler<P, Q, O, G, S>
where
    P: Send + Sync + 'static,
    Q: JobQueue<P> + 'static,
    O: CapacityOracle,
    G: DispatchGateway<P>,
    S: Spawn + Clone + Send + Sync + 'static,
{
    /// Enqueue a new job and trigger a tick.
    pub fn submit(&self, payload: P, priority: Priority) -> Submission {
        let job = Job::new(payload, priority);
        let id = job.id.clone();
        let queue_size = self.enqueue(job);
        self.trigger_tick();
        Submission { id, queue_size }
    }

    /// Enqueue a job without triggering a tick. Returns the new queue depth.
    pub fn enqueue(&self, job: Job<P>) -> usize {
        let job_id = job.id.clone();
        let priority = job.priority;
        let queue_size = {
            let mut state = self.state.lock();
            state.queue.enqueue(job);
            state.queue.len()
        };
        self.record_audit(AuditAction::Enqueue, Some(&job_id), None, None);
        debug!(job_id = %job_id, %priority, queue_size, "job enqueued");
        queue_size
    }

    /// Run a tick in the background.
    pub fn trigger_tick(&self) {
        let this = self.clone();
        self.spawner.spawn(async move {
            this.tick().await;
        });
    }

    /// Refresh capacity and release queued jobs into it.
    ///
    /// Oracle failures are logged and the drain proceeds against the last
    /// known remote count. Spare capacity is computed once; the drain does not
    /// re-check it while dispatches are outstanding.
    pub async fn tick(&self) -> TickReport {
        let remote_active = match self.oracle.active_count().await {
            Ok(count) => Some(count),
            Err(err) => {
                warn!(error = %err, "failed to poll remote active count; using last known value");
                None
            }
        };

        let (spare, jobs, expired) = {
            let mut state = self.state.lock();
            if let Some(count) = remote_active {
                state.latest_remote_active = count;
            }
            let expired = self
                .policy
                .in_flight_ttl
                .map(|ttl| state.evict_older_than(ttl, Instant::now()))
                .unwrap_or_default();

            let spare = spare_capacity(
                self.policy.concurrency_limit,
                state.latest_remote_active,
                state.in_flight.len(),
            );
            let mut jobs = Vec::new();
            while jobs.len() < spare {
                let Some(job) = state.queue.dequeue() else {
                    break;
                };
                jobs.push(job);
            }
            (spare, jobs, expired)
        };

        for tracking_id in &expired {
            warn!(tracking_id = %tracking_id, "evicting stale in-flight entry");
            self.record_audit(AuditAction::Expire, None, Some(tracking_id), None);
        }

        let dispatched: Vec<JobId> = jobs.iter().map(|job| job.id.clone()).collect();
        if !dispatched.is_empty() {
            debug!(spare, released = dispatched.len(), "draining queue");
        }
        for job in jobs {
            self.record_audit(AuditAction::Dispatch, Some(&job.id), None, None);
            let this = self.clone();
            self.spawner.spawn(async move {
                this.dispatch(job).await;
            });
        }

        TickReport {
            remote_active,
            spare,
            dispatched,
            expired,
        }
    }

    /// Hand one job to the gateway and record the outcome.
    ///
    /// A job is never dropped: either its tracking id enters the in-flight
    /// set or a successor with decayed priority is queued.
    pub async fn dispatch(&self, job: Job<P>) -> DispatchOutcome {
        let result = match self.gateway.dispatch(&job.payload).await {
            Ok(receipt) if receipt.tracking_id.trim().is_empty() => {
                Err(SchedulerError::MissingTrackingId)
            }
            other => other,
        };

        match result {
            Ok(receipt) => {
                self.state
                    .lock()
                    .in_flight
                    .insert(receipt.tracking_id.clone(), Instant::now());
                self.record_audit(
                    AuditAction::Track,
                    Some(&job.id),
                    Some(&receipt.tracking_id),
                    None,
                );
                info!(job_id = %job.id, tracking_id = %receipt.tracking_id, "call started");
                DispatchOutcome::Tracked(receipt)
            }
            Err(err) => {
                error!(job_id = %job.id, error = %err, "failed to start call; requeueing");
                let retry = job.retry();
                let job_id = retry.id.clone();
                let priority = retry.priority;
                self.state.lock().queue.enqueue(retry);
                self.record_audit(
                    AuditAction::Requeue,
                    Some(&job_id),
                    None,
                    Some(err.to_string()),
                );
                DispatchOutcome::Requeued { job_id, priority }
            }
        }
    }

    /// Apply a remote status notification and trigger a tick.
    ///
    /// Terminal statuses remove the tracking id if present. Unknown ids and
    /// repeated notifications are no-ops.
    pub fn handle_notification(&self, tracking_id: &str, status: &str) -> NotificationOutcome {
        let terminal = self.policy.is_terminal(status);
        let released = terminal && self.state.lock().in_flight.remove(tracking_id).is_some();
        if released {
            self.record_audit(
                AuditAction::Release,
                None,
                Some(tracking_id),
                Some(status.to_string()),
            );
            info!(tracking_id = %tracking_id, status = %status, "call released");
        } else {
            debug!(
                tracking_id = %tracking_id,
                status = %status,
                terminal,
                "notification did not release a slot"
            );
        }
        self.trigger_tick();
        NotificationOutcome { terminal, released }
    }

    /// Current counts and spare capacity.
    pub fn stats(&self) -> SchedulerStats {
        let state = self.state.lock();
        let in_flight = state.in_flight.len();
        SchedulerStats {
            queue_size: state.queue.len(),
            in_flight,
            remote_active: state.latest_remote_active,
            concurrency_limit: self.policy.concurrency_limit,
            available_slots: spare_capacity(
                self.policy.concurrency_limit,
                state.latest_remote_active,
                in_flight,
            ),
        }
    }

    /// Copy of the queued jobs in dispatch order.
    pub fn snapshot(&self) -> Vec<Job<P>> {
        self.state.lock().queue.snapshot()
    }

    /// Start the periodic ticker. Calling it again while running is a no-op.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self) {
        let mut ticker = self.ticker.lock();
        if ticker.is_some() {
            return;
        }
        let period = self.policy.effective_polling_interval();
        let this = self.clone();
        *ticker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                this.tick().await;
            }
        }));
        info!(?period, "scheduler ticker started");
    }
}
