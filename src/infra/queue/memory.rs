//! In-memory job queue ordered by priority, then submission order.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::core::{Job, JobQueue};

/// Heap entry: a job plus the sequence number it was enqueued under.
struct QueuedJob<P> {
    seq: u64,
    job: Job<P>,
}

impl<P> PartialEq for QueuedJob<P> {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}

impl<P> Eq for QueuedJob<P> {}

impl<P> PartialOrd for QueuedJob<P> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<P> Ord for QueuedJob<P> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Higher priority first; FIFO within a priority (reversed for max-heap).
        self.job
            .priority
            .cmp(&other.job.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Unbounded in-memory priority queue backed by a binary heap.
///
/// Ties are broken by a per-queue sequence number rather than timestamps, so
/// two jobs submitted within the same millisecond still leave in FIFO order.
pub struct InMemoryJobQueue<P> {
    next_seq: u64,
    jobs: BinaryHeap<QueuedJob<P>>,
}

impl<P> InMemoryJobQueue<P> {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_seq: 0,
            jobs: BinaryHeap::new(),
        }
    }
}

impl<P> Default for InMemoryJobQueue<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Clone + Send> JobQueue<P> for InMemoryJobQueue<P> {
    fn enqueue(&mut self, job: Job<P>) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.jobs.push(QueuedJob { seq, job });
    }

    fn dequeue(&mut self) -> Option<Job<P>> {
        self.jobs.pop().map(|q| q.job)
    }

    fn len(&self) -> usize {
        self.jobs.len()
    }

    fn snapshot(&self) -> Vec<Job<P>> {
        let mut ordered: Vec<&QueuedJob<P>> = self.jobs.iter().collect();
        ordered.sort_by(|a, b| b.cmp(a));
        ordered.into_iter().map(|q| q.job.clone()).collect()
    }
}
