//! # Voice Slot Scheduler
//!
//! An admission-control scheduler for outbound voice calls placed through a
//! remote calling provider that enforces a hard cap on concurrently active
//! calls.
//!
//! Callers submit call jobs over HTTP with an optional priority. Jobs wait in
//! a priority queue until the scheduler sees spare capacity, computed as
//!
//! ```text
//! spare = max(0, concurrency_limit - remote_active - in_flight)
//! ```
//!
//! where `remote_active` is polled from the provider and `in_flight` counts
//! calls this process started that have not yet been reported finished.
//!
//! ## Key Features
//!
//! - **Priority queue**: higher priority first, FIFO among equals
//! - **Capacity polling**: tolerant decoding of several active-count shapes
//! - **Fire-and-forget dispatch**: ticks never wait on in-progress starts
//! - **Retry with decay**: failed starts requeue at `priority - 1`, floored at -1000
//! - **Terminal webhooks**: completed/failed/cancelled calls release their slot
//! - **Stale eviction**: optional TTL on tracked calls
//!
//! ## Usage
//!
//! ```rust,ignore
//! use voice_slot_scheduler::builders::build_scheduler;
//! use voice_slot_scheduler::config::AppConfig;
//! use voice_slot_scheduler::runtime::{create_router, TokioSpawner};
//!
//! let cfg = AppConfig::from_env();
//! let scheduler = build_scheduler(&cfg, TokioSpawner::current())?;
//! scheduler.start();
//! let app = create_router(scheduler.clone());
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core scheduling abstractions: jobs, queue contract, oracle/gateway, tick.
pub mod core;
/// Environment-driven configuration.
pub mod config;
/// Builders to construct the scheduler from configuration.
pub mod builders;
/// Infrastructure adapters for queues and the calling provider.
pub mod infra;
/// Tokio runtime adapter and HTTP surface.
pub mod runtime;
/// Shared utilities.
pub mod util;
