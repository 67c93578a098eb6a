//! Core scheduling abstractions and capacity accounting.

pub mod audit;
pub mod error;
pub mod gateway;
pub mod job;
pub mod scheduler;

pub use audit::{build_audit_event, AuditAction, AuditEvent, AuditSink, InMemoryAuditSink};
pub use error::{AppResult, SchedulerError};
pub use gateway::{CapacityOracle, DispatchGateway, DispatchReceipt};
pub use job::Job;
pub use scheduler::{
    spare_capacity, DispatchOutcome, JobQueue, NotificationOutcome, Scheduler, SchedulerPolicy,
    SchedulerStats, Spawn, Submission, TickReport,
};
